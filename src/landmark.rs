//! Hand landmarks coming from the external detector.
//!
//! The detector (capture + hand landmark model + preview window) runs outside
//! this crate and writes one JSON object per video frame:
//!
//! ```json
//! {"width": 1920, "height": 1080,
//!  "hands": [{"handedness": "Right", "score": 0.93,
//!             "landmarks": [{"x": 0.51, "y": 0.82, "z": -0.02}, ...]}]}
//! ```
//!
//! Coordinates are normalized to `[0, 1]`. `width`/`height` may be omitted
//! and then default to the configured frame size. A frame carrying
//! `"exit": true` asks the controller to stop.

use crate::hit::Point;
use anyhow::{Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};

/// Hand landmark indices, MediaPipe hand model convention.
#[allow(dead_code)]
pub mod landmarks {
    pub const WRIST: usize = 0;
    pub const THUMB_TIP: usize = 4;
    pub const INDEX_FINGER_TIP: usize = 8;
    pub const MIDDLE_FINGER_TIP: usize = 12;
    pub const RING_FINGER_TIP: usize = 16;
    pub const PINKY_TIP: usize = 20;
}

/// Fingertips that can press keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Fingertip {
    Thumb,
    Index,
    Middle,
    Ring,
    Pinky,
}

impl Fingertip {
    pub fn landmark_index(&self) -> usize {
        match self {
            Fingertip::Thumb => landmarks::THUMB_TIP,
            Fingertip::Index => landmarks::INDEX_FINGER_TIP,
            Fingertip::Middle => landmarks::MIDDLE_FINGER_TIP,
            Fingertip::Ring => landmarks::RING_FINGER_TIP,
            Fingertip::Pinky => landmarks::PINKY_TIP,
        }
    }
}

/// Flip applied to the camera image before hit testing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mirror {
    #[default]
    None,
    /// Left-right flip, the usual selfie view.
    Horizontal,
    /// Upside-down flip, for a camera mounted looking down.
    Vertical,
}

impl Mirror {
    fn apply(&self, x: f32, y: f32) -> (f32, f32) {
        match self {
            Mirror::None => (x, y),
            Mirror::Horizontal => (1.0 - x, y),
            Mirror::Vertical => (x, 1.0 - y),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub z: f32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Hand {
    #[serde(default)]
    pub handedness: String,
    /// Detection confidence, 0.0 to 1.0. Absent means fully confident.
    #[serde(default = "full_confidence")]
    pub score: f32,
    pub landmarks: Vec<Landmark>,
}

fn full_confidence() -> f32 {
    1.0
}

/// One detector frame.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DetectorFrame {
    pub width: Option<u32>,
    pub height: Option<u32>,
    #[serde(default)]
    pub hands: Vec<Hand>,
    #[serde(default)]
    pub exit: bool,
}

impl DetectorFrame {
    pub fn parse(line: &str) -> Result<Self> {
        serde_json::from_str(line).with_context(|| format!("malformed detector frame: {line}"))
    }
}

/// Turns detector hands into fingertip pixel positions.
#[derive(Debug, Clone, PartialEq)]
pub struct FingertipExtractor {
    pub fingertips: Vec<Fingertip>,
    pub mirror: Mirror,
    pub min_confidence: f32,
}

impl FingertipExtractor {
    /// Hands that pass the confidence threshold.
    pub fn confident_hands<'a>(&'a self, hands: &'a [Hand]) -> impl Iterator<Item = &'a Hand> + 'a {
        hands.iter().filter(move |h| h.score >= self.min_confidence)
    }

    /// Pixel positions of the selected fingertips of every confident hand.
    ///
    /// Normalized coordinates are scaled by the frame size and truncated.
    /// Hands too short to carry a selected landmark are skipped.
    pub fn points(&self, hands: &[Hand], width: u32, height: u32) -> Vec<Point> {
        let mut points = Vec::with_capacity(hands.len() * self.fingertips.len());
        for hand in self.confident_hands(hands) {
            for tip in &self.fingertips {
                let Some(lm) = hand.landmarks.get(tip.landmark_index()) else {
                    warn!(
                        "{} hand has {} landmarks, no {:?} fingertip",
                        hand.handedness,
                        hand.landmarks.len(),
                        tip
                    );
                    continue;
                };
                let (x, y) = self.mirror.apply(lm.x, lm.y);
                points.push(Point::new(
                    (x * width as f32) as i32,
                    (y * height as f32) as i32,
                ));
            }
        }
        points
    }
}
