//! On-screen key zones.
//!
//! Four lane rectangles (`d f j k`) sit near the bottom of the frame; trigger
//! rectangles for the menu keys are placed at fixed offsets from a frame
//! corner. All bounds are inclusive pixel coordinates.

use crate::key::Key;
use serde::{Deserialize, Serialize};

/// A named rectangle, inclusive on all four sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct KeyZone {
    pub label: Key,
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl KeyZone {
    pub fn new(label: Key, x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self {
            label,
            x1: x1.min(x2),
            y1: y1.min(y2),
            x2: x1.max(x2),
            y2: y1.max(y2),
        }
    }

    /// Whether point (x, y) lies inside or on the edge of this zone.
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x1 && x <= self.x2 && y >= self.y1 && y <= self.y2
    }

    /// Whether the open interiors of two zones intersect. Sharing an edge
    /// row or column does not count.
    pub fn overlaps(&self, other: &KeyZone) -> bool {
        self.x1 < other.x2 && other.x1 < self.x2 && self.y1 < other.y2 && other.y1 < self.y2
    }

    /// Intersect with the frame `[0, w-1] x [0, h-1]`.
    fn clip(self, width: i32, height: i32) -> Option<Self> {
        let x1 = self.x1.max(0);
        let y1 = self.y1.max(0);
        let x2 = self.x2.min(width - 1);
        let y2 = self.y2.min(height - 1);
        (x1 <= x2 && y1 <= y2).then_some(Self { x1, y1, x2, y2, ..self })
    }
}

// ── Lanes ───────────────────────────────────────────────────

/// Where the lane row is placed in the frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LaneAnchor {
    /// Horizontally centered, `bottom_margin` pixels above the bottom edge.
    Centered { bottom_margin: i32 },
    /// Top-left corner of the `d` lane at a fixed pixel position.
    Origin { x: i32, y: i32 },
}

/// Geometry of the four lane zones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaneConfig {
    pub width: i32,
    pub height: i32,
    /// Gap between d-f and between j-k.
    pub spacing_small: i32,
    /// Gap between f-j.
    pub spacing_big: i32,
    /// Written as `anchor: {centered: {bottom_margin: 40}}` in YAML.
    #[serde(with = "serde_yaml_ng::with::singleton_map")]
    pub anchor: LaneAnchor,
}

impl LaneConfig {
    pub fn total_width(&self) -> i32 {
        self.width
            .saturating_mul(4)
            .saturating_add(self.spacing_small.saturating_mul(2))
            .saturating_add(self.spacing_big)
    }

    /// Left edge of each lane relative to the first one.
    fn offsets(&self) -> [i32; 4] {
        let (w, ss, sb) = (self.width, self.spacing_small, self.spacing_big);
        let first_gap = w.saturating_add(ss);
        let second_gap = first_gap.saturating_add(w).saturating_add(sb);
        [0, first_gap, second_gap, second_gap.saturating_add(first_gap)]
    }

    fn zones(&self, frame_width: i32, frame_height: i32) -> impl Iterator<Item = KeyZone> + '_ {
        let (start_x, start_y) = match self.anchor {
            LaneAnchor::Centered { bottom_margin } => (
                frame_width.saturating_sub(self.total_width()).div_euclid(2),
                frame_height.saturating_sub(self.height).saturating_sub(bottom_margin),
            ),
            LaneAnchor::Origin { x, y } => (x, y),
        };
        Key::LANES.into_iter().zip(self.offsets()).map(move |(key, dx)| {
            let x1 = start_x.saturating_add(dx);
            KeyZone::new(
                key,
                x1,
                start_y,
                x1.saturating_add(self.width),
                start_y.saturating_add(self.height),
            )
        })
    }
}

// ── Triggers ────────────────────────────────────────────────

/// Frame corner a trigger rectangle is measured from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Corner {
    /// Coordinates are absolute pixels.
    #[default]
    TopLeft,
    /// Coordinates are distances back from the right and bottom edges.
    BottomRight,
}

/// A single menu trigger rectangle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerConfig {
    pub label: Key,
    #[serde(default)]
    pub corner: Corner,
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl TriggerConfig {
    pub fn top_left(label: Key, x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self { label, corner: Corner::TopLeft, x1, y1, x2, y2 }
    }

    fn zone(&self, frame_width: i32, frame_height: i32) -> KeyZone {
        match self.corner {
            Corner::TopLeft => KeyZone::new(self.label, self.x1, self.y1, self.x2, self.y2),
            Corner::BottomRight => KeyZone::new(
                self.label,
                frame_width.saturating_sub(self.x1),
                frame_height.saturating_sub(self.y1),
                frame_width.saturating_sub(self.x2),
                frame_height.saturating_sub(self.y2),
            ),
        }
    }
}

// ── Layout ──────────────────────────────────────────────────

/// Lane geometry plus the trigger list for one controller setup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layout {
    pub lanes: LaneConfig,
    #[serde(default)]
    pub triggers: Vec<TriggerConfig>,
}

impl Layout {
    /// Compute the zones for a frame of the given size.
    ///
    /// Order is stable: lanes `d f j k`, then triggers as configured. Every
    /// zone is clipped to the frame and dropped if nothing is left. A zone
    /// whose interior would overlap an earlier one at this frame size is
    /// dropped as well, so the result never contains overlapping interiors.
    pub fn compute_zones(&self, frame_width: u32, frame_height: u32) -> Vec<KeyZone> {
        let w = i32::try_from(frame_width).unwrap_or(i32::MAX);
        let h = i32::try_from(frame_height).unwrap_or(i32::MAX);

        let candidates = self
            .lanes
            .zones(w, h)
            .chain(self.triggers.iter().map(|t| t.zone(w, h)));

        let mut zones: Vec<KeyZone> = Vec::with_capacity(4 + self.triggers.len());
        for zone in candidates.filter_map(|z| z.clip(w, h)) {
            if zones.iter().all(|placed| !placed.overlaps(&zone)) {
                zones.push(zone);
            }
        }
        zones
    }
}
