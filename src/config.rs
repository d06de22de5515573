//! Configuration: built-in presets plus an optional YAML file on top.
//!
//! ```yaml
//! preset: wide
//! device_name: hand2uinput
//! mirror: vertical
//! repeat_interval_ms: 45
//! fingertips: [index, middle]
//! ```
//!
//! Any field left out of the file comes from the preset.

use crate::key::Key;
use crate::landmark::{Fingertip, FingertipExtractor, Mirror};
use crate::layout::{Corner, LaneAnchor, LaneConfig, Layout, TriggerConfig};
use crate::state::{KeyMode, KeyTable};
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_DEVICE_NAME: &str = "hand2uinput";

/// Built-in setups, one per camera arrangement the controller was tuned for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Preset {
    /// 640x480 selfie camera, fixed lane row, four menu triggers.
    #[default]
    Classic,
    /// 1080p camera mounted upside down, centered lanes, four menu triggers.
    Wide,
    /// 1080p selfie camera, large lanes, backtick trigger only, two fingertips.
    Clean,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameSize {
    pub width: u32,
    pub height: u32,
}

/// Fully resolved settings the controller runs with.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub device_name: String,
    pub frame: FrameSize,
    pub mirror: Mirror,
    pub fingertips: Vec<Fingertip>,
    pub min_detection_confidence: f32,
    pub repeat_interval: Duration,
    /// Keys that tap repeatedly instead of being held.
    pub repeat_keys: Vec<Key>,
    pub layout: Layout,
}

fn menu_triggers() -> Vec<TriggerConfig> {
    vec![
        TriggerConfig::top_left(Key::Backtick, 20, 20, 80, 80),
        TriggerConfig::top_left(Key::Enter, 500, 100, 600, 160),
        TriggerConfig::top_left(Key::Up, 500, 180, 600, 240),
        TriggerConfig::top_left(Key::Down, 500, 260, 600, 320),
    ]
}

impl Preset {
    pub fn settings(self) -> Settings {
        let (frame, mirror, fingertips, layout) = match self {
            Preset::Classic => (
                FrameSize { width: 640, height: 480 },
                Mirror::Horizontal,
                vec![Fingertip::Index],
                Layout {
                    lanes: LaneConfig {
                        width: 100,
                        height: 80,
                        spacing_small: 0,
                        spacing_big: 0,
                        anchor: LaneAnchor::Origin { x: 100, y: 360 },
                    },
                    triggers: menu_triggers(),
                },
            ),
            Preset::Wide => (
                FrameSize { width: 1920, height: 1080 },
                Mirror::Vertical,
                vec![Fingertip::Index],
                Layout {
                    lanes: LaneConfig {
                        width: 120,
                        height: 180,
                        spacing_small: 40,
                        spacing_big: 80,
                        anchor: LaneAnchor::Centered { bottom_margin: 40 },
                    },
                    triggers: menu_triggers(),
                },
            ),
            Preset::Clean => (
                FrameSize { width: 1920, height: 1080 },
                Mirror::Horizontal,
                vec![Fingertip::Index, Fingertip::Middle],
                Layout {
                    lanes: LaneConfig {
                        width: 160,
                        height: 240,
                        spacing_small: 60,
                        spacing_big: 80,
                        anchor: LaneAnchor::Centered { bottom_margin: 40 },
                    },
                    triggers: vec![TriggerConfig {
                        label: Key::Backtick,
                        corner: Corner::BottomRight,
                        x1: 120,
                        y1: 140,
                        x2: 20,
                        y2: 60,
                    }],
                },
            ),
        };
        Settings {
            device_name: DEFAULT_DEVICE_NAME.to_string(),
            frame,
            mirror,
            fingertips,
            min_detection_confidence: 0.7,
            repeat_interval: Duration::from_millis(100),
            repeat_keys: vec![Key::Up, Key::Down],
            layout,
        }
    }
}

/// Contents of the YAML config file. Every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub preset: Option<Preset>,
    pub device_name: Option<String>,
    pub frame: Option<FrameSize>,
    pub mirror: Option<Mirror>,
    pub fingertips: Option<Vec<Fingertip>>,
    pub min_detection_confidence: Option<f32>,
    pub repeat_interval_ms: Option<u64>,
    pub repeat_keys: Option<Vec<Key>>,
    pub lanes: Option<LaneConfig>,
    pub triggers: Option<Vec<TriggerConfig>>,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("cannot open {}", path.display()))?;
        serde_yaml_ng::from_reader(file).with_context(|| format!("cannot parse {}", path.display()))
    }

    /// Layer this file over a preset. `preset` wins over the file's own
    /// `preset` field when given.
    pub fn resolve(self, preset: Option<Preset>) -> Result<Settings> {
        let mut s = preset.or(self.preset).unwrap_or_default().settings();
        if let Some(v) = self.device_name {
            s.device_name = v;
        }
        if let Some(v) = self.frame {
            s.frame = v;
        }
        if let Some(v) = self.mirror {
            s.mirror = v;
        }
        if let Some(v) = self.fingertips {
            s.fingertips = v;
        }
        if let Some(v) = self.min_detection_confidence {
            s.min_detection_confidence = v;
        }
        if let Some(ms) = self.repeat_interval_ms {
            s.repeat_interval = Duration::from_millis(ms);
        }
        if let Some(v) = self.repeat_keys {
            s.repeat_keys = v;
        }
        if let Some(v) = self.lanes {
            s.layout.lanes = v;
        }
        if let Some(v) = self.triggers {
            s.layout.triggers = v;
        }
        s.validate()?;
        Ok(s)
    }
}

impl Settings {
    pub fn validate(&self) -> Result<()> {
        if self.frame.width == 0 || self.frame.height == 0 {
            bail!("frame size must be positive, got {}x{}", self.frame.width, self.frame.height);
        }
        if self.layout.lanes.width <= 0 || self.layout.lanes.height <= 0 {
            bail!("lane width and height must be positive");
        }
        if self.repeat_interval.is_zero() {
            bail!("repeat_interval_ms must be positive");
        }
        if !(0.0..=1.0).contains(&self.min_detection_confidence) {
            bail!(
                "min_detection_confidence must be within 0..=1, got {}",
                self.min_detection_confidence
            );
        }
        if self.fingertips.is_empty() {
            bail!("at least one fingertip must be selected");
        }
        Ok(())
    }

    /// Every key that has a zone: lanes first, then triggers.
    pub fn tracked_keys(&self) -> Vec<Key> {
        let mut keys: Vec<Key> = Key::LANES.to_vec();
        for t in &self.layout.triggers {
            if !keys.contains(&t.label) {
                keys.push(t.label);
            }
        }
        keys
    }

    pub fn key_mode(&self, key: Key) -> KeyMode {
        if self.repeat_keys.contains(&key) {
            KeyMode::Repeat { interval: self.repeat_interval }
        } else {
            KeyMode::Hold
        }
    }

    pub fn key_table(&self) -> KeyTable {
        KeyTable::new(self.tracked_keys().into_iter().map(|k| (k, self.key_mode(k))))
    }

    pub fn extractor(&self) -> FingertipExtractor {
        FingertipExtractor {
            fingertips: self.fingertips.clone(),
            mirror: self.mirror,
            min_confidence: self.min_detection_confidence,
        }
    }
}
