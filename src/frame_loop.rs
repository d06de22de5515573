//! The per-frame pipeline: fingertips → hit test → key state → injection.

use crate::config::Settings;
use crate::hit::{self, TouchSet};
use crate::inject::KeyInjector;
use crate::key::Key;
use crate::landmark::{DetectorFrame, FingertipExtractor};
use crate::layout::KeyZone;
use crate::state::{KeyCommand, KeyTable};
use anyhow::{Context, Result};
use log::{debug, info, warn};
use serde::Serialize;
use std::io::{BufRead, Write};
use std::time::Instant;

/// What happened in one frame. Also sent to the detector as overlay info.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FrameReport {
    pub touched: TouchSet,
    #[serde(skip)]
    pub commands: Vec<KeyCommand>,
    pub fps: u32,
}

#[derive(Serialize)]
struct ZonesMessage<'a> {
    zones: &'a [KeyZone],
}

/// Counts of what a whole run did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub frames: u64,
    pub malformed: u64,
    pub commands: u64,
    pub injection_errors: u64,
}

pub struct Controller<I> {
    settings: Settings,
    extractor: FingertipExtractor,
    zones: Vec<KeyZone>,
    zones_size: (u32, u32),
    keys: KeyTable,
    injector: I,
    last_frame_at: Option<Instant>,
    injection_errors: u64,
}

impl<I: KeyInjector> Controller<I> {
    pub fn new(settings: Settings, injector: I) -> Self {
        let size = (settings.frame.width, settings.frame.height);
        let zones = settings.layout.compute_zones(size.0, size.1);
        Self {
            extractor: settings.extractor(),
            keys: settings.key_table(),
            zones,
            zones_size: size,
            settings,
            injector,
            last_frame_at: None,
            injection_errors: 0,
        }
    }

    pub fn zones(&self) -> &[KeyZone] {
        &self.zones
    }

    pub fn keys(&self) -> &KeyTable {
        &self.keys
    }

    pub fn injector(&self) -> &I {
        &self.injector
    }

    /// Handle one detector frame observed at `now`.
    pub fn process(&mut self, frame: &DetectorFrame, now: Instant) -> FrameReport {
        let width = frame.width.unwrap_or(self.settings.frame.width).max(1);
        let height = frame.height.unwrap_or(self.settings.frame.height).max(1);
        if (width, height) != self.zones_size {
            info!("frame size changed to {width}x{height}, recomputing zones");
            self.zones = self.settings.layout.compute_zones(width, height);
            self.zones_size = (width, height);
        }

        let hands_detected = self.extractor.confident_hands(&frame.hands).next().is_some();
        let points = self.extractor.points(&frame.hands, width, height);
        let touched = hit::locate_all(&points, &self.zones);
        let commands = self.keys.update(&touched, hands_detected, now);
        self.inject(&commands);

        let fps = self
            .last_frame_at
            .map(|prev| now.saturating_duration_since(prev).as_secs_f64())
            .filter(|dt| *dt > 0.0)
            .map_or(0, |dt| (1.0 / dt).round() as u32);
        self.last_frame_at = Some(now);

        if !commands.is_empty() {
            debug!("touched {:?} -> {:?} ({fps} fps)", touched, commands);
        }
        FrameReport { touched, commands, fps }
    }

    /// Release anything still held.
    pub fn shutdown(&mut self) {
        let commands = self.keys.release_all();
        if !commands.is_empty() {
            info!("releasing {} held key(s) on shutdown", commands.len());
        }
        self.inject(&commands);
    }

    fn inject(&mut self, commands: &[KeyCommand]) {
        for cmd in commands {
            if let Err(e) = cmd.apply(&mut self.injector) {
                self.injection_errors += 1;
                warn!("failed to send {:?}: {e:#}", cmd);
            }
        }
    }

    /// Read detector frames until end of input or an exit frame.
    ///
    /// When `overlay` is given the zones are written to it once, then one
    /// report line per frame. A broken overlay pipe only disables overlays.
    /// Held keys are released before returning, including when reading the
    /// input fails.
    pub fn run(&mut self, input: impl BufRead, mut overlay: Option<&mut dyn Write>) -> Result<RunSummary> {
        let mut summary = RunSummary::default();

        send_overlay(&mut overlay, &ZonesMessage { zones: &self.zones });
        let read = self.read_frames(input, &mut overlay, &mut summary);

        self.shutdown();
        summary.injection_errors = self.injection_errors;
        info!(
            "processed {} frame(s), {} malformed, {} key command(s)",
            summary.frames, summary.malformed, summary.commands
        );
        read.map(|()| summary)
    }

    fn read_frames(
        &mut self,
        input: impl BufRead,
        overlay: &mut Option<&mut dyn Write>,
        summary: &mut RunSummary,
    ) -> Result<()> {
        for line in input.lines() {
            let line = line.context("failed to read detector output")?;
            if line.trim().is_empty() {
                continue;
            }
            let frame = match DetectorFrame::parse(&line) {
                Ok(frame) => frame,
                Err(e) => {
                    summary.malformed += 1;
                    warn!("{e:#}");
                    DetectorFrame::default()
                }
            };
            if frame.exit {
                info!("detector requested exit");
                break;
            }

            summary.frames += 1;
            let report = self.process(&frame, Instant::now());
            summary.commands += report.commands.len() as u64;

            send_overlay(overlay, &report);
        }
        Ok(())
    }

    pub fn held_keys(&self) -> Vec<Key> {
        self.keys.held_keys().collect()
    }
}

fn send_overlay<T: Serialize>(overlay: &mut Option<&mut dyn Write>, msg: &T) {
    let Some(out) = overlay.as_deref_mut() else {
        return;
    };
    if let Err(e) = write_line(out, msg) {
        warn!("overlay disabled: {e:#}");
        *overlay = None;
    }
}

fn write_line<T: Serialize>(out: &mut dyn Write, msg: &T) -> Result<()> {
    serde_json::to_writer(&mut *out, msg)?;
    out.write_all(b"\n")?;
    out.flush()?;
    Ok(())
}
