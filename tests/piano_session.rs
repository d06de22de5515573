//! Integration tests: detector JSON lines → controller → injected key events.

use anyhow::Result;
use hand2uinput::config::{Config, Preset, Settings};
use hand2uinput::frame_loop::Controller;
use hand2uinput::hit::{locate, Point};
use hand2uinput::inject::KeyInjector;
use hand2uinput::key::Key;
use hand2uinput::landmark::{DetectorFrame, Mirror};
use hand2uinput::layout::KeyZone;
use pretty_assertions::assert_eq;
use std::io::Cursor;
use std::path::Path;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Event {
    Press(Key),
    Release(Key),
    Tap(Key),
}

#[derive(Default)]
struct Recorder {
    events: Vec<Event>,
    fail_on: Option<Key>,
}

impl KeyInjector for Recorder {
    fn press(&mut self, key: Key) -> Result<()> {
        if self.fail_on == Some(key) {
            anyhow::bail!("device gone");
        }
        self.events.push(Event::Press(key));
        Ok(())
    }

    fn release(&mut self, key: Key) -> Result<()> {
        self.events.push(Event::Release(key));
        Ok(())
    }

    fn tap(&mut self, key: Key) -> Result<()> {
        self.events.push(Event::Tap(key));
        Ok(())
    }
}

fn unmirrored(preset: Preset) -> Settings {
    let mut s = preset.settings();
    s.mirror = Mirror::None;
    s
}

/// A detector line with one index fingertip at pixel (x, y) of a 640x480 frame.
fn touch_line(x: i32, y: i32) -> String {
    let mut landmarks = vec![r#"{"x":0.0,"y":0.0,"z":0.0}"#.to_string(); 21];
    landmarks[8] = format!(
        r#"{{"x":{},"y":{},"z":0.0}}"#,
        (x as f32 + 0.5) / 640.0,
        (y as f32 + 0.5) / 480.0
    );
    format!(
        r#"{{"width":640,"height":480,"hands":[{{"handedness":"Right","score":0.9,"landmarks":[{}]}}]}}"#,
        landmarks.join(",")
    )
}

const OPEN_HAND: &str = r#"{"width":640,"height":480,"hands":[{"score":0.9,"landmarks":[]}]}"#;
const NO_HANDS: &str = r#"{"width":640,"height":480,"hands":[]}"#;

fn run_lines(settings: Settings, lines: &[String]) -> (Vec<Event>, Controller<Recorder>) {
    let mut controller = Controller::new(settings, Recorder::default());
    let input = Cursor::new(lines.join("\n"));
    controller.run(input, None).unwrap();
    let events = controller.injector().events.clone();
    (events, controller)
}

// ─── layout ──────────────────────────────────────────────────────────────

#[test]
fn zones_fit_the_frame_and_never_overlap() {
    for preset in [Preset::Classic, Preset::Wide, Preset::Clean] {
        let layout = preset.settings().layout;
        for width in (1..=2200).step_by(53) {
            for height in (1..=1300).step_by(41) {
                let zones = layout.compute_zones(width, height);
                for (i, a) in zones.iter().enumerate() {
                    assert!(
                        a.x1 >= 0 && a.y1 >= 0 && a.x2 < width as i32 && a.y2 < height as i32,
                        "{preset:?} {width}x{height}: {a:?} out of frame"
                    );
                    for b in &zones[i + 1..] {
                        assert!(!a.overlaps(b), "{preset:?} {width}x{height}: {a:?} overlaps {b:?}");
                    }
                }
            }
        }
    }
}

#[test]
fn presets_keep_every_zone_at_native_resolution() {
    for preset in [Preset::Classic, Preset::Wide, Preset::Clean] {
        let s = preset.settings();
        let zones = s.layout.compute_zones(s.frame.width, s.frame.height);
        let labels: Vec<Key> = zones.iter().map(|z| z.label).collect();
        assert_eq!(labels, s.tracked_keys(), "{preset:?}");
    }
}

#[test]
fn classic_lane_hit_examples() {
    let s = Preset::Classic.settings();
    let zones = s.layout.compute_zones(640, 480);
    assert_eq!(zones[0], KeyZone::new(Key::D, 100, 360, 200, 440));
    assert_eq!(locate(Point::new(150, 400), &zones), Some(Key::D));
    assert_eq!(locate(Point::new(99, 400), &zones), None);
    assert_eq!(locate(Point::new(200, 400), &zones), Some(Key::D));
    assert_eq!(locate(Point::new(100, 360), &zones), Some(Key::D));
    assert_eq!(locate(Point::new(550, 200), &zones), Some(Key::Up));
}

// ─── hold keys ───────────────────────────────────────────────────────────

#[test]
fn hold_key_touch_touch_untouch() {
    let lines = vec![touch_line(150, 400), touch_line(160, 410), OPEN_HAND.to_string()];
    let (events, controller) = run_lines(unmirrored(Preset::Classic), &lines);
    assert_eq!(events, vec![Event::Press(Key::D), Event::Release(Key::D)]);
    assert!(controller.held_keys().is_empty());
}

#[test]
fn sliding_between_lanes_releases_then_presses() {
    let lines = vec![touch_line(150, 400), touch_line(250, 400), NO_HANDS.to_string()];
    let (events, _) = run_lines(unmirrored(Preset::Classic), &lines);
    assert_eq!(
        events,
        vec![
            Event::Press(Key::D),
            Event::Release(Key::D),
            Event::Press(Key::F),
            Event::Release(Key::F),
        ]
    );
}

#[test]
fn losing_the_hand_releases_exactly_once() {
    let lines = vec![
        touch_line(30, 30),
        NO_HANDS.to_string(),
        NO_HANDS.to_string(),
        NO_HANDS.to_string(),
    ];
    let (events, _) = run_lines(unmirrored(Preset::Classic), &lines);
    assert_eq!(events, vec![Event::Press(Key::Backtick), Event::Release(Key::Backtick)]);
}

#[test]
fn end_of_stream_releases_held_keys() {
    let lines = vec![touch_line(550, 130)];
    let (events, _) = run_lines(unmirrored(Preset::Classic), &lines);
    assert_eq!(events, vec![Event::Press(Key::Enter), Event::Release(Key::Enter)]);
}

#[test]
fn exit_frame_stops_before_later_frames() {
    let lines = vec![
        touch_line(150, 400),
        r#"{"exit": true}"#.to_string(),
        touch_line(250, 400),
    ];
    let (events, _) = run_lines(unmirrored(Preset::Classic), &lines);
    assert_eq!(events, vec![Event::Press(Key::D), Event::Release(Key::D)]);
}

#[test]
fn malformed_line_counts_as_no_hands() {
    let mut controller = Controller::new(unmirrored(Preset::Classic), Recorder::default());
    let input = Cursor::new([touch_line(150, 400), "{oops".to_string(), String::new()].join("\n"));
    let summary = controller.run(input, None).unwrap();
    assert_eq!(summary.frames, 2);
    assert_eq!(summary.malformed, 1);
    assert_eq!(
        controller.injector().events,
        vec![Event::Press(Key::D), Event::Release(Key::D)]
    );
}

#[test]
fn unreadable_input_still_releases_held_keys() {
    let mut controller = Controller::new(unmirrored(Preset::Classic), Recorder::default());
    let mut bytes = touch_line(150, 400).into_bytes();
    bytes.extend_from_slice(b"\n\xff\xfe garbage\n");
    let err = controller.run(Cursor::new(bytes), None).unwrap_err();
    assert!(format!("{err:#}").contains("failed to read detector output"));
    assert_eq!(
        controller.injector().events,
        vec![Event::Press(Key::D), Event::Release(Key::D)]
    );
    assert!(controller.held_keys().is_empty());
}

#[test]
fn injection_failures_are_counted_not_fatal() {
    let recorder = Recorder { fail_on: Some(Key::D), ..Recorder::default() };
    let mut controller = Controller::new(unmirrored(Preset::Classic), recorder);
    let input = Cursor::new([touch_line(150, 400), touch_line(350, 400)].join("\n"));
    let summary = controller.run(input, None).unwrap();
    assert_eq!(summary.injection_errors, 1);
    assert!(controller.injector().events.contains(&Event::Press(Key::J)));
}

// ─── repeat keys ─────────────────────────────────────────────────────────

#[test]
fn repeat_key_taps_floor_d_over_i_plus_one() {
    let interval = Duration::from_millis(100);
    let mut settings = unmirrored(Preset::Classic);
    settings.repeat_interval = interval;
    let mut controller = Controller::new(settings, Recorder::default());
    let frame = DetectorFrame::parse(&touch_line(550, 290)).unwrap();

    let t0 = Instant::now();
    let held_for = Duration::from_millis(500);
    let mut now = t0;
    while now <= t0 + held_for {
        controller.process(&frame, now);
        now += Duration::from_millis(25);
    }

    let events = &controller.injector().events;
    assert_eq!(events.len(), 6);
    assert!(events.iter().all(|e| *e == Event::Tap(Key::Down)));
    assert!(controller.held_keys().is_empty());
}

#[test]
fn repeat_key_is_silent_between_intervals() {
    let mut controller = Controller::new(unmirrored(Preset::Classic), Recorder::default());
    let up = DetectorFrame::parse(&touch_line(550, 200)).unwrap();
    let t0 = Instant::now();
    controller.process(&up, t0);
    controller.process(&up, t0 + Duration::from_millis(50));
    controller.process(&up, t0 + Duration::from_millis(99));
    assert_eq!(controller.injector().events, vec![Event::Tap(Key::Up)]);
}

// ─── overlay + config ────────────────────────────────────────────────────

#[test]
fn overlay_gets_zones_then_one_report_per_frame() {
    let mut controller = Controller::new(unmirrored(Preset::Classic), Recorder::default());
    let input = Cursor::new([touch_line(150, 400), NO_HANDS.to_string()].join("\n"));
    let mut overlay: Vec<u8> = Vec::new();
    controller.run(input, Some(&mut overlay)).unwrap();

    let text = String::from_utf8(overlay).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with(r#"{"zones":[{"label":"d","x1":100,"y1":360,"x2":200,"y2":440}"#));
    assert_eq!(lines[1], r#"{"touched":["d"],"fps":0}"#);
    assert!(lines[2].starts_with(r#"{"touched":[],"fps":"#));
}

#[test]
fn shipped_config_file_loads() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("config.yaml");
    let settings = Config::load(&path).unwrap().resolve(None).unwrap();
    assert_eq!(settings, Preset::Classic.settings());
}
