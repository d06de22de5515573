//! Per-key hold / repeat state machine.
//!
//! Fed once per frame with the set of touched keys. Hold keys are pressed on
//! contact and released when contact ends; repeat keys are tapped at most once
//! per interval while contact lasts. A frame without any detected hand
//! releases every held key so tracking loss never leaves a key stuck down.

use crate::hit::TouchSet;
use crate::key::Key;
use log::debug;
use std::collections::BTreeMap;
use std::time::{Duration, Instant};

/// How a key reacts to sustained contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyMode {
    /// Press on entry, release on exit.
    Hold,
    /// Independent press+release taps, rate-limited to `interval`.
    Repeat { interval: Duration },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyState {
    pub held: bool,
    /// Time of the last repeat tap. Always `None` for hold keys.
    pub last_fired_at: Option<Instant>,
}

/// A decision to hand to the key injector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCommand {
    Press(Key),
    Release(Key),
    Tap(Key),
}

#[derive(Debug, Clone)]
struct Entry {
    mode: KeyMode,
    state: KeyState,
}

/// State of every tracked key. Owned by the frame loop.
#[derive(Debug, Clone, Default)]
pub struct KeyTable {
    entries: BTreeMap<Key, Entry>,
}

impl KeyTable {
    pub fn new(modes: impl IntoIterator<Item = (Key, KeyMode)>) -> Self {
        let entries = modes
            .into_iter()
            .map(|(key, mode)| (key, Entry { mode, state: KeyState::default() }))
            .collect();
        Self { entries }
    }

    pub fn mode(&self, key: Key) -> Option<KeyMode> {
        self.entries.get(&key).map(|e| e.mode)
    }

    pub fn state(&self, key: Key) -> Option<KeyState> {
        self.entries.get(&key).map(|e| e.state)
    }

    pub fn held_keys(&self) -> impl Iterator<Item = Key> + '_ {
        self.entries
            .iter()
            .filter(|(_, e)| e.state.held)
            .map(|(&k, _)| k)
    }

    /// Advance every key by one frame and return the commands to inject.
    ///
    /// Keys not tracked by this table are ignored even if touched.
    pub fn update(&mut self, touched: &TouchSet, hands_detected: bool, now: Instant) -> Vec<KeyCommand> {
        if !hands_detected {
            let released = self.release_all();
            if !released.is_empty() {
                debug!("no hands in frame, force-released {} key(s)", released.len());
            }
            return released;
        }

        let mut commands = Vec::new();
        for (&key, entry) in self.entries.iter_mut() {
            let is_touched = touched.contains(&key);
            let state = &mut entry.state;
            match entry.mode {
                KeyMode::Hold => {
                    if is_touched && !state.held {
                        state.held = true;
                        commands.push(KeyCommand::Press(key));
                    } else if !is_touched && state.held {
                        state.held = false;
                        commands.push(KeyCommand::Release(key));
                    }
                }
                KeyMode::Repeat { interval } => {
                    if !is_touched {
                        continue;
                    }
                    let due = state
                        .last_fired_at
                        .map_or(true, |last| now.saturating_duration_since(last) >= interval);
                    if due {
                        state.last_fired_at = Some(now);
                        commands.push(KeyCommand::Tap(key));
                    }
                }
            }
        }
        commands
    }

    /// Release every held key. Repeat timers are left untouched.
    pub fn release_all(&mut self) -> Vec<KeyCommand> {
        self.entries
            .iter_mut()
            .filter(|(_, e)| e.state.held)
            .map(|(&key, e)| {
                e.state.held = false;
                KeyCommand::Release(key)
            })
            .collect()
    }
}
