//! # hand2uinput
//!
//! Turns a webcam into a piano-tile keyboard. An external hand detector
//! reports fingertip landmarks per video frame; fingertips resting in an
//! on-screen zone hold the matching key down through a virtual keyboard.
//!
//! | Zone | Key | Behaviour |
//! |---|---|---|
//! | four lanes | `d f j k` | held while touched |
//! | backtick, enter triggers | `` ` `` `enter` | held while touched |
//! | up, down triggers | `up` `down` | tapped repeatedly while touched |
//!
//! Losing every hand releases all held keys.

pub mod config;
pub mod detector;
pub mod frame_loop;
pub mod hit;
pub mod inject;
pub mod key;
pub mod landmark;
pub mod layout;
#[cfg(all(target_os = "linux", feature = "uinput"))]
pub mod linux;
pub mod state;
