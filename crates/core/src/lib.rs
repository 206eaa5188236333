//! Xmas touchpad core types
//!
//! This crate contains the pure part of the touch-to-light pipeline: colors and their
//! mapping to the bulb controller representation, per-bulb animations, commands, frames
//! and the transport traits. It does not spawn threads or perform any I/O by itself.

// Linter configuration
#![warn(unsafe_code, clippy::pedantic, clippy::use_self)]
// Too many false positives.
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::missing_const_for_fn,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]

pub use crate::{
    animation::{Animations, Fader, Producer},
    color::{Argb, BulbColor, Hsv},
    command::{Command, Frame, FrameBulb, Status},
    config::LightsConfig,
    errors::{Error, Error as TouchpadError, Result, Result as TouchpadResult},
    remote::{Remote, RemoteSession},
};

pub mod animation;
pub mod color;
pub mod command;
pub mod config;
pub mod errors;
pub mod remote;

/// The number of bulbs in the controller's bulb array.
pub const BULB_COUNT: u16 = 100;
/// Default number of render ticks a bulb needs to fade out.
pub const DEFAULT_FADE_STEPS: u32 = 50;
/// Name under which the touchpad introduces itself to the bulb controller.
pub const DEFAULT_SERVICE_NAME: &str = "touchpad";
