//! Xmas touchpad application
//!
//! Turns touches into lighting commands and renders them on a remote bulb controller.
//!
//! The touch side ([`TouchPad`] and its [`Orb`]s) never blocks: it just pushes commands into
//! an unbounded queue. A single lights worker thread owns the controller session, the bulb
//! state and the active animations; it renders one frame per tick and applies the queued
//! commands between frames.

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

pub use xmas_touchpad_core as core;
pub use xmas_touchpad_core::{TouchpadError, TouchpadResult};

pub use crate::{
    lights::{spawn, Lights, StatusSink, WorkerHandle},
    queue::{command_queue, CommandReceiver, CommandSender},
    touch::{bulb_index, palette_color, Orb, TouchAction, TouchEvent, TouchPad, ViewSize, PALETTE},
};

mod lights;
mod queue;
mod status;
mod touch;
