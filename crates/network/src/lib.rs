//! Xmas touchpad network layer
//!
//! This crate provides a TCP implementation of the bulb controller transport: the client side
//! used by the lights worker and the listener side which plays the bulb controller role.

// Linter configuration
#![warn(unsafe_code, clippy::pedantic, clippy::use_self)]
// Too many false positives.
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::missing_const_for_fn
)]

use std::time::Duration;

pub use xmas_touchpad_core as core;
use xmas_touchpad_core::{Error as TouchpadError, Result as TouchpadResult};

pub use crate::{
    client::{resolve, TcpRemote, TcpSession},
    listener::{Connection, Listener},
    packet::{Packet, PacketKind, PacketReader, HEADER_LEN, MAX_PAYLOAD_LEN},
};

mod client;
mod listener;
mod packet;

/// Default TCP port of the bulb controller.
pub const DEFAULT_PORT: u16 = 4321;
/// Maximum time to wait for the connection establishment.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(15);
/// Maximum time a single frame write may block.
pub const WRITE_TIMEOUT: Duration = Duration::from_secs(1);
