//! Bulb controller transport abstraction.
//!
//! The wire encoding is owned by the transport implementation, the lights worker only
//! opens sessions and pushes frames through them.

use crate::{Frame, Result};

/// The trait allows to open sessions with a remote bulb controller.
pub trait Remote: Send + 'static {
    /// Type holding an open session. Should close the connection when dropped.
    type Session: RemoteSession;
    /// Opens a new session with the bulb controller on the given host.
    ///
    /// The controller knows the client under the given service name.
    fn open(&mut self, service_name: &str, host: &str) -> Result<Self::Session>;
}

/// An open session with a bulb controller.
pub trait RemoteSession {
    /// Shows the given frame on the bulbs.
    ///
    /// This call may block until the frame has been handed over to the controller.
    fn send_frame(&mut self, frame: &Frame) -> Result<()>;
}
