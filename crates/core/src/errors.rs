use std::io;

use displaydoc::Display;

/// A specialized result type for the touchpad.
pub type Result<T> = core::result::Result<T, Error>;

/// Errors that can occur while talking to the bulb controller.
#[derive(Debug, Display)]
pub enum Error {
    /// Unable to resolve the bulb controller address `{0}`.
    AddressResolve(String),
    /// Unable to connect to the bulb controller: {0}
    Connect(io::Error),
    /// Unable to transmit data to the bulb controller: {0}
    Transmit(io::Error),
    /// Data encoding error.
    Encode,
    /// Data decoding error.
    Decode,
    /// Unable to spawn a worker thread: {0}
    Spawn(io::Error),
}

impl Error {
    /// Creates a new connection establishment error.
    pub fn connect(err: io::Error) -> Self {
        Self::Connect(err)
    }

    /// Creates a new transmission error.
    pub fn transmit(err: io::Error) -> Self {
        Self::Transmit(err)
    }

    /// Creates a new encode data error.
    pub fn encode<E>(err: E) -> Self
    where
        E: core::fmt::Display,
    {
        log::trace!("Encode error: {err}");
        Self::Encode
    }

    /// Creates a new decode data error.
    pub fn decode<E>(err: E) -> Self
    where
        E: core::fmt::Display,
    {
        log::trace!("Decode error: {err}");
        Self::Decode
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Connect(err) | Self::Transmit(err) | Self::Spawn(err) => Some(err),
            Self::AddressResolve(_) | Self::Encode | Self::Decode => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use super::*;

    #[test]
    fn test_display_messages() {
        assert_eq!(
            Error::AddressResolve("bulbs.local".to_owned()).to_string(),
            "Unable to resolve the bulb controller address `bulbs.local`."
        );

        let err = Error::transmit(io::Error::new(io::ErrorKind::BrokenPipe, "pipe closed"));
        assert_eq!(
            err.to_string(),
            "Unable to transmit data to the bulb controller: pipe closed"
        );
        assert!(err.source().is_some());
        assert!(Error::Decode.source().is_none());
    }
}
