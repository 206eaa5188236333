//! Commands, frames and status messages exchanged between the touch surface, the lights
//! worker and the bulb controller.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::{Argb, BulbColor};

/// Intent submitted by a touch producer to the lights worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Open a new session with the bulb controller on the given host.
    Connect { host: String },
    /// Light the bulb with a solid color.
    SetColor { bulb: u16, color: Argb },
    /// Fade the bulb out, starting from its last committed color.
    Fade { bulb: u16 },
    /// Stop the lights worker.
    Quit,
}

/// A single lit bulb within a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameBulb {
    pub index: u16,
    pub color: BulbColor,
}

/// Colors of every bulb that has an active animation during one render tick.
///
/// Bulbs are sorted by index; bulbs without an animation are not included.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Frame {
    pub bulbs: Vec<FrameBulb>,
}

impl Frame {
    /// Returns the color of the bulb with the given index, if it is lit in this frame.
    pub fn get(&self, index: u16) -> Option<BulbColor> {
        self.bulbs
            .binary_search_by_key(&index, |bulb| bulb.index)
            .ok()
            .map(|pos| self.bulbs[pos].color)
    }

    pub fn len(&self) -> usize {
        self.bulbs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bulbs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FrameBulb> {
        self.bulbs.iter()
    }
}

impl FromIterator<FrameBulb> for Frame {
    fn from_iter<T: IntoIterator<Item = FrameBulb>>(iter: T) -> Self {
        let mut bulbs: Vec<_> = iter.into_iter().collect();
        bulbs.sort_by_key(|bulb| bulb.index);
        Self { bulbs }
    }
}

/// Connection status reported to the touch surface.
///
/// The [`Display`](fmt::Display) representation is the human readable status line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Connecting { host: String },
    Connected { host: String, seconds: u64 },
    Disconnected,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connecting { host } => write!(f, "Connecting to {host}"),
            Self::Connected { host, seconds } => write!(f, "Connected to {host} ({seconds} seconds)"),
            Self::Disconnected => f.write_str("Disconnected"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_lines() {
        let host = "xmas.local".to_owned();
        assert_eq!(
            Status::Connecting { host: host.clone() }.to_string(),
            "Connecting to xmas.local"
        );
        assert_eq!(
            Status::Connected { host, seconds: 12 }.to_string(),
            "Connected to xmas.local (12 seconds)"
        );
        assert_eq!(Status::Disconnected.to_string(), "Disconnected");
    }

    #[test]
    fn test_frame_lookup() {
        let frame: Frame = [7, 2, 40]
            .into_iter()
            .map(|index| FrameBulb {
                index,
                color: BulbColor::new(index as u8 % 16, 0, 0, 255),
            })
            .collect();

        assert_eq!(frame.len(), 3);
        assert_eq!(frame.bulbs[0].index, 2);
        assert_eq!(frame.get(7), Some(BulbColor::new(7, 0, 0, 255)));
        assert_eq!(frame.get(8), None);
    }
}
