//! Packets exchanged between the touchpad and the bulb controller.
//!
//! Each packet consists of a one byte kind, a little endian `u32` payload length and the
//! `postcard` encoded payload.

use std::io::{self, Read, Write};

use serde::Serialize;
use xmas_touchpad_core::Frame;

use crate::{TouchpadError, TouchpadResult};

type PayloadLength = u32;

const PAYLOAD_LEN_BYTES: usize = std::mem::size_of::<PayloadLength>();

/// Length of the packet header: the kind byte and the payload length.
pub const HEADER_LEN: usize = PAYLOAD_LEN_BYTES + 1;
/// Maximum acceptable payload length.
pub const MAX_PAYLOAD_LEN: usize = 64 * 1024;

/// Kind of the packet payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum PacketKind {
    /// Service name of the client, sent once right after the connection is open.
    Hello = 0,
    /// A frame to show on the bulbs.
    Frame = 1,
}

impl TryFrom<u8> for PacketKind {
    type Error = TouchpadError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Hello),
            1 => Ok(Self::Frame),
            other => Err(TouchpadError::decode(format_args!(
                "unknown packet kind {other}"
            ))),
        }
    }
}

/// A decoded packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Packet {
    Hello(String),
    Frame(Frame),
}

impl Packet {
    pub fn kind(&self) -> PacketKind {
        match self {
            Self::Hello(_) => PacketKind::Hello,
            Self::Frame(_) => PacketKind::Frame,
        }
    }

    /// Encodes the whole packet including its header.
    pub fn encode(&self) -> TouchpadResult<Vec<u8>> {
        match self {
            Self::Hello(service_name) => encode_packet(self.kind(), service_name.as_str()),
            Self::Frame(frame) => encode_packet(self.kind(), frame),
        }
    }

    /// Decodes the packet payload of the given kind.
    pub fn decode(kind: PacketKind, payload: &[u8]) -> TouchpadResult<Self> {
        let packet = match kind {
            PacketKind::Hello => {
                Self::Hello(postcard::from_bytes(payload).map_err(TouchpadError::decode)?)
            }
            PacketKind::Frame => {
                Self::Frame(postcard::from_bytes(payload).map_err(TouchpadError::decode)?)
            }
        };
        Ok(packet)
    }
}

/// Encodes a packet with the given kind and payload.
pub(crate) fn encode_packet<T>(kind: PacketKind, payload: &T) -> TouchpadResult<Vec<u8>>
where
    T: Serialize + ?Sized,
{
    let payload = postcard::to_allocvec(payload).map_err(TouchpadError::encode)?;
    if payload.len() > MAX_PAYLOAD_LEN {
        return Err(TouchpadError::encode(format_args!(
            "payload is too large: {} bytes",
            payload.len()
        )));
    }
    let payload_len = payload.len() as PayloadLength;

    let mut buf = Vec::with_capacity(HEADER_LEN + payload.len());
    buf.push(kind as u8);
    buf.extend_from_slice(&payload_len.to_le_bytes());
    buf.extend_from_slice(&payload);
    Ok(buf)
}

/// Writes an encoded packet to the given device.
pub(crate) fn write_packet<W, T>(mut device: W, kind: PacketKind, payload: &T) -> TouchpadResult<()>
where
    W: Write,
    T: Serialize + ?Sized,
{
    let packet = encode_packet(kind, payload)?;
    log::trace!("Sending {kind:?} packet, {} bytes", packet.len());

    device
        .write_all(&packet)
        .and_then(|()| device.flush())
        .map_err(TouchpadError::transmit)
}

/// Reads packets from the underlying device.
#[derive(Debug)]
pub struct PacketReader<R> {
    inner: R,
    payload: Vec<u8>,
}

impl<R: Read> PacketReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            payload: Vec::new(),
        }
    }

    /// Reads the next packet.
    ///
    /// Returns `Ok(None)` if the device has been closed between packets.
    pub fn read_packet(&mut self) -> TouchpadResult<Option<Packet>> {
        let mut header = [0_u8; HEADER_LEN];
        match self.inner.read_exact(&mut header) {
            Ok(()) => {}
            Err(err) if err.kind() == io::ErrorKind::UnexpectedEof => return Ok(None),
            Err(err) => return Err(TouchpadError::transmit(err)),
        }

        let kind = PacketKind::try_from(header[0])?;
        let mut len_buf = [0_u8; PAYLOAD_LEN_BYTES];
        len_buf.copy_from_slice(&header[1..]);
        let payload_len = PayloadLength::from_le_bytes(len_buf) as usize;
        if payload_len > MAX_PAYLOAD_LEN {
            return Err(TouchpadError::decode(format_args!(
                "payload is too large: {payload_len} bytes"
            )));
        }

        self.payload.resize(payload_len, 0);
        self.inner
            .read_exact(&mut self.payload)
            .map_err(TouchpadError::transmit)?;

        log::trace!("Got {kind:?} packet with {payload_len} bytes payload");
        Packet::decode(kind, &self.payload).map(Some)
    }

    pub fn get_ref(&self) -> &R {
        &self.inner
    }
}

#[cfg(test)]
mod tests {
    use xmas_touchpad_core::{BulbColor, FrameBulb};

    use super::*;

    fn frame() -> Frame {
        Frame {
            bulbs: vec![
                FrameBulb {
                    index: 3,
                    color: BulbColor::new(15, 8, 0, 255),
                },
                FrameBulb {
                    index: 300,
                    color: BulbColor::BLACK,
                },
            ],
        }
    }

    #[test]
    fn test_hello_layout() {
        let packet = Packet::Hello("touchpad".to_owned()).encode().unwrap();

        assert_eq!(packet[0], 0);
        assert_eq!(&packet[1..HEADER_LEN], &9_u32.to_le_bytes());
        // Postcard encodes a string as a varint length followed by the bytes.
        assert_eq!(packet[HEADER_LEN], 8);
        assert_eq!(&packet[HEADER_LEN + 1..], b"touchpad");
    }

    #[test]
    fn test_frame_layout() {
        let packet = Packet::Frame(frame()).encode().unwrap();

        assert_eq!(packet[0], 1);
        let payload_len = u32::from_le_bytes(packet[1..HEADER_LEN].try_into().unwrap());
        assert_eq!(payload_len as usize, packet.len() - HEADER_LEN);
        assert_eq!(
            postcard::from_bytes::<Frame>(&packet[HEADER_LEN..]).unwrap(),
            frame()
        );
    }

    #[test]
    fn test_read_packet_sequence() {
        let mut stream = Vec::new();
        write_packet(&mut stream, PacketKind::Hello, "touchpad").unwrap();
        write_packet(&mut stream, PacketKind::Frame, &frame()).unwrap();
        write_packet(&mut stream, PacketKind::Frame, &Frame::default()).unwrap();

        let mut reader = PacketReader::new(stream.as_slice());
        assert_eq!(
            reader.read_packet().unwrap(),
            Some(Packet::Hello("touchpad".to_owned()))
        );
        assert_eq!(reader.read_packet().unwrap(), Some(Packet::Frame(frame())));
        assert_eq!(
            reader.read_packet().unwrap(),
            Some(Packet::Frame(Frame::default()))
        );
        assert_eq!(reader.read_packet().unwrap(), None);
    }

    #[test]
    fn test_reject_malformed_packets() {
        let mut unknown_kind = Packet::Frame(frame()).encode().unwrap();
        unknown_kind[0] = 7;
        assert!(matches!(
            PacketReader::new(unknown_kind.as_slice()).read_packet(),
            Err(TouchpadError::Decode)
        ));

        let mut oversized = vec![1_u8];
        oversized.extend_from_slice(&(MAX_PAYLOAD_LEN as u32 + 1).to_le_bytes());
        assert!(matches!(
            PacketReader::new(oversized.as_slice()).read_packet(),
            Err(TouchpadError::Decode)
        ));

        let mut truncated = Packet::Frame(frame()).encode().unwrap();
        truncated.pop();
        assert!(matches!(
            PacketReader::new(truncated.as_slice()).read_packet(),
            Err(TouchpadError::Transmit(_))
        ));

        let mut garbage = vec![1_u8];
        garbage.extend_from_slice(&2_u32.to_le_bytes());
        garbage.extend_from_slice(&[0xff, 0xff]);
        assert!(matches!(
            PacketReader::new(garbage.as_slice()).read_packet(),
            Err(TouchpadError::Decode)
        ));
    }
}
