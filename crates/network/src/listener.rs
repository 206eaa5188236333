//! Bulb controller side of the transport.

use std::net::{Shutdown, SocketAddr, TcpListener, TcpStream, ToSocketAddrs};

use crate::{packet::PacketReader, Packet, TouchpadError, TouchpadResult};

/// Accepts incoming touchpad connections.
#[derive(Debug)]
pub struct Listener {
    socket: TcpListener,
}

impl Listener {
    /// Binds a new listener to the given address.
    pub fn bind(addr: impl ToSocketAddrs) -> TouchpadResult<Self> {
        let socket = TcpListener::bind(addr).map_err(TouchpadError::connect)?;
        Ok(Self { socket })
    }

    pub fn local_addr(&self) -> TouchpadResult<SocketAddr> {
        self.socket.local_addr().map_err(TouchpadError::connect)
    }

    /// Waits for a new incoming connection.
    pub fn accept(&self) -> TouchpadResult<(SocketAddr, Connection)> {
        let (stream, address) = self.socket.accept().map_err(TouchpadError::connect)?;

        log::info!("Accepted incoming connection with the {address}");
        Ok((address, Connection::new(stream)))
    }
}

/// An accepted touchpad connection.
///
/// The connection is closed after the first malformed packet, the stream position is
/// unknown after that.
#[derive(Debug)]
pub struct Connection {
    reader: PacketReader<TcpStream>,
    closed: bool,
}

impl Connection {
    fn new(stream: TcpStream) -> Self {
        Self {
            reader: PacketReader::new(stream),
            closed: false,
        }
    }

    /// Waits for the next packet.
    ///
    /// Returns `Ok(None)` once the connection is closed by either side.
    pub fn next_packet(&mut self) -> TouchpadResult<Option<Packet>> {
        if self.closed {
            return Ok(None);
        }

        let packet = self.reader.read_packet();
        match &packet {
            Ok(Some(_)) => {}
            Ok(None) => self.closed = true,
            Err(err) => {
                log::debug!("Closing connection after error: {err}");
                self.close();
            }
        }
        packet
    }

    fn close(&mut self) {
        self.closed = true;
        self.reader.get_ref().shutdown(Shutdown::Both).ok();
    }
}

impl Iterator for Connection {
    type Item = TouchpadResult<Packet>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_packet().transpose()
    }
}
