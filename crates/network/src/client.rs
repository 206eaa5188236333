//! Client side of the bulb controller transport.

use std::{
    io,
    net::{IpAddr, SocketAddr, TcpStream, ToSocketAddrs},
    time::Duration,
};

use xmas_touchpad_core::{Frame, Remote, RemoteSession};

use crate::{
    packet::{write_packet, PacketKind},
    TouchpadError, TouchpadResult, CONNECT_TIMEOUT, DEFAULT_PORT, WRITE_TIMEOUT,
};

/// Resolves the bulb controller host into a list of socket addresses.
///
/// The host may be a name or an IP address, optionally followed by a port; without a port the
/// given default port is used.
pub fn resolve(host: &str, default_port: u16) -> TouchpadResult<Vec<SocketAddr>> {
    let resolve_error = |err: io::Error| {
        log::debug!("Unable to resolve {host}: {err}");
        TouchpadError::AddressResolve(host.to_owned())
    };

    let addrs: Vec<_> = if let Ok(addr) = host.parse::<SocketAddr>() {
        vec![addr]
    } else if let Ok(ip) = host.parse::<IpAddr>() {
        vec![SocketAddr::new(ip, default_port)]
    } else if let Some((name, port)) = host
        .rsplit_once(':')
        .and_then(|(name, port)| Some((name, port.parse::<u16>().ok()?)))
    {
        (name, port).to_socket_addrs().map_err(resolve_error)?.collect()
    } else {
        (host, default_port)
            .to_socket_addrs()
            .map_err(resolve_error)?
            .collect()
    };

    if addrs.is_empty() {
        return Err(TouchpadError::AddressResolve(host.to_owned()));
    }
    Ok(addrs)
}

/// Opens TCP sessions with bulb controllers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TcpRemote {
    default_port: u16,
    connect_timeout: Duration,
    write_timeout: Duration,
}

impl Default for TcpRemote {
    fn default() -> Self {
        Self {
            default_port: DEFAULT_PORT,
            connect_timeout: CONNECT_TIMEOUT,
            write_timeout: WRITE_TIMEOUT,
        }
    }
}

impl TcpRemote {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the port used for hosts without an explicit port.
    #[must_use]
    pub fn with_default_port(mut self, port: u16) -> Self {
        self.default_port = port;
        self
    }

    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_write_timeout(mut self, timeout: Duration) -> Self {
        self.write_timeout = timeout;
        self
    }

    fn connect_to(&self, addr: &SocketAddr) -> io::Result<TcpStream> {
        log::debug!("Connecting to the {addr}");
        let stream = TcpStream::connect_timeout(addr, self.connect_timeout)?;
        log::debug!("Connected");

        stream.set_write_timeout(Some(self.write_timeout))?;
        stream.set_nodelay(true).ok();
        Ok(stream)
    }
}

impl Remote for TcpRemote {
    type Session = TcpSession;

    fn open(&mut self, service_name: &str, host: &str) -> TouchpadResult<Self::Session> {
        let mut last_error = None;
        for addr in resolve(host, self.default_port)? {
            match self.connect_to(&addr) {
                Ok(stream) => {
                    let mut session = TcpSession { addr, stream };
                    session.hello(service_name)?;
                    return Ok(session);
                }
                Err(err) => {
                    log::debug!("Unable to connect to the {addr}: {err}");
                    last_error = Some(err);
                }
            }
        }

        let err = last_error.unwrap_or_else(|| io::ErrorKind::AddrNotAvailable.into());
        Err(TouchpadError::connect(err))
    }
}

/// An open TCP session with a bulb controller, the connection is closed on drop.
#[derive(Debug)]
pub struct TcpSession {
    addr: SocketAddr,
    stream: TcpStream,
}

impl TcpSession {
    /// Returns the address of the bulb controller.
    pub fn peer_addr(&self) -> SocketAddr {
        self.addr
    }

    fn hello(&mut self, service_name: &str) -> TouchpadResult<()> {
        log::trace!("Introducing as {service_name} to the {}", self.addr);
        write_packet(&mut self.stream, PacketKind::Hello, service_name)
    }
}

impl RemoteSession for TcpSession {
    fn send_frame(&mut self, frame: &Frame) -> TouchpadResult<()> {
        write_packet(&mut self.stream, PacketKind::Frame, frame)
    }
}

#[cfg(test)]
mod tests {
    use std::net::{Ipv4Addr, Ipv6Addr};

    use super::*;

    #[test]
    fn test_resolve_ip_addresses() {
        assert_eq!(
            resolve("192.168.1.7", DEFAULT_PORT).unwrap(),
            [SocketAddr::from((Ipv4Addr::new(192, 168, 1, 7), DEFAULT_PORT))]
        );
        assert_eq!(
            resolve("192.168.1.7:80", DEFAULT_PORT).unwrap(),
            [SocketAddr::from((Ipv4Addr::new(192, 168, 1, 7), 80))]
        );
        assert_eq!(
            resolve("::1", 1234).unwrap(),
            [SocketAddr::from((Ipv6Addr::LOCALHOST, 1234))]
        );
        assert_eq!(
            resolve("[::1]:80", 1234).unwrap(),
            [SocketAddr::from((Ipv6Addr::LOCALHOST, 80))]
        );
    }

    #[test]
    fn test_resolve_host_names() {
        let addrs = resolve("localhost", 1234).unwrap();
        assert!(addrs.iter().all(|addr| addr.port() == 1234));

        let addrs = resolve("localhost:80", 1234).unwrap();
        assert!(addrs.iter().all(|addr| addr.port() == 80));
        assert!(addrs.iter().all(|addr| addr.ip().is_loopback()));
    }
}
