use std::{io::Write, net::TcpStream, thread::JoinHandle};

use xmas_touchpad_core::{BulbColor, Frame, FrameBulb, Remote, RemoteSession, TouchpadError};
use xmas_touchpad_network::{Listener, Packet, TcpRemote, MAX_PAYLOAD_LEN};

fn create_loopback() -> anyhow::Result<(String, JoinHandle<Vec<Packet>>)> {
    let _ = env_logger::try_init();

    let listener = Listener::bind("127.0.0.1:0")?;
    let host = listener.local_addr()?.to_string();

    let handle = std::thread::spawn(move || {
        let (_, connection) = listener.accept().unwrap();
        connection.map(Result::unwrap).collect()
    });
    Ok((host, handle))
}

fn frame(bulbs: &[(u16, BulbColor)]) -> Frame {
    bulbs
        .iter()
        .map(|&(index, color)| FrameBulb { index, color })
        .collect()
}

#[test]
fn test_send_frames() {
    let (host, handle) = create_loopback().unwrap();

    let frames = [
        frame(&[(3, BulbColor::new(15, 0, 0, 255))]),
        Frame::default(),
        frame(&[(1, BulbColor::BLACK), (99, BulbColor::new(1, 2, 3, 4))]),
    ];

    let mut session = TcpRemote::new().open("touchpad", &host).unwrap();
    for frame in &frames {
        session.send_frame(frame).unwrap();
    }
    drop(session);

    let packets = handle.join().unwrap();
    assert_eq!(packets[0], Packet::Hello("touchpad".to_owned()));
    assert_eq!(
        packets[1..],
        frames.map(Packet::Frame),
        "frames should arrive in order"
    );
}

#[test]
fn test_connection_refused() {
    let _ = env_logger::try_init();

    let host = {
        let listener = Listener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().to_string()
    };

    let err = TcpRemote::new().open("touchpad", &host).unwrap_err();
    assert!(matches!(err, TouchpadError::Connect(_)), "{err}");
}

#[test]
fn test_default_port_is_used() {
    let _ = env_logger::try_init();

    let listener = Listener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    let handle = std::thread::spawn(move || listener.accept().unwrap().1.next_packet().unwrap());

    let session = TcpRemote::new()
        .with_default_port(port)
        .open("lights", "127.0.0.1")
        .unwrap();
    assert_eq!(session.peer_addr().port(), port);

    assert_eq!(handle.join().unwrap(), Some(Packet::Hello("lights".to_owned())));
}

/// Writes raw bytes to a fresh listener connection and collects everything it yields.
fn receive_raw(bytes: &[u8]) -> Vec<Result<Packet, TouchpadError>> {
    let _ = env_logger::try_init();

    let listener = Listener::bind("127.0.0.1:0").unwrap();
    let mut stream = TcpStream::connect(listener.local_addr().unwrap()).unwrap();
    let (_, connection) = listener.accept().unwrap();

    stream.write_all(bytes).unwrap();
    drop(stream);
    connection.collect()
}

#[test]
fn test_connection_closed_after_malformed_packet() {
    let valid = Packet::Frame(Frame::default()).encode().unwrap();

    let mut unknown_kind = vec![7, 0, 0, 0, 0];
    unknown_kind.extend_from_slice(&valid);
    let packets = receive_raw(&unknown_kind);
    assert_eq!(packets.len(), 1, "{packets:?}");
    assert!(matches!(packets[0], Err(TouchpadError::Decode)));

    let mut oversized = vec![1];
    oversized.extend_from_slice(&(MAX_PAYLOAD_LEN as u32 + 1).to_le_bytes());
    oversized.extend_from_slice(&valid);
    oversized.extend_from_slice(&valid);
    let packets = receive_raw(&oversized);
    assert_eq!(packets.len(), 1, "{packets:?}");
    assert!(matches!(packets[0], Err(TouchpadError::Decode)));

    // Well-formed packets are still delivered up to the first malformed one.
    let mut tail = valid.clone();
    tail.extend_from_slice(&[9, 0, 0, 0, 0]);
    tail.extend_from_slice(&valid);
    let packets = receive_raw(&tail);
    assert_eq!(packets.len(), 2, "{packets:?}");
    assert!(matches!(&packets[0], Ok(Packet::Frame(frame)) if frame.is_empty()));
    assert!(matches!(packets[1], Err(TouchpadError::Decode)));
}
