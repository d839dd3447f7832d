//! End-to-end tests against real loopback sockets.
//!
//! Each test spawns a one-shot server thread scripted for the scenario,
//! then drives a client session against it.

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::thread;
use std::time::Duration;

use serde_json::json;
use wireline::{ByteOrder, Client, Config, HeaderSize, Scheme, State};

/// Spawn a server that runs `script` on the first accepted connection.
fn spawn_server<F>(script: F) -> String
where
    F: FnOnce(TcpStream) + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    thread::spawn(move || {
        let (sock, _) = listener.accept().unwrap();
        script(sock);
    });
    format!("tcp://{addr}")
}

/// Read until `\n` or EOF; returns everything read including the newline.
fn read_line(sock: &mut TcpStream) -> Vec<u8> {
    let mut buf = Vec::new();
    let mut byte = [0u8; 1];
    while let Ok(1) = sock.read(&mut byte) {
        buf.push(byte[0]);
        if byte[0] == b'\n' {
            break;
        }
    }
    buf
}

#[test]
fn test_text_echo_round_trip() {
    let addr = spawn_server(|mut sock| {
        let line = read_line(&mut sock);
        assert_eq!(line, b"PING\n");
        sock.write_all(b"PING\n").unwrap();
    });

    let reply = Client::link(&addr, "PING", Config::default());
    assert_eq!(reply.code, 200);
    assert_eq!(reply.data.text(), Some("PING"));
}

#[test]
fn test_frame_big_endian_response() {
    // Server responds with pack(BE32, 4 + 11) + "hello world".
    let addr = spawn_server(|mut sock| {
        let mut req = [0u8; 64];
        let _ = sock.read(&mut req).unwrap();
        let mut resp = Vec::new();
        resp.extend_from_slice(&(4u32 + 11).to_be_bytes());
        resp.extend_from_slice(b"hello world");
        sock.write_all(&resp).unwrap();
    });

    let reply = Client::link(&addr, "hi", Config::default().scheme(Scheme::Frame));
    assert_eq!(reply.code, 200);
    assert_eq!(reply.data.text(), Some("hello world"));
}

#[test]
fn test_frame_eight_byte_little_endian_response() {
    let addr = spawn_server(|mut sock| {
        let mut req = [0u8; 64];
        let _ = sock.read(&mut req).unwrap();
        let body = b"payload";
        let total = 8u64 + body.len() as u64;
        let mut resp = Vec::new();
        resp.extend_from_slice(&((total & 0xFFFF_FFFF) as u32).to_le_bytes());
        resp.extend_from_slice(&((total >> 32) as u32).to_le_bytes());
        resp.extend_from_slice(body);
        sock.write_all(&resp).unwrap();
    });

    let reply = Client::link(
        &addr,
        "hi",
        Config::default()
            .scheme(Scheme::Frame)
            .header_size(HeaderSize::Eight)
            .byte_order(ByteOrder::Little),
    );
    assert_eq!(reply.code, 200);
    assert_eq!(reply.data.text(), Some("payload"));
}

#[test]
fn test_frame_header_arriving_in_pieces_still_completes() {
    let addr = spawn_server(|mut sock| {
        let mut req = [0u8; 64];
        let _ = sock.read(&mut req).unwrap();
        let frame = {
            let mut f = Vec::new();
            f.extend_from_slice(&(4u32 + 4).to_be_bytes());
            f.extend_from_slice(b"body");
            f
        };
        // Dribble the frame out two bytes at a time.
        for chunk in frame.chunks(2) {
            sock.write_all(chunk).unwrap();
            sock.flush().unwrap();
            thread::sleep(Duration::from_millis(10));
        }
    });

    let reply = Client::link(&addr, "hi", Config::default().scheme(Scheme::Frame));
    assert_eq!(reply.code, 200);
    assert_eq!(reply.data.text(), Some("body"));
}

#[test]
fn test_frame_closed_before_any_byte_is_read_closed() {
    let addr = spawn_server(|mut sock| {
        let mut req = [0u8; 64];
        let _ = sock.read(&mut req).unwrap();
        // Close without writing anything.
    });

    let reply = Client::link(&addr, "hi", Config::default().scheme(Scheme::Frame));
    assert_eq!(reply.code, 410, "peer close must be ReadClosed, not a protocol error");
}

#[test]
fn test_frame_zero_body_length_is_protocol_error() {
    // Total exactly the header size encodes a zero-length body.
    let addr = spawn_server(|mut sock| {
        let mut req = [0u8; 64];
        let _ = sock.read(&mut req).unwrap();
        sock.write_all(&4u32.to_be_bytes()).unwrap();
    });

    let reply = Client::link(&addr, "hi", Config::default().scheme(Scheme::Frame));
    assert_eq!(reply.code, 422);
}

#[test]
fn test_frame_length_above_configured_maximum_is_refused() {
    // The announced length is rejected from the header alone; the body
    // the server keeps streaming is never buffered.
    let addr = spawn_server(|mut sock| {
        let mut req = [0u8; 64];
        let _ = sock.read(&mut req).unwrap();
        sock.write_all(&(64u32 * 1024 * 1024).to_be_bytes()).unwrap();
        let chunk = vec![0u8; 8192];
        while sock.write_all(&chunk).is_ok() {}
    });

    let reply = Client::link(
        &addr,
        "hi",
        Config::default()
            .scheme(Scheme::Frame)
            .max_frame_size(1024 * 1024),
    );
    assert_eq!(reply.code, 422);
}

#[test]
fn test_read_timeout_when_server_stays_silent() {
    let addr = spawn_server(|mut sock| {
        let _ = read_line(&mut sock);
        // Never respond; hold the socket open past the client timeout.
        thread::sleep(Duration::from_millis(800));
    });

    let reply = Client::link(&addr, "PING", Config::default().timeout_secs(0.3));
    assert_eq!(reply.code, 408);
}

#[test]
fn test_json_response_upgrades_to_parsed_value() {
    let addr = spawn_server(|mut sock| {
        let _ = read_line(&mut sock);
        sock.write_all(b"{\"a\":1}\n").unwrap();
    });

    let reply = Client::link(&addr, json!({"op": "get"}), Config::default());
    assert_eq!(reply.code, 200);
    assert_eq!(reply.data.json(), Some(&json!({"a": 1})));
}

#[test]
fn test_non_json_response_stays_raw() {
    let addr = spawn_server(|mut sock| {
        let _ = read_line(&mut sock);
        sock.write_all(b"plain text\n").unwrap();
    });

    let reply = Client::link(&addr, "x", Config::default());
    assert_eq!(reply.code, 200);
    assert_eq!(reply.data.text(), Some("plain text"));
    assert!(reply.data.json().is_none());
}

#[test]
fn test_frame_prefix_in_address_selects_scheme() {
    let addr = spawn_server(|mut sock| {
        // Request must arrive framed: 4-byte BE header then "hi".
        let mut header = [0u8; 4];
        sock.read_exact(&mut header).unwrap();
        assert_eq!(u32::from_be_bytes(header), 4 + 2);
        let mut body = [0u8; 2];
        sock.read_exact(&mut body).unwrap();
        assert_eq!(&body, b"hi");

        let mut resp = Vec::new();
        resp.extend_from_slice(&(4u32 + 2).to_be_bytes());
        resp.extend_from_slice(b"ok");
        sock.write_all(&resp).unwrap();
    });

    let reply = Client::link(format!("frame:{addr}"), "hi", Config::default());
    assert_eq!(reply.code, 200);
    assert_eq!(reply.data.text(), Some("ok"));
}

#[test]
fn test_asymmetric_frame_out_text_back() {
    let addr = spawn_server(|mut sock| {
        let mut header = [0u8; 4];
        sock.read_exact(&mut header).unwrap();
        let body_len = u32::from_be_bytes(header) as usize - 4;
        let mut body = vec![0u8; body_len];
        sock.read_exact(&mut body).unwrap();
        sock.write_all(b"text back\n").unwrap();
    });

    let reply = Client::link(
        &addr,
        "req",
        Config::default()
            .send_scheme(Scheme::Frame)
            .recv_scheme(Scheme::Text),
    );
    assert_eq!(reply.code, 200);
    assert_eq!(reply.data.text(), Some("text back"));
}

#[test]
fn test_async_link_defers_the_read() {
    let addr = spawn_server(|mut sock| {
        let line = read_line(&mut sock);
        assert_eq!(line, b"later\n");
        sock.write_all(b"answer\n").unwrap();
    });

    let mut client = Client::async_link(&addr, "later", Config::default());
    assert_eq!(*client.state(), State::SendOk);
    let reply = client.read();
    assert_eq!(reply.data.text(), Some("answer"));
    client.close();
}

#[test]
fn test_lazy_payload_resolves_at_send_time() {
    let addr = spawn_server(|mut sock| {
        let line = read_line(&mut sock);
        assert_eq!(line, b"{\"deferred\":true}\n");
        sock.write_all(b"ok\n").unwrap();
    });

    let payload = wireline::Payload::lazy(|| json!({"deferred": true}).into());
    let reply = Client::link(&addr, payload, Config::default());
    assert_eq!(reply.code, 200);
}

#[test]
fn test_persistent_mode_reuses_the_socket() {
    let addr = spawn_server(|mut sock| {
        for _ in 0..2 {
            let line = read_line(&mut sock);
            sock.write_all(&line).unwrap();
        }
    });

    let mut client = Client::new(
        &addr,
        Config::default().mode(wireline::ConnectMode::Persistent),
    );
    client.send("first");
    let first = client.read();
    assert_eq!(first.data.text(), Some("first"));

    client.send("second");
    let second = client.read();
    assert_eq!(second.data.text(), Some("second"));
    client.close();
}

#[test]
fn test_read_until_close_with_empty_terminator() {
    let addr = spawn_server(|mut sock| {
        // The empty terminator applies to the send side too, so just take
        // whatever arrives instead of waiting for a newline.
        let mut req = [0u8; 16];
        let _ = sock.read(&mut req).unwrap();
        sock.write_all(b"chunk one ").unwrap();
        sock.flush().unwrap();
        thread::sleep(Duration::from_millis(20));
        sock.write_all(b"chunk two").unwrap();
        // Closing the socket ends the message.
    });

    let reply = Client::link(
        &addr,
        "x",
        Config::default().recv_scheme(Scheme::Text).terminator(b""),
    );
    assert_eq!(reply.code, 200);
    assert_eq!(reply.data.text(), Some("chunk one chunk two"));
}

#[test]
fn test_link_closes_on_failure_paths_too() {
    // Server closes immediately after the request; link must still return
    // a coherent code and release its socket without surfacing an error.
    let addr = spawn_server(|mut sock| {
        let _ = read_line(&mut sock);
    });

    let reply = Client::link(&addr, "x", Config::default());
    assert_eq!(reply.code, 410);
}

#[test]
fn test_connection_refused_reports_400() {
    let reply = Client::link(
        "tcp://127.0.0.1:1",
        "x",
        Config::default().timeout_secs(0.2),
    );
    assert_eq!(reply.code, 400);
}
