//! The public session object.
//!
//! A [`Client`] owns one socket and sequences
//! `connect → send → read → close`, reporting every outcome through a
//! [`Reply`] triple instead of raising errors past the client boundary.
//!
//! # Example
//!
//! ```no_run
//! use wireline::{Client, Config, Scheme};
//!
//! let reply = Client::link(
//!     "tcp://127.0.0.1:11223",
//!     serde_json::json!({"op": "ping"}),
//!     Config::default().scheme(Scheme::Frame),
//! );
//! if reply.ok() {
//!     println!("{:?}", reply.data);
//! }
//! ```

use std::net::{Shutdown, TcpStream};

use bytes::Bytes;
use tracing::{debug, warn};

use crate::config::{Config, ConnectMode};
use crate::error::ClientError;
use crate::payload::{Payload, ResponseData};
use crate::scheme::{self, ReadMessage, ReadPhase};
use crate::io::IoOutcome;
use crate::transport::{dial, Address};

/// Session state. Each variant carries its own context and maps to a
/// stable numeric code at the boundary (see [`State::code`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum State {
    /// No socket; the initial and post-close state.
    NotConnected,
    /// The last connect attempt failed. Recoverable: connecting again
    /// retries.
    ConnectionRefused(String),
    /// Socket established, nothing sent yet.
    Connected,
    /// The payload encoded to an empty buffer; the socket was not touched.
    SendEmpty,
    /// Sending failed (encoding or hard I/O error).
    SendFailed(String),
    /// The send deadline fired.
    SendTimeout,
    /// The peer closed while sending.
    SendClosed,
    /// The whole message was written.
    SendOk,
    /// Timeout while reading the frame header.
    ReadHeaderTimeout,
    /// Malformed frame length.
    ReadHeaderError(String),
    /// Hard I/O error while reading the frame header.
    ReadHeaderFailed(String),
    /// Timeout while reading the message body.
    ReadBodyTimeout,
    /// Hard I/O error while reading the body.
    ReadBodyError(String),
    /// The peer closed before a whole message arrived.
    ReadClosed,
    /// A whole message arrived.
    ReadOk,
    /// Unexpected fault: invalid address, environment failure.
    Fault(String),
}

impl State {
    /// Stable numeric code for the external boundary. 200/300/400/500 are
    /// the codes existing peers and callers already key on; the rest
    /// refine the single failure bucket those leave.
    pub fn code(&self) -> u16 {
        match self {
            State::Connected | State::SendOk | State::ReadOk => 200,
            State::SendEmpty => 204,
            State::NotConnected => 300,
            State::ConnectionRefused(_) => 400,
            State::SendTimeout | State::ReadHeaderTimeout | State::ReadBodyTimeout => 408,
            State::SendClosed | State::ReadClosed => 410,
            State::ReadHeaderError(_) => 422,
            State::Fault(_) => 500,
            State::SendFailed(_) | State::ReadHeaderFailed(_) | State::ReadBodyError(_) => 502,
        }
    }

    /// Human-readable message for the triple.
    pub fn message(&self) -> String {
        match self {
            State::NotConnected => "No connection".to_string(),
            State::ConnectionRefused(msg) => msg.clone(),
            State::Connected | State::SendOk | State::ReadOk => "success".to_string(),
            State::SendEmpty => "empty payload".to_string(),
            State::SendFailed(msg) => msg.clone(),
            State::SendTimeout => "send timeout".to_string(),
            State::SendClosed => "connection closed while sending".to_string(),
            State::ReadHeaderTimeout => "timeout reading frame header".to_string(),
            State::ReadHeaderError(msg) => msg.clone(),
            State::ReadHeaderFailed(msg) => msg.clone(),
            State::ReadBodyTimeout => "timeout reading message body".to_string(),
            State::ReadBodyError(msg) => msg.clone(),
            State::ReadClosed => "connection closed while reading".to_string(),
            State::Fault(msg) => msg.clone(),
        }
    }
}

/// Result triple of a session operation.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    /// Stable numeric code; check this before trusting `data`.
    pub code: u16,
    /// Human-readable message.
    pub message: String,
    /// Parsed JSON value when available, else the raw received bytes.
    pub data: ResponseData,
}

impl Reply {
    /// Whether the operation succeeded.
    pub fn ok(&self) -> bool {
        self.code == 200
    }
}

/// A TCP client session.
///
/// Exclusively owns one socket handle. Created by [`Client::new`] (or the
/// [`Client::link`] / [`Client::async_link`] conveniences); the socket is
/// released exactly once by [`Client::close`] or `Drop`, idempotently.
pub struct Client {
    config: Config,
    address: Option<Address>,
    stream: Option<TcpStream>,
    state: State,
    /// Last payload bytes handed to `send`, pre-framing.
    send_body: Vec<u8>,
    /// Last raw received message.
    read_body: Bytes,
    data: ResponseData,
}

impl Client {
    /// Create a session for `address` with the given configuration.
    ///
    /// A `text:`/`frame:` address prefix overrides the configured shared
    /// scheme for the whole session. An unparseable address puts the
    /// session in the fault state; no operation will touch a socket.
    pub fn new(address: impl AsRef<str>, config: Config) -> Self {
        let mut config = config;
        let (address, state) = match Address::parse(address.as_ref()) {
            Ok(addr) => {
                if let Some(wire) = addr.wire {
                    config.scheme = wire;
                }
                (Some(addr), State::NotConnected)
            }
            Err(e) => (None, State::Fault(e.to_string())),
        };
        Self {
            config,
            address,
            stream: None,
            state,
            send_body: Vec::new(),
            read_body: Bytes::new(),
            data: ResponseData::Empty,
        }
    }

    /// Connect, send, read, and close — on every exit path. The socket is
    /// acquired for exactly this cycle and released before returning
    /// (`Drop` backs the explicit close, unwind included).
    pub fn link(address: impl AsRef<str>, payload: impl Into<Payload>, config: Config) -> Reply {
        let mut client = Client::new(address, config);
        client.connect();
        client.send(payload);
        let reply = client.read();
        client.close();
        reply
    }

    /// Connect and send only, returning the session so the caller may
    /// `read()` later — or never.
    pub fn async_link(
        address: impl AsRef<str>,
        payload: impl Into<Payload>,
        config: Config,
    ) -> Client {
        let mut client = Client::new(address, config);
        client.connect();
        client.send(payload);
        client
    }

    /// Current state.
    pub fn state(&self) -> &State {
        &self.state
    }

    /// The `{code, message, data}` triple for the last operation.
    pub fn reply(&self) -> Reply {
        Reply {
            code: self.state.code(),
            message: self.state.message(),
            data: self.data.clone(),
        }
    }

    /// Last payload bytes handed to `send`, before framing.
    pub fn send_body(&self) -> &[u8] {
        &self.send_body
    }

    /// Last raw received message, before the JSON upgrade.
    pub fn read_body(&self) -> &[u8] {
        &self.read_body
    }

    /// Open the socket. A failed attempt leaves the session in
    /// `ConnectionRefused`; calling again retries.
    pub fn connect(&mut self) -> &mut Self {
        if self.stream.is_some() {
            return self;
        }
        let Some(addr) = &self.address else {
            // Fault state set at construction.
            return self;
        };
        match dial(addr, &self.config) {
            Ok(stream) => {
                self.stream = Some(stream);
                self.state = State::Connected;
            }
            Err(ClientError::Connection(msg)) => {
                warn!(%addr, %msg, "connect refused");
                self.state = State::ConnectionRefused(msg);
            }
            Err(e) => {
                warn!(%addr, error = %e, "connect fault");
                self.state = State::Fault(e.to_string());
            }
        }
        self
    }

    /// Encode and send a payload.
    ///
    /// Connects first if no socket exists yet (unless the last connect was
    /// refused). A payload that encodes to an empty buffer is `SendEmpty`
    /// and the socket is never written.
    pub fn send(&mut self, payload: impl Into<Payload>) -> &mut Self {
        if self.stream.is_none()
            && !matches!(
                self.state,
                State::ConnectionRefused(_) | State::Fault(_)
            )
        {
            self.connect();
        }

        // Resolve the payload exactly once, whether or not we can send:
        // the encoded form is observable via send_body either way.
        self.data = ResponseData::Empty;
        self.read_body = Bytes::new();
        match payload.into().into_bytes() {
            Ok(bytes) => self.send_body = bytes,
            Err(e) => {
                self.send_body = Vec::new();
                self.state = State::SendFailed(e.to_string());
                return self;
            }
        }

        if !self.can_send() {
            return self;
        }
        if self.send_body.is_empty() {
            self.state = State::SendEmpty;
            return self;
        }

        let wire = scheme::encode_outgoing(&self.config, &self.send_body);
        let Some(stream) = self.stream.as_mut() else {
            return self;
        };
        debug!(bytes = wire.len(), "sending");
        self.state = match scheme::write_message(stream, &self.config, &wire) {
            IoOutcome::Completed(_) => State::SendOk,
            IoOutcome::TimedOut => State::SendTimeout,
            IoOutcome::Closed(_) => State::SendClosed,
            IoOutcome::Failed(e) => State::SendFailed(e.to_string()),
        };
        self
    }

    /// Read one message. Valid only after a successful send; in any other
    /// state the current triple is returned untouched and the socket is
    /// not read.
    pub fn read(&mut self) -> Reply {
        if self.state != State::SendOk {
            return self.reply();
        }
        let Some(stream) = self.stream.as_mut() else {
            return self.reply();
        };
        self.state = match scheme::read_message(stream, &self.config) {
            ReadMessage::Ok(bytes) => {
                debug!(bytes = bytes.len(), "received");
                self.read_body = bytes.clone();
                self.data = ResponseData::upgrade(bytes);
                State::ReadOk
            }
            ReadMessage::TimedOut(ReadPhase::Header) => State::ReadHeaderTimeout,
            ReadMessage::TimedOut(ReadPhase::Body) => State::ReadBodyTimeout,
            ReadMessage::Closed => State::ReadClosed,
            ReadMessage::BadLength(total) => {
                State::ReadHeaderError(format!("invalid frame length {total}"))
            }
            ReadMessage::Failed(ReadPhase::Header, e) => State::ReadHeaderFailed(e.to_string()),
            ReadMessage::Failed(ReadPhase::Body, e) => State::ReadBodyError(e.to_string()),
        };
        self.reply()
    }

    /// Release the socket and return to `NotConnected`. Idempotent; safe
    /// from any state.
    pub fn close(&mut self) -> &mut Self {
        if let Some(stream) = self.stream.take() {
            let _ = stream.shutdown(Shutdown::Both);
            debug!("closed");
        }
        self.state = State::NotConnected;
        self
    }

    /// Whether the session may write right now. Persistent mode permits
    /// further cycles after a completed one.
    fn can_send(&self) -> bool {
        if self.stream.is_none() {
            return false;
        }
        match self.state {
            State::Connected => true,
            State::SendOk | State::SendEmpty | State::ReadOk => {
                self.config.mode == ConnectMode::Persistent
            }
            _ => false,
        }
    }
}

impl Drop for Client {
    fn drop(&mut self) {
        self.close();
    }
}
