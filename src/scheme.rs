//! Wire scheme strategy: text vs frame, per direction.
//!
//! - **Text**: send appends the terminator; receive reads until it.
//! - **Frame**: send length-prefixes the payload; receive is two-stage —
//!   read exactly the header, decode the inclusive total length, then read
//!   the body.
//!
//! Send and receive schemes are configured independently so a session can
//! speak to an asymmetric peer (frames out, text back, or vice versa).

use std::io::{self, Read, Write};

use bytes::Bytes;

use crate::backpressure::{Deadline, IdlePacer};
use crate::config::Config;
use crate::io::{read_exact_chunked, read_until_chunked, send_chunked, IoOutcome};
use crate::protocol::{decode_frame_length, encode_frame};

/// Wire framing scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scheme {
    /// Delimiter-terminated messages (the default).
    #[default]
    Text,
    /// Length-prefixed messages.
    Frame,
}

impl Scheme {
    /// Parse `"text"` or `"frame"`; anything else is `None`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "text" => Some(Scheme::Text),
            "frame" => Some(Scheme::Frame),
            _ => None,
        }
    }
}

/// Which stage of a read an outcome belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadPhase {
    /// Reading the fixed-size length header (frame scheme only).
    Header,
    /// Reading the message body.
    Body,
}

/// Result of reading one complete message under a scheme.
#[derive(Debug)]
pub enum ReadMessage {
    /// A whole message arrived.
    Ok(Bytes),
    /// Timeout during the given phase; partial bytes are discarded.
    TimedOut(ReadPhase),
    /// Peer closed before a whole message arrived.
    Closed,
    /// The decoded total length was invalid: zero body, shorter than the
    /// header itself, or above the configured maximum.
    BadLength(u64),
    /// Hard I/O error during the given phase.
    Failed(ReadPhase, io::Error),
}

/// Encode a payload for the wire under the session's send scheme.
pub fn encode_outgoing(cfg: &Config, payload: &[u8]) -> Vec<u8> {
    match cfg.effective_send() {
        Scheme::Text => {
            let mut buf = Vec::with_capacity(payload.len() + cfg.terminator.len());
            buf.extend_from_slice(payload);
            buf.extend_from_slice(&cfg.terminator);
            buf
        }
        Scheme::Frame => encode_frame(payload, cfg.header_size, cfg.byte_order),
    }
}

/// Write one encoded message.
pub fn write_message<W: Write>(writer: &mut W, cfg: &Config, wire: &[u8]) -> IoOutcome {
    let pacer = IdlePacer::new(cfg.idle_sleep);
    let deadline = Deadline::after(cfg.timeout);
    send_chunked(writer, wire, cfg.chunk_size, &pacer, &deadline)
}

/// Read one complete message under the session's receive scheme.
pub fn read_message<R: Read>(reader: &mut R, cfg: &Config) -> ReadMessage {
    let deadline = Deadline::after(cfg.timeout);
    match cfg.effective_recv() {
        Scheme::Text => match read_until_chunked(reader, &cfg.terminator, cfg.chunk_size, &deadline)
        {
            IoOutcome::Completed(bytes) => ReadMessage::Ok(bytes),
            // Empty terminator means "read until the peer closes": the
            // close *is* the message boundary.
            IoOutcome::Closed(bytes) if cfg.terminator.is_empty() => ReadMessage::Ok(bytes),
            IoOutcome::Closed(_) => ReadMessage::Closed,
            IoOutcome::TimedOut => ReadMessage::TimedOut(ReadPhase::Body),
            IoOutcome::Failed(e) => ReadMessage::Failed(ReadPhase::Body, e),
        },
        Scheme::Frame => {
            let header_len = cfg.header_size.len();
            let header = match read_exact_chunked(reader, header_len, cfg.chunk_size, &deadline) {
                IoOutcome::Completed(bytes) => bytes,
                IoOutcome::Closed(_) => return ReadMessage::Closed,
                IoOutcome::TimedOut => return ReadMessage::TimedOut(ReadPhase::Header),
                IoOutcome::Failed(e) => return ReadMessage::Failed(ReadPhase::Header, e),
            };
            let total = decode_frame_length(&header, cfg.header_size, cfg.byte_order);
            // The length is self-inclusive; a total at or below the header
            // size leaves no body and is malformed. A short header never
            // reaches this point — read_exact keeps reading until it has
            // header_len bytes or times out. Lengths above the configured
            // ceiling are rejected here, before a single body byte is
            // buffered.
            if total <= header_len as u64 || total > cfg.max_frame_size {
                return ReadMessage::BadLength(total);
            }
            let Ok(body_len) = usize::try_from(total - header_len as u64) else {
                return ReadMessage::BadLength(total);
            };
            match read_exact_chunked(reader, body_len, cfg.chunk_size, &deadline) {
                IoOutcome::Completed(bytes) => ReadMessage::Ok(bytes),
                IoOutcome::Closed(_) => ReadMessage::Closed,
                IoOutcome::TimedOut => ReadMessage::TimedOut(ReadPhase::Body),
                IoOutcome::Failed(e) => ReadMessage::Failed(ReadPhase::Body, e),
            }
        }
    }
}
