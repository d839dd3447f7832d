//! Chunked blocking I/O primitives.
//!
//! TCP is a byte stream: one read or write call is never assumed to move
//! one message. Every higher-level operation composes these three
//! primitives, each of which loops until it reaches a terminal
//! [`IoOutcome`]:
//!
//! - `Err(WouldBlock | TimedOut)` from the socket, or an expired
//!   [`Deadline`], terminates with [`IoOutcome::TimedOut`].
//! - A read returning `Ok(0)` is end-of-stream: [`IoOutcome::Closed`],
//!   carrying whatever was accumulated before the close.
//! - A write returning `Ok(0)` is transient backpressure: sleep one
//!   [`IdlePacer`] interval and retry. Never terminal.
//! - `Err(Interrupted)` retries immediately.
//! - Any other error terminates with [`IoOutcome::Failed`].

use std::io::{self, Read, Write};

use bytes::Bytes;
use tracing::trace;

use crate::backpressure::{Deadline, IdlePacer};

/// Terminal result of a chunked I/O primitive.
///
/// Timeout, peer-close, and hard error are distinct and never conflated;
/// the client state machine maps each to its own state.
#[derive(Debug)]
pub enum IoOutcome {
    /// The operation finished; carries the bytes read (empty for writes).
    Completed(Bytes),
    /// The socket timeout or the operation deadline fired first.
    TimedOut,
    /// The peer closed the stream; carries bytes accumulated before the
    /// close. Delivered to the caller only in "read until close" mode.
    Closed(Bytes),
    /// A hard I/O error.
    Failed(io::Error),
}

/// Classify one I/O error into a loop action.
enum ErrAction {
    Retry,
    TimedOut,
    Failed(io::Error),
}

fn classify(err: io::Error) -> ErrAction {
    match err.kind() {
        io::ErrorKind::Interrupted => ErrAction::Retry,
        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut => ErrAction::TimedOut,
        _ => ErrAction::Failed(err),
    }
}

/// Write all of `buf`, at most `chunk_size` bytes per call.
///
/// Zero-byte writes pause via `pacer` and retry; the full buffer is
/// delivered even against a sink that accepts one byte at a time.
pub fn send_chunked<W: Write>(
    writer: &mut W,
    buf: &[u8],
    chunk_size: usize,
    pacer: &IdlePacer,
    deadline: &Deadline,
) -> IoOutcome {
    let chunk_size = chunk_size.max(1);
    let mut written = 0;
    while written < buf.len() {
        if deadline.expired() {
            return IoOutcome::TimedOut;
        }
        let end = (written + chunk_size).min(buf.len());
        match writer.write(&buf[written..end]) {
            Ok(0) => pacer.pause(),
            Ok(n) => {
                written += n;
                trace!(written, total = buf.len(), "chunk written");
            }
            Err(e) => match classify(e) {
                ErrAction::Retry => continue,
                ErrAction::TimedOut => return IoOutcome::TimedOut,
                ErrAction::Failed(e) => return IoOutcome::Failed(e),
            },
        }
    }
    if let Err(e) = writer.flush() {
        match classify(e) {
            ErrAction::Retry => {}
            ErrAction::TimedOut => return IoOutcome::TimedOut,
            ErrAction::Failed(e) => return IoOutcome::Failed(e),
        }
    }
    IoOutcome::Completed(Bytes::new())
}

/// Accumulate exactly `len` bytes, at most `chunk_size` per call.
pub fn read_exact_chunked<R: Read>(
    reader: &mut R,
    len: usize,
    chunk_size: usize,
    deadline: &Deadline,
) -> IoOutcome {
    let chunk_size = chunk_size.max(1);
    let mut acc = Vec::with_capacity(len.min(chunk_size * 4));
    let mut buf = vec![0u8; chunk_size];
    while acc.len() < len {
        if deadline.expired() {
            return IoOutcome::TimedOut;
        }
        let want = chunk_size.min(len - acc.len());
        match reader.read(&mut buf[..want]) {
            Ok(0) => return IoOutcome::Closed(Bytes::from(acc)),
            Ok(n) => {
                acc.extend_from_slice(&buf[..n]);
                trace!(have = acc.len(), want = len, "chunk read");
            }
            Err(e) => match classify(e) {
                ErrAction::Retry => continue,
                ErrAction::TimedOut => return IoOutcome::TimedOut,
                ErrAction::Failed(e) => return IoOutcome::Failed(e),
            },
        }
    }
    IoOutcome::Completed(Bytes::from(acc))
}

/// Accumulate until the buffer ends with `delimiter`, then return it with
/// all trailing repetitions of the delimiter stripped.
///
/// An empty delimiter means "read until the peer closes": the terminal
/// outcome becomes [`IoOutcome::Closed`] carrying the accumulated bytes,
/// which the caller treats as completion rather than an error.
pub fn read_until_chunked<R: Read>(
    reader: &mut R,
    delimiter: &[u8],
    chunk_size: usize,
    deadline: &Deadline,
) -> IoOutcome {
    let chunk_size = chunk_size.max(1);
    let mut acc: Vec<u8> = Vec::new();
    let mut buf = vec![0u8; chunk_size];
    loop {
        if deadline.expired() {
            return IoOutcome::TimedOut;
        }
        match reader.read(&mut buf) {
            Ok(0) => return IoOutcome::Closed(Bytes::from(acc)),
            Ok(n) => {
                acc.extend_from_slice(&buf[..n]);
                if !delimiter.is_empty() && acc.ends_with(delimiter) {
                    while acc.ends_with(delimiter) {
                        acc.truncate(acc.len() - delimiter.len());
                    }
                    return IoOutcome::Completed(Bytes::from(acc));
                }
            }
            Err(e) => match classify(e) {
                ErrAction::Retry => continue,
                ErrAction::TimedOut => return IoOutcome::TimedOut,
                ErrAction::Failed(e) => return IoOutcome::Failed(e),
            },
        }
    }
}
