//! Per-session configuration.
//!
//! A [`Config`] is built fluently, copied into the session at construction,
//! and never mutated afterwards. Defaults match the wire peers this client
//! was written against: 8192-byte chunks, `"\n"` terminator, 4-byte
//! big-endian frame headers, 3-second timeout.

use std::time::Duration;

use crate::backpressure::DEFAULT_IDLE_SLEEP;
use crate::protocol::{ByteOrder, HeaderSize};
use crate::scheme::Scheme;

/// Default connect/read/write timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(3);

/// Default chunk size for reads and writes.
pub const DEFAULT_CHUNK_SIZE: usize = 8192;

/// Default ceiling for a peer-announced frame length, header included
/// (1 GiB). Anything above is treated as a malformed length, never
/// buffered.
pub const DEFAULT_MAX_FRAME_SIZE: u64 = 1_073_741_824;

/// How the socket is established and retained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectMode {
    /// Connect eagerly; the socket lives for one request/response cycle.
    #[default]
    Immediate,
    /// Accepted for compatibility; blocking sockets have no deferred
    /// connect, so this dials eagerly like `Immediate`.
    AsyncConnect,
    /// Keep the socket open across multiple send/read cycles.
    Persistent,
}

/// Socket-level options applied after connect.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContextOptions {
    /// `TCP_NODELAY`.
    pub nodelay: Option<bool>,
    /// IP TTL.
    pub ttl: Option<u32>,
}

/// Immutable session configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Connect mode.
    pub mode: ConnectMode,
    /// Connect, read, and write timeout.
    pub timeout: Duration,
    /// Socket options applied after connect.
    pub context: ContextOptions,
    /// Shared default scheme for both directions.
    pub scheme: Scheme,
    /// Send-side override of `scheme`.
    pub send_scheme: Option<Scheme>,
    /// Receive-side override of `scheme`.
    pub recv_scheme: Option<Scheme>,
    /// Bytes moved per read/write call.
    pub chunk_size: usize,
    /// Frame header size (frame scheme).
    pub header_size: HeaderSize,
    /// Frame header byte order (frame scheme).
    pub byte_order: ByteOrder,
    /// Maximum accepted frame length, header included (frame scheme).
    pub max_frame_size: u64,
    /// Message terminator (text scheme). Empty means "read until close".
    pub terminator: Vec<u8>,
    /// Pause after a zero-progress write.
    pub idle_sleep: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mode: ConnectMode::default(),
            timeout: DEFAULT_TIMEOUT,
            context: ContextOptions::default(),
            scheme: Scheme::default(),
            send_scheme: None,
            recv_scheme: None,
            chunk_size: DEFAULT_CHUNK_SIZE,
            header_size: HeaderSize::default(),
            byte_order: ByteOrder::default(),
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
            terminator: b"\n".to_vec(),
            idle_sleep: DEFAULT_IDLE_SLEEP,
        }
    }
}

impl Config {
    /// Create a config with all defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the connect mode.
    pub fn mode(mut self, mode: ConnectMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the timeout from fractional seconds.
    pub fn timeout_secs(mut self, secs: f64) -> Self {
        self.timeout = Duration::from_secs_f64(secs.max(0.0));
        self
    }

    /// Set the socket context options.
    pub fn context(mut self, context: ContextOptions) -> Self {
        self.context = context;
        self
    }

    /// Set the shared scheme for both directions.
    pub fn scheme(mut self, scheme: Scheme) -> Self {
        self.scheme = scheme;
        self
    }

    /// Override the send-side scheme.
    pub fn send_scheme(mut self, scheme: Scheme) -> Self {
        self.send_scheme = Some(scheme);
        self
    }

    /// Override the receive-side scheme.
    pub fn recv_scheme(mut self, scheme: Scheme) -> Self {
        self.recv_scheme = Some(scheme);
        self
    }

    /// Set the chunk size.
    pub fn chunk_size(mut self, size: usize) -> Self {
        self.chunk_size = size.max(1);
        self
    }

    /// Set the frame header size.
    pub fn header_size(mut self, size: HeaderSize) -> Self {
        self.header_size = size;
        self
    }

    /// Set the frame header byte order.
    pub fn byte_order(mut self, order: ByteOrder) -> Self {
        self.byte_order = order;
        self
    }

    /// Set the maximum accepted frame length, header included.
    pub fn max_frame_size(mut self, size: u64) -> Self {
        self.max_frame_size = size;
        self
    }

    /// Set the text-scheme terminator. Empty means "read until close".
    pub fn terminator(mut self, terminator: impl AsRef<[u8]>) -> Self {
        self.terminator = terminator.as_ref().to_vec();
        self
    }

    /// Set the idle-sleep interval.
    pub fn idle_sleep(mut self, interval: Duration) -> Self {
        self.idle_sleep = interval;
        self
    }

    /// Effective send-side scheme (the override, else the shared scheme).
    pub fn effective_send(&self) -> Scheme {
        self.send_scheme.unwrap_or(self.scheme)
    }

    /// Effective receive-side scheme (the override, else the shared scheme).
    pub fn effective_recv(&self) -> Scheme {
        self.recv_scheme.unwrap_or(self.scheme)
    }
}
