//! # wireline
//!
//! Blocking TCP client transport with two interchangeable wire framings:
//! a delimiter-terminated **text** scheme and a length-prefixed **frame**
//! scheme, selectable independently per direction.
//!
//! ## Architecture
//!
//! - `protocol` — pure frame codec (self-inclusive length header)
//! - `io` — chunked blocking read/write primitives with timeout/EOF
//!   disambiguation and idle backpressure
//! - `scheme` — text/frame strategy composed from the codec and the
//!   primitives
//! - `transport` — address parsing and socket setup
//! - `client` — the session state machine and the `{code, message, data}`
//!   result surface
//!
//! ## Example
//!
//! ```no_run
//! use wireline::{Client, Config};
//!
//! // One request/response cycle, socket released on every exit path.
//! let reply = Client::link("tcp://127.0.0.1:11223", "PING", Config::default());
//! assert!(reply.ok());
//! ```

pub mod config;
pub mod error;
pub mod io;
pub mod payload;
pub mod protocol;
pub mod scheme;
pub mod transport;

mod backpressure;
mod client;

pub use backpressure::{Deadline, IdlePacer};
pub use client::{Client, Reply, State};
pub use config::{Config, ConnectMode, ContextOptions};
pub use error::ClientError;
pub use payload::{Payload, ResponseData};
pub use protocol::{ByteOrder, HeaderSize};
pub use scheme::Scheme;
