//! Socket setup: address parsing and dialing.
//!
//! Addresses look like `tcp://127.0.0.1:11223`; a bare `host:port` is
//! accepted as TCP. A `text:` or `frame:` prefix selects the wire scheme
//! for the whole session and is stripped before the socket opens:
//! `frame:tcp://10.0.0.1:9000` dials `10.0.0.1:9000` with the frame scheme
//! on both directions.

use std::net::{TcpStream, ToSocketAddrs};

use tracing::debug;

use crate::config::Config;
use crate::error::{ClientError, Result};
use crate::scheme::Scheme;

/// A parsed connection address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Address {
    /// Transport scheme; only `tcp` is supported.
    pub transport: String,
    /// Host name or IP literal.
    pub host: String,
    /// Port.
    pub port: u16,
    /// Wire scheme selected by a `text:`/`frame:` address prefix.
    pub wire: Option<Scheme>,
}

impl Address {
    /// Parse an address literal.
    pub fn parse(addr: &str) -> Result<Self> {
        let mut rest = addr.trim();
        let mut wire = None;
        for (prefix, scheme) in [("text:", Scheme::Text), ("frame:", Scheme::Frame)] {
            if let Some(stripped) = rest.strip_prefix(prefix) {
                wire = Some(scheme);
                rest = stripped;
                break;
            }
        }

        let (transport, authority) = match rest.split_once("://") {
            Some((t, a)) => (t, a),
            None => ("tcp", rest),
        };
        if transport != "tcp" {
            return Err(ClientError::System(format!(
                "unsupported transport scheme '{transport}' in '{addr}'"
            )));
        }

        let (host, port) = authority.rsplit_once(':').ok_or_else(|| {
            ClientError::System(format!("address '{addr}' is missing a port"))
        })?;
        if host.is_empty() {
            return Err(ClientError::System(format!(
                "address '{addr}' is missing a host"
            )));
        }
        let port: u16 = port
            .parse()
            .map_err(|_| ClientError::System(format!("invalid port in '{addr}'")))?;

        Ok(Self {
            transport: transport.to_string(),
            host: host.to_string(),
            port,
            wire,
        })
    }

    /// `host:port` form for socket address resolution.
    pub fn authority(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}://{}:{}", self.transport, self.host, self.port)
    }
}

/// Open and configure a socket for the session.
///
/// Resolves the address (which may yield several candidates) and tries
/// each until one connects within the timeout, then applies the read/write
/// timeouts and context options.
pub fn dial(addr: &Address, cfg: &Config) -> Result<TcpStream> {
    let authority = addr.authority();
    let candidates = authority
        .to_socket_addrs()
        .map_err(|e| ClientError::Connection(format!("invalid address '{authority}': {e}")))?;

    let mut last_err = None;
    for candidate in candidates {
        match TcpStream::connect_timeout(&candidate, cfg.timeout) {
            Ok(stream) => {
                stream
                    .set_read_timeout(Some(cfg.timeout))
                    .map_err(ClientError::Io)?;
                stream
                    .set_write_timeout(Some(cfg.timeout))
                    .map_err(ClientError::Io)?;
                if let Some(nodelay) = cfg.context.nodelay {
                    stream.set_nodelay(nodelay).map_err(ClientError::Io)?;
                }
                if let Some(ttl) = cfg.context.ttl {
                    stream.set_ttl(ttl).map_err(ClientError::Io)?;
                }
                debug!(peer = %candidate, "connected");
                return Ok(stream);
            }
            Err(e) => last_err = Some(e),
        }
    }

    Err(ClientError::Connection(format!(
        "failed to connect to {}: {}",
        authority,
        last_err
            .map(|e| e.to_string())
            .unwrap_or_else(|| "no addresses resolved".to_string())
    )))
}
