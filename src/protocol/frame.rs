//! Frame header encoding and decoding.
//!
//! A frame is a fixed-size header followed by the body. The header encodes
//! the **total** frame length (header size + body size — the length is
//! self-inclusive):
//!
//! ```text
//! ┌────────────────┬─────────────────┐
//! │ Total length   │ Body            │
//! │ 4 or 8 bytes   │ length - header │
//! └────────────────┴─────────────────┘
//! ```
//!
//! The 4-byte header is a single u32 in the configured byte order. The
//! 8-byte header is **two 32-bit words, not a native u64 pack**: big-endian
//! lays out `(high32, low32)` so the value is `hi << 32 | lo`; little-endian
//! lays out the low word first, each word little-endian. Peers speaking this
//! protocol depend on that exact layout.

/// Header size of a length-prefixed frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HeaderSize {
    /// One 32-bit length word (the default).
    #[default]
    Four,
    /// Two 32-bit length words.
    Eight,
}

impl HeaderSize {
    /// Header length in bytes.
    #[inline]
    pub fn len(self) -> usize {
        match self {
            HeaderSize::Four => 4,
            HeaderSize::Eight => 8,
        }
    }

    /// Map a raw byte count to a header size. Anything other than 8 falls
    /// back to the 4-byte default.
    pub fn from_len(len: usize) -> Self {
        if len == 8 {
            HeaderSize::Eight
        } else {
            HeaderSize::Four
        }
    }
}

/// Byte order of the length words.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ByteOrder {
    /// Big-endian (the default).
    #[default]
    Big,
    /// Little-endian.
    Little,
}

impl ByteOrder {
    /// Parse `"be"`/`"big"` or `"le"`/`"little"`, case-insensitive.
    /// Anything unrecognized falls back to big-endian.
    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "le" | "little" => ByteOrder::Little,
            _ => ByteOrder::Big,
        }
    }
}

/// Encode `body` as a complete frame: header holding
/// `header.len() + body.len()`, then the body bytes.
///
/// # Example
///
/// ```
/// use wireline::protocol::{encode_frame, ByteOrder, HeaderSize};
///
/// let frame = encode_frame(b"hello", HeaderSize::Four, ByteOrder::Big);
/// assert_eq!(&frame[..4], &9u32.to_be_bytes()); // 4 + 5, self-inclusive
/// assert_eq!(&frame[4..], b"hello");
/// ```
pub fn encode_frame(body: &[u8], header: HeaderSize, order: ByteOrder) -> Vec<u8> {
    let total = header.len() as u64 + body.len() as u64;
    let mut buf = Vec::with_capacity(header.len() + body.len());
    match header {
        HeaderSize::Four => match order {
            ByteOrder::Big => buf.extend_from_slice(&(total as u32).to_be_bytes()),
            ByteOrder::Little => buf.extend_from_slice(&(total as u32).to_le_bytes()),
        },
        HeaderSize::Eight => {
            let hi = (total >> 32) as u32;
            let lo = (total & 0xFFFF_FFFF) as u32;
            match order {
                ByteOrder::Big => {
                    buf.extend_from_slice(&hi.to_be_bytes());
                    buf.extend_from_slice(&lo.to_be_bytes());
                }
                ByteOrder::Little => {
                    buf.extend_from_slice(&lo.to_le_bytes());
                    buf.extend_from_slice(&hi.to_le_bytes());
                }
            }
        }
    }
    buf.extend_from_slice(body);
    buf
}

/// Decode the inclusive total length from header bytes.
///
/// Returns 0 if fewer than `header.len()` bytes are supplied — meaning
/// "not enough data yet", not an error; the caller must keep reading.
pub fn decode_frame_length(header_bytes: &[u8], header: HeaderSize, order: ByteOrder) -> u64 {
    if header_bytes.len() < header.len() {
        return 0;
    }
    match header {
        HeaderSize::Four => {
            let word: [u8; 4] = header_bytes[..4].try_into().unwrap();
            match order {
                ByteOrder::Big => u32::from_be_bytes(word) as u64,
                ByteOrder::Little => u32::from_le_bytes(word) as u64,
            }
        }
        HeaderSize::Eight => {
            let first: [u8; 4] = header_bytes[..4].try_into().unwrap();
            let second: [u8; 4] = header_bytes[4..8].try_into().unwrap();
            match order {
                ByteOrder::Big => {
                    let hi = u32::from_be_bytes(first) as u64;
                    let lo = u32::from_be_bytes(second) as u64;
                    (hi << 32) | lo
                }
                ByteOrder::Little => {
                    let lo = u32::from_le_bytes(first) as u64;
                    let hi = u32::from_le_bytes(second) as u64;
                    (hi << 32) | lo
                }
            }
        }
    }
}
