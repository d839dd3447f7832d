//! Wire protocol: the length-prefixed frame codec.

mod frame;

pub use frame::{decode_frame_length, encode_frame, ByteOrder, HeaderSize};
