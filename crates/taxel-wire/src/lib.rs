//! Wire packet codec and streaming frame decoder for tactile sensor arrays.
//!
//! This is the core value-add layer of taxel. Sensor hardware streams
//! fixed-size row packets at high rate over a byte transport (USB bulk,
//! serial, CAN, BLE); each packet carries:
//! - A 3-byte magic number (`0xAA 0x10 0x33`) for stream synchronization
//! - A wrapping 8-bit frame counter and the row index within the frame
//! - One row of samples, interleaved byte-planes in wire order
//! - A big-endian CRC-16/CCITT-FALSE over everything preceding it
//!
//! [`FrameDecoder`] ingests byte chunks of arbitrary size, resynchronizes
//! through noise byte-by-byte, reassembles rows into complete frames, and
//! hands finished frames to a consumer thread through a bounded,
//! drop-oldest [`FrameQueue`]. No partial reads, no buffer management in
//! user code.

pub mod decoder;
pub mod error;
pub mod frame;
pub mod packet;
pub mod ring;

pub use decoder::{DecoderStats, FrameDecoder, MINIMUM_INTERVAL};
pub use error::{Result, WireError};
pub use frame::Frame;
pub use packet::{crc16, encode_packet, pack_samples, CRC_LEN, HEADER_LEN, MAGIC};
pub use ring::FrameQueue;
