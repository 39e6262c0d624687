//! Byte-chunk sources and the producer thread driving the taxel decoder.
//!
//! Physical transports (USB bulk, serial, CAN, BLE) all reduce to the same
//! shape on the host side: a blocking loop on a dedicated thread that pulls
//! whatever bytes have arrived and hands them to the decoder. This crate
//! models that shape — [`ChunkSource`] is the pull, [`SourcePump`] is the
//! thread — with file and stdin sources for replaying captured streams.
//! Actual device bring-up lives outside this workspace.

pub mod chunk;
pub mod error;
pub mod pump;

pub use chunk::{ChunkSource, FileSource, ReaderSource, StdinSource};
pub use error::{Result, SourceError};
pub use pump::SourcePump;
