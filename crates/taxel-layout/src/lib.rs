//! Sensor layout descriptors for tactile-pressure arrays.
//!
//! A sensor model is described by a small JSON document: the wiring
//! permutations for rows and columns, the sample width on the wire, and
//! how many completed frames the acquisition side may buffer. This crate
//! parses those descriptors and validates them into an immutable
//! [`SensorLayout`] that the wire decoder derives its packet geometry from.

pub mod descriptor;
pub mod error;
pub mod layout;

pub use descriptor::LayoutDescriptor;
pub use error::{LayoutError, Result};
pub use layout::{SampleWidth, SensorLayout, CRC_LEN, HEADER_LEN};
