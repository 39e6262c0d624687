use std::path::Path;

use serde::Deserialize;

use crate::error::{LayoutError, Result};

/// Default sample width when the descriptor omits `bytes_per_point`.
pub const DEFAULT_BYTES_PER_POINT: u64 = 2;

/// Default ring capacity when the descriptor omits `buffer_length`.
pub const DEFAULT_BUFFER_LENGTH: usize = 64;

/// Raw JSON sensor descriptor, as shipped with each sensor model.
///
/// ```json
/// {
///   "row_array": [0, 1, 2, 3],
///   "column_array": [3, 2, 1, 0],
///   "bytes_per_point": 2,
///   "buffer_length": 64
/// }
/// ```
///
/// Descriptors may carry additional vendor fields; they are ignored here.
#[derive(Debug, Clone, Deserialize)]
pub struct LayoutDescriptor {
    /// Wire row index -> output row position.
    pub row_array: Vec<usize>,
    /// Output column -> wire column to sample from.
    pub column_array: Vec<usize>,
    /// Sample width on the wire in bytes (1 or 2).
    #[serde(default = "default_bytes_per_point")]
    pub bytes_per_point: u64,
    /// Completed frames buffered before the oldest is dropped.
    #[serde(default = "default_buffer_length")]
    pub buffer_length: usize,
}

fn default_bytes_per_point() -> u64 {
    DEFAULT_BYTES_PER_POINT
}

fn default_buffer_length() -> usize {
    DEFAULT_BUFFER_LENGTH
}

impl LayoutDescriptor {
    /// Parse a descriptor from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a descriptor file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| LayoutError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let descriptor = Self::from_json_str(&raw)?;
        tracing::debug!(
            path = %path.display(),
            rows = descriptor.row_array.len(),
            cols = descriptor.column_array.len(),
            "loaded layout descriptor"
        );
        Ok(descriptor)
    }
}
