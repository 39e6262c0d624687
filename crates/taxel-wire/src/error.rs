/// Errors that can occur while encoding wire packets.
///
/// Decoding has no error type: a live sensor link is expected to be noisy,
/// so the decoder resynchronizes and keeps counters instead of failing.
#[derive(Debug, thiserror::Error)]
pub enum WireError {
    /// The payload does not match the layout's row payload size.
    #[error("payload size mismatch (expected {expected} bytes, got {got})")]
    PayloadSizeMismatch { expected: usize, got: usize },

    /// The row index does not exist in the layout.
    #[error("row index {row} out of range for {rows} rows")]
    RowIndexOutOfRange { row: u8, rows: usize },

    /// A sample value cannot be represented at the layout's sample width.
    #[error("sample value {0} out of range for 1-byte samples")]
    SampleOutOfRange(i16),
}

pub type Result<T> = std::result::Result<T, WireError>;
