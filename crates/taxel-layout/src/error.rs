/// Errors raised while loading or validating a sensor layout.
#[derive(Debug, thiserror::Error)]
pub enum LayoutError {
    /// The descriptor file could not be read.
    #[error("failed to read layout descriptor {path}: {source}")]
    Io {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The descriptor is not valid JSON or is missing required fields.
    #[error("invalid layout descriptor: {0}")]
    Json(#[from] serde_json::Error),

    /// `bytes_per_point` must be 1 or 2.
    #[error("unsupported sample width {0} (expected 1 or 2)")]
    UnsupportedSampleWidth(u64),

    /// `row_array` or `column_array` is empty.
    #[error("{axis} array is empty")]
    EmptyAxis { axis: &'static str },

    /// The wire row index is one byte; more than 256 rows cannot be addressed.
    #[error("too many rows ({0}, wire format addresses at most 256)")]
    TooManyRows(usize),

    /// A `row_array` entry points outside the frame.
    #[error("row_array[{position}] = {value} out of range for {rows} rows")]
    RowIndexOutOfRange {
        position: usize,
        value: usize,
        rows: usize,
    },

    /// A `column_array` entry points outside the frame.
    #[error("column_array[{position}] = {value} out of range for {cols} columns")]
    ColumnIndexOutOfRange {
        position: usize,
        value: usize,
        cols: usize,
    },

    /// `buffer_length` must be at least 1.
    #[error("buffer_length must be at least 1")]
    ZeroRingCapacity,
}

pub type Result<T> = std::result::Result<T, LayoutError>;
