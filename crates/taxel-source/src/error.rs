/// Errors from byte sources and the pump thread.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// The capture file could not be opened.
    #[error("failed to open {path}: {source}")]
    Open {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An I/O error occurred while reading the stream.
    #[error("source read error: {0}")]
    Io(#[from] std::io::Error),

    /// The pump thread panicked.
    #[error("decode worker thread panicked")]
    Worker,
}

pub type Result<T> = std::result::Result<T, SourceError>;
