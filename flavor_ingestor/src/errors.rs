use std::path::PathBuf;

use thiserror::Error;

/// The unified error type for the `flavor_ingestor` crate.
#[derive(Debug, Error)]
pub enum Error {
    /// A line of an NDJSON dump could not be decoded into the expected record.
    #[error("{}:{line}: malformed record: {source}", path.display())]
    MalformedLine {
        /// File the line was read from.
        path: PathBuf,
        /// One-based line number.
        line: usize,
        /// Underlying decode error.
        source: serde_json::Error,
    },

    /// A cached response could not be decoded.
    #[error("corrupt cache entry {key}: {source}")]
    CorruptCacheEntry {
        /// Cache key of the entry.
        key: String,
        /// Underlying decode error.
        source: serde_json::Error,
    },

    /// A generic I/O error.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// File or directory being accessed.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}
