use std::io;

/// Errors surfaced by `Compress`/`Decompress`.
///
/// Every structural violation of the block stream collapses into
/// `CorruptStream`; the caller cannot recover within the codec and must
/// abort the enclosing operation. Engine memory exhaustion and engine
/// version skew are kept distinct so callers can tell a bad stream from a
/// bad deployment.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("corrupt block stream: {0}")]
    CorruptStream(String),

    #[error("compression engine out of memory")]
    OutOfMemory,

    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    #[error("engine configuration error: {0}")]
    Configuration(String),

    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
