pub mod codec;
pub mod engine;
pub mod error;
pub mod format;
pub mod stream;

pub use codec::{scan_blocks, BlockDeflateCodec};
pub use engine::{DeflateEngine, EngineStatus, EngineStream, Step};
pub use error::{Error, Result};
pub use format::{BlockHeader, BLOCK_MAGIC, HEADER_SIZE, MAX_BLOCK_SIZE};
pub use stream::{ForwardOnly, Sink, Source};
