use crate::error::Result;

/// Status reported by the engine after one step, mirroring the zlib
/// return-code set. The codec maps non-`Ok` statuses onto the error
/// taxonomy in [`crate::error::Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineStatus {
    /// Step completed; all producible output was emitted.
    Ok,
    /// The engine reached the end of its compressed stream.
    StreamEnd,
    /// A preset dictionary is required to continue.
    NeedDict,
    /// The engine's internal stream state is inconsistent.
    StreamError,
    /// The input violates the compressed-data format.
    DataError,
    /// The engine could not allocate working memory.
    MemError,
    /// No progress was possible with the buffers provided.
    BufError,
    /// The caller and the linked engine build disagree on version.
    VersionError,
}

/// Outcome of one engine step.
#[derive(Debug, Clone, Copy)]
pub struct Step {
    /// Bytes of `input` the engine consumed.
    pub consumed: usize,
    /// Bytes the engine wrote into `output`.
    pub produced: usize,
    pub status: EngineStatus,
}

/// One direction of a DEFLATE stream, holding the engine state for a
/// single codec call.
///
/// `step` uses sync-flush semantics: all provided input is drained and all
/// producible output is emitted before the call returns, without
/// finalizing the overall stream. This is what lets each block be framed
/// independently while the engine state continues across blocks.
pub trait EngineStream {
    fn step(&mut self, input: &[u8], output: &mut [u8]) -> Step;
}

/// Factory for engine stream state — the opaque boundary in front of
/// whatever DEFLATE-compatible library backs the codec.
///
/// Implementations live outside this crate (see `blockflate_engines` for
/// the flate2 binding). Initialization may fail with a configuration or
/// out-of-memory error; a successfully created stream is owned by exactly
/// one in-flight codec call and dropped when it finishes, releasing any
/// native state deterministically.
pub trait DeflateEngine: Send + Sync {
    /// Human-readable engine name for CLI display.
    fn name(&self) -> &'static str;

    /// Initialize compression state at the given DEFLATE level.
    fn compressor(&self, level: u32) -> Result<Box<dyn EngineStream>>;

    /// Initialize decompression state.
    fn decompressor(&self) -> Result<Box<dyn EngineStream>>;
}
