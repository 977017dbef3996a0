use flate2::{Compress, Compression, Decompress, FlushCompress, FlushDecompress, Status};

use blockflate_core::engine::{DeflateEngine, EngineStatus, EngineStream, Step};
use blockflate_core::error::{Error, Result};

/// zlib-format DEFLATE engine backed by `flate2`.
///
/// Each codec call gets its own `Compress`/`Decompress` state machine,
/// driven one sync-flush step per block. Consumed/produced byte counts
/// come from the `total_in`/`total_out` deltas around each step.
pub struct FlateEngine;

impl DeflateEngine for FlateEngine {
    fn name(&self) -> &'static str {
        "flate2/zlib"
    }

    fn compressor(&self, level: u32) -> Result<Box<dyn EngineStream>> {
        if level > 9 {
            return Err(Error::Configuration(format!(
                "deflate level {level} out of range 0-9"
            )));
        }
        Ok(Box::new(FlateCompressor {
            inner: Compress::new(Compression::new(level), true),
        }))
    }

    fn decompressor(&self) -> Result<Box<dyn EngineStream>> {
        Ok(Box::new(FlateDecompressor {
            inner: Decompress::new(true),
        }))
    }
}

struct FlateCompressor {
    inner: Compress,
}

impl EngineStream for FlateCompressor {
    fn step(&mut self, input: &[u8], output: &mut [u8]) -> Step {
        let before_in = self.inner.total_in();
        let before_out = self.inner.total_out();
        let status = match self.inner.compress(input, output, FlushCompress::Sync) {
            Ok(Status::Ok) => EngineStatus::Ok,
            Ok(Status::BufError) => EngineStatus::BufError,
            Ok(Status::StreamEnd) => EngineStatus::StreamEnd,
            Err(_) => EngineStatus::StreamError,
        };
        Step {
            consumed: (self.inner.total_in() - before_in) as usize,
            produced: (self.inner.total_out() - before_out) as usize,
            status,
        }
    }
}

struct FlateDecompressor {
    inner: Decompress,
}

impl EngineStream for FlateDecompressor {
    fn step(&mut self, input: &[u8], output: &mut [u8]) -> Step {
        let before_in = self.inner.total_in();
        let before_out = self.inner.total_out();
        let status = match self.inner.decompress(input, output, FlushDecompress::Sync) {
            Ok(Status::Ok) => EngineStatus::Ok,
            Ok(Status::BufError) => EngineStatus::BufError,
            Ok(Status::StreamEnd) => EngineStatus::StreamEnd,
            Err(e) if e.needs_dictionary().is_some() => EngineStatus::NeedDict,
            Err(_) => EngineStatus::DataError,
        };
        Step {
            consumed: (self.inner.total_in() - before_in) as usize,
            produced: (self.inner.total_out() - before_out) as usize,
            status,
        }
    }
}
