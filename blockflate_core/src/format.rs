use crate::error::{Error, Result};

/// Magic token opening every block header.
pub const BLOCK_MAGIC: u32 = 0x0FA0;

/// Fixed size of a block header in bytes.
///   token:u32 + uncompressed_size:u32 + compressed_size:u32 = 12
pub const HEADER_SIZE: usize = 12;

/// Hard ceiling on the declared compressed/uncompressed size of a single
/// block. A header declaring more than this is treated as corrupt before
/// any buffer is sized from it.
pub const MAX_BLOCK_SIZE: u32 = 0xF_FFFF;

/// Raw bytes read from the source per compress iteration: 4 KB.
pub const DEFAULT_CHUNK_SIZE: usize = 0x1000;

/// DEFLATE level used when producing blocks. Fixed by the stream format;
/// not configurable.
pub const COMPRESSION_LEVEL: u32 = 9;

/// Capacity of the compress-side output buffer: 1.5 × the chunk size.
/// Large enough that one chunk always compresses to completion in a single
/// sync-flush step, even when the data expands.
pub const COMPRESS_OUT_CAPACITY: usize = DEFAULT_CHUNK_SIZE + DEFAULT_CHUNK_SIZE / 2;

// ── Block header ───────────────────────────────────────────────────────────

/// Decoded representation of the 12-byte block header.
///
/// The on-stream layout is three little-endian u32 fields back-to-back:
/// `[token][uncompressed_size][compressed_size]`, immediately followed by
/// `compressed_size` payload bytes. There is no trailer; the stream ends
/// where the headers run out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockHeader {
    /// Size of the decompressed payload for this block.
    pub uncompressed_size: u32,
    /// Size of the compressed payload that follows the header.
    pub compressed_size: u32,
}

impl BlockHeader {
    /// Serialize to exactly `HEADER_SIZE` bytes.
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut buf = [0u8; HEADER_SIZE];
        buf[0..4].copy_from_slice(&BLOCK_MAGIC.to_le_bytes());
        buf[4..8].copy_from_slice(&self.uncompressed_size.to_le_bytes());
        buf[8..12].copy_from_slice(&self.compressed_size.to_le_bytes());
        buf
    }

    /// Deserialize from `HEADER_SIZE` bytes, checking the magic token and
    /// the per-block size ceiling.
    pub fn from_bytes(buf: &[u8; HEADER_SIZE]) -> Result<Self> {
        let token = u32::from_le_bytes(buf[0..4].try_into().unwrap());
        if token != BLOCK_MAGIC {
            return Err(Error::CorruptStream(format!(
                "bad block token 0x{token:08x} (expected 0x{BLOCK_MAGIC:08x})"
            )));
        }
        let uncompressed_size = u32::from_le_bytes(buf[4..8].try_into().unwrap());
        let compressed_size = u32::from_le_bytes(buf[8..12].try_into().unwrap());
        if uncompressed_size > MAX_BLOCK_SIZE || compressed_size > MAX_BLOCK_SIZE {
            return Err(Error::CorruptStream(format!(
                "declared block sizes {uncompressed_size}/{compressed_size} exceed ceiling {MAX_BLOCK_SIZE}"
            )));
        }
        Ok(Self {
            uncompressed_size,
            compressed_size,
        })
    }
}
