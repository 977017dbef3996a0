use std::io::{self, Read};

use crate::engine::{DeflateEngine, EngineStatus};
use crate::error::{Error, Result};
use crate::format::{
    BlockHeader, COMPRESSION_LEVEL, COMPRESS_OUT_CAPACITY, DEFAULT_CHUNK_SIZE, HEADER_SIZE,
};
use crate::stream::{Sink, Source};

/// Block-oriented DEFLATE transform.
///
/// `compress` reads the source in 4 KB chunks, pushes each chunk through
/// the engine with a sync flush, and frames the result as
/// `[header][payload]` blocks. `decompress` walks those blocks back into
/// the original bytes. Each call owns a fresh engine stream and fresh
/// scratch buffers; nothing persists across calls, so a single codec value
/// can serve concurrent calls on disjoint stream pairs.
///
/// Seekable sources are always processed from offset 0 and have the
/// caller's position restored on every exit path, including errors.
/// Seekable sinks are rewound first and truncated to the exact output
/// length afterwards, so stale bytes from previous contents never survive.
pub struct BlockDeflateCodec {
    engine: Box<dyn DeflateEngine>,
}

impl BlockDeflateCodec {
    pub fn new(engine: Box<dyn DeflateEngine>) -> Self {
        Self { engine }
    }

    /// Name of the backing engine, for CLI display.
    pub fn engine_name(&self) -> &'static str {
        self.engine.name()
    }

    /// Compress the whole source into a block stream on `sink`.
    ///
    /// Returns the number of bytes written to the sink (headers included).
    pub fn compress<R: Source + ?Sized, W: Sink + ?Sized>(&self, source: &mut R, sink: &mut W) -> Result<u64> {
        let saved = source.position()?;
        let result = self.compress_inner(source, sink, saved.is_some());
        restore_position(source, saved, result)
    }

    /// Decompress a block stream from `source` into the original bytes on
    /// `sink`.
    ///
    /// Returns the number of raw bytes recovered.
    pub fn decompress<R: Source + ?Sized, W: Sink + ?Sized>(&self, source: &mut R, sink: &mut W) -> Result<u64> {
        let saved = source.position()?;
        let result = self.decompress_inner(source, sink, saved.is_some());
        restore_position(source, saved, result)
    }

    fn compress_inner<R: Source + ?Sized, W: Sink + ?Sized>(
        &self,
        source: &mut R,
        sink: &mut W,
        seekable: bool,
    ) -> Result<u64> {
        // Compress the whole content from the start. For a seekable source
        // the length is known, so a short source gets a correspondingly
        // short read buffer.
        let chunk_size = if seekable {
            source.seek_to(0)?;
            match source.byte_len()? {
                Some(len) => len.min(DEFAULT_CHUNK_SIZE as u64) as usize,
                None => DEFAULT_CHUNK_SIZE,
            }
        } else {
            DEFAULT_CHUNK_SIZE
        };
        if sink.is_seekable() {
            sink.seek_start()?;
        }

        let mut compressor = self.engine.compressor(COMPRESSION_LEVEL)?;
        let mut read_buf = vec![0u8; chunk_size];
        let mut out_buf = vec![0u8; COMPRESS_OUT_CAPACITY];
        let mut total = 0u64;

        loop {
            let raw_len = read_fill(source, &mut read_buf)?;
            if raw_len == 0 {
                break;
            }

            // The output buffer is oversized relative to the chunk, so one
            // sync-flush step always drains the entire chunk. Leftover
            // input here means the engine violated that invariant.
            let step = compressor.step(&read_buf[..raw_len], &mut out_buf);
            check_status(step.status)?;
            if step.consumed != raw_len {
                return Err(Error::InvalidOperation(format!(
                    "engine left {} of {} input bytes unconsumed after a sync-flush step",
                    raw_len - step.consumed,
                    raw_len
                )));
            }

            let header = BlockHeader {
                uncompressed_size: raw_len as u32,
                compressed_size: step.produced as u32,
            };
            sink.write_all(&header.to_bytes())?;
            sink.write_all(&out_buf[..step.produced])?;
            total += (HEADER_SIZE + step.produced) as u64;
        }

        sink.flush()?;
        if sink.is_seekable() {
            sink.truncate(total)?;
        }
        Ok(total)
    }

    fn decompress_inner<R: Source + ?Sized, W: Sink + ?Sized>(
        &self,
        source: &mut R,
        sink: &mut W,
        seekable: bool,
    ) -> Result<u64> {
        if seekable {
            source.seek_to(0)?;
        }
        if sink.is_seekable() {
            sink.seek_start()?;
        }

        let mut decompressor = self.engine.decompressor()?;
        let mut src_buf: Vec<u8> = Vec::new();
        let mut dst_buf: Vec<u8> = Vec::new();
        let mut header_buf = [0u8; HEADER_SIZE];
        let mut total = 0u64;

        loop {
            let got = read_fill(source, &mut header_buf)?;
            if got == 0 {
                break; // clean end of stream
            }
            if got < HEADER_SIZE {
                return Err(Error::CorruptStream(format!(
                    "truncated block header: {got} of {HEADER_SIZE} bytes"
                )));
            }
            let header = BlockHeader::from_bytes(&header_buf)?;
            let comp_len = header.compressed_size as usize;
            let raw_len = header.uncompressed_size as usize;

            // Scratch buffers grow by 1.5× and never shrink within a call.
            // The ceiling check in from_bytes bounds both requests.
            ensure_capacity(&mut src_buf, comp_len);
            ensure_capacity(&mut dst_buf, raw_len);

            let got = read_fill(source, &mut src_buf[..comp_len])?;
            if got < comp_len {
                return Err(Error::CorruptStream(format!(
                    "block payload truncated: {got} of {comp_len} bytes"
                )));
            }

            // An empty payload is valid only for a block declaring zero
            // compressed bytes; the engine is not stepped for it.
            let produced = if comp_len > 0 {
                let step = decompressor.step(&src_buf[..comp_len], &mut dst_buf[..raw_len]);
                check_status(step.status)?;
                if step.consumed != comp_len {
                    return Err(Error::CorruptStream(format!(
                        "engine consumed {} of {} declared payload bytes",
                        step.consumed, comp_len
                    )));
                }
                step.produced
            } else {
                0
            };

            if produced != raw_len {
                return Err(Error::CorruptStream(format!(
                    "block decompressed to {produced} bytes but header declares {raw_len}"
                )));
            }

            sink.write_all(&dst_buf[..produced])?;
            total += produced as u64;
        }

        sink.flush()?;
        if sink.is_seekable() {
            sink.truncate(total)?;
        }
        Ok(total)
    }
}

/// Walk the block headers of a stream without decompressing, returning one
/// `BlockHeader` per block. Payload bytes are read and discarded. The
/// source position is restored afterwards, same as the codec operations.
pub fn scan_blocks<R: Source + ?Sized>(source: &mut R) -> Result<Vec<BlockHeader>> {
    let saved = source.position()?;
    if saved.is_some() {
        source.seek_to(0)?;
    }
    let result = scan_inner(source);
    restore_position(source, saved, result)
}

fn scan_inner<R: Source + ?Sized>(source: &mut R) -> Result<Vec<BlockHeader>> {
    let mut headers = Vec::new();
    let mut header_buf = [0u8; HEADER_SIZE];
    let mut skip_buf: Vec<u8> = Vec::new();

    loop {
        let got = read_fill(source, &mut header_buf)?;
        if got == 0 {
            break;
        }
        if got < HEADER_SIZE {
            return Err(Error::CorruptStream(format!(
                "truncated block header: {got} of {HEADER_SIZE} bytes"
            )));
        }
        let header = BlockHeader::from_bytes(&header_buf)?;
        let comp_len = header.compressed_size as usize;
        ensure_capacity(&mut skip_buf, comp_len);
        let got = read_fill(source, &mut skip_buf[..comp_len])?;
        if got < comp_len {
            return Err(Error::CorruptStream(format!(
                "block payload truncated: {got} of {comp_len} bytes"
            )));
        }
        headers.push(header);
    }
    Ok(headers)
}

/// Run the restore-on-exit step shared by every operation: put a seekable
/// source back where the caller left it, even when the body failed. The
/// body's error wins over a restore failure.
fn restore_position<R: Source + ?Sized, T>(
    source: &mut R,
    saved: Option<u64>,
    result: Result<T>,
) -> Result<T> {
    let restored = match saved {
        Some(pos) => source.seek_to(pos).map_err(Error::from),
        None => Ok(()),
    };
    match (result, restored) {
        (Ok(value), Ok(())) => Ok(value),
        (Err(e), _) => Err(e),
        (Ok(_), Err(e)) => Err(e),
    }
}

/// Read until `buf` is full or the source is exhausted. Returns the byte
/// count, which is less than `buf.len()` only at end of stream.
fn read_fill<R: Read + ?Sized>(source: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match source.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Grow `buf` so at least `needed` bytes are addressable: 1.5× the current
/// size, or straight to `needed` when that is larger. Never shrinks.
fn ensure_capacity(buf: &mut Vec<u8>, needed: usize) {
    if buf.len() < needed {
        let grown = needed.max(buf.len() + buf.len() / 2);
        buf.resize(grown, 0);
    }
}

/// Map an engine status onto the error taxonomy. `Ok` is the only status
/// the codec ever expects mid-block: sync-flush steps never finalize the
/// stream, so even `StreamEnd` signals protocol misuse.
fn check_status(status: EngineStatus) -> Result<()> {
    match status {
        EngineStatus::Ok => Ok(()),
        EngineStatus::NeedDict => Err(Error::CorruptStream(
            "engine requested a preset dictionary".into(),
        )),
        EngineStatus::StreamError => {
            Err(Error::CorruptStream("engine stream state error".into()))
        }
        EngineStatus::DataError => Err(Error::CorruptStream(
            "engine rejected the compressed data".into(),
        )),
        EngineStatus::MemError => Err(Error::OutOfMemory),
        EngineStatus::StreamEnd => Err(Error::InvalidOperation(
            "engine reported end of stream mid-block".into(),
        )),
        EngineStatus::BufError => Err(Error::InvalidOperation(
            "engine made no progress with the buffers provided".into(),
        )),
        EngineStatus::VersionError => {
            Err(Error::Configuration("engine version mismatch".into()))
        }
    }
}
