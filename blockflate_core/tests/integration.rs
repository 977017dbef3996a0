//! End-to-end tests of the block-deflate codec against the real flate2
//! engine: round-trips, block framing boundaries, corruption detection,
//! sink truncation, and source position restoration.
use std::io::Cursor;

use blockflate_core::error::Error;
use blockflate_core::format::{BLOCK_MAGIC, DEFAULT_CHUNK_SIZE, HEADER_SIZE, MAX_BLOCK_SIZE};
use blockflate_core::{scan_blocks, BlockDeflateCodec, ForwardOnly};
use blockflate_engines::FlateEngine;

/// Generate `len` deterministic bytes using a simple LCG.
fn pseudo_random_bytes(len: usize, seed: u64) -> Vec<u8> {
    let mut rng = seed;
    (0..len)
        .map(|_| {
            rng = rng
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            (rng >> 56) as u8
        })
        .collect()
}

/// Generate `len` highly compressible bytes (repeating pattern).
fn compressible_bytes(len: usize) -> Vec<u8> {
    let pattern = b"the quick brown fox jumps over the lazy dog. ";
    (0..len).map(|i| pattern[i % pattern.len()]).collect()
}

// ── helpers ────────────────────────────────────────────────────────────────

fn codec() -> BlockDeflateCodec {
    BlockDeflateCodec::new(Box::new(FlateEngine))
}

fn compress_vec(data: &[u8]) -> Vec<u8> {
    let mut source = Cursor::new(data.to_vec());
    let mut sink = Cursor::new(Vec::new());
    let written = codec().compress(&mut source, &mut sink).unwrap();
    let out = sink.into_inner();
    assert_eq!(written, out.len() as u64);
    out
}

fn decompress_vec(stream: &[u8]) -> blockflate_core::Result<Vec<u8>> {
    let mut source = Cursor::new(stream.to_vec());
    let mut sink = Cursor::new(Vec::new());
    codec().decompress(&mut source, &mut sink)?;
    Ok(sink.into_inner())
}

/// Build a raw 12-byte header with arbitrary field values.
fn raw_header(token: u32, uncompressed: u32, compressed: u32) -> Vec<u8> {
    let mut buf = Vec::with_capacity(HEADER_SIZE);
    buf.extend_from_slice(&token.to_le_bytes());
    buf.extend_from_slice(&uncompressed.to_le_bytes());
    buf.extend_from_slice(&compressed.to_le_bytes());
    buf
}

// ── round-trips ────────────────────────────────────────────────────────────

#[test]
fn test_roundtrip_empty() {
    let stream = compress_vec(&[]);
    assert!(stream.is_empty(), "zero input bytes should produce zero blocks");
    assert_eq!(decompress_vec(&stream).unwrap(), Vec::<u8>::new());
}

#[test]
fn test_roundtrip_small() {
    let data = b"a small payload that fits in one partial block";
    let stream = compress_vec(data);
    assert_eq!(decompress_vec(&stream).unwrap(), data);
}

#[test]
fn test_roundtrip_multi_block_compressible() {
    let data = compressible_bytes(4 * DEFAULT_CHUNK_SIZE + 1234);
    let stream = compress_vec(&data);
    assert_eq!(decompress_vec(&stream).unwrap(), data);

    let headers = scan_blocks(&mut Cursor::new(stream.clone())).unwrap();
    assert_eq!(headers.len(), 5); // 4 full + 1 partial

    // Compressible input should shrink despite per-block framing overhead
    assert!(
        stream.len() < data.len(),
        "compressible data should shrink: stream={} raw={}",
        stream.len(),
        data.len()
    );
}

#[test]
fn test_roundtrip_random() {
    let data = pseudo_random_bytes(3 * DEFAULT_CHUNK_SIZE + 7, 0xDEAD_BEEF);
    let stream = compress_vec(&data);
    assert_eq!(decompress_vec(&stream).unwrap(), data);
}

// ── framing ────────────────────────────────────────────────────────────────

#[test]
fn test_chunk_alignment() {
    let exact = compress_vec(&compressible_bytes(DEFAULT_CHUNK_SIZE));
    let headers = scan_blocks(&mut Cursor::new(exact)).unwrap();
    assert_eq!(headers.len(), 1);
    assert_eq!(headers[0].uncompressed_size as usize, DEFAULT_CHUNK_SIZE);

    let over = compress_vec(&compressible_bytes(DEFAULT_CHUNK_SIZE + 1));
    let headers = scan_blocks(&mut Cursor::new(over)).unwrap();
    assert_eq!(headers.len(), 2);
    assert_eq!(headers[0].uncompressed_size as usize, DEFAULT_CHUNK_SIZE);
    assert_eq!(headers[1].uncompressed_size, 1);
}

#[test]
fn test_framing_deterministic() {
    let data = pseudo_random_bytes(2 * DEFAULT_CHUNK_SIZE + 99, 0x1234_5678);
    let first = compress_vec(&data);
    let second = compress_vec(&data);
    assert_eq!(first, second, "same input and engine must frame identically");
}

#[test]
fn test_empty_block_rules() {
    // A block declaring zero compressed and zero raw bytes is valid.
    let stream = raw_header(BLOCK_MAGIC, 0, 0);
    assert_eq!(decompress_vec(&stream).unwrap(), Vec::<u8>::new());

    // Zero compressed bytes cannot yield nonzero raw bytes.
    let stream = raw_header(BLOCK_MAGIC, 5, 0);
    let err = decompress_vec(&stream).unwrap_err();
    assert!(matches!(err, Error::CorruptStream(_)), "got: {err}");
}

// ── corruption detection ───────────────────────────────────────────────────

#[test]
fn test_corrupt_magic_rejected() {
    let mut stream = compress_vec(b"some bytes worth framing");
    stream[0] ^= 0x01; // flip one bit of the token
    let err = decompress_vec(&stream).unwrap_err();
    assert!(matches!(err, Error::CorruptStream(_)), "got: {err}");
}

#[test]
fn test_size_ceiling_rejected() {
    // One byte over the ceiling; must fail before any payload is read.
    let stream = raw_header(BLOCK_MAGIC, MAX_BLOCK_SIZE + 1, 0);
    let err = decompress_vec(&stream).unwrap_err();
    assert!(matches!(err, Error::CorruptStream(_)), "got: {err}");

    let stream = raw_header(BLOCK_MAGIC, 0, MAX_BLOCK_SIZE + 1);
    let err = decompress_vec(&stream).unwrap_err();
    assert!(matches!(err, Error::CorruptStream(_)), "got: {err}");
}

#[test]
fn test_truncated_header_rejected() {
    let stream = compress_vec(b"payload");
    let err = decompress_vec(&stream[..5]).unwrap_err();
    assert!(matches!(err, Error::CorruptStream(_)), "got: {err}");
}

#[test]
fn test_truncated_payload_rejected() {
    let stream = compress_vec(&compressible_bytes(1000));
    let err = decompress_vec(&stream[..stream.len() - 1]).unwrap_err();
    assert!(matches!(err, Error::CorruptStream(_)), "got: {err}");
}

// ── sink truncation ────────────────────────────────────────────────────────

#[test]
fn test_compress_truncates_stale_sink() {
    let mut source = Cursor::new(compressible_bytes(300));
    let mut sink = Cursor::new(vec![0xAB; 64 * 1024]); // stale prior contents
    let written = codec().compress(&mut source, &mut sink).unwrap();
    let out = sink.into_inner();
    assert_eq!(out.len() as u64, written, "stale tail must be truncated away");
}

#[test]
fn test_decompress_truncates_stale_sink() {
    let data = compressible_bytes(500);
    let stream = compress_vec(&data);
    let mut source = Cursor::new(stream);
    let mut sink = Cursor::new(vec![0xCD; 32 * 1024]);
    let raw = codec().decompress(&mut source, &mut sink).unwrap();
    assert_eq!(raw, data.len() as u64);
    assert_eq!(sink.into_inner(), data);
}

// ── position restoration ───────────────────────────────────────────────────

#[test]
fn test_source_position_restored_after_compress() {
    let mut source = Cursor::new(compressible_bytes(10_000));
    source.set_position(37);
    let mut sink = Cursor::new(Vec::new());
    codec().compress(&mut source, &mut sink).unwrap();
    assert_eq!(source.position(), 37);

    // The whole source is compressed regardless of the starting offset.
    assert_eq!(
        decompress_vec(&sink.into_inner()).unwrap(),
        compressible_bytes(10_000)
    );
}

#[test]
fn test_source_position_restored_after_decompress_error() {
    let mut stream = compress_vec(&compressible_bytes(2000));
    stream[0] ^= 0x01;
    let mut source = Cursor::new(stream);
    source.set_position(5);
    let mut sink = Cursor::new(Vec::new());
    let err = codec().decompress(&mut source, &mut sink).unwrap_err();
    assert!(matches!(err, Error::CorruptStream(_)));
    assert_eq!(source.position(), 5, "position must be restored on the error path");
}

// ── forward-only streams ───────────────────────────────────────────────────

#[test]
fn test_forward_only_roundtrip() {
    let data = compressible_bytes(3 * DEFAULT_CHUNK_SIZE + 17);

    let mut source = ForwardOnly(data.as_slice());
    let mut sink = ForwardOnly(Vec::new());
    codec().compress(&mut source, &mut sink).unwrap();
    let stream = sink.into_inner();

    // Forward-only framing matches the seekable path byte for byte.
    assert_eq!(stream, compress_vec(&data));

    let mut source = ForwardOnly(stream.as_slice());
    let mut sink = ForwardOnly(Vec::new());
    codec().decompress(&mut source, &mut sink).unwrap();
    assert_eq!(sink.into_inner(), data);
}
