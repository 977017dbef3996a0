use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use clap::{Parser, Subcommand};

use blockflate_core::format::{DEFAULT_CHUNK_SIZE, HEADER_SIZE};
use blockflate_core::{scan_blocks, BlockDeflateCodec, ForwardOnly, Sink, Source};
use blockflate_engines::default_engine;

// ── CLI definition ─────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "blockflate",
    about = "Compress, decompress, and inspect block-framed DEFLATE streams",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compress a file into a block-deflate stream
    Compress {
        /// Source file ("-" reads stdin)
        input: PathBuf,
        /// Destination stream ("-" writes stdout)
        output: PathBuf,
    },
    /// Decompress a block-deflate stream back to raw bytes
    Decompress {
        /// Source stream ("-" reads stdin)
        input: PathBuf,
        /// Destination file ("-" writes stdout)
        output: PathBuf,
    },
    /// Print block framing statistics without decompressing
    Inspect {
        /// Block-deflate stream to inspect
        file: PathBuf,
        /// Print per-block details
        #[arg(long)]
        blocks: bool,
    },
}

// ── Helpers ────────────────────────────────────────────────────────────────

fn human_bytes(n: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut v = n as f64;
    let mut unit = 0;
    while v >= 1024.0 && unit < UNITS.len() - 1 {
        v /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} B", n)
    } else {
        format!("{:.2} {}", v, UNITS[unit])
    }
}

fn open_source(path: &PathBuf) -> anyhow::Result<Box<dyn Source>> {
    if path.to_str() == Some("-") {
        Ok(Box::new(ForwardOnly(io::stdin())))
    } else {
        let file = File::open(path).with_context(|| format!("opening input file {:?}", path))?;
        Ok(Box::new(file))
    }
}

fn open_sink(path: &PathBuf) -> anyhow::Result<Box<dyn Sink>> {
    if path.to_str() == Some("-") {
        Ok(Box::new(ForwardOnly(io::stdout())))
    } else {
        let file =
            File::create(path).with_context(|| format!("creating output file {:?}", path))?;
        Ok(Box::new(file))
    }
}

// ── Subcommand implementations ─────────────────────────────────────────────

fn run_compress(input: PathBuf, output: PathBuf) -> anyhow::Result<()> {
    let codec = BlockDeflateCodec::new(default_engine());
    let mut source = open_source(&input)?;
    let mut sink = open_sink(&output)?;

    let t0 = Instant::now();
    let written = codec.compress(source.as_mut(), sink.as_mut())?;
    let elapsed = t0.elapsed();

    let raw_bytes = match source.as_mut().byte_len()? {
        Some(len) => len,
        None => 0, // stdin: length unknown
    };

    eprintln!("  engine      : {}", codec.engine_name());
    eprintln!("  chunk size  : {}", human_bytes(DEFAULT_CHUNK_SIZE as u64));
    if raw_bytes > 0 {
        eprintln!("  raw size    : {}", human_bytes(raw_bytes));
        eprintln!("  ratio       : {:.2}x", raw_bytes as f64 / written.max(1) as f64);
    }
    eprintln!("  compressed  : {}", human_bytes(written));
    eprintln!(
        "  throughput  : {}/s",
        human_bytes((written as f64 / elapsed.as_secs_f64()) as u64)
    );
    eprintln!("  elapsed     : {:.3}s", elapsed.as_secs_f64());
    Ok(())
}

fn run_decompress(input: PathBuf, output: PathBuf) -> anyhow::Result<()> {
    let codec = BlockDeflateCodec::new(default_engine());
    let mut source = open_source(&input)?;
    let mut sink = open_sink(&output)?;

    let t0 = Instant::now();
    let raw = codec.decompress(source.as_mut(), sink.as_mut())?;
    let elapsed = t0.elapsed();

    eprintln!("  raw size    : {}", human_bytes(raw));
    eprintln!(
        "  throughput  : {}/s",
        human_bytes((raw as f64 / elapsed.as_secs_f64()) as u64)
    );
    eprintln!("  elapsed     : {:.3}s", elapsed.as_secs_f64());
    Ok(())
}

fn run_inspect(file: PathBuf, show_blocks: bool) -> anyhow::Result<()> {
    let mut f = File::open(&file).with_context(|| format!("opening file {:?}", file))?;
    let headers = scan_blocks(&mut f)?;

    let raw_total: u64 = headers.iter().map(|h| h.uncompressed_size as u64).sum();
    let payload_total: u64 = headers.iter().map(|h| h.compressed_size as u64).sum();
    let header_total = headers.len() as u64 * HEADER_SIZE as u64;
    let stream_total = payload_total + header_total;

    println!("=== Block-deflate stream: {:?} ===", file);
    println!();
    println!("  block count    : {}", headers.len());
    println!("  raw size       : {}", human_bytes(raw_total));
    println!("  payload bytes  : {}", human_bytes(payload_total));
    println!("  header bytes   : {}", human_bytes(header_total));
    println!("  stream size    : {}", human_bytes(stream_total));
    println!(
        "  ratio          : {:.2}x",
        raw_total as f64 / stream_total.max(1) as f64
    );

    if show_blocks {
        println!();
        println!("  {:>8}  {:>12}  {:>12}  {:>8}", "block", "raw", "compressed", "ratio");
        println!("  {}", "-".repeat(48));
        for (i, h) in headers.iter().enumerate() {
            println!(
                "  {:>8}  {:>12}  {:>12}  {:>7.2}x",
                i,
                human_bytes(h.uncompressed_size as u64),
                human_bytes(h.compressed_size as u64),
                h.uncompressed_size as f64 / (h.compressed_size as f64).max(1.0)
            );
        }
    }

    Ok(())
}

// ── Entry point ────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Compress { input, output } => run_compress(input, output),
        Commands::Decompress { input, output } => run_decompress(input, output),
        Commands::Inspect { file, blocks } => run_inspect(file, blocks),
    }
}
