//! Stream capability traits for the codec.
//!
//! The codec treats seekability as optional: a seekable source is always
//! compressed from offset 0 and has the caller's position restored
//! afterwards, and a seekable sink is rewound before writing and truncated
//! to the exact output length afterwards. Forward-only streams skip all of
//! that and are simply consumed/appended in place.

use std::fs::File;
use std::io::{self, Cursor, Read, Seek, SeekFrom, Write};

/// Readable input for the codec, with optional random access.
pub trait Source: Read {
    /// Current byte offset, or `None` for forward-only sources.
    fn position(&mut self) -> io::Result<Option<u64>> {
        Ok(None)
    }

    /// Reposition to `offset`. Only called on sources whose `position`
    /// returns `Some`.
    fn seek_to(&mut self, offset: u64) -> io::Result<()> {
        let _ = offset;
        Ok(())
    }

    /// Total length in bytes, when cheaply known without consuming the
    /// stream.
    fn byte_len(&mut self) -> io::Result<Option<u64>> {
        Ok(None)
    }
}

/// Writable output for the codec, with optional rewind/truncate support.
pub trait Sink: Write {
    fn is_seekable(&self) -> bool {
        false
    }

    /// Rewind to offset 0. Only called when `is_seekable()`.
    fn seek_start(&mut self) -> io::Result<()> {
        Ok(())
    }

    /// Truncate to exactly `len` bytes, discarding any stale tail left
    /// over from previous contents. No-op for forward-only sinks.
    fn truncate(&mut self, len: u64) -> io::Result<()> {
        let _ = len;
        Ok(())
    }
}

// ── File ───────────────────────────────────────────────────────────────────

impl Source for File {
    fn position(&mut self) -> io::Result<Option<u64>> {
        self.stream_position().map(Some)
    }

    fn seek_to(&mut self, offset: u64) -> io::Result<()> {
        self.seek(SeekFrom::Start(offset)).map(|_| ())
    }

    fn byte_len(&mut self) -> io::Result<Option<u64>> {
        self.metadata().map(|m| Some(m.len()))
    }
}

impl Sink for File {
    fn is_seekable(&self) -> bool {
        true
    }

    fn seek_start(&mut self) -> io::Result<()> {
        self.seek(SeekFrom::Start(0)).map(|_| ())
    }

    fn truncate(&mut self, len: u64) -> io::Result<()> {
        self.set_len(len)
    }
}

// ── In-memory cursors ──────────────────────────────────────────────────────

impl<T: AsRef<[u8]>> Source for Cursor<T> {
    fn position(&mut self) -> io::Result<Option<u64>> {
        Ok(Some(Cursor::position(self)))
    }

    fn seek_to(&mut self, offset: u64) -> io::Result<()> {
        self.set_position(offset);
        Ok(())
    }

    fn byte_len(&mut self) -> io::Result<Option<u64>> {
        Ok(Some(self.get_ref().as_ref().len() as u64))
    }
}

impl Sink for Cursor<Vec<u8>> {
    fn is_seekable(&self) -> bool {
        true
    }

    fn seek_start(&mut self) -> io::Result<()> {
        self.set_position(0);
        Ok(())
    }

    fn truncate(&mut self, len: u64) -> io::Result<()> {
        self.get_mut().truncate(len as usize);
        Ok(())
    }
}

// ── Forward-only adapter ───────────────────────────────────────────────────

/// Wraps any `Read`/`Write` as a strictly forward-only source/sink,
/// suppressing seekability even when the inner stream would support it.
/// Used for stdin/stdout plumbing and for exercising the non-seekable
/// codec paths.
pub struct ForwardOnly<T>(pub T);

impl<T> ForwardOnly<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T: Read> Read for ForwardOnly<T> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.0.read(buf)
    }
}

impl<T: Write> Write for ForwardOnly<T> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.0.flush()
    }
}

impl<T: Read> Source for ForwardOnly<T> {}

impl<T: Write> Sink for ForwardOnly<T> {}
