//! Seekable readers over lump content.

use std::fs::File;
use std::io::{self, Cursor, Read, Seek, SeekFrom};
use std::sync::Arc;

/// A byte range view into a shared buffer.
///
/// Cloning is cheap: only the `Arc` is cloned, the bytes are shared.
#[derive(Clone, Debug)]
pub struct SharedSlice {
    data: Arc<[u8]>,
    start: usize,
    end: usize,
}

impl SharedSlice {
    /// View `len` bytes of `data` starting at `start`, clamped to the buffer.
    pub fn new(data: Arc<[u8]>, start: usize, len: usize) -> Self {
        let start = start.min(data.len());
        let end = start.saturating_add(len).min(data.len());
        Self { data, start, end }
    }

    pub fn whole(data: Arc<[u8]>) -> Self {
        let end = data.len();
        Self {
            data,
            start: 0,
            end,
        }
    }
}

impl AsRef<[u8]> for SharedSlice {
    fn as_ref(&self) -> &[u8] {
        &self.data[self.start..self.end]
    }
}

/// A window of `len` bytes starting at `start` inside an open file.
#[derive(Debug)]
pub struct FilePart {
    file: File,
    start: u64,
    len: u64,
    pos: u64,
}

impl FilePart {
    pub fn new(mut file: File, start: u64, len: u64) -> io::Result<Self> {
        file.seek(SeekFrom::Start(start))?;
        Ok(Self {
            file,
            start,
            len,
            pos: 0,
        })
    }
}

impl Read for FilePart {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let remaining = self.len.saturating_sub(self.pos);
        if remaining == 0 {
            return Ok(0);
        }
        let max = buf.len().min(usize::try_from(remaining).unwrap_or(usize::MAX));
        let read = self.file.read(&mut buf[..max])?;
        self.pos += read as u64;
        Ok(read)
    }
}

impl Seek for FilePart {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let target = match pos {
            SeekFrom::Start(offset) => Some(offset),
            SeekFrom::End(delta) => self.len.checked_add_signed(delta),
            SeekFrom::Current(delta) => self.pos.checked_add_signed(delta),
        };
        let Some(target) = target else {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "invalid seek to a negative or overflowing position",
            ));
        };
        self.file.seek(SeekFrom::Start(self.start + target))?;
        self.pos = target;
        Ok(target)
    }
}

/// Reader returned by [`FileSystem::open_reader`](crate::FileSystem::open_reader).
///
/// Stored lumps are served straight from the owning container (a file window or a
/// slice of an in-memory container); anything that needs decoding is read into a
/// buffer first.
#[derive(Debug)]
pub enum LumpReader {
    /// Window into a container file on disk.
    File(FilePart),
    /// Window into an in-memory container.
    Shared(Cursor<SharedSlice>),
    /// Fully buffered content.
    Buffer(Cursor<Vec<u8>>),
}

impl LumpReader {
    pub fn empty() -> Self {
        LumpReader::Buffer(Cursor::new(Vec::new()))
    }

    /// Total length of the content in bytes.
    pub fn len(&self) -> u64 {
        match self {
            LumpReader::File(part) => part.len,
            LumpReader::Shared(cursor) => cursor.get_ref().as_ref().len() as u64,
            LumpReader::Buffer(cursor) => cursor.get_ref().len() as u64,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the bytes already live in memory.
    pub fn is_buffered(&self) -> bool {
        !matches!(self, LumpReader::File(_))
    }
}

impl Read for LumpReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            LumpReader::File(part) => part.read(buf),
            LumpReader::Shared(cursor) => cursor.read(buf),
            LumpReader::Buffer(cursor) => cursor.read(buf),
        }
    }
}

impl Seek for LumpReader {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        match self {
            LumpReader::File(part) => part.seek(pos),
            LumpReader::Shared(cursor) => cursor.seek(pos),
            LumpReader::Buffer(cursor) => cursor.seek(pos),
        }
    }
}
