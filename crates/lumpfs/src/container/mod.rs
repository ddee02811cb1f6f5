//! Resource containers.
//!
//! A [`ResourceFile`] is one opened archive or directory. It exposes an ordered list
//! of [`ResourceEntry`] values and knows how to hand out a reader for each of them.
//! The set of formats is closed:
//!
//! - **WAD** (`IWAD`/`PWAD`): flat 8-character lump names, namespaces from marker lumps.
//! - **ZIP**: hierarchical names, decoded through the `zip` crate.
//! - **Directory**: every regular file below a directory on disk.
//! - **Lump**: any other file, exposed as a single lump named after the file.

mod archive;
mod directory;
mod lump;
mod wad;

use crate::error::{Error, Result};
use crate::namespace::Namespace;
use crate::reader::{FilePart, LumpReader, SharedSlice};
use crate::settings::LoadSettings;
use bitflags::bitflags;
use camino::{Utf8Path, Utf8PathBuf};
use md5::{Digest, Md5};
use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek};
use std::sync::{Arc, OnceLock};

bitflags! {
    /// Per-entry flags.
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct LumpFlags: u32 {
        /// Might be a flat outside of a flat namespace.
        const MAYBE_FLAT = 1 << 0;
        /// Only addressable by its full name; excluded from the global short name fallback.
        const FULL_PATH = 1 << 1;
        /// A nested container that gets opened on its own.
        const EMBEDDED = 1 << 2;
        /// Flat 8-character name with a container-assigned namespace.
        const SHORT_NAME = 1 << 3;
        /// Needs decoding before it can be read.
        const COMPRESSED = 1 << 4;
    }
}

/// Where the bytes of an entry live.
#[derive(Debug, Clone)]
pub(crate) enum EntryLocation {
    /// Stored verbatim at `offset` inside the container source.
    Range { offset: u64 },
    /// Member of a ZIP archive that needs decoding.
    ZipMember { index: usize },
    /// A file on disk (directory containers).
    Path(Utf8PathBuf),
}

/// One entry exposed by a container.
#[derive(Debug, Clone)]
pub struct ResourceEntry {
    /// Entry name as stored by the container, normalized for path-based formats.
    pub name: String,
    /// Uncompressed size in bytes.
    pub size: u64,
    pub flags: LumpFlags,
    /// Namespace assigned by the container. Only meaningful for [`LumpFlags::SHORT_NAME`] entries.
    pub namespace: Namespace,
    /// Numeric id supplied by the container format, if any.
    pub resource_id: Option<u32>,
    pub(crate) location: EntryLocation,
}

impl ResourceEntry {
    pub(crate) fn new(name: String, size: u64, location: EntryLocation) -> Self {
        Self {
            name,
            size,
            flags: LumpFlags::empty(),
            namespace: Namespace::GLOBAL,
            resource_id: None,
            location,
        }
    }

    /// Byte offset inside the container, when the entry is stored verbatim.
    pub fn file_offset(&self) -> Option<u64> {
        match self.location {
            EntryLocation::Range { offset } => Some(offset),
            _ => None,
        }
    }
}

/// Backing storage of a container.
#[derive(Debug, Clone)]
pub enum ContainerSource {
    /// A regular file on disk.
    File(Utf8PathBuf),
    /// An in-memory image, used for nested containers and caller-supplied buffers.
    Memory(Arc<[u8]>),
    /// A directory tree on disk.
    Directory(Utf8PathBuf),
}

/// Detected container format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerKind {
    Wad,
    Zip,
    Directory,
    Lump,
}

const WAD_MAGICS: [&[u8; 4]; 2] = [b"IWAD", b"PWAD"];
const ZIP_MAGIC: &[u8; 4] = b"PK\x03\x04";

/// One opened archive or directory.
#[derive(Debug)]
pub struct ResourceFile {
    file_name: String,
    source: ContainerSource,
    kind: ContainerKind,
    entries: Vec<ResourceEntry>,
    first_entry: usize,
    hash: OnceLock<Option<String>>,
}

impl ResourceFile {
    /// Open a container, sniffing its format from the first bytes.
    ///
    /// `file_name` is the name used in messages and container queries; for nested
    /// containers it has the form `parent:entry`.
    pub fn open(file_name: &str, source: ContainerSource, settings: &LoadSettings) -> Result<Self> {
        let (kind, entries) = match &source {
            ContainerSource::Directory(path) => (
                ContainerKind::Directory,
                directory::read_entries(path, settings)?,
            ),
            ContainerSource::File(path) => {
                let mut reader = BufReader::new(File::open(path.as_std_path())?);
                let kind = sniff(&mut reader)?;
                (kind, read_entries(kind, file_name, reader, settings)?)
            }
            ContainerSource::Memory(data) => {
                let mut reader = Cursor::new(data.clone());
                let kind = sniff(&mut reader)?;
                (kind, read_entries(kind, file_name, reader, settings)?)
            }
        };

        tracing::debug!(
            "Opened {:?} container '{}' with {} entries",
            kind,
            file_name,
            entries.len()
        );

        Ok(Self {
            file_name: file_name.to_string(),
            source,
            kind,
            entries,
            first_entry: 0,
            hash: OnceLock::new(),
        })
    }

    /// Open a path, choosing the directory or file backend.
    pub fn open_path(path: &Utf8Path, settings: &LoadSettings) -> Result<Self> {
        let source = if path.as_std_path().is_dir() {
            ContainerSource::Directory(path.to_path_buf())
        } else {
            ContainerSource::File(path.to_path_buf())
        };
        Self::open(path.as_str(), source, settings)
    }

    /// Full name the container was opened with.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn kind(&self) -> ContainerKind {
        self.kind
    }

    pub fn source(&self) -> &ContainerSource {
        &self.source
    }

    pub fn entries(&self) -> &[ResourceEntry] {
        &self.entries
    }

    pub fn entry(&self, slot: usize) -> Option<&ResourceEntry> {
        self.entries.get(slot)
    }

    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    /// Index of this container's first lump in the lump directory.
    pub fn first_entry(&self) -> usize {
        self.first_entry
    }

    pub(crate) fn set_first_entry(&mut self, first: usize) {
        self.first_entry = first;
    }

    /// Lowercase hex MD5 of the whole container, computed on first use.
    ///
    /// Directory containers have no content hash.
    pub fn content_hash(&self) -> Option<&str> {
        self.hash
            .get_or_init(|| {
                let mut reader = self.open_whole()?;
                match md5_hex(&mut reader) {
                    Ok(digest) => Some(digest.to_ascii_lowercase()),
                    Err(e) => {
                        tracing::warn!("Failed to hash '{}': {}", self.file_name, e);
                        None
                    }
                }
            })
            .as_deref()
    }

    /// Reader over the whole container image, `None` for directories.
    pub fn open_whole(&self) -> Option<LumpReader> {
        match &self.source {
            ContainerSource::Directory(_) => None,
            ContainerSource::Memory(data) => {
                Some(LumpReader::Shared(Cursor::new(SharedSlice::whole(data.clone()))))
            }
            ContainerSource::File(path) => {
                let file = match File::open(path.as_std_path()) {
                    Ok(f) => f,
                    Err(e) => {
                        tracing::warn!("Failed to reopen '{}': {}", path, e);
                        return None;
                    }
                };
                let len = file.metadata().map(|m| m.len()).unwrap_or(0);
                FilePart::new(file, 0, len).ok().map(LumpReader::File)
            }
        }
    }

    /// Open a reader for the entry in `slot`.
    ///
    /// Stored entries get a window into the container; ZIP members that need
    /// decoding (or all entries when `always_cache` is set) are read into memory.
    pub fn open_entry(&self, slot: usize, always_cache: bool) -> Result<LumpReader> {
        let entry = self.entries.get(slot).ok_or(Error::IndexOutOfRange {
            index: slot,
            count: self.entries.len(),
        })?;

        let reader = match (&entry.location, &self.source) {
            (EntryLocation::Range { offset }, ContainerSource::File(path)) => {
                let file = File::open(path.as_std_path())?;
                LumpReader::File(FilePart::new(file, *offset, entry.size)?)
            }
            (EntryLocation::Range { offset }, ContainerSource::Memory(data)) => {
                let start = usize::try_from(*offset).unwrap_or(usize::MAX);
                let len = usize::try_from(entry.size).unwrap_or(usize::MAX);
                LumpReader::Shared(Cursor::new(SharedSlice::new(data.clone(), start, len)))
            }
            (EntryLocation::Path(path), _) => {
                let file = File::open(path.as_std_path())?;
                LumpReader::File(FilePart::new(file, 0, entry.size)?)
            }
            (EntryLocation::ZipMember { index }, ContainerSource::File(path)) => {
                let file = BufReader::new(File::open(path.as_std_path())?);
                LumpReader::Buffer(Cursor::new(archive::read_member(file, *index)?))
            }
            (EntryLocation::ZipMember { index }, ContainerSource::Memory(data)) => {
                let cursor = Cursor::new(data.clone());
                LumpReader::Buffer(Cursor::new(archive::read_member(cursor, *index)?))
            }
            (location, ContainerSource::Directory(path)) => {
                return Err(Error::OpenFailure {
                    path: path.clone(),
                    reason: format!("unexpected entry location {:?} in directory", location),
                });
            }
        };

        if always_cache && !reader.is_buffered() {
            let mut reader = reader;
            let mut buf = Vec::with_capacity(usize::try_from(entry.size).unwrap_or(0));
            reader.read_to_end(&mut buf)?;
            return Ok(LumpReader::Buffer(Cursor::new(buf)));
        }
        Ok(reader)
    }
}

fn sniff<R: Read + Seek>(reader: &mut R) -> Result<ContainerKind> {
    let mut magic = [0u8; 4];
    let mut filled = 0;
    while filled < magic.len() {
        let read = reader.read(&mut magic[filled..])?;
        if read == 0 {
            break;
        }
        filled += read;
    }
    reader.rewind()?;

    if filled == magic.len() {
        if WAD_MAGICS.iter().any(|m| **m == magic) {
            return Ok(ContainerKind::Wad);
        }
        if magic == *ZIP_MAGIC {
            return Ok(ContainerKind::Zip);
        }
    }
    Ok(ContainerKind::Lump)
}

fn read_entries<R: Read + Seek>(
    kind: ContainerKind,
    file_name: &str,
    reader: R,
    settings: &LoadSettings,
) -> Result<Vec<ResourceEntry>> {
    match kind {
        ContainerKind::Wad => wad::read_entries(file_name, reader),
        ContainerKind::Zip => archive::read_entries(reader, settings),
        ContainerKind::Lump => lump::read_entries(file_name, reader),
        ContainerKind::Directory => unreachable!("directories are not sniffed"),
    }
}

/// Uppercase hex MD5 of everything `reader` yields.
pub(crate) fn md5_hex<R: Read>(reader: &mut R) -> std::io::Result<String> {
    let mut hasher = Md5::new();
    let mut buffer = [0u8; 4096];
    loop {
        let read = reader.read(&mut buffer)?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }
    Ok(hex::encode_upper(hasher.finalize()))
}
