//! The lump directory.
//!
//! [`FileSystem`] owns the opened containers, the ordered record store and the
//! hash tables built over it. Lump handles are plain `usize` positions into the
//! record store and stay valid until the next [`FileSystem::delete_all`].
//!
//! Mutations (`rename_file`, `add_*`, `create_pathless_copy`, relocation) only
//! touch the record store. Hash lookups see them after
//! [`FileSystem::rebuild_index`]; querying a stale index never panics but may
//! miss records.

use crate::container::{LumpFlags, ResourceFile};
use crate::error::{Error, Result};
use crate::index::HashChains;
use crate::name::{normalize_path, ShortName};
use crate::namespace::Namespace;
use crate::reader::{FilePart, LumpReader, SharedSlice};
use crate::record::{EntryInfo, LumpContent, LumpRecord};
use camino::Utf8Path;
use std::fs::File;
use std::io::{Cursor, Read};
use std::sync::Arc;

/// A layered, read-only view over many containers.
#[derive(Debug, Default)]
pub struct FileSystem {
    pub(crate) records: Vec<LumpRecord>,
    pub(crate) files: Vec<ResourceFile>,
    pub(crate) chains: HashChains,
    pub(crate) iwad_index: Option<usize>,
}

impl FileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every container, record and hash table.
    pub fn delete_all(&mut self) {
        self.chains = HashChains::default();
        self.records.clear();
        self.files.clear();
    }

    /// Container holding the main game content, if one was designated.
    pub fn iwad_index(&self) -> Option<usize> {
        self.iwad_index
    }

    pub fn set_iwad_index(&mut self, container: Option<usize>) {
        self.iwad_index = container;
    }

    /// Number of lumps in the directory.
    pub fn num_entries(&self) -> usize {
        self.records.len()
    }

    pub fn records(&self) -> &[LumpRecord] {
        &self.records
    }

    pub fn record(&self, index: usize) -> Option<&LumpRecord> {
        self.records.get(index)
    }

    pub(crate) fn record_checked(&self, index: usize) -> Result<&LumpRecord> {
        self.records.get(index).ok_or(Error::IndexOutOfRange {
            index,
            count: self.records.len(),
        })
    }

    fn record_checked_mut(&mut self, index: usize) -> Result<&mut LumpRecord> {
        let count = self.records.len();
        self.records
            .get_mut(index)
            .ok_or(Error::IndexOutOfRange { index, count })
    }

    pub(crate) fn push_record(&mut self, record: LumpRecord) -> usize {
        self.records.push(record);
        self.records.len() - 1
    }

    /// Build all four hash tables from the current record store.
    pub fn rebuild_index(&mut self) {
        self.chains = HashChains::build(&self.records);
        self.records.shrink_to_fit();
        self.files.shrink_to_fit();
        tracing::debug!("Built lump hash tables over {} entries", self.records.len());
    }

    // ---------------------------------------------------------------------
    // Record store mutations
    // ---------------------------------------------------------------------

    /// Replace a lump's full name. The short name is left alone.
    pub fn rename_file(&mut self, index: usize, new_name: &str) -> Result<()> {
        self.record_checked_mut(index)?.long_name = new_name.to_string();
        Ok(())
    }

    /// Add an in-memory lump that belongs to no container.
    pub fn add_lump(&mut self, name: &str, data: impl Into<Arc<[u8]>>) -> usize {
        let data = data.into();
        let entry = EntryInfo {
            size: data.len() as u64,
            ..Default::default()
        };
        let record = LumpRecord::new(None, &normalize_path(name), entry, LumpContent::Memory(data));
        self.push_record(record)
    }

    /// Give an arbitrary file on disk a lump number.
    ///
    /// The lump is named after the file's base name and reads straight from disk.
    pub fn add_external_file(&mut self, path: impl AsRef<Utf8Path>) -> usize {
        let path = path.as_ref();
        let size = match std::fs::metadata(path.as_std_path()) {
            Ok(meta) => meta.len(),
            Err(e) => {
                tracing::warn!("External file '{}' is not readable: {}", path, e);
                0
            }
        };
        let entry = EntryInfo {
            size,
            ..Default::default()
        };
        let name = normalize_path(path.file_name().unwrap_or(path.as_str()));
        let record = LumpRecord::new(
            None,
            &name,
            entry,
            LumpContent::External(path.to_path_buf()),
        );
        self.push_record(record)
    }

    /// Add an in-memory resource named `name:type` with an explicit resource id.
    pub fn add_from_buffer(
        &mut self,
        name: &str,
        resource_type: &str,
        data: impl Into<Arc<[u8]>>,
        id: Option<u32>,
    ) -> usize {
        let index = self.add_lump(&format!("{}:{}", name, resource_type), data);
        self.records[index].resource_id = id;
        index
    }

    /// Register a copy of lump `name` without its folder, addressable only by full name.
    ///
    /// Returns `false` when `name` does not resolve. A lump that already has no
    /// folder is flagged in place instead of being copied.
    pub fn create_pathless_copy(&mut self, name: &str, id: Option<u32>) -> bool {
        let name = name.replace('\\', "/");
        let Some(index) = self.find_file(&name) else {
            return false;
        };

        let record = &mut self.records[index];
        let Some(slash) = record.long_name.rfind('/') else {
            record.flags = LumpFlags::FULL_PATH;
            return true;
        };

        let mut copy = record.clone();
        copy.long_name.drain(..=slash);
        copy.resource_id = id;
        copy.flags = LumpFlags::FULL_PATH;
        tracing::debug!("Pathless copy of '{}' as '{}'", name, copy.long_name);
        self.records.push(copy);
        true
    }

    /// Short name of a lump. Reads the record store directly, no rebuild needed.
    pub fn short_name(&self, index: usize) -> Result<&ShortName> {
        Ok(&self.record_checked(index)?.short_name)
    }

    pub fn set_short_name(&mut self, index: usize, name: &str) -> Result<()> {
        self.record_checked_mut(index)?.short_name = ShortName::new(name);
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Lump metadata
    // ---------------------------------------------------------------------

    /// Size of a lump in bytes.
    pub fn file_length(&self, index: usize) -> Option<u64> {
        self.records.get(index).map(LumpRecord::size)
    }

    /// Byte offset of a lump inside its container file.
    ///
    /// `None` when the lump is compressed or does not live at a fixed offset.
    pub fn file_offset(&self, index: usize) -> Option<u64> {
        match self.records.get(index)?.content {
            LumpContent::Container { container, slot } => {
                self.files.get(container)?.entry(slot)?.file_offset()
            }
            _ => None,
        }
    }

    /// Effective flags, empty for an invalid handle.
    pub fn file_flags(&self, index: usize) -> LumpFlags {
        self.records
            .get(index)
            .map(LumpRecord::flags)
            .unwrap_or(LumpFlags::empty())
    }

    pub fn file_short_name(&self, index: usize) -> Option<&str> {
        self.records.get(index).map(|r| r.short_name.as_str())
    }

    /// Whether the lump's short name equals `name`, case-insensitively.
    pub fn check_file_name(&self, index: usize, name: &str) -> bool {
        self.records
            .get(index)
            .is_some_and(|r| r.short_name.matches(name))
    }

    /// Full name of a lump, or its short name when it has none and `return_short` is set.
    pub fn file_full_name(&self, index: usize, return_short: bool) -> Option<&str> {
        let record = self.records.get(index)?;
        if !record.long_name.is_empty() {
            Some(&record.long_name)
        } else if return_short {
            Some(record.short_name.as_str())
        } else {
            None
        }
    }

    /// `container:name` for diagnostics.
    pub fn file_full_path(&self, index: usize) -> Option<String> {
        let record = self.records.get(index)?;
        let container = record
            .container
            .and_then(|c| self.resource_file_name(c))
            .unwrap_or("");
        Some(format!("{}:{}", container, record.display_name()))
    }

    /// Namespace of a lump, [`Namespace::GLOBAL`] for an invalid handle.
    pub fn file_namespace(&self, index: usize) -> Namespace {
        self.records
            .get(index)
            .map(|r| r.namespace)
            .unwrap_or(Namespace::GLOBAL)
    }

    pub fn set_file_namespace(&mut self, index: usize, namespace: Namespace) {
        if let Some(record) = self.records.get_mut(index) {
            record.namespace = namespace;
        }
    }

    pub fn resource_id(&self, index: usize) -> Option<u32> {
        self.records.get(index)?.resource_id
    }

    /// Extension of a lump's full name; empty when there is none.
    pub fn resource_type(&self, index: usize) -> Option<&str> {
        let name = &self.records.get(index)?.long_name;
        match name.rfind('.') {
            Some(dot) if !name[dot..].contains('/') => Some(&name[dot + 1..]),
            _ => Some(""),
        }
    }

    /// Container a lump came from, `None` for manual lumps and invalid handles.
    pub fn file_container(&self, index: usize) -> Option<usize> {
        self.records.get(index)?.container
    }

    // ---------------------------------------------------------------------
    // Containers
    // ---------------------------------------------------------------------

    pub fn num_resource_files(&self) -> usize {
        self.files.len()
    }

    pub fn resource_file(&self, container: usize) -> Option<&ResourceFile> {
        self.files.get(container)
    }

    /// Container name without its directory.
    pub fn resource_file_name(&self, container: usize) -> Option<&str> {
        let name = self.files.get(container)?.file_name();
        match name.rfind('/') {
            Some(slash) if slash + 1 < name.len() => Some(&name[slash + 1..]),
            _ => Some(name),
        }
    }

    /// Container name as it was opened, including any path.
    pub fn resource_file_full_name(&self, container: usize) -> Option<&str> {
        self.files.get(container).map(ResourceFile::file_name)
    }

    pub fn first_entry(&self, container: usize) -> Option<usize> {
        self.files.get(container).map(ResourceFile::first_entry)
    }

    pub fn last_entry(&self, container: usize) -> Option<usize> {
        let file = self.files.get(container)?;
        (file.first_entry() + file.entry_count()).checked_sub(1)
    }

    pub fn entry_count(&self, container: usize) -> usize {
        self.files.get(container).map_or(0, ResourceFile::entry_count)
    }

    /// Find a loaded container by name.
    ///
    /// A name containing `/` is compared against full container names, anything
    /// else against the base names.
    pub fn check_if_resource_file_loaded(&self, name: &str) -> Option<usize> {
        if name.contains('/') {
            self.files
                .iter()
                .position(|f| f.file_name().eq_ignore_ascii_case(name))
        } else {
            (0..self.files.len()).find(|&i| {
                self.resource_file_name(i)
                    .is_some_and(|n| n.eq_ignore_ascii_case(name))
            })
        }
    }

    // ---------------------------------------------------------------------
    // Reading
    // ---------------------------------------------------------------------

    /// Read a whole lump into memory.
    pub fn read_file(&self, index: usize) -> Result<Vec<u8>> {
        let mut reader = self.open_reader(index)?;
        let expected = reader.len();
        let mut buf = Vec::with_capacity(usize::try_from(expected).unwrap_or(0));
        let read = reader.read_to_end(&mut buf)? as u64;
        if read != expected {
            return Err(Error::ReadShortfall {
                name: self.records[index].display_name().to_string(),
                read,
                expected,
            });
        }
        Ok(buf)
    }

    /// Open a reader over a lump.
    ///
    /// Stored lumps get a window into the owning container; compressed ones are
    /// decoded into a buffer. Relocated originals yield an empty reader.
    pub fn open_reader(&self, index: usize) -> Result<LumpReader> {
        self.reopen_reader(index, false)
    }

    /// Like [`open_reader`](Self::open_reader), optionally forcing the content into memory.
    pub fn reopen_reader(&self, index: usize, always_cache: bool) -> Result<LumpReader> {
        let record = self.record_checked(index)?;
        let reader = match &record.content {
            LumpContent::Container { container, slot } => {
                let file = self.files.get(*container).ok_or(Error::IndexOutOfRange {
                    index: *container,
                    count: self.files.len(),
                })?;
                return file.open_entry(*slot, always_cache);
            }
            LumpContent::Memory(data) => {
                LumpReader::Shared(Cursor::new(SharedSlice::whole(data.clone())))
            }
            LumpContent::External(path) => {
                let file = File::open(path.as_std_path())?;
                let len = file.metadata()?.len();
                let reader = LumpReader::File(FilePart::new(file, 0, len)?);
                if !always_cache {
                    return Ok(reader);
                }
                let mut reader = reader;
                let mut buf = Vec::with_capacity(usize::try_from(len).unwrap_or(0));
                reader.read_to_end(&mut buf)?;
                LumpReader::Buffer(Cursor::new(buf))
            }
            LumpContent::Placeholder => LumpReader::empty(),
        };
        Ok(reader)
    }

    /// Open a lump by full name. `Ok(None)` when the name does not resolve.
    pub fn open_reader_by_name(&self, name: &str) -> Result<Option<LumpReader>> {
        match self.check_num_for_full_name(name) {
            Some(index) => self.open_reader(index).map(Some),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filesystem_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<FileSystem>();
    }

    #[test]
    fn test_manual_lumps() {
        let mut fs = FileSystem::new();
        let a = fs.add_lump("Textures/Wall.png", &b"wall"[..]);
        let b = fs.add_from_buffer("blood", "raw", &b"red"[..], Some(9));
        fs.rebuild_index();

        assert_eq!(fs.num_entries(), 2);
        assert_eq!(fs.file_full_name(a, false), Some("textures/wall.png"));
        assert_eq!(fs.file_namespace(a), Namespace::NEW_TEXTURES);
        assert_eq!(fs.file_container(a), None);
        assert_eq!(fs.file_full_name(b, false), Some("blood:raw"));
        assert_eq!(fs.resource_id(b), Some(9));
        assert_eq!(fs.read_file(b).unwrap(), b"red");
        assert_eq!(fs.file_full_path(a).unwrap(), ":textures/wall.png");
    }

    #[test]
    fn test_external_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Readme.TXT");
        std::fs::write(&path, b"hello").unwrap();
        let path = camino::Utf8PathBuf::from_path_buf(path).unwrap();

        let mut fs = FileSystem::new();
        let index = fs.add_external_file(&path);
        assert_eq!(fs.file_full_name(index, false), Some("readme.txt"));
        assert_eq!(fs.file_length(index), Some(5));
        assert_eq!(fs.read_file(index).unwrap(), b"hello");
        assert!(fs.reopen_reader(index, true).unwrap().is_buffered());
        assert!(!fs.open_reader(index).unwrap().is_buffered());
    }

    #[test]
    fn test_invalid_handles() {
        let mut fs = FileSystem::new();
        assert!(matches!(
            fs.read_file(3),
            Err(Error::IndexOutOfRange { index: 3, count: 0 })
        ));
        assert!(fs.rename_file(0, "x").is_err());
        assert!(fs.short_name(0).is_err());
        assert_eq!(fs.file_length(0), None);
        assert_eq!(fs.file_flags(0), LumpFlags::empty());
        assert_eq!(fs.file_namespace(0), Namespace::GLOBAL);
        assert!(!fs.check_file_name(0, "A"));
        assert_eq!(fs.resource_file_name(0), None);
        assert_eq!(fs.entry_count(0), 0);
    }

    #[test]
    fn test_short_name_is_visible_immediately() {
        let mut fs = FileSystem::new();
        let index = fs.add_lump("demo1.lmp", &b""[..]);
        fs.set_short_name(index, "demo2").unwrap();
        assert!(fs.check_file_name(index, "DEMO2"));
        assert_eq!(fs.short_name(index).unwrap().as_str(), "DEMO2");
    }

    #[test]
    fn test_resource_type() {
        let mut fs = FileSystem::new();
        let a = fs.add_lump("sounds/dsbang.wav", &b""[..]);
        let b = fs.add_lump("dir.d/noext", &b""[..]);
        assert_eq!(fs.resource_type(a), Some("wav"));
        assert_eq!(fs.resource_type(b), Some(""));
        assert_eq!(fs.resource_type(99), None);
    }

    #[test]
    fn test_pathless_copy() {
        let mut fs = FileSystem::new();
        let original = fs.add_lump("graphics/m_doom.png", &b"logo"[..]);
        let flat = fs.add_lump("credit.png", &b"c"[..]);
        fs.rebuild_index();

        assert!(fs.create_pathless_copy("graphics\\m_doom.png", Some(5)));
        assert!(fs.create_pathless_copy("credit.png", None));
        assert!(!fs.create_pathless_copy("missing.png", None));
        fs.rebuild_index();

        let copy = fs.check_num_for_full_name("m_doom.png").unwrap();
        assert_ne!(copy, original);
        assert_eq!(fs.resource_id(copy), Some(5));
        assert!(fs.file_flags(copy).contains(LumpFlags::FULL_PATH));
        assert_eq!(fs.read_file(copy).unwrap(), b"logo");
        assert!(fs.file_flags(flat).contains(LumpFlags::FULL_PATH));
        assert_eq!(fs.num_entries(), 3);
    }

    #[test]
    fn test_set_file_namespace() {
        let mut fs = FileSystem::new();
        let index = fs.add_lump("trooa1.png", &b"imp"[..]);
        fs.rebuild_index();
        assert_eq!(fs.check_num_for_name("TROOA1", Namespace::GLOBAL), Some(index));
        assert_eq!(fs.check_num_for_name("TROOA1", Namespace::SPRITES), None);

        fs.set_file_namespace(index, Namespace::SPRITES);
        assert_eq!(fs.file_namespace(index), Namespace::SPRITES);
        assert_eq!(fs.check_num_for_name("TROOA1", Namespace::SPRITES), Some(index));
        assert_eq!(fs.check_num_for_name("TROOA1", Namespace::GLOBAL), None);

        // Out of range is ignored.
        fs.set_file_namespace(99, Namespace::SPRITES);
    }

    #[test]
    fn test_open_reader_by_name() {
        let mut fs = FileSystem::new();
        fs.add_lump("maps/info.txt", &b"hello"[..]);
        fs.rebuild_index();

        let mut reader = fs.open_reader_by_name("MAPS/INFO.TXT").unwrap().unwrap();
        let mut text = String::new();
        reader.read_to_string(&mut text).unwrap();
        assert_eq!(text, "hello");

        assert!(fs.open_reader_by_name("maps/missing.txt").unwrap().is_none());
    }

    #[test]
    fn test_rename_needs_rebuild() {
        let mut fs = FileSystem::new();
        let index = fs.add_lump("old.txt", &b"x"[..]);
        fs.rebuild_index();
        fs.rename_file(index, "new.txt").unwrap();
        assert_eq!(fs.file_full_name(index, false), Some("new.txt"));
        fs.rebuild_index();
        assert_eq!(fs.check_num_for_full_name("new.txt"), Some(index));
        assert_eq!(fs.check_num_for_full_name("old.txt"), None);
    }
}
