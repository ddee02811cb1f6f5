//! Lump records: the identity metadata of every lump in the directory.
//!
//! A record never owns lump bytes. It points at them through [`LumpContent`]: a
//! slot of an opened container, an in-memory buffer, an external file, or nothing
//! at all for lumps that were hollowed out by a relocation.

use crate::container::{LumpFlags, ResourceEntry};
use crate::name::{base_name, parse_resource_id, strip_extension, ShortName};
use crate::namespace::Namespace;
use camino::Utf8PathBuf;
use std::sync::Arc;

/// Where a record's bytes come from.
#[derive(Debug, Clone)]
pub enum LumpContent {
    /// Entry `slot` of container `container`.
    Container { container: usize, slot: usize },
    /// Caller-supplied bytes.
    Memory(Arc<[u8]>),
    /// A file outside of any container.
    External(Utf8PathBuf),
    /// Empty stand-in left behind when a lump is relocated.
    Placeholder,
}

/// Container-level facts a record is derived from.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct EntryInfo {
    pub flags: LumpFlags,
    pub namespace: Namespace,
    pub resource_id: Option<u32>,
    pub size: u64,
}

impl From<&ResourceEntry> for EntryInfo {
    fn from(entry: &ResourceEntry) -> Self {
        Self {
            flags: entry.flags,
            namespace: entry.namespace,
            resource_id: entry.resource_id,
            size: entry.size,
        }
    }
}

/// One lump in the directory.
#[derive(Debug, Clone)]
pub struct LumpRecord {
    pub(crate) content: LumpContent,
    pub(crate) short_name: ShortName,
    pub(crate) long_name: String,
    pub(crate) container: Option<usize>,
    pub(crate) namespace: Namespace,
    pub(crate) resource_id: Option<u32>,
    /// XOR-override applied on top of `entry.flags`.
    pub(crate) flags: LumpFlags,
    pub(crate) entry: EntryInfo,
}

impl LumpRecord {
    /// Derive a record for an entry called `name` owned by `container`.
    pub(crate) fn new(
        container: Option<usize>,
        name: &str,
        entry: EntryInfo,
        content: LumpContent,
    ) -> Self {
        let mut record = Self {
            content,
            short_name: ShortName::EMPTY,
            long_name: String::new(),
            container,
            namespace: Namespace::HIDDEN,
            resource_id: None,
            flags: LumpFlags::empty(),
            entry,
        };
        record.set_from_name(container, name);
        record
    }

    /// Recompute every identity field from `name`.
    pub(crate) fn set_from_name(&mut self, container: Option<usize>, name: &str) {
        self.container = container;
        self.flags = LumpFlags::empty();

        if self.entry.flags.contains(LumpFlags::SHORT_NAME) {
            self.short_name = ShortName::new(name);
            self.long_name.clear();
            self.namespace = self.entry.namespace;
            self.resource_id = None;
            return;
        }

        if self.entry.flags.contains(LumpFlags::EMBEDDED) || name.is_empty() {
            self.short_name = ShortName::EMPTY;
            self.long_name.clear();
            self.namespace = Namespace::HIDDEN;
            self.resource_id = None;
            return;
        }

        self.long_name = name.to_string();
        self.resource_id = self.entry.resource_id;
        self.namespace = Namespace::from_path(&self.long_name);

        if self.namespace.is_hidden() {
            self.short_name = ShortName::EMPTY;
            return;
        }

        if self.resource_id.is_none() {
            if let Some((stripped, id)) = parse_resource_id(&self.long_name) {
                self.long_name = stripped;
                self.resource_id = Some(id);
            }
        }

        let base = strip_extension(base_name(&self.long_name));
        self.short_name = ShortName::new(base);

        // '\' cannot appear in archive member names but is a valid sprite frame character.
        if matches!(
            self.namespace,
            Namespace::SPRITES | Namespace::VOXELS | Namespace::HIRES
        ) {
            self.short_name.replace(b'^', b'\\');
        }
    }

    /// Point this record at nothing; it stays addressable but serves no bytes.
    pub(crate) fn hollow_out(&mut self) {
        self.content = LumpContent::Placeholder;
        self.entry.size = 0;
        self.entry.flags = LumpFlags::empty();
    }

    pub fn short_name(&self) -> &ShortName {
        &self.short_name
    }

    /// Full path, empty for flat legacy lumps.
    pub fn long_name(&self) -> &str {
        &self.long_name
    }

    /// Owning container, `None` for manually added lumps.
    pub fn container(&self) -> Option<usize> {
        self.container
    }

    pub fn namespace(&self) -> Namespace {
        self.namespace
    }

    pub fn resource_id(&self) -> Option<u32> {
        self.resource_id
    }

    /// Effective flags: the entry's own flags with the record override applied.
    pub fn flags(&self) -> LumpFlags {
        self.entry.flags ^ self.flags
    }

    pub fn size(&self) -> u64 {
        self.entry.size
    }

    pub fn content(&self) -> &LumpContent {
        &self.content
    }

    /// Whether a short name lookup in `namespace` accepts this lump.
    ///
    /// Above [`Namespace::SPECIAL_ZIP_DIRECTORY`], global lumps that are not
    /// restricted to full-path access also qualify.
    pub fn matches_namespace(&self, namespace: Namespace) -> bool {
        self.namespace == namespace
            || (namespace > Namespace::SPECIAL_ZIP_DIRECTORY
                && self.namespace == Namespace::GLOBAL
                && !self.flags().contains(LumpFlags::FULL_PATH))
    }

    /// Full name if there is one, otherwise the short name.
    pub fn display_name(&self) -> &str {
        if self.long_name.is_empty() {
            self.short_name.as_str()
        } else {
            &self.long_name
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path_record(name: &str) -> LumpRecord {
        LumpRecord::new(
            Some(0),
            name,
            EntryInfo::default(),
            LumpContent::Placeholder,
        )
    }

    #[test]
    fn test_path_lump_identity() {
        let record = path_record("sprites/trooa1.png");
        assert_eq!(record.long_name(), "sprites/trooa1.png");
        assert_eq!(record.short_name().as_str(), "TROOA1");
        assert_eq!(record.namespace(), Namespace::SPRITES);
        assert_eq!(record.resource_id(), None);
    }

    #[test]
    fn test_resource_id_tag_is_stripped() {
        let record = path_record("mything.{42}.wav");
        assert_eq!(record.long_name(), "mything.wav");
        assert_eq!(record.resource_id(), Some(42));
        assert_eq!(record.short_name().as_str(), "MYTHING");
    }

    #[test]
    fn test_container_resource_id_wins_over_tag() {
        let entry = EntryInfo {
            resource_id: Some(7),
            ..Default::default()
        };
        let record = LumpRecord::new(Some(0), "a.{42}.raw", entry, LumpContent::Placeholder);
        assert_eq!(record.resource_id(), Some(7));
        assert_eq!(record.long_name(), "a.{42}.raw");
    }

    #[test]
    fn test_hidden_folder_has_empty_short_name() {
        let record = path_record("maps/map01.wad");
        assert_eq!(record.namespace(), Namespace::HIDDEN);
        assert!(record.short_name().is_empty());
        assert_eq!(record.long_name(), "maps/map01.wad");
    }

    #[test]
    fn test_sprite_caret_becomes_backslash() {
        let record = path_record("sprites/vile^1.png");
        assert_eq!(record.short_name().as_bytes(), b"VILE\\1\0\0");
        let other = path_record("graphics/vile^1.png");
        assert_eq!(other.short_name().as_bytes(), b"VILE^1\0\0");
    }

    #[test]
    fn test_non_ascii_short_name_is_kept() {
        let record = path_record("sprites/xéééé.png");
        assert_eq!(record.short_name().as_str(), "Xééé");
        assert_eq!(record.display_name(), "sprites/xéééé.png");
    }

    #[test]
    fn test_short_name_lump() {
        let entry = EntryInfo {
            flags: LumpFlags::SHORT_NAME,
            namespace: Namespace::FLATS,
            ..Default::default()
        };
        let record = LumpRecord::new(Some(1), "floor0_1", entry, LumpContent::Placeholder);
        assert_eq!(record.short_name().as_str(), "FLOOR0_1");
        assert_eq!(record.long_name(), "");
        assert_eq!(record.namespace(), Namespace::FLATS);
        assert_eq!(record.display_name(), "FLOOR0_1");
    }

    #[test]
    fn test_embedded_lump_is_hidden() {
        let entry = EntryInfo {
            flags: LumpFlags::EMBEDDED,
            ..Default::default()
        };
        let record = LumpRecord::new(Some(0), "extra.wad", entry, LumpContent::Placeholder);
        assert!(record.short_name().is_empty());
        assert_eq!(record.namespace(), Namespace::HIDDEN);
        assert_eq!(record.long_name(), "");
    }

    #[test]
    fn test_flags_override_toggles() {
        let mut record = path_record("a.txt");
        assert!(!record.flags().contains(LumpFlags::FULL_PATH));
        record.flags = LumpFlags::FULL_PATH;
        assert!(record.flags().contains(LumpFlags::FULL_PATH));
    }

    #[test]
    fn test_global_lump_matches_folder_namespaces() {
        let mut record = path_record("d_runnin.mus");
        assert_eq!(record.namespace(), Namespace::GLOBAL);
        assert!(record.matches_namespace(Namespace::GLOBAL));
        assert!(record.matches_namespace(Namespace::MUSIC));
        assert!(!record.matches_namespace(Namespace::SPRITES));

        record.flags = LumpFlags::FULL_PATH;
        assert!(!record.matches_namespace(Namespace::MUSIC));
        assert!(record.matches_namespace(Namespace::GLOBAL));
    }

    #[test]
    fn test_flags_override_clears_entry_flag() {
        let entry = EntryInfo {
            flags: LumpFlags::FULL_PATH | LumpFlags::MAYBE_FLAT,
            ..Default::default()
        };
        let mut record = LumpRecord::new(Some(0), "a.txt", entry, LumpContent::Placeholder);
        record.flags = LumpFlags::FULL_PATH;
        assert_eq!(record.flags(), LumpFlags::MAYBE_FLAT);
    }

    #[test]
    fn test_hollow_out() {
        let entry = EntryInfo {
            size: 10,
            ..Default::default()
        };
        let mut record = LumpRecord::new(Some(0), "a.txt", entry, LumpContent::Memory(Arc::from(&b"0123456789"[..])));
        record.hollow_out();
        assert_eq!(record.size(), 0);
        assert!(matches!(record.content(), LumpContent::Placeholder));
        assert_eq!(record.long_name(), "a.txt");
    }
}
