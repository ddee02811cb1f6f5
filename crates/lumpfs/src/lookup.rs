//! Name, folder and resource id queries.
//!
//! Every hash lookup walks a chain newest first, so the lump loaded last wins.
//! A miss is `None`; the `get_*` variants turn it into [`Error::NotFound`].

use crate::error::{Error, Result};
use crate::filesystem::FileSystem;
use crate::index::Chain;
use crate::name::{
    hash_str, is_short_name_shaped, looks_like_full_path, starts_with_ignore_case, ShortName,
};
use crate::namespace::Namespace;
use crate::record::LumpRecord;

/// One result of [`FileSystem::get_files_in_folder`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderEntry {
    pub name: String,
    pub index: usize,
}

/// Whether `long_name` is `name` itself, or (with `ignore_ext`) `name` plus a bare extension.
fn full_name_matches(long_name: &str, name: &str, ignore_ext: bool) -> bool {
    if !starts_with_ignore_case(long_name, name) {
        return false;
    }
    let rest = &long_name.as_bytes()[name.len()..];
    match rest.split_first() {
        None => true,
        Some((b'.', ext)) if ignore_ext => !ext.iter().any(|&c| c == b'.' || c == b'/'),
        _ => false,
    }
}

impl FileSystem {
    fn chain<'a>(
        &'a self,
        chain: &'a Chain,
        key: u32,
    ) -> impl Iterator<Item = (usize, &'a LumpRecord)> + 'a {
        chain
            .iter(key)
            .filter_map(move |index| self.records.get(index).map(|record| (index, record)))
    }

    // ---------------------------------------------------------------------
    // Short names
    // ---------------------------------------------------------------------

    /// Find the newest lump with short name `name` in `namespace`.
    ///
    /// Names longer than 8 characters that contain `/` or `.` are treated as full
    /// paths and never match. For the folder-only namespaces above
    /// [`Namespace::SPECIAL_ZIP_DIRECTORY`], a global lump that is not restricted to
    /// full-path access also satisfies the query, so loose lumps and WAD lumps work
    /// where a folder would be expected.
    pub fn check_num_for_name(&self, name: &str, namespace: Namespace) -> Option<usize> {
        if looks_like_full_path(name) {
            return None;
        }
        let short = ShortName::new(name);

        self.chain(&self.chains.short_name, short.hash())
            .find(|(_, record)| {
                record.short_name == short && record.matches_namespace(namespace)
            })
            .map(|(index, _)| index)
    }

    /// Short name lookup restricted to one container.
    ///
    /// With `exact` only lumps from `container` qualify; otherwise any container
    /// loaded up to and including it. `None` for the container searches everywhere.
    pub fn check_num_for_name_in(
        &self,
        name: &str,
        namespace: Namespace,
        container: Option<usize>,
        exact: bool,
    ) -> Option<usize> {
        let Some(container) = container else {
            return self.check_num_for_name(name, namespace);
        };
        let short = ShortName::new(name);

        self.chain(&self.chains.short_name, short.hash())
            .find(|(_, record)| {
                record.short_name == short
                    && record.namespace == namespace
                    && match record.container {
                        Some(owner) if exact => owner == container,
                        Some(owner) => owner <= container,
                        None => !exact,
                    }
            })
            .map(|(index, _)| index)
    }

    /// Like [`check_num_for_name`](Self::check_num_for_name), failing on a miss.
    pub fn get_num_for_name(&self, name: &str, namespace: Namespace) -> Result<usize> {
        self.check_num_for_name(name, namespace)
            .ok_or_else(|| Error::NotFound(format!("lump '{}'", name)))
    }

    // ---------------------------------------------------------------------
    // Full names
    // ---------------------------------------------------------------------

    /// Exact full-name lookup, case-insensitive.
    pub fn check_num_for_full_name(&self, name: &str) -> Option<usize> {
        self.check_num_for_full_name_with(name, false, Namespace::GLOBAL, false)
    }

    /// Full-name lookup with all knobs.
    ///
    /// A single leading `/` is ignored. With `ignore_ext`, `sprites/foo` also
    /// matches `sprites/foo.png` but not `sprites/foobar.png` or
    /// `sprites/foo.d/x`. With `try_short`, a short-name-shaped query that misses
    /// falls back to [`check_num_for_name`](Self::check_num_for_name) in `namespace`.
    pub fn check_num_for_full_name_with(
        &self,
        name: &str,
        try_short: bool,
        namespace: Namespace,
        ignore_ext: bool,
    ) -> Option<usize> {
        let name = name.strip_prefix('/').unwrap_or(name);
        let chain = if ignore_ext {
            &self.chains.no_extension
        } else {
            &self.chains.full_name
        };

        let found = self
            .chain(chain, hash_str(name))
            .find(|(_, record)| full_name_matches(&record.long_name, name, ignore_ext))
            .map(|(index, _)| index);

        match found {
            Some(index) => Some(index),
            None if try_short && is_short_name_shaped(name) => {
                self.check_num_for_name(name, namespace)
            }
            None => None,
        }
    }

    /// Exact full-name lookup restricted to one container.
    pub fn check_num_for_full_name_in(&self, name: &str, container: Option<usize>) -> Option<usize> {
        let Some(container) = container else {
            return self.check_num_for_full_name(name);
        };
        self.chain(&self.chains.full_name, hash_str(name))
            .find(|(_, record)| {
                record.container == Some(container) && record.long_name.eq_ignore_ascii_case(name)
            })
            .map(|(index, _)| index)
    }

    pub fn get_num_for_full_name(&self, name: &str) -> Result<usize> {
        self.check_num_for_full_name(name)
            .ok_or_else(|| Error::NotFound(format!("file '{}'", name)))
    }

    /// Plain full-name lookup.
    pub fn find_file(&self, name: &str) -> Option<usize> {
        self.check_num_for_full_name(name)
    }

    /// Find `name` with any of `extensions` appended.
    ///
    /// Only lumps whose name is `name` plus a real extension qualify. The chain is
    /// walked newest first; for each lump the extensions are tried in order.
    pub fn find_file_with_extensions(&self, name: &str, extensions: &[&str]) -> Option<usize> {
        let name = name.strip_prefix('/').unwrap_or(name);

        self.chain(&self.chains.no_extension, hash_str(name))
            .find(|(_, record)| {
                if !starts_with_ignore_case(&record.long_name, name) {
                    return false;
                }
                let Some(ext) = record.long_name[name.len()..].strip_prefix('.') else {
                    return false;
                };
                !ext.contains(['.', '/'])
                    && extensions.iter().any(|e| e.eq_ignore_ascii_case(ext))
            })
            .map(|(index, _)| index)
    }

    // ---------------------------------------------------------------------
    // Resource ids
    // ---------------------------------------------------------------------

    /// Find a lump by resource id and extension, optionally within one container.
    pub fn find_resource(
        &self,
        id: u32,
        resource_type: &str,
        container: Option<usize>,
    ) -> Option<usize> {
        self.chain(&self.chains.resource_id, id)
            .find(|(_, record)| {
                if container.is_some_and(|c| record.container != Some(c)) {
                    return false;
                }
                if record.resource_id != Some(id) {
                    return false;
                }
                record
                    .long_name
                    .rsplit_once('.')
                    .is_some_and(|(_, ext)| ext.eq_ignore_ascii_case(resource_type))
            })
            .map(|(index, _)| index)
    }

    pub fn get_resource(
        &self,
        id: u32,
        resource_type: &str,
        container: Option<usize>,
    ) -> Result<usize> {
        self.find_resource(id, resource_type, container)
            .ok_or_else(|| Error::NotFound(format!("resource {} of type {}", id, resource_type)))
    }

    // ---------------------------------------------------------------------
    // Linear scans
    // ---------------------------------------------------------------------

    /// Find the next lump at or after `*cursor` with short name `name`.
    ///
    /// Every match is returned in load order, which is what merging lumps such
    /// as `SNDINFO` across containers needs. On a hit the cursor moves past the
    /// match; on a miss it is set to [`num_entries`](Self::num_entries).
    pub fn find_lump(&self, name: &str, cursor: &mut usize, any_namespace: bool) -> Option<usize> {
        let short = ShortName::new(name);
        self.scan(cursor, |record| {
            (any_namespace || record.namespace == Namespace::GLOBAL) && record.short_name == short
        })
    }

    /// [`find_lump`](Self::find_lump) over several names.
    ///
    /// Returns the lump index and the position of the matched name in `names`.
    pub fn find_lump_multi(
        &self,
        names: &[&str],
        cursor: &mut usize,
        any_namespace: bool,
    ) -> Option<(usize, usize)> {
        let shorts: Vec<ShortName> = names.iter().map(|n| ShortName::new(n)).collect();
        let mut matched = 0;
        let index = self.scan(cursor, |record| {
            if !(any_namespace || record.namespace == Namespace::GLOBAL) {
                return false;
            }
            match shorts.iter().position(|s| *s == record.short_name) {
                Some(position) => {
                    matched = position;
                    true
                }
                None => false,
            }
        })?;
        Some((index, matched))
    }

    /// Full-name variant of [`find_lump`](Self::find_lump).
    pub fn find_lump_full_name(&self, name: &str, cursor: &mut usize, no_ext: bool) -> Option<usize> {
        self.scan(cursor, |record| {
            if no_ext {
                full_name_matches(&record.long_name, name, true)
            } else {
                record.long_name.eq_ignore_ascii_case(name)
            }
        })
    }

    fn scan(
        &self,
        cursor: &mut usize,
        mut predicate: impl FnMut(&LumpRecord) -> bool,
    ) -> Option<usize> {
        while let Some(record) = self.records.get(*cursor) {
            let index = *cursor;
            *cursor += 1;
            if predicate(record) {
                return Some(index);
            }
        }
        *cursor = self.records.len();
        None
    }

    // ---------------------------------------------------------------------
    // Folders
    // ---------------------------------------------------------------------

    /// All lumps below `path` that are the current winner for their full name.
    ///
    /// With `atomic`, only the content of the newest container that has anything
    /// in the folder is returned. Results are sorted by name.
    pub fn get_files_in_folder(&self, path: &str, atomic: bool) -> Vec<FolderEntry> {
        let mut prefix = path.replace('\\', "/").to_lowercase();
        if !prefix.ends_with('/') {
            prefix.push('/');
        }

        let mut result: Vec<FolderEntry> = self
            .records
            .iter()
            .enumerate()
            .filter(|(_, record)| record.long_name.starts_with(&prefix))
            .filter(|(index, record)| self.check_num_for_full_name(&record.long_name) == Some(*index))
            .map(|(index, record)| FolderEntry {
                name: record.long_name.clone(),
                index,
            })
            .collect();

        if atomic {
            let newest = result
                .iter()
                .map(|entry| self.records[entry.index].container)
                .max()
                .flatten();
            result.retain(|entry| self.records[entry.index].container == newest);
        }

        result.sort_by(|a, b| a.name.cmp(&b.name));
        result
    }
}
