//! Loose single-lump files.

use super::{EntryLocation, ResourceEntry};
use crate::error::Result;
use crate::name::{base_name, normalize_path};
use std::io::{Seek, SeekFrom};

/// A loose file is one lump named after the file itself.
pub(super) fn read_entries<R: Seek>(file_name: &str, mut reader: R) -> Result<Vec<ResourceEntry>> {
    let size = reader.seek(SeekFrom::End(0))?;
    let path = normalize_path(file_name);
    let name = base_name(&path);
    // Nested containers are named `parent:entry`.
    let name = name.rsplit(':').next().unwrap_or(name).to_string();
    Ok(vec![ResourceEntry::new(
        name,
        size,
        EntryLocation::Range { offset: 0 },
    )])
}
