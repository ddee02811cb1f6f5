//! ZIP archive reader.

use super::{EntryLocation, LumpFlags, ResourceEntry};
use crate::error::Result;
use crate::name::normalize_path;
use crate::settings::LoadSettings;
use std::io::{Read, Seek};
use zip::{CompressionMethod, ZipArchive};

pub(super) fn read_entries<R: Read + Seek>(
    reader: R,
    settings: &LoadSettings,
) -> Result<Vec<ResourceEntry>> {
    let mut archive = ZipArchive::new(reader)?;
    let mut entries = Vec::with_capacity(archive.len());

    for index in 0..archive.len() {
        let member = archive.by_index_raw(index)?;
        if member.is_dir() {
            continue;
        }

        let name = normalize_path(member.name());
        if name.is_empty() {
            continue;
        }

        let stored = member.compression() == CompressionMethod::Stored && !member.encrypted();
        let location = if stored {
            EntryLocation::Range {
                offset: member.data_start(),
            }
        } else {
            EntryLocation::ZipMember { index }
        };

        let mut entry = ResourceEntry::new(name, member.size(), location);
        if !stored {
            entry.flags.insert(LumpFlags::COMPRESSED);
        }
        if settings.is_embedded_name(&entry.name) {
            entry.flags.insert(LumpFlags::EMBEDDED);
        }
        tracing::trace!("zip member {} '{}' size={}", index, entry.name, entry.size);
        entries.push(entry);
    }

    Ok(entries)
}

/// Decode one archive member into memory.
pub(super) fn read_member<R: Read + Seek>(reader: R, index: usize) -> Result<Vec<u8>> {
    let mut archive = ZipArchive::new(reader)?;
    let mut member = archive.by_index(index)?;
    let mut out = Vec::with_capacity(usize::try_from(member.size()).unwrap_or(0));
    member.read_to_end(&mut out)?;
    Ok(out)
}
