//! WAD directory reader.

use super::{EntryLocation, LumpFlags, ResourceEntry};
use crate::error::{Error, Result};
use crate::namespace::Namespace;
use byteorder::{ReadBytesExt, LE};
use std::io::{Read, Seek, SeekFrom};

const HEADER_SIZE: u64 = 12;
const DIRECTORY_ENTRY_SIZE: u64 = 16;

/// Marker prefixes and the namespace of the lumps between `X_START` and `X_END`.
const MARKERS: [(&str, Namespace); 10] = [
    ("S", Namespace::SPRITES),
    ("SS", Namespace::SPRITES),
    ("F", Namespace::FLATS),
    ("FF", Namespace::FLATS),
    ("C", Namespace::COLORMAPS),
    ("A", Namespace::ACS_LIBRARY),
    ("TX", Namespace::NEW_TEXTURES),
    ("V", Namespace::STRIFE_VOICES),
    ("HI", Namespace::HIRES),
    ("VX", Namespace::VOXELS),
];

enum Marker {
    Start(Namespace),
    End,
}

fn classify_marker(name: &str) -> Option<Marker> {
    if let Some(prefix) = name.strip_suffix("_START") {
        return MARKERS
            .iter()
            .find(|(p, _)| *p == prefix)
            .map(|(_, ns)| Marker::Start(*ns));
    }
    if let Some(prefix) = name.strip_suffix("_END") {
        return MARKERS.iter().any(|(p, _)| *p == prefix).then_some(Marker::End);
    }
    None
}

pub(super) fn read_entries<R: Read + Seek>(file_name: &str, mut reader: R) -> Result<Vec<ResourceEntry>> {
    let invalid = |reason: String| Error::InvalidWad {
        name: file_name.to_string(),
        reason,
    };

    let file_len = reader.seek(SeekFrom::End(0))?;
    reader.seek(SeekFrom::Start(4))?;
    let num_lumps = reader.read_i32::<LE>()?;
    let table_offset = reader.read_i32::<LE>()?;

    if num_lumps < 0 || table_offset < 0 {
        return Err(invalid(format!(
            "negative header values (lumps={}, offset={})",
            num_lumps, table_offset
        )));
    }
    let num_lumps = num_lumps as u64;
    let table_offset = table_offset as u64;
    if table_offset < HEADER_SIZE || table_offset + num_lumps * DIRECTORY_ENTRY_SIZE > file_len {
        return Err(invalid(format!(
            "directory ({} entries at {}) extends beyond end of file ({})",
            num_lumps, table_offset, file_len
        )));
    }

    reader.seek(SeekFrom::Start(table_offset))?;
    let mut entries = Vec::with_capacity(num_lumps as usize);
    let mut namespace = Namespace::GLOBAL;

    for index in 0..num_lumps {
        let offset = reader.read_i32::<LE>()?.max(0) as u64;
        let mut size = reader.read_i32::<LE>()?.max(0) as u64;
        let mut raw = [0u8; 8];
        reader.read_exact(&mut raw)?;

        let len = raw.iter().position(|&c| c == 0).unwrap_or(8);
        let name = String::from_utf8_lossy(&raw[..len]).to_ascii_uppercase();

        if offset + size > file_len {
            tracing::warn!(
                "{}: lump {} '{}' ({}+{}) extends beyond end of file, truncating",
                file_name,
                index,
                name,
                offset,
                size
            );
            size = file_len.saturating_sub(offset);
        }

        let lump_namespace = match classify_marker(&name) {
            Some(Marker::Start(ns)) => {
                namespace = ns;
                Namespace::GLOBAL
            }
            Some(Marker::End) => {
                namespace = Namespace::GLOBAL;
                Namespace::GLOBAL
            }
            None => namespace,
        };

        let mut entry = ResourceEntry::new(name, size, EntryLocation::Range { offset });
        entry.flags = LumpFlags::SHORT_NAME;
        entry.namespace = lump_namespace;
        entries.push(entry);
    }

    Ok(entries)
}
