//! Integrity log written while loading.
//!
//! One line per container and one per non-embedded entry:
//!
//! ```text
//! file: doom2.wad, hash: 25E1459CA71D321525F84628F45CA8CD, size: 14604584
//! file: doom2.wad, lump: PLAYPAL, hash: 3A1C2B..., size: 10752
//! file: mods/dir, Directory structure
//! ```

use crate::container::{md5_hex, ContainerSource, LumpFlags, ResourceFile};
use crate::error::Result;
use std::io::Write;

pub(crate) fn write_container<W: Write + ?Sized>(out: &mut W, file: &ResourceFile) -> Result<()> {
    let name = file.file_name();

    match file.source() {
        ContainerSource::Directory(_) => writeln!(out, "file: {}, Directory structure", name)?,
        _ => {
            let size = file.open_whole().map_or(0, |reader| reader.len());
            if let Some(hash) = file.content_hash() {
                writeln!(
                    out,
                    "file: {}, hash: {}, size: {}",
                    name,
                    hash.to_ascii_uppercase(),
                    size
                )?;
            }
        }
    }

    for (slot, entry) in file.entries().iter().enumerate() {
        if entry.flags.contains(LumpFlags::EMBEDDED) {
            continue;
        }
        let mut reader = file.open_entry(slot, false)?;
        let hash = md5_hex(&mut reader)?;
        writeln!(
            out,
            "file: {}, lump: {}, hash: {}, size: {}",
            name, entry.name, hash, entry.size
        )?;
    }

    Ok(())
}
