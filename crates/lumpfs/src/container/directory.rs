//! Directory-backed containers.

use super::{EntryLocation, LumpFlags, ResourceEntry};
use crate::error::{Error, Result};
use crate::name::normalize_path;
use crate::settings::LoadSettings;
use camino::{Utf8Path, Utf8PathBuf};
use walkdir::WalkDir;

/// Every regular file below `root`, named by its relative path.
///
/// Hidden files (leading `.`) are skipped. Entries are sorted by name so a
/// directory loads the same way on every platform.
pub(super) fn read_entries(root: &Utf8Path, settings: &LoadSettings) -> Result<Vec<ResourceEntry>> {
    let mut entries = Vec::new();

    for item in WalkDir::new(root.as_std_path())
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !e.file_name().to_string_lossy().starts_with('.'))
    {
        let item = item.map_err(|e| Error::OpenFailure {
            path: root.to_path_buf(),
            reason: e.to_string(),
        })?;
        if !item.file_type().is_file() {
            continue;
        }

        let path = match Utf8PathBuf::from_path_buf(item.path().to_path_buf()) {
            Ok(p) => p,
            Err(p) => {
                tracing::warn!("Skipping non-UTF-8 path: {}", p.display());
                continue;
            }
        };
        let Ok(relative) = path.strip_prefix(root) else {
            continue;
        };

        let name = normalize_path(relative.as_str());
        let size = item.metadata().map(|m| m.len()).unwrap_or(0);
        let mut entry = ResourceEntry::new(name, size, EntryLocation::Path(path));
        if settings.is_embedded_name(&entry.name) {
            entry.flags.insert(LumpFlags::EMBEDDED);
        }
        entries.push(entry);
    }

    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(entries)
}
