//! Load settings.
//!
//! [`LoadSettings`] holds the plain-data knobs of a load run and is serializable so
//! front ends can keep it in a config file. Runtime hooks (message sink, audit log,
//! post-process callback) live on [`LoadOptions`](crate::LoadOptions).

use serde::{Deserialize, Serialize};

/// Data settings for [`FileSystem::init_multiple_files`](crate::FileSystem::init_multiple_files).
///
/// # JSON format
///
/// ```json
/// {
///   "allowDuplicates": false,
///   "iwadIndex": 1,
///   "maxIwadIndex": 1,
///   "embeddedExtensions": ["wad"]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoadSettings {
    /// Remove repeated inputs from the load order, keeping the first occurrence.
    pub allow_duplicates: bool,

    /// Container index of the main content file.
    ///
    /// Relocation of `after_iwad/` and `filter/<hash>/` folders only considers
    /// lumps from containers before this one. When unset, every lump present
    /// when the relocation starts is considered.
    pub iwad_index: Option<usize>,

    /// Input position after which `after_iwad/` content is relocated.
    pub max_iwad_index: Option<usize>,

    /// Extensions of top-level archive members that are opened as nested containers.
    pub embedded_extensions: Vec<String>,
}

impl Default for LoadSettings {
    fn default() -> Self {
        Self {
            allow_duplicates: false,
            iwad_index: None,
            max_iwad_index: None,
            embedded_extensions: vec!["wad".to_string()],
        }
    }
}

impl LoadSettings {
    /// Whether a top-level member with this name is a nested container.
    pub fn is_embedded_name(&self, name: &str) -> bool {
        if name.contains('/') {
            return false;
        }
        let Some(ext) = crate::name::extension(name) else {
            return false;
        };
        self.embedded_extensions
            .iter()
            .any(|candidate| candidate.eq_ignore_ascii_case(ext))
    }
}
