//! Lump namespaces.
//!
//! A namespace is a coarse category used to tell apart same-named lumps that are
//! meant for different purposes (a sprite `TROOA1` and a sound `TROOA1`). WAD lumps
//! get theirs from marker ranges inside the WAD; path-based lumps get theirs from
//! the first folder of their full name, see [`NAMESPACE_FOLDERS`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// Numeric namespace identifier.
///
/// This is an open newtype rather than a closed enum: callers may assign their own
/// values above [`Namespace::MUSIC`] (for example per-skin namespaces) through
/// [`FileSystem::set_file_namespace`](crate::FileSystem::set_file_namespace).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Namespace(pub i32);

impl Namespace {
    /// Lumps that must never be found by short name.
    pub const HIDDEN: Namespace = Namespace(-1);
    pub const GLOBAL: Namespace = Namespace(0);
    pub const SPRITES: Namespace = Namespace(1);
    pub const FLATS: Namespace = Namespace(2);
    pub const COLORMAPS: Namespace = Namespace(3);
    pub const ACS_LIBRARY: Namespace = Namespace(4);
    pub const NEW_TEXTURES: Namespace = Namespace(5);
    pub const BLOOD_RAW: Namespace = Namespace(6);
    pub const BLOOD_SFX: Namespace = Namespace(7);
    pub const BLOOD_MISC: Namespace = Namespace(8);
    pub const STRIFE_VOICES: Namespace = Namespace(9);
    pub const HIRES: Namespace = Namespace(10);
    pub const VOXELS: Namespace = Namespace(11);

    /// First of the namespaces that only exist as folders in path-based containers.
    ///
    /// Short name lookups for namespaces strictly above this one also accept
    /// global lumps coming from formats that know nothing about folders.
    pub const SPECIAL_ZIP_DIRECTORY: Namespace = Namespace(12);
    pub const SOUNDS: Namespace = Namespace(12);
    pub const PATCHES: Namespace = Namespace(13);
    pub const GRAPHICS: Namespace = Namespace(14);
    pub const MUSIC: Namespace = Namespace(15);

    /// Base value for caller-defined namespaces.
    pub const FIRST_SKIN: Namespace = Namespace(16);

    /// Whether lumps in this namespace are excluded from short name lookups.
    pub fn is_hidden(self) -> bool {
        self == Namespace::HIDDEN
    }

    /// Parse a namespace from its folder-style name (`"sprites"`, `"global"`, ...).
    pub fn from_name(name: &str) -> Option<Namespace> {
        let lower = name.trim_end_matches('/').to_ascii_lowercase();
        match lower.as_str() {
            "global" => Some(Namespace::GLOBAL),
            "hidden" => Some(Namespace::HIDDEN),
            other => NAMESPACE_FOLDERS
                .iter()
                .find(|(folder, _)| folder.trim_end_matches('/') == other)
                .map(|(_, ns)| *ns),
        }
    }

    /// Infer the namespace of a full lump name from its leading folder.
    ///
    /// Names without any slash are global; names under an unknown folder are hidden.
    pub fn from_path(long_name: &str) -> Namespace {
        for (folder, ns) in NAMESPACE_FOLDERS {
            if long_name.starts_with(folder) {
                return ns;
            }
        }
        if long_name.contains('/') {
            Namespace::HIDDEN
        } else {
            Namespace::GLOBAL
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match *self {
            Namespace::HIDDEN => "hidden",
            Namespace::GLOBAL => "global",
            Namespace::SPRITES => "sprites",
            Namespace::FLATS => "flats",
            Namespace::COLORMAPS => "colormaps",
            Namespace::ACS_LIBRARY => "acs",
            Namespace::NEW_TEXTURES => "textures",
            Namespace::BLOOD_RAW => "bloodraw",
            Namespace::BLOOD_SFX => "bloodsfx",
            Namespace::BLOOD_MISC => "bloodmisc",
            Namespace::STRIFE_VOICES => "voices",
            Namespace::HIRES => "hires",
            Namespace::VOXELS => "voxels",
            Namespace::SOUNDS => "sounds",
            Namespace::PATCHES => "patches",
            Namespace::GRAPHICS => "graphics",
            Namespace::MUSIC => "music",
            Namespace(other) => return write!(f, "ns{}", other),
        };
        f.write_str(name)
    }
}

/// Folder prefixes that classify path-based lumps.
///
/// Any container format relying on folder-based classification must use these
/// exact lowercase prefixes.
pub const NAMESPACE_FOLDERS: [(&str, Namespace); 12] = [
    ("flats/", Namespace::FLATS),
    ("textures/", Namespace::NEW_TEXTURES),
    ("hires/", Namespace::HIRES),
    ("sprites/", Namespace::SPRITES),
    ("voxels/", Namespace::VOXELS),
    ("colormaps/", Namespace::COLORMAPS),
    ("acs/", Namespace::ACS_LIBRARY),
    ("voices/", Namespace::STRIFE_VOICES),
    ("patches/", Namespace::PATCHES),
    ("graphics/", Namespace::GRAPHICS),
    ("sounds/", Namespace::SOUNDS),
    ("music/", Namespace::MUSIC),
];
