//! Layered, read-only lump directory.
//!
//! This crate merges an ordered list of resource containers (WAD files, ZIP
//! archives, plain directories and loose files) into one flat directory of
//! *lumps*: named binary blobs addressed by a stable integer handle. Later
//! containers shadow earlier ones for same-named content. It supports:
//!
//! - **Short names**: legacy 8-character uppercase names, split into namespaces
//! - **Full names**: case-insensitive paths, with or without their extension
//! - **Folder queries**: per-entry or per-container ("atomic") override
//! - **Resource ids**: numeric ids from the container or a `.{id}` name tag
//! - **Relocation**: `after_iwad/` and `filter/<hash>/` content moved to the end
//!
//! # Example
//!
//! ```no_run
//! use lumpfs::{FileSystem, LoadOptions, LoadSettings, Namespace};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let settings = LoadSettings {
//!     iwad_index: Some(0),
//!     max_iwad_index: Some(0),
//!     ..Default::default()
//! };
//!
//! let mut fs = FileSystem::new();
//! fs.init_multiple_files(
//!     ["doom2.wad", "mymod.pk3"],
//!     LoadOptions::new(settings).with_messages(|_, text| println!("{}", text)),
//! )?;
//!
//! if let Some(index) = fs.check_num_for_name("PLAYPAL", Namespace::GLOBAL) {
//!     let palette = fs.read_file(index)?;
//!     println!("PLAYPAL is {} bytes", palette.len());
//! }
//!
//! for entry in fs.get_files_in_folder("sprites/", false) {
//!     println!("{} -> {}", entry.name, entry.index);
//! }
//! # Ok(())
//! # }
//! ```

mod audit;
pub mod container;
pub mod error;
pub mod filesystem;
mod index;
pub mod loader;
pub mod lookup;
pub mod name;
pub mod namespace;
pub mod reader;
pub mod record;
pub mod settings;

// Re-export main types
pub use container::{ContainerKind, ContainerSource, LumpFlags, ResourceEntry, ResourceFile};
pub use error::{Error, Result};
pub use filesystem::FileSystem;
pub use loader::{LoadInput, LoadOptions, MessageLevel, AFTER_IWAD_FOLDER};
pub use lookup::FolderEntry;
pub use name::ShortName;
pub use namespace::{Namespace, NAMESPACE_FOLDERS};
pub use reader::LumpReader;
pub use record::{LumpContent, LumpRecord};
pub use settings::LoadSettings;

#[cfg(test)]
mod tests;
