//! The container merge pipeline.
//!
//! [`FileSystem::init_multiple_files`] rebuilds the whole directory from an
//! ordered list of inputs:
//!
//! 1. Drop the previous state and optionally remove repeated inputs.
//! 2. Open every input in order and append its entries. Nested containers
//!    (top-level `.wad` members of an archive, by default) are opened
//!    recursively as `parent:member` and spliced in right after their parent.
//! 3. After the input at `max_iwad_index`, move everything under `after_iwad/`
//!    to the end of the directory. After every input, do the same for
//!    `filter/<md5 of the last container>/`, so content can target one
//!    specific release of another file.
//! 4. Fail with [`Error::EmptyResult`] if nothing was loaded, otherwise run the
//!    post-process hook and build the hash tables.
//!
//! An input that cannot be opened is reported and skipped.

use crate::audit;
use crate::container::{ContainerSource, LumpFlags, ResourceFile};
use crate::error::{Error, Result};
use crate::filesystem::FileSystem;
use crate::name::starts_with_ignore_case;
use crate::record::{EntryInfo, LumpContent, LumpRecord};
use crate::settings::LoadSettings;
use camino::{Utf8Path, Utf8PathBuf};
use std::fs::File;
use std::io::{Read, Write};
use std::sync::Arc;

/// Relocation prefix applied after the main content file.
pub const AFTER_IWAD_FOLDER: &str = "after_iwad/";

/// One entry of a load order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadInput {
    /// A file or directory on disk.
    Path(Utf8PathBuf),
    /// A container image already in memory.
    Memory { name: String, data: Arc<[u8]> },
}

impl LoadInput {
    pub fn name(&self) -> &str {
        match self {
            LoadInput::Path(path) => path.as_str(),
            LoadInput::Memory { name, .. } => name,
        }
    }
}

impl From<Utf8PathBuf> for LoadInput {
    fn from(path: Utf8PathBuf) -> Self {
        LoadInput::Path(path)
    }
}

impl From<&Utf8Path> for LoadInput {
    fn from(path: &Utf8Path) -> Self {
        LoadInput::Path(path.to_path_buf())
    }
}

impl From<&str> for LoadInput {
    fn from(path: &str) -> Self {
        LoadInput::Path(Utf8PathBuf::from(path))
    }
}

impl From<String> for LoadInput {
    fn from(path: String) -> Self {
        LoadInput::Path(Utf8PathBuf::from(path))
    }
}

/// Severity of a pipeline message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageLevel {
    Message,
    Error,
}

type MessageCallback = Arc<dyn Fn(MessageLevel, &str) + Send + Sync>;
type PostProcessHook<'a> = Box<dyn FnOnce(&mut FileSystem) + 'a>;

/// Settings plus runtime hooks for one load run.
///
/// ```no_run
/// use lumpfs::{FileSystem, LoadOptions, LoadSettings, MessageLevel};
///
/// let mut fs = FileSystem::new();
/// let options = LoadOptions::new(LoadSettings::default())
///     .with_messages(|level, text| {
///         if level == MessageLevel::Error {
///             eprintln!("{}", text);
///         }
///     });
/// fs.init_multiple_files(["doom2.wad", "mod.pk3"], options)?;
/// # Ok::<(), lumpfs::Error>(())
/// ```
#[derive(Default)]
pub struct LoadOptions<'a> {
    pub settings: LoadSettings,
    messages: Option<MessageCallback>,
    audit: Option<Box<dyn Write + 'a>>,
    post_process: Option<PostProcessHook<'a>>,
}

impl<'a> LoadOptions<'a> {
    pub fn new(settings: LoadSettings) -> Self {
        Self {
            settings,
            ..Default::default()
        }
    }

    /// Register a message sink.
    ///
    /// It receives the progress line for every container and the reason an
    /// input was skipped. Every message is also emitted as a `tracing` event.
    pub fn with_messages<F>(mut self, callback: F) -> Self
    where
        F: Fn(MessageLevel, &str) + Send + Sync + 'static,
    {
        self.messages = Some(Arc::new(callback));
        self
    }

    /// Write the integrity log of every loaded container to `out`.
    pub fn with_audit<W: Write + 'a>(mut self, out: W) -> Self {
        self.audit = Some(Box::new(out));
        self
    }

    /// Run `hook` after all inputs are loaded, right before the hash tables are built.
    pub fn with_post_process<F>(mut self, hook: F) -> Self
    where
        F: FnOnce(&mut FileSystem) + 'a,
    {
        self.post_process = Some(Box::new(hook));
        self
    }

    fn emit(&self, level: MessageLevel, text: &str) {
        match level {
            MessageLevel::Message => tracing::info!("{}", text),
            MessageLevel::Error => tracing::error!("{}", text),
        }
        if let Some(callback) = &self.messages {
            callback(level, text);
        }
    }
}

impl FileSystem {
    /// Rebuild the directory from `inputs`, in load order.
    pub fn init_multiple_files<I>(&mut self, inputs: I, mut options: LoadOptions<'_>) -> Result<()>
    where
        I: IntoIterator,
        I::Item: Into<LoadInput>,
    {
        self.delete_all();
        self.iwad_index = options.settings.iwad_index;

        let mut order: Vec<LoadInput> = Vec::new();
        for input in inputs.into_iter().map(Into::into) {
            if options.settings.allow_duplicates && order.contains(&input) {
                tracing::debug!("Dropping repeated input '{}'", input.name());
                continue;
            }
            order.push(input);
        }

        tracing::info!("Loading {} inputs", order.len());
        for (position, input) in order.into_iter().enumerate() {
            self.add_file(input, &mut options);

            if options.settings.max_iwad_index == Some(position) {
                self.move_lumps_in_folder(AFTER_IWAD_FOLDER);
            }
            let filter = self
                .files
                .last()
                .and_then(ResourceFile::content_hash)
                .map(|hash| format!("filter/{}/", hash));
            if let Some(filter) = filter {
                self.move_lumps_in_folder(&filter);
            }
        }

        if self.records.is_empty() {
            tracing::error!("No lumps were loaded");
            return Err(Error::EmptyResult);
        }

        if let Some(hook) = options.post_process.take() {
            hook(self);
        }
        self.rebuild_index();

        tracing::info!(
            "Loaded {} lumps from {} containers",
            self.records.len(),
            self.files.len()
        );
        Ok(())
    }

    /// Load a single input.
    pub fn init_single_file(
        &mut self,
        input: impl Into<LoadInput>,
        options: LoadOptions<'_>,
    ) -> Result<()> {
        self.init_multiple_files([input.into()], options)
    }

    /// Open one input and append its entries.
    ///
    /// Returns the index of the new container, or `None` when the input was skipped.
    /// The hash tables are not rebuilt.
    pub fn add_file(&mut self, input: LoadInput, options: &mut LoadOptions<'_>) -> Option<usize> {
        match input {
            LoadInput::Path(path) => {
                let meta = match std::fs::metadata(path.as_std_path()) {
                    Ok(meta) => meta,
                    Err(e) => {
                        options.emit(
                            MessageLevel::Error,
                            &format!("{}: File or Directory not found", path),
                        );
                        options.emit(MessageLevel::Error, &format!("  {}", e));
                        return None;
                    }
                };
                let source = if meta.is_dir() {
                    ContainerSource::Directory(path.clone())
                } else {
                    if let Err(e) = File::open(path.as_std_path()) {
                        options.emit(MessageLevel::Error, &format!("{}: File not found", path));
                        options.emit(MessageLevel::Error, &format!("  {}", e));
                        return None;
                    }
                    ContainerSource::File(path.clone())
                };
                self.add_container(path.as_str(), source, options)
            }
            LoadInput::Memory { name, data } => {
                self.add_container(&name, ContainerSource::Memory(data), options)
            }
        }
    }

    fn add_container(
        &mut self,
        name: &str,
        source: ContainerSource,
        options: &mut LoadOptions<'_>,
    ) -> Option<usize> {
        let mut file = match ResourceFile::open(name, source, &options.settings) {
            Ok(file) => file,
            Err(e) => {
                options.emit(MessageLevel::Error, &format!("{}: {}", name, e));
                return None;
            }
        };

        options.emit(
            MessageLevel::Message,
            &format!("adding {}, {} lumps", name, file.entry_count()),
        );

        let container = self.files.len();
        file.set_first_entry(self.records.len());
        for (slot, entry) in file.entries().iter().enumerate() {
            self.records.push(LumpRecord::new(
                Some(container),
                &entry.name,
                EntryInfo::from(entry),
                LumpContent::Container { container, slot },
            ));
        }
        self.files.push(file);

        let nested: Vec<usize> = self.files[container]
            .entries()
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.flags.contains(LumpFlags::EMBEDDED))
            .map(|(slot, _)| slot)
            .collect();
        for slot in nested {
            let parent = &self.files[container];
            let nested_name = format!("{}:{}", name, parent.entries()[slot].name);
            match read_entry(parent, slot) {
                Ok(data) => {
                    self.add_container(&nested_name, ContainerSource::Memory(data.into()), options);
                }
                Err(e) => {
                    options.emit(MessageLevel::Error, &format!("{}: {}", nested_name, e));
                }
            }
        }

        if let Some(out) = options.audit.as_mut() {
            if let Err(e) = audit::write_container(out.as_mut(), &self.files[container]) {
                tracing::warn!("Failed to write integrity log for '{}': {}", name, e);
            }
        }

        Some(container)
    }

    /// Move every lump under `path` to the end of the directory.
    ///
    /// Each matching lump is copied with `path` stripped from its name and is
    /// attributed to the most recently loaded container, so it overrides anything
    /// loaded so far. The original keeps its index and names but serves no bytes.
    /// Only lumps from containers before [`iwad_index`](Self::iwad_index) are
    /// considered; without one, every lump present when the call starts is.
    ///
    /// Returns the number of relocated lumps. The hash tables are not rebuilt.
    pub fn move_lumps_in_folder(&mut self, path: &str) -> usize {
        let Some(last) = self.records.last() else {
            return 0;
        };
        let target = last.container;
        let existing = self.records.len();
        let mut moved = 0;

        for index in 0..existing {
            if let (Some(iwad), Some(owner)) = (self.iwad_index, self.records[index].container) {
                if owner >= iwad {
                    break;
                }
            }
            if !starts_with_ignore_case(&self.records[index].long_name, path) {
                continue;
            }

            let mut copy = self.records[index].clone();
            let new_name = copy.long_name[path.len()..].to_string();
            copy.set_from_name(target, &new_name);
            tracing::debug!(
                "Relocating '{}' to '{}' (index {} -> {})",
                self.records[index].long_name,
                new_name,
                index,
                self.records.len()
            );
            self.records[index].hollow_out();
            self.records.push(copy);
            moved += 1;
        }

        if moved > 0 {
            tracing::info!("Relocated {} lumps from '{}'", moved, path);
        }
        moved
    }
}

fn read_entry(file: &ResourceFile, slot: usize) -> Result<Vec<u8>> {
    let mut reader = file.open_entry(slot, true)?;
    let mut data = Vec::with_capacity(usize::try_from(reader.len()).unwrap_or(0));
    reader.read_to_end(&mut data)?;
    Ok(data)
}
