use crate::errors::CliError;
use colored::Colorize;
use lumpfs::{FileSystem, LoadOptions, Namespace};
use miette::Result;
use std::io::Write;

pub mod config;

#[macro_export]
macro_rules! println_pad {
    ($($arg:tt)*) => {{
        let __s = format!($($arg)*);
        for __line in __s.lines() {
            println!("    {}", __line);
        }
    }};
}

/// Picks the load order: the command line wins, the config file is the fallback.
pub fn resolve_inputs(files: Vec<String>, configured: &[String]) -> Result<Vec<String>> {
    if !files.is_empty() {
        return Ok(files);
    }
    if configured.is_empty() {
        return Err(CliError::NoInputs.into());
    }
    Ok(configured.to_vec())
}

/// Builds the merged directory for a command.
pub fn load_filesystem(
    files: Vec<String>,
    config_path: Option<&str>,
    audit: Option<Box<dyn Write + '_>>,
) -> Result<FileSystem> {
    let cfg = config::load_config(config_path)?;
    let inputs = resolve_inputs(files, &cfg.files)?;

    let mut options = LoadOptions::new(cfg.settings).with_messages(|level, text| {
        if level == lumpfs::MessageLevel::Error {
            eprintln!("    {}", text.bright_red());
        }
    });
    if let Some(out) = audit {
        options = options.with_audit(out);
    }

    let mut fs = FileSystem::new();
    fs.init_multiple_files(inputs, options)
        .map_err(|source| CliError::LoadFailed { source })?;
    Ok(fs)
}

/// Parses `--namespace`: a folder-style name or a raw number.
pub fn parse_namespace(value: &str) -> Result<Namespace, CliError> {
    if let Some(ns) = Namespace::from_name(value) {
        return Ok(ns);
    }
    value
        .parse::<i32>()
        .map(Namespace)
        .map_err(|_| CliError::invalid_namespace(value))
}

/// Display label of the container that owns a lump.
pub fn container_label(fs: &FileSystem, index: usize) -> String {
    fs.file_container(index)
        .and_then(|container| fs.resource_file_name(container))
        .unwrap_or("<manual>")
        .to_string()
}
