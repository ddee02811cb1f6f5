use crate::errors::CliError;
use crate::println_pad;
use crate::utils::load_filesystem;
use camino::Utf8PathBuf;
use colored::Colorize;
use lumpfs::Namespace;
use miette::Result;
use std::fs;

pub struct ExtractLumpArgs {
    pub files: Vec<String>,
    pub config: Option<String>,
    pub name: String,
    pub output: String,
}

pub fn extract_lump(args: ExtractLumpArgs) -> Result<()> {
    let filesystem = load_filesystem(args.files, args.config.as_deref(), None)?;

    // Paths first, then the legacy short name.
    let index = filesystem
        .find_file(&args.name)
        .or_else(|| filesystem.check_num_for_name(&args.name, Namespace::GLOBAL))
        .ok_or_else(|| CliError::lump_not_found(args.name.clone()))?;

    let data = filesystem
        .read_file(index)
        .map_err(|source| CliError::ReadFailed { index, source })?;

    let output = Utf8PathBuf::from(&args.output);
    if let Some(parent) = output.parent() {
        if !parent.as_str().is_empty() {
            fs::create_dir_all(parent).map_err(CliError::from)?;
        }
    }
    fs::write(&output, &data).map_err(CliError::from)?;

    println_pad!(
        "{} {} {} {}",
        "📦 Extracted:".bright_blue().bold(),
        filesystem
            .file_full_path(index)
            .unwrap_or_default()
            .bright_cyan()
            .bold(),
        "->".dimmed(),
        output.as_str().bright_white().bold()
    );
    println_pad!(
        "{}",
        format!("✅ Wrote {} bytes", data.len()).bright_green().bold()
    );

    Ok(())
}
