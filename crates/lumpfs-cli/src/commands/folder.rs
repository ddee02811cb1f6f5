use crate::println_pad;
use crate::utils::{container_label, load_filesystem};
use colored::Colorize;
use miette::Result;

pub struct QueryFolderArgs {
    pub files: Vec<String>,
    pub config: Option<String>,
    pub path: String,
    pub atomic: bool,
}

pub fn query_folder(args: QueryFolderArgs) -> Result<()> {
    let fs = load_filesystem(args.files, args.config.as_deref(), None)?;
    let entries = fs.get_files_in_folder(&args.path, args.atomic);

    println_pad!(
        "{} {} {}",
        "📁 Folder:".bright_blue().bold(),
        args.path.bright_cyan().bold(),
        format!("({} entries{})", entries.len(), if args.atomic { ", atomic" } else { "" })
            .dimmed()
    );
    for entry in &entries {
        println_pad!(
            "   {} {} {} {}",
            "•".bright_cyan(),
            entry.name.bright_white(),
            format!("#{}", entry.index).dimmed(),
            container_label(&fs, entry.index).bright_yellow()
        );
    }

    Ok(())
}
