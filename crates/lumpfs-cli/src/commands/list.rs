use crate::println_pad;
use crate::utils::{container_label, load_filesystem};
use colored::Colorize;
use miette::Result;

pub struct ListLumpsArgs {
    pub files: Vec<String>,
    pub config: Option<String>,
}

pub fn list_lumps(args: ListLumpsArgs) -> Result<()> {
    let fs = load_filesystem(args.files, args.config.as_deref(), None)?;

    println_pad!(
        "{} {}",
        "📚 Lumps:".bright_blue().bold(),
        fs.num_entries().to_string().bright_cyan().bold()
    );
    for (index, record) in fs.records().iter().enumerate() {
        println_pad!(
            "{:>6} {:<8} {:<40} {:<10} {:<24} {}",
            index.to_string().dimmed(),
            record.short_name().to_string().bright_cyan(),
            record.long_name().bright_white(),
            record.namespace().to_string().bright_magenta(),
            container_label(&fs, index).bright_yellow(),
            record.size()
        );
    }

    Ok(())
}
