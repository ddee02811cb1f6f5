use crate::errors::CliError;
use crate::println_pad;
use crate::utils::{container_label, load_filesystem, parse_namespace};
use colored::Colorize;
use lumpfs::{FileSystem, Namespace};
use miette::Result;

pub struct FindLumpArgs {
    pub files: Vec<String>,
    pub config: Option<String>,
    pub name: String,
    pub namespace: String,
    pub full: bool,
    pub all: bool,
}

pub fn find_lump(args: FindLumpArgs) -> Result<()> {
    let namespace = parse_namespace(&args.namespace)?;
    let fs = load_filesystem(args.files, args.config.as_deref(), None)?;

    let matches = if args.all {
        all_matches(&fs, &args.name, namespace, args.full)
    } else {
        winner(&fs, &args.name, namespace, args.full)
            .into_iter()
            .collect()
    };
    if matches.is_empty() {
        return Err(CliError::lump_not_found(args.name).into());
    }

    println_pad!(
        "{} {}",
        "🔎 Lookup:".bright_blue().bold(),
        args.name.bright_cyan().bold()
    );
    for index in matches {
        print_match(&fs, index);
    }

    Ok(())
}

fn winner(fs: &FileSystem, name: &str, namespace: Namespace, full: bool) -> Option<usize> {
    if full {
        fs.check_num_for_full_name_with(name, false, namespace, false)
    } else {
        fs.check_num_for_name(name, namespace)
    }
}

/// Every match in load order, so the last one is the winner.
fn all_matches(fs: &FileSystem, name: &str, namespace: Namespace, full: bool) -> Vec<usize> {
    let mut found = Vec::new();
    let mut cursor = 0;
    loop {
        let next = if full {
            fs.find_lump_full_name(name, &mut cursor, false)
        } else {
            fs.find_lump(name, &mut cursor, true)
                .filter(|&index| {
                    fs.record(index)
                        .is_some_and(|record| record.matches_namespace(namespace))
                })
        };
        match next {
            Some(index) => found.push(index),
            None if cursor >= fs.num_entries() => break,
            None => {}
        }
    }
    found
}

fn print_match(fs: &FileSystem, index: usize) {
    println_pad!(
        "   {} {} {}",
        "•".bright_cyan(),
        format!("#{}", index).bright_white().bold(),
        fs.file_full_path(index).unwrap_or_default().bright_white()
    );
    println_pad!(
        "     {} {}  {} {}  {} {}",
        "short:".dimmed(),
        fs.file_short_name(index).unwrap_or_default(),
        "namespace:".dimmed(),
        fs.file_namespace(index),
        "size:".dimmed(),
        fs.file_length(index).unwrap_or_default()
    );
    println_pad!(
        "     {} {}",
        "container:".dimmed(),
        container_label(fs, index).bright_yellow()
    );
}
