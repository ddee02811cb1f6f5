use crate::errors::CliError;
use crate::println_pad;
use crate::utils::load_filesystem;
use colored::Colorize;
use miette::Result;
use std::fs::File;
use std::io::{self, BufWriter, Write};

pub struct HashesArgs {
    pub files: Vec<String>,
    pub config: Option<String>,
    pub output: Option<String>,
}

pub fn write_hashes(args: HashesArgs) -> Result<()> {
    let mut out: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(File::create(path).map_err(CliError::from)?)),
        None => Box::new(io::stdout().lock()),
    };

    let audit: Box<dyn Write + '_> = Box::new(&mut out);
    let fs = load_filesystem(args.files, args.config.as_deref(), Some(audit))?;
    out.flush().map_err(CliError::from)?;

    if let Some(path) = &args.output {
        println_pad!(
            "{} {} {}",
            "🧾 Integrity log written to".bright_green().bold(),
            path.bright_white().bold(),
            format!("({} containers)", fs.num_resource_files()).dimmed()
        );
    }

    Ok(())
}
