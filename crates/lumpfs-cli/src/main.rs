use clap::builder::{styling::AnsiColor, Styles};
use clap::ColorChoice;
use clap::{CommandFactory, FromArgMatches, Parser, Subcommand};
use commands::{
    extract_lump, find_lump, list_lumps, query_folder, write_hashes, ExtractLumpArgs,
    FindLumpArgs, HashesArgs, ListLumpsArgs, QueryFolderArgs,
};
use miette::Result;
use tracing_subscriber::EnvFilter;

mod commands;
mod errors;
mod utils;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to a lumpfs.toml config file (defaults to the one next to the executable)
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print every lump of the merged directory
    List {
        /// Containers in load order
        files: Vec<String>,
    },
    /// Resolve a single name to its winning lump
    Find {
        /// Containers in load order
        files: Vec<String>,

        /// The short name or full path to look up
        #[arg(short, long)]
        name: String,

        /// Namespace for short name lookups (name like "sprites" or a number)
        #[arg(long, default_value = "global")]
        namespace: String,

        /// Look the name up as a full path
        #[arg(long)]
        full: bool,

        /// List every matching lump in load order instead of only the winner
        #[arg(long)]
        all: bool,
    },
    /// List the lumps under a folder
    Folder {
        /// Containers in load order
        files: Vec<String>,

        /// Folder prefix, e.g. "sprites/"
        #[arg(short, long)]
        path: String,

        /// Only keep the folder's content from the last container that has any
        #[arg(long)]
        atomic: bool,
    },
    /// Write the bytes of one lump to a file
    Extract {
        /// Containers in load order
        files: Vec<String>,

        /// The short name or full path of the lump
        #[arg(short, long)]
        name: String,

        /// The file to write
        #[arg(short, long)]
        output: String,
    },
    /// Write the integrity log of every loaded container
    Hashes {
        /// Containers in load order
        files: Vec<String>,

        /// The file to write (defaults to stdout)
        #[arg(short, long)]
        output: Option<String>,
    },
}

fn parse_args() -> Args {
    // Configure colored/styled help output
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default().bold())
        .usage(AnsiColor::Green.on_default().bold())
        .literal(AnsiColor::Cyan.on_default())
        .placeholder(AnsiColor::Blue.on_default());

    let matches = Args::command()
        .styles(styles)
        .color(ColorChoice::Auto)
        .get_matches();

    Args::from_arg_matches(&matches).expect("failed to parse arguments")
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("lumpfs=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    init_tracing();

    let args = parse_args();
    let config = args.config;

    match args.command {
        Commands::List { files } => list_lumps(ListLumpsArgs { files, config }),
        Commands::Find {
            files,
            name,
            namespace,
            full,
            all,
        } => find_lump(FindLumpArgs {
            files,
            config,
            name,
            namespace,
            full,
            all,
        }),
        Commands::Folder {
            files,
            path,
            atomic,
        } => query_folder(QueryFolderArgs {
            files,
            config,
            path,
            atomic,
        }),
        Commands::Extract {
            files,
            name,
            output,
        } => extract_lump(ExtractLumpArgs {
            files,
            config,
            name,
            output,
        }),
        Commands::Hashes { files, output } => write_hashes(HashesArgs {
            files,
            config,
            output,
        }),
    }
}
