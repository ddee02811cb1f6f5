use camino::Utf8PathBuf;
use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum CliError {
    #[error("Configuration file not found: {path}")]
    #[diagnostic(
        code(config::not_found),
        help("Create a lumpfs.toml file or pass the correct path with --config")
    )]
    ConfigNotFound { path: Utf8PathBuf },

    #[error("Configuration file error: {path}")]
    #[diagnostic(
        code(config::parse_error),
        help("Check your lumpfs.toml file for syntax errors")
    )]
    ConfigParseError {
        path: Utf8PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("No input files")]
    #[diagnostic(
        code(input::empty),
        help("Pass the containers to load in order, or list them under `files` in lumpfs.toml")
    )]
    NoInputs,

    #[error("Nothing could be loaded")]
    #[diagnostic(
        code(input::load_failed),
        help("Make sure at least one of the inputs exists and is a WAD, ZIP or directory")
    )]
    LoadFailed {
        #[source]
        source: lumpfs::Error,
    },

    #[error("Lump not found: {name}")]
    #[diagnostic(
        code(lump::not_found),
        help("Short names are looked up in the global namespace unless --namespace is given; use --full for paths")
    )]
    LumpNotFound { name: String },

    #[error("Invalid namespace: {name}")]
    #[diagnostic(
        code(lump::invalid_namespace),
        help("Use a folder name such as \"sprites\", \"global\" or a number")
    )]
    InvalidNamespace { name: String },

    #[error("Failed to read lump {index}")]
    #[diagnostic(code(lump::read_failed))]
    ReadFailed {
        index: usize,
        #[source]
        source: lumpfs::Error,
    },

    #[error("IO operation failed")]
    #[diagnostic(code(io::operation_failed))]
    IoError {
        #[from]
        source: std::io::Error,
    },
}

impl CliError {
    pub fn config_not_found(path: Utf8PathBuf) -> Self {
        Self::ConfigNotFound { path }
    }

    pub fn config_parse_error(path: Utf8PathBuf, source: toml::de::Error) -> Self {
        Self::ConfigParseError { path, source }
    }

    pub fn lump_not_found(name: impl Into<String>) -> Self {
        Self::LumpNotFound { name: name.into() }
    }

    pub fn invalid_namespace(name: impl Into<String>) -> Self {
        Self::InvalidNamespace { name: name.into() }
    }
}
