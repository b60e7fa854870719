use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};

#[derive(Debug, Parser)]
#[command(
    name = "easyergo",
    version,
    about = "Language server and checker for EasyBuild easyconfig files"
)]
pub(crate) struct Cli {
    /// Settings file (`easyergo.toml`).
    #[arg(long, global = true, env = "EASYERGO_CONFIG")]
    pub(crate) config: Option<PathBuf>,

    /// Easyconfig repository root; may be repeated.
    #[arg(long = "robot-path", global = true)]
    pub(crate) robot_paths: Vec<PathBuf>,

    /// Knowledge table merged over the built-in one.
    #[arg(long, global = true)]
    pub(crate) knowledge: Option<PathBuf>,

    #[arg(long, global = true, default_value_t = false, action = ArgAction::SetTrue)]
    pub(crate) debug: bool,

    #[command(subcommand)]
    pub(crate) command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub(crate) enum Commands {
    /// Run the language server, on stdio unless a port is given.
    Serve {
        #[arg(long, short = 'p')]
        port: Option<u16>,

        #[arg(long, short = 'a', default_value = "localhost")]
        address: String,

        /// Keep accepting TCP clients after one disconnects.
        #[arg(long, default_value_t = false, action = ArgAction::SetTrue)]
        persistent: bool,
    },
    /// Analyse easyconfig files on disk.
    Check {
        #[arg(required = true)]
        files: Vec<PathBuf>,

        #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
        format: OutputFormat,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub(crate) enum OutputFormat {
    Human,
    Json,
}
