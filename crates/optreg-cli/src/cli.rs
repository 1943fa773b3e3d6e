use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use optreg_persist::Format;

#[derive(Parser)]
#[command(
    name = "optreg",
    about = "Inspect and convert saved option stores",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long = "output", global = true, default_value = "text")]
    pub output_format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Document format, when it cannot be taken from the file extension.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum FileFormat {
    Json,
    Toml,
}

impl From<FileFormat> for Format {
    fn from(format: FileFormat) -> Self {
        match format {
            FileFormat::Json => Format::Json,
            FileFormat::Toml => Format::Toml,
        }
    }
}

#[derive(Subcommand)]
pub enum Command {
    /// List every value of a saved store
    Show(ShowArgs),
    /// Print one encoded value
    Get(GetArgs),
    /// Set one encoded value in place
    Set(SetArgs),
    /// Remove one value in place
    Unset(UnsetArgs),
    /// Rewrite a saved store in another format
    Convert(ConvertArgs),
}

#[derive(Args)]
pub struct ShowArgs {
    pub file: PathBuf,
    #[arg(long)]
    pub format: Option<FileFormat>,
}

#[derive(Args)]
pub struct GetArgs {
    pub file: PathBuf,
    pub key: String,
    #[arg(long)]
    pub format: Option<FileFormat>,
}

#[derive(Args)]
pub struct SetArgs {
    pub file: PathBuf,
    pub key: String,
    #[arg(allow_hyphen_values = true)]
    pub value: String,
    #[arg(long)]
    pub format: Option<FileFormat>,
}

#[derive(Args)]
pub struct UnsetArgs {
    pub file: PathBuf,
    pub key: String,
    #[arg(long)]
    pub format: Option<FileFormat>,
}

#[derive(Args)]
pub struct ConvertArgs {
    pub input: PathBuf,
    pub output: PathBuf,
    #[arg(long)]
    pub from: Option<FileFormat>,
    #[arg(long)]
    pub to: Option<FileFormat>,
}
