pub mod calc;
pub mod config_cmd;
pub mod info;
pub mod show;
pub mod summary;
pub mod validate;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::AppConfig;

#[derive(Parser)]
#[command(
    name = "ternary-tools",
    version,
    about = "Inspect GGUF model files, with balanced-ternary rendering"
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, clap::Args, Clone)]
pub struct GlobalArgs {
    /// Also render integer fields in balanced ternary (-, 0, +).
    #[arg(long, global = true, env = "TERNARY_TOOLS_TERNARY")]
    pub ternary: bool,
}

impl GlobalArgs {
    /// The flag wins when set; otherwise fall back to the saved config.
    pub fn ternary(&self, cfg: &AppConfig) -> bool {
        self.ternary || cfg.ternary
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// One-screen overview: architecture, parameters, tensors, checksum.
    Summary(SummaryArgs),

    /// Full metadata and tensor tables.
    Info(InfoArgs),

    /// Preview the values of one tensor.
    Show(ShowArgs),

    /// Check structural invariants; exits non-zero on blocking findings.
    Validate(ValidateArgs),

    /// Convert between decimal and balanced ternary.
    #[command(hide = true)]
    Calc(CalcArgs),

    /// View / edit configuration.
    Config(ConfigArgs),
}

//  Subcommand argument structs

#[derive(Debug, clap::Args, Clone)]
pub struct SummaryArgs {
    /// Path to a GGUF file.
    pub file: PathBuf,

    /// Print JSON instead of text.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, clap::Args, Clone)]
pub struct InfoArgs {
    /// Path to a GGUF file.
    pub file: PathBuf,

    /// Print the parsed model as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, clap::Args, Clone)]
pub struct ShowArgs {
    /// Path to a GGUF file.
    pub file: PathBuf,

    /// Tensor name.
    pub tensor: String,

    /// Number of leading elements to show (default from config).
    #[arg(long)]
    pub head: Option<usize>,

    /// Hex-dump raw bytes instead of decoding.
    #[arg(long)]
    pub raw: bool,
}

#[derive(Debug, clap::Args, Clone)]
pub struct ValidateArgs {
    /// Path to a GGUF file.
    pub file: PathBuf,

    /// Print the report as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, clap::Args, Clone)]
pub struct CalcArgs {
    /// Decimal integer, or a balanced-ternary string of -, 0 and +.
    #[arg(allow_hyphen_values = true)]
    pub value: String,
}

#[derive(Debug, clap::Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Display the current configuration.
    Show,
    /// Set a configuration value.
    Set { key: String, value: String },
}
