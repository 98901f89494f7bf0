// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::job::render::{
    DEFAULT_ASPECT, DEFAULT_FPS, DEFAULT_NUM, DEFAULT_OUT_NAME, DEFAULT_SECONDS,
};
use crate::job::RenderRequest;

/// Command-line arguments for `storyjobs`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "storyjobs",
    version,
    about = "Run story engine jobs (doctor, smoke test, image renders) one after another.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `Storyjobs.toml` in the current working directory. A missing
    /// file means built-in defaults.
    #[arg(long, value_name = "PATH", default_value = "Storyjobs.toml", global = true)]
    pub config: String,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `STORYJOBS_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL", global = true)]
    pub log_level: Option<LogLevel>,

    /// Print the engine command that would run, without running it.
    #[arg(long, global = true)]
    pub dry_run: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Ask the engine to check its own environment.
    Doctor,

    /// Render the built-in smoke test clip into the output directory.
    Smoke,

    /// Render frames from one or more prompts and assemble a clip.
    RenderImages(RenderArgs),

    /// Manage the engine API key in the configured credential store.
    Credential {
        #[command(subcommand)]
        action: CredentialAction,
    },
}

#[derive(Debug, Clone, Args)]
pub struct RenderArgs {
    /// Single prompt rendered `--num` times.
    #[arg(long, conflicts_with = "prompts", required_unless_present = "prompts")]
    pub prompt: Option<String>,

    #[arg(long, default_value_t = DEFAULT_NUM)]
    pub num: u32,

    /// Several prompts separated by ';', one frame each.
    #[arg(long)]
    pub prompts: Option<String>,

    /// Seconds per frame.
    #[arg(long, default_value_t = DEFAULT_SECONDS)]
    pub seconds: f64,

    #[arg(long, default_value_t = DEFAULT_FPS)]
    pub fps: u32,

    /// Output file name, placed in the configured output directory.
    #[arg(long, default_value = DEFAULT_OUT_NAME)]
    pub out: String,

    #[arg(long, default_value = DEFAULT_ASPECT)]
    pub aspect: String,

    /// Per-frame durations, e.g. "1.5,2,2.5".
    #[arg(long, default_value = "")]
    pub durations: String,
}

impl RenderArgs {
    pub fn to_request(&self) -> RenderRequest {
        let mut request = match (&self.prompts, &self.prompt) {
            (Some(block), _) => RenderRequest::multiple(block.clone()),
            (None, prompt) => RenderRequest::single(prompt.clone().unwrap_or_default(), self.num),
        };
        request.seconds = self.seconds;
        request.fps = self.fps;
        request.out_name = self.out.clone();
        request.aspect = self.aspect.clone();
        request.durations = self.durations.clone();
        request
    }
}

#[derive(Debug, Clone, Subcommand)]
pub enum CredentialAction {
    /// Print the stored key, masked.
    Show,
    /// Store a key. An empty value deletes it.
    Set { value: String },
    Delete,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
