//! CLI definition using clap derive.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use mcwatch_core::{Channel, DEFAULT_STOP_MARKER, LogPatterns};

#[derive(Parser)]
#[command(name = "mcwatch", about = "Minecraft server log tail and event classifier")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Tail a server log and print classified events until interrupted
    Tail(TailOpts),
    /// Classify log lines read from stdin
    Classify(ClassifyOpts),
    /// Parse a `list` command response read from stdin
    Players(PlayersOpts),
}

/// Pattern overrides shared by `tail` and `classify`.
#[derive(clap::Args, Clone)]
pub struct PatternOpts {
    /// Exact text that marks a server shutdown
    #[arg(long, env = "MCWATCH_STOP_MARKER", default_value = DEFAULT_STOP_MARKER)]
    pub stop_marker: String,

    /// Regex that marks a completed server start
    #[arg(long, env = "MCWATCH_START_PATTERN")]
    pub start_pattern: Option<String>,
}

impl PatternOpts {
    pub fn build(&self) -> anyhow::Result<LogPatterns> {
        let mut patterns = LogPatterns::new()?.with_stop_marker(self.stop_marker.clone())?;
        if let Some(ref pattern) = self.start_pattern {
            patterns = patterns.with_start_pattern(pattern)?;
        }
        Ok(patterns)
    }
}

#[derive(clap::Args)]
pub struct TailOpts {
    /// Server log file (usually logs/latest.log)
    #[arg(long, short = 'p', env = "MCWATCH_LOG_PATH")]
    pub path: PathBuf,

    /// Poll interval in milliseconds
    #[arg(long, env = "MCWATCH_POLL_INTERVAL_MS", default_value = "1000")]
    pub poll_interval_ms: u64,

    /// Only print events from these channels (repeatable; default: all)
    #[arg(long = "channel", short = 'c', value_parser = parse_channel)]
    pub channels: Vec<Channel>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    #[command(flatten)]
    pub patterns: PatternOpts,
}

impl TailOpts {
    /// Selected channels, or every channel when none were given.
    pub fn selected_channels(&self) -> Vec<Channel> {
        if self.channels.is_empty() {
            Channel::ALL.to_vec()
        } else {
            let mut selected = Vec::with_capacity(self.channels.len());
            for channel in &self.channels {
                if !selected.contains(channel) {
                    selected.push(*channel);
                }
            }
            selected
        }
    }
}

#[derive(clap::Args)]
pub struct ClassifyOpts {
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    #[command(flatten)]
    pub patterns: PatternOpts,
}

#[derive(clap::Args)]
pub struct PlayersOpts {
    /// Label appended to the `[count/max]` status line
    #[arg(long)]
    pub status_label: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One JSON object per line
    Json,
    /// Chat-bridge notification text
    Text,
}

fn parse_channel(s: &str) -> Result<Channel, String> {
    s.parse().map_err(|e: mcwatch_core::PatternError| e.to_string())
}
