//! mcwatch: Minecraft server log tail.
//! Follows the server log and prints chat, login/logout and start/stop events.

use clap::Parser;

mod cli;
mod cmd_classify;
mod cmd_players;
mod cmd_tail;
mod output;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = cli::Cli::parse();

    let filter = std::env::var("MCWATCH_LOG")
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or_else(|_| "info".to_string());
    // Logs go to stderr; stdout carries events.
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();

    match args.command {
        cli::Command::Tail(opts) => {
            tracing::info!(path = %opts.path.display(), "mcwatch tail starting");
            cmd_tail::cmd_tail(opts).await?;
        }
        cli::Command::Classify(opts) => cmd_classify::cmd_classify(&opts)?,
        cli::Command::Players(opts) => cmd_players::cmd_players(&opts)?,
    }

    Ok(())
}
