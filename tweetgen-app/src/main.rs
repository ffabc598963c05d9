use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Command};
use tether::{Tether, build_tui};
use tweetgen_common::observability::init_logging;
use tweetgen_config::{TweetgenConfig, TweetgenConfigLoader, discover_config_path};

mod cli;
mod tether;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let command = cli.command.clone().unwrap_or(Command::Tui);

    // 1) Load config (env wins over the file)
    let cfg = load_config(&cli)?;

    // 2) Logging: the TUI owns the terminal, so stderr only for verbose CLI runs
    let emit_stderr = cli.verbose && !matches!(command, Command::Tui);
    let log_path = init_logging(cfg.log_config(emit_stderr))?;
    tracing::debug!(log = %log_path.display(), ?command, "tweetgen.start");

    match command {
        Command::Tui => {
            let mut tether = Tether::new();
            build_tui(&mut tether, &cfg)?;
            tether.run().await
        }
        other => cli::run(other, &cfg).await,
    }
}

fn load_config(cli: &Cli) -> Result<TweetgenConfig> {
    let loader = TweetgenConfigLoader::new();
    let loader = match (&cli.config, discover_config_path(cli.config.as_deref())) {
        (Some(_), Some(path)) => loader.with_file(path),
        (None, Some(path)) => loader.with_optional_file(path),
        (_, None) => loader,
    };
    loader.load().context("loading tweetgen configuration")
}
