use anyhow::{Result, bail};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tweetgen_common::{Language, Provider, Topic, TweetCount, TweetRequest};
use tweetgen_config::{CONFIG_PATH_ENV, TweetgenConfig};

use crate::tether::build_generator;

#[derive(Debug, Parser)]
#[command(name = "tweetgen", version, about = "Generate tweets using Generative AI")]
pub struct Cli {
    /// Path to a YAML config file.
    #[arg(long, short, env = CONFIG_PATH_ENV, global = true)]
    pub config: Option<PathBuf>,

    /// Mirror logs to stderr (ignored by the TUI).
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Open the interactive form (default).
    Tui,
    /// Generate once and print the result.
    Generate {
        #[command(flatten)]
        form: FormArgs,
        #[arg(long, short)]
        provider: Option<Provider>,
        /// Print the full result as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Verify that configured providers answer.
    Check {
        #[arg(long, short)]
        provider: Option<Provider>,
    },
    /// List the supported output languages.
    Languages,
    /// Print the rendered prompt without calling a provider.
    Prompt {
        #[command(flatten)]
        form: FormArgs,
    },
}

#[derive(Debug, Clone, Args)]
pub struct FormArgs {
    #[arg(long, short)]
    pub topic: String,
    /// How many tweets, 1 to 10.
    #[arg(long, short)]
    pub number: Option<TweetCount>,
    #[arg(long, short)]
    pub language: Option<Language>,
}

impl FormArgs {
    /// Fill unset fields from the configured defaults.
    fn request(&self, cfg: &TweetgenConfig) -> Result<TweetRequest> {
        Ok(TweetRequest::new(
            Topic::new(self.topic.as_str())?,
            self.number.unwrap_or(cfg.defaults.number),
            self.language.unwrap_or(cfg.defaults.language),
        ))
    }
}

pub async fn run(command: Command, cfg: &TweetgenConfig) -> Result<()> {
    match command {
        Command::Tui => bail!("the TUI is started from main"),
        Command::Languages => {
            for language in Language::ALL {
                println!("{language}");
            }
            Ok(())
        }
        Command::Prompt { form } => {
            let request = form.request(cfg)?;
            println!("{}", cfg.prompt_template()?.render(&request)?);
            Ok(())
        }
        Command::Generate {
            form,
            provider,
            json,
        } => {
            let request = form.request(cfg)?;
            let provider = provider.unwrap_or(cfg.defaults.provider);
            let generation = build_generator(cfg)?.generate(provider, &request).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&generation)?);
            } else {
                println!("{}", generation.text.trim_end());
            }
            Ok(())
        }
        Command::Check { provider } => {
            let generator = build_generator(cfg)?;
            let providers = match provider {
                Some(p) => vec![p],
                None => Provider::ALL.to_vec(),
            };
            let mut failed = 0;
            for provider in providers {
                let client = match generator.client(provider) {
                    Ok(client) => client,
                    Err(_) => {
                        failed += 1;
                        let reason = generator.unavailable_reason(provider).unwrap_or_default();
                        println!("✗ {}: {reason}", provider.label());
                        continue;
                    }
                };
                if client.health_check().await? {
                    println!("✓ {} ({})", provider.label(), client.model_name());
                } else {
                    failed += 1;
                    println!(
                        "✗ {} ({}): health check failed, see the log for details",
                        provider.label(),
                        client.model_name()
                    );
                }
            }
            if failed > 0 {
                bail!("{failed} provider(s) unavailable");
            }
            Ok(())
        }
    }
}
