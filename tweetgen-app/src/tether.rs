use anyhow::{Context, Result};
use std::collections::HashMap;
use tweetgen_actors::{builder::Builder, generator::GeneratorActor};
use tweetgen_common::{Provider, TweetgenError};
use tweetgen_config::TweetgenConfig;
use tweetgen_llm::{TweetGenerator, ensure_llm_ready};
use tweetgen_tui::{FormDefaults, TuiActor, TuiSettings, spawn_tui_feeders};

const GENERATOR_MAILBOX: usize = 4;
const TUI_MAILBOX: usize = 256;

pub struct Tether {
    builder: Builder,
}

impl Tether {
    pub fn new() -> Self {
        Self {
            builder: Builder::new(),
        }
    }

    pub fn builder_mut(&mut self) -> &mut Builder {
        &mut self.builder
    }

    pub async fn run(self) -> Result<()> {
        self.builder.run_until_ctrl_c().await
    }
}

/// One slot per provider: a ready client, or why it cannot be used.
pub fn build_generator(cfg: &TweetgenConfig) -> Result<TweetGenerator> {
    let mut generator = TweetGenerator::new(cfg.prompt_template()?);
    for provider in Provider::ALL {
        generator = match cfg.llm_config(provider).and_then(|c| ensure_llm_ready(&c)) {
            Ok(client) => {
                tracing::info!(%provider, model = client.model_name(), "provider ready");
                generator.with_client(client)
            }
            Err(e) => {
                tracing::warn!(%provider, error = %e, "provider unavailable");
                let reason = match e {
                    TweetgenError::Config(msg) => msg,
                    other => other.to_string(),
                };
                generator.with_unavailable(provider, reason)
            }
        };
    }
    Ok(generator)
}

pub fn build_tui(t: &mut Tether, cfg: &TweetgenConfig) -> Result<()> {
    let b = t.builder_mut();
    let shutdown = b.shutdown_handle();
    let generator = build_generator(cfg)?;

    let settings = TuiSettings {
        defaults: FormDefaults {
            provider: cfg.defaults.provider,
            language: cfg.defaults.language,
            number: cfg.defaults.number,
        },
        unavailable: Provider::ALL
            .into_iter()
            .filter_map(|p| generator.unavailable_reason(p).map(|r| (p, r)))
            .collect::<HashMap<_, _>>(),
    };

    // -------- PHASE 1: RESERVE --------
    let r_generator = b.reserve::<GeneratorActor>("generator:main", GENERATOR_MAILBOX);
    let r_tui = b.reserve::<TuiActor>("tui:main", TUI_MAILBOX);

    // -------- PHASE 2: START WORKERS --------
    b.start_reserved(r_generator, GeneratorActor::new(generator));
    let generator_addr = b
        .addr::<GeneratorActor>("generator:main")
        .context("generator address missing")?;

    // -------- PHASE 3: START TUI LAST --------
    let tui = TuiActor::new(generator_addr, settings, shutdown.clone())?;
    let tui_addr = r_tui.addr();
    b.start_reserved(r_tui, tui);
    spawn_tui_feeders(tui_addr, shutdown)?;

    Ok(())
}
