use crate::actor::{Actor, Context};
use crate::GenerateCmd;
use anyhow::Result;
use tweetgen_llm::TweetGenerator;
use uuid::Uuid;

/// Owns the [`TweetGenerator`] and runs one generation per command.
///
/// Generation failures are replied to the caller as text; they never stop
/// the actor.
pub struct GeneratorActor {
    generator: TweetGenerator,
}

impl GeneratorActor {
    pub fn new(generator: TweetGenerator) -> Self {
        Self { generator }
    }
}

#[async_trait::async_trait]
impl Actor for GeneratorActor {
    type Msg = GenerateCmd;

    async fn handle(&mut self, msg: Self::Msg, _ctx: &mut Context<Self>) -> Result<()> {
        let GenerateCmd {
            request,
            provider,
            reply,
        } = msg;
        let request_id = Uuid::new_v4();
        tracing::info!(%request_id, %provider, number = request.number.get(), language = %request.language, "generate.start");

        let outcome = self
            .generator
            .generate(provider, &request)
            .await
            .map_err(|e| e.to_string());

        match &outcome {
            Ok(generation) => tracing::info!(
                %request_id,
                model = %generation.model,
                tokens = ?generation.tokens_used,
                chars = generation.text.len(),
                "generate.done"
            ),
            Err(e) => tracing::warn!(%request_id, error = %e, "generate.failed"),
        }

        if reply.send(outcome).is_err() {
            tracing::debug!(%request_id, "generate reply dropped");
        }
        Ok(())
    }
}
