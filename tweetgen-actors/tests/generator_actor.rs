use anyhow::Result;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tweetgen_actors::actor::{spawn_actor, ActorHandle};
use tweetgen_actors::generator::GeneratorActor;
use tweetgen_actors::GenerateCmd;
use tweetgen_common::template::PromptTemplate;
use tweetgen_common::{Language, Provider, Topic, TweetCount, TweetRequest, TweetgenError};
use tweetgen_llm::traits::{LlmClient, LlmResponse};
use tweetgen_llm::TweetGenerator;

/// Answers after a short delay and tracks how many calls overlap.
struct SlowEcho {
    active: AtomicUsize,
    max_active: AtomicUsize,
}

#[async_trait]
impl LlmClient for SlowEcho {
    async fn generate(
        &self,
        prompt: &str,
        _system_prompt: Option<&str>,
        _max_tokens: Option<u32>,
        _temperature: Option<f32>,
    ) -> tweetgen_common::Result<LlmResponse> {
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(20)).await;
        self.active.fetch_sub(1, Ordering::SeqCst);
        if prompt.contains("fail") {
            return Err(TweetgenError::Provider("Google Gemini API error (500): boom".into()));
        }
        Ok(LlmResponse {
            text: format!("echo: {prompt}"),
            model: Some("echo-1".into()),
            tokens_used: None,
        })
    }

    async fn health_check(&self) -> tweetgen_common::Result<bool> {
        Ok(true)
    }

    fn model_name(&self) -> &str {
        "echo-1"
    }

    fn provider(&self) -> Provider {
        Provider::Gemini
    }
}

fn request(topic: &str) -> TweetRequest {
    TweetRequest::new(
        Topic::new(topic).unwrap(),
        TweetCount::new(2).unwrap(),
        Language::Arabic,
    )
}

fn spawn_generator(client: Arc<SlowEcho>) -> ActorHandle<GeneratorActor> {
    let generator = TweetGenerator::new(PromptTemplate::tweets())
        .with_client(client)
        .with_unavailable(Provider::OpenAi, "OPENAI_API_KEY is not set");
    spawn_actor(GeneratorActor::new(generator), 8)
}

fn echo() -> Arc<SlowEcho> {
    Arc::new(SlowEcho {
        active: AtomicUsize::new(0),
        max_active: AtomicUsize::new(0),
    })
}

#[tokio::test]
async fn replies_with_generation() -> Result<()> {
    let ActorHandle { addr, task } = spawn_generator(echo());
    let (cmd, rx) = GenerateCmd::new(request("rain"), Provider::Gemini);
    addr.send(cmd).await.ok();

    let generation = rx.await?.expect("generation");
    assert_eq!(generation.text, "echo: Give me 2 tweets on rain in Arabic");
    assert_eq!(generation.model, "echo-1");

    drop(addr);
    task.await??;
    Ok(())
}

#[tokio::test]
async fn errors_are_replied_and_actor_keeps_running() -> Result<()> {
    let ActorHandle { addr, task } = spawn_generator(echo());

    let (cmd, rx) = GenerateCmd::new(request("fail"), Provider::Gemini);
    addr.send(cmd).await.ok();
    let err = rx.await?.unwrap_err();
    assert!(err.contains("boom"), "{err}");

    let (cmd, rx) = GenerateCmd::new(request("rain"), Provider::OpenAi);
    addr.send(cmd).await.ok();
    assert_eq!(
        rx.await?.unwrap_err(),
        "Configuration error: OPENAI_API_KEY is not set"
    );

    let (cmd, rx) = GenerateCmd::new(request("sun"), Provider::Gemini);
    addr.send(cmd).await.ok();
    assert!(rx.await?.is_ok());

    drop(addr);
    task.await??;
    Ok(())
}

#[tokio::test]
async fn commands_run_one_at_a_time() -> Result<()> {
    let client = echo();
    let ActorHandle { addr, task } = spawn_generator(client.clone());

    let mut replies = Vec::new();
    for topic in ["a", "b", "c"] {
        let (cmd, rx) = GenerateCmd::new(request(topic), Provider::Gemini);
        addr.send(cmd).await.ok();
        replies.push(rx);
    }
    for rx in replies {
        assert!(rx.await?.is_ok());
    }
    assert_eq!(client.max_active.load(Ordering::SeqCst), 1);

    drop(addr);
    task.await??;
    Ok(())
}
