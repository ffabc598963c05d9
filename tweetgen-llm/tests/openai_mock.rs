mod common;

use serde_json::json;
use tweetgen_common::template::PromptTemplate;
use tweetgen_common::{Language, LlmConfig, Provider, Topic, TweetCount, TweetRequest, TweetgenError};
use tweetgen_llm::openai::OpenAiClient;
use tweetgen_llm::traits::LlmClient;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> OpenAiClient {
    let cfg = LlmConfig {
        endpoint: format!("{}/v1", server.uri()),
        ..LlmConfig::for_provider(Provider::OpenAi, "sk-test")
    };
    OpenAiClient::from_config(&cfg).expect("client")
}

fn response_body(text: &str) -> serde_json::Value {
    json!({
        "id": "resp_123",
        "object": "response",
        "created_at": 1_700_000_000,
        "status": "completed",
        "model": "gpt-4o-mini-2024-07-18",
        "output": [{
            "id": "msg_1",
            "type": "message",
            "status": "completed",
            "role": "assistant",
            "content": [{"type": "output_text", "text": text, "annotations": []}]
        }],
        "usage": {"input_tokens": 10, "output_tokens": 30, "total_tokens": 40}
    })
}

#[tokio::test]
async fn sends_prompt_as_input_without_instructions() {
    common::init_test_tracing();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/responses"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_json(json!({
            "model": "gpt-4o-mini",
            "input": "Give me 3 tweets on coffee in French"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(response_body("1. Café !")))
        .expect(1)
        .mount(&server)
        .await;

    let request = TweetRequest::new(
        Topic::new("coffee").unwrap(),
        TweetCount::new(3).unwrap(),
        Language::French,
    );
    let resp = client_for(&server)
        .generate_tweets(&PromptTemplate::tweets(), &request)
        .await
        .unwrap();

    assert_eq!(resp.text, "1. Café !");
    assert_eq!(resp.tokens_used, Some(40));
    assert_eq!(resp.model.as_deref(), Some("gpt-4o-mini-2024-07-18"));
}

#[tokio::test]
async fn system_prompt_becomes_instructions() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/responses"))
        .and(body_json(json!({
            "model": "gpt-4o-mini",
            "input": "hi",
            "instructions": "be brief",
            "max_output_tokens": 16
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(response_body("hey")))
        .expect(1)
        .mount(&server)
        .await;

    let resp = client_for(&server)
        .generate("hi", Some("be brief"), Some(16), None)
        .await
        .unwrap();
    assert_eq!(resp.text, "hey");
}

#[tokio::test]
async fn missing_output_text_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/responses"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "resp_9",
            "status": "incomplete",
            "model": "gpt-4o-mini",
            "output": [{"id": "rs_1", "type": "reasoning", "content": []}]
        })))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .generate("hi", None, None, None)
        .await
        .unwrap_err();
    assert!(matches!(err, TweetgenError::Provider(ref m) if m.contains("resp_9") && m.contains("incomplete")));
}

#[tokio::test]
async fn rate_limit_maps_to_readable_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/responses"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "error": {"message": "Rate limit reached", "type": "requests"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let err = client_for(&server)
        .generate("hi", None, None, None)
        .await
        .unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("OpenAI rate limit exceeded"), "{msg}");
    assert!(msg.contains("Rate limit reached"), "{msg}");
}
