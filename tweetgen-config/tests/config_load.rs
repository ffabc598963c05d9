use serial_test::serial;
use std::{fs, path::PathBuf};
use tempfile::TempDir;
use tweetgen_common::{Language, Provider};
use tweetgen_config::TweetgenConfigLoader;

/// Helper to write a YAML file in a temp dir and return its path.
fn write_yaml(tmp: &TempDir, name: &str, yaml: &str) -> PathBuf {
    let p = tmp.path().join(name);
    fs::write(&p, yaml).expect("write yaml");
    p
}

const FULL_YAML: &str = r#"
version: "1"
template: "Write {number} tweets about {topic}, in {language}"
defaults:
  provider: openai
  language: french
  number: 3
providers:
  gemini:
    api_key: "${TG_TEST_GEMINI_KEY}"
    model: gemini-1.5-pro
  openai:
    api_key: "${OPENAI_API_KEY}"
    temperature: 0.2
    max_tokens: 512
http:
  timeout_secs: 30
logging:
  format: json
  filter: "tweetgen=debug"
"#;

#[test]
#[serial]
fn loads_file_and_expands_keys() {
    let tmp = TempDir::new().unwrap();
    let p = write_yaml(&tmp, "tweetgen.yaml", FULL_YAML);

    temp_env::with_vars(
        [
            ("TG_TEST_GEMINI_KEY", Some("g-from-env")),
            ("OPENAI_API_KEY", Some("sk-from-env")),
        ],
        || {
            let config = TweetgenConfigLoader::new()
                .with_file(&p)
                .load()
                .expect("load config");

            assert_eq!(config.version.as_deref(), Some("1"));
            assert_eq!(config.defaults.provider, Provider::OpenAi);
            assert_eq!(config.defaults.language, Language::French);
            assert_eq!(config.defaults.number.get(), 3);

            let gemini = config.llm_config(Provider::Gemini).unwrap();
            assert_eq!(gemini.api_key, "g-from-env");
            assert_eq!(gemini.model, "gemini-1.5-pro");
            assert_eq!(gemini.timeout_secs, 30);
            assert_eq!(gemini.retries, 0);

            let openai = config.llm_config(Provider::OpenAi).unwrap();
            assert_eq!(openai.api_key, "sk-from-env");
            assert_eq!(openai.model, "gpt-4o-mini");
            assert_eq!(openai.max_tokens, Some(512));

            let template = config.prompt_template().unwrap();
            assert_eq!(
                template.template(),
                "Write {number} tweets about {topic}, in {language}"
            );
        },
    );
}

#[test]
#[serial]
fn env_overrides_win_over_file() {
    let tmp = TempDir::new().unwrap();
    let p = write_yaml(&tmp, "tweetgen.yaml", FULL_YAML);

    temp_env::with_vars(
        [
            ("TWEETGEN__HTTP__TIMEOUT_SECS", Some("5")),
            ("TWEETGEN__HTTP__RETRIES", Some("2")),
            ("TWEETGEN__DEFAULTS__PROVIDER", Some("gemini")),
            ("TWEETGEN__PROVIDERS__OPENAI__API_KEY", Some("sk-override")),
        ],
        || {
            let config = TweetgenConfigLoader::new().with_file(&p).load().unwrap();
            assert_eq!(config.http.timeout_secs, 5);
            assert_eq!(config.http.retries, 2);
            assert_eq!(config.defaults.provider, Provider::Gemini);
            assert_eq!(
                config.llm_config(Provider::OpenAi).unwrap().api_key,
                "sk-override"
            );
        },
    );
}

#[test]
#[serial]
fn unresolved_key_falls_back_then_fails() {
    let yaml = r#"
providers:
  gemini:
    api_key: "${TG_TEST_UNSET_KEY}"
"#;
    temp_env::with_vars(
        [
            ("TG_TEST_UNSET_KEY", None::<&str>),
            ("GOOGLE_API_KEY", Some("g-fallback")),
        ],
        || {
            let config = TweetgenConfigLoader::new().with_yaml_str(yaml).load().unwrap();
            assert_eq!(
                config.llm_config(Provider::Gemini).unwrap().api_key,
                "g-fallback"
            );
        },
    );
    temp_env::with_vars(
        [
            ("TG_TEST_UNSET_KEY", None::<&str>),
            ("GOOGLE_API_KEY", None),
        ],
        || {
            let config = TweetgenConfigLoader::new().with_yaml_str(yaml).load().unwrap();
            let err = config.llm_config(Provider::Gemini).unwrap_err();
            assert!(err.to_string().contains("GOOGLE_API_KEY is not set"));
        },
    );
}

#[test]
#[serial]
fn missing_optional_file_yields_defaults() {
    let tmp = TempDir::new().unwrap();
    let config = TweetgenConfigLoader::new()
        .with_optional_file(tmp.path().join("absent.yaml"))
        .load()
        .unwrap();
    assert_eq!(config.defaults.provider, Provider::Gemini);
    assert_eq!(config.defaults.language, Language::English);
    assert_eq!(config.defaults.number.get(), 1);
    assert_eq!(config.http.timeout_secs, 60);
}

#[test]
#[serial]
fn missing_required_file_is_an_error() {
    let tmp = TempDir::new().unwrap();
    assert!(TweetgenConfigLoader::new()
        .with_file(tmp.path().join("absent.yaml"))
        .load()
        .is_err());
}

#[test]
#[serial]
fn invalid_values_are_rejected() {
    for yaml in [
        "defaults:\n  number: 11\n",
        "defaults:\n  language: Klingon\n",
        "http:\n  timeout_secs: 0\n",
        "template: \"Give me {number} tweets\"\n",
        "template: \"{topic} {unknown}\"\n",
    ] {
        assert!(
            TweetgenConfigLoader::new().with_yaml_str(yaml).load().is_err(),
            "{yaml}"
        );
    }
}
