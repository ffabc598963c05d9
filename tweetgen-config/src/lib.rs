//! Loader for tweetgen configuration with YAML + environment overlays.
//!
//! Sources are merged in this order, later ones winning:
//!
//! 1. a YAML file (`--config`, `TWEETGEN_CONFIG`, `./tweetgen.yaml`, or
//!    `<config_dir>/tweetgen/tweetgen.yaml`),
//! 2. inline YAML snippets added with [`TweetgenConfigLoader::with_yaml_str`],
//! 3. `TWEETGEN__`-prefixed environment variables, `__` separating path
//!    segments (`TWEETGEN__HTTP__TIMEOUT_SECS=30`).
//!
//! Every string value is then expanded for `${VAR}` references. API keys
//! that stay unresolved fall back to the provider's well-known variable
//! (`GOOGLE_API_KEY`, `OPENAI_API_KEY`).
use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tweetgen_common::observability::{LogConfig, LogFormat};
use tweetgen_common::template::PromptTemplate;
use tweetgen_common::{
    Language, LlmConfig, Provider, Result, TweetCount, TweetgenError,
};

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;
const ENV_PREFIX: &str = "TWEETGEN";
const CONFIG_FILE_NAME: &str = "tweetgen.yaml";

/// Environment variable naming the config file.
pub const CONFIG_PATH_ENV: &str = "TWEETGEN_CONFIG";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TweetgenConfig {
    pub version: Option<String>,
    /// Prompt template; must reference `{topic}`.
    pub template: Option<String>,
    pub defaults: FormDefaults,
    pub providers: Providers,
    pub http: HttpSettings,
    pub logging: LoggingSettings,
}

/// Initial values of the form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FormDefaults {
    pub provider: Provider,
    pub language: Language,
    pub number: TweetCount,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Providers {
    pub gemini: ProviderSettings,
    pub openai: ProviderSettings,
}

impl Providers {
    pub fn get(&self, provider: Provider) -> &ProviderSettings {
        match provider {
            Provider::Gemini => &self.gemini,
            Provider::OpenAi => &self.openai,
        }
    }
}

/// Unset fields fall back to the provider's built-in defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub endpoint: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    pub timeout_secs: u64,
    pub retries: usize,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 60,
            retries: 0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub format: LogFormat,
    pub dir: Option<String>,
    pub filter: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            format: LogFormat::Text,
            dir: None,
            filter: "info".to_string(),
        }
    }
}

impl TweetgenConfig {
    /// Resolve everything a provider client needs.
    ///
    /// Fails with [`TweetgenError::Config`] when no usable API key exists
    /// either in the config or in the provider's environment variable.
    pub fn llm_config(&self, provider: Provider) -> Result<LlmConfig> {
        let settings = self.providers.get(provider);
        let api_key = settings
            .api_key
            .as_deref()
            .and_then(usable_key)
            .or_else(|| {
                std::env::var(provider.api_key_env())
                    .ok()
                    .as_deref()
                    .and_then(usable_key)
            })
            .ok_or_else(|| {
                TweetgenError::Config(format!("{} is not set", provider.api_key_env()))
            })?;

        let mut cfg = LlmConfig::for_provider(provider, api_key);
        if let Some(model) = non_empty(settings.model.as_deref()) {
            cfg.model = model;
        }
        if let Some(endpoint) = non_empty(settings.endpoint.as_deref()) {
            cfg.endpoint = endpoint;
        }
        cfg.temperature = settings.temperature;
        cfg.max_tokens = settings.max_tokens;
        cfg.timeout_secs = self.http.timeout_secs;
        cfg.retries = self.http.retries;
        Ok(cfg)
    }

    pub fn prompt_template(&self) -> Result<PromptTemplate> {
        match non_empty(self.template.as_deref()) {
            Some(template) => PromptTemplate::for_tweets(&template),
            None => Ok(PromptTemplate::tweets()),
        }
    }

    pub fn log_config(&self, emit_stderr: bool) -> LogConfig {
        LogConfig {
            log_dir: non_empty(self.logging.dir.as_deref())
                .map(|dir| PathBuf::from(shellexpand::tilde(&dir).into_owned())),
            emit_stderr,
            format: self.logging.format,
            default_filter: self.logging.filter.clone(),
            ..LogConfig::default()
        }
    }

    fn validate(&self) -> Result<()> {
        if self.http.timeout_secs == 0 {
            return Err(TweetgenError::Config(
                "http.timeout_secs must be at least 1".to_string(),
            ));
        }
        self.prompt_template().map(|_| ())
    }
}

/// A key is usable when it is non-blank and not an unresolved `${VAR}`.
fn usable_key(raw: &str) -> Option<String> {
    let key = raw.trim();
    if key.is_empty() || key.contains("${") || key.starts_with('$') {
        None
    } else {
        Some(key.to_string())
    }
}

fn non_empty(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Candidate locations, in lookup order, when no path is given explicitly.
pub fn default_config_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(CONFIG_FILE_NAME)];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("tweetgen").join(CONFIG_FILE_NAME));
    }
    paths
}

/// The explicit path if any, else the first default location that exists.
pub fn discover_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).into_owned()));
    }
    default_config_paths().into_iter().find(|p| p.is_file())
}

fn expand_env_in_value(v: &mut Value) {
    match v {
        Value::String(s) => {
            if s.contains('$') {
                let mut cur = std::mem::take(s);
                for _ in 0..MAXIMUM_ENV_EXPANSION_DEPTH {
                    let expanded = match shellexpand::env(&cur) {
                        Ok(cow) => cow.into_owned(),
                        Err(_) => cur.clone(),
                    };
                    if expanded == cur {
                        break;
                    }
                    cur = expanded;
                }
                *s = cur;
            }
        }
        Value::Array(arr) => arr.iter_mut().for_each(expand_env_in_value),
        Value::Object(obj) => obj.values_mut().for_each(expand_env_in_value),
        _ => {}
    }
}

/// Builder hides the `config` crate wiring (YAML + env overrides).
pub struct TweetgenConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
}

impl Default for TweetgenConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl TweetgenConfigLoader {
    /// Start with no sources; `TWEETGEN__` env overrides are applied last by
    /// [`load`](Self::load).
    ///
    /// ```
    /// use tweetgen_config::TweetgenConfigLoader;
    ///
    /// let config = TweetgenConfigLoader::new()
    ///     .with_yaml_str("version: '1'")
    ///     .load()
    ///     .expect("valid config");
    ///
    /// assert_eq!(config.version.as_deref(), Some("1"));
    /// assert_eq!(config.http.timeout_secs, 60);
    /// assert_eq!(config.http.retries, 0);
    /// ```
    pub fn new() -> Self {
        Self {
            builder: Config::builder(),
        }
    }

    /// Attach a file that must exist; the `config` crate infers format by suffix.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(true));
        self
    }

    /// Attach a file that may be absent, for setups driven purely by env vars.
    pub fn with_optional_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(false));
        self
    }

    /// Merge an inline YAML snippet.
    ///
    /// ```
    /// use tweetgen_common::{Language, Provider};
    /// use tweetgen_config::TweetgenConfigLoader;
    ///
    /// let cfg = TweetgenConfigLoader::new()
    ///     .with_yaml_str(
    ///         r#"
    /// defaults:
    ///   provider: openai
    ///   language: German
    ///   number: 5
    /// "#,
    ///     )
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(cfg.defaults.provider, Provider::OpenAi);
    /// assert_eq!(cfg.defaults.language, Language::German);
    /// assert_eq!(cfg.defaults.number.get(), 5);
    /// ```
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(yaml, FileFormat::Yaml));
        self
    }

    /// Consume the builder and deserialize the merged sources into typed config.
    pub fn load(self) -> std::result::Result<TweetgenConfig, ConfigError> {
        let cfg = self
            .builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut v: Value = cfg.try_deserialize()?;
        expand_env_in_value(&mut v);

        let typed: TweetgenConfig =
            serde_json::from_value(v).map_err(|e| ConfigError::Message(e.to_string()))?;
        typed
            .validate()
            .map_err(|e| ConfigError::Message(e.to_string()))?;
        Ok(typed)
    }
}
