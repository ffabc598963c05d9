//! Request data model: the three form fields and the provider selector.
use crate::{Result, TweetgenError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Free-text subject of the tweets. Must not be blank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Topic(String);

impl Topic {
    /// Accepts any text that is not empty after trimming. The text is kept
    /// verbatim.
    ///
    /// ```
    /// use tweetgen_common::Topic;
    ///
    /// assert_eq!(Topic::new(" rust ").unwrap().as_str(), " rust ");
    /// assert!(Topic::new("   ").is_err());
    /// ```
    pub fn new(text: impl Into<String>) -> Result<Self> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(TweetgenError::Validation("topic must not be empty".into()));
        }
        Ok(Self(text))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Topic {
    type Error = TweetgenError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Topic> for String {
    fn from(value: Topic) -> Self {
        value.0
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Number of tweets to ask for, always within `MIN..=MAX`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct TweetCount(u8);

impl TweetCount {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 10;

    /// ```
    /// use tweetgen_common::TweetCount;
    ///
    /// assert_eq!(TweetCount::new(10).unwrap().get(), 10);
    /// assert!(TweetCount::new(0).is_err());
    /// assert!(TweetCount::new(11).is_err());
    /// ```
    pub fn new(n: u32) -> Result<Self> {
        if (Self::MIN as u32..=Self::MAX as u32).contains(&n) {
            Ok(Self(n as u8))
        } else {
            Err(TweetgenError::Validation(format!(
                "number of tweets must be between {} and {}, got {n}",
                Self::MIN,
                Self::MAX
            )))
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// One step up, saturating at [`TweetCount::MAX`].
    pub fn increment(self) -> Self {
        Self(self.0.saturating_add(1).min(Self::MAX))
    }

    /// One step down, saturating at [`TweetCount::MIN`].
    pub fn decrement(self) -> Self {
        Self(self.0.saturating_sub(1).max(Self::MIN))
    }
}

impl Default for TweetCount {
    fn default() -> Self {
        Self(Self::MIN)
    }
}

impl TryFrom<u32> for TweetCount {
    type Error = TweetgenError;

    fn try_from(value: u32) -> Result<Self> {
        Self::new(value)
    }
}

impl From<TweetCount> for u32 {
    fn from(value: TweetCount) -> Self {
        value.0 as u32
    }
}

impl FromStr for TweetCount {
    type Err = TweetgenError;

    fn from_str(s: &str) -> Result<Self> {
        let n: u32 = s
            .trim()
            .parse()
            .map_err(|_| TweetgenError::Validation(format!("not a whole number: {s:?}")))?;
        Self::new(n)
    }
}

impl fmt::Display for TweetCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Output language offered in the language dropdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Language {
    #[default]
    English,
    Spanish,
    French,
    German,
    Arabic,
    Hindi,
    Marathi,
}

impl Language {
    /// Dropdown order.
    pub const ALL: [Language; 7] = [
        Language::English,
        Language::Spanish,
        Language::French,
        Language::German,
        Language::Arabic,
        Language::Hindi,
        Language::Marathi,
    ];

    /// Text inserted into the prompt and shown in the dropdown.
    pub fn as_str(self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Spanish => "Spanish",
            Language::French => "French",
            Language::German => "German",
            Language::Arabic => "Arabic",
            Language::Hindi => "Hindi",
            Language::Marathi => "marathi",
        }
    }

    pub fn index(self) -> usize {
        Self::ALL.iter().position(|l| *l == self).unwrap_or(0)
    }
}

impl FromStr for Language {
    type Err = TweetgenError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|l| l.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| {
                let known: Vec<&str> = Self::ALL.iter().map(|l| l.as_str()).collect();
                TweetgenError::Validation(format!(
                    "unknown language {wanted:?}; expected one of: {}",
                    known.join(", ")
                ))
            })
    }
}

impl TryFrom<String> for Language {
    type Error = TweetgenError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Language> for String {
    fn from(value: Language) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Hosted model provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Provider {
    #[default]
    Gemini,
    OpenAi,
}

impl Provider {
    pub const ALL: [Provider; 2] = [Provider::Gemini, Provider::OpenAi];

    /// Identifier used in config files and on the command line.
    pub fn id(self) -> &'static str {
        match self {
            Provider::Gemini => "gemini",
            Provider::OpenAi => "openai",
        }
    }

    /// Human-readable name for the UI.
    pub fn label(self) -> &'static str {
        match self {
            Provider::Gemini => "Google Gemini",
            Provider::OpenAi => "OpenAI",
        }
    }

    /// Environment variable consulted when no key is configured.
    pub fn api_key_env(self) -> &'static str {
        match self {
            Provider::Gemini => "GOOGLE_API_KEY",
            Provider::OpenAi => "OPENAI_API_KEY",
        }
    }

    pub fn default_model(self) -> &'static str {
        match self {
            Provider::Gemini => "gemini-1.5-flash-latest",
            Provider::OpenAi => "gpt-4o-mini",
        }
    }

    pub fn default_endpoint(self) -> &'static str {
        match self {
            Provider::Gemini => "https://generativelanguage.googleapis.com/v1beta",
            Provider::OpenAi => "https://api.openai.com/v1",
        }
    }

    pub fn index(self) -> usize {
        Self::ALL.iter().position(|p| *p == self).unwrap_or(0)
    }
}

impl FromStr for Provider {
    type Err = TweetgenError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gemini" | "google" => Ok(Provider::Gemini),
            "openai" | "open-ai" => Ok(Provider::OpenAi),
            other => Err(TweetgenError::Validation(format!(
                "unknown provider {other:?}; expected gemini or openai"
            ))),
        }
    }
}

impl TryFrom<String> for Provider {
    type Error = TweetgenError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Provider> for String {
    fn from(value: Provider) -> Self {
        value.id().to_string()
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// The three fields collected by the form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TweetRequest {
    pub topic: Topic,
    pub number: TweetCount,
    pub language: Language,
}

impl TweetRequest {
    pub fn new(topic: Topic, number: TweetCount, language: Language) -> Self {
        Self {
            topic,
            number,
            language,
        }
    }
}

/// Result of one generation, displayed and then discarded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Generation {
    pub text: String,
    pub provider: Provider,
    pub model: String,
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokens_used: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn count_steps_saturate_at_bounds() {
        let max = TweetCount::new(10).unwrap();
        assert_eq!(max.increment(), max);
        let min = TweetCount::default();
        assert_eq!(min.get(), 1);
        assert_eq!(min.decrement(), min);
        assert_eq!(min.increment().get(), 2);
    }

    #[test]
    fn count_parses_from_text() {
        assert_eq!("7".parse::<TweetCount>().unwrap().get(), 7);
        assert!("seven".parse::<TweetCount>().is_err());
        assert!("0".parse::<TweetCount>().is_err());
    }

    #[test]
    fn count_deserialization_enforces_range() {
        let ok: TweetCount = serde_json::from_str("4").unwrap();
        assert_eq!(ok.get(), 4);
        assert!(serde_json::from_str::<TweetCount>("42").is_err());
    }

    #[test]
    fn language_parsing_is_case_insensitive() {
        assert_eq!("spanish".parse::<Language>().unwrap(), Language::Spanish);
        assert_eq!("MARATHI".parse::<Language>().unwrap(), Language::Marathi);
        assert!("Klingon".parse::<Language>().is_err());
    }

    #[test]
    fn language_display_round_trips() {
        for lang in Language::ALL {
            assert_eq!(lang.to_string().parse::<Language>().unwrap(), lang);
        }
    }

    #[test]
    fn marathi_keeps_its_lowercase_label() {
        assert_eq!(Language::Marathi.as_str(), "marathi");
    }

    #[test]
    fn provider_ids_and_aliases() {
        assert_eq!("Gemini".parse::<Provider>().unwrap(), Provider::Gemini);
        assert_eq!("google".parse::<Provider>().unwrap(), Provider::Gemini);
        assert_eq!("OpenAI".parse::<Provider>().unwrap(), Provider::OpenAi);
        assert!("anthropic".parse::<Provider>().is_err());
        assert_eq!(Provider::OpenAi.api_key_env(), "OPENAI_API_KEY");
    }

    #[test]
    fn topic_rejects_blank_text() {
        assert!(Topic::new("").is_err());
        assert!(Topic::new("\n\t").is_err());
        assert!(serde_json::from_str::<Topic>("\"  \"").is_err());
    }
}
