//! Prompt templates with `{name}` placeholders.
//!
//! Templates are parsed once into literal and placeholder segments, so
//! substituted values are inserted verbatim and never re-scanned. `{{` and
//! `}}` produce literal braces.
use crate::{Result, TweetRequest, TweetgenError};

/// Template used by the tweet generator unless configured otherwise.
pub const DEFAULT_TWEET_TEMPLATE: &str = "Give me {number} tweets on {topic} in {language}";

/// Variables available to tweet templates.
pub const TWEET_VARIABLES: [&str; 3] = ["number", "topic", "language"];

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Var(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    source: String,
    input_variables: Vec<String>,
    segments: Vec<Segment>,
}

impl PromptTemplate {
    /// Parse `template`, accepting only placeholders listed in `input_variables`.
    ///
    /// ```
    /// use tweetgen_common::template::PromptTemplate;
    ///
    /// let t = PromptTemplate::new("Hi {name}!", &["name"]).unwrap();
    /// assert_eq!(t.format(&[("name", "Ada")]).unwrap(), "Hi Ada!");
    /// assert!(PromptTemplate::new("Hi {other}!", &["name"]).is_err());
    /// ```
    pub fn new(template: &str, input_variables: &[&str]) -> Result<Self> {
        let segments = parse(template)?;
        for seg in &segments {
            if let Segment::Var(name) = seg {
                if !input_variables.contains(&name.as_str()) {
                    return Err(TweetgenError::Config(format!(
                        "template uses undeclared variable {{{name}}}; declared: {}",
                        input_variables.join(", ")
                    )));
                }
            }
        }
        Ok(Self {
            source: template.to_string(),
            input_variables: input_variables.iter().map(|v| v.to_string()).collect(),
            segments,
        })
    }

    /// The built-in tweet template.
    pub fn tweets() -> Self {
        Self {
            source: DEFAULT_TWEET_TEMPLATE.to_string(),
            input_variables: TWEET_VARIABLES.iter().map(|v| v.to_string()).collect(),
            segments: vec![
                Segment::Literal("Give me ".into()),
                Segment::Var("number".into()),
                Segment::Literal(" tweets on ".into()),
                Segment::Var("topic".into()),
                Segment::Literal(" in ".into()),
                Segment::Var("language".into()),
            ],
        }
    }

    /// A custom tweet template. It may use any of `{number}`, `{topic}` and
    /// `{language}` but must mention the topic.
    pub fn for_tweets(template: &str) -> Result<Self> {
        let parsed = Self::new(template, &TWEET_VARIABLES)?;
        if !parsed.uses("topic") {
            return Err(TweetgenError::Config(
                "tweet template must contain {topic}".into(),
            ));
        }
        Ok(parsed)
    }

    pub fn template(&self) -> &str {
        &self.source
    }

    pub fn input_variables(&self) -> &[String] {
        &self.input_variables
    }

    /// Whether `{name}` occurs in the template.
    pub fn uses(&self, name: &str) -> bool {
        self.segments
            .iter()
            .any(|s| matches!(s, Segment::Var(v) if v == name))
    }

    /// Substitute every placeholder from `values`. Unused values are ignored.
    pub fn format(&self, values: &[(&str, &str)]) -> Result<String> {
        let mut out = String::with_capacity(self.source.len());
        for seg in &self.segments {
            match seg {
                Segment::Literal(text) => out.push_str(text),
                Segment::Var(name) => {
                    let value = values
                        .iter()
                        .find(|(k, _)| *k == name.as_str())
                        .map(|(_, v)| *v)
                        .ok_or_else(|| {
                            TweetgenError::Validation(format!("missing value for {{{name}}}"))
                        })?;
                    out.push_str(value);
                }
            }
        }
        Ok(out)
    }

    /// Fill the template from a form submission.
    pub fn render(&self, request: &TweetRequest) -> Result<String> {
        let number = request.number.to_string();
        self.format(&[
            ("number", number.as_str()),
            ("topic", request.topic.as_str()),
            ("language", request.language.as_str()),
        ])
    }
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self::tweets()
    }
}

fn parse(template: &str) -> Result<Vec<Segment>> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut chars = template.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                literal.push('{');
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                literal.push('}');
            }
            '{' => {
                let mut name = String::new();
                let mut closed = false;
                for c in chars.by_ref() {
                    if c == '}' {
                        closed = true;
                        break;
                    }
                    name.push(c);
                }
                if !closed {
                    return Err(TweetgenError::Config(format!(
                        "unterminated placeholder in template: {template:?}"
                    )));
                }
                let name = name.trim().to_string();
                if !is_identifier(&name) {
                    return Err(TweetgenError::Config(format!(
                        "invalid placeholder {{{name}}} in template"
                    )));
                }
                if !literal.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut literal)));
                }
                segments.push(Segment::Var(name));
            }
            '}' => {
                return Err(TweetgenError::Config(format!(
                    "unmatched '}}' in template: {template:?}"
                )));
            }
            other => literal.push(other),
        }
    }
    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }
    Ok(segments)
}

/// ASCII identifier: a letter or `_`, then letters, digits or `_`.
fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Language, Topic, TweetCount};

    fn request(topic: &str, n: u32, language: Language) -> TweetRequest {
        TweetRequest::new(Topic::new(topic).unwrap(), TweetCount::new(n).unwrap(), language)
    }

    #[test]
    fn builtin_template_matches_parsed_default() {
        let parsed = PromptTemplate::new(DEFAULT_TWEET_TEMPLATE, &TWEET_VARIABLES).unwrap();
        assert_eq!(parsed, PromptTemplate::tweets());
    }

    #[test]
    fn render_equals_literal_concatenation_for_every_count_and_language() {
        let template = PromptTemplate::tweets();
        for n in 1..=10 {
            for lang in Language::ALL {
                let r = request("climate change", n, lang);
                let expected = format!("Give me {n} tweets on climate change in {}", lang.as_str());
                assert_eq!(template.render(&r).unwrap(), expected);
            }
        }
    }

    #[test]
    fn placeholder_text_in_topic_is_not_substituted() {
        let r = request("{language} and {number}", 2, Language::German);
        let out = PromptTemplate::tweets().render(&r).unwrap();
        assert_eq!(out, "Give me 2 tweets on {language} and {number} in German");
    }

    #[test]
    fn topic_is_inserted_verbatim() {
        let r = request("  spaced\ttopic ", 1, Language::English);
        let out = PromptTemplate::tweets().render(&r).unwrap();
        assert_eq!(out, "Give me 1 tweets on   spaced\ttopic  in English");
    }

    #[test]
    fn escaped_braces_are_literal() {
        let t = PromptTemplate::new("{{json}} about {topic}", &["topic"]).unwrap();
        assert_eq!(t.format(&[("topic", "x")]).unwrap(), "{json} about x");
    }

    #[test]
    fn malformed_templates_are_rejected() {
        assert!(PromptTemplate::new("Give me {number", &["number"]).is_err());
        assert!(PromptTemplate::new("oops } here", &[]).is_err());
        assert!(PromptTemplate::new("empty {}", &[]).is_err());
        assert!(PromptTemplate::new("bad {a-b}", &["a-b"]).is_err());
        assert!(PromptTemplate::new("digit {1x}", &["1x"]).is_err());
        assert!(PromptTemplate::new("accent {tópico}", &["tópico"]).is_err());
        assert!(PromptTemplate::new("ok {_x1}", &["_x1"]).is_ok());
    }

    #[test]
    fn custom_tweet_template_requires_topic() {
        assert!(PromptTemplate::for_tweets("Write {number} tweets").is_err());
        assert!(PromptTemplate::for_tweets("Write {number} posts about {topic} in {tone}").is_err());
        let t = PromptTemplate::for_tweets("Write {number} short posts about {topic}").unwrap();
        let out = t.render(&request("tea", 3, Language::Hindi)).unwrap();
        assert_eq!(out, "Write 3 short posts about tea");
    }

    #[test]
    fn missing_value_is_an_error() {
        let t = PromptTemplate::new("{a} {b}", &["a", "b"]).unwrap();
        assert!(t.format(&[("a", "1")]).is_err());
    }
}
