use crate::styles;
use ratatui::style::Style;
use textwrap::wrap;
use tweetgen_common::Generation;

#[derive(Clone)]
pub struct OutputLine {
    pub text: String,
    pub style: Style,
}

impl OutputLine {
    pub fn new(text: String, style: Style) -> Self {
        Self { text, style }
    }
}

/// Contents of the output block. Each submission replaces the previous one.
#[derive(Clone, Default)]
pub struct OutputLog {
    lines: Vec<OutputLine>,
    /// Lines scrolled up from the bottom.
    scroll: usize,
}

impl OutputLog {
    pub fn placeholder() -> Self {
        let mut log = Self::default();
        log.push(
            "Fill in the form and press Generate. Tab moves between fields.",
            styles::dim(),
        );
        log
    }

    pub fn lines(&self) -> &[OutputLine] {
        &self.lines
    }

    pub fn scroll(&self) -> usize {
        self.scroll
    }

    pub fn scroll_by(&mut self, delta: i32) {
        self.scroll = if delta >= 0 {
            self.scroll.saturating_add(delta as usize)
        } else {
            self.scroll.saturating_sub(delta.unsigned_abs() as usize)
        };
    }

    pub fn clear(&mut self) {
        self.lines.clear();
        self.scroll = 0;
    }

    pub fn push<S: Into<String>>(&mut self, s: S, style: Style) {
        self.lines.push(OutputLine::new(s.into(), style));
    }

    pub fn push_blank(&mut self) {
        self.push(String::new(), Style::default());
    }

    pub fn push_generation(&mut self, generation: &Generation, at: &str) {
        self.push(
            format!(
                "← [{} · {}] {at}",
                generation.provider.label(),
                generation.model
            ),
            styles::llm_header(),
        );
        for line in generation.text.lines() {
            self.push(format!("  {line}"), styles::llm_text());
        }
        if let Some(tokens) = generation.tokens_used {
            self.push(format!("  ({tokens} tokens)"), styles::dim());
        }
        self.push_blank();
    }

    pub fn push_error(&mut self, message: &str) {
        self.push(format!("× Error: {message}"), styles::error());
        self.push_blank();
    }

    /// Lines wrapped to `width`, each paired with its style. Embedded
    /// newlines start new rows.
    pub fn wrapped(&self, width: usize) -> Vec<(String, Style)> {
        let effective_width = width.max(1);
        let mut out = Vec::new();

        for entry in &self.lines {
            let style = entry.style;
            for raw_line in entry.text.split('\n') {
                if raw_line.is_empty() {
                    out.push((String::new(), style));
                    continue;
                }
                out.extend(
                    wrap(raw_line, effective_width)
                        .into_iter()
                        .map(|seg| (seg.into_owned(), style)),
                );
            }
        }

        out
    }

    /// Visible window `[start, end)` into `total` wrapped rows, clamping the
    /// scroll offset so it never runs past the top.
    pub fn window(&mut self, total: usize, height: usize) -> (usize, usize) {
        self.scroll = self.scroll.min(total.saturating_sub(height));
        let end = total - self.scroll;
        (end.saturating_sub(height), end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tweetgen_common::Provider;

    #[test]
    fn generation_is_indented_under_a_header() {
        let mut log = OutputLog::default();
        log.push_generation(
            &Generation {
                text: "1. first\n2. second".into(),
                provider: Provider::OpenAi,
                model: "gpt-4o-mini".into(),
                prompt: "Give me 2 tweets on x in English".into(),
                tokens_used: Some(12),
            },
            "10:00:00",
        );
        let texts: Vec<&str> = log.lines().iter().map(|l| l.text.as_str()).collect();
        assert_eq!(
            texts,
            vec![
                "← [OpenAI · gpt-4o-mini] 10:00:00",
                "  1. first",
                "  2. second",
                "  (12 tokens)",
                ""
            ]
        );
    }

    #[test]
    fn wraps_long_lines() {
        let mut log = OutputLog::default();
        log.push("aaaa bbbb cccc", Style::default());
        let rows: Vec<String> = log.wrapped(9).into_iter().map(|(t, _)| t).collect();
        assert_eq!(rows, vec!["aaaa bbbb", "cccc"]);
    }

    #[test]
    fn scroll_is_clamped_to_content() {
        let mut log = OutputLog::default();
        log.scroll_by(100);
        assert_eq!(log.window(10, 4), (0, 4));
        assert_eq!(log.scroll(), 6);
        log.scroll_by(-5);
        assert_eq!(log.window(10, 4), (5, 9));
        assert_eq!(log.window(2, 4), (0, 2));
        log.scroll_by(-100);
        assert_eq!(log.scroll(), 0);
    }
}
