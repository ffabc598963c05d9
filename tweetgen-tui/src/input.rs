use unicode_width::UnicodeWidthStr;

/// Single-line text field with a byte-offset cursor kept on char boundaries.
#[derive(Debug, Clone, Default)]
pub struct TextInput {
    text: String,
    cursor: usize,
}

impl TextInput {
    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// Display column of the caret, accounting for wide characters.
    pub fn caret_col(&self) -> u16 {
        UnicodeWidthStr::width(&self.text[..self.cursor]) as u16
    }

    pub fn left(&mut self) {
        if self.cursor == 0 {
            return;
        }
        self.cursor -= 1;
        while self.cursor > 0 && !self.text.is_char_boundary(self.cursor) {
            self.cursor -= 1;
        }
    }

    pub fn right(&mut self) {
        if self.cursor >= self.text.len() {
            return;
        }
        self.cursor += 1;
        while self.cursor < self.text.len() && !self.text.is_char_boundary(self.cursor) {
            self.cursor += 1;
        }
    }

    pub fn home(&mut self) {
        self.cursor = 0;
    }

    pub fn end(&mut self) {
        self.cursor = self.text.len();
    }

    pub fn insert(&mut self, ch: char) {
        self.text.insert(self.cursor, ch);
        self.cursor += ch.len_utf8();
    }

    pub fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        let end = self.cursor;
        self.left();
        self.text.drain(self.cursor..end);
    }

    pub fn delete(&mut self) {
        if self.cursor >= self.text.len() {
            return;
        }
        let start = self.cursor;
        self.right();
        self.text.drain(start..self.cursor);
        self.cursor = start;
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn typed(s: &str) -> TextInput {
        let mut input = TextInput::default();
        s.chars().for_each(|c| input.insert(c));
        input
    }

    #[test]
    fn edits_in_the_middle() {
        let mut input = typed("rst");
        input.home();
        input.right();
        input.insert('u');
        assert_eq!(input.as_str(), "rust");
        input.end();
        input.backspace();
        assert_eq!(input.as_str(), "rus");
        input.home();
        input.delete();
        assert_eq!(input.as_str(), "us");
        assert_eq!(input.cursor(), 0);
    }

    #[test]
    fn cursor_respects_multibyte_chars() {
        let mut input = typed("café");
        input.left();
        assert_eq!(input.cursor(), 3);
        input.backspace();
        assert_eq!(input.as_str(), "caé");
        input.end();
        input.backspace();
        assert_eq!(input.as_str(), "ca");
    }

    #[test]
    fn caret_col_counts_wide_chars() {
        let input = typed("日本");
        assert_eq!(input.caret_col(), 4);
    }

    #[test]
    fn backspace_at_start_and_delete_at_end_are_noops() {
        let mut input = typed("x");
        input.delete();
        assert_eq!(input.as_str(), "x");
        input.home();
        input.backspace();
        assert_eq!(input.as_str(), "x");
        assert!(!input.is_blank());
        input.clear();
        assert!(input.is_blank());
    }
}
