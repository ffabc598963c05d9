//! Form state machine: focus, field editing and submission, with no terminal I/O.
use crate::input::TextInput;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tweetgen_common::{Language, Provider, Topic, TweetCount, TweetRequest};

/// Lines moved per PageUp/PageDown in the output block.
pub const PAGE_STEP: i32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Topic,
    Number,
    Language,
    Provider,
    Generate,
}

impl Focus {
    const ORDER: [Focus; 5] = [
        Focus::Topic,
        Focus::Number,
        Focus::Language,
        Focus::Provider,
        Focus::Generate,
    ];

    fn position(self) -> usize {
        Self::ORDER.iter().position(|f| *f == self).unwrap_or(0)
    }

    pub fn next(self) -> Self {
        Self::ORDER[(self.position() + 1) % Self::ORDER.len()]
    }

    pub fn prev(self) -> Self {
        Self::ORDER[(self.position() + Self::ORDER.len() - 1) % Self::ORDER.len()]
    }
}

/// Select box over a fixed option list. While open, a highlight moves
/// independently of the committed selection.
#[derive(Debug, Clone)]
pub struct Dropdown<T: 'static> {
    options: &'static [T],
    selected: usize,
    highlight: Option<usize>,
}

impl<T: Copy + PartialEq + 'static> Dropdown<T> {
    pub fn new(options: &'static [T], initial: T) -> Self {
        let selected = options.iter().position(|o| *o == initial).unwrap_or(0);
        Self {
            options,
            selected,
            highlight: None,
        }
    }

    pub fn options(&self) -> &'static [T] {
        self.options
    }

    pub fn selected(&self) -> T {
        self.options[self.selected]
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn is_open(&self) -> bool {
        self.highlight.is_some()
    }

    pub fn highlighted(&self) -> Option<usize> {
        self.highlight
    }

    pub fn open(&mut self) {
        self.highlight = Some(self.selected);
    }

    /// Close without changing the selection.
    pub fn close(&mut self) {
        self.highlight = None;
    }

    /// Commit the highlighted option and close.
    pub fn confirm(&mut self) {
        if let Some(idx) = self.highlight.take() {
            self.selected = idx;
        }
    }

    /// Move the highlight when open, otherwise cycle the selection.
    pub fn step(&mut self, delta: isize) {
        let len = self.options.len() as isize;
        let wrap = |idx: usize| ((idx as isize + delta).rem_euclid(len)) as usize;
        match self.highlight {
            Some(h) => self.highlight = Some(wrap(h)),
            None => self.selected = wrap(self.selected),
        }
    }
}

/// Initial values for a fresh form.
#[derive(Debug, Clone, Copy, Default)]
pub struct FormDefaults {
    pub provider: Provider,
    pub language: Language,
    pub number: TweetCount,
}

/// What one submission asks for.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub request: TweetRequest,
    pub provider: Provider,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FormAction {
    None,
    Submit(Submission),
    /// Submission refused; the message explains why.
    Invalid(String),
    Scroll(i32),
    Quit,
}

#[derive(Debug, Clone)]
pub struct FormState {
    pub focus: Focus,
    pub topic: TextInput,
    pub number: TweetCount,
    pub language: Dropdown<Language>,
    pub provider: Dropdown<Provider>,
}

impl FormState {
    pub fn new(defaults: FormDefaults) -> Self {
        Self {
            focus: Focus::Topic,
            topic: TextInput::default(),
            number: defaults.number,
            language: Dropdown::new(&Language::ALL, defaults.language),
            provider: Dropdown::new(&Provider::ALL, defaults.provider),
        }
    }

    pub fn open_dropdown(&self) -> Option<Focus> {
        match self.focus {
            Focus::Language if self.language.is_open() => Some(Focus::Language),
            Focus::Provider if self.provider.is_open() => Some(Focus::Provider),
            _ => None,
        }
    }

    fn close_dropdowns(&mut self) {
        self.language.close();
        self.provider.close();
    }

    /// Validate the fields and build a submission.
    pub fn submit(&self) -> FormAction {
        match Topic::new(self.topic.as_str()) {
            Ok(topic) => FormAction::Submit(Submission {
                request: TweetRequest::new(topic, self.number, self.language.selected()),
                provider: self.provider.selected(),
            }),
            Err(_) => FormAction::Invalid("Enter a topic before generating.".to_string()),
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> FormAction {
        match (key.code, key.modifiers) {
            (KeyCode::Char('c'), KeyModifiers::CONTROL)
            | (KeyCode::Char('q'), KeyModifiers::CONTROL) => return FormAction::Quit,
            (KeyCode::PageUp, _) => return FormAction::Scroll(PAGE_STEP),
            (KeyCode::PageDown, _) => return FormAction::Scroll(-PAGE_STEP),
            (KeyCode::Tab, _) => {
                self.close_dropdowns();
                self.focus = self.focus.next();
                return FormAction::None;
            }
            (KeyCode::BackTab, _) => {
                self.close_dropdowns();
                self.focus = self.focus.prev();
                return FormAction::None;
            }
            _ => {}
        }

        match self.focus {
            Focus::Topic => self.topic_key(key),
            Focus::Number => {
                match key.code {
                    KeyCode::Up | KeyCode::Right | KeyCode::Char('+') => {
                        self.number = self.number.increment()
                    }
                    KeyCode::Down | KeyCode::Left | KeyCode::Char('-') => {
                        self.number = self.number.decrement()
                    }
                    KeyCode::Enter => self.focus = self.focus.next(),
                    _ => {}
                }
                FormAction::None
            }
            Focus::Language => {
                dropdown_key(&mut self.language, key.code);
                FormAction::None
            }
            Focus::Provider => {
                dropdown_key(&mut self.provider, key.code);
                FormAction::None
            }
            Focus::Generate => match key.code {
                KeyCode::Enter | KeyCode::Char(' ') => self.submit(),
                _ => FormAction::None,
            },
        }
    }

    fn topic_key(&mut self, key: KeyEvent) -> FormAction {
        match key.code {
            KeyCode::Enter => return self.submit(),
            KeyCode::Left => self.topic.left(),
            KeyCode::Right => self.topic.right(),
            KeyCode::Home => self.topic.home(),
            KeyCode::End => self.topic.end(),
            KeyCode::Backspace => self.topic.backspace(),
            KeyCode::Delete => self.topic.delete(),
            KeyCode::Esc => self.topic.clear(),
            KeyCode::Up => return FormAction::Scroll(1),
            KeyCode::Down => return FormAction::Scroll(-1),
            KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.topic.insert(ch)
            }
            _ => {}
        }
        FormAction::None
    }
}

fn dropdown_key<T: Copy + PartialEq + 'static>(dropdown: &mut Dropdown<T>, code: KeyCode) {
    match code {
        KeyCode::Up => dropdown.step(-1),
        KeyCode::Down => dropdown.step(1),
        KeyCode::Enter | KeyCode::Char(' ') if dropdown.is_open() => dropdown.confirm(),
        KeyCode::Enter | KeyCode::Char(' ') => dropdown.open(),
        KeyCode::Esc => dropdown.close(),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn press(form: &mut FormState, codes: &[KeyCode]) -> FormAction {
        codes
            .iter()
            .map(|c| form.handle_key(key(*c)))
            .last()
            .unwrap_or(FormAction::None)
    }

    fn form() -> FormState {
        FormState::new(FormDefaults::default())
    }

    fn type_text(form: &mut FormState, text: &str) {
        for ch in text.chars() {
            form.handle_key(key(KeyCode::Char(ch)));
        }
    }

    #[test]
    fn tab_cycles_focus_both_ways() {
        let mut f = form();
        let mut seen = vec![f.focus];
        for _ in 0..5 {
            press(&mut f, &[KeyCode::Tab]);
            seen.push(f.focus);
        }
        assert_eq!(
            seen,
            vec![
                Focus::Topic,
                Focus::Number,
                Focus::Language,
                Focus::Provider,
                Focus::Generate,
                Focus::Topic
            ]
        );
        press(&mut f, &[KeyCode::BackTab]);
        assert_eq!(f.focus, Focus::Generate);
    }

    #[test]
    fn stepper_stays_within_bounds() {
        let mut f = form();
        f.focus = Focus::Number;
        press(&mut f, &[KeyCode::Down, KeyCode::Char('-'), KeyCode::Left]);
        assert_eq!(f.number.get(), 1);
        for _ in 0..15 {
            press(&mut f, &[KeyCode::Char('+')]);
        }
        assert_eq!(f.number.get(), 10);
        press(&mut f, &[KeyCode::Up, KeyCode::Right]);
        assert_eq!(f.number.get(), 10);
        press(&mut f, &[KeyCode::Down]);
        assert_eq!(f.number.get(), 9);
    }

    #[test]
    fn dropdown_opens_moves_highlight_and_selects() {
        let mut f = form();
        f.focus = Focus::Language;
        press(&mut f, &[KeyCode::Enter]);
        assert_eq!(f.open_dropdown(), Some(Focus::Language));
        press(&mut f, &[KeyCode::Down, KeyCode::Down]);
        assert_eq!(f.language.highlighted(), Some(2));
        assert_eq!(f.language.selected(), Language::English);
        press(&mut f, &[KeyCode::Enter]);
        assert_eq!(f.language.selected(), Language::French);
        assert!(!f.language.is_open());
    }

    #[test]
    fn escape_closes_without_selecting() {
        let mut f = form();
        f.focus = Focus::Provider;
        press(&mut f, &[KeyCode::Enter, KeyCode::Down, KeyCode::Esc]);
        assert_eq!(f.provider.selected(), Provider::Gemini);
        assert_eq!(f.open_dropdown(), None);
    }

    #[test]
    fn closed_dropdown_cycles_with_wraparound() {
        let mut f = form();
        f.focus = Focus::Language;
        press(&mut f, &[KeyCode::Up]);
        assert_eq!(f.language.selected(), Language::Marathi);
        press(&mut f, &[KeyCode::Down]);
        assert_eq!(f.language.selected(), Language::English);
    }

    #[test]
    fn tab_closes_an_open_dropdown() {
        let mut f = form();
        f.focus = Focus::Language;
        press(&mut f, &[KeyCode::Enter, KeyCode::Down, KeyCode::Tab]);
        assert_eq!(f.focus, Focus::Provider);
        assert!(!f.language.is_open());
        assert_eq!(f.language.selected(), Language::English);
    }

    #[test]
    fn empty_topic_is_rejected() {
        let mut f = form();
        type_text(&mut f, "   ");
        assert!(matches!(press(&mut f, &[KeyCode::Enter]), FormAction::Invalid(_)));
        f.focus = Focus::Generate;
        assert!(matches!(press(&mut f, &[KeyCode::Enter]), FormAction::Invalid(_)));
    }

    #[test]
    fn submission_carries_every_field() {
        let mut f = FormState::new(FormDefaults {
            provider: Provider::OpenAi,
            language: Language::Hindi,
            number: TweetCount::new(4).unwrap(),
        });
        type_text(&mut f, "monsoon");
        press(&mut f, &[KeyCode::Tab, KeyCode::Up]);
        press(&mut f, &[KeyCode::Tab, KeyCode::Tab, KeyCode::Tab]);
        assert_eq!(f.focus, Focus::Generate);

        let FormAction::Submit(sub) = press(&mut f, &[KeyCode::Enter]) else {
            panic!("expected submit");
        };
        assert_eq!(sub.provider, Provider::OpenAi);
        assert_eq!(sub.request.topic.as_str(), "monsoon");
        assert_eq!(sub.request.number.get(), 5);
        assert_eq!(sub.request.language, Language::Hindi);
    }

    #[test]
    fn control_keys_quit_and_page_keys_scroll() {
        let mut f = form();
        let ctrl_q = KeyEvent::new(KeyCode::Char('q'), KeyModifiers::CONTROL);
        assert_eq!(f.handle_key(ctrl_q), FormAction::Quit);
        assert_eq!(press(&mut f, &[KeyCode::PageUp]), FormAction::Scroll(PAGE_STEP));
        assert!(f.topic.is_blank());
    }
}
