use crate::{
    form::{FormAction, FormDefaults, FormState, Submission},
    output::OutputLog,
    styles,
    view::{self, ViewSnap},
};
use anyhow::Result;
use async_trait::async_trait;
use crossterm::{
    event::{Event as CtEvent, KeyEvent, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend, style::Style};
use std::{
    collections::HashMap,
    io::{self, Stdout},
    time::{Duration, Instant},
};
use tweetgen_actors::{
    GenerateCmd, GenerateOutcome,
    actor::{Actor, Addr, Context},
    generator::GeneratorActor,
    system::ShutdownHandle,
};
use tweetgen_common::Provider;

const BRAILLE_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

pub enum TuiMsg {
    InputEvent(CtEvent),
    Tick,
    Generated(GenerateOutcome),
    OpError(String),
    Shutdown,
}

/// Startup values for the form plus the providers that cannot be used.
#[derive(Debug, Clone, Default)]
pub struct TuiSettings {
    pub defaults: FormDefaults,
    /// Reason per provider, e.g. `"OPENAI_API_KEY is not set"`.
    pub unavailable: HashMap<Provider, String>,
}

/// What the actor must do after a key press.
#[derive(Debug, PartialEq)]
pub(crate) enum Effect {
    None,
    Dispatch(Submission),
    Quit,
}

/// Terminal-free UI state: form, output and the single in-flight request.
pub(crate) struct Session {
    pub(crate) form: FormState,
    pub(crate) output: OutputLog,
    pub(crate) unavailable: HashMap<Provider, String>,
    pub(crate) notice: Option<(String, Style)>,
    pub(crate) busy: bool,
}

impl Session {
    pub(crate) fn new(settings: TuiSettings) -> Self {
        Self {
            form: FormState::new(settings.defaults),
            output: OutputLog::placeholder(),
            unavailable: settings.unavailable,
            notice: None,
            busy: false,
        }
    }

    pub(crate) fn on_key(&mut self, key: KeyEvent) -> Effect {
        match self.form.handle_key(key) {
            FormAction::None => Effect::None,
            FormAction::Scroll(delta) => {
                self.output.scroll_by(delta);
                Effect::None
            }
            FormAction::Invalid(msg) => {
                self.notice = Some((msg, styles::error()));
                Effect::None
            }
            FormAction::Quit => Effect::Quit,
            FormAction::Submit(sub) => self.begin(sub),
        }
    }

    /// Accept a submission unless one is in flight or its provider is unusable.
    fn begin(&mut self, sub: Submission) -> Effect {
        if self.busy {
            self.notice = Some((
                "A request is already in progress.".to_string(),
                styles::label(),
            ));
            return Effect::None;
        }
        if let Some(reason) = self.unavailable.get(&sub.provider) {
            self.notice = Some((format!("Cannot generate: {reason}"), styles::error()));
            return Effect::None;
        }

        let request = &sub.request;
        self.output.clear();
        self.output.push(
            format!(
                "→ [Request] {} tweet(s) on \"{}\" in {} via {}",
                request.number,
                request.topic,
                request.language,
                sub.provider.label()
            ),
            styles::request_header(),
        );
        self.output.push_blank();
        self.notice = None;
        self.busy = true;
        Effect::Dispatch(sub)
    }

    pub(crate) fn finish(&mut self, outcome: GenerateOutcome, at: &str) {
        self.busy = false;
        match outcome {
            Ok(generation) => self.output.push_generation(&generation, at),
            Err(e) => self.output.push_error(&e),
        }
    }
}

pub struct TuiActor {
    generator: Addr<GeneratorActor>,

    // terminal
    term: Terminal<CrosstermBackend<Stdout>>,
    restored: bool,
    tick_rate: Duration,
    last_tick: Instant,

    session: Session,
    dirty: bool,
    spin_idx: usize,

    // shutdown coordination
    shutdown: ShutdownHandle,
}

impl TuiActor {
    pub fn new(
        generator: Addr<GeneratorActor>,
        settings: TuiSettings,
        shutdown: ShutdownHandle,
    ) -> Result<Self> {
        let mut stdout = io::stdout();
        enable_raw_mode()?;
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut term = Terminal::new(backend)?;
        term.clear()?;

        Ok(Self {
            generator,
            term,
            restored: false,
            tick_rate: Duration::from_millis(250),
            last_tick: Instant::now(),
            session: Session::new(settings),
            dirty: true,
            spin_idx: 0,
            shutdown,
        })
    }

    fn spinner(&self) -> &'static str {
        if self.session.busy {
            BRAILLE_FRAMES[self.spin_idx % BRAILLE_FRAMES.len()]
        } else {
            " "
        }
    }

    fn step_spinner(&mut self) {
        if self.session.busy {
            self.spin_idx = (self.spin_idx + 1) % BRAILLE_FRAMES.len();
            self.dirty = true;
        }
    }

    fn draw(&mut self) -> Result<()> {
        let spinner = self.spinner();
        let snap = ViewSnap {
            form: &self.session.form,
            output: &mut self.session.output,
            unavailable: &self.session.unavailable,
            notice: self.session.notice.as_ref(),
            busy: self.session.busy,
            spinner,
        };
        view::draw(&mut self.term, snap)
    }

    fn dispatch(&mut self, sub: Submission, me: Option<Addr<TuiActor>>) {
        tracing::info!(
            provider = %sub.provider,
            number = sub.request.number.get(),
            language = %sub.request.language,
            "tui.submit"
        );
        let (cmd, rx) = GenerateCmd::new(sub.request, sub.provider);
        if self.generator.try_send(cmd).is_err() {
            self.session
                .finish(Err("generator is not running".to_string()), &now());
            return;
        }
        let Some(me) = me else { return };
        tokio::spawn(async move {
            let outcome = rx
                .await
                .unwrap_or_else(|_| Err("generator stopped before replying".to_string()));
            let _ = me.send(TuiMsg::Generated(outcome)).await;
        });
    }

    fn restore_terminal(&mut self) {
        if self.restored {
            return;
        }
        self.restored = true;
        disable_raw_mode().ok();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        let _ = self.term.show_cursor();
    }
}

impl Drop for TuiActor {
    fn drop(&mut self) {
        self.restore_terminal();
    }
}

fn now() -> String {
    chrono::Local::now().format("%H:%M:%S").to_string()
}

#[async_trait]
impl Actor for TuiActor {
    type Msg = TuiMsg;

    async fn handle(&mut self, msg: Self::Msg, ctx: &mut Context<Self>) -> Result<()> {
        match msg {
            TuiMsg::InputEvent(ev) => {
                if let CtEvent::Key(k) = ev
                    && k.kind != KeyEventKind::Release
                {
                    self.dirty = true;
                    match self.session.on_key(k) {
                        Effect::None => {}
                        Effect::Dispatch(sub) => self.dispatch(sub, ctx.addr()),
                        Effect::Quit => {
                            if let Some(me) = ctx.addr() {
                                let _ = me.try_send(TuiMsg::Shutdown);
                            }
                        }
                    }
                } else if let CtEvent::Resize(..) = ev {
                    self.dirty = true;
                }
            }
            TuiMsg::Generated(outcome) => {
                self.session.finish(outcome, &now());
                self.dirty = true;
            }
            TuiMsg::OpError(e) => {
                tracing::warn!(error = %e, "tui.op_error");
                self.session.output.push_error(&e);
                self.dirty = true;
            }
            TuiMsg::Tick => {
                self.step_spinner();
                if self.dirty || self.last_tick.elapsed() >= self.tick_rate {
                    self.draw()?;
                    self.last_tick = Instant::now();
                    self.dirty = false;
                }
            }
            TuiMsg::Shutdown => {
                self.restore_terminal();
                self.shutdown.signal();
                ctx.stop();
            }
        }

        Ok(())
    }
}
