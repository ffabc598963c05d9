use crate::form::{Focus, FormState};
use crate::output::OutputLog;
use crate::styles;
use anyhow::Result;
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Position, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph},
};
use std::collections::HashMap;
use std::io::Stdout;
use tweetgen_common::Provider;

pub const TITLE: &str = "Tweet Generator";
pub const SUBTITLE: &str = "Generate tweets using Generative AI";

const LABEL_WIDTH: u16 = 11;
const FORM_ROWS: u16 = 5;

/// Everything one frame needs, borrowed from the actor.
pub struct ViewSnap<'a> {
    pub form: &'a FormState,
    pub output: &'a mut OutputLog,
    pub unavailable: &'a HashMap<Provider, String>,
    pub notice: Option<&'a (String, Style)>,
    pub busy: bool,
    pub spinner: &'static str,
}

pub fn draw(term: &mut Terminal<CrosstermBackend<Stdout>>, snap: ViewSnap<'_>) -> Result<()> {
    term.draw(|frame| render(frame, snap))?;
    Ok(())
}

fn render(frame: &mut Frame, mut snap: ViewSnap<'_>) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Length(FORM_ROWS + 2),
            Constraint::Min(3),
            Constraint::Length(3),
        ])
        .split(frame.area());

    let header = Paragraph::new(vec![
        Line::from(Span::styled(format!(" {TITLE}"), styles::header())),
        Line::from(Span::styled(format!(" {SUBTITLE}"), styles::dim())),
    ]);
    frame.render_widget(header, layout[0]);

    let form_inner = render_form(frame, layout[1], &snap);
    let banner = banner(&snap);
    render_output(frame, layout[2], &mut *snap.output, banner);
    render_status(frame, layout[3], &snap);

    // Drawn last so the popup sits above the output block.
    if let Some(open) = snap.form.open_dropdown() {
        render_dropdown(frame, form_inner, snap.form, open);
    }
}

/// Missing-key message for the selected provider.
fn banner(snap: &ViewSnap<'_>) -> Option<String> {
    let provider = snap.form.provider.selected();
    snap.unavailable
        .get(&provider)
        .map(|reason| format!(" ⚠ {} unavailable: {reason} ", provider.label()))
}

fn label(text: &str, focused: bool) -> Span<'static> {
    let style = if focused {
        styles::focused()
    } else {
        styles::label()
    };
    Span::styled(format!("{text:<width$}", width = LABEL_WIDTH as usize - 1), style)
}

fn render_form(frame: &mut Frame, area: Rect, snap: &ViewSnap<'_>) -> Rect {
    let form = snap.form;
    let block = Block::default().borders(Borders::ALL).title(" Request ");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let provider = form.provider.selected();
    let mut provider_spans = vec![
        label("Provider", form.focus == Focus::Provider),
        Span::raw(" "),
        Span::styled(format!("{} ▾", provider.label()), styles::value()),
    ];
    if snap.unavailable.contains_key(&provider) {
        provider_spans.push(Span::styled("  (API key missing)", styles::error()));
    }

    let button_style = if form.focus == Focus::Generate {
        styles::focused()
    } else {
        styles::value()
    };

    let rows = vec![
        Line::from(vec![
            label("Topic", form.focus == Focus::Topic),
            Span::raw(" "),
            Span::styled(form.topic.as_str().to_string(), styles::value()),
        ]),
        Line::from(vec![
            label("Tweets", form.focus == Focus::Number),
            Span::raw(" "),
            Span::styled(format!("‹ {:>2} ›", form.number.get()), styles::value()),
            Span::styled("  1–10, ↑/↓ or +/-", styles::dim()),
        ]),
        Line::from(vec![
            label("Language", form.focus == Focus::Language),
            Span::raw(" "),
            Span::styled(format!("{} ▾", form.language.selected()), styles::value()),
        ]),
        Line::from(provider_spans),
        Line::from(vec![
            Span::raw(" ".repeat(LABEL_WIDTH as usize)),
            Span::styled("[ Generate ]", button_style),
        ]),
    ];
    frame.render_widget(Paragraph::new(rows), inner);

    if form.focus == Focus::Topic {
        frame.set_cursor_position(Position {
            x: inner.x + LABEL_WIDTH + form.topic.caret_col(),
            y: inner.y,
        });
    }
    inner
}

fn render_output(frame: &mut Frame, area: Rect, output: &mut OutputLog, banner: Option<String>) {
    let block = Block::default().borders(Borders::ALL).title(" Output ");
    let mut inner = block.inner(area);
    frame.render_widget(block, area);

    if let Some(text) = banner {
        let banner_area = Rect { height: 1, ..inner };
        frame.render_widget(
            Paragraph::new(Span::styled(text, styles::banner())),
            banner_area,
        );
        inner.y += 1;
        inner.height = inner.height.saturating_sub(1);
    }

    let wrapped = output.wrapped(inner.width as usize);
    let (start, end) = output.window(wrapped.len(), inner.height as usize);
    let items: Vec<ListItem> = wrapped[start..end]
        .iter()
        .map(|(text, style)| ListItem::new(Line::from(Span::styled(text.clone(), *style))))
        .collect();
    frame.render_widget(List::new(items), inner);
}

fn render_status(frame: &mut Frame, area: Rect, snap: &ViewSnap<'_>) {
    let mut spans = vec![
        Span::raw(" "),
        Span::styled(snap.spinner, Style::default().fg(Color::Yellow)),
        Span::raw(" "),
        if snap.busy {
            Span::styled("Generating…", Style::default().fg(Color::Yellow))
        } else {
            Span::styled("Ready", Style::default().fg(Color::Green))
        },
    ];
    match snap.notice {
        Some((text, style)) => {
            spans.push(Span::raw(" • "));
            spans.push(Span::styled(text.clone(), *style));
        }
        None => spans.push(Span::styled(
            " • Tab/Shift-Tab move • Enter select • PgUp/PgDn scroll • Ctrl-Q quit",
            styles::dim(),
        )),
    }
    let status = Paragraph::new(Line::from(spans))
        .block(Block::default().borders(Borders::ALL).title(" Status "));
    frame.render_widget(status, area);
}

fn render_dropdown(frame: &mut Frame, form_inner: Rect, form: &FormState, open: Focus) {
    let (row, labels, highlight): (u16, Vec<String>, Option<usize>) = match open {
        Focus::Language => (
            2,
            form.language
                .options()
                .iter()
                .map(ToString::to_string)
                .collect(),
            form.language.highlighted(),
        ),
        Focus::Provider => (
            3,
            form.provider
                .options()
                .iter()
                .map(|p| p.label().to_string())
                .collect(),
            form.provider.highlighted(),
        ),
        _ => return,
    };

    let width = labels.iter().map(|l| l.chars().count()).max().unwrap_or(0) as u16 + 4;
    let height = labels.len() as u16 + 2;
    let screen = frame.area();
    let x = form_inner.x + LABEL_WIDTH;
    let y = form_inner.y + row + 1;
    let popup = Rect {
        x,
        y,
        width: width.min(screen.width.saturating_sub(x)),
        height: height.min(screen.height.saturating_sub(y)),
    };

    let items: Vec<ListItem> = labels
        .into_iter()
        .enumerate()
        .map(|(idx, text)| {
            let style = if Some(idx) == highlight {
                styles::focused()
            } else {
                styles::value()
            };
            ListItem::new(Line::from(Span::styled(format!(" {text} "), style)))
        })
        .collect();

    frame.render_widget(Clear, popup);
    frame.render_widget(
        List::new(items).block(Block::default().borders(Borders::ALL)),
        popup,
    );
}
