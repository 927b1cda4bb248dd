use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
    Frame,
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::core::constants::ASSISTANT_NAME;
use crate::core::message::{Message, Role};
use crate::core::session::{Mode, SessionState};
use crate::ui::markdown::render_markdown;
use crate::ui::theme::Theme;

pub const PALETTE_TITLE: &str = "Command Palette";
pub const PALETTE_CLOSE_HINT: &str = " (Press Esc to close)";
pub const PALETTE_FOOTER: &str = "Press Enter to execute, Esc to close, ↑↓ to navigate";

const USER_LABEL: &str = "You";

pub fn ui(f: &mut Frame, state: &SessionState, theme: &Theme) {
    let error_height = u16::from(state.last_error.is_some());
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
            Constraint::Length(error_height),
        ])
        .split(f.area());

    f.render_widget(
        Paragraph::new(Line::from(Span::styled(title_text(state), theme.title_style))),
        chunks[0],
    );

    match state.mode {
        Mode::Chat => render_transcript(f, state, theme, chunks[1]),
        Mode::CommandPalette => {
            let lines = palette_lines(state, theme, chunks[1].width);
            f.render_widget(Paragraph::new(lines), chunks[1]);
        }
    }

    f.render_widget(
        Paragraph::new(input_line(state, theme, chunks[2].width)),
        chunks[2],
    );

    if let Some(error) = &state.last_error {
        f.render_widget(
            Paragraph::new(Line::from(Span::styled(
                format!("Error: {error}"),
                theme.error_style,
            ))),
            chunks[3],
        );
    }
}

pub fn title_text(state: &SessionState) -> String {
    format!(
        "{ASSISTANT_NAME} v{} - {} ({})",
        env!("CARGO_PKG_VERSION"),
        state.provider,
        state.model
    )
}

fn render_transcript(f: &mut Frame, state: &SessionState, theme: &Theme, area: Rect) {
    let paragraph = Paragraph::new(transcript_lines(state, theme)).wrap(Wrap { trim: false });

    // `scroll_offset` counts rows up from the bottom; ratatui scrolls from the top.
    let total_rows = u16::try_from(paragraph.line_count(area.width)).unwrap_or(u16::MAX);
    let max_offset = total_rows.saturating_sub(area.height);
    let from_top = max_offset.saturating_sub(state.scroll_offset.min(max_offset));

    f.render_widget(paragraph.scroll((from_top, 0)), area);
}

fn label_line(role: Role, theme: &Theme) -> Line<'static> {
    let (label, style) = match role {
        Role::User => (USER_LABEL, theme.user_label_style),
        _ => (ASSISTANT_NAME, theme.assistant_label_style),
    };
    Line::from(Span::styled(format!(" {label} "), style))
}

fn indented(lines: Vec<Line<'static>>) -> impl Iterator<Item = Line<'static>> {
    lines.into_iter().map(|mut line| {
        line.spans.insert(0, Span::raw(" "));
        line
    })
}

fn push_message(lines: &mut Vec<Line<'static>>, message: &Message, theme: &Theme) {
    lines.push(label_line(message.role, theme));
    lines.extend(indented(render_markdown(&message.content, theme)));
    lines.push(Line::default());
}

/// Transcript rows: each message as a label line followed by its styled
/// content, then the streaming indicator and partial reply while an exchange
/// is in flight.
pub fn transcript_lines(state: &SessionState, theme: &Theme) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for message in &state.messages {
        push_message(&mut lines, message, theme);
    }

    if state.streaming {
        let mut indicator = label_line(Role::Assistant, theme);
        indicator.spans.push(Span::raw(" "));
        indicator.spans.push(Span::styled(
            state.spinner(),
            theme.streaming_indicator_style,
        ));
        lines.push(indicator);
        if !state.pending_response.is_empty() {
            lines.extend(indented(render_markdown(&state.pending_response, theme)));
        }
    }

    lines
}

pub fn palette_lines(state: &SessionState, theme: &Theme, width: u16) -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::from(vec![
            Span::styled(PALETTE_TITLE, theme.palette_title_style),
            Span::raw(PALETTE_CLOSE_HINT),
        ]),
        Line::from(Span::styled(
            "─".repeat(usize::from(width)),
            theme.palette_border_style,
        )),
        Line::from(vec![
            Span::styled("Filter: ", theme.palette_help_style),
            Span::styled(format!("{}_", state.palette_filter), theme.input_text_style),
        ]),
        Line::default(),
    ];

    let commands = state.filtered_commands();
    if commands.is_empty() {
        lines.push(Line::from(Span::styled(
            "  No matching commands",
            theme.palette_help_style,
        )));
    }
    for (index, command) in commands.iter().enumerate() {
        let prefix = if index == state.palette_selected {
            Span::styled("> ", theme.palette_selected_style)
        } else {
            Span::raw("  ")
        };
        let name_style = if index == state.palette_selected {
            theme.palette_selected_style
        } else {
            theme.input_text_style
        };
        lines.push(Line::from(vec![
            prefix,
            Span::styled(command.name, name_style),
            Span::raw(" "),
            Span::styled(command.help, theme.palette_help_style),
        ]));
    }

    lines.push(Line::default());
    lines.push(Line::from(Span::styled(
        PALETTE_FOOTER,
        theme.palette_hint_style,
    )));
    lines
}

/// `> ` when idle, `... ` while streaming, then the buffer and a block cursor.
/// A buffer wider than the row is shown by its tail so the cursor stays
/// visible.
pub fn input_line(state: &SessionState, theme: &Theme, width: u16) -> Line<'static> {
    let prompt = if state.streaming { "... " } else { "> " };
    let prompt_style = if state.streaming {
        theme.disabled_prompt_style
    } else {
        theme.prompt_style
    };

    let budget = usize::from(width).saturating_sub(prompt.width() + 1);
    Line::from(vec![
        Span::styled(prompt, prompt_style),
        Span::styled(
            format!("{}_", visible_tail(&state.input, budget)),
            theme.input_text_style,
        ),
    ])
}

/// The longest suffix of `text` that fits in `max_width` columns.
fn visible_tail(text: &str, max_width: usize) -> &str {
    let mut used = 0;
    for (idx, ch) in text.char_indices().rev() {
        used += ch.width().unwrap_or(0);
        if used > max_width {
            return &text[idx + ch.len_utf8()..];
        }
    }
    text
}
