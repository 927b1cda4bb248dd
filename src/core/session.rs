//! Single-session interaction state.
//!
//! [`apply_action`] is the only way the event loop changes a
//! [`SessionState`]. It never performs I/O; anything that must touch the
//! network or the config file is returned as a [`SessionCommand`] for the
//! event loop to execute.

use unicode_segmentation::UnicodeSegmentation;

use crate::commands::{self, matching_commands, CommandResult};
use crate::core::constants::{COMMAND_PREFIX, SPINNER_FRAMES};
use crate::core::message::Message;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Chat,
    CommandPalette,
}

#[derive(Debug, Clone, Default)]
pub struct SessionState {
    pub messages: Vec<Message>,
    pub input: String,
    pub mode: Mode,
    pub streaming: bool,
    pub spinner_frame: usize,
    pub last_error: Option<String>,
    pub palette_filter: String,
    /// Index into the filtered command list.
    pub palette_selected: usize,
    /// Text received so far for the in-flight exchange. Never stored.
    pub pending_response: String,
    pub in_flight_prompt: Option<String>,
    pub provider: String,
    pub model: String,
    /// Lines scrolled up from the bottom of the transcript.
    pub scroll_offset: u16,
    pub exit_requested: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionAction {
    TypeChar(char),
    Backspace,
    ClearInput,
    Enter,
    Escape,
    OpenPalette,
    MoveUp,
    MoveDown,
    ScrollUp(u16),
    ScrollDown(u16),
    Quit,
    SpinnerTick,
    TextDelta(String),
    ExchangeCompleted(String),
    ExchangeFailed(String),
}

/// Side effects requested by a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    StartExchange { prompt: String },
    ClearHistory,
    RecordExchange { prompt: String, reply: String },
    Exit,
}

impl SessionState {
    pub fn new(provider: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            model: model.into(),
            ..Default::default()
        }
    }

    pub fn is_idle(&self) -> bool {
        self.mode == Mode::Chat && !self.streaming
    }

    pub fn spinner(&self) -> &'static str {
        SPINNER_FRAMES[self.spinner_frame % SPINNER_FRAMES.len()]
    }

    pub fn push_feedback(&mut self, text: impl Into<String>) {
        self.messages.push(Message::assistant(text));
    }

    pub fn filtered_commands(&self) -> Vec<&'static commands::Command> {
        matching_commands(&self.palette_filter)
    }

    fn open_palette(&mut self) {
        self.mode = Mode::CommandPalette;
        self.palette_filter.clear();
        self.palette_selected = 0;
    }

    fn close_palette(&mut self) {
        self.mode = Mode::Chat;
        self.palette_filter.clear();
        self.palette_selected = 0;
    }

    fn begin_exchange(&mut self, prompt: String) -> SessionCommand {
        self.messages.push(Message::user(prompt.clone()));
        self.input.clear();
        self.streaming = true;
        self.spinner_frame = 0;
        self.last_error = None;
        self.pending_response.clear();
        self.in_flight_prompt = Some(prompt.clone());
        self.scroll_offset = 0;
        SessionCommand::StartExchange { prompt }
    }

    fn finish_command(&mut self, result: CommandResult) -> Option<SessionCommand> {
        match result {
            CommandResult::Continue => None,
            CommandResult::ClearHistory => Some(SessionCommand::ClearHistory),
            CommandResult::Exit => {
                self.exit_requested = true;
                Some(SessionCommand::Exit)
            }
        }
    }
}

pub fn apply_action(state: &mut SessionState, action: SessionAction) -> Option<SessionCommand> {
    match action {
        SessionAction::Quit => {
            state.exit_requested = true;
            Some(SessionCommand::Exit)
        }
        SessionAction::SpinnerTick => {
            if state.streaming {
                state.spinner_frame = (state.spinner_frame + 1) % SPINNER_FRAMES.len();
            }
            None
        }
        SessionAction::TextDelta(text) => {
            if state.streaming {
                state.pending_response.push_str(&text);
            }
            None
        }
        SessionAction::ExchangeCompleted(reply) => handle_completed(state, reply),
        SessionAction::ExchangeFailed(error) => {
            if !state.streaming {
                tracing::debug!("ignoring failure with no exchange in flight");
                return None;
            }
            state.streaming = false;
            state.pending_response.clear();
            state.in_flight_prompt = None;
            state.last_error = Some(error);
            None
        }
        SessionAction::ScrollUp(lines) => {
            state.scroll_offset = state.scroll_offset.saturating_add(lines);
            None
        }
        SessionAction::ScrollDown(lines) => {
            state.scroll_offset = state.scroll_offset.saturating_sub(lines);
            None
        }
        other => match state.mode {
            Mode::CommandPalette => handle_palette_action(state, other),
            Mode::Chat => handle_chat_action(state, other),
        },
    }
}

fn handle_completed(state: &mut SessionState, reply: String) -> Option<SessionCommand> {
    if !state.streaming {
        tracing::debug!("ignoring completion with no exchange in flight");
        return None;
    }

    state.streaming = false;
    state.pending_response.clear();
    state.last_error = None;
    state.messages.push(Message::assistant(reply.clone()));
    state
        .in_flight_prompt
        .take()
        .map(|prompt| SessionCommand::RecordExchange { prompt, reply })
}

fn handle_chat_action(state: &mut SessionState, action: SessionAction) -> Option<SessionCommand> {
    // Input is frozen while a response streams in.
    if state.streaming {
        return None;
    }

    match action {
        SessionAction::TypeChar(ch) => {
            state.input.push(ch);
            None
        }
        SessionAction::Backspace => {
            pop_grapheme(&mut state.input);
            None
        }
        SessionAction::ClearInput => {
            state.input.clear();
            None
        }
        SessionAction::OpenPalette => {
            state.open_palette();
            None
        }
        SessionAction::Enter => submit_input(state),
        _ => None,
    }
}

fn submit_input(state: &mut SessionState) -> Option<SessionCommand> {
    if state.input.is_empty() {
        return None;
    }

    let input = std::mem::take(&mut state.input);
    if input.starts_with(COMMAND_PREFIX) {
        let result = commands::process_input(state, &input);
        return state.finish_command(result);
    }

    Some(state.begin_exchange(input))
}

fn handle_palette_action(
    state: &mut SessionState,
    action: SessionAction,
) -> Option<SessionCommand> {
    match action {
        SessionAction::TypeChar(ch) => {
            state.palette_filter.push(ch);
            state.palette_selected = 0;
            None
        }
        SessionAction::Backspace => {
            pop_grapheme(&mut state.palette_filter);
            state.palette_selected = 0;
            None
        }
        SessionAction::ClearInput => {
            state.palette_filter.clear();
            state.palette_selected = 0;
            None
        }
        SessionAction::MoveUp => {
            state.palette_selected = state.palette_selected.saturating_sub(1);
            None
        }
        SessionAction::MoveDown => {
            let visible = state.filtered_commands().len();
            if state.palette_selected + 1 < visible {
                state.palette_selected += 1;
            }
            None
        }
        SessionAction::Escape => {
            state.close_palette();
            None
        }
        SessionAction::Enter => {
            let command = state
                .filtered_commands()
                .get(state.palette_selected)
                .copied()?;
            state.close_palette();
            let result = commands::run_command(state, command);
            state.finish_command(result)
        }
        _ => None,
    }
}

fn pop_grapheme(text: &mut String) {
    if let Some((index, _)) = text.grapheme_indices(true).next_back() {
        text.truncate(index);
    }
}

#[cfg(test)]
mod tests;
