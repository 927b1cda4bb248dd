use super::*;
use crate::core::constants::SPINNER_FRAMES;
use crate::core::message::Role;

fn idle_session() -> SessionState {
    SessionState::new("openai", "gpt-4")
}

fn type_text(state: &mut SessionState, text: &str) {
    for ch in text.chars() {
        apply_action(state, SessionAction::TypeChar(ch));
    }
}

fn submit(state: &mut SessionState, text: &str) -> Option<SessionCommand> {
    type_text(state, text);
    apply_action(state, SessionAction::Enter)
}

fn streaming_session() -> SessionState {
    let mut state = idle_session();
    let command = submit(&mut state, "hello");
    assert_eq!(
        command,
        Some(SessionCommand::StartExchange {
            prompt: "hello".to_string()
        })
    );
    state
}

#[test]
fn submit_starts_exchange_and_records_user_message() {
    let state = streaming_session();

    assert!(state.streaming);
    assert!(state.input.is_empty());
    assert_eq!(state.spinner_frame, 0);
    assert_eq!(state.messages, vec![Message::user("hello")]);
    assert_eq!(state.in_flight_prompt.as_deref(), Some("hello"));
}

#[test]
fn empty_submit_is_a_no_op() {
    let mut state = idle_session();
    assert_eq!(apply_action(&mut state, SessionAction::Enter), None);

    assert!(!state.streaming);
    assert!(state.messages.is_empty());
    assert!(state.input.is_empty());
}

#[test]
fn whitespace_only_input_is_sent_as_a_prompt() {
    let mut state = idle_session();
    assert_eq!(
        submit(&mut state, "   "),
        Some(SessionCommand::StartExchange {
            prompt: "   ".to_string()
        })
    );

    assert!(state.streaming);
    assert!(state.input.is_empty());
    assert_eq!(state.messages, vec![Message::user("   ")]);
}

#[test]
fn submit_while_streaming_leaves_state_unchanged() {
    let mut state = streaming_session();
    state.input = "queued".to_string();
    let messages_before = state.messages.clone();

    assert_eq!(apply_action(&mut state, SessionAction::Enter), None);
    assert_eq!(apply_action(&mut state, SessionAction::TypeChar('x')), None);
    assert_eq!(apply_action(&mut state, SessionAction::Backspace), None);
    assert_eq!(apply_action(&mut state, SessionAction::OpenPalette), None);

    assert!(state.streaming);
    assert_eq!(state.mode, Mode::Chat);
    assert_eq!(state.input, "queued");
    assert_eq!(state.messages, messages_before);
}

#[test]
fn unknown_command_replies_without_touching_provider() {
    let mut state = idle_session();
    assert_eq!(submit(&mut state, "/unknowncmd"), None);

    assert_eq!(
        state.messages,
        vec![Message::assistant("Unknown command: /unknowncmd")]
    );
    assert_eq!(state.provider, "openai");
    assert_eq!(state.model, "gpt-4");
    assert!(state.input.is_empty());
    assert!(!state.streaming);
}

#[test]
fn commands_require_exact_match() {
    let mut state = idle_session();
    submit(&mut state, "/hel");
    submit(&mut state, "/HELP");

    assert_eq!(state.messages[0].content, "Unknown command: /hel");
    assert_eq!(state.messages[1].content, "Unknown command: /HELP");
}

#[test]
fn trailing_space_after_command_name_is_not_a_match() {
    let mut state = idle_session();
    state.messages.push(Message::user("keep me"));

    assert_eq!(submit(&mut state, "/clear "), None);

    assert_eq!(
        state.messages,
        vec![
            Message::user("keep me"),
            Message::assistant("Unknown command: /clear "),
        ]
    );
    assert!(state.input.is_empty());
}

#[test]
fn leading_space_makes_input_a_prompt() {
    let mut state = idle_session();

    assert_eq!(
        submit(&mut state, " /help"),
        Some(SessionCommand::StartExchange {
            prompt: " /help".to_string()
        })
    );
    assert!(state.streaming);
    assert_eq!(state.messages, vec![Message::user(" /help")]);
}

#[test]
fn clear_command_empties_transcript_and_requests_history_clear() {
    let mut state = idle_session();
    state.messages.push(Message::user("old"));
    state.messages.push(Message::assistant("reply"));

    assert_eq!(submit(&mut state, "/clear"), Some(SessionCommand::ClearHistory));
    assert_eq!(
        state.messages,
        vec![Message::assistant("Chat history cleared.")]
    );
}

#[test]
fn exit_command_requests_termination() {
    let mut state = idle_session();
    assert_eq!(submit(&mut state, "/exit"), Some(SessionCommand::Exit));
    assert!(state.exit_requested);
}

#[test]
fn quit_works_even_while_streaming() {
    let mut state = streaming_session();
    assert_eq!(
        apply_action(&mut state, SessionAction::Quit),
        Some(SessionCommand::Exit)
    );
    assert!(state.exit_requested);
}

#[test]
fn spinner_frame_after_n_ticks_is_n_mod_frame_count() {
    for ticks in [0_usize, 1, 9, 10, 11, 25] {
        let mut state = streaming_session();
        for _ in 0..ticks {
            apply_action(&mut state, SessionAction::SpinnerTick);
        }
        assert_eq!(state.spinner_frame, ticks % SPINNER_FRAMES.len());
    }
}

#[test]
fn spinner_does_not_advance_when_idle() {
    let mut state = idle_session();
    apply_action(&mut state, SessionAction::SpinnerTick);
    assert_eq!(state.spinner_frame, 0);
}

#[test]
fn spinner_resets_on_each_submission() {
    let mut state = streaming_session();
    for _ in 0..3 {
        apply_action(&mut state, SessionAction::SpinnerTick);
    }
    apply_action(&mut state, SessionAction::ExchangeCompleted("ok".into()));
    submit(&mut state, "again");
    assert_eq!(state.spinner_frame, 0);
}

#[test]
fn completion_appends_reply_and_requests_record() {
    let mut state = streaming_session();
    state.last_error = Some("old".to_string());
    apply_action(&mut state, SessionAction::TextDelta("Hi".into()));
    apply_action(&mut state, SessionAction::TextDelta(" there".into()));
    assert_eq!(state.pending_response, "Hi there");

    let command = apply_action(&mut state, SessionAction::ExchangeCompleted("Hi there".into()));

    assert_eq!(
        command,
        Some(SessionCommand::RecordExchange {
            prompt: "hello".to_string(),
            reply: "Hi there".to_string(),
        })
    );
    assert!(!state.streaming);
    assert!(state.pending_response.is_empty());
    assert_eq!(state.last_error, None);
    assert_eq!(state.messages.len(), 2);
    assert_eq!(state.messages[1].role, Role::Assistant);
    assert_eq!(state.messages[1].content, "Hi there");
}

#[test]
fn failure_sets_error_and_discards_partial_text() {
    let mut state = streaming_session();
    apply_action(&mut state, SessionAction::TextDelta("partial".into()));

    let command = apply_action(
        &mut state,
        SessionAction::ExchangeFailed("API key not set for provider: openai".into()),
    );

    assert_eq!(command, None);
    assert!(!state.streaming);
    assert!(state.pending_response.is_empty());
    assert_eq!(
        state.last_error.as_deref(),
        Some("API key not set for provider: openai")
    );
    assert_eq!(state.messages, vec![Message::user("hello")]);
}

#[test]
fn stale_exchange_events_are_ignored() {
    let mut state = idle_session();

    assert_eq!(
        apply_action(&mut state, SessionAction::ExchangeCompleted("late".into())),
        None
    );
    apply_action(&mut state, SessionAction::ExchangeFailed("late".into()));
    apply_action(&mut state, SessionAction::TextDelta("late".into()));

    assert!(state.messages.is_empty());
    assert_eq!(state.last_error, None);
    assert!(state.pending_response.is_empty());
}

#[test]
fn backspace_removes_whole_grapheme() {
    let mut state = idle_session();
    type_text(&mut state, "ae\u{301}");
    apply_action(&mut state, SessionAction::Backspace);
    assert_eq!(state.input, "a");

    apply_action(&mut state, SessionAction::ClearInput);
    assert!(state.input.is_empty());
    apply_action(&mut state, SessionAction::Backspace);
    assert!(state.input.is_empty());
}

#[test]
fn palette_opens_with_reset_filter_and_escape_discards_it() {
    let mut state = idle_session();
    apply_action(&mut state, SessionAction::OpenPalette);
    assert_eq!(state.mode, Mode::CommandPalette);
    assert!(state.palette_filter.is_empty());
    assert_eq!(state.palette_selected, 0);

    type_text(&mut state, "mo");
    assert_eq!(state.palette_filter, "mo");
    assert!(state.input.is_empty());

    apply_action(&mut state, SessionAction::Escape);
    assert_eq!(state.mode, Mode::Chat);
    assert!(state.palette_filter.is_empty());
    assert_eq!(state.palette_selected, 0);
}

#[test]
fn palette_selection_is_bounded_by_filtered_list() {
    let mut state = idle_session();
    apply_action(&mut state, SessionAction::OpenPalette);

    // "/provider" and "/model" and "/config" contain an "o"; "/help" does not.
    type_text(&mut state, "O");
    let visible: Vec<_> = state
        .filtered_commands()
        .iter()
        .map(|command| command.name)
        .collect();
    assert_eq!(visible, vec!["/provider", "/model", "/config"]);

    for _ in 0..10 {
        apply_action(&mut state, SessionAction::MoveDown);
    }
    assert_eq!(state.palette_selected, 2);

    for _ in 0..10 {
        apply_action(&mut state, SessionAction::MoveUp);
    }
    assert_eq!(state.palette_selected, 0);
}

#[test]
fn palette_unfiltered_selection_reaches_last_command() {
    let mut state = idle_session();
    apply_action(&mut state, SessionAction::OpenPalette);
    for _ in 0..20 {
        apply_action(&mut state, SessionAction::MoveDown);
    }
    assert_eq!(state.palette_selected, 5);
}

#[test]
fn typing_in_palette_reselects_first_match() {
    let mut state = idle_session();
    apply_action(&mut state, SessionAction::OpenPalette);
    apply_action(&mut state, SessionAction::MoveDown);
    apply_action(&mut state, SessionAction::MoveDown);
    assert_eq!(state.palette_selected, 2);

    type_text(&mut state, "ex");
    assert_eq!(state.palette_selected, 0);
    assert_eq!(state.filtered_commands()[0].name, "/exit");
}

#[test]
fn palette_enter_runs_selected_filtered_command() {
    let mut state = idle_session();
    apply_action(&mut state, SessionAction::OpenPalette);
    type_text(&mut state, "cle");

    assert_eq!(
        apply_action(&mut state, SessionAction::Enter),
        Some(SessionCommand::ClearHistory)
    );
    assert_eq!(state.mode, Mode::Chat);
    assert!(state.palette_filter.is_empty());
    assert_eq!(
        state.messages.last().map(|m| m.content.as_str()),
        Some("Chat history cleared.")
    );
}

#[test]
fn palette_enter_with_no_matches_keeps_palette_open() {
    let mut state = idle_session();
    apply_action(&mut state, SessionAction::OpenPalette);
    type_text(&mut state, "zzz");

    assert_eq!(apply_action(&mut state, SessionAction::Enter), None);
    assert_eq!(state.mode, Mode::CommandPalette);
    assert!(state.messages.is_empty());
}

#[test]
fn scroll_offset_saturates() {
    let mut state = idle_session();
    apply_action(&mut state, SessionAction::ScrollDown(5));
    assert_eq!(state.scroll_offset, 0);
    apply_action(&mut state, SessionAction::ScrollUp(7));
    apply_action(&mut state, SessionAction::ScrollDown(3));
    assert_eq!(state.scroll_offset, 4);
}
