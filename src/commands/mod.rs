mod registry;

pub use registry::{all_commands, find_command, matching_commands, Command};

use crate::core::builtin_providers::{builtin_providers, models_for, provider_ids};
use crate::core::config::io::{CONFIG_DIR_NAME, CONFIG_FILE_NAME};
use crate::core::constants::ASSISTANT_NAME;
use crate::core::session::SessionState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandResult {
    Continue,
    /// The transcript was cleared; the persisted history must be cleared too.
    ClearHistory,
    Exit,
}

/// Run a command typed into the chat input. The whole input must equal a
/// command name, surrounding whitespace included; anything else produces an
/// "Unknown command" reply echoing the input as typed.
pub fn process_input(session: &mut SessionState, input: &str) -> CommandResult {
    match find_command(input) {
        Some(command) => run_command(session, command),
        None => {
            session.push_feedback(format!("Unknown command: {input}"));
            CommandResult::Continue
        }
    }
}

pub fn run_command(session: &mut SessionState, command: &Command) -> CommandResult {
    tracing::debug!(command = command.name, "running command");
    (command.handler)(session)
}

fn current_marker(candidate: &str, current: &str) -> &'static str {
    if candidate.eq_ignore_ascii_case(current) {
        " (current)"
    } else {
        ""
    }
}

pub(super) fn handle_provider(session: &mut SessionState) -> CommandResult {
    let listing = builtin_providers()
        .iter()
        .map(|profile| {
            format!(
                "{} - {}{}",
                profile.id,
                profile.display_name,
                current_marker(&profile.id, &session.provider)
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    session.push_feedback(format!(
        "Available providers:\n{listing}\n\nUse 'nexly provider set <provider>' to switch."
    ));
    CommandResult::Continue
}

pub(super) fn handle_model(session: &mut SessionState) -> CommandResult {
    let listing = models_for(&session.provider)
        .into_iter()
        .map(|model| format!("{model}{}", current_marker(model, &session.model)))
        .collect::<Vec<_>>()
        .join("\n");

    let text = format!(
        "Available models for {}:\n{listing}\n\nUse 'nexly model set <model>' to switch.",
        session.provider
    );
    session.push_feedback(text);
    CommandResult::Continue
}

pub(super) fn handle_clear(session: &mut SessionState) -> CommandResult {
    session.messages.clear();
    session.scroll_offset = 0;
    session.push_feedback("Chat history cleared.");
    CommandResult::ClearHistory
}

pub(super) fn handle_help(session: &mut SessionState) -> CommandResult {
    let mut help = format!("{ASSISTANT_NAME} - AI Coding Assistant\n\nCommands:\n");
    for command in all_commands() {
        help.push_str(&format!("  {:<12} - {}\n", command.name, command.help));
    }
    help.push_str(
        "\nKeyboard Shortcuts:\n  \
         Ctrl+P       - Open command palette\n  \
         Ctrl+C       - Exit Nexly\n  \
         Ctrl+U       - Clear input\n  \
         PgUp/PgDn    - Scroll the conversation\n",
    );
    session.push_feedback(help);
    CommandResult::Continue
}

pub(super) fn handle_config(session: &mut SessionState) -> CommandResult {
    let providers = provider_ids();
    let keys = providers
        .iter()
        .map(|id| format!("    \"{id}\": \"...\""))
        .collect::<Vec<_>>()
        .join(",\n");

    session.push_feedback(format!(
        "{ASSISTANT_NAME} Configuration\n\n\
         To set API keys, run 'nexly config set-key <provider> <key>' or edit ~/{CONFIG_DIR_NAME}/{CONFIG_FILE_NAME}:\n\n\
         ```json\n{{\n  \"provider\": \"{}\",\n  \"model\": \"{}\",\n  \"api_keys\": {{\n{keys}\n  }}\n}}\n```\n\n\
         Keys can also come from each provider's environment variable.\n\n\
         Available providers: {}",
        session.provider,
        session.model,
        providers.join(", ")
    ));
    CommandResult::Continue
}

pub(super) fn handle_exit(session: &mut SessionState) -> CommandResult {
    session.exit_requested = true;
    CommandResult::Exit
}
