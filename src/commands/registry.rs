use super::CommandResult;
use crate::core::session::SessionState;

pub type CommandHandler = fn(&mut SessionState) -> CommandResult;

pub struct Command {
    pub name: &'static str,
    pub help: &'static str,
    pub handler: CommandHandler,
}

pub fn all_commands() -> &'static [Command] {
    COMMANDS
}

/// Exact, case-sensitive lookup by full name including the prefix.
pub fn find_command(name: &str) -> Option<&'static Command> {
    all_commands().iter().find(|command| command.name == name)
}

/// Commands whose name contains `filter`, ignoring case, in table order.
pub fn matching_commands(filter: &str) -> Vec<&'static Command> {
    let needle = filter.to_lowercase();
    all_commands()
        .iter()
        .filter(|command| command.name.to_lowercase().contains(&needle))
        .collect()
}

const COMMANDS: &[Command] = &[
    Command {
        name: "/provider",
        help: "Switch AI provider",
        handler: super::handle_provider,
    },
    Command {
        name: "/model",
        help: "Switch AI model",
        handler: super::handle_model,
    },
    Command {
        name: "/clear",
        help: "Clear chat history",
        handler: super::handle_clear,
    },
    Command {
        name: "/help",
        help: "Show help",
        handler: super::handle_help,
    },
    Command {
        name: "/config",
        help: "Configure API keys",
        handler: super::handle_config,
    },
    Command {
        name: "/exit",
        help: "Exit Nexly",
        handler: super::handle_exit,
    },
];
