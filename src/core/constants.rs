//! Shared constants used across the application

use std::time::Duration;

/// Frames of the streaming indicator, advanced once per tick.
pub const SPINNER_FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

pub const SPINNER_INTERVAL: Duration = Duration::from_millis(100);

/// Input starting with this character is treated as a command.
pub const COMMAND_PREFIX: char = '/';

pub const ASSISTANT_NAME: &str = "Nexly";

pub const SYSTEM_PROMPT: &str = "You are Nexly, a helpful AI coding assistant. You can read, write, and edit files. \nWhen asked to edit files, provide the complete updated file content. \nBe concise and helpful. Always provide code in markdown code blocks.";

/// Lines moved per PageUp/PageDown in the transcript.
pub const SCROLL_PAGE: u16 = 10;
