use crate::core::config::data::{path_display, Config};
use std::io::{self, Write};
use std::path::Path;

impl Config {
    /// Lines printed by `nexly config`. Keys themselves are never shown.
    pub fn summary_lines(&self, path: &Path) -> Vec<String> {
        let mut lines = vec![
            format!("Config file: {}", path_display(path)),
            format!("Provider: {}", self.provider),
            format!("Model: {}", self.model),
            format!("Temperature: {}", self.temperature),
            format!("MaxTokens: {}", self.max_tokens),
        ];

        match self.request_timeout() {
            Some(timeout) => lines.push(format!("Timeout: {}s", timeout.as_secs())),
            None => lines.push("Timeout: none".to_string()),
        }

        let with_keys = self.providers_with_keys();
        if with_keys.is_empty() {
            lines.push("API keys: (none set)".to_string());
        } else {
            lines.push(format!("API keys: {}", with_keys.join(", ")));
        }

        lines.push(format!("History: {} messages", self.history.len()));
        lines
    }

    pub fn print_all(&self, path: &Path, out: &mut impl Write) -> io::Result<()> {
        for line in self.summary_lines(path) {
            writeln!(out, "{line}")?;
        }
        Ok(())
    }
}
