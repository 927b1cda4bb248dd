use std::{error::Error, io, io::Write, panic};

use ratatui::backend::CrosstermBackend;
use ratatui::crossterm::{
    cursor::{Hide, Show},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::Terminal;

pub type ChatTerminal<W = io::Stdout> = Terminal<CrosstermBackend<W>>;

pub fn setup_terminal() -> Result<ChatTerminal, Box<dyn Error>> {
    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, Hide).inspect_err(|_| {
        let _ = disable_raw_mode();
    })?;

    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend).inspect_err(|_| {
        let _ = disable_raw_mode();
        let _ = leave_screen(&mut io::stdout());
    })?;

    Ok(terminal)
}

pub fn restore_terminal<W: Write>(terminal: &mut ChatTerminal<W>) -> Result<(), Box<dyn Error>> {
    disable_raw_mode()?;
    leave_screen(terminal.backend_mut())?;
    terminal.show_cursor()?;
    Ok(())
}

/// Put the terminal back before the default hook prints the panic message.
pub fn install_panic_hook() {
    let previous = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = leave_screen(&mut io::stdout());
        previous(info);
    }));
}

fn leave_screen<W: Write>(writer: &mut W) -> io::Result<()> {
    execute!(writer, LeaveAlternateScreen, Show)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setup_terminal_round_trips_when_a_tty_is_available() {
        // Headless CI has no terminal to switch; only exercise the pair when
        // setup succeeds.
        if let Ok(mut terminal) = setup_terminal() {
            let _ = restore_terminal(&mut terminal);
        }
    }

    #[test]
    fn leave_screen_writes_restore_sequences() {
        let mut buf: Vec<u8> = Vec::new();
        leave_screen(&mut buf).expect("write");
        let written = String::from_utf8(buf).expect("utf8");
        assert!(written.contains("\x1b[?1049l"));
        assert!(written.contains("\x1b[?25h"));
    }
}
