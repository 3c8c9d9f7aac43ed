use std::{
    io::{self, stdout, Stdout},
    panic,
};

use crossterm as ct;
use ct::{
    cursor::{Hide, Show},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

/// The terminal type the dashboard draws on
pub type Tui = Terminal<CrosstermBackend<Stdout>>;

/// Switch to the alternate screen in raw mode
///
/// A panic hook is installed first so a panicking training loop still leaves
/// the user's terminal usable.
pub fn init() -> io::Result<Tui> {
    init_panic_hook();
    ct::execute!(stdout(), EnterAlternateScreen, Hide)?;
    enable_raw_mode()?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
    terminal.clear()?;
    Ok(terminal)
}

/// Restore the terminal to its original state
pub fn restore() -> io::Result<()> {
    disable_raw_mode()?;
    ct::execute!(stdout(), LeaveAlternateScreen, Show)?;
    Ok(())
}

fn init_panic_hook() {
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = restore();
        original_hook(panic_info);
    }));
}

/// Restores the terminal when dropped, unless it was already restored
///
/// Covers early returns through `?` that the panic hook never sees.
pub struct RestoreGuard {
    restore: fn() -> io::Result<()>,
    armed: bool,
}

impl Default for RestoreGuard {
    fn default() -> Self {
        Self::with(restore)
    }
}

impl RestoreGuard {
    pub fn new() -> Self {
        Self::default()
    }

    fn with(restore: fn() -> io::Result<()>) -> Self {
        Self {
            restore,
            armed: true,
        }
    }

    /// Restore now; later calls and the drop do nothing
    pub fn restore(&mut self) -> io::Result<()> {
        if !self.armed {
            return Ok(());
        }
        self.armed = false;
        (self.restore)()
    }
}

impl Drop for RestoreGuard {
    fn drop(&mut self) {
        let _ = self.restore();
    }
}
