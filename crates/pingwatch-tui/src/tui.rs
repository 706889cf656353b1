//! Terminal ownership for the dashboard.
//!
//! Entering switches to the alternate screen in raw mode with focus
//! reporting on, so a dashboard left in a background tab repaints when the
//! user comes back. Leaving undoes all of it, also from the panic hook.

use std::io::{Stdout, Write, stdout};

use color_eyre::eyre::Result;
use crossterm::{
    cursor,
    event::{DisableFocusChange, EnableFocusChange},
    execute,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{Frame, Terminal, backend::CrosstermBackend};

pub struct Tui {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    entered: bool,
}

impl Tui {
    pub fn new() -> Result<Self> {
        let terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
        Ok(Self {
            terminal,
            entered: false,
        })
    }

    pub fn enter(&mut self) -> Result<()> {
        terminal::enable_raw_mode()?;
        self.entered = true;
        execute!(stdout(), EnterAlternateScreen, EnableFocusChange, cursor::Hide)?;
        self.terminal.clear()?;
        Ok(())
    }

    /// Leave the terminal as the shell expects it. Runs at most once.
    pub fn exit(&mut self) {
        if !self.entered {
            return;
        }
        self.entered = false;
        let _ = self.terminal.flush();
        leave(&mut stdout());
    }

    pub fn draw(&mut self, render: impl FnOnce(&mut Frame)) -> Result<()> {
        self.terminal.draw(render)?;
        Ok(())
    }
}

impl Drop for Tui {
    fn drop(&mut self) {
        self.exit();
    }
}

/// Each step is attempted even if an earlier one fails.
fn leave(out: &mut impl Write) {
    let _ = execute!(out, DisableFocusChange, LeaveAlternateScreen, cursor::Show);
    let _ = terminal::disable_raw_mode();
}

/// Panic and error hooks that put the terminal back before reporting.
///
/// Install before [`Tui::enter`] so a panic during startup still leaves
/// the shell usable.
pub fn install_hooks() -> Result<()> {
    let (panic_hook, eyre_hook) = color_eyre::config::HookBuilder::default()
        .display_env_section(false)
        .into_hooks();
    eyre_hook.install()?;

    let panic_hook = panic_hook.into_panic_hook();
    std::panic::set_hook(Box::new(move |info| {
        leave(&mut stdout());
        panic_hook(info);
    }));
    Ok(())
}
