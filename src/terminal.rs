use std::io::{self, stdout, Write};
use std::panic;

use anyhow::Context;
use crossterm::{terminal, ExecutableCommand};

use crate::render::Viewport;

/// Raw mode and the alternate screen for as long as the guard lives.
///
/// Dropping the guard restores the terminal. A panic hook restores it as well,
/// before the panic message is printed, so the message lands on the normal
/// screen instead of the discarded alternate one.
pub struct TerminalGuard {
    _private: (),
}

impl TerminalGuard {
    pub fn new() -> anyhow::Result<Self> {
        terminal::enable_raw_mode().context("failed to enable raw mode")?;
        let guard = Self { _private: () };

        stdout()
            .execute(terminal::EnterAlternateScreen)?
            .execute(terminal::Clear(terminal::ClearType::All))?;

        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            restore();
            previous(info);
        }));

        tracing::debug!("terminal switched to raw mode");
        Ok(guard)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        restore();
        tracing::debug!("terminal restored");
    }
}

// Safe to run more than once: leaving the alternate screen and disabling raw
// mode are no-ops the second time.
fn restore() {
    _ = leave_screen(&mut stdout());
    _ = terminal::disable_raw_mode();
}

fn leave_screen<W: Write>(out: &mut W) -> io::Result<()> {
    out.flush()?;
    out.execute(terminal::LeaveAlternateScreen)?;
    Ok(())
}

/// Viewport for the current terminal, keeping `reserved_rows` at the bottom
/// and the last column free.
pub fn viewport(reserved_rows: usize) -> anyhow::Result<Viewport> {
    let (columns, rows) = terminal::size().context("failed to query terminal size")?;
    Ok(viewport_for_size(columns, rows, reserved_rows))
}

fn viewport_for_size(columns: u16, rows: u16, reserved_rows: usize) -> Viewport {
    Viewport::new(
        usize::from(columns).saturating_sub(1),
        usize::from(rows).saturating_sub(reserved_rows),
    )
}
