//! Terminal renderer with a per-row back-buffer.
//!
//! The renderer remembers the text it last wrote to each viewport row. A
//! diff repaint rewrites every visible row and pads it with just enough
//! spaces to cover whatever longer text used to be there. That cannot express
//! rows shifting up or down, so scrolling and line insertion or removal go
//! through [`Renderer::full_clear`] first.

use std::io::{self, Write};

use crossterm::{cursor, style, QueueableCommand};

/// Terminal area available to buffer text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: usize,
    pub height: usize,
}

impl Viewport {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
        }
    }
}

/// How much of the screen a keystroke invalidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Repaint {
    /// Rewrite visible rows against the back-buffer.
    Diff,
    /// Blank one vacated cell (0-based), then diff.
    Erase { column: usize, row: usize },
    /// Blank the whole viewport, forget the back-buffer, then repaint.
    Full,
}

pub struct Renderer<W: Write> {
    out: W,
    viewport: Viewport,
    back_buffer: Vec<String>,
}

impl<W: Write> Renderer<W> {
    pub fn new(out: W, viewport: Viewport) -> Self {
        Self {
            out,
            viewport,
            back_buffer: Vec::new(),
        }
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Adopt a new terminal size. Returns whether it differs from the old one;
    /// the caller then owes a full repaint.
    pub fn set_viewport(&mut self, viewport: Viewport) -> bool {
        if viewport == self.viewport {
            return false;
        }
        tracing::debug!("viewport resized to {}x{}", viewport.width, viewport.height);
        self.viewport = viewport;
        true
    }

    /// Text currently on each viewport row, top to bottom.
    pub fn last_frame(&self) -> &[String] {
        &self.back_buffer
    }

    pub fn writer(&self) -> &W {
        &self.out
    }

    pub fn writer_mut(&mut self) -> &mut W {
        &mut self.out
    }

    /// Draw one frame: apply `repaint` for `lines`, then park the terminal
    /// cursor at the 1-based (`column`, `row`) and flush.
    pub fn present(
        &mut self,
        repaint: Repaint,
        lines: &[String],
        column: usize,
        row: usize,
    ) -> io::Result<()> {
        self.out.queue(cursor::Hide)?;

        match repaint {
            Repaint::Full => self.full_clear()?,
            Repaint::Erase { column, row } => self.erase_cell(column, row)?,
            Repaint::Diff => {}
        }
        self.repaint(lines)?;

        self.move_cursor(column, row)?;
        self.out.queue(cursor::Show)?;
        self.flush()
    }

    /// Write each line to its row, padding over the stale tail of a longer
    /// line drawn there last time. Rows past `lines` are left alone.
    pub fn repaint(&mut self, lines: &[String]) -> io::Result<()> {
        let mut frame = Vec::with_capacity(lines.len().min(self.viewport.height));

        for (row, line) in lines.iter().take(self.viewport.height).enumerate() {
            let text = clip(line, self.viewport.width);
            let drawn = text.chars().count();
            let previous = self
                .back_buffer
                .get(row)
                .map_or(0, |line| line.chars().count());

            self.out
                .queue(cursor::MoveTo(0, to_u16(row)))?
                .queue(style::Print(text))?;

            let pad = padding(previous, drawn);
            if pad > 0 {
                self.out.queue(style::Print(" ".repeat(pad)))?;
            }

            frame.push(text.to_string());
        }

        self.back_buffer = frame;
        Ok(())
    }

    /// Blank every viewport row and forget what was drawn.
    pub fn full_clear(&mut self) -> io::Result<()> {
        let blank = format!("{:<width$}", "", width = self.viewport.width);
        for row in 0..self.viewport.height {
            self.out
                .queue(cursor::MoveTo(0, to_u16(row)))?
                .queue(style::Print(&blank))?;
        }

        self.back_buffer.clear();
        Ok(())
    }

    /// Blank a single 0-based cell.
    pub fn erase_cell(&mut self, column: usize, row: usize) -> io::Result<()> {
        if column >= self.viewport.width || row >= self.viewport.height {
            return Ok(());
        }

        self.out
            .queue(cursor::MoveTo(to_u16(column), to_u16(row)))?
            .queue(style::Print(' '))?;
        Ok(())
    }

    /// Move the terminal cursor to a 1-based column and row.
    pub fn move_cursor(&mut self, column: usize, row: usize) -> io::Result<()> {
        self.out.queue(cursor::MoveTo(
            to_u16(column.saturating_sub(1)),
            to_u16(row.saturating_sub(1)),
        ))?;
        Ok(())
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}

/// Spaces needed to cover a row that held `previous` characters once
/// `next` characters are written over it.
pub fn padding(previous: usize, next: usize) -> usize {
    previous.saturating_sub(next)
}

fn clip(line: &str, width: usize) -> &str {
    match line.char_indices().nth(width) {
        Some((end, _)) => &line[..end],
        None => line,
    }
}

fn to_u16(n: usize) -> u16 {
    u16::try_from(n).unwrap_or(u16::MAX)
}
