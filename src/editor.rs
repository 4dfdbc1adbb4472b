use std::io::{Read, Write};
use std::path::PathBuf;

use crate::buffer::Buffer;
use crate::command::Command;
use crate::config::Config;
use crate::render::{Renderer, Repaint, Viewport};

type ViewportSource = Box<dyn FnMut() -> anyhow::Result<Viewport>>;

pub struct Editor<W: Write> {
    buffer: Buffer,
    renderer: Renderer<W>,
    viewport_source: Option<ViewportSource>,
    file: Option<PathBuf>,
    tab_width: usize,
}

impl<W: Write> Editor<W> {
    pub fn new(buffer: Buffer, out: W, viewport: Viewport, config: &Config) -> Self {
        Editor {
            buffer,
            renderer: Renderer::new(out, viewport),
            viewport_source: None,
            file: None,
            tab_width: config.tab_width,
        }
    }

    /// Target for the save key.
    pub fn with_file(mut self, file: Option<PathBuf>) -> Self {
        self.file = file;
        self
    }

    /// Queried before every keystroke so the editor follows terminal resizes.
    pub fn with_viewport_source<F>(mut self, source: F) -> Self
    where
        F: FnMut() -> anyhow::Result<Viewport> + 'static,
    {
        self.viewport_source = Some(Box::new(source));
        self
    }

    pub fn buffer(&self) -> &Buffer {
        &self.buffer
    }

    pub fn renderer(&self) -> &Renderer<W> {
        &self.renderer
    }

    fn vheight(&self) -> usize {
        self.renderer.viewport().height
    }

    /// Paint the initial frame, then process one byte at a time until quit
    /// or end of input.
    pub fn run<R: Read>(&mut self, input: R) -> anyhow::Result<()> {
        self.draw(Repaint::Full)?;

        let mut bytes = input.bytes();
        while self.buffer.is_running() {
            let Some(byte) = bytes.next().transpose()? else {
                tracing::debug!("input closed");
                break;
            };
            self.handle_byte(byte)?;
        }

        Ok(())
    }

    /// Switch to a new viewport size. Returns whether it changed.
    pub fn resize(&mut self, viewport: Viewport) -> bool {
        self.renderer.set_viewport(viewport)
    }

    fn refresh_viewport(&mut self) -> bool {
        let Some(source) = self.viewport_source.as_mut() else {
            return false;
        };

        match source() {
            Ok(viewport) => self.resize(viewport),
            Err(err) => {
                tracing::warn!("keeping old viewport: {err:#}");
                false
            }
        }
    }

    pub fn handle_byte(&mut self, byte: u8) -> anyhow::Result<()> {
        let resized = self.refresh_viewport();

        let Some(command) = Command::decode(byte) else {
            tracing::debug!("ignoring byte {byte:#04x}");
            if resized {
                self.buffer.adjust_scroll(self.vheight());
                return self.draw(Repaint::Full);
            }
            return Ok(());
        };
        tracing::debug!("command: {command:?}");

        let repaint = self.apply(command);
        let scrolled = self.buffer.adjust_scroll(self.vheight());

        let repaint = if resized || scrolled || command.is_structural() {
            Repaint::Full
        } else {
            repaint
        };

        self.draw(repaint)
    }

    /// Apply `command` to the buffer and return the repaint it needs when
    /// no scrolling happened.
    fn apply(&mut self, command: Command) -> Repaint {
        match command {
            Command::NewLine => self.buffer.new_line(),
            Command::OpenLine => self.buffer.open_line(),
            Command::DeleteLine => self.buffer.delete_line(),
            Command::Tab => self.buffer.insert_char(' ', self.tab_width),
            Command::InsertChar(c) => self.buffer.insert_char(c, 1),
            Command::Move(direction) => self.buffer.move_cursor(direction),
            Command::Save => self.save(),
            Command::Quit => self.buffer.quit(),
            Command::Backspace => {
                if self.buffer.backspace() {
                    let cursor = self.buffer.cursor();
                    let vacated = self
                        .buffer
                        .get(cursor.line)
                        .map_or(0, |line| line.chars().count());
                    return Repaint::Erase {
                        column: vacated,
                        row: cursor.line.saturating_sub(self.buffer.scroll_offset()),
                    };
                }
            }
        }

        Repaint::Diff
    }

    fn save(&self) {
        let Some(file) = &self.file else {
            tracing::debug!("no file to save to");
            return;
        };

        match self.buffer.save_file(file) {
            Ok(()) => tracing::info!("saved {} lines to {}", self.buffer.len(), file.display()),
            Err(err) => tracing::warn!("failed to save {}: {err}", file.display()),
        }
    }

    pub fn draw(&mut self, repaint: Repaint) -> anyhow::Result<()> {
        let height = self.vheight();
        let cursor = self.buffer.cursor();
        let lines = self.buffer.visible_lines(height);

        // 1-based terminal coordinates
        let column = cursor.column + 1;
        let row = cursor.line.saturating_sub(self.buffer.scroll_offset()) + 1;

        self.renderer.present(repaint, lines, column, row)?;
        Ok(())
    }
}
