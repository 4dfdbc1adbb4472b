use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Cursor position inside the buffer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cursor {
    /// Zero-based line index.
    pub line: usize,
    /// Zero-based character column, at most the line's length.
    pub column: usize,
}

impl Cursor {
    pub const fn at(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Back,
    Forward,
    LineDown,
    LineUp,
    LineStart,
    LineEnd,
    PageDown,
    PageUp,
}

/// Lines of text plus the cursor and the first visible line.
///
/// The buffer always holds at least one line and every operation keeps the
/// cursor inside it, saturating at the bounds instead of failing.
#[derive(Debug, Clone)]
pub struct Buffer {
    lines: Vec<String>,
    cursor: Cursor,
    scroll_offset: usize,
    page_size: usize,
    running: bool,
}

impl Default for Buffer {
    fn default() -> Self {
        Self::new()
    }
}

impl Buffer {
    pub fn new() -> Self {
        Self {
            lines: vec![String::new()],
            cursor: Cursor::default(),
            scroll_offset: 0,
            page_size: DEFAULT_PAGE_SIZE,
            running: true,
        }
    }

    /// Build a buffer holding `lines`; an empty list becomes one empty line.
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut buffer = Self::new();
        buffer.replace_lines(lines.into_iter().map(Into::into).collect());
        buffer
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Place the cursor, clamping it into the buffer.
    pub fn with_cursor(mut self, cursor: Cursor) -> Self {
        let line = cursor.line.min(self.lines.len() - 1);
        self.cursor = Cursor::at(line, cursor.column.min(char_len(&self.lines[line])));
        self
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn get(&self, line: usize) -> Option<&str> {
        self.lines.get(line).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn quit(&mut self) {
        self.running = false;
    }

    fn current_line(&self) -> &str {
        &self.lines[self.cursor.line]
    }

    fn current_len(&self) -> usize {
        char_len(self.current_line())
    }

    /// Insert `count` copies of `c` at the cursor and move past them.
    pub fn insert_char(&mut self, c: char, count: usize) {
        let column = self.cursor.column;
        let line = &mut self.lines[self.cursor.line];
        let at = byte_offset(line, column);
        line.insert_str(at, &c.to_string().repeat(count));
        self.cursor.column += count;
    }

    /// Move down one line and insert a blank line there. The line that had
    /// the cursor keeps all of its text.
    pub fn new_line(&mut self) {
        self.cursor.line += 1;
        self.lines.insert(self.cursor.line, String::new());
        self.cursor.column = 0;
    }

    /// Insert a blank line at the cursor's index, pushing the current line down.
    pub fn open_line(&mut self) {
        self.lines.insert(self.cursor.line, String::new());
        self.cursor.column = 0;
    }

    /// Remove the current line unless it is the only one left.
    pub fn delete_line(&mut self) {
        if self.lines.len() == 1 {
            return;
        }

        self.lines.remove(self.cursor.line);
        self.cursor.column = 0;

        if self.cursor.line >= self.lines.len() {
            self.cursor.line -= 1;
        }
    }

    /// Delete the character before the cursor. Returns false at column 0,
    /// where nothing happens.
    pub fn backspace(&mut self) -> bool {
        if self.cursor.column == 0 {
            return false;
        }

        self.cursor.column -= 1;
        let column = self.cursor.column;
        let line = &mut self.lines[self.cursor.line];
        let at = byte_offset(line, column);
        line.remove(at);
        true
    }

    pub fn move_cursor(&mut self, direction: Direction) {
        match direction {
            Direction::Back => {
                self.cursor.column = self.cursor.column.saturating_sub(1);
            }
            Direction::Forward => {
                self.cursor.column = (self.cursor.column + 1).min(self.current_len());
            }
            Direction::LineDown => self.move_lines_down(1),
            Direction::LineUp => self.move_lines_up(1),
            Direction::LineStart => {
                self.cursor.column = 0;
            }
            Direction::LineEnd => {
                self.cursor.column = self.current_len();
            }
            Direction::PageDown => self.move_lines_down(self.page_size),
            Direction::PageUp => self.move_lines_up(self.page_size),
        }
    }

    fn move_lines_down(&mut self, count: usize) {
        self.cursor.line = (self.cursor.line + count).min(self.lines.len() - 1);
        self.clamp_column();
    }

    fn move_lines_up(&mut self, count: usize) {
        self.cursor.line = self.cursor.line.saturating_sub(count);
        self.clamp_column();
    }

    fn clamp_column(&mut self) {
        self.cursor.column = self.cursor.column.min(self.current_len());
    }

    /// Bring the cursor line back inside a viewport of `height` rows.
    /// Returns whether the scroll offset changed.
    pub fn adjust_scroll(&mut self, height: usize) -> bool {
        let height = height.max(1);
        let previous = self.scroll_offset;

        if self.cursor.line + 1 > self.scroll_offset + height {
            self.scroll_offset = self.cursor.line + 1 - height;
        } else if self.cursor.line < self.scroll_offset {
            self.scroll_offset = self.cursor.line;
        }

        previous != self.scroll_offset
    }

    /// Lines that fall inside a viewport of `height` rows at the current offset.
    pub fn visible_lines(&self, height: usize) -> &[String] {
        let start = self.scroll_offset.min(self.lines.len());
        let end = (start + height).min(self.lines.len());
        &self.lines[start..end]
    }

    /// Replace the lines with those read from `source`. Cursor and scroll
    /// offset are left as they were.
    pub fn load<R: BufRead>(&mut self, source: R) -> io::Result<()> {
        let mut lines = Vec::new();
        for raw in source.split(b'\n') {
            let mut raw = raw?;
            if raw.last() == Some(&b'\r') {
                raw.pop();
            }
            lines.push(String::from_utf8_lossy(&raw).into_owned());
        }
        self.replace_lines(lines);
        Ok(())
    }

    /// Load from `path`. A missing or unreadable file leaves a single empty line.
    pub fn load_file(&mut self, path: &Path) {
        let result = File::open(path).and_then(|file| self.load(BufReader::new(file)));
        match result {
            Ok(()) => tracing::info!("loaded {} lines from {}", self.len(), path.display()),
            Err(err) => {
                if err.kind() == io::ErrorKind::NotFound {
                    tracing::debug!("{} does not exist yet, starting empty", path.display());
                } else {
                    tracing::warn!("failed to read {}: {err}", path.display());
                }
                self.replace_lines(Vec::new());
            }
        }
    }

    /// Write every line followed by a newline.
    pub fn save<W: Write>(&self, mut sink: W) -> io::Result<()> {
        for line in &self.lines {
            sink.write_all(line.as_bytes())?;
            sink.write_all(b"\n")?;
        }
        sink.flush()
    }

    pub fn save_file(&self, path: &Path) -> io::Result<()> {
        let file = File::create(path)?;
        self.save(BufWriter::new(file))
    }

    fn replace_lines(&mut self, lines: Vec<String>) {
        self.lines = lines;
        if self.lines.is_empty() {
            self.lines.push(String::new());
        }
    }
}

fn char_len(line: &str) -> usize {
    line.chars().count()
}

fn byte_offset(line: &str, column: usize) -> usize {
    line.char_indices()
        .nth(column)
        .map_or(line.len(), |(offset, _)| offset)
}

#[cfg(test)]
mod test {
    use super::*;
    use proptest::prelude::*;

    fn assert_cursor_in_range(buffer: &Buffer) {
        let cursor = buffer.cursor();
        assert!(cursor.line < buffer.len());
        assert!(cursor.column <= buffer.get(cursor.line).unwrap().chars().count());
    }

    #[test]
    fn test_new_buffer_has_one_empty_line() {
        let buffer = Buffer::new();
        assert_eq!(buffer.lines(), &[String::new()]);
        assert_eq!(buffer.cursor(), Cursor::at(0, 0));
        assert_eq!(buffer.scroll_offset(), 0);
        assert!(buffer.is_running());
    }

    #[test]
    fn test_new_line_moves_to_blank_line_below() {
        let mut buffer = Buffer::from_lines(["abc"]).with_cursor(Cursor::at(0, 3));
        buffer.new_line();
        assert_eq!(buffer.lines(), &["abc", ""]);
        assert_eq!(buffer.cursor(), Cursor::at(1, 0));
    }

    #[test]
    fn test_new_line_keeps_text_after_cursor() {
        let mut buffer = Buffer::from_lines(["abcdef", "z"]).with_cursor(Cursor::at(0, 2));
        buffer.new_line();
        assert_eq!(buffer.lines(), &["abcdef", "", "z"]);
        assert_eq!(buffer.cursor(), Cursor::at(1, 0));
    }

    #[test]
    fn test_open_line_pushes_current_line_down() {
        let mut buffer = Buffer::from_lines(["a", "b"]).with_cursor(Cursor::at(1, 1));
        buffer.open_line();
        assert_eq!(buffer.lines(), &["a", "", "b"]);
        assert_eq!(buffer.cursor(), Cursor::at(1, 0));
    }

    #[test]
    fn test_backspace_sequence() {
        let mut buffer = Buffer::from_lines(["ab"]).with_cursor(Cursor::at(0, 2));
        assert!(buffer.backspace());
        assert_eq!(buffer.lines(), &["a"]);
        assert_eq!(buffer.cursor(), Cursor::at(0, 1));
        assert!(buffer.backspace());
        assert_eq!(buffer.lines(), &[""]);
        assert_eq!(buffer.cursor(), Cursor::at(0, 0));
        assert!(!buffer.backspace());
        assert_eq!(buffer.lines(), &[""]);
        assert_eq!(buffer.cursor(), Cursor::at(0, 0));
    }

    #[test]
    fn test_backspace_at_column_zero_does_not_join_lines() {
        let mut buffer = Buffer::from_lines(["a", "b"]).with_cursor(Cursor::at(1, 0));
        assert!(!buffer.backspace());
        assert_eq!(buffer.lines(), &["a", "b"]);
    }

    #[test]
    fn test_insert_with_repeat_count() {
        let mut buffer = Buffer::from_lines(["ab"]).with_cursor(Cursor::at(0, 1));
        buffer.insert_char(' ', 4);
        assert_eq!(buffer.lines(), &["a    b"]);
        assert_eq!(buffer.cursor(), Cursor::at(0, 5));
    }

    #[test]
    fn test_insert_after_multibyte_text() {
        let mut buffer = Buffer::from_lines(["é"]).with_cursor(Cursor::at(0, 1));
        buffer.insert_char('x', 1);
        assert_eq!(buffer.lines(), &["éx"]);
        assert!(buffer.backspace());
        assert!(buffer.backspace());
        assert_eq!(buffer.lines(), &[""]);
    }

    #[test]
    fn test_delete_line_keeps_last_line() {
        let mut buffer = Buffer::from_lines(["a", "b"]).with_cursor(Cursor::at(1, 1));
        buffer.delete_line();
        assert_eq!(buffer.lines(), &["a"]);
        assert_eq!(buffer.cursor(), Cursor::at(0, 0));
        buffer.delete_line();
        assert_eq!(buffer.lines(), &["a"]);
        assert_eq!(buffer.len(), 1);
    }

    #[test]
    fn test_delete_line_in_the_middle_keeps_line_index() {
        let mut buffer = Buffer::from_lines(["a", "b", "c"]).with_cursor(Cursor::at(1, 1));
        buffer.delete_line();
        assert_eq!(buffer.lines(), &["a", "c"]);
        assert_eq!(buffer.cursor(), Cursor::at(1, 0));
    }

    #[test]
    fn test_page_down_clamps_to_last_line() {
        let mut buffer = Buffer::from_lines(["a", "b", "c"]).with_cursor(Cursor::at(1, 0));
        buffer.move_cursor(Direction::PageDown);
        buffer.move_cursor(Direction::LineEnd);
        assert_eq!(buffer.cursor(), Cursor::at(2, 1));
        assert!(!buffer.adjust_scroll(10));
    }

    #[test]
    fn test_vertical_move_clamps_column() {
        let mut buffer = Buffer::from_lines(["long line", "ab"]).with_cursor(Cursor::at(0, 8));
        buffer.move_cursor(Direction::LineDown);
        assert_eq!(buffer.cursor(), Cursor::at(1, 2));
        buffer.move_cursor(Direction::LineUp);
        assert_eq!(buffer.cursor(), Cursor::at(0, 2));
        buffer.move_cursor(Direction::LineUp);
        assert_eq!(buffer.cursor(), Cursor::at(0, 2));
    }

    #[test]
    fn test_horizontal_moves_saturate() {
        let mut buffer = Buffer::from_lines(["ab"]);
        buffer.move_cursor(Direction::Back);
        assert_eq!(buffer.cursor().column, 0);
        buffer.move_cursor(Direction::Forward);
        buffer.move_cursor(Direction::Forward);
        buffer.move_cursor(Direction::Forward);
        assert_eq!(buffer.cursor().column, 2);
        buffer.move_cursor(Direction::LineStart);
        assert_eq!(buffer.cursor().column, 0);
    }

    #[test]
    fn test_adjust_scroll_follows_cursor() {
        let mut buffer = Buffer::from_lines((0..30).map(|i| i.to_string()));
        buffer.move_cursor(Direction::PageDown);
        assert!(buffer.adjust_scroll(5));
        assert_eq!(buffer.scroll_offset(), 6);
        assert!(!buffer.adjust_scroll(5));
        buffer.move_cursor(Direction::PageUp);
        assert!(buffer.adjust_scroll(5));
        assert_eq!(buffer.scroll_offset(), 0);
    }

    #[test]
    fn test_visible_lines() {
        let mut buffer = Buffer::from_lines(["a", "b", "c", "d"]).with_cursor(Cursor::at(3, 0));
        buffer.adjust_scroll(2);
        assert_eq!(buffer.visible_lines(2), &["c", "d"]);
        assert_eq!(buffer.visible_lines(10), &["c", "d"]);
    }

    #[test]
    fn test_load_strips_terminators() {
        let mut buffer = Buffer::new();
        buffer.load("one\r\ntwo\n\nthree".as_bytes()).unwrap();
        assert_eq!(buffer.lines(), &["one", "two", "", "three"]);
    }

    #[test]
    fn test_load_empty_source_gives_one_line() {
        let mut buffer = Buffer::from_lines(["old"]);
        buffer.load("".as_bytes()).unwrap();
        assert_eq!(buffer.lines(), &[String::new()]);
    }

    #[test]
    fn test_save_terminates_every_line() {
        let buffer = Buffer::from_lines(["a", "", "b"]);
        let mut out = Vec::new();
        buffer.save(&mut out).unwrap();
        assert_eq!(out, b"a\n\nb\n");
    }

    #[test]
    fn test_quit_clears_running() {
        let mut buffer = Buffer::new();
        buffer.quit();
        assert!(!buffer.is_running());
    }

    #[derive(Debug, Clone)]
    enum Op {
        Insert(char),
        NewLine,
        OpenLine,
        DeleteLine,
        Backspace,
        Move(Direction),
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            prop::char::range('a', 'z').prop_map(Op::Insert),
            Just(Op::NewLine),
            Just(Op::OpenLine),
            Just(Op::DeleteLine),
            Just(Op::Backspace),
            prop::sample::select(vec![
                Direction::Back,
                Direction::Forward,
                Direction::LineDown,
                Direction::LineUp,
                Direction::LineStart,
                Direction::LineEnd,
                Direction::PageDown,
                Direction::PageUp,
            ])
            .prop_map(Op::Move),
        ]
    }

    fn apply(buffer: &mut Buffer, op: &Op) {
        match op {
            Op::Insert(c) => buffer.insert_char(*c, 1),
            Op::NewLine => buffer.new_line(),
            Op::OpenLine => buffer.open_line(),
            Op::DeleteLine => buffer.delete_line(),
            Op::Backspace => {
                buffer.backspace();
            }
            Op::Move(direction) => buffer.move_cursor(*direction),
        }
    }

    proptest! {
        #[test]
        fn cursor_stays_in_range(ops in prop::collection::vec(op_strategy(), 0..200)) {
            let mut buffer = Buffer::new();
            for op in &ops {
                apply(&mut buffer, op);
                assert_cursor_in_range(&buffer);
                prop_assert!(!buffer.is_empty());
            }
        }

        #[test]
        fn scroll_keeps_cursor_visible(
            ops in prop::collection::vec(op_strategy(), 0..200),
            height in 1..30usize,
        ) {
            let mut buffer = Buffer::new();
            for op in &ops {
                apply(&mut buffer, op);
                buffer.adjust_scroll(height);
                let line = buffer.cursor().line;
                prop_assert!(buffer.scroll_offset() <= line);
                prop_assert!(line < buffer.scroll_offset() + height);
            }
        }

        #[test]
        fn insert_then_backspace_restores_line(
            text in "[a-z ]{0,12}",
            column in 0..13usize,
            c in prop::char::range('!', '~'),
        ) {
            let mut buffer = Buffer::from_lines([text.clone()])
                .with_cursor(Cursor::at(0, column));
            let before = buffer.cursor();
            buffer.insert_char(c, 1);
            prop_assert!(buffer.backspace());
            prop_assert_eq!(buffer.lines(), &[text]);
            prop_assert_eq!(buffer.cursor(), before);
        }
    }
}
