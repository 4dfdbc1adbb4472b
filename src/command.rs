use crate::buffer::Direction;

const LINE_FEED: u8 = b'\n';
const CARRIAGE_RETURN: u8 = b'\r';
const BACKSPACE: u8 = 0x08;
const DELETE: u8 = 0x7f;
const TAB: u8 = b'\t';

/// One decoded keystroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    NewLine,
    Backspace,
    Tab,
    DeleteLine,
    OpenLine,
    Save,
    Quit,
    Move(Direction),
    InsertChar(char),
}

impl Command {
    /// Map a raw input byte to a command. Bytes with no binding that are not
    /// printable ASCII decode to `None`.
    pub fn decode(byte: u8) -> Option<Self> {
        let command = match byte {
            LINE_FEED | CARRIAGE_RETURN => Self::NewLine,
            BACKSPACE | DELETE => Self::Backspace,
            TAB => Self::Tab,
            b'K' => Self::DeleteLine,
            b'O' => Self::OpenLine,
            b'S' => Self::Save,
            b'Q' => Self::Quit,
            b'B' => Self::Move(Direction::Back),
            b'F' => Self::Move(Direction::Forward),
            b'N' => Self::Move(Direction::LineDown),
            b'P' => Self::Move(Direction::LineUp),
            b'A' => Self::Move(Direction::LineStart),
            b'E' => Self::Move(Direction::LineEnd),
            b'V' => Self::Move(Direction::PageDown),
            b'C' => Self::Move(Direction::PageUp),
            b' '..=b'~' => Self::InsertChar(char::from(byte)),
            _ => return None,
        };

        Some(command)
    }

    /// Commands that add or remove lines, or jump a whole page, shift what
    /// every row below shows and cannot be expressed as a per-row diff.
    pub fn is_structural(self) -> bool {
        matches!(
            self,
            Self::NewLine
                | Self::OpenLine
                | Self::DeleteLine
                | Self::Move(Direction::PageDown | Direction::PageUp)
        )
    }
}
