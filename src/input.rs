//! Input translation: crossterm key events to buffer edits.
//!
//! Only key presses are translated. Modal dispatch (prompts, search,
//! quit confirmation) belongs to the caller.

use crate::cursor::Direction;
use crate::error::Result;
use crate::text_buffer::TextBuffer;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// An editing action a [`TextBuffer`] can carry out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditCommand {
    /// Insert a byte at the cursor.
    Insert(u8),
    /// Delete the byte before the cursor.
    Backspace,
    /// Delete the byte under the cursor.
    Delete,
    /// Move one step.
    Move(Direction),
    /// Start of the current line.
    Home,
    /// End of the current line.
    End,
    /// One page up.
    PageUp,
    /// One page down.
    PageDown,
}

impl EditCommand {
    /// Translate a terminal event. Anything but a key press yields `None`.
    pub fn from_event(event: &Event) -> Option<Self> {
        match event {
            Event::Key(key) => Self::from_key_event(key),
            _ => None,
        }
    }

    /// Translate a key event.
    ///
    /// Printable ASCII is inserted as-is; characters outside ASCII and
    /// chords with Control or Alt are not editing commands.
    pub fn from_key_event(key: &KeyEvent) -> Option<Self> {
        // Only process key press events (not release or repeat)
        if key.kind != KeyEventKind::Press {
            return None;
        }

        Some(match key.code {
            KeyCode::Char(c) => {
                if key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) {
                    return None;
                }
                let byte = u8::try_from(c).ok().filter(u8::is_ascii)?;
                Self::Insert(byte)
            }
            KeyCode::Enter => Self::Insert(b'\n'),
            KeyCode::Tab => Self::Insert(b'\t'),
            KeyCode::Backspace => Self::Backspace,
            KeyCode::Delete => Self::Delete,
            KeyCode::Left => Self::Move(Direction::Left),
            KeyCode::Right => Self::Move(Direction::Right),
            KeyCode::Up => Self::Move(Direction::Up),
            KeyCode::Down => Self::Move(Direction::Down),
            KeyCode::Home => Self::Home,
            KeyCode::End => Self::End,
            KeyCode::PageUp => Self::PageUp,
            KeyCode::PageDown => Self::PageDown,
            _ => return None,
        })
    }

    /// Check if the command changes buffer contents.
    pub const fn is_edit(self) -> bool {
        matches!(self, Self::Insert(_) | Self::Backspace | Self::Delete)
    }
}

impl TextBuffer {
    /// Carry out `command`. Page moves go `page_rows` lines.
    pub fn apply(&mut self, command: EditCommand, page_rows: usize) -> Result<()> {
        tracing::trace!(?command, "apply");
        match command {
            EditCommand::Insert(byte) => self.insert(byte),
            EditCommand::Backspace => self.delete_before_cursor(),
            EditCommand::Delete => self.delete_at_cursor().map(drop),
            EditCommand::Move(direction) => self.move_cursor_relative(direction).map(drop),
            EditCommand::Home => self.move_home(),
            EditCommand::End => self.move_end(),
            EditCommand::PageUp => self.page_up(page_rows).map(drop),
            EditCommand::PageDown => self.page_down(page_rows).map(drop),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BufferConfig;
    use crossterm::event::KeyEventState;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_printable_and_special_keys() {
        assert_eq!(
            EditCommand::from_key_event(&press(KeyCode::Char('a'))),
            Some(EditCommand::Insert(b'a'))
        );
        assert_eq!(
            EditCommand::from_key_event(&press(KeyCode::Enter)),
            Some(EditCommand::Insert(b'\n'))
        );
        assert_eq!(
            EditCommand::from_key_event(&press(KeyCode::Tab)),
            Some(EditCommand::Insert(b'\t'))
        );
        assert_eq!(
            EditCommand::from_key_event(&press(KeyCode::Up)),
            Some(EditCommand::Move(Direction::Up))
        );
        assert_eq!(
            EditCommand::from_key_event(&press(KeyCode::PageDown)),
            Some(EditCommand::PageDown)
        );
    }

    #[test]
    fn test_ignored_keys() {
        assert_eq!(EditCommand::from_key_event(&press(KeyCode::Char('é'))), None);
        assert_eq!(EditCommand::from_key_event(&press(KeyCode::Esc)), None);

        let ctrl = KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL);
        assert_eq!(EditCommand::from_key_event(&ctrl), None);

        let release = KeyEvent {
            code: KeyCode::Char('a'),
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        };
        assert_eq!(EditCommand::from_key_event(&release), None);
        assert_eq!(EditCommand::from_event(&Event::FocusGained), None);
    }

    #[test]
    fn test_shifted_character_is_inserted() {
        let key = KeyEvent::new(KeyCode::Char('A'), KeyModifiers::SHIFT);
        assert_eq!(EditCommand::from_key_event(&key), Some(EditCommand::Insert(b'A')));
    }

    #[test]
    fn test_apply_sequence() {
        let mut buffer = TextBuffer::new(BufferConfig::new(4, 32)).unwrap();
        for code in [
            KeyCode::Char('h'),
            KeyCode::Char('i'),
            KeyCode::Enter,
            KeyCode::Char('x'),
            KeyCode::Backspace,
            KeyCode::Up,
            KeyCode::Home,
            KeyCode::Delete,
        ] {
            let command = EditCommand::from_key_event(&press(code)).unwrap();
            buffer.apply(command, 10).unwrap();
        }
        assert_eq!(buffer.to_vec(), b"i\n");
        assert_eq!(buffer.current_position().abs, 0);
    }

    #[test]
    fn test_is_edit() {
        assert!(EditCommand::Backspace.is_edit());
        assert!(!EditCommand::Home.is_edit());
    }
}
