//! Raw-terminal display surface.
//!
//! Output passes through verbatim: the user's own terminal interprets the
//! escape sequences the remote shell emits. Input is captured in raw mode
//! and encoded to the byte sequences a terminal would send.

use std::io::{self, Write as _};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal;
use webshell_core::DisplaySurface;

/// The local terminal, switched to raw mode for the session's lifetime.
pub struct RawTerminal;

impl RawTerminal {
    /// Switch the terminal to raw mode.
    pub fn open() -> anyhow::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl DisplaySurface for RawTerminal {
    fn write(&self, text: &str) {
        let mut out = io::stdout();
        let _ = out.write_all(text.as_bytes());
        let _ = out.flush();
    }

    fn write_line(&self, text: &str) {
        self.write(text);
        self.write("\r\n");
    }

    fn teardown(&self) {
        let _ = terminal::disable_raw_mode();
    }
}

impl Drop for RawTerminal {
    fn drop(&mut self) {
        self.teardown();
    }
}

/// Encode a key event to the characters a terminal sends for it.
///
/// Returns `None` for keys with no terminal encoding (modifiers alone,
/// media keys, and so on).
pub fn encode_key(key: &KeyEvent) -> Option<String> {
    let seq = match key.code {
        KeyCode::Char(c) => {
            if key.modifiers.contains(KeyModifiers::CONTROL) && c.is_ascii_lowercase() {
                // Ctrl+A through Ctrl+Z
                return Some(char::from((c as u8) - b'a' + 1).to_string());
            }
            return Some(c.to_string());
        }
        KeyCode::Enter => "\r",
        KeyCode::Backspace => "\x7f",
        KeyCode::Tab => "\t",
        KeyCode::Esc => "\x1b",
        KeyCode::Up => "\x1b[A",
        KeyCode::Down => "\x1b[B",
        KeyCode::Right => "\x1b[C",
        KeyCode::Left => "\x1b[D",
        KeyCode::Home => "\x1b[H",
        KeyCode::End => "\x1b[F",
        KeyCode::PageUp => "\x1b[5~",
        KeyCode::PageDown => "\x1b[6~",
        KeyCode::Delete => "\x1b[3~",
        KeyCode::Insert => "\x1b[2~",
        KeyCode::F(n) => match n {
            1 => "\x1bOP",
            2 => "\x1bOQ",
            3 => "\x1bOR",
            4 => "\x1bOS",
            5 => "\x1b[15~",
            6 => "\x1b[17~",
            7 => "\x1b[18~",
            8 => "\x1b[19~",
            9 => "\x1b[20~",
            10 => "\x1b[21~",
            11 => "\x1b[23~",
            12 => "\x1b[24~",
            _ => return None,
        },
        _ => return None,
    };
    Some(seq.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn plain_characters_pass_through() {
        assert_eq!(encode_key(&key(KeyCode::Char('a'))).unwrap(), "a");
        assert_eq!(encode_key(&key(KeyCode::Enter)).unwrap(), "\r");
    }

    #[test]
    fn control_characters_are_encoded() {
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(encode_key(&ctrl_c).unwrap(), "\x03");
    }

    #[test]
    fn arrow_keys_become_escape_sequences() {
        assert_eq!(encode_key(&key(KeyCode::Up)).unwrap(), "\x1b[A");
        assert_eq!(encode_key(&key(KeyCode::Left)).unwrap(), "\x1b[D");
    }

    #[test]
    fn unmapped_keys_are_dropped() {
        assert!(encode_key(&key(KeyCode::F(24))).is_none());
        assert!(encode_key(&key(KeyCode::CapsLock)).is_none());
    }
}
