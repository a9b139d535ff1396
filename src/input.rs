//! Keyboard input: raw chunks from stdin become keybinding actions.

use crossbeam_channel::Sender;
use std::io::{self, Read};
use std::thread;
use tracing::debug;

use crate::config::{KeyToken, Keybindings};

/// Ctrl+C as delivered in raw mode.
pub const INTERRUPT_BYTE: u8 = 0x03;

/// One decoded input chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodedInput {
    /// Hard exit, independent of keybindings.
    Interrupt,
    Token(KeyToken),
    /// Escape sequences, multi-byte chunks, and non-ASCII input.
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAction {
    TogglePause,
    Restart,
    Exit,
}

/// Decode one read from the terminal. Only single-character chunks carry a token.
pub fn decode_chunk(chunk: &[u8]) -> DecodedInput {
    match chunk {
        [INTERRUPT_BYTE] => DecodedInput::Interrupt,
        [b' '] => DecodedInput::Token(KeyToken::Space),
        [byte] if byte.is_ascii_graphic() => {
            DecodedInput::Token(KeyToken::Char(byte.to_ascii_lowercase() as char))
        }
        _ => DecodedInput::Ignored,
    }
}

/// Map a chunk to an action. When one key is bound twice, pause is checked first,
/// then restart, then exit.
pub fn dispatch_chunk(chunk: &[u8], bindings: &Keybindings) -> Option<InputAction> {
    let token = match decode_chunk(chunk) {
        DecodedInput::Interrupt => return Some(InputAction::Exit),
        DecodedInput::Token(token) => token,
        DecodedInput::Ignored => return None,
    };
    if bindings.is_pause(token) {
        Some(InputAction::TogglePause)
    } else if bindings.is_restart(token) {
        Some(InputAction::Restart)
    } else if bindings.is_exit(token) {
        Some(InputAction::Exit)
    } else {
        None
    }
}

/// Forward raw stdin reads until EOF, a read error, or the receiver is gone.
pub fn spawn_input_thread(tx: Sender<Vec<u8>>) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let mut stdin = io::stdin();
        let mut buf = [0u8; 1024];
        loop {
            let n = match stdin.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => n,
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => {
                    debug!(error = %err, "stdin read error");
                    break;
                }
            };
            if tx.send(buf[..n].to_vec()).is_err() {
                return;
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_single_characters_lowercased() {
        assert_eq!(decode_chunk(b"P"), DecodedInput::Token(KeyToken::Char('p')));
        assert_eq!(decode_chunk(b" "), DecodedInput::Token(KeyToken::Space));
        assert_eq!(decode_chunk(&[INTERRUPT_BYTE]), DecodedInput::Interrupt);
    }

    #[test]
    fn ignores_sequences_and_control_bytes() {
        assert_eq!(decode_chunk(b"\x1b[A"), DecodedInput::Ignored);
        assert_eq!(decode_chunk(b"pq"), DecodedInput::Ignored);
        assert_eq!(decode_chunk(b""), DecodedInput::Ignored);
        assert_eq!(decode_chunk(b"\r"), DecodedInput::Ignored);
        assert_eq!(decode_chunk("é".as_bytes()), DecodedInput::Ignored);
    }

    #[test]
    fn default_bindings_dispatch() {
        let bindings = Keybindings::default();
        assert_eq!(dispatch_chunk(b"p", &bindings), Some(InputAction::TogglePause));
        assert_eq!(dispatch_chunk(b" ", &bindings), Some(InputAction::TogglePause));
        assert_eq!(dispatch_chunk(b"R", &bindings), Some(InputAction::Restart));
        assert_eq!(dispatch_chunk(b"q", &bindings), Some(InputAction::Exit));
        assert_eq!(dispatch_chunk(b"e", &bindings), Some(InputAction::Exit));
        assert_eq!(dispatch_chunk(b"x", &bindings), None);
    }

    #[test]
    fn interrupt_exits_even_when_rebound() {
        let mut bindings = Keybindings::default();
        bindings.exit = KeyToken::Char('z');
        bindings.exit_alt = KeyToken::Char('y');
        assert_eq!(dispatch_chunk(b"q", &bindings), None);
        assert_eq!(dispatch_chunk(&[INTERRUPT_BYTE], &bindings), Some(InputAction::Exit));
    }

    #[test]
    fn shared_key_prefers_pause_then_restart_over_exit() {
        let mut bindings = Keybindings::default();
        bindings.pause = KeyToken::Char('q');
        assert_eq!(dispatch_chunk(b"q", &bindings), Some(InputAction::TogglePause));

        let mut bindings = Keybindings::default();
        bindings.restart = KeyToken::Char('e');
        assert_eq!(dispatch_chunk(b"e", &bindings), Some(InputAction::Restart));
        assert_eq!(dispatch_chunk(b"q", &bindings), Some(InputAction::Exit));
    }
}
