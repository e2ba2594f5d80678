#![forbid(unsafe_code)]

//! Input parser state machine.
//!
//! Decodes raw terminal bytes into [`Key`] tokens.
//!
//! # Byte protocol
//!
//! | Bytes | Token |
//! |-------|-------|
//! | `0x20..=0x7E` except `` ` `` | [`Key::Char`] |
//! | `` ` `` | [`Command::Switch`] |
//! | `0x03` | [`Command::Interrupt`] |
//! | `0x1B` | [`Command::Back`] |
//! | `0x0D` | [`Command::Ok`] |
//! | `0x09` | [`Command::Next`] |
//! | `0x08`, `0x7F` | [`Command::DeleteBefore`] |
//! | `0xE0 H` / `P` / `K` / `M` / `S` | Up / Down / Left / Right / Delete |
//!
//! `0x00` is accepted as an alternate extended-key prefix. Every other byte
//! is consumed without producing a token.
//!
//! # Restartability
//!
//! The queue is append-only. When a prefix byte arrives without its second
//! byte, decoding stops and leaves the prefix queued; the next
//! [`push`](InputParser::push) resumes exactly where decoding left off.
//!
//! ```
//! use ticlif_core::event::{Command, Key};
//! use ticlif_core::input_parser::InputParser;
//!
//! let mut parser = InputParser::new();
//! parser.push(&[0xE0]);
//! assert_eq!(parser.next_key(), None);
//! parser.push(b"H");
//! assert_eq!(parser.next_key(), Some(Key::Command(Command::Up)));
//! ```

use std::collections::VecDeque;

use crate::event::{Command, Key};

/// Lead byte of two-byte extended key sequences.
pub const EXTENDED_PREFIX: u8 = 0xE0;

/// Alternate lead byte for extended keys.
pub const EXTENDED_PREFIX_ALT: u8 = 0x00;

/// Byte that raises the unconditional interrupt (Ctrl+C).
pub const INTERRUPT_BYTE: u8 = 0x03;

/// Outcome of a single decode attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    /// A token was produced and its bytes consumed.
    Token(Key),
    /// One or more bytes were consumed without producing a token.
    Skipped,
    /// An escape prefix is waiting for its second byte.
    Incomplete,
    /// Nothing queued.
    Empty,
}

/// Stateful decoder over an append-only byte queue.
#[derive(Debug, Default, Clone)]
pub struct InputParser {
    queue: VecDeque<u8>,
}

impl InputParser {
    /// Create a new input parser.
    #[must_use]
    pub fn new() -> Self {
        Self {
            queue: VecDeque::with_capacity(16),
        }
    }

    /// Append raw bytes to the queue.
    pub fn push(&mut self, bytes: &[u8]) {
        self.queue.extend(bytes.iter().copied());
    }

    /// Append a single raw byte.
    pub fn push_byte(&mut self, byte: u8) {
        self.queue.push_back(byte);
    }

    /// Number of queued bytes not yet decoded.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Whether decoding is stalled on an incomplete escape sequence.
    #[must_use]
    pub fn is_waiting(&self) -> bool {
        self.queue.len() == 1 && is_prefix(self.queue[0])
    }

    /// Drop every queued byte.
    pub fn clear(&mut self) {
        self.queue.clear();
    }

    /// Decode the next token.
    ///
    /// Returns `None` once the queue is exhausted or an incomplete escape
    /// sequence is pending. Calling again after more bytes are pushed resumes
    /// decoding.
    pub fn next_key(&mut self) -> Option<Key> {
        loop {
            match self.step() {
                Step::Token(key) => return Some(key),
                Step::Skipped => continue,
                Step::Incomplete | Step::Empty => return None,
            }
        }
    }

    /// Lazily decode every available token.
    pub fn keys(&mut self) -> Keys<'_> {
        Keys { parser: self }
    }

    /// Push bytes and return every token they complete.
    pub fn parse(&mut self, input: &[u8]) -> Vec<Key> {
        self.push(input);
        self.keys().collect()
    }

    fn step(&mut self) -> Step {
        let Some(&first) = self.queue.front() else {
            return Step::Empty;
        };

        if is_prefix(first) {
            let Some(&second) = self.queue.get(1) else {
                return Step::Incomplete;
            };
            self.queue.drain(..2);
            return match decode_extended(second) {
                Some(cmd) => Step::Token(Key::Command(cmd)),
                None => Step::Skipped,
            };
        }

        self.queue.pop_front();
        match decode_single(first) {
            Some(key) => Step::Token(key),
            None => Step::Skipped,
        }
    }
}

/// Lazy token iterator returned by [`InputParser::keys`].
///
/// Ends when the queue is exhausted or stalled; it is not fused, so polling
/// it again after a push yields the newly completed tokens.
#[derive(Debug)]
pub struct Keys<'a> {
    parser: &'a mut InputParser,
}

impl Iterator for Keys<'_> {
    type Item = Key;

    fn next(&mut self) -> Option<Key> {
        self.parser.next_key()
    }
}

#[inline]
const fn is_prefix(byte: u8) -> bool {
    byte == EXTENDED_PREFIX || byte == EXTENDED_PREFIX_ALT
}

fn decode_single(byte: u8) -> Option<Key> {
    let cmd = match byte {
        b'`' => Command::Switch,
        0x20..=0x7E => return Some(Key::Char(byte as char)),
        INTERRUPT_BYTE => Command::Interrupt,
        0x1B => Command::Back,
        b'\r' => Command::Ok,
        b'\t' => Command::Next,
        0x08 | 0x7F => Command::DeleteBefore,
        _ => return None,
    };
    Some(Key::Command(cmd))
}

fn decode_extended(second: u8) -> Option<Command> {
    match second {
        b'H' => Some(Command::Up),
        b'P' => Some(Command::Down),
        b'K' => Some(Command::Left),
        b'M' => Some(Command::Right),
        b'S' => Some(Command::Delete),
        _ => None,
    }
}

/// Encode a command back into the byte protocol.
///
/// Used by backends that receive structured key events and need to feed the
/// parser. Returns an empty slice for commands without an encoding.
#[must_use]
pub const fn encode_command(cmd: Command) -> &'static [u8] {
    match cmd {
        Command::Up => &[EXTENDED_PREFIX, b'H'],
        Command::Down => &[EXTENDED_PREFIX, b'P'],
        Command::Left => &[EXTENDED_PREFIX, b'K'],
        Command::Right => &[EXTENDED_PREFIX, b'M'],
        Command::Delete => &[EXTENDED_PREFIX, b'S'],
        Command::Back => &[0x1B],
        Command::Next => b"\t",
        Command::Switch => b"`",
        Command::Ok => b"\r",
        Command::DeleteBefore => &[0x08],
        Command::Interrupt => &[INTERRUPT_BYTE],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cmd(c: Command) -> Key {
        Key::Command(c)
    }

    #[test]
    fn ascii_characters_parsed() {
        let mut parser = InputParser::new();
        let keys = parser.parse(b"abc");
        assert_eq!(keys, vec![Key::Char('a'), Key::Char('b'), Key::Char('c')]);
        assert_eq!(parser.pending(), 0);
    }

    #[test]
    fn control_bytes_map_to_commands() {
        let mut parser = InputParser::new();
        let keys = parser.parse(b"\x1b\r`\t\x08\x7f\x03");
        assert_eq!(
            keys,
            vec![
                cmd(Command::Back),
                cmd(Command::Ok),
                cmd(Command::Switch),
                cmd(Command::Next),
                cmd(Command::DeleteBefore),
                cmd(Command::DeleteBefore),
                cmd(Command::Interrupt),
            ]
        );
    }

    #[test]
    fn backtick_is_switch_not_char() {
        let mut parser = InputParser::new();
        assert_eq!(parser.parse(b"`"), vec![cmd(Command::Switch)]);
    }

    #[test]
    fn extended_sequences() {
        let mut parser = InputParser::new();
        let keys = parser.parse(&[0xE0, b'H', 0xE0, b'P', 0xE0, b'K', 0xE0, b'M', 0xE0, b'S']);
        assert_eq!(
            keys,
            vec![
                cmd(Command::Up),
                cmd(Command::Down),
                cmd(Command::Left),
                cmd(Command::Right),
                cmd(Command::Delete),
            ]
        );
    }

    #[test]
    fn alternate_prefix_decodes_arrows() {
        let mut parser = InputParser::new();
        assert_eq!(parser.parse(&[0x00, b'M']), vec![cmd(Command::Right)]);
    }

    #[test]
    fn split_escape_waits_without_consuming() {
        let mut parser = InputParser::new();
        assert!(parser.parse(&[0xE0]).is_empty());
        assert_eq!(parser.pending(), 1);
        assert!(parser.is_waiting());

        assert_eq!(parser.parse(b"H"), vec![cmd(Command::Up)]);
        assert_eq!(parser.pending(), 0);
        assert!(!parser.is_waiting());
    }

    #[test]
    fn split_matches_single_push() {
        let mut whole = InputParser::new();
        let mut split = InputParser::new();

        let expected = whole.parse(&[0xE0, b'H']);
        let mut got = split.parse(&[0xE0]);
        got.extend(split.parse(b"H"));

        assert_eq!(got, expected);
    }

    #[test]
    fn tokens_before_stall_are_delivered() {
        let mut parser = InputParser::new();
        assert_eq!(parser.parse(&[b'x', 0xE0]), vec![Key::Char('x')]);
        assert_eq!(parser.parse(&[b'K', b'y']), vec![cmd(Command::Left), Key::Char('y')]);
    }

    #[test]
    fn unknown_extended_second_byte_consumes_both() {
        let mut parser = InputParser::new();
        assert!(parser.parse(&[0xE0, b'Z']).is_empty());
        assert_eq!(parser.pending(), 0);
        // 'Z' must not leak out as a character.
        assert_eq!(parser.parse(b"a"), vec![Key::Char('a')]);
    }

    #[test]
    fn unknown_bytes_are_ignored() {
        let mut parser = InputParser::new();
        assert_eq!(parser.parse(&[0x01, 0x80, 0xFF, b'q']), vec![Key::Char('q')]);
    }

    #[test]
    fn keys_iterator_resumes_after_push() {
        let mut parser = InputParser::new();
        parser.push(b"a");
        assert_eq!(parser.keys().count(), 1);
        assert_eq!(parser.keys().next(), None);
        parser.push(b"b");
        assert_eq!(parser.keys().next(), Some(Key::Char('b')));
    }

    #[test]
    fn clear_drops_pending_prefix() {
        let mut parser = InputParser::new();
        parser.push(&[0xE0]);
        parser.clear();
        assert_eq!(parser.parse(b"H"), vec![Key::Char('H')]);
    }

    #[test]
    fn encode_round_trips_through_decoder() {
        for c in [
            Command::Up,
            Command::Down,
            Command::Left,
            Command::Right,
            Command::Delete,
            Command::Back,
            Command::Next,
            Command::Switch,
            Command::Ok,
            Command::DeleteBefore,
            Command::Interrupt,
        ] {
            let mut parser = InputParser::new();
            assert_eq!(parser.parse(encode_command(c)), vec![cmd(c)], "{c}");
        }
    }
}
