//! Keyboard input.
//!
//! Backends are polled once per frame and never block: no key is simply
//! `None`. The [`InputManager`] turns every key read into a keyboard event.
//!
//! # Examples
//!
//! ```
//! use glyph_engine::builtin::{InputBackend, KeyCode, ScriptedInput};
//!
//! let mut input = ScriptedInput::new([KeyCode::Char('w'), KeyCode::Space]);
//! assert_eq!(input.poll_key(), Some(KeyCode::Char('w')));
//! assert_eq!(input.poll_key(), Some(KeyCode::Space));
//! assert_eq!(input.poll_key(), None);
//! ```

use crate::error::Result;
use crate::event::Event;
use crate::subsystem::Subsystem;
use crate::world::WorldManager;
use crossbeam::channel::{self, Receiver, TryRecvError};
use std::collections::VecDeque;
use std::io::Read;
use tracing::{debug, info, trace};

/// Keys delivered in keyboard events
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// Printable character (letters keep their case)
    Char(char),
    Space,
    Enter,
    Tab,
    Backspace,
    Escape,
    Up,
    Down,
    Left,
    Right,
    Undefined,
}

impl KeyCode {
    /// Decode a single input byte
    pub fn from_byte(byte: u8) -> Self {
        match byte {
            b' ' => KeyCode::Space,
            b'\n' | b'\r' => KeyCode::Enter,
            b'\t' => KeyCode::Tab,
            0x08 | 0x7f => KeyCode::Backspace,
            0x1b => KeyCode::Escape,
            0x21..=0x7e => KeyCode::Char(byte as char),
            _ => KeyCode::Undefined,
        }
    }

    /// Final byte of a CSI sequence; modifiers on arrows are ignored
    fn from_csi(byte: u8) -> Self {
        match byte {
            b'A' => KeyCode::Up,
            b'B' => KeyCode::Down,
            b'C' => KeyCode::Right,
            b'D' => KeyCode::Left,
            _ => KeyCode::Undefined,
        }
    }
}

/// Non-blocking key source
pub trait InputBackend {
    fn start_up(&mut self) -> Result<()> {
        Ok(())
    }

    fn shut_down(&mut self) {}

    /// Next pending key, if any
    fn poll_key(&mut self) -> Option<KeyCode>;
}

/// Replays a fixed key sequence, one key per poll
#[derive(Clone, Debug, Default)]
pub struct ScriptedInput {
    keys: VecDeque<KeyCode>,
}

impl ScriptedInput {
    pub fn new<I: IntoIterator<Item = KeyCode>>(keys: I) -> Self {
        Self {
            keys: keys.into_iter().collect(),
        }
    }

    pub fn push(&mut self, key: KeyCode) {
        self.keys.push_back(key);
    }

    pub fn remaining(&self) -> usize {
        self.keys.len()
    }
}

impl InputBackend for ScriptedInput {
    fn poll_key(&mut self) -> Option<KeyCode> {
        self.keys.pop_front()
    }
}

/// Bytes arriving on a channel, typically fed by a stdin reader thread
pub struct ChannelInput {
    receiver: Receiver<u8>,
    /// Byte read while looking past an escape, returned by the next poll
    pending: Option<u8>,
}

impl ChannelInput {
    pub fn from_receiver(receiver: Receiver<u8>) -> Self {
        Self {
            receiver,
            pending: None,
        }
    }

    fn next_byte(&mut self) -> Option<u8> {
        if let Some(byte) = self.pending.take() {
            return Some(byte);
        }
        match self.receiver.try_recv() {
            Ok(byte) => Some(byte),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }

    /// Consume the rest of an `ESC [` sequence up to its final byte
    fn read_csi(&mut self) -> KeyCode {
        while let Some(byte) = self.next_byte() {
            match byte {
                0x20..=0x3f => continue,
                0x40..=0x7e => return KeyCode::from_csi(byte),
                _ => {
                    trace!(byte, "malformed escape sequence");
                    self.pending = Some(byte);
                    return KeyCode::Undefined;
                }
            }
        }
        KeyCode::Undefined
    }

    /// Spawn a thread copying stdin bytes into the channel.
    ///
    /// The terminal stays in whatever mode it is in; line-buffered terminals
    /// deliver keys after Enter.
    pub fn stdin() -> Result<Self> {
        let (sender, receiver) = channel::unbounded();
        std::thread::Builder::new()
            .name("glyph-stdin".to_string())
            .spawn(move || {
                let mut stdin = std::io::stdin().lock();
                let mut byte = [0u8; 1];
                while let Ok(1) = stdin.read(&mut byte) {
                    if sender.send(byte[0]).is_err() {
                        break;
                    }
                }
                debug!("stdin reader finished");
            })?;
        Ok(Self::from_receiver(receiver))
    }
}

impl InputBackend for ChannelInput {
    fn poll_key(&mut self) -> Option<KeyCode> {
        let byte = self.next_byte()?;
        if byte != 0x1b {
            return Some(KeyCode::from_byte(byte));
        }
        match self.next_byte() {
            Some(b'[') => Some(self.read_csi()),
            Some(other) => {
                self.pending = Some(other);
                Some(KeyCode::Escape)
            }
            None => Some(KeyCode::Escape),
        }
    }
}

/// Maximum keys turned into events per frame
pub const MAX_KEYS_PER_FRAME: usize = 16;

/// Polls an [`InputBackend`] and dispatches keyboard events
pub struct InputManager {
    backend: Box<dyn InputBackend>,
    started: bool,
    keys_read: u64,
}

impl InputManager {
    pub fn new(backend: Box<dyn InputBackend>) -> Self {
        Self {
            backend,
            started: false,
            keys_read: 0,
        }
    }

    /// Read pending keys and dispatch one keyboard event per key.
    ///
    /// Returns the number of keys read.
    pub fn get_input(&mut self, world: &mut WorldManager) -> usize {
        if !self.started {
            return 0;
        }
        let mut read = 0;
        while read < MAX_KEYS_PER_FRAME {
            let Some(key) = self.backend.poll_key() else {
                break;
            };
            read += 1;
            trace!(?key, "key");
            world.dispatch(&Event::Keyboard { key });
        }
        self.keys_read += read as u64;
        read
    }

    pub fn keys_read(&self) -> u64 {
        self.keys_read
    }
}

impl Subsystem for InputManager {
    fn name(&self) -> &'static str {
        "InputManager"
    }

    fn start_up(&mut self) -> Result<()> {
        self.backend.start_up()?;
        self.started = true;
        info!("input manager started");
        Ok(())
    }

    fn shut_down(&mut self) {
        if self.started {
            self.backend.shut_down();
            self.started = false;
            info!("input manager shut down");
        }
    }

    fn is_started(&self) -> bool {
        self.started
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_byte() {
        assert_eq!(KeyCode::from_byte(b'q'), KeyCode::Char('q'));
        assert_eq!(KeyCode::from_byte(b'Q'), KeyCode::Char('Q'));
        assert_eq!(KeyCode::from_byte(b' '), KeyCode::Space);
        assert_eq!(KeyCode::from_byte(b'\n'), KeyCode::Enter);
        assert_eq!(KeyCode::from_byte(0x7f), KeyCode::Backspace);
        assert_eq!(KeyCode::from_byte(0x01), KeyCode::Undefined);
    }

    #[test]
    fn test_channel_arrow_keys() {
        let (sender, receiver) = channel::unbounded();
        let mut input = ChannelInput::from_receiver(receiver);
        for byte in [0x1b, b'[', b'A', b'x', 0x1b] {
            sender.send(byte).unwrap();
        }
        assert_eq!(input.poll_key(), Some(KeyCode::Up));
        assert_eq!(input.poll_key(), Some(KeyCode::Char('x')));
        assert_eq!(input.poll_key(), Some(KeyCode::Escape));
        assert_eq!(input.poll_key(), None);

        drop(sender);
        assert_eq!(input.poll_key(), None);
    }

    #[test]
    fn test_escape_keeps_following_key() {
        let (sender, receiver) = channel::unbounded();
        let mut input = ChannelInput::from_receiver(receiver);
        for byte in [0x1b, b'q', 0x1b, 0x1b] {
            sender.send(byte).unwrap();
        }
        assert_eq!(input.poll_key(), Some(KeyCode::Escape));
        assert_eq!(input.poll_key(), Some(KeyCode::Char('q')));
        assert_eq!(input.poll_key(), Some(KeyCode::Escape));
        assert_eq!(input.poll_key(), Some(KeyCode::Escape));
        assert_eq!(input.poll_key(), None);
    }

    #[test]
    fn test_long_csi_sequence_is_one_key() {
        let (sender, receiver) = channel::unbounded();
        let mut input = ChannelInput::from_receiver(receiver);
        // ctrl-Up, then page-up, then a plain key
        for byte in [0x1b, b'[', b'1', b';', b'5', b'A', 0x1b, b'[', b'5', b'~', b'z'] {
            sender.send(byte).unwrap();
        }
        assert_eq!(input.poll_key(), Some(KeyCode::Up));
        assert_eq!(input.poll_key(), Some(KeyCode::Undefined));
        assert_eq!(input.poll_key(), Some(KeyCode::Char('z')));
        assert_eq!(input.poll_key(), None);
    }

    #[test]
    fn test_manager_requires_start() {
        let mut world = WorldManager::default();
        let mut input = InputManager::new(Box::new(ScriptedInput::new([KeyCode::Space])));
        assert_eq!(input.get_input(&mut world), 0);

        input.start_up().unwrap();
        assert_eq!(input.get_input(&mut world), 1);
        assert_eq!(input.get_input(&mut world), 0);
        assert_eq!(input.keys_read(), 1);
    }
}
