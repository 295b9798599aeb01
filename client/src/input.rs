//! Raw keyboard transitions and their relay to the server

use crate::error::ClientError;
use crate::network::TransportSession;
use log::trace;
use macroquad::input::utils::{register_input_subscriber, repeat_all_miniquad_input};
use macroquad::input::KeyCode;
use macroquad::miniquad::{EventHandler, KeyMods};
use shared::ClientMessage;

/// A key starting or stopping being held. Auto-repeat produces repeated `Began`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyTransition {
    Began(String),
    Ended(String),
}

/// Forwards every key transition verbatim; the server decides what held keys mean.
#[derive(Debug, Default)]
pub struct InputRelay {
    armed: bool,
}

impl InputRelay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arm(&mut self) {
        self.armed = true;
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Sends the transition if the relay is armed. Returns whether a message went out.
    pub fn relay(
        &self,
        transition: &KeyTransition,
        session: &TransportSession,
    ) -> Result<bool, ClientError> {
        if !self.armed {
            trace!("Relay not armed, dropping {:?}", transition);
            return Ok(false);
        }

        let message = match transition {
            KeyTransition::Began(key) => ClientMessage::KeyDown {
                keydown: key.clone(),
            },
            KeyTransition::Ended(key) => ClientMessage::KeyUp { keyup: key.clone() },
        };
        session.send(&message)?;
        Ok(true)
    }
}

/// Collects key transitions from the window, including auto-repeat.
pub struct KeyboardListener {
    subscriber: usize,
    buffer: TransitionBuffer,
}

impl KeyboardListener {
    pub fn new() -> Self {
        Self {
            subscriber: register_input_subscriber(),
            buffer: TransitionBuffer::default(),
        }
    }

    /// Returns every transition since the last call, oldest first.
    pub fn drain(&mut self) -> Vec<KeyTransition> {
        repeat_all_miniquad_input(&mut self.buffer, self.subscriber);
        std::mem::take(&mut self.buffer.transitions)
    }
}

impl Default for KeyboardListener {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Default)]
struct TransitionBuffer {
    transitions: Vec<KeyTransition>,
}

impl EventHandler for TransitionBuffer {
    fn update(&mut self) {}

    fn draw(&mut self) {}

    fn key_down_event(&mut self, keycode: KeyCode, _keymods: KeyMods, _repeat: bool) {
        self.transitions.push(KeyTransition::Began(key_name(keycode)));
    }

    fn key_up_event(&mut self, keycode: KeyCode, _keymods: KeyMods) {
        self.transitions.push(KeyTransition::Ended(key_name(keycode)));
    }
}

/// Names keys the way browsers report `KeyboardEvent.key`.
pub fn key_name(keycode: KeyCode) -> String {
    let name = match keycode {
        KeyCode::Left => "ArrowLeft",
        KeyCode::Right => "ArrowRight",
        KeyCode::Up => "ArrowUp",
        KeyCode::Down => "ArrowDown",
        KeyCode::Space => " ",
        KeyCode::Enter | KeyCode::KpEnter => "Enter",
        KeyCode::Escape => "Escape",
        KeyCode::Tab => "Tab",
        KeyCode::Backspace => "Backspace",
        KeyCode::LeftShift | KeyCode::RightShift => "Shift",
        KeyCode::LeftControl | KeyCode::RightControl => "Control",
        KeyCode::LeftAlt | KeyCode::RightAlt => "Alt",
        KeyCode::A => "a",
        KeyCode::B => "b",
        KeyCode::C => "c",
        KeyCode::D => "d",
        KeyCode::E => "e",
        KeyCode::F => "f",
        KeyCode::G => "g",
        KeyCode::H => "h",
        KeyCode::I => "i",
        KeyCode::J => "j",
        KeyCode::K => "k",
        KeyCode::L => "l",
        KeyCode::M => "m",
        KeyCode::N => "n",
        KeyCode::O => "o",
        KeyCode::P => "p",
        KeyCode::Q => "q",
        KeyCode::R => "r",
        KeyCode::S => "s",
        KeyCode::T => "t",
        KeyCode::U => "u",
        KeyCode::V => "v",
        KeyCode::W => "w",
        KeyCode::X => "x",
        KeyCode::Y => "y",
        KeyCode::Z => "z",
        KeyCode::Key0 => "0",
        KeyCode::Key1 => "1",
        KeyCode::Key2 => "2",
        KeyCode::Key3 => "3",
        KeyCode::Key4 => "4",
        KeyCode::Key5 => "5",
        KeyCode::Key6 => "6",
        KeyCode::Key7 => "7",
        KeyCode::Key8 => "8",
        KeyCode::Key9 => "9",
        other => return format!("{:?}", other),
    };
    name.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::SessionEvent;

    #[test]
    fn test_key_names_follow_browser_convention() {
        assert_eq!(key_name(KeyCode::Left), "ArrowLeft");
        assert_eq!(key_name(KeyCode::Q), "q");
        assert_eq!(key_name(KeyCode::W), "w");
        assert_eq!(key_name(KeyCode::Space), " ");
        assert_eq!(key_name(KeyCode::Key7), "7");
        assert_eq!(key_name(KeyCode::F5), "F5");
    }

    #[test]
    fn test_press_and_release_each_send_one_message() {
        let (mut session, mut peer) = TransportSession::loopback();
        peer.open();
        assert_eq!(session.poll(), Some(SessionEvent::Ready));

        let mut relay = InputRelay::new();
        relay.arm();

        assert!(relay
            .relay(&KeyTransition::Began("ArrowLeft".to_string()), &session)
            .unwrap());
        assert_eq!(peer.sent(), vec![r#"{"keydown":"ArrowLeft"}"#.to_string()]);

        assert!(relay
            .relay(&KeyTransition::Ended("ArrowLeft".to_string()), &session)
            .unwrap());
        assert_eq!(peer.sent(), vec![r#"{"keyup":"ArrowLeft"}"#.to_string()]);
    }

    #[test]
    fn test_repeats_are_not_coalesced() {
        let (mut session, mut peer) = TransportSession::loopback();
        peer.open();
        session.poll();

        let mut relay = InputRelay::new();
        relay.arm();
        for _ in 0..3 {
            relay
                .relay(&KeyTransition::Began("q".to_string()), &session)
                .unwrap();
        }

        assert_eq!(peer.sent().len(), 3);
    }

    #[test]
    fn test_unarmed_relay_is_silent() {
        let (mut session, mut peer) = TransportSession::loopback();
        peer.open();
        session.poll();

        let relay = InputRelay::new();
        assert!(!relay
            .relay(&KeyTransition::Began("w".to_string()), &session)
            .unwrap());
        assert!(peer.sent().is_empty());
    }

    #[test]
    fn test_transition_buffer_records_repeats() {
        let mut buffer = TransitionBuffer::default();
        buffer.key_down_event(KeyCode::Right, KeyMods::default(), false);
        buffer.key_down_event(KeyCode::Right, KeyMods::default(), true);
        buffer.key_up_event(KeyCode::Right, KeyMods::default());

        assert_eq!(
            buffer.transitions,
            vec![
                KeyTransition::Began("ArrowRight".to_string()),
                KeyTransition::Began("ArrowRight".to_string()),
                KeyTransition::Ended("ArrowRight".to_string()),
            ]
        );
    }
}
