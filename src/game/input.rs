//! Input symbols, the per-fighter input buffer and the per-frame held state

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// Default number of entries kept in an input buffer
pub const INPUT_BUFFER_SIZE: usize = 15;

/// Attack buttons, six-button layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Button {
    LightPunch,
    MediumPunch,
    HeavyPunch,
    LightKick,
    MediumKick,
    HeavyKick,
}

impl Button {
    pub const ALL: [Button; 6] = [
        Button::LightPunch,
        Button::MediumPunch,
        Button::HeavyPunch,
        Button::LightKick,
        Button::MediumKick,
        Button::HeavyKick,
    ];

    pub const PUNCHES: [Button; 3] = [Button::LightPunch, Button::MediumPunch, Button::HeavyPunch];

    pub fn index(self) -> usize {
        self as usize
    }
}

/// A discrete input sample: one of four directions or an attack button
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputSymbol {
    Up,
    Down,
    Left,
    Right,
    Button(Button),
}

impl InputSymbol {
    pub fn is_direction(self) -> bool {
        !matches!(self, InputSymbol::Button(_))
    }

    /// Horizontal mirror (Left <-> Right), used for facing-relative motions
    pub fn mirrored(self) -> Self {
        match self {
            InputSymbol::Left => InputSymbol::Right,
            InputSymbol::Right => InputSymbol::Left,
            other => other,
        }
    }
}

impl From<Button> for InputSymbol {
    fn from(button: Button) -> Self {
        InputSymbol::Button(button)
    }
}

/// A symbol stamped with the frame it was sampled on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputEvent {
    pub frame: u64,
    pub symbol: InputSymbol,
}

/// Bounded ring buffer of recent input events for one fighter.
///
/// Repeated symbols are kept: a held direction shows up once per sampled
/// frame, which the motion recognizer reads as dwell rather than a second press.
#[derive(Debug, Clone)]
pub struct InputBuffer {
    events: VecDeque<InputEvent>,
    capacity: usize,
}

impl InputBuffer {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            events: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append an event, evicting the oldest entries past capacity
    pub fn record(&mut self, symbol: InputSymbol, frame: u64) {
        self.events.push_back(InputEvent { frame, symbol });
        while self.events.len() > self.capacity {
            self.events.pop_front();
        }
    }

    /// The most recent `window` entries, oldest first
    pub fn recent(&self, window: usize) -> impl Iterator<Item = &InputEvent> {
        let skip = self.events.len().saturating_sub(window);
        self.events.iter().skip(skip)
    }

    pub fn iter(&self) -> impl Iterator<Item = &InputEvent> {
        self.events.iter()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl Default for InputBuffer {
    fn default() -> Self {
        Self::new(INPUT_BUFFER_SIZE)
    }
}

/// Everything a fighter is holding on one frame, folded from that frame's events
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeldInput {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    pub buttons: [bool; 6],
}

impl HeldInput {
    pub fn press(&mut self, symbol: InputSymbol) {
        match symbol {
            InputSymbol::Up => self.up = true,
            InputSymbol::Down => self.down = true,
            InputSymbol::Left => self.left = true,
            InputSymbol::Right => self.right = true,
            InputSymbol::Button(button) => self.buttons[button.index()] = true,
        }
    }

    pub fn from_symbols<I: IntoIterator<Item = InputSymbol>>(symbols: I) -> Self {
        let mut held = Self::default();
        for symbol in symbols {
            held.press(symbol);
        }
        held
    }

    pub fn button(&self, button: Button) -> bool {
        self.buttons[button.index()]
    }

    /// Horizontal axis: -1, 0 or 1. Left wins when both are held.
    pub fn horizontal(&self) -> i8 {
        if self.left {
            -1
        } else if self.right {
            1
        } else {
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_evicts_oldest() {
        let mut buffer = InputBuffer::new(3);
        for frame in 0..5 {
            buffer.record(InputSymbol::Down, frame);
        }
        assert_eq!(buffer.len(), 3);
        let frames: Vec<u64> = buffer.iter().map(|e| e.frame).collect();
        assert_eq!(frames, vec![2, 3, 4]);
    }

    #[test]
    fn test_buffer_keeps_duplicates() {
        let mut buffer = InputBuffer::default();
        buffer.record(InputSymbol::Right, 1);
        buffer.record(InputSymbol::Right, 1);
        buffer.record(InputSymbol::Right, 2);
        assert_eq!(buffer.len(), 3);
    }

    #[test]
    fn test_recent_window() {
        let mut buffer = InputBuffer::default();
        buffer.record(InputSymbol::Up, 1);
        buffer.record(InputSymbol::Down, 2);
        buffer.record(InputSymbol::Left, 3);
        let recent: Vec<InputSymbol> = buffer.recent(2).map(|e| e.symbol).collect();
        assert_eq!(recent, vec![InputSymbol::Down, InputSymbol::Left]);
        assert_eq!(buffer.recent(10).count(), 3);
    }

    #[test]
    fn test_held_input_fold() {
        let held = HeldInput::from_symbols([
            InputSymbol::Left,
            InputSymbol::Button(Button::HeavyKick),
        ]);
        assert!(held.left);
        assert!(held.button(Button::HeavyKick));
        assert!(!held.button(Button::LightPunch));
        assert_eq!(held.horizontal(), -1);
        assert_eq!(HeldInput::default().horizontal(), 0);
    }

    #[test]
    fn test_mirror() {
        assert_eq!(InputSymbol::Left.mirrored(), InputSymbol::Right);
        assert_eq!(InputSymbol::Down.mirrored(), InputSymbol::Down);
        assert!(!InputSymbol::from(Button::LightKick).is_direction());
    }
}
