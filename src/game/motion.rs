//! Motion input recognition over an input buffer

use super::attack::AttackId;
use super::input::{Button, InputBuffer, InputSymbol};

/// How many of the most recent buffer entries a motion scan looks at
pub const MOTION_SCAN_WINDOW: usize = 10;

/// Ordered directional sequence plus the buttons that may complete it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MotionDefinition {
    pub directions: Vec<InputSymbol>,
    pub buttons: Vec<Button>,
}

impl MotionDefinition {
    pub fn new(directions: Vec<InputSymbol>, buttons: Vec<Button>) -> Self {
        Self {
            directions,
            buttons,
        }
    }

    /// The same motion performed facing left
    pub fn mirrored(&self) -> Self {
        Self {
            directions: self.directions.iter().map(|d| d.mirrored()).collect(),
            buttons: self.buttons.clone(),
        }
    }

    /// Scan the last `window` entries once, oldest first.
    ///
    /// A cursor over `directions` advances only on an exact match with the next
    /// expected symbol; a trigger button anywhere in the scanned range counts,
    /// whether it came before, between or after the directions.
    pub fn matches(&self, buffer: &InputBuffer, window: usize) -> bool {
        let mut cursor = 0;
        let mut button_seen = false;

        for event in buffer.recent(window) {
            if cursor < self.directions.len() && event.symbol == self.directions[cursor] {
                cursor += 1;
            }
            if let InputSymbol::Button(button) = event.symbol {
                if self.buttons.contains(&button) {
                    button_seen = true;
                }
            }
        }

        cursor == self.directions.len() && button_seen
    }
}

/// A special move: motion authored facing right, and the attack it performs
#[derive(Debug, Clone)]
pub struct SpecialMove {
    pub attack: AttackId,
    pub motion: MotionDefinition,
}

/// Ordered list of special moves; the first match wins
#[derive(Debug, Clone)]
pub struct MotionRecognizer {
    moves: Vec<SpecialMove>,
    window: usize,
}

impl MotionRecognizer {
    pub fn new(moves: Vec<SpecialMove>, window: usize) -> Self {
        Self { moves, window }
    }

    /// Shoryuken before Hadouken: `[Down, Right]` is a subsequence of
    /// `[Right, Down, Right]`, so the longer motion has to be tried first.
    pub fn standard() -> Self {
        use InputSymbol::{Down, Left, Right};
        let punches = Button::PUNCHES.to_vec();
        Self::new(
            vec![
                SpecialMove {
                    attack: AttackId::Shoryuken,
                    motion: MotionDefinition::new(vec![Right, Down, Right], punches.clone()),
                },
                SpecialMove {
                    attack: AttackId::Hadouken,
                    motion: MotionDefinition::new(vec![Down, Right], punches.clone()),
                },
                SpecialMove {
                    attack: AttackId::Tatsumaki,
                    motion: MotionDefinition::new(vec![Down, Left], punches),
                },
            ],
            MOTION_SCAN_WINDOW,
        )
    }

    /// First special move recognized in the buffer for a fighter facing `facing`
    pub fn recognize(&self, buffer: &InputBuffer, facing: i8) -> Option<AttackId> {
        self.moves
            .iter()
            .find(|special| {
                if facing >= 0 {
                    special.motion.matches(buffer, self.window)
                } else {
                    special.motion.mirrored().matches(buffer, self.window)
                }
            })
            .map(|special| special.attack)
    }
}

impl Default for MotionRecognizer {
    fn default() -> Self {
        Self::standard()
    }
}
