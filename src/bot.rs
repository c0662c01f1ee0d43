//! Demo input collaborator: a seeded random button masher
//!
//! Sends the same samples a pad adapter would. Knows the motion inputs but
//! nothing about the simulation beyond the published frame.

use std::collections::VecDeque;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::game::input::{Button, InputSymbol};
use crate::game::runner::Controller;
use crate::game::snapshot::FrameResult;
use crate::game::FighterId;

type Sample = Vec<InputSymbol>;

pub struct Bot {
    rng: ChaCha8Rng,
    plan: VecDeque<Sample>,
}

impl Bot {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            plan: VecDeque::new(),
        }
    }

    /// Separate, reproducible streams for both fighters from one seed
    pub fn pair(seed: u64) -> [Bot; 2] {
        [Bot::new(seed), Bot::new(seed.wrapping_add(0x9E37_79B9))]
    }

    fn hold(&mut self, sample: Sample, frames: u32) {
        for _ in 0..frames {
            self.plan.push_back(sample.clone());
        }
    }

    fn plan_next(&mut self, facing: i8) {
        let (forward, back) = if facing >= 0 {
            (InputSymbol::Right, InputSymbol::Left)
        } else {
            (InputSymbol::Left, InputSymbol::Right)
        };
        let punch = InputSymbol::Button(Button::PUNCHES[self.rng.gen_range(0..Button::PUNCHES.len())]);

        match self.rng.gen_range(0..10) {
            0 | 1 => {
                let frames = self.rng.gen_range(10..40);
                self.hold(vec![forward], frames);
            }
            2 => {
                let frames = self.rng.gen_range(5..20);
                self.hold(vec![back], frames);
            }
            3 => {
                self.hold(vec![InputSymbol::Up], 1);
                self.hold(Vec::new(), 30);
            }
            4 => {
                let frames = self.rng.gen_range(10..40);
                self.hold(vec![InputSymbol::Down], frames);
            }
            5 | 6 => {
                let button = Button::ALL[self.rng.gen_range(0..Button::ALL.len())];
                let frames = self.rng.gen_range(1..6);
                self.hold(vec![InputSymbol::Button(button)], frames);
                self.hold(Vec::new(), 1);
            }
            7 => {
                // Quarter circle forward or dragon punch
                if self.rng.gen_bool(0.5) {
                    self.hold(vec![InputSymbol::Down], 2);
                    self.hold(vec![forward], 1);
                    self.hold(vec![forward, punch], 1);
                } else {
                    self.hold(vec![forward], 1);
                    self.hold(vec![InputSymbol::Down], 1);
                    self.hold(vec![forward, punch], 1);
                }
                self.hold(Vec::new(), 2);
            }
            8 => {
                self.hold(vec![InputSymbol::Down], 2);
                self.hold(vec![back, punch], 1);
                self.hold(Vec::new(), 2);
            }
            _ => {
                let frames = self.rng.gen_range(40..150);
                self.hold(vec![InputSymbol::Button(Button::HeavyPunch)], frames);
                self.hold(Vec::new(), 1);
            }
        }
    }
}

impl Controller for Bot {
    fn sample(&mut self, fighter: FighterId, last: Option<&FrameResult>) -> Vec<InputSymbol> {
        let facing = last.map_or(fighter.default_facing(), |frame| frame.fighter(fighter).facing);
        if self.plan.is_empty() {
            self.plan_next(facing);
        }
        self.plan.pop_front().unwrap_or_default()
    }
}
