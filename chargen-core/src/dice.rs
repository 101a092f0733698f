//! Dice rolling.
//!
//! Every probabilistic rule (ability rolls, hit points, starting gold,
//! random race/class picks) draws from a [`Roller`]. Production code uses
//! [`Dice`], a seeded ChaCha generator; tests substitute
//! [`crate::testing::ScriptedDice`].

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::fmt;
use thiserror::Error;

/// Error type for dice lookups.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DiceError {
    #[error("Invalid die size: {0}")]
    InvalidDieSize(u32),
}

/// Hit-die sizes used by races and classes.
///
/// Variants are ordered by size, so `min` picks the smaller die.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DieType {
    D2,
    D4,
    D6,
    D8,
    D10,
    D12,
}

impl DieType {
    pub fn sides(&self) -> u32 {
        match self {
            DieType::D2 => 2,
            DieType::D4 => 4,
            DieType::D6 => 6,
            DieType::D8 => 8,
            DieType::D10 => 10,
            DieType::D12 => 12,
        }
    }

    pub fn from_sides(sides: u32) -> Result<DieType, DiceError> {
        match sides {
            2 => Ok(DieType::D2),
            4 => Ok(DieType::D4),
            6 => Ok(DieType::D6),
            8 => Ok(DieType::D8),
            10 => Ok(DieType::D10),
            12 => Ok(DieType::D12),
            _ => Err(DiceError::InvalidDieSize(sides)),
        }
    }
}

impl fmt::Display for DieType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "d{}", self.sides())
    }
}

/// A source of die rolls.
pub trait Roller {
    /// Roll a single die, returning a value in `1..=sides`.
    fn roll_die(&mut self, sides: u32) -> u32;

    /// Sum of `count` independent rolls of a `sides`-sided die.
    fn roll_dice(&mut self, count: u32, sides: u32) -> u32 {
        (0..count).map(|_| self.roll_die(sides)).sum()
    }

    /// Pick an index in `0..len` uniformly. Returns `None` for an empty range.
    fn pick_index(&mut self, len: usize) -> Option<usize> {
        if len == 0 {
            return None;
        }
        Some(self.roll_die(len as u32) as usize - 1)
    }
}

impl<R: Roller + ?Sized> Roller for &mut R {
    fn roll_die(&mut self, sides: u32) -> u32 {
        (**self).roll_die(sides)
    }
}

/// Seeded production roller.
///
/// Only the seed is serialized; deserializing restarts the stream from it.
#[derive(Debug, Clone)]
pub struct Dice {
    rng: ChaCha8Rng,
    seed: u64,
}

impl Dice {
    /// Create a roller with the given seed.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    /// Create a roller with a random seed.
    pub fn from_entropy() -> Self {
        Self::new(rand::random())
    }

    /// The seed this roller was created with.
    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl Roller for Dice {
    fn roll_die(&mut self, sides: u32) -> u32 {
        if sides == 0 {
            return 0;
        }
        self.rng.gen_range(1..=sides)
    }
}

impl Serialize for Dice {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.seed.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Dice {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let seed = u64::deserialize(deserializer)?;
        Ok(Dice::new(seed))
    }
}

thread_local! {
    static THREAD_DICE: RefCell<Dice> = RefCell::new(Dice::from_entropy());
}

/// Roll `count` dice of `sides` sides on the thread's entropy-seeded roller.
pub fn roll_dice(count: u32, sides: u32) -> u32 {
    THREAD_DICE.with(|dice| dice.borrow_mut().roll_dice(count, sides))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roll_range() {
        let mut dice = Dice::new(7);
        for _ in 0..500 {
            let total = dice.roll_dice(3, 6);
            assert!((3..=18).contains(&total));
        }
    }

    #[test]
    fn test_same_seed_same_rolls() {
        let mut a = Dice::new(42);
        let mut b = Dice::new(42);
        let left: Vec<u32> = (0..20).map(|_| a.roll_die(20)).collect();
        let right: Vec<u32> = (0..20).map(|_| b.roll_die(20)).collect();
        assert_eq!(left, right);
    }

    #[test]
    fn test_zero_dice() {
        let mut dice = Dice::new(1);
        assert_eq!(dice.roll_dice(0, 6), 0);
        assert_eq!(dice.roll_die(0), 0);
    }

    #[test]
    fn test_pick_index() {
        let mut dice = Dice::new(3);
        assert_eq!(dice.pick_index(0), None);
        for _ in 0..100 {
            let i = dice.pick_index(4).unwrap();
            assert!(i < 4);
        }
    }

    #[test]
    fn test_die_type_ordering() {
        assert_eq!(DieType::D8.min(DieType::D6), DieType::D6);
        assert_eq!(DieType::from_sides(4), Ok(DieType::D4));
        assert_eq!(DieType::from_sides(7), Err(DiceError::InvalidDieSize(7)));
        assert_eq!(DieType::D10.to_string(), "d10");
    }

    #[test]
    fn test_seed_round_trip() {
        let dice = Dice::new(99);
        let json = serde_json::to_string(&dice).unwrap();
        let restored: Dice = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.seed(), 99);
    }

    #[test]
    fn test_thread_roller() {
        for _ in 0..100 {
            let total = roll_dice(1, 8);
            assert!((1..=8).contains(&total));
        }
    }
}
