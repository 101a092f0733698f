//! Ability scores and their modifiers.

use crate::dice::Roller;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Extra Intelligence modifier granted to every character for language aptitude.
pub const INTELLIGENCE_LANGUAGE_BONUS: i8 = 1;

/// The six ability scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Ability {
    Strength,
    Dexterity,
    Constitution,
    Intelligence,
    Wisdom,
    Charisma,
}

impl Ability {
    pub fn abbreviation(&self) -> &'static str {
        match self {
            Ability::Strength => "STR",
            Ability::Dexterity => "DEX",
            Ability::Constitution => "CON",
            Ability::Intelligence => "INT",
            Ability::Wisdom => "WIS",
            Ability::Charisma => "CHA",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Ability::Strength => "Strength",
            Ability::Dexterity => "Dexterity",
            Ability::Constitution => "Constitution",
            Ability::Intelligence => "Intelligence",
            Ability::Wisdom => "Wisdom",
            Ability::Charisma => "Charisma",
        }
    }

    pub fn all() -> [Ability; 6] {
        [
            Ability::Strength,
            Ability::Dexterity,
            Ability::Constitution,
            Ability::Intelligence,
            Ability::Wisdom,
            Ability::Charisma,
        ]
    }
}

impl fmt::Display for Ability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.abbreviation())
    }
}

/// Modifier for a base score: 3 → -3, 4-5 → -2, 6-8 → -1, 9-12 → 0,
/// 13-15 → +1, 16-17 → +2, 18 → +3.
pub fn modifier_for(base: u8) -> i8 {
    match base {
        0..=3 => -3,
        4..=5 => -2,
        6..=8 => -1,
        9..=12 => 0,
        13..=15 => 1,
        16..=17 => 2,
        _ => 3,
    }
}

/// A single ability: the rolled base and its derived modifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilityScore {
    pub base: u8,
    pub modifier: i8,
}

impl AbilityScore {
    /// Score whose modifier comes straight from the table.
    pub fn from_base(base: u8) -> Self {
        Self {
            base,
            modifier: modifier_for(base),
        }
    }
}

/// Roll 3d6 for one ability.
pub fn roll_ability_score(roller: &mut impl Roller) -> AbilityScore {
    let base = roller.roll_dice(3, 6) as u8;
    AbilityScore::from_base(base)
}

/// All six abilities of a character.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Abilities {
    pub strength: AbilityScore,
    pub dexterity: AbilityScore,
    pub constitution: AbilityScore,
    pub intelligence: AbilityScore,
    pub wisdom: AbilityScore,
    pub charisma: AbilityScore,
}

impl Abilities {
    /// Build from base scores in STR, DEX, CON, INT, WIS, CHA order.
    ///
    /// Modifiers come from the table and Intelligence gets the language
    /// bonus, exactly as [`build_ability_dictionary`] produces them.
    pub fn from_bases(str: u8, dex: u8, con: u8, int: u8, wis: u8, cha: u8) -> Self {
        let mut abilities = Self {
            strength: AbilityScore::from_base(str),
            dexterity: AbilityScore::from_base(dex),
            constitution: AbilityScore::from_base(con),
            intelligence: AbilityScore::from_base(int),
            wisdom: AbilityScore::from_base(wis),
            charisma: AbilityScore::from_base(cha),
        };
        abilities.intelligence.modifier += INTELLIGENCE_LANGUAGE_BONUS;
        abilities
    }

    pub fn get(&self, ability: Ability) -> AbilityScore {
        match ability {
            Ability::Strength => self.strength,
            Ability::Dexterity => self.dexterity,
            Ability::Constitution => self.constitution,
            Ability::Intelligence => self.intelligence,
            Ability::Wisdom => self.wisdom,
            Ability::Charisma => self.charisma,
        }
    }

    pub fn base(&self, ability: Ability) -> u8 {
        self.get(ability).base
    }

    pub fn modifier(&self, ability: Ability) -> i8 {
        self.get(ability).modifier
    }

    fn slot_mut(&mut self, ability: Ability) -> &mut AbilityScore {
        match ability {
            Ability::Strength => &mut self.strength,
            Ability::Dexterity => &mut self.dexterity,
            Ability::Constitution => &mut self.constitution,
            Ability::Intelligence => &mut self.intelligence,
            Ability::Wisdom => &mut self.wisdom,
            Ability::Charisma => &mut self.charisma,
        }
    }

    /// Whether this set unlocks interactive language selection.
    pub fn language_flag(&self) -> bool {
        self.intelligence.modifier >= 1
    }
}

impl Default for Abilities {
    fn default() -> Self {
        Self::from_bases(10, 10, 10, 10, 10, 10)
    }
}

/// Roll all six abilities in order, then apply the Intelligence language
/// bonus to the modifier. The base score is left untouched.
pub fn build_ability_dictionary(roller: &mut impl Roller) -> Abilities {
    let mut abilities = Abilities::default();
    for ability in Ability::all() {
        *abilities.slot_mut(ability) = roll_ability_score(roller);
    }
    abilities.intelligence.modifier += INTELLIGENCE_LANGUAGE_BONUS;
    abilities
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dice::Dice;
    use crate::testing::ScriptedDice;

    #[test]
    fn test_modifier_boundaries() {
        let expected = [
            (3, -3),
            (4, -2),
            (5, -2),
            (6, -1),
            (8, -1),
            (9, 0),
            (12, 0),
            (13, 1),
            (15, 1),
            (16, 2),
            (17, 2),
            (18, 3),
        ];
        for (base, modifier) in expected {
            assert_eq!(modifier_for(base), modifier, "base {base}");
        }
    }

    #[test]
    fn test_roll_ability_score_range() {
        let mut dice = Dice::new(11);
        for _ in 0..200 {
            let score = roll_ability_score(&mut dice);
            assert!((3..=18).contains(&score.base));
            assert_eq!(score.modifier, modifier_for(score.base));
        }
    }

    #[test]
    fn test_intelligence_bonus_leaves_base_alone() {
        // Every die shows 4, so every base is 12 with a table modifier of 0.
        let mut dice = ScriptedDice::constant(4);
        let abilities = build_ability_dictionary(&mut dice);

        assert_eq!(abilities.intelligence.base, 12);
        assert_eq!(abilities.intelligence.modifier, 1);
        assert_eq!(abilities.wisdom.base, 12);
        assert_eq!(abilities.wisdom.modifier, 0);
    }

    #[test]
    fn test_rolls_in_ability_order() {
        let mut dice = ScriptedDice::new(vec![
            1, 1, 1, // STR 3
            6, 6, 6, // DEX 18
            3, 3, 3, // CON 9
            2, 2, 2, // INT 6
            5, 5, 5, // WIS 15
            4, 4, 5, // CHA 13
        ]);
        let abilities = build_ability_dictionary(&mut dice);

        assert_eq!(abilities.strength, AbilityScore { base: 3, modifier: -3 });
        assert_eq!(abilities.dexterity, AbilityScore { base: 18, modifier: 3 });
        assert_eq!(abilities.constitution.base, 9);
        assert_eq!(abilities.intelligence, AbilityScore { base: 6, modifier: 0 });
        assert_eq!(abilities.wisdom.modifier, 1);
        assert_eq!(abilities.charisma.base, 13);
    }

    #[test]
    fn test_language_flag() {
        assert!(Abilities::from_bases(10, 10, 10, 9, 10, 10).language_flag());
        assert!(!Abilities::from_bases(10, 10, 10, 8, 10, 10).language_flag());
    }
}
