//! Race and class definitions.
//!
//! Contains prerequisites, hit dice, saving throws, special abilities,
//! spell lists and languages for the four races and six classes.

use crate::abilities::{Abilities, Ability};
use crate::dice::DieType;
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Saving Throws
// ============================================================================

/// The five saving throw categories, in table order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SavingThrow {
    DeathRayOrPoison,
    MagicWands,
    ParalysisOrPetrify,
    DragonBreath,
    Spells,
}

impl SavingThrow {
    pub fn name(&self) -> &'static str {
        match self {
            SavingThrow::DeathRayOrPoison => "Death Ray or Poison",
            SavingThrow::MagicWands => "Magic Wands",
            SavingThrow::ParalysisOrPetrify => "Paralysis or Petrify",
            SavingThrow::DragonBreath => "Dragon Breath",
            SavingThrow::Spells => "Spells",
        }
    }

    pub fn all() -> [SavingThrow; 5] {
        [
            SavingThrow::DeathRayOrPoison,
            SavingThrow::MagicWands,
            SavingThrow::ParalysisOrPetrify,
            SavingThrow::DragonBreath,
            SavingThrow::Spells,
        ]
    }

    fn index(&self) -> usize {
        match self {
            SavingThrow::DeathRayOrPoison => 0,
            SavingThrow::MagicWands => 1,
            SavingThrow::ParalysisOrPetrify => 2,
            SavingThrow::DragonBreath => 3,
            SavingThrow::Spells => 4,
        }
    }
}

/// Saving throw values keyed by category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SavingThrows {
    pub death_ray_or_poison: i32,
    pub magic_wands: i32,
    pub paralysis_or_petrify: i32,
    pub dragon_breath: i32,
    pub spells: i32,
}

impl SavingThrows {
    pub fn from_array(values: [i32; 5]) -> Self {
        Self {
            death_ray_or_poison: values[0],
            magic_wands: values[1],
            paralysis_or_petrify: values[2],
            dragon_breath: values[3],
            spells: values[4],
        }
    }

    pub fn to_array(&self) -> [i32; 5] {
        [
            self.death_ray_or_poison,
            self.magic_wands,
            self.paralysis_or_petrify,
            self.dragon_breath,
            self.spells,
        ]
    }

    pub fn get(&self, throw: SavingThrow) -> i32 {
        self.to_array()[throw.index()]
    }

    /// Element-wise sum, throw by throw.
    pub fn plus(&self, other: &SavingThrows) -> SavingThrows {
        let left = self.to_array();
        let right = other.to_array();
        let mut sum = [0; 5];
        for (i, slot) in sum.iter_mut().enumerate() {
            *slot = left[i] + right[i];
        }
        SavingThrows::from_array(sum)
    }
}

// ============================================================================
// Races
// ============================================================================

/// Playable races, declared in canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RaceType {
    Human,
    Elf,
    Dwarf,
    Halfling,
}

/// An inclusive bound on one ability's base score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    AtLeast(Ability, u8),
    AtMost(Ability, u8),
}

impl Requirement {
    pub fn is_met(&self, abilities: &Abilities) -> bool {
        match *self {
            Requirement::AtLeast(ability, min) => abilities.base(ability) >= min,
            Requirement::AtMost(ability, max) => abilities.base(ability) <= max,
        }
    }
}

/// Static race data.
#[derive(Debug, Clone)]
pub struct RaceDefinition {
    pub requirements: &'static [Requirement],
    /// Largest hit die the race may use; `None` means unbounded.
    pub max_hit_die: Option<DieType>,
    pub specials: &'static [&'static str],
    pub saving_throw_bonuses: SavingThrows,
    pub languages: &'static [&'static str],
}

impl RaceType {
    pub fn name(&self) -> &'static str {
        match self {
            RaceType::Human => "Human",
            RaceType::Elf => "Elf",
            RaceType::Dwarf => "Dwarf",
            RaceType::Halfling => "Halfling",
        }
    }

    pub fn all() -> &'static [RaceType] {
        &[
            RaceType::Human,
            RaceType::Elf,
            RaceType::Dwarf,
            RaceType::Halfling,
        ]
    }

    /// Look up a race by its display name (case-insensitive).
    pub fn from_name(name: &str) -> Option<RaceType> {
        Self::all()
            .iter()
            .copied()
            .find(|r| r.name().eq_ignore_ascii_case(name.trim()))
    }

    /// Get race data for character creation.
    pub fn data(&self) -> RaceDefinition {
        match self {
            RaceType::Human => RaceDefinition {
                requirements: &[],
                max_hit_die: None,
                specials: &["+10% to all earned experience"],
                saving_throw_bonuses: SavingThrows::default(),
                languages: &["Common"],
            },
            RaceType::Elf => RaceDefinition {
                requirements: &[
                    Requirement::AtLeast(Ability::Intelligence, 9),
                    Requirement::AtMost(Ability::Constitution, 17),
                ],
                max_hit_die: Some(DieType::D6),
                specials: &[
                    "Darkvision 60'",
                    "Find secret doors on 1-2 on 1d6",
                    "Immune to ghoul paralysis",
                    "Surprised only on 1 on 1d6",
                ],
                saving_throw_bonuses: SavingThrows::from_array([0, 2, 1, 0, 2]),
                languages: &["Common", "Elvish"],
            },
            RaceType::Dwarf => RaceDefinition {
                requirements: &[
                    Requirement::AtLeast(Ability::Constitution, 9),
                    Requirement::AtMost(Ability::Charisma, 17),
                ],
                max_hit_die: None,
                specials: &[
                    "Darkvision 60'",
                    "Detect slanting passages, traps, shifting walls and new construction on 1-2 on 1d6",
                ],
                saving_throw_bonuses: SavingThrows::from_array([4, 4, 4, 3, 4]),
                languages: &["Common", "Dwarvish"],
            },
            RaceType::Halfling => RaceDefinition {
                requirements: &[
                    Requirement::AtLeast(Ability::Dexterity, 9),
                    Requirement::AtMost(Ability::Strength, 17),
                ],
                max_hit_die: Some(DieType::D6),
                specials: &[
                    "+1 attack bonus with ranged weapons",
                    "+2 AC against creatures larger than man-sized",
                    "Hide 10% outdoors, 30% indoors",
                    "+1 to initiative rolls",
                ],
                saving_throw_bonuses: SavingThrows::from_array([4, 4, 4, 3, 4]),
                languages: &["Common", "Halfling"],
            },
        }
    }
}

impl fmt::Display for RaceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

// ============================================================================
// Classes
// ============================================================================

/// Character classes, declared in canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CharacterClass {
    Cleric,
    Fighter,
    MagicUser,
    Thief,
    FighterMagicUser,
    MagicUserThief,
}

/// Kind of spellcasting a class has at first level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Spellcasting {
    /// Prays for spells; no spellbook.
    Divine,
    /// Learns spells from a spellbook that starts with Read Magic.
    Arcane,
}

/// Static class data.
#[derive(Debug, Clone)]
pub struct ClassDefinition {
    pub requirements: &'static [Requirement],
    pub hit_die: DieType,
    pub xp_to_next_level: u32,
    /// `None` when the class has no special abilities at first level.
    pub specials: Option<&'static [&'static str]>,
    pub saving_throws: SavingThrows,
    pub spellcasting: Option<Spellcasting>,
}

impl CharacterClass {
    pub fn name(&self) -> &'static str {
        match self {
            CharacterClass::Cleric => "Cleric",
            CharacterClass::Fighter => "Fighter",
            CharacterClass::MagicUser => "Magic-User",
            CharacterClass::Thief => "Thief",
            CharacterClass::FighterMagicUser => "Fighter/Magic-User",
            CharacterClass::MagicUserThief => "Magic-User/Thief",
        }
    }

    pub fn all() -> &'static [CharacterClass] {
        &[
            CharacterClass::Cleric,
            CharacterClass::Fighter,
            CharacterClass::MagicUser,
            CharacterClass::Thief,
            CharacterClass::FighterMagicUser,
            CharacterClass::MagicUserThief,
        ]
    }

    /// Look up a class by its display name (case-insensitive).
    pub fn from_name(name: &str) -> Option<CharacterClass> {
        Self::all()
            .iter()
            .copied()
            .find(|c| c.name().eq_ignore_ascii_case(name.trim()))
    }

    /// Elf-only classes that merge two base classes.
    pub fn is_combination(&self) -> bool {
        matches!(
            self,
            CharacterClass::FighterMagicUser | CharacterClass::MagicUserThief
        )
    }

    /// Returns true if this class selects a spell during creation.
    pub fn is_spellcaster(&self) -> bool {
        self.data().spellcasting.is_some()
    }

    /// Get class data for character creation.
    pub fn data(&self) -> ClassDefinition {
        match self {
            CharacterClass::Cleric => ClassDefinition {
                requirements: &[Requirement::AtLeast(Ability::Wisdom, 9)],
                hit_die: DieType::D6,
                xp_to_next_level: 1500,
                specials: Some(&["Turn Undead"]),
                saving_throws: SavingThrows::from_array([11, 12, 14, 16, 15]),
                spellcasting: Some(Spellcasting::Divine),
            },
            CharacterClass::Fighter => ClassDefinition {
                requirements: &[Requirement::AtLeast(Ability::Strength, 9)],
                hit_die: DieType::D8,
                xp_to_next_level: 2000,
                specials: None,
                saving_throws: SavingThrows::from_array([12, 13, 14, 15, 17]),
                spellcasting: None,
            },
            CharacterClass::MagicUser => ClassDefinition {
                requirements: &[Requirement::AtLeast(Ability::Intelligence, 9)],
                hit_die: DieType::D4,
                xp_to_next_level: 2500,
                specials: None,
                saving_throws: SavingThrows::from_array([13, 14, 13, 16, 15]),
                spellcasting: Some(Spellcasting::Arcane),
            },
            CharacterClass::Thief => ClassDefinition {
                requirements: &[Requirement::AtLeast(Ability::Dexterity, 9)],
                hit_die: DieType::D4,
                xp_to_next_level: 1250,
                specials: Some(&["Thief Abilities", "Sneak Attack"]),
                saving_throws: SavingThrows::from_array([13, 14, 13, 16, 15]),
                spellcasting: None,
            },
            CharacterClass::FighterMagicUser => ClassDefinition {
                requirements: &[
                    Requirement::AtLeast(Ability::Strength, 9),
                    Requirement::AtLeast(Ability::Intelligence, 9),
                ],
                hit_die: DieType::D6,
                xp_to_next_level: 4500,
                specials: None,
                saving_throws: SavingThrows::from_array([12, 13, 13, 15, 15]),
                spellcasting: Some(Spellcasting::Arcane),
            },
            CharacterClass::MagicUserThief => ClassDefinition {
                requirements: &[
                    Requirement::AtLeast(Ability::Intelligence, 9),
                    Requirement::AtLeast(Ability::Dexterity, 9),
                ],
                hit_die: DieType::D4,
                xp_to_next_level: 3750,
                specials: Some(&["Thief Abilities", "Sneak Attack"]),
                saving_throws: SavingThrows::from_array([13, 14, 13, 16, 15]),
                spellcasting: Some(Spellcasting::Arcane),
            },
        }
    }
}

impl fmt::Display for CharacterClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

// ============================================================================
// Spells and Languages
// ============================================================================

/// Spell every arcane caster's spellbook starts with.
pub const READ_MAGIC: &str = "Read Magic";

/// First-level arcane spells a new magic-user may add to the spellbook.
pub const ARCANE_SPELLS: &[&str] = &[
    "Charm Person",
    "Detect Magic",
    "Floating Disc",
    "Hold Portal",
    "Light",
    "Magic Missile",
    "Magic Mouth",
    "Protection from Evil",
    "Read Languages",
    "Shield",
    "Sleep",
    "Ventriloquism",
];

/// First-level divine spells.
pub const DIVINE_SPELLS: &[&str] = &[
    "Cure Light Wounds",
    "Detect Evil",
    "Detect Magic",
    "Light",
    "Protection from Evil",
    "Purify Food and Water",
    "Remove Fear",
    "Resist Cold",
];

impl Spellcasting {
    /// Spells selectable during creation.
    pub fn spell_options(&self) -> &'static [&'static str] {
        match self {
            Spellcasting::Divine => DIVINE_SPELLS,
            Spellcasting::Arcane => ARCANE_SPELLS,
        }
    }

    /// Spells known before any choice is made.
    pub fn starting_spells(&self) -> &'static [&'static str] {
        match self {
            Spellcasting::Divine => &[],
            Spellcasting::Arcane => &[READ_MAGIC],
        }
    }
}

/// Languages a character may learn beyond Common and racial tongues.
pub const LEARNABLE_LANGUAGES: &[&str] = &[
    "Dwarvish",
    "Elvish",
    "Halfling",
    "Gnomish",
    "Goblin",
    "Hobgoblin",
    "Kobold",
    "Orcish",
    "Gnoll",
    "Lizard Man",
    "Ogre",
    "Draconic",
];
