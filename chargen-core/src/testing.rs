//! Testing utilities for character creation.
//!
//! This module provides tools for deterministic tests:
//! - `ScriptedDice` for rolls that are known in advance
//! - Fixture builders for finished characters
//! - `complete_flow` for driving the creation flow end to end

use crate::abilities::Abilities;
use crate::character::Character;
use crate::class_data::{CharacterClass, RaceType};
use crate::creation::{CreationFlow, CreationStep, FlowError};
use crate::dice::Roller;
use crate::eligibility::PossibleCharacter;
use crate::items;

/// A roller that replays scripted faces.
///
/// Faces cycle once the script runs out, and each face is clamped to the
/// die being rolled.
#[derive(Debug, Clone)]
pub struct ScriptedDice {
    faces: Vec<u32>,
    index: usize,
}

impl ScriptedDice {
    pub fn new(faces: Vec<u32>) -> Self {
        Self { faces, index: 0 }
    }

    /// Every die shows `face`.
    pub fn constant(face: u32) -> Self {
        Self::new(vec![face])
    }

    /// How many faces have been rolled so far.
    pub fn rolls(&self) -> usize {
        self.index
    }
}

impl Roller for ScriptedDice {
    fn roll_die(&mut self, sides: u32) -> u32 {
        if sides == 0 {
            return 0;
        }
        let face = if self.faces.is_empty() {
            1
        } else {
            self.faces[self.index % self.faces.len()]
        };
        self.index += 1;
        face.clamp(1, sides)
    }
}

/// Character with race, class and derived values set, rolling hit points
/// with every die showing `face`.
pub fn built_character(
    abilities: Abilities,
    race: RaceType,
    class: CharacterClass,
    face: u32,
) -> Character {
    let mut character = Character::new(abilities);
    character.set_race(race);
    character.set_class(class);
    character
        .set_character_values(&mut ScriptedDice::constant(face))
        .expect("race and class are set");
    character
}

/// A finished Human Fighter in chain mail with a longsword.
pub fn sample_fighter(name: &str) -> Character {
    let abilities = Abilities::from_bases(12, 13, 14, 10, 9, 11);
    let mut fighter = built_character(abilities, RaceType::Human, CharacterClass::Fighter, 6);
    fighter.name = name.to_string();
    fighter.languages = fighter.default_languages();
    fighter.money = 150.0;

    let mail = find("Chain Mail");
    let sword = find("Longsword");
    for (item, count) in [
        (&mail, 1),
        (&sword, 1),
        (&find("Hemp Rope (50 ft)"), 1),
        (&find("Torches (6)"), 2),
    ] {
        assert!(fighter.buy_item(item, count), "fixture can afford {item}");
    }
    fighter.equip_item(&mail).expect("mail was bought");
    fighter.equip_item(&sword).expect("sword was bought");
    fighter
}

/// A finished Elf Magic-User who knows Sleep and Orcish.
pub fn sample_mage(name: &str) -> Character {
    let abilities = Abilities::from_bases(10, 12, 10, 13, 10, 10);
    let mut mage = built_character(abilities, RaceType::Elf, CharacterClass::MagicUser, 4);
    mage.name = name.to_string();
    mage.choose_spell("Sleep").expect("Sleep is an arcane spell");
    mage.assign_languages(&["Orcish".to_string()])
        .expect("one extra language is allowed");
    mage.money = 50.0;

    let dagger = find("Dagger");
    assert!(mage.buy_item(&dagger, 2), "fixture can afford daggers");
    mage.equip_item(&dagger).expect("dagger was bought");
    mage
}

/// A finished Human Fighter whose purse and pack hold fractional amounts:
/// arrows at 0.2 gp, oil at 0.1 gp and a tenth of a pound per arrow.
pub fn sample_archer(name: &str) -> Character {
    let abilities = Abilities::from_bases(11, 14, 12, 10, 10, 10);
    let mut archer = built_character(abilities, RaceType::Human, CharacterClass::Fighter, 5);
    archer.name = name.to_string();
    archer.languages = archer.default_languages();
    archer.money = 3.0;

    for (item, count) in [
        (&find("Longbow Arrow"), 3),
        (&find("Oil Flask"), 7),
        (&find("Shortbow Arrow"), 4),
    ] {
        assert!(archer.buy_item(item, count), "fixture can afford {item}");
    }
    archer
}

fn find(name: &str) -> items::Item {
    items::find_item(name).unwrap_or_else(|| panic!("{name} is in the catalog"))
}

/// Drive a flow from a fresh roll to `Complete`, picking the first spell
/// offered, no extra languages and the given name and money.
pub fn complete_flow<R: Roller>(
    flow: &mut CreationFlow<R>,
    race: RaceType,
    class: CharacterClass,
    name: &str,
    gold: u32,
) -> Result<(), FlowError> {
    if !flow.roll_abilities()? {
        return Err(FlowError::NoLegalCombination);
    }
    flow.advance()?;
    flow.choose_race(race)?;
    flow.choose_class(class)?;
    flow.advance()?;
    finish_flow(flow, name, gold)
}

/// Like [`complete_flow`], but re-rolls until some pairing is legal and
/// then lets the flow pick one at random.
pub fn complete_random_flow<R: Roller>(
    flow: &mut CreationFlow<R>,
    name: &str,
    gold: u32,
) -> Result<PossibleCharacter, FlowError> {
    let mut valid = false;
    for _ in 0..MAX_REROLLS {
        flow.restart();
        if flow.roll_abilities()? {
            valid = true;
            break;
        }
    }
    if !valid {
        return Err(FlowError::NoLegalCombination);
    }
    flow.advance()?;
    let pick = flow.choose_random()?;
    flow.advance()?;
    finish_flow(flow, name, gold)?;
    Ok(pick)
}

const MAX_REROLLS: usize = 100;

fn finish_flow<R: Roller>(flow: &mut CreationFlow<R>, name: &str, gold: u32) -> Result<(), FlowError> {
    if flow.step() == CreationStep::SpellSelect {
        if let Some(spell) = flow.spell_options().first() {
            flow.choose_spell(spell)?;
        }
        flow.advance()?;
    }
    if flow.step() == CreationStep::LanguageSelect {
        flow.advance()?;
    }

    flow.set_name(name)?;
    flow.advance()?;
    flow.set_money(gold)?;
    flow.advance()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripted_dice_cycle_and_clamp() {
        let mut dice = ScriptedDice::new(vec![2, 9]);
        assert_eq!(dice.roll_die(6), 2);
        assert_eq!(dice.roll_die(6), 6);
        assert_eq!(dice.roll_die(6), 2);
        assert_eq!(dice.roll_dice(2, 20), 11);
        assert_eq!(dice.rolls(), 5);
    }

    #[test]
    fn test_sample_fighter() {
        let fighter = sample_fighter("Test Hero");
        assert_eq!(fighter.name, "Test Hero");
        assert_eq!(fighter.hit_points, 7);
        assert_eq!(fighter.armor_class, 16);
        assert_eq!(fighter.movement_rate, 20);
        assert_eq!(fighter.money, 77.0);
        assert_eq!(fighter.weight_carried, 51.0);
    }

    #[test]
    fn test_complete_flow() {
        let mut flow = CreationFlow::new(ScriptedDice::constant(3));
        complete_flow(&mut flow, RaceType::Elf, CharacterClass::MagicUserThief, "Vex", 30).unwrap();
        assert!(flow.is_complete());
        assert_eq!(flow.character().name, "Vex");
        assert_eq!(flow.character().money, 30.0);
    }

    #[test]
    fn test_complete_random_flow() {
        let mut flow = CreationFlow::seeded(99);
        let pick = complete_random_flow(&mut flow, "Rook", 10).unwrap();
        assert!(flow.is_complete());
        assert_eq!(flow.character().race, Some(pick.race));
        assert_eq!(flow.character().class, Some(pick.class));
    }
}
