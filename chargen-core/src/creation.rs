//! The character creation state machine.
//!
//! [`CreationFlow`] walks a character from ability rolls to a finished
//! sheet. It owns the [`Character`] and the roller, and is the only thing
//! that mutates the character until creation is complete.

use crate::abilities::{build_ability_dictionary, Abilities};
use crate::character::{Character, CharacterError, EquipSlot};
use crate::class_data::{CharacterClass, RaceType};
use crate::dice::{Dice, Roller};
use crate::eligibility::{
    build_possible_characters, eligible_classes, eligible_races, is_legal_pair,
    is_valid_combination, PossibleCharacter,
};
use crate::items::Item;
use std::collections::BTreeSet;
use thiserror::Error;

/// Longest accepted character name, in characters.
pub const MAX_NAME_LENGTH: usize = 30;

/// Errors from the creation flow. A failed call leaves the flow unchanged.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FlowError {
    #[error("Only available during {expected:?}, current step is {actual:?}")]
    WrongStep {
        expected: CreationStep,
        actual: CreationStep,
    },

    #[error("Character creation is already complete")]
    AlreadyComplete,

    #[error("Cannot go back from {0:?}")]
    NoPreviousStep(CreationStep),

    #[error("Abilities have not been rolled")]
    AbilitiesNotRolled,

    #[error("No legal race and class combination for these abilities")]
    NoLegalCombination,

    #[error("{0} is not selectable")]
    RaceNotSelectable(RaceType),

    #[error("{0} is not selectable")]
    ClassNotSelectable(CharacterClass),

    #[error("Choose both a race and a class")]
    SelectionIncomplete,

    #[error("Choose a spell first")]
    SpellNotChosen,

    #[error("Name cannot be empty")]
    EmptyName,

    #[error("Name is {len} characters, the limit is {max}")]
    NameTooLong { len: usize, max: usize },

    #[error("Invalid money amount: {0:?}")]
    InvalidMoney(String),

    #[error("Starting money has not been set")]
    MoneyNotSet,

    #[error(transparent)]
    Character(#[from] CharacterError),
}

/// Steps in character creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CreationStep {
    AbilityRoll,
    RaceClassSelect,
    SpellSelect,
    LanguageSelect,
    Naming,
    MoneySelect,
    Complete,
}

impl CreationStep {
    pub fn title(&self) -> &'static str {
        match self {
            CreationStep::AbilityRoll => "Roll Your Abilities",
            CreationStep::RaceClassSelect => "Choose Your Race and Class",
            CreationStep::SpellSelect => "Choose Your Spell",
            CreationStep::LanguageSelect => "Choose Your Languages",
            CreationStep::Naming => "Name Your Character",
            CreationStep::MoneySelect => "Starting Money",
            CreationStep::Complete => "Character Complete",
        }
    }
}

/// Character creation state.
#[derive(Debug, Clone)]
pub struct CreationFlow<R: Roller = Dice> {
    step: CreationStep,
    roller: R,
    abilities: Option<Abilities>,
    races: BTreeSet<RaceType>,
    classes: BTreeSet<CharacterClass>,
    chosen_race: Option<RaceType>,
    chosen_class: Option<CharacterClass>,
    money_set: bool,
    character: Character,
}

impl CreationFlow<Dice> {
    /// A flow rolling from a fixed seed.
    pub fn seeded(seed: u64) -> Self {
        Self::new(Dice::new(seed))
    }
}

impl<R: Roller> CreationFlow<R> {
    pub fn new(roller: R) -> Self {
        Self {
            step: CreationStep::AbilityRoll,
            roller,
            abilities: None,
            races: BTreeSet::new(),
            classes: BTreeSet::new(),
            chosen_race: None,
            chosen_class: None,
            money_set: false,
            character: Character::new(Abilities::default()),
        }
    }

    /// Resume at `Complete` with a finished character, e.g. one loaded from
    /// a save slot.
    pub fn from_character(character: Character, roller: R) -> Self {
        let abilities = character.abilities.clone();
        let mut flow = Self::new(roller);
        flow.races = eligible_races(&abilities);
        flow.classes = eligible_classes(&abilities);
        flow.chosen_race = character.race;
        flow.chosen_class = character.class;
        flow.abilities = Some(abilities);
        flow.money_set = true;
        flow.character = character;
        flow.step = CreationStep::Complete;
        flow
    }

    pub fn step(&self) -> CreationStep {
        self.step
    }

    pub fn is_complete(&self) -> bool {
        self.step == CreationStep::Complete
    }

    /// The character as built so far.
    pub fn character(&self) -> &Character {
        &self.character
    }

    /// Buying and equipping, once creation is complete.
    pub fn shop(&mut self) -> Result<Shop<'_>, FlowError> {
        self.expect_step(CreationStep::Complete)?;
        Ok(Shop {
            character: &mut self.character,
        })
    }

    /// Take the finished character.
    pub fn into_character(self) -> Result<Character, FlowError> {
        self.expect_step(CreationStep::Complete)?;
        Ok(self.character)
    }

    /// Throw everything away and start over at the ability roll.
    pub fn restart(&mut self) {
        tracing::debug!(from = ?self.step, "restarting creation");
        self.step = CreationStep::AbilityRoll;
        self.abilities = None;
        self.races.clear();
        self.classes.clear();
        self.chosen_race = None;
        self.chosen_class = None;
        self.money_set = false;
        self.character = Character::new(Abilities::default());
    }

    fn expect_step(&self, expected: CreationStep) -> Result<(), FlowError> {
        if self.step == expected {
            Ok(())
        } else {
            Err(FlowError::WrongStep {
                expected,
                actual: self.step,
            })
        }
    }

    fn is_spellcaster(&self) -> bool {
        self.character.is_spellcaster()
    }

    fn language_flag(&self) -> bool {
        self.character.abilities.language_flag()
    }

    // ------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------

    /// The step `advance` moves to from the current one.
    pub fn next_step(&self) -> Option<CreationStep> {
        match self.step {
            CreationStep::AbilityRoll => Some(CreationStep::RaceClassSelect),
            CreationStep::RaceClassSelect => {
                let caster = self.chosen_class.map(|c| c.is_spellcaster()).unwrap_or(false);
                if caster {
                    Some(CreationStep::SpellSelect)
                } else {
                    Some(CreationStep::LanguageSelect)
                }
            }
            CreationStep::SpellSelect => Some(CreationStep::LanguageSelect),
            CreationStep::LanguageSelect => {
                // A caster whose spell was cleared by `back` must pick again.
                if self.is_spellcaster() && self.character.spells.is_none() {
                    Some(CreationStep::SpellSelect)
                } else {
                    Some(CreationStep::Naming)
                }
            }
            CreationStep::Naming => Some(CreationStep::MoneySelect),
            CreationStep::MoneySelect => Some(CreationStep::Complete),
            CreationStep::Complete => None,
        }
    }

    /// The step `back` returns to from the current one.
    ///
    /// Language selection is skipped when it was resolved automatically.
    pub fn prev_step(&self) -> Option<CreationStep> {
        let before_languages = if self.is_spellcaster() {
            CreationStep::SpellSelect
        } else {
            CreationStep::RaceClassSelect
        };
        match self.step {
            CreationStep::AbilityRoll => None,
            CreationStep::RaceClassSelect => Some(CreationStep::AbilityRoll),
            CreationStep::SpellSelect => Some(CreationStep::RaceClassSelect),
            CreationStep::LanguageSelect => Some(before_languages),
            CreationStep::Naming => {
                if self.language_flag() {
                    Some(CreationStep::LanguageSelect)
                } else {
                    Some(before_languages)
                }
            }
            CreationStep::MoneySelect => Some(CreationStep::Naming),
            CreationStep::Complete => None,
        }
    }

    /// Validate the current step and move forward.
    pub fn advance(&mut self) -> Result<CreationStep, FlowError> {
        let next = self.next_step().ok_or(FlowError::AlreadyComplete)?;

        match self.step {
            CreationStep::AbilityRoll => {
                if self.abilities.is_none() {
                    return Err(FlowError::AbilitiesNotRolled);
                }
                let mut races = self.races.clone();
                if !is_valid_combination(&mut races, &self.classes) {
                    return Err(FlowError::NoLegalCombination);
                }
            }
            CreationStep::RaceClassSelect => self.apply_race_and_class()?,
            CreationStep::SpellSelect => {
                if self.character.spells.is_none() {
                    return Err(FlowError::SpellNotChosen);
                }
            }
            CreationStep::LanguageSelect => {}
            CreationStep::Naming => {
                if self.character.name.trim().is_empty() {
                    return Err(FlowError::EmptyName);
                }
            }
            CreationStep::MoneySelect => {
                if !self.money_set {
                    return Err(FlowError::MoneyNotSet);
                }
            }
            CreationStep::Complete => {}
        }

        self.enter(next);
        Ok(self.step)
    }

    fn enter(&mut self, step: CreationStep) {
        tracing::debug!(from = ?self.step, to = ?step, "entering creation step");
        self.step = step;

        if step == CreationStep::LanguageSelect {
            // Defaults always apply, whether or not the step is shown.
            self.character.languages = self.character.default_languages();
            if !self.language_flag() {
                tracing::debug!("no extra languages available, skipping language selection");
                self.step = CreationStep::Naming;
            }
        }
    }

    fn apply_race_and_class(&mut self) -> Result<(), FlowError> {
        let (race, class) = match (self.chosen_race, self.chosen_class) {
            (Some(race), Some(class)) => (race, class),
            _ => return Err(FlowError::SelectionIncomplete),
        };
        let abilities = self.abilities.clone().ok_or(FlowError::AbilitiesNotRolled)?;

        let mut character = Character::new(abilities);
        character.set_race(race);
        character.set_class(class);
        character.set_character_values(&mut self.roller)?;
        self.character = character;
        Ok(())
    }

    /// Step back, undoing whatever the steps being left had set.
    pub fn back(&mut self) -> Result<CreationStep, FlowError> {
        let prev = self
            .prev_step()
            .ok_or(FlowError::NoPreviousStep(self.step))?;

        match prev {
            CreationStep::AbilityRoll | CreationStep::RaceClassSelect => {
                let abilities = self.character.abilities.clone();
                self.character = Character::new(abilities);
                self.chosen_race = None;
                self.chosen_class = None;
            }
            CreationStep::SpellSelect | CreationStep::LanguageSelect => {
                self.character.reset_character();
            }
            CreationStep::Naming => {
                self.character.money = 0.0;
                self.money_set = false;
            }
            CreationStep::MoneySelect | CreationStep::Complete => {}
        }

        tracing::debug!(from = ?self.step, to = ?prev, "stepping back");
        self.step = prev;
        if prev == CreationStep::LanguageSelect {
            self.character.languages = self.character.default_languages();
        }
        Ok(self.step)
    }

    // ------------------------------------------------------------------
    // AbilityRoll
    // ------------------------------------------------------------------

    /// Roll a fresh set of abilities. Returns whether any race/class pair
    /// can be built from them; if not, roll again.
    pub fn roll_abilities(&mut self) -> Result<bool, FlowError> {
        self.expect_step(CreationStep::AbilityRoll)?;

        let abilities = build_ability_dictionary(&mut self.roller);
        let mut races = eligible_races(&abilities);
        let classes = eligible_classes(&abilities);
        let valid = is_valid_combination(&mut races, &classes);

        tracing::debug!(
            strength = abilities.strength.base,
            dexterity = abilities.dexterity.base,
            constitution = abilities.constitution.base,
            intelligence = abilities.intelligence.base,
            wisdom = abilities.wisdom.base,
            charisma = abilities.charisma.base,
            valid,
            "rolled abilities"
        );

        self.character = Character::new(abilities.clone());
        self.abilities = Some(abilities);
        self.races = races;
        self.classes = classes;
        Ok(valid)
    }

    pub fn abilities(&self) -> Option<&Abilities> {
        self.abilities.as_ref()
    }

    // ------------------------------------------------------------------
    // RaceClassSelect
    // ------------------------------------------------------------------

    /// Every legal pairing for the rolled abilities.
    pub fn possible_characters(&self) -> Vec<PossibleCharacter> {
        build_possible_characters(&self.races, &self.classes)
    }

    /// Races that still have a legal class, given the current class pick.
    pub fn selectable_races(&self) -> Vec<RaceType> {
        self.races
            .iter()
            .copied()
            .filter(|&race| match self.chosen_class {
                Some(class) => is_legal_pair(race, class),
                None => self.classes.iter().any(|&class| is_legal_pair(race, class)),
            })
            .collect()
    }

    /// Classes that still have a legal race, given the current race pick.
    pub fn selectable_classes(&self) -> Vec<CharacterClass> {
        self.classes
            .iter()
            .copied()
            .filter(|&class| match self.chosen_race {
                Some(race) => is_legal_pair(race, class),
                None => self.races.iter().any(|&race| is_legal_pair(race, class)),
            })
            .collect()
    }

    pub fn chosen_race(&self) -> Option<RaceType> {
        self.chosen_race
    }

    pub fn chosen_class(&self) -> Option<CharacterClass> {
        self.chosen_class
    }

    pub fn choose_race(&mut self, race: RaceType) -> Result<(), FlowError> {
        self.expect_step(CreationStep::RaceClassSelect)?;
        if !self.selectable_races().contains(&race) {
            return Err(FlowError::RaceNotSelectable(race));
        }
        self.chosen_race = Some(race);
        Ok(())
    }

    pub fn choose_class(&mut self, class: CharacterClass) -> Result<(), FlowError> {
        self.expect_step(CreationStep::RaceClassSelect)?;
        if !self.selectable_classes().contains(&class) {
            return Err(FlowError::ClassNotSelectable(class));
        }
        self.chosen_class = Some(class);
        Ok(())
    }

    /// Clear both picks at once.
    pub fn clear_choices(&mut self) -> Result<(), FlowError> {
        self.expect_step(CreationStep::RaceClassSelect)?;
        self.chosen_race = None;
        self.chosen_class = None;
        Ok(())
    }

    /// Pick a random legal pairing.
    pub fn choose_random(&mut self) -> Result<PossibleCharacter, FlowError> {
        self.expect_step(CreationStep::RaceClassSelect)?;
        let possible = self.possible_characters();
        let index = self
            .roller
            .pick_index(possible.len())
            .ok_or(FlowError::NoLegalCombination)?;
        let pick = possible[index];
        self.chosen_race = Some(pick.race);
        self.chosen_class = Some(pick.class);
        tracing::debug!(pick = %pick, "random race and class");
        Ok(pick)
    }

    // ------------------------------------------------------------------
    // SpellSelect
    // ------------------------------------------------------------------

    /// Spells the class may pick from; empty for non-casters.
    pub fn spell_options(&self) -> &'static [&'static str] {
        self.character
            .spellcasting()
            .map(|casting| casting.spell_options())
            .unwrap_or(&[])
    }

    pub fn choose_spell(&mut self, spell: &str) -> Result<(), FlowError> {
        self.expect_step(CreationStep::SpellSelect)?;
        self.character.choose_spell(spell)?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // LanguageSelect
    // ------------------------------------------------------------------

    pub fn language_options(&self) -> Vec<String> {
        self.character.learnable_languages()
    }

    pub fn choose_languages(&mut self, extras: &[String]) -> Result<(), FlowError> {
        self.expect_step(CreationStep::LanguageSelect)?;
        self.character.assign_languages(extras)?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Naming
    // ------------------------------------------------------------------

    pub fn set_name(&mut self, name: &str) -> Result<(), FlowError> {
        self.expect_step(CreationStep::Naming)?;
        let name = name.trim();
        if name.is_empty() {
            return Err(FlowError::EmptyName);
        }
        let len = name.chars().count();
        if len > MAX_NAME_LENGTH {
            return Err(FlowError::NameTooLong {
                len,
                max: MAX_NAME_LENGTH,
            });
        }
        self.character.name = name.to_string();
        Ok(())
    }

    // ------------------------------------------------------------------
    // MoneySelect
    // ------------------------------------------------------------------

    /// Roll 3d6 x 10 gold pieces.
    pub fn roll_money(&mut self) -> Result<u32, FlowError> {
        self.expect_step(CreationStep::MoneySelect)?;
        let gold = self.roller.roll_dice(3, 6) * 10;
        self.character.money = gold as f64;
        self.money_set = true;
        tracing::debug!(gold, "rolled starting money");
        Ok(gold)
    }

    pub fn set_money(&mut self, gold: u32) -> Result<(), FlowError> {
        self.expect_step(CreationStep::MoneySelect)?;
        self.character.money = gold as f64;
        self.money_set = true;
        Ok(())
    }

    /// Parse a user-typed gold amount.
    pub fn parse_money_input(input: &str) -> Result<u32, FlowError> {
        input.trim().parse::<u32>().map_err(|_| {
            tracing::warn!(input, "rejected money input");
            FlowError::InvalidMoney(input.to_string())
        })
    }
}

/// A finished character's purse and pack.
///
/// Only inventory and equipment can change here. Race, class and abilities
/// are fixed once creation is complete:
///
/// ```compile_fail
/// use chargen_core::{Abilities, Character, CharacterClass};
///
/// let mut character = Character::new(Abilities::default());
/// character.set_class(CharacterClass::MagicUser);
/// ```
#[derive(Debug)]
pub struct Shop<'a> {
    character: &'a mut Character,
}

impl Shop<'_> {
    pub fn character(&self) -> &Character {
        self.character
    }

    pub fn money(&self) -> f64 {
        self.character.money
    }

    pub fn buy_item(&mut self, item: &Item, amount: u32) -> bool {
        self.character.buy_item(item, amount)
    }

    pub fn sell_item(&mut self, item: &Item, amount: u32) -> u32 {
        self.character.sell_item(item, amount)
    }

    pub fn equip_item(&mut self, item: &Item) -> Result<(), FlowError> {
        self.character.equip_item(item)?;
        Ok(())
    }

    pub fn unequip_item(&mut self, item: &Item) -> Result<(), FlowError> {
        self.character.unequip_item(item)?;
        Ok(())
    }

    pub fn equipped(&self, slot: EquipSlot) -> &Item {
        self.character.equipped(slot)
    }
}
