//! The character being created.
//!
//! [`Character`] owns the rolled abilities, the race/class choice and
//! every statistic derived from them. Inventory mutations go through
//! [`Character::modify_weight_carried`] so `weight_carried` always equals
//! the (race-adjusted) weight of the inventory plus the equipped slots,
//! and armor class and movement are recomputed after each change.

use crate::abilities::{Abilities, Ability};
use crate::class_data::{CharacterClass, RaceType, SavingThrows, Spellcasting, LEARNABLE_LANGUAGES};
use crate::dice::{DieType, Roller};
use crate::items::{self, ArmorBulk, Item};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Attack bonus of every first-level character.
pub const FIRST_LEVEL_ATTACK_BONUS: i32 = 1;

/// Fraction of an armor piece's weight a Halfling carries.
pub const HALFLING_ARMOR_WEIGHT_FACTOR: f64 = 0.25;

/// Slack for float comparisons on money.
const MONEY_EPSILON: f64 = 1e-9;

/// Errors from character mutations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CharacterError {
    #[error("{0} is not in the inventory")]
    NotInInventory(String),

    #[error("{0} cannot be equipped")]
    NotEquippable(String),

    #[error("{0} is not equipped")]
    NotEquipped(String),

    #[error("Race has not been set")]
    RaceNotSet,

    #[error("Class has not been set")]
    ClassNotSet,

    #[error("{0} does not cast spells")]
    NotASpellcaster(String),

    #[error("Unknown spell: {0}")]
    UnknownSpell(String),

    #[error("Unknown language: {0}")]
    UnknownLanguage(String),

    #[error("{0} is already known")]
    DuplicateLanguage(String),

    #[error("Only {allowed} extra languages allowed, {chosen} chosen")]
    TooManyLanguages { allowed: usize, chosen: usize },
}

/// Load thresholds in pounds.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CarryingCapacity {
    #[serde(rename = "Light Load")]
    pub light: f64,
    #[serde(rename = "Heavy Load")]
    pub heavy: f64,
}

/// Carrying capacity for a race at a Strength base score.
pub fn carrying_capacity_for(race: RaceType, strength: u8) -> CarryingCapacity {
    let (light, heavy) = if race == RaceType::Halfling {
        match strength {
            0..=3 => (20.0, 40.0),
            4..=5 => (30.0, 60.0),
            6..=8 => (40.0, 80.0),
            9..=12 => (50.0, 100.0),
            13..=15 => (55.0, 110.0),
            16..=17 => (60.0, 120.0),
            _ => (65.0, 130.0),
        }
    } else {
        match strength {
            0..=3 => (25.0, 60.0),
            4..=5 => (35.0, 90.0),
            6..=8 => (50.0, 120.0),
            9..=12 => (60.0, 150.0),
            13..=15 => (65.0, 165.0),
            16..=17 => (70.0, 180.0),
            _ => (80.0, 195.0),
        }
    };
    CarryingCapacity { light, heavy }
}

/// How loaded down a character is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encumbrance {
    Light,
    Heavy,
    /// More than the heavy load threshold.
    Overloaded,
}

/// Movement rate in feet per round.
///
/// Overloaded characters move at the slowest tier whatever they wear.
pub fn movement_rate_for(encumbrance: Encumbrance, bulk: ArmorBulk) -> u32 {
    match (encumbrance, bulk) {
        (Encumbrance::Light, ArmorBulk::Unarmored) => 40,
        (Encumbrance::Light, ArmorBulk::Leather) => 30,
        (Encumbrance::Light, ArmorBulk::Metal) => 20,
        (Encumbrance::Heavy, ArmorBulk::Unarmored) => 30,
        (Encumbrance::Heavy, ArmorBulk::Leather) => 20,
        (Encumbrance::Heavy, ArmorBulk::Metal) => 10,
        (Encumbrance::Overloaded, _) => 10,
    }
}

/// Whether weight is being added to or removed from the load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeightDirection {
    Add,
    Remove,
}

/// Equipment slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EquipSlot {
    Armor,
    Shield,
    Weapon,
}

impl EquipSlot {
    /// Slot an item goes into, if it can be equipped at all.
    pub fn for_item(item: &Item) -> Option<EquipSlot> {
        if item.is_shield() {
            Some(EquipSlot::Shield)
        } else if item.is_armor() {
            Some(EquipSlot::Armor)
        } else if item.is_weapon() {
            Some(EquipSlot::Weapon)
        } else {
            None
        }
    }

    fn empty_item(&self) -> Item {
        match self {
            EquipSlot::Armor => items::no_armor(),
            EquipSlot::Shield => items::no_shield(),
            EquipSlot::Weapon => items::no_weapon(),
        }
    }
}

/// A character in progress or finished.
#[derive(Debug, Clone, PartialEq)]
pub struct Character {
    pub name: String,
    pub race: Option<RaceType>,
    pub class: Option<CharacterClass>,
    pub abilities: Abilities,

    pub armor_class: i32,
    pub hit_points: i32,
    pub attack_bonus: i32,
    pub movement_rate: u32,
    pub saving_throws: SavingThrows,
    pub special_abilities: Vec<String>,

    pub level: u8,
    pub xp: u32,
    pub xp_to_next_level: u32,

    /// Gold pieces; fractions allowed.
    pub money: f64,
    pub inventory: Vec<Item>,
    pub equipped_armor: Item,
    pub equipped_shield: Item,
    pub equipped_weapon: Item,
    pub weight_carried: f64,
    pub carrying_capacity: CarryingCapacity,

    pub spells: Option<Vec<String>>,
    pub languages: Vec<String>,

    // Copied from the race definition by `set_race`.
    race_max_hit_die: Option<DieType>,
    race_specials: Vec<String>,
    bonuses: SavingThrows,

    // Copied from the class definition by `set_class`.
    hit_die: Option<DieType>,
    class_specials: Option<Vec<String>>,
    class_saving_throws: SavingThrows,
    spellcasting: Option<Spellcasting>,

    max_hit_die: Option<DieType>,
}

impl Character {
    /// A fresh character with the given abilities and nothing else chosen.
    pub fn new(abilities: Abilities) -> Self {
        Self {
            name: String::new(),
            race: None,
            class: None,
            abilities,
            armor_class: 0,
            hit_points: 0,
            attack_bonus: FIRST_LEVEL_ATTACK_BONUS,
            movement_rate: 0,
            saving_throws: SavingThrows::default(),
            special_abilities: Vec::new(),
            level: 1,
            xp: 0,
            xp_to_next_level: 0,
            money: 0.0,
            inventory: Vec::new(),
            equipped_armor: items::no_armor(),
            equipped_shield: items::no_shield(),
            equipped_weapon: items::no_weapon(),
            weight_carried: 0.0,
            carrying_capacity: CarryingCapacity::default(),
            spells: None,
            languages: Vec::new(),
            race_max_hit_die: None,
            race_specials: Vec::new(),
            bonuses: SavingThrows::default(),
            hit_die: None,
            class_specials: None,
            class_saving_throws: SavingThrows::default(),
            spellcasting: None,
            max_hit_die: None,
        }
    }

    // ------------------------------------------------------------------
    // Race and class
    // ------------------------------------------------------------------

    /// Record the race and copy its hit-die cap, specials and saving throw
    /// bonuses. Nothing derived is recomputed here.
    pub(crate) fn set_race(&mut self, race: RaceType) {
        let data = race.data();
        self.race = Some(race);
        self.race_max_hit_die = data.max_hit_die;
        self.race_specials = data.specials.iter().map(|s| s.to_string()).collect();
        self.bonuses = data.saving_throw_bonuses;
    }

    /// Record the class, copy its definition and hand out its starting kit.
    ///
    /// Arcane casters receive a spellbook, and its weight is carried from
    /// this point on.
    pub(crate) fn set_class(&mut self, class: CharacterClass) {
        self.apply_class_definition(class);
        self.grant_starting_kit();
    }

    pub(crate) fn apply_class_definition(&mut self, class: CharacterClass) {
        let data = class.data();
        self.class = Some(class);
        self.hit_die = Some(data.hit_die);
        self.xp_to_next_level = data.xp_to_next_level;
        self.class_specials = data
            .specials
            .map(|specials| specials.iter().map(|s| s.to_string()).collect());
        self.class_saving_throws = data.saving_throws;
        self.spellcasting = data.spellcasting;
    }

    fn grant_starting_kit(&mut self) {
        if self.spellcasting == Some(Spellcasting::Arcane) {
            let book = items::spellbook();
            self.modify_weight_carried(&book, 1, WeightDirection::Add);
            self.inventory.push(book);
        }
    }

    /// Compute every derived statistic, in dependency order.
    ///
    /// Armor class is computed unarmored here; equipment adjusts it later.
    pub fn set_character_values(
        &mut self,
        roller: &mut impl Roller,
    ) -> Result<(), CharacterError> {
        let race = self.race.ok_or(CharacterError::RaceNotSet)?;
        if self.class.is_none() {
            return Err(CharacterError::ClassNotSet);
        }

        self.set_max_hit_die();
        self.set_saving_throws();
        self.set_specials();
        self.set_hit_points(roller);
        self.set_armor_class();
        self.set_carrying_capacity(race);
        self.set_movement_rate();

        tracing::debug!(
            race = %race,
            class = ?self.class,
            hit_points = self.hit_points,
            armor_class = self.armor_class,
            "character values set"
        );
        Ok(())
    }

    pub(crate) fn set_max_hit_die(&mut self) {
        self.max_hit_die = match (self.race_max_hit_die, self.hit_die) {
            (Some(cap), Some(die)) => Some(cap.min(die)),
            (None, die) => die,
            (cap, None) => cap,
        };
    }

    fn set_saving_throws(&mut self) {
        self.saving_throws = self.bonuses.plus(&self.class_saving_throws);
    }

    fn set_specials(&mut self) {
        let mut specials = self.race_specials.clone();
        if let Some(class_specials) = &self.class_specials {
            specials.extend(class_specials.iter().cloned());
        }
        specials.retain(|s| !s.is_empty());
        self.special_abilities = specials;
    }

    fn set_hit_points(&mut self, roller: &mut impl Roller) {
        let sides = self.max_hit_die.map(|d| d.sides()).unwrap_or(1);
        let rolled = roller.roll_dice(1, sides) as i32;
        let con = self.abilities.modifier(Ability::Constitution) as i32;
        self.hit_points = (rolled + con).max(1);
    }

    fn set_armor_class(&mut self) {
        self.armor_class = self.equipped_armor.armor_class()
            + self.equipped_shield.armor_class()
            + self.abilities.modifier(Ability::Dexterity) as i32;
    }

    fn set_carrying_capacity(&mut self, race: RaceType) {
        self.carrying_capacity = carrying_capacity_for(race, self.abilities.base(Ability::Strength));
    }

    fn set_movement_rate(&mut self) {
        let encumbrance = self.encumbrance();
        if encumbrance == Encumbrance::Overloaded {
            tracing::warn!(
                weight = self.weight_carried,
                heavy = self.carrying_capacity.heavy,
                "carrying more than a heavy load"
            );
        }
        self.movement_rate = movement_rate_for(encumbrance, self.equipped_armor.bulk());
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// The smaller of the race cap and the class hit die.
    pub fn max_hit_die(&self) -> Option<DieType> {
        self.max_hit_die
    }

    pub fn spellcasting(&self) -> Option<Spellcasting> {
        self.spellcasting
    }

    /// Whether the class selects a spell during creation.
    pub fn is_spellcaster(&self) -> bool {
        self.spellcasting.is_some()
    }

    pub fn encumbrance(&self) -> Encumbrance {
        if self.weight_carried <= self.carrying_capacity.light {
            Encumbrance::Light
        } else if self.weight_carried <= self.carrying_capacity.heavy {
            Encumbrance::Heavy
        } else {
            Encumbrance::Overloaded
        }
    }

    pub fn is_overloaded(&self) -> bool {
        self.encumbrance() == Encumbrance::Overloaded
    }

    /// Weight one unit of `item` adds for this character.
    pub fn effective_weight(&self, item: &Item) -> f64 {
        if item.is_armor() && self.race == Some(RaceType::Halfling) {
            item.weight * HALFLING_ARMOR_WEIGHT_FACTOR
        } else {
            item.weight
        }
    }

    /// Inventory grouped by item, in order of first appearance.
    pub fn inventory_counts(&self) -> Vec<(Item, u32)> {
        let mut counts: Vec<(Item, u32)> = Vec::new();
        for item in &self.inventory {
            match counts.iter_mut().find(|(seen, _)| seen == item) {
                Some((_, count)) => *count += 1,
                None => counts.push((item.clone(), 1)),
            }
        }
        counts
    }

    /// Number of copies of `item` in the inventory.
    pub fn count_of(&self, item: &Item) -> usize {
        self.inventory.iter().filter(|i| *i == item).count()
    }

    // ------------------------------------------------------------------
    // Inventory
    // ------------------------------------------------------------------

    /// Adjust the carried weight by `amount` units of `item`.
    ///
    /// Halflings carry armor at a quarter of its listed weight.
    pub fn modify_weight_carried(&mut self, item: &Item, amount: u32, direction: WeightDirection) {
        let delta = self.effective_weight(item) * amount as f64;
        match direction {
            WeightDirection::Add => self.weight_carried += delta,
            WeightDirection::Remove => self.weight_carried = (self.weight_carried - delta).max(0.0),
        }
    }

    /// Buy `amount` copies of `item`.
    ///
    /// Returns false and changes nothing when the character cannot afford it.
    pub fn buy_item(&mut self, item: &Item, amount: u32) -> bool {
        let total = item.cost * amount as f64;
        if self.money - total < -MONEY_EPSILON {
            tracing::debug!(item = %item, amount, money = self.money, "cannot afford purchase");
            return false;
        }

        self.inventory
            .extend(std::iter::repeat(item.clone()).take(amount as usize));
        self.modify_weight_carried(item, amount, WeightDirection::Add);
        self.set_movement_rate();
        self.money = (self.money - total).max(0.0);

        tracing::debug!(item = %item, amount, money = self.money, "bought item");
        true
    }

    /// Sell up to `amount` copies of `item` from the inventory.
    ///
    /// Callers are expected to pass an amount the character owns; only the
    /// copies actually present are removed and refunded. Returns the number
    /// sold.
    pub fn sell_item(&mut self, item: &Item, amount: u32) -> u32 {
        let mut sold = 0;
        while sold < amount {
            match self.inventory.iter().position(|i| i == item) {
                Some(index) => {
                    self.inventory.remove(index);
                    sold += 1;
                }
                None => break,
            }
        }

        self.money += item.cost * sold as f64;
        self.modify_weight_carried(item, sold, WeightDirection::Remove);
        self.set_movement_rate();

        tracing::debug!(item = %item, sold, money = self.money, "sold item");
        sold
    }

    fn slot_mut(&mut self, slot: EquipSlot) -> &mut Item {
        match slot {
            EquipSlot::Armor => &mut self.equipped_armor,
            EquipSlot::Shield => &mut self.equipped_shield,
            EquipSlot::Weapon => &mut self.equipped_weapon,
        }
    }

    pub fn equipped(&self, slot: EquipSlot) -> &Item {
        match slot {
            EquipSlot::Armor => &self.equipped_armor,
            EquipSlot::Shield => &self.equipped_shield,
            EquipSlot::Weapon => &self.equipped_weapon,
        }
    }

    /// Move `item` from the inventory into its slot.
    ///
    /// Whatever occupied the slot goes back into the inventory first.
    pub fn equip_item(&mut self, item: &Item) -> Result<(), CharacterError> {
        let slot =
            EquipSlot::for_item(item).ok_or_else(|| CharacterError::NotEquippable(item.name.clone()))?;
        let index = self
            .inventory
            .iter()
            .position(|i| i == item)
            .ok_or_else(|| CharacterError::NotInInventory(item.name.clone()))?;

        let item = self.inventory.remove(index);
        self.modify_weight_carried(&item, 1, WeightDirection::Remove);

        if !self.equipped(slot).is_sentinel() {
            self.move_slot_to_inventory(slot);
        }

        self.modify_weight_carried(&item, 1, WeightDirection::Add);
        tracing::debug!(item = %item, ?slot, "equipped item");
        *self.slot_mut(slot) = item;

        self.set_armor_class();
        self.set_movement_rate();
        Ok(())
    }

    /// Move `item` out of its slot and back into the inventory.
    pub fn unequip_item(&mut self, item: &Item) -> Result<(), CharacterError> {
        let slot =
            EquipSlot::for_item(item).ok_or_else(|| CharacterError::NotEquipped(item.name.clone()))?;
        if item.is_sentinel() || self.equipped(slot) != item {
            return Err(CharacterError::NotEquipped(item.name.clone()));
        }

        self.move_slot_to_inventory(slot);
        tracing::debug!(item = %item, ?slot, "unequipped item");

        self.set_armor_class();
        self.set_movement_rate();
        Ok(())
    }

    fn move_slot_to_inventory(&mut self, slot: EquipSlot) {
        let item = std::mem::replace(self.slot_mut(slot), slot.empty_item());
        self.modify_weight_carried(&item, 1, WeightDirection::Remove);
        self.modify_weight_carried(&item, 1, WeightDirection::Add);
        self.inventory.push(item);
    }

    // ------------------------------------------------------------------
    // Spells and languages
    // ------------------------------------------------------------------

    /// Learn the spell chosen during creation, on top of the class's
    /// starting spells.
    pub fn choose_spell(&mut self, spell: &str) -> Result<(), CharacterError> {
        let casting = self.spellcasting.ok_or_else(|| {
            CharacterError::NotASpellcaster(
                self.class.map(|c| c.name().to_string()).unwrap_or_default(),
            )
        })?;
        let chosen = casting
            .spell_options()
            .iter()
            .find(|s| s.eq_ignore_ascii_case(spell.trim()))
            .ok_or_else(|| CharacterError::UnknownSpell(spell.to_string()))?;

        let mut spells: Vec<String> = casting
            .starting_spells()
            .iter()
            .map(|s| s.to_string())
            .collect();
        spells.push(chosen.to_string());
        self.spells = Some(spells);
        Ok(())
    }

    /// Common plus the race's own languages.
    pub fn default_languages(&self) -> Vec<String> {
        match self.race {
            Some(race) => race.data().languages.iter().map(|l| l.to_string()).collect(),
            None => vec!["Common".to_string()],
        }
    }

    /// How many languages beyond the defaults this character may learn.
    pub fn extra_language_slots(&self) -> usize {
        self.abilities.modifier(Ability::Intelligence).max(0) as usize
    }

    /// Languages that could still be learned.
    pub fn learnable_languages(&self) -> Vec<String> {
        let known = self.default_languages();
        LEARNABLE_LANGUAGES
            .iter()
            .filter(|l| !known.iter().any(|k| k == *l))
            .map(|l| l.to_string())
            .collect()
    }

    /// Set known languages to the defaults plus `extras`.
    pub fn assign_languages(&mut self, extras: &[String]) -> Result<(), CharacterError> {
        let allowed = self.extra_language_slots();
        if extras.len() > allowed {
            return Err(CharacterError::TooManyLanguages {
                allowed,
                chosen: extras.len(),
            });
        }

        let learnable = self.learnable_languages();
        let mut languages = self.default_languages();
        for extra in extras {
            let language = learnable
                .iter()
                .find(|l| l.eq_ignore_ascii_case(extra.trim()))
                .ok_or_else(|| {
                    if languages.iter().any(|k| k.eq_ignore_ascii_case(extra.trim())) {
                        CharacterError::DuplicateLanguage(extra.clone())
                    } else {
                        CharacterError::UnknownLanguage(extra.clone())
                    }
                })?;
            if languages.contains(language) {
                return Err(CharacterError::DuplicateLanguage(language.clone()));
            }
            languages.push(language.clone());
        }

        self.languages = languages;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Reset
    // ------------------------------------------------------------------

    /// Drop everything layered on after race and class were applied:
    /// name, spells, languages, money, inventory and equipment. The class
    /// starting kit is handed out again.
    pub fn reset_character(&mut self) {
        self.name.clear();
        self.spells = None;
        self.languages.clear();
        self.money = 0.0;
        self.inventory.clear();
        self.equipped_armor = items::no_armor();
        self.equipped_shield = items::no_shield();
        self.equipped_weapon = items::no_weapon();
        self.weight_carried = 0.0;
        self.grant_starting_kit();

        if self.race.is_some() && self.class.is_some() {
            self.set_armor_class();
            self.set_movement_rate();
        }
    }
}
