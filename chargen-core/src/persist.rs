//! Character persistence for save/load functionality.
//!
//! A [`CharacterRecord`] is the flat, serializable form of a finished
//! [`Character`]. Records live in numbered slots of a single JSON
//! [`SaveFile`].

use crate::abilities::{Abilities, Ability};
use crate::character::{CarryingCapacity, Character};
use crate::class_data::{CharacterClass, RaceType, SavingThrows};
use crate::items::{self, Item};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use thiserror::Error;
use tokio::fs;

/// Errors from persistence operations.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },

    #[error("Character has no race or class yet")]
    IncompleteCharacter,

    #[error("Unknown race: {0}")]
    UnknownRace(String),

    #[error("Unknown class: {0}")]
    UnknownClass(String),

    #[error("Unknown item: {0}")]
    UnknownItem(String),

    #[error("{ability} modifier {found} does not match base score {base}")]
    InconsistentAbility { ability: Ability, base: u8, found: i8 },

    #[error("Carried weight {found} does not match the items carried ({expected})")]
    InconsistentWeight { expected: f64, found: f64 },

    #[error("Armor class {found} does not match the equipment worn ({expected})")]
    InconsistentArmorClass { expected: i32, found: i32 },
}

/// Slack allowed between a stored weight and the sum of the items.
const WEIGHT_TOLERANCE: f64 = 1e-6;

/// Current save file version.
const SAVE_VERSION: u32 = 1;

/// Number of slots offered by default.
pub const DEFAULT_SLOT_COUNT: u8 = 9;

// ============================================================================
// Character records
// ============================================================================

/// One inventory line: an item name and how many copies are carried.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryEntry {
    pub item: String,
    pub count: u32,
}

/// Flat record of a character.
///
/// Derived statistics are stored as computed so a loaded character never
/// re-rolls anything.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterRecord {
    pub name: String,
    pub race: String,
    pub class: String,
    pub abilities: Abilities,
    pub level: u8,
    pub xp: u32,
    pub xp_to_next_level: u32,
    pub money: f64,
    pub inventory: Vec<InventoryEntry>,
    pub equipped_armor: String,
    pub equipped_shield: String,
    pub equipped_weapon: String,

    pub armor_class: i32,
    pub hit_points: i32,
    pub attack_bonus: i32,
    pub movement_rate: u32,
    pub saving_throws: SavingThrows,
    pub special_abilities: Vec<String>,
    pub weight_carried: f64,
    pub carrying_capacity: CarryingCapacity,

    #[serde(default)]
    pub spells: Option<Vec<String>>,
    #[serde(default)]
    pub languages: Vec<String>,
}

/// Flatten a character into a record.
pub fn serialize(character: &Character) -> Result<CharacterRecord, PersistError> {
    let race = character.race.ok_or(PersistError::IncompleteCharacter)?;
    let class = character.class.ok_or(PersistError::IncompleteCharacter)?;

    let inventory = character
        .inventory_counts()
        .into_iter()
        .map(|(item, count)| InventoryEntry {
            item: item.name,
            count,
        })
        .collect();

    Ok(CharacterRecord {
        name: character.name.clone(),
        race: race.name().to_string(),
        class: class.name().to_string(),
        abilities: character.abilities.clone(),
        level: character.level,
        xp: character.xp,
        xp_to_next_level: character.xp_to_next_level,
        money: character.money,
        inventory,
        equipped_armor: character.equipped_armor.name.clone(),
        equipped_shield: character.equipped_shield.name.clone(),
        equipped_weapon: character.equipped_weapon.name.clone(),
        armor_class: character.armor_class,
        hit_points: character.hit_points,
        attack_bonus: character.attack_bonus,
        movement_rate: character.movement_rate,
        saving_throws: character.saving_throws,
        special_abilities: character.special_abilities.clone(),
        weight_carried: character.weight_carried,
        carrying_capacity: character.carrying_capacity,
        spells: character.spells.clone(),
        languages: character.languages.clone(),
    })
}

fn lookup_item(name: &str) -> Result<Item, PersistError> {
    items::find_item(name).ok_or_else(|| PersistError::UnknownItem(name.to_string()))
}

/// Modifiers must be exactly what the base scores produce.
fn check_abilities(abilities: &Abilities) -> Result<(), PersistError> {
    let b = |ability: Ability| abilities.base(ability);
    let expected = Abilities::from_bases(
        b(Ability::Strength),
        b(Ability::Dexterity),
        b(Ability::Constitution),
        b(Ability::Intelligence),
        b(Ability::Wisdom),
        b(Ability::Charisma),
    );
    for ability in Ability::all() {
        let found = abilities.modifier(ability);
        if found != expected.modifier(ability) {
            return Err(PersistError::InconsistentAbility {
                ability,
                base: abilities.base(ability),
                found,
            });
        }
    }
    Ok(())
}

/// Weight and armor class must agree with what is carried and worn.
fn check_equipment(character: &Character) -> Result<(), PersistError> {
    let expected = character
        .inventory
        .iter()
        .chain([
            &character.equipped_armor,
            &character.equipped_shield,
            &character.equipped_weapon,
        ])
        .map(|item| character.effective_weight(item))
        .sum::<f64>();
    if (expected - character.weight_carried).abs() > WEIGHT_TOLERANCE {
        return Err(PersistError::InconsistentWeight {
            expected,
            found: character.weight_carried,
        });
    }

    let expected = character.equipped_armor.armor_class()
        + character.equipped_shield.armor_class()
        + character.abilities.modifier(Ability::Dexterity) as i32;
    if expected != character.armor_class {
        return Err(PersistError::InconsistentArmorClass {
            expected,
            found: character.armor_class,
        });
    }
    Ok(())
}

/// Rebuild a character from a record without rolling any dice.
///
/// Ability modifiers, carried weight and armor class are checked against
/// the rest of the record, so a tampered record is an error.
pub fn deserialize(record: &CharacterRecord) -> Result<Character, PersistError> {
    check_abilities(&record.abilities)?;
    let race = RaceType::from_name(&record.race)
        .ok_or_else(|| PersistError::UnknownRace(record.race.clone()))?;
    let class = CharacterClass::from_name(&record.class)
        .ok_or_else(|| PersistError::UnknownClass(record.class.clone()))?;

    let mut character = Character::new(record.abilities.clone());
    character.set_race(race);
    character.apply_class_definition(class);
    character.set_max_hit_die();

    character.name = record.name.clone();
    character.level = record.level;
    character.xp = record.xp;
    character.xp_to_next_level = record.xp_to_next_level;
    character.money = record.money;

    for entry in &record.inventory {
        let item = lookup_item(&entry.item)?;
        character
            .inventory
            .extend(std::iter::repeat(item).take(entry.count as usize));
    }
    character.equipped_armor = lookup_item(&record.equipped_armor)?;
    character.equipped_shield = lookup_item(&record.equipped_shield)?;
    character.equipped_weapon = lookup_item(&record.equipped_weapon)?;

    character.armor_class = record.armor_class;
    character.hit_points = record.hit_points;
    character.attack_bonus = record.attack_bonus;
    character.movement_rate = record.movement_rate;
    character.saving_throws = record.saving_throws;
    character.special_abilities = record.special_abilities.clone();
    character.weight_carried = record.weight_carried;
    character.carrying_capacity = record.carrying_capacity;
    character.spells = record.spells.clone();
    character.languages = record.languages.clone();

    check_equipment(&character)?;
    Ok(character)
}

// ============================================================================
// Slots
// ============================================================================

/// Address of a save slot, e.g. `slot_03`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SlotId(String);

impl SlotId {
    pub fn new(index: u8) -> Self {
        Self(format!("slot_{index:02}"))
    }

    /// The first `count` slot ids, in order.
    pub fn all(count: u8) -> Vec<SlotId> {
        (0..count).map(SlotId::new).collect()
    }

    /// Index of a well-formed slot id.
    pub fn index(&self) -> Option<u8> {
        self.0.strip_prefix("slot_")?.parse().ok()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Metadata about a saved character for quick display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterMetadata {
    pub name: String,
    pub race: String,
    pub class: String,
    pub level: u8,
}

/// A character stored in a slot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedCharacter {
    /// When the character was saved.
    pub saved_at: String,

    /// Quick-access metadata about the character.
    pub metadata: CharacterMetadata,

    pub record: CharacterRecord,
}

impl SavedCharacter {
    pub fn new(character: &Character) -> Result<Self, PersistError> {
        let record = serialize(character)?;
        let metadata = CharacterMetadata {
            name: record.name.clone(),
            race: record.race.clone(),
            class: record.class.clone(),
            level: record.level,
        };
        Ok(Self {
            saved_at: chrono_now(),
            metadata,
            record,
        })
    }
}

/// All save slots, as stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveFile {
    /// Save format version for compatibility checking.
    pub version: u32,

    /// Occupied slots; a missing key is an empty slot.
    pub slots: BTreeMap<SlotId, SavedCharacter>,
}

impl Default for SaveFile {
    fn default() -> Self {
        Self {
            version: SAVE_VERSION,
            slots: BTreeMap::new(),
        }
    }
}

impl SaveFile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write a character into a slot, overwriting whatever was there.
    pub fn store(&mut self, slot: SlotId, character: &Character) -> Result<(), PersistError> {
        let saved = SavedCharacter::new(character)?;
        tracing::info!(slot = %slot, name = %saved.metadata.name, "stored character");
        self.slots.insert(slot, saved);
        Ok(())
    }

    /// Read a character back. An empty slot is `Ok(None)`.
    pub fn load(&self, slot: &SlotId) -> Result<Option<Character>, PersistError> {
        match self.slots.get(slot) {
            Some(saved) => deserialize(&saved.record).map(Some),
            None => Ok(None),
        }
    }

    /// Empty a slot. Returns whether it was occupied.
    pub fn clear(&mut self, slot: &SlotId) -> bool {
        self.slots.remove(slot).is_some()
    }

    /// Every slot up to `count`, with metadata for the occupied ones.
    pub fn list_slots(&self, count: u8) -> Vec<(SlotId, Option<CharacterMetadata>)> {
        SlotId::all(count)
            .into_iter()
            .map(|slot| {
                let metadata = self.slots.get(&slot).map(|s| s.metadata.clone());
                (slot, metadata)
            })
            .collect()
    }

    /// Save to a JSON file, creating parent directories as needed.
    pub async fn save_json(&self, path: impl AsRef<Path>) -> Result<(), PersistError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content).await?;
        tracing::info!(path = %path.display(), slots = self.slots.len(), "saved characters");
        Ok(())
    }

    /// Load from a JSON file. A file that does not exist yet is an empty
    /// save file.
    pub async fn load_json(path: impl AsRef<Path>) -> Result<Self, PersistError> {
        let path = path.as_ref();
        let content = match fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "no save file yet");
                return Ok(Self::new());
            }
            Err(e) => return Err(e.into()),
        };
        let saved: Self = serde_json::from_str(&content)?;

        if saved.version != SAVE_VERSION {
            return Err(PersistError::VersionMismatch {
                expected: SAVE_VERSION,
                found: saved.version,
            });
        }

        tracing::info!(path = %path.display(), slots = saved.slots.len(), "loaded characters");
        Ok(saved)
    }
}

/// Get current timestamp as seconds since the Unix epoch.
fn chrono_now() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};

    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();

    format!("{}", now.as_secs())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{sample_archer, sample_fighter, sample_mage};

    #[test]
    fn test_slot_ids() {
        assert_eq!(SlotId::new(0).as_str(), "slot_00");
        assert_eq!(SlotId::new(8).to_string(), "slot_08");
        assert_eq!(SlotId::all(DEFAULT_SLOT_COUNT).len(), 9);
        assert_eq!(SlotId::new(7).index(), Some(7));
    }

    #[test]
    fn test_record_round_trip() {
        let fighter = sample_fighter("Round Trip");
        let record = serialize(&fighter).unwrap();
        assert_eq!(record.race, "Human");
        assert_eq!(record.equipped_armor, "Chain Mail");

        let restored = deserialize(&record).unwrap();
        assert_eq!(restored, fighter);
        assert_eq!(restored.max_hit_die(), fighter.max_hit_die());
    }

    #[test]
    fn test_mage_round_trip_keeps_spells_and_languages() {
        let mage = sample_mage("Ilsa");
        let restored = deserialize(&serialize(&mage).unwrap()).unwrap();
        assert_eq!(restored.spells, mage.spells);
        assert_eq!(restored.languages, mage.languages);
        assert_eq!(restored.inventory_counts(), mage.inventory_counts());
        assert_eq!(restored.spellcasting(), mage.spellcasting());
    }

    #[test]
    fn test_incomplete_character_is_rejected() {
        let character = Character::new(Abilities::default());
        assert!(matches!(
            serialize(&character),
            Err(PersistError::IncompleteCharacter)
        ));
    }

    #[test]
    fn test_unknown_names_are_errors() {
        let mut record = serialize(&sample_fighter("Bad Data")).unwrap();
        record.race = "Gnome".to_string();
        assert!(matches!(deserialize(&record), Err(PersistError::UnknownRace(r)) if r == "Gnome"));

        let mut record = serialize(&sample_fighter("Bad Data")).unwrap();
        record.class = "Paladin".to_string();
        assert!(matches!(deserialize(&record), Err(PersistError::UnknownClass(_))));

        let mut record = serialize(&sample_fighter("Bad Data")).unwrap();
        record.equipped_weapon = "Vorpal Blade".to_string();
        assert!(matches!(deserialize(&record), Err(PersistError::UnknownItem(_))));
    }

    #[test]
    fn test_tampered_modifier_is_rejected() {
        let mut record = serialize(&sample_fighter("Cheater")).unwrap();
        record.abilities.strength.modifier = 3;
        assert!(matches!(
            deserialize(&record),
            Err(PersistError::InconsistentAbility {
                ability: Ability::Strength,
                base: 12,
                found: 3
            })
        ));

        // The language bonus is part of the derived Intelligence modifier.
        let mut record = serialize(&sample_fighter("Cheater")).unwrap();
        record.abilities.intelligence.modifier = 0;
        assert!(matches!(
            deserialize(&record),
            Err(PersistError::InconsistentAbility {
                ability: Ability::Intelligence,
                ..
            })
        ));
    }

    #[test]
    fn test_tampered_equipment_totals_are_rejected() {
        let mut record = serialize(&sample_fighter("Cheater")).unwrap();
        record.weight_carried = 1.0;
        assert!(matches!(
            deserialize(&record),
            Err(PersistError::InconsistentWeight { found, .. }) if found == 1.0
        ));

        let mut record = serialize(&sample_fighter("Cheater")).unwrap();
        record.armor_class = 20;
        assert!(matches!(
            deserialize(&record),
            Err(PersistError::InconsistentArmorClass {
                expected: 16,
                found: 20
            })
        ));
    }

    #[test]
    fn test_store_overwrites_and_empty_slot_loads_none() {
        let mut save = SaveFile::new();
        let slot = SlotId::new(2);

        assert!(save.load(&slot).unwrap().is_none());

        save.store(slot.clone(), &sample_fighter("First")).unwrap();
        save.store(slot.clone(), &sample_fighter("Second")).unwrap();
        assert_eq!(save.slots.len(), 1);
        assert_eq!(save.load(&slot).unwrap().unwrap().name, "Second");

        let listing = save.list_slots(DEFAULT_SLOT_COUNT);
        assert_eq!(listing.len(), 9);
        assert!(listing[0].1.is_none());
        assert_eq!(listing[2].1.as_ref().unwrap().name, "Second");

        assert!(save.clear(&slot));
        assert!(!save.clear(&slot));
    }

    #[test]
    fn test_record_json_shape() {
        let record = serialize(&sample_fighter("Shape")).unwrap();
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["carrying_capacity"]["Light Load"], 60.0);
        assert_eq!(json["inventory"][0]["count"], 1);
    }

    #[tokio::test]
    async fn test_save_file_save_and_load() {
        use tempfile::TempDir;

        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let save_path = temp_dir.path().join("nested").join("characters.json");

        let mut save = SaveFile::new();
        save.store(SlotId::new(0), &sample_fighter("Saved Hero"))
            .unwrap();
        save.save_json(&save_path)
            .await
            .expect("Save should succeed");
        assert!(save_path.exists());

        let loaded = SaveFile::load_json(&save_path)
            .await
            .expect("Load should succeed");
        let hero = loaded.load(&SlotId::new(0)).unwrap().unwrap();
        assert_eq!(hero, sample_fighter("Saved Hero"));
        assert_eq!(loaded.slots[&SlotId::new(0)].metadata.class, "Fighter");
    }

    #[tokio::test]
    async fn test_fractional_amounts_survive_the_file() {
        use tempfile::TempDir;

        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let save_path = temp_dir.path().join("characters.json");
        let archer = sample_archer("Fletch");
        assert_ne!(archer.money.fract(), 0.0);
        assert_ne!(archer.weight_carried.fract(), 0.0);

        let mut save = SaveFile::new();
        save.store(SlotId::new(1), &archer).unwrap();
        save.save_json(&save_path).await.unwrap();

        let loaded = SaveFile::load_json(&save_path).await.unwrap();
        let restored = loaded.load(&SlotId::new(1)).unwrap().unwrap();
        assert_eq!(restored.money.to_bits(), archer.money.to_bits());
        assert_eq!(
            restored.weight_carried.to_bits(),
            archer.weight_carried.to_bits()
        );
        assert_eq!(restored, archer);
    }

    #[tokio::test]
    async fn test_missing_file_is_empty() {
        use tempfile::TempDir;

        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let loaded = SaveFile::load_json(temp_dir.path().join("missing.json"))
            .await
            .expect("Missing file should load as empty");
        assert!(loaded.slots.is_empty());
    }

    #[tokio::test]
    async fn test_version_mismatch() {
        use tempfile::TempDir;

        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let save_path = temp_dir.path().join("old.json");
        std::fs::write(&save_path, r#"{"version": 99, "slots": {}}"#).unwrap();

        let result = SaveFile::load_json(&save_path).await;
        assert!(matches!(
            result,
            Err(PersistError::VersionMismatch {
                expected: 1,
                found: 99
            })
        ));
    }
}
