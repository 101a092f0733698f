//! End-to-end tests for the creation flow.
//!
//! Run with: `cargo test -p chargen-core --test creation_flow`

use chargen_core::items;
use chargen_core::testing::{complete_flow, ScriptedDice};
use chargen_core::{CharacterClass, CreationFlow, CreationStep, FlowError, RaceType};

// =============================================================================
// All nines
// =============================================================================

#[test]
fn test_all_nines_scenario() {
    // Every die shows 3, so every ability is 9.
    let mut flow = CreationFlow::new(ScriptedDice::constant(3));
    assert!(flow.roll_abilities().unwrap());

    let abilities = flow.abilities().unwrap();
    assert_eq!(abilities.strength.base, 9);
    assert_eq!(abilities.intelligence.modifier, 1);

    flow.advance().unwrap();
    assert_eq!(flow.step(), CreationStep::RaceClassSelect);

    let labels: Vec<String> = flow
        .possible_characters()
        .iter()
        .map(|p| p.to_string())
        .collect();

    // Combination classes appear because both prerequisites are met.
    assert!(labels.contains(&"Elf Fighter/Magic-User".to_string()));
    assert!(labels.contains(&"Elf Magic-User/Thief".to_string()));

    for forbidden in [
        "Dwarf Magic-User",
        "Halfling Magic-User",
        "Dwarf Fighter/Magic-User",
        "Human Magic-User/Thief",
        "Halfling Magic-User/Thief",
        "Human Fighter/Magic-User",
    ] {
        assert!(!labels.contains(&forbidden.to_string()), "{forbidden}");
    }
    assert_eq!(labels.len(), 16);
    assert_eq!(labels.first().unwrap(), "Human Cleric");
    assert_eq!(labels.last().unwrap(), "Halfling Thief");
}

// =============================================================================
// Full runs
// =============================================================================

#[test]
fn test_every_legal_pair_completes() {
    let pairs: Vec<_> = {
        let mut flow = CreationFlow::new(ScriptedDice::constant(3));
        flow.roll_abilities().unwrap();
        flow.possible_characters()
    };

    for pair in pairs {
        let mut flow = CreationFlow::new(ScriptedDice::constant(3));
        complete_flow(&mut flow, pair.race, pair.class, "Pat", 60)
            .unwrap_or_else(|e| panic!("{pair} failed: {e}"));

        let character = flow.into_character().unwrap();
        assert_eq!(character.race, Some(pair.race));
        assert_eq!(character.class, Some(pair.class));
        assert!(character.hit_points >= 1);
        assert_eq!(character.level, 1);
        assert_eq!(character.xp, 0);
        assert_eq!(character.attack_bonus, 1);
        assert_eq!(character.spells.is_some(), pair.class.is_spellcaster());

        let has_book = character.inventory.contains(&items::spellbook());
        let arcane = matches!(
            pair.class,
            CharacterClass::MagicUser
                | CharacterClass::FighterMagicUser
                | CharacterClass::MagicUserThief
        );
        assert_eq!(has_book, arcane, "{pair}");
    }
}

#[test]
fn test_shopping_after_creation() {
    let mut flow = CreationFlow::new(ScriptedDice::constant(3));
    complete_flow(&mut flow, RaceType::Halfling, CharacterClass::Fighter, "Pip", 100).unwrap();

    let mut shop = flow.shop().unwrap();
    let leather = items::find_item("Leather Armor").unwrap();
    let shield = items::find_item("Shield").unwrap();
    assert!(shop.buy_item(&leather, 1));
    assert!(shop.buy_item(&shield, 1));
    shop.equip_item(&leather).unwrap();
    shop.equip_item(&shield).unwrap();

    // Leather 15 lb and shield 5 lb, both at a quarter for a Halfling.
    let character = shop.character();
    assert_eq!(character.weight_carried, 5.0);
    assert_eq!(character.armor_class, 13 + 1);
    assert_eq!(character.movement_rate, 30);
    assert_eq!(character.money, 73.0);

    let plate = items::find_item("Plate Mail").unwrap();
    assert!(!shop.buy_item(&plate, 1));
}

#[test]
fn test_back_from_naming_then_forward_keeps_a_spell() {
    let mut flow = CreationFlow::new(ScriptedDice::constant(3));
    flow.roll_abilities().unwrap();
    flow.advance().unwrap();
    flow.choose_race(RaceType::Elf).unwrap();
    flow.choose_class(CharacterClass::MagicUser).unwrap();
    flow.advance().unwrap();
    flow.choose_spell("Sleep").unwrap();
    flow.advance().unwrap();
    flow.advance().unwrap();
    assert_eq!(flow.step(), CreationStep::Naming);

    flow.back().unwrap();
    assert_eq!(flow.step(), CreationStep::LanguageSelect);
    assert_eq!(flow.advance(), Ok(CreationStep::SpellSelect));
    flow.choose_spell("Charm Person").unwrap();
    flow.advance().unwrap();
    flow.advance().unwrap();
    flow.set_name("Ilsa").unwrap();
    flow.advance().unwrap();
    flow.set_money(30).unwrap();
    assert_eq!(flow.advance(), Ok(CreationStep::Complete));

    let character = flow.into_character().unwrap();
    assert_eq!(
        character.spells,
        Some(vec!["Read Magic".to_string(), "Charm Person".to_string()])
    );
}

#[test]
fn test_name_is_required_before_money() {
    let mut flow = CreationFlow::new(ScriptedDice::constant(3));
    flow.roll_abilities().unwrap();
    flow.advance().unwrap();
    flow.choose_race(RaceType::Dwarf).unwrap();
    flow.choose_class(CharacterClass::Thief).unwrap();
    flow.advance().unwrap();
    flow.advance().unwrap();

    assert_eq!(flow.step(), CreationStep::Naming);
    assert_eq!(flow.advance(), Err(FlowError::EmptyName));
    assert!(matches!(
        flow.roll_money(),
        Err(FlowError::WrongStep { .. })
    ));
}

#[test]
fn test_back_and_forward_again() {
    let mut flow = CreationFlow::new(ScriptedDice::constant(3));
    flow.roll_abilities().unwrap();
    flow.advance().unwrap();
    flow.choose_race(RaceType::Human).unwrap();
    flow.choose_class(CharacterClass::Cleric).unwrap();
    flow.advance().unwrap();
    flow.choose_spell("Light").unwrap();
    flow.advance().unwrap();
    assert_eq!(flow.step(), CreationStep::LanguageSelect);

    flow.back().unwrap();
    assert_eq!(flow.step(), CreationStep::SpellSelect);
    assert_eq!(flow.character().spells, None);

    flow.back().unwrap();
    flow.choose_race(RaceType::Elf).unwrap();
    flow.choose_class(CharacterClass::MagicUser).unwrap();
    flow.advance().unwrap();
    flow.choose_spell("Shield").unwrap();
    flow.advance().unwrap();

    let character = flow.character();
    assert_eq!(character.race, Some(RaceType::Elf));
    assert_eq!(character.inventory, vec![items::spellbook()]);
    assert_eq!(character.languages, vec!["Common", "Elvish"]);
    assert_eq!(character.saving_throws.to_array(), [13, 16, 14, 16, 17]);
}

#[test]
fn test_seeded_flows_are_reproducible() {
    let mut a = CreationFlow::seeded(2024);
    let mut b = CreationFlow::seeded(2024);
    a.roll_abilities().unwrap();
    b.roll_abilities().unwrap();
    assert_eq!(a.abilities(), b.abilities());
    assert_eq!(a.possible_characters(), b.possible_characters());
}
