//! Race and class eligibility.
//!
//! Pure functions from rolled abilities to the races and classes a
//! character may take, and the legal race/class pairings between them.
//! Sets are ordered, so iteration always follows the canonical order
//! in which races and classes are declared.

use crate::abilities::Abilities;
use crate::class_data::{CharacterClass, RaceType};
use std::collections::BTreeSet;
use std::fmt;

/// Races whose prerequisites the abilities satisfy. Human is always present.
pub fn eligible_races(abilities: &Abilities) -> BTreeSet<RaceType> {
    RaceType::all()
        .iter()
        .copied()
        .filter(|race| race.data().requirements.iter().all(|r| r.is_met(abilities)))
        .collect()
}

/// Classes whose prerequisites the abilities satisfy.
///
/// Combination classes need both of their base classes' prerequisites, so
/// they only ever appear alongside those base classes.
pub fn eligible_classes(abilities: &Abilities) -> BTreeSet<CharacterClass> {
    CharacterClass::all()
        .iter()
        .copied()
        .filter(|class| {
            class
                .data()
                .requirements
                .iter()
                .all(|r| r.is_met(abilities))
        })
        .collect()
}

/// Whether any character can be built from these sets.
///
/// When Magic-User is the only reachable class, Dwarf and Halfling are
/// removed from `races` first, since neither may be a magic-user.
pub fn is_valid_combination(
    races: &mut BTreeSet<RaceType>,
    classes: &BTreeSet<CharacterClass>,
) -> bool {
    if classes.len() == 1 && classes.contains(&CharacterClass::MagicUser) {
        races.remove(&RaceType::Dwarf);
        races.remove(&RaceType::Halfling);
    }
    !classes.is_empty() && !races.is_empty()
}

/// Whether a single race may take a single class.
pub fn is_legal_pair(race: RaceType, class: CharacterClass) -> bool {
    if class.is_combination() {
        return race == RaceType::Elf;
    }
    !(class == CharacterClass::MagicUser
        && matches!(race, RaceType::Dwarf | RaceType::Halfling))
}

/// One legal race/class pairing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PossibleCharacter {
    pub race: RaceType,
    pub class: CharacterClass,
}

impl fmt::Display for PossibleCharacter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.race.name(), self.class.name())
    }
}

/// All legal pairings, races in the outer loop and classes in the inner
/// loop, both in canonical order.
pub fn build_possible_characters(
    races: &BTreeSet<RaceType>,
    classes: &BTreeSet<CharacterClass>,
) -> Vec<PossibleCharacter> {
    let mut possible = Vec::new();
    for &race in races {
        for &class in classes {
            if is_legal_pair(race, class) {
                possible.push(PossibleCharacter { race, class });
            }
        }
    }
    possible
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(possible: &[PossibleCharacter]) -> Vec<String> {
        possible.iter().map(|p| p.to_string()).collect()
    }

    #[test]
    fn test_human_always_eligible() {
        let abilities = Abilities::from_bases(3, 3, 3, 3, 3, 3);
        let races = eligible_races(&abilities);
        assert_eq!(races.into_iter().collect::<Vec<_>>(), vec![RaceType::Human]);
    }

    #[test]
    fn test_dwarf_boundaries() {
        let ok = Abilities::from_bases(10, 10, 9, 10, 10, 17);
        assert!(eligible_races(&ok).contains(&RaceType::Dwarf));

        let charismatic = Abilities::from_bases(10, 10, 9, 10, 10, 18);
        assert!(!eligible_races(&charismatic).contains(&RaceType::Dwarf));

        let frail = Abilities::from_bases(10, 10, 8, 10, 10, 10);
        assert!(!eligible_races(&frail).contains(&RaceType::Dwarf));
    }

    #[test]
    fn test_elf_boundaries() {
        assert!(eligible_races(&Abilities::from_bases(10, 10, 17, 9, 10, 10))
            .contains(&RaceType::Elf));
        assert!(!eligible_races(&Abilities::from_bases(10, 10, 18, 9, 10, 10))
            .contains(&RaceType::Elf));
        assert!(!eligible_races(&Abilities::from_bases(10, 10, 10, 8, 10, 10))
            .contains(&RaceType::Elf));
    }

    #[test]
    fn test_halfling_boundaries() {
        assert!(eligible_races(&Abilities::from_bases(17, 9, 10, 10, 10, 10))
            .contains(&RaceType::Halfling));
        assert!(!eligible_races(&Abilities::from_bases(18, 9, 10, 10, 10, 10))
            .contains(&RaceType::Halfling));
        assert!(!eligible_races(&Abilities::from_bases(10, 8, 10, 10, 10, 10))
            .contains(&RaceType::Halfling));
    }

    #[test]
    fn test_combination_classes_unlock() {
        let abilities = Abilities::from_bases(9, 8, 10, 9, 8, 10);
        let classes = eligible_classes(&abilities);
        assert_eq!(
            classes.into_iter().collect::<Vec<_>>(),
            vec![
                CharacterClass::Fighter,
                CharacterClass::MagicUser,
                CharacterClass::FighterMagicUser
            ]
        );

        let sneaky = Abilities::from_bases(8, 9, 10, 9, 8, 10);
        let classes = eligible_classes(&sneaky);
        assert!(classes.contains(&CharacterClass::MagicUserThief));
        assert!(!classes.contains(&CharacterClass::FighterMagicUser));
    }

    #[test]
    fn test_magic_user_only_excludes_dwarf_and_halfling() {
        let mut races: BTreeSet<_> = RaceType::all().iter().copied().collect();
        let classes: BTreeSet<_> = [CharacterClass::MagicUser].into_iter().collect();

        assert!(is_valid_combination(&mut races, &classes));
        assert_eq!(
            races.into_iter().collect::<Vec<_>>(),
            vec![RaceType::Human, RaceType::Elf]
        );
    }

    #[test]
    fn test_no_classes_is_invalid() {
        let mut races: BTreeSet<_> = [RaceType::Human].into_iter().collect();
        assert!(!is_valid_combination(&mut races, &BTreeSet::new()));
    }

    #[test]
    fn test_refinement_only_for_exact_magic_user_set() {
        let mut races: BTreeSet<_> = RaceType::all().iter().copied().collect();
        let classes: BTreeSet<_> = [CharacterClass::MagicUser, CharacterClass::Thief]
            .into_iter()
            .collect();
        assert!(is_valid_combination(&mut races, &classes));
        assert_eq!(races.len(), 4);
    }

    #[test]
    fn test_possible_characters_order_and_exclusions() {
        let races: BTreeSet<_> = RaceType::all().iter().copied().collect();
        let classes: BTreeSet<_> = CharacterClass::all().iter().copied().collect();
        let possible = labels(&build_possible_characters(&races, &classes));

        assert_eq!(
            possible,
            vec![
                "Human Cleric",
                "Human Fighter",
                "Human Magic-User",
                "Human Thief",
                "Elf Cleric",
                "Elf Fighter",
                "Elf Magic-User",
                "Elf Thief",
                "Elf Fighter/Magic-User",
                "Elf Magic-User/Thief",
                "Dwarf Cleric",
                "Dwarf Fighter",
                "Dwarf Thief",
                "Halfling Cleric",
                "Halfling Fighter",
                "Halfling Thief",
            ]
        );
    }
}
