//! Standard equipment catalog.
//!
//! Contains general gear, weapons, projectiles and armor with their cost,
//! weight and combat attributes. The catalog is immutable; characters hold
//! clones of its entries.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How an armor piece affects movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArmorBulk {
    /// No armor at all, or a shield.
    Unarmored,
    Leather,
    /// Chain, plate and anything heavier than leather.
    Metal,
}

/// What an item is, with the attributes specific to that kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ItemKind {
    General,
    Weapon {
        damage: String,
    },
    RangedWeapon {
        /// Short, medium and long range in feet.
        ranges: [u32; 3],
    },
    Projectile {
        damage: String,
    },
    Armor {
        armor_class: i32,
        shield: bool,
        bulk: ArmorBulk,
    },
}

/// A catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub name: String,
    /// Price in gold pieces.
    pub cost: f64,
    /// Weight in pounds.
    pub weight: f64,
    pub kind: ItemKind,
}

impl Item {
    pub fn general(name: impl Into<String>, cost: f64, weight: f64) -> Self {
        Self {
            name: name.into(),
            cost,
            weight,
            kind: ItemKind::General,
        }
    }

    pub fn weapon(name: impl Into<String>, cost: f64, weight: f64, damage: &str) -> Self {
        Self {
            name: name.into(),
            cost,
            weight,
            kind: ItemKind::Weapon {
                damage: damage.to_string(),
            },
        }
    }

    pub fn ranged(name: impl Into<String>, cost: f64, weight: f64, ranges: [u32; 3]) -> Self {
        Self {
            name: name.into(),
            cost,
            weight,
            kind: ItemKind::RangedWeapon { ranges },
        }
    }

    pub fn projectile(name: impl Into<String>, cost: f64, weight: f64, damage: &str) -> Self {
        Self {
            name: name.into(),
            cost,
            weight,
            kind: ItemKind::Projectile {
                damage: damage.to_string(),
            },
        }
    }

    pub fn armor(
        name: impl Into<String>,
        cost: f64,
        weight: f64,
        armor_class: i32,
        bulk: ArmorBulk,
    ) -> Self {
        Self {
            name: name.into(),
            cost,
            weight,
            kind: ItemKind::Armor {
                armor_class,
                shield: false,
                bulk,
            },
        }
    }

    pub fn shield(name: impl Into<String>, cost: f64, weight: f64, armor_class: i32) -> Self {
        Self {
            name: name.into(),
            cost,
            weight,
            kind: ItemKind::Armor {
                armor_class,
                shield: true,
                bulk: ArmorBulk::Unarmored,
            },
        }
    }

    /// Armor or shield.
    pub fn is_armor(&self) -> bool {
        matches!(self.kind, ItemKind::Armor { .. })
    }

    pub fn is_shield(&self) -> bool {
        matches!(self.kind, ItemKind::Armor { shield: true, .. })
    }

    /// Melee or ranged weapon.
    pub fn is_weapon(&self) -> bool {
        matches!(
            self.kind,
            ItemKind::Weapon { .. } | ItemKind::RangedWeapon { .. }
        )
    }

    /// Armor class contribution; zero for anything that is not armor.
    pub fn armor_class(&self) -> i32 {
        match self.kind {
            ItemKind::Armor { armor_class, .. } => armor_class,
            _ => 0,
        }
    }

    pub fn bulk(&self) -> ArmorBulk {
        match self.kind {
            ItemKind::Armor { bulk, .. } => bulk,
            _ => ArmorBulk::Unarmored,
        }
    }

    /// Slot placeholders ("No Armor", "No Shield", "No Weapon").
    pub fn is_sentinel(&self) -> bool {
        [NO_ARMOR, NO_SHIELD, NO_WEAPON].contains(&self.name.as_str())
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

// ============================================================================
// Sentinels
// ============================================================================

pub const NO_ARMOR: &str = "No Armor";
pub const NO_SHIELD: &str = "No Shield";
pub const NO_WEAPON: &str = "No Weapon";
pub const SPELLBOOK: &str = "Spellbook";

/// Armor slot placeholder; its armor class is the unarmored base.
pub fn no_armor() -> Item {
    Item::armor(NO_ARMOR, 0.0, 0.0, 11, ArmorBulk::Unarmored)
}

pub fn no_shield() -> Item {
    Item::shield(NO_SHIELD, 0.0, 0.0, 0)
}

pub fn no_weapon() -> Item {
    Item::weapon(NO_WEAPON, 0.0, 0.0, "1d2")
}

/// Starting-kit item for arcane casters.
pub fn spellbook() -> Item {
    Item::general(SPELLBOOK, 25.0, 1.0)
}

// ============================================================================
// Lookup
// ============================================================================

/// Find any catalog item, sentinel or spellbook by name (case-insensitive).
pub fn find_item(name: &str) -> Option<Item> {
    let wanted = name.trim();
    let sentinels = [no_armor(), no_shield(), no_weapon(), spellbook()];
    sentinels
        .into_iter()
        .chain(all_items().cloned())
        .find(|item| item.name.eq_ignore_ascii_case(wanted))
}

/// Every purchasable item, general gear first.
pub fn all_items() -> impl Iterator<Item = &'static Item> {
    GENERAL_GEAR
        .iter()
        .chain(WEAPONS.iter())
        .chain(RANGED_WEAPONS.iter())
        .chain(PROJECTILES.iter())
        .chain(ARMOR.iter())
}

pub fn general_gear() -> &'static [Item] {
    &GENERAL_GEAR
}

pub fn weapons() -> &'static [Item] {
    &WEAPONS
}

pub fn ranged_weapons() -> &'static [Item] {
    &RANGED_WEAPONS
}

pub fn projectiles() -> &'static [Item] {
    &PROJECTILES
}

pub fn armor() -> &'static [Item] {
    &ARMOR
}

lazy_static::lazy_static! {
    static ref GENERAL_GEAR: Vec<Item> = vec![
        Item::general("Backpack", 4.0, 2.0),
        Item::general("Belt Pouch", 1.0, 0.5),
        Item::general("Bedroll", 2.0, 5.0),
        Item::general("Candles (12)", 1.0, 0.5),
        Item::general("Chalk", 2.0, 0.1),
        Item::general("Cloak", 2.0, 1.0),
        Item::general("Common Clothing", 4.0, 1.0),
        Item::general("Glass Bottle", 1.0, 0.1),
        Item::general("Grappling Hook", 2.0, 4.0),
        Item::general("Holy Symbol", 25.0, 0.1),
        Item::general("Holy Water", 10.0, 0.1),
        Item::general("Iron Spikes (12)", 1.0, 1.0),
        Item::general("Ladder (10 ft)", 1.0, 20.0),
        Item::general("Lantern", 5.0, 2.0),
        Item::general("Lock", 20.0, 1.0),
        Item::general("Manacles", 6.0, 4.0),
        Item::general("Steel Mirror", 20.0, 0.5),
        Item::general("Oil Flask", 0.1, 1.0),
        Item::general("Pole (10 ft)", 1.0, 10.0),
        Item::general("Dry Rations (1 week)", 10.0, 14.0),
        Item::general("Hemp Rope (50 ft)", 1.0, 5.0),
        Item::general("Silk Rope (50 ft)", 10.0, 2.0),
        Item::general("Large Sack", 1.0, 0.1),
        Item::general("Small Sack", 0.5, 0.1),
        Item::general("Tent", 20.0, 20.0),
        Item::general("Thieves' Picks and Tools", 25.0, 1.0),
        Item::general("Tinderbox", 3.0, 1.0),
        Item::general("Torches (6)", 1.0, 1.0),
        Item::general("Whetstone", 1.0, 1.0),
        Item::general("Waterskin", 1.0, 2.0),
    ];

    static ref WEAPONS: Vec<Item> = vec![
        // Axes
        Item::weapon("Hand Axe", 4.0, 5.0, "1d6"),
        Item::weapon("Battle Axe", 7.0, 7.0, "1d8"),
        Item::weapon("Great Axe", 14.0, 15.0, "1d10"),
        // Hammers and maces
        Item::weapon("Warhammer", 4.0, 6.0, "1d6"),
        Item::weapon("Mace", 6.0, 10.0, "1d8"),
        Item::weapon("Maul", 10.0, 16.0, "1d10"),
        Item::weapon("Club", 0.2, 1.0, "1d4"),
        Item::weapon("Quarterstaff", 2.0, 4.0, "1d6"),
        // Swords and daggers
        Item::weapon("Dagger", 2.0, 1.0, "1d4"),
        Item::weapon("Silver Dagger", 25.0, 1.0, "1d4"),
        Item::weapon("Shortsword", 6.0, 3.0, "1d6"),
        Item::weapon("Longsword", 10.0, 4.0, "1d8"),
        Item::weapon("Scimitar", 10.0, 4.0, "1d8"),
        Item::weapon("Two-Handed Sword", 18.0, 10.0, "1d10"),
        // Spears and polearms
        Item::weapon("Spear", 5.0, 5.0, "1d6"),
        Item::weapon("Pole Arm", 9.0, 15.0, "1d10"),
    ];

    static ref RANGED_WEAPONS: Vec<Item> = vec![
        Item::ranged("Shortbow", 25.0, 2.0, [50, 100, 150]),
        Item::ranged("Longbow", 60.0, 3.0, [70, 140, 210]),
        Item::ranged("Light Crossbow", 30.0, 7.0, [60, 120, 180]),
        Item::ranged("Heavy Crossbow", 50.0, 14.0, [80, 160, 240]),
        Item::ranged("Sling", 1.0, 0.5, [30, 60, 90]),
    ];

    static ref PROJECTILES: Vec<Item> = vec![
        Item::projectile("Shortbow Arrow", 0.1, 0.1, "1d6"),
        Item::projectile("Longbow Arrow", 0.2, 0.1, "1d8"),
        Item::projectile("Silver Arrow", 2.0, 0.1, "1d6"),
        Item::projectile("Light Quarrel", 0.2, 0.1, "1d6"),
        Item::projectile("Heavy Quarrel", 0.4, 0.1, "1d8"),
        Item::projectile("Sling Bullet", 0.1, 0.1, "1d4"),
    ];

    static ref ARMOR: Vec<Item> = vec![
        Item::armor("Leather Armor", 20.0, 15.0, 13, ArmorBulk::Leather),
        Item::armor("Chain Mail", 60.0, 40.0, 15, ArmorBulk::Metal),
        Item::armor("Plate Mail", 300.0, 50.0, 17, ArmorBulk::Metal),
        Item::shield("Shield", 7.0, 5.0, 1),
    ];
}
