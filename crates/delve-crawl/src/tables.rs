//! Wandering and room monster tables, indexed by dungeon depth.
//!
//! Each depth band has a d20 table. Monster special attacks are a closed
//! enum so combat can match them exhaustively.

use delve_mechanics::Roller;
use delve_mechanics::dice::formula::evaluate;
use serde::{Deserialize, Serialize};

use crate::party::SaveCategory;
use crate::treasure::TreasureType;
use crate::treasure::TreasureType as T;

use SpecialAbility::{Charm, EnergyDrain, Paralysis, Petrification, Poison};

/// An effect a monster applies when it hits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SpecialAbility {
    /// Save vs death or die.
    Poison,
    /// Save vs paralysis or be paralyzed for the encounter.
    Paralysis,
    /// Save vs petrification or turn to stone.
    Petrification,
    /// Save vs death or lose a level.
    EnergyDrain,
    /// Save vs spells or be charmed for the encounter.
    Charm,
}

impl SpecialAbility {
    /// The saving throw that resists this ability.
    pub fn save(self) -> SaveCategory {
        match self {
            Self::Poison | Self::EnergyDrain => SaveCategory::DeathPoison,
            Self::Paralysis | Self::Petrification => SaveCategory::ParalysisPetrify,
            Self::Charm => SaveCategory::Spells,
        }
    }
}

impl std::fmt::Display for SpecialAbility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Poison => write!(f, "poison"),
            Self::Paralysis => write!(f, "paralysis"),
            Self::Petrification => write!(f, "petrification"),
            Self::EnergyDrain => write!(f, "energy drain"),
            Self::Charm => write!(f, "charm"),
        }
    }
}

/// Static monster statistics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonsterDef {
    /// Display name (plural form reads well in logs).
    pub name: &'static str,
    /// Number appearing formula.
    pub number: &'static str,
    /// Hit dice; fractional for creatures under one full die.
    pub hit_dice: f64,
    /// Armor class.
    pub armor_class: i32,
    /// Damage per attack.
    pub damage: &'static str,
    /// Morale score (2-12).
    pub morale: u8,
    /// Treasure type, if any.
    pub treasure: Option<TreasureType>,
    /// Special attack, if any.
    pub special: Option<SpecialAbility>,
}

/// One row of a d20 table.
#[derive(Debug, Clone, Copy)]
pub struct MonsterEntry {
    /// Lowest d20 result for this row.
    pub low: u32,
    /// Highest d20 result for this row.
    pub high: u32,
    /// The monster.
    pub monster: MonsterDef,
}

const fn row(low: u32, high: u32, monster: MonsterDef) -> MonsterEntry {
    MonsterEntry { low, high, monster }
}

const fn m(
    name: &'static str,
    number: &'static str,
    hit_dice: f64,
    armor_class: i32,
    damage: &'static str,
    morale: u8,
) -> MonsterDef {
    MonsterDef {
        name,
        number,
        hit_dice,
        armor_class,
        damage,
        morale,
        treasure: None,
        special: None,
    }
}

impl MonsterDef {
    const fn with_treasure(self, treasure: TreasureType) -> Self {
        Self {
            treasure: Some(treasure),
            ..self
        }
    }

    const fn with_special(self, special: SpecialAbility) -> Self {
        Self {
            special: Some(special),
            ..self
        }
    }
}

#[rustfmt::skip]
const LEVEL_1: &[MonsterEntry] = &[
    row(1, 1, m("Bandits", "1d8", 1.0, 6, "1d6", 8).with_treasure(T::U)),
    row(2, 2, m("Fire Beetles", "1d8", 1.0, 4, "2d4", 7)),
    row(3, 3, m("Dwarves", "1d6", 1.0, 4, "1d8", 8).with_treasure(T::G)),
    row(4, 4, m("Gnomes", "1d8", 1.0, 5, "1d6", 8).with_treasure(T::C)),
    row(5, 5, m("Goblins", "2d4", 0.5, 6, "1d6", 7).with_treasure(T::R)),
    row(6, 6, m("Green Slime", "1d4", 2.0, 9, "1d8", 12)),
    row(7, 7, m("Halflings", "3d6", 0.5, 7, "1d6", 7).with_treasure(T::V)),
    row(8, 8, m("Killer Bees", "1d10", 0.5, 7, "1d3", 9).with_special(Poison)),
    row(9, 9, m("Kobolds", "4d4", 0.5, 7, "1d4", 6).with_treasure(T::P)),
    row(10, 10, m("Gecko Lizards", "1d3", 3.0, 5, "1d8", 7).with_treasure(T::U)),
    row(11, 11, m("Orcs", "2d4", 1.0, 6, "1d6", 8).with_treasure(T::D)),
    row(12, 12, m("Giant Shrews", "1d10", 1.0, 4, "1d6", 10)),
    row(13, 13, m("Giant Centipedes", "2d4", 0.5, 9, "1d2", 7)),
    row(14, 14, m("Stirges", "1d10", 1.0, 7, "1d3", 9).with_treasure(T::L)),
    row(15, 15, m("Skeletons", "1d10", 1.0, 7, "1d6", 12)),
    row(16, 16, m("Racer Snakes", "1d6", 2.0, 5, "1d6", 7)),
    row(17, 17, m("Crab Spiders", "1d4", 2.0, 7, "1d8", 7).with_treasure(T::U).with_special(Poison)),
    row(18, 18, m("Sprites", "3d6", 0.5, 5, "1d2", 7).with_treasure(T::S)),
    row(19, 19, m("Wolves", "2d6", 2.0, 7, "1d6", 8)),
    row(20, 20, m("Hobgoblins", "1d6", 1.0, 6, "1d8", 8).with_treasure(T::Q)),
];

#[rustfmt::skip]
const LEVEL_2: &[MonsterEntry] = &[
    row(1, 2, m("Gnolls", "1d6", 2.0, 5, "2d4", 8).with_treasure(T::D)),
    row(3, 4, m("Ghouls", "1d6", 2.0, 6, "1d3", 9).with_treasure(T::B).with_special(Paralysis)),
    row(5, 6, m("Hobgoblins", "1d6", 1.0, 6, "1d8", 8).with_treasure(T::D)),
    row(7, 8, m("Lizard Men", "2d4", 2.0, 5, "1d6+1", 12).with_treasure(T::D)),
    row(9, 10, m("Draco Lizards", "1d4", 4.0, 5, "1d10", 7).with_treasure(T::U)),
    row(11, 12, m("Zombies", "2d4", 2.0, 8, "1d8", 12)),
    row(13, 14, m("Troglodytes", "1d8", 2.0, 5, "1d4", 9).with_treasure(T::A)),
    row(15, 16, m("Giant Red Ants", "1d6", 2.0, 3, "1d6", 7).with_treasure(T::U)),
    row(17, 18, m("Gray Ooze", "1", 3.0, 8, "2d8", 12)),
    row(19, 20, m("Giant Black Widows", "1d3", 3.0, 6, "2d6", 8).with_treasure(T::U).with_special(Poison)),
];

#[rustfmt::skip]
const LEVEL_3: &[MonsterEntry] = &[
    row(1, 2, m("White Apes", "1d6", 4.0, 6, "1d4", 7)),
    row(3, 4, m("Bugbears", "2d4", 3.0, 5, "2d4", 9).with_treasure(T::B)),
    row(5, 6, m("Carrion Crawlers", "1d3", 3.0, 7, "1d2", 9).with_treasure(T::B).with_special(Paralysis)),
    row(7, 8, m("Dopplegangers", "1d6", 4.0, 5, "1d12", 10).with_treasure(T::E)),
    row(9, 10, m("Gargoyles", "1d6", 4.0, 5, "1d6", 11).with_treasure(T::C)),
    row(11, 12, m("Gelatinous Cube", "1", 4.0, 8, "2d4", 12).with_treasure(T::V).with_special(Paralysis)),
    row(13, 14, m("Harpies", "1d6", 3.0, 7, "1d4", 7).with_treasure(T::C).with_special(Charm)),
    row(15, 16, m("Wererats", "1d8", 3.0, 7, "1d4", 8).with_treasure(T::C)),
    row(17, 18, m("Wights", "1d6", 3.0, 5, "1d4", 12).with_treasure(T::B).with_special(EnergyDrain)),
    row(19, 20, m("Thouls", "1d6", 3.0, 6, "1d3", 10).with_treasure(T::C).with_special(Paralysis)),
];

#[rustfmt::skip]
const LEVEL_4_5: &[MonsterEntry] = &[
    row(1, 2, m("Cockatrices", "1d4", 5.0, 6, "1d6", 7).with_treasure(T::D).with_special(Petrification)),
    row(3, 4, m("Medusa", "1d3", 4.0, 8, "1d6", 8).with_treasure(T::F).with_special(Petrification)),
    row(5, 6, m("Ogres", "1d6", 4.0, 5, "1d10", 10).with_treasure(T::C)),
    row(7, 8, m("Owlbears", "1d4", 5.0, 5, "2d8", 9).with_treasure(T::C)),
    row(9, 10, m("Wraiths", "1d4", 4.0, 3, "1d6", 12).with_treasure(T::E).with_special(EnergyDrain)),
    row(11, 12, m("Minotaurs", "1d6", 6.0, 6, "1d6", 12).with_treasure(T::C)),
    row(13, 14, m("Giant Scorpions", "1d6", 4.0, 2, "1d10", 11).with_treasure(T::V).with_special(Poison)),
    row(15, 16, m("Hellhounds", "2d4", 4.0, 4, "1d6", 9).with_treasure(T::C)),
    row(17, 18, m("Werewolves", "1d6", 4.0, 5, "2d4", 8).with_treasure(T::C)),
    row(19, 20, m("Rust Monsters", "1d4", 5.0, 2, "1d2", 7)),
];

#[rustfmt::skip]
const LEVEL_6: &[MonsterEntry] = &[
    row(1, 2, m("Basilisks", "1d6", 6.0, 4, "1d10", 9).with_treasure(T::F).with_special(Petrification)),
    row(3, 4, m("Mummies", "1d4", 5.0, 3, "1d12", 12).with_treasure(T::D).with_special(Paralysis)),
    row(5, 6, m("Spectres", "1d4", 6.0, 2, "1d8", 11).with_treasure(T::E).with_special(EnergyDrain)),
    row(7, 8, m("Trolls", "1d8", 6.5, 4, "1d10", 10).with_treasure(T::D)),
    row(9, 10, m("Vampires", "1d4", 7.0, 2, "1d10", 11).with_treasure(T::F).with_special(Charm)),
    row(11, 12, m("Black Pudding", "1", 10.0, 6, "3d8", 12)),
    row(13, 14, m("Manticores", "1d2", 6.0, 4, "2d4", 9).with_treasure(T::D)),
    row(15, 16, m("Hill Giants", "1d4", 8.0, 4, "2d8", 8).with_treasure(T::E)),
    row(17, 18, m("Giant Pythons", "1d3", 5.0, 6, "2d4", 8).with_treasure(T::U)),
    row(19, 20, m("Medusae", "1d4", 4.0, 8, "1d6", 8).with_treasure(T::F).with_special(Petrification)),
];

/// The d20 table for a depth. Levels 4-5 share a table, as do 6 and deeper.
pub fn monster_table(depth: u32) -> &'static [MonsterEntry] {
    match depth {
        0 | 1 => LEVEL_1,
        2 => LEVEL_2,
        3 => LEVEL_3,
        4 | 5 => LEVEL_4_5,
        _ => LEVEL_6,
    }
}

/// Look up the monster for a d20 roll at a depth.
pub fn lookup_monster(depth: u32, roll: u32) -> Option<&'static MonsterDef> {
    monster_table(depth)
        .iter()
        .find(|e| (e.low..=e.high).contains(&roll))
        .map(|e| &e.monster)
}

/// Roll a table formula. Unparseable formulas log a warning and yield 0.
pub(crate) fn roll_formula(formula: &str, rng: &mut dyn Roller) -> i32 {
    match evaluate(formula, rng) {
        Ok(value) => value,
        Err(e) => {
            log::warn!("{e}; using 0");
            0
        }
    }
}
