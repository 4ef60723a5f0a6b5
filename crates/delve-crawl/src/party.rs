//! Party records: the characters the engine reads and wounds.
//!
//! Derived combat numbers (attack target, saving throws, hit points) are
//! supplied by whoever builds the party. [`Character::new`] fills in
//! first-level values per class for convenience.

use delve_mechanics::Roller;
use serde::{Deserialize, Serialize};

use crate::tables;

/// Character class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CharacterClass {
    /// Fighter.
    Fighter,
    /// Cleric.
    Cleric,
    /// Magic-user.
    MagicUser,
    /// Thief.
    Thief,
    /// Dwarf.
    Dwarf,
    /// Elf.
    Elf,
    /// Halfling.
    Halfling,
}

impl CharacterClass {
    /// Hit die size for the class.
    pub fn hit_die(self) -> u32 {
        match self {
            Self::Fighter | Self::Dwarf => 8,
            Self::Cleric | Self::Elf | Self::Halfling => 6,
            Self::MagicUser | Self::Thief => 4,
        }
    }

    /// First-level saving throws.
    pub fn base_saves(self) -> SavingThrows {
        let [death_poison, wands, paralysis_petrify, breath, spells] = match self {
            Self::Fighter => [12, 13, 14, 15, 16],
            Self::Cleric => [11, 12, 14, 16, 15],
            Self::MagicUser | Self::Thief => [13, 14, 13, 16, 15],
            Self::Dwarf | Self::Halfling => [8, 9, 10, 13, 12],
            Self::Elf => [12, 13, 13, 15, 15],
        };
        SavingThrows {
            death_poison,
            wands,
            paralysis_petrify,
            breath,
            spells,
        }
    }
}

impl std::fmt::Display for CharacterClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fighter => write!(f, "Fighter"),
            Self::Cleric => write!(f, "Cleric"),
            Self::MagicUser => write!(f, "Magic-User"),
            Self::Thief => write!(f, "Thief"),
            Self::Dwarf => write!(f, "Dwarf"),
            Self::Elf => write!(f, "Elf"),
            Self::Halfling => write!(f, "Halfling"),
        }
    }
}

/// Saving throw categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SaveCategory {
    /// Death ray or poison.
    DeathPoison,
    /// Magic wands.
    Wands,
    /// Paralysis or turn to stone.
    ParalysisPetrify,
    /// Dragon breath.
    Breath,
    /// Rods, staves, and spells.
    Spells,
}

impl std::fmt::Display for SaveCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DeathPoison => write!(f, "death/poison"),
            Self::Wands => write!(f, "wands"),
            Self::ParalysisPetrify => write!(f, "paralysis/petrify"),
            Self::Breath => write!(f, "breath"),
            Self::Spells => write!(f, "spells"),
        }
    }
}

/// Target numbers for each saving throw (roll d20 at or above to save).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavingThrows {
    /// Death ray or poison.
    pub death_poison: u32,
    /// Magic wands.
    pub wands: u32,
    /// Paralysis or turn to stone.
    pub paralysis_petrify: u32,
    /// Dragon breath.
    pub breath: u32,
    /// Rods, staves, and spells.
    pub spells: u32,
}

impl SavingThrows {
    /// Target number for a category.
    pub fn target(&self, category: SaveCategory) -> u32 {
        match category {
            SaveCategory::DeathPoison => self.death_poison,
            SaveCategory::Wands => self.wands,
            SaveCategory::ParalysisPetrify => self.paralysis_petrify,
            SaveCategory::Breath => self.breath,
            SaveCategory::Spells => self.spells,
        }
    }
}

/// The six ability scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbilityScores {
    /// Strength.
    pub strength: u8,
    /// Intelligence.
    pub intelligence: u8,
    /// Wisdom.
    pub wisdom: u8,
    /// Dexterity.
    pub dexterity: u8,
    /// Constitution.
    pub constitution: u8,
    /// Charisma.
    pub charisma: u8,
}

impl Default for AbilityScores {
    fn default() -> Self {
        Self {
            strength: 10,
            intelligence: 10,
            wisdom: 10,
            dexterity: 10,
            constitution: 10,
            charisma: 10,
        }
    }
}

/// Standard ability score adjustment (3 → -3, 9-12 → 0, 18 → +3).
pub fn ability_modifier(score: u8) -> i32 {
    match score {
        0..=3 => -3,
        4..=5 => -2,
        6..=8 => -1,
        9..=12 => 0,
        13..=15 => 1,
        16..=17 => 2,
        _ => 3,
    }
}

/// Equipped weapon; fixes the damage formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Weapon {
    /// Bare hands.
    Unarmed,
    /// Dagger.
    Dagger,
    /// Club.
    Club,
    /// Short sword.
    ShortSword,
    /// Normal sword.
    Sword,
    /// Two-handed sword.
    TwoHandedSword,
    /// Mace.
    Mace,
    /// War hammer.
    WarHammer,
    /// Battle axe.
    BattleAxe,
    /// Spear.
    Spear,
    /// Staff.
    Staff,
    /// Short bow.
    ShortBow,
    /// Sling.
    Sling,
}

impl Weapon {
    /// Damage formula for a hit with this weapon.
    pub fn damage(self) -> &'static str {
        match self {
            Self::Unarmed => "1d2",
            Self::Dagger | Self::Club | Self::Sling => "1d4",
            Self::ShortSword
            | Self::Mace
            | Self::WarHammer
            | Self::Spear
            | Self::Staff
            | Self::ShortBow => "1d6",
            Self::Sword | Self::BattleAxe => "1d8",
            Self::TwoHandedSword => "1d10",
        }
    }

    /// Whether strength adds to damage (melee weapons).
    pub fn uses_strength(self) -> bool {
        !matches!(self, Self::ShortBow | Self::Sling)
    }
}

/// Lasting condition written onto a character by the engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Condition {
    /// Able to act.
    #[default]
    Normal,
    /// Held rigid until the encounter ends.
    Paralyzed,
    /// Under a monster's control until the encounter ends.
    Charmed,
    /// Turned to stone.
    Petrified,
    /// Dead.
    Dead,
}

/// One party member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Character {
    /// Display name.
    pub name: String,
    /// Class.
    pub class: CharacterClass,
    /// Experience level; energy drain lowers it.
    pub level: u32,
    /// Current hit points.
    pub hp: i32,
    /// Maximum hit points.
    pub hp_max: i32,
    /// Armor class (lower is better).
    pub armor_class: i32,
    /// Attack roll target to hit armor class 0.
    pub thac0: i32,
    /// Saving throw targets.
    pub saves: SavingThrows,
    /// Ability scores.
    pub abilities: AbilityScores,
    /// Equipped weapon.
    pub weapon: Weapon,
    /// Current condition.
    pub condition: Condition,
    /// Percent chance to pick a lock.
    pub open_locks: u32,
    /// Percent chance to disarm a trap.
    pub remove_traps: u32,
    /// Whether the character's prepared spell has been cast.
    pub spell_expended: bool,
}

impl Character {
    /// A character with first-level numbers for the class.
    pub fn new(name: impl Into<String>, class: CharacterClass) -> Self {
        let hp = class.hit_die() as i32;
        let (weapon, armor_class) = match class {
            CharacterClass::Fighter | CharacterClass::Dwarf => (Weapon::Sword, 4),
            CharacterClass::Cleric => (Weapon::Mace, 4),
            CharacterClass::Elf => (Weapon::Sword, 5),
            CharacterClass::Halfling => (Weapon::ShortSword, 6),
            CharacterClass::Thief => (Weapon::Dagger, 7),
            CharacterClass::MagicUser => (Weapon::Staff, 9),
        };
        let (open_locks, remove_traps) = match class {
            CharacterClass::Thief => (15, 10),
            _ => (0, 0),
        };
        Self {
            name: name.into(),
            class,
            level: 1,
            hp,
            hp_max: hp,
            armor_class,
            thac0: 19,
            saves: class.base_saves(),
            abilities: AbilityScores::default(),
            weapon,
            condition: Condition::Normal,
            open_locks,
            remove_traps,
            spell_expended: false,
        }
    }

    /// Replace the ability scores.
    pub fn with_abilities(mut self, abilities: AbilityScores) -> Self {
        self.abilities = abilities;
        self
    }

    /// Set the strength score.
    pub fn with_strength(mut self, strength: u8) -> Self {
        self.abilities.strength = strength;
        self
    }

    /// Set current and maximum hit points.
    pub fn with_hp(mut self, hp: i32) -> Self {
        self.hp = hp;
        self.hp_max = hp;
        self
    }

    /// Set the armor class.
    pub fn with_armor_class(mut self, armor_class: i32) -> Self {
        self.armor_class = armor_class;
        self
    }

    /// Set the equipped weapon.
    pub fn with_weapon(mut self, weapon: Weapon) -> Self {
        self.weapon = weapon;
        self
    }

    /// Strength adjustment to hit and damage.
    pub fn strength_modifier(&self) -> i32 {
        ability_modifier(self.abilities.strength)
    }

    /// Not dead.
    pub fn is_alive(&self) -> bool {
        self.condition != Condition::Dead
    }

    /// Can be attacked or caught by a trap (alive and not stone).
    pub fn is_targetable(&self) -> bool {
        !matches!(self.condition, Condition::Dead | Condition::Petrified)
    }

    /// Can take actions this round.
    pub fn can_act(&self) -> bool {
        self.condition == Condition::Normal
    }

    /// Apply damage; reaching 0 hit points kills.
    pub fn take_damage(&mut self, amount: i32) {
        if !self.is_alive() {
            return;
        }
        self.hp = (self.hp - amount.max(0)).max(0);
        if self.hp == 0 {
            self.condition = Condition::Dead;
        }
    }

    /// Restore hit points up to the maximum. Dead or petrified characters do not heal.
    pub fn heal(&mut self, amount: i32) {
        if self.is_targetable() {
            self.hp = (self.hp + amount.max(0)).min(self.hp_max);
        }
    }

    /// Kill outright.
    pub fn slay(&mut self) {
        self.hp = 0;
        self.condition = Condition::Dead;
    }

    /// Lose one level and one average hit die; dies at level 0.
    pub fn drain_level(&mut self) {
        self.level = self.level.saturating_sub(1);
        if self.level == 0 {
            self.slay();
            return;
        }
        let lost = (self.class.hit_die() as i32 + 1) / 2;
        self.hp_max = (self.hp_max - lost).max(1);
        self.hp = self.hp.min(self.hp_max);
    }

    /// Roll a saving throw; true on a save.
    pub fn save(&self, category: SaveCategory, rng: &mut dyn Roller) -> bool {
        rng.roll_die(20) >= self.saves.target(category)
    }

    /// Roll weapon damage including strength, minimum 1.
    pub fn roll_damage(&self, rng: &mut dyn Roller) -> i32 {
        let bonus = if self.weapon.uses_strength() {
            self.strength_modifier()
        } else {
            0
        };
        (tables::roll_formula(self.weapon.damage(), rng) + bonus).max(1)
    }
}

/// The adventuring party.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Party {
    /// Members in marching order.
    pub members: Vec<Character>,
}

impl Party {
    /// Build a party from its members.
    pub fn new(members: Vec<Character>) -> Self {
        Self { members }
    }

    /// Number of members, living or not.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// True if the party has no members.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Indices of members able to act.
    pub fn able(&self) -> Vec<usize> {
        self.indices(Character::can_act)
    }

    /// Indices of members that can be attacked.
    pub fn targetable(&self) -> Vec<usize> {
        self.indices(Character::is_targetable)
    }

    /// Number of members still alive.
    pub fn living_count(&self) -> usize {
        self.members.iter().filter(|c| c.is_alive()).count()
    }

    /// True when no member can act.
    pub fn is_defeated(&self) -> bool {
        !self.members.iter().any(Character::can_act)
    }

    /// The able member with the best strength modifier (first in marching order on ties).
    pub fn strongest(&self) -> Option<usize> {
        self.able()
            .into_iter()
            .max_by_key(|&i| (self.members[i].strength_modifier(), std::cmp::Reverse(i)))
    }

    /// Best open-locks chance among able members, with its holder.
    pub fn best_open_locks(&self) -> Option<(usize, u32)> {
        self.best_skill(|c| c.open_locks)
    }

    /// Best remove-traps chance among able members, with its holder.
    pub fn best_remove_traps(&self) -> Option<(usize, u32)> {
        self.best_skill(|c| c.remove_traps)
    }

    /// True if an able elf is in the party.
    pub fn has_elf(&self) -> bool {
        self.members
            .iter()
            .any(|c| c.can_act() && c.class == CharacterClass::Elf)
    }

    /// Clear conditions that end with an encounter (paralysis, charm).
    pub fn recover_after_encounter(&mut self) {
        for member in &mut self.members {
            if matches!(member.condition, Condition::Paralyzed | Condition::Charmed) {
                member.condition = Condition::Normal;
            }
        }
    }

    fn indices(&self, pred: impl Fn(&Character) -> bool) -> Vec<usize> {
        self.members
            .iter()
            .enumerate()
            .filter(|(_, c)| pred(c))
            .map(|(i, _)| i)
            .collect()
    }

    fn best_skill(&self, skill: impl Fn(&Character) -> u32) -> Option<(usize, u32)> {
        self.able()
            .into_iter()
            .map(|i| (i, skill(&self.members[i])))
            .filter(|&(_, chance)| chance > 0)
            .max_by_key(|&(i, chance)| (chance, std::cmp::Reverse(i)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use delve_mechanics::ScriptedRoller;

    fn party() -> Party {
        Party::new(vec![
            Character::new("Brom", CharacterClass::Fighter).with_strength(16),
            Character::new("Lira", CharacterClass::Thief),
            Character::new("Aeth", CharacterClass::Elf).with_strength(13),
        ])
    }

    #[test]
    fn ability_modifiers() {
        assert_eq!(ability_modifier(3), -3);
        assert_eq!(ability_modifier(5), -2);
        assert_eq!(ability_modifier(8), -1);
        assert_eq!(ability_modifier(10), 0);
        assert_eq!(ability_modifier(13), 1);
        assert_eq!(ability_modifier(17), 2);
        assert_eq!(ability_modifier(18), 3);
    }

    #[test]
    fn new_character_uses_class_numbers() {
        let c = Character::new("Mira", CharacterClass::MagicUser);
        assert_eq!(c.hp, 4);
        assert_eq!(c.thac0, 19);
        assert_eq!(c.saves.target(SaveCategory::Spells), 15);
        assert_eq!(c.weapon, Weapon::Staff);
        assert!(c.can_act());
    }

    #[test]
    fn damage_kills_at_zero() {
        let mut c = Character::new("Brom", CharacterClass::Fighter);
        c.take_damage(5);
        assert_eq!(c.hp, 3);
        assert!(c.is_alive());
        c.take_damage(10);
        assert_eq!(c.hp, 0);
        assert_eq!(c.condition, Condition::Dead);
        c.heal(5);
        assert_eq!(c.hp, 0);
    }

    #[test]
    fn heal_caps_at_max() {
        let mut c = Character::new("Brom", CharacterClass::Fighter).with_hp(10);
        c.take_damage(3);
        c.heal(9);
        assert_eq!(c.hp, 10);
    }

    #[test]
    fn energy_drain_lowers_level_then_kills() {
        let mut c = Character::new("Brom", CharacterClass::Fighter).with_hp(20);
        c.level = 2;
        c.drain_level();
        assert_eq!(c.level, 1);
        assert_eq!(c.hp_max, 16);
        c.drain_level();
        assert_eq!(c.condition, Condition::Dead);
    }

    #[test]
    fn saving_throw_meets_target() {
        let c = Character::new("Brom", CharacterClass::Fighter);
        let mut rng = ScriptedRoller::new([12, 11]);
        assert!(c.save(SaveCategory::DeathPoison, &mut rng));
        assert!(!c.save(SaveCategory::DeathPoison, &mut rng));
    }

    #[test]
    fn weapon_damage_adds_strength() {
        let c = Character::new("Brom", CharacterClass::Fighter).with_strength(18);
        let mut rng = ScriptedRoller::new([5]);
        assert_eq!(c.roll_damage(&mut rng), 8);
        let weak = Character::new("Pip", CharacterClass::Thief).with_strength(3);
        let mut rng = ScriptedRoller::new([1]);
        assert_eq!(weak.roll_damage(&mut rng), 1);
    }

    #[test]
    fn strongest_and_skills() {
        let p = party();
        assert_eq!(p.strongest(), Some(0));
        assert_eq!(p.best_open_locks(), Some((1, 15)));
        assert_eq!(p.best_remove_traps(), Some((1, 10)));
        assert!(p.has_elf());
    }

    #[test]
    fn defeat_and_recovery() {
        let mut p = party();
        p.members[0].slay();
        p.members[1].condition = Condition::Paralyzed;
        p.members[2].condition = Condition::Charmed;
        assert!(p.is_defeated());
        assert_eq!(p.targetable(), vec![1, 2]);
        p.recover_after_encounter();
        assert!(!p.is_defeated());
        assert_eq!(p.able(), vec![1, 2]);
        assert_eq!(p.living_count(), 2);
    }
}
