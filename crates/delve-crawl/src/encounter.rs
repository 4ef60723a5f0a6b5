//! Encounter setup: monster lookup, surprise, distance, and reaction.

use delve_mechanics::Roller;
use serde::{Deserialize, Serialize};

use crate::combat;
use crate::context::CrawlContext;
use crate::journal::LogKind;
use crate::state::{Lighting, Status};
use crate::tables::{self, MonsterDef, SpecialAbility};
use crate::treasure::TreasureType;

/// Rerolls allowed before a reaction is forced to neutral or hostile.
const MAX_REACTION_REROLLS: u32 = 3;

/// A monster group's disposition toward the party.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Reaction {
    /// Attacks.
    Hostile,
    /// Spoiling for a fight.
    Aggressive,
    /// Wary.
    Cautious,
    /// Uninterested.
    Neutral,
    /// Helpful.
    Friendly,
}

impl Reaction {
    /// Hostile and aggressive monsters attack rather than talk.
    pub fn is_hostile(self) -> bool {
        matches!(self, Self::Hostile | Self::Aggressive)
    }
}

impl std::fmt::Display for Reaction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Hostile => write!(f, "hostile"),
            Self::Aggressive => write!(f, "aggressive"),
            Self::Cautious => write!(f, "cautious"),
            Self::Neutral => write!(f, "neutral"),
            Self::Friendly => write!(f, "friendly"),
        }
    }
}

/// Who was caught unaware.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Surprise {
    /// The party was surprised.
    pub party_surprised: bool,
    /// The monsters were surprised.
    pub monsters_surprised: bool,
}

/// Morale triggers already spent this encounter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoraleChecks {
    /// The group took its first damage.
    pub first_hit: bool,
    /// Damage taken reached one monster's worth of hit points.
    pub first_death: bool,
    /// Hit points fell to a quarter.
    pub quarter_hp: bool,
    /// Hit points fell to half.
    pub half_incapacitated: bool,
}

/// A live monster group.
///
/// Hit points are pooled across the group; the number still fighting is
/// derived from the pool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Encounter {
    /// Monster name.
    pub name: String,
    /// Number appearing.
    pub quantity: u32,
    /// Hit dice per monster.
    pub hit_dice: f64,
    /// Armor class.
    pub armor_class: i32,
    /// Damage formula per attack.
    pub damage: String,
    /// Morale score.
    pub morale: u8,
    /// Pooled hit points left.
    pub hp: i32,
    /// Pooled hit points at the start.
    pub hp_max: i32,
    /// Treasure type carried or guarded.
    pub treasure: Option<TreasureType>,
    /// Special attack.
    pub special: Option<SpecialAbility>,
    /// Surprise result.
    pub surprise: Surprise,
    /// Reaction result.
    pub reaction: Reaction,
    /// Distance in feet when first sighted.
    pub distance: u32,
    /// Spent morale triggers.
    pub morale_checked: MoraleChecks,
    /// Met by a wandering check rather than in a stocked room.
    pub wandering: bool,
    /// Cumulative damage taken.
    pub damage_taken: i32,
}

impl Encounter {
    /// Instantiate a group from a table entry.
    pub fn from_def(def: &MonsterDef, quantity: u32, wandering: bool) -> Self {
        let quantity = quantity.max(1);
        let hp_max = ((def.hit_dice * 4.5 * f64::from(quantity)).round() as i32).max(1);
        Self {
            name: def.name.to_string(),
            quantity,
            hit_dice: def.hit_dice,
            armor_class: def.armor_class,
            damage: def.damage.to_string(),
            morale: def.morale,
            hp: hp_max,
            hp_max,
            treasure: def.treasure,
            special: def.special,
            surprise: Surprise::default(),
            reaction: Reaction::Neutral,
            distance: 0,
            morale_checked: MoraleChecks::default(),
            wandering,
            damage_taken: 0,
        }
    }

    /// Average hit points of one monster.
    pub fn average_hp(&self) -> f64 {
        f64::from(self.hp_max) / f64::from(self.quantity.max(1))
    }

    /// Monsters still fighting: `ceil(hp / average_hp)`.
    pub fn active_count(&self) -> u32 {
        if self.hp <= 0 {
            return 0;
        }
        let count = (f64::from(self.hp) / self.average_hp()).ceil() as u32;
        count.clamp(1, self.quantity)
    }

    /// Attack target number against armor class 0.
    pub fn thac0(&self) -> i32 {
        monster_thac0(self.hit_dice)
    }

    /// Whether the pool is exhausted.
    pub fn is_defeated(&self) -> bool {
        self.hp <= 0
    }

    /// Remove hit points from the pool.
    pub fn take_damage(&mut self, amount: i32) {
        let amount = amount.max(0);
        self.hp = (self.hp - amount).max(0);
        self.damage_taken = self.damage_taken.saturating_add(amount);
    }
}

/// Monster attack target: 19 up to 1 HD, one better per further whole die, never below 5.
pub fn monster_thac0(hit_dice: f64) -> i32 {
    let whole = hit_dice.floor() as i32;
    (19 - (whole - 1).max(0)).max(5)
}

/// Iterative 2d6 reaction roll.
pub fn roll_reaction(rng: &mut dyn Roller) -> Reaction {
    let mut modifier = 0;
    let mut rerolls = 0;
    loop {
        let total = rng.roll_sum(2, 6) as i32 + modifier;
        if rerolls == MAX_REACTION_REROLLS {
            return if total >= 10 {
                Reaction::Neutral
            } else {
                Reaction::Hostile
            };
        }
        match total {
            i32::MIN..=3 => return Reaction::Hostile,
            4..=6 => modifier = -4,
            7..=9 => {}
            10..=11 => modifier = 4,
            _ => return Reaction::Friendly,
        }
        rerolls += 1;
    }
}

/// Approach distance in feet.
pub fn roll_distance(
    surprise: Surprise,
    lighting: Lighting,
    wandering: bool,
    rng: &mut dyn Roller,
) -> u32 {
    if surprise.party_surprised || surprise.monsters_surprised {
        let feet = rng.roll_die(4) * 10;
        return if surprise.party_surprised && !surprise.monsters_surprised {
            feet / 2
        } else {
            feet
        };
    }
    if wandering {
        return rng.roll_sum(2, 6) * 10;
    }
    match lighting {
        Lighting::Dark => rng.roll_die(4) * 10,
        Lighting::Dim => rng.roll_sum(2, 6) * 10,
        Lighting::Bright => rng.roll_sum(4, 6) * 10,
    }
}

/// Roll for monsters at the current depth and set up the encounter.
///
/// Returns false when the table has nothing for the roll; the area is then
/// logged as empty and the status is left alone. A pending obstacle is
/// abandoned when monsters arrive.
pub fn start_encounter(ctx: &mut CrawlContext<'_>, wandering: bool) -> bool {
    let roll = ctx.rng.roll_die(20);
    let Some(def) = tables::lookup_monster(ctx.state.depth, roll) else {
        log::warn!("no monster for d20 roll {roll} at depth {}", ctx.state.depth);
        ctx.log(LogKind::Explore, "The area is empty.");
        return false;
    };

    let quantity = tables::roll_formula(def.number, ctx.rng).max(1) as u32;
    let mut encounter = Encounter::from_def(def, quantity, wandering);
    encounter.surprise = Surprise {
        party_surprised: ctx.rng.chance_in(2, 6),
        monsters_surprised: ctx.rng.chance_in(2, 6),
    };
    encounter.distance = roll_distance(
        encounter.surprise,
        ctx.state.lighting,
        wandering,
        ctx.rng,
    );
    encounter.reaction = roll_reaction(ctx.rng);

    if let Some(obstacle) = ctx.state.obstacle.take() {
        ctx.log(
            LogKind::Obstacle,
            format!("Monsters arrive; the {} is abandoned.", obstacle.kind),
        );
    }

    let origin = if wandering { "Wandering monsters: " } else { "" };
    ctx.log(
        LogKind::Encounter,
        format!(
            "{origin}{} {} at {} ft ({}).",
            encounter.quantity, encounter.name, encounter.distance, encounter.reaction
        ),
    );

    let surprise = encounter.surprise;
    let hostile = encounter.reaction.is_hostile();
    let name = encounter.name.clone();
    ctx.state.encounter = Some(encounter);

    match (surprise.party_surprised, surprise.monsters_surprised) {
        (false, true) => {
            ctx.state.status = Status::Surprise;
            ctx.log(
                LogKind::Encounter,
                format!("The {name} are caught off guard!"),
            );
        }
        (true, false) => {
            ctx.state.status = Status::Encounter;
            ctx.log(LogKind::Encounter, "The party is surprised!");
            if hostile {
                combat::monster_round(ctx, false);
            }
        }
        _ => ctx.state.status = Status::Encounter,
    }
    true
}
