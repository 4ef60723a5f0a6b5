//! Combat rounds between the party and a monster group.
//!
//! A round rolls 1d6 initiative per side. The higher side acts first; on a
//! tie both sides attack with the numbers they had at the start of the round.
//! After the party deals damage the group's morale triggers are checked, each
//! at most once per encounter.

use delve_mechanics::Roller;

use crate::context::CrawlContext;
use crate::encounter::{Encounter, MoraleChecks};
use crate::journal::LogKind;
use crate::party::Condition;
use crate::state::{PendingTreasure, Status};
use crate::tables::{self, SpecialAbility};

/// Bonus to monster attacks against a fleeing party.
const FLEEING_BONUS: u32 = 2;

/// How a round left the encounter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundOutcome {
    /// Both sides are still fighting.
    Continue,
    /// The monsters are dead; treasure awaits.
    Victory,
    /// The monsters broke and ran.
    MonstersFled,
    /// Nobody in the party can act.
    PartyDefeated,
}

/// One full exchange of blows.
pub fn combat_round(ctx: &mut CrawlContext<'_>) -> RoundOutcome {
    let Some(start_count) = ctx.state.encounter.as_ref().map(Encounter::active_count) else {
        return RoundOutcome::Continue;
    };
    ctx.elapsed.rounds += 1;

    let party_init = ctx.rng.roll_die(6);
    let monster_init = ctx.rng.roll_die(6);
    ctx.log(
        LogKind::Combat,
        format!("Initiative: party {party_init}, monsters {monster_init}."),
    );
    let attackers = ctx.party.able();

    match party_init.cmp(&monster_init) {
        std::cmp::Ordering::Greater => {
            party_attacks(ctx, &attackers);
            let outcome = settle(ctx);
            if outcome != RoundOutcome::Continue {
                return outcome;
            }
            let count = current_count(ctx);
            monster_attacks(ctx, count, false);
        }
        std::cmp::Ordering::Less => {
            monster_attacks(ctx, start_count, false);
            if ctx.party.is_defeated() {
                return settle(ctx);
            }
            let attackers = ctx.party.able();
            party_attacks(ctx, &attackers);
        }
        std::cmp::Ordering::Equal => {
            party_attacks(ctx, &attackers);
            monster_attacks(ctx, start_count, false);
        }
    }
    settle(ctx)
}

/// The party attacks while the monsters cannot respond.
pub fn party_round(ctx: &mut CrawlContext<'_>) -> RoundOutcome {
    if ctx.state.encounter.is_none() {
        return RoundOutcome::Continue;
    }
    ctx.elapsed.rounds += 1;
    let attackers = ctx.party.able();
    party_attacks(ctx, &attackers);
    settle(ctx)
}

/// The monsters attack while the party cannot respond.
pub fn monster_round(ctx: &mut CrawlContext<'_>, fleeing: bool) -> RoundOutcome {
    if ctx.state.encounter.is_none() {
        return RoundOutcome::Continue;
    }
    ctx.elapsed.rounds += 1;
    let count = current_count(ctx);
    monster_attacks(ctx, count, fleeing);
    settle(ctx)
}

/// 2d6 morale check; true when the group breaks.
///
/// Morale 2 or less always breaks and 12 or more never does, without rolling.
pub fn morale_breaks(encounter: &Encounter, rng: &mut dyn Roller) -> bool {
    if encounter.morale <= 2 {
        return true;
    }
    if encounter.morale >= 12 {
        return false;
    }
    let mut target = i32::from(encounter.morale);
    if encounter.hp * 4 < encounter.hp_max {
        target -= 2;
    } else if encounter.hp * 2 < encounter.hp_max {
        target -= 1;
    }
    rng.roll_sum(2, 6) as i32 > target
}

/// Mark every newly met morale trigger; true if any fired.
pub fn mark_morale_triggers(encounter: &mut Encounter) -> bool {
    let before = encounter.morale_checked;
    let first_death = f64::from(encounter.damage_taken) >= encounter.average_hp();
    let (hp, hp_max) = (encounter.hp, encounter.hp_max);
    let checks = &mut encounter.morale_checked;
    checks.first_hit |= encounter.damage_taken > 0;
    checks.first_death |= first_death;
    checks.quarter_hp |= hp * 4 <= hp_max;
    checks.half_incapacitated |= hp * 2 <= hp_max;
    encounter.morale_checked != before
}

fn current_count(ctx: &CrawlContext<'_>) -> u32 {
    ctx.state
        .encounter
        .as_ref()
        .map_or(0, Encounter::active_count)
}

fn party_attacks(ctx: &mut CrawlContext<'_>, attackers: &[usize]) {
    for &i in attackers {
        let Some(enc) = ctx.state.encounter.as_ref() else {
            return;
        };
        if enc.is_defeated() {
            return;
        }
        let (ac, name) = (enc.armor_class, enc.name.clone());
        let member = &ctx.party.members[i];
        let roll = ctx.rng.roll_die(20);
        let needed = member.thac0 - ac;
        if roll == 20 || roll as i32 >= needed {
            let damage = member.roll_damage(ctx.rng);
            let member_name = member.name.clone();
            if let Some(enc) = ctx.state.encounter.as_mut() {
                enc.take_damage(damage);
            }
            ctx.log(
                LogKind::Combat,
                format!("{member_name} hits the {name} for {damage}."),
            );
        } else {
            let member_name = member.name.clone();
            ctx.log(LogKind::Combat, format!("{member_name} misses."));
        }
    }
}

fn monster_attacks(ctx: &mut CrawlContext<'_>, count: u32, fleeing: bool) {
    let Some(enc) = ctx.state.encounter.as_ref() else {
        return;
    };
    let thac0 = enc.thac0();
    let damage = enc.damage.clone();
    let special = enc.special;
    let name = enc.name.clone();
    let bonus = if fleeing { FLEEING_BONUS } else { 0 };

    for _ in 0..count {
        let targets = ctx.party.targetable();
        if targets.is_empty() {
            return;
        }
        let target = targets[ctx.rng.pick(targets.len())];
        let natural = ctx.rng.roll_die(20);
        let needed = thac0 - ctx.party.members[target].armor_class;
        if natural < 20 && ((natural + bonus) as i32) < needed {
            let victim = ctx.party.members[target].name.clone();
            ctx.log(LogKind::Combat, format!("The {name} miss {victim}."));
            continue;
        }
        let amount = tables::roll_formula(&damage, ctx.rng).max(1);
        let member = &mut ctx.party.members[target];
        member.take_damage(amount);
        let victim = member.name.clone();
        let alive = member.is_alive();
        ctx.log(
            LogKind::Combat,
            format!("The {name} hit {victim} for {amount}."),
        );
        if !alive {
            ctx.log(LogKind::Combat, format!("{victim} falls!"));
        } else if let Some(special) = special {
            apply_special(ctx, target, special);
        }
    }
}

fn apply_special(ctx: &mut CrawlContext<'_>, target: usize, special: SpecialAbility) {
    let member = &ctx.party.members[target];
    let victim = member.name.clone();
    if member.save(special.save(), ctx.rng) {
        ctx.log(LogKind::Combat, format!("{victim} resists the {special}."));
        return;
    }
    let member = &mut ctx.party.members[target];
    let message = match special {
        SpecialAbility::Poison => {
            member.slay();
            format!("{victim} succumbs to poison!")
        }
        SpecialAbility::Paralysis => {
            member.condition = Condition::Paralyzed;
            format!("{victim} is paralyzed!")
        }
        SpecialAbility::Petrification => {
            member.condition = Condition::Petrified;
            format!("{victim} turns to stone!")
        }
        SpecialAbility::EnergyDrain => {
            member.drain_level();
            if member.is_alive() {
                format!("{victim} loses a level to energy drain!")
            } else {
                format!("{victim} is drained of all life!")
            }
        }
        SpecialAbility::Charm => {
            member.condition = Condition::Charmed;
            format!("{victim} is charmed!")
        }
    };
    ctx.log(LogKind::Combat, message);
}

/// Decide what the round's damage means: victory, defeat, rout, or more fighting.
fn settle(ctx: &mut CrawlContext<'_>) -> RoundOutcome {
    let Some(enc) = ctx.state.encounter.as_mut() else {
        return RoundOutcome::Continue;
    };
    if enc.is_defeated() {
        victory(ctx);
        return RoundOutcome::Victory;
    }
    if ctx.party.is_defeated() {
        let name = enc.name.clone();
        ctx.state.clear_encounter();
        ctx.log(
            LogKind::Combat,
            format!("The party falls before the {name}. The delve is over."),
        );
        return RoundOutcome::PartyDefeated;
    }
    if !mark_morale_triggers(enc) {
        return RoundOutcome::Continue;
    }
    let enc = enc.clone();
    if morale_breaks(&enc, ctx.rng) {
        ctx.finish_encounter();
        ctx.log(LogKind::Combat, format!("The {} break and flee!", enc.name));
        return RoundOutcome::MonstersFled;
    }
    ctx.log(LogKind::Combat, format!("The {} stand firm.", enc.name));
    RoundOutcome::Continue
}

fn victory(ctx: &mut CrawlContext<'_>) {
    let Some(enc) = ctx.state.encounter.take() else {
        return;
    };
    ctx.log(LogKind::Combat, format!("The {} are defeated!", enc.name));
    // The stocking treasure roll decides whether room monsters sit on a lair hoard.
    let guarded = ctx.state.lair_mode && !enc.wandering && ctx.state.room_has_treasure;
    ctx.state.pending_treasure = enc
        .treasure
        .filter(|t| guarded || t.is_individual())
        .map(|treasure_type| PendingTreasure {
            treasure_type,
            individuals: enc.quantity,
        });
    ctx.state.status = Status::Loot;
    ctx.party.recover_after_encounter();
}

/// Whether every morale trigger has been spent.
pub fn all_triggers_spent(checks: &MoraleChecks) -> bool {
    checks.first_hit && checks.first_death && checks.quarter_hp && checks.half_incapacitated
}
