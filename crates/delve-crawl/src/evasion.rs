//! Fleeing an encounter.

use crate::combat;
use crate::context::CrawlContext;
use crate::journal::LogKind;
use crate::state::Status;

/// Base evasion percentages: rows are party size bands, columns monster count bands.
const EVASION_TABLE: [[u32; 4]; 4] = [
    [50, 70, 80, 90],
    [35, 50, 70, 80],
    [25, 35, 50, 70],
    [5, 10, 25, 35],
];

const MIN_CHANCE: u32 = 5;
const MAX_CHANCE: u32 = 95;

fn party_band(size: usize) -> usize {
    match size {
        0..=4 => 0,
        5..=12 => 1,
        13..=24 => 2,
        _ => 3,
    }
}

fn monster_band(count: u32) -> usize {
    match count {
        0..=3 => 0,
        4..=10 => 1,
        11..=30 => 2,
        _ => 3,
    }
}

/// Percent chance for a party of `party_size` to slip away from `monsters`.
pub fn evasion_chance(party_size: usize, monsters: u32) -> u32 {
    EVASION_TABLE[party_band(party_size)][monster_band(monsters)].clamp(MIN_CHANCE, MAX_CHANCE)
}

/// Try to break off the encounter.
///
/// Surprised monsters cannot stop the party, and slipping past them takes no
/// time. Otherwise the monsters check
/// morale to decide whether to pursue; if they do, the party rolls against
/// the evasion table and, on failure, takes a round of attacks while fleeing.
pub fn evade(ctx: &mut CrawlContext<'_>) {
    let Some(enc) = ctx.state.encounter.clone() else {
        return;
    };
    if ctx.state.status == Status::Surprise {
        ctx.log(
            LogKind::Encounter,
            format!("The party slips away before the {} notice.", enc.name),
        );
        ctx.finish_encounter();
        return;
    }

    ctx.elapsed.rounds += 1;

    if combat::morale_breaks(&enc, ctx.rng) {
        ctx.log(
            LogKind::Encounter,
            format!("The {} let the party go.", enc.name),
        );
        ctx.finish_encounter();
        return;
    }

    let chance = evasion_chance(ctx.party.living_count(), enc.active_count());
    let roll = ctx.rng.roll_die(100);
    if roll <= chance {
        ctx.log(
            LogKind::Encounter,
            format!("The party escapes the {} ({roll} vs {chance}%).", enc.name),
        );
        ctx.finish_encounter();
    } else {
        ctx.log(
            LogKind::Encounter,
            format!("The {} give chase ({roll} vs {chance}%)!", enc.name),
        );
        ctx.state.status = Status::Encounter;
        combat::monster_round(ctx, true);
    }
}
