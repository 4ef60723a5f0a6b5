//! Time, light, food, wandering monsters, and the trip back to the surface.

use crate::context::CrawlContext;
use crate::encounter;
use crate::journal::LogKind;
use crate::state::{Lighting, TORCH_TURNS};

/// Turns of travel per dungeon level on the way up, at full speed.
const TURNS_PER_LEVEL: u32 = 3;

/// Movement rate from carried coins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speed {
    /// Up to 4000 coins.
    Full,
    /// Up to 8000 coins.
    ThreeQuarters,
    /// Up to 12000 coins.
    Half,
    /// Up to 16000 coins.
    Quarter,
    /// Too heavy to move.
    Immobile,
}

impl Speed {
    /// Speed for a coin count.
    pub fn from_coins(coins: u64) -> Self {
        match coins {
            0..=4_000 => Self::Full,
            4_001..=8_000 => Self::ThreeQuarters,
            8_001..=12_000 => Self::Half,
            12_001..=16_000 => Self::Quarter,
            _ => Self::Immobile,
        }
    }

    /// Fraction of full speed.
    pub fn multiplier(self) -> f64 {
        match self {
            Self::Full => 1.0,
            Self::ThreeQuarters => 0.75,
            Self::Half => 0.5,
            Self::Quarter => 0.25,
            Self::Immobile => 0.0,
        }
    }
}

impl std::fmt::Display for Speed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Full => write!(f, "full"),
            Self::ThreeQuarters => write!(f, "three-quarter"),
            Self::Half => write!(f, "half"),
            Self::Quarter => write!(f, "quarter"),
            Self::Immobile => write!(f, "no"),
        }
    }
}

/// Turns needed to reach the surface, or `None` when the party cannot move.
pub fn return_turns(depth: u32, coins: u64) -> Option<u32> {
    let speed = Speed::from_coins(coins);
    if speed == Speed::Immobile {
        return None;
    }
    let base = f64::from(depth.max(1).saturating_mul(TURNS_PER_LEVEL));
    Some((base / speed.multiplier()).ceil() as u32)
}

/// How an attempt to leave the dungeon ended.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReturnOutcome {
    /// Too much coin to move.
    Refused,
    /// Monsters caught the party on the way.
    Interrupted,
    /// The party reached the surface.
    Completed {
        /// Gold-piece value carried out.
        gold: f64,
        /// Level the party set out from.
        depth: u32,
    },
}

/// One turn passes: the clock advances and the torch burns.
pub fn tick_turn(ctx: &mut CrawlContext<'_>) {
    ctx.state.turn = ctx.state.turn.saturating_add(1);
    ctx.elapsed.turns += 1;
    if ctx.state.torches == 0 {
        return;
    }
    let before = ctx.state.lighting;
    ctx.state.torch_turns_used += 1;
    if ctx.state.torch_turns_used >= TORCH_TURNS {
        ctx.state.torches -= 1;
        ctx.state.torch_turns_used = 0;
        if ctx.state.torches == 0 {
            ctx.log(LogKind::Travel, "The last torch gutters out. Darkness.");
        } else {
            let left = ctx.state.torches;
            ctx.log(LogKind::Travel, format!("A torch burns out; {left} left."));
        }
    }
    ctx.state.update_lighting();
    if ctx.state.lighting == Lighting::Dim && before != Lighting::Dim {
        ctx.log(LogKind::Travel, "The last torch is burning low.");
    }
}

/// Roll for wandering monsters; on a hit they arrive at once.
pub fn wandering_check(ctx: &mut CrawlContext<'_>, chance: u32, sides: u32) -> bool {
    if ctx.state.in_encounter() || !ctx.rng.chance_in(chance, sides) {
        return false;
    }
    encounter::start_encounter(ctx, true)
}

/// Advance up to `n` turns, checking for wandering monsters every second
/// turn. Stops early when monsters arrive and returns the turns that passed.
pub fn advance_turns(ctx: &mut CrawlContext<'_>, n: u32) -> u32 {
    for passed in 1..=n {
        tick_turn(ctx);
        if ctx.state.turn % 2 == 0 && wandering_check(ctx, 1, 6) {
            return passed;
        }
    }
    n
}

/// Head for the surface with everything carried.
pub fn attempt_return(ctx: &mut CrawlContext<'_>) -> ReturnOutcome {
    let coins = ctx.state.coin_count();
    let Some(turns) = return_turns(ctx.state.depth, coins) else {
        ctx.log(
            LogKind::Rejected,
            format!("The party cannot move under {coins} coins."),
        );
        return ReturnOutcome::Refused;
    };
    let speed = Speed::from_coins(coins);
    ctx.log(
        LogKind::Travel,
        format!("The party heads for the surface: {turns} turns at {speed} speed."),
    );

    for travelled in 1..=turns {
        tick_turn(ctx);
        if travelled % 2 == 0 && wandering_check(ctx, 1, 6) {
            ctx.log(LogKind::Travel, "The way up is blocked by monsters!");
            return ReturnOutcome::Interrupted;
        }
    }

    let gold = ctx.state.loot;
    let depth = ctx.state.depth;
    ctx.log(
        LogKind::Treasure,
        format!("The party reaches the surface with {gold:.2} gp of loot."),
    );
    if !ctx.state.magic_items.is_empty() {
        let items = ctx.state.magic_items.join(", ");
        ctx.log(
            LogKind::Treasure,
            format!("Magic items brought out: {items}."),
        );
    }
    ctx.state.loot = 0.0;
    ctx.state.coins = Default::default();
    ctx.state.magic_items.clear();
    ctx.state.depth = 1;
    ctx.state.leave_area();
    ReturnOutcome::Completed { gold, depth }
}

/// Eat a ration and rest a turn; the living recover 1 hp each.
///
/// Returns false without effect when there is no food.
pub fn rest(ctx: &mut CrawlContext<'_>) -> bool {
    if ctx.state.rations == 0 {
        return false;
    }
    ctx.state.rations -= 1;
    for member in &mut ctx.party.members {
        member.heal(1);
    }
    let left = ctx.state.rations;
    ctx.log(
        LogKind::Travel,
        format!("The party rests and eats; {left} rations left."),
    );
    advance_turns(ctx, 1);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DelveConfig;
    use crate::party::{Character, CharacterClass, Party};
    use crate::state::{DungeonState, Status};
    use delve_mechanics::ScriptedRoller;

    fn fixture(config: &DelveConfig) -> (DungeonState, Party) {
        (
            DungeonState::new(config),
            Party::new(vec![Character::new("Brom", CharacterClass::Fighter)]),
        )
    }

    #[test]
    fn encumbrance_bands() {
        assert_eq!(Speed::from_coins(4_000), Speed::Full);
        assert_eq!(Speed::from_coins(4_001), Speed::ThreeQuarters);
        assert_eq!(Speed::from_coins(12_000), Speed::Half);
        assert_eq!(Speed::from_coins(16_000), Speed::Quarter);
        assert_eq!(Speed::from_coins(16_001), Speed::Immobile);
        assert_eq!(Speed::from_coins(16_001).multiplier(), 0.0);
    }

    #[test]
    fn return_time_scales_with_load() {
        assert_eq!(return_turns(2, 0), Some(6));
        assert_eq!(return_turns(2, 4_001), Some(8));
        assert_eq!(return_turns(1, 9_000), Some(6));
        assert_eq!(return_turns(3, 16_000), Some(36));
        assert_eq!(return_turns(3, 16_001), None);
        assert_eq!(return_turns(u32::MAX, 0), Some(u32::MAX));
    }

    #[test]
    fn torches_burn_every_six_turns() {
        let config = DelveConfig::default().with_torches(1);
        let (mut state, mut party) = fixture(&config);
        let mut rng = ScriptedRoller::new([6, 6, 6]);
        let mut ctx = CrawlContext::new(&mut state, &mut party, &mut rng, &config);
        assert_eq!(advance_turns(&mut ctx, 4), 4);
        assert_eq!(ctx.state.lighting, Lighting::Dim);
        assert_eq!(advance_turns(&mut ctx, 2), 2);
        assert_eq!(ctx.state.torches, 0);
        assert_eq!(ctx.state.torch_turns_used, 0);
        assert_eq!(state.lighting, Lighting::Dark);
        assert_eq!(state.turn, 6);
    }

    #[test]
    fn wandering_monster_stops_the_clock() {
        let config = DelveConfig::default();
        let (mut state, mut party) = fixture(&config);
        // Turn 2 check hits; skeletons follow.
        let mut rng = ScriptedRoller::new([1, 15, 1, 6, 6, 3, 3, 6, 6]);
        let mut ctx = CrawlContext::new(&mut state, &mut party, &mut rng, &config);
        assert_eq!(advance_turns(&mut ctx, 5), 2);
        assert_eq!(ctx.elapsed.turns, 2);
        assert!(ctx.state.in_encounter());
        assert!(ctx.state.encounter.as_ref().unwrap().wandering);
    }

    #[test]
    fn overloaded_return_is_refused() {
        let config = DelveConfig::default();
        let (mut state, mut party) = fixture(&config);
        state.coins.cp = 16_001;
        let mut rng = ScriptedRoller::new([]);
        let mut ctx = CrawlContext::new(&mut state, &mut party, &mut rng, &config);
        assert_eq!(attempt_return(&mut ctx), ReturnOutcome::Refused);
        assert!(ctx.elapsed.is_zero());
        assert_eq!(state.coins.cp, 16_001);
    }

    #[test]
    fn monsters_block_the_way_up() {
        let config = DelveConfig::default();
        let (mut state, mut party) = fixture(&config);
        state.coins.gp = 40;
        state.loot = 40.0;
        // The check after the second travel turn hits; skeletons follow.
        let mut rng = ScriptedRoller::new([1, 15, 1, 6, 6, 3, 3, 6, 6]);
        let mut ctx = CrawlContext::new(&mut state, &mut party, &mut rng, &config);
        assert_eq!(attempt_return(&mut ctx), ReturnOutcome::Interrupted);
        assert_eq!(ctx.elapsed.turns, 2);
        assert_eq!(state.status, Status::Encounter);
        assert!(state.log.contains("The way up is blocked by monsters!"));
        assert_eq!(state.loot, 40.0);
        assert_eq!(state.coins.gp, 40);
        assert_eq!(state.depth, 1);
    }

    #[test]
    fn completed_return_clears_the_haul() {
        let config = DelveConfig::default().with_depth(2);
        let (mut state, mut party) = fixture(&config);
        state.coins.gp = 50;
        state.loot = 50.0;
        // Six turns, three checks, all quiet.
        let mut rng = ScriptedRoller::new([6, 6, 6]);
        let mut ctx = CrawlContext::new(&mut state, &mut party, &mut rng, &config);
        assert_eq!(
            attempt_return(&mut ctx),
            ReturnOutcome::Completed {
                gold: 50.0,
                depth: 2
            }
        );
        assert_eq!(ctx.elapsed.turns, 6);
        assert_eq!(state.depth, 1);
        assert_eq!(state.loot, 0.0);
        assert!(state.coins.is_empty());
        assert_eq!(state.status, Status::Idle);
    }

    #[test]
    fn rest_needs_food() {
        let config = DelveConfig::default().with_rations(1);
        let (mut state, mut party) = fixture(&config);
        party.members[0].take_damage(3);
        let mut rng = ScriptedRoller::new([]);
        let mut ctx = CrawlContext::new(&mut state, &mut party, &mut rng, &config);
        assert!(rest(&mut ctx));
        assert!(!rest(&mut ctx));
        assert_eq!(state.rations, 0);
        assert_eq!(party.members[0].hp, 6);
    }
}
