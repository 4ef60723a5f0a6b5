//! Doors, traps, hazards, and features, resolved under a chosen strategy.
//!
//! An attempt costs the obstacle's declared turns, plus one when a hazard is
//! crossed carefully. `Avoid` costs nothing and always gets the party past.
//! An attempt on an obstacle that alerts monsters rolls an extra 1-in-3
//! wandering check.

use serde::{Deserialize, Serialize};

use crate::context::CrawlContext;
use crate::journal::LogKind;
use crate::party::SaveCategory;
use crate::resources;
use crate::tables::roll_formula;

/// Minimum 1d6 + strength result that opens a stuck door.
const STUCK_DOOR_TARGET: i32 = 5;

/// Mechanical traps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TrapKind {
    /// Concealed pit.
    Pit,
    /// Poisoned needle in a lock or handle.
    PoisonNeedle,
    /// Stone block dropping from the ceiling.
    FallingBlock,
    /// Darts from holes in the wall.
    DartVolley,
    /// Blade swinging across the passage.
    ScythingBlade,
    /// Cloud of poison gas.
    PoisonGas,
}

/// What a successful save does against a trap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveEffect {
    /// No damage.
    Negates,
    /// Half damage, rounded down.
    Halves,
    /// Survive; failing is death.
    SavesLife,
}

impl TrapKind {
    /// Roll a trap on 1d6.
    pub fn from_roll(roll: u32) -> Self {
        match roll {
            1 => Self::Pit,
            2 => Self::PoisonNeedle,
            3 => Self::FallingBlock,
            4 => Self::DartVolley,
            5 => Self::ScythingBlade,
            _ => Self::PoisonGas,
        }
    }

    /// Damage formula; poison traps have none.
    pub fn damage(self) -> Option<&'static str> {
        match self {
            Self::Pit => Some("1d6"),
            Self::FallingBlock => Some("2d6"),
            Self::DartVolley => Some("1d4"),
            Self::ScythingBlade => Some("1d8"),
            Self::PoisonNeedle | Self::PoisonGas => None,
        }
    }

    /// Saving throw the victim rolls.
    pub fn save(self) -> SaveCategory {
        match self {
            Self::PoisonNeedle | Self::PoisonGas => SaveCategory::DeathPoison,
            Self::FallingBlock => SaveCategory::ParalysisPetrify,
            Self::Pit | Self::DartVolley | Self::ScythingBlade => SaveCategory::Wands,
        }
    }

    /// Effect of a successful save.
    pub fn save_effect(self) -> SaveEffect {
        match self {
            Self::PoisonNeedle | Self::PoisonGas => SaveEffect::SavesLife,
            Self::Pit | Self::DartVolley => SaveEffect::Negates,
            Self::FallingBlock | Self::ScythingBlade => SaveEffect::Halves,
        }
    }
}

impl std::fmt::Display for TrapKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pit => write!(f, "pit trap"),
            Self::PoisonNeedle => write!(f, "poison needle"),
            Self::FallingBlock => write!(f, "falling block"),
            Self::DartVolley => write!(f, "dart trap"),
            Self::ScythingBlade => write!(f, "scything blade"),
            Self::PoisonGas => write!(f, "poison gas trap"),
        }
    }
}

/// Environmental hazards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HazardKind {
    /// A drop to cross.
    Chasm,
    /// Slime or ice underfoot.
    SlipperySurface,
    /// Water up to the chest.
    FloodedPassage,
    /// Rubble blocking the way.
    CollapsedPassage,
}

/// Risk of crossing a hazard one way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HazardRisk {
    /// Chance in 6 that someone is hurt.
    pub injury_chance: u32,
    /// Damage when someone is hurt.
    pub damage: &'static str,
    /// Chance in 6 that a torch is lost.
    pub torch_loss_chance: u32,
}

impl HazardKind {
    /// Roll a hazard on 1d4.
    pub fn from_roll(roll: u32) -> Self {
        match roll {
            1 => Self::Chasm,
            2 => Self::SlipperySurface,
            3 => Self::FloodedPassage,
            _ => Self::CollapsedPassage,
        }
    }

    /// Turns the crossing takes when forced.
    pub fn turn_cost(self) -> u32 {
        match self {
            Self::SlipperySurface => 1,
            Self::Chasm | Self::FloodedPassage => 2,
            Self::CollapsedPassage => 3,
        }
    }

    /// Risk for a strategy. Careful crossings use rope and go slowly.
    pub fn risk(self, strategy: Strategy) -> HazardRisk {
        let careful = strategy == Strategy::Careful;
        let (injury_chance, damage, torch_loss_chance) = match (self, careful) {
            (Self::Chasm, true) => (1, "1d6", 0),
            (Self::Chasm, false) => (2, "3d6", 0),
            (Self::SlipperySurface, true) => (1, "1d3", 0),
            (Self::SlipperySurface, false) => (2, "1d6", 1),
            (Self::FloodedPassage, true) => (0, "1d4", 1),
            (Self::FloodedPassage, false) => (1, "1d4", 3),
            (Self::CollapsedPassage, true) => (1, "1d6", 0),
            (Self::CollapsedPassage, false) => (2, "2d6", 0),
        };
        HazardRisk {
            injury_chance,
            damage,
            torch_loss_chance,
        }
    }
}

impl std::fmt::Display for HazardKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Chasm => write!(f, "chasm"),
            Self::SlipperySurface => write!(f, "slippery surface"),
            Self::FloodedPassage => write!(f, "flooded passage"),
            Self::CollapsedPassage => write!(f, "collapsed passage"),
        }
    }
}

/// Curious dungeon features.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FeatureKind {
    /// A fountain of uncertain water.
    StrangeFountain,
}

impl std::fmt::Display for FeatureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StrangeFountain => write!(f, "strange fountain"),
        }
    }
}

/// Broad obstacle category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObstacleCategory {
    /// Doors.
    Door,
    /// Traps.
    Trap,
    /// Hazards.
    Hazard,
    /// Features.
    Feature,
}

/// Which obstacle blocks the way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "key", content = "detail", rename_all = "kebab-case")]
pub enum ObstacleKind {
    /// Swollen or jammed door.
    StuckDoor,
    /// Locked door.
    LockedDoor,
    /// Hidden door.
    SecretDoor {
        /// Whether the party has found it.
        located: bool,
    },
    /// A trap.
    Trap(TrapKind),
    /// A hazard.
    Hazard(HazardKind),
    /// A feature.
    Feature(FeatureKind),
}

impl ObstacleKind {
    /// Category of this obstacle.
    pub fn category(&self) -> ObstacleCategory {
        match self {
            Self::StuckDoor | Self::LockedDoor | Self::SecretDoor { .. } => ObstacleCategory::Door,
            Self::Trap(_) => ObstacleCategory::Trap,
            Self::Hazard(_) => ObstacleCategory::Hazard,
            Self::Feature(_) => ObstacleCategory::Feature,
        }
    }
}

impl std::fmt::Display for ObstacleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StuckDoor => write!(f, "stuck door"),
            Self::LockedDoor => write!(f, "locked door"),
            Self::SecretDoor { .. } => write!(f, "secret door"),
            Self::Trap(trap) => write!(f, "{trap}"),
            Self::Hazard(hazard) => write!(f, "{hazard}"),
            Self::Feature(feature) => write!(f, "{feature}"),
        }
    }
}

/// How the party deals with an obstacle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Quick and loud.
    Force,
    /// Slow and safe.
    Careful,
    /// Find another way.
    Avoid,
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Force => write!(f, "force"),
            Self::Careful => write!(f, "careful"),
            Self::Avoid => write!(f, "avoid"),
        }
    }
}

/// An obstacle in the current area.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Obstacle {
    /// Identity.
    pub kind: ObstacleKind,
    /// Declared turns per attempt.
    pub turn_cost: u32,
    /// Whether working at it draws monsters.
    pub alerts_monsters: bool,
    /// Damage formula, for traps.
    pub damage: Option<String>,
    /// Saving throw against it, for traps.
    pub save: Option<SaveCategory>,
    /// Whether it has been dealt with; a resolved obstacle leaves the area.
    pub resolved: bool,
    /// Attempts so far.
    pub attempts_made: u32,
}

impl Obstacle {
    /// Build an obstacle with its table values.
    pub fn new(kind: ObstacleKind) -> Self {
        let (turn_cost, alerts_monsters) = match kind {
            ObstacleKind::StuckDoor | ObstacleKind::LockedDoor => (1, true),
            ObstacleKind::SecretDoor { .. } => (1, false),
            ObstacleKind::Trap(_) => (1, false),
            ObstacleKind::Hazard(hazard) => (
                hazard.turn_cost(),
                hazard == HazardKind::CollapsedPassage,
            ),
            ObstacleKind::Feature(_) => (1, false),
        };
        let (damage, save) = match kind {
            ObstacleKind::Trap(trap) => (trap.damage().map(str::to_string), Some(trap.save())),
            _ => (None, None),
        };
        Self {
            kind,
            turn_cost,
            alerts_monsters,
            damage,
            save,
            resolved: false,
            attempts_made: 0,
        }
    }

    /// Category of this obstacle.
    pub fn category(&self) -> ObstacleCategory {
        self.kind.category()
    }

    /// Turns one attempt costs under a strategy.
    pub fn cost(&self, strategy: Strategy) -> u32 {
        match (strategy, self.kind) {
            (Strategy::Avoid, _) => 0,
            (Strategy::Careful, ObstacleKind::Hazard(_)) => self.turn_cost + 1,
            _ => self.turn_cost,
        }
    }
}

/// Attempt the pending obstacle. Does nothing if there is none.
pub fn resolve_obstacle(ctx: &mut CrawlContext<'_>, strategy: Strategy) {
    let Some(mut obstacle) = ctx.state.obstacle.take() else {
        return;
    };

    if strategy == Strategy::Avoid {
        ctx.log(
            LogKind::Obstacle,
            format!("The party finds another way around the {}.", obstacle.kind),
        );
        ctx.state.clear_obstacle();
        return;
    }

    obstacle.attempts_made = obstacle.attempts_made.saturating_add(1);
    let success = match obstacle.kind {
        ObstacleKind::StuckDoor => open_stuck_door(ctx),
        ObstacleKind::LockedDoor => pick_lock(ctx, strategy),
        ObstacleKind::SecretDoor { located } => {
            open_secret_door(ctx, &mut obstacle, located, strategy)
        }
        ObstacleKind::Trap(trap) => {
            handle_trap(ctx, &obstacle, trap, strategy);
            true
        }
        ObstacleKind::Hazard(hazard) => {
            cross_hazard(ctx, hazard, strategy);
            true
        }
        ObstacleKind::Feature(FeatureKind::StrangeFountain) => {
            drink_from_fountain(ctx, strategy);
            true
        }
    };

    let cost = obstacle.cost(strategy);
    let alerts = obstacle.alerts_monsters;
    if success {
        ctx.state.clear_obstacle();
    } else {
        ctx.log(
            LogKind::Obstacle,
            format!(
                "The {} still bars the way ({} attempts).",
                obstacle.kind, obstacle.attempts_made
            ),
        );
        ctx.state.obstacle = Some(obstacle);
    }

    resources::advance_turns(ctx, cost);
    if alerts && !ctx.state.in_encounter() {
        ctx.log(LogKind::Obstacle, "The noise echoes down the corridors.");
        resources::wandering_check(ctx, 1, 3);
    }
}

/// Spend a turn searching for an unlocated secret door.
pub fn search_for_door(ctx: &mut CrawlContext<'_>) {
    let Some(mut obstacle) = ctx.state.obstacle.take() else {
        return;
    };
    obstacle.attempts_made = obstacle.attempts_made.saturating_add(1);
    if find_secret_door(ctx, &mut obstacle) {
        ctx.log(LogKind::Obstacle, "The secret door swings open.");
        ctx.state.clear_obstacle();
    } else {
        ctx.state.obstacle = Some(obstacle);
    }
    resources::advance_turns(ctx, 1);
}

fn open_stuck_door(ctx: &mut CrawlContext<'_>) -> bool {
    let Some(strongest) = ctx.party.strongest() else {
        ctx.log(
            LogKind::Obstacle,
            "Nobody is able to put a shoulder to the door.",
        );
        return false;
    };
    let member = &ctx.party.members[strongest];
    let name = member.name.clone();
    let total = ctx.rng.roll_die(6) as i32 + member.strength_modifier();
    if total >= STUCK_DOOR_TARGET {
        ctx.log(LogKind::Obstacle, "Door forced open!");
        true
    } else {
        ctx.log(
            LogKind::Obstacle,
            format!("{name} heaves at the door ({total}); it will not budge."),
        );
        false
    }
}

fn pick_lock(ctx: &mut CrawlContext<'_>, strategy: Strategy) -> bool {
    if strategy == Strategy::Force {
        ctx.log(
            LogKind::Obstacle,
            "The lock holds fast against brute force.",
        );
        return false;
    }
    let Some((picker, chance)) = ctx.party.best_open_locks() else {
        ctx.log(LogKind::Obstacle, "Nobody in the party can pick the lock.");
        return false;
    };
    let name = ctx.party.members[picker].name.clone();
    if ctx.rng.percent(chance) {
        ctx.log(LogKind::Obstacle, format!("{name} picks the lock."));
        true
    } else {
        ctx.log(LogKind::Obstacle, format!("{name} fails to pick the lock."));
        false
    }
}

fn open_secret_door(
    ctx: &mut CrawlContext<'_>,
    obstacle: &mut Obstacle,
    located: bool,
    strategy: Strategy,
) -> bool {
    if located {
        ctx.log(LogKind::Obstacle, "The secret door swings open.");
        return true;
    }
    if strategy == Strategy::Force {
        ctx.log(
            LogKind::Obstacle,
            "There is nothing to force until the door is found.",
        );
        return false;
    }
    if find_secret_door(ctx, obstacle) {
        ctx.log(LogKind::Obstacle, "The secret door swings open.");
        true
    } else {
        false
    }
}

fn find_secret_door(ctx: &mut CrawlContext<'_>, obstacle: &mut Obstacle) -> bool {
    let chance = if ctx.party.has_elf() { 2 } else { 1 };
    if ctx.rng.chance_in(chance, 6) {
        obstacle.kind = ObstacleKind::SecretDoor { located: true };
        ctx.log(LogKind::Obstacle, "A secret door is found!");
        true
    } else {
        ctx.log(LogKind::Obstacle, "The search turns up nothing.");
        false
    }
}

fn handle_trap(
    ctx: &mut CrawlContext<'_>,
    obstacle: &Obstacle,
    trap: TrapKind,
    strategy: Strategy,
) {
    if strategy == Strategy::Careful {
        let (chance, who) = match ctx.party.best_remove_traps() {
            Some((i, chance)) => (chance, ctx.party.members[i].name.clone()),
            None => (ctx.config.untrained_skill_chance, "The party".to_string()),
        };
        if ctx.rng.percent(chance) {
            ctx.log(LogKind::Obstacle, format!("{who} disarms the {trap}."));
            return;
        }
        ctx.log(
            LogKind::Obstacle,
            format!("{who} fumbles the {trap} and sets it off!"),
        );
    } else {
        ctx.log(LogKind::Obstacle, format!("The {trap} springs!"));
    }
    spring_trap(ctx, obstacle, trap);
}

/// A trap goes off on one random member who can be hit.
///
/// Damage and saving throw come from the obstacle, so a snapshot can carry
/// its own values.
fn spring_trap(ctx: &mut CrawlContext<'_>, obstacle: &Obstacle, trap: TrapKind) {
    let targets = ctx.party.targetable();
    if targets.is_empty() {
        return;
    }
    let victim = targets[ctx.rng.pick(targets.len())];
    let name = ctx.party.members[victim].name.clone();

    let damage = obstacle
        .damage
        .as_deref()
        .map(|formula| roll_formula(formula, ctx.rng).max(1));
    let category = obstacle.save.unwrap_or_else(|| trap.save());
    let saved = ctx.party.members[victim].save(category, ctx.rng);
    let member = &mut ctx.party.members[victim];
    let message = match (trap.save_effect(), damage, saved) {
        (SaveEffect::SavesLife, _, true) => format!("{name} shrugs off the poison."),
        (SaveEffect::SavesLife, _, false) => {
            member.slay();
            format!("{name} is killed by the poison!")
        }
        (SaveEffect::Negates, Some(_), true) => format!("{name} avoids the {trap}."),
        (SaveEffect::Halves, Some(amount), true) => {
            member.take_damage(amount / 2);
            format!("{name} takes {} damage from the {trap}.", amount / 2)
        }
        (_, Some(amount), _) => {
            member.take_damage(amount);
            format!("{name} takes {amount} damage from the {trap}.")
        }
        (_, None, _) => format!("The {trap} misses {name}."),
    };
    let dead = !member.is_alive();
    ctx.log(LogKind::Obstacle, message);
    if dead {
        ctx.log(LogKind::Obstacle, format!("{name} falls!"));
    }
}

fn cross_hazard(ctx: &mut CrawlContext<'_>, hazard: HazardKind, strategy: Strategy) {
    let risk = hazard.risk(strategy);
    ctx.log(
        LogKind::Obstacle,
        format!("The party crosses the {hazard} ({strategy})."),
    );
    if risk.injury_chance > 0 && ctx.rng.chance_in(risk.injury_chance, 6) {
        let targets = ctx.party.targetable();
        if !targets.is_empty() {
            let victim = targets[ctx.rng.pick(targets.len())];
            let amount = roll_formula(risk.damage, ctx.rng).max(1);
            let member = &mut ctx.party.members[victim];
            member.take_damage(amount);
            let name = member.name.clone();
            ctx.log(
                LogKind::Obstacle,
                format!("{name} is hurt by the {hazard} for {amount}."),
            );
        }
    }
    if risk.torch_loss_chance > 0
        && ctx.state.torches > 0
        && ctx.rng.chance_in(risk.torch_loss_chance, 6)
    {
        ctx.state.torches -= 1;
        ctx.state.torch_turns_used = 0;
        ctx.state.update_lighting();
        ctx.log(LogKind::Travel, "A torch is lost.");
        if ctx.state.torches == 0 {
            ctx.log(LogKind::Travel, "Darkness closes in.");
        }
    }
}

fn drink_from_fountain(ctx: &mut CrawlContext<'_>, strategy: Strategy) {
    let Some(drinker) = ctx.party.able().into_iter().min_by_key(|&i| ctx.party.members[i].hp)
    else {
        return;
    };
    let name = ctx.party.members[drinker].name.clone();
    let roll = ctx.rng.roll_die(6);
    match strategy {
        Strategy::Careful if roll <= 2 => {
            let amount = roll_formula("1d4", ctx.rng);
            ctx.party.members[drinker].heal(amount);
            ctx.log(
                LogKind::Obstacle,
                format!("{name} sips the water and recovers {amount} hp."),
            );
        }
        Strategy::Force if roll <= 3 => {
            let amount = roll_formula("1d8", ctx.rng);
            ctx.party.members[drinker].heal(amount);
            ctx.log(
                LogKind::Obstacle,
                format!("{name} drinks deeply and recovers {amount} hp."),
            );
        }
        Strategy::Force => {
            if ctx.party.members[drinker].save(SaveCategory::DeathPoison, ctx.rng) {
                ctx.log(
                    LogKind::Obstacle,
                    format!("{name} retches but keeps the foul water down."),
                );
            } else {
                let amount = roll_formula("1d6", ctx.rng);
                ctx.party.members[drinker].take_damage(amount);
                ctx.log(
                    LogKind::Obstacle,
                    format!("The water is tainted! {name} takes {amount} damage."),
                );
            }
        }
        _ => ctx.log(LogKind::Obstacle, "The water tastes of stone and nothing more."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DelveConfig;
    use crate::party::{Character, CharacterClass, Condition, Party};
    use crate::state::{DungeonState, Status};
    use delve_mechanics::ScriptedRoller;

    fn with_obstacle(kind: ObstacleKind) -> (DungeonState, DelveConfig) {
        let config = DelveConfig::default();
        let mut state = DungeonState::new(&config);
        state.obstacle = Some(Obstacle::new(kind));
        state.status = Status::Obstacle;
        (state, config)
    }

    #[test]
    fn category_follows_kind() {
        assert_eq!(
            Obstacle::new(ObstacleKind::SecretDoor { located: false }).category(),
            ObstacleCategory::Door
        );
        assert_eq!(
            Obstacle::new(ObstacleKind::Trap(TrapKind::Pit)).category(),
            ObstacleCategory::Trap
        );
        let gas = Obstacle::new(ObstacleKind::Trap(TrapKind::PoisonGas));
        assert_eq!(gas.damage, None);
        assert_eq!(gas.save, Some(SaveCategory::DeathPoison));
    }

    #[test]
    fn strategy_costs() {
        let chasm = Obstacle::new(ObstacleKind::Hazard(HazardKind::Chasm));
        assert_eq!(chasm.cost(Strategy::Force), 2);
        assert_eq!(chasm.cost(Strategy::Careful), 3);
        assert_eq!(chasm.cost(Strategy::Avoid), 0);
        let door = Obstacle::new(ObstacleKind::StuckDoor);
        assert_eq!(door.cost(Strategy::Careful), 1);
        let trap = Obstacle::new(ObstacleKind::Trap(TrapKind::Pit));
        assert_eq!(trap.cost(Strategy::Careful), 1);
    }

    #[test]
    fn stuck_door_with_strength_bonus() {
        let (mut state, config) = with_obstacle(ObstacleKind::StuckDoor);
        let mut party = Party::new(vec![
            Character::new("Brom", CharacterClass::Fighter).with_strength(13),
        ]);
        // 5 + 1 opens; the 1-in-3 alert check rolls 3 and stays quiet.
        let mut rng = ScriptedRoller::new([5, 3]);
        let mut ctx = CrawlContext::new(&mut state, &mut party, &mut rng, &config);
        resolve_obstacle(&mut ctx, Strategy::Force);
        assert_eq!(ctx.elapsed.turns, 1);
        assert_eq!(state.status, Status::Idle);
        assert!(state.obstacle.is_none());
        assert!(state.log.contains("Door forced open!"));
    }

    #[test]
    fn noisy_door_draws_wandering_monsters() {
        let (mut state, config) = with_obstacle(ObstacleKind::StuckDoor);
        let mut party = Party::new(vec![
            Character::new("Brom", CharacterClass::Fighter).with_strength(13),
        ]);
        // Door opens; alert check rolls 1. One skeleton, nobody surprised,
        // 2d6 x 10 ft, friendly.
        let mut rng = ScriptedRoller::new([5, 1, 15, 1, 6, 6, 3, 3, 6, 6]);
        let mut ctx = CrawlContext::new(&mut state, &mut party, &mut rng, &config);
        resolve_obstacle(&mut ctx, Strategy::Force);
        assert_eq!(ctx.elapsed.turns, 1);
        assert_eq!(state.status, Status::Encounter);
        assert!(state.obstacle.is_none());
        let enc = state.encounter.as_ref().unwrap();
        assert!(enc.wandering);
        assert_eq!(enc.distance, 60);
    }

    #[test]
    fn trap_uses_its_recorded_damage() {
        let (mut state, config) = with_obstacle(ObstacleKind::Trap(TrapKind::Pit));
        if let Some(obstacle) = state.obstacle.as_mut() {
            obstacle.damage = Some("3".to_string());
        }
        let mut party = Party::new(vec![
            Character::new("Brom", CharacterClass::Fighter).with_hp(20),
        ]);
        // Constant damage rolls nothing; the save vs wands rolls 2 and fails.
        let mut rng = ScriptedRoller::new([2]);
        let mut ctx = CrawlContext::new(&mut state, &mut party, &mut rng, &config);
        resolve_obstacle(&mut ctx, Strategy::Force);
        assert_eq!(party.members[0].hp, 17);
    }

    #[test]
    fn stuck_door_failure_stays_pending() {
        let (mut state, config) = with_obstacle(ObstacleKind::StuckDoor);
        let mut party = Party::new(vec![Character::new("Pip", CharacterClass::Thief)]);
        let mut rng = ScriptedRoller::new([2, 3]);
        let mut ctx = CrawlContext::new(&mut state, &mut party, &mut rng, &config);
        resolve_obstacle(&mut ctx, Strategy::Force);
        assert_eq!(state.status, Status::Obstacle);
        assert_eq!(state.obstacle.as_ref().unwrap().attempts_made, 1);
    }

    #[test]
    fn locked_door_needs_a_picker() {
        let (mut state, config) = with_obstacle(ObstacleKind::LockedDoor);
        let mut party = Party::new(vec![Character::new("Brom", CharacterClass::Fighter)]);
        // One turn, then the 1-in-3 alert check rolls 3.
        let mut rng = ScriptedRoller::new([3]);
        let mut ctx = CrawlContext::new(&mut state, &mut party, &mut rng, &config);
        resolve_obstacle(&mut ctx, Strategy::Careful);
        assert_eq!(ctx.elapsed.turns, 1);
        assert_eq!(rng.remaining(), 0);
        assert!(state.log.contains("Nobody in the party can pick the lock."));
        assert!(state.log.contains("The noise echoes down the corridors."));
        assert_eq!(state.status, Status::Obstacle);

        let (mut state, config) = with_obstacle(ObstacleKind::LockedDoor);
        let mut party = Party::new(vec![Character::new("Lira", CharacterClass::Thief)]);
        let mut rng = ScriptedRoller::new([15, 6]);
        let mut ctx = CrawlContext::new(&mut state, &mut party, &mut rng, &config);
        resolve_obstacle(&mut ctx, Strategy::Careful);
        assert_eq!(state.status, Status::Idle);
    }

    #[test]
    fn secret_door_search_and_force() {
        let (mut state, config) =
            with_obstacle(ObstacleKind::SecretDoor { located: false });
        let mut party = Party::new(vec![Character::new("Aeth", CharacterClass::Elf)]);
        let mut rng = ScriptedRoller::new([]);
        let mut ctx = CrawlContext::new(&mut state, &mut party, &mut rng, &config);
        resolve_obstacle(&mut ctx, Strategy::Force);
        assert_eq!(ctx.state.status, Status::Obstacle);

        // Elf finds it on a 2.
        let mut rng = ScriptedRoller::new([2, 6]);
        let mut ctx = CrawlContext::new(&mut state, &mut party, &mut rng, &config);
        resolve_obstacle(&mut ctx, Strategy::Careful);
        assert_eq!(state.status, Status::Idle);
        assert!(state.log.contains("A secret door is found!"));
    }

    #[test]
    fn avoid_costs_nothing() {
        let (mut state, config) = with_obstacle(ObstacleKind::Hazard(HazardKind::Chasm));
        let mut party = Party::new(vec![Character::new("Brom", CharacterClass::Fighter)]);
        let mut rng = ScriptedRoller::new([]);
        let mut ctx = CrawlContext::new(&mut state, &mut party, &mut rng, &config);
        resolve_obstacle(&mut ctx, Strategy::Avoid);
        assert!(ctx.elapsed.is_zero());
        assert_eq!(rng.remaining(), 0);
        assert_eq!(state.status, Status::Idle);
    }

    #[test]
    fn poison_needle_is_save_or_die() {
        let (mut state, config) = with_obstacle(ObstacleKind::Trap(TrapKind::PoisonNeedle));
        let mut party = Party::new(vec![Character::new("Brom", CharacterClass::Fighter)]);
        // Force springs it; save vs death needs 12, rolls 11.
        let mut rng = ScriptedRoller::new([11]);
        let mut ctx = CrawlContext::new(&mut state, &mut party, &mut rng, &config);
        resolve_obstacle(&mut ctx, Strategy::Force);
        assert_eq!(party.members[0].condition, Condition::Dead);
        assert_eq!(state.status, Status::Idle);
    }

    #[test]
    fn halving_trap_on_save() {
        let (mut state, config) = with_obstacle(ObstacleKind::Trap(TrapKind::FallingBlock));
        let mut party = Party::new(vec![
            Character::new("Brom", CharacterClass::Fighter).with_hp(20),
        ]);
        // 2d6 = 9, save vs paralysis 14 succeeds.
        let mut rng = ScriptedRoller::new([4, 5, 14]);
        let mut ctx = CrawlContext::new(&mut state, &mut party, &mut rng, &config);
        resolve_obstacle(&mut ctx, Strategy::Force);
        assert_eq!(party.members[0].hp, 16);
    }

    #[test]
    fn careful_disarm_uses_untrained_chance() {
        let (mut state, config) = with_obstacle(ObstacleKind::Trap(TrapKind::Pit));
        let mut party = Party::new(vec![
            Character::new("Brom", CharacterClass::Fighter).with_hp(20),
        ]);
        let mut rng = ScriptedRoller::new([10, 6]);
        let mut ctx = CrawlContext::new(&mut state, &mut party, &mut rng, &config);
        resolve_obstacle(&mut ctx, Strategy::Careful);
        assert_eq!(party.members[0].hp, 20);
        assert!(state.log.contains("disarms the pit trap"));
    }

    #[test]
    fn flooded_passage_can_douse_a_torch() {
        let (mut state, config) = with_obstacle(ObstacleKind::Hazard(HazardKind::FloodedPassage));
        state.torches = 1;
        let mut party = Party::new(vec![Character::new("Brom", CharacterClass::Fighter)]);
        // Careful: torch loss on 1-in-6.
        let mut rng = ScriptedRoller::new([1, 6]);
        let mut ctx = CrawlContext::new(&mut state, &mut party, &mut rng, &config);
        resolve_obstacle(&mut ctx, Strategy::Careful);
        assert_eq!(state.torches, 0);
        assert_eq!(state.lighting, crate::state::Lighting::Dark);
    }

    #[test]
    fn fountain_heals_on_careful_sip() {
        let (mut state, config) =
            with_obstacle(ObstacleKind::Feature(FeatureKind::StrangeFountain));
        let mut party = Party::new(vec![
            Character::new("Brom", CharacterClass::Fighter).with_hp(10),
        ]);
        party.members[0].take_damage(5);
        let mut rng = ScriptedRoller::new([2, 3, 6]);
        let mut ctx = CrawlContext::new(&mut state, &mut party, &mut rng, &config);
        resolve_obstacle(&mut ctx, Strategy::Careful);
        assert_eq!(party.members[0].hp, 8);
    }

    #[test]
    fn obstacle_kind_serializes_with_key() {
        let json = serde_json::to_string(&ObstacleKind::SecretDoor { located: true }).unwrap();
        assert_eq!(json, r#"{"key":"secret-door","detail":{"located":true}}"#);
        let back: ObstacleKind =
            serde_json::from_str(r#"{"key":"trap","detail":"poison-gas"}"#).unwrap();
        assert_eq!(back, ObstacleKind::Trap(TrapKind::PoisonGas));
    }
}
