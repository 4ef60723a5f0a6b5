//! The dungeon state machine.
//!
//! [`Delve`] owns the state of one expedition, the party, and the roller.
//! Each [`Action`] is checked against the current [`Status`]; an action that
//! does not apply is rejected with a log entry and changes nothing else.

use rand::SeedableRng;
use rand::rngs::StdRng;

use delve_mechanics::Roller;

use crate::collab::{Calendar, Elapsed, Ledger};
use crate::combat::{self, RoundOutcome};
use crate::config::DelveConfig;
use crate::context::CrawlContext;
use crate::encounter::Reaction;
use crate::error::CrawlResult;
use crate::evasion;
use crate::journal::{LogEntry, LogKind};
use crate::obstacle::{self, ObstacleKind, Strategy};
use crate::party::Party;
use crate::resources::{self, ReturnOutcome};
use crate::state::{DungeonState, MAX_DEPTH, Status};
use crate::stocking;
use crate::treasure::{self, Hoard};

/// How the party answers monsters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncounterChoice {
    /// Attack.
    Fight,
    /// Try to talk.
    Parley,
}

/// A player command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Move on to a new area.
    Explore,
    /// Search the current area, or look for a secret door.
    Search,
    /// Eat and rest for a turn.
    Rest,
    /// Deal with the obstacle in the way.
    ResolveObstacle(Strategy),
    /// Fight or parley with the monsters present.
    ResolveEncounter(EncounterChoice),
    /// Flee from the monsters present.
    Evade,
    /// Collect the treasure waiting in the area.
    LootRoom,
    /// Head back to the surface.
    AttemptReturn,
    /// Take the stairs down a level.
    Descend,
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Explore => write!(f, "explore"),
            Self::Search => write!(f, "search"),
            Self::Rest => write!(f, "rest"),
            Self::ResolveObstacle(strategy) => write!(f, "resolve obstacle ({strategy})"),
            Self::ResolveEncounter(EncounterChoice::Fight) => write!(f, "fight"),
            Self::ResolveEncounter(EncounterChoice::Parley) => write!(f, "parley"),
            Self::Evade => write!(f, "evade"),
            Self::LootRoom => write!(f, "loot"),
            Self::AttemptReturn => write!(f, "return to the surface"),
            Self::Descend => write!(f, "descend"),
        }
    }
}

/// What one action did.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionReport {
    /// False when the action did not apply and nothing changed.
    pub accepted: bool,
    /// Game time the action took.
    pub elapsed: Elapsed,
    /// Log entries the action wrote, oldest first.
    pub entries: Vec<LogEntry>,
}

enum Step {
    Done,
    Rejected,
    Banked { gold: f64, depth: u32 },
}

/// One expedition into the dungeon.
pub struct Delve<R: Roller = StdRng> {
    state: DungeonState,
    party: Party,
    config: DelveConfig,
    rng: R,
    calendar: Option<Box<dyn Calendar>>,
    ledger: Option<Box<dyn Ledger>>,
}

impl<R: Roller> std::fmt::Debug for Delve<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Delve")
            .field("turn", &self.state.turn)
            .field("depth", &self.state.depth)
            .field("status", &self.state.status)
            .field("party", &self.party.len())
            .finish()
    }
}

impl Delve<StdRng> {
    /// Start a delve rolling with a generator seeded from the config.
    pub fn new(party: Party, config: DelveConfig) -> Self {
        let rng = StdRng::seed_from_u64(config.seed);
        Self::with_roller(party, config, rng)
    }
}

impl<R: Roller> Delve<R> {
    /// Start a delve with an explicit die source.
    pub fn with_roller(party: Party, config: DelveConfig, rng: R) -> Self {
        log::info!(
            "delve starts at depth {} with {} adventurers",
            config.depth,
            party.len()
        );
        Self {
            state: DungeonState::new(&config),
            party,
            config,
            rng,
            calendar: None,
            ledger: None,
        }
    }

    /// Report elapsed time to a calendar after every action.
    pub fn with_calendar(mut self, calendar: impl Calendar + 'static) -> Self {
        self.calendar = Some(Box::new(calendar));
        self
    }

    /// Bank loot with a ledger after every completed return.
    pub fn with_ledger(mut self, ledger: impl Ledger + 'static) -> Self {
        self.ledger = Some(Box::new(ledger));
        self
    }

    /// Current dungeon state.
    pub fn state(&self) -> &DungeonState {
        &self.state
    }

    /// The party.
    pub fn party(&self) -> &Party {
        &self.party
    }

    /// Mutable access to the party, for healing or recruiting between delves.
    pub fn party_mut(&mut self) -> &mut Party {
        &mut self.party
    }

    /// Configuration the delve started with.
    pub fn config(&self) -> &DelveConfig {
        &self.config
    }

    /// True once nobody in the party can act.
    pub fn is_over(&self) -> bool {
        self.party.is_defeated()
    }

    /// Serialize the dungeon state to JSON.
    pub fn export_state(&self) -> CrawlResult<String> {
        self.state.to_json()
    }

    /// Replace the dungeon state with a validated JSON snapshot.
    ///
    /// On error the current state is left untouched.
    pub fn import_state(&mut self, json: &str) -> CrawlResult<()> {
        self.state = DungeonState::from_json(json)?;
        log::info!(
            "imported snapshot at turn {}, depth {}",
            self.state.turn,
            self.state.depth
        );
        Ok(())
    }

    /// Run one action to completion.
    pub fn apply(&mut self, action: Action) -> ActionReport {
        log::debug!("action: {action} (status {})", self.state.status);
        let mut ctx = CrawlContext::new(
            &mut self.state,
            &mut self.party,
            &mut self.rng,
            &self.config,
        );
        let step = dispatch(&mut ctx, action);
        let CrawlContext {
            elapsed, emitted, ..
        } = ctx;

        if let Some(calendar) = self.calendar.as_mut() {
            calendar.advance(elapsed);
        }
        if let Step::Banked { gold, depth } = step {
            if let Some(ledger) = self.ledger.as_mut() {
                ledger.deposit(gold, &format!("Delve loot from depth {depth}"));
            }
            log::info!("banked {gold:.2} gp from depth {depth}");
        }

        ActionReport {
            accepted: !matches!(step, Step::Rejected),
            elapsed,
            entries: emitted,
        }
    }

    /// Move on to a new area.
    pub fn explore(&mut self) -> ActionReport {
        self.apply(Action::Explore)
    }

    /// Search the current area.
    pub fn search(&mut self) -> ActionReport {
        self.apply(Action::Search)
    }

    /// Eat and rest for a turn.
    pub fn rest(&mut self) -> ActionReport {
        self.apply(Action::Rest)
    }

    /// Deal with the obstacle in the way.
    pub fn resolve_obstacle(&mut self, strategy: Strategy) -> ActionReport {
        self.apply(Action::ResolveObstacle(strategy))
    }

    /// Attack the monsters present.
    pub fn fight(&mut self) -> ActionReport {
        self.apply(Action::ResolveEncounter(EncounterChoice::Fight))
    }

    /// Try to talk to the monsters present.
    pub fn parley(&mut self) -> ActionReport {
        self.apply(Action::ResolveEncounter(EncounterChoice::Parley))
    }

    /// Flee from the monsters present.
    pub fn evade(&mut self) -> ActionReport {
        self.apply(Action::Evade)
    }

    /// Collect waiting treasure.
    pub fn loot_room(&mut self) -> ActionReport {
        self.apply(Action::LootRoom)
    }

    /// Head back to the surface.
    pub fn attempt_return(&mut self) -> ActionReport {
        self.apply(Action::AttemptReturn)
    }

    /// Take the stairs down a level.
    pub fn descend(&mut self) -> ActionReport {
        self.apply(Action::Descend)
    }
}

fn dispatch(ctx: &mut CrawlContext<'_>, action: Action) -> Step {
    if ctx.party.is_defeated() {
        return reject(ctx, "Nobody in the party can act; the delve is over.".to_string());
    }
    let status = ctx.state.status;
    match (action, status) {
        (Action::Explore, Status::Idle) => explore(ctx),
        (Action::Search, Status::Idle) => search_area(ctx),
        (Action::Search, Status::Obstacle) => search_for_door(ctx),
        (Action::Rest, Status::Idle) => {
            if resources::rest(ctx) {
                Step::Done
            } else {
                reject(ctx, "There are no rations left to rest on.".to_string())
            }
        }
        (Action::ResolveObstacle(strategy), Status::Obstacle) => {
            obstacle::resolve_obstacle(ctx, strategy);
            Step::Done
        }
        (
            Action::ResolveEncounter(EncounterChoice::Fight),
            Status::Surprise | Status::Encounter,
        ) => fight(ctx),
        (
            Action::ResolveEncounter(EncounterChoice::Parley),
            Status::Surprise | Status::Encounter,
        ) => parley(ctx),
        (Action::Evade, Status::Surprise | Status::Encounter) => {
            evasion::evade(ctx);
            Step::Done
        }
        (Action::LootRoom, Status::Loot) => loot_room(ctx),
        (Action::AttemptReturn, Status::Idle) => match resources::attempt_return(ctx) {
            ReturnOutcome::Refused => Step::Rejected,
            ReturnOutcome::Interrupted => Step::Done,
            ReturnOutcome::Completed { gold, depth } => Step::Banked { gold, depth },
        },
        (Action::Descend, Status::Idle) => descend(ctx),
        (action, status) => reject(ctx, format!("Cannot {action} while {status}.")),
    }
}

fn reject(ctx: &mut CrawlContext<'_>, reason: String) -> Step {
    ctx.log(LogKind::Rejected, reason);
    Step::Rejected
}

fn explore(ctx: &mut CrawlContext<'_>) -> Step {
    resources::advance_turns(ctx, 1);
    if !ctx.state.in_encounter() {
        stocking::stock_area(ctx);
    }
    Step::Done
}

fn search_area(ctx: &mut CrawlContext<'_>) -> Step {
    if ctx.state.room_searched {
        return reject(ctx, "This area has already been searched.".to_string());
    }
    ctx.state.room_searched = true;
    ctx.log(LogKind::Explore, "The party searches the area.");
    resources::advance_turns(ctx, 1);
    if ctx.state.in_encounter() {
        return Step::Done;
    }
    if ctx.state.unguarded_treasure_waiting() {
        ctx.state.status = Status::Loot;
        ctx.log(LogKind::Treasure, "Hidden treasure is uncovered!");
    } else {
        ctx.log(LogKind::Explore, "The search turns up nothing.");
    }
    Step::Done
}

fn search_for_door(ctx: &mut CrawlContext<'_>) -> Step {
    let unlocated = matches!(
        ctx.state.obstacle.as_ref().map(|o| o.kind),
        Some(ObstacleKind::SecretDoor { located: false })
    );
    if !unlocated {
        return reject(ctx, "There is nothing hidden to search for here.".to_string());
    }
    obstacle::search_for_door(ctx);
    Step::Done
}

fn fight(ctx: &mut CrawlContext<'_>) -> Step {
    if ctx.state.status == Status::Surprise {
        ctx.log(
            LogKind::Combat,
            "The party strikes before the monsters react!",
        );
        if combat::party_round(ctx) == RoundOutcome::Continue {
            ctx.state.status = Status::Encounter;
        }
    } else {
        combat::combat_round(ctx);
    }
    Step::Done
}

fn parley(ctx: &mut CrawlContext<'_>) -> Step {
    let Some((name, reaction)) = ctx
        .state
        .encounter
        .as_ref()
        .map(|e| (e.name.clone(), e.reaction))
    else {
        return Step::Done;
    };
    if matches!(reaction, Reaction::Neutral | Reaction::Friendly) {
        ctx.elapsed.rounds += 1;
        ctx.log(
            LogKind::Encounter,
            format!("The {name} ({reaction}) agree to let the party pass."),
        );
        ctx.finish_encounter();
    } else {
        ctx.log(
            LogKind::Encounter,
            format!("The {name} ({reaction}) will not talk!"),
        );
        ctx.state.status = Status::Encounter;
        combat::monster_round(ctx, false);
    }
    Step::Done
}

fn loot_room(ctx: &mut CrawlContext<'_>) -> Step {
    let mut hoard = Hoard::default();
    if let Some(pending) = ctx.state.pending_treasure.take() {
        hoard.merge(treasure::roll_treasure(
            pending.treasure_type,
            pending.individuals,
            ctx.rng,
        ));
    }
    if ctx.state.unguarded_treasure_waiting() {
        hoard.merge(treasure::roll_unguarded(ctx.state.depth, ctx.rng));
    }
    if ctx.state.room_has_treasure {
        ctx.state.room_treasure_claimed = true;
    }

    ctx.state.coins.add(&hoard.coins);
    ctx.state.loot += hoard.gold_value();
    ctx.state.magic_items.extend(hoard.magic_items.iter().cloned());
    ctx.state.status = Status::Idle;

    let value = hoard.gold_value();
    ctx.log(
        LogKind::Treasure,
        format!("The party collects {} (worth {value:.2} gp).", hoard.describe()),
    );
    Step::Done
}

fn descend(ctx: &mut CrawlContext<'_>) -> Step {
    if ctx.state.depth >= MAX_DEPTH {
        return reject(ctx, format!("The stairs end at level {MAX_DEPTH}."));
    }
    ctx.state.depth += 1;
    ctx.state.leave_area();
    let depth = ctx.state.depth;
    ctx.log(
        LogKind::Explore,
        format!("The party takes the stairs down to level {depth}."),
    );
    resources::advance_turns(ctx, 1);
    Step::Done
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collab::{MemoryLedger, TurnCalendar};
    use crate::encounter::Encounter;
    use crate::party::{Character, CharacterClass, Weapon};
    use crate::state::AreaType;
    use crate::tables::lookup_monster;
    use delve_mechanics::ScriptedRoller;

    fn delve(script: Vec<u32>) -> Delve<ScriptedRoller> {
        let party = Party::new(vec![
            Character::new("Brom", CharacterClass::Fighter).with_hp(30),
        ]);
        Delve::with_roller(party, DelveConfig::default(), ScriptedRoller::new(script))
    }

    fn orcs(reaction: Reaction) -> Encounter {
        let mut enc = Encounter::from_def(lookup_monster(1, 11).unwrap(), 2, false);
        enc.reaction = reaction;
        enc
    }

    #[test]
    fn out_of_order_action_is_rejected() {
        let mut d = delve(vec![]);
        let before = d.state().clone();
        let report = d.loot_room();
        assert!(!report.accepted);
        assert!(report.elapsed.is_zero());
        assert_eq!(report.entries.len(), 1);
        assert_eq!(report.entries[0].kind, LogKind::Rejected);
        assert_eq!(d.state().turn, before.turn);
        assert_eq!(d.state().status, before.status);
        assert_eq!(d.state().log.len(), before.log.len() + 1);
    }

    #[test]
    fn explore_into_empty_room() {
        // Turn 1 has no wandering check; room, empty, no treasure.
        let mut d = delve(vec![2, 1, 6]);
        let report = d.explore();
        assert!(report.accepted);
        assert_eq!(report.elapsed.turns, 1);
        assert_eq!(d.state().area_type, Some(AreaType::Room));
        assert_eq!(d.state().status, Status::Idle);
        assert!(d.state().log.contains("It appears to be empty."));
    }

    #[test]
    fn search_then_loot() {
        let mut d = delve(vec![]);
        d.state.enter_area(AreaType::Room, None);
        d.state.room_has_treasure = true;

        let report = d.search();
        assert!(report.accepted);
        assert_eq!(d.state().status, Status::Loot);

        let report = d.loot_room();
        assert!(report.accepted);
        assert!(d.state().room_treasure_claimed);
        assert_eq!(d.state().status, Status::Idle);
        assert!(d.state().loot >= 0.0);
        assert!(d.state().validate().is_ok());

        let again = d.search();
        assert!(!again.accepted);
    }

    #[test]
    fn monster_room_treasure_comes_from_the_monsters() {
        let party = Party::new(vec![
            Character::new("Brom", CharacterClass::Fighter)
                .with_strength(18)
                .with_hp(30)
                .with_weapon(Weapon::TwoHandedSword),
        ]);
        let script = vec![
            // Room, monsters, treasure roll 3; one skeleton, 80 ft, friendly.
            1, 4, 3, 15, 1, 6, 6, 2, 2, 2, 2, 6, 6, //
            // Party wins initiative, natural 20 for 10 + 3.
            6, 1, 20, 10,
        ];
        let config = DelveConfig::default();
        let mut d = Delve::with_roller(party, config, ScriptedRoller::new(script));
        d.explore();
        assert!(d.state().room_has_treasure);
        d.fight();
        assert_eq!(d.state().status, Status::Loot);
        assert_eq!(d.state().pending_treasure, None);

        // Skeletons carry no treasure type, so the room pays nothing.
        let report = d.loot_room();
        assert!(report.accepted);
        assert!(d.state().coins.is_empty());
        assert_eq!(d.state().loot, 0.0);
        assert!(d.state().room_treasure_claimed);
        assert_eq!(d.state().status, Status::Idle);
        assert!(!d.state().unguarded_treasure_waiting());
    }

    #[test]
    fn friendly_parley_ends_encounter() {
        let mut d = delve(vec![]);
        d.state.encounter = Some(orcs(Reaction::Friendly));
        d.state.status = Status::Encounter;
        let report = d.parley();
        assert!(report.accepted);
        assert_eq!(report.elapsed.rounds, 1);
        assert_eq!(d.state().status, Status::Idle);
        assert!(d.state().encounter.is_none());
    }

    #[test]
    fn hostile_parley_draws_attacks() {
        // Two orcs attack the lone fighter; both miss on 1s.
        let mut d = delve(vec![1, 1]);
        d.state.encounter = Some(orcs(Reaction::Hostile));
        d.state.status = Status::Surprise;
        let report = d.parley();
        assert!(report.accepted);
        assert_eq!(report.elapsed.rounds, 1);
        assert_eq!(d.state().status, Status::Encounter);
        assert_eq!(d.party().members[0].hp, 30);
    }

    #[test]
    fn surprise_round_then_normal_status() {
        let mut d = delve(vec![1]);
        d.state.encounter = Some(orcs(Reaction::Hostile));
        d.state.status = Status::Surprise;
        let report = d.fight();
        assert!(report.accepted);
        assert_eq!(report.elapsed.rounds, 1);
        assert_eq!(d.state().status, Status::Encounter);
        assert_eq!(d.party().members[0].hp, 30);
    }

    #[test]
    fn descend_takes_a_turn() {
        let mut d = delve(vec![]);
        d.state.enter_area(AreaType::Corridor, None);
        let report = d.descend();
        assert!(report.accepted);
        assert_eq!(report.elapsed.turns, 1);
        assert_eq!(d.state().depth, 2);
        assert_eq!(d.state().area_type, None);
    }

    #[test]
    fn no_stairs_below_the_deepest_level() {
        let mut d = delve(vec![]);
        d.state.depth = MAX_DEPTH;
        let report = d.descend();
        assert!(!report.accepted);
        assert_eq!(d.state().depth, MAX_DEPTH);
        assert_eq!(d.state().turn, 0);
    }

    #[test]
    fn overflowing_snapshot_is_refused() {
        let mut d = delve(vec![]);
        let mut value: serde_json::Value =
            serde_json::from_str(&d.export_state().unwrap()).unwrap();
        value["depth"] = serde_json::json!(u32::MAX);
        assert!(d.import_state(&value.to_string()).is_err());

        value["depth"] = serde_json::json!(1);
        value["coins"]["cp"] = serde_json::json!(u64::MAX);
        value["coins"]["sp"] = serde_json::json!(1);
        assert!(d.import_state(&value.to_string()).is_err());
        assert_eq!(d.state().depth, 1);
        assert!(d.state().coins.is_empty());
        assert!(d.attempt_return().accepted);
    }

    #[test]
    fn return_banks_with_ledger_and_calendar() {
        let ledger = MemoryLedger::new();
        let calendar = TurnCalendar::new();
        // Three turns up from level 1; one quiet check on turn 2.
        let mut d = delve(vec![6])
            .with_ledger(ledger.clone())
            .with_calendar(calendar.clone());
        d.state.loot = 75.0;
        d.state.coins.gp = 75;
        let report = d.attempt_return();
        assert!(report.accepted);
        assert_eq!(
            ledger.deposits(),
            vec![(75.0, "Delve loot from depth 1".to_string())]
        );
        assert_eq!(calendar.total().turns, 3);
        assert_eq!(d.state().loot, 0.0);
    }

    #[test]
    fn overloaded_return_is_rejected() {
        let ledger = MemoryLedger::new();
        let mut d = delve(vec![]).with_ledger(ledger.clone());
        d.state.coins.cp = 16_001;
        let report = d.attempt_return();
        assert!(!report.accepted);
        assert!(ledger.deposits().is_empty());
        assert_eq!(d.state().coins.cp, 16_001);
    }

    #[test]
    fn rest_without_rations_is_rejected() {
        let mut d = delve(vec![]);
        d.state.rations = 0;
        assert!(!d.rest().accepted);
    }

    #[test]
    fn defeated_party_cannot_act() {
        let mut d = delve(vec![]);
        d.party_mut().members[0].slay();
        assert!(d.is_over());
        let report = d.explore();
        assert!(!report.accepted);
        assert_eq!(d.state().turn, 0);
    }

    #[test]
    fn search_outside_secret_door_rejected() {
        let mut d = delve(vec![]);
        d.state.obstacle = Some(crate::obstacle::Obstacle::new(ObstacleKind::StuckDoor));
        d.state.status = Status::Obstacle;
        assert!(!d.search().accepted);
    }

    #[test]
    fn snapshot_export_and_import() {
        let mut d = delve(vec![2, 1, 6]);
        d.explore();
        let json = d.export_state().unwrap();

        let mut other = delve(vec![]);
        other.import_state(&json).unwrap();
        assert_eq!(other.state(), d.state());

        let before = other.state().clone();
        assert!(other.import_state("{\"turn\": 1}").is_err());
        assert_eq!(other.state(), &before);
    }
}
