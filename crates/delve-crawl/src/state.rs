//! The dungeon state aggregate and its JSON snapshot.

use serde::{Deserialize, Serialize};

use crate::config::DelveConfig;
use crate::encounter::Encounter;
use crate::error::{CrawlError, CrawlResult};
use crate::journal::Journal;
use crate::obstacle::Obstacle;
use crate::treasure::{Coins, TreasureType};

/// Turns one torch burns before it is used up.
pub const TORCH_TURNS: u32 = 6;

/// Deepest dungeon level the engine tracks.
pub const MAX_DEPTH: u32 = 100;

/// Most coins of one denomination a party can be carrying.
pub const MAX_COINS: u64 = 1_000_000_000;

/// Largest pooled hit points a monster group can have.
const MAX_POOL_HP: i32 = 1_000_000;

/// Turns of the last torch after which the light is dim.
const DIM_AFTER: u32 = 4;

/// Ambient light level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lighting {
    /// A torch burns.
    Bright,
    /// The last torch is guttering.
    Dim,
    /// No light left.
    Dark,
}

impl Lighting {
    /// Light level for a torch supply.
    pub fn derive(torches: u32, torch_turns_used: u32) -> Self {
        match torches {
            0 => Self::Dark,
            1 if torch_turns_used >= DIM_AFTER => Self::Dim,
            _ => Self::Bright,
        }
    }
}

impl std::fmt::Display for Lighting {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bright => write!(f, "bright"),
            Self::Dim => write!(f, "dim"),
            Self::Dark => write!(f, "dark"),
        }
    }
}

/// Phase of the delve.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// Nothing pending; the party may move on.
    #[default]
    Idle,
    /// Monsters are surprised and the party may strike first.
    Surprise,
    /// Monsters are present.
    Encounter,
    /// A door, trap, hazard, or feature blocks the way.
    Obstacle,
    /// Treasure is waiting to be collected.
    Loot,
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Surprise => write!(f, "surprise"),
            Self::Encounter => write!(f, "encounter"),
            Self::Obstacle => write!(f, "obstacle"),
            Self::Loot => write!(f, "loot"),
        }
    }
}

/// Shape of the current area. Flavor only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AreaType {
    /// A room.
    Room,
    /// A corridor.
    Corridor,
    /// Where passages meet.
    Intersection,
}

impl std::fmt::Display for AreaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Room => write!(f, "room"),
            Self::Corridor => write!(f, "corridor"),
            Self::Intersection => write!(f, "intersection"),
        }
    }
}

/// Kind of intersection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IntersectionKind {
    /// Three ways, one ending.
    TJunction,
    /// Four ways.
    FourWay,
    /// A passage splitting in two.
    YFork,
    /// A stair landing.
    Landing,
}

impl std::fmt::Display for IntersectionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TJunction => write!(f, "T-junction"),
            Self::FourWay => write!(f, "four-way crossing"),
            Self::YFork => write!(f, "Y-fork"),
            Self::Landing => write!(f, "stair landing"),
        }
    }
}

/// What a stocked area holds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomContents {
    /// Nothing.
    #[default]
    Empty,
    /// A trap.
    Trap,
    /// Monsters.
    Monster,
    /// A door, hazard, or feature.
    Special,
}

impl std::fmt::Display for RoomContents {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "empty"),
            Self::Trap => write!(f, "trap"),
            Self::Monster => write!(f, "monster"),
            Self::Special => write!(f, "special"),
        }
    }
}

/// Lair or carried treasure owed by defeated monsters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingTreasure {
    /// Treasure type to roll.
    pub treasure_type: TreasureType,
    /// Creatures carrying it, for individual types.
    pub individuals: u32,
}

/// Everything about one delve that changes while it runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DungeonState {
    /// Ten-minute turns since entering the dungeon.
    pub turn: u32,
    /// Current dungeon level.
    pub depth: u32,
    /// Light level, always consistent with the torch supply.
    pub lighting: Lighting,
    /// Torches left, counting the one burning.
    pub torches: u32,
    /// Turns the current torch has burned.
    pub torch_turns_used: u32,
    /// Rations left.
    pub rations: u32,
    /// Gold-piece value of everything carried.
    pub loot: f64,
    /// Carried coins by denomination.
    pub coins: Coins,
    /// Whether room monsters guard lair treasure.
    pub lair_mode: bool,
    /// Current phase.
    pub status: Status,
    /// Shape of the current area; `None` at the dungeon entrance.
    pub area_type: Option<AreaType>,
    /// Kind of intersection, when the area is one.
    pub intersection_kind: Option<IntersectionKind>,
    /// Stocked contents of the current area.
    pub room_contents: RoomContents,
    /// Whether the stocking roll found treasure in the area.
    pub room_has_treasure: bool,
    /// Whether the area's treasure has been taken.
    pub room_treasure_claimed: bool,
    /// Whether the area has been searched.
    pub room_searched: bool,
    /// Active encounter.
    pub encounter: Option<Encounter>,
    /// Active obstacle.
    pub obstacle: Option<Obstacle>,
    /// Treasure owed by monsters defeated in this area.
    #[serde(default)]
    pub pending_treasure: Option<PendingTreasure>,
    /// Names of magic items carried.
    #[serde(default)]
    pub magic_items: Vec<String>,
    /// In-game log, newest first.
    pub log: Journal,
}

impl DungeonState {
    /// A fresh delve at the dungeon entrance.
    pub fn new(config: &DelveConfig) -> Self {
        Self {
            turn: 0,
            depth: config.depth.max(1),
            lighting: Lighting::derive(config.torches, 0),
            torches: config.torches,
            torch_turns_used: 0,
            rations: config.rations,
            loot: 0.0,
            coins: Coins::default(),
            lair_mode: config.lair_mode,
            status: Status::Idle,
            area_type: None,
            intersection_kind: None,
            room_contents: RoomContents::Empty,
            room_has_treasure: false,
            room_treasure_claimed: false,
            room_searched: false,
            encounter: None,
            obstacle: None,
            pending_treasure: None,
            magic_items: Vec::new(),
            log: Journal::new(),
        }
    }

    /// Recompute the light level from the torch supply.
    pub fn update_lighting(&mut self) {
        self.lighting = Lighting::derive(self.torches, self.torch_turns_used);
    }

    /// Move into a new area, clearing every per-area flag.
    pub fn enter_area(&mut self, area_type: AreaType, intersection_kind: Option<IntersectionKind>) {
        self.leave_area();
        self.area_type = Some(area_type);
        if area_type == AreaType::Intersection {
            self.intersection_kind = intersection_kind;
        }
    }

    /// Leave the current area without entering another (stairs, the surface).
    pub fn leave_area(&mut self) {
        self.area_type = None;
        self.intersection_kind = None;
        self.room_contents = RoomContents::Empty;
        self.room_has_treasure = false;
        self.room_treasure_claimed = false;
        self.room_searched = false;
        self.pending_treasure = None;
    }

    /// True when a monster-free area still hides treasure nobody has taken.
    ///
    /// Treasure flagged in a monster room is the monsters' hoard and is paid
    /// out from their treasure type instead.
    pub fn unguarded_treasure_waiting(&self) -> bool {
        self.room_has_treasure
            && !self.room_treasure_claimed
            && self.room_contents != RoomContents::Monster
    }

    /// True while monsters are present.
    pub fn in_encounter(&self) -> bool {
        matches!(self.status, Status::Surprise | Status::Encounter)
    }

    /// End the current encounter and return to idle.
    pub fn clear_encounter(&mut self) {
        self.encounter = None;
        self.status = Status::Idle;
    }

    /// End the current obstacle and return to idle.
    pub fn clear_obstacle(&mut self) {
        self.obstacle = None;
        self.status = Status::Idle;
    }

    /// Total coins carried.
    pub fn coin_count(&self) -> u64 {
        self.coins.count()
    }

    /// Serialize to a JSON snapshot.
    pub fn to_json(&self) -> CrawlResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| CrawlError::Export(e.to_string()))
    }

    /// Parse and validate a JSON snapshot.
    ///
    /// Logs longer than the cap are truncated to the newest entries. Any
    /// other problem rejects the whole snapshot.
    pub fn from_json(json: &str) -> CrawlResult<Self> {
        let mut state: Self =
            serde_json::from_str(json).map_err(|e| CrawlError::MalformedSnapshot(e.to_string()))?;
        state.log.enforce_capacity();
        state.validate()?;
        Ok(state)
    }

    /// Check every state invariant.
    pub fn validate(&self) -> CrawlResult<()> {
        let fail = |msg: String| Err(CrawlError::InconsistentSnapshot(msg));

        let encounter = self.encounter.is_some();
        let obstacle = self.obstacle.is_some();
        let consistent = match self.status {
            Status::Idle => !encounter && !obstacle && self.pending_treasure.is_none(),
            Status::Surprise | Status::Encounter => encounter && !obstacle,
            Status::Obstacle => obstacle && !encounter,
            Status::Loot => !encounter && !obstacle,
        };
        if !consistent {
            return fail(format!(
                "status '{}' does not match encounter={encounter}, obstacle={obstacle}",
                self.status
            ));
        }
        if self.obstacle.as_ref().is_some_and(|o| o.resolved) {
            return fail("a resolved obstacle is still blocking the area".to_string());
        }
        if self.pending_treasure.is_some() && self.status != Status::Loot {
            return fail("pending treasure outside loot status".to_string());
        }
        if !(1..=MAX_DEPTH).contains(&self.depth) {
            return fail(format!("depth {} outside 1-{MAX_DEPTH}", self.depth));
        }
        if let Some(count) = self.coins.denominations().into_iter().find(|n| *n > MAX_COINS) {
            return fail(format!("coin count {count} exceeds {MAX_COINS}"));
        }
        if self.torch_turns_used >= TORCH_TURNS {
            return fail(format!(
                "torchTurnsUsed {} must be below {TORCH_TURNS}",
                self.torch_turns_used
            ));
        }
        let lighting = Lighting::derive(self.torches, self.torch_turns_used);
        if self.lighting != lighting {
            return fail(format!(
                "lighting '{}' but torches imply '{lighting}'",
                self.lighting
            ));
        }
        if self.room_treasure_claimed && !self.room_has_treasure {
            return fail("roomTreasureClaimed without roomHasTreasure".to_string());
        }
        if self.intersection_kind.is_some() && self.area_type != Some(AreaType::Intersection) {
            return fail("intersectionKind set on a non-intersection".to_string());
        }
        if !self.loot.is_finite() || self.loot < 0.0 {
            return fail(format!("loot {} is not a valid amount", self.loot));
        }
        if let Some(enc) = &self.encounter {
            if enc.hp < 0 || enc.hp > enc.hp_max || enc.hp_max > MAX_POOL_HP {
                return fail(format!("encounter hp {}/{} out of range", enc.hp, enc.hp_max));
            }
            if enc.damage_taken < 0 {
                return fail(format!("encounter damageTaken {} is negative", enc.damage_taken));
            }
            if enc.quantity == 0 {
                return fail("encounter quantity must be at least 1".to_string());
            }
            if !(2..=12).contains(&enc.morale) {
                return fail(format!("encounter morale {} outside 2-12", enc.morale));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::journal::{LOG_CAPACITY, LogEntry, LogKind};

    fn state() -> DungeonState {
        DungeonState::new(&DelveConfig::default())
    }

    #[test]
    fn new_state_from_config() {
        let s = DungeonState::new(&DelveConfig::default().with_depth(3).with_torches(0));
        assert_eq!(s.depth, 3);
        assert_eq!(s.lighting, Lighting::Dark);
        assert_eq!(s.status, Status::Idle);
        assert!(s.validate().is_ok());
    }

    #[test]
    fn lighting_derivation() {
        assert_eq!(Lighting::derive(0, 0), Lighting::Dark);
        assert_eq!(Lighting::derive(1, 3), Lighting::Bright);
        assert_eq!(Lighting::derive(1, 4), Lighting::Dim);
        assert_eq!(Lighting::derive(2, 5), Lighting::Bright);
    }

    #[test]
    fn enter_area_resets_flags() {
        let mut s = state();
        s.room_has_treasure = true;
        s.room_treasure_claimed = true;
        s.room_searched = true;
        s.room_contents = RoomContents::Trap;
        s.enter_area(AreaType::Corridor, Some(IntersectionKind::Landing));
        assert!(!s.room_has_treasure && !s.room_treasure_claimed && !s.room_searched);
        assert_eq!(s.room_contents, RoomContents::Empty);
        assert_eq!(s.intersection_kind, None);
    }

    #[test]
    fn snapshot_round_trip() {
        let mut s = state();
        s.turn = 9;
        s.coins.gp = 120;
        s.loot = 120.0;
        s.enter_area(AreaType::Intersection, Some(IntersectionKind::YFork));
        s.log.push(LogEntry {
            turn: 9,
            kind: LogKind::Explore,
            message: "A Y-fork.".to_string(),
        });
        let json = s.to_json().unwrap();
        assert!(json.contains("\"torchTurnsUsed\""));
        assert!(json.contains("\"intersectionKind\": \"y-fork\""));
        let back = DungeonState::from_json(&json).unwrap();
        assert_eq!(back, s);
    }

    #[test]
    fn oversized_log_is_truncated_on_import() {
        let mut s = state();
        let mut value = serde_json::to_value(&s).unwrap();
        let entries: Vec<_> = (0..LOG_CAPACITY as u32 + 50)
            .map(|i| {
                serde_json::json!({"turn": i, "kind": "travel", "message": format!("tick {i}")})
            })
            .collect();
        value["log"] = serde_json::Value::Array(entries);
        s = DungeonState::from_json(&value.to_string()).unwrap();
        assert_eq!(s.log.len(), LOG_CAPACITY);
        assert_eq!(s.log.latest().unwrap().turn, 0);
    }

    #[test]
    fn malformed_snapshot_rejected() {
        let err = DungeonState::from_json("{\"turn\": \"soon\"}").unwrap_err();
        assert!(matches!(err, CrawlError::MalformedSnapshot(_)));
        let err = DungeonState::from_json("not json").unwrap_err();
        assert!(matches!(err, CrawlError::MalformedSnapshot(_)));
    }

    #[test]
    fn inconsistent_snapshots_rejected() {
        let mut s = state();
        s.status = Status::Encounter;
        assert!(matches!(
            s.validate(),
            Err(CrawlError::InconsistentSnapshot(_))
        ));

        let mut s = state();
        s.torches = 0;
        assert!(s.validate().is_err());

        let mut s = state();
        s.room_treasure_claimed = true;
        assert!(s.validate().is_err());

        let mut s = state();
        s.torch_turns_used = 6;
        assert!(s.validate().is_err());

        let mut s = state();
        let mut door = Obstacle::new(crate::obstacle::ObstacleKind::StuckDoor);
        door.resolved = true;
        s.obstacle = Some(door);
        s.status = Status::Obstacle;
        assert!(s.validate().unwrap_err().to_string().contains("resolved obstacle"));
    }

    #[test]
    fn out_of_range_numbers_rejected() {
        let mut s = state();
        s.coins.cp = u64::MAX;
        s.coins.sp = 1;
        assert!(matches!(
            DungeonState::from_json(&s.to_json().unwrap()),
            Err(CrawlError::InconsistentSnapshot(_))
        ));

        let mut s = state();
        s.depth = u32::MAX;
        let err = DungeonState::from_json(&s.to_json().unwrap()).unwrap_err();
        assert!(err.to_string().contains("depth"));

        let mut s = state();
        s.depth = MAX_DEPTH;
        s.coins.gp = MAX_COINS;
        assert!(s.validate().is_ok());
    }

    #[test]
    fn inconsistent_json_rejected_whole() {
        let mut s = state();
        s.status = Status::Obstacle;
        let json = serde_json::to_string(&s).unwrap();
        let err = DungeonState::from_json(&json).unwrap_err();
        assert!(err.to_string().contains("status 'obstacle'"));
    }
}
