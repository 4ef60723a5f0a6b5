//! Treasure generation: lettered treasure types and unguarded room hoards.
//!
//! Lair types A-O are rolled once per lair; individual types P-V are rolled
//! once per creature. Every hoard converts to a gold-piece value with fixed
//! exchange rates.

use delve_mechanics::Roller;
use serde::{Deserialize, Serialize};

use crate::tables::roll_formula;

/// Gold value of one copper piece.
pub const CP_RATE: f64 = 0.01;
/// Gold value of one silver piece.
pub const SP_RATE: f64 = 0.1;
/// Gold value of one electrum piece.
pub const EP_RATE: f64 = 0.5;
/// Gold value of one platinum piece.
pub const PP_RATE: f64 = 5.0;

/// Carried coins by denomination.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coins {
    /// Copper.
    pub cp: u64,
    /// Silver.
    pub sp: u64,
    /// Electrum.
    pub ep: u64,
    /// Gold.
    pub gp: u64,
    /// Platinum.
    pub pp: u64,
}

impl Coins {
    /// Counts in `[cp, sp, ep, gp, pp]` order.
    pub fn denominations(&self) -> [u64; 5] {
        [self.cp, self.sp, self.ep, self.gp, self.pp]
    }

    /// Total number of coins, which drives encumbrance.
    pub fn count(&self) -> u64 {
        self.denominations()
            .into_iter()
            .fold(0, |total, n| total.saturating_add(n))
    }

    /// Value in gold pieces.
    pub fn gold_value(&self) -> f64 {
        self.cp as f64 * CP_RATE
            + self.sp as f64 * SP_RATE
            + self.ep as f64 * EP_RATE
            + self.gp as f64
            + self.pp as f64 * PP_RATE
    }

    /// Add another purse to this one.
    pub fn add(&mut self, other: &Coins) {
        self.cp = self.cp.saturating_add(other.cp);
        self.sp = self.sp.saturating_add(other.sp);
        self.ep = self.ep.saturating_add(other.ep);
        self.gp = self.gp.saturating_add(other.gp);
        self.pp = self.pp.saturating_add(other.pp);
    }

    /// True when the purse is empty.
    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }
}

impl std::fmt::Display for Coins {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = [
            (self.pp, "pp"),
            (self.gp, "gp"),
            (self.ep, "ep"),
            (self.sp, "sp"),
            (self.cp, "cp"),
        ]
        .iter()
        .filter(|(n, _)| *n > 0)
        .map(|(n, unit)| format!("{n} {unit}"))
        .collect();
        if parts.is_empty() {
            write!(f, "no coins")
        } else {
            write!(f, "{}", parts.join(", "))
        }
    }
}

/// Lettered treasure type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[allow(missing_docs)]
pub enum TreasureType {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
    I,
    J,
    K,
    L,
    M,
    N,
    O,
    P,
    Q,
    R,
    S,
    T,
    U,
    V,
}

/// A percent chance of a dice-rolled amount.
#[derive(Debug, Clone, Copy)]
struct Chance {
    percent: u32,
    amount: &'static str,
}

const fn c(percent: u32, amount: &'static str) -> Option<Chance> {
    Some(Chance { percent, amount })
}

/// Contents of one treasure type row.
#[derive(Debug, Clone, Copy, Default)]
struct TreasureSpec {
    cp: Option<Chance>,
    sp: Option<Chance>,
    ep: Option<Chance>,
    gp: Option<Chance>,
    pp: Option<Chance>,
    gems: Option<Chance>,
    jewelry: Option<Chance>,
    magic: Option<Chance>,
}

const NONE: TreasureSpec = TreasureSpec {
    cp: None,
    sp: None,
    ep: None,
    gp: None,
    pp: None,
    gems: None,
    jewelry: None,
    magic: None,
};

impl TreasureType {
    /// True for the per-creature types P through V.
    pub fn is_individual(self) -> bool {
        matches!(
            self,
            Self::P | Self::Q | Self::R | Self::S | Self::T | Self::U | Self::V
        )
    }

    fn spec(self) -> TreasureSpec {
        match self {
            Self::A => TreasureSpec {
                cp: c(25, "1d6x1000"),
                sp: c(30, "1d6x1000"),
                ep: c(20, "1d4x1000"),
                gp: c(35, "2d6x1000"),
                pp: c(25, "1d2x1000"),
                gems: c(50, "6d6"),
                jewelry: c(50, "6d6"),
                magic: c(30, "3"),
            },
            Self::B => TreasureSpec {
                cp: c(50, "1d8x1000"),
                sp: c(25, "1d6x1000"),
                ep: c(25, "1d4x1000"),
                gp: c(25, "1d3x1000"),
                gems: c(25, "1d6"),
                jewelry: c(25, "1d6"),
                magic: c(10, "1"),
                ..NONE
            },
            Self::C => TreasureSpec {
                cp: c(20, "1d12x1000"),
                sp: c(30, "1d4x1000"),
                ep: c(10, "1d4x1000"),
                gems: c(25, "1d4"),
                jewelry: c(25, "1d4"),
                magic: c(10, "2"),
                ..NONE
            },
            Self::D => TreasureSpec {
                cp: c(10, "1d8x1000"),
                sp: c(15, "1d12x1000"),
                gp: c(60, "1d6x1000"),
                gems: c(30, "1d8"),
                jewelry: c(30, "1d8"),
                magic: c(15, "3"),
                ..NONE
            },
            Self::E => TreasureSpec {
                cp: c(5, "1d10x1000"),
                sp: c(30, "1d12x1000"),
                ep: c(25, "1d4x1000"),
                gp: c(25, "1d8x1000"),
                gems: c(10, "1d10"),
                jewelry: c(10, "1d10"),
                magic: c(25, "4"),
                ..NONE
            },
            Self::F => TreasureSpec {
                sp: c(10, "2d10x1000"),
                ep: c(20, "1d8x1000"),
                gp: c(45, "1d12x1000"),
                pp: c(30, "1d3x1000"),
                gems: c(20, "2d12"),
                jewelry: c(10, "1d12"),
                magic: c(30, "5"),
                ..NONE
            },
            Self::G => TreasureSpec {
                gp: c(50, "1d4x10000"),
                pp: c(50, "1d6x1000"),
                gems: c(25, "3d6"),
                jewelry: c(25, "1d10"),
                magic: c(35, "5"),
                ..NONE
            },
            Self::H => TreasureSpec {
                cp: c(25, "3d8x1000"),
                sp: c(50, "1d100x1000"),
                ep: c(50, "1d4x10000"),
                gp: c(50, "1d6x10000"),
                pp: c(25, "5d4x1000"),
                gems: c(50, "1d100"),
                jewelry: c(50, "1d4x10"),
                magic: c(15, "6"),
            },
            Self::I => TreasureSpec {
                pp: c(30, "1d8x1000"),
                gems: c(50, "2d6"),
                jewelry: c(50, "2d6"),
                magic: c(15, "1"),
                ..NONE
            },
            Self::J => TreasureSpec {
                cp: c(25, "1d4x1000"),
                sp: c(10, "1d3x1000"),
                ..NONE
            },
            Self::K => TreasureSpec {
                sp: c(30, "1d6x1000"),
                ep: c(10, "1d2x1000"),
                ..NONE
            },
            Self::L => TreasureSpec {
                gems: c(50, "1d4"),
                ..NONE
            },
            Self::M => TreasureSpec {
                gp: c(40, "2d4x1000"),
                pp: c(50, "5d6x1000"),
                gems: c(55, "5d4"),
                jewelry: c(45, "2d6"),
                ..NONE
            },
            Self::N => TreasureSpec {
                magic: c(40, "2d4"),
                ..NONE
            },
            Self::O => TreasureSpec {
                magic: c(50, "1d4"),
                ..NONE
            },
            Self::P => TreasureSpec {
                cp: c(100, "3d8"),
                ..NONE
            },
            Self::Q => TreasureSpec {
                sp: c(100, "3d6"),
                ..NONE
            },
            Self::R => TreasureSpec {
                ep: c(100, "2d6"),
                ..NONE
            },
            Self::S => TreasureSpec {
                gp: c(100, "2d4"),
                ..NONE
            },
            Self::T => TreasureSpec {
                pp: c(100, "1d6"),
                ..NONE
            },
            Self::U => TreasureSpec {
                cp: c(10, "1d100"),
                sp: c(10, "1d100"),
                gp: c(5, "1d100"),
                gems: c(5, "1d4"),
                jewelry: c(5, "1d4"),
                magic: c(2, "1"),
                ..NONE
            },
            Self::V => TreasureSpec {
                sp: c(10, "1d100"),
                ep: c(5, "1d100"),
                gp: c(10, "1d100"),
                pp: c(5, "1d100"),
                gems: c(10, "1d4"),
                jewelry: c(10, "1d4"),
                magic: c(5, "1"),
                ..NONE
            },
        }
    }
}

impl std::fmt::Display for TreasureType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

/// Everything a roll on a treasure table produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Hoard {
    /// Coins by denomination.
    pub coins: Coins,
    /// Value of each gem in gold pieces.
    pub gems: Vec<u32>,
    /// Value of each piece of jewelry in gold pieces.
    pub jewelry: Vec<u32>,
    /// Names of magic items found.
    pub magic_items: Vec<String>,
}

impl Hoard {
    /// Gold-piece value of coins, gems, and jewelry. Magic items are not priced.
    pub fn gold_value(&self) -> f64 {
        let gems: u32 = self.gems.iter().sum();
        let jewelry: u32 = self.jewelry.iter().sum();
        self.coins.gold_value() + f64::from(gems) + f64::from(jewelry)
    }

    /// True when nothing was found.
    pub fn is_empty(&self) -> bool {
        self.coins.is_empty()
            && self.gems.is_empty()
            && self.jewelry.is_empty()
            && self.magic_items.is_empty()
    }

    /// Merge another hoard into this one.
    pub fn merge(&mut self, other: Hoard) {
        self.coins.add(&other.coins);
        self.gems.extend(other.gems);
        self.jewelry.extend(other.jewelry);
        self.magic_items.extend(other.magic_items);
    }

    /// One-line description for the log.
    pub fn describe(&self) -> String {
        if self.is_empty() {
            return "nothing of value".to_string();
        }
        let mut parts = Vec::new();
        if !self.coins.is_empty() {
            parts.push(self.coins.to_string());
        }
        if !self.gems.is_empty() {
            parts.push(format!("{} gems", self.gems.len()));
        }
        if !self.jewelry.is_empty() {
            parts.push(format!("{} pieces of jewelry", self.jewelry.len()));
        }
        if !self.magic_items.is_empty() {
            parts.push(self.magic_items.join(", "));
        }
        parts.join("; ")
    }
}

/// Roll a lettered treasure type. Individual types roll once per creature.
pub fn roll_treasure(kind: TreasureType, individuals: u32, rng: &mut dyn Roller) -> Hoard {
    let spec = kind.spec();
    let rolls = if kind.is_individual() {
        individuals.max(1)
    } else {
        1
    };
    let mut hoard = Hoard::default();
    for _ in 0..rolls {
        hoard.merge(roll_spec(&spec, rng));
    }
    hoard
}

/// Roll unguarded treasure for a room at the given depth.
pub fn roll_unguarded(depth: u32, rng: &mut dyn Roller) -> Hoard {
    let spec = match depth {
        0 | 1 => TreasureSpec {
            sp: c(100, "1d6x100"),
            gp: c(50, "1d6x10"),
            gems: c(5, "1d6"),
            jewelry: c(2, "1d6"),
            magic: c(2, "1"),
            ..NONE
        },
        2 | 3 => TreasureSpec {
            sp: c(100, "1d12x100"),
            gp: c(50, "1d6x100"),
            gems: c(10, "1d6"),
            jewelry: c(5, "1d6"),
            magic: c(8, "1"),
            ..NONE
        },
        4 | 5 => TreasureSpec {
            sp: c(100, "1d6x1000"),
            gp: c(100, "1d6x200"),
            gems: c(20, "1d6"),
            jewelry: c(10, "1d6"),
            magic: c(10, "1"),
            ..NONE
        },
        6 | 7 => TreasureSpec {
            sp: c(100, "1d6x2000"),
            gp: c(100, "1d6x500"),
            gems: c(30, "1d6"),
            jewelry: c(15, "1d6"),
            magic: c(15, "1"),
            ..NONE
        },
        _ => TreasureSpec {
            sp: c(100, "1d6x5000"),
            gp: c(100, "1d6x1000"),
            gems: c(40, "1d6"),
            jewelry: c(20, "1d6"),
            magic: c(20, "1"),
            ..NONE
        },
    };
    roll_spec(&spec, rng)
}

fn amount(chance: Option<Chance>, rng: &mut dyn Roller) -> u64 {
    match chance {
        Some(ch) if rng.percent(ch.percent) => roll_formula(ch.amount, rng).max(0) as u64,
        _ => 0,
    }
}

fn roll_spec(spec: &TreasureSpec, rng: &mut dyn Roller) -> Hoard {
    let coins = Coins {
        cp: amount(spec.cp, rng),
        sp: amount(spec.sp, rng),
        ep: amount(spec.ep, rng),
        gp: amount(spec.gp, rng),
        pp: amount(spec.pp, rng),
    };
    let gem_count = amount(spec.gems, rng);
    let jewelry_count = amount(spec.jewelry, rng);
    let magic_count = amount(spec.magic, rng);

    Hoard {
        coins,
        gems: (0..gem_count).map(|_| gem_value(rng)).collect(),
        jewelry: (0..jewelry_count)
            .map(|_| rng.roll_sum(3, 6) * 100)
            .collect(),
        magic_items: (0..magic_count).map(|_| magic_item(rng).to_string()).collect(),
    }
}

/// Value of one gem from a d100 roll.
pub fn gem_value(rng: &mut dyn Roller) -> u32 {
    match rng.roll_die(100) {
        1..=20 => 10,
        21..=45 => 50,
        46..=75 => 100,
        76..=95 => 500,
        _ => 1000,
    }
}

/// Category name of one magic item from a d100 roll.
pub fn magic_item(rng: &mut dyn Roller) -> &'static str {
    match rng.roll_die(100) {
        1..=25 => "Potion",
        26..=37 => "Scroll",
        38..=47 => "Wand, Staff, or Rod",
        48..=52 => "Ring",
        53..=72 => "Magic Sword",
        73..=82 => "Magic Armor",
        83..=95 => "Magic Weapon",
        _ => "Miscellaneous Magic Item",
    }
}
