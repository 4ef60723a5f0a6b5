//! Configuration for a delve.

/// Starting conditions and house rules for a delve.
#[derive(Debug, Clone)]
pub struct DelveConfig {
    /// RNG seed for reproducible delves.
    pub seed: u64,
    /// Dungeon level the party starts on (at least 1).
    pub depth: u32,
    /// Torches carried at the start.
    pub torches: u32,
    /// Rations carried at the start.
    pub rations: u32,
    /// Whether monsters met in stocked rooms guard their lair treasure.
    pub lair_mode: bool,
    /// Percent chance used for lock and trap work when nobody has the skill.
    pub untrained_skill_chance: u32,
}

impl Default for DelveConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            depth: 1,
            torches: 6,
            rations: 7,
            lair_mode: true,
            untrained_skill_chance: 10,
        }
    }
}

impl DelveConfig {
    /// Set the RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the starting depth (minimum 1).
    pub fn with_depth(mut self, depth: u32) -> Self {
        self.depth = depth.max(1);
        self
    }

    /// Set the starting torch supply.
    pub fn with_torches(mut self, torches: u32) -> Self {
        self.torches = torches;
        self
    }

    /// Set the starting ration supply.
    pub fn with_rations(mut self, rations: u32) -> Self {
        self.rations = rations;
        self
    }

    /// Enable or disable lair treasure for room monsters.
    pub fn with_lair_mode(mut self, lair_mode: bool) -> Self {
        self.lair_mode = lair_mode;
        self
    }

    /// Set the untrained skill chance (clamped to 0-100).
    pub fn with_untrained_skill_chance(mut self, percent: u32) -> Self {
        self.untrained_skill_chance = percent.min(100);
        self
    }
}
