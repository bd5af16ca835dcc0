/// Combat configuration constants and tunable parameters.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CombatConfig {
    /// Number of rounds before the battle times out.
    pub rounds: u32,
    pub initial_skill_points: u32,
    pub max_skill_points: u32,
    /// Fraction of max energy every character starts with.
    pub initial_energy_ratio: f64,
    /// Flat energy granted for defeating an enemy.
    pub kill_energy_reward: f64,
}

impl CombatConfig {
    // ===== engine limits =====
    /// Safety cap on the number of turns in a single battle.
    pub const MAX_TURNS: u32 = 500;
    /// Maximum follow-up actions drained after a single action.
    pub const MAX_PENDING_ACTIONS: usize = 100;
    /// Maximum consecutive immediate ultimates in one check.
    pub const MAX_ULTIMATE_CHAIN: usize = 10;
    /// Maximum actions one unit may take within a single turn.
    pub const MAX_ACTIONS_PER_TURN: u32 = 10;
    /// Maximum nesting of event publication.
    pub const MAX_EVENT_DEPTH: u32 = 32;

    // ===== timeline =====
    /// Action gauge length; a unit's action value is `ACTION_GAUGE / spd`.
    pub const ACTION_GAUGE: f64 = 10_000.0;
    pub const FIRST_ROUND_ACTION_VALUE: f64 = 150.0;
    pub const ROUND_ACTION_VALUE: f64 = 100.0;

    // ===== combat constants =====
    /// Damage multiplier against units whose toughness is not broken.
    pub const UNBROKEN_DAMAGE_MULTIPLIER: f64 = 0.9;
    /// Fraction of the action gauge a weakness break delays the target.
    pub const BREAK_DELAY: f64 = 0.25;
    pub const DEFAULT_BASIC_TOUGHNESS: f64 = 10.0;
    pub const DEFAULT_SKILL_TOUGHNESS: f64 = 20.0;
    pub const DEFAULT_ULTIMATE_TOUGHNESS: f64 = 30.0;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_ROUNDS: u32 = 5;
    pub const DEFAULT_INITIAL_SKILL_POINTS: u32 = 3;
    pub const DEFAULT_MAX_SKILL_POINTS: u32 = 5;
    pub const DEFAULT_INITIAL_ENERGY_RATIO: f64 = 0.5;
    pub const DEFAULT_KILL_ENERGY_REWARD: f64 = 10.0;

    pub fn new() -> Self {
        Self {
            rounds: Self::DEFAULT_ROUNDS,
            initial_skill_points: Self::DEFAULT_INITIAL_SKILL_POINTS,
            max_skill_points: Self::DEFAULT_MAX_SKILL_POINTS,
            initial_energy_ratio: Self::DEFAULT_INITIAL_ENERGY_RATIO,
            kill_energy_reward: Self::DEFAULT_KILL_ENERGY_REWARD,
        }
    }

    #[must_use]
    pub fn with_rounds(mut self, rounds: u32) -> Self {
        self.rounds = rounds;
        self
    }

    #[must_use]
    pub fn with_skill_points(mut self, initial: u32, max: u32) -> Self {
        self.max_skill_points = max;
        self.initial_skill_points = initial.min(max);
        self
    }

    #[must_use]
    pub fn with_initial_energy_ratio(mut self, ratio: f64) -> Self {
        self.initial_energy_ratio = ratio.clamp(0.0, 1.0);
        self
    }

    /// Total action value available before the battle times out.
    ///
    /// The first round lasts 150 AV and every later round 100 AV.
    pub fn action_budget(&self) -> f64 {
        f64::from(self.rounds) * Self::ROUND_ACTION_VALUE
            + (Self::FIRST_ROUND_ACTION_VALUE - Self::ROUND_ACTION_VALUE)
    }

    /// Round number (1-based) at elapsed action value `time`.
    pub fn round_at(&self, time: f64) -> u32 {
        if time <= Self::FIRST_ROUND_ACTION_VALUE {
            return 1;
        }
        let later = ((time - Self::FIRST_ROUND_ACTION_VALUE) / Self::ROUND_ACTION_VALUE).ceil();
        1 + later as u32
    }
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self::new()
    }
}
