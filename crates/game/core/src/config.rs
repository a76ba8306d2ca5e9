use crate::state::Tick;

/// Combat configuration constants and tunable parameters.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RogueConfig {
    /// Fraction of the consumed energy returned when an attack fails to connect.
    pub energy_refund_fraction: f64,

    /// Combo points re-added after a full spend while the overflow buff is up.
    pub overflow_regrant: u8,

    /// Internal cooldown guarding Seal Fate against same-instant double procs.
    pub seal_fate_icd: Tick,

    /// Internal cooldown between Honor Among Thieves procs.
    pub honor_among_thieves_icd: Tick,

    /// Interval of the virtual party crit source for Honor Among Thieves.
    /// Zero disables the virtual source.
    pub virtual_hat_interval: Tick,

    /// Duration of the global cooldown triggered by special attacks.
    pub global_cooldown: Tick,

    /// Energy an actor wants before it is considered available to act.
    pub available_energy_threshold: f64,

    /// Smallest delay reported by `available()`.
    pub min_available_delay: Tick,

    /// Armor mitigation constant against the simulated target level.
    pub armor_constant: f64,

    /// Health fraction below which execute-range abilities are usable.
    pub execute_health_fraction: f64,

    /// Hit-chance penalty applied to dual-wield auto attacks.
    pub dual_wield_hit_penalty: f64,
}

impl RogueConfig {
    // ===== compile-time constants =====
    pub const MAX_COMBO_POINTS: u8 = 5;
    pub const MAX_TIERS: usize = 4;
    pub const MAX_RULES_PER_CHECKPOINT: usize = 8;
    pub const MAX_EXPIRY_CHAIN: usize = 8;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_ENERGY_REFUND_FRACTION: f64 = 0.80;
    pub const DEFAULT_SEAL_FATE_ICD: Tick = Tick::from_millis(1);
    pub const DEFAULT_HAT_ICD: Tick = Tick::from_secs(2);
    pub const DEFAULT_VIRTUAL_HAT_INTERVAL: Tick = Tick::from_millis(2200);
    pub const DEFAULT_GLOBAL_COOLDOWN: Tick = Tick::from_secs(1);
    pub const DEFAULT_AVAILABLE_ENERGY: f64 = 25.0;
    pub const DEFAULT_MIN_AVAILABLE_DELAY: Tick = Tick::from_millis(100);
    pub const DEFAULT_ARMOR_CONSTANT: f64 = 46_257.5;
    pub const DEFAULT_EXECUTE_HEALTH_FRACTION: f64 = 0.35;
    pub const DEFAULT_DUAL_WIELD_HIT_PENALTY: f64 = 0.19;

    pub fn new() -> Self {
        Self {
            energy_refund_fraction: Self::DEFAULT_ENERGY_REFUND_FRACTION,
            overflow_regrant: Self::MAX_COMBO_POINTS,
            seal_fate_icd: Self::DEFAULT_SEAL_FATE_ICD,
            honor_among_thieves_icd: Self::DEFAULT_HAT_ICD,
            virtual_hat_interval: Self::DEFAULT_VIRTUAL_HAT_INTERVAL,
            global_cooldown: Self::DEFAULT_GLOBAL_COOLDOWN,
            available_energy_threshold: Self::DEFAULT_AVAILABLE_ENERGY,
            min_available_delay: Self::DEFAULT_MIN_AVAILABLE_DELAY,
            armor_constant: Self::DEFAULT_ARMOR_CONSTANT,
            execute_health_fraction: Self::DEFAULT_EXECUTE_HEALTH_FRACTION,
            dual_wield_hit_penalty: Self::DEFAULT_DUAL_WIELD_HIT_PENALTY,
        }
    }

    #[must_use]
    pub fn with_virtual_hat_interval(mut self, interval: Tick) -> Self {
        self.virtual_hat_interval = interval;
        self
    }
}

impl Default for RogueConfig {
    fn default() -> Self {
        Self::new()
    }
}
