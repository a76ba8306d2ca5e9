//! Common error infrastructure for rogue-core.
//!
//! Errors fall into three families that map onto how the driver reacts:
//!
//! - **Configuration errors** disable an ability permanently at construction and
//!   are kept as diagnostics; the run continues.
//! - **Transient unavailability** is never an error at the `ready()` seam. It
//!   only surfaces as [`ErrorSeverity::Recoverable`] when `execute` is called
//!   on an ability that is not ready.
//! - **Invariant violations** mean the resolution logic is defective and abort
//!   the run with full context.

use crate::action::{AbilityKind, EquipmentRequirement};
use crate::state::{ActorId, BuffKind, Tick};

/// Severity level of an error, used for categorization and recovery strategies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Temporary condition; the driver should pick another action.
    Recoverable,

    /// Invalid request that will never succeed without a configuration change.
    Validation,

    /// Simulation state is inconsistent and the run cannot continue.
    Fatal,
}

impl ErrorSeverity {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Fatal => "fatal",
        }
    }

    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }

    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::Fatal)
    }
}

/// Contextual information attached to errors for debugging and diagnostics.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ErrorContext {
    /// Actor whose pipeline raised the error.
    pub actor: Option<ActorId>,

    /// Ability being resolved when the error was raised.
    pub ability: Option<AbilityKind>,

    /// Simulated time at which the error was raised.
    pub at: Tick,

    /// Optional static message providing additional context.
    pub message: Option<&'static str>,
}

impl ErrorContext {
    #[must_use]
    pub const fn new(at: Tick) -> Self {
        Self {
            actor: None,
            ability: None,
            at,
            message: None,
        }
    }

    #[must_use]
    pub const fn with_actor(mut self, actor: ActorId) -> Self {
        self.actor = Some(actor);
        self
    }

    #[must_use]
    pub const fn with_ability(mut self, ability: AbilityKind) -> Self {
        self.ability = Some(ability);
        self
    }

    #[must_use]
    pub const fn with_message(mut self, message: &'static str) -> Self {
        self.message = Some(message);
        self
    }
}

/// Common trait for all rogue-core errors.
pub trait SimError: core::fmt::Display + core::fmt::Debug {
    fn severity(&self) -> ErrorSeverity;

    fn context(&self) -> Option<&ErrorContext> {
        None
    }

    /// Stable identifier for the error variant, used in logs and tests.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}

/// An ability whose static prerequisites can never be met by this actor.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ConfigurationError {
    #[error("{ability} disabled: requires {requirement}")]
    MissingEquipment {
        ability: AbilityKind,
        requirement: EquipmentRequirement,
    },

    #[error("{ability} disabled: no spell data")]
    MissingSpellData { ability: AbilityKind },

    #[error("{buff} has no aura data")]
    MissingAuraData { buff: BuffKind },
}

impl SimError for ConfigurationError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::MissingEquipment { .. } => "CONFIG_MISSING_EQUIPMENT",
            Self::MissingSpellData { .. } => "CONFIG_MISSING_SPELL_DATA",
            Self::MissingAuraData { .. } => "CONFIG_MISSING_AURA_DATA",
        }
    }
}

/// A broken internal invariant. Always fatal.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum InvariantViolation {
    #[error("energy dropped below zero ({current})")]
    NegativeEnergy { current: f64 },

    #[error("{buff} has {stack} stacks, max is {max}")]
    StackOverflow { buff: BuffKind, stack: u16, max: u16 },

    #[error("combo points at {count}, max is {max}")]
    ComboPointsOverflow { count: u8, max: u8 },

    #[error("expiry chain starting at {buff} exceeds the allowed depth")]
    ExpiryCycle { buff: BuffKind },
}

impl SimError for InvariantViolation {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Fatal
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::NegativeEnergy { .. } => "INVARIANT_NEGATIVE_ENERGY",
            Self::StackOverflow { .. } => "INVARIANT_STACK_OVERFLOW",
            Self::ComboPointsOverflow { .. } => "INVARIANT_COMBO_OVERFLOW",
            Self::ExpiryCycle { .. } => "INVARIANT_EXPIRY_CYCLE",
        }
    }
}
