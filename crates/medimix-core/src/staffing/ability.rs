//! Manager special abilities.
//!
//! Each manager may carry one ability. It starts locked and unlocks for the
//! rest of the session once its [`UnlockRequirement`] is met by the ledger.
//! Activating it starts an [`ActiveEffect`] that lasts a number of ticks.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::clock::GameClock;
use crate::economy::Ledger;
use crate::registry::TimerFreeze;

/// What an ability does while active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AbilityKind {
    /// Wait and mood timers stop
    TimeFreeze,
    /// Completion points are doubled
    DoubleDash,
    /// Mood timers stop; wait timers keep running
    CalmPresence,
}

impl AbilityKind {
    /// All ability kinds.
    #[must_use]
    pub const fn all() -> &'static [AbilityKind] {
        &[Self::TimeFreeze, Self::DoubleDash, Self::CalmPresence]
    }

    /// Display name, also used to activate the ability by name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::TimeFreeze => "Time Freeze",
            Self::DoubleDash => "Double Dash",
            Self::CalmPresence => "Calm Presence",
        }
    }

    /// One-line description.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::TimeFreeze => "Stops every patient timer for a short while",
            Self::DoubleDash => "Completed patients award double dash points",
            Self::CalmPresence => "Patients stop getting upset, but the clock still runs",
        }
    }

    /// Case-insensitive lookup by display name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::all()
            .iter()
            .copied()
            .find(|kind| kind.name().eq_ignore_ascii_case(name.trim()))
    }

    /// Patient timers held while this ability is active.
    #[must_use]
    pub const fn timer_freeze(self) -> TimerFreeze {
        match self {
            Self::TimeFreeze => TimerFreeze::All,
            Self::CalmPresence => TimerFreeze::MoodOnly,
            Self::DoubleDash => TimerFreeze::None,
        }
    }
}

impl fmt::Display for AbilityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Condition that unlocks an ability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnlockRequirement {
    /// At least this many patients completed
    CompletedPatients(u64),
    /// At least this many completions since the last complaint
    StreakWithoutComplaint(u32),
    /// Dash points at or above this value
    DashPoints(i64),
}

impl UnlockRequirement {
    /// Whether the ledger satisfies this requirement.
    #[must_use]
    pub fn is_met(&self, ledger: &Ledger) -> bool {
        match *self {
            Self::CompletedPatients(n) => ledger.stats.completed >= n,
            Self::StreakWithoutComplaint(n) => ledger.streak >= n,
            Self::DashPoints(n) => ledger.dash_points >= n,
        }
    }
}

impl fmt::Display for UnlockRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CompletedPatients(n) => write!(f, "complete {n} patients"),
            Self::StreakWithoutComplaint(n) => write!(f, "serve {n} patients without a complaint"),
            Self::DashPoints(n) => write!(f, "reach {n} dash points"),
        }
    }
}

/// Ability definition, as configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AbilitySpec {
    /// Effect
    pub kind: AbilityKind,
    /// Unlock condition
    pub requirement: UnlockRequirement,
    /// Effect length in ticks
    pub duration_ticks: u32,
    /// Manager stamina spent per activation
    pub stamina_cost: u8,
}

/// An ability held by a manager.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpecialAbility {
    /// Configured definition
    pub spec: AbilitySpec,
    /// Unlocked for the rest of the session
    pub unlocked: bool,
}

impl SpecialAbility {
    /// A locked ability.
    #[must_use]
    pub fn new(spec: AbilitySpec) -> Self {
        Self {
            spec,
            unlocked: false,
        }
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.spec.kind.name()
    }

    /// Description.
    #[must_use]
    pub fn description(&self) -> &'static str {
        self.spec.kind.description()
    }
}

/// A running ability effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActiveEffect {
    /// Effect
    pub kind: AbilityKind,
    /// First clock reading at which the effect is over
    pub ends_at: GameClock,
}

impl ActiveEffect {
    /// Whether the effect has run out at `clock`.
    #[must_use]
    pub fn is_expired(&self, clock: GameClock) -> bool {
        clock >= self.ends_at
    }
}
