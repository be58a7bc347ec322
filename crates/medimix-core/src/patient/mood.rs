//! Five-stage mood state machine.
//!
//! A waiting patient walks `calm → impatient → frustrated → angry →
//! complaining` on a per-stage timer whose length depends on the lane. Leaving
//! `complaining` ends in one of two terminal moods: `complaint_lodged`, or
//! `left` on a small random roll. Terminal moods never change again.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Probability that a complaining patient walks out instead of lodging a complaint.
pub const LEAVE_CHANCE: f64 = 0.03;

/// Patient mood, in order of escalation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mood {
    /// Just arrived
    Calm,
    /// Starting to look at the clock
    Impatient,
    /// Visibly unhappy
    Frustrated,
    /// About to make a scene
    Angry,
    /// Asking for the manager
    Complaining,
    /// Formal complaint filed (terminal)
    ComplaintLodged,
    /// Walked out (terminal)
    Left,
}

impl Mood {
    /// Whether this mood never changes again.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::ComplaintLodged | Self::Left)
    }

    /// Next stage on the timed path, or `None` from `complaining` and the
    /// terminal moods. The `complaining` exit is random; see [`Mood::resolve_complaint`].
    #[must_use]
    pub const fn next_timed(self) -> Option<Self> {
        match self {
            Self::Calm => Some(Self::Impatient),
            Self::Impatient => Some(Self::Frustrated),
            Self::Frustrated => Some(Self::Angry),
            Self::Angry => Some(Self::Complaining),
            Self::Complaining | Self::ComplaintLodged | Self::Left => None,
        }
    }

    /// Roll the exit from `complaining`.
    pub fn resolve_complaint<R: Rng + ?Sized>(rng: &mut R) -> Self {
        if rng.gen_bool(LEAVE_CHANCE) {
            Self::Left
        } else {
            Self::ComplaintLodged
        }
    }

    /// Lowercase label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Calm => "calm",
            Self::Impatient => "impatient",
            Self::Frustrated => "frustrated",
            Self::Angry => "angry",
            Self::Complaining => "complaining",
            Self::ComplaintLodged => "complaint lodged",
            Self::Left => "left",
        }
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Ticks spent in each non-terminal mood.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MoodDurations {
    /// Ticks in `calm`
    pub calm: u32,
    /// Ticks in `impatient`
    pub impatient: u32,
    /// Ticks in `frustrated`
    pub frustrated: u32,
    /// Ticks in `angry`
    pub angry: u32,
    /// Ticks in `complaining`
    pub complaining: u32,
}

impl MoodDurations {
    /// Duration of `mood`; zero for terminal moods.
    #[must_use]
    pub const fn for_mood(&self, mood: Mood) -> u32 {
        match mood {
            Mood::Calm => self.calm,
            Mood::Impatient => self.impatient,
            Mood::Frustrated => self.frustrated,
            Mood::Angry => self.angry,
            Mood::Complaining => self.complaining,
            Mood::ComplaintLodged | Mood::Left => 0,
        }
    }

    /// Ticks from `calm` until the terminal roll.
    #[must_use]
    pub const fn total(&self) -> u32 {
        self.calm + self.impatient + self.frustrated + self.angry + self.complaining
    }
}

/// A mood change that the economy has not yet scored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoodTransition {
    /// Mood before the change
    pub from: Mood,
    /// Mood after the change
    pub to: Mood,
}
