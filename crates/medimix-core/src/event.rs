//! Simulation event log.
//!
//! Everything that changes the game in a way a UI would want to show is
//! recorded here as a [`SimEvent`] stamped with the game clock. The log only
//! records; nothing in the simulation reads it back. Drain it with
//! [`EventLog::take_events`] after each tick to drive sounds, toasts or
//! telemetry.

use medimix_board::DispenseRecord;
use serde::{Deserialize, Serialize};

use crate::clock::GameClock;
use crate::patient::{Lane, Mood, PatientId};
use crate::registry::Credit;
use crate::staffing::{AbilityKind, ConsultantId, HelpTier, ManagerId};

/// Something that happened during a tick or intent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SimEvent {
    /// A patient joined the queue.
    PatientArrived {
        /// New patient
        patient: PatientId,
        /// Lane
        lane: Lane,
        /// Ticket number
        ticket: u64,
    },
    /// A completed patient was scored.
    PatientCompleted {
        /// Patient
        patient: PatientId,
        /// Points awarded
        points: i64,
        /// Ticks waited
        served_wait: u32,
    },
    /// A failed patient was scored.
    PatientFailed {
        /// Patient
        patient: PatientId,
        /// Points lost
        points_lost: i64,
    },
    /// A mood change was scored.
    MoodChanged {
        /// Patient
        patient: PatientId,
        /// Previous mood
        from: Mood,
        /// New mood
        to: Mood,
        /// Points lost (terminal moods only)
        points_lost: i64,
    },
    /// Medications reached patients.
    Dispensed {
        /// Credits in medication order
        credits: Vec<Credit>,
        /// Units nobody needed
        wasted: DispenseRecord,
    },
    /// The board settled after a swap.
    BoardSettled {
        /// Match removals
        cascades: u32,
        /// Gravity passes
        settle_passes: u32,
        /// Units cleared by cascades
        cleared: u32,
    },
    /// A consultant took an order.
    ConsultantAssigned {
        /// Consultant
        consultant: ConsultantId,
        /// Patient
        patient: PatientId,
    },
    /// A consultant closed an order.
    ConsultantReleased {
        /// Consultant
        consultant: ConsultantId,
        /// Patient whose order closed
        patient: PatientId,
    },
    /// Shift gating opened or closed consultants.
    ShiftChanged {
        /// Now available
        opened: Vec<ConsultantId>,
        /// Now closed
        closed: Vec<ConsultantId>,
    },
    /// A new manager is on duty.
    ManagerOnDuty {
        /// Manager
        manager: ManagerId,
    },
    /// A call for help started.
    HelpStarted {
        /// Consultants helping
        helpers: Vec<ConsultantId>,
        /// Tier
        tier: HelpTier,
    },
    /// Helpers rearranged two tiles.
    AssistRearranged {
        /// First cell
        from: usize,
        /// Second cell
        to: usize,
        /// Units the rearrangement cleared, cascades included
        cleared: u32,
    },
    /// A call for help ended.
    HelpEnded {
        /// Consultants released
        helpers: Vec<ConsultantId>,
        /// Tier
        tier: HelpTier,
        /// Ended by the timer rather than by request
        expired: bool,
    },
    /// An ability unlocked.
    AbilityUnlocked {
        /// Owner
        manager: ManagerId,
        /// Ability
        ability: AbilityKind,
    },
    /// An ability effect started.
    AbilityActivated {
        /// Ability
        ability: AbilityKind,
        /// When it ends
        ends_at: GameClock,
    },
    /// An ability effect ran out.
    AbilityExpired {
        /// Ability
        ability: AbilityKind,
    },
    /// Dash points reached zero.
    GameOver {
        /// Final score
        dash_points: i64,
    },
}

/// A [`SimEvent`] with the clock reading at which it happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Game clock
    pub clock: GameClock,
    /// What happened
    pub event: SimEvent,
}

/// Append-only event buffer, drained by the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventLog {
    events: Vec<EventRecord>,
}

impl EventLog {
    /// An empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an event.
    pub fn push(&mut self, clock: GameClock, event: SimEvent) {
        self.events.push(EventRecord { clock, event });
    }

    /// Drain every recorded event, oldest first.
    pub fn take_events(&mut self) -> Vec<EventRecord> {
        std::mem::take(&mut self.events)
    }

    /// Recorded events, oldest first.
    #[must_use]
    pub fn events(&self) -> &[EventRecord] {
        &self.events
    }

    /// Number of recorded events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// True when nothing is recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
