//! Patients: identity, lane, prescription and timers.
//!
//! - [`PatientId`]: unique identifier, monotonic per registry
//! - [`Lane`]: service lane; fixes the maximum wait and mood durations
//! - [`PatientStatus`]: `waiting → dispensing → completed`, or `failed`
//! - [`Patient`]: the full record, including the mood state machine
//!
//! Two independent counters run down each tick. The *wait* counter fails a
//! patient that is still `waiting` when it reaches zero. The *mood* timer
//! only runs while `waiting` and escalates the patient's mood (see [`mood`]).

pub mod generator;
pub mod mood;

use std::collections::BTreeMap;
use std::fmt;

use medimix_board::Medication;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::staffing::ConsultantId;

pub use generator::PatientGenerator;
pub use mood::{Mood, MoodDurations, MoodTransition};

/// Unique identifier for a patient.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PatientId(u64);

impl PatientId {
    /// Creates a new `PatientId` from a raw value.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw value.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for PatientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PatientId({})", self.0)
    }
}

impl fmt::Display for PatientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for PatientId {
    fn from(id: u64) -> Self {
        Self::new(id)
    }
}

/// Service lane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Lane {
    /// Walk-in, longest patience
    Normal,
    /// Quick pickups
    Express,
    /// Elderly and flagged cases
    Priority,
    /// Urgent cases, shortest patience
    Emergency,
}

impl Lane {
    /// Total number of lanes.
    pub const COUNT: usize = 4;

    /// All lanes.
    #[must_use]
    pub const fn all() -> &'static [Lane] {
        &[Lane::Normal, Lane::Express, Lane::Priority, Lane::Emergency]
    }

    /// Ticks before a waiting patient in this lane fails.
    #[must_use]
    pub const fn max_wait(self) -> u32 {
        match self {
            Self::Emergency => 20,
            Self::Priority => 30,
            Self::Express => 60,
            Self::Normal => 120,
        }
    }

    /// Ticks spent in each mood stage.
    #[must_use]
    pub const fn mood_durations(self) -> MoodDurations {
        let (calm, impatient, frustrated, angry, complaining) = match self {
            Self::Emergency => (10, 10, 6, 4, 2),
            Self::Express => (30, 30, 20, 10, 4),
            Self::Normal => (60, 60, 40, 20, 6),
            Self::Priority => (16, 14, 10, 6, 2),
        };
        MoodDurations {
            calm,
            impatient,
            frustrated,
            angry,
            complaining,
        }
    }

    /// Queue rank; lower is served first.
    #[must_use]
    pub const fn urgency_rank(self) -> u8 {
        match self {
            Self::Emergency => 0,
            Self::Priority => 1,
            Self::Express => 2,
            Self::Normal => 3,
        }
    }
}

impl fmt::Display for Lane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Normal => write!(f, "Normal"),
            Self::Express => write!(f, "Express"),
            Self::Priority => write!(f, "Priority"),
            Self::Emergency => write!(f, "Emergency"),
        }
    }
}

/// Where a patient is in the service flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatientStatus {
    /// In the queue
    Waiting,
    /// A consultant is fetching the order
    Dispensing,
    /// Every prescription entry met (terminal)
    Completed,
    /// Ran out of time or complained (terminal)
    Failed,
}

impl PatientStatus {
    /// `completed` or `failed`.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

/// A patient in the pharmacy.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Patient {
    /// Unique id
    pub id: PatientId,
    /// Queue ticket, monotonic per registry
    pub ticket: u64,
    /// Display name
    pub name: String,
    /// Age in years
    pub age: u8,
    /// Service lane
    pub lane: Lane,
    /// Required units per medication
    pub prescription: BTreeMap<Medication, u32>,
    /// Units received so far, never above the requirement
    pub dispensed: BTreeMap<Medication, u32>,
    /// Service status
    pub status: PatientStatus,
    /// Current mood
    pub mood: Mood,
    /// Mood last seen by the economy
    pub previous_mood: Mood,
    /// Ticks left in the current mood
    pub mood_timer: u32,
    /// Ticks left before a waiting patient fails
    pub wait_remaining: u32,
    /// Lane maximum wait
    pub max_wait: u32,
    /// Pinned to the top of the queue
    pub pinned: bool,
    /// Consultant fetching this order, if any
    pub assigned_consultant: Option<ConsultantId>,
    /// Terminal outcome already scored
    pub settled: bool,
}

impl Patient {
    /// A fresh `waiting`, `calm` patient with full timers.
    #[must_use]
    pub fn new(
        id: PatientId,
        ticket: u64,
        name: impl Into<String>,
        age: u8,
        lane: Lane,
        prescription: BTreeMap<Medication, u32>,
    ) -> Self {
        Self {
            id,
            ticket,
            name: name.into(),
            age,
            lane,
            prescription,
            dispensed: BTreeMap::new(),
            status: PatientStatus::Waiting,
            mood: Mood::Calm,
            previous_mood: Mood::Calm,
            mood_timer: lane.mood_durations().calm,
            wait_remaining: lane.max_wait(),
            max_wait: lane.max_wait(),
            pinned: false,
            assigned_consultant: None,
            settled: false,
        }
    }

    /// `completed` or `failed`.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Units of `med` still owed; zero if not prescribed.
    #[must_use]
    pub fn outstanding(&self, med: Medication) -> u32 {
        let required = self.prescription.get(&med).copied().unwrap_or(0);
        required.saturating_sub(self.dispensed_of(med))
    }

    /// Units of `med` received so far.
    #[must_use]
    pub fn dispensed_of(&self, med: Medication) -> u32 {
        self.dispensed.get(&med).copied().unwrap_or(0)
    }

    /// Every prescription entry is met.
    #[must_use]
    pub fn is_fulfilled(&self) -> bool {
        self.prescription
            .iter()
            .all(|(med, required)| self.dispensed_of(*med) >= *required)
    }

    /// Ticks spent waiting so far.
    #[must_use]
    pub fn served_wait(&self) -> u32 {
        self.max_wait.saturating_sub(self.wait_remaining)
    }

    /// Credit up to `amount` units of `med`. Returns the overflow.
    ///
    /// The patient completes as soon as every entry is met. Terminal patients
    /// take nothing.
    pub fn receive(&mut self, med: Medication, amount: u32) -> u32 {
        if self.is_terminal() {
            return amount;
        }
        let credited = amount.min(self.outstanding(med));
        if credited > 0 {
            *self.dispensed.entry(med).or_insert(0) += credited;
        }
        if self.is_fulfilled() {
            self.status = PatientStatus::Completed;
        }
        amount - credited
    }

    /// One mood step. Only `waiting` patients in a non-terminal mood move.
    ///
    /// Entering a terminal mood fails the patient.
    pub fn advance_mood<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<MoodTransition> {
        if self.status != PatientStatus::Waiting || self.mood.is_terminal() {
            return None;
        }
        self.mood_timer = self.mood_timer.saturating_sub(1);
        if self.mood_timer > 0 {
            return None;
        }

        let from = self.mood;
        let to = from
            .next_timed()
            .unwrap_or_else(|| Mood::resolve_complaint(rng));
        self.previous_mood = from;
        self.mood = to;
        self.mood_timer = self.lane.mood_durations().for_mood(to);
        if to.is_terminal() {
            self.status = PatientStatus::Failed;
        }
        Some(MoodTransition { from, to })
    }

    /// One wait step. Returns true if this step failed the patient.
    ///
    /// Every non-terminal patient counts down and fails at zero, whether
    /// still waiting or already being dispensed to.
    pub fn tick_wait(&mut self) -> bool {
        if self.is_terminal() {
            return false;
        }
        self.wait_remaining = self.wait_remaining.saturating_sub(1);
        if self.wait_remaining == 0 {
            self.status = PatientStatus::Failed;
            return true;
        }
        false
    }

    /// A mood change the economy has not scored yet.
    #[must_use]
    pub fn unscored_mood_change(&self) -> Option<MoodTransition> {
        (self.mood != self.previous_mood).then_some(MoodTransition {
            from: self.previous_mood,
            to: self.mood,
        })
    }

    /// Mark the current mood as scored.
    pub fn acknowledge_mood(&mut self) {
        self.previous_mood = self.mood;
    }
}
