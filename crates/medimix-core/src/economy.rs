//! Score, currency, morale and service statistics.

use serde::{Deserialize, Serialize};

use crate::patient::Mood;

/// Tunable amounts for every economy effect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomyConfig {
    /// Dash points at the start of a session
    pub starting_points: i64,
    /// Morale at the start of a session
    pub starting_morale: u8,
    /// Points for a completed patient
    pub completion_points: i64,
    /// Currency for a completed patient
    pub completion_currency: u64,
    /// Morale gained per completion
    pub completion_morale: u8,
    /// Points lost per failed patient
    pub failure_points: i64,
    /// Morale lost per failed patient
    pub failure_morale: u8,
    /// Percent of current points lost when a complaint is lodged
    pub complaint_penalty_percent: i64,
    /// Percent of current points lost when a patient leaves
    pub left_penalty_percent: i64,
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            starting_points: 100,
            starting_morale: 50,
            completion_points: 50,
            completion_currency: 10,
            completion_morale: 5,
            failure_points: 30,
            failure_morale: 10,
            complaint_penalty_percent: 3,
            left_penalty_percent: 10,
        }
    }
}

/// Service statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Statistics {
    /// Patients scored (completed + failed)
    pub total_patients: u64,
    /// Patients served
    pub completed: u64,
    /// Patients lost
    pub failed: u64,
    /// Sum of served wait times, in ticks
    pub total_served_wait: u64,
    /// Patients ever admitted
    pub total_queued: u64,
}

impl Statistics {
    /// Mean wait of completed patients in ticks; zero before the first
    /// completion. Failed patients are not included.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn average_served_wait(&self) -> f64 {
        if self.completed == 0 {
            0.0
        } else {
            self.total_served_wait as f64 / self.completed as f64
        }
    }
}

/// The running totals of a session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ledger {
    /// Score; the session ends at zero or below
    pub dash_points: i64,
    /// Soft currency
    pub currency: u64,
    /// Staff morale, 0-100
    pub morale: u8,
    /// Compliments received
    pub compliments: u64,
    /// Complaints received
    pub complaints: u64,
    /// Completions since the last complaint
    pub streak: u32,
    /// Service statistics
    pub stats: Statistics,
}

impl Ledger {
    /// Opening balances.
    #[must_use]
    pub fn new(config: &EconomyConfig) -> Self {
        Self {
            dash_points: config.starting_points,
            currency: 0,
            morale: config.starting_morale.min(100),
            compliments: 0,
            complaints: 0,
            streak: 0,
            stats: Statistics::default(),
        }
    }

    /// Score a completed patient. Returns the points awarded.
    pub fn record_completion(&mut self, config: &EconomyConfig, served_wait: u32, doubled: bool) -> i64 {
        let points = if doubled {
            config.completion_points * 2
        } else {
            config.completion_points
        };
        self.dash_points += points;
        self.currency += config.completion_currency;
        self.morale = self.morale.saturating_add(config.completion_morale).min(100);
        self.compliments += 1;
        self.streak += 1;
        self.stats.total_patients += 1;
        self.stats.completed += 1;
        self.stats.total_served_wait += u64::from(served_wait);
        points
    }

    /// Score a failed patient. Returns the points lost.
    pub fn record_failure(&mut self, config: &EconomyConfig) -> i64 {
        self.dash_points -= config.failure_points;
        self.morale = self.morale.saturating_sub(config.failure_morale);
        self.register_complaint();
        self.stats.total_patients += 1;
        self.stats.failed += 1;
        config.failure_points
    }

    /// Score a mood change. Only entering a terminal mood costs anything.
    /// Returns the points lost.
    pub fn record_mood_change(&mut self, config: &EconomyConfig, to: Mood) -> i64 {
        let penalty = match to {
            Mood::ComplaintLodged => {
                self.register_complaint();
                percent_of(self.dash_points, config.complaint_penalty_percent)
            }
            Mood::Left => percent_of(self.dash_points, config.left_penalty_percent),
            _ => 0,
        };
        self.dash_points -= penalty;
        penalty
    }

    /// The session is lost.
    #[must_use]
    pub fn is_bankrupt(&self) -> bool {
        self.dash_points <= 0
    }

    fn register_complaint(&mut self) {
        self.complaints += 1;
        self.streak = 0;
    }
}

/// `floor(points × percent / 100)`, zero for a non-positive balance.
fn percent_of(points: i64, percent: i64) -> i64 {
    if points <= 0 {
        0
    } else {
        points * percent / 100
    }
}
