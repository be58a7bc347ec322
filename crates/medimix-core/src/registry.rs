//! Patient registry.
//!
//! Owns the active patients in arrival order. Arrival order matters: a
//! dispensed medication goes to the *first* patient in the list that still
//! needs it, regardless of the render order produced by
//! [`PatientRegistry::queue_order`].

use medimix_board::{DispenseRecord, Medication};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::clock::GameClock;
use crate::error::CommandError;
use crate::patient::generator::LaneOdds;
use crate::patient::{MoodTransition, Patient, PatientGenerator, PatientId, PatientStatus};

/// Which patient timers are held this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TimerFreeze {
    /// Everything runs
    #[default]
    None,
    /// Mood timers held, wait timers run
    MoodOnly,
    /// Wait and mood timers held
    All,
}

/// One credit made by [`PatientRegistry::apply_dispense`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credit {
    /// Receiving patient
    pub patient: PatientId,
    /// Medication credited
    pub medication: Medication,
    /// Units stored on the patient
    pub units: u32,
}

/// What happened to one dispensed record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispenseOutcome {
    /// Credits in medication order
    pub credits: Vec<Credit>,
    /// Units nobody needed
    pub wasted: DispenseRecord,
    /// Patients completed by this record
    pub completed: Vec<PatientId>,
}

/// Changes produced by one timer step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimerReport {
    /// Mood changes, in list order
    pub mood_changes: Vec<(PatientId, MoodTransition)>,
    /// Patients failed by running out of wait time
    pub timed_out: Vec<PatientId>,
}

/// The set of patients currently in the pharmacy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientRegistry {
    patients: Vec<Patient>,
    generator: PatientGenerator,
    target_active: usize,
    lane_odds: LaneOdds,
    total_queued: u64,
}

impl PatientRegistry {
    /// An empty registry that refills to `target_active` patients.
    #[must_use]
    pub fn new(target_active: usize, lane_odds: LaneOdds) -> Self {
        Self {
            patients: Vec::new(),
            generator: PatientGenerator::new(),
            target_active,
            lane_odds,
            total_queued: 0,
        }
    }

    /// Odds used for new arrivals.
    #[must_use]
    pub fn lane_odds(&self) -> &LaneOdds {
        &self.lane_odds
    }

    /// All patients in arrival order.
    #[must_use]
    pub fn patients(&self) -> &[Patient] {
        &self.patients
    }

    /// Look up a patient.
    #[must_use]
    pub fn get(&self, id: PatientId) -> Option<&Patient> {
        self.patients.iter().find(|p| p.id == id)
    }

    /// Look up a patient mutably.
    pub fn get_mut(&mut self, id: PatientId) -> Option<&mut Patient> {
        self.patients.iter_mut().find(|p| p.id == id)
    }

    /// Mutable iteration in arrival order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Patient> {
        self.patients.iter_mut()
    }

    /// Number of non-terminal patients.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.patients.iter().filter(|p| !p.is_terminal()).count()
    }

    /// Patients ever admitted.
    #[must_use]
    pub fn total_queued(&self) -> u64 {
        self.total_queued
    }

    /// Admit a patient built by the caller. Its id and ticket are replaced
    /// with fresh ones so both stay unique.
    pub fn admit(&mut self, mut patient: Patient) -> PatientId {
        let (id, ticket) = self.generator.issue();
        patient.id = id;
        patient.ticket = ticket;
        self.patients.push(patient);
        self.total_queued += 1;
        id
    }

    /// Generate patients until the active count reaches the target.
    pub fn replenish<R: Rng + ?Sized>(&mut self, clock: GameClock, rng: &mut R) -> Vec<PatientId> {
        let mut admitted = Vec::new();
        while self.active_count() < self.target_active {
            let patient = self.generator.generate(clock, &self.lane_odds, rng);
            admitted.push(patient.id);
            self.patients.push(patient);
            self.total_queued += 1;
        }
        admitted
    }

    /// Toggle the pinned flag. Returns the new value.
    ///
    /// # Errors
    ///
    /// [`CommandError::UnknownPatient`] if no such patient is present.
    pub fn pin(&mut self, id: PatientId) -> Result<bool, CommandError> {
        let patient = self.get_mut(id).ok_or(CommandError::UnknownPatient(id))?;
        patient.pinned = !patient.pinned;
        Ok(patient.pinned)
    }

    /// Render order: pinned first, then lane urgency, then ticket.
    #[must_use]
    pub fn queue_order(&self) -> Vec<&Patient> {
        let mut ordered: Vec<&Patient> = self.patients.iter().collect();
        ordered.sort_by_key(|p| (!p.pinned, p.lane.urgency_rank(), p.ticket));
        ordered
    }

    /// Hand out a dispensed record.
    ///
    /// Medications are taken in alphabet order. Each goes whole to the first
    /// active patient still short of it; what that patient cannot take is
    /// wasted, never passed on.
    pub fn apply_dispense(&mut self, record: &DispenseRecord) -> DispenseOutcome {
        let mut outcome = DispenseOutcome::default();

        for (med, amount) in record.iter() {
            let Some(patient) = self
                .patients
                .iter_mut()
                .find(|p| !p.is_terminal() && p.outstanding(med) > 0)
            else {
                outcome.wasted.add(med, amount);
                continue;
            };

            let overflow = patient.receive(med, amount);
            outcome.credits.push(Credit {
                patient: patient.id,
                medication: med,
                units: amount - overflow,
            });
            outcome.wasted.add(med, overflow);
            if patient.status == PatientStatus::Completed {
                outcome.completed.push(patient.id);
            }
        }

        outcome
    }

    /// Run one tick of wait and mood timers. Mood steps before the wait check.
    pub fn tick_timers<R: Rng + ?Sized>(&mut self, freeze: TimerFreeze, rng: &mut R) -> TimerReport {
        let mut report = TimerReport::default();
        if freeze == TimerFreeze::All {
            return report;
        }

        for patient in &mut self.patients {
            if freeze != TimerFreeze::MoodOnly {
                if let Some(change) = patient.advance_mood(rng) {
                    report.mood_changes.push((patient.id, change));
                }
            }
            if patient.tick_wait() {
                report.timed_out.push(patient.id);
            }
        }

        report
    }

    /// Remove settled terminal patients and return them.
    pub fn reap_settled(&mut self) -> Vec<Patient> {
        let (reaped, kept): (Vec<Patient>, Vec<Patient>) = std::mem::take(&mut self.patients)
            .into_iter()
            .partition(|p| p.settled && p.is_terminal());
        self.patients = kept;
        reaped
    }
}
