//! # MediMix Core
//!
//! Deterministic pharmacy simulation for MediMix Dash.
//!
//! Patients queue at a pharmacy with a prescription of medications. The
//! player fills prescriptions by matching medication tiles on the board from
//! [`medimix_board`]. Consultants take orders and answer calls for help.
//! Managers rotate with the day and night shifts and unlock special abilities
//! as the pharmacy earns its reputation.
//!
//! ## Architecture
//!
//! - **Clock**: [`GameClock`], one game minute per tick
//! - **Patients**: lanes, mood ladder, wait timers, prescriptions
//! - **Registry**: the active patients, dispensing and timers
//! - **Staffing**: consultants, managers, abilities, calls for help
//! - **Economy**: dash points, currency, morale, statistics
//! - **Simulation**: owns all of the above and sequences each tick
//!
//! ## Usage
//!
//! ```
//! use medimix_core::{SimConfig, Simulation};
//!
//! let mut sim = Simulation::new(7, SimConfig::default()).unwrap();
//! sim.step();
//!
//! let snapshot = sim.snapshot();
//! assert_eq!(snapshot.tick, 1);
//! assert_eq!(snapshot.patients.len(), 3);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub use medimix_board;

pub mod clock;
pub mod config;
pub mod economy;
pub mod error;
pub mod event;
pub mod patient;
pub mod registry;
pub mod simulation;
pub mod staffing;

pub use clock::{GameClock, ShiftWindow, GAME_SECONDS_PER_TICK};
pub use config::{BoardConfig, ConfigError, PatientConfig, SimConfig};
pub use economy::{EconomyConfig, Ledger, Statistics};
pub use error::CommandError;
pub use event::{EventLog, EventRecord, SimEvent};
pub use patient::generator::LaneOdds;
pub use patient::{Lane, Mood, Patient, PatientId, PatientStatus};
pub use registry::{Credit, DispenseOutcome, PatientRegistry, TimerFreeze};
pub use simulation::{AssistView, Simulation, Snapshot};
pub use staffing::{
    AbilityKind, ActiveEffect, AssistProgress, Consultant, ConsultantId, ConsultantStatus,
    HelpTier, Manager, ManagerId, StaffingConfig, StaffingScheduler,
};

#[cfg(test)]
mod tests;
