//! Scenario and determinism tests for the whole simulation.
//!
//! - `scenarios.rs`: staged end-to-end scenarios through `Simulation`
//! - `determinism.rs`: same seed and intents, same state
//! - `helpers.rs`: staging utilities

mod determinism;
mod helpers;
mod scenarios;

pub use helpers::*;
