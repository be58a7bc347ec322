//! Helpers for staging simulations in a known state.

use std::collections::BTreeMap;

use medimix_board::{Board, BoardEngine, Medication};

use crate::clock::ShiftWindow;
use crate::config::SimConfig;
use crate::patient::generator::LaneOdds;
use crate::patient::{Lane, Patient, PatientId};
use crate::registry::PatientRegistry;
use crate::simulation::Simulation;
use crate::staffing::ConsultantSpec;

// =============================================================================
// Configuration
// =============================================================================

/// Default config with enough starting points that no scenario goes bankrupt.
pub fn roomy_config() -> SimConfig {
    let mut config = SimConfig::default();
    config.economy.starting_points = 1_000_000;
    config
}

/// A roster of `n` consultants all on shift 07:00-17:00.
pub fn day_roster(n: usize) -> Vec<ConsultantSpec> {
    (0..n)
        .map(|i| ConsultantSpec {
            name: format!("Consultant {i}"),
            shift: ShiftWindow::new(7, 17),
            standby: false,
        })
        .collect()
}

// =============================================================================
// Staging
// =============================================================================

/// A simulation with an empty patient registry.
pub fn staged_sim(seed: u64, config: SimConfig) -> Simulation {
    let target = config.patients.active_target;
    let mut sim = Simulation::new(seed, config).unwrap();
    *sim.registry_mut() = PatientRegistry::new(target, LaneOdds::default());
    sim
}

/// Admit a patient with the given lane and prescription.
pub fn admit(sim: &mut Simulation, lane: Lane, prescription: &[(Medication, u32)]) -> PatientId {
    let rx: BTreeMap<Medication, u32> = prescription.iter().copied().collect();
    sim.registry_mut()
        .admit(Patient::new(PatientId::new(0), 0, "Staged Patient", 40, lane, rx))
}

/// An 8×8 board without any run.
///
/// Cell `(r, c)` holds medication `(3r + c) mod 7`, so horizontal and
/// vertical neighbours always differ.
pub fn quiet_board() -> Vec<Medication> {
    let all = Medication::all();
    (0..8)
        .flat_map(|r| (0..8).map(move |c| all[(r * 3 + c) % all.len()]))
        .collect()
}

/// A quiet 8×8 board where swapping cells 2 and 3 completes a run of three
/// Tablix across row 0 and nothing else.
pub fn tablix_trap_board() -> Board {
    let mut meds = quiet_board();
    meds[0] = Medication::Tablix;
    meds[1] = Medication::Tablix;
    meds[2] = Medication::Syrupix;
    meds[3] = Medication::Tablix;
    Board::from_medications(8, &meds).unwrap()
}

/// Replace the simulation board.
pub fn stage_board(sim: &mut Simulation, board: Board) {
    *sim.engine_mut() = BoardEngine::new(board);
}

/// Run `n` simulation ticks.
pub fn run_ticks(sim: &mut Simulation, n: u64) {
    for _ in 0..n {
        sim.step();
    }
}
