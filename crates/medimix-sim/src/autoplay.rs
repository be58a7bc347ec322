//! A simple player that drives every intent of a session.

use std::time::Duration;

use medimix_board::{find_exhaustive_moves, SwapOutcome};
use medimix_core::{
    CommandError, ConsultantStatus, Lane, PatientStatus, SimEvent, Simulation,
};
use serde::Serialize;
use tracing::{debug, trace};

/// Autoplay tuning.
#[derive(Debug, Clone, Copy)]
pub struct AutoplayOptions {
    /// Real time fed to a running call for help per tick
    pub assist_step: Duration,
    /// Ticks between calls for help
    pub help_every: u64,
}

impl Default for AutoplayOptions {
    fn default() -> Self {
        Self {
            assist_step: Duration::from_secs(2),
            help_every: 45,
        }
    }
}

/// Event counts gathered during a run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunTally {
    /// Committed player swaps
    pub swaps: u64,
    /// Consultants assigned
    pub assignments: u64,
    /// Calls for help started
    pub calls_for_help: u64,
    /// Helper rearrangements
    pub rearrangements: u64,
    /// Abilities activated
    pub abilities: u64,
    /// Mood changes scored
    pub mood_changes: u64,
    /// Units nobody needed
    pub wasted_units: u64,
}

/// Greedy autoplayer.
#[derive(Debug, Default)]
pub struct AutoPlayer {
    options: AutoplayOptions,
    tally: RunTally,
}

impl AutoPlayer {
    /// Player with the given options.
    #[must_use]
    pub fn new(options: AutoplayOptions) -> Self {
        Self {
            options,
            tally: RunTally::default(),
        }
    }

    /// Counts so far.
    #[must_use]
    pub fn tally(&self) -> &RunTally {
        &self.tally
    }

    /// Play one tick.
    ///
    /// # Errors
    ///
    /// Propagates any intent refusal other than the expected ones.
    pub fn play_tick(&mut self, sim: &mut Simulation) -> Result<(), CommandError> {
        if sim.is_game_over() {
            return Ok(());
        }
        self.pin_emergencies(sim)?;
        self.assign_free_consultants(sim)?;
        self.play_swap(sim)?;
        self.maybe_call_for_help(sim)?;
        self.maybe_use_ability(sim)?;

        sim.advance_assist(self.options.assist_step);
        sim.settle_board();
        sim.step();
        self.count_events(sim);
        Ok(())
    }

    fn pin_emergencies(&mut self, sim: &mut Simulation) -> Result<(), CommandError> {
        let unpinned: Vec<_> = sim
            .registry()
            .patients()
            .iter()
            .filter(|p| p.lane == Lane::Emergency && !p.pinned && !p.is_terminal())
            .map(|p| p.id)
            .collect();
        for id in unpinned {
            sim.pin(id)?;
        }
        Ok(())
    }

    fn assign_free_consultants(&mut self, sim: &mut Simulation) -> Result<(), CommandError> {
        let waiting: Vec<_> = sim
            .registry()
            .queue_order()
            .into_iter()
            .filter(|p| p.status == PatientStatus::Waiting)
            .map(|p| p.id)
            .collect();
        let free: Vec<_> = sim
            .staffing()
            .consultants()
            .iter()
            .filter(|c| c.available && c.status == ConsultantStatus::Available)
            .map(|c| c.id)
            .collect();

        for (patient, consultant) in waiting.into_iter().zip(free) {
            sim.assign(patient, consultant)?;
            self.tally.assignments += 1;
        }
        Ok(())
    }

    fn play_swap(&mut self, sim: &mut Simulation) -> Result<(), CommandError> {
        let size = sim.board().size();
        for cell in find_exhaustive_moves(sim.board()) {
            for other in [cell + 1, cell + size] {
                if !sim.board().is_adjacent(cell, other) {
                    continue;
                }
                if let SwapOutcome::Committed(report) = sim.swap(cell, other)? {
                    trace!(from = report.from, to = report.to, "autoplay swap");
                    self.tally.swaps += 1;
                    return Ok(());
                }
            }
        }
        debug!(tick = sim.tick(), "no playable swap");
        Ok(())
    }

    fn maybe_call_for_help(&mut self, sim: &mut Simulation) -> Result<(), CommandError> {
        if sim.assist().is_some() || sim.tick() % self.options.help_every != 0 {
            return Ok(());
        }
        match sim.call_for_help() {
            Ok(_) => {
                self.tally.calls_for_help += 1;
                Ok(())
            }
            Err(CommandError::NoHelpersAvailable) => Ok(()),
            Err(e) => Err(e),
        }
    }

    fn maybe_use_ability(&mut self, sim: &mut Simulation) -> Result<(), CommandError> {
        if sim.active_effect().is_some() {
            return Ok(());
        }
        let Some(name) = sim
            .staffing()
            .current_manager()
            .and_then(|m| m.ability.as_ref())
            .filter(|a| a.unlocked)
            .map(|a| a.name())
        else {
            return Ok(());
        };
        match sim.activate_special_ability(name) {
            Ok(_) => {
                self.tally.abilities += 1;
                Ok(())
            }
            Err(CommandError::InsufficientStamina { .. }) => Ok(()),
            Err(e) => Err(e),
        }
    }

    fn count_events(&mut self, sim: &mut Simulation) {
        for record in sim.take_events() {
            match record.event {
                SimEvent::AssistRearranged { .. } => self.tally.rearrangements += 1,
                SimEvent::MoodChanged { .. } => self.tally.mood_changes += 1,
                SimEvent::Dispensed { wasted, .. } => {
                    self.tally.wasted_units += u64::from(wasted.total());
                }
                _ => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use medimix_core::SimConfig;

    #[test]
    fn test_autoplay_runs_a_shift() {
        let mut config = SimConfig::default();
        config.economy.starting_points = 100_000;
        let mut sim = Simulation::new(17, config).unwrap();
        let mut player = AutoPlayer::new(AutoplayOptions::default());

        for _ in 0..200 {
            player.play_tick(&mut sim).unwrap();
        }
        assert_eq!(sim.tick(), 200);
        assert!(player.tally().swaps > 0);
        assert!(player.tally().assignments > 0);
        assert!(sim.ledger().stats.completed > 0);
    }
}
