//! Simulation orchestrator.
//!
//! `Simulation` owns every component of a session: the board engine, the
//! patient registry, the staffing scheduler, the ledger, the seeded RNG and
//! the event log. All intents go through it and every driver checks the
//! game-over flag before touching anything.
//!
//! # Drivers
//!
//! Three independent clocks drive a session:
//!
//! - [`Simulation::step`]: one simulation tick (one game minute).
//! - [`Simulation::settle_board`]: one board tick. Runs gravity and cascades
//!   to a stable board and hands everything cleared to the patients.
//! - [`Simulation::advance_assist`]: real time for a running call for help.
//!
//! # Tick order
//!
//! 1. Nothing happens once the game is over.
//! 2. Score what the previous tick left behind: terminal patients not yet
//!    settled, and mood changes not yet acknowledged.
//! 3. Patient timers, unless an ability effect holds them.
//! 4. Reap settled patients, release their consultants, refill the queue.
//! 5. Advance the clock, run the staffing scheduler, expire the ability
//!    effect, evaluate unlocks, check for game over.
//!
//! # Determinism
//!
//! All randomness comes from one `ChaCha8Rng` seeded at construction. Two
//! simulations with the same seed, config and intent sequence produce the
//! same [`Simulation::state_hash`] after every call.
//!
//! # Example
//!
//! ```
//! use medimix_core::{SimConfig, Simulation};
//!
//! let mut sim = Simulation::new(42, SimConfig::default()).unwrap();
//! assert_eq!(sim.registry().active_count(), 3);
//!
//! for _ in 0..10 {
//!     sim.step();
//! }
//! assert_eq!(sim.tick(), 10);
//! assert_eq!(sim.clock().minute(), 10);
//! ```

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::time::Duration;

use medimix_board::{
    find_exhaustive_moves, find_smart_rearrangements, Board, BoardEngine, DispenseRecord,
    Rearrangement, Resolution, SwapOutcome, SwapReport,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::clock::GameClock;
use crate::config::{ConfigError, SimConfig};
use crate::economy::Ledger;
use crate::error::CommandError;
use crate::event::{EventLog, EventRecord, SimEvent};
use crate::patient::generator::LaneOdds;
use crate::patient::{Patient, PatientId, PatientStatus};
use crate::registry::{PatientRegistry, TimerFreeze};
use crate::staffing::{
    AbilityKind, ActiveEffect, AssistProgress, AssistSession, Consultant, ConsultantId, HelpTier,
    Manager, ManagerId, StaffingScheduler,
};

// =============================================================================
// Snapshot
// =============================================================================

/// Read-only view of a running call for help.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssistView {
    /// Tier
    pub tier: HelpTier,
    /// Consultants helping
    pub helpers: Vec<ConsultantId>,
    /// Milliseconds left
    pub remaining_ms: u64,
    /// Cells highlighted as playable
    pub highlighted: Vec<usize>,
}

/// Everything a renderer needs, in one serializable value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Game clock
    pub clock: GameClock,
    /// Ticks since the start
    pub tick: u64,
    /// Board
    pub board: Board,
    /// Patients in queue order
    pub patients: Vec<Patient>,
    /// Consultants in id order
    pub consultants: Vec<Consultant>,
    /// Managers in id order
    pub managers: Vec<Manager>,
    /// Manager on duty
    pub current_manager: Option<ManagerId>,
    /// Score and statistics
    pub ledger: Ledger,
    /// Mean served wait in ticks
    pub average_served_wait: f64,
    /// Running ability effect
    pub active_effect: Option<ActiveEffect>,
    /// Running call for help
    pub assist: Option<AssistView>,
    /// Session lost
    pub game_over: bool,
}

// =============================================================================
// Simulation
// =============================================================================

/// One MediMix Dash session.
#[derive(Debug, Clone)]
pub struct Simulation {
    config: SimConfig,
    seed: u64,
    rng: ChaCha8Rng,
    clock: GameClock,
    tick: u64,
    engine: BoardEngine,
    registry: PatientRegistry,
    staffing: StaffingScheduler,
    ledger: Ledger,
    active_effect: Option<ActiveEffect>,
    assist: Option<AssistSession>,
    game_over: bool,
    events: EventLog,
}

impl Simulation {
    /// Start a session at 07:00 on day 0 with a quiet board and a full queue.
    ///
    /// # Errors
    ///
    /// Returns the first configuration invariant that does not hold.
    pub fn new(seed: u64, config: SimConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let clock = GameClock::default();
        let engine = BoardEngine::random(config.board.size, &mut rng)?
            .with_max_resolve_passes(config.board.max_resolve_passes);
        let lane_odds = LaneOdds {
            business_hours: config.staffing.business_hours,
            ..config.patients.lane_odds
        };
        let registry = PatientRegistry::new(config.patients.active_target, lane_odds);
        let staffing = StaffingScheduler::new(&config.staffing, clock);
        let ledger = Ledger::new(&config.economy);

        let mut sim = Self {
            config,
            seed,
            rng,
            clock,
            tick: 0,
            engine,
            registry,
            staffing,
            ledger,
            active_effect: None,
            assist: None,
            game_over: false,
            events: EventLog::new(),
        };
        sim.replenish();
        info!(seed, clock = %sim.clock, "session started");
        Ok(sim)
    }

    // ===== Accessors =====

    /// Seed the session was started with.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Ticks since the start.
    #[must_use]
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Game clock.
    #[must_use]
    pub fn clock(&self) -> GameClock {
        self.clock
    }

    /// Configuration in use.
    #[must_use]
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Board engine.
    #[must_use]
    pub fn engine(&self) -> &BoardEngine {
        &self.engine
    }

    /// Board engine, for staging a board.
    pub fn engine_mut(&mut self) -> &mut BoardEngine {
        &mut self.engine
    }

    /// Current board.
    #[must_use]
    pub fn board(&self) -> &Board {
        self.engine.board()
    }

    /// Patient registry.
    #[must_use]
    pub fn registry(&self) -> &PatientRegistry {
        &self.registry
    }

    /// Patient registry, for staging patients.
    pub fn registry_mut(&mut self) -> &mut PatientRegistry {
        &mut self.registry
    }

    /// Staffing scheduler.
    #[must_use]
    pub fn staffing(&self) -> &StaffingScheduler {
        &self.staffing
    }

    /// Score, currency, morale and statistics.
    #[must_use]
    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Running ability effect.
    #[must_use]
    pub fn active_effect(&self) -> Option<&ActiveEffect> {
        self.active_effect.as_ref()
    }

    /// Running call for help.
    #[must_use]
    pub fn assist(&self) -> Option<&AssistSession> {
        self.assist.as_ref()
    }

    /// Session lost.
    #[must_use]
    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    /// Drain the event log.
    pub fn take_events(&mut self) -> Vec<EventRecord> {
        self.events.take_events()
    }

    /// Events recorded since the last drain.
    #[must_use]
    pub fn events(&self) -> &EventLog {
        &self.events
    }

    // ===== Tick driver =====

    /// Run one simulation tick.
    pub fn step(&mut self) {
        if self.game_over {
            return;
        }

        self.settle_outcomes();

        let report = self.registry.tick_timers(self.timer_freeze(), &mut self.rng);
        if !report.timed_out.is_empty() {
            debug!(tick = self.tick, timed_out = ?report.timed_out, "patients ran out of time");
        }

        self.cleanup();
        self.replenish();

        self.clock.tick();
        self.tick += 1;
        self.run_staffing();
        self.expire_effect();
        self.evaluate_unlocks();
        self.check_game_over();
        debug!(
            tick = self.tick,
            clock = %self.clock,
            points = self.ledger.dash_points,
            active = self.registry.active_count(),
            "tick"
        );
    }

    /// Patient timers held by the running effect.
    fn timer_freeze(&self) -> TimerFreeze {
        self.active_effect
            .map(|effect| effect.kind.timer_freeze())
            .unwrap_or_default()
    }

    /// Score unscored mood changes and unsettled terminal patients.
    fn settle_outcomes(&mut self) {
        let doubled = matches!(
            self.active_effect,
            Some(ActiveEffect {
                kind: AbilityKind::DoubleDash,
                ..
            })
        );
        let economy = &self.config.economy;

        for patient in self.registry.iter_mut() {
            if let Some(change) = patient.unscored_mood_change() {
                let points_lost = self.ledger.record_mood_change(economy, change.to);
                patient.acknowledge_mood();
                self.events.push(
                    self.clock,
                    SimEvent::MoodChanged {
                        patient: patient.id,
                        from: change.from,
                        to: change.to,
                        points_lost,
                    },
                );
            }

            if !patient.is_terminal() || patient.settled {
                continue;
            }
            patient.settled = true;
            let event = if patient.status == PatientStatus::Completed {
                let served_wait = patient.served_wait();
                let points = self.ledger.record_completion(economy, served_wait, doubled);
                SimEvent::PatientCompleted {
                    patient: patient.id,
                    points,
                    served_wait,
                }
            } else {
                let points_lost = self.ledger.record_failure(economy);
                SimEvent::PatientFailed {
                    patient: patient.id,
                    points_lost,
                }
            };
            self.events.push(self.clock, event);
        }
    }

    /// Reap settled patients and release their consultants.
    fn cleanup(&mut self) {
        for patient in self.registry.reap_settled() {
            let Some(consultant) = patient.assigned_consultant else {
                continue;
            };
            if self.staffing.release(consultant) {
                self.events.push(
                    self.clock,
                    SimEvent::ConsultantReleased {
                        consultant,
                        patient: patient.id,
                    },
                );
            }
        }
    }

    fn replenish(&mut self) {
        for id in self.registry.replenish(self.clock, &mut self.rng) {
            if let Some(patient) = self.registry.get(id) {
                self.events.push(
                    self.clock,
                    SimEvent::PatientArrived {
                        patient: id,
                        lane: patient.lane,
                        ticket: patient.ticket,
                    },
                );
            }
        }
        self.ledger.stats.total_queued = self.registry.total_queued();
    }

    fn run_staffing(&mut self) {
        let report = self.staffing.tick(self.clock);
        if !report.opened.is_empty() || !report.closed.is_empty() {
            self.events.push(
                self.clock,
                SimEvent::ShiftChanged {
                    opened: report.opened,
                    closed: report.closed,
                },
            );
        }
        if let Some(manager) = report.handed_over_to {
            self.events
                .push(self.clock, SimEvent::ManagerOnDuty { manager });
        }
    }

    fn expire_effect(&mut self) {
        if let Some(effect) = self.active_effect {
            if effect.is_expired(self.clock) {
                self.active_effect = None;
                info!(ability = %effect.kind, clock = %self.clock, "ability effect expired");
                self.events.push(
                    self.clock,
                    SimEvent::AbilityExpired {
                        ability: effect.kind,
                    },
                );
            }
        }
    }

    fn evaluate_unlocks(&mut self) {
        for (manager, ability) in self.staffing.evaluate_unlocks(&self.ledger) {
            info!(%manager, %ability, "ability unlocked");
            self.events
                .push(self.clock, SimEvent::AbilityUnlocked { manager, ability });
        }
    }

    fn check_game_over(&mut self) {
        if !self.game_over && self.ledger.is_bankrupt() {
            self.game_over = true;
            self.cancel_assist();
            info!(
                tick = self.tick,
                points = self.ledger.dash_points,
                "game over"
            );
            self.events.push(
                self.clock,
                SimEvent::GameOver {
                    dash_points: self.ledger.dash_points,
                },
            );
        }
    }

    // ===== Board =====

    /// Player swap. A committed swap feeds its matches to the patients and
    /// settles the board.
    ///
    /// # Errors
    ///
    /// [`CommandError::GameOver`] once the session is lost. Illegal swaps
    /// are not errors; they come back as [`SwapOutcome::Rejected`].
    pub fn swap(&mut self, from: usize, to: usize) -> Result<SwapOutcome, CommandError> {
        self.ensure_running()?;
        let outcome = self.engine.swap(from, to);
        if let SwapOutcome::Committed(report) = &outcome {
            self.dispense(&report.dispensed);
            self.settle_board();
        }
        Ok(outcome)
    }

    /// One board tick: settle to a stable board and dispense every cascade.
    pub fn settle_board(&mut self) -> Resolution {
        if self.game_over {
            return Resolution::default();
        }
        let resolution = self.engine.resolve_until_stable(&mut self.rng);
        if !resolution.dispensed.is_empty() {
            self.dispense(&resolution.dispensed);
        }
        if resolution.cascades > 0 || resolution.settle_passes > 0 {
            self.events.push(
                self.clock,
                SimEvent::BoardSettled {
                    cascades: resolution.cascades,
                    settle_passes: resolution.settle_passes,
                    cleared: resolution.dispensed.total(),
                },
            );
            if let Some(session) = self.assist.as_mut() {
                session.set_highlighted(find_exhaustive_moves(self.engine.board()));
            }
        }
        resolution
    }

    fn dispense(&mut self, record: &DispenseRecord) {
        let outcome = self.registry.apply_dispense(record);
        for credit in &outcome.credits {
            let consultant = self
                .registry
                .get(credit.patient)
                .and_then(|p| p.assigned_consultant);
            if let Some(consultant) = consultant {
                self.staffing.mark_busy(consultant);
            }
        }
        if !outcome.completed.is_empty() {
            debug!(completed = ?outcome.completed, "prescriptions filled");
        }
        if !outcome.credits.is_empty() || !outcome.wasted.is_empty() {
            self.events.push(
                self.clock,
                SimEvent::Dispensed {
                    credits: outcome.credits,
                    wasted: outcome.wasted,
                },
            );
        }
    }

    // ===== Patient and roster intents =====

    /// Toggle a patient's pin. Returns the new value.
    ///
    /// # Errors
    ///
    /// Game over, or unknown patient.
    pub fn pin(&mut self, patient: PatientId) -> Result<bool, CommandError> {
        self.ensure_running()?;
        self.registry.pin(patient)
    }

    /// Put a consultant on a waiting patient's order.
    ///
    /// # Errors
    ///
    /// Game over, unknown patient or consultant, a patient that is not
    /// waiting, or a consultant that is not available.
    pub fn assign(&mut self, patient: PatientId, consultant: ConsultantId) -> Result<(), CommandError> {
        self.ensure_running()?;
        let status = self
            .registry
            .get(patient)
            .map(|p| p.status)
            .ok_or(CommandError::UnknownPatient(patient))?;
        if status != PatientStatus::Waiting {
            return Err(CommandError::PatientNotWaiting(patient));
        }
        self.staffing.check_assignable(consultant)?;

        self.staffing.assign(consultant, patient)?;
        if let Some(p) = self.registry.get_mut(patient) {
            p.status = PatientStatus::Dispensing;
            p.assigned_consultant = Some(consultant);
        }
        debug!(%patient, %consultant, "consultant assigned");
        self.events.push(
            self.clock,
            SimEvent::ConsultantAssigned {
                consultant,
                patient,
            },
        );
        Ok(())
    }

    // ===== Call for help =====

    /// Pull every ready consultant onto the board.
    ///
    /// # Errors
    ///
    /// Game over, a session already running, or nobody free to help.
    pub fn call_for_help(&mut self) -> Result<HelpTier, CommandError> {
        self.ensure_running()?;
        if self.assist.is_some() {
            return Err(CommandError::AssistInProgress);
        }
        let ready = self
            .staffing
            .consultants()
            .iter()
            .filter(|c| c.can_help())
            .count();
        let tier = HelpTier::for_helpers(ready).ok_or(CommandError::NoHelpersAvailable)?;
        let helpers = self.staffing.begin_help()?;

        let mut session = AssistSession::new(helpers.clone(), tier, self.config.assist.settings(tier));
        session.set_highlighted(find_exhaustive_moves(self.engine.board()));
        self.assist = Some(session);

        info!(?tier, helpers = helpers.len(), "call for help started");
        self.events
            .push(self.clock, SimEvent::HelpStarted { helpers, tier });
        Ok(tier)
    }

    /// End the running call for help: helpers pay their stamina and start
    /// their cooldown.
    ///
    /// # Errors
    ///
    /// [`CommandError::NoAssistInProgress`] when nothing is running.
    pub fn end_help(&mut self) -> Result<(), CommandError> {
        let session = self.assist.take().ok_or(CommandError::NoAssistInProgress)?;
        self.finish_session(&session, false);
        Ok(())
    }

    /// Tear down the running call for help without charging anyone.
    /// Returns whether a session was running.
    pub fn cancel_assist(&mut self) -> bool {
        let Some(session) = self.assist.take() else {
            return false;
        };
        self.staffing.finish_help(session.helpers(), 0, 0);
        debug!(helpers = session.helpers().len(), "call for help cancelled");
        true
    }

    fn finish_session(&mut self, session: &AssistSession, expired: bool) {
        self.staffing.finish_help(
            session.helpers(),
            session.stamina_cost(),
            self.config.assist.cooldown_ticks,
        );
        info!(
            tier = ?session.tier(),
            rearrangements = session.rearrangements(),
            expired,
            "call for help ended"
        );
        self.events.push(
            self.clock,
            SimEvent::HelpEnded {
                helpers: session.helpers().to_vec(),
                tier: session.tier(),
                expired,
            },
        );
    }

    /// Advance the running call for help by `elapsed` real time.
    ///
    /// Performs every rearrangement that fell due, then ends the session if
    /// it ran out.
    pub fn advance_assist(&mut self, elapsed: Duration) -> AssistProgress {
        if self.game_over {
            return AssistProgress::default();
        }
        let Some(progress) = self.assist.as_mut().map(|s| s.advance(elapsed)) else {
            return AssistProgress::default();
        };

        for _ in 0..progress.rearrangements_due {
            self.rearrange();
        }

        if progress.expired {
            if let Some(session) = self.assist.take() {
                self.finish_session(&session, true);
            }
        }
        progress
    }

    /// One helper rearrangement: the best smart swap, or the first plain
    /// neighbour swap that matches when the ranker finds nothing.
    fn rearrange(&mut self) {
        let ranked = find_smart_rearrangements(self.engine.board());
        let committed = self
            .first_ranked_swap(&ranked)
            .or_else(|| self.first_matching_neighbour_swap());
        let Some(report) = committed else {
            debug!("no rearrangement available");
            return;
        };

        self.dispense(&report.dispensed);
        let cascade = self.settle_board();
        if let Some(session) = self.assist.as_mut() {
            session.record_rearrangement();
        }
        self.events.push(
            self.clock,
            SimEvent::AssistRearranged {
                from: report.from,
                to: report.to,
                cleared: report.dispensed.total() + cascade.dispensed.total(),
            },
        );
    }

    /// Try ranked rearrangements best first; the first that commits wins.
    pub(crate) fn first_ranked_swap(&mut self, ranked: &[Rearrangement]) -> Option<SwapReport> {
        ranked.iter().find_map(|r| match self.engine.assist_swap(r.from, r.to) {
            SwapOutcome::Committed(report) => Some(report),
            _ => None,
        })
    }

    fn first_matching_neighbour_swap(&mut self) -> Option<SwapReport> {
        let size = self.engine.board().size();
        for cell in find_exhaustive_moves(self.engine.board()) {
            for other in [cell + 1, cell + size] {
                if !self.engine.board().is_adjacent(cell, other) {
                    continue;
                }
                if let SwapOutcome::Committed(report) = self.engine.swap(cell, other) {
                    return Some(report);
                }
            }
        }
        None
    }

    // ===== Abilities =====

    /// Activate the on-duty manager's ability by name.
    ///
    /// # Errors
    ///
    /// Game over, an effect already running, or anything
    /// [`StaffingScheduler::use_ability`] refuses. Nothing changes on error.
    pub fn activate_special_ability(&mut self, name: &str) -> Result<ActiveEffect, CommandError> {
        self.ensure_running()?;
        if self.active_effect.is_some() {
            return Err(CommandError::AbilityActive);
        }
        let spec = self.staffing.use_ability(name)?;
        let effect = ActiveEffect {
            kind: spec.kind,
            ends_at: self.clock.after_ticks(u64::from(spec.duration_ticks)),
        };
        self.active_effect = Some(effect);
        info!(ability = %spec.kind, ends_at = %effect.ends_at, "ability activated");
        self.events.push(
            self.clock,
            SimEvent::AbilityActivated {
                ability: spec.kind,
                ends_at: effect.ends_at,
            },
        );
        Ok(effect)
    }

    fn ensure_running(&self) -> Result<(), CommandError> {
        if self.game_over {
            Err(CommandError::GameOver)
        } else {
            Ok(())
        }
    }

    // ===== Views =====

    /// Serializable view of the whole session.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            clock: self.clock,
            tick: self.tick,
            board: self.engine.board().clone(),
            patients: self.registry.queue_order().into_iter().cloned().collect(),
            consultants: self.staffing.consultants().to_vec(),
            managers: self.staffing.managers().to_vec(),
            current_manager: self.staffing.current_manager().map(|m| m.id),
            ledger: self.ledger.clone(),
            average_served_wait: self.ledger.stats.average_served_wait(),
            active_effect: self.active_effect,
            assist: self.assist.as_ref().map(|s| AssistView {
                tier: s.tier(),
                helpers: s.helpers().to_vec(),
                remaining_ms: u64::try_from(s.remaining().as_millis()).unwrap_or(u64::MAX),
                highlighted: s.highlighted().to_vec(),
            }),
            game_over: self.game_over,
        }
    }

    /// Hash of the full session state, for determinism checks.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.tick.hash(&mut hasher);
        self.clock.hash(&mut hasher);
        self.engine.board().hash(&mut hasher);
        self.registry.patients().hash(&mut hasher);
        self.registry.total_queued().hash(&mut hasher);
        self.staffing.hash(&mut hasher);
        self.ledger.hash(&mut hasher);
        self.active_effect.hash(&mut hasher);
        self.assist.hash(&mut hasher);
        self.game_over.hash(&mut hasher);
        hasher.finish()
    }
}
