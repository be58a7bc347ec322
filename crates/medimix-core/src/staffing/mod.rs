//! Staffing scheduler: consultants and managers.
//!
//! # Consultants
//!
//! A consultant works a daily [`ShiftWindow`]. Shift gating runs every tick:
//!
//! | Status | Clock inside window | Clock outside window |
//! |--------|---------------------|----------------------|
//! | `closed` | → `available` | stays closed |
//! | `available` | stays available | → `closed` |
//! | `fetching` / `busy` / `helping` | untouched | untouched |
//!
//! The standby consultant ignores its window and follows business hours
//! instead: available outside them, closed during them.
//!
//! Assignment moves a consultant to `fetching`; the first credit to the
//! patient moves it to `busy`; the patient reaching a terminal state releases
//! it back to `available` for a fixed stamina cost.
//!
//! # Managers
//!
//! Exactly one manager is current. Every rotation interval the scheduler
//! filters managers whose shift type matches the clock (day inside
//! 07:00-19:00, night otherwise) and hands over to the next one in that list.

pub mod ability;
pub mod assist;

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::clock::{GameClock, ShiftWindow};
use crate::economy::Ledger;
use crate::error::CommandError;
use crate::patient::PatientId;

pub use ability::{AbilityKind, AbilitySpec, ActiveEffect, SpecialAbility, UnlockRequirement};
pub use assist::{AssistConfig, AssistProgress, AssistSession, HelpTier, TierSettings};

/// Highest stamina value.
pub const MAX_STAMINA: u8 = 100;

// =============================================================================
// Identifiers
// =============================================================================

/// Unique identifier for a consultant.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ConsultantId(u32);

impl ConsultantId {
    /// Creates a new `ConsultantId` from a raw value.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the raw value.
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for ConsultantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ConsultantId({})", self.0)
    }
}

impl fmt::Display for ConsultantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a manager.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ManagerId(u32);

impl ManagerId {
    /// Creates a new `ManagerId` from a raw value.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the raw value.
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self.0
    }
}

impl fmt::Display for ManagerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// Roster configuration
// =============================================================================

/// One consultant on the roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsultantSpec {
    /// Display name
    pub name: String,
    /// Daily shift
    pub shift: ShiftWindow,
    /// Covers the hours outside business hours
    #[serde(default)]
    pub standby: bool,
}

/// Manager shift type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShiftType {
    /// Inside the day management window
    Day,
    /// Outside it
    Night,
}

impl ShiftType {
    /// Shift type on duty at `clock`.
    #[must_use]
    pub fn on_duty(clock: GameClock, day_window: ShiftWindow) -> Self {
        if day_window.contains(clock) {
            Self::Day
        } else {
            Self::Night
        }
    }
}

/// One manager on the roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagerSpec {
    /// Display name
    pub name: String,
    /// Shift type
    pub shift: ShiftType,
    /// Special ability, if any
    #[serde(default)]
    pub ability: Option<AbilitySpec>,
}

/// Staffing rules and roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StaffingConfig {
    /// Consultants, in id order
    pub consultants: Vec<ConsultantSpec>,
    /// Managers, in id order
    pub managers: Vec<ManagerSpec>,
    /// Stamina a consultant pays when an order is closed
    pub completion_stamina_cost: u8,
    /// Ticks between manager hand-overs
    pub rotation_interval_ticks: u32,
    /// Opening hours; the standby consultant covers the rest
    pub business_hours: ShiftWindow,
    /// Day manager window
    pub day_window: ShiftWindow,
}

impl Default for StaffingConfig {
    fn default() -> Self {
        let consultant = |name: &str, start, end| ConsultantSpec {
            name: name.to_string(),
            shift: ShiftWindow::new(start, end),
            standby: false,
        };
        Self {
            consultants: vec![
                consultant("Thandi Mokoena", 7, 15),
                consultant("James Walker", 7, 17),
                consultant("Sipho Ndlovu", 9, 17),
                consultant("Emily Clark", 12, 20),
                ConsultantSpec {
                    name: "Naledi Khumalo".to_string(),
                    shift: ShiftWindow::new(17, 7),
                    standby: true,
                },
            ],
            managers: vec![
                ManagerSpec {
                    name: "Lerato Dlamini".to_string(),
                    shift: ShiftType::Day,
                    ability: Some(AbilitySpec {
                        kind: AbilityKind::TimeFreeze,
                        requirement: UnlockRequirement::CompletedPatients(10),
                        duration_ticks: 5,
                        stamina_cost: 20,
                    }),
                },
                ManagerSpec {
                    name: "Oliver Harris".to_string(),
                    shift: ShiftType::Day,
                    ability: Some(AbilitySpec {
                        kind: AbilityKind::DoubleDash,
                        requirement: UnlockRequirement::StreakWithoutComplaint(5),
                        duration_ticks: 10,
                        stamina_cost: 20,
                    }),
                },
                ManagerSpec {
                    name: "Bongani Zulu".to_string(),
                    shift: ShiftType::Night,
                    ability: Some(AbilitySpec {
                        kind: AbilityKind::CalmPresence,
                        requirement: UnlockRequirement::DashPoints(500),
                        duration_ticks: 15,
                        stamina_cost: 20,
                    }),
                },
            ],
            completion_stamina_cost: 5,
            rotation_interval_ticks: 1,
            business_hours: ShiftWindow::BUSINESS_HOURS,
            day_window: ShiftWindow::DAY_MANAGEMENT,
        }
    }
}

// =============================================================================
// Consultants and managers
// =============================================================================

/// Consultant status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsultantStatus {
    /// On shift and free
    Available,
    /// Assigned; collecting the order
    Fetching,
    /// Order in progress
    Busy,
    /// In a call-for-help session
    Helping,
    /// Off shift
    Closed,
}

/// A pharmacy consultant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Consultant {
    /// Unique id
    pub id: ConsultantId,
    /// Display name
    pub name: String,
    /// Free to take an order
    pub available: bool,
    /// Stamina, 0-100
    pub stamina: u8,
    /// Current status
    pub status: ConsultantStatus,
    /// Daily shift
    pub shift: ShiftWindow,
    /// Covers the hours outside business hours
    pub standby: bool,
    /// Patient being served
    pub current_order: Option<PatientId>,
    /// Ticks left before this consultant can help again
    pub help_cooldown: Option<u32>,
}

impl Consultant {
    fn from_spec(id: ConsultantId, spec: &ConsultantSpec) -> Self {
        Self {
            id,
            name: spec.name.clone(),
            available: false,
            stamina: MAX_STAMINA,
            status: ConsultantStatus::Closed,
            shift: spec.shift,
            standby: spec.standby,
            current_order: None,
            help_cooldown: None,
        }
    }

    /// Free, on shift, and off cooldown.
    #[must_use]
    pub fn can_help(&self) -> bool {
        self.status == ConsultantStatus::Available && self.available && self.help_cooldown.is_none()
    }

    fn set_available(&mut self) {
        self.status = ConsultantStatus::Available;
        self.available = true;
    }

    fn set_closed(&mut self) {
        self.status = ConsultantStatus::Closed;
        self.available = false;
    }

    fn drain(&mut self, cost: u8) {
        self.stamina = self.stamina.saturating_sub(cost);
    }
}

/// A shift manager.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Manager {
    /// Unique id
    pub id: ManagerId,
    /// Display name
    pub name: String,
    /// Shift type
    pub shift: ShiftType,
    /// Stamina, 0-100
    pub stamina: u8,
    /// Special ability, if any
    pub ability: Option<SpecialAbility>,
}

/// Changes made by one scheduler tick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaffingReport {
    /// Consultants opened by shift gating
    pub opened: Vec<ConsultantId>,
    /// Consultants closed by shift gating
    pub closed: Vec<ConsultantId>,
    /// New current manager, if it changed
    pub handed_over_to: Option<ManagerId>,
    /// Consultants whose help cooldown ran out
    pub cooled_down: Vec<ConsultantId>,
}

// =============================================================================
// Scheduler
// =============================================================================

/// Owns the roster and applies staffing rules.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StaffingScheduler {
    consultants: Vec<Consultant>,
    managers: Vec<Manager>,
    current_manager: Option<usize>,
    ticks_since_rotation: u32,
    completion_stamina_cost: u8,
    rotation_interval_ticks: u32,
    business_hours: ShiftWindow,
    day_window: ShiftWindow,
}

impl StaffingScheduler {
    /// Build the roster and gate it against `clock`.
    #[must_use]
    pub fn new(config: &StaffingConfig, clock: GameClock) -> Self {
        let consultants = (1..)
            .zip(&config.consultants)
            .map(|(id, spec)| Consultant::from_spec(ConsultantId::new(id), spec))
            .collect();
        let managers: Vec<Manager> = (1..)
            .zip(&config.managers)
            .map(|(id, spec)| Manager {
                id: ManagerId::new(id),
                name: spec.name.clone(),
                shift: spec.shift,
                stamina: MAX_STAMINA,
                ability: spec.ability.map(SpecialAbility::new),
            })
            .collect();

        let on_duty = ShiftType::on_duty(clock, config.day_window);
        let current_manager = managers
            .iter()
            .position(|m| m.shift == on_duty)
            .or_else(|| (!managers.is_empty()).then_some(0));

        let mut scheduler = Self {
            consultants,
            managers,
            current_manager,
            ticks_since_rotation: 0,
            completion_stamina_cost: config.completion_stamina_cost,
            rotation_interval_ticks: config.rotation_interval_ticks,
            business_hours: config.business_hours,
            day_window: config.day_window,
        };
        scheduler.apply_shift_gating(clock);
        scheduler
    }

    /// All consultants in id order.
    #[must_use]
    pub fn consultants(&self) -> &[Consultant] {
        &self.consultants
    }

    /// Look up a consultant.
    #[must_use]
    pub fn consultant(&self, id: ConsultantId) -> Option<&Consultant> {
        self.consultants.iter().find(|c| c.id == id)
    }

    /// All managers in id order.
    #[must_use]
    pub fn managers(&self) -> &[Manager] {
        &self.managers
    }

    /// The manager on duty.
    #[must_use]
    pub fn current_manager(&self) -> Option<&Manager> {
        self.current_manager.and_then(|i| self.managers.get(i))
    }

    fn consultant_mut(&mut self, id: ConsultantId) -> Result<&mut Consultant, CommandError> {
        self.consultants
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(CommandError::UnknownConsultant(id))
    }

    /// One scheduler tick at the already-advanced `clock`: gating, manager
    /// rotation, cooldowns.
    pub fn tick(&mut self, clock: GameClock) -> StaffingReport {
        let (opened, closed) = self.apply_shift_gating(clock);
        let handed_over_to = self.rotate_managers(clock);
        let cooled_down = self.tick_cooldowns();
        StaffingReport {
            opened,
            closed,
            handed_over_to,
            cooled_down,
        }
    }

    /// Open and close consultants against their shifts.
    pub fn apply_shift_gating(&mut self, clock: GameClock) -> (Vec<ConsultantId>, Vec<ConsultantId>) {
        let business = self.business_hours.contains(clock);
        let mut opened = Vec::new();
        let mut closed = Vec::new();

        for consultant in &mut self.consultants {
            let on_shift = if consultant.standby {
                !business
            } else {
                consultant.shift.contains(clock)
            };
            match consultant.status {
                ConsultantStatus::Closed if on_shift => {
                    consultant.set_available();
                    opened.push(consultant.id);
                }
                ConsultantStatus::Available if !on_shift => {
                    consultant.set_closed();
                    closed.push(consultant.id);
                }
                _ => {}
            }
        }

        if !opened.is_empty() || !closed.is_empty() {
            debug!(%clock, ?opened, ?closed, "shift gating");
        }
        (opened, closed)
    }

    /// Hand over to the next manager on the matching shift, every
    /// rotation interval. Returns the new manager when it changed.
    pub fn rotate_managers(&mut self, clock: GameClock) -> Option<ManagerId> {
        self.ticks_since_rotation += 1;
        if self.ticks_since_rotation < self.rotation_interval_ticks.max(1) {
            return None;
        }
        self.ticks_since_rotation = 0;

        let on_duty = ShiftType::on_duty(clock, self.day_window);
        let eligible: Vec<usize> = (0..self.managers.len())
            .filter(|&i| self.managers[i].shift == on_duty)
            .collect();
        if eligible.is_empty() {
            return None;
        }

        let next = match self
            .current_manager
            .and_then(|current| eligible.iter().position(|&i| i == current))
        {
            Some(pos) => eligible[(pos + 1) % eligible.len()],
            None => eligible[0],
        };
        if self.current_manager == Some(next) {
            return None;
        }
        self.current_manager = Some(next);
        Some(self.managers[next].id)
    }

    fn tick_cooldowns(&mut self) -> Vec<ConsultantId> {
        let mut cooled = Vec::new();
        for consultant in &mut self.consultants {
            if let Some(left) = consultant.help_cooldown {
                let left = left.saturating_sub(1);
                if left == 0 {
                    consultant.help_cooldown = None;
                    cooled.push(consultant.id);
                } else {
                    consultant.help_cooldown = Some(left);
                }
            }
        }
        cooled
    }

    /// Put an available consultant on a patient's order.
    ///
    /// # Errors
    ///
    /// Unknown consultant, or one that is not `available`.
    pub fn assign(&mut self, id: ConsultantId, patient: PatientId) -> Result<(), CommandError> {
        self.check_assignable(id)?;
        let consultant = self.consultant_mut(id)?;
        consultant.status = ConsultantStatus::Fetching;
        consultant.available = false;
        consultant.current_order = Some(patient);
        Ok(())
    }

    /// Validate an assignment without changing anything.
    ///
    /// # Errors
    ///
    /// Same as [`StaffingScheduler::assign`].
    pub fn check_assignable(&self, id: ConsultantId) -> Result<(), CommandError> {
        let consultant = self
            .consultant(id)
            .ok_or(CommandError::UnknownConsultant(id))?;
        if consultant.status != ConsultantStatus::Available || !consultant.available {
            return Err(CommandError::ConsultantUnavailable(id));
        }
        Ok(())
    }

    /// A fetching consultant starts working the order.
    pub fn mark_busy(&mut self, id: ConsultantId) {
        if let Ok(consultant) = self.consultant_mut(id) {
            if consultant.status == ConsultantStatus::Fetching {
                consultant.status = ConsultantStatus::Busy;
            }
        }
    }

    /// Close a consultant's order: back to `available`, minus the
    /// completion stamina cost. Returns false if the consultant is unknown.
    pub fn release(&mut self, id: ConsultantId) -> bool {
        let cost = self.completion_stamina_cost;
        let Ok(consultant) = self.consultant_mut(id) else {
            return false;
        };
        consultant.current_order = None;
        consultant.set_available();
        consultant.drain(cost);
        true
    }

    /// Move every consultant who can help into `helping`.
    ///
    /// # Errors
    ///
    /// [`CommandError::NoHelpersAvailable`] when nobody can help.
    pub fn begin_help(&mut self) -> Result<Vec<ConsultantId>, CommandError> {
        let helpers: Vec<ConsultantId> = self
            .consultants
            .iter()
            .filter(|c| c.can_help())
            .map(|c| c.id)
            .collect();
        if helpers.is_empty() {
            return Err(CommandError::NoHelpersAvailable);
        }
        for consultant in &mut self.consultants {
            if helpers.contains(&consultant.id) {
                consultant.status = ConsultantStatus::Helping;
                consultant.available = false;
            }
        }
        Ok(helpers)
    }

    /// Return helpers to `available`, charge stamina, start cooldowns.
    pub fn finish_help(&mut self, helpers: &[ConsultantId], stamina_cost: u8, cooldown_ticks: u32) {
        for consultant in &mut self.consultants {
            if helpers.contains(&consultant.id) && consultant.status == ConsultantStatus::Helping {
                consultant.set_available();
                consultant.drain(stamina_cost);
                consultant.help_cooldown = (cooldown_ticks > 0).then_some(cooldown_ticks);
            }
        }
    }

    /// Unlock every ability whose requirement the ledger now meets.
    /// Returns the abilities unlocked by this call.
    pub fn evaluate_unlocks(&mut self, ledger: &Ledger) -> Vec<(ManagerId, AbilityKind)> {
        let mut unlocked = Vec::new();
        for manager in &mut self.managers {
            if let Some(ability) = manager.ability.as_mut() {
                if !ability.unlocked && ability.spec.requirement.is_met(ledger) {
                    ability.unlocked = true;
                    unlocked.push((manager.id, ability.spec.kind));
                }
            }
        }
        unlocked
    }

    /// Spend the current manager's stamina on their ability named `name`.
    ///
    /// # Errors
    ///
    /// No manager on duty, the manager has no ability of that name, it is
    /// still locked, or stamina is short. Nothing changes on error.
    pub fn use_ability(&mut self, name: &str) -> Result<AbilitySpec, CommandError> {
        let index = self.current_manager.ok_or(CommandError::NoManagerOnDuty)?;
        let manager = self
            .managers
            .get_mut(index)
            .ok_or(CommandError::NoManagerOnDuty)?;
        let ability = manager
            .ability
            .as_ref()
            .filter(|a| a.name().eq_ignore_ascii_case(name.trim()))
            .ok_or_else(|| CommandError::UnknownAbility(name.to_string()))?;
        if !ability.unlocked {
            return Err(CommandError::AbilityLocked(ability.name().to_string()));
        }
        let spec = ability.spec;
        if manager.stamina < spec.stamina_cost {
            return Err(CommandError::InsufficientStamina {
                needed: spec.stamina_cost,
                available: manager.stamina,
            });
        }
        manager.stamina -= spec.stamina_cost;
        Ok(spec)
    }
}
