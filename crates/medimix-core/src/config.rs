//! Session configuration.
//!
//! [`SimConfig`] groups every tunable of a session. All sections implement
//! `Default` with the standard game values and deserialize with
//! `#[serde(default)]`, so a JSON file only needs the fields it overrides.
//! [`SimConfig::validate`] must pass before a simulation is built.

use medimix_board::{BoardError, DEFAULT_BOARD_SIZE, DEFAULT_MAX_RESOLVE_PASSES};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::clock::ShiftWindow;
use crate::economy::EconomyConfig;
use crate::patient::generator::LaneOdds;
use crate::staffing::{AssistConfig, StaffingConfig, MAX_STAMINA};

/// Smallest board that can hold a run of three in both directions.
pub const MIN_BOARD_SIZE: usize = 3;

/// Errors raised when configuration invariants are violated.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    /// Board edge too short.
    #[error("board size must be at least {min} (got {size})")]
    BoardTooSmall {
        /// Requested edge
        size: usize,
        /// Minimum edge
        min: usize,
    },
    /// A value that must be positive is zero.
    #[error("{field} must be greater than zero")]
    Zero {
        /// Offending field
        field: &'static str,
    },
    /// A value exceeds its upper bound.
    #[error("{field} must be at most {max} (got {value})")]
    AboveMaximum {
        /// Offending field
        field: &'static str,
        /// Upper bound
        max: i64,
        /// Supplied value
        value: i64,
    },
    /// A probability outside `[0, 1]`.
    #[error("{field} must be a probability between 0 and 1 (got {value})")]
    Probability {
        /// Offending field
        field: &'static str,
        /// Supplied value
        value: f64,
    },
    /// A shift window with an hour of 24 or more.
    #[error("{owner} has an invalid shift {window}")]
    InvalidShift {
        /// Who the window belongs to
        owner: String,
        /// Supplied window
        window: ShiftWindow,
    },
    /// A roster list is empty.
    #[error("at least one {what} is required")]
    EmptyRoster {
        /// `"consultant"` or `"manager"`
        what: &'static str,
    },
    /// The board could not be built.
    #[error(transparent)]
    Board(#[from] BoardError),
}

/// Board settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    /// Edge length
    pub size: usize,
    /// Ceiling on resolve loop iterations
    pub max_resolve_passes: u32,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            size: DEFAULT_BOARD_SIZE,
            max_resolve_passes: DEFAULT_MAX_RESOLVE_PASSES,
        }
    }
}

/// Patient flow settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatientConfig {
    /// Active patients kept in the pharmacy
    pub active_target: usize,
    /// Lane roll probabilities
    pub lane_odds: LaneOdds,
}

impl Default for PatientConfig {
    fn default() -> Self {
        Self {
            active_target: 3,
            lane_odds: LaneOdds::default(),
        }
    }
}

/// Complete session configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Board
    pub board: BoardConfig,
    /// Patient flow
    pub patients: PatientConfig,
    /// Economy amounts
    pub economy: EconomyConfig,
    /// Roster and staffing rules
    pub staffing: StaffingConfig,
    /// Call-for-help tiers
    pub assist: AssistConfig,
}

impl SimConfig {
    /// Check every section.
    ///
    /// # Errors
    ///
    /// The first violated invariant.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_board()?;
        self.validate_patients()?;
        self.validate_economy()?;
        self.validate_staffing()?;
        self.validate_assist()?;
        Ok(())
    }

    fn validate_board(&self) -> Result<(), ConfigError> {
        if self.board.size < MIN_BOARD_SIZE {
            return Err(ConfigError::BoardTooSmall {
                size: self.board.size,
                min: MIN_BOARD_SIZE,
            });
        }
        if self.board.max_resolve_passes == 0 {
            return Err(ConfigError::Zero {
                field: "board.max_resolve_passes",
            });
        }
        Ok(())
    }

    fn validate_patients(&self) -> Result<(), ConfigError> {
        if self.patients.active_target == 0 {
            return Err(ConfigError::Zero {
                field: "patients.active_target",
            });
        }
        let odds = &self.patients.lane_odds;
        for (field, value) in [
            ("patients.lane_odds.emergency", odds.emergency),
            ("patients.lane_odds.emergency_evening", odds.emergency_evening),
            ("patients.lane_odds.express", odds.express),
            ("patients.lane_odds.priority", odds.priority),
            ("patients.lane_odds.after_hours_express", odds.after_hours_express),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Probability { field, value });
            }
        }
        Ok(())
    }

    fn validate_economy(&self) -> Result<(), ConfigError> {
        let economy = &self.economy;
        if economy.starting_points <= 0 {
            return Err(ConfigError::Zero {
                field: "economy.starting_points",
            });
        }
        check_max("economy.starting_morale", i64::from(economy.starting_morale), 100)?;
        check_max(
            "economy.complaint_penalty_percent",
            economy.complaint_penalty_percent,
            100,
        )?;
        check_max("economy.left_penalty_percent", economy.left_penalty_percent, 100)?;
        Ok(())
    }

    fn validate_staffing(&self) -> Result<(), ConfigError> {
        let staffing = &self.staffing;
        if staffing.consultants.is_empty() {
            return Err(ConfigError::EmptyRoster { what: "consultant" });
        }
        if staffing.managers.is_empty() {
            return Err(ConfigError::EmptyRoster { what: "manager" });
        }
        for consultant in &staffing.consultants {
            check_shift(&consultant.name, consultant.shift)?;
        }
        check_shift("business hours", staffing.business_hours)?;
        check_shift("day management", staffing.day_window)?;
        check_max(
            "staffing.completion_stamina_cost",
            i64::from(staffing.completion_stamina_cost),
            i64::from(MAX_STAMINA),
        )?;
        for manager in &staffing.managers {
            if let Some(ability) = &manager.ability {
                if ability.duration_ticks == 0 {
                    return Err(ConfigError::Zero {
                        field: "staffing.managers.ability.duration_ticks",
                    });
                }
                check_max(
                    "staffing.managers.ability.stamina_cost",
                    i64::from(ability.stamina_cost),
                    i64::from(MAX_STAMINA),
                )?;
            }
        }
        Ok(())
    }

    fn validate_assist(&self) -> Result<(), ConfigError> {
        for (field, tier) in [
            ("assist.solo", &self.assist.solo),
            ("assist.pair", &self.assist.pair),
            ("assist.team", &self.assist.team),
        ] {
            if tier.duration_ms == 0 {
                return Err(ConfigError::Zero { field });
            }
            if tier.rearrange_interval_ms == Some(0) {
                return Err(ConfigError::Zero { field });
            }
            check_max(field, i64::from(tier.stamina_cost), i64::from(MAX_STAMINA))?;
        }
        Ok(())
    }
}

fn check_max(field: &'static str, value: i64, max: i64) -> Result<(), ConfigError> {
    if value > max {
        return Err(ConfigError::AboveMaximum { field, max, value });
    }
    Ok(())
}

fn check_shift(owner: &str, window: ShiftWindow) -> Result<(), ConfigError> {
    if !window.is_valid() {
        return Err(ConfigError::InvalidShift {
            owner: owner.to_string(),
            window,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(SimConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_small_board_rejected() {
        let mut config = SimConfig::default();
        config.board.size = 2;
        assert_eq!(
            config.validate(),
            Err(ConfigError::BoardTooSmall { size: 2, min: 3 })
        );
    }

    #[test]
    fn test_bad_probability_rejected() {
        let mut config = SimConfig::default();
        config.patients.lane_odds.express = 1.5;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Probability { value, .. }) if (value - 1.5).abs() < f64::EPSILON
        ));
    }

    #[test]
    fn test_invalid_shift_rejected() {
        let mut config = SimConfig::default();
        config.staffing.consultants[0].shift = ShiftWindow::new(7, 25);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidShift { .. })
        ));
    }

    #[test]
    fn test_empty_managers_rejected() {
        let mut config = SimConfig::default();
        config.staffing.managers.clear();
        assert_eq!(
            config.validate(),
            Err(ConfigError::EmptyRoster { what: "manager" })
        );
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: SimConfig =
            serde_json::from_str(r#"{"board":{"size":6},"economy":{"starting_points":250}}"#).unwrap();
        assert_eq!(config.board.size, 6);
        assert_eq!(config.board.max_resolve_passes, DEFAULT_MAX_RESOLVE_PASSES);
        assert_eq!(config.economy.starting_points, 250);
        assert_eq!(config.economy.completion_points, 50);
        assert_eq!(config.staffing.consultants.len(), 5);
        assert!(config.validate().is_ok());
    }
}
