//! Errors returned by simulation intents.
//!
//! Every intent that can be refused returns `Result<_, CommandError>`. An
//! `Err` always means the simulation state is unchanged.

use thiserror::Error;

use crate::patient::PatientId;
use crate::staffing::ConsultantId;

/// Why an intent was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    /// The session is over.
    #[error("the game is over")]
    GameOver,
    /// No patient with this id is present.
    #[error("no patient with id {0}")]
    UnknownPatient(PatientId),
    /// The patient is not waiting for service.
    #[error("patient {0} is not waiting")]
    PatientNotWaiting(PatientId),
    /// No consultant with this id exists.
    #[error("no consultant with id {0}")]
    UnknownConsultant(ConsultantId),
    /// The consultant cannot take an order right now.
    #[error("consultant {0} is not available")]
    ConsultantUnavailable(ConsultantId),
    /// Nobody is free to answer a call for help.
    #[error("no consultant is available to help")]
    NoHelpersAvailable,
    /// A call for help is already running.
    #[error("a call for help is already in progress")]
    AssistInProgress,
    /// There is no call for help to end.
    #[error("no call for help is in progress")]
    NoAssistInProgress,
    /// No manager is on duty.
    #[error("no manager is on duty")]
    NoManagerOnDuty,
    /// The manager on duty has no ability by that name.
    #[error("the manager on duty has no ability named {0:?}")]
    UnknownAbility(String),
    /// The ability has not been unlocked yet.
    #[error("{0} is still locked")]
    AbilityLocked(String),
    /// Another ability effect is still running.
    #[error("an ability effect is already active")]
    AbilityActive,
    /// The manager is too tired.
    #[error("ability needs {needed} stamina, manager has {available}")]
    InsufficientStamina {
        /// Stamina the ability costs
        needed: u8,
        /// Stamina the manager has
        available: u8,
    },
}
