use crate::core::DistanceError;
use crate::services::StoreError;
use thiserror::Error;

/// Errors returned by match queries and the invitation workflow
#[derive(Debug, Error)]
pub enum MatchError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Volunteer has already been invited to this event")]
    AlreadyInvited,

    #[error("Volunteer is already registered for this event")]
    AlreadyRegistered,

    #[error("Invitation has already been {0}")]
    AlreadyResponded(String),

    #[error("This event is already full")]
    EventFull,

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
}

impl MatchError {
    pub fn event_not_found(event_id: &str) -> Self {
        MatchError::NotFound(format!("Event with ID {} not found", event_id))
    }

    pub fn volunteer_not_found(volunteer_id: &str) -> Self {
        MatchError::NotFound(format!("Volunteer with ID {} not found", volunteer_id))
    }

    pub fn invitation_not_found(invitation_id: &str) -> Self {
        MatchError::NotFound(format!("Invitation with ID {} not found", invitation_id))
    }
}

/// Errors raised while wiring the engine from configuration
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error("Distance provider error: {0}")]
    Distance(#[from] DistanceError),

    #[error("Logging setup error: {0}")]
    Telemetry(String),
}
