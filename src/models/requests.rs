use serde::{Deserialize, Serialize};
use validator::Validate;

pub const DEFAULT_INVITATION_MESSAGE: &str = "You've been invited to volunteer for this event!";

/// Request to invite a volunteer to an event
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct InvitationRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "event_id", rename = "eventId")]
    pub event_id: String,
    #[validate(length(min = 1))]
    #[serde(alias = "volunteer_id", rename = "volunteerId")]
    pub volunteer_id: String,
    #[validate(length(max = 500))]
    #[serde(default)]
    pub message: Option<String>,
}

impl InvitationRequest {
    pub fn new(event_id: impl Into<String>, volunteer_id: impl Into<String>) -> Self {
        Self {
            event_id: event_id.into(),
            volunteer_id: volunteer_id.into(),
            message: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Message to store, blank messages fall back to the default text
    pub fn message_or_default(&self) -> String {
        self.message
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or(DEFAULT_INVITATION_MESSAGE)
            .to_string()
    }
}

/// Response to a pending invitation
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct InvitationResponseRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "invitation_id", rename = "invitationId")]
    pub invitation_id: String,
    pub accept: bool,
}
