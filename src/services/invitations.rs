use crate::error::MatchError;
use crate::models::{Invitation, InvitationRequest, InvitationResponseRequest, InvitationStatus};
use crate::services::store::{InvitationTransition, MatchStore};
use chrono::Utc;
use std::sync::Arc;
use validator::Validate;

/// Invite volunteers to events and record their answers
///
/// An invitation also excludes the pair from future match queries, whatever
/// its status.
pub struct InvitationService<S> {
    store: Arc<S>,
}

impl<S: MatchStore> InvitationService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Create a pending invitation
    pub async fn invite_volunteer(&self, request: &InvitationRequest) -> Result<Invitation, MatchError> {
        request
            .validate()
            .map_err(|e| MatchError::InvalidRequest(e.to_string()))?;

        if self.store.get_event(&request.event_id).await?.is_none() {
            return Err(MatchError::event_not_found(&request.event_id));
        }
        if self.store.get_volunteer(&request.volunteer_id).await?.is_none() {
            return Err(MatchError::volunteer_not_found(&request.volunteer_id));
        }
        if self
            .store
            .find_invitation(&request.event_id, &request.volunteer_id)
            .await?
            .is_some()
        {
            return Err(MatchError::AlreadyInvited);
        }
        if self
            .store
            .excluded_volunteer_ids(&request.event_id)
            .await?
            .contains(&request.volunteer_id)
        {
            return Err(MatchError::AlreadyRegistered);
        }

        let invitation = Invitation {
            id: uuid::Uuid::new_v4().to_string(),
            event_id: request.event_id.clone(),
            volunteer_id: request.volunteer_id.clone(),
            message: request.message_or_default(),
            status: InvitationStatus::Pending,
            created_at: Utc::now(),
            responded_at: None,
        };

        // A concurrent invite for the same pair loses here
        if !self.store.insert_invitation(&invitation).await? {
            return Err(MatchError::AlreadyInvited);
        }

        tracing::info!(
            "Invited volunteer {} to event {} ({})",
            invitation.volunteer_id,
            invitation.event_id,
            invitation.id
        );

        Ok(invitation)
    }

    /// Accept or decline a pending invitation
    ///
    /// Accepting registers the volunteer and takes one seat; a full event
    /// leaves the invitation pending.
    pub async fn respond_to_invitation(
        &self,
        invitation_id: &str,
        accept: bool,
    ) -> Result<Invitation, MatchError> {
        let transition = self
            .store
            .respond_invitation(invitation_id, accept, Utc::now())
            .await?;

        match transition {
            InvitationTransition::Updated(invitation) => {
                tracing::info!(
                    "Volunteer {} {} invitation to event {}",
                    invitation.volunteer_id,
                    if accept { "accepted" } else { "declined" },
                    invitation.event_id
                );
                Ok(invitation)
            }
            InvitationTransition::NotFound => Err(MatchError::invitation_not_found(invitation_id)),
            InvitationTransition::AlreadyResponded(status) => {
                Err(MatchError::AlreadyResponded(status.as_str().to_lowercase()))
            }
            InvitationTransition::EventFull => {
                tracing::info!("Invitation {} not accepted: event is full", invitation_id);
                Err(MatchError::EventFull)
            }
        }
    }

    /// Validate a response request and apply it
    pub async fn respond(&self, request: &InvitationResponseRequest) -> Result<Invitation, MatchError> {
        request
            .validate()
            .map_err(|e| MatchError::InvalidRequest(e.to_string()))?;

        self.respond_to_invitation(&request.invitation_id, request.accept)
            .await
    }
}
