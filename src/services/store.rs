use crate::models::{Event, Invitation, InvitationStatus, Volunteer};
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::future::Future;
use thiserror::Error;

/// Errors that can occur while reading or writing match data
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrateError(#[from] sqlx::migrate::MigrateError),

    #[error("Corrupt record: {0}")]
    Corrupt(String),
}

/// Result of moving a pending invitation to its final state
#[derive(Debug, Clone, PartialEq)]
pub enum InvitationTransition {
    Updated(Invitation),
    NotFound,
    AlreadyResponded(InvitationStatus),
    EventFull,
}

/// Read interfaces the matching engine depends on, plus the invitation
/// writes
///
/// `respond_invitation` must be atomic: accepting checks capacity, registers
/// the volunteer, increments the event count and marks the invitation in one
/// step so concurrent acceptances cannot overbook an event.
pub trait MatchStore: Send + Sync {
    fn get_event(&self, event_id: &str)
        -> impl Future<Output = Result<Option<Event>, StoreError>> + Send;

    fn get_volunteer(
        &self,
        volunteer_id: &str,
    ) -> impl Future<Output = Result<Option<Volunteer>, StoreError>> + Send;

    /// Every volunteer with profile, skills, availability and preference
    fn list_volunteers(&self) -> impl Future<Output = Result<Vec<Volunteer>, StoreError>> + Send;

    /// Active events that still have capacity
    fn list_open_events(&self) -> impl Future<Output = Result<Vec<Event>, StoreError>> + Send;

    /// Volunteers registered for or invited to the event
    fn excluded_volunteer_ids(
        &self,
        event_id: &str,
    ) -> impl Future<Output = Result<HashSet<String>, StoreError>> + Send;

    /// Events the volunteer is registered for or invited to
    fn excluded_event_ids(
        &self,
        volunteer_id: &str,
    ) -> impl Future<Output = Result<HashSet<String>, StoreError>> + Send;

    fn get_invitation(
        &self,
        invitation_id: &str,
    ) -> impl Future<Output = Result<Option<Invitation>, StoreError>> + Send;

    fn find_invitation(
        &self,
        event_id: &str,
        volunteer_id: &str,
    ) -> impl Future<Output = Result<Option<Invitation>, StoreError>> + Send;

    /// Returns `false` when the pair already has an invitation
    fn insert_invitation(
        &self,
        invitation: &Invitation,
    ) -> impl Future<Output = Result<bool, StoreError>> + Send;

    fn respond_invitation(
        &self,
        invitation_id: &str,
        accept: bool,
        responded_at: DateTime<Utc>,
    ) -> impl Future<Output = Result<InvitationTransition, StoreError>> + Send;
}
