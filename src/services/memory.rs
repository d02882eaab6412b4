use crate::core::filters::is_open_event;
use crate::models::{Event, Invitation, InvitationStatus, Volunteer};
use crate::services::store::{InvitationTransition, MatchStore, StoreError};
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct MemoryState {
    volunteers: Vec<Volunteer>,
    events: Vec<Event>,
    registrations: HashSet<(String, String)>,
    invitations: Vec<Invitation>,
}

/// In-process store for tests and embedding applications
///
/// Records keep insertion order, which is the candidate order the engine
/// sees. All writes happen under a single lock.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a volunteer
    pub async fn put_volunteer(&self, volunteer: Volunteer) {
        let mut state = self.state.write().await;
        match state.volunteers.iter_mut().find(|v| v.id == volunteer.id) {
            Some(existing) => *existing = volunteer,
            None => state.volunteers.push(volunteer),
        }
    }

    /// Insert or replace an event
    pub async fn put_event(&self, event: Event) {
        let mut state = self.state.write().await;
        match state.events.iter_mut().find(|e| e.id == event.id) {
            Some(existing) => *existing = event,
            None => state.events.push(event),
        }
    }

    /// Register a volunteer directly, with the same capacity guard as an
    /// accepted invitation
    ///
    /// Returns `false` when the event is unknown, full, or the volunteer is
    /// already registered.
    pub async fn register(&self, event_id: &str, volunteer_id: &str) -> bool {
        let mut guard = self.state.write().await;
        let state = &mut *guard;
        let key = (event_id.to_string(), volunteer_id.to_string());
        if state.registrations.contains(&key) {
            return false;
        }
        let Some(event) = state.events.iter_mut().find(|e| e.id == event_id) else {
            return false;
        };
        if !event.has_capacity() {
            return false;
        }
        event.current_volunteers += 1;
        state.registrations.insert(key);
        true
    }

    pub async fn is_registered(&self, event_id: &str, volunteer_id: &str) -> bool {
        let state = self.state.read().await;
        state
            .registrations
            .contains(&(event_id.to_string(), volunteer_id.to_string()))
    }
}

impl MatchStore for MemoryStore {
    async fn get_event(&self, event_id: &str) -> Result<Option<Event>, StoreError> {
        let state = self.state.read().await;
        Ok(state.events.iter().find(|e| e.id == event_id).cloned())
    }

    async fn get_volunteer(&self, volunteer_id: &str) -> Result<Option<Volunteer>, StoreError> {
        let state = self.state.read().await;
        Ok(state.volunteers.iter().find(|v| v.id == volunteer_id).cloned())
    }

    async fn list_volunteers(&self) -> Result<Vec<Volunteer>, StoreError> {
        Ok(self.state.read().await.volunteers.clone())
    }

    async fn list_open_events(&self) -> Result<Vec<Event>, StoreError> {
        let state = self.state.read().await;
        Ok(state.events.iter().filter(|e| is_open_event(e)).cloned().collect())
    }

    async fn excluded_volunteer_ids(&self, event_id: &str) -> Result<HashSet<String>, StoreError> {
        let state = self.state.read().await;
        let registered = state
            .registrations
            .iter()
            .filter(|(event, _)| event == event_id)
            .map(|(_, volunteer)| volunteer.clone());
        let invited = state
            .invitations
            .iter()
            .filter(|i| i.event_id == event_id)
            .map(|i| i.volunteer_id.clone());
        Ok(registered.chain(invited).collect())
    }

    async fn excluded_event_ids(&self, volunteer_id: &str) -> Result<HashSet<String>, StoreError> {
        let state = self.state.read().await;
        let registered = state
            .registrations
            .iter()
            .filter(|(_, volunteer)| volunteer == volunteer_id)
            .map(|(event, _)| event.clone());
        let invited = state
            .invitations
            .iter()
            .filter(|i| i.volunteer_id == volunteer_id)
            .map(|i| i.event_id.clone());
        Ok(registered.chain(invited).collect())
    }

    async fn get_invitation(&self, invitation_id: &str) -> Result<Option<Invitation>, StoreError> {
        let state = self.state.read().await;
        Ok(state.invitations.iter().find(|i| i.id == invitation_id).cloned())
    }

    async fn find_invitation(
        &self,
        event_id: &str,
        volunteer_id: &str,
    ) -> Result<Option<Invitation>, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .invitations
            .iter()
            .find(|i| i.event_id == event_id && i.volunteer_id == volunteer_id)
            .cloned())
    }

    async fn insert_invitation(&self, invitation: &Invitation) -> Result<bool, StoreError> {
        let mut state = self.state.write().await;
        let duplicate = state.invitations.iter().any(|i| {
            i.id == invitation.id
                || (i.event_id == invitation.event_id && i.volunteer_id == invitation.volunteer_id)
        });
        if duplicate {
            return Ok(false);
        }
        state.invitations.push(invitation.clone());
        Ok(true)
    }

    async fn respond_invitation(
        &self,
        invitation_id: &str,
        accept: bool,
        responded_at: DateTime<Utc>,
    ) -> Result<InvitationTransition, StoreError> {
        let mut guard = self.state.write().await;
        let state = &mut *guard;

        let Some(invitation) = state.invitations.iter_mut().find(|i| i.id == invitation_id) else {
            return Ok(InvitationTransition::NotFound);
        };
        if invitation.status != InvitationStatus::Pending {
            return Ok(InvitationTransition::AlreadyResponded(invitation.status));
        }

        if accept {
            let key = (invitation.event_id.clone(), invitation.volunteer_id.clone());
            // A volunteer registered by other means already holds a seat
            if !state.registrations.contains(&key) {
                let event = state
                    .events
                    .iter_mut()
                    .find(|e| e.id == invitation.event_id)
                    .ok_or_else(|| StoreError::Corrupt(format!("invitation {} has no event", invitation.id)))?;
                if !event.has_capacity() {
                    return Ok(InvitationTransition::EventFull);
                }
                event.current_volunteers += 1;
                state.registrations.insert(key);
            }
            invitation.status = InvitationStatus::Accepted;
        } else {
            invitation.status = InvitationStatus::Declined;
        }

        invitation.responded_at = Some(responded_at);
        Ok(InvitationTransition::Updated(invitation.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Address, EventStatus, EventType};
    use chrono::{NaiveDate, NaiveTime};

    fn create_event(id: &str, status: EventStatus, max: Option<u32>) -> Event {
        let date = NaiveDate::from_ymd_opt(2030, 5, 4).unwrap();
        Event {
            id: id.to_string(),
            name: format!("Event {}", id),
            required_skills: vec![],
            address: Address::default(),
            is_virtual: true,
            start_date: date,
            end_date: date,
            start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(11, 0, 0).unwrap(),
            causes: vec![],
            max_volunteers: max,
            current_volunteers: 0,
            event_type: EventType::OneTime,
            status,
        }
    }

    fn create_invitation(id: &str, event_id: &str, volunteer_id: &str) -> Invitation {
        Invitation {
            id: id.to_string(),
            event_id: event_id.to_string(),
            volunteer_id: volunteer_id.to_string(),
            message: "Join us".to_string(),
            status: InvitationStatus::Pending,
            created_at: Utc::now(),
            responded_at: None,
        }
    }

    #[tokio::test]
    async fn test_open_events_filtered() {
        let store = MemoryStore::new();
        store.put_event(create_event("active", EventStatus::Active, None)).await;
        store.put_event(create_event("draft", EventStatus::Draft, None)).await;
        store.put_event(create_event("full", EventStatus::Active, Some(0))).await;

        let open = store.list_open_events().await.unwrap();
        let ids: Vec<&str> = open.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["active"]);
    }

    #[tokio::test]
    async fn test_register_respects_capacity() {
        let store = MemoryStore::new();
        store.put_event(create_event("e1", EventStatus::Active, Some(1))).await;

        assert!(store.register("e1", "v1").await);
        assert!(!store.register("e1", "v1").await);
        assert!(!store.register("e1", "v2").await);
        assert!(!store.register("missing", "v1").await);

        let event = store.get_event("e1").await.unwrap().unwrap();
        assert_eq!(event.current_volunteers, 1);
    }

    #[tokio::test]
    async fn test_exclusions_cover_registrations_and_invitations() {
        let store = MemoryStore::new();
        store.put_event(create_event("e1", EventStatus::Active, None)).await;
        store.register("e1", "v1").await;
        store
            .insert_invitation(&create_invitation("i1", "e1", "v2"))
            .await
            .unwrap();

        let excluded = store.excluded_volunteer_ids("e1").await.unwrap();
        assert!(excluded.contains("v1") && excluded.contains("v2"));
        assert_eq!(excluded.len(), 2);

        let excluded = store.excluded_event_ids("v2").await.unwrap();
        assert!(excluded.contains("e1"));
    }

    #[tokio::test]
    async fn test_duplicate_invitation_rejected() {
        let store = MemoryStore::new();
        assert!(store.insert_invitation(&create_invitation("i1", "e1", "v1")).await.unwrap());
        assert!(!store.insert_invitation(&create_invitation("i2", "e1", "v1")).await.unwrap());
    }

    #[tokio::test]
    async fn test_accept_is_guarded() {
        let store = MemoryStore::new();
        store.put_event(create_event("e1", EventStatus::Active, Some(1))).await;
        store.insert_invitation(&create_invitation("i1", "e1", "v1")).await.unwrap();
        store.insert_invitation(&create_invitation("i2", "e1", "v2")).await.unwrap();

        let first = store.respond_invitation("i1", true, Utc::now()).await.unwrap();
        assert!(matches!(first, InvitationTransition::Updated(ref i) if i.status == InvitationStatus::Accepted));

        let second = store.respond_invitation("i2", true, Utc::now()).await.unwrap();
        assert_eq!(second, InvitationTransition::EventFull);

        let again = store.respond_invitation("i1", false, Utc::now()).await.unwrap();
        assert_eq!(again, InvitationTransition::AlreadyResponded(InvitationStatus::Accepted));

        assert!(store.is_registered("e1", "v1").await);
        assert!(!store.is_registered("e1", "v2").await);
    }

    #[tokio::test]
    async fn test_accept_for_registered_volunteer_takes_no_seat() {
        let store = MemoryStore::new();
        store.put_event(create_event("e1", EventStatus::Active, Some(1))).await;
        assert!(store.register("e1", "v1").await);
        store.insert_invitation(&create_invitation("i1", "e1", "v1")).await.unwrap();

        // The event is full, but v1 already holds the only seat
        let accepted = store.respond_invitation("i1", true, Utc::now()).await.unwrap();
        assert!(matches!(accepted, InvitationTransition::Updated(ref i) if i.status == InvitationStatus::Accepted));

        let event = store.get_event("e1").await.unwrap().unwrap();
        assert_eq!(event.current_volunteers, 1);
    }
}
