use crate::core::distance::DistanceProvider;
use crate::core::filters::{is_open_event, needs_distance, volunteer_eligibility};
use crate::core::Matcher;
use crate::error::MatchError;
use crate::models::{Event, MatchEligibility, MatchResult, Volunteer};
use crate::services::store::MatchStore;
use chrono::{NaiveDate, Utc};
use std::sync::Arc;

/// Ranks volunteers for an event, or events for a volunteer
///
/// Every query reads a fresh snapshot from the store and writes nothing.
pub struct MatchingEngine<S, D> {
    store: Arc<S>,
    distance: D,
    matcher: Matcher,
}

impl<S: MatchStore, D: DistanceProvider> MatchingEngine<S, D> {
    pub fn new(store: Arc<S>, distance: D) -> Self {
        Self {
            store,
            distance,
            matcher: Matcher::new(),
        }
    }

    /// Find volunteers for an event, best match first
    pub async fn find_matches_for_event(&self, event_id: &str) -> Result<Vec<MatchResult>, MatchError> {
        self.find_matches_for_event_on(event_id, Utc::now().date_naive()).await
    }

    /// Same as [`find_matches_for_event`](Self::find_matches_for_event) with
    /// an explicit reference date for notice-period checks
    pub async fn find_matches_for_event_on(
        &self,
        event_id: &str,
        today: NaiveDate,
    ) -> Result<Vec<MatchResult>, MatchError> {
        let event = self
            .store
            .get_event(event_id)
            .await?
            .ok_or_else(|| MatchError::event_not_found(event_id))?;

        let volunteers = self.store.list_volunteers().await?;
        let excluded = self.store.excluded_volunteer_ids(event_id).await?;
        let total_candidates = volunteers.len();

        tracing::info!(
            "Finding matches for event {} ({} volunteers, {} already registered or invited)",
            event_id,
            total_candidates,
            excluded.len()
        );

        let mut matches = Vec::new();
        for volunteer in &volunteers {
            if excluded.contains(&volunteer.id) {
                continue;
            }

            let eligibility = volunteer_eligibility(volunteer);
            if !eligibility.is_matchable() {
                tracing::debug!("Skipping volunteer {}: opted out of matching", volunteer.id);
                continue;
            }
            if let MatchEligibility::IncompleteProfile { missing } = &eligibility {
                tracing::debug!("Volunteer {} has incomplete profile: {:?}", volunteer.id, missing);
            }

            if let Some(result) = self.score_pair(volunteer, &event, today).await {
                matches.push(result);
            }
        }

        let matches = self.matcher.rank(matches);

        tracing::info!(
            "Returning {} matches for event {} (from {} candidates)",
            matches.len(),
            event_id,
            total_candidates
        );

        Ok(matches)
    }

    /// Find open events for a volunteer, best match first
    pub async fn find_matches_for_volunteer(
        &self,
        volunteer_id: &str,
    ) -> Result<Vec<MatchResult>, MatchError> {
        self.find_matches_for_volunteer_on(volunteer_id, Utc::now().date_naive())
            .await
    }

    /// Same as [`find_matches_for_volunteer`](Self::find_matches_for_volunteer)
    /// with an explicit reference date
    pub async fn find_matches_for_volunteer_on(
        &self,
        volunteer_id: &str,
        today: NaiveDate,
    ) -> Result<Vec<MatchResult>, MatchError> {
        let volunteer = self
            .store
            .get_volunteer(volunteer_id)
            .await?
            .ok_or_else(|| MatchError::volunteer_not_found(volunteer_id))?;

        let events = self.store.list_open_events().await?;
        let excluded = self.store.excluded_event_ids(volunteer_id).await?;
        let total_candidates = events.len();

        tracing::info!(
            "Finding matches for volunteer {} ({} open events, {} already registered or invited)",
            volunteer_id,
            total_candidates,
            excluded.len()
        );

        let mut matches = Vec::new();
        // The store already filters, but a snapshot may race a status change
        for event in events.iter().filter(|e| is_open_event(e)) {
            if excluded.contains(&event.id) {
                continue;
            }

            if let Some(result) = self.score_pair(&volunteer, event, today).await {
                matches.push(result);
            }
        }

        let matches = self.matcher.rank(matches);

        tracing::info!(
            "Returning {} matches for volunteer {} (from {} events)",
            matches.len(),
            volunteer_id,
            total_candidates
        );

        Ok(matches)
    }

    async fn score_pair(&self, volunteer: &Volunteer, event: &Event, today: NaiveDate) -> Option<MatchResult> {
        let distance = self.resolve_distance(volunteer, event).await;
        self.matcher.evaluate(volunteer, event, distance, today)
    }

    /// Distance for in-person pairs; lookup failures degrade to the
    /// missing-location score instead of failing the query
    async fn resolve_distance(&self, volunteer: &Volunteer, event: &Event) -> Option<f64> {
        if !needs_distance(volunteer, event) {
            return None;
        }

        match self.distance.distance_miles(&volunteer.address, &event.address).await {
            Ok(miles) => Some(miles),
            Err(e) => {
                tracing::warn!(
                    "Distance lookup failed for volunteer {} and event {}, using fallback score: {}",
                    volunteer.id,
                    event.id,
                    e
                );
                None
            }
        }
    }
}
