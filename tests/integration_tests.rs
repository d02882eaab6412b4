// Integration tests for the matching engine

mod common;

use common::*;
use std::sync::Arc;
use volu_match::core::{DistanceError, DistanceProvider, ZipDistanceEstimator, MIN_MATCH_SCORE};
use volu_match::models::{Address, Availability, EventStatus, Invitation, InvitationStatus, ScoringWeights};
use volu_match::services::{MatchStore, MatchingEngine, MemoryStore};
use volu_match::MatchError;

/// Distance provider that always fails, as an unreachable geocoder would
struct UnreachableGeocoder;

impl DistanceProvider for UnreachableGeocoder {
    async fn distance_miles(&self, _from: &Address, _to: &Address) -> Result<f64, DistanceError> {
        Err(DistanceError::GeocodingUnavailable("connection refused".to_string()))
    }
}

fn engine(store: &Arc<MemoryStore>) -> MatchingEngine<MemoryStore, ZipDistanceEstimator> {
    MatchingEngine::new(Arc::clone(store), ZipDistanceEstimator)
}

async fn seeded_store() -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    store.put_event(create_event("e1", &["Cooking"], "77002")).await;
    store.put_volunteer(create_volunteer("v1", &["Cooking"], "77002")).await; // Same zip
    store.put_volunteer(create_volunteer("v2", &["first_aid"], "10001")).await; // Wrong skill, far away
    store.put_volunteer(create_volunteer("v3", &["cooking"], "77010")).await; // Same area, 13 miles
    store
}

#[tokio::test]
async fn test_end_to_end_event_matching() {
    let store = seeded_store().await;

    let matches = engine(&store).find_matches_for_event_on("e1", today()).await.unwrap();

    let ids: Vec<&str> = matches.iter().map(|m| m.volunteer_id.as_str()).collect();
    assert_eq!(ids, vec!["v1", "v3"]);

    let best = &matches[0];
    assert_eq!(best.volunteer_name, "Volunteer v1");
    assert_eq!(best.event_name, "Event e1");
    assert_close(best.skill_match_percentage, 1.0);
    assert_close(best.location_match_percentage, 0.96);
    assert_close(best.availability_match_percentage, 1.0);
    assert_close(best.causes_match_percentage, 0.5);
    assert_close(best.preferences_match_percentage, 0.5);
    assert_close(best.match_score, 0.89);
    assert_close(best.match_details.distance, 1.0);
    assert_eq!(best.match_details.matched_skills, strings(&["Cooking"]));

    // 1 - 13/25 = 0.48
    assert_close(matches[1].location_match_percentage, 0.48);
    assert_close(matches[1].match_score, 0.77);
}

#[tokio::test]
async fn test_results_meet_threshold_and_are_sorted() {
    let store = seeded_store().await;
    store.put_volunteer(create_volunteer("v4", &[], "77002")).await;
    store.put_volunteer(create_volunteer("v5", &["Cooking"], "")).await;

    let matches = engine(&store).find_matches_for_event_on("e1", today()).await.unwrap();

    assert!(!matches.is_empty());
    for pair in matches.windows(2) {
        assert!(pair[0].match_score >= pair[1].match_score);
    }

    let weights = ScoringWeights::FIXED;
    for m in &matches {
        assert!(m.match_score >= MIN_MATCH_SCORE);
        for score in [
            m.match_score,
            m.skill_match_percentage,
            m.location_match_percentage,
            m.availability_match_percentage,
            m.causes_match_percentage,
            m.preferences_match_percentage,
        ] {
            assert!((0.0..=1.0).contains(&score));
        }

        let weighted = m.skill_match_percentage * weights.skills
            + m.location_match_percentage * weights.location
            + m.availability_match_percentage * weights.availability
            + m.causes_match_percentage * weights.causes
            + m.preferences_match_percentage * weights.preferences;
        assert_close(m.match_score, weighted);
    }
}

#[tokio::test]
async fn test_wrong_skill_scores_zero() {
    let store = seeded_store().await;
    // v2 only misses on skills here; same zip as the event
    store.put_volunteer(create_volunteer("v2", &["first_aid"], "77002")).await;

    let matches = engine(&store).find_matches_for_event_on("e1", today()).await.unwrap();

    let v2 = matches.iter().find(|m| m.volunteer_id == "v2").unwrap();
    assert_close(v2.skill_match_percentage, 0.0);
    assert!(v2.match_details.matched_skills.is_empty());
    // 0 + 0.24 + 0.2 + 0.075 + 0.025
    assert_close(v2.match_score, 0.54);
}

#[tokio::test]
async fn test_event_without_requirements_matches_any_skills() {
    let store = Arc::new(MemoryStore::new());
    store.put_event(create_event("e1", &[], "77002")).await;
    store.put_volunteer(create_volunteer("v1", &["Painting", "Driving"], "77002")).await;

    let matches = engine(&store).find_matches_for_event_on("e1", today()).await.unwrap();

    assert_eq!(matches.len(), 1);
    assert_close(matches[0].skill_match_percentage, 1.0);
    assert_eq!(matches[0].match_details.matched_skills, strings(&["Painting", "Driving"]));
}

#[tokio::test]
async fn test_virtual_event_ignores_location() {
    let store = Arc::new(MemoryStore::new());
    let mut event = create_event("e1", &["Cooking"], "77002");
    event.is_virtual = true;
    store.put_event(event).await;
    store.put_volunteer(create_volunteer("v1", &["Cooking"], "10001")).await;
    store.put_volunteer(create_volunteer("v2", &["Cooking"], "")).await;

    let matches = engine(&store).find_matches_for_event_on("e1", today()).await.unwrap();

    assert_eq!(matches.len(), 2);
    for m in &matches {
        assert_close(m.location_match_percentage, 1.0);
        assert_close(m.match_details.distance, 0.0);
    }
}

#[tokio::test]
async fn test_missing_address_uses_fallback_location() {
    let store = Arc::new(MemoryStore::new());
    store.put_event(create_event("e1", &["Cooking"], "77002")).await;
    let mut volunteer = create_volunteer("v1", &["Cooking"], "77002");
    volunteer.address.city = None;
    store.put_volunteer(volunteer).await;

    let matches = engine(&store).find_matches_for_event_on("e1", today()).await.unwrap();

    assert_close(matches[0].location_match_percentage, 0.1);
    assert_close(matches[0].match_details.distance, 999.0);
}

#[tokio::test]
async fn test_distance_failure_degrades_instead_of_failing() {
    let store = seeded_store().await;
    let engine = MatchingEngine::new(Arc::clone(&store), UnreachableGeocoder);

    let matches = engine.find_matches_for_event_on("e1", today()).await.unwrap();

    let v1 = matches.iter().find(|m| m.volunteer_id == "v1").unwrap();
    assert_close(v1.location_match_percentage, 0.1);
    assert_close(v1.match_details.distance, 999.0);
    // 0.35 + 0.025 + 0.2 + 0.075 + 0.025
    assert_close(v1.match_score, 0.675);
}

#[tokio::test]
async fn test_blackout_date_halves_availability() {
    let store = Arc::new(MemoryStore::new());
    store.put_event(create_event("e1", &["Cooking"], "77002")).await;
    let mut volunteer = create_volunteer("v1", &["Cooking"], "77002");
    volunteer.availability = Some(Availability {
        blackout_dates: vec![event_day()],
        ..Availability::default()
    });
    store.put_volunteer(volunteer).await;

    let matches = engine(&store).find_matches_for_event_on("e1", today()).await.unwrap();

    assert_close(matches[0].availability_match_percentage, 0.5);
    assert_eq!(matches[0].match_details.availability_conflicts.len(), 1);
}

#[tokio::test]
async fn test_short_notice_is_penalized() {
    let store = Arc::new(MemoryStore::new());
    store.put_event(create_event("e1", &["Cooking"], "77002")).await;
    let mut volunteer = create_volunteer("v1", &["Cooking"], "77002");
    volunteer.availability = Some(Availability {
        minimum_notice_days: 30,
        ..Availability::default()
    });
    store.put_volunteer(volunteer).await;

    let matches = engine(&store).find_matches_for_event_on("e1", today()).await.unwrap();

    assert_close(matches[0].availability_match_percentage, 0.8);
    assert_eq!(
        matches[0].match_details.availability_conflicts,
        strings(&["Event is in 15 days, but volunteer requires 30 days notice"])
    );
}

#[tokio::test]
async fn test_opted_out_volunteers_are_skipped() {
    let store = seeded_store().await;
    let mut hidden = create_volunteer("v9", &["Cooking"], "77002");
    hidden.profile_visible = Some(false);
    store.put_volunteer(hidden).await;

    let matches = engine(&store).find_matches_for_event_on("e1", today()).await.unwrap();

    assert!(matches.iter().all(|m| m.volunteer_id != "v9"));
}

#[tokio::test]
async fn test_incomplete_profile_still_scored() {
    let store = Arc::new(MemoryStore::new());
    store.put_event(create_event("e1", &["Cooking"], "77002")).await;
    let mut volunteer = create_volunteer("v1", &["Cooking"], "77002");
    volunteer.availability = None;
    store.put_volunteer(volunteer).await;

    let matches = engine(&store).find_matches_for_event_on("e1", today()).await.unwrap();

    assert_eq!(matches.len(), 1);
    assert_close(matches[0].availability_match_percentage, 0.5);
    assert_eq!(
        matches[0].match_details.availability_conflicts,
        strings(&["No availability data"])
    );
}

#[tokio::test]
async fn test_registered_volunteers_excluded_both_ways() {
    let store = seeded_store().await;
    assert!(store.register("e1", "v1").await);

    let engine = engine(&store);

    let for_event = engine.find_matches_for_event_on("e1", today()).await.unwrap();
    assert!(for_event.iter().all(|m| m.volunteer_id != "v1"));

    let for_volunteer = engine.find_matches_for_volunteer_on("v1", today()).await.unwrap();
    assert!(for_volunteer.iter().all(|m| m.event_id != "e1"));
}

#[tokio::test]
async fn test_invited_volunteers_excluded_both_ways() {
    let store = seeded_store().await;
    let invitation = Invitation {
        id: "inv-1".to_string(),
        event_id: "e1".to_string(),
        volunteer_id: "v1".to_string(),
        message: "Join us".to_string(),
        status: InvitationStatus::Declined,
        created_at: chrono::Utc::now(),
        responded_at: Some(chrono::Utc::now()),
    };
    assert!(store.insert_invitation(&invitation).await.unwrap());

    let engine = engine(&store);

    let for_event = engine.find_matches_for_event_on("e1", today()).await.unwrap();
    assert!(for_event.iter().all(|m| m.volunteer_id != "v1"));

    let for_volunteer = engine.find_matches_for_volunteer_on("v1", today()).await.unwrap();
    assert!(for_volunteer.is_empty());
}

#[tokio::test]
async fn test_volunteer_matching_only_returns_open_events() {
    let store = Arc::new(MemoryStore::new());
    store.put_volunteer(create_volunteer("v1", &["Cooking"], "77002")).await;

    store.put_event(create_event("open", &["Cooking"], "77002")).await;
    let mut draft = create_event("draft", &["Cooking"], "77002");
    draft.status = EventStatus::Draft;
    store.put_event(draft).await;
    let mut full = create_event("full", &["Cooking"], "77002");
    full.max_volunteers = Some(2);
    full.current_volunteers = 2;
    store.put_event(full).await;
    let mut unlimited = create_event("unlimited", &["Cooking"], "77005");
    unlimited.max_volunteers = None;
    unlimited.current_volunteers = 500;
    store.put_event(unlimited).await;

    let matches = engine(&store).find_matches_for_volunteer_on("v1", today()).await.unwrap();

    let ids: Vec<&str> = matches.iter().map(|m| m.event_id.as_str()).collect();
    assert_eq!(ids, vec!["open", "unlimited"]);
}

#[tokio::test]
async fn test_equal_scores_keep_candidate_order() {
    let store = Arc::new(MemoryStore::new());
    store.put_event(create_event("e1", &["Cooking"], "77002")).await;
    for id in ["a", "b", "c"] {
        store.put_volunteer(create_volunteer(id, &["Cooking"], "77002")).await;
    }

    let matches = engine(&store).find_matches_for_event_on("e1", today()).await.unwrap();

    let ids: Vec<&str> = matches.iter().map(|m| m.volunteer_id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b", "c"]);
}

#[tokio::test]
async fn test_unknown_ids_are_not_found() {
    let store = seeded_store().await;
    let engine = engine(&store);

    let result = engine.find_matches_for_event_on("missing", today()).await;
    assert!(matches!(result, Err(MatchError::NotFound(_))));

    let result = engine.find_matches_for_volunteer_on("missing", today()).await;
    assert!(matches!(result, Err(MatchError::NotFound(_))));
}

#[tokio::test]
async fn test_queries_do_not_modify_store() {
    let store = seeded_store().await;
    let engine = engine(&store);

    let first = engine.find_matches_for_event_on("e1", today()).await.unwrap();
    let second = engine.find_matches_for_event_on("e1", today()).await.unwrap();

    assert_eq!(first, second);
    let event = store.get_event("e1").await.unwrap().unwrap();
    assert_eq!(event.current_volunteers, 0);
}
