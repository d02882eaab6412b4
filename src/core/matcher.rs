use crate::core::scoring::{calculate_match_score, MatchScore};
use crate::models::{Event, MatchDetails, MatchResult, ScoringWeights, Volunteer};
use chrono::NaiveDate;

/// Pairs scoring below this composite are never returned
pub const MIN_MATCH_SCORE: f64 = 0.4;

/// Scores single volunteer/event pairs and ranks the survivors
///
/// Weights are fixed; the matcher holds no other state, so one instance can
/// be shared freely between concurrent queries.
#[derive(Debug, Clone)]
pub struct Matcher {
    weights: ScoringWeights,
    min_score: f64,
}

impl Matcher {
    pub fn new() -> Self {
        Self {
            weights: ScoringWeights::FIXED,
            min_score: MIN_MATCH_SCORE,
        }
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    /// Score a pair, keeping it only when it meets the threshold
    pub fn evaluate(
        &self,
        volunteer: &Volunteer,
        event: &Event,
        distance_miles: Option<f64>,
        today: NaiveDate,
    ) -> Option<MatchResult> {
        let score = calculate_match_score(volunteer, event, distance_miles, today, &self.weights);

        if score.total >= self.min_score {
            Some(build_result(volunteer, event, score))
        } else {
            None
        }
    }

    /// Sort by composite score, best first
    ///
    /// The sort is stable, so equal scores keep candidate order.
    pub fn rank(&self, mut matches: Vec<MatchResult>) -> Vec<MatchResult> {
        matches.sort_by(|a, b| b.match_score.total_cmp(&a.match_score));
        matches
    }
}

impl Default for Matcher {
    fn default() -> Self {
        Self::new()
    }
}

fn build_result(volunteer: &Volunteer, event: &Event, score: MatchScore) -> MatchResult {
    MatchResult {
        volunteer_id: volunteer.id.clone(),
        volunteer_name: volunteer.display_name().to_string(),
        volunteer_email: volunteer.email.clone(),
        event_id: event.id.clone(),
        event_name: event.name.clone(),
        match_score: score.total,
        skill_match_percentage: score.skills.percentage,
        location_match_percentage: score.location.percentage,
        availability_match_percentage: score.availability.percentage,
        causes_match_percentage: score.causes.percentage,
        preferences_match_percentage: score.preferences.percentage,
        match_details: MatchDetails {
            matched_skills: score.skills.matched_skills,
            distance: score.location.distance,
            availability_conflicts: score.availability.conflicts,
            matched_causes: score.causes.matched_causes,
            preference_notes: score.preferences.notes,
        },
    }
}
