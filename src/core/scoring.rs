use crate::models::{Availability, Event, EventType, Frequency, Preference, ScoringWeights, Volunteer};
use chrono::{Datelike, NaiveDate, Timelike, Weekday};
use std::collections::HashSet;

/// Distance reported when the volunteer location is unknown
pub const UNKNOWN_DISTANCE_MILES: f64 = 999.0;

/// Travel radius assumed when the volunteer stated none
pub const DEFAULT_MAX_TRAVEL_MILES: f64 = 25.0;

/// Location score for volunteers without a usable address
pub const MISSING_LOCATION_SCORE: f64 = 0.1;

/// Score used when there is not enough data to judge a criterion
pub const NEUTRAL_SCORE: f64 = 0.5;

const BLACKOUT_PENALTY: f64 = 0.5;
const WEEKDAY_PENALTY: f64 = 0.3;
const TIME_SLOT_PENALTY: f64 = 0.2;
const NOTICE_PENALTY: f64 = 0.2;
const REMOTE_PENALTY: f64 = 0.2;
const FREQUENCY_PENALTY: f64 = 0.2;

#[derive(Debug, Clone, PartialEq)]
pub struct SkillMatch {
    pub percentage: f64,
    pub matched_skills: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocationMatch {
    pub percentage: f64,
    pub distance: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AvailabilityMatch {
    pub percentage: f64,
    pub conflicts: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CausesMatch {
    pub percentage: f64,
    pub matched_causes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PreferencesMatch {
    pub percentage: f64,
    pub notes: Vec<String>,
}

/// All five sub-scores of a volunteer/event pair plus the weighted total
#[derive(Debug, Clone, PartialEq)]
pub struct MatchScore {
    pub skills: SkillMatch,
    pub location: LocationMatch,
    pub availability: AvailabilityMatch,
    pub causes: CausesMatch,
    pub preferences: PreferencesMatch,
    pub total: f64,
}

#[inline]
fn clamp_unit(value: f64) -> f64 {
    value.clamp(0.0, 1.0)
}

/// Case-insensitive de-duplication, keeping the first spelling seen
fn unique_ignore_case(values: &[String]) -> Vec<&String> {
    let mut seen = HashSet::new();
    values
        .iter()
        .filter(|v| seen.insert(v.to_lowercase()))
        .collect()
}

/// Calculate the composite score for a volunteer/event pair
///
/// `distance_miles` is the resolved distance between the volunteer and an
/// in-person event, or `None` when it could not be determined.
///
/// Scoring formula:
/// score = (
///     skills * 0.35 +
///     location * 0.25 +
///     availability * 0.20 +
///     causes * 0.15 +
///     preferences * 0.05
/// )
pub fn calculate_match_score(
    volunteer: &Volunteer,
    event: &Event,
    distance_miles: Option<f64>,
    today: NaiveDate,
    weights: &ScoringWeights,
) -> MatchScore {
    let skills = skill_match(&volunteer.skills, &event.required_skills);
    let location = location_match(volunteer, event, distance_miles);
    let availability = availability_match(volunteer.availability.as_ref(), event, today);
    let causes = causes_match(
        volunteer
            .preference
            .as_ref()
            .map(|p| p.causes.as_slice())
            .unwrap_or_default(),
        &event.causes,
    );
    let preferences = preferences_match(volunteer.preference.as_ref(), event);

    let total = composite_score(
        skills.percentage,
        location.percentage,
        availability.percentage,
        causes.percentage,
        preferences.percentage,
        weights,
    );

    MatchScore {
        skills,
        location,
        availability,
        causes,
        preferences,
        total,
    }
}

/// Weighted combination of the five sub-scores
#[inline]
pub fn composite_score(
    skills: f64,
    location: f64,
    availability: f64,
    causes: f64,
    preferences: f64,
    weights: &ScoringWeights,
) -> f64 {
    let total = skills * weights.skills
        + location * weights.location
        + availability * weights.availability
        + causes * weights.causes
        + preferences * weights.preferences;

    clamp_unit(total)
}

/// Share of required skills the volunteer has
///
/// Comparison is exact after lowercasing. An event with no requirements is
/// satisfied by anyone and reports all volunteer skills as matched.
pub fn skill_match(volunteer_skills: &[String], required_skills: &[String]) -> SkillMatch {
    let volunteer_skills = unique_ignore_case(volunteer_skills);

    if required_skills.is_empty() {
        return SkillMatch {
            percentage: 1.0,
            matched_skills: volunteer_skills.into_iter().cloned().collect(),
        };
    }

    let required: HashSet<String> = required_skills.iter().map(|s| s.to_lowercase()).collect();

    let matched_skills: Vec<String> = volunteer_skills
        .into_iter()
        .filter(|skill| required.contains(&skill.to_lowercase()))
        .cloned()
        .collect();

    SkillMatch {
        percentage: clamp_unit(matched_skills.len() as f64 / required_skills.len() as f64),
        matched_skills,
    }
}

/// Closeness of the event relative to the volunteer's travel radius
pub fn location_match(volunteer: &Volunteer, event: &Event, distance_miles: Option<f64>) -> LocationMatch {
    if event.is_virtual {
        return LocationMatch { percentage: 1.0, distance: 0.0 };
    }

    let distance = match distance_miles {
        Some(d) if volunteer.address.is_complete() && d.is_finite() => d.max(0.0),
        _ => {
            return LocationMatch {
                percentage: MISSING_LOCATION_SCORE,
                distance: UNKNOWN_DISTANCE_MILES,
            }
        }
    };

    let max_distance = max_travel_miles(volunteer.preference.as_ref());

    LocationMatch {
        percentage: clamp_unit(1.0 - distance / max_distance),
        distance,
    }
}

/// Stated travel radius, falling back to the default for missing or
/// non-positive values
pub fn max_travel_miles(preference: Option<&Preference>) -> f64 {
    preference
        .and_then(|p| p.max_travel_miles)
        .filter(|miles| miles.is_finite() && *miles > 0.0)
        .unwrap_or(DEFAULT_MAX_TRAVEL_MILES)
}

/// Schedule fit, penalized once per detected conflict
pub fn availability_match(
    availability: Option<&Availability>,
    event: &Event,
    today: NaiveDate,
) -> AvailabilityMatch {
    let Some(availability) = availability else {
        return AvailabilityMatch {
            percentage: NEUTRAL_SCORE,
            conflicts: vec!["No availability data".to_string()],
        };
    };

    let mut conflicts = Vec::new();
    let mut percentage = 1.0;

    if availability.blackout_dates.contains(&event.start_date) {
        conflicts.push("Event date is in volunteer's blackout dates".to_string());
        percentage -= BLACKOUT_PENALTY;
    }

    if !availability.available_days.is_empty() {
        let weekday = event.start_date.weekday();
        if !availability.available_days.contains(&weekday) {
            conflicts.push(format!(
                "Event is on {}, which is not in volunteer's available days",
                weekday_name(weekday)
            ));
            percentage -= WEEKDAY_PENALTY;
        }
    }

    if !availability.time_slots.is_empty() {
        let hour = event.start_time.hour();
        if !availability.time_slots.iter().any(|slot| slot.contains_hour(hour)) {
            conflicts.push("Event time does not match volunteer's available time slots".to_string());
            percentage -= TIME_SLOT_PENALTY;
        }
    }

    if availability.minimum_notice_days > 0 {
        let days_until = (event.start_date - today).num_days();
        if days_until < i64::from(availability.minimum_notice_days) {
            conflicts.push(format!(
                "Event is in {} days, but volunteer requires {} days notice",
                days_until, availability.minimum_notice_days
            ));
            percentage -= NOTICE_PENALTY;
        }
    }

    AvailabilityMatch {
        percentage: clamp_unit(percentage),
        conflicts,
    }
}

/// Share of the volunteer's causes the event supports
///
/// The denominator is the volunteer's own cause count, so a volunteer whose
/// few causes are all covered scores 1.0 however many causes the event lists.
pub fn causes_match(volunteer_causes: &[String], event_causes: &[String]) -> CausesMatch {
    let volunteer_causes = unique_ignore_case(volunteer_causes);

    if event_causes.is_empty() || volunteer_causes.is_empty() {
        return CausesMatch {
            percentage: NEUTRAL_SCORE,
            matched_causes: Vec::new(),
        };
    }

    let supported: HashSet<String> = event_causes.iter().map(|c| c.to_lowercase()).collect();
    let total = volunteer_causes.len();

    let matched_causes: Vec<String> = volunteer_causes
        .into_iter()
        .filter(|cause| supported.contains(&cause.to_lowercase()))
        .cloned()
        .collect();

    CausesMatch {
        percentage: clamp_unit(matched_causes.len() as f64 / total as f64),
        matched_causes,
    }
}

/// Fit between stated preferences and the event's format
pub fn preferences_match(preference: Option<&Preference>, event: &Event) -> PreferencesMatch {
    let Some(preference) = preference else {
        return PreferencesMatch {
            percentage: NEUTRAL_SCORE,
            notes: vec!["No preference data".to_string()],
        };
    };

    let mut notes = Vec::new();
    let mut percentage = 1.0;

    if preference.remote_opportunities && !event.is_virtual {
        notes.push("Volunteer prefers remote opportunities, but event is in-person".to_string());
        percentage -= REMOTE_PENALTY;
    }

    if let Some(frequency) = preference.frequency {
        if !frequency_matches(frequency, event.event_type) {
            notes.push(format!(
                "Volunteer prefers {} events, but this is a {} event",
                frequency.as_str(),
                event.event_type.as_str()
            ));
            percentage -= FREQUENCY_PENALTY;
        }
    }

    PreferencesMatch {
        percentage: clamp_unit(percentage),
        notes,
    }
}

#[inline]
fn frequency_matches(frequency: Frequency, event_type: EventType) -> bool {
    matches!(
        (frequency, event_type),
        (Frequency::Flexible, _)
            | (Frequency::OneTime, EventType::OneTime)
            | (Frequency::Recurring, EventType::Recurring)
    )
}

fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "monday",
        Weekday::Tue => "tuesday",
        Weekday::Wed => "wednesday",
        Weekday::Thu => "thursday",
        Weekday::Fri => "friday",
        Weekday::Sat => "saturday",
        Weekday::Sun => "sunday",
    }
}
