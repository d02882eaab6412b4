use crate::models::{Event, EventStatus, MatchEligibility, ProfileGap, Volunteer};

/// Classify a volunteer once before scoring
///
/// Opted-out volunteers are dropped. Missing address, availability or
/// preference data only degrades the affected sub-scores.
pub fn volunteer_eligibility(volunteer: &Volunteer) -> MatchEligibility {
    if volunteer.profile_visible == Some(false) {
        return MatchEligibility::OptedOut;
    }

    let mut missing = Vec::new();
    if !volunteer.address.is_complete() {
        missing.push(ProfileGap::Address);
    }
    if volunteer.availability.is_none() {
        missing.push(ProfileGap::Availability);
    }
    if volunteer.preference.is_none() {
        missing.push(ProfileGap::Preference);
    }

    if missing.is_empty() {
        MatchEligibility::Eligible
    } else {
        MatchEligibility::IncompleteProfile { missing }
    }
}

/// Event is active and still has room for volunteers
#[inline]
pub fn is_open_event(event: &Event) -> bool {
    event.status == EventStatus::Active && event.has_capacity()
}

/// A distance lookup is only worth doing for in-person events and a
/// volunteer with a complete address
#[inline]
pub fn needs_distance(volunteer: &Volunteer, event: &Event) -> bool {
    !event.is_virtual && volunteer.address.is_complete() && event.address.is_complete()
}
