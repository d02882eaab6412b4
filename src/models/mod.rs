// Model exports
pub mod domain;
pub mod requests;

pub use domain::{
    Address, Availability, Event, EventStatus, EventType, Frequency, Invitation, InvitationStatus,
    MatchDetails, MatchEligibility, MatchResult, Preference, ProfileGap, ScoringWeights, TimeSlot,
    Volunteer,
};
pub use requests::{InvitationRequest, InvitationResponseRequest, DEFAULT_INVITATION_MESSAGE};
