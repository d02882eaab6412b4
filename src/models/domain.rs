use chrono::{DateTime, NaiveDate, NaiveTime, Utc, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Postal address shared by volunteer profiles and in-person events
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Address {
    #[serde(default)]
    pub street: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub zip: Option<String>,
}

impl Address {
    /// City, state and zip are all present and non-blank
    pub fn is_complete(&self) -> bool {
        [&self.city, &self.state, &self.zip]
            .iter()
            .all(|field| field.as_deref().is_some_and(|v| !v.trim().is_empty()))
    }

    /// Single-line rendering used as the geocoding query
    pub fn one_line(&self) -> String {
        let street = self.street.as_deref().unwrap_or("").trim();
        let city = self.city.as_deref().unwrap_or("").trim();
        let state = self.state.as_deref().unwrap_or("").trim();
        let zip = self.zip.as_deref().unwrap_or("").trim();

        let mut line = String::new();
        if !street.is_empty() {
            line.push_str(street);
            line.push_str(", ");
        }
        line.push_str(city);
        line.push_str(", ");
        line.push_str(state);
        if !zip.is_empty() {
            line.push(' ');
            line.push_str(zip);
        }
        line
    }
}

/// Volunteer profile joined with skills, availability and preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Volunteer {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub address: Address,
    #[serde(default)]
    pub availability: Option<Availability>,
    #[serde(default)]
    pub preference: Option<Preference>,
    /// Absent settings mean the profile is visible
    #[serde(default)]
    pub profile_visible: Option<bool>,
}

impl Volunteer {
    /// Display name, falling back when the profile has none
    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            "Unknown"
        } else {
            &self.name
        }
    }
}

/// Time-of-day bucket a volunteer can commit to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeSlot {
    Morning,
    Afternoon,
    Evening,
}

impl TimeSlot {
    pub const ALL: [TimeSlot; 3] = [TimeSlot::Morning, TimeSlot::Afternoon, TimeSlot::Evening];

    /// Half-open hour range [start, end) covered by the bucket
    pub fn hours(self) -> (u32, u32) {
        match self {
            TimeSlot::Morning => (8, 12),
            TimeSlot::Afternoon => (12, 17),
            TimeSlot::Evening => (17, 21),
        }
    }

    #[inline]
    pub fn contains_hour(self, hour: u32) -> bool {
        let (start, end) = self.hours();
        hour >= start && hour < end
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TimeSlot::Morning => "morning",
            TimeSlot::Afternoon => "afternoon",
            TimeSlot::Evening => "evening",
        }
    }
}

impl FromStr for TimeSlot {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "morning" => Ok(TimeSlot::Morning),
            "afternoon" => Ok(TimeSlot::Afternoon),
            "evening" => Ok(TimeSlot::Evening),
            other => Err(format!("unknown time slot: {}", other)),
        }
    }
}

/// Per-volunteer schedule constraints
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Availability {
    #[serde(default)]
    pub available_days: Vec<Weekday>,
    #[serde(default)]
    pub time_slots: Vec<TimeSlot>,
    #[serde(default)]
    pub blackout_dates: Vec<NaiveDate>,
    #[serde(default)]
    pub minimum_notice_days: u32,
}

/// How often a volunteer wants to commit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    OneTime,
    Recurring,
    Flexible,
}

impl Frequency {
    pub fn as_str(self) -> &'static str {
        match self {
            Frequency::OneTime => "one_time",
            Frequency::Recurring => "recurring",
            Frequency::Flexible => "flexible",
        }
    }
}

impl FromStr for Frequency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "one_time" => Ok(Frequency::OneTime),
            "recurring" => Ok(Frequency::Recurring),
            "flexible" => Ok(Frequency::Flexible),
            other => Err(format!("unknown frequency: {}", other)),
        }
    }
}

/// Per-volunteer matching preferences
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preference {
    #[serde(default)]
    pub causes: Vec<String>,
    #[serde(default)]
    pub max_travel_miles: Option<f64>,
    #[serde(default)]
    pub frequency: Option<Frequency>,
    #[serde(default)]
    pub remote_opportunities: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    OneTime,
    Recurring,
    Ongoing,
}

impl EventType {
    pub fn as_str(self) -> &'static str {
        match self {
            EventType::OneTime => "one_time",
            EventType::Recurring => "recurring",
            EventType::Ongoing => "ongoing",
        }
    }
}

impl FromStr for EventType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "one_time" => Ok(EventType::OneTime),
            "recurring" => Ok(EventType::Recurring),
            "ongoing" => Ok(EventType::Ongoing),
            other => Err(format!("unknown event type: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventStatus {
    Active,
    Draft,
    Cancelled,
    Completed,
}

impl EventStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            EventStatus::Active => "Active",
            EventStatus::Draft => "Draft",
            EventStatus::Cancelled => "Cancelled",
            EventStatus::Completed => "Completed",
        }
    }
}

impl FromStr for EventStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Active" => Ok(EventStatus::Active),
            "Draft" => Ok(EventStatus::Draft),
            "Cancelled" => Ok(EventStatus::Cancelled),
            "Completed" => Ok(EventStatus::Completed),
            other => Err(format!("unknown event status: {}", other)),
        }
    }
}

/// Event joined with its required skills and causes
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub required_skills: Vec<String>,
    #[serde(default)]
    pub address: Address,
    #[serde(default)]
    pub is_virtual: bool,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    #[serde(default)]
    pub causes: Vec<String>,
    /// `None` means unlimited capacity
    #[serde(default)]
    pub max_volunteers: Option<u32>,
    #[serde(default)]
    pub current_volunteers: u32,
    pub event_type: EventType,
    pub status: EventStatus,
}

impl Event {
    pub fn has_capacity(&self) -> bool {
        self.max_volunteers
            .map_or(true, |max| self.current_volunteers < max)
    }
}

/// Supporting detail for a computed match
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchDetails {
    pub matched_skills: Vec<String>,
    pub distance: f64,
    pub availability_conflicts: Vec<String>,
    pub matched_causes: Vec<String>,
    pub preference_notes: Vec<String>,
}

/// Scored volunteer/event pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult {
    pub volunteer_id: String,
    pub volunteer_name: String,
    pub volunteer_email: String,
    pub event_id: String,
    pub event_name: String,
    pub match_score: f64,
    pub skill_match_percentage: f64,
    pub location_match_percentage: f64,
    pub availability_match_percentage: f64,
    pub causes_match_percentage: f64,
    pub preferences_match_percentage: f64,
    pub match_details: MatchDetails,
}

/// Fixed weights of the composite score
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringWeights {
    pub skills: f64,
    pub location: f64,
    pub availability: f64,
    pub causes: f64,
    pub preferences: f64,
}

impl ScoringWeights {
    pub const FIXED: ScoringWeights = ScoringWeights {
        skills: 0.35,
        location: 0.25,
        availability: 0.20,
        causes: 0.15,
        preferences: 0.05,
    };
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self::FIXED
    }
}

/// Part of a volunteer record the scorers fall back on defaults for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileGap {
    Address,
    Availability,
    Preference,
}

/// Whether a volunteer takes part in matching at all
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchEligibility {
    Eligible,
    OptedOut,
    IncompleteProfile { missing: Vec<ProfileGap> },
}

impl MatchEligibility {
    pub fn is_matchable(&self) -> bool {
        !matches!(self, MatchEligibility::OptedOut)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvitationStatus {
    Pending,
    Accepted,
    Declined,
}

impl InvitationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            InvitationStatus::Pending => "Pending",
            InvitationStatus::Accepted => "Accepted",
            InvitationStatus::Declined => "Declined",
        }
    }
}

impl fmt::Display for InvitationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InvitationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Pending" => Ok(InvitationStatus::Pending),
            "Accepted" => Ok(InvitationStatus::Accepted),
            "Declined" => Ok(InvitationStatus::Declined),
            other => Err(format!("unknown invitation status: {}", other)),
        }
    }
}

/// Pending offer from an event to a volunteer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invitation {
    pub id: String,
    pub event_id: String,
    pub volunteer_id: String,
    pub message: String,
    pub status: InvitationStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub responded_at: Option<DateTime<Utc>>,
}
