// Shared fixtures for the integration tests
#![allow(dead_code)]

use chrono::{NaiveDate, NaiveTime};
use volu_match::models::{
    Address, Availability, Event, EventStatus, EventType, Preference, Volunteer,
};

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Reference "today" for notice-period checks
pub fn today() -> NaiveDate {
    date(2026, 11, 1)
}

/// A Monday, fifteen days after `today()`
pub fn event_day() -> NaiveDate {
    date(2026, 11, 16)
}

pub fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

pub fn houston(zip: &str) -> Address {
    Address {
        street: Some("100 Main St".to_string()),
        city: Some("Houston".to_string()),
        state: Some("TX".to_string()),
        zip: Some(zip.to_string()),
    }
}

pub fn create_volunteer(id: &str, skills: &[&str], zip: &str) -> Volunteer {
    Volunteer {
        id: id.to_string(),
        name: format!("Volunteer {}", id),
        email: format!("{}@example.org", id),
        skills: strings(skills),
        address: houston(zip),
        availability: Some(Availability::default()),
        preference: None,
        profile_visible: None,
    }
}

pub fn with_preference(mut volunteer: Volunteer, preference: Preference) -> Volunteer {
    volunteer.preference = Some(preference);
    volunteer
}

pub fn create_event(id: &str, required_skills: &[&str], zip: &str) -> Event {
    Event {
        id: id.to_string(),
        name: format!("Event {}", id),
        required_skills: strings(required_skills),
        address: houston(zip),
        is_virtual: false,
        start_date: event_day(),
        end_date: event_day(),
        start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
        end_time: NaiveTime::from_hms_opt(13, 0, 0).unwrap(),
        causes: strings(&["Hunger"]),
        max_volunteers: Some(10),
        current_volunteers: 0,
        event_type: EventType::OneTime,
        status: EventStatus::Active,
    }
}

pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {}, got {}",
        expected,
        actual
    );
}
