//! Volu Match - volunteer-to-event matching engine
//!
//! Ranks volunteers against events (and events against volunteers) with a
//! weighted score over skills, location, availability, causes and stated
//! preferences, and runs the invitation workflow that feeds on its results.

pub mod app;
pub mod config;
pub mod core;
pub mod error;
pub mod models;
pub mod services;
pub mod telemetry;

// Re-export commonly used types
pub use app::MatchingContext;
pub use crate::core::{Matcher, MIN_MATCH_SCORE, DistanceProvider, ZipDistanceEstimator};
pub use error::{AppError, MatchError};
pub use models::{Event, Volunteer, MatchResult, MatchDetails, Invitation, InvitationRequest, ScoringWeights};
pub use services::{InvitationService, MatchingEngine, MatchStore, MemoryStore, PostgresStore};
