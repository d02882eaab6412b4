// Core algorithm exports
pub mod distance;
pub mod filters;
pub mod matcher;
pub mod scoring;

pub use distance::{haversine_miles, Coordinates, DistanceError, DistanceProvider, GeocodedDistance, Geocoder, ZipDistanceEstimator};
pub use filters::{is_open_event, needs_distance, volunteer_eligibility};
pub use matcher::{Matcher, MIN_MATCH_SCORE};
pub use scoring::{calculate_match_score, MatchScore};
