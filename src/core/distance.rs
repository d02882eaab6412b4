use crate::models::Address;
use geo::{HaversineDistance, Point};
use serde::{Deserialize, Serialize};
use std::future::Future;
use thiserror::Error;

/// Meters in one statute mile
const METERS_PER_MILE: f64 = 1609.344;

/// Same five-digit zip code
const SAME_ZIP_MILES: f64 = 1.0;

/// Base distance for zips sharing a three-digit sectional center prefix
const SAME_SECTION_BASE_MILES: f64 = 5.0;

/// Cap on the numeric zip delta added inside a sectional center
const SAME_SECTION_SPREAD_MILES: f64 = 20.0;

/// Zips in different sectional centers
const DIFFERENT_SECTION_MILES: f64 = 50.0;

/// Errors raised while estimating the distance between two addresses
#[derive(Debug, Error)]
pub enum DistanceError {
    #[error("Geocoding unavailable: {0}")]
    GeocodingUnavailable(String),

    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// Geographic point in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Great-circle distance between two points in miles
#[inline]
pub fn haversine_miles(a: Coordinates, b: Coordinates) -> f64 {
    let from = Point::new(a.longitude, a.latitude);
    let to = Point::new(b.longitude, b.latitude);
    from.haversine_distance(&to) / METERS_PER_MILE
}

/// Distance collaborator used by the location scorer
pub trait DistanceProvider: Send + Sync {
    /// Distance in miles between two complete addresses
    fn distance_miles(
        &self,
        from: &Address,
        to: &Address,
    ) -> impl Future<Output = Result<f64, DistanceError>> + Send;
}

/// Resolves an address to coordinates
pub trait Geocoder: Send + Sync {
    fn geocode(
        &self,
        address: &Address,
    ) -> impl Future<Output = Result<Coordinates, DistanceError>> + Send;
}

/// Deterministic zip-code based estimate
///
/// Stand-in for a real geocoding service: identical zips are close, zips in
/// the same sectional center grow with their numeric difference, anything
/// else is treated as far away.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZipDistanceEstimator;

impl ZipDistanceEstimator {
    pub fn estimate(&self, from: &Address, to: &Address) -> Result<f64, DistanceError> {
        let a = normalized_zip(from)
            .ok_or_else(|| DistanceError::GeocodingUnavailable("missing origin zip".into()))?;
        let b = normalized_zip(to)
            .ok_or_else(|| DistanceError::GeocodingUnavailable("missing destination zip".into()))?;

        if a == b {
            return Ok(SAME_ZIP_MILES);
        }

        let same_section = matches!((a.get(..3), b.get(..3)), (Some(x), Some(y)) if x == y);
        if same_section {
            if let (Ok(x), Ok(y)) = (a.parse::<u32>(), b.parse::<u32>()) {
                let spread = (x.abs_diff(y) as f64).min(SAME_SECTION_SPREAD_MILES);
                return Ok(SAME_SECTION_BASE_MILES + spread);
            }
        }

        Ok(DIFFERENT_SECTION_MILES)
    }
}

impl DistanceProvider for ZipDistanceEstimator {
    async fn distance_miles(&self, from: &Address, to: &Address) -> Result<f64, DistanceError> {
        self.estimate(from, to)
    }
}

/// First five characters of the zip, so ZIP+4 codes compare equal
fn normalized_zip(address: &Address) -> Option<&str> {
    let zip = address.zip.as_deref()?.trim();
    if zip.is_empty() {
        return None;
    }
    let end = zip
        .char_indices()
        .nth(5)
        .map_or(zip.len(), |(idx, _)| idx);
    Some(&zip[..end])
}

/// Haversine distance between geocoded addresses
#[derive(Debug, Clone)]
pub struct GeocodedDistance<G> {
    geocoder: G,
}

impl<G: Geocoder> GeocodedDistance<G> {
    pub fn new(geocoder: G) -> Self {
        Self { geocoder }
    }

    pub fn geocoder(&self) -> &G {
        &self.geocoder
    }
}

impl<G: Geocoder> DistanceProvider for GeocodedDistance<G> {
    async fn distance_miles(&self, from: &Address, to: &Address) -> Result<f64, DistanceError> {
        let a = self.geocoder.geocode(from).await?;
        let b = self.geocoder.geocode(to).await?;
        Ok(haversine_miles(a, b))
    }
}
