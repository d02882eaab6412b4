use crate::config::{GeocodingProvider, GeocodingSettings};
use crate::core::distance::{
    Coordinates, DistanceError, DistanceProvider, GeocodedDistance, Geocoder, ZipDistanceEstimator,
};
use crate::models::Address;
use crate::services::cache::{CacheKey, CacheManager};
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

/// One place in a Nominatim-style search response
#[derive(Debug, Deserialize)]
struct SearchPlace {
    lat: String,
    lon: String,
}

/// Geocoding client for a Nominatim-compatible search API
///
/// Successful lookups are cached by normalized address line; cache failures
/// are logged and never fail a lookup.
pub struct HttpGeocoder {
    base_url: String,
    client: Client,
    cache: Option<Arc<CacheManager>>,
}

impl HttpGeocoder {
    /// Create a new geocoding client
    pub fn new(
        base_url: String,
        user_agent: &str,
        timeout: Duration,
        cache: Option<Arc<CacheManager>>,
    ) -> Result<Self, DistanceError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            base_url,
            client,
            cache,
        })
    }

    async fn lookup(&self, line: &str) -> Result<Coordinates, DistanceError> {
        let url = format!(
            "{}/search?q={}&format=json&limit=1",
            self.base_url.trim_end_matches('/'),
            urlencoding::encode(line)
        );

        tracing::debug!("Geocoding address via {}", url);

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(DistanceError::GeocodingUnavailable(format!(
                "Geocoding service returned {}",
                response.status()
            )));
        }

        let places: Vec<SearchPlace> = response
            .json()
            .await
            .map_err(|e| DistanceError::InvalidResponse(format!("Failed to parse places: {}", e)))?;

        let place = places.first().ok_or_else(|| {
            DistanceError::GeocodingUnavailable(format!("No results for {:?}", line))
        })?;

        let latitude = place
            .lat
            .parse::<f64>()
            .map_err(|e| DistanceError::InvalidResponse(format!("Bad latitude {:?}: {}", place.lat, e)))?;
        let longitude = place
            .lon
            .parse::<f64>()
            .map_err(|e| DistanceError::InvalidResponse(format!("Bad longitude {:?}: {}", place.lon, e)))?;

        Ok(Coordinates { latitude, longitude })
    }
}

impl Geocoder for HttpGeocoder {
    async fn geocode(&self, address: &Address) -> Result<Coordinates, DistanceError> {
        let line = address.one_line();
        let key = CacheKey::geocode(&line);

        if let Some(cache) = &self.cache {
            if let Ok(coordinates) = cache.get::<Coordinates>(&key).await {
                return Ok(coordinates);
            }
        }

        let coordinates = self.lookup(&line).await?;

        if let Some(cache) = &self.cache {
            if let Err(e) = cache.set(&key, &coordinates).await {
                tracing::warn!("Failed to cache geocoding result: {}", e);
            }
        }

        Ok(coordinates)
    }
}

/// Distance provider selected by configuration
pub enum DistanceEstimator {
    Zip(ZipDistanceEstimator),
    Geocoded(GeocodedDistance<HttpGeocoder>),
}

impl DistanceEstimator {
    pub fn from_settings(
        settings: &GeocodingSettings,
        cache: Option<Arc<CacheManager>>,
    ) -> Result<Self, DistanceError> {
        match settings.provider {
            GeocodingProvider::Zip => Ok(DistanceEstimator::Zip(ZipDistanceEstimator)),
            GeocodingProvider::Http => {
                let geocoder = HttpGeocoder::new(
                    settings.endpoint.clone(),
                    &settings.user_agent,
                    Duration::from_secs(settings.timeout_secs),
                    cache,
                )?;
                Ok(DistanceEstimator::Geocoded(GeocodedDistance::new(geocoder)))
            }
        }
    }
}

impl DistanceProvider for DistanceEstimator {
    async fn distance_miles(&self, from: &Address, to: &Address) -> Result<f64, DistanceError> {
        match self {
            DistanceEstimator::Zip(estimator) => estimator.distance_miles(from, to).await,
            DistanceEstimator::Geocoded(provider) => provider.distance_miles(from, to).await,
        }
    }
}
