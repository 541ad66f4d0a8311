//! Entity and coordinate types.

use serde::{Deserialize, Serialize};

use crate::distance::haversine_km;

/// A latitude/longitude pair in decimal degrees.
///
/// Used for entity locations and for group centroids.
///
/// # Examples
///
/// ```
/// use u_grouping::models::GeoPoint;
///
/// let p = GeoPoint::new(53.55, 9.99);
/// assert_eq!(p.lat(), 53.55);
/// assert_eq!(p.lon(), 9.99);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    lat: f64,
    lon: f64,
}

impl GeoPoint {
    /// Creates a point.
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Latitude.
    pub fn lat(&self) -> f64 {
        self.lat
    }

    /// Longitude.
    pub fn lon(&self) -> f64 {
        self.lon
    }

    /// Arithmetic mean of the given points, or `None` if there are none.
    pub fn mean<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = GeoPoint>,
    {
        let mut count = 0usize;
        let (mut lat, mut lon) = (0.0, 0.0);
        for p in points {
            lat += p.lat;
            lon += p.lon;
            count += 1;
        }
        if count == 0 {
            return None;
        }
        Some(Self::new(lat / count as f64, lon / count as f64))
    }
}

/// A geo-located item to be grouped.
///
/// Entities are immutable once built from external input; the pipeline
/// refers to them by their index in the input slice.
///
/// # Examples
///
/// ```
/// use u_grouping::models::Entity;
///
/// let hamburg = Entity::new("Hamburg", 53.5511, 9.9937);
/// let bremen = Entity::new("Bremen", 53.0793, 8.8017);
/// let d = hamburg.distance_to(&bremen);
/// assert!(d > 90.0 && d < 100.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    #[serde(alias = "name")]
    id: String,
    #[serde(alias = "lat")]
    latitude: f64,
    #[serde(alias = "lon", alias = "lng")]
    longitude: f64,
}

impl Entity {
    /// Creates a new entity.
    pub fn new(id: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            id: id.into(),
            latitude,
            longitude,
        }
    }

    /// Identity (name or external id).
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Latitude in degrees.
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Longitude in degrees.
    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Location as a [`GeoPoint`].
    pub fn point(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }

    /// Great-circle distance to another entity in kilometres.
    pub fn distance_to(&self, other: &Entity) -> f64 {
        haversine_km(self.point(), other.point())
    }

    /// Returns `true` if both coordinates are finite and within range.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}
