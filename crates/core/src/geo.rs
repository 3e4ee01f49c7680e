//! Geographic primitives.
//!
//! Provides the [`GeoPoint`] value type and the spherical geometry the rest of
//! the workspace builds on: great-circle distance, initial bearing, compass
//! directions and simple aggregate helpers.
//!
//! All distances are in kilometres on a spherical Earth of radius
//! [`EARTH_RADIUS_KM`].

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{GeoError, Result};

/// Mean Earth radius used by the Haversine formula
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Geographic coordinates (latitude, longitude)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude in degrees (-90 to 90)
    pub latitude: f64,
    /// Longitude in degrees (-180 to 180)
    pub longitude: f64,
}

impl GeoPoint {
    /// Create a new geographic point
    ///
    /// # Arguments
    /// * `latitude` - Latitude in degrees (-90 to 90)
    /// * `longitude` - Longitude in degrees (-180 to 180)
    ///
    /// # Returns
    /// * `Ok(GeoPoint)` - Valid point
    /// * `Err(GeoError::InvalidArgument)` - Out of range or NaN
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        let point = Self {
            latitude,
            longitude,
        };
        point.validate()?;
        Ok(point)
    }

    /// Check that both coordinates are within range.
    ///
    /// Points can be built directly from their public fields (or deserialized
    /// from untrusted rows), so callers validate at the boundary.
    pub fn validate(&self) -> Result<()> {
        if !(-90.0..=90.0).contains(&self.latitude) {
            return Err(GeoError::InvalidArgument(format!(
                "Latitude must be between -90 and 90, got {}",
                self.latitude
            )));
        }
        if !(-180.0..=180.0).contains(&self.longitude) {
            return Err(GeoError::InvalidArgument(format!(
                "Longitude must be between -180 and 180, got {}",
                self.longitude
            )));
        }
        Ok(())
    }

    /// Whether [`validate`](Self::validate) would succeed
    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// Great-circle distance to another point in kilometres
    pub fn distance_km(&self, other: &GeoPoint) -> f64 {
        haversine_distance_km(*self, *other)
    }

    /// Initial bearing towards another point in degrees, `[0, 360)`
    pub fn bearing_to(&self, other: &GeoPoint) -> f64 {
        bearing_degrees(*self, *other)
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}, {:.6})", self.latitude, self.longitude)
    }
}

/// Calculate the Haversine distance between two points in kilometres.
///
/// ```text
/// a = sin²(Δlat/2) + cos(lat1)·cos(lat2)·sin²(Δlon/2)
/// c = 2·atan2(√a, √(1−a))
/// d = R · c
/// ```
///
/// Identical points return exactly `0.0`. The `a` term is clamped to `[0, 1]`
/// so rounding near antipodal points cannot produce NaN.
pub fn haversine_distance_km(a: GeoPoint, b: GeoPoint) -> f64 {
    if a.latitude == b.latitude && a.longitude == b.longitude {
        return 0.0;
    }

    let lat1_rad = a.latitude.to_radians();
    let lat2_rad = b.latitude.to_radians();
    let delta_lat = (b.latitude - a.latitude).to_radians();
    let delta_lon = (b.longitude - a.longitude).to_radians();

    let h = ((delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2))
    .clamp(0.0, 1.0);

    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_KM * c
}

/// Initial great-circle bearing from `from` to `to`, normalized to `[0, 360)`.
///
/// Returns `0.0` for identical points.
pub fn bearing_degrees(from: GeoPoint, to: GeoPoint) -> f64 {
    let lat1 = from.latitude.to_radians();
    let lat2 = to.latitude.to_radians();
    let delta_lon = (to.longitude - from.longitude).to_radians();

    let y = delta_lon.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * delta_lon.cos();

    let bearing = y.atan2(x).to_degrees().rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if bearing >= 360.0 {
        0.0
    } else {
        bearing
    }
}

/// Inclusive radius check: `distance(point, center) <= radius_km`
pub fn is_within_radius(point: GeoPoint, center: GeoPoint, radius_km: f64) -> bool {
    haversine_distance_km(point, center) <= radius_km
}

/// Arithmetic mean of the given coordinates.
///
/// Adequate for clusters spanning a few kilometres, which is what it is used
/// for (centring a map on nearby records). Returns `None` for empty input.
pub fn centroid<'a, I>(points: I) -> Option<GeoPoint>
where
    I: IntoIterator<Item = &'a GeoPoint>,
{
    let mut count = 0usize;
    let mut lat_sum = 0.0;
    let mut lon_sum = 0.0;

    for point in points {
        count += 1;
        lat_sum += point.latitude;
        lon_sum += point.longitude;
    }

    if count == 0 {
        return None;
    }

    Some(GeoPoint {
        latitude: lat_sum / count as f64,
        longitude: lon_sum / count as f64,
    })
}

/// 16-point compass rose
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompassDirection {
    N,
    NNE,
    NE,
    ENE,
    E,
    ESE,
    SE,
    SSE,
    S,
    SSW,
    SW,
    WSW,
    W,
    WNW,
    NW,
    NNW,
}

impl CompassDirection {
    const ALL: [CompassDirection; 16] = [
        CompassDirection::N,
        CompassDirection::NNE,
        CompassDirection::NE,
        CompassDirection::ENE,
        CompassDirection::E,
        CompassDirection::ESE,
        CompassDirection::SE,
        CompassDirection::SSE,
        CompassDirection::S,
        CompassDirection::SSW,
        CompassDirection::SW,
        CompassDirection::WSW,
        CompassDirection::W,
        CompassDirection::WNW,
        CompassDirection::NW,
        CompassDirection::NNW,
    ];

    /// Nearest compass point for a bearing in degrees.
    ///
    /// Bearings outside `[0, 360)` are wrapped first.
    pub fn from_bearing(bearing: f64) -> Self {
        let wrapped = bearing.rem_euclid(360.0);
        let index = (wrapped / 22.5).round() as usize % 16;
        Self::ALL[index]
    }

    /// Abbreviation, e.g. `"NNE"`
    pub fn as_str(&self) -> &'static str {
        match self {
            CompassDirection::N => "N",
            CompassDirection::NNE => "NNE",
            CompassDirection::NE => "NE",
            CompassDirection::ENE => "ENE",
            CompassDirection::E => "E",
            CompassDirection::ESE => "ESE",
            CompassDirection::SE => "SE",
            CompassDirection::SSE => "SSE",
            CompassDirection::S => "S",
            CompassDirection::SSW => "SSW",
            CompassDirection::SW => "SW",
            CompassDirection::WSW => "WSW",
            CompassDirection::W => "W",
            CompassDirection::WNW => "WNW",
            CompassDirection::NW => "NW",
            CompassDirection::NNW => "NNW",
        }
    }
}

impl fmt::Display for CompassDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
