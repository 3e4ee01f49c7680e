//! Core functionality for SafeWatch.
//!
//! This crate provides the geospatial primitives and proximity query engine
//! used by the alert, community and post lookups, plus the shared
//! configuration, logging and error types.

pub mod config;
pub mod error;
pub mod format;
pub mod geo;
pub mod logging;
pub mod proximity;

pub use config::{Config, ConfigError, LoggingConfig, ProximityConfig};
pub use error::{GeoError, Result};
pub use format::{format_distance, format_relative_time};
pub use geo::{
    bearing_degrees, centroid, haversine_distance_km, is_within_radius, CompassDirection, GeoPoint,
    EARTH_RADIUS_KM,
};
pub use proximity::{query_nearby, GeoRecord, ProximityQuery, ProximityResult, ResultOrder};
