//! SafeWatch domain layer
//!
//! This crate contains the records the safety app works with and the
//! lookups built on the proximity engine:
//! - SOS alerts, communities, community posts and emergency contacts
//! - Smart alerts (arrival/departure geofences)
//! - The `DataStore` seam and an in-memory implementation
//! - Nearby lookups for alerts, communities and posts

pub mod alert;
pub mod community;
pub mod contacts;
pub mod error;
pub mod geofence;
pub mod nearby;
pub mod store;

pub use alert::{AlertStatus, IncidentType, SosAlert};
pub use community::{Community, CommunityPost, ANONYMOUS_NAME};
pub use contacts::{is_valid_email, is_valid_name, is_valid_phone, normalize_phone, EmergencyContact};
pub use error::{DomainError, Result};
pub use geofence::{evaluate_transition, SmartAlert, ZoneEvent, ZoneTrigger};
pub use nearby::NearbyService;
pub use store::{fetch_records, DataStore, MemoryStore, Table};
