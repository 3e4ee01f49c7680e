//! Smart alerts (geofences).
//!
//! A smart alert is a circular zone that notifies a set of users when the
//! owner arrives at, or departs from, a named place. Evaluation compares two
//! consecutive position fixes and reports the zones whose boundary was
//! crossed in the direction the alert is armed for.

use safewatch_core::{haversine_distance_km, GeoPoint, GeoRecord};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Boundary crossing an alert is armed for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoneTrigger {
    /// Fire when moving from outside to inside
    Arrival,
    /// Fire when moving from inside to outside
    Departure,
}

fn default_active() -> bool {
    true
}

/// Location-based alert owned by a user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmartAlert {
    pub id: String,
    pub user_id: String,
    pub location_name: String,
    #[serde(flatten)]
    pub location: GeoPoint,
    #[serde(alias = "radius")]
    pub radius_km: f64,
    #[serde(alias = "alert_type")]
    pub trigger: ZoneTrigger,
    #[serde(default)]
    pub shared_with_user_ids: Vec<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub created_at: u64,
}

impl SmartAlert {
    /// Inclusive check: a point exactly on the boundary is inside
    pub fn contains(&self, point: GeoPoint) -> bool {
        haversine_distance_km(self.location, point) <= self.radius_km
    }

    pub fn deactivate(&mut self) {
        self.is_active = false;
    }

    fn is_evaluable(&self) -> bool {
        self.is_active
            && self.location.is_valid()
            && self.radius_km.is_finite()
            && self.radius_km > 0.0
    }
}

impl GeoRecord for SmartAlert {
    fn id(&self) -> &str {
        &self.id
    }

    fn location(&self) -> GeoPoint {
        self.location
    }

    fn created_at(&self) -> u64 {
        self.created_at
    }
}

/// A fired smart alert
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZoneEvent {
    pub alert_id: String,
    pub location_name: String,
    pub trigger: ZoneTrigger,
    /// Distance from the zone centre at the current fix
    pub distance_km: f64,
    /// Users to notify
    pub notify: Vec<String>,
}

/// Report the smart alerts that fire for a move from `previous` to `current`.
///
/// Inactive alerts and alerts with an unusable zone never fire. Events are
/// returned in the order of `alerts`.
///
/// # Errors
/// `InvalidArgument` if either fix is out of range.
pub fn evaluate_transition(
    alerts: &[SmartAlert],
    previous: GeoPoint,
    current: GeoPoint,
) -> Result<Vec<ZoneEvent>> {
    previous.validate()?;
    current.validate()?;

    let mut events = Vec::new();

    for alert in alerts {
        if !alert.is_evaluable() {
            tracing::debug!(alert_id = %alert.id, "Skipping smart alert");
            continue;
        }

        let was_inside = alert.contains(previous);
        let is_inside = alert.contains(current);

        let fired = match alert.trigger {
            ZoneTrigger::Arrival => !was_inside && is_inside,
            ZoneTrigger::Departure => was_inside && !is_inside,
        };

        if fired {
            events.push(ZoneEvent {
                alert_id: alert.id.clone(),
                location_name: alert.location_name.clone(),
                trigger: alert.trigger,
                distance_km: haversine_distance_km(alert.location, current),
                notify: alert.shared_with_user_ids.clone(),
            });
        }
    }

    Ok(events)
}
