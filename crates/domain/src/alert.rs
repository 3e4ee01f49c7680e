//! SOS alert records

use safewatch_core::{GeoPoint, GeoRecord};
use serde::{Deserialize, Serialize};

/// Kind of emergency the alert was raised for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncidentType {
    Normal,
    /// Alert should not be broadcast to the community feed
    Sensitive,
    Test,
    Medical,
    Crime,
    Fire,
}

/// Lifecycle state of an SOS alert
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertStatus {
    Active,
    Responding,
    Resolved,
    Cancelled,
}

impl AlertStatus {
    /// Resolved and cancelled alerts never change again
    pub fn is_terminal(&self) -> bool {
        matches!(self, AlertStatus::Resolved | AlertStatus::Cancelled)
    }
}

/// An SOS alert raised by a user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SosAlert {
    pub id: String,
    pub user_id: String,
    pub incident_type: IncidentType,
    #[serde(flatten)]
    pub location: GeoPoint,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub status: AlertStatus,
    /// Unix epoch milliseconds
    pub created_at: u64,
    /// Unix epoch milliseconds
    pub updated_at: u64,
}

impl SosAlert {
    /// Create a new active alert
    pub fn new(
        id: String,
        user_id: String,
        incident_type: IncidentType,
        location: GeoPoint,
        timestamp: u64,
    ) -> Self {
        Self {
            id,
            user_id,
            incident_type,
            location,
            address: None,
            description: None,
            status: AlertStatus::Active,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == AlertStatus::Active
    }

    /// Move the alert to a new status.
    ///
    /// Returns `false` and leaves the alert untouched if it is already
    /// resolved or cancelled.
    pub fn set_status(&mut self, status: AlertStatus, timestamp: u64) -> bool {
        if self.status.is_terminal() {
            return false;
        }
        self.status = status;
        self.updated_at = timestamp;
        true
    }

    pub fn cancel(&mut self, timestamp: u64) -> bool {
        self.set_status(AlertStatus::Cancelled, timestamp)
    }
}

impl GeoRecord for SosAlert {
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
