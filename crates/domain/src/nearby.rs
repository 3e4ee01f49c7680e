//! Nearby lookups.
//!
//! Each lookup pulls the full, unfiltered table from the [`DataStore`] and
//! hands it to the proximity engine. The query is validated before the store
//! is touched, so a bad reference point or radius costs no I/O.

use safewatch_core::{
    GeoPoint, GeoRecord, ProximityConfig, ProximityQuery, ProximityResult, ResultOrder,
};
use serde::de::DeserializeOwned;

use crate::alert::SosAlert;
use crate::community::{Community, CommunityPost};
use crate::error::Result;
use crate::geofence::{evaluate_transition, SmartAlert, ZoneEvent};
use crate::store::{fetch_records, DataStore, Table};

/// Proximity lookups over a data store
pub struct NearbyService<S> {
    store: S,
    config: ProximityConfig,
}

impl<S: DataStore> NearbyService<S> {
    pub fn new(store: S, config: ProximityConfig) -> Self {
        Self { store, config }
    }

    /// Service with the default radii (5 km alerts and posts, 10 km communities)
    pub fn with_defaults(store: S) -> Self {
        Self::new(store, ProximityConfig::default())
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &ProximityConfig {
        &self.config
    }

    /// Active SOS alerts near `reference`, nearest first
    pub fn nearby_alerts(
        &self,
        reference: GeoPoint,
        radius_km: Option<f64>,
    ) -> Result<Vec<ProximityResult<SosAlert>>> {
        let query = ProximityQuery::new(
            reference,
            radius_km.unwrap_or(self.config.alert_radius_km),
        )?;

        let alerts: Vec<SosAlert> = fetch_records(&self.store, Table::SosAlerts)?;
        let active = alerts.into_iter().filter(SosAlert::is_active);

        Ok(self.run(Table::SosAlerts, &query, active))
    }

    /// Communities near `reference`, nearest first
    pub fn nearby_communities(
        &self,
        reference: GeoPoint,
        radius_km: Option<f64>,
    ) -> Result<Vec<ProximityResult<Community>>> {
        let query = ProximityQuery::new(
            reference,
            radius_km.unwrap_or(self.config.community_radius_km),
        )?;
        self.fetch_and_run(Table::Communities, &query)
    }

    /// Community posts near `reference`, newest first, capped at `post_limit`
    pub fn nearby_posts(
        &self,
        reference: GeoPoint,
        radius_km: Option<f64>,
    ) -> Result<Vec<ProximityResult<CommunityPost>>> {
        let query = ProximityQuery::new(
            reference,
            radius_km.unwrap_or(self.config.post_radius_km),
        )?
        .with_order(ResultOrder::Recency)
        .with_limit(self.config.post_limit);

        self.fetch_and_run(Table::CommunityPosts, &query)
    }

    /// Smart alerts owned by `user_id` that fire for a move between two fixes
    pub fn zone_events(
        &self,
        user_id: &str,
        previous: GeoPoint,
        current: GeoPoint,
    ) -> Result<Vec<ZoneEvent>> {
        previous.validate()?;
        current.validate()?;

        let alerts: Vec<SmartAlert> = fetch_records(&self.store, Table::SmartAlerts)?;
        let owned: Vec<SmartAlert> = alerts
            .into_iter()
            .filter(|alert| alert.user_id == user_id)
            .collect();

        let events = evaluate_transition(&owned, previous, current)?;
        tracing::debug!(
            user_id,
            alerts = owned.len(),
            fired = events.len(),
            "Evaluated smart alerts"
        );
        Ok(events)
    }

    fn fetch_and_run<T>(
        &self,
        table: Table,
        query: &ProximityQuery,
    ) -> Result<Vec<ProximityResult<T>>>
    where
        T: DeserializeOwned + GeoRecord,
    {
        let records: Vec<T> = fetch_records(&self.store, table)?;
        Ok(self.run(table, query, records))
    }

    fn run<T, I>(
        &self,
        table: Table,
        query: &ProximityQuery,
        candidates: I,
    ) -> Vec<ProximityResult<T>>
    where
        T: GeoRecord,
        I: IntoIterator<Item = T>,
    {
        let results = query.execute(candidates);
        tracing::debug!(
            %table,
            radius_km = query.radius_km(),
            matched = results.len(),
            "Nearby lookup"
        );
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alert::{AlertStatus, IncidentType};
    use crate::error::DomainError;
    use crate::store::MemoryStore;

    fn point(lat: f64, lon: f64) -> GeoPoint {
        GeoPoint::new(lat, lon).unwrap()
    }

    fn cbd() -> GeoPoint {
        point(-1.286389, 36.817221)
    }

    fn alert(id: &str, at: GeoPoint, status: AlertStatus) -> SosAlert {
        let mut a = SosAlert::new(
            id.to_string(),
            "user-1".to_string(),
            IncidentType::Crime,
            at,
            1000,
        );
        a.status = status;
        a
    }

    #[test]
    fn test_only_active_alerts() {
        let store = MemoryStore::new();
        store
            .insert(Table::SosAlerts, &alert("active", point(-1.287, 36.818), AlertStatus::Active))
            .unwrap();
        store
            .insert(Table::SosAlerts, &alert("done", point(-1.287, 36.818), AlertStatus::Resolved))
            .unwrap();

        let service = NearbyService::with_defaults(store);
        let results = service.nearby_alerts(cbd(), None).unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].record.id, "active");
    }

    #[test]
    fn test_radius_override() {
        let store = MemoryStore::new();
        store
            .insert(Table::SosAlerts, &alert("far", point(-1.3, 36.9), AlertStatus::Active))
            .unwrap();

        let service = NearbyService::with_defaults(store);
        assert!(service.nearby_alerts(cbd(), None).unwrap().is_empty());
        assert_eq!(service.nearby_alerts(cbd(), Some(10.0)).unwrap().len(), 1);
    }

    #[test]
    fn test_invalid_radius_rejected_before_fetch() {
        let store = MemoryStore::new();
        // A row that would fail to deserialize if it were ever read
        store
            .insert_value(Table::Communities, serde_json::json!({"id": 1}))
            .unwrap();

        let service = NearbyService::with_defaults(store);
        let err = service.nearby_communities(cbd(), Some(-1.0)).unwrap_err();
        assert!(matches!(err, DomainError::InvalidArgument(_)));
    }

    #[test]
    fn test_bad_row_is_serialization_error() {
        let store = MemoryStore::new();
        store
            .insert_value(Table::Communities, serde_json::json!({"id": 1}))
            .unwrap();

        let service = NearbyService::with_defaults(store);
        let err = service.nearby_communities(cbd(), None).unwrap_err();
        assert!(matches!(err, DomainError::Serialization(_)));
    }
}
