//! Proximity query engine.
//!
//! Filters a snapshot of geotagged records down to those within a radius of a
//! reference point and ranks them by great-circle distance.
//!
//! # Contract
//!
//! - A record is included iff `distance_km <= radius_km` (inclusive boundary)
//! - Results are ordered ascending by distance; the sort is stable, so records
//!   at equal distance keep their input order
//! - The engine is a pure function of its inputs: it never mutates, persists
//!   or caches records, and holds no state between calls
//!
//! # Example
//!
//! ```
//! use safewatch_core::geo::GeoPoint;
//! use safewatch_core::proximity::{query_nearby, GeoRecord};
//!
//! struct Pin {
//!     id: String,
//!     at: GeoPoint,
//! }
//!
//! impl GeoRecord for Pin {
//!     fn id(&self) -> &str {
//!         &self.id
//!     }
//!     fn location(&self) -> GeoPoint {
//!         self.at
//!     }
//!     fn created_at(&self) -> u64 {
//!         0
//!     }
//! }
//!
//! let cbd = GeoPoint::new(-1.286389, 36.817221).unwrap();
//! let pins = vec![Pin { id: "a".into(), at: GeoPoint::new(-1.2833, 36.8167).unwrap() }];
//!
//! let hits = query_nearby(cbd, &pins, 1.0).unwrap();
//! assert_eq!(hits.len(), 1);
//! assert_eq!(hits[0].record.id(), "a");
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{GeoError, Result};
use crate::geo::{haversine_distance_km, GeoPoint};

/// A domain entity that carries a location.
///
/// Alerts, communities and posts all implement this; the engine needs nothing
/// else from them.
pub trait GeoRecord {
    /// Opaque identifier
    fn id(&self) -> &str;

    /// Where the record is
    fn location(&self) -> GeoPoint;

    /// Creation time (Unix epoch milliseconds)
    fn created_at(&self) -> u64;
}

impl<T: GeoRecord + ?Sized> GeoRecord for &T {
    fn id(&self) -> &str {
        (**self).id()
    }

    fn location(&self) -> GeoPoint {
        (**self).location()
    }

    fn created_at(&self) -> u64 {
        (**self).created_at()
    }
}

/// A matched record together with its distance from the reference point
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProximityResult<R> {
    /// The matched record (owned or borrowed, depending on the query input)
    pub record: R,
    /// Great-circle distance from the reference point in kilometres
    pub distance_km: f64,
}

/// Ordering applied to the filtered result set
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultOrder {
    /// Nearest first
    #[default]
    Distance,
    /// Newest first; applied on top of the distance order, so ties on
    /// `created_at` stay nearest first
    Recency,
}

/// A validated proximity query.
///
/// Construction checks the reference point and radius once; [`execute`]
/// can then be run against any number of candidate snapshots.
///
/// [`execute`]: ProximityQuery::execute
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProximityQuery {
    reference: GeoPoint,
    radius_km: f64,
    order: ResultOrder,
    limit: Option<usize>,
}

impl ProximityQuery {
    /// Create a distance-ordered query with no result limit.
    ///
    /// # Errors
    /// `GeoError::InvalidArgument` if the reference point is out of range or
    /// the radius is not a finite positive number.
    pub fn new(reference: GeoPoint, radius_km: f64) -> Result<Self> {
        reference.validate()?;

        if !radius_km.is_finite() || radius_km <= 0.0 {
            return Err(GeoError::InvalidArgument(format!(
                "Radius must be a positive number of kilometres, got {}",
                radius_km
            )));
        }

        Ok(Self {
            reference,
            radius_km,
            order: ResultOrder::Distance,
            limit: None,
        })
    }

    /// Set the result ordering
    pub fn with_order(mut self, order: ResultOrder) -> Self {
        self.order = order;
        self
    }

    /// Keep at most `limit` results after ordering
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn reference(&self) -> GeoPoint {
        self.reference
    }

    pub fn radius_km(&self) -> f64 {
        self.radius_km
    }

    pub fn order(&self) -> ResultOrder {
        self.order
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    /// Run the query over a candidate snapshot.
    ///
    /// Candidates whose own coordinates are invalid cannot be placed on the
    /// globe and are skipped.
    pub fn execute<R, I>(&self, candidates: I) -> Vec<ProximityResult<R>>
    where
        R: GeoRecord,
        I: IntoIterator<Item = R>,
    {
        let mut scanned = 0usize;
        let mut results: Vec<ProximityResult<R>> = Vec::new();

        for record in candidates {
            scanned += 1;

            let location = record.location();
            if !location.is_valid() {
                tracing::debug!(
                    record_id = record.id(),
                    %location,
                    "Skipping candidate with invalid coordinates"
                );
                continue;
            }

            let distance_km = haversine_distance_km(self.reference, location);
            if distance_km <= self.radius_km {
                results.push(ProximityResult {
                    record,
                    distance_km,
                });
            }
        }

        // Vec::sort_by is stable: equal keys keep input order
        results.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));

        if self.order == ResultOrder::Recency {
            results.sort_by(|a, b| b.record.created_at().cmp(&a.record.created_at()));
        }

        if let Some(limit) = self.limit {
            results.truncate(limit);
        }

        tracing::debug!(
            reference = %self.reference,
            radius_km = self.radius_km,
            scanned,
            matched = results.len(),
            "Proximity query complete"
        );

        results
    }
}

/// Return the candidates within `radius_km` of `reference`, nearest first.
///
/// Pass `&records` to get borrowed results or `records` to move them into the
/// result set.
///
/// # Errors
/// `GeoError::InvalidArgument` for a malformed reference point or a
/// non-positive radius. An empty candidate set is not an error.
pub fn query_nearby<R, I>(
    reference: GeoPoint,
    candidates: I,
    radius_km: f64,
) -> Result<Vec<ProximityResult<R>>>
where
    R: GeoRecord,
    I: IntoIterator<Item = R>,
{
    Ok(ProximityQuery::new(reference, radius_km)?.execute(candidates))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Marker {
        id: String,
        location: GeoPoint,
        created_at: u64,
    }

    impl Marker {
        fn new(id: &str, lat: f64, lon: f64, created_at: u64) -> Self {
            Self {
                id: id.to_string(),
                location: GeoPoint {
                    latitude: lat,
                    longitude: lon,
                },
                created_at,
            }
        }
    }

    impl GeoRecord for Marker {
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

    fn nairobi_cbd() -> GeoPoint {
        GeoPoint::new(-1.286389, 36.817221).unwrap()
    }

    fn ids<R: GeoRecord>(results: &[ProximityResult<R>]) -> Vec<String> {
        results.iter().map(|r| r.record.id().to_string()).collect()
    }

    #[test]
    fn test_short_hop_included() {
        let candidates = vec![Marker::new("kenyatta-ave", -1.2833, 36.8167, 1)];
        let results = query_nearby(nairobi_cbd(), &candidates, 1.0).unwrap();

        assert_eq!(results.len(), 1);
        assert!((results[0].distance_km - 0.348).abs() < 0.01);
    }

    #[test]
    fn test_far_candidate_excluded() {
        let candidates = vec![Marker::new("outskirts", -1.3, 36.9, 1)];
        let results = query_nearby(nairobi_cbd(), &candidates, 5.0).unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn test_empty_candidates() {
        let candidates: Vec<Marker> = Vec::new();
        let results = query_nearby(nairobi_cbd(), &candidates, 5.0).unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn test_negative_radius_rejected() {
        let candidates: Vec<Marker> = Vec::new();
        let err = query_nearby(nairobi_cbd(), &candidates, -1.0).unwrap_err();
        assert!(matches!(err, GeoError::InvalidArgument(_)));
    }

    #[test]
    fn test_zero_and_nan_radius_rejected() {
        assert!(ProximityQuery::new(nairobi_cbd(), 0.0).is_err());
        assert!(ProximityQuery::new(nairobi_cbd(), f64::NAN).is_err());
        assert!(ProximityQuery::new(nairobi_cbd(), f64::INFINITY).is_err());
    }

    #[test]
    fn test_invalid_reference_rejected() {
        let reference = GeoPoint {
            latitude: 200.0,
            longitude: 36.8,
        };
        let candidates = vec![Marker::new("a", -1.2833, 36.8167, 1)];
        let err = query_nearby(reference, &candidates, 5.0).unwrap_err();
        assert!(matches!(err, GeoError::InvalidArgument(_)));
    }

    #[test]
    fn test_boundary_is_inclusive() {
        let reference = nairobi_cbd();
        let edge = Marker::new("edge", -1.3, 36.9, 1);
        let radius = haversine_distance_km(reference, edge.location);

        let candidates = vec![edge];
        let results = query_nearby(reference, &candidates, radius).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].distance_km, radius);
    }

    #[test]
    fn test_sorted_nearest_first() {
        let candidates = vec![
            Marker::new("far", -1.30, 36.84, 1),
            Marker::new("near", -1.287, 36.818, 2),
            Marker::new("mid", -1.29, 36.83, 3),
        ];
        let results = query_nearby(nairobi_cbd(), &candidates, 10.0).unwrap();
        assert_eq!(ids(&results), vec!["near", "mid", "far"]);
    }

    #[test]
    fn test_equal_distance_keeps_input_order() {
        // Same spot, three different records
        let candidates = vec![
            Marker::new("b", -1.29, 36.82, 1),
            Marker::new("a", -1.29, 36.82, 2),
            Marker::new("c", -1.29, 36.82, 3),
        ];
        let results = query_nearby(nairobi_cbd(), &candidates, 5.0).unwrap();
        assert_eq!(ids(&results), vec!["b", "a", "c"]);
    }

    #[test]
    fn test_invalid_candidate_skipped() {
        let candidates = vec![
            Marker::new("broken", 95.0, 36.8, 1),
            Marker::new("ok", -1.287, 36.818, 2),
        ];
        let results = query_nearby(nairobi_cbd(), &candidates, 5.0).unwrap();
        assert_eq!(ids(&results), vec!["ok"]);
    }

    #[test]
    fn test_recency_order_with_limit() {
        let candidates = vec![
            Marker::new("old-near", -1.287, 36.818, 100),
            Marker::new("new-far", -1.30, 36.84, 300),
            Marker::new("mid", -1.29, 36.83, 200),
            Marker::new("outside", 0.5, 38.0, 999),
        ];
        let query = ProximityQuery::new(nairobi_cbd(), 5.0)
            .unwrap()
            .with_order(ResultOrder::Recency)
            .with_limit(2);

        let results = query.execute(&candidates);
        assert_eq!(ids(&results), vec!["new-far", "mid"]);
    }

    #[test]
    fn test_owned_candidates_move_into_results() {
        let candidates = vec![Marker::new("owned", -1.287, 36.818, 1)];
        let results: Vec<ProximityResult<Marker>> =
            query_nearby(nairobi_cbd(), candidates, 5.0).unwrap();
        assert_eq!(results[0].record.id, "owned");
    }

    #[test]
    fn test_idempotent() {
        let candidates = vec![
            Marker::new("x", -1.29, 36.83, 1),
            Marker::new("y", -1.287, 36.818, 2),
            Marker::new("z", -1.29, 36.83, 3),
        ];
        let first = query_nearby(nairobi_cbd(), &candidates, 5.0).unwrap();
        let second = query_nearby(nairobi_cbd(), &candidates, 5.0).unwrap();
        assert_eq!(first, second);
    }
}
