//! Community and community post records

use safewatch_core::{is_within_radius, GeoPoint, GeoRecord};
use serde::{Deserialize, Serialize};

/// Display name used for anonymous posts
pub const ANONYMOUS_NAME: &str = "Anonymous";

/// A neighbourhood community anchored at a point with a coverage radius
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Community {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(flatten)]
    pub location: GeoPoint,
    #[serde(alias = "radius")]
    pub radius_km: f64,
    #[serde(default)]
    pub member_count: u32,
    pub created_by: String,
    pub created_at: u64,
}

impl Community {
    /// Whether `point` falls inside the community's coverage area
    pub fn covers(&self, point: GeoPoint) -> bool {
        is_within_radius(point, self.location, self.radius_km)
    }
}

impl GeoRecord for Community {
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

/// A geotagged post in a community feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommunityPost {
    pub id: String,
    pub community_id: String,
    pub user_id: String,
    pub user_name: String,
    pub content: String,
    #[serde(flatten)]
    pub location: GeoPoint,
    #[serde(default)]
    pub media_urls: Vec<String>,
    #[serde(default)]
    pub likes: u32,
    #[serde(default)]
    pub comments: u32,
    #[serde(default)]
    pub is_anonymous: bool,
    pub created_at: u64,
}

impl CommunityPost {
    /// Author name as shown to other users
    pub fn display_name(&self) -> &str {
        if self.is_anonymous {
            ANONYMOUS_NAME
        } else {
            &self.user_name
        }
    }

    pub fn like(&mut self) {
        self.likes = self.likes.saturating_add(1);
    }
}

impl GeoRecord for CommunityPost {
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
