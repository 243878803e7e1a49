use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::ImageUpload;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ServiceCategory {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ExperienceLevel {
    Beginner,
    Intermediate,
    Expert,
    Master,
}

/// Full artisan profile, including portfolio and reviews.
///
/// Ratings and money amounts are decimal strings on the wire and are kept that way.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ArtisanProfile {
    pub id: i64,
    pub user: i64,
    #[serde(default)]
    pub user_name: String,
    #[serde(default)]
    pub user_email: String,
    pub business_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub services: Vec<ServiceCategory>,
    pub experience_level: ExperienceLevel,
    #[serde(default)]
    pub years_of_experience: u32,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub website: String,
    #[serde(default)]
    pub instagram: String,
    #[serde(default)]
    pub facebook: String,
    #[serde(default)]
    pub is_available: bool,
    #[serde(default)]
    pub is_featured: bool,
    pub average_rating: String,
    #[serde(default)]
    pub total_reviews: u32,
    #[serde(default)]
    pub total_projects: u32,
    pub hourly_rate: Option<String>,
    pub min_project_budget: Option<String>,
    #[serde(default)]
    pub portfolio: Vec<PortfolioItem>,
    #[serde(default)]
    pub reviews: Vec<Review>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The condensed row returned by the marketplace listing.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ArtisanProfileList {
    pub id: i64,
    #[serde(default)]
    pub user_name: String,
    pub business_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub services: Vec<ServiceCategory>,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub is_available: bool,
    pub average_rating: String,
    #[serde(default)]
    pub total_reviews: u32,
    #[serde(default)]
    pub total_projects: u32,
    pub hourly_rate: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Writable profile fields. Services are referenced by id.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct ArtisanProfileInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_ids: Option<Vec<i64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub experience_level: Option<ExperienceLevel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub years_of_experience: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instagram: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub facebook: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_available: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hourly_rate: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_project_budget: Option<String>,
}

/// Marketplace filters for `GET /artisans/`. Unset filters are left out of the query string.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct ArtisanQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub experience: Option<ExperienceLevel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub featured: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_rating: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PortfolioItem {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub image: Option<String>,
    pub project_date: Option<NaiveDate>,
    #[serde(default)]
    pub client_name: String,
    pub created_at: DateTime<Utc>,
}

/// Upload of a new portfolio piece. Sent as `multipart/form-data`.
#[derive(Debug, Clone)]
pub struct NewPortfolioItem {
    pub artisan: i64,
    pub image: ImageUpload,
    pub title: String,
    pub description: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Review {
    pub id: i64,
    pub artisan: i64,
    pub reviewer: i64,
    #[serde(default)]
    pub reviewer_name: String,
    #[serde(default)]
    pub reviewer_username: String,
    pub project: Option<i64>,
    pub rating: u8,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub comment: String,
    pub professionalism: Option<u8>,
    pub quality_of_work: Option<u8>,
    pub timeliness: Option<u8>,
    pub communication: Option<u8>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A new review. The reviewer is taken from the session by the backend.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct ReviewInput {
    pub artisan: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<i64>,
    pub rating: u8,
    pub title: String,
    pub comment: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub professionalism: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality_of_work: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeliness: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub communication: Option<u8>,
}
