//! Resource call groups.
//!
//! Each group borrows the [`ApiClient`] and shapes parameters for one backend resource; all
//! authentication and error handling happens in the client itself.

pub mod auth;
pub mod marketplace;
pub mod moodboards;
pub mod projects;
pub mod tasks;

use crate::client::ApiClient;

pub use auth::AuthApi;
pub use marketplace::{ArtisansApi, PortfolioApi, ReviewsApi, ServiceCategoriesApi};
pub use moodboards::{MoodboardItemsApi, MoodboardsApi};
pub use projects::ProjectsApi;
pub use tasks::TasksApi;

impl ApiClient {
    pub fn auth(&self) -> AuthApi<'_> {
        AuthApi { client: self }
    }

    pub fn projects(&self) -> ProjectsApi<'_> {
        ProjectsApi { client: self }
    }

    pub fn tasks(&self) -> TasksApi<'_> {
        TasksApi { client: self }
    }

    pub fn moodboards(&self) -> MoodboardsApi<'_> {
        MoodboardsApi { client: self }
    }

    pub fn moodboard_items(&self) -> MoodboardItemsApi<'_> {
        MoodboardItemsApi { client: self }
    }

    pub fn service_categories(&self) -> ServiceCategoriesApi<'_> {
        ServiceCategoriesApi { client: self }
    }

    pub fn artisans(&self) -> ArtisansApi<'_> {
        ArtisansApi { client: self }
    }

    pub fn portfolio(&self) -> PortfolioApi<'_> {
        PortfolioApi { client: self }
    }

    pub fn reviews(&self) -> ReviewsApi<'_> {
        ReviewsApi { client: self }
    }
}
