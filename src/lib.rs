#![doc = "The `dreamspace` library crate."]
#![doc = ""]
#![doc = "An authenticated client for the DreamSpace PM backend: bearer-token injection,"]
#![doc = "transparent access-token refresh, persisted credentials, and typed call groups for"]
#![doc = "projects, tasks, moodboards and the artisan marketplace."]

pub mod api;
pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod models;

pub use auth::{AuthStore, SessionEvent, SessionManager};
pub use client::{ApiClient, ApiRequest};
pub use config::ClientConfig;
pub use error::ApiError;
