pub mod artisan;
pub mod moodboard;
pub mod project;
pub mod task;
pub mod user;

pub use artisan::{
    ArtisanProfile, ArtisanProfileInput, ArtisanProfileList, ArtisanQuery, ExperienceLevel,
    NewPortfolioItem, PortfolioItem, Review, ReviewInput, ServiceCategory,
};
pub use moodboard::{
    Canvas, Moodboard, MoodboardInput, MoodboardItem, MoodboardItemUpdate, NewMoodboardItem,
};
pub use project::{Project, ProjectInput};
pub use task::{Task, TaskInput, TaskStatus};
pub use user::{LoginRequest, LoginResponse, RegisterRequest, Role, User};

/// An image file sent as one part of a multipart upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub file_name: String,
    /// MIME type, e.g. `image/png`.
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes: bytes.into(),
        }
    }
}
