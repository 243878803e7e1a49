use log::debug;

use crate::client::{ApiClient, ApiRequest, MultipartBody};
use crate::error::ApiError;
use crate::models::{
    Canvas, Moodboard, MoodboardInput, MoodboardItem, MoodboardItemUpdate, NewMoodboardItem,
};

pub struct MoodboardsApi<'a> {
    pub(crate) client: &'a ApiClient,
}

impl<'a> MoodboardsApi<'a> {
    pub async fn list(&self, project: Option<i64>) -> Result<Vec<Moodboard>, ApiError> {
        let mut request = ApiRequest::get("/moodboards/");
        if let Some(project) = project {
            request = request.param("project", project);
        }
        self.client.list(request).await
    }

    pub async fn get(&self, id: i64) -> Result<Moodboard, ApiError> {
        self.client
            .fetch(ApiRequest::get(format!("/moodboards/{}/", id)))
            .await
    }

    pub async fn create(&self, data: &MoodboardInput) -> Result<Moodboard, ApiError> {
        self.client
            .fetch(ApiRequest::post("/moodboards/").json(data)?)
            .await
    }

    pub async fn update(&self, id: i64, data: &MoodboardInput) -> Result<Moodboard, ApiError> {
        self.client
            .fetch(ApiRequest::patch(format!("/moodboards/{}/", id)).json(data)?)
            .await
    }

    pub async fn delete(&self, id: i64) -> Result<(), ApiError> {
        self.client
            .send(ApiRequest::delete(format!("/moodboards/{}/", id)))
            .await
    }
}

pub struct MoodboardItemsApi<'a> {
    pub(crate) client: &'a ApiClient,
}

impl<'a> MoodboardItemsApi<'a> {
    pub async fn list(&self, moodboard: Option<i64>) -> Result<Vec<MoodboardItem>, ApiError> {
        let mut request = ApiRequest::get("/moodboard-items/");
        if let Some(moodboard) = moodboard {
            request = request.param("moodboard", moodboard);
        }
        self.client.list(request).await
    }

    /// Uploads an image onto a moodboard.
    pub async fn create(&self, item: NewMoodboardItem) -> Result<MoodboardItem, ApiError> {
        let body = MultipartBody::new()
            .text("moodboard", item.moodboard)
            .file("image", item.image)
            .text("title", item.title)
            .text("description", item.description)
            .text("x", item.x)
            .text("y", item.y);
        self.client
            .fetch(ApiRequest::post("/moodboard-items/").multipart(body))
            .await
    }

    pub async fn update(
        &self,
        id: i64,
        data: &MoodboardItemUpdate,
    ) -> Result<MoodboardItem, ApiError> {
        self.client
            .fetch(ApiRequest::patch(format!("/moodboard-items/{}/", id)).json(data)?)
            .await
    }

    /// Moves an item to a dropped position, clamped to the canvas.
    pub async fn move_to(
        &self,
        id: i64,
        canvas: Canvas,
        x: f64,
        y: f64,
    ) -> Result<MoodboardItem, ApiError> {
        let (x, y) = canvas.clamp(x, y);
        debug!("Moving moodboard item {} to ({}, {})", id, x, y);
        self.update(id, &MoodboardItemUpdate::position(x, y)).await
    }

    pub async fn delete(&self, id: i64) -> Result<(), ApiError> {
        self.client
            .send(ApiRequest::delete(format!("/moodboard-items/{}/", id)))
            .await
    }
}
