use crate::client::{ApiClient, ApiRequest};
use crate::error::ApiError;
use crate::models::{Project, ProjectInput};

pub struct ProjectsApi<'a> {
    pub(crate) client: &'a ApiClient,
}

impl<'a> ProjectsApi<'a> {
    pub async fn list(&self) -> Result<Vec<Project>, ApiError> {
        self.client.list(ApiRequest::get("/projects/")).await
    }

    pub async fn get(&self, id: i64) -> Result<Project, ApiError> {
        self.client.fetch(ApiRequest::get(format!("/projects/{}/", id))).await
    }

    pub async fn create(&self, data: &ProjectInput) -> Result<Project, ApiError> {
        self.client
            .fetch(ApiRequest::post("/projects/").json(data)?)
            .await
    }

    pub async fn update(&self, id: i64, data: &ProjectInput) -> Result<Project, ApiError> {
        self.client
            .fetch(ApiRequest::patch(format!("/projects/{}/", id)).json(data)?)
            .await
    }

    pub async fn delete(&self, id: i64) -> Result<(), ApiError> {
        self.client
            .send(ApiRequest::delete(format!("/projects/{}/", id)))
            .await
    }
}
