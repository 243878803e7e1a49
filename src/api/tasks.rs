use crate::client::{ApiClient, ApiRequest};
use crate::error::ApiError;
use crate::models::{Task, TaskInput};

pub struct TasksApi<'a> {
    pub(crate) client: &'a ApiClient,
}

impl<'a> TasksApi<'a> {
    /// All visible tasks, or only those of `project`.
    pub async fn list(&self, project: Option<i64>) -> Result<Vec<Task>, ApiError> {
        let mut request = ApiRequest::get("/tasks/");
        if let Some(project) = project {
            request = request.param("project", project);
        }
        self.client.list(request).await
    }

    pub async fn create(&self, data: &TaskInput) -> Result<Task, ApiError> {
        self.client.fetch(ApiRequest::post("/tasks/").json(data)?).await
    }

    pub async fn update(&self, id: i64, data: &TaskInput) -> Result<Task, ApiError> {
        self.client
            .fetch(ApiRequest::patch(format!("/tasks/{}/", id)).json(data)?)
            .await
    }

    pub async fn delete(&self, id: i64) -> Result<(), ApiError> {
        self.client
            .send(ApiRequest::delete(format!("/tasks/{}/", id)))
            .await
    }
}
