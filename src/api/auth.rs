use crate::auth::middleware::request_refresh;
use crate::auth::RefreshResponse;
use crate::client::{ApiClient, ApiRequest};
use crate::error::ApiError;
use crate::models::{LoginRequest, LoginResponse, RegisterRequest, User};

/// Credential exchanges and the "who am I" lookup.
///
/// These calls do not touch the stored credentials; [`crate::auth::AuthStore`] decides what to
/// persist.
pub struct AuthApi<'a> {
    pub(crate) client: &'a ApiClient,
}

impl<'a> AuthApi<'a> {
    /// Exchange email and password for a token pair.
    pub async fn login(&self, credentials: &LoginRequest) -> Result<LoginResponse, ApiError> {
        let request = ApiRequest::post("/auth/login/")
            .json(credentials)?
            .anonymous();
        self.client.fetch(request).await
    }

    /// Exchange a refresh token for a new access token.
    pub async fn refresh(&self, refresh_token: &str) -> Result<RefreshResponse, ApiError> {
        let access = request_refresh(&self.client.http, &self.client.config, refresh_token).await?;
        Ok(RefreshResponse { access })
    }

    /// Create an account. Does not log in.
    pub async fn register(&self, data: &RegisterRequest) -> Result<User, ApiError> {
        let request = ApiRequest::post("/users/").json(data)?.anonymous();
        self.client.fetch(request).await
    }

    pub async fn current_user(&self) -> Result<User, ApiError> {
        self.client.fetch(ApiRequest::get("/users/me/")).await
    }
}
