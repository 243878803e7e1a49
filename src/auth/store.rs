//! The authentication state a UI binds to: who is logged in, whether a login is in progress,
//! and the last error message to show.

use log::{info, warn};
use tokio::sync::RwLock;

use super::token::TokenPair;
use crate::client::ApiClient;
use crate::error::ApiError;
use crate::models::{LoginRequest, RegisterRequest, User};

pub const LOGIN_FAILED: &str = "Login failed. Please check your credentials.";
pub const REGISTRATION_FAILED: &str = "Registration failed. Please try again.";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthState {
    pub user: Option<User>,
    pub is_loading: bool,
    pub error: Option<String>,
}

pub struct AuthStore {
    client: ApiClient,
    state: RwLock<AuthState>,
}

impl AuthStore {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            state: RwLock::new(AuthState::default()),
        }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub async fn state(&self) -> AuthState {
        self.state.read().await.clone()
    }

    pub async fn user(&self) -> Option<User> {
        self.state.read().await.user.clone()
    }

    /// Logs in, persists the token pair and loads the current user.
    ///
    /// On failure the error is both recorded in the state (as a displayable message) and
    /// returned.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, ApiError> {
        self.begin().await;
        match self.authenticate(email, password).await {
            Ok(user) => Ok(self.finish(user).await),
            Err(e) => {
                let message = e.detail().unwrap_or(LOGIN_FAILED).to_string();
                self.fail(message).await;
                Err(e)
            }
        }
    }

    /// Creates the account, then logs in with the same credentials.
    ///
    /// Either step failing records the registration message, not the login one.
    pub async fn register(&self, data: &RegisterRequest) -> Result<User, ApiError> {
        self.begin().await;
        let result = match self.client.auth().register(data).await {
            Ok(_) => self.authenticate(&data.email, &data.password).await,
            Err(e) => Err(e),
        };
        match result {
            Ok(user) => Ok(self.finish(user).await),
            Err(e) => {
                let message = e
                    .field_errors("email")
                    .first()
                    .cloned()
                    .unwrap_or_else(|| REGISTRATION_FAILED.to_string());
                self.fail(message).await;
                Err(e)
            }
        }
    }

    /// Clears the stored credentials and forgets the user.
    pub async fn logout(&self) -> Result<(), ApiError> {
        self.client.session().logout()?;
        self.state.write().await.user = None;
        Ok(())
    }

    /// Reloads the current user if a session exists.
    ///
    /// Without a stored access token this resolves to `None` without touching the network.
    /// A failure leaves the tokens alone; the request path has already cleared them if the
    /// session was unrecoverable.
    pub async fn fetch_user(&self) -> Result<Option<User>, ApiError> {
        if self.client.session().access_token()?.is_none() {
            let mut state = self.state.write().await;
            state.user = None;
            state.is_loading = false;
            return Ok(None);
        }

        self.state.write().await.is_loading = true;
        let result = self.client.auth().current_user().await;
        let mut state = self.state.write().await;
        state.is_loading = false;
        match result {
            Ok(user) => {
                state.user = Some(user.clone());
                Ok(Some(user))
            }
            Err(e) => {
                warn!("Failed to fetch user: {}", e);
                state.user = None;
                Err(e)
            }
        }
    }

    pub async fn clear_error(&self) {
        self.state.write().await.error = None;
    }

    async fn authenticate(&self, email: &str, password: &str) -> Result<User, ApiError> {
        let tokens = self
            .client
            .auth()
            .login(&LoginRequest {
                email: email.to_string(),
                password: password.to_string(),
            })
            .await?;
        self.client
            .session()
            .store(TokenPair::new(tokens.access, tokens.refresh))?;
        self.client.auth().current_user().await
    }

    async fn finish(&self, user: User) -> User {
        info!("Logged in as {} ({:?})", user.email, user.role);
        let mut state = self.state.write().await;
        state.user = Some(user.clone());
        state.is_loading = false;
        user
    }

    async fn begin(&self) {
        let mut state = self.state.write().await;
        state.is_loading = true;
        state.error = None;
    }

    async fn fail(&self, message: String) {
        let mut state = self.state.write().await;
        state.is_loading = false;
        state.error = Some(message);
    }
}
