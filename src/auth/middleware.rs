//! Client-side authorization interceptor.
//!
//! Every request built by [`crate::client::ApiClient`] passes through here twice: once before
//! sending, to attach the bearer token, and once more if the backend answers 401, to exchange
//! the refresh token for a new access token.

use log::{debug, info, warn};
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, RequestBuilder};

use super::session::SessionManager;
use super::{RefreshRequest, RefreshResponse};
use crate::config::ClientConfig;
use crate::error::ApiError;

pub const REFRESH_PATH: &str = "/auth/refresh/";

/// Attaches `Authorization: Bearer <token>` when there is a token, leaves the request
/// untouched otherwise.
pub fn authorize(builder: RequestBuilder, token: Option<&str>) -> RequestBuilder {
    match token {
        Some(token) => builder.header(AUTHORIZATION, format!("Bearer {}", token)),
        None => builder,
    }
}

/// Exchanges a refresh token for a new access token.
///
/// Goes straight to the transport: no bearer header, no 401 handling.
pub async fn request_refresh(
    http: &Client,
    config: &ClientConfig,
    refresh_token: &str,
) -> Result<String, ApiError> {
    let response = http
        .post(config.endpoint(REFRESH_PATH))
        .json(&RefreshRequest {
            refresh: refresh_token.to_string(),
        })
        .send()
        .await?;

    let status = response.status();
    let body = response.bytes().await?;
    if !status.is_success() {
        return Err(ApiError::from_response(status, &body));
    }
    let refreshed: RefreshResponse = serde_json::from_slice(&body)?;
    Ok(refreshed.access)
}

pub struct AuthInterceptor<'a> {
    pub(crate) http: &'a Client,
    pub(crate) config: &'a ClientConfig,
    pub(crate) session: &'a SessionManager,
}

impl<'a> AuthInterceptor<'a> {
    /// Tries to recover from a 401 received for a request sent with `sent_with`.
    ///
    /// Returns the access token to replay with, or `None` when the session cannot be
    /// recovered (in which case the credentials have been cleared). A refresh that completes
    /// after the pair was replaced by a new login is discarded in favour of the new pair.
    ///
    /// Recoveries are serialised on the session's refresh gate. A waiter that finds the stored
    /// token already different from the one it sent knows another request refreshed in the
    /// meantime and replays with the stored token instead of refreshing again.
    pub async fn recover(&self, sent_with: Option<&str>) -> Result<Option<String>, ApiError> {
        let _gate = self.session.refresh_gate().await;

        let Some(current) = self.session.credentials()? else {
            debug!("No credentials to refresh with");
            return Ok(None);
        };

        if sent_with != Some(current.access_token.as_str()) {
            debug!("Access token changed while waiting; replaying with the stored token");
            return Ok(Some(current.access_token));
        }

        if current.refresh_token.is_empty() {
            info!("No refresh token available; ending session");
            self.session.expire()?;
            return Ok(None);
        }

        match request_refresh(self.http, self.config, &current.refresh_token).await {
            Ok(access) => {
                if self
                    .session
                    .replace_access(&current.refresh_token, access.clone())?
                {
                    info!("Access token refreshed");
                    return Ok(Some(access));
                }
            }
            Err(e) => {
                warn!("Token refresh failed: {}", e);
                if self.session.refresh_token()?.as_deref() == Some(current.refresh_token.as_str()) {
                    self.session.expire()?;
                    return Ok(None);
                }
            }
        }
        // The pair was cleared or replaced by a new login during the refresh.
        debug!("Session changed during refresh; replaying with the stored token");
        self.session.access_token()
    }

    /// Ends the session after a replayed request was rejected again, unless the stored token
    /// has moved on since the replay was sent.
    pub fn reject_replay(&self, replayed_with: Option<&str>) -> Result<(), ApiError> {
        let current = self.session.access_token()?;
        if current.is_some() && current.as_deref() == replayed_with {
            warn!("Replayed request rejected with a fresh token; ending session");
            self.session.expire()?;
        }
        Ok(())
    }
}
