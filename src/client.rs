//! # API Client
//!
//! The request primitive every resource group is built on. A call is described by an
//! [`ApiRequest`], which keeps its body in a replayable form so it can be sent a second time
//! after a token refresh, and carries the per-request `retried` flag that bounds recovery to a
//! single attempt.

use std::sync::Arc;

use log::debug;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::auth::middleware::{authorize, AuthInterceptor};
use crate::auth::{FileTokenStore, SessionManager, TokenStore};
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::models::ImageUpload;

/// A request body that can be rebuilt for every attempt.
#[derive(Debug, Clone, Default)]
pub enum Body {
    #[default]
    Empty,
    Json(Value),
    Multipart(MultipartBody),
}

/// Text fields and file parts of a `multipart/form-data` upload.
#[derive(Debug, Clone, Default)]
pub struct MultipartBody {
    pub fields: Vec<(String, String)>,
    pub files: Vec<(String, ImageUpload)>,
}

impl MultipartBody {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: &str, value: impl ToString) -> Self {
        self.fields.push((name.to_string(), value.to_string()));
        self
    }

    pub fn file(mut self, name: &str, upload: ImageUpload) -> Self {
        self.files.push((name.to_string(), upload));
        self
    }

    fn to_form(&self) -> Result<Form, ApiError> {
        let mut form = Form::new();
        for (name, value) in &self.fields {
            form = form.text(name.clone(), value.clone());
        }
        for (name, upload) in &self.files {
            let part = Part::bytes(upload.bytes.clone())
                .file_name(upload.file_name.clone())
                .mime_str(&upload.content_type)
                .map_err(|e| {
                    ApiError::Config(format!("invalid content type {:?}: {}", upload.content_type, e))
                })?;
            form = form.part(name.clone(), part);
        }
        Ok(form)
    }
}

/// One logical call against the backend.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    body: Body,
    authenticated: bool,
    retried: bool,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: Body::Empty,
            authenticated: true,
            retried: false,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Adds query parameters from any serializable record; `None` fields are skipped.
    pub fn query<Q: Serialize + ?Sized>(mut self, query: &Q) -> Result<Self, ApiError> {
        self.query.extend(query_pairs(query)?);
        Ok(self)
    }

    pub fn param(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self, ApiError> {
        self.body = Body::Json(serde_json::to_value(body)?);
        Ok(self)
    }

    pub fn multipart(mut self, body: MultipartBody) -> Self {
        self.body = Body::Multipart(body);
        self
    }

    /// Sends the request without a bearer token and without 401 recovery.
    ///
    /// Used for the credential exchanges themselves (login, registration), where a 401 means
    /// wrong credentials rather than an expired session.
    pub fn anonymous(mut self) -> Self {
        self.authenticated = false;
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query_params(&self) -> &[(String, String)] {
        &self.query
    }

    pub fn is_retried(&self) -> bool {
        self.retried
    }
}

/// Flattens a serializable record into query-string pairs.
///
/// Nulls are dropped, sequences become repeated keys, nested objects are rejected.
pub fn query_pairs<Q: Serialize + ?Sized>(query: &Q) -> Result<Vec<(String, String)>, ApiError> {
    let mut pairs = Vec::new();
    let object = match serde_json::to_value(query)? {
        Value::Object(object) => object,
        Value::Null => return Ok(pairs),
        other => {
            return Err(ApiError::Decode(format!(
                "query parameters must be a record, got {}",
                other
            )))
        }
    };

    for (key, value) in object {
        let values = match value {
            Value::Array(items) => items,
            single => vec![single],
        };
        for value in values {
            match value {
                Value::Null => {}
                Value::String(s) => pairs.push((key.clone(), s)),
                Value::Bool(_) | Value::Number(_) => pairs.push((key.clone(), value.to_string())),
                _ => {
                    return Err(ApiError::Decode(format!(
                        "query parameter {:?} must be a scalar",
                        key
                    )))
                }
            }
        }
    }
    Ok(pairs)
}

/// Normalizes a list response: bare arrays pass through, paginated envelopes are unwrapped to
/// their `results`, anything else is an empty list.
pub fn normalize_list(body: Value) -> Vec<Value> {
    match body {
        Value::Array(items) => items,
        Value::Object(mut object) => match object.remove("results") {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}

/// HTTP client for the DreamSpace backend.
///
/// Cloning is cheap; clones share the connection pool and the session.
#[derive(Debug, Clone)]
pub struct ApiClient {
    pub(crate) http: Client,
    pub(crate) config: Arc<ClientConfig>,
    pub(crate) session: Arc<SessionManager>,
}

impl ApiClient {
    pub fn new(config: ClientConfig, store: impl TokenStore + 'static) -> Result<Self, ApiError> {
        Self::with_session(config, Arc::new(SessionManager::new(store)))
    }

    /// Builds a client from the environment, persisting tokens to the configured file.
    pub fn from_env() -> Result<Self, ApiError> {
        let config = ClientConfig::from_env()?;
        let store = FileTokenStore::new(config.token_file.clone());
        Self::new(config, store)
    }

    pub fn with_session(
        config: ClientConfig,
        session: Arc<SessionManager>,
    ) -> Result<Self, ApiError> {
        let http = Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("dreamspace/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ApiError::Config(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self {
            http,
            config: Arc::new(config),
            session,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn session(&self) -> &Arc<SessionManager> {
        &self.session
    }

    /// The untyped primitive: `method path [body] [query]` in, JSON out.
    pub async fn request<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        query: &[(&str, &str)],
    ) -> Result<Value, ApiError> {
        let mut request = ApiRequest::new(method, path);
        for (key, value) in query {
            request = request.param(key, value);
        }
        if let Some(body) = body {
            request = request.json(body)?;
        }
        self.execute(request).await
    }

    /// Sends `request`, recovering once from an expired access token.
    pub async fn execute(&self, mut request: ApiRequest) -> Result<Value, ApiError> {
        let mut token = if request.authenticated {
            self.session.access_token()?
        } else {
            None
        };

        loop {
            let (status, body) = self.dispatch(&request, token.as_deref()).await?;
            if status.is_success() {
                if body.is_empty() {
                    return Ok(Value::Null);
                }
                return Ok(serde_json::from_slice(&body)?);
            }

            let error = ApiError::from_response(status, &body);
            if status != StatusCode::UNAUTHORIZED || !request.authenticated {
                return Err(error);
            }

            let interceptor = self.interceptor();
            if request.retried {
                interceptor.reject_replay(token.as_deref())?;
                return Err(error);
            }
            request.retried = true;

            match interceptor.recover(token.as_deref()).await? {
                Some(fresh) => token = Some(fresh),
                None => return Err(error),
            }
        }
    }

    /// Executes `request` and decodes the answer as `T`.
    pub async fn fetch<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T, ApiError> {
        let body = self.execute(request).await?;
        Ok(serde_json::from_value(body)?)
    }

    /// Like [`ApiClient::fetch`] for list endpoints, unwrapping paginated envelopes.
    pub async fn list<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<Vec<T>, ApiError> {
        let body = self.execute(request).await?;
        normalize_list(body)
            .into_iter()
            .map(|item| serde_json::from_value(item).map_err(ApiError::from))
            .collect()
    }

    /// Executes a request whose answer carries no useful body (e.g. `DELETE`).
    pub async fn send(&self, request: ApiRequest) -> Result<(), ApiError> {
        self.execute(request).await.map(|_| ())
    }

    fn interceptor(&self) -> AuthInterceptor<'_> {
        AuthInterceptor {
            http: &self.http,
            config: &self.config,
            session: &self.session,
        }
    }

    async fn dispatch(
        &self,
        request: &ApiRequest,
        token: Option<&str>,
    ) -> Result<(StatusCode, Vec<u8>), ApiError> {
        let mut builder = self
            .http
            .request(request.method.clone(), self.config.endpoint(&request.path));
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        builder = match &request.body {
            Body::Empty => builder,
            Body::Json(value) => builder.json(value),
            Body::Multipart(body) => builder.multipart(body.to_form()?),
        };
        builder = authorize(builder, token);

        let response = builder.send().await?;
        let status = response.status();
        let body = response.bytes().await?.to_vec();
        debug!(
            "{} {} -> {}{}",
            request.method,
            request.path,
            status.as_u16(),
            if request.retried { " (replay)" } else { "" }
        );
        Ok((status, body))
    }
}
