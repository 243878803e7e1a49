pub mod middleware;
pub mod session;
pub mod store;
pub mod token;

use serde::{Deserialize, Serialize};

// Re-export necessary items
pub use middleware::{authorize, AuthInterceptor};
pub use session::{SessionEvent, SessionManager};
pub use store::{AuthState, AuthStore};
pub use token::{FileTokenStore, MemoryTokenStore, TokenPair, TokenStore};

/// Payload for `POST /auth/refresh/`.
#[derive(Debug, Serialize, Deserialize)]
pub struct RefreshRequest {
    pub refresh: String,
}

/// Answer of the refresh endpoint. Only the access token is replaced; any other field the
/// backend may send is ignored.
#[derive(Debug, Serialize, Deserialize)]
pub struct RefreshResponse {
    pub access: String,
}
