//! Session state shared by every request the client issues.
//!
//! [`SessionManager`] is the only component that touches the persisted credential pair.
//! Readers (the authorization step of each request) and writers (login, refresh, logout,
//! expiry) all go through it, and every transition is announced as a [`SessionEvent`] so a
//! presentation layer can react, e.g. by showing the login screen on `Expired`.

use std::sync::{Mutex, MutexGuard};

use log::{debug, info};
use tokio::sync::broadcast;

use super::token::{TokenPair, TokenStore};
use crate::error::ApiError;

const EVENT_CAPACITY: usize = 16;

/// Session transitions, broadcast to every subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// A fresh credential pair was stored after login.
    LoggedIn,
    /// The access token was replaced through the refresh endpoint.
    Refreshed,
    /// The user logged out; credentials were cleared.
    LoggedOut,
    /// The session could not be recovered; credentials were cleared and the user must log in.
    Expired,
}

pub struct SessionManager {
    store: Mutex<Box<dyn TokenStore>>,
    refresh_gate: tokio::sync::Mutex<()>,
    events: broadcast::Sender<SessionEvent>,
}

impl SessionManager {
    pub fn new(store: impl TokenStore + 'static) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            store: Mutex::new(Box::new(store)),
            refresh_gate: tokio::sync::Mutex::new(()),
            events,
        }
    }

    /// Receives every event emitted after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    pub fn credentials(&self) -> Result<Option<TokenPair>, ApiError> {
        self.locked()?.load()
    }

    pub fn access_token(&self) -> Result<Option<String>, ApiError> {
        Ok(self.credentials()?.map(|t| t.access_token))
    }

    pub fn refresh_token(&self) -> Result<Option<String>, ApiError> {
        Ok(self.credentials()?.map(|t| t.refresh_token))
    }

    pub fn is_authenticated(&self) -> Result<bool, ApiError> {
        Ok(self.credentials()?.is_some())
    }

    /// Stores a new pair, replacing whatever was there.
    pub fn store(&self, tokens: TokenPair) -> Result<(), ApiError> {
        self.locked()?.save(&tokens)?;
        info!("Session established");
        self.emit(SessionEvent::LoggedIn);
        Ok(())
    }

    /// Swaps in an access token obtained with `refresh_used` and keeps the refresh token.
    ///
    /// Returns `false` without storing anything when the stored pair no longer holds
    /// `refresh_used`: the session was cleared or replaced by a new login while the refresh was
    /// in flight, and the late token belongs to neither.
    pub fn replace_access(&self, refresh_used: &str, access_token: String) -> Result<bool, ApiError> {
        let store = self.locked()?;
        let Some(current) = store.load()? else {
            debug!("Session cleared during refresh; dropping new access token");
            return Ok(false);
        };
        if current.refresh_token != refresh_used {
            debug!("Session replaced during refresh; dropping new access token");
            return Ok(false);
        }
        store.save(&TokenPair {
            access_token,
            refresh_token: current.refresh_token,
        })?;
        drop(store);
        debug!("Access token replaced");
        self.emit(SessionEvent::Refreshed);
        Ok(true)
    }

    /// Clears the pair on explicit logout.
    pub fn logout(&self) -> Result<(), ApiError> {
        self.locked()?.clear()?;
        info!("Logged out; credentials cleared");
        self.emit(SessionEvent::LoggedOut);
        Ok(())
    }

    /// Clears the pair because it can no longer be used, and tells subscribers to send the
    /// user back to login.
    pub fn expire(&self) -> Result<(), ApiError> {
        self.locked()?.clear()?;
        info!("Session expired; credentials cleared");
        self.emit(SessionEvent::Expired);
        Ok(())
    }

    /// Serialises refresh attempts. Held for the whole refresh round trip.
    pub(crate) async fn refresh_gate(&self) -> tokio::sync::MutexGuard<'_, ()> {
        self.refresh_gate.lock().await
    }

    fn locked(&self) -> Result<MutexGuard<'_, Box<dyn TokenStore>>, ApiError> {
        self.store
            .lock()
            .map_err(|_| ApiError::Storage("session lock poisoned".into()))
    }

    fn emit(&self, event: SessionEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("subscribers", &self.events.receiver_count())
            .finish_non_exhaustive()
    }
}
