use std::fs::{self, OpenOptions};
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// The persisted credential pair.
///
/// Field names double as the fixed storage keys, so a token file reads
/// `{"access_token": "...", "refresh_token": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

impl TokenPair {
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
        }
    }
}

/// Persistence backend for the credential pair.
///
/// Implementations are only ever called by [`super::session::SessionManager`], which
/// serialises access to them.
pub trait TokenStore: Send + Sync {
    /// Returns the stored pair, `None` when nothing is stored.
    fn load(&self) -> Result<Option<TokenPair>, ApiError>;
    fn save(&self, tokens: &TokenPair) -> Result<(), ApiError>;
    fn clear(&self) -> Result<(), ApiError>;
}

/// Keeps the pair in memory only. Nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    tokens: std::sync::Mutex<Option<TokenPair>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tokens(tokens: TokenPair) -> Self {
        Self {
            tokens: std::sync::Mutex::new(Some(tokens)),
        }
    }

    fn slot(&self) -> Result<std::sync::MutexGuard<'_, Option<TokenPair>>, ApiError> {
        self.tokens
            .lock()
            .map_err(|_| ApiError::Storage("token store lock poisoned".into()))
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<TokenPair>, ApiError> {
        Ok(self.slot()?.clone())
    }

    fn save(&self, tokens: &TokenPair) -> Result<(), ApiError> {
        *self.slot()? = Some(tokens.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), ApiError> {
        *self.slot()? = None;
        Ok(())
    }
}

/// Stores the pair as a JSON file, surviving restarts until an explicit logout.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sibling of the token file that a save is written to before being renamed into place.
    fn staging_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_else(|| "tokens".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

/// Writes `bytes` to a fresh file only the current user can read.
fn write_private(path: &Path, bytes: &[u8]) -> io::Result<()> {
    match fs::remove_file(path) {
        Err(e) if e.kind() != ErrorKind::NotFound => return Err(e),
        _ => {}
    }
    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options.open(path)?;
    file.write_all(bytes)?;
    file.sync_all()
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<TokenPair>, ApiError> {
        match fs::read(&self.path) {
            Ok(bytes) => {
                let tokens = serde_json::from_slice(&bytes).map_err(|e| {
                    ApiError::Storage(format!("corrupt token file {}: {}", self.path.display(), e))
                })?;
                Ok(Some(tokens))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, tokens: &TokenPair) -> Result<(), ApiError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let bytes = serde_json::to_vec_pretty(tokens)
            .map_err(|e| ApiError::Storage(format!("failed to encode tokens: {}", e)))?;

        // Readers only ever see the old file or the complete new one.
        let staging = self.staging_path();
        let written =
            write_private(&staging, &bytes).and_then(|()| fs::rename(&staging, &self.path));
        if let Err(e) = written {
            let _ = fs::remove_file(&staging);
            return Err(e.into());
        }
        debug!("Saved credentials to {}", self.path.display());
        Ok(())
    }

    fn clear(&self) -> Result<(), ApiError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
