//! Persistence of the `token` / `flush_token` pair between runs.

#[cfg(unix)]
use std::fs::Permissions;
use std::io::ErrorKind;
#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;
use std::path::PathBuf;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::api::errors::ApiError;
use crate::forms::FormError;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("not logged in")]
    NotLoggedIn,

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Form(#[from] FormError),

    #[error("token storage error: {0}")]
    Io(#[from] std::io::Error),

    #[error("token storage is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

impl SessionError {
    /// True when the server could not be reached.
    pub fn is_transport(&self) -> bool {
        matches!(self, SessionError::Api(err) if err.is_transport())
    }
}

pub type SessionResult<T> = Result<T, SessionError>;

/// Stored credentials, keyed the way the server names them.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredTokens {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flush_token: Option<String>,
}

#[async_trait]
pub trait TokenStorage: Send + Sync {
    async fn load(&self) -> SessionResult<StoredTokens>;
    async fn save(&self, tokens: &StoredTokens) -> SessionResult<()>;
    /// Removes both keys.
    async fn clear(&self) -> SessionResult<()>;
}

/// Owner read/write only.
#[cfg(unix)]
const TOKEN_FILE_MODE: u32 = 0o600;

/// JSON file storage, by default under the platform config directory.
#[derive(Clone, Debug)]
pub struct FileTokenStorage {
    path: PathBuf,
}

impl FileTokenStorage {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

#[async_trait]
impl TokenStorage for FileTokenStorage {
    async fn load(&self) -> SessionResult<StoredTokens> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(StoredTokens::default()),
            Err(err) => Err(err.into()),
        }
    }

    async fn save(&self, tokens: &StoredTokens) -> SessionResult<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let bytes = serde_json::to_vec_pretty(tokens)?;

        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        options.mode(TOKEN_FILE_MODE);
        let mut file = options.open(&self.path).await?;
        // A file left by an older run keeps its mode on open.
        #[cfg(unix)]
        file.set_permissions(Permissions::from_mode(TOKEN_FILE_MODE))
            .await?;
        file.write_all(&bytes).await?;
        file.flush().await?;
        Ok(())
    }

    async fn clear(&self) -> SessionResult<()> {
        match tokio::fs::remove_file(&self.path).await {
            Err(err) if err.kind() != ErrorKind::NotFound => Err(err.into()),
            _ => Ok(()),
        }
    }
}

/// In-process storage used when nothing should touch the disk.
#[derive(Debug, Default)]
pub struct MemoryTokenStorage {
    tokens: Mutex<StoredTokens>,
}

impl MemoryTokenStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tokens(tokens: StoredTokens) -> Self {
        Self {
            tokens: Mutex::new(tokens),
        }
    }

    pub async fn snapshot(&self) -> StoredTokens {
        self.tokens.lock().await.clone()
    }
}

#[async_trait]
impl TokenStorage for MemoryTokenStorage {
    async fn load(&self) -> SessionResult<StoredTokens> {
        Ok(self.snapshot().await)
    }

    async fn save(&self, tokens: &StoredTokens) -> SessionResult<()> {
        *self.tokens.lock().await = tokens.clone();
        Ok(())
    }

    async fn clear(&self) -> SessionResult<()> {
        *self.tokens.lock().await = StoredTokens::default();
        Ok(())
    }
}
