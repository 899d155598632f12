//! Persisted login: access token plus the minimal identity shown in the UI.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::auth::token_fingerprint;
use crate::error::ApiError;
use crate::models::{ClinicProfile, LoginResponseData, UserProfile};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub expires_at: DateTime<Utc>,
    pub user: UserProfile,
    pub clinic: ClinicProfile,
}

impl Session {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

impl From<LoginResponseData> for Session {
    fn from(d: LoginResponseData) -> Self {
        Session {
            access_token: d.access_token,
            expires_at: d.expires_at,
            user: d.dcms_user,
            clinic: d.clinic,
        }
    }
}

/// Shared holder of the current session, optionally backed by a JSON file.
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    path: Option<PathBuf>,
    current: Arc<RwLock<Option<Session>>>,
}

impl SessionStore {
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Load from `path`. Missing, unreadable or expired files start logged out.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let session = read_session(&path).filter(|s| !s.is_expired(Utc::now()));
        if session.is_none() && path.exists() {
            if let Err(e) = fs::remove_file(&path) {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "could not remove stale session file"
                );
            }
        }
        Self {
            path: Some(path),
            current: Arc::new(RwLock::new(session)),
        }
    }

    pub async fn get(&self) -> Option<Session> {
        self.current.read().await.clone()
    }

    pub async fn token(&self) -> Option<String> {
        self.current
            .read()
            .await
            .as_ref()
            .map(|s| s.access_token.clone())
    }

    pub async fn set(&self, session: Session) -> Result<(), ApiError> {
        if let Some(path) = &self.path {
            let json = serde_json::to_string_pretty(&session)
                .map_err(|e| ApiError::Session(format!("encode error: {e}")))?;
            fs::write(path, json)
                .map_err(|e| ApiError::Session(format!("cannot write {}: {e}", path.display())))?;
        }
        tracing::info!(
            user = %session.user.username,
            token = %token_fingerprint(&session.access_token),
            "session stored"
        );
        *self.current.write().await = Some(session);
        Ok(())
    }

    /// Forget the session in memory and on disk.
    pub async fn clear(&self) {
        let previous = self.current.write().await.take();
        if let Some(path) = &self.path {
            if let Err(e) = fs::remove_file(path) {
                if e.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "could not remove session file"
                    );
                }
            }
        }
        if let Some(s) = previous {
            tracing::info!(user = %s.user.username, "session cleared");
        }
    }
}

fn read_session(path: &Path) -> Option<Session> {
    let raw = fs::read_to_string(path).ok()?;
    match serde_json::from_str(&raw) {
        Ok(s) => Some(s),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable session file");
            None
        }
    }
}
