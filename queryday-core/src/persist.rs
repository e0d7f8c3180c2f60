//! The persisted cache record.
//!
//! One JSON document under a single well-known key holds the active session
//! and whichever fact groups have been fetched for it.

use crate::facts::Facts;
use crate::session::{Session, SessionId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Key the record is stored under.
pub const STATE_KEY: &str = "CHRONO_STATE";

/// Current record format version.
pub const RECORD_VERSION: u32 = 1;

/// Errors decoding or encoding the record.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },
}

/// Session identity plus its fact slots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheRecord {
    /// Record format version for compatibility checking.
    pub version: u32,

    /// When the session was started (RFC 3339).
    #[serde(default)]
    pub started_at: String,

    #[serde(flatten)]
    session: Session,

    #[serde(default)]
    pub facts: Facts,
}

impl CacheRecord {
    /// A fresh record with every group absent.
    pub fn new(session: Session) -> Self {
        Self {
            version: RECORD_VERSION,
            started_at: chrono::Utc::now().to_rfc3339(),
            session,
            facts: Facts::default(),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_id(&self) -> SessionId {
        self.session.id()
    }

    pub fn belongs_to(&self, session: &Session) -> bool {
        self.session.id() == session.id()
    }

    pub fn to_json(&self) -> Result<String, PersistError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Decode a stored record, refusing other format versions.
    pub fn from_json(content: &str) -> Result<Self, PersistError> {
        // Check the version before committing to the full shape
        #[derive(Deserialize)]
        struct Partial {
            version: u32,
        }

        let partial: Partial = serde_json::from_str(content)?;
        if partial.version != RECORD_VERSION {
            return Err(PersistError::VersionMismatch {
                expected: RECORD_VERSION,
                found: partial.version,
            });
        }

        Ok(serde_json::from_str(content)?)
    }
}
