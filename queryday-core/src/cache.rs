//! The fact cache orchestrator.
//!
//! [`FactCache::ensure_group`] is the one entry point presentation code needs:
//! it answers from the persisted record when it can, and otherwise runs the
//! group's fetch plan, merges the result into the record and persists it.

use crate::facts::{CoreFacts, CultureFacts, FactGroup, FactGroupName, TechFacts};
use crate::persist::{CacheRecord, PersistError, STATE_KEY};
use crate::session::{resolve_session, Session, SessionError, SessionRequest};
use crate::source::FactSource;
use crate::store::{RecordStore, StoreError};
use crate::tasks::fetch_group;
use thiserror::Error;
use tokio::sync::Mutex;

/// Errors crossing the cache boundary.
#[derive(Debug, Error)]
pub enum CacheError {
    /// No record exists, or it belongs to another session.
    #[error("No active session. Please enter a birth date first.")]
    NoSession,

    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),

    #[error("Record error: {0}")]
    Record(#[from] PersistError),

    #[error("Expected {expected} facts, got {found}")]
    UnexpectedGroup {
        expected: FactGroupName,
        found: FactGroupName,
    },
}

/// Session-scoped, on-demand cache of fact groups.
pub struct FactCache<S, F> {
    store: S,
    source: F,
    key: String,
    /// Serializes the read-modify-write of the record.
    write_lock: Mutex<()>,
}

impl<S, F> FactCache<S, F>
where
    S: RecordStore,
    F: FactSource,
{
    pub fn new(store: S, source: F) -> Self {
        Self {
            store,
            source,
            key: STATE_KEY.to_string(),
            write_lock: Mutex::new(()),
        }
    }

    /// Use a different storage key for the record.
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn source(&self) -> &F {
        &self.source
    }

    /// Replace whatever record exists with a fresh one for `session`.
    pub async fn start_session(&self, session: Session) -> Result<CacheRecord, CacheError> {
        let _guard = self.write_lock.lock().await;

        let record = CacheRecord::new(session);
        self.persist(&record).await?;

        tracing::info!(
            session = %record.session_id(),
            date = %record.session().date,
            city = record.session().city().unwrap_or("-"),
            "session started"
        );
        Ok(record)
    }

    /// Validate and geocode a request, then start a session for it.
    pub async fn establish_session(&self, request: &SessionRequest) -> Result<Session, SessionError> {
        let session = resolve_session(&self.source, request).await?;
        self.start_session(session.clone()).await?;
        Ok(session)
    }

    /// The session of the stored record.
    pub async fn active_session(&self) -> Result<Session, CacheError> {
        let record = self.load().await?.ok_or(CacheError::NoSession)?;
        Ok(record.session().clone())
    }

    /// Read-only copy of the record for `session`. Never fetches.
    pub async fn snapshot(&self, session: &Session) -> Result<CacheRecord, CacheError> {
        self.load_for(session).await
    }

    /// A group if it is already present. Never fetches.
    pub async fn cached(
        &self,
        group: FactGroupName,
        session: &Session,
    ) -> Result<Option<FactGroup>, CacheError> {
        Ok(self.load_for(session).await?.facts.get(group))
    }

    /// Return `group` for `session`, fetching and persisting it on a miss.
    ///
    /// Upstream failures never surface here; each sub-field settles to its
    /// fallback. Only a missing or replaced session and storage failures do.
    pub async fn ensure_group(
        &self,
        group: FactGroupName,
        session: &Session,
    ) -> Result<FactGroup, CacheError> {
        let record = self.load_for(session).await?;
        if let Some(hit) = record.facts.get(group) {
            tracing::debug!(%group, "cache hit");
            return Ok(hit);
        }

        tracing::info!(%group, date = %session.date, "cache miss, fetching");
        let fetched = fetch_group(&self.source, group, session).await;
        if fetched.name() != group {
            return Err(CacheError::UnexpectedGroup {
                expected: group,
                found: fetched.name(),
            });
        }

        self.commit(fetched, session).await
    }

    pub async fn ensure_core(&self, session: &Session) -> Result<CoreFacts, CacheError> {
        match self.ensure_group(FactGroupName::Core, session).await? {
            FactGroup::Core(core) => Ok(core),
            other => Err(unexpected(FactGroupName::Core, &other)),
        }
    }

    pub async fn ensure_culture(&self, session: &Session) -> Result<CultureFacts, CacheError> {
        match self.ensure_group(FactGroupName::Culture, session).await? {
            FactGroup::Culture(culture) => Ok(culture),
            other => Err(unexpected(FactGroupName::Culture, &other)),
        }
    }

    pub async fn ensure_tech(&self, session: &Session) -> Result<TechFacts, CacheError> {
        match self.ensure_group(FactGroupName::Tech, session).await? {
            FactGroup::Tech(tech) => Ok(tech),
            other => Err(unexpected(FactGroupName::Tech, &other)),
        }
    }

    /// Delete the stored record.
    pub async fn end_session(&self) -> Result<(), CacheError> {
        let _guard = self.write_lock.lock().await;
        self.store.remove(&self.key).await?;
        tracing::info!("session ended");
        Ok(())
    }

    // ========================================================================
    // Record access
    // ========================================================================

    async fn load(&self) -> Result<Option<CacheRecord>, CacheError> {
        match self.store.get(&self.key).await? {
            Some(content) => Ok(Some(CacheRecord::from_json(&content)?)),
            None => Ok(None),
        }
    }

    async fn load_for(&self, session: &Session) -> Result<CacheRecord, CacheError> {
        match self.load().await? {
            Some(record) if record.belongs_to(session) => Ok(record),
            Some(record) => {
                tracing::debug!(
                    stored = %record.session_id(),
                    requested = %session.id(),
                    "record belongs to another session"
                );
                Err(CacheError::NoSession)
            }
            None => Err(CacheError::NoSession),
        }
    }

    /// Merge one fetched group into the current record.
    ///
    /// Siblings written since the initial read are kept. If the same group
    /// was committed meanwhile, the stored value wins and is returned.
    async fn commit(&self, fetched: FactGroup, session: &Session) -> Result<FactGroup, CacheError> {
        let _guard = self.write_lock.lock().await;
        let group = fetched.name();

        let mut record = self.load_for(session).await.inspect_err(|_| {
            tracing::warn!(%group, "session replaced while fetching, discarding result");
        })?;

        if let Some(stored) = record.facts.get(group) {
            tracing::debug!(%group, "group committed concurrently, keeping stored value");
            return Ok(stored);
        }

        record.facts.insert(fetched.clone());
        self.persist(&record).await?;
        tracing::info!(%group, present = ?record.facts.present_groups(), "group persisted");
        Ok(fetched)
    }

    async fn persist(&self, record: &CacheRecord) -> Result<(), CacheError> {
        let content = record.to_json()?;
        self.store.set(&self.key, content).await?;
        Ok(())
    }
}

fn unexpected(expected: FactGroupName, found: &FactGroup) -> CacheError {
    CacheError::UnexpectedGroup {
        expected,
        found: found.name(),
    }
}
