//! Session lifecycle: creation, usage counters, idle expiry.
//!
//! Each session owns a private index collection whose name is derived
//! from the session id, so documents uploaded in one session are never
//! visible to another. The registry only manages bookkeeping; deleting
//! the backing collection is the caller's job, which keeps this module
//! free of index dependencies.
//!
//! # Concurrency
//!
//! The session map sits behind an `RwLock` and each session behind its
//! own `Mutex`: lookups and counter updates on different sessions never
//! contend, while create, delete, and sweep take the map's write lock
//! briefly. Lock order is always map first, then session.

use crate::types::{AppError, Result, SessionStats, UploadedFile};
use chrono::{DateTime, Duration, Utc};
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

/// Idle timeout applied when none is configured.
const DEFAULT_IDLE_TIMEOUT_MINUTES: i64 = 30;

struct Session {
    id: String,
    collection_name: String,
    created_at: DateTime<Utc>,
    last_activity_at: DateTime<Utc>,
    document_count: usize,
    query_count: usize,
    uploaded_files: Vec<UploadedFile>,
}

impl Session {
    fn new(id: String) -> Self {
        let now = Utc::now();
        Self {
            collection_name: SessionRegistry::collection_name(&id),
            id,
            created_at: now,
            last_activity_at: now,
            document_count: 0,
            query_count: 0,
            uploaded_files: Vec::new(),
        }
    }

    fn is_expired(&self, idle_timeout: Duration, now: DateTime<Utc>) -> bool {
        now - self.last_activity_at > idle_timeout
    }

    fn stats(&self, idle_timeout: Duration, now: DateTime<Utc>) -> SessionStats {
        SessionStats {
            id: self.id.clone(),
            collection_name: self.collection_name.clone(),
            created_at: self.created_at,
            last_activity_at: self.last_activity_at,
            document_count: self.document_count,
            query_count: self.query_count,
            uploaded_files: self.uploaded_files.clone(),
            expired: self.is_expired(idle_timeout, now),
        }
    }
}

/// Registry of live sessions keyed by id.
pub struct SessionRegistry {
    sessions: RwLock<HashMap<String, Arc<Mutex<Session>>>>,
    idle_timeout: Duration,
}

impl SessionRegistry {
    /// Create a registry with the given idle timeout.
    pub fn new(idle_timeout: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            idle_timeout,
        }
    }

    /// Collection name owned by a session id.
    ///
    /// Hyphens are replaced so the name stays valid for collection-name
    /// conventions that reject them. The mapping is deterministic, which
    /// lets callers derive the collection of a session that has already
    /// been swept.
    pub fn collection_name(session_id: &str) -> String {
        format!("session_{}", session_id.replace('-', "_"))
    }

    /// Create a session and return its id.
    ///
    /// Ids are random UUIDs; an id deleted from the registry is never
    /// handed out again.
    pub fn create(&self) -> String {
        let id = Uuid::new_v4().to_string();
        let session = Session::new(id.clone());
        self.sessions
            .write()
            .insert(id.clone(), Arc::new(Mutex::new(session)));
        info!(session_id = %id, "Created session");
        id
    }

    fn get(&self, id: &str) -> Result<Arc<Mutex<Session>>> {
        self.sessions
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Session '{}'", id)))
    }

    /// Resolve the collection a session's documents live in.
    pub fn collection_for(&self, id: &str) -> Result<String> {
        let session = self.get(id)?;
        let name = session.lock().collection_name.clone();
        Ok(name)
    }

    /// Mark the session as active now.
    pub fn touch(&self, id: &str) -> Result<()> {
        let session = self.get(id)?;
        session.lock().last_activity_at = Utc::now();
        Ok(())
    }

    /// Record a completed upload: one more document, plus a history
    /// entry carrying the chunk count.
    pub fn record_upload(&self, id: &str, file_name: &str, chunk_count: usize) -> Result<()> {
        let session = self.get(id)?;
        let mut session = session.lock();
        session.document_count += 1;
        session.last_activity_at = Utc::now();
        session.uploaded_files.push(UploadedFile {
            file_name: file_name.to_string(),
            chunk_count,
            uploaded_at: Utc::now(),
        });
        debug!(session_id = id, file_name, chunk_count, "Recorded upload");
        Ok(())
    }

    /// Record an answered query.
    pub fn record_query(&self, id: &str) -> Result<()> {
        let session = self.get(id)?;
        let mut session = session.lock();
        session.query_count += 1;
        session.last_activity_at = Utc::now();
        Ok(())
    }

    /// Whether a session has exceeded its idle timeout.
    ///
    /// An unknown id reports expired; callers treating the result as
    /// "safe to clean up" get the right answer either way.
    pub fn is_expired(&self, id: &str) -> bool {
        match self.get(id) {
            Ok(session) => session.lock().is_expired(self.idle_timeout, Utc::now()),
            Err(_) => true,
        }
    }

    /// Snapshot one session's stats.
    pub fn stats(&self, id: &str) -> Result<SessionStats> {
        let session = self.get(id)?;
        let stats = session.lock().stats(self.idle_timeout, Utc::now());
        Ok(stats)
    }

    /// Snapshot every live session, in no particular order.
    pub fn list_stats(&self) -> Vec<SessionStats> {
        let now = Utc::now();
        self.sessions
            .read()
            .values()
            .map(|session| session.lock().stats(self.idle_timeout, now))
            .collect()
    }

    /// Number of live sessions.
    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    /// Whether no sessions are live.
    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }

    /// Delete a session from the registry.
    ///
    /// The caller is responsible for deleting the session's collection;
    /// use [`SessionRegistry::collection_name`] to derive it.
    pub fn delete(&self, id: &str) -> Result<()> {
        if self.sessions.write().remove(id).is_none() {
            return Err(AppError::NotFound(format!("Session '{}'", id)));
        }
        info!(session_id = id, "Deleted session");
        Ok(())
    }

    /// Remove every expired session and return their ids.
    ///
    /// The caller deletes the matching collections afterwards; the
    /// registry itself never touches the index.
    pub fn sweep_expired(&self) -> Vec<String> {
        let now = Utc::now();
        let mut sessions = self.sessions.write();

        let expired: Vec<String> = sessions
            .iter()
            .filter(|(_, session)| session.lock().is_expired(self.idle_timeout, now))
            .map(|(id, _)| id.clone())
            .collect();

        for id in &expired {
            sessions.remove(id);
        }

        if !expired.is_empty() {
            info!(count = expired.len(), "Swept expired sessions");
        }
        expired
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new(Duration::minutes(DEFAULT_IDLE_TIMEOUT_MINUTES))
    }
}
