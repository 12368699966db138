//! Local persistence store.
//!
//! A façade over a [`KvBackend`] holding four JSON collections (users, posts,
//! comments, likes) and a current-session slot. Reads never fail: a missing,
//! unavailable or corrupted collection reads as empty. Writes return
//! [`StoreError`].
//!
//! Every mutation is a read-modify-write of whole collections. The touched
//! collections are committed together, conditioned on the versions that were
//! read, so a comment and its post's counter can't drift apart and a writer
//! in another process can't be silently overwritten.

mod comments;
mod error;
pub mod models;
mod posts;
mod session;
mod users;

use std::sync::{Arc, Mutex};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::kv::{Expect, KvBackend, KvWrite, MemoryBackend};

pub use self::error::{StoreError, StoreResult};
pub use self::models::{
    Comment, LegacyKeys, Like, LikeToggle, NewUser, Post, ReactionKind, Reactions, StoreStats,
    Timestamp, User, UserPatch,
};

pub const DEFAULT_NAMESPACE: &str = "facecrook";

/// Storage keys for one namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreKeys {
    pub users: String,
    pub posts: String,
    pub comments: String,
    pub likes: String,
    pub session: String,
}

impl StoreKeys {
    pub fn new(namespace: &str) -> Self {
        Self {
            users: format!("{}-users", namespace),
            posts: format!("{}-posts", namespace),
            comments: format!("{}-comments", namespace),
            likes: format!("{}-likes", namespace),
            session: format!("{}-user", namespace),
        }
    }
}

impl Default for StoreKeys {
    fn default() -> Self {
        Self::new(DEFAULT_NAMESPACE)
    }
}

#[derive(Debug, Clone)]
pub struct StoreOptions {
    pub namespace: String,
    /// Extra attempts after a conditional commit loses to another writer
    pub max_write_retries: u32,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            max_write_retries: 3,
        }
    }
}

/// A decoded value plus the precondition that pins it to the version read.
pub(crate) struct Snapshot<T> {
    key: String,
    pub(crate) value: T,
    expect: Expect,
}

impl<T: Serialize> Snapshot<T> {
    fn to_write(&self) -> StoreResult<KvWrite> {
        let json = serde_json::to_string(&self.value)
            .map_err(|e| StoreError::Backend(format!("failed to encode {}: {}", self.key, e)))?;
        Ok(KvWrite::put(self.key.clone(), json, self.expect))
    }
}

pub struct LocalStore {
    backend: Arc<dyn KvBackend>,
    keys: StoreKeys,
    max_write_retries: u32,
    // Serializes read-modify-write cycles within this process
    write_lock: Mutex<()>,
}

impl LocalStore {
    pub fn new(backend: Arc<dyn KvBackend>, options: StoreOptions) -> Self {
        Self {
            backend,
            keys: StoreKeys::new(&options.namespace),
            max_write_retries: options.max_write_retries,
            write_lock: Mutex::new(()),
        }
    }

    /// Store over a fresh [`MemoryBackend`] with default options.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryBackend::new()), StoreOptions::default())
    }

    pub fn keys(&self) -> &StoreKeys {
        &self.keys
    }

    pub fn is_available(&self) -> bool {
        self.backend.is_available()
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Erase the four collections. The session slot is left alone.
    pub fn clear_all_data(&self) -> StoreResult<()> {
        self.transact("clear_all_data", || {
            let writes: Vec<KvWrite> = [
                &self.keys.users,
                &self.keys.posts,
                &self.keys.comments,
                &self.keys.likes,
            ]
            .into_iter()
            .map(|key| KvWrite::delete(key.clone(), Expect::Any))
            .collect();
            Ok(((), writes))
        })?;

        tracing::info!("Cleared all store data");
        Ok(())
    }

    pub fn get_stats(&self) -> StoreStats {
        StoreStats {
            users: self.read_or_empty::<User>(&self.keys.users).len(),
            posts: self.read_or_empty::<Post>(&self.keys.posts).len(),
            comments: self.read_or_empty::<Comment>(&self.keys.comments).len(),
            likes: self.read_or_empty::<Like>(&self.keys.likes).len(),
        }
    }

    /// Read and decode one key. A missing key decodes as `T::default()`.
    pub(crate) fn load<T>(&self, key: &str) -> StoreResult<Snapshot<T>>
    where
        T: DeserializeOwned + Default,
    {
        let stored = self.backend.get(key)?;
        let expect = Expect::from_read(stored.as_ref());

        let value = match stored {
            Some(v) => serde_json::from_str(&v.value).map_err(|source| StoreError::Parse {
                key: key.to_string(),
                source,
            })?,
            None => T::default(),
        };

        Ok(Snapshot {
            key: key.to_string(),
            value,
            expect,
        })
    }

    /// Read path: never fails, degrades to an empty collection.
    pub(crate) fn read_or_empty<T>(&self, key: &str) -> Vec<T>
    where
        T: DeserializeOwned,
    {
        match self.load::<Vec<T>>(key) {
            Ok(snapshot) => snapshot.value,
            Err(StoreError::StorageUnavailable) => Vec::new(),
            Err(e) => {
                tracing::warn!("Reading {} failed, treating as empty: {}", key, e);
                Vec::new()
            }
        }
    }

    /// Run a read-modify-write cycle under the write lock.
    ///
    /// `cycle` reads what it needs through [`LocalStore::load`] and returns
    /// the result plus the writes to commit. If the commit loses to a
    /// concurrent writer the whole cycle re-runs against fresh reads.
    pub(crate) fn transact<R, F>(&self, op: &str, mut cycle: F) -> StoreResult<R>
    where
        F: FnMut() -> StoreResult<(R, Vec<KvWrite>)>,
    {
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());

        let mut attempt = 0;
        loop {
            let (result, writes) = cycle()?;
            if writes.is_empty() {
                return Ok(result);
            }

            match self.backend.commit(&writes) {
                Ok(()) => return Ok(result),
                Err(StoreError::Conflict(reason)) if attempt < self.max_write_retries => {
                    attempt += 1;
                    tracing::warn!(
                        "{} lost a write race ({}), retrying ({}/{})",
                        op,
                        reason,
                        attempt,
                        self.max_write_retries
                    );
                }
                Err(e) => return Err(e),
            }
        }
    }
}
