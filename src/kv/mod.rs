// Key/value backends - the only place store data touches the outside world
mod memory;
mod null;
mod sqlite;

use crate::store::StoreResult;

pub use self::memory::MemoryBackend;
pub use self::null::NullBackend;
pub use self::sqlite::SqliteBackend;

/// A stored value together with its write version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Versioned {
    pub value: String,
    pub version: u64,
}

/// Precondition a write places on the key's current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expect {
    /// Unconditional write
    Any,
    /// Key must not exist yet
    Absent,
    /// Key must still be at this version
    Version(u64),
}

impl Expect {
    /// Precondition matching what a read returned.
    pub fn from_read(read: Option<&Versioned>) -> Self {
        match read {
            Some(v) => Expect::Version(v.version),
            None => Expect::Absent,
        }
    }

    pub fn holds(&self, current: Option<u64>) -> bool {
        match (self, current) {
            (Expect::Any, _) => true,
            (Expect::Absent, None) => true,
            (Expect::Version(want), Some(have)) => *want == have,
            _ => false,
        }
    }
}

/// One entry of an atomic commit. `value: None` deletes the key.
#[derive(Debug, Clone)]
pub struct KvWrite {
    pub key: String,
    pub value: Option<String>,
    pub expect: Expect,
}

impl KvWrite {
    pub fn put(key: impl Into<String>, value: impl Into<String>, expect: Expect) -> Self {
        Self {
            key: key.into(),
            value: Some(value.into()),
            expect,
        }
    }

    pub fn delete(key: impl Into<String>, expect: Expect) -> Self {
        Self {
            key: key.into(),
            value: None,
            expect,
        }
    }
}

/// Storage capability the store is built on.
///
/// `commit` is all-or-nothing: if any write's precondition fails the backend
/// returns `StoreError::Conflict` and nothing is applied.
pub trait KvBackend: Send + Sync {
    fn get(&self, key: &str) -> StoreResult<Option<Versioned>>;

    fn commit(&self, writes: &[KvWrite]) -> StoreResult<()>;

    fn is_available(&self) -> bool {
        true
    }

    fn name(&self) -> &'static str;
}
