use super::{KvBackend, KvWrite, Versioned};
use crate::store::{StoreError, StoreResult};

/// Backend for environments without persistent storage.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullBackend;

impl KvBackend for NullBackend {
    fn get(&self, _key: &str) -> StoreResult<Option<Versioned>> {
        Err(StoreError::StorageUnavailable)
    }

    fn commit(&self, _writes: &[KvWrite]) -> StoreResult<()> {
        Err(StoreError::StorageUnavailable)
    }

    fn is_available(&self) -> bool {
        false
    }

    fn name(&self) -> &'static str {
        "none"
    }
}
