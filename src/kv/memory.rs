use std::collections::HashMap;
use std::sync::Mutex;

use super::{KvBackend, KvWrite, Versioned};
use crate::store::{StoreError, StoreResult};

/// Process-local backend. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: Mutex<HashMap<String, Versioned>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvBackend for MemoryBackend {
    fn get(&self, key: &str) -> StoreResult<Option<Versioned>> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        Ok(entries.get(key).cloned())
    }

    fn commit(&self, writes: &[KvWrite]) -> StoreResult<()> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());

        // Check every precondition before touching anything
        for write in writes {
            let current = entries.get(&write.key).map(|v| v.version);
            if !write.expect.holds(current) {
                return Err(StoreError::Conflict(format!(
                    "{} changed since it was read",
                    write.key
                )));
            }
        }

        for write in writes {
            match &write.value {
                Some(value) => {
                    let version = entries.get(&write.key).map_or(1, |v| v.version + 1);
                    entries.insert(
                        write.key.clone(),
                        Versioned {
                            value: value.clone(),
                            version,
                        },
                    );
                }
                None => {
                    entries.remove(&write.key);
                }
            }
        }

        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
