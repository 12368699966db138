use crate::kv::{Expect, KvWrite};

use super::{LocalStore, StoreError, User};

// The session slot holds a snapshot, not a reference into the users
// collection. All three calls are silent no-ops when storage is unavailable.
impl LocalStore {
    pub fn set_current_session(&self, user: &User) {
        let json = match serde_json::to_string(user) {
            Ok(json) => json,
            Err(e) => {
                tracing::error!("Failed to encode session for {}: {}", user.id, e);
                return;
            }
        };

        let result = self.transact("set_current_session", || {
            Ok((
                (),
                vec![KvWrite::put(self.keys.session.clone(), json.clone(), Expect::Any)],
            ))
        });
        log_session_failure("set", result);
    }

    pub fn get_current_session(&self) -> Option<User> {
        match self.load::<Option<User>>(&self.keys.session) {
            Ok(snapshot) => snapshot.value,
            Err(StoreError::StorageUnavailable) => None,
            Err(e) => {
                tracing::warn!("Ignoring unreadable session: {}", e);
                None
            }
        }
    }

    pub fn clear_session(&self) {
        let result = self.transact("clear_session", || {
            Ok((
                (),
                vec![KvWrite::delete(self.keys.session.clone(), Expect::Any)],
            ))
        });
        log_session_failure("clear", result);
    }
}

fn log_session_failure(action: &str, result: Result<(), StoreError>) {
    match result {
        Ok(()) | Err(StoreError::StorageUnavailable) => {}
        Err(e) => tracing::warn!("Failed to {} current session: {}", action, e),
    }
}
