use super::models::{default_email, generate_id, normalize_email, now_timestamp};
use super::{LocalStore, NewUser, StoreError, StoreResult, User, UserPatch};

impl LocalStore {
    pub fn list_users(&self) -> Vec<User> {
        self.read_or_empty(&self.keys.users)
    }

    pub fn get_user_by_id(&self, id: &str) -> Option<User> {
        self.list_users().into_iter().find(|u| u.id == id)
    }

    /// Lookup with both sides trimmed and lower-cased.
    pub fn get_user_by_email(&self, email: &str) -> Option<User> {
        let wanted = normalize_email(email);
        self.list_users()
            .into_iter()
            .find(|u| normalize_email(&u.email) == wanted)
    }

    /// Sign up a user. The email defaults to one derived from the name.
    pub fn create_user(&self, new_user: NewUser) -> StoreResult<User> {
        let name = new_user.name.trim().to_string();
        if name.is_empty() {
            return Err(StoreError::Validation("name is required".into()));
        }

        let email = new_user
            .email
            .as_deref()
            .map(normalize_email)
            .filter(|e| !e.is_empty())
            .unwrap_or_else(|| default_email(&name));

        let user = self.transact("create_user", || {
            let mut users = self.load::<Vec<User>>(&self.keys.users)?;

            if users
                .value
                .iter()
                .any(|u| normalize_email(&u.email) == email)
            {
                return Err(StoreError::DuplicateUser(email.clone()));
            }

            let user = User {
                id: generate_id("user"),
                name: name.clone(),
                email: email.clone(),
                identity: new_user.identity.clone(),
                profile_picture: new_user.profile_picture.clone(),
                bio: new_user.bio.clone().unwrap_or_default(),
                created_at: now_timestamp(),
                extra: Default::default(),
            };
            users.value.push(user.clone());

            Ok((user, vec![users.to_write()?]))
        })?;

        tracing::info!("Created user {} ({})", user.id, user.email);
        Ok(user)
    }

    /// Merge `patch` into an existing user.
    ///
    /// If the user is the current session, the session snapshot is refreshed
    /// in the same commit.
    pub fn update_user(&self, id: &str, patch: UserPatch) -> StoreResult<User> {
        if patch.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            return Err(StoreError::Validation("name cannot be blank".into()));
        }
        let new_email = patch.email.as_deref().map(normalize_email);
        if new_email.as_deref().is_some_and(str::is_empty) {
            return Err(StoreError::Validation("email cannot be blank".into()));
        }

        self.transact("update_user", || {
            let mut users = self.load::<Vec<User>>(&self.keys.users)?;

            let idx = users
                .value
                .iter()
                .position(|u| u.id == id)
                .ok_or_else(|| StoreError::NotFound(format!("user {}", id)))?;

            if let Some(email) = &new_email {
                let taken = users
                    .value
                    .iter()
                    .any(|u| u.id != id && normalize_email(&u.email) == *email);
                if taken {
                    return Err(StoreError::DuplicateUser(email.clone()));
                }
            }

            let user = &mut users.value[idx];
            if let Some(name) = &patch.name {
                user.name = name.trim().to_string();
            }
            if let Some(email) = &new_email {
                user.email = email.clone();
            }
            if let Some(identity) = &patch.identity {
                user.identity = identity.clone();
            }
            if let Some(picture) = &patch.profile_picture {
                user.profile_picture = picture.clone();
            }
            if let Some(bio) = &patch.bio {
                user.bio = bio.clone();
            }
            let updated = user.clone();

            let mut writes = vec![users.to_write()?];

            match self.load::<Option<User>>(&self.keys.session) {
                Ok(mut session) if session.value.as_ref().is_some_and(|s| s.id == id) => {
                    session.value = Some(updated.clone());
                    writes.push(session.to_write()?);
                }
                Ok(_) => {}
                Err(e) => tracing::warn!("Skipping session refresh for {}: {}", id, e),
            }

            Ok((updated, writes))
        })
    }
}
