use crate::kv::{Expect, KvWrite};

use super::models::{generate_id, now_timestamp};
use super::{Like, LikeToggle, LocalStore, Post, ReactionKind, StoreError, StoreResult};

impl LocalStore {
    pub fn list_posts(&self) -> Vec<Post> {
        self.read_or_empty(&self.keys.posts)
    }

    pub fn get_post_by_id(&self, id: &str) -> Option<Post> {
        self.list_posts().into_iter().find(|p| p.id == id)
    }

    /// Upsert by id. New posts go to the front of the feed.
    ///
    /// Failures are logged, not returned.
    pub fn save_post(&self, post: &Post) {
        let result = self.transact("save_post", || {
            let mut posts = self.load::<Vec<Post>>(&self.keys.posts)?;

            match posts.value.iter_mut().find(|p| p.id == post.id) {
                Some(existing) => *existing = post.clone(),
                None => posts.value.insert(0, post.clone()),
            }

            Ok(((), vec![posts.to_write()?]))
        });

        if let Err(e) = result {
            tracing::error!("Failed to save post {}: {}", post.id, e);
        }
    }

    /// Replace the whole posts collection. Failures are logged, not returned.
    pub fn save_posts(&self, posts: &[Post]) {
        let json = match serde_json::to_string(posts) {
            Ok(json) => json,
            Err(e) => {
                tracing::error!("Failed to encode posts: {}", e);
                return;
            }
        };

        let result = self.transact("save_posts", || {
            Ok((
                (),
                vec![KvWrite::put(self.keys.posts.clone(), json.clone(), Expect::Any)],
            ))
        });

        if let Err(e) = result {
            tracing::error!("Failed to save {} posts: {}", posts.len(), e);
        }
    }

    pub fn has_user_liked_post(&self, post_id: &str, user_id: &str) -> bool {
        self.read_or_empty::<Like>(&self.keys.likes)
            .iter()
            .any(|l| l.post_id == post_id && l.user_id == user_id)
    }

    /// Like or unlike a post for `user_id`.
    ///
    /// The post's `likes` counter moves with the Like record and never goes
    /// below zero. A post that doesn't exist (yet) still gets the record.
    pub fn toggle_post_like(&self, post_id: &str, user_id: &str) -> StoreResult<LikeToggle> {
        self.transact("toggle_post_like", || {
            let mut likes = self.load::<Vec<Like>>(&self.keys.likes)?;
            let mut posts = self.load::<Vec<Post>>(&self.keys.posts)?;

            let existing = likes
                .value
                .iter()
                .position(|l| l.post_id == post_id && l.user_id == user_id);

            let liked = match existing {
                Some(idx) => {
                    likes.value.remove(idx);
                    false
                }
                None => {
                    likes.value.push(Like {
                        id: generate_id("like"),
                        post_id: post_id.to_string(),
                        user_id: user_id.to_string(),
                        created_at: now_timestamp(),
                    });
                    true
                }
            };

            let mut writes = vec![likes.to_write()?];

            let like_count = match posts.value.iter_mut().find(|p| p.id == post_id) {
                Some(post) => {
                    post.likes = if liked {
                        post.likes + 1
                    } else {
                        post.likes.saturating_sub(1)
                    };
                    let count = post.likes;
                    writes.push(posts.to_write()?);
                    count
                }
                None => likes.value.iter().filter(|l| l.post_id == post_id).count() as u64,
            };

            Ok((LikeToggle { liked, like_count }, writes))
        })
    }

    /// Bump a named reaction counter.
    ///
    /// Returns the updated post, or `None` when `reaction` isn't one of the
    /// tracked emoji (nothing is written in that case).
    pub fn add_reaction(
        &self,
        post_id: &str,
        user_id: &str,
        reaction: &str,
    ) -> StoreResult<Option<Post>> {
        let kind = ReactionKind::from_emoji(reaction);

        self.transact("add_reaction", || {
            let mut posts = self.load::<Vec<Post>>(&self.keys.posts)?;

            let post = posts
                .value
                .iter_mut()
                .find(|p| p.id == post_id)
                .ok_or_else(|| StoreError::NotFound(format!("post {}", post_id)))?;

            let Some(kind) = kind else {
                tracing::debug!("Ignoring reaction {:?} from {} on {}", reaction, user_id, post_id);
                return Ok((None, Vec::new()));
            };

            post.reactions.bump(kind);
            let updated = post.clone();

            Ok((Some(updated), vec![posts.to_write()?]))
        })
    }
}
