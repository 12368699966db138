use super::models::{generate_id, now_timestamp};
use super::{Comment, LikeToggle, LocalStore, Post, StoreError, StoreResult, User};

impl LocalStore {
    /// Comments on a post, newest first.
    pub fn get_comments_by_post_id(&self, post_id: &str) -> Vec<Comment> {
        let mut comments: Vec<Comment> = self
            .read_or_empty::<Comment>(&self.keys.comments)
            .into_iter()
            .filter(|c| c.post_id == post_id)
            .collect();
        // Stable: same-millisecond comments keep their stored (newest-first) order
        comments.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        comments
    }

    /// Add a comment by an existing user and bump the post's counter.
    ///
    /// The post reference isn't enforced: commenting on an unknown post stores
    /// the comment and skips the counter.
    pub fn add_comment(&self, post_id: &str, user_id: &str, content: &str) -> StoreResult<Comment> {
        let content = content.trim();
        if content.is_empty() {
            return Err(StoreError::Validation("comment cannot be empty".into()));
        }

        let comment = self.transact("add_comment", || {
            let users = self.load::<Vec<User>>(&self.keys.users)?;
            let user = users
                .value
                .iter()
                .find(|u| u.id == user_id)
                .ok_or_else(|| StoreError::UserNotFound(user_id.to_string()))?;

            let mut comments = self.load::<Vec<Comment>>(&self.keys.comments)?;
            let mut posts = self.load::<Vec<Post>>(&self.keys.posts)?;

            let comment = Comment {
                id: generate_id("comment"),
                post_id: post_id.to_string(),
                user_id: user.id.clone(),
                author: user.name.clone(),
                avatar: user.profile_picture.clone(),
                content: content.to_string(),
                created_at: now_timestamp(),
                likes: 0,
                liked_by: Vec::new(),
            };
            comments.value.insert(0, comment.clone());

            let mut writes = vec![comments.to_write()?];
            if let Some(post) = posts.value.iter_mut().find(|p| p.id == post_id) {
                post.comments += 1;
                writes.push(posts.to_write()?);
            }

            Ok((comment, writes))
        })?;

        tracing::debug!("Added comment {} on {}", comment.id, post_id);
        Ok(comment)
    }

    /// Remove a comment and decrement its post's counter (floor 0).
    pub fn delete_comment(&self, comment_id: &str) -> StoreResult<Comment> {
        self.transact("delete_comment", || {
            let mut comments = self.load::<Vec<Comment>>(&self.keys.comments)?;
            let mut posts = self.load::<Vec<Post>>(&self.keys.posts)?;

            let idx = comments
                .value
                .iter()
                .position(|c| c.id == comment_id)
                .ok_or_else(|| StoreError::NotFound(format!("comment {}", comment_id)))?;
            let removed = comments.value.remove(idx);

            let mut writes = vec![comments.to_write()?];
            if let Some(post) = posts.value.iter_mut().find(|p| p.id == removed.post_id) {
                post.comments = post.comments.saturating_sub(1);
                writes.push(posts.to_write()?);
            }

            Ok((removed, writes))
        })
    }

    /// Flip `user_id`'s like on a comment. `likes` always equals `likedBy.len()`.
    pub fn toggle_comment_like(&self, comment_id: &str, user_id: &str) -> StoreResult<LikeToggle> {
        self.transact("toggle_comment_like", || {
            let mut comments = self.load::<Vec<Comment>>(&self.keys.comments)?;

            let comment = comments
                .value
                .iter_mut()
                .find(|c| c.id == comment_id)
                .ok_or_else(|| StoreError::NotFound(format!("comment {}", comment_id)))?;

            let liked = if comment.liked_by.iter().any(|u| u == user_id) {
                comment.liked_by.retain(|u| u != user_id);
                false
            } else {
                comment.liked_by.push(user_id.to_string());
                true
            };
            comment.likes = comment.liked_by.len() as u64;

            let toggle = LikeToggle {
                liked,
                like_count: comment.likes,
            };

            Ok((toggle, vec![comments.to_write()?]))
        })
    }
}
