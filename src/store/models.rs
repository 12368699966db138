use std::collections::BTreeMap;

use chrono::{SecondsFormat, Utc};
use rand::Rng;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub identity: Option<String>,
    #[serde(default)]
    pub profile_picture: Option<String>,
    #[serde(default)]
    pub bio: String,
    pub created_at: String,
    /// Fields written by the front-end that this store doesn't model
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Signup payload. `name` is checked by `create_user`, not by the decoder.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub identity: Option<String>,
    #[serde(default)]
    pub profile_picture: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
}

/// Partial update. Absent fields are left alone.
///
/// `identity` and `profilePicture` can be cleared: an explicit `null`
/// decodes as `Some(None)`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    #[serde(default, deserialize_with = "present_or_null")]
    pub identity: Option<Option<String>>,
    #[serde(default, deserialize_with = "present_or_null")]
    pub profile_picture: Option<Option<String>>,
    pub bio: Option<String>,
}

fn present_or_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Post time as the front-end wrote it: ISO text or epoch millis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Timestamp {
    Millis(i64),
    Text(String),
}

impl From<&str> for Timestamp {
    fn from(text: &str) -> Self {
        Timestamp::Text(text.to_string())
    }
}

impl From<String> for Timestamp {
    fn from(text: String) -> Self {
        Timestamp::Text(text)
    }
}

/// Which of `author`/`media` were read under their older key names.
///
/// Those keys are written back the same way.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LegacyKeys {
    pub celebrity_id: bool,
    pub image_url: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "PostRecord", into = "PostRecord")]
pub struct Post {
    pub id: String,
    pub author: Option<String>,
    pub content: String,
    pub media: Option<String>,
    pub timestamp: Option<Timestamp>,
    pub likes: u64,
    pub comments: u64,
    pub reactions: Reactions,
    pub legacy_keys: LegacyKeys,
    /// Fields written by the front-end that this store doesn't model
    pub extra: Map<String, Value>,
}

impl Post {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            author: None,
            content: String::new(),
            media: None,
            timestamp: None,
            likes: 0,
            comments: 0,
            reactions: Reactions::default(),
            legacy_keys: LegacyKeys::default(),
            extra: Map::new(),
        }
    }
}

// Stored shape of a post. `Some(None)` writes an explicit null; `None` omits
// the key.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PostRecord {
    id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    author: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    celebrity_id: Option<Option<String>>,
    #[serde(default)]
    content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    media: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    image_url: Option<Option<String>>,
    #[serde(default)]
    timestamp: Option<Timestamp>,
    #[serde(default)]
    likes: u64,
    #[serde(default)]
    comments: u64,
    #[serde(default)]
    reactions: Reactions,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl From<PostRecord> for Post {
    fn from(record: PostRecord) -> Self {
        let legacy_keys = LegacyKeys {
            celebrity_id: record.author.is_none() && record.celebrity_id.is_some(),
            image_url: record.media.is_none() && record.image_url.is_some(),
        };
        Post {
            id: record.id,
            author: record.author.or(record.celebrity_id).flatten(),
            content: record.content,
            media: record.media.or(record.image_url).flatten(),
            timestamp: record.timestamp,
            likes: record.likes,
            comments: record.comments,
            reactions: record.reactions,
            legacy_keys,
            extra: record.extra,
        }
    }
}

impl From<Post> for PostRecord {
    fn from(post: Post) -> Self {
        let (author, celebrity_id) = if post.legacy_keys.celebrity_id {
            (None, Some(post.author))
        } else {
            (Some(post.author), None)
        };
        let (media, image_url) = if post.legacy_keys.image_url {
            (None, Some(post.media))
        } else {
            (Some(post.media), None)
        };
        PostRecord {
            id: post.id,
            author,
            celebrity_id,
            content: post.content,
            media,
            image_url,
            timestamp: post.timestamp,
            likes: post.likes,
            comments: post.comments,
            reactions: post.reactions,
            extra: post.extra,
        }
    }
}

/// Named reaction counters on a post.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reactions {
    #[serde(default)]
    pub fire: u64,
    #[serde(default)]
    pub heart: u64,
    /// Counters written by older front-ends that this store doesn't bump
    #[serde(flatten)]
    pub other: BTreeMap<String, u64>,
}

impl Reactions {
    pub fn bump(&mut self, kind: ReactionKind) {
        match kind {
            ReactionKind::Fire => self.fire += 1,
            ReactionKind::Heart => self.heart += 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReactionKind {
    Fire,
    Heart,
}

impl ReactionKind {
    /// Map the emoji the UI sends. Anything else is not a tracked reaction.
    pub fn from_emoji(emoji: &str) -> Option<Self> {
        match emoji.trim().trim_end_matches('\u{FE0F}') {
            "🔥" => Some(ReactionKind::Fire),
            "❤" => Some(ReactionKind::Heart),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    pub post_id: String,
    pub user_id: String,
    pub author: String,
    #[serde(default)]
    pub avatar: Option<String>,
    pub content: String,
    pub created_at: String,
    #[serde(default)]
    pub likes: u64,
    #[serde(default)]
    pub liked_by: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Like {
    pub id: String,
    pub post_id: String,
    pub user_id: String,
    pub created_at: String,
}

/// Outcome of a like toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeToggle {
    pub liked: bool,
    pub like_count: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    pub users: usize,
    pub posts: usize,
    pub comments: usize,
    pub likes: usize,
}

/// `<prefix>_<unix millis>_<9 base-36 chars>`
pub fn generate_id(prefix: &str) -> String {
    const CHARSET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    let mut rng = rand::thread_rng();
    let suffix: String = (0..9)
        .map(|_| CHARSET[rng.gen_range(0..CHARSET.len())] as char)
        .collect();
    format!("{}_{}_{}", prefix, Utc::now().timestamp_millis(), suffix)
}

/// ISO-8601 UTC with millisecond precision, e.g. `2024-05-01T12:00:00.123Z`
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Address used when a signup doesn't provide one.
pub fn default_email(name: &str) -> String {
    let local: String = name
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase();
    format!("{}@facecrook.com", local)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_id_has_prefix_millis_and_suffix() {
        let id = generate_id("user");
        let parts: Vec<&str> = id.split('_').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "user");
        assert!(parts[1].chars().all(|c| c.is_ascii_digit()));
        assert_eq!(parts[2].len(), 9);
        assert!(parts[2].chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn generated_ids_are_unique() {
        assert_ne!(generate_id("like"), generate_id("like"));
    }

    #[test]
    fn timestamp_is_iso_millis_utc() {
        let ts = now_timestamp();
        assert!(ts.ends_with('Z'));
        assert!(chrono::DateTime::parse_from_rfc3339(&ts).is_ok());
        // 2024-05-01T12:00:00.123Z
        assert_eq!(ts.len(), 24);
    }

    #[test]
    fn emails_normalize_to_trimmed_lowercase() {
        assert_eq!(normalize_email("  Ann@X.com "), "ann@x.com");
    }

    #[test]
    fn default_email_strips_whitespace() {
        assert_eq!(default_email("Kim K West"), "kimkwest@facecrook.com");
    }

    #[test]
    fn reaction_kind_accepts_both_heart_forms() {
        assert_eq!(ReactionKind::from_emoji("🔥"), Some(ReactionKind::Fire));
        assert_eq!(ReactionKind::from_emoji("❤️"), Some(ReactionKind::Heart));
        assert_eq!(ReactionKind::from_emoji("❤"), Some(ReactionKind::Heart));
        assert_eq!(ReactionKind::from_emoji("😂"), None);
    }

    #[test]
    fn post_reads_legacy_field_names() {
        let post: Post = serde_json::from_str(
            r#"{"id":"p1","celebrityId":"kanye","imageUrl":"/a.png","likes":2}"#,
        )
        .unwrap();
        assert_eq!(post.author.as_deref(), Some("kanye"));
        assert_eq!(post.media.as_deref(), Some("/a.png"));
        assert_eq!(post.likes, 2);
        assert_eq!(post.comments, 0);
        assert_eq!(post.reactions, Reactions::default());
    }

    #[test]
    fn post_writes_back_under_the_keys_it_was_read_with() {
        let post: Post = serde_json::from_str(
            r#"{"id":"p1","celebrityId":"kanye","imageUrl":"/a.png","celebrityName":"Kanye","isVerified":true}"#,
        )
        .unwrap();
        assert_eq!(post.extra["celebrityName"], "Kanye");

        let json = serde_json::to_value(&post).unwrap();
        assert_eq!(json["celebrityId"], "kanye");
        assert_eq!(json["imageUrl"], "/a.png");
        assert_eq!(json["celebrityName"], "Kanye");
        assert_eq!(json["isVerified"], true);
        assert!(json.get("author").is_none());
        assert!(json.get("media").is_none());
    }

    #[test]
    fn new_post_uses_current_key_names() {
        let json = serde_json::to_value(Post::new("p1")).unwrap();
        assert_eq!(json["author"], Value::Null);
        assert_eq!(json["media"], Value::Null);
        assert!(json.get("celebrityId").is_none());
    }

    #[test]
    fn post_timestamp_accepts_text_or_millis() {
        let posts: Vec<Post> = serde_json::from_str(
            r#"[{"id":"a","timestamp":1714564800000},{"id":"b","timestamp":"2024-05-01T12:00:00.000Z"}]"#,
        )
        .unwrap();
        assert_eq!(posts[0].timestamp, Some(Timestamp::Millis(1714564800000)));
        assert_eq!(posts[1].timestamp, Some("2024-05-01T12:00:00.000Z".into()));

        let json = serde_json::to_value(&posts).unwrap();
        assert_eq!(json[0]["timestamp"], 1714564800000i64);
    }

    #[test]
    fn user_keeps_unmodelled_fields() {
        let user: User = serde_json::from_str(
            r#"{"id":"u1","name":"Ann","email":"ann@x.com","createdAt":"2024-01-01T00:00:00.000Z","theme":"dark"}"#,
        )
        .unwrap();
        assert_eq!(user.extra["theme"], "dark");
        assert_eq!(serde_json::to_value(&user).unwrap()["theme"], "dark");
    }

    #[test]
    fn user_patch_tells_null_from_missing() {
        let patch: UserPatch =
            serde_json::from_str(r#"{"profilePicture":null,"bio":"hi"}"#).unwrap();
        assert_eq!(patch.profile_picture, Some(None));
        assert_eq!(patch.identity, None);

        let patch: UserPatch = serde_json::from_str(r#"{"identity":"celebrity"}"#).unwrap();
        assert_eq!(patch.identity, Some(Some("celebrity".into())));
    }

    #[test]
    fn signup_without_name_still_decodes() {
        let new_user: NewUser = serde_json::from_str(r#"{"email":"ann@x.com"}"#).unwrap();
        assert!(new_user.name.is_empty());
    }

    #[test]
    fn reactions_keep_unknown_counters() {
        let reactions: Reactions =
            serde_json::from_str(r#"{"fire":1,"heart":2,"clown":4}"#).unwrap();
        assert_eq!(reactions.fire, 1);
        assert_eq!(reactions.other.get("clown"), Some(&4));

        let json = serde_json::to_value(&reactions).unwrap();
        assert_eq!(json["clown"], 4);
    }

    #[test]
    fn comment_uses_camel_case_fields() {
        let comment = Comment {
            id: "c1".into(),
            post_id: "p1".into(),
            user_id: "u1".into(),
            author: "Ann".into(),
            avatar: None,
            content: "hi".into(),
            created_at: now_timestamp(),
            likes: 0,
            liked_by: vec![],
        };
        let json = serde_json::to_value(&comment).unwrap();
        assert!(json.get("postId").is_some());
        assert!(json.get("likedBy").is_some());
        assert!(json.get("post_id").is_none());
    }
}
