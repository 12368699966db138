use std::collections::{HashMap, VecDeque};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

/// One remembered message in a chat conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatTurn {
    pub role: ChatRole,
    pub text: String,
    pub at: DateTime<Utc>,
}

/// Short-term memory for the mock chat, bounded by age and by turn count
pub struct ConversationMemory {
    conversations: HashMap<String, VecDeque<ChatTurn>>,
    max_age: Duration,
    max_turns: usize,
}

impl ConversationMemory {
    pub fn new(max_age: Duration, max_turns: usize) -> Self {
        Self {
            conversations: HashMap::new(),
            max_age,
            max_turns,
        }
    }

    pub fn remember(
        &mut self,
        conversation_id: &str,
        role: ChatRole,
        text: impl Into<String>,
        now: DateTime<Utc>,
    ) {
        let turns = self
            .conversations
            .entry(conversation_id.to_string())
            .or_default();

        turns.push_back(ChatTurn {
            role,
            text: text.into(),
            at: now,
        });

        Self::evict(turns, now - self.max_age, self.max_turns);
    }

    /// Surviving turns, oldest first
    pub fn recall(&mut self, conversation_id: &str, now: DateTime<Utc>) -> Vec<ChatTurn> {
        let cutoff = now - self.max_age;
        let Some(turns) = self.conversations.get_mut(conversation_id) else {
            return Vec::new();
        };

        Self::evict(turns, cutoff, self.max_turns);
        let recalled: Vec<ChatTurn> = turns.iter().cloned().collect();

        if turns.is_empty() {
            self.conversations.remove(conversation_id);
        }
        recalled
    }

    pub fn forget(&mut self, conversation_id: &str) -> bool {
        self.conversations.remove(conversation_id).is_some()
    }

    /// Drop expired turns everywhere, then conversations left empty
    pub fn clear_stale(&mut self, now: DateTime<Utc>) {
        let cutoff = now - self.max_age;
        let max_turns = self.max_turns;
        self.conversations.retain(|_, turns| {
            Self::evict(turns, cutoff, max_turns);
            !turns.is_empty()
        });
    }

    pub fn len(&self) -> usize {
        self.conversations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conversations.is_empty()
    }

    fn evict(turns: &mut VecDeque<ChatTurn>, cutoff: DateTime<Utc>, max_turns: usize) {
        while turns.front().is_some_and(|t| t.at < cutoff) {
            turns.pop_front();
        }
        while turns.len() > max_turns {
            turns.pop_front();
        }
    }
}
