// src/services/store.rs
use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::error::StoreError;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactMessage {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub subject: String,
    #[serde(rename = "message")]
    pub body: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug)]
pub struct NewContactMessage {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub body: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatTurn {
    pub id: u64,
    pub session_id: String,
    #[serde(rename = "message")]
    pub text: String,
    #[serde(rename = "isUser")]
    pub is_from_user: bool,
    pub timestamp: DateTime<Utc>,
}

#[derive(Clone, Debug)]
pub struct NewChatTurn {
    pub session_id: String,
    pub text: String,
    pub is_from_user: bool,
}

impl NewChatTurn {
    pub fn user(session_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self { session_id: session_id.into(), text: text.into(), is_from_user: true }
    }

    pub fn assistant(session_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self { session_id: session_id.into(), text: text.into(), is_from_user: false }
    }
}

/// Append-only record keeping for contact submissions and chat transcripts.
#[async_trait]
pub trait Store: Send + Sync + Debug {
    async fn add_contact_message(&self, fields: NewContactMessage) -> Result<ContactMessage, StoreError>;

    async fn list_contact_messages(&self) -> Result<Vec<ContactMessage>, StoreError>;

    async fn add_chat_turn(&self, fields: NewChatTurn) -> Result<ChatTurn, StoreError>;

    /// Turns for one session, ascending by id. Unknown sessions yield an empty list.
    async fn list_chat_turns(&self, session_id: &str) -> Result<Vec<ChatTurn>, StoreError>;
}

#[derive(Debug)]
struct Tables {
    contacts: Vec<ContactMessage>,
    turns: Vec<ChatTurn>,
    next_contact_id: u64,
    next_turn_id: u64,
}

impl Default for Tables {
    fn default() -> Self {
        Self {
            contacts: Vec::new(),
            turns: Vec::new(),
            next_contact_id: 1,
            next_turn_id: 1,
        }
    }
}

/// Process-lifetime store. Ids and timestamps are assigned under the write lock,
/// so ids are strictly increasing in insertion order.
#[derive(Clone, Debug, Default)]
pub struct MemStore {
    inner: Arc<RwLock<Tables>>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemStore {
    async fn add_contact_message(&self, fields: NewContactMessage) -> Result<ContactMessage, StoreError> {
        let mut guard = self.inner.write().await;
        let id = guard.next_contact_id;
        guard.next_contact_id += 1;
        let msg = ContactMessage {
            id,
            name: fields.name,
            email: fields.email,
            subject: fields.subject,
            body: fields.body,
            created_at: Utc::now(),
        };
        guard.contacts.push(msg.clone());
        Ok(msg)
    }

    async fn list_contact_messages(&self) -> Result<Vec<ContactMessage>, StoreError> {
        let guard = self.inner.read().await;
        Ok(guard.contacts.clone())
    }

    async fn add_chat_turn(&self, fields: NewChatTurn) -> Result<ChatTurn, StoreError> {
        let mut guard = self.inner.write().await;
        let id = guard.next_turn_id;
        guard.next_turn_id += 1;
        let turn = ChatTurn {
            id,
            session_id: fields.session_id,
            text: fields.text,
            is_from_user: fields.is_from_user,
            timestamp: Utc::now(),
        };
        guard.turns.push(turn.clone());
        Ok(turn)
    }

    async fn list_chat_turns(&self, session_id: &str) -> Result<Vec<ChatTurn>, StoreError> {
        let guard = self.inner.read().await;
        let mut turns: Vec<ChatTurn> = guard
            .turns
            .iter()
            .filter(|t| t.session_id == session_id)
            .cloned()
            .collect();
        turns.sort_by_key(|t| t.id);
        Ok(turns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn contact_ids_start_at_one() {
        let store = MemStore::new();
        let first = store
            .add_contact_message(NewContactMessage {
                name: "A".into(),
                email: "a@example.com".into(),
                subject: "Hi".into(),
                body: "Hello there".into(),
            })
            .await
            .unwrap();
        assert_eq!(first.id, 1);
        assert_eq!(store.list_contact_messages().await.unwrap(), vec![first]);
    }

    #[tokio::test]
    async fn turn_serializes_with_wire_names() {
        let store = MemStore::new();
        let turn = store.add_chat_turn(NewChatTurn::user("s1", "hello")).await.unwrap();
        let json = serde_json::to_value(&turn).unwrap();
        assert_eq!(json["sessionId"], "s1");
        assert_eq!(json["message"], "hello");
        assert_eq!(json["isUser"], true);
        assert!(json.get("timestamp").is_some());
    }
}
