//! Persisted conversation collection and active-conversation pointer.
//!
//! All state lives in an injected [`KeyValueStore`] under two keys (see
//! [`StoreKeys`]): the JSON array of conversations, newest first, and the id
//! of the active conversation. Reads go through the backing store on every
//! call so several handles over the same backend always agree.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{ChatError, Result};
use crate::storage::{KeyValueStore, MemoryStore};
use crate::types::{Conversation, Message, DEFAULT_TITLE};

/// Namespace used for storage keys unless configured otherwise.
pub const DEFAULT_KEY_PREFIX: &str = "jaat_ai";

/// Storage keys for the persisted state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreKeys {
    pub conversations: String,
    pub active: String,
}

impl StoreKeys {
    pub fn with_prefix(prefix: &str) -> Self {
        Self {
            conversations: format!("{prefix}_conversations"),
            active: format!("{prefix}_active_conversation"),
        }
    }
}

impl Default for StoreKeys {
    fn default() -> Self {
        Self::with_prefix(DEFAULT_KEY_PREFIX)
    }
}

/// Outcome of reading the conversation collection.
enum Collection {
    Missing,
    /// Payload present but not a valid collection.
    Corrupt,
    /// The backend itself failed; the stored payload may still be intact.
    Unreadable(ChatError),
    Loaded(Vec<Conversation>),
}

impl Collection {
    fn into_vec(self) -> Vec<Conversation> {
        match self {
            Self::Loaded(conversations) => conversations,
            Self::Missing | Self::Corrupt | Self::Unreadable(_) => Vec::new(),
        }
    }

    /// Starting point for a write. A failed read is returned as an error so
    /// the stored payload is never overwritten with a partial view.
    fn for_update(self) -> Result<Vec<Conversation>> {
        match self {
            Self::Unreadable(err) => Err(err),
            other => Ok(other.into_vec()),
        }
    }
}

/// CRUD over the persisted conversations plus the active pointer.
///
/// # Example
/// ```
/// use jaat_chat::store::ConversationStore;
/// use jaat_chat::types::Message;
///
/// let store = ConversationStore::in_memory();
/// store.initialize()?;
/// let conv = store.create_conversation(None)?;
/// let updated = store.add_message(&conv.id, Message::user("Hello!"))?.unwrap();
/// assert_eq!(updated.title, "Hello!");
/// assert_eq!(store.active_conversation().as_deref(), Some(conv.id.as_str()));
/// # Ok::<(), jaat_chat::error::ChatError>(())
/// ```
#[derive(Clone)]
pub struct ConversationStore {
    backend: Arc<dyn KeyValueStore>,
    keys: StoreKeys,
}

impl std::fmt::Debug for ConversationStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConversationStore")
            .field("backend", &"..")
            .field("keys", &self.keys)
            .finish()
    }
}

impl ConversationStore {
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self {
            backend,
            keys: StoreKeys::default(),
        }
    }

    /// Store backed by a fresh [`MemoryStore`].
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    pub fn with_keys(mut self, keys: StoreKeys) -> Self {
        self.keys = keys;
        self
    }

    pub fn keys(&self) -> &StoreKeys {
        &self.keys
    }

    /// Make sure the backend holds a valid collection and return it.
    ///
    /// A missing or malformed payload is replaced by an empty collection; a
    /// valid one is left untouched. A backend read failure is returned
    /// without writing anything.
    pub fn initialize(&self) -> Result<Vec<Conversation>> {
        match self.load() {
            Collection::Loaded(conversations) => Ok(conversations),
            Collection::Unreadable(err) => Err(err),
            Collection::Missing | Collection::Corrupt => {
                self.save(&[])?;
                Ok(Vec::new())
            }
        }
    }

    /// All conversations in stored order (newest created first).
    ///
    /// An unreadable backend is logged and reads as empty.
    pub fn list_conversations(&self) -> Vec<Conversation> {
        self.load().into_vec()
    }

    /// All conversations sorted by `created_at`, most recent first.
    ///
    /// Conversations created in the same millisecond keep their stored order.
    pub fn list_by_recency(&self) -> Vec<Conversation> {
        let mut conversations = self.list_conversations();
        conversations.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        conversations
    }

    pub fn get_conversation(&self, id: &str) -> Option<Conversation> {
        self.list_conversations().into_iter().find(|c| c.id == id)
    }

    /// Create an empty conversation, prepend it and make it active.
    ///
    /// `title_hint` replaces the default title until the first user message
    /// arrives.
    pub fn create_conversation(&self, title_hint: Option<&str>) -> Result<Conversation> {
        let mut conversations = self.load().for_update()?;

        let mut id = Uuid::new_v4().to_string();
        while conversations.iter().any(|c| c.id == id) {
            id = Uuid::new_v4().to_string();
        }

        let title = title_hint
            .map(str::trim)
            .filter(|hint| !hint.is_empty())
            .unwrap_or(DEFAULT_TITLE);
        let conversation = Conversation::new(id, title, Utc::now());

        conversations.insert(0, conversation.clone());
        self.save(&conversations)?;
        self.write_active(Some(&conversation.id))?;

        debug!(conversation_id = %conversation.id, "conversation created");
        Ok(conversation)
    }

    /// Append a message to a conversation.
    ///
    /// Returns the updated conversation, or `None` when `conversation_id` is
    /// unknown, in which case nothing is written.
    pub fn add_message(
        &self,
        conversation_id: &str,
        message: Message,
    ) -> Result<Option<Conversation>> {
        let mut conversations = self.load().for_update()?;
        let Some(conversation) = conversations.iter_mut().find(|c| c.id == conversation_id) else {
            debug!(conversation_id, "add_message: conversation not found");
            return Ok(None);
        };

        let role = message.role;
        if conversation.append(message) {
            debug!(conversation_id, title = %conversation.title, "conversation titled");
        }
        let updated = conversation.clone();

        self.save(&conversations)?;
        debug!(conversation_id, %role, messages = updated.messages.len(), "message added");
        Ok(Some(updated))
    }

    /// Delete a conversation. Returns whether anything was removed.
    ///
    /// Deleting the active conversation moves the pointer to the first
    /// remaining conversation, or clears it when none remain.
    pub fn delete_conversation(&self, id: &str) -> Result<bool> {
        let mut conversations = self.load().for_update()?;
        let before = conversations.len();
        conversations.retain(|c| c.id != id);
        if conversations.len() == before {
            return Ok(false);
        }

        self.save(&conversations)?;

        if self.read_active().as_deref() == Some(id) {
            let next = conversations.first().map(|c| c.id.as_str());
            self.write_active(next)?;
            debug!(deleted = id, next_active = ?next, "active conversation reassigned");
        }

        debug!(conversation_id = id, "conversation deleted");
        Ok(true)
    }

    /// The active conversation id, if it names an existing conversation.
    pub fn active_conversation(&self) -> Option<String> {
        let id = self.read_active()?;
        if self.list_conversations().iter().any(|c| c.id == id) {
            Some(id)
        } else {
            warn!(conversation_id = %id, "active pointer references a missing conversation");
            None
        }
    }

    /// Point at a conversation, or clear the pointer with `None`.
    ///
    /// Returns `false` without writing when `id` names no conversation.
    pub fn set_active_conversation(&self, id: Option<&str>) -> Result<bool> {
        if let Some(id) = id {
            if self.get_conversation(id).is_none() {
                debug!(conversation_id = id, "set_active: conversation not found");
                return Ok(false);
            }
        }
        self.write_active(id)?;
        Ok(true)
    }

    /// The active conversation id, creating a conversation if none is active.
    pub fn ensure_active_conversation(&self) -> Result<String> {
        match self.active_conversation() {
            Some(id) => Ok(id),
            None => Ok(self.create_conversation(None)?.id),
        }
    }

    /// Drop every conversation and the active pointer.
    pub fn clear_all(&self) -> Result<()> {
        self.backend.remove(&self.keys.conversations)?;
        self.backend.remove(&self.keys.active)?;
        self.initialize()?;
        debug!("conversation store cleared");
        Ok(())
    }

    fn load(&self) -> Collection {
        let key = &self.keys.conversations;
        let raw = match self.backend.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Collection::Missing,
            Err(err) => {
                warn!(%key, error = %err, "failed to read conversations");
                return Collection::Unreadable(err);
            }
        };
        match serde_json::from_str(&raw) {
            Ok(conversations) => Collection::Loaded(conversations),
            Err(err) => {
                warn!(%key, error = %err, "malformed conversations payload, treating as empty");
                Collection::Corrupt
            }
        }
    }

    fn save(&self, conversations: &[Conversation]) -> Result<()> {
        let serialized = serde_json::to_string(conversations)?;
        self.backend.set(&self.keys.conversations, &serialized)
    }

    fn read_active(&self) -> Option<String> {
        match self.backend.get(&self.keys.active) {
            Ok(id) => id.filter(|id| !id.is_empty()),
            Err(err) => {
                warn!(key = %self.keys.active, error = %err, "failed to read active conversation");
                None
            }
        }
    }

    fn write_active(&self, id: Option<&str>) -> Result<()> {
        match id {
            Some(id) => self.backend.set(&self.keys.active, id),
            None => self.backend.remove(&self.keys.active),
        }
    }
}
