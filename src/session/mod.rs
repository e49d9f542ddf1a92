//! Chat orchestration: ties the store and the selector together.
//!
//! A [`ChatSession`] plays the role of the UI controller. It validates input,
//! persists the user's message, picks a reply and hands back a
//! [`PendingReply`] that lands after the thinking delay. At most one reply is
//! pending at a time; starting or switching conversations, deleting the
//! active one, clearing, submitting again or dropping the session cancels it.

pub mod reply;

pub use reply::{PendingReply, ReplyOutcome, ThinkingDelay};

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::config::ChatConfig;
use crate::error::Result;
use crate::responder::{ResponseCatalog, ResponseSelector};
use crate::storage::{FileStore, FileStoreConfig};
use crate::store::ConversationStore;
use crate::types::{Conversation, Message};

pub struct ChatSession {
    store: Arc<ConversationStore>,
    selector: Arc<ResponseSelector>,
    delay: ThinkingDelay,
    pending: Option<CancellationToken>,
}

impl std::fmt::Debug for ChatSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatSession")
            .field("store", &self.store)
            .field("delay", &self.delay)
            .field("pending", &self.pending.is_some())
            .finish()
    }
}

impl ChatSession {
    pub fn new(store: Arc<ConversationStore>, selector: Arc<ResponseSelector>) -> Self {
        Self {
            store,
            selector,
            delay: ThinkingDelay::default(),
            pending: None,
        }
    }

    /// File-backed session built from configuration.
    pub fn from_config(config: &ChatConfig) -> Result<Self> {
        config.validate()?;
        let backend = FileStore::new(FileStoreConfig::new(config.data_dir.clone()));
        let store = ConversationStore::new(Arc::new(backend)).with_keys(config.store_keys());
        let selector =
            ResponseSelector::with_catalog(ResponseCatalog::for_product(&config.product_name))?;
        Ok(Self::new(Arc::new(store), Arc::new(selector)).with_delay(config.thinking_delay()))
    }

    pub fn with_delay(mut self, delay: ThinkingDelay) -> Self {
        self.delay = delay;
        self
    }

    pub fn store(&self) -> &Arc<ConversationStore> {
        &self.store
    }

    pub fn selector(&self) -> &Arc<ResponseSelector> {
        &self.selector
    }

    /// Initialize storage and resolve which conversation to show.
    ///
    /// With no active pointer but stored conversations, the first (newest)
    /// one becomes active.
    pub fn open(&mut self) -> Result<Option<Conversation>> {
        let conversations = self.store.initialize()?;
        if self.store.active_conversation().is_none() {
            if let Some(first) = conversations.first() {
                self.store.set_active_conversation(Some(&first.id))?;
            }
        }
        Ok(self.active_conversation())
    }

    pub fn active_conversation(&self) -> Option<Conversation> {
        let id = self.store.active_conversation()?;
        self.store.get_conversation(&id)
    }

    /// Record a user message and prepare the reply.
    ///
    /// Blank input is ignored and yields `None`. Without an active
    /// conversation one is created first. Any reply still pending for an
    /// earlier message is canceled.
    pub fn submit(&mut self, text: &str) -> Result<Option<PendingReply>> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(None);
        }

        self.cancel_pending();

        let conversation_id = self.store.ensure_active_conversation()?;
        if self
            .store
            .add_message(&conversation_id, Message::user(text))?
            .is_none()
        {
            return Ok(None);
        }

        let category = self.selector.select_category(text);
        let response = self.selector.catalog().text(category).to_string();
        let token = CancellationToken::new();
        self.pending = Some(token.clone());

        debug!(conversation_id = %conversation_id, %category, "reply pending");
        Ok(Some(PendingReply::new(
            conversation_id,
            response,
            category,
            self.delay.sample(),
            token,
            Arc::clone(&self.store),
        )))
    }

    pub fn start_new_conversation(&mut self) -> Result<Conversation> {
        self.cancel_pending();
        self.store.create_conversation(None)
    }

    /// Switch to another conversation. `None` if `id` is unknown.
    pub fn open_conversation(&mut self, id: &str) -> Result<Option<Conversation>> {
        let Some(conversation) = self.store.get_conversation(id) else {
            return Ok(None);
        };
        if self.store.active_conversation().as_deref() != Some(id) {
            self.cancel_pending();
            self.store.set_active_conversation(Some(id))?;
        }
        Ok(Some(conversation))
    }

    pub fn delete_conversation(&mut self, id: &str) -> Result<bool> {
        if self.store.active_conversation().as_deref() == Some(id) {
            self.cancel_pending();
        }
        self.store.delete_conversation(id)
    }

    pub fn clear_all(&mut self) -> Result<()> {
        self.cancel_pending();
        self.store.clear_all()
    }

    /// Cancel the pending reply, if any. Returns whether one was pending.
    pub fn cancel_pending(&mut self) -> bool {
        match self.pending.take() {
            Some(token) => {
                let was_live = !token.is_cancelled();
                token.cancel();
                was_live
            }
            None => false,
        }
    }

    /// Tear the session down, canceling any pending reply.
    pub fn close(mut self) {
        self.cancel_pending();
    }
}

impl Drop for ChatSession {
    fn drop(&mut self) {
        self.cancel_pending();
    }
}
