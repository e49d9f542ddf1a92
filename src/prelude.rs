//! Convenience re-exports for common use.

pub use crate::config::ChatConfig;
pub use crate::error::{ChatError, Result};
pub use crate::responder::{ResponseCatalog, ResponseCategory, ResponseSelector};
pub use crate::session::{ChatSession, PendingReply, ReplyOutcome, ThinkingDelay};
pub use crate::storage::{FileStore, FileStoreConfig, KeyValueStore, MemoryStore};
pub use crate::store::{ConversationStore, StoreKeys};
pub use crate::types::{Conversation, Message, Role};
