//! jaat-chat: demo chat engine for Jaat-AI.
//!
//! Keeps a locally persisted list of conversations and answers user
//! messages with canned replies chosen by keyword matching. There is no model
//! behind it: the point is the conversation bookkeeping (titles, ordering,
//! the active pointer) and a reply pipeline that never writes a stale answer.
//!
//! # Quick Start
//!
//! ```
//! use std::sync::Arc;
//! use jaat_chat::prelude::*;
//!
//! # async fn example() -> jaat_chat::error::Result<()> {
//! let store = Arc::new(ConversationStore::in_memory());
//! let selector = Arc::new(ResponseSelector::new()?);
//! let mut session = ChatSession::new(store, selector).with_delay(ThinkingDelay::none());
//! session.open()?;
//!
//! if let Some(pending) = session.submit("How much is the subscription?")? {
//!     if let ReplyOutcome::Delivered(conversation) = pending.deliver().await? {
//!         println!("{}", conversation.messages[1].content);
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod prelude;
pub mod responder;
pub mod session;
pub mod storage;
pub mod store;
pub mod types;

#[cfg(feature = "cli")]
pub mod cli;
