//! Core data model for jaat-chat.

pub mod conversation;
pub mod message;

pub use conversation::*;
pub use message::*;
