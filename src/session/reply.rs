//! Delayed, cancellable delivery of a selected reply.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::Result;
use crate::responder::ResponseCategory;
use crate::store::ConversationStore;
use crate::types::{Conversation, Message};

/// Simulated "thinking" time before a reply shows up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThinkingDelay {
    /// Minimum wait.
    pub base: Duration,
    /// Upper bound of the random extra wait added to `base`.
    pub jitter: Duration,
}

impl Default for ThinkingDelay {
    fn default() -> Self {
        Self {
            base: Duration::from_millis(1000),
            jitter: Duration::from_millis(2000),
        }
    }
}

impl ThinkingDelay {
    pub fn new(base: Duration, jitter: Duration) -> Self {
        Self { base, jitter }
    }

    /// Always the same wait.
    pub fn fixed(duration: Duration) -> Self {
        Self::new(duration, Duration::ZERO)
    }

    /// Replies are delivered without waiting.
    pub fn none() -> Self {
        Self::fixed(Duration::ZERO)
    }

    /// Pick a wait in `base..=base + jitter`.
    pub fn sample(&self) -> Duration {
        if self.jitter.is_zero() {
            return self.base;
        }
        self.base + self.jitter.mul_f64(rand_factor())
    }
}

/// What happened to a pending reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyOutcome {
    /// Appended; carries the updated conversation.
    Delivered(Conversation),
    /// Canceled before delivery.
    Canceled,
    /// The target conversation was deleted or is no longer active.
    Orphaned,
}

/// A reply waiting out its thinking delay.
///
/// Nothing is written until [`PendingReply::deliver`] completes, and only if
/// the reply was not canceled and its conversation is still the active one.
#[derive(Debug)]
pub struct PendingReply {
    conversation_id: String,
    response: String,
    category: ResponseCategory,
    delay: Duration,
    token: CancellationToken,
    store: Arc<ConversationStore>,
}

impl PendingReply {
    pub(crate) fn new(
        conversation_id: String,
        response: String,
        category: ResponseCategory,
        delay: Duration,
        token: CancellationToken,
        store: Arc<ConversationStore>,
    ) -> Self {
        Self {
            conversation_id,
            response,
            category,
            delay,
            token,
            store,
        }
    }

    pub fn conversation_id(&self) -> &str {
        &self.conversation_id
    }

    pub fn response(&self) -> &str {
        &self.response
    }

    pub fn category(&self) -> ResponseCategory {
        self.category
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_canceled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Wait out the delay, then append the reply to its conversation.
    pub async fn deliver(self) -> Result<ReplyOutcome> {
        tokio::select! {
            biased;
            _ = self.token.cancelled() => {
                debug!(conversation_id = %self.conversation_id, "reply canceled while thinking");
                return Ok(ReplyOutcome::Canceled);
            }
            _ = tokio::time::sleep(self.delay) => {}
        }

        if self.token.is_cancelled() {
            return Ok(ReplyOutcome::Canceled);
        }

        if self.store.active_conversation().as_deref() != Some(self.conversation_id.as_str()) {
            debug!(conversation_id = %self.conversation_id, "reply target no longer active");
            return Ok(ReplyOutcome::Orphaned);
        }

        match self
            .store
            .add_message(&self.conversation_id, Message::assistant(self.response))?
        {
            Some(conversation) => {
                debug!(
                    conversation_id = %conversation.id,
                    category = %self.category,
                    "reply delivered"
                );
                Ok(ReplyOutcome::Delivered(conversation))
            }
            None => Ok(ReplyOutcome::Orphaned),
        }
    }
}

/// Pseudo-random factor in [0, 1) from the clock and thread id.
fn rand_factor() -> f64 {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    let mut hasher = DefaultHasher::new();
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos()
        .hash(&mut hasher);
    std::thread::current().id().hash(&mut hasher);

    let hash = hasher.finish();
    (hash % 10000) as f64 / 10000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_stays_within_bounds() {
        let delay = ThinkingDelay::new(Duration::from_millis(100), Duration::from_millis(50));
        for _ in 0..100 {
            let sampled = delay.sample();
            assert!(sampled >= Duration::from_millis(100));
            assert!(sampled <= Duration::from_millis(150));
        }
    }

    #[test]
    fn fixed_and_none_do_not_jitter() {
        assert_eq!(
            ThinkingDelay::fixed(Duration::from_millis(7)).sample(),
            Duration::from_millis(7)
        );
        assert_eq!(ThinkingDelay::none().sample(), Duration::ZERO);
    }

    #[test]
    fn default_matches_one_to_three_seconds() {
        let delay = ThinkingDelay::default();
        assert_eq!(delay.base, Duration::from_secs(1));
        assert_eq!(delay.jitter, Duration::from_secs(2));
    }
}
