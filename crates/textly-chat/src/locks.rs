//! Per-conversation turn serialization.
//!
//! A turn holds its conversation's lock from the history read until the
//! totals are written, so two tabs committing to the same conversation
//! queue up instead of losing an increment.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

pub type TurnGuard = OwnedMutexGuard<()>;

#[derive(Default)]
pub struct ConversationLocks {
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl ConversationLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait until no other turn of this conversation is in flight
    pub async fn acquire(&self, conversation_id: &str) -> TurnGuard {
        let lock = {
            let mut locks = self.locks.lock().await;
            locks
                .entry(conversation_id.to_owned())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        lock.lock_owned().await
    }

    /// Number of tracked conversations
    pub async fn len(&self) -> usize {
        self.locks.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Forget conversations with no holder and no waiter
    pub async fn prune_idle(&self) {
        let mut locks = self.locks.lock().await;
        locks.retain(|_, lock| Arc::strong_count(lock) > 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_same_conversation_waits() {
        let locks = Arc::new(ConversationLocks::new());
        let first = locks.acquire("c1").await;

        let waiter = {
            let locks = locks.clone();
            tokio::spawn(async move {
                let _guard = locks.acquire("c1").await;
                42
            })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        drop(first);
        assert_eq!(waiter.await.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_different_conversations_run_together() {
        let locks = ConversationLocks::new();
        let _a = locks.acquire("a").await;
        let _b = locks.acquire("b").await;
        assert_eq!(locks.len().await, 2);
    }

    #[tokio::test]
    async fn test_prune_keeps_held_locks() {
        let locks = ConversationLocks::new();
        let held = locks.acquire("held").await;
        drop(locks.acquire("idle").await);

        locks.prune_idle().await;
        assert_eq!(locks.len().await, 1);

        drop(held);
        locks.prune_idle().await;
        assert!(locks.is_empty().await);
    }
}
