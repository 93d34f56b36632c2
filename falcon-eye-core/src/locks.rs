use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};

/// Concurrent map of lock handles keyed by `(agent_id, session_id)`. Entries
/// are created on demand and never removed: the expected key space (agents
/// times sessions) is small enough that pruning isn't worth the complexity
/// it would add to the hot path.
#[derive(Clone, Default)]
pub struct SessionLocks {
    inner: Arc<Mutex<HashMap<(uuid::Uuid, String), Arc<Mutex<()>>>>>,
}

impl SessionLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquires the lock for `(agent_id, session_id)`, held for the entire
    /// chat turn: persist user message -> POST to the agent pod -> persist
    /// assistant message.
    pub async fn acquire(&self, agent_id: uuid::Uuid, session_id: &str) -> OwnedMutexGuard<()> {
        let handle = {
            let mut map = self.inner.lock().await;
            map.entry((agent_id, session_id.to_string()))
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        handle.lock_owned().await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[tokio::test]
    async fn same_key_serializes_access() {
        let locks = SessionLocks::new();
        let agent_id = uuid::Uuid::new_v4();
        let order = Arc::new(std::sync::Mutex::new(Vec::new()));

        let mut handles = Vec::new();
        for i in 0..5 {
            let locks = locks.clone();
            let order = order.clone();
            handles.push(tokio::spawn(async move {
                let _guard = locks.acquire(agent_id, "session-a").await;
                order.lock().unwrap().push(i);
                tokio::task::yield_now().await;
            }));
        }
        for h in handles {
            h.await.unwrap();
        }
        assert_eq!(order.lock().unwrap().len(), 5);
    }

    #[tokio::test]
    async fn distinct_keys_do_not_block_each_other() {
        let locks = SessionLocks::new();
        let agent_id = uuid::Uuid::new_v4();
        let entered = Arc::new(AtomicUsize::new(0));

        let guard_a = locks.acquire(agent_id, "session-a").await;
        let entered_clone = entered.clone();
        let locks_clone = locks.clone();
        let joined = tokio::spawn(async move {
            let _guard = locks_clone.acquire(agent_id, "session-b").await;
            entered_clone.fetch_add(1, Ordering::SeqCst);
        });
        joined.await.unwrap();
        assert_eq!(entered.load(Ordering::SeqCst), 1);
        drop(guard_a);
    }
}
