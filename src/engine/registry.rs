use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::model::event::UserId;
use crate::model::flow::StandupFlow;

/// One user's flow. Holding its lock serializes every mutation for that user.
pub type FlowHandle = Arc<Mutex<StandupFlow>>;

/// Per-user flow table. The table lock is only held long enough to look up
/// or insert a handle.
#[derive(Default)]
pub struct FlowRegistry {
    flows: Mutex<HashMap<UserId, FlowHandle>>,
}

impl FlowRegistry {
    pub fn new() -> Self {
        FlowRegistry::default()
    }

    /// The user's flow handle, creating an idle flow when there is none
    pub async fn handle(&self, user: &UserId) -> FlowHandle {
        self.flows
            .lock()
            .await
            .entry(user.clone())
            .or_insert_with(|| Arc::new(Mutex::new(StandupFlow::new())))
            .clone()
    }

    pub async fn get(&self, user: &UserId) -> Option<FlowHandle> {
        self.flows.lock().await.get(user).cloned()
    }

    /// Copy of every flow, for persisting
    pub async fn snapshot(&self) -> BTreeMap<UserId, StandupFlow> {
        let handles: Vec<(UserId, FlowHandle)> = self
            .flows
            .lock()
            .await
            .iter()
            .map(|(u, h)| (u.clone(), h.clone()))
            .collect();
        let mut flows = BTreeMap::new();
        for (user, handle) in handles {
            flows.insert(user, handle.lock().await.clone());
        }
        flows
    }

    /// Replace the table with previously persisted flows
    pub async fn restore(&self, flows: BTreeMap<UserId, StandupFlow>) {
        let mut table = self.flows.lock().await;
        table.clear();
        for (user, flow) in flows {
            table.insert(user, Arc::new(Mutex::new(flow)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::flow::FlowState;

    #[tokio::test]
    async fn test_handle_is_shared_per_user() {
        let registry = FlowRegistry::new();
        let user = UserId::from("@alice:x");
        assert!(registry.get(&user).await.is_none());

        let a = registry.handle(&user).await;
        a.lock().await.state = FlowState::Today;
        let b = registry.handle(&user).await;
        assert_eq!(b.lock().await.state, FlowState::Today);
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[tokio::test]
    async fn test_snapshot_and_restore() {
        let registry = FlowRegistry::new();
        let user = UserId::from("@bob:x");
        registry.handle(&user).await.lock().await.state = FlowState::Notes;

        let saved = registry.snapshot().await;
        let restored = FlowRegistry::new();
        restored.restore(saved.clone()).await;
        assert_eq!(restored.snapshot().await, saved);
        assert_eq!(
            restored.get(&user).await.unwrap().lock().await.state,
            FlowState::Notes
        );
    }
}
