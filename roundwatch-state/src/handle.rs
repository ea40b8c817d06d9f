use std::sync::Arc;

use tokio::sync::Mutex;

use crate::state::ReconciliationState;

/// Shared owner of the reconciliation state.
///
/// Writers replace slices of the snapshot under the lock; readers take a
/// full clone so height, round and step are always seen together.
#[derive(Clone, Default)]
pub struct StateHandle {
    inner: Arc<Mutex<ReconciliationState>>,
}

impl StateHandle {
    pub fn new(state: ReconciliationState) -> Self {
        Self {
            inner: Arc::new(Mutex::new(state)),
        }
    }

    pub async fn snapshot(&self) -> ReconciliationState {
        self.inner.lock().await.clone()
    }

    pub async fn update<R>(&self, f: impl FnOnce(&mut ReconciliationState) -> R) -> R {
        let mut state = self.inner.lock().await;
        f(&mut state)
    }
}
