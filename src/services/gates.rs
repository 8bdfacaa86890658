use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// One lock object per event id, created on first use.
///
/// Locks are process-local. Entries are never removed; there is one per event
/// this process has touched.
pub(crate) struct EventGates<T> {
    gates: Mutex<HashMap<i64, Arc<T>>>,
}

impl<T: Default> EventGates<T> {
    pub(crate) fn new() -> Self {
        Self {
            gates: Mutex::new(HashMap::new()),
        }
    }

    pub(crate) fn get(&self, event_id: i64) -> Arc<T> {
        let mut gates = self.gates.lock().unwrap_or_else(|e| e.into_inner());
        gates.entry(event_id).or_default().clone()
    }
}

impl<T: Default> Default for EventGates<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::Mutex as AsyncMutex;

    #[test]
    fn same_event_shares_one_gate() {
        let gates: EventGates<AsyncMutex<()>> = EventGates::new();
        assert!(Arc::ptr_eq(&gates.get(1), &gates.get(1)));
        assert!(!Arc::ptr_eq(&gates.get(1), &gates.get(2)));
    }
}
