// SPDX-License-Identifier: GPL-3.0-only

//! Global capture counter

use super::store::CountStore;
use crate::constants::COUNTER_KEY;
use crate::errors::CounterError;
use std::sync::Arc;
use tracing::debug;

/// Read and increment the global capture count
///
/// The count lives under [`COUNTER_KEY`]; an absent key reads as zero. There is
/// no reset, so the value never decreases.
#[derive(Clone)]
pub struct CounterService {
    store: Arc<dyn CountStore>,
}

impl CounterService {
    pub fn new(store: Arc<dyn CountStore>) -> Self {
        Self { store }
    }

    /// Current count, 0 when nothing has been stored yet
    pub fn get_count(&self) -> Result<u64, CounterError> {
        let count = self
            .store
            .get(COUNTER_KEY)
            .map_err(|e| CounterError::Store(e.to_string()))?
            .unwrap_or(0);
        debug!(count, "Capture count read");
        Ok(count)
    }

    /// Add one capture and return the new count
    pub fn increment_count(&self) -> Result<u64, CounterError> {
        let count = self
            .store
            .increment(COUNTER_KEY)
            .map_err(|e| CounterError::Store(e.to_string()))?;
        debug!(count, "Capture count incremented");
        Ok(count)
    }
}

impl std::fmt::Debug for CounterService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CounterService").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::counter::store::{MemoryStore, StoreError, StoreResult};

    struct BrokenStore;

    impl CountStore for BrokenStore {
        fn get(&self, _key: &str) -> StoreResult<Option<u64>> {
            Err(StoreError::Io("disk gone".into()))
        }

        fn set(&self, _key: &str, _value: u64) -> StoreResult<()> {
            Err(StoreError::Io("disk gone".into()))
        }
    }

    #[test]
    fn empty_store_reads_zero() {
        let service = CounterService::new(Arc::new(MemoryStore::new()));
        assert_eq!(service.get_count().unwrap(), 0);
    }

    #[test]
    fn increments_from_empty_count_up() {
        let service = CounterService::new(Arc::new(MemoryStore::new()));

        assert_eq!(service.increment_count().unwrap(), 1);
        assert_eq!(service.increment_count().unwrap(), 2);
        assert_eq!(service.get_count().unwrap(), 2);
        assert_eq!(service.increment_count().unwrap(), 3);
        assert_eq!(service.get_count().unwrap(), 3);
    }

    #[test]
    fn uses_the_fixed_key() {
        let store = Arc::new(MemoryStore::new());
        let service = CounterService::new(store.clone());

        service.increment_count().unwrap();
        assert_eq!(store.get("global_capture_count").unwrap(), Some(1));
    }

    #[test]
    fn store_failures_surface_as_counter_errors() {
        let service = CounterService::new(Arc::new(BrokenStore));

        assert!(matches!(service.get_count(), Err(CounterError::Store(_))));
        assert!(matches!(
            service.increment_count(),
            Err(CounterError::Store(_))
        ));
    }
}
