use crate::indicator::IndicatorState;
use fnv::FnvHashMap;
use parking_lot::{Mutex, RwLock};
use smol_str::SmolStr;
use std::sync::Arc;

/// Keyed map from instrument id to its [`IndicatorState`].
///
/// Lookup takes the shared read lock; first-seen insertion upgrades to the
/// write lock and goes through `entry`, so concurrent first observations for
/// the same instrument create exactly one state. The map lock is only ever
/// held for the pointer lookup or insert - never across a caller's closure -
/// so updates for one instrument serialize on its own mutex while distinct
/// instruments proceed in parallel.
///
/// `parking_lot` mutexes do not poison: a panic inside one instrument's
/// critical section leaves every other instrument's state reachable and
/// intact.
#[derive(Debug, Default)]
pub struct InstrumentStateStore {
    states: RwLock<FnvHashMap<SmolStr, Arc<Mutex<IndicatorState>>>>,
}

impl InstrumentStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` with exclusive access to the state for `instrument_id`,
    /// creating it with `init` on the instrument's first observation, and
    /// return `f`'s result.
    ///
    /// Invocations for the same id never run `f` concurrently and are applied
    /// in arrival order; invocations for different ids do not block each
    /// other.
    pub fn with_state<T>(
        &self,
        instrument_id: &SmolStr,
        init: impl FnOnce() -> IndicatorState,
        f: impl FnOnce(&mut IndicatorState) -> T,
    ) -> T {
        let existing = self.states.read().get(instrument_id).cloned();

        let state = match existing {
            Some(state) => state,
            None => Arc::clone(
                self.states
                    .write()
                    .entry(instrument_id.clone())
                    .or_insert_with(|| Arc::new(Mutex::new(init()))),
            ),
        };

        let mut guard = state.lock();
        f(&mut guard)
    }

    /// Number of instruments currently tracked.
    pub fn len(&self) -> usize {
        self.states.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.read().is_empty()
    }

    pub fn contains(&self, instrument_id: &str) -> bool {
        self.states.read().contains_key(instrument_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalysisConfig;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    fn new_state() -> IndicatorState {
        IndicatorState::new(&AnalysisConfig::default())
    }

    #[test]
    fn test_lazy_creation_and_reuse() {
        let store = InstrumentStateStore::new();
        let id = SmolStr::new("26000");

        assert!(!store.contains("26000"));

        store.with_state(&id, new_state, |state| {
            state.cumulative_volume = 42;
        });
        assert!(store.contains("26000"));
        assert_eq!(store.len(), 1);

        // Second invocation sees the mutated state, not a fresh one.
        let volume = store.with_state(&id, new_state, |state| state.cumulative_volume);
        assert_eq!(volume, 42);
    }

    #[test]
    fn test_isolation_between_instruments() {
        let store = InstrumentStateStore::new();
        let a = SmolStr::new("A");
        let b = SmolStr::new("B");

        store.with_state(&a, new_state, |state| state.cumulative_volume = 100);
        store.with_state(&b, new_state, |state| state.cumulative_volume = 200);

        assert_eq!(store.with_state(&a, new_state, |s| s.cumulative_volume), 100);
        assert_eq!(store.with_state(&b, new_state, |s| s.cumulative_volume), 200);
    }

    #[test]
    fn test_concurrent_first_observation_creates_exactly_once() {
        let store = Arc::new(InstrumentStateStore::new());
        let creations = Arc::new(AtomicUsize::new(0));
        let id = SmolStr::new("13");

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let store = Arc::clone(&store);
                let creations = Arc::clone(&creations);
                let id = id.clone();
                thread::spawn(move || {
                    store.with_state(
                        &id,
                        || {
                            creations.fetch_add(1, Ordering::SeqCst);
                            new_state()
                        },
                        |state| state.cumulative_volume += 1,
                    );
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(creations.load(Ordering::SeqCst), 1);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_same_key_updates_are_serialized() {
        let store = Arc::new(InstrumentStateStore::new());
        let id = SmolStr::new("11536");

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                let id = id.clone();
                thread::spawn(move || {
                    for _ in 0..1000 {
                        store.with_state(&id, new_state, |state| {
                            // Read-modify-write: lost updates would show up as
                            // a short final count.
                            let next = state.cumulative_volume + 1;
                            state.cumulative_volume = next;
                        });
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        let total = store.with_state(&id, new_state, |state| state.cumulative_volume);
        assert_eq!(total, 8 * 1000);
    }

    #[test]
    fn test_distinct_keys_do_not_contend_on_state() {
        let store = Arc::new(InstrumentStateStore::new());

        let handles: Vec<_> = (0..8)
            .map(|worker| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    let id = SmolStr::new(format!("instrument-{worker}"));
                    for _ in 0..500 {
                        store.with_state(&id, new_state, |state| {
                            state.cumulative_volume += 1;
                        });
                    }
                    store.with_state(&id, new_state, |state| state.cumulative_volume)
                })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), 500);
        }
        assert_eq!(store.len(), 8);
    }
}
