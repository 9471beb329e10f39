//! Session-scoped grid state container.
//!
//! The store owns the current snapshot behind a lock. Readers clone the
//! `Arc` and never see a partially applied mutation; writers compute the next
//! snapshot from the current one and swap it in within one critical section.
//! Once disposed, the store refuses further mutations so late results from
//! abandoned work are dropped instead of applied.
use crate::grid::Grid;
use parking_lot::Mutex;
use std::sync::Arc;

#[derive(Debug)]
struct StoreState {
    grid: Arc<Grid>,
    disposed: bool,
}

/// Holder of the one live grid for a session.
#[derive(Debug)]
pub struct GridStore {
    state: Mutex<StoreState>,
}

impl GridStore {
    pub fn new(grid: Grid) -> Self {
        Self {
            state: Mutex::new(StoreState {
                grid: Arc::new(grid),
                disposed: false,
            }),
        }
    }

    /// Current snapshot. Stays valid after later mutations and after disposal.
    pub fn snapshot(&self) -> Arc<Grid> {
        Arc::clone(&self.state.lock().grid)
    }

    /// Replace the snapshot with `f(current)`.
    ///
    /// Returns the new snapshot, or `None` when the store has been disposed.
    pub fn update<F>(&self, f: F) -> Option<Arc<Grid>>
    where
        F: FnOnce(&Grid) -> Grid,
    {
        let mut state = self.state.lock();
        if state.disposed {
            return None;
        }
        let next = Arc::new(f(&state.grid));
        state.grid = Arc::clone(&next);
        Some(next)
    }

    /// Replace the snapshot and hand back a value computed alongside it.
    ///
    /// `f` runs under the lock, so the value describes exactly the transition
    /// that was published.
    pub fn update_with<F, R>(&self, f: F) -> Option<R>
    where
        F: FnOnce(&Grid) -> (Grid, R),
    {
        let mut state = self.state.lock();
        if state.disposed {
            return None;
        }
        let (next, value) = f(&state.grid);
        state.grid = Arc::new(next);
        Some(value)
    }

    /// Stop accepting mutations.
    pub fn dispose(&self) {
        self.state.lock().disposed = true;
    }

    pub fn is_disposed(&self) -> bool {
        self.state.lock().disposed
    }
}

impl Default for GridStore {
    fn default() -> Self {
        Self::new(Grid::initial())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::ops;

    #[test]
    fn earlier_snapshots_are_unaffected_by_updates() {
        let store = GridStore::default();
        let before = store.snapshot();
        store.update(ops::add_row).unwrap();
        assert_eq!(before.height(), 5);
        assert_eq!(store.snapshot().height(), 6);
    }

    #[test]
    fn update_with_returns_value_from_the_same_transition() {
        let store = GridStore::default();
        let revision = store
            .update_with(|grid| {
                let next = ops::add_row(grid);
                let revision = next.revision();
                (next, revision)
            })
            .unwrap();
        assert_eq!(store.snapshot().revision(), revision);
    }

    #[test]
    fn disposed_store_ignores_mutations_but_still_reads() {
        let store = GridStore::default();
        store.dispose();
        assert!(store.is_disposed());
        assert!(store.update(ops::add_row).is_none());
        assert_eq!(store.snapshot().height(), 5);
    }

    #[test]
    fn concurrent_updates_are_all_applied() {
        let store = GridStore::default();
        std::thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| {
                    store.update(ops::add_row);
                });
            }
        });
        assert_eq!(store.snapshot().height(), 13);
        assert!(ops::is_rectangular(&store.snapshot()));
    }
}
