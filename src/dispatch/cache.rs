/// Per-schema cache of compiled dispatchers
///
/// Each identifier owns one slot holding an immutable `CompiledDispatcher`.
/// Readers take an `Arc` to the current snapshot and keep it for the whole
/// execution; a rebuild swaps in a new snapshot without touching the old one.

use crate::dispatch::CompiledDispatcher;
use crate::registry::FreshnessMarker;

use arc_swap::ArcSwapOption;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

type Slot = Arc<ArcSwapOption<CompiledDispatcher>>;

#[derive(Default)]
pub struct DispatcherCache {
    slots: RwLock<HashMap<String, Slot>>,
}

impl DispatcherCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, identifier: &str) -> Slot {
        if let Some(slot) = self.slots.read().get(identifier) {
            return Arc::clone(slot);
        }
        let mut slots = self.slots.write();
        Arc::clone(slots.entry(identifier.to_string()).or_default())
    }

    /// The cached dispatcher, but only if it was built from `marker`.
    pub fn get_fresh(&self, identifier: &str, marker: &FreshnessMarker) -> Option<Arc<CompiledDispatcher>> {
        let current = self.slots.read().get(identifier)?.load_full()?;
        (current.marker() == marker).then_some(current)
    }

    /// Any cached dispatcher regardless of freshness
    pub fn get(&self, identifier: &str) -> Option<Arc<CompiledDispatcher>> {
        self.slots.read().get(identifier)?.load_full()
    }

    /// Replace the slot's dispatcher. In-flight executions holding the
    /// previous one finish against it.
    pub fn store(&self, dispatcher: Arc<CompiledDispatcher>) {
        self.slot(dispatcher.identifier()).store(Some(dispatcher));
    }

    pub fn invalidate(&self, identifier: &str) {
        if let Some(slot) = self.slots.read().get(identifier) {
            slot.store(None);
        }
    }

    pub fn len(&self) -> usize {
        self.slots
            .read()
            .values()
            .filter(|slot| slot.load().is_some())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
