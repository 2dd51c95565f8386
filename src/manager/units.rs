//! Registry of units currently known to the manager.

use dashmap::DashMap;
use std::sync::Arc;

use crate::client::{Unit, UnitId};
use crate::observability::metrics;

/// Concurrent UnitId → unit map.
///
/// Shard locks are held only for the map operation itself, never across a
/// reload or a status push.
#[derive(Default)]
pub struct UnitRegistry {
    inner: DashMap<UnitId, Arc<dyn Unit>>,
}

impl UnitRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the handle stored for the unit's ID.
    pub fn add(&self, unit: Arc<dyn Unit>) {
        self.inner.insert(unit.id().clone(), unit);
        metrics::record_unit_count(self.inner.len());
    }

    pub fn get(&self, id: &UnitId) -> Option<Arc<dyn Unit>> {
        self.inner.get(id).map(|r| r.value().clone())
    }

    pub fn remove(&self, id: &UnitId) -> Option<Arc<dyn Unit>> {
        let removed = self.inner.remove(id).map(|(_, unit)| unit);
        metrics::record_unit_count(self.inner.len());
        removed
    }

    pub fn contains(&self, id: &UnitId) -> bool {
        self.inner.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{ManagedUnit, UnitConfig, UnitState, UnitType};

    fn unit(id: &str) -> Arc<dyn Unit> {
        Arc::new(ManagedUnit::new(id, UnitType::Input, UnitState::Healthy, UnitConfig::default()))
    }

    #[test]
    fn test_add_get_remove() {
        let registry = UnitRegistry::new();
        assert_eq!(registry.len(), 0);

        registry.add(unit("a"));
        registry.add(unit("b"));
        assert_eq!(registry.len(), 2);
        assert!(registry.contains(&UnitId::from("a")));

        let removed = registry.remove(&UnitId::from("a")).unwrap();
        assert_eq!(removed.id().as_str(), "a");
        assert!(registry.get(&UnitId::from("a")).is_none());
        assert!(registry.remove(&UnitId::from("a")).is_none());
    }

    #[test]
    fn test_add_replaces_handle() {
        let registry = UnitRegistry::new();
        let first = unit("a");
        let second = unit("a");
        registry.add(first.clone());
        registry.add(second.clone());

        assert_eq!(registry.len(), 1);
        let stored = registry.get(&UnitId::from("a")).unwrap();
        assert!(Arc::ptr_eq(&stored, &second));
    }
}
