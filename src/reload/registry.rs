//! Name → reloadable lookup table.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;
use thiserror::Error;

use crate::reload::{Reloadable, ReloadableList};

/// Errors raised while registering reloadables.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("{0} configuration is already registered")]
    AlreadyRegistered(String),
}

/// Thread-safe registry of reloadable subsystems.
///
/// A name is either a singular reloadable or a list, never both.
#[derive(Clone, Default)]
pub struct ReloadRegistry {
    single: Arc<DashMap<String, Arc<dyn Reloadable>>>,
    lists: Arc<DashMap<String, Arc<dyn ReloadableList>>>,
}

impl ReloadRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a singular reloadable under `name`.
    pub fn register(&self, name: &str, obj: Arc<dyn Reloadable>) -> Result<(), RegistryError> {
        if self.lists.contains_key(name) {
            return Err(RegistryError::AlreadyRegistered(name.to_string()));
        }
        match self.single.entry(name.to_string()) {
            Entry::Occupied(_) => Err(RegistryError::AlreadyRegistered(name.to_string())),
            Entry::Vacant(entry) => {
                entry.insert(obj);
                tracing::debug!(name, "Registered reloadable");
                Ok(())
            }
        }
    }

    /// Register a reloadable list under `name`.
    pub fn register_list(&self, name: &str, obj: Arc<dyn ReloadableList>) -> Result<(), RegistryError> {
        if self.single.contains_key(name) {
            return Err(RegistryError::AlreadyRegistered(name.to_string()));
        }
        match self.lists.entry(name.to_string()) {
            Entry::Occupied(_) => Err(RegistryError::AlreadyRegistered(name.to_string())),
            Entry::Vacant(entry) => {
                entry.insert(obj);
                tracing::debug!(name, "Registered reloadable list");
                Ok(())
            }
        }
    }

    pub fn get_reloadable(&self, name: &str) -> Option<Arc<dyn Reloadable>> {
        self.single.get(name).map(|r| r.value().clone())
    }

    pub fn get_reloadable_list(&self, name: &str) -> Option<Arc<dyn ReloadableList>> {
        self.lists.get(name).map(|r| r.value().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reload::{ConfigWithMeta, ReloadError};
    use async_trait::async_trait;

    struct Noop;

    #[async_trait]
    impl Reloadable for Noop {
        async fn reload(&self, _config: ConfigWithMeta) -> Result<(), ReloadError> {
            Ok(())
        }
    }

    #[async_trait]
    impl ReloadableList for Noop {
        async fn reload(&self, _configs: Vec<ConfigWithMeta>) -> Result<(), ReloadError> {
            Ok(())
        }
    }

    #[test]
    fn test_register_and_lookup() {
        let registry = ReloadRegistry::new();
        registry.register("output", Arc::new(Noop)).unwrap();
        registry.register_list("input", Arc::new(Noop)).unwrap();

        assert!(registry.get_reloadable("output").is_some());
        assert!(registry.get_reloadable_list("input").is_some());
        assert!(registry.get_reloadable("input").is_none());
        assert!(registry.get_reloadable_list("output").is_none());
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let registry = ReloadRegistry::new();
        registry.register("output", Arc::new(Noop)).unwrap();

        let err = registry.register("output", Arc::new(Noop)).unwrap_err();
        assert_eq!(err.to_string(), "output configuration is already registered");
        assert!(registry.register_list("output", Arc::new(Noop)).is_err());
    }
}
