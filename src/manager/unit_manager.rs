//! The unit manager and its process-facing API.

use arc_swap::{ArcSwap, ArcSwapOption};
use async_trait::async_trait;
use std::sync::{Arc, Mutex, MutexGuard, Once, PoisonError};

use crate::client::{
    Action, AgentInfo, ConfigMap, ControlClient, Payload, Unit, UnitId, UnitState,
};
use crate::config::ManagementConfig;
use crate::manager::units::UnitRegistry;
use crate::manager::{event_loop, Manager, ManagerError, StopCallback};
use crate::reload::ReloadRegistry;
use crate::transform::{ConfigTransform, DefaultTransform};

/// Manager-wide state guarded by a single lock.
#[derive(Debug, Default)]
pub(crate) struct ManagerState {
    /// True between a successful start and the first shutdown.
    pub(crate) running: bool,
    /// First input unit observed; never reassigned.
    pub(crate) main_unit: Option<UnitId>,
}

pub(crate) struct Inner {
    pub(crate) config: ManagementConfig,
    pub(crate) reloadables: ReloadRegistry,
    pub(crate) client: Option<Arc<dyn ControlClient>>,
    pub(crate) transform: Arc<dyn ConfigTransform>,
    pub(crate) units: UnitRegistry,
    pub(crate) state: Mutex<ManagerState>,
    pub(crate) payload: ArcSwap<Payload>,
    pub(crate) stop_callback: ArcSwapOption<StopCallback>,
    pub(crate) stop_once: Once,
}

/// Reconciles control-plane units with the local reloadable subsystems.
///
/// Cheap to clone; clones share the same registry and state.
#[derive(Clone)]
pub struct UnitManager {
    pub(crate) inner: Arc<Inner>,
}

impl UnitManager {
    /// Create a manager using the stock configuration transforms.
    ///
    /// When `config.enabled` is false the client is dropped and every
    /// operation is inert.
    pub fn new(
        config: ManagementConfig,
        reloadables: ReloadRegistry,
        client: Arc<dyn ControlClient>,
    ) -> Self {
        Self::with_transform(config, reloadables, client, Arc::new(DefaultTransform))
    }

    pub fn with_transform(
        config: ManagementConfig,
        reloadables: ReloadRegistry,
        client: Arc<dyn ControlClient>,
        transform: Arc<dyn ConfigTransform>,
    ) -> Self {
        let client = config.enabled.then_some(client);

        Self {
            inner: Arc::new(Inner {
                config,
                reloadables,
                client,
                transform,
                units: UnitRegistry::new(),
                state: Mutex::new(ManagerState::default()),
                payload: ArcSwap::from_pointee(Payload::new()),
                stop_callback: ArcSwapOption::empty(),
                stop_once: Once::new(),
            }),
        }
    }

    /// ID of the unit receiving process-wide status, if one was designated.
    pub fn main_unit(&self) -> Option<UnitId> {
        self.inner.lock_state().main_unit.clone()
    }

    pub fn is_running(&self) -> bool {
        self.inner.lock_state().running
    }

    pub fn unit(&self, id: &UnitId) -> Option<Arc<dyn Unit>> {
        self.inner.units.get(id)
    }

    pub fn unit_count(&self) -> usize {
        self.inner.units.len()
    }
}

impl Inner {
    pub(crate) fn lock_state(&self) -> MutexGuard<'_, ManagerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Designate `id` as the main unit unless one is already set.
    pub(crate) fn set_main_unit(&self, id: &UnitId) -> bool {
        let mut state = self.lock_state();
        if state.main_unit.is_some() {
            return false;
        }
        state.main_unit = Some(id.clone());
        tracing::info!(unit_id = %id, "Designated main unit");
        true
    }

    /// Handle of the main unit, if designated and still registered.
    pub(crate) fn main_unit_handle(&self) -> Option<Arc<dyn Unit>> {
        let id = self.lock_state().main_unit.clone()?;
        self.units.get(&id)
    }

    pub(crate) fn agent_info(&self) -> AgentInfo {
        self.client
            .as_ref()
            .map(|client| client.agent_info())
            .unwrap_or_default()
    }

    /// Best-effort status push carrying the current payload.
    pub(crate) fn push_status(&self, unit: &Arc<dyn Unit>, state: UnitState, message: &str) {
        let payload = self.payload.load();
        let payload = (!payload.is_empty()).then_some(&**payload);
        if let Err(e) = unit.update_state(state, message, payload) {
            tracing::debug!(
                unit_id = %unit.id(),
                state = %state,
                error = %e,
                "Failed to push unit status"
            );
        }
    }
}

#[async_trait]
impl Manager for UnitManager {
    fn enabled(&self) -> bool {
        self.inner.config.enabled
    }

    async fn start(&self) -> Result<(), ManagerError> {
        if !self.enabled() {
            return Err(ManagerError::Disabled);
        }
        let client = self.inner.client.clone().ok_or(ManagerError::Disabled)?;
        client.start().await.map_err(ManagerError::Connection)?;

        self.inner.lock_state().running = true;
        tokio::spawn(event_loop::run(self.inner.clone(), client));

        tracing::info!("Unit manager started");
        Ok(())
    }

    fn stop(&self) {
        match self.inner.main_unit_handle() {
            Some(main) => self.inner.stop_unit(&main),
            None => tracing::debug!("Stop requested without a main unit"),
        }
    }

    fn set_stop_callback(&self, callback: StopCallback) {
        self.inner.stop_callback.store(Some(Arc::new(callback)));
    }

    fn update_status(&self, state: UnitState, message: &str) {
        if let Some(main) = self.inner.main_unit_handle() {
            self.inner.push_status(&main, state, message);
        }
    }

    fn register_action(&self, action: Arc<dyn Action>) {
        if let Some(main) = self.inner.main_unit_handle() {
            main.register_action(action);
        }
    }

    fn unregister_action(&self, action: &Arc<dyn Action>) {
        if let Some(main) = self.inner.main_unit_handle() {
            main.unregister_action(action);
        }
    }

    fn set_payload(&self, payload: Payload) {
        self.inner.payload.store(Arc::new(payload));
    }

    fn check_raw_config(&self, _config: &ConfigMap) -> Result<(), ManagerError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{ChannelClient, ManagedUnit, UnitConfig, UnitType};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn manager(enabled: bool) -> UnitManager {
        let (client, _plane) = ChannelClient::new(AgentInfo::default());
        let config = ManagementConfig {
            enabled,
            ..Default::default()
        };
        UnitManager::new(config, ReloadRegistry::new(), Arc::new(client))
    }

    #[tokio::test]
    async fn test_disabled_manager_is_inert() {
        let manager = manager(false);
        assert!(!manager.enabled());
        assert!(matches!(manager.start().await, Err(ManagerError::Disabled)));

        manager.stop();
        manager.update_status(UnitState::Healthy, "ignored");
        assert!(!manager.is_running());
        assert!(manager.main_unit().is_none());
    }

    #[test]
    fn test_main_unit_set_once() {
        let manager = manager(true);
        assert!(manager.inner.set_main_unit(&UnitId::from("first")));
        assert!(!manager.inner.set_main_unit(&UnitId::from("second")));
        assert_eq!(manager.main_unit(), Some(UnitId::from("first")));
    }

    #[test]
    fn test_status_goes_to_main_unit_with_payload() {
        let manager = manager(true);
        let main = Arc::new(ManagedUnit::new("in-1", UnitType::Input, UnitState::Healthy, UnitConfig::default()));
        manager.inner.units.add(main.clone());

        // No main unit yet: silently dropped.
        manager.update_status(UnitState::Degraded, "queue full");
        assert!(main.reports().is_empty());

        manager.inner.set_main_unit(main.id());
        let mut payload = Payload::new();
        payload.insert("events".into(), serde_json::json!(12));
        manager.set_payload(payload.clone());
        manager.update_status(UnitState::Degraded, "queue full");

        let report = main.last_report().unwrap();
        assert_eq!(report.state, UnitState::Degraded);
        assert_eq!(report.message, "queue full");
        assert_eq!(report.payload, Some(payload));
    }

    struct Ping;

    #[async_trait]
    impl Action for Ping {
        fn name(&self) -> &str {
            "ping"
        }

        async fn execute(&self, params: ConfigMap) -> Result<ConfigMap, crate::client::ActionError> {
            Ok(params)
        }
    }

    #[test]
    fn test_actions_forwarded_to_main_unit() {
        let manager = manager(true);
        let action: Arc<dyn Action> = Arc::new(Ping);

        // No main unit: no-op rather than a crash.
        manager.register_action(action.clone());

        let main = Arc::new(ManagedUnit::new("in-1", UnitType::Input, UnitState::Healthy, UnitConfig::default()));
        manager.inner.units.add(main.clone());
        manager.inner.set_main_unit(main.id());

        manager.register_action(action.clone());
        assert_eq!(main.action_names(), vec!["ping".to_string()]);

        manager.unregister_action(&action);
        assert!(main.action_names().is_empty());
    }

    #[test]
    fn test_stop_without_start_is_noop() {
        let manager = manager(true);
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        manager.set_stop_callback(Box::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        let main = Arc::new(ManagedUnit::new("in-1", UnitType::Input, UnitState::Healthy, UnitConfig::default()));
        manager.inner.units.add(main.clone());
        manager.inner.set_main_unit(main.id());
        manager.stop();

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(main.reports().is_empty());
    }

    #[test]
    fn test_check_raw_config_accepts_any_map() {
        let manager = manager(true);
        let mut raw = ConfigMap::new();
        raw.insert("output".into(), serde_json::json!({ "console": {} }));
        assert!(manager.check_raw_config(&raw).is_ok());
        assert!(manager.check_raw_config(&ConfigMap::new()).is_ok());
    }
}
