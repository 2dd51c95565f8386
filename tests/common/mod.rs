//! Shared utilities for manager integration tests.

use async_trait::async_trait;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;
use tokio::time::Instant;

use unit_reconciler::client::{
    AgentInfo, ChannelClient, ControlPlane, ManagedUnit, StreamConfig, UnitConfig, UnitState,
    UnitType,
};
use unit_reconciler::config::ManagementConfig;
use unit_reconciler::manager::{Manager, UnitManager};
use unit_reconciler::reload::{
    self, ConfigWithMeta, ReloadError, ReloadRegistry, Reloadable, ReloadableList,
};

/// How a recording reloadable answers a reload.
#[derive(Clone)]
#[allow(dead_code)]
pub enum Behavior {
    Succeed,
    Fail(&'static str),
    Panic(&'static str),
    /// Block until the notify fires, then succeed.
    Block(Arc<Notify>),
}

/// Reloadable that records every call.
pub struct Recorder {
    behavior: Mutex<Behavior>,
    calls: AtomicUsize,
    configs: Mutex<Vec<Vec<ConfigWithMeta>>>,
}

#[allow(dead_code)]
impl Recorder {
    pub fn new(behavior: Behavior) -> Arc<Self> {
        Arc::new(Self {
            behavior: Mutex::new(behavior),
            calls: AtomicUsize::new(0),
            configs: Mutex::new(Vec::new()),
        })
    }

    pub fn set_behavior(&self, behavior: Behavior) {
        *self.behavior.lock().unwrap() = behavior;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn configs(&self) -> Vec<Vec<ConfigWithMeta>> {
        self.configs.lock().unwrap().clone()
    }

    async fn apply(&self, configs: Vec<ConfigWithMeta>) -> Result<(), ReloadError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.configs.lock().unwrap().push(configs);
        let behavior = self.behavior.lock().unwrap().clone();
        match behavior {
            Behavior::Succeed => Ok(()),
            Behavior::Fail(reason) => Err(ReloadError::Failed(reason.to_string())),
            Behavior::Panic(reason) => panic!("{}", reason),
            Behavior::Block(notify) => {
                notify.notified().await;
                Ok(())
            }
        }
    }
}

#[async_trait]
impl Reloadable for Recorder {
    async fn reload(&self, config: ConfigWithMeta) -> Result<(), ReloadError> {
        self.apply(vec![config]).await
    }
}

#[async_trait]
impl ReloadableList for Recorder {
    async fn reload(&self, configs: Vec<ConfigWithMeta>) -> Result<(), ReloadError> {
        self.apply(configs).await
    }
}

/// A started manager wired to recording subsystems.
#[allow(dead_code)]
pub struct Harness {
    pub manager: UnitManager,
    pub plane: ControlPlane,
    pub client: Arc<ChannelClient>,
    pub inputs: Arc<Recorder>,
    pub output: Arc<Recorder>,
    pub stops: Arc<AtomicUsize>,
}

pub fn agent() -> AgentInfo {
    AgentInfo {
        id: "agent-test".into(),
        version: "8.6.0".into(),
        snapshot: false,
    }
}

#[allow(dead_code)]
impl Harness {
    /// Manager with both "input" and "output" registered.
    pub async fn start() -> Self {
        Self::start_with(true, true).await
    }

    pub async fn start_with(register_input: bool, register_output: bool) -> Self {
        let inputs = Recorder::new(Behavior::Succeed);
        let output = Recorder::new(Behavior::Succeed);

        let registry = ReloadRegistry::new();
        if register_input {
            registry.register_list(reload::INPUT, inputs.clone()).unwrap();
        }
        if register_output {
            registry.register(reload::OUTPUT, output.clone()).unwrap();
        }

        let (client, plane) = ChannelClient::new(agent());
        let client = Arc::new(client);
        let config = ManagementConfig {
            enabled: true,
            ..Default::default()
        };
        let manager = UnitManager::new(config, registry, client.clone());

        let stops = Arc::new(AtomicUsize::new(0));
        let counter = stops.clone();
        manager.set_stop_callback(Box::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }));
        manager.start().await.unwrap();

        Self {
            manager,
            plane,
            client,
            inputs,
            output,
            stops,
        }
    }

    pub fn stop_calls(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }
}

#[allow(dead_code)]
pub fn input_unit(id: &str) -> Arc<ManagedUnit> {
    let config = UnitConfig {
        id: id.to_string(),
        kind: "log".into(),
        streams: vec![StreamConfig {
            id: format!("{id}-syslog"),
            data_stream: None,
            source: json!({ "paths": ["/var/log/syslog"] })
                .as_object()
                .cloned()
                .unwrap(),
        }],
        ..Default::default()
    };
    Arc::new(ManagedUnit::new(id, UnitType::Input, UnitState::Healthy, config))
}

#[allow(dead_code)]
pub fn output_unit(id: &str, kind: &str) -> Arc<ManagedUnit> {
    let config = UnitConfig {
        id: id.to_string(),
        kind: kind.to_string(),
        source: json!({ "hosts": ["localhost:9200"] })
            .as_object()
            .cloned()
            .unwrap(),
        ..Default::default()
    };
    Arc::new(ManagedUnit::new(id, UnitType::Output, UnitState::Healthy, config))
}

/// Poll `condition` until it holds, failing the test after five seconds.
pub async fn wait_until<F: Fn() -> bool>(condition: F) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while !condition() {
        assert!(Instant::now() < deadline, "condition not met within 5s");
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

/// Wait until `unit` has received a Healthy or Failed status.
#[allow(dead_code)]
pub async fn wait_terminal(unit: &ManagedUnit) {
    wait_until(|| unit.states().iter().any(|s| s.is_terminal())).await;
}
