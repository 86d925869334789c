use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use crate::domain::{
    ContainerDetails, ContainerEngine, ContainerError, ContainerState, ContainerSummary,
    PostgresConfig,
};

/// Probe counter value meaning "never becomes ready".
pub const NEVER_READY: u32 = u32::MAX;

#[derive(Debug, Clone)]
pub struct MockContainer {
    pub name: String,
    pub state: ContainerState,
    pub image: String,
    pub config: Option<PostgresConfig>,
    pub env: BTreeMap<String, String>,
    pub port: Option<u16>,
}

/// In-memory [`ContainerEngine`] for tests. Records every call so tests can
/// assert on operation ordering and arguments without docker installed.
#[derive(Debug)]
pub struct MockEngine {
    containers: RwLock<HashMap<String, MockContainer>>,
    images: RwLock<Vec<String>>,
    calls: RwLock<Vec<String>>,
    fail_on: RwLock<Option<String>>,
    available: RwLock<bool>,
    failing_probes: RwLock<u32>,
    probes_seen: RwLock<u32>,
}

impl MockEngine {
    pub fn new() -> Self {
        Self {
            containers: RwLock::new(HashMap::new()),
            images: RwLock::new(Vec::new()),
            calls: RwLock::new(Vec::new()),
            fail_on: RwLock::new(None),
            available: RwLock::new(true),
            failing_probes: RwLock::new(0),
            probes_seen: RwLock::new(0),
        }
    }

    pub fn add_container(&self, name: &str, state: ContainerState) {
        self.add_container_from_image(name, state, "postgres:15");
    }

    pub fn add_container_from_image(&self, name: &str, state: ContainerState, image: &str) {
        self.containers.write().unwrap().insert(
            name.to_string(),
            MockContainer {
                name: name.to_string(),
                state,
                image: image.to_string(),
                config: None,
                env: BTreeMap::new(),
                port: None,
            },
        );
    }

    pub fn add_image(&self, image: &str) {
        self.images.write().unwrap().push(image.to_string());
    }

    pub fn set_available(&self, available: bool) {
        *self.available.write().unwrap() = available;
    }

    /// Makes the named operation return an error when next invoked.
    pub fn set_fail_on(&self, operation: &str) {
        *self.fail_on.write().unwrap() = Some(operation.to_string());
    }

    /// Number of probes that report not-ready before the first success.
    /// Use [`NEVER_READY`] for a container that never comes up.
    pub fn set_failing_probes(&self, count: u32) {
        *self.failing_probes.write().unwrap() = count;
    }

    pub fn set_env(&self, name: &str, key: &str, value: &str) {
        if let Some(container) = self.containers.write().unwrap().get_mut(name) {
            container.env.insert(key.to_string(), value.to_string());
        }
    }

    pub fn set_published_port(&self, name: &str, port: u16) {
        if let Some(container) = self.containers.write().unwrap().get_mut(name) {
            container.port = Some(port);
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.read().unwrap().clone()
    }

    pub fn get_state(&self, name: &str) -> Option<ContainerState> {
        self.containers.read().unwrap().get(name).map(|c| c.state)
    }

    pub fn container_exists(&self, name: &str) -> bool {
        self.containers.read().unwrap().contains_key(name)
    }

    /// Configuration captured by the last `run` for this container.
    pub fn run_config(&self, name: &str) -> Option<PostgresConfig> {
        self.containers
            .read()
            .unwrap()
            .get(name)
            .and_then(|c| c.config.clone())
    }

    pub fn probe_count(&self) -> u32 {
        *self.probes_seen.read().unwrap()
    }

    fn record(&self, call: &str) {
        self.calls.write().unwrap().push(call.to_string());
    }

    fn check_fail(&self, operation: &str) -> Result<(), ContainerError> {
        if let Some(ref fail_on) = *self.fail_on.read().unwrap() {
            if fail_on == operation {
                return Err(ContainerError::EngineFailure {
                    context: operation.to_string(),
                    detail: format!("mock failure on {operation}"),
                });
            }
        }
        Ok(())
    }
}

impl Default for MockEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ContainerEngine for MockEngine {
    fn is_available(&self) -> bool {
        self.record("available");
        *self.available.read().unwrap()
    }

    fn image_exists(&self, image: &str) -> Result<bool, ContainerError> {
        self.record(&format!("image_exists:{image}"));
        self.check_fail("image_exists")?;
        Ok(self.images.read().unwrap().iter().any(|i| i == image))
    }

    fn pull_image(&self, image: &str) -> Result<(), ContainerError> {
        self.record(&format!("pull:{image}"));
        self.check_fail("pull")?;
        self.add_image(image);
        Ok(())
    }

    fn run_container(&self, cfg: &PostgresConfig) -> Result<(), ContainerError> {
        self.record(&format!("run:{}", cfg.name));
        self.check_fail("run")?;

        self.containers.write().unwrap().insert(
            cfg.name.clone(),
            MockContainer {
                name: cfg.name.clone(),
                state: ContainerState::Running,
                image: cfg.image(),
                config: Some(cfg.clone()),
                env: cfg.env.clone(),
                port: Some(cfg.port),
            },
        );
        Ok(())
    }

    fn container_state(&self, name: &str) -> Result<ContainerState, ContainerError> {
        self.record(&format!("state:{name}"));
        self.check_fail("state")?;
        Ok(self
            .containers
            .read()
            .unwrap()
            .get(name)
            .map(|c| c.state)
            .unwrap_or(ContainerState::Absent))
    }

    fn start_container(&self, name: &str) -> Result<(), ContainerError> {
        self.record(&format!("start:{name}"));
        self.check_fail("start")?;
        if let Some(container) = self.containers.write().unwrap().get_mut(name) {
            container.state = ContainerState::Running;
        }
        Ok(())
    }

    fn stop_container(&self, name: &str) -> Result<(), ContainerError> {
        self.record(&format!("stop:{name}"));
        self.check_fail("stop")?;
        if let Some(container) = self.containers.write().unwrap().get_mut(name) {
            container.state = ContainerState::Stopped;
        }
        Ok(())
    }

    fn remove_container(&self, name: &str, force: bool) -> Result<(), ContainerError> {
        self.record(&format!("remove:{name}:force={force}"));
        self.check_fail("remove")?;
        self.containers.write().unwrap().remove(name);
        Ok(())
    }

    fn list_containers(&self, ancestor: &str) -> Result<Vec<ContainerSummary>, ContainerError> {
        self.record(&format!("list:{ancestor}"));
        self.check_fail("list")?;

        let family_prefix = format!("{ancestor}:");
        let mut summaries: Vec<ContainerSummary> = self
            .containers
            .read()
            .unwrap()
            .values()
            .filter(|c| c.image == ancestor || c.image.starts_with(&family_prefix))
            .map(|c| ContainerSummary {
                name: c.name.clone(),
                status: match c.state {
                    ContainerState::Running => "Up 5 minutes".to_string(),
                    _ => "Exited (0) 5 minutes ago".to_string(),
                },
                port: c.port.map(|p| p.to_string()),
                short_id: "0123456789ab".to_string(),
            })
            .collect();
        summaries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(summaries)
    }

    fn inspect_container(&self, name: &str) -> Result<ContainerDetails, ContainerError> {
        self.record(&format!("inspect:{name}"));
        self.check_fail("inspect")?;
        self.containers
            .read()
            .unwrap()
            .get(name)
            .map(|c| ContainerDetails {
                env: c.env.clone(),
                port: c.port,
            })
            .ok_or_else(|| ContainerError::NotFound(name.to_string()))
    }

    fn probe_ready(&self, name: &str) -> Result<bool, ContainerError> {
        self.record(&format!("probe:{name}"));
        self.check_fail("probe")?;
        let mut probes = self.probes_seen.write().unwrap();
        *probes += 1;
        let failing = *self.failing_probes.read().unwrap();
        Ok(failing != NEVER_READY && *probes > failing)
    }
}
