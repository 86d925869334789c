use std::sync::Arc;

use tracing::info;

use crate::domain::{ContainerEngine, ContainerError, ContainerState};

/// start/stop/remove over the engine, each guarded by a live state query.
/// Single blocking invocations, no retries.
pub struct Lifecycle {
    engine: Arc<dyn ContainerEngine>,
}

impl Lifecycle {
    pub fn new(engine: Arc<dyn ContainerEngine>) -> Self {
        Self { engine }
    }

    pub fn start(&self, name: &str) -> Result<(), ContainerError> {
        match self.engine.container_state(name)? {
            ContainerState::Absent => Err(ContainerError::NotFound(name.to_string())),
            ContainerState::Running => Err(ContainerError::AlreadyRunning(name.to_string())),
            ContainerState::Stopped => {
                info!(container = %name, "starting container");
                self.engine.start_container(name)
            }
        }
    }

    /// Stops a running container. `force` attempts the stop even when the
    /// engine reports the container as not running.
    pub fn stop(&self, name: &str, force: bool) -> Result<(), ContainerError> {
        match self.engine.container_state(name)? {
            ContainerState::Absent => Err(ContainerError::NotFound(name.to_string())),
            ContainerState::Stopped if !force => {
                Err(ContainerError::AlreadyStopped(name.to_string()))
            }
            _ => {
                info!(container = %name, "stopping container");
                self.engine.stop_container(name)
            }
        }
    }

    /// Removes a container. `force` is passed through to the engine, which
    /// otherwise refuses to remove a running container.
    pub fn remove(&self, name: &str, force: bool) -> Result<(), ContainerError> {
        if self.engine.container_state(name)? == ContainerState::Absent {
            return Err(ContainerError::NotFound(name.to_string()));
        }
        info!(container = %name, force, "removing container");
        self.engine.remove_container(name, force)
    }
}
