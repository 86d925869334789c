use std::fmt::Debug;

use crate::domain::error::ContainerError;
use crate::domain::{ContainerDetails, ContainerState, ContainerSummary, PostgresConfig};

/// Narrow seam over the external container engine.
///
/// The production implementation shells out to the `docker` binary; tests use
/// an in-memory fake so the orchestration logic runs without an engine
/// installed. Every query hits the engine live, there is no caching.
pub trait ContainerEngine: Send + Sync + Debug {
    /// Whether the engine binary is invocable on this host.
    fn is_available(&self) -> bool;

    /// Whether the image tag is already present in the local cache.
    fn image_exists(&self, image: &str) -> Result<bool, ContainerError>;

    fn pull_image(&self, image: &str) -> Result<(), ContainerError>;

    /// Create and start a detached container from the configuration.
    fn run_container(&self, cfg: &PostgresConfig) -> Result<(), ContainerError>;

    /// Existence and running state, derived from the engine's status string.
    fn container_state(&self, name: &str) -> Result<ContainerState, ContainerError>;

    fn start_container(&self, name: &str) -> Result<(), ContainerError>;

    fn stop_container(&self, name: &str) -> Result<(), ContainerError>;

    /// Remove a container; `force` bypasses the engine's stopped-only rule.
    fn remove_container(&self, name: &str, force: bool) -> Result<(), ContainerError>;

    /// All containers whose originating image matches `ancestor`.
    fn list_containers(&self, ancestor: &str) -> Result<Vec<ContainerSummary>, ContainerError>;

    /// Environment variables and published-port mapping of a container.
    fn inspect_container(&self, name: &str) -> Result<ContainerDetails, ContainerError>;

    /// Run the in-container readiness probe once. `Ok(true)` means the
    /// database accepted the probe; a nonzero probe exit is `Ok(false)`.
    fn probe_ready(&self, name: &str) -> Result<bool, ContainerError>;
}
