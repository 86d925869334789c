use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tracing::{debug, info};

use crate::domain::{
    ConnectionDetails, ContainerEngine, ContainerError, ContainerState, DEFAULT_PORT,
    PostgresConfig,
};
use crate::infra::{net, ports};

const READINESS_ATTEMPTS: u32 = 10;
const READINESS_DELAY: Duration = Duration::from_millis(500);

/// Drives the create flow: existence check, port selection, image pull,
/// container launch, readiness polling.
///
/// Sequential and blocking throughout; a failure at any step aborts the
/// remainder with no cleanup of earlier steps. A container that launches but
/// never reports ready stays running for the operator to inspect.
pub struct Provisioner {
    engine: Arc<dyn ContainerEngine>,
    readiness_attempts: u32,
    readiness_delay: Duration,
}

impl Provisioner {
    pub fn new(engine: Arc<dyn ContainerEngine>) -> Self {
        Self {
            engine,
            readiness_attempts: READINESS_ATTEMPTS,
            readiness_delay: READINESS_DELAY,
        }
    }

    /// Overrides the readiness polling attempts and delay. Tests use this
    /// to keep the timeout path fast.
    pub fn with_readiness(mut self, attempts: u32, delay: Duration) -> Self {
        self.readiness_attempts = attempts;
        self.readiness_delay = delay;
        self
    }

    /// Provisions a new container. `cfg.port` is rewritten with the effective
    /// port when the default port turned out to be occupied.
    pub fn provision(
        &self,
        cfg: &mut PostgresConfig,
    ) -> Result<ConnectionDetails, ContainerError> {
        if cfg.name.trim().is_empty() {
            return Err(ContainerError::InvalidConfig(
                "container name is required".to_string(),
            ));
        }

        if !self.engine.is_available() {
            return Err(ContainerError::EngineNotFound);
        }

        info!(container = %cfg.name, "starting PostgreSQL setup");

        if self.engine.container_state(&cfg.name)? != ContainerState::Absent {
            return Err(ContainerError::AlreadyExists(cfg.name.clone()));
        }

        if cfg.port == DEFAULT_PORT {
            let port = ports::find_available_port(DEFAULT_PORT)?;
            if port != DEFAULT_PORT {
                info!("port {DEFAULT_PORT} was taken, using port {port} instead");
            }
            cfg.port = port;
        }

        let image = cfg.image();
        if self.engine.image_exists(&image)? {
            debug!(%image, "image already cached, skipping pull");
        } else {
            info!(%image, "pulling image");
            self.engine.pull_image(&image)?;
        }

        self.engine.run_container(cfg)?;
        self.wait_ready(&cfg.name)?;

        info!(container = %cfg.name, "container created and ready");
        Ok(ConnectionDetails::from_config(cfg, net::display_host()))
    }

    fn wait_ready(&self, name: &str) -> Result<(), ContainerError> {
        for attempt in 0..self.readiness_attempts {
            if self.engine.probe_ready(name)? {
                debug!(container = %name, attempt, "readiness probe succeeded");
                return Ok(());
            }
            thread::sleep(self.readiness_delay);
        }
        Err(ContainerError::ReadinessTimeout {
            name: name.to_string(),
            attempts: self.readiness_attempts,
        })
    }
}
