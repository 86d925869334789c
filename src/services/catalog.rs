use std::sync::Arc;

use crate::domain::{
    ConnectionDetails, ContainerEngine, ContainerError, ContainerState, ContainerSummary,
    DEFAULT_PORT, DEFAULT_VERSION,
};
use crate::infra::net;

const IMAGE_FAMILY: &str = "postgres";

/// Read-only queries: list containers by image ancestry and reconstruct
/// connection details from a live inspect.
pub struct Catalog {
    engine: Arc<dyn ContainerEngine>,
}

impl Catalog {
    pub fn new(engine: Arc<dyn ContainerEngine>) -> Self {
        Self { engine }
    }

    /// All containers derived from the postgres image. The version-qualified
    /// filter runs first; when it matches nothing the family-wide filter is
    /// tried, so containers on non-default versions still show up.
    pub fn list(&self) -> Result<Vec<ContainerSummary>, ContainerError> {
        let summaries = self
            .engine
            .list_containers(&format!("{IMAGE_FAMILY}:{DEFAULT_VERSION}"))?;
        if summaries.is_empty() {
            return self.engine.list_containers(IMAGE_FAMILY);
        }
        Ok(summaries)
    }

    /// Connection details for an existing container, rebuilt from its
    /// environment and published-port mapping. Falls back to the
    /// conventional user when POSTGRES_USER is absent, and to the user as
    /// database name when POSTGRES_DB is absent.
    pub fn show(&self, name: &str) -> Result<ConnectionDetails, ContainerError> {
        if self.engine.container_state(name)? == ContainerState::Absent {
            return Err(ContainerError::NotFound(name.to_string()));
        }

        let details = self.engine.inspect_container(name)?;
        let user = details
            .env
            .get("POSTGRES_USER")
            .cloned()
            .unwrap_or_else(|| "postgres".to_string());
        let database = details
            .env
            .get("POSTGRES_DB")
            .cloned()
            .unwrap_or_else(|| user.clone());
        let password = details
            .env
            .get("POSTGRES_PASSWORD")
            .cloned()
            .unwrap_or_default();

        Ok(ConnectionDetails {
            name: name.to_string(),
            host: net::display_host(),
            port: details.port.unwrap_or(DEFAULT_PORT),
            user,
            password,
            database,
            volume: None,
            ssl_mode: "disable".to_string(),
        })
    }
}
