use std::collections::BTreeMap;

use crate::domain::PostgresConfig;

/// Live state of a container, re-queried from the engine on every operation.
/// No in-process record of a container outlives a single command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerState {
    Running,
    Stopped,
    Absent,
}

/// One row of `list` output, parsed from the engine's tabular listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerSummary {
    pub name: String,
    /// Raw status text from the engine, e.g. "Up 2 hours".
    pub status: String,
    /// Published host port, when one is mapped.
    pub port: Option<String>,
    pub short_id: String,
}

impl ContainerSummary {
    pub fn is_running(&self) -> bool {
        self.status.starts_with("Up")
    }
}

/// Environment and port mapping recovered from an engine inspect query.
#[derive(Debug, Clone, Default)]
pub struct ContainerDetails {
    pub env: BTreeMap<String, String>,
    pub port: Option<u16>,
}

/// Structured result of a successful provision or show operation.
/// Rendering lives in the presentation layer, not here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionDetails {
    pub name: String,
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
    pub volume: Option<String>,
    pub ssl_mode: String,
}

impl ConnectionDetails {
    pub fn from_config(cfg: &PostgresConfig, host: impl Into<String>) -> Self {
        Self {
            name: cfg.name.clone(),
            host: host.into(),
            port: cfg.port,
            user: cfg.user.clone(),
            password: cfg.password.clone(),
            database: cfg.database.clone(),
            volume: cfg.volume.clone(),
            ssl_mode: cfg.ssl_mode.clone(),
        }
    }

    /// Ready-to-use `postgresql://` connection URI.
    pub fn uri(&self) -> String {
        format!(
            "postgresql://{}:{}@{}:{}/{}",
            self.user, self.password, self.host, self.port, self.database
        )
    }
}
