use thiserror::Error;

/// Errors surfaced by container lifecycle operations.
///
/// Nothing here is retried automatically; the two bounded internal loops
/// (port probing, readiness polling) report through `NoAvailablePort` and
/// `ReadinessTimeout` once exhausted.
#[derive(Debug, Error)]
pub enum ContainerError {
    #[error("docker is not installed or not on PATH")]
    EngineNotFound,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("container {0} already exists, use 'dbdock remove {0}' to remove it first")]
    AlreadyExists(String),

    #[error("container {0} does not exist")]
    NotFound(String),

    #[error("container {0} is already running")]
    AlreadyRunning(String),

    #[error("container {0} is already stopped")]
    AlreadyStopped(String),

    #[error("no available port found in range {start}-{end}")]
    NoAvailablePort { start: u16, end: u16 },

    #[error("timed out waiting for {name} to become ready after {attempts} attempts")]
    ReadinessTimeout { name: String, attempts: u32 },

    #[error("docker {context} failed: {detail}")]
    EngineFailure { context: String, detail: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
