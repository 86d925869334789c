pub mod cli;
pub mod domain;
pub mod infra;
pub mod presentation;
pub mod services;

// Exported so the integration tests can drive the services without docker
// installed; a "test-utils" feature flag would also work.
pub mod test_support;

pub use domain::{
    ConnectionDetails, ContainerEngine, ContainerError, ContainerState, ContainerSummary,
    PostgresConfig,
};
pub use infra::DockerEngine;
pub use services::{Catalog, Lifecycle, Provisioner};
