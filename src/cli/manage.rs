use std::sync::Arc;

use anyhow::Result;

use crate::infra::DockerEngine;
use crate::services::Lifecycle;

pub fn start(name: &str) -> Result<()> {
    lifecycle().start(name)?;
    println!("✔ Container {name} started successfully");
    Ok(())
}

pub fn stop(name: &str, force: bool) -> Result<()> {
    lifecycle().stop(name, force)?;
    println!("✔ Container {name} stopped successfully");
    Ok(())
}

pub fn remove(name: &str, force: bool) -> Result<()> {
    lifecycle().remove(name, force)?;
    println!("✔ Container {name} removed successfully");
    Ok(())
}

fn lifecycle() -> Lifecycle {
    Lifecycle::new(Arc::new(DockerEngine::new()))
}
