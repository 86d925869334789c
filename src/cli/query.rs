use std::sync::Arc;

use anyhow::Result;

use crate::infra::DockerEngine;
use crate::presentation::{summary, table};
use crate::services::Catalog;

pub fn list() -> Result<()> {
    let rows = catalog().list()?;
    println!("\n📦 PostgreSQL Containers");
    print!("{}", table::render(&rows));
    Ok(())
}

pub fn show(name: &str) -> Result<()> {
    let details = catalog().show(name)?;
    println!("{}", summary::render(&details));
    Ok(())
}

fn catalog() -> Catalog {
    Catalog::new(Arc::new(DockerEngine::new()))
}
