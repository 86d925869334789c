use std::sync::Arc;

use anyhow::Result;
use clap::{Args, ValueEnum};

use crate::domain::{DEFAULT_PORT, DEFAULT_VERSION, PostgresConfig, generate_password};
use crate::infra::DockerEngine;
use crate::presentation::summary;
use crate::services::Provisioner;

/// Supported database engine types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DatabaseKind {
    Postgres,
}

/// Flags for `create-custom`. Paths accept `~` and are expanded before the
/// configuration is built.
#[derive(Args, Debug)]
pub struct CreateOptions {
    /// Container and database name
    #[arg(long)]
    pub name: String,

    /// PostgreSQL version tag
    #[arg(long, default_value = DEFAULT_VERSION)]
    pub version: String,

    /// Host port to expose
    #[arg(long, default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Database password (generated when omitted)
    #[arg(long)]
    pub password: Option<String>,

    /// Database user
    #[arg(long, default_value = "postgres")]
    pub user: String,

    /// Database name (defaults to the container name)
    #[arg(long)]
    pub db: Option<String>,

    /// Data volume path for persistence
    #[arg(long)]
    pub volume: Option<String>,

    /// Memory limit (e.g. "1g")
    #[arg(long)]
    pub memory: Option<String>,

    /// CPU limit (e.g. "0.5")
    #[arg(long)]
    pub cpu: Option<String>,

    /// Container timezone
    #[arg(long, default_value = "UTC")]
    pub timezone: String,

    /// Database locale
    #[arg(long, default_value = "en_US.utf8")]
    pub locale: String,

    /// Docker network to join (repeatable or comma-separated)
    #[arg(long = "network", value_delimiter = ',')]
    pub networks: Vec<String>,

    /// SQL script to run on initialization, executed in the given order
    /// (repeatable or comma-separated)
    #[arg(long = "init-script", value_delimiter = ',')]
    pub init_scripts: Vec<String>,

    /// Extra environment variable (repeatable)
    #[arg(long = "env", value_name = "KEY=VALUE", value_parser = parse_env_var)]
    pub env: Vec<(String, String)>,

    /// SSL mode (disable, require, verify-ca, verify-full)
    #[arg(long, default_value = "disable")]
    pub ssl_mode: String,

    /// Path to SSL certificate
    #[arg(long)]
    pub ssl_cert: Option<String>,

    /// Path to SSL private key
    #[arg(long)]
    pub ssl_key: Option<String>,

    /// Path to SSL root certificate
    #[arg(long)]
    pub ssl_root_cert: Option<String>,
}

impl CreateOptions {
    pub fn into_config(self) -> PostgresConfig {
        let mut cfg = PostgresConfig::new(self.name.clone());
        cfg.version = self.version;
        cfg.port = self.port;
        cfg.password = self.password.unwrap_or_else(generate_password);
        cfg.user = self.user;
        if let Some(db) = self.db {
            cfg.database = db;
        }
        cfg.volume = self.volume.map(expand);
        cfg.memory = self.memory;
        cfg.cpu = self.cpu;
        cfg.timezone = self.timezone;
        cfg.locale = self.locale;
        cfg.networks = self.networks;
        cfg.init_scripts = self.init_scripts.into_iter().map(expand).collect();
        cfg.env = self.env.into_iter().collect();
        cfg.ssl_mode = self.ssl_mode;
        cfg.ssl_cert = self.ssl_cert.map(expand);
        cfg.ssl_key = self.ssl_key.map(expand);
        cfg.ssl_root_cert = self.ssl_root_cert.map(expand);
        cfg
    }
}

pub fn run(kind: DatabaseKind, name: &str) -> Result<()> {
    match kind {
        DatabaseKind::Postgres => provision(PostgresConfig::new(name)),
    }
}

pub fn run_custom(kind: DatabaseKind, options: CreateOptions) -> Result<()> {
    match kind {
        DatabaseKind::Postgres => provision(options.into_config()),
    }
}

fn provision(mut cfg: PostgresConfig) -> Result<()> {
    let engine = Arc::new(DockerEngine::new());
    let details = Provisioner::new(engine).provision(&mut cfg)?;
    println!("✔ PostgreSQL container created successfully!\n");
    println!("{}", summary::render(&details));
    Ok(())
}

fn parse_env_var(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .ok_or_else(|| format!("expected KEY=VALUE, got '{raw}'"))
}

fn expand(path: String) -> String {
    shellexpand::tilde(&path).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(name: &str) -> CreateOptions {
        CreateOptions {
            name: name.to_string(),
            version: "15".to_string(),
            port: 5432,
            password: None,
            user: "postgres".to_string(),
            db: None,
            volume: None,
            memory: None,
            cpu: None,
            timezone: "UTC".to_string(),
            locale: "en_US.utf8".to_string(),
            networks: Vec::new(),
            init_scripts: Vec::new(),
            env: Vec::new(),
            ssl_mode: "disable".to_string(),
            ssl_cert: None,
            ssl_key: None,
            ssl_root_cert: None,
        }
    }

    #[test]
    fn database_defaults_to_container_name() {
        let cfg = options("mydb").into_config();
        assert_eq!(cfg.database, "mydb");

        let mut opts = options("mydb");
        opts.db = Some("appdb".to_string());
        assert_eq!(opts.into_config().database, "appdb");
    }

    #[test]
    fn password_is_generated_when_omitted() {
        let cfg = options("mydb").into_config();
        assert_eq!(cfg.password.len(), 20);

        let mut opts = options("mydb");
        opts.password = Some("hunter2".to_string());
        assert_eq!(opts.into_config().password, "hunter2");
    }

    #[test]
    fn env_pairs_collect_into_the_map() {
        let mut opts = options("mydb");
        opts.env = vec![("A".to_string(), "1".to_string())];
        let cfg = opts.into_config();
        assert_eq!(cfg.env.get("A").unwrap(), "1");
    }

    #[test]
    fn parse_env_var_requires_an_equals_sign() {
        assert_eq!(
            parse_env_var("KEY=VALUE").unwrap(),
            ("KEY".to_string(), "VALUE".to_string())
        );
        assert_eq!(
            parse_env_var("A=b=c").unwrap(),
            ("A".to_string(), "b=c".to_string())
        );
        assert!(parse_env_var("NOEQUALS").is_err());
    }

    #[test]
    fn tilde_paths_are_expanded() {
        let mut opts = options("mydb");
        opts.volume = Some("~/pgdata".to_string());
        let cfg = opts.into_config();
        assert!(!cfg.volume.unwrap().starts_with('~'));
    }
}
