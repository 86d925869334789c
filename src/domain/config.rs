use std::collections::BTreeMap;

use rand::Rng;
use rand::seq::SliceRandom;

pub const DEFAULT_VERSION: &str = "15";
pub const DEFAULT_PORT: u16 = 5432;

const PASSWORD_LEN: usize = 20;

/// Everything needed to launch one PostgreSQL container.
///
/// Immutable once handed to the provisioner, except `port`: when it equals
/// [`DEFAULT_PORT`] and that port is occupied, the provisioner rewrites it
/// with the first free port it finds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostgresConfig {
    /// Image version tag (`postgres:<version>`).
    pub version: String,
    /// Host port to publish.
    pub port: u16,
    pub password: String,
    /// Container name, used as the engine's lookup key. Required.
    pub name: String,
    pub user: String,
    pub database: String,
    /// Host path mounted as the data directory for persistence.
    pub volume: Option<String>,
    /// Memory limit, passed through verbatim (e.g. "1g").
    pub memory: Option<String>,
    /// CPU limit, passed through verbatim (e.g. "0.5").
    pub cpu: Option<String>,
    /// Docker networks to join, in order.
    pub networks: Vec<String>,
    /// Initialization SQL scripts, mounted read-only in listed order.
    pub init_scripts: Vec<String>,
    /// Additional `host:container` volume mounts.
    pub extra_mounts: Vec<String>,
    /// SSL mode: disable, require, verify-ca, verify-full.
    pub ssl_mode: String,
    pub ssl_cert: Option<String>,
    pub ssl_key: Option<String>,
    pub ssl_root_cert: Option<String>,
    pub timezone: String,
    pub locale: String,
    /// Free-form extra environment variables. The map enforces key
    /// uniqueness and keeps iteration order deterministic.
    pub env: BTreeMap<String, String>,
}

impl PostgresConfig {
    /// Default configuration: version 15 on port 5432, a generated password,
    /// and the container name doubling as the database name.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            version: DEFAULT_VERSION.to_string(),
            port: DEFAULT_PORT,
            password: generate_password(),
            database: name.clone(),
            name,
            user: "postgres".to_string(),
            volume: None,
            memory: None,
            cpu: None,
            networks: Vec::new(),
            init_scripts: Vec::new(),
            extra_mounts: Vec::new(),
            ssl_mode: "disable".to_string(),
            ssl_cert: None,
            ssl_key: None,
            ssl_root_cert: None,
            timezone: "UTC".to_string(),
            locale: "en_US.utf8".to_string(),
            env: BTreeMap::new(),
        }
    }

    pub fn image(&self) -> String {
        format!("postgres:{}", self.version)
    }
}

/// Generates a 20-character password with at least one character from each
/// of the lowercase, uppercase, digit, and symbol classes.
pub fn generate_password() -> String {
    const LOWER: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
    const UPPER: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
    const DIGITS: &[u8] = b"0123456789";
    const SYMBOLS: &[u8] = b"!@#$%^&*()_+-=[]{}|;:,.<>?";

    let mut rng = rand::rng();
    let mut password = Vec::with_capacity(PASSWORD_LEN);

    for class in [LOWER, UPPER, DIGITS, SYMBOLS] {
        password.push(class[rng.random_range(0..class.len())]);
    }

    let all: Vec<u8> = [LOWER, UPPER, DIGITS, SYMBOLS].concat();
    while password.len() < PASSWORD_LEN {
        password.push(all[rng.random_range(0..all.len())]);
    }

    // Shuffle so the guaranteed classes don't sit at fixed positions.
    password.shuffle(&mut rng);

    String::from_utf8_lossy(&password).into_owned()
}
