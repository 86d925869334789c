use std::collections::BTreeMap;
use std::ffi::OsStr;
use std::io;
use std::process::{Command, Stdio};

use serde::Deserialize;
use tracing::debug;

use crate::domain::{
    ContainerDetails, ContainerEngine, ContainerError, ContainerState, ContainerSummary,
    PostgresConfig,
};

const DOCKER: &str = "docker";

/// Container port PostgreSQL listens on inside the image.
const CONTAINER_PORT: &str = "5432";

const LIST_FORMAT: &str = "{{.Names}}\t{{.Status}}\t{{.Ports}}\t{{.ID}}";

/// Production [`ContainerEngine`] backed by the `docker` binary.
#[derive(Debug, Default)]
pub struct DockerEngine;

impl DockerEngine {
    pub fn new() -> Self {
        Self
    }
}

impl ContainerEngine for DockerEngine {
    fn is_available(&self) -> bool {
        Command::new(DOCKER)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|status| status.success())
            .unwrap_or(false)
    }

    fn image_exists(&self, image: &str) -> Result<bool, ContainerError> {
        let out = docker_output(
            ["images", "-q", image],
            &format!("querying image {image}"),
        )?;
        Ok(!out.trim().is_empty())
    }

    fn pull_image(&self, image: &str) -> Result<(), ContainerError> {
        docker(["pull", image], &format!("pulling image {image}"))
    }

    fn run_container(&self, cfg: &PostgresConfig) -> Result<(), ContainerError> {
        let args = run_args(cfg);
        // The argument vector carries credentials, so it is not logged.
        debug!(container = %cfg.name, image = %cfg.image(), port = cfg.port, "running container");
        docker(&args, &format!("creating container {}", cfg.name))
    }

    fn container_state(&self, name: &str) -> Result<ContainerState, ContainerError> {
        let out = docker_output(
            [
                "ps",
                "-a",
                "--filter",
                &format!("name={name}"),
                "--format",
                "{{.Status}}",
            ],
            &format!("checking state of container {name}"),
        )?;
        Ok(state_from_status(out.lines().next().unwrap_or("").trim()))
    }

    fn start_container(&self, name: &str) -> Result<(), ContainerError> {
        docker(["start", name], &format!("starting container {name}"))
    }

    fn stop_container(&self, name: &str) -> Result<(), ContainerError> {
        docker(["stop", name], &format!("stopping container {name}"))
    }

    fn remove_container(&self, name: &str, force: bool) -> Result<(), ContainerError> {
        let mut args = vec!["rm"];
        if force {
            args.push("-f");
        }
        args.push(name);
        docker(args, &format!("removing container {name}"))
    }

    fn list_containers(&self, ancestor: &str) -> Result<Vec<ContainerSummary>, ContainerError> {
        let out = docker_output(
            [
                "ps",
                "-a",
                "--filter",
                &format!("ancestor={ancestor}"),
                "--format",
                LIST_FORMAT,
            ],
            &format!("listing containers for {ancestor}"),
        )?;
        Ok(parse_container_rows(&out))
    }

    fn inspect_container(&self, name: &str) -> Result<ContainerDetails, ContainerError> {
        let out = docker_output(["inspect", name], &format!("inspecting container {name}"))?;
        parse_inspect_output(&out, name)
    }

    fn probe_ready(&self, name: &str) -> Result<bool, ContainerError> {
        let status = Command::new(DOCKER)
            .args(["exec", name, "pg_isready"])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map_err(|err| map_spawn_error(err, &format!("probing container {name}")))?;
        Ok(status.success())
    }
}

/// Assembles the full `docker run` argument vector for a configuration.
///
/// Init scripts are mounted at indexed paths so the entrypoint's
/// alphabetical execution order matches the caller-supplied list order.
pub fn run_args(cfg: &PostgresConfig) -> Vec<String> {
    let mut args = vec![
        "run".to_string(),
        "--name".to_string(),
        cfg.name.clone(),
        "-e".to_string(),
        format!("POSTGRES_PASSWORD={}", cfg.password),
        "-e".to_string(),
        format!("POSTGRES_USER={}", cfg.user),
        "-e".to_string(),
        format!("POSTGRES_DB={}", cfg.database),
        "-e".to_string(),
        format!("TZ={}", cfg.timezone),
        "-e".to_string(),
        format!("LANG={}", cfg.locale),
        "-p".to_string(),
        format!("{}:{CONTAINER_PORT}", cfg.port),
        "-d".to_string(),
    ];

    for (key, value) in &cfg.env {
        args.push("-e".to_string());
        args.push(format!("{key}={value}"));
    }

    if let Some(volume) = &cfg.volume {
        args.push("-v".to_string());
        args.push(format!("{volume}:/var/lib/postgresql/data"));
    }
    if let Some(memory) = &cfg.memory {
        args.push("--memory".to_string());
        args.push(memory.clone());
    }
    if let Some(cpu) = &cfg.cpu {
        args.push("--cpus".to_string());
        args.push(cpu.clone());
    }

    for network in &cfg.networks {
        args.push("--network".to_string());
        args.push(network.clone());
    }

    for mount in &cfg.extra_mounts {
        args.push("-v".to_string());
        args.push(mount.clone());
    }

    if cfg.ssl_mode != "disable" {
        if let (Some(cert), Some(key)) = (&cfg.ssl_cert, &cfg.ssl_key) {
            args.push("-v".to_string());
            args.push(format!("{cert}:/var/lib/postgresql/server.crt"));
            args.push("-v".to_string());
            args.push(format!("{key}:/var/lib/postgresql/server.key"));
            if let Some(root_cert) = &cfg.ssl_root_cert {
                args.push("-v".to_string());
                args.push(format!("{root_cert}:/var/lib/postgresql/root.crt"));
            }
        }
    }

    for (index, script) in cfg.init_scripts.iter().enumerate() {
        args.push("-v".to_string());
        args.push(format!(
            "{script}:/docker-entrypoint-initdb.d/init_{index}.sql:ro"
        ));
    }

    args.push(cfg.image());
    args
}

fn state_from_status(status: &str) -> ContainerState {
    if status.is_empty() {
        ContainerState::Absent
    } else if status.starts_with("Up") {
        ContainerState::Running
    } else {
        ContainerState::Stopped
    }
}

fn parse_container_rows(output: &str) -> Vec<ContainerSummary> {
    output
        .lines()
        .filter_map(|line| {
            let fields: Vec<&str> = line.split('\t').collect();
            if fields.len() < 3 {
                return None;
            }
            Some(ContainerSummary {
                name: fields[0].to_string(),
                status: fields[1].to_string(),
                port: host_port(fields[2]),
                short_id: fields
                    .get(3)
                    .map(|id| id.chars().take(12).collect())
                    .unwrap_or_default(),
            })
        })
        .collect()
}

/// Extracts the host port from a docker port column such as
/// "0.0.0.0:5433->5432/tcp".
fn host_port(ports: &str) -> Option<String> {
    let (_, mapping) = ports.split_once(':')?;
    let port = mapping.split('-').next()?;
    if port.is_empty() {
        None
    } else {
        Some(port.to_string())
    }
}

#[derive(Deserialize)]
struct InspectRecord {
    #[serde(rename = "Config")]
    config: InspectConfig,
    #[serde(rename = "NetworkSettings", default)]
    network_settings: InspectNetworkSettings,
}

#[derive(Deserialize)]
struct InspectConfig {
    #[serde(rename = "Env", default)]
    env: Vec<String>,
}

#[derive(Deserialize, Default)]
struct InspectNetworkSettings {
    #[serde(rename = "Ports", default)]
    ports: BTreeMap<String, Option<Vec<PortBinding>>>,
}

#[derive(Deserialize)]
struct PortBinding {
    #[serde(rename = "HostPort")]
    host_port: String,
}

fn parse_inspect_output(output: &str, name: &str) -> Result<ContainerDetails, ContainerError> {
    let records: Vec<InspectRecord> =
        serde_json::from_str(output).map_err(|err| ContainerError::EngineFailure {
            context: format!("parsing inspect output for {name}"),
            detail: err.to_string(),
        })?;

    let record = records
        .into_iter()
        .next()
        .ok_or_else(|| ContainerError::NotFound(name.to_string()))?;

    let env = record
        .config
        .env
        .iter()
        .filter_map(|entry| entry.split_once('='))
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect();

    let port = record
        .network_settings
        .ports
        .get(&format!("{CONTAINER_PORT}/tcp"))
        .and_then(|bindings| bindings.as_ref())
        .and_then(|bindings| bindings.first())
        .and_then(|binding| binding.host_port.parse().ok());

    Ok(ContainerDetails { env, port })
}

fn docker<I, S>(args: I, context: &str) -> Result<(), ContainerError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    docker_output(args, context).map(|_| ())
}

fn docker_output<I, S>(args: I, context: &str) -> Result<String, ContainerError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let output = Command::new(DOCKER)
        .args(args)
        .output()
        .map_err(|err| map_spawn_error(err, context))?;

    if !output.status.success() {
        return Err(ContainerError::EngineFailure {
            context: context.to_string(),
            detail: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

fn map_spawn_error(err: io::Error, context: &str) -> ContainerError {
    if err.kind() == io::ErrorKind::NotFound {
        ContainerError::EngineNotFound
    } else {
        ContainerError::EngineFailure {
            context: context.to_string(),
            detail: err.to_string(),
        }
    }
}
