use anyhow::Result;
use clap::{Parser, Subcommand};
use dbdock::cli::{CreateOptions, DatabaseKind, create, manage, query};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "dbdock",
    version,
    about = "Provision and manage database containers with Docker"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new database container with default settings
    Create {
        /// Database engine type
        #[arg(value_enum)]
        kind: DatabaseKind,
        /// Container and database name
        name: String,
    },
    /// Create a new database container with custom configuration
    CreateCustom {
        /// Database engine type
        #[arg(value_enum)]
        kind: DatabaseKind,
        #[command(flatten)]
        options: CreateOptions,
    },
    /// Start a stopped database container
    Start { name: String },
    /// Stop a running database container
    Stop {
        name: String,
        /// Attempt the stop even when the container reports as stopped
        #[arg(long)]
        force: bool,
    },
    /// Remove a database container
    Remove {
        name: String,
        /// Remove without requiring the container to be stopped first
        #[arg(long)]
        force: bool,
    },
    /// List all database containers
    List,
    /// Show connection details for a database container
    Show { name: String },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .without_time()
        .init();

    match Cli::parse().command {
        Commands::Create { kind, name } => create::run(kind, &name),
        Commands::CreateCustom { kind, options } => create::run_custom(kind, options),
        Commands::Start { name } => manage::start(&name),
        Commands::Stop { name, force } => manage::stop(&name, force),
        Commands::Remove { name, force } => manage::remove(&name, force),
        Commands::List => query::list(),
        Commands::Show { name } => query::show(&name),
    }
}
