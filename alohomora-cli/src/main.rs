///! Alohomora CLI
///!
///! Operator console for multi-cluster role-assignment scoping

mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use alohomora_engine::config::EngineConfig;
use alohomora_engine::InventoryManager;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to the engine configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output format (table, json, yaml)
    #[arg(short, long, default_value = "table")]
    output: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse the scoping inventory
    Inventory {
        #[command(subcommand)]
        command: InventoryCommands,
    },
    /// Run the role-assignment wizard
    Assign {
        /// Assign to this user (by username), skipping the identity step
        #[arg(short, long, conflicts_with = "group")]
        user: Option<String>,
        /// Assign to this group (by name), skipping the identity step
        #[arg(short, long)]
        group: Option<String>,
        /// Restrict cluster selection to this cluster set (by name)
        #[arg(long)]
        cluster_set: Option<String>,
    },
    /// Inspect the engine configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Generate shell completions
    Completions {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand)]
pub enum InventoryCommands {
    /// List cluster sets
    ClusterSets,
    /// List clusters
    Clusters {
        /// Filter by owning cluster set (by name)
        #[arg(long)]
        cluster_set: Option<String>,
    },
    /// List projects
    Projects {
        /// Filter by owning cluster (by name)
        #[arg(long)]
        cluster: Option<String>,
    },
    /// List users
    Users,
    /// List groups
    Groups,
    /// List roles
    Roles,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show the effective configuration
    Show,
    /// Print a sample configuration file
    Sample,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load engine config
    let config = match &cli.config {
        Some(path) => EngineConfig::load_from_file(path)?,
        None => EngineConfig::load(),
    };
    config.validate()?;

    // Initialize logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    // Materialize the inventory
    let manager = match &config.inventory.fixture {
        Some(path) => {
            let manager = InventoryManager::new();
            manager.load_fixture(path).await?;
            manager
        }
        None => InventoryManager::demo().await?,
    };

    // Execute command
    match cli.command {
        Commands::Inventory { command } => {
            commands::inventory::handle_inventory_command(command, &manager, &cli.output).await?
        }
        Commands::Assign {
            user,
            group,
            cluster_set,
        } => {
            commands::assign::handle_assign_command(
                user.as_deref(),
                group.as_deref(),
                cluster_set.as_deref(),
                &manager,
                &config,
            )
            .await?
        }
        Commands::Config { command } => {
            commands::config::handle_config_command(command, &config)?
        }
        Commands::Completions { shell } => {
            generate_completions(shell);
        }
    }

    Ok(())
}

/// Generate shell completions
fn generate_completions(shell: clap_complete::Shell) {
    use clap::CommandFactory;
    use clap_complete::generate;
    use std::io;

    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();

    generate(shell, &mut cmd, name, &mut io::stdout());
}
