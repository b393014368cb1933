// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Tidyroom: LLM-driven workspace organizer
//!
//! Hands a sandboxed directory and a semantic taxonomy to a tool-calling model
//! and lets it move files into place.

use clap::{Parser, Subcommand};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::info;

use tidyroom::agent::FileAgent;
use tidyroom::bootstrap::{default_workspace_dir, demo_semantics, reset_workspace};
use tidyroom::config::{AppConfig, ConfigStore};
use tidyroom::mover::{move_and_render, MoveRequest};
use tidyroom::workspace::Workspace;
use tidyroom::{OrganizerError, Result};

/// Tidyroom CLI - LLM-driven workspace organizer
#[derive(Parser, Debug)]
#[command(name = "tidyroom")]
#[command(author = "Jonathan D. A. Jewell <hyperpolymath>")]
#[command(version)]
#[command(about = "Reorganize a sandboxed workspace by semantic category", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to configuration file (JSON format)
    #[arg(short, long, default_value = "config.json", global = true)]
    config: PathBuf,

    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable trace logging (most verbose)
    #[arg(long, global = true)]
    trace: bool,

    /// Suppress non-essential output (quiet mode)
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Let the agent organize a directory
    Organize {
        /// Directory to organize
        root: PathBuf,

        /// Confinement root for all tools (default: the directory itself)
        #[arg(short, long)]
        workspace: Option<PathBuf>,

        /// JSON file mapping folder names to descriptions
        #[arg(short, long)]
        semantics: Option<PathBuf>,

        /// Inline category, NAME=DESCRIPTION (repeatable)
        #[arg(short = 'C', long = "category", value_parser = parse_category)]
        categories: Vec<(String, String)>,
    },

    /// Reset the sample workspace and organize it into work/private
    Demo {
        /// Sample workspace directory (default: <data_dir>/agent_workspace)
        #[arg(short, long)]
        dir: Option<PathBuf>,
    },

    /// Recreate the sample workspace
    Reset {
        /// Sample workspace directory (default: <data_dir>/agent_workspace)
        #[arg(short, long)]
        dir: Option<PathBuf>,
    },

    /// Run a single confined move, printing the same text the agent would see
    Move {
        source: String,
        destination: String,

        /// Replace an existing destination
        #[arg(long)]
        overwrite: bool,

        /// Fail instead of creating missing parent directories
        #[arg(long)]
        no_create_dirs: bool,

        /// Workspace root (default: current directory)
        #[arg(short, long, default_value = ".")]
        workspace: PathBuf,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Generate default configuration file
    Generate {
        /// Output file path
        #[arg(short, long, default_value = "config.json")]
        output: PathBuf,
    },

    /// Validate configuration file
    Validate,
}

fn parse_category(raw: &str) -> std::result::Result<(String, String), String> {
    match raw.split_once('=') {
        Some((name, description)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), description.trim().to_string()))
        }
        _ => Err(format!("expected NAME=DESCRIPTION, got '{}'", raw)),
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.trace {
        "trace"
    } else if cli.verbose {
        "debug"
    } else if cli.quiet {
        "warn"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let mut store = ConfigStore::new(&cli.config);

    match cli.command {
        Commands::Organize { root, workspace, semantics, categories } => {
            let config = store.get()?.clone();
            let semantics = load_semantics(semantics.as_deref(), categories)?;
            run_organize(&config, &root, workspace.as_deref(), &semantics).await
        }
        Commands::Demo { dir } => {
            let config = store.get()?.clone();
            let dir = dir.unwrap_or_else(|| default_workspace_dir(&config));
            let root = reset_workspace(&dir)?;
            run_organize(&config, &root, None, &demo_semantics()).await
        }
        Commands::Reset { dir } => {
            let dir = match dir {
                Some(dir) => dir,
                None => default_workspace_dir(store.get()?),
            };
            let root = reset_workspace(&dir)?;
            println!("{}", root.display());
            Ok(())
        }
        Commands::Move { source, destination, overwrite, no_create_dirs, workspace } => {
            let workspace = Workspace::new(&workspace)?;
            let request = MoveRequest::new(source, destination)
                .overwrite(overwrite)
                .create_missing_dirs(!no_create_dirs);
            println!("{}", move_and_render(&workspace, &request));
            Ok(())
        }
        Commands::Config { action } => run_config_command(&mut store, action),
    }
}

/// Merge a semantics file and inline categories (inline wins)
fn load_semantics(
    file: Option<&Path>,
    categories: Vec<(String, String)>,
) -> Result<BTreeMap<String, String>> {
    let mut semantics = match file {
        Some(path) => {
            let content = std::fs::read_to_string(path)?;
            serde_json::from_str::<BTreeMap<String, String>>(&content).map_err(|e| {
                OrganizerError::InvalidSemantics(format!("{}: {}", path.display(), e))
            })?
        }
        None => BTreeMap::new(),
    };
    semantics.extend(categories);

    if semantics.is_empty() && file.is_none() {
        info!("No semantics given, using the demo taxonomy");
        return Ok(demo_semantics());
    }
    Ok(semantics)
}

async fn run_organize(
    config: &AppConfig,
    root: &Path,
    workspace: Option<&Path>,
    semantics: &BTreeMap<String, String>,
) -> Result<()> {
    let root = std::path::absolute(root)?;
    let workspace = workspace.unwrap_or(&root);

    let agent = FileAgent::from_config(config, workspace)?;
    let summary = agent.organize(&root, semantics).await?;
    println!("{}", summary);
    Ok(())
}

fn run_config_command(store: &mut ConfigStore, action: ConfigCommands) -> Result<()> {
    match action {
        ConfigCommands::Show => {
            let mut shown = store.get()?.clone();
            if shown.api.key.is_some() {
                shown.api.key = Some("***".to_string());
            }
            println!("{}", serde_json::to_string_pretty(&shown)?);
        }
        ConfigCommands::Generate { output } => {
            AppConfig::default().save(&output)?;
            println!("Generated config at {:?}", output);
        }
        ConfigCommands::Validate => {
            let path = store.path().to_path_buf();
            let config = store.reload()?;
            println!("Configuration at {:?} is valid", path);
            println!("  Provider: {} ({})", config.api.provider, config.api.endpoint()?);
            println!("  Model: {}", config.api.model);
            match config.api.resolve_key() {
                Ok(_) => println!("  API key: present"),
                Err(e) => println!("  API key: {}", e),
            }
        }
    }

    Ok(())
}
