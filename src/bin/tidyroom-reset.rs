// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Tidyroom Reset Utility
//!
//! Recreates the sample workspace without touching the agent.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;

use tidyroom::bootstrap::{default_workspace_dir, reset_workspace, SAMPLE_FILES};
use tidyroom::AppConfig;

#[derive(Parser, Debug)]
#[command(name = "tidyroom-reset")]
#[command(version)]
#[command(about = "Recreate the Tidyroom sample workspace")]
struct Args {
    /// Path to configuration file (JSON format)
    #[arg(short, long, default_value = "config.json")]
    config: PathBuf,

    /// Workspace directory (overrides config)
    #[arg(short, long)]
    dir: Option<PathBuf>,

    /// List the sample files instead of writing them
    #[arg(long)]
    list: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.list {
        for (name, content) in SAMPLE_FILES {
            println!("{:<24} {} lines", name, content.trim().lines().count());
        }
        return Ok(());
    }

    let dir = match args.dir {
        Some(dir) => dir,
        None => {
            let config = AppConfig::load(&args.config)
                .with_context(|| format!("loading {:?}", args.config))?;
            default_workspace_dir(&config)
        }
    };

    let root = reset_workspace(&dir)
        .with_context(|| format!("resetting sample workspace at {:?}", dir))?;
    println!("Sample workspace ready: {}", root.display());
    Ok(())
}
