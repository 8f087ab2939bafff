// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Meshcollide CLI

use anyhow::Result;
use clap::{Parser, Subcommand};
use meshcollide::cli::{CheckReport, Reporter};
use meshcollide::{load_scene_file, SceneConfig};
use std::path::Path;

#[derive(Parser)]
#[command(name = "meshcollide")]
#[command(about = "Collision checks for scenes of named rigid meshes", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a scene file for collisions
    Check {
        /// Scene description (TOML)
        scene: String,

        /// Also report every pair from the second object's side
        #[arg(short, long)]
        bidirectional: bool,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,

        /// Override the security margin of the scene file
        #[arg(long)]
        margin: Option<f64>,
    },

    /// List the triangles of each object that are in contact
    Highlight {
        /// Scene description (TOML)
        scene: String,
    },

    /// Show version information
    Version,
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let result = match &cli.command {
        Commands::Check {
            scene,
            bidirectional,
            json,
            margin,
        } => check_command(scene, *bidirectional, *json, *margin),
        Commands::Highlight { scene } => highlight_command(scene),
        Commands::Version => {
            println!("Meshcollide v{}", env!("CARGO_PKG_VERSION"));
            Ok(true)
        }
    };

    match result {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            Reporter::report_error(&format!("{:#}", e));
            std::process::exit(2);
        }
    }
}

/// Returns `Ok(false)` when the scene has collisions
fn check_command(path: &str, bidirectional: bool, json: bool, margin: Option<f64>) -> Result<bool> {
    ensure_exists(path)?;

    let file = load_scene_file(path)?;
    let mut config = file.resolve_config()?;
    if let Some(margin) = margin {
        config = SceneConfig {
            security_margin: margin,
            ..config
        };
    }

    let start = std::time::Instant::now();
    let mut scene = file.build_with(&config)?;
    let contacts = scene.query_contacts()?;
    let pairs = scene.resolve_pairs(&contacts, bidirectional)?;
    let duration = start.elapsed();

    let truncated = scene.query().is_possibly_truncated(&contacts);
    let report = CheckReport::new(scene.len(), &contacts, &pairs, truncated)
        .with_extents(scene.object_extents());

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        Reporter::report_check(path, &report, duration);
    }

    Ok(!report.in_collision())
}

fn highlight_command(path: &str) -> Result<bool> {
    ensure_exists(path)?;

    let file = load_scene_file(path)?;
    let mut scene = file.build_with(&file.resolve_config()?)?;
    let contacts = scene.query_contacts()?;
    let highlights = scene.contact_highlights(&contacts)?;
    Reporter::report_highlights(&highlights);

    Ok(highlights.contact_count() == 0)
}

fn ensure_exists(path: &str) -> Result<()> {
    if !Path::new(path).exists() {
        anyhow::bail!("Scene file not found: {}", path);
    }
    Ok(())
}
