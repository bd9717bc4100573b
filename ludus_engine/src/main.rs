#![warn(clippy::pedantic)]
#![allow(clippy::must_use_candidate)]
//! ** Ludus **
//! Cross-reference queries over gladiator mod datasets.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use log::info;
use serde::Serialize;

use ludus_data::Diagnostic;
use ludus_engine::config::default_config_path;
use ludus_engine::data_paths::resolve_datasets_root;
use ludus_engine::render;
use ludus_engine::{DatasetId, FsStore, LUDUS_VERSION, QueryEngine, StatSetMode, load_config};

#[derive(Parser)]
#[command(author, version, about = "Cross-reference classes, skills, items, recruits and prizes of a gladiator mod dataset.")]
struct Cli {
    /// Configuration file (defaults to ./ludus.toml, then the user config dir).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Directory holding one sub-directory per dataset.
    #[arg(long, value_name = "DIR")]
    root: Option<PathBuf>,
    /// Print results as JSON.
    #[arg(long)]
    json: bool,
    /// List every diagnostic instead of just counting them.
    #[arg(long)]
    diagnostics: bool,
    /// Dataset (mod) name.
    dataset: String,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show one class with all of its variants.
    Class { name: String },
    /// List every class of the dataset.
    Classes,
    /// Show every skill with this display name.
    Skill {
        name: String,
        /// Only skills usable by this class.
        #[arg(long)]
        class: Option<String>,
    },
    /// Follow the combo chain of a skill.
    Combo { name: String },
    /// List the items granting a skill.
    Items { skill: String },
    /// Show where a class can be recruited and its representative stat set.
    Recruits {
        class: String,
        /// Stat set selection (defaults to the configured mode).
        #[arg(long, value_enum)]
        mode: Option<Mode>,
    },
    /// Show the prizes of a league or encounter.
    Prizes { name: String },
}

#[derive(Clone, Copy, ValueEnum)]
enum Mode {
    MostCommon,
    BestAverage,
}

impl From<Mode> for StatSetMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::MostCommon => StatSetMode::MostCommon,
            Mode::BestAverage => StatSetMode::BestAverage,
        }
    }
}

fn emit<T: Serialize>(result: &T, json: bool, text: impl FnOnce(&T) -> String, diagnostics: &[Diagnostic], verbose: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(result).context("while serializing result")?);
        return Ok(());
    }
    println!("{}", text(result));
    if let Some(notes) = render::render_diagnostics(diagnostics, verbose) {
        println!("\n{notes}");
    }
    Ok(())
}

fn main() {
    env_logger::init();
    info!("ludus {LUDUS_VERSION} starting");
    if let Err(err) = run(Cli::parse()) {
        eprintln!("{}", render::render_error(&format!("{err:#}")));
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.clone().unwrap_or_else(default_config_path);
    let config = load_config(&config_path);
    let root = resolve_datasets_root(cli.root.as_deref(), config.datasets_root.as_deref());
    info!("datasets root: '{}'", root.display());

    let dataset = DatasetId::new(&cli.dataset).with_context(|| format!("while checking dataset name '{}'", cli.dataset))?;
    let engine = QueryEngine::new(FsStore::new(root), config.layout.clone());
    let (json, verbose) = (cli.json, cli.diagnostics);

    match cli.command {
        Commands::Class { name } => {
            let report = engine.resolve_class(&dataset, &name).context("while resolving class")?;
            emit(&report, json, render::render_class, &report.diagnostics, verbose)
        },
        Commands::Classes => {
            let catalog = engine.list_classes(&dataset).context("while listing classes")?;
            emit(&catalog, json, render::render_class_catalog, &catalog.diagnostics, verbose)
        },
        Commands::Skill { name, class } => {
            let resolution = engine
                .resolve_skill(&dataset, &name, class.as_deref())
                .context("while resolving skill")?;
            emit(&resolution, json, render::render_skills, &resolution.diagnostics, verbose)
        },
        Commands::Combo { name } => {
            let report = engine.resolve_combo_chain(&dataset, &name).context("while resolving combo chain")?;
            emit(&report, json, render::render_combo, &report.diagnostics, verbose)
        },
        Commands::Items { skill } => {
            let report = engine
                .find_items_granting_skill(&dataset, &skill)
                .context("while finding items")?;
            emit(&report, json, render::render_items, &report.diagnostics, verbose)
        },
        Commands::Recruits { class, mode } => {
            let mode = mode.map_or(config.default_stat_mode, StatSetMode::from);
            let report = engine
                .find_recruit_locations(&dataset, &class, mode)
                .context("while finding recruit locations")?;
            emit(&report, json, render::render_recruits, &report.diagnostics, verbose)
        },
        Commands::Prizes { name } => {
            let report = engine.find_prizes(&dataset, &name).context("while finding prizes")?;
            emit(&report, json, render::render_prizes, &report.diagnostics, verbose)
        },
    }
}
