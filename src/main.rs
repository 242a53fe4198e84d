//! CLI entry point for dexport.
//!
//! Three subcommands mirror the pipeline stages:
//!
//! ```bash
//! dexport split --dataset-root /data/dexycb --out-root dexYCB_dataset
//! dexport export --config config.yaml --side both --order ho3d
//! dexport objs --side right
//! ```
//!
//! The `DEX_YCB_DIR` environment variable supplies the dataset root when
//! neither the flag nor the config file does; that lookup happens only
//! here, never inside the library.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use dexport::config::{ExportConfig, OrderSpec};
use dexport::export::Exporter;
use dexport::grouping;
use dexport::model::KinematicFactory;
use dexport::split::{Side, SideSelect, SplitIndexer};
use std::path::PathBuf;

/// Environment fallback for the raw dataset root.
const DATASET_ROOT_ENV: &str = "DEX_YCB_DIR";

#[derive(Parser)]
#[command(name = "dexport")]
#[command(about = "Export DexYCB sequences to per-frame records", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan the raw dataset and build the left/right hand-split manifest
    Split {
        /// Raw dataset root (falls back to $DEX_YCB_DIR)
        #[arg(long)]
        dataset_root: Option<PathBuf>,

        /// Output root; the manifest lands under <out-root>/config/
        #[arg(long, default_value = "dexYCB_dataset")]
        out_root: PathBuf,

        /// Store absolute sequence paths instead of root-relative ones
        #[arg(long)]
        absolute: bool,
    },

    /// Export per-frame records for one or both sides
    Export {
        /// Optional YAML config file; flags override its values
        #[arg(long)]
        config: Option<PathBuf>,

        #[arg(long)]
        dataset_root: Option<PathBuf>,

        #[arg(long)]
        out_root: Option<PathBuf>,

        #[arg(long, value_enum)]
        side: Option<SideSelect>,

        /// Joint order convention name (mano, ho3d)
        #[arg(long)]
        order: Option<String>,

        /// Path to hand_splits.yaml
        #[arg(long)]
        manifest: Option<PathBuf>,
    },

    /// Group one side's sequences by grasped object
    Objs {
        #[arg(long)]
        dataset_root: Option<PathBuf>,

        #[arg(long, default_value = "dexYCB_dataset")]
        out_root: PathBuf,

        #[arg(long, value_enum, default_value_t = Side::Right)]
        side: Side,

        /// Path to hand_splits.yaml (defaults to <out-root>/config/hand_splits.yaml)
        #[arg(long)]
        manifest: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Split {
            dataset_root,
            out_root,
            absolute,
        } => run_split(dataset_root, out_root, absolute),
        Commands::Export {
            config,
            dataset_root,
            out_root,
            side,
            order,
            manifest,
        } => run_export(config, dataset_root, out_root, side, order, manifest),
        Commands::Objs {
            dataset_root,
            out_root,
            side,
            manifest,
        } => run_objs(dataset_root, out_root, side, manifest),
    }
}

/// Resolve the dataset root: flag, then config file, then environment.
fn resolve_dataset_root(flag: Option<PathBuf>, from_config: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(root) = flag.or(from_config) {
        return Ok(root);
    }
    match std::env::var_os(DATASET_ROOT_ENV) {
        Some(v) => Ok(PathBuf::from(v)),
        None => bail!(
            "no dataset root: pass --dataset-root, set it in the config file, or set ${DATASET_ROOT_ENV}"
        ),
    }
}

fn run_split(dataset_root: Option<PathBuf>, out_root: PathBuf, absolute: bool) -> Result<()> {
    let root = resolve_dataset_root(dataset_root, None)?;
    let indexer = SplitIndexer::new(root);
    let (manifest_path, split) = indexer
        .build(!absolute, &out_root.join("config"))
        .context("hand-split scan failed")?;

    println!(
        "split: right={} left={} skipped={}",
        split.manifest.right.len(),
        split.manifest.left.len(),
        split.skipped.len()
    );
    println!("manifest: {}", manifest_path.display());
    Ok(())
}

fn run_export(
    config: Option<PathBuf>,
    dataset_root: Option<PathBuf>,
    out_root: Option<PathBuf>,
    side: Option<SideSelect>,
    order: Option<String>,
    manifest: Option<PathBuf>,
) -> Result<()> {
    let mut cfg = match config {
        Some(path) => ExportConfig::load(&path)
            .with_context(|| format!("reading config {}", path.display()))?,
        None => ExportConfig::default(),
    };

    // CLI flags take precedence over file values.
    if let Some(out_root) = out_root {
        cfg.out_root = out_root;
    }
    if let Some(side) = side {
        cfg.side = side;
    }
    if let Some(order) = order {
        cfg.order = OrderSpec::Name(order);
    }
    if let Some(manifest) = manifest {
        cfg.hand_splits = Some(manifest);
    }

    let root = resolve_dataset_root(dataset_root, cfg.dataset_root.clone())?;
    let convention = cfg.order.resolve()?;
    let manifest_path = cfg.manifest_path();

    let exporter = Exporter::new(root, cfg.out_root.clone(), convention, Box::new(KinematicFactory));
    let summary = exporter.process_all(&manifest_path, cfg.side)?;

    println!("{summary}");
    if !summary.is_clean() {
        std::process::exit(1);
    }
    Ok(())
}

fn run_objs(
    dataset_root: Option<PathBuf>,
    out_root: PathBuf,
    side: Side,
    manifest: Option<PathBuf>,
) -> Result<()> {
    let root = resolve_dataset_root(dataset_root, None)?;
    let manifest_path =
        manifest.unwrap_or_else(|| out_root.join("config").join(dexport::split::MANIFEST_FILE));

    let groups = grouping::group_by_object(&root, &manifest_path, side)?;
    grouping::write_object_csvs(&groups, &out_root)?;

    for (object, sequences) in &groups {
        println!("{object}: {} sequences", sequences.len());
    }
    Ok(())
}
