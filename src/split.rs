//! Hand-split indexing.
//!
//! Every DexYCB sequence is captured by exactly one hand. The split indexer
//! scans the raw dataset once, reads each sequence's declared `mano_sides`,
//! and partitions the sequence identifiers into left/right lists. The
//! partition is persisted under `<out_root>/config/` as a YAML manifest
//! (the structured form the exporter consumes) plus two flat one-path-per-
//! row CSV files for human diffing.
//!
//! Scanning is deterministic: subjects and sequences are visited in
//! lexicographic order, so re-running against an unchanged dataset yields
//! byte-identical output. A sequence whose metadata is unreadable or whose
//! side is unrecognized is logged and excluded from both lists; one bad
//! sequence never aborts the scan.

use crate::error::{AppResult, ExportError};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// File name of the structured manifest.
pub const MANIFEST_FILE: &str = "hand_splits.yaml";

/// The hand that performed a sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn as_str(self) -> &'static str {
        match self {
            Side::Left => "left",
            Side::Right => "right",
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Side {
    type Err = ExportError;

    fn from_str(s: &str) -> AppResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "left" => Ok(Side::Left),
            "right" => Ok(Side::Right),
            other => Err(ExportError::UnknownSide(other.to_string())),
        }
    }
}

/// Side selection for an export run: one side or both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SideSelect {
    Left,
    Right,
    Both,
}

impl SideSelect {
    /// The sides to process, in run order. `Both` means right first, then
    /// left, as two independent passes.
    pub fn sides(self) -> Vec<Side> {
        match self {
            SideSelect::Left => vec![Side::Left],
            SideSelect::Right => vec![Side::Right],
            SideSelect::Both => vec![Side::Right, Side::Left],
        }
    }
}

/// Persisted form of the hand split.
///
/// `left` and `right` hold `subject/sequence` path strings, relative to
/// `data_root` when `relative` is set, in lexicographic order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitManifest {
    pub data_root: PathBuf,
    pub relative: bool,
    pub left: Vec<String>,
    pub right: Vec<String>,
}

impl SplitManifest {
    pub fn side_list(&self, side: Side) -> &[String] {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }
}

/// Result of one dataset scan: the partition plus the skipped sequences.
#[derive(Debug, Clone)]
pub struct HandSplit {
    pub manifest: SplitManifest,
    pub skipped: Vec<String>,
}

/// Minimal metadata view used during scanning; everything else in meta.yml
/// is irrelevant to the split.
#[derive(Debug, Deserialize)]
struct SideProbe {
    #[serde(default)]
    mano_sides: Vec<String>,
}

/// Scans a dataset root and persists the left/right partition.
pub struct SplitIndexer {
    root: PathBuf,
}

impl SplitIndexer {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Enumerate every `<subject>/<sequence>/meta.yml` under the root and
    /// partition the sequences by declared hand side.
    pub fn scan(&self, relative: bool) -> AppResult<HandSplit> {
        let mut left = Vec::new();
        let mut right = Vec::new();
        let mut skipped = Vec::new();
        let mut scanned = 0usize;

        for subject_dir in sorted_dirs(&self.root)? {
            for seq_dir in sorted_dirs(&subject_dir)? {
                let meta_path = seq_dir.join("meta.yml");
                if !meta_path.exists() {
                    continue;
                }
                scanned += 1;

                let subject = dir_name(&subject_dir);
                let sequence = dir_name(&seq_dir);
                let key = format!("{subject}/{sequence}");
                let entry = if relative {
                    key.clone()
                } else {
                    seq_dir.to_string_lossy().into_owned()
                };

                match read_side(&meta_path) {
                    Ok(Side::Left) => left.push(entry),
                    Ok(Side::Right) => right.push(entry),
                    Err(err) => {
                        warn!("[split] skipping {key}: {err}");
                        skipped.push(key);
                    }
                }
            }
        }

        info!(
            "[split] scanned {scanned} sequences: right={} left={} skipped={}",
            right.len(),
            left.len(),
            skipped.len()
        );

        Ok(HandSplit {
            manifest: SplitManifest {
                data_root: self.root.clone(),
                relative,
                left,
                right,
            },
            skipped,
        })
    }

    /// Write the manifest YAML plus the two flat CSV lists into
    /// `config_dir`, returning the manifest path.
    pub fn write(&self, split: &SplitManifest, config_dir: &Path) -> AppResult<PathBuf> {
        std::fs::create_dir_all(config_dir)?;

        for (side, rows) in [(Side::Left, &split.left), (Side::Right, &split.right)] {
            let csv_path = config_dir.join(format!("{side}_side.csv"));
            let mut writer = csv::Writer::from_path(&csv_path)?;
            for row in rows {
                writer.write_record([row.as_str()])?;
            }
            writer.flush()?;
        }

        let manifest_path = config_dir.join(MANIFEST_FILE);
        let file = File::create(&manifest_path)?;
        serde_yaml::to_writer(file, split)?;

        info!("[split] wrote manifest: {}", manifest_path.display());
        Ok(manifest_path)
    }

    /// End-to-end: scan the dataset and persist the partition.
    pub fn build(&self, relative: bool, config_dir: &Path) -> AppResult<(PathBuf, HandSplit)> {
        let split = self.scan(relative)?;
        let path = self.write(&split.manifest, config_dir)?;
        Ok((path, split))
    }
}

fn dir_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Child directories of `path`, sorted by name for reproducible scans.
fn sorted_dirs(path: &Path) -> AppResult<Vec<PathBuf>> {
    let mut dirs = Vec::new();
    for entry in std::fs::read_dir(path)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            dirs.push(entry.path());
        }
    }
    dirs.sort();
    Ok(dirs)
}

/// Read the declared hand side from one meta.yml.
///
/// The dataset records the side as a one-element `mano_sides` list; an
/// empty list, more than one entry, or an unknown value all disqualify the
/// sequence from the split.
fn read_side(meta_path: &Path) -> AppResult<Side> {
    let file = File::open(meta_path)?;
    let probe: SideProbe = serde_yaml::from_reader(file)?;
    match probe.mano_sides.as_slice() {
        [side] => side.parse(),
        [] => Err(ExportError::UnknownSide("<missing>".into())),
        many => Err(ExportError::UnknownSide(many.join(","))),
    }
}

/// Load a persisted manifest. Fails with `ManifestNotFound` if the path
/// does not exist.
pub fn read_manifest(path: &Path) -> AppResult<SplitManifest> {
    if !path.exists() {
        return Err(ExportError::ManifestNotFound(path.to_path_buf()));
    }
    let file = File::open(path)?;
    Ok(serde_yaml::from_reader(file)?)
}

/// Read back one side's sequence paths from a persisted manifest,
/// optionally rebasing relative entries onto the manifest's `data_root`.
/// Blank and `#`-prefixed entries (hand-annotated manifests) are skipped.
pub fn read_side_paths(manifest_path: &Path, side: Side, absolute: bool) -> AppResult<Vec<PathBuf>> {
    let manifest = read_manifest(manifest_path)?;
    Ok(manifest
        .side_list(side)
        .iter()
        .filter(|entry| {
            let trimmed = entry.trim();
            !trimmed.is_empty() && !trimmed.starts_with('#')
        })
        .map(|entry| {
            let p = PathBuf::from(entry);
            if absolute && p.is_relative() {
                manifest.data_root.join(p)
            } else {
                p
            }
        })
        .collect())
}
