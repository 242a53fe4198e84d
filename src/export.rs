//! Frame export: drives the hand-split manifest through the sequence
//! loader and serializes one record per frame.
//!
//! Output layout, mirroring the raw dataset hierarchy:
//! `<out_root>/<side>/<subject>/<sequence>/meta/<NNNN>.pkl`, zero-padded to
//! at least four digits. Re-running overwrites byte-identically; stale
//! records beyond the current frame count (from a shrunken rerun) are
//! detected and logged rather than silently left in place.
//!
//! Failure policy: a sequence that cannot be loaded is logged, recorded in
//! the run summary, and skipped — the remaining sequences and the other
//! side still run. Write-side I/O errors abort immediately; continuing
//! would produce an incomplete dataset without a clear signal.

use crate::dataset::loader::{FrameRecord, SequenceLoader};
use crate::dataset::SequenceId;
use crate::error::{AppResult, ExportError};
use crate::joints::{JointConvention, JointReindexer};
use crate::model::HandModelFactory;
use crate::split::{read_manifest, Side, SideSelect};
use log::{info, warn};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Counts for one processed side.
#[derive(Debug, Default, Clone, Copy)]
pub struct SideStats {
    pub sequences: usize,
    pub frames: u64,
}

/// One sequence that failed to load.
#[derive(Debug, Clone)]
pub struct SequenceFailure {
    pub sequence: String,
    pub side: Side,
    pub cause: String,
}

/// End-of-run report: per-side counts plus every skipped sequence.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub per_side: Vec<(Side, SideStats)>,
    pub failures: Vec<SequenceFailure>,
}

impl RunSummary {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

impl std::fmt::Display for RunSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (side, stats) in &self.per_side {
            writeln!(
                f,
                "{side}: {} sequences, {} frames",
                stats.sequences, stats.frames
            )?;
        }
        if self.failures.is_empty() {
            write!(f, "all sequences exported")
        } else {
            writeln!(f, "{} sequence(s) failed:", self.failures.len())?;
            for failure in &self.failures {
                writeln!(f, "  {} ({}): {}", failure.sequence, failure.side, failure.cause)?;
            }
            Ok(())
        }
    }
}

/// Batch exporter over a persisted hand split.
pub struct Exporter {
    dataset_root: PathBuf,
    out_root: PathBuf,
    order: JointConvention,
    models: Box<dyn HandModelFactory>,
}

impl Exporter {
    pub fn new(
        dataset_root: impl Into<PathBuf>,
        out_root: impl Into<PathBuf>,
        order: JointConvention,
        models: Box<dyn HandModelFactory>,
    ) -> Self {
        Self {
            dataset_root: dataset_root.into(),
            out_root: out_root.into(),
            order,
            models,
        }
    }

    /// Export every sequence the manifest lists for the selected side(s).
    ///
    /// `Both` processes the right list, then the left list, as independent
    /// passes; a failure in one never prevents attempting the other.
    pub fn process_all(&self, manifest_path: &Path, select: SideSelect) -> AppResult<RunSummary> {
        // Surface a malformed target order before any work is attempted.
        JointReindexer::between(&JointConvention::mano(), &self.order)?;

        let manifest = read_manifest(manifest_path)?;
        let mut summary = RunSummary::default();

        for side in select.sides() {
            let mut stats = SideStats::default();

            for entry in manifest.side_list(side) {
                let Some(id) = SequenceId::from_path(Path::new(entry)) else {
                    warn!("[export] unintelligible manifest entry '{entry}', skipping");
                    summary.failures.push(SequenceFailure {
                        sequence: entry.clone(),
                        side,
                        cause: "unintelligible manifest entry".into(),
                    });
                    continue;
                };

                match self.process_sequence(&id, side) {
                    Ok(frames) => {
                        stats.sequences += 1;
                        stats.frames += frames;
                    }
                    Err(err) if err_is_sequence_local(&err) => {
                        warn!("[export] skipping {id}: {err}");
                        summary.failures.push(SequenceFailure {
                            sequence: id.to_string(),
                            side,
                            cause: err.to_string(),
                        });
                    }
                    Err(err) => return Err(err),
                }
            }

            info!(
                "[export] {side}: {} sequences, {} frames",
                stats.sequences, stats.frames
            );
            summary.per_side.push((side, stats));
        }

        Ok(summary)
    }

    /// Export one sequence; returns the number of frames written.
    fn process_sequence(&self, id: &SequenceId, side: Side) -> AppResult<u64> {
        let loader = SequenceLoader::open(&self.dataset_root, id, &self.order, self.models.as_ref())?;
        if loader.side() != side {
            warn!(
                "[export] {id}: manifest lists it under '{side}' but metadata declares '{}'",
                loader.side()
            );
        }

        let out_dir = self
            .out_root
            .join(side.as_str())
            .join(id.rel_path())
            .join("meta");
        std::fs::create_dir_all(&out_dir)?;

        let width = pad_width(loader.num_frames());
        for (frame, record) in loader.frames().enumerate() {
            let path = out_dir.join(format!("{frame:0width$}.pkl"));
            write_record(&path, &record)?;
        }

        warn_stale_records(&out_dir, loader.num_frames(), width);

        info!(
            "[done] {id}: {} frames -> {}",
            loader.num_frames(),
            out_dir.display()
        );
        Ok(loader.num_frames() as u64)
    }
}

/// Serialize one record to disk. The explicit flush surfaces buffered
/// write errors (disk full, quota) that dropping the writer would discard.
fn write_record(path: &Path, record: &FrameRecord) -> AppResult<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_pickle::to_writer(&mut writer, record, serde_pickle::SerOptions::new())?;
    writer.flush()?;
    Ok(())
}

/// Zero-pad width for frame file names: at least four digits, more when a
/// sequence is long enough to need them.
fn pad_width(num_frames: usize) -> usize {
    let digits = num_frames.max(1).to_string().len();
    digits.max(4)
}

/// Flag leftover records from an earlier run with a larger frame count.
fn warn_stale_records(out_dir: &Path, num_frames: usize, width: usize) {
    let Ok(entries) = std::fs::read_dir(out_dir) else {
        return;
    };
    for entry in entries.flatten() {
        let name = entry.file_name();
        let Some(stem) = Path::new(&name)
            .file_stem()
            .and_then(|s| s.to_str())
        else {
            continue;
        };
        if Path::new(&name).extension().and_then(|e| e.to_str()) != Some("pkl") {
            continue;
        }
        match stem.parse::<usize>() {
            Ok(idx) if idx >= num_frames || stem.len() != width => {
                warn!(
                    "[export] stale record {} in {} (current frame count {num_frames})",
                    name.to_string_lossy(),
                    out_dir.display()
                );
            }
            _ => {}
        }
    }
}

fn err_is_sequence_local(err: &ExportError) -> bool {
    matches!(
        err,
        ExportError::SequenceNotFound(_)
            | ExportError::CorruptArchive { .. }
            | ExportError::Metadata { .. }
            | ExportError::Archive { .. }
            | ExportError::UnknownObject(_)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> FrameRecord {
        FrameRecord {
            seq_name: "subject-01/20200709_141754".into(),
            side: "right".into(),
            frame: 0,
            order: "mano".into(),
            hand_pose: vec![0.0; 48],
            hand_trans: [0.0; 3],
            hand_beta: vec![0.0; 10],
            obj_rot: [0.0; 3],
            obj_trans: [0.0; 3],
            obj_name: "024_bowl".into(),
            hand_joints: vec![[0.0; 3]; 21],
        }
    }

    #[test]
    fn write_record_creates_a_readable_pickle() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("0000.pkl");
        write_record(&path, &sample_record()).unwrap();
        assert!(path.metadata().unwrap().len() > 0);
    }

    // A record small enough to sit in the writer's buffer only hits the
    // device at flush; the error must still reach the caller.
    #[test]
    #[cfg(target_os = "linux")]
    fn exhausted_device_surfaces_an_io_error() {
        let err = write_record(Path::new("/dev/full"), &sample_record()).unwrap_err();
        assert!(matches!(err, ExportError::Io(_)));
    }

    #[test]
    fn pad_width_is_at_least_four_digits() {
        assert_eq!(pad_width(0), 4);
        assert_eq!(pad_width(72), 4);
        assert_eq!(pad_width(9_999), 4);
        assert_eq!(pad_width(10_000), 5);
        assert_eq!(pad_width(123_456), 6);
    }

    #[test]
    fn sequence_local_errors_are_classified() {
        assert!(err_is_sequence_local(&ExportError::SequenceNotFound(
            "x".into()
        )));
        assert!(err_is_sequence_local(&ExportError::CorruptArchive {
            sequence: "s/q".into(),
            declared: 2,
            actual: 1,
        }));
        assert!(!err_is_sequence_local(&ExportError::Io(
            std::io::Error::new(std::io::ErrorKind::Other, "disk full")
        )));
        assert!(!err_is_sequence_local(&ExportError::Configuration(
            "bad order".into()
        )));
    }
}
