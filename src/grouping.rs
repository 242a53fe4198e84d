//! Object grouping: partition one side's sequences by grasped object.
//!
//! Walks a persisted hand split, reads each sequence's metadata to resolve
//! the grasped YCB object, and writes one CSV per object under
//! `<out_root>/objs/<object>/<object>.csv` (header `subject,sequence`).
//! Per-sequence failures are warnings, consistent with the split scan.

use crate::dataset::meta::SequenceMeta;
use crate::dataset::SequenceId;
use crate::error::{AppResult, ExportError};
use crate::objects::ycb_name;
use crate::split::{read_side_paths, Side};
use log::{info, warn};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Object name -> sequences grasping it, in manifest order.
pub type ObjectGroups = BTreeMap<String, Vec<SequenceId>>;

/// Group one side's sequences by grasped object.
pub fn group_by_object(
    dataset_root: &Path,
    manifest_path: &Path,
    side: Side,
) -> AppResult<ObjectGroups> {
    let mut groups = ObjectGroups::new();

    for seq_path in read_side_paths(manifest_path, side, false)? {
        let Some(id) = SequenceId::from_path(&seq_path) else {
            warn!("[objs] unintelligible sequence path {}", seq_path.display());
            continue;
        };
        match grasped_object(dataset_root, &id) {
            Ok(name) => groups.entry(name).or_default().push(id),
            Err(err) => warn!("[objs] skipping {id}: {err}"),
        }
    }

    info!("[objs] {side}: {} distinct objects", groups.len());
    Ok(groups)
}

fn grasped_object(dataset_root: &Path, id: &SequenceId) -> AppResult<String> {
    let meta_path = dataset_root.join(id.rel_path()).join("meta.yml");
    if !meta_path.exists() {
        return Err(ExportError::SequenceNotFound(meta_path));
    }
    let meta = SequenceMeta::load(&meta_path)?;
    Ok(ycb_name(meta.grasped_ycb_id()?)?.to_string())
}

/// Write one `<object>/<object>.csv` per group under `<out_root>/objs/`.
pub fn write_object_csvs(groups: &ObjectGroups, out_root: &Path) -> AppResult<Vec<PathBuf>> {
    let mut written = Vec::new();

    for (object, sequences) in groups {
        let dir = out_root.join("objs").join(object);
        std::fs::create_dir_all(&dir)?;
        let csv_path = dir.join(format!("{object}.csv"));

        let mut writer = csv::Writer::from_path(&csv_path)?;
        writer.write_record(["subject", "sequence"])?;
        for id in sequences {
            writer.write_record([id.subject.as_str(), id.sequence.as_str()])?;
        }
        writer.flush()?;

        info!("[objs] wrote {} sequences to {}", sequences.len(), csv_path.display());
        written.push(csv_path);
    }

    Ok(written)
}

/// Read back one object's sequence list.
pub fn read_object_sequences(out_root: &Path, object: &str) -> AppResult<Vec<SequenceId>> {
    let csv_path = out_root.join("objs").join(object).join(format!("{object}.csv"));
    if !csv_path.exists() {
        return Err(ExportError::UnknownObject(format!(
            "no grouping CSV for '{object}' at {}",
            csv_path.display()
        )));
    }

    let mut reader = csv::Reader::from_path(&csv_path)?;
    let mut sequences = Vec::new();
    for row in reader.records() {
        let row = row?;
        match (row.get(0), row.get(1)) {
            (Some(subject), Some(sequence)) => {
                sequences.push(SequenceId::new(subject, sequence));
            }
            _ => {
                return Err(ExportError::Configuration(format!(
                    "malformed row in {}",
                    csv_path.display()
                )))
            }
        }
    }
    Ok(sequences)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_csvs_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let mut groups = ObjectGroups::new();
        groups.insert(
            "024_bowl".into(),
            vec![
                SequenceId::new("subject-01", "20200709_141754"),
                SequenceId::new("subject-02", "20200903_100000"),
            ],
        );

        let written = write_object_csvs(&groups, dir.path()).unwrap();
        assert_eq!(written.len(), 1);

        let back = read_object_sequences(dir.path(), "024_bowl").unwrap();
        assert_eq!(back, groups["024_bowl"]);
    }

    #[test]
    fn missing_grouping_csv_errors() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_object_sequences(dir.path(), "025_mug").is_err());
    }
}
