//! Shared synthetic-dataset fixture for integration tests.
//!
//! Mimics the raw DexYCB layout: `<root>/<subject>/<sequence>/` holding
//! `meta.yml` + `pose.npz`, plus `<root>/calibration/mano_<id>/mano.yml`.

// Each test binary uses a different subset of these helpers.
#![allow(dead_code)]

use dexport::split::SplitIndexer;
use dexport::FrameRecord;
use ndarray::Array3;
use ndarray_npy::NpzWriter;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const RIGHT_SEQ: &str = "subject-01/20200709_141754";
pub const LEFT_SEQ: &str = "subject-02/20200903_100000";

pub fn write_calibration(root: &Path, calib_id: &str) {
    let dir = root.join("calibration").join(format!("mano_{calib_id}"));
    fs::create_dir_all(&dir).unwrap();
    let betas: Vec<String> = (0..10).map(|i| format!("{:.2}", i as f64 * 0.1)).collect();
    fs::write(
        dir.join("mano.yml"),
        format!("betas: [{}]\n", betas.join(", ")),
    )
    .unwrap();
}

pub fn write_meta(seq_dir: &Path, side: &str, num_frames: usize, ycb_id: u32, calib_id: &str) {
    fs::create_dir_all(seq_dir).unwrap();
    fs::write(
        seq_dir.join("meta.yml"),
        format!(
            "num_frames: {num_frames}\n\
             mano_sides: [{side}]\n\
             ycb_ids: [{ycb_id}]\n\
             ycb_grasp_ind: 0\n\
             mano_calib: [\"{calib_id}\"]\n\
             serials: [\"836212060125\"]\n"
        ),
    )
    .unwrap();
}

pub fn write_pose(seq_dir: &Path, frames: usize) {
    let mut pose_m = Array3::<f32>::zeros((frames, 1, 51));
    let mut pose_y = Array3::<f32>::zeros((frames, 1, 7));
    for t in 0..frames {
        // Distinct pose/translation per frame so records differ.
        pose_m[[t, 0, 0]] = 0.1 * t as f32;
        pose_m[[t, 0, 48]] = 0.5 + t as f32;
        pose_m[[t, 0, 49]] = -0.25;
        // Identity object rotation, translation marking the frame.
        pose_y[[t, 0, 0]] = 1.0;
        pose_y[[t, 0, 4]] = t as f32;
        pose_y[[t, 0, 6]] = 0.75;
    }
    let mut npz = NpzWriter::new(File::create(seq_dir.join("pose.npz")).unwrap());
    npz.add_array("pose_m", &pose_m).unwrap();
    npz.add_array("pose_y", &pose_y).unwrap();
    npz.finish().unwrap();
}

/// Two healthy sequences: one right (3 frames, bowl), one left (2, mug).
pub fn build_dataset() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();

    write_calibration(root, "subject-01");
    write_calibration(root, "subject-02");

    let right_dir = root.join(RIGHT_SEQ);
    write_meta(&right_dir, "right", 3, 13, "subject-01");
    write_pose(&right_dir, 3);

    let left_dir = root.join(LEFT_SEQ);
    write_meta(&left_dir, "left", 2, 14, "subject-02");
    write_pose(&left_dir, 2);

    tmp
}

pub fn build_manifest(root: &Path, out_root: &Path) -> PathBuf {
    let (manifest, _) = SplitIndexer::new(root)
        .build(true, &out_root.join("config"))
        .unwrap();
    manifest
}

pub fn read_record(path: &Path) -> FrameRecord {
    let file = File::open(path).unwrap();
    serde_pickle::from_reader(file, serde_pickle::DeOptions::new()).unwrap()
}

pub fn count_pkls(dir: &Path) -> usize {
    fs::read_dir(dir)
        .unwrap()
        .filter_map(Result::ok)
        .filter(|e| e.path().extension().and_then(|x| x.to_str()) == Some("pkl"))
        .count()
}
