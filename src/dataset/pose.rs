//! Per-sequence pose archive (`pose.npz`).
//!
//! The archive carries two arrays indexed by frame:
//! `pose_m` `(T, H, 51)` — MANO pose (48) + translation (3) per hand, and
//! `pose_y` `(T, O, 7)` — wxyz quaternion + translation per YCB object.
//! This dataset annotates a single hand, so `H` is 1.

use crate::error::{AppResult, ExportError};
use crate::model::POSE_DIM;
use crate::rotation::quat_to_rotvec;
use ndarray::{s, Array3, ArrayView1};
use ndarray_npy::NpzReader;
use std::fs::File;
use std::path::Path;

/// MANO slice width in `pose_m`: 48 pose + 3 translation.
const MANO_DIM: usize = POSE_DIM + 3;
/// Object slice width in `pose_y`: 4 quaternion + 3 translation.
const OBJ_DIM: usize = 7;

#[derive(Debug)]
pub struct PoseArchive {
    pose_m: Array3<f32>,
    pose_y: Array3<f32>,
}

impl PoseArchive {
    /// Open and shape-check the archive. `label` names the sequence in
    /// error messages; all failures here are local to that sequence.
    pub fn open(path: &Path, label: &str) -> AppResult<Self> {
        let archive_err = |reason: String| ExportError::Archive {
            sequence: label.to_string(),
            reason,
        };

        if !path.exists() {
            return Err(archive_err(format!("pose archive not found: {}", path.display())));
        }

        let file = File::open(path).map_err(|e| archive_err(e.to_string()))?;
        let mut npz = NpzReader::new(file).map_err(|e| archive_err(e.to_string()))?;

        let pose_m: Array3<f32> = npz
            .by_name("pose_m")
            .map_err(|e| archive_err(format!("pose_m: {e}")))?;
        let pose_y: Array3<f32> = npz
            .by_name("pose_y")
            .map_err(|e| archive_err(format!("pose_y: {e}")))?;

        if pose_m.shape()[2] != MANO_DIM {
            return Err(archive_err(format!(
                "pose_m last dim is {}, expected {MANO_DIM}",
                pose_m.shape()[2]
            )));
        }
        if pose_m.shape()[1] == 0 {
            return Err(archive_err("pose_m has no hand entries".into()));
        }
        if pose_y.shape()[2] != OBJ_DIM {
            return Err(archive_err(format!(
                "pose_y last dim is {}, expected {OBJ_DIM}",
                pose_y.shape()[2]
            )));
        }
        if pose_y.shape()[0] != pose_m.shape()[0] {
            return Err(archive_err(format!(
                "pose_m has {} frames but pose_y has {}",
                pose_m.shape()[0],
                pose_y.shape()[0]
            )));
        }

        Ok(Self { pose_m, pose_y })
    }

    /// Number of frames in the archive.
    pub fn frames(&self) -> usize {
        self.pose_m.shape()[0]
    }

    /// Number of object tracks in `pose_y`.
    pub fn objects(&self) -> usize {
        self.pose_y.shape()[1]
    }

    /// MANO pose coefficients `(48,)` for one frame.
    pub fn hand_pose(&self, frame: usize) -> ArrayView1<'_, f32> {
        self.pose_m.slice(s![frame, 0, 0..POSE_DIM])
    }

    /// Hand translation `(3,)` for one frame.
    pub fn hand_trans(&self, frame: usize) -> ArrayView1<'_, f32> {
        self.pose_m.slice(s![frame, 0, POSE_DIM..MANO_DIM])
    }

    /// Axis-angle rotation and translation of one object track for one
    /// frame, both in f64 like the rest of the derived outputs.
    pub fn object_pose(&self, frame: usize, object: usize) -> ([f64; 3], [f64; 3]) {
        let row = self.pose_y.slice(s![frame, object, ..]);
        let quat = [
            f64::from(row[0]),
            f64::from(row[1]),
            f64::from(row[2]),
            f64::from(row[3]),
        ];
        let trans = [f64::from(row[4]), f64::from(row[5]), f64::from(row[6])];
        (quat_to_rotvec(quat), trans)
    }
}
