//! Per-sequence loading: metadata, pose archive, and derived frame records.
//!
//! `SequenceLoader::open` performs all fallible work up front — resolving
//! files, parsing metadata, shape-checking the archive, and building the
//! joint reindexer — so that frame production itself is infallible. The
//! frame stream is lazy and restartable: `frames()` can be called any
//! number of times and never retains cross-call state.
//!
//! Every error returned here is local to one sequence; the loader maps
//! read-side I/O and parse failures into its own variants so the exporter
//! can skip the sequence and carry on.

use crate::dataset::meta::{load_betas, SequenceMeta};
use crate::dataset::pose::PoseArchive;
use crate::dataset::SequenceId;
use crate::error::{AppResult, ExportError};
use crate::joints::{JointConvention, JointReindexer};
use crate::model::{HandModel, HandModelFactory};
use crate::split::Side;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One exported frame: the unit of output. Field names match the on-disk
/// record keys consumed downstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameRecord {
    #[serde(rename = "seqName")]
    pub seq_name: String,
    pub side: String,
    pub frame: u32,
    pub order: String,
    /// MANO pose coefficients, radians: 3 global + 15x3 articulated.
    #[serde(rename = "handPose")]
    pub hand_pose: Vec<f32>,
    /// Hand translation, meters, world frame.
    #[serde(rename = "handTrans")]
    pub hand_trans: [f32; 3],
    /// MANO shape coefficients.
    #[serde(rename = "handBeta")]
    pub hand_beta: Vec<f32>,
    /// Grasped-object rotation, axis-angle radians.
    #[serde(rename = "objRot")]
    pub obj_rot: [f64; 3],
    /// Grasped-object translation, meters, world frame.
    #[serde(rename = "objTrans")]
    pub obj_trans: [f64; 3],
    #[serde(rename = "objName")]
    pub obj_name: String,
    /// Derived 3D hand joints `(21, 3)`, meters, world frame, ordered per
    /// the record's `order` convention.
    #[serde(rename = "handJoints3D")]
    pub hand_joints: Vec<[f64; 3]>,
}

/// Loads one sequence and derives its per-frame records.
pub struct SequenceLoader {
    id: SequenceId,
    side: Side,
    order_name: String,
    num_frames: usize,
    betas: Vec<f32>,
    object_name: String,
    grasp_track: usize,
    archive: PoseArchive,
    reindexer: Option<JointReindexer>,
    model: Box<dyn HandModel>,
}

// The boxed model has no Debug bound, so derive is unavailable.
impl std::fmt::Debug for SequenceLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SequenceLoader")
            .field("id", &self.id)
            .field("side", &self.side)
            .field("order", &self.order_name)
            .field("num_frames", &self.num_frames)
            .field("object", &self.object_name)
            .finish_non_exhaustive()
    }
}

impl SequenceLoader {
    /// Resolve and validate one sequence under `root`.
    ///
    /// Fails with `SequenceNotFound` if `meta.yml` is absent and with
    /// `CorruptArchive` if the archive's frame count disagrees with the
    /// declared one — downstream indices would silently misalign otherwise.
    pub fn open(
        root: &Path,
        id: &SequenceId,
        order: &JointConvention,
        models: &dyn HandModelFactory,
    ) -> AppResult<Self> {
        let seq_dir = root.join(id.rel_path());
        let label = id.to_string();
        let meta_err = |reason: String| ExportError::Metadata {
            sequence: label.clone(),
            reason,
        };

        let meta_path = seq_dir.join("meta.yml");
        if !meta_path.exists() {
            return Err(ExportError::SequenceNotFound(meta_path));
        }

        let meta = SequenceMeta::load(&meta_path).map_err(|e| meta_err(e.to_string()))?;
        let side = meta.side().map_err(|e| meta_err(e.to_string()))?;

        let calib_id = meta
            .mano_calib
            .first()
            .ok_or_else(|| meta_err("mano_calib is empty".into()))?;
        let betas = load_betas(root, calib_id).map_err(|e| meta_err(e.to_string()))?;

        let ycb_id = meta.grasped_ycb_id().map_err(|e| meta_err(e.to_string()))?;
        let object_name = crate::objects::ycb_name(ycb_id)
            .map_err(|e| meta_err(e.to_string()))?
            .to_string();

        let archive = PoseArchive::open(&seq_dir.join("pose.npz"), &label)?;
        if archive.frames() != meta.num_frames {
            return Err(ExportError::CorruptArchive {
                sequence: label,
                declared: meta.num_frames,
                actual: archive.frames(),
            });
        }
        if meta.ycb_grasp_ind >= archive.objects() {
            return Err(ExportError::Archive {
                sequence: id.to_string(),
                reason: format!(
                    "grasp track {} out of range for {} object tracks",
                    meta.ycb_grasp_ind,
                    archive.objects()
                ),
            });
        }

        // Joints come out of the model in the MANO native order; only a
        // differing target order needs a permutation.
        let mano = JointConvention::mano();
        let reindexer = if order.name() == mano.name() {
            None
        } else {
            Some(JointReindexer::between(&mano, order)?)
        };

        Ok(Self {
            id: id.clone(),
            side,
            order_name: order.name().to_string(),
            num_frames: meta.num_frames,
            betas,
            object_name,
            grasp_track: meta.ycb_grasp_ind,
            archive,
            reindexer,
            model: models.for_side(side),
        })
    }

    pub fn id(&self) -> &SequenceId {
        &self.id
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn num_frames(&self) -> usize {
        self.num_frames
    }

    pub fn object_name(&self) -> &str {
        &self.object_name
    }

    /// Lazy, restartable stream of this sequence's frame records.
    pub fn frames(&self) -> Frames<'_> {
        Frames {
            loader: self,
            next: 0,
        }
    }

    fn record(&self, frame: usize) -> FrameRecord {
        let pose = self.archive.hand_pose(frame);
        let trans = self.archive.hand_trans(frame);
        let (obj_rot, obj_trans) = self.archive.object_pose(frame, self.grasp_track);

        let native = self.model.joints(pose, trans, &self.betas);
        let joints = match &self.reindexer {
            Some(rx) => rx.apply(native.view()),
            None => native,
        };

        FrameRecord {
            seq_name: self.id.to_string(),
            side: self.side.to_string(),
            frame: frame as u32,
            order: self.order_name.clone(),
            hand_pose: pose.to_vec(),
            hand_trans: [trans[0], trans[1], trans[2]],
            hand_beta: self.betas.clone(),
            obj_rot,
            obj_trans,
            obj_name: self.object_name.clone(),
            hand_joints: joints
                .rows()
                .into_iter()
                .map(|r| [r[0], r[1], r[2]])
                .collect(),
        }
    }
}

/// Iterator over a sequence's frames. Finite; length equals the declared
/// frame count.
pub struct Frames<'a> {
    loader: &'a SequenceLoader,
    next: usize,
}

impl Iterator for Frames<'_> {
    type Item = FrameRecord;

    fn next(&mut self) -> Option<FrameRecord> {
        if self.next >= self.loader.num_frames {
            return None;
        }
        let record = self.loader.record(self.next);
        self.next += 1;
        Some(record)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let rest = self.loader.num_frames - self.next;
        (rest, Some(rest))
    }
}

impl ExactSizeIterator for Frames<'_> {}
