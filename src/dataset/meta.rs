//! Sequence-level metadata (`meta.yml`) and MANO shape calibration.

use crate::error::{AppResult, ExportError};
use crate::model::BETA_DIM;
use crate::split::Side;
use serde::Deserialize;
use std::fs::File;
use std::path::Path;

/// Parsed view of one sequence's `meta.yml`. Unknown keys are ignored; the
/// raw files carry camera serials and extrinsics this pipeline never reads.
#[derive(Debug, Clone, Deserialize)]
pub struct SequenceMeta {
    pub num_frames: usize,
    pub mano_sides: Vec<String>,
    pub ycb_ids: Vec<u32>,
    pub ycb_grasp_ind: usize,
    pub mano_calib: Vec<String>,
}

impl SequenceMeta {
    pub fn load(path: &Path) -> AppResult<Self> {
        let file = File::open(path)?;
        Ok(serde_yaml::from_reader(file)?)
    }

    /// The declared hand side; exactly one entry is expected.
    pub fn side(&self) -> AppResult<Side> {
        match self.mano_sides.as_slice() {
            [side] => side.parse(),
            [] => Err(ExportError::UnknownSide("<missing>".into())),
            many => Err(ExportError::UnknownSide(many.join(","))),
        }
    }

    /// YCB id of the grasped object (`ycb_ids[ycb_grasp_ind]`).
    pub fn grasped_ycb_id(&self) -> AppResult<u32> {
        self.ycb_ids
            .get(self.ycb_grasp_ind)
            .copied()
            .ok_or_else(|| {
                ExportError::Configuration(format!(
                    "ycb_grasp_ind {} out of range for ycb_ids (len {})",
                    self.ycb_grasp_ind,
                    self.ycb_ids.len()
                ))
            })
    }
}

#[derive(Debug, Deserialize)]
struct ManoCalib {
    betas: Vec<f32>,
}

/// Load the 10 MANO shape coefficients for one calibration id from
/// `<root>/calibration/mano_<id>/mano.yml`.
pub fn load_betas(root: &Path, calib_id: &str) -> AppResult<Vec<f32>> {
    let path = root
        .join("calibration")
        .join(format!("mano_{calib_id}"))
        .join("mano.yml");
    let file = File::open(&path)?;
    let calib: ManoCalib = serde_yaml::from_reader(file)?;
    if calib.betas.len() != BETA_DIM {
        return Err(ExportError::Configuration(format!(
            "{}: expected {BETA_DIM} betas, found {}",
            path.display(),
            calib.betas.len()
        )));
    }
    Ok(calib.betas)
}
