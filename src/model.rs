//! Hand kinematics seam.
//!
//! The upstream dataset stores MANO pose/shape parameters, not joint
//! positions; deriving the 21 world-frame joints per frame is the job of a
//! hand model. [`HandModel`] is the seam the sequence loader talks to, so
//! that tests can substitute a deterministic stub.
//!
//! [`KinematicHandModel`] is the shipped implementation: an axis-angle
//! forward-kinematics chain over the 16 articulated MANO joints plus the 5
//! fingertips, driven by a rest-pose template in the MANO-21 output order.
//! It approximates MANO's learned shape space with a uniform bone-length
//! scale taken from the first shape coefficient; pose articulation is exact
//! axis-angle chain composition.

use crate::joints::NUM_JOINTS;
use crate::rotation::{mat_mul, mat_vec, rodrigues, Mat3};
use crate::split::Side;
use ndarray::{Array2, ArrayView1};

/// Length of the MANO pose vector: 3 global + 15 x 3 articulated.
pub const POSE_DIM: usize = 48;
/// Number of MANO shape coefficients.
pub const BETA_DIM: usize = 10;

/// Maps MANO parameters to 3D joints in the model's native (MANO-21) order.
pub trait HandModel {
    /// Derive `(21, 3)` world-frame joint positions (meters) from a 48-dim
    /// pose, a 3-dim translation, and 10 shape coefficients.
    fn joints(&self, pose: ArrayView1<'_, f32>, trans: ArrayView1<'_, f32>, betas: &[f32])
        -> Array2<f64>;
}

/// Builds a [`HandModel`] for a given hand side. The sequence loader only
/// learns the side after reading metadata, so it takes a factory rather
/// than a model.
pub trait HandModelFactory {
    fn for_side(&self, side: Side) -> Box<dyn HandModel>;
}

/// Factory for the shipped forward-kinematics model.
#[derive(Debug, Default, Clone, Copy)]
pub struct KinematicFactory;

impl HandModelFactory for KinematicFactory {
    fn for_side(&self, side: Side) -> Box<dyn HandModel> {
        Box::new(KinematicHandModel::new(side))
    }
}

/// Rest-pose template for a right hand, MANO-21 order, meters, wrist at the
/// origin, fingers along +y, thumb toward +x.
const TEMPLATE_RIGHT: [[f64; 3]; NUM_JOINTS] = [
    [0.000, 0.000, 0.000],
    // thumb
    [0.025, 0.025, 0.010],
    [0.045, 0.048, 0.018],
    [0.060, 0.068, 0.024],
    [0.072, 0.085, 0.028],
    // index
    [0.032, 0.095, 0.000],
    [0.036, 0.135, 0.000],
    [0.038, 0.160, 0.000],
    [0.040, 0.182, 0.000],
    // middle
    [0.010, 0.100, 0.000],
    [0.012, 0.142, 0.000],
    [0.013, 0.170, 0.000],
    [0.014, 0.193, 0.000],
    // ring
    [-0.012, 0.095, 0.000],
    [-0.014, 0.135, 0.000],
    [-0.015, 0.162, 0.000],
    [-0.016, 0.184, 0.000],
    // pinky
    [-0.033, 0.087, 0.000],
    [-0.036, 0.120, 0.000],
    [-0.038, 0.142, 0.000],
    [-0.039, 0.160, 0.000],
];

/// Per-finger chains: output joint slots (MANO-21) and the base index of the
/// finger's first pose triplet. The articulated pose triplets follow MANO's
/// parameter order (index, middle, pinky, ring, thumb), which differs from
/// the output joint order.
const CHAINS: [([usize; 4], usize); 5] = [
    ([5, 6, 7, 8], 0),     // index
    ([9, 10, 11, 12], 1),  // middle
    ([17, 18, 19, 20], 2), // pinky
    ([13, 14, 15, 16], 3), // ring
    ([1, 2, 3, 4], 4),     // thumb
];

/// Fraction of bone length contributed per unit of the first shape
/// coefficient.
const SHAPE_SCALE: f64 = 0.02;

/// Forward-kinematics hand model over a fixed rest template.
pub struct KinematicHandModel {
    template: [[f64; 3]; NUM_JOINTS],
}

impl KinematicHandModel {
    /// Build the model for one hand side; the left hand mirrors the right
    /// template across the x axis.
    pub fn new(side: Side) -> Self {
        let mut template = TEMPLATE_RIGHT;
        if side == Side::Left {
            for row in &mut template {
                row[0] = -row[0];
            }
        }
        Self { template }
    }
}

impl HandModel for KinematicHandModel {
    fn joints(
        &self,
        pose: ArrayView1<'_, f32>,
        trans: ArrayView1<'_, f32>,
        betas: &[f32],
    ) -> Array2<f64> {
        debug_assert_eq!(pose.len(), POSE_DIM);
        debug_assert_eq!(trans.len(), 3);

        let scale = 1.0 + f64::from(betas.first().copied().unwrap_or(0.0)) * SHAPE_SCALE;
        let t = [
            f64::from(trans[0]),
            f64::from(trans[1]),
            f64::from(trans[2]),
        ];

        let triplet = |base: usize| -> [f64; 3] {
            [
                f64::from(pose[base]),
                f64::from(pose[base + 1]),
                f64::from(pose[base + 2]),
            ]
        };

        let global: Mat3 = rodrigues(triplet(0));
        let rest = |slot: usize| -> [f64; 3] {
            [
                self.template[slot][0] * scale,
                self.template[slot][1] * scale,
                self.template[slot][2] * scale,
            ]
        };
        let wrist = rest(0);

        let mut out = Array2::<f64>::zeros((NUM_JOINTS, 3));
        let mut set = |slot: usize, p: [f64; 3]| {
            out[[slot, 0]] = p[0] + t[0];
            out[[slot, 1]] = p[1] + t[1];
            out[[slot, 2]] = p[2] + t[2];
        };
        set(0, wrist);

        for (slots, finger) in CHAINS {
            let mut rot = global;
            let mut pos = wrist;
            let mut prev_rest = wrist;

            for (seg, &slot) in slots.iter().enumerate() {
                let cur_rest = rest(slot);
                let offset = [
                    cur_rest[0] - prev_rest[0],
                    cur_rest[1] - prev_rest[1],
                    cur_rest[2] - prev_rest[2],
                ];
                pos = {
                    let d = mat_vec(&rot, offset);
                    [pos[0] + d[0], pos[1] + d[1], pos[2] + d[2]]
                };
                set(slot, pos);
                prev_rest = cur_rest;

                // The last joint of each chain is a fingertip with no
                // articulation of its own.
                if seg < 3 {
                    let local = rodrigues(triplet(3 + (finger * 3 + seg) * 3));
                    rot = mat_mul(&rot, &local);
                }
            }
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array1;

    fn zeros(n: usize) -> Array1<f32> {
        Array1::zeros(n)
    }

    #[test]
    fn rest_pose_reproduces_template_plus_translation() {
        let model = KinematicHandModel::new(Side::Right);
        let pose = zeros(POSE_DIM);
        let trans = Array1::from(vec![0.1_f32, 0.2, 0.3]);
        let joints = model.joints(pose.view(), trans.view(), &[0.0; BETA_DIM]);

        for slot in 0..NUM_JOINTS {
            assert!((joints[[slot, 0]] - (TEMPLATE_RIGHT[slot][0] + 0.1)).abs() < 1e-6);
            assert!((joints[[slot, 1]] - (TEMPLATE_RIGHT[slot][1] + 0.2)).abs() < 1e-6);
            assert!((joints[[slot, 2]] - (TEMPLATE_RIGHT[slot][2] + 0.3)).abs() < 1e-6);
        }
    }

    #[test]
    fn left_hand_mirrors_x() {
        let right = KinematicHandModel::new(Side::Right);
        let left = KinematicHandModel::new(Side::Left);
        let pose = zeros(POSE_DIM);
        let trans = zeros(3);
        let jr = right.joints(pose.view(), trans.view(), &[]);
        let jl = left.joints(pose.view(), trans.view(), &[]);

        for slot in 0..NUM_JOINTS {
            assert!((jr[[slot, 0]] + jl[[slot, 0]]).abs() < 1e-9);
            assert!((jr[[slot, 1]] - jl[[slot, 1]]).abs() < 1e-9);
        }
    }

    #[test]
    fn global_rotation_moves_fingers_but_not_wrist() {
        let model = KinematicHandModel::new(Side::Right);
        let mut pose = zeros(POSE_DIM);
        pose[2] = std::f32::consts::FRAC_PI_2; // quarter turn about z
        let trans = zeros(3);
        let joints = model.joints(pose.view(), trans.view(), &[]);

        // Wrist is the rotation pivot.
        assert!(joints[[0, 0]].abs() < 1e-9);
        // Index base (+x, +y in rest) rotates toward -x, +y.
        assert!(joints[[5, 0]] < 0.0);
        assert!(joints[[5, 1]] > 0.0);
    }

    #[test]
    fn finger_curl_shortens_reach_but_preserves_bone_length() {
        let model = KinematicHandModel::new(Side::Right);
        let mut pose = zeros(POSE_DIM);
        // Curl the index finger: bend all three articulated segments.
        for seg in 0..3 {
            pose[3 + seg * 3] = 1.0; // about x
        }
        let trans = zeros(3);
        let curled = model.joints(pose.view(), trans.view(), &[]);
        let rest = model.joints(zeros(POSE_DIM).view(), trans.view(), &[]);

        let reach = |j: &Array2<f64>| {
            let d = [j[[8, 0]] - j[[0, 0]], j[[8, 1]] - j[[0, 1]], j[[8, 2]] - j[[0, 2]]];
            (d[0] * d[0] + d[1] * d[1] + d[2] * d[2]).sqrt()
        };
        assert!(reach(&curled) < reach(&rest));

        // Distal bone length is rotation-invariant.
        let bone = |j: &Array2<f64>| {
            let d = [j[[8, 0]] - j[[7, 0]], j[[8, 1]] - j[[7, 1]], j[[8, 2]] - j[[7, 2]]];
            (d[0] * d[0] + d[1] * d[1] + d[2] * d[2]).sqrt()
        };
        assert!((bone(&curled) - bone(&rest)).abs() < 1e-9);
    }

    #[test]
    fn first_beta_scales_the_hand() {
        let model = KinematicHandModel::new(Side::Right);
        let pose = zeros(POSE_DIM);
        let trans = zeros(3);
        let big = model.joints(pose.view(), trans.view(), &[1.0]);
        let base = model.joints(pose.view(), trans.view(), &[0.0]);
        assert!(big[[12, 1]] > base[[12, 1]]);
    }
}
