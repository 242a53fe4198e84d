//! Joint-order conventions and reindexing.
//!
//! The hand skeleton exported by this pipeline always carries 21 joints, but
//! downstream consumers disagree on which index means which joint. A
//! [`JointConvention`] names one such layout as a mapping from finger group
//! to the ordered output slots that finger occupies. Two conventions are
//! built in (`mano` and `ho3d`); further ones can be supplied from
//! configuration without code changes.
//!
//! A [`JointReindexer`] is the precomputed permutation between two
//! conventions. Applying it to a `(21, 3)` joint array is a pure row
//! shuffle; no coordinate values change.

use crate::error::{AppResult, ExportError};
use ndarray::{Array2, ArrayView2, Axis};
use serde::Deserialize;
use std::collections::BTreeMap;

/// Number of joints in every supported hand skeleton layout.
pub const NUM_JOINTS: usize = 21;

/// Semantic identity of one joint: finger group plus position along it.
type JointSem = (String, usize);

/// A named joint indexing convention: finger group -> ordered output slots.
///
/// Validated at construction: the slot lists must cover `0..21` with each
/// slot assigned exactly once.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawConvention")]
pub struct JointConvention {
    name: String,
    layout: BTreeMap<String, Vec<usize>>,
    slot_to_sem: Vec<JointSem>,
}

/// Serde-facing shape of an inline convention in a config file.
#[derive(Debug, Clone, Deserialize)]
struct RawConvention {
    name: String,
    joints: BTreeMap<String, Vec<usize>>,
}

impl TryFrom<RawConvention> for JointConvention {
    type Error = ExportError;

    fn try_from(raw: RawConvention) -> AppResult<Self> {
        JointConvention::new(raw.name, raw.joints)
    }
}

impl JointConvention {
    /// Build and validate a convention from a finger-group layout.
    pub fn new(name: impl Into<String>, layout: BTreeMap<String, Vec<usize>>) -> AppResult<Self> {
        let name = name.into();
        let mut slot_to_sem: Vec<Option<JointSem>> = vec![None; NUM_JOINTS];
        let mut total = 0usize;

        for (finger, slots) in &layout {
            for (k, &slot) in slots.iter().enumerate() {
                total += 1;
                if slot >= NUM_JOINTS {
                    return Err(ExportError::Configuration(format!(
                        "convention '{name}': slot {slot} for '{finger}' is outside 0..{NUM_JOINTS}"
                    )));
                }
                if let Some((other, _)) = &slot_to_sem[slot] {
                    return Err(ExportError::Configuration(format!(
                        "convention '{name}': slot {slot} assigned to both '{other}' and '{finger}'"
                    )));
                }
                slot_to_sem[slot] = Some((finger.clone(), k));
            }
        }

        if total != NUM_JOINTS {
            return Err(ExportError::Configuration(format!(
                "convention '{name}': {total} slots declared, expected {NUM_JOINTS}"
            )));
        }

        // Full coverage is implied by total == 21 and no duplicates, but an
        // unfilled slot would still poison every lookup, so keep the check.
        let slot_to_sem = slot_to_sem
            .into_iter()
            .enumerate()
            .map(|(slot, sem)| {
                sem.ok_or_else(|| {
                    ExportError::Configuration(format!(
                        "convention '{name}': slot {slot} is not assigned"
                    ))
                })
            })
            .collect::<AppResult<Vec<_>>>()?;

        Ok(Self {
            name,
            layout,
            slot_to_sem,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn layout(&self) -> &BTreeMap<String, Vec<usize>> {
        &self.layout
    }

    fn sem_of_slot(&self, slot: usize) -> &JointSem {
        &self.slot_to_sem[slot]
    }

    fn slot_of_sem(&self, sem: &JointSem) -> Option<usize> {
        self.layout
            .get(&sem.0)
            .and_then(|slots| slots.get(sem.1))
            .copied()
    }

    /// The MANO-21 / OpenPose layout, the native order of the hand model.
    pub fn mano() -> Self {
        Self::builtin(
            "mano",
            [
                ("wrist", vec![0]),
                ("thumb", vec![1, 2, 3, 4]),
                ("index", vec![5, 6, 7, 8]),
                ("middle", vec![9, 10, 11, 12]),
                ("ring", vec![13, 14, 15, 16]),
                ("pinky", vec![17, 18, 19, 20]),
            ],
        )
    }

    /// The HO3D layout (fingertips grouped at the tail).
    pub fn ho3d() -> Self {
        Self::builtin(
            "ho3d",
            [
                ("wrist", vec![0]),
                ("index", vec![1, 2, 3, 17]),
                ("middle", vec![4, 5, 6, 18]),
                ("ring", vec![10, 11, 12, 19]),
                ("pinky", vec![7, 8, 9, 20]),
                ("thumb", vec![13, 14, 15, 16]),
            ],
        )
    }

    fn builtin(name: &str, groups: [(&str, Vec<usize>); 6]) -> Self {
        let layout = groups
            .into_iter()
            .map(|(finger, slots)| (finger.to_string(), slots))
            .collect();
        // Built-in layouts are fixed data; a failure here is a programming
        // error, not a runtime condition.
        match Self::new(name, layout) {
            Ok(conv) => conv,
            Err(err) => unreachable!("built-in convention '{name}' invalid: {err}"),
        }
    }

    /// Resolve a convention by its registered name.
    pub fn by_name(name: &str) -> AppResult<Self> {
        match name {
            "mano" => Ok(Self::mano()),
            "ho3d" => Ok(Self::ho3d()),
            other => Err(ExportError::Configuration(format!(
                "unknown joint order '{other}' (expected 'mano' or 'ho3d', or an inline definition)"
            ))),
        }
    }
}

/// Permutation from a source convention's slots to a destination's.
#[derive(Debug, Clone)]
pub struct JointReindexer {
    src_name: String,
    dst_name: String,
    perm: Vec<usize>,
}

impl JointReindexer {
    /// Precompute the permutation taking joints laid out per `src` into the
    /// `dst` layout. Fails if the two conventions disagree on finger-group
    /// semantics (different group names or chain lengths).
    pub fn between(src: &JointConvention, dst: &JointConvention) -> AppResult<Self> {
        let perm = (0..NUM_JOINTS)
            .map(|slot| {
                let sem = dst.sem_of_slot(slot);
                src.slot_of_sem(sem).ok_or_else(|| {
                    ExportError::Configuration(format!(
                        "conventions '{}' and '{}' disagree on joint '{}[{}]'",
                        src.name(),
                        dst.name(),
                        sem.0,
                        sem.1
                    ))
                })
            })
            .collect::<AppResult<Vec<_>>>()?;

        Ok(Self {
            src_name: src.name().to_string(),
            dst_name: dst.name().to_string(),
            perm,
        })
    }

    /// Reorder a `(21, 3)` joint array into the destination layout.
    ///
    /// Validation happens at construction; application is a total row
    /// permutation.
    pub fn apply(&self, joints: ArrayView2<'_, f64>) -> Array2<f64> {
        debug_assert_eq!(joints.nrows(), NUM_JOINTS);
        joints.select(Axis(0), &self.perm)
    }

    /// The inverse mapper (destination back to source).
    pub fn inverse(&self) -> Self {
        let mut perm = vec![0usize; self.perm.len()];
        for (dst_slot, &src_slot) in self.perm.iter().enumerate() {
            perm[src_slot] = dst_slot;
        }
        Self {
            src_name: self.dst_name.clone(),
            dst_name: self.src_name.clone(),
            perm,
        }
    }

    pub fn permutation(&self) -> &[usize] {
        &self.perm
    }
}

impl std::fmt::Display for JointReindexer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {} (N={})", self.src_name, self.dst_name, NUM_JOINTS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    fn numbered_joints() -> Array2<f64> {
        Array2::from_shape_fn((NUM_JOINTS, 3), |(i, j)| (i * 3 + j) as f64)
    }

    #[test]
    fn identity_reindex_is_a_noop() {
        let mano = JointConvention::mano();
        let rx = JointReindexer::between(&mano, &mano).unwrap();
        let j = numbered_joints();
        assert_eq!(rx.apply(j.view()), j);
    }

    #[test]
    fn mano_to_ho3d_matches_slot_semantics() {
        let mano = JointConvention::mano();
        let ho3d = JointConvention::ho3d();
        let rx = JointReindexer::between(&mano, &ho3d).unwrap();
        let j = numbered_joints();
        let out = rx.apply(j.view());

        // HO3D slot 1 is index[0]; MANO keeps index[0] at slot 5.
        assert_eq!(out.row(1), j.row(5));
        // HO3D slot 16 is thumb[3] (tip); MANO keeps it at slot 4.
        assert_eq!(out.row(16), j.row(4));
        // Wrist stays put in both.
        assert_eq!(out.row(0), j.row(0));
    }

    #[test]
    fn roundtrip_through_inverse_restores_input() {
        let rx = JointReindexer::between(&JointConvention::mano(), &JointConvention::ho3d()).unwrap();
        let j = numbered_joints();
        let there = rx.apply(j.view());
        let back = rx.inverse().apply(there.view());
        assert_eq!(back, j);
    }

    #[test]
    fn twenty_slot_convention_is_rejected() {
        let layout: BTreeMap<String, Vec<usize>> = [
            ("wrist".to_string(), vec![0]),
            ("thumb".to_string(), vec![1, 2, 3, 4]),
            ("index".to_string(), vec![5, 6, 7, 8]),
            ("middle".to_string(), vec![9, 10, 11, 12]),
            ("ring".to_string(), vec![13, 14, 15, 16]),
            ("pinky".to_string(), vec![17, 18, 19]),
        ]
        .into();
        let err = JointConvention::new("short", layout).unwrap_err();
        assert!(matches!(err, ExportError::Configuration(_)));
    }

    #[test]
    fn duplicate_slot_is_rejected() {
        let layout: BTreeMap<String, Vec<usize>> = [
            ("wrist".to_string(), vec![0]),
            ("thumb".to_string(), vec![1, 2, 3, 4]),
            ("index".to_string(), vec![5, 6, 7, 8]),
            ("middle".to_string(), vec![9, 10, 11, 12]),
            ("ring".to_string(), vec![13, 14, 15, 16]),
            ("pinky".to_string(), vec![17, 18, 19, 19]),
        ]
        .into();
        assert!(JointConvention::new("dup", layout).is_err());
    }

    #[test]
    fn out_of_range_slot_is_rejected() {
        let layout: BTreeMap<String, Vec<usize>> = [
            ("wrist".to_string(), vec![0]),
            ("thumb".to_string(), vec![1, 2, 3, 4]),
            ("index".to_string(), vec![5, 6, 7, 8]),
            ("middle".to_string(), vec![9, 10, 11, 12]),
            ("ring".to_string(), vec![13, 14, 15, 16]),
            ("pinky".to_string(), vec![17, 18, 19, 21]),
        ]
        .into();
        assert!(JointConvention::new("oob", layout).is_err());
    }

    #[test]
    fn inline_convention_deserializes_from_yaml() {
        let yaml = r#"
name: custom
joints:
  wrist: [0]
  thumb: [1, 2, 3, 4]
  index: [5, 6, 7, 8]
  middle: [9, 10, 11, 12]
  ring: [13, 14, 15, 16]
  pinky: [17, 18, 19, 20]
"#;
        let conv: JointConvention = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(conv.name(), "custom");
    }
}
