//! Raw dataset access: sequence identity, metadata, pose archives, and the
//! per-frame sequence loader.
//!
//! A dataset root is laid out as `<root>/<subject>/<sequence>/` with one
//! `meta.yml` and one `pose.npz` per sequence, plus a shared
//! `<root>/calibration/` tree holding per-subject MANO shape coefficients.
//! Nothing in this module writes; the loader is a pure function from
//! (sequence identifier, joint order) to a finite stream of frame records.

pub mod loader;
pub mod meta;
pub mod pose;

use std::path::{Path, PathBuf};

/// Identifies one capture session: a `(subject, sequence)` pair, written as
/// `subject/sequence`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SequenceId {
    pub subject: String,
    pub sequence: String,
}

impl SequenceId {
    pub fn new(subject: impl Into<String>, sequence: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            sequence: sequence.into(),
        }
    }

    /// Derive the identifier from an arbitrary sequence path, keeping the
    /// trailing `subject/sequence` components. Accepts both the relative
    /// keys stored in a manifest and absolute dataset paths.
    pub fn from_path(path: &Path) -> Option<Self> {
        let mut parts = path.components().rev().filter_map(|c| match c {
            std::path::Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            _ => None,
        });
        let sequence = parts.next()?;
        match parts.next() {
            Some(subject) => Some(Self::new(subject, sequence)),
            None => Some(Self::new("", sequence)),
        }
    }

    /// Relative path of this sequence under a dataset root.
    pub fn rel_path(&self) -> PathBuf {
        if self.subject.is_empty() {
            PathBuf::from(&self.sequence)
        } else {
            Path::new(&self.subject).join(&self.sequence)
        }
    }
}

impl std::fmt::Display for SequenceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.subject.is_empty() {
            f.write_str(&self.sequence)
        } else {
            write!(f, "{}/{}", self.subject, self.sequence)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_path_keeps_last_two_components() {
        let id = SequenceId::from_path(Path::new("/data/dexycb/subject-01/20200709_141754")).unwrap();
        assert_eq!(id.subject, "subject-01");
        assert_eq!(id.sequence, "20200709_141754");
        assert_eq!(id.to_string(), "subject-01/20200709_141754");
    }

    #[test]
    fn single_component_path_has_empty_subject() {
        let id = SequenceId::from_path(Path::new("20200709_141754")).unwrap();
        assert_eq!(id.subject, "");
        assert_eq!(id.rel_path(), PathBuf::from("20200709_141754"));
    }
}
