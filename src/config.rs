//! Configuration management.
//!
//! Export runs are driven by a YAML config file mirroring the upstream
//! tool's keys (`out_root`, `side`, `order`, `hand_splits`, `dataset_root`),
//! with CLI flags overriding file values. The dataset-root environment
//! variable is consulted only at the binary entry point, never here.

use crate::error::{AppResult, ExportError};
use crate::joints::JointConvention;
use crate::split::{SideSelect, MANIFEST_FILE};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Joint order as written in config: a registered name or an inline
/// convention definition.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OrderSpec {
    Name(String),
    Inline {
        name: String,
        joints: BTreeMap<String, Vec<usize>>,
    },
}

impl Default for OrderSpec {
    fn default() -> Self {
        OrderSpec::Name("mano".into())
    }
}

impl OrderSpec {
    /// Resolve to a validated convention.
    pub fn resolve(&self) -> AppResult<JointConvention> {
        match self {
            OrderSpec::Name(name) => JointConvention::by_name(name),
            OrderSpec::Inline { name, joints } => {
                JointConvention::new(name.clone(), joints.clone())
            }
        }
    }
}

/// Settings for one export run.
#[derive(Debug, Clone, Deserialize)]
pub struct ExportConfig {
    #[serde(default = "default_out_root")]
    pub out_root: PathBuf,
    #[serde(default = "default_side")]
    pub side: SideSelect,
    #[serde(default)]
    pub order: OrderSpec,
    /// Path to the hand-split manifest; defaults to
    /// `<out_root>/config/hand_splits.yaml`.
    #[serde(default)]
    pub hand_splits: Option<PathBuf>,
    /// Raw dataset root. Optional in the file; the binary falls back to the
    /// environment before invoking the library.
    #[serde(default)]
    pub dataset_root: Option<PathBuf>,
}

fn default_out_root() -> PathBuf {
    PathBuf::from("dexYCB_dataset")
}

fn default_side() -> SideSelect {
    SideSelect::Right
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            out_root: default_out_root(),
            side: default_side(),
            order: OrderSpec::default(),
            hand_splits: None,
            dataset_root: None,
        }
    }
}

impl ExportConfig {
    /// Load settings from a YAML file.
    pub fn load(path: &Path) -> AppResult<Self> {
        let file = File::open(path).map_err(|e| {
            ExportError::Configuration(format!("cannot read config {}: {e}", path.display()))
        })?;
        Ok(serde_yaml::from_reader(file)?)
    }

    /// Effective manifest path for this run.
    pub fn manifest_path(&self) -> PathBuf {
        self.hand_splits
            .clone()
            .unwrap_or_else(|| self.out_root.join("config").join(MANIFEST_FILE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::split::SideSelect;

    #[test]
    fn defaults_match_the_upstream_tool() {
        let cfg = ExportConfig::default();
        assert_eq!(cfg.out_root, PathBuf::from("dexYCB_dataset"));
        assert_eq!(cfg.side, SideSelect::Right);
        assert_eq!(cfg.order.resolve().unwrap().name(), "mano");
        assert_eq!(
            cfg.manifest_path(),
            PathBuf::from("dexYCB_dataset/config/hand_splits.yaml")
        );
    }

    #[test]
    fn parses_named_order_and_explicit_manifest() {
        let cfg: ExportConfig = serde_yaml::from_str(
            "out_root: /tmp/out\nside: both\norder: ho3d\nhand_splits: /tmp/splits.yaml\n",
        )
        .unwrap();
        assert_eq!(cfg.side, SideSelect::Both);
        assert_eq!(cfg.order.resolve().unwrap().name(), "ho3d");
        assert_eq!(cfg.manifest_path(), PathBuf::from("/tmp/splits.yaml"));
    }

    #[test]
    fn parses_inline_order() {
        let cfg: ExportConfig = serde_yaml::from_str(
            r#"
order:
  name: custom
  joints:
    wrist: [0]
    thumb: [1, 2, 3, 4]
    index: [5, 6, 7, 8]
    middle: [9, 10, 11, 12]
    ring: [13, 14, 15, 16]
    pinky: [17, 18, 19, 20]
"#,
        )
        .unwrap();
        assert_eq!(cfg.order.resolve().unwrap().name(), "custom");
    }

    #[test]
    fn invalid_inline_order_fails_resolution() {
        let cfg: ExportConfig = serde_yaml::from_str(
            "order:\n  name: broken\n  joints:\n    wrist: [0]\n",
        )
        .unwrap();
        assert!(cfg.order.resolve().is_err());
    }

    #[test]
    fn unknown_order_name_is_a_configuration_error() {
        let cfg: ExportConfig = serde_yaml::from_str("order: openpose9\n").unwrap();
        assert!(matches!(
            cfg.order.resolve(),
            Err(ExportError::Configuration(_))
        ));
    }
}
