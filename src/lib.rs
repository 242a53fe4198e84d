//! # dexport
//!
//! Batch conversion of the DexYCB motion-capture dataset into per-frame
//! records partitioned by hand side. The pipeline has three stages:
//!
//! 1. **Split** ([`split`]): scan the raw dataset, partition sequences by
//!    declared hand side, and persist the partition as a YAML manifest plus
//!    two flat CSV lists.
//! 2. **Load** ([`dataset`]): for one sequence, parse metadata and the pose
//!    archive, derive 3D hand joints through the kinematics seam
//!    ([`model`]), and reorder them per the requested joint convention
//!    ([`joints`]).
//! 3. **Export** ([`export`]): walk the manifest for one or both sides and
//!    write one serialized record per frame, mirroring the raw
//!    subject/sequence hierarchy.
//!
//! The pipeline is one-directional and re-runnable: re-exporting overwrites
//! identically. Organizing the project as a library keeps the stages
//! callable from tests and other frontends; the `dexport` binary is a thin
//! CLI over them.
//!
//! ## Crate Structure
//!
//! - **`config`**: YAML run configuration (`out_root`, `side`, `order`,
//!   `hand_splits`) with serde-validated joint-order definitions.
//! - **`dataset`**: sequence identity, metadata, pose archives, and the
//!   lazy per-frame loader.
//! - **`error`**: the central `ExportError` enum.
//! - **`export`**: the frame exporter and its run summary.
//! - **`grouping`**: per-object sequence grouping CSVs.
//! - **`joints`**: joint-order conventions and reindexing.
//! - **`model`**: the hand kinematics seam and the shipped
//!   forward-kinematics model.
//! - **`objects`**: YCB object id/name registry.
//! - **`rotation`**: small axis-angle/quaternion helpers.
//! - **`split`**: hand-split scanning and manifest persistence.

pub mod config;
pub mod dataset;
pub mod error;
pub mod export;
pub mod grouping;
pub mod joints;
pub mod model;
pub mod objects;
pub mod rotation;
pub mod split;

pub use config::{ExportConfig, OrderSpec};
pub use dataset::loader::{FrameRecord, SequenceLoader};
pub use dataset::SequenceId;
pub use error::{AppResult, ExportError};
pub use export::{Exporter, RunSummary};
pub use joints::{JointConvention, JointReindexer, NUM_JOINTS};
pub use model::{HandModel, HandModelFactory, KinematicFactory, KinematicHandModel};
pub use split::{Side, SideSelect, SplitIndexer, SplitManifest};
