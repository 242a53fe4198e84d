//! YCB object registry: id <-> model-name lookups.

use crate::error::{AppResult, ExportError};

/// The 21 YCB objects present in the dataset, keyed by their dataset id.
pub const YCB_OBJECTS: &[(u32, &str)] = &[
    (1, "002_master_chef_can"),
    (2, "003_cracker_box"),
    (3, "004_sugar_box"),
    (4, "005_tomato_soup_can"),
    (5, "006_mustard_bottle"),
    (6, "007_tuna_fish_can"),
    (7, "008_pudding_box"),
    (8, "009_gelatin_box"),
    (9, "010_potted_meat_can"),
    (10, "011_banana"),
    (11, "019_pitcher_base"),
    (12, "021_bleach_cleanser"),
    (13, "024_bowl"),
    (14, "025_mug"),
    (15, "035_power_drill"),
    (16, "036_wood_block"),
    (17, "037_scissors"),
    (18, "040_large_marker"),
    (19, "051_large_clamp"),
    (20, "052_extra_large_clamp"),
    (21, "061_foam_brick"),
];

/// Model name for a YCB id.
pub fn ycb_name(id: u32) -> AppResult<&'static str> {
    YCB_OBJECTS
        .iter()
        .find(|(i, _)| *i == id)
        .map(|(_, name)| *name)
        .ok_or_else(|| ExportError::UnknownObject(format!("id {id}")))
}

/// YCB id for a model name.
pub fn ycb_id(name: &str) -> AppResult<u32> {
    YCB_OBJECTS
        .iter()
        .find(|(_, n)| *n == name)
        .map(|(i, _)| *i)
        .ok_or_else(|| ExportError::UnknownObject(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_ids_resolve_both_ways() {
        assert_eq!(ycb_name(9).unwrap(), "010_potted_meat_can");
        assert_eq!(ycb_id("061_foam_brick").unwrap(), 21);
    }

    #[test]
    fn unknown_id_errors() {
        assert!(matches!(ycb_name(99), Err(ExportError::UnknownObject(_))));
        assert!(matches!(ycb_id("nope"), Err(ExportError::UnknownObject(_))));
    }
}
