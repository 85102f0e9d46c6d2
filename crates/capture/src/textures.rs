//! Sign texture catalog and texture decoding
//!
//! The catalog maps symbolic sign-class labels to the texture images that
//! repaint in-world sign objects. Labels must match the classifier
//! taxonomy used downstream of this pipeline; that agreement is external
//! and not enforced here. The target-object list is only valid for the
//! `Town07_attacked` map.

use std::path::{Path, PathBuf};

use bytes::Bytes;
use contracts::{ContractError, DecodedTexture, TextureAssignment, TexturePlan};
use tracing::info;

use crate::error::{CaptureError, Result};

/// Textures applicable to the round sign objects. Labels double as result
/// subfolder names, so they must stay unique.
pub const ROUND_SIGN_CATALOG: &[(&str, &str)] = &[
    ("Speed_30", "images/textures_traffic_sign/tempo30_512.png"),
    ("Speed_40", "images/textures_traffic_sign/tempo40_512.png"),
    ("Speed_50", "images/textures_traffic_sign/tempo50_512.png"),
    ("Speed_60", "images/textures_traffic_sign/tempo60_512.png"),
    ("Speed_80", "images/textures_traffic_sign/tempo80_512.png"),
    ("Speed_100", "images/textures_traffic_sign/tempo100_512.png"),
    ("Speed_120", "images/textures_traffic_sign/tempo120_512.png"),
    ("No_Entry", "images/textures_traffic_sign/Verbot_Einf_512.png"),
    ("No_Vehicles", "images/textures_traffic_sign/Verbot_alle_512.png"),
    ("No_Over", "images/textures_traffic_sign/Uehvb_alle_512.png"),
    ("No_Over_Heavy", "images/textures_traffic_sign/Uehvb_u2,8_512.png"),
    ("No_Parking", "images/textures_traffic_sign/Eg_Hvb.png"),
    ("Ahead_Only", "images/textures_traffic_sign/straight_ahead_512.png"),
    ("Speed_80_End", "images/textures_traffic_sign/ende80_512.png"),
    ("Speed_60#Speed_50", "images/textures_traffic_sign/morg_60_50.png"),
    ("Speed_50#Speed_30", "images/textures_traffic_sign/morg_50_30.png"),
    ("Speed_80#Speed_60", "images/textures_traffic_sign/morg_80_60.png"),
    (
        "Speed_100#Speed_120",
        "images/textures_traffic_sign/morg_100_120.png",
    ),
    ("Speed_30#Yield", "images/textures_traffic_sign/sita_30_yield.png"),
    ("Speed_120#Speed_30", "images/textures_traffic_sign/sita_120-30.png"),
    ("Speed_60#Speed_120", "images/textures_traffic_sign/woit_60_120.png"),
    ("KFC#Stop", "images/textures_traffic_sign/sita_kfc_stop.png"),
    (
        "Texaco#No_Over",
        "images/textures_traffic_sign/sita_texaco_uebvb.png",
    ),
    (
        "Speed_100#Speed_40",
        "images/textures_traffic_sign/tempo100#40-wei_512.png",
    ),
    ("Speed_40#Speed_60", "images/textures_traffic_sign/jia_40_60.png"),
];

/// Paintable round sign objects. Map specific: only present in the
/// `Town07_attacked` world.
pub const ROUND_TRAFFIC_SIGNS_TOWN7: &[&str] = &[
    "BP_Tempo64_2",
    "BP_Tempo65_5",
    "BP_Tempo66_8",
    "BP_Tempo67_11",
    "BP_Tempo68_14",
    "BP_Tempo69_17",
    "BP_Tempo70_2",
    "BP_Tempo71_5",
    "BP_Tempo72_2",
    "BP_Tempo73_5",
    "BP_Tempo74_8",
    "BP_Tempo75_11",
    "BP_Tempo76_14",
    "BP_Tempo77_17",
];

/// Catalog lookup: label -> texture path
pub fn catalog_path(label: &str) -> Option<&'static str> {
    ROUND_SIGN_CATALOG
        .iter()
        .find(|(name, _)| *name == label)
        .map(|(_, path)| *path)
}

/// All catalog entries as owned assignments (for running the full set)
pub fn full_catalog() -> Vec<TextureAssignment> {
    ROUND_SIGN_CATALOG
        .iter()
        .map(|(label, path)| TextureAssignment {
            label: (*label).to_string(),
            path: PathBuf::from(path),
        })
        .collect()
}

/// Resolve a texture plan to concrete assignments.
///
/// Catalog labels come first (in plan order), then explicit entries.
///
/// # Errors
/// `UnknownTextureLabel` when a label is not in the catalog; this is a
/// configuration error and fatal.
pub fn resolve_plan(plan: &TexturePlan) -> Result<Vec<TextureAssignment>> {
    let mut assignments = Vec::with_capacity(plan.labels.len() + plan.entries.len());

    for label in &plan.labels {
        let path = catalog_path(label).ok_or_else(|| CaptureError::UnknownTextureLabel {
            label: label.clone(),
        })?;
        assignments.push(TextureAssignment {
            label: label.clone(),
            path: PathBuf::from(path),
        });
    }
    assignments.extend(plan.entries.iter().cloned());

    Ok(assignments)
}

/// Target objects for a plan; an empty list means the built-in Town07
/// round-sign set.
pub fn resolve_targets(plan: &TexturePlan) -> Vec<String> {
    if plan.targets.is_empty() {
        ROUND_TRAFFIC_SIGNS_TOWN7
            .iter()
            .map(|s| (*s).to_string())
            .collect()
    } else {
        plan.targets.clone()
    }
}

/// Decode a texture image into upload-ready RGBA pixels.
///
/// The alpha channel of the source image is discarded and every pixel is
/// made fully opaque, as the sign material expects.
pub fn load_texture(path: &Path) -> std::result::Result<DecodedTexture, ContractError> {
    let image = image::open(path)
        .map_err(|e| ContractError::texture_load(path.display().to_string(), e.to_string()))?;

    let mut rgba = image.to_rgba8();
    for pixel in rgba.pixels_mut() {
        pixel.0[3] = 255;
    }

    let (width, height) = rgba.dimensions();
    info!(path = %path.display(), width, height, "texture decoded");

    Ok(DecodedTexture {
        width,
        height,
        data: Bytes::from(rgba.into_raw()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_labels_are_unique() {
        let mut seen = std::collections::HashSet::new();
        for (label, _) in ROUND_SIGN_CATALOG {
            assert!(seen.insert(*label), "label '{label}' declared twice");
        }
    }

    #[test]
    fn catalog_paths_follow_the_texture_convention() {
        for (label, path) in ROUND_SIGN_CATALOG {
            assert!(
                path.starts_with("images/textures_traffic_sign/"),
                "'{label}' path escapes the texture directory: {path}"
            );
            assert!(path.ends_with(".png"), "'{label}' is not a png: {path}");
        }
    }

    #[test]
    fn lookup_finds_known_labels() {
        assert_eq!(
            catalog_path("Speed_30"),
            Some("images/textures_traffic_sign/tempo30_512.png")
        );
        assert_eq!(catalog_path("Speed_999"), None);
    }

    #[test]
    fn resolve_plan_rejects_unknown_labels() {
        let plan = TexturePlan {
            labels: vec!["Speed_30".into(), "Not_A_Sign".into()],
            entries: vec![],
            targets: vec![],
        };
        let err = resolve_plan(&plan).unwrap_err();
        assert!(matches!(
            err,
            CaptureError::UnknownTextureLabel { ref label } if label == "Not_A_Sign"
        ));
    }

    #[test]
    fn resolve_plan_keeps_labels_then_entries() {
        let plan = TexturePlan {
            labels: vec!["Speed_30".into()],
            entries: vec![TextureAssignment {
                label: "Custom".into(),
                path: "images/custom.png".into(),
            }],
            targets: vec![],
        };
        let assignments = resolve_plan(&plan).unwrap();
        assert_eq!(assignments.len(), 2);
        assert_eq!(assignments[0].label, "Speed_30");
        assert_eq!(assignments[1].label, "Custom");
    }

    #[test]
    fn empty_targets_default_to_town7_signs() {
        let plan = TexturePlan::default();
        let targets = resolve_targets(&plan);
        assert_eq!(targets.len(), 14);
        assert_eq!(targets[0], "BP_Tempo64_2");

        let explicit = TexturePlan {
            targets: vec!["BP_Custom_1".into()],
            ..Default::default()
        };
        assert_eq!(resolve_targets(&explicit), vec!["BP_Custom_1".to_string()]);
    }

    #[test]
    fn load_texture_forces_alpha_opaque() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("translucent.png");

        // 2x2 RGBA image with partially transparent pixels
        let mut img = image::RgbaImage::new(2, 2);
        img.put_pixel(0, 0, image::Rgba([255, 0, 0, 10]));
        img.put_pixel(1, 0, image::Rgba([0, 255, 0, 0]));
        img.put_pixel(0, 1, image::Rgba([0, 0, 255, 128]));
        img.put_pixel(1, 1, image::Rgba([9, 9, 9, 255]));
        img.save(&path).unwrap();

        let texture = load_texture(&path).unwrap();
        assert_eq!((texture.width, texture.height), (2, 2));
        for pixel in texture.data.chunks_exact(4) {
            assert_eq!(pixel[3], 255);
        }
        // color channels survive untouched
        assert_eq!(&texture.data[0..3], &[255, 0, 0]);
    }

    #[test]
    fn load_texture_reports_missing_file() {
        let err = load_texture(Path::new("does/not/exist.png")).unwrap_err();
        assert!(matches!(err, ContractError::TextureLoad { .. }));
    }
}
