use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use crate::{
    foundation::core::{Canvas, Point, Rgb8},
    foundation::error::{MannequinError, MannequinResult},
    rig::part::{AnchorKey, Part, REQUIRED_ANCHORS, TIP_PARTS},
};

/// File name of the rig descriptor inside an asset directory.
pub const DESCRIPTOR_FILE: &str = "anchors.json";

/// Boundary (serde) form of the rig descriptor.
#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
pub struct RigDescriptorDef {
    /// Reference canvas `[width, height]`.
    #[serde(default)]
    pub ref_size: Option<[u32; 2]>,
    /// Part name to sprite path, relative to the asset directory.
    #[serde(default)]
    pub parts: BTreeMap<String, String>,
    /// `"parent>child"` to rest-pose anchor pair.
    #[serde(default)]
    pub anchors: BTreeMap<String, AnchorPairDef>,
    /// Distal tip point per lower-limb part.
    #[serde(default)]
    pub tip_lower: BTreeMap<String, [f64; 2]>,
    /// Rendering options.
    #[serde(default)]
    pub options: RigOptions,
    /// Background specification.
    #[serde(default)]
    pub background: BackgroundSpec,
}

/// Boundary form of one anchor pair.
#[derive(Clone, Copy, Debug, serde::Serialize, serde::Deserialize)]
pub struct AnchorPairDef {
    /// Anchor on the parent side, reference space.
    pub parent: [f64; 2],
    /// Anchor on the child side, reference space.
    pub child: [f64; 2],
}

/// Vertical placement policy for the character.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VAlignMode {
    /// Fixed top padding.
    TopPad,
    /// Center the joint bounding span vertically.
    #[default]
    Center,
    /// Keep the lowest leg joint a fixed distance above the canvas bottom.
    Feet,
}

/// Free-form rig options; unknown keys are ignored.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RigOptions {
    /// Vertical alignment mode.
    #[serde(default)]
    pub v_align_mode: VAlignMode,
    /// Distance kept between the feet anchor and the canvas bottom in `feet` mode.
    #[serde(default = "default_bottom_margin")]
    pub bottom_margin_px: f64,
}

impl Default for RigOptions {
    fn default() -> Self {
        Self {
            v_align_mode: VAlignMode::default(),
            bottom_margin_px: default_bottom_margin(),
        }
    }
}

fn default_bottom_margin() -> f64 {
    40.0
}

/// How a background image is fitted to the canvas.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResizeMode {
    /// Scale up to cover the canvas, center-crop the overflow.
    #[default]
    Cover,
    /// Scale to fit inside the canvas, pad with the background color.
    Fit,
    /// Use the image as-is; the canvas takes the image size.
    Native,
}

/// Background specification.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct BackgroundSpec {
    /// Solid fill color, also the padding color in `fit` mode.
    #[serde(default)]
    pub color: Rgb8,
    /// Resize policy applied to `path`.
    #[serde(default)]
    pub resize: ResizeMode,
    /// Gaussian blur kernel size in pixels; `0` disables blurring.
    #[serde(default)]
    pub blur: f64,
    /// Optional background image, relative to the asset directory unless absolute.
    #[serde(default)]
    pub path: Option<String>,
}

impl Default for BackgroundSpec {
    fn default() -> Self {
        Self {
            color: Rgb8::BLACK,
            resize: ResizeMode::Cover,
            blur: 0.0,
            path: None,
        }
    }
}

/// Rest-pose anchor pair in reference space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnchorPair {
    /// Parent-side anchor.
    pub parent: Point,
    /// Child-side anchor.
    pub child: Point,
}

/// Validated rig description: typed anchor tables, sprite paths, options.
#[derive(Clone, Debug)]
pub struct Rig {
    /// Reference canvas size.
    pub ref_size: Canvas,
    /// Sprite file per part, relative to the asset directory.
    pub parts: BTreeMap<Part, PathBuf>,
    /// Anchor table keyed by `(parent, child)`.
    pub anchors: HashMap<AnchorKey, AnchorPair>,
    /// Distal tip points for lower-limb parts.
    pub tips: HashMap<Part, Point>,
    /// Rendering options.
    pub options: RigOptions,
    /// Background specification.
    pub background: BackgroundSpec,
}

impl Rig {
    /// Read and validate `anchors.json` from `dir`.
    pub fn load(dir: &Path) -> MannequinResult<Self> {
        let path = dir.join(DESCRIPTOR_FILE);
        if !path.is_file() {
            return Err(MannequinError::config_not_found(path));
        }
        let text = std::fs::read_to_string(&path).map_err(|e| {
            MannequinError::config_invalid(format!("read '{}': {e}", path.display()))
        })?;
        let def: RigDescriptorDef = serde_json::from_str(&text).map_err(|e| {
            MannequinError::config_invalid(format!("parse '{}': {e}", path.display()))
        })?;
        Self::from_def(def)
    }

    /// Validate a parsed descriptor.
    pub fn from_def(def: RigDescriptorDef) -> MannequinResult<Self> {
        let [w, h] = def
            .ref_size
            .ok_or_else(|| MannequinError::config_invalid("'ref_size' is required, e.g. [600, 1000]"))?;
        let ref_size = Canvas::new(w, h)
            .map_err(|e| MannequinError::config_invalid(format!("'ref_size': {e}")))?;

        if def.parts.is_empty() {
            return Err(MannequinError::config_invalid("'parts' is empty"));
        }

        let mut parts = BTreeMap::new();
        for (name, file) in &def.parts {
            match name.parse::<Part>() {
                Ok(p) => {
                    parts.insert(p, PathBuf::from(file));
                }
                Err(e) => tracing::warn!(part = %name, "ignoring sprite: {e}"),
            }
        }
        let missing_parts: Vec<&str> = Part::ALL
            .iter()
            .filter(|p| !parts.contains_key(p))
            .map(|p| p.name())
            .collect();
        if !missing_parts.is_empty() {
            return Err(MannequinError::config_invalid(format!(
                "'parts' is missing sprites for: {}",
                missing_parts.join(", ")
            )));
        }

        let mut anchors = HashMap::new();
        for (raw, pair) in &def.anchors {
            match AnchorKey::parse(raw) {
                Ok(key) => {
                    anchors.insert(
                        key,
                        AnchorPair {
                            parent: to_point(pair.parent),
                            child: to_point(pair.child),
                        },
                    );
                }
                Err(e) => tracing::warn!("ignoring anchor: {e}"),
            }
        }
        let missing_anchors: Vec<String> = REQUIRED_ANCHORS
            .iter()
            .filter(|k| !anchors.contains_key(k))
            .map(ToString::to_string)
            .collect();
        if !missing_anchors.is_empty() {
            return Err(MannequinError::config_invalid(format!(
                "'anchors' is missing: {}",
                missing_anchors.join(", ")
            )));
        }

        let mut tips = HashMap::new();
        for (name, pt) in &def.tip_lower {
            match name.parse::<Part>() {
                Ok(p) => {
                    tips.insert(p, to_point(*pt));
                }
                Err(e) => tracing::warn!("ignoring tip: {e}"),
            }
        }
        let missing_tips: Vec<&str> = TIP_PARTS
            .iter()
            .filter(|p| !tips.contains_key(p))
            .map(|p| p.name())
            .collect();
        if !missing_tips.is_empty() {
            return Err(MannequinError::config_invalid(format!(
                "'tip_lower' is missing: {}",
                missing_tips.join(", ")
            )));
        }

        if !def.options.bottom_margin_px.is_finite() {
            return Err(MannequinError::config_invalid(
                "'options.bottom_margin_px' must be finite",
            ));
        }
        if !def.background.blur.is_finite() || def.background.blur < 0.0 {
            return Err(MannequinError::config_invalid(
                "'background.blur' must be finite and >= 0",
            ));
        }

        Ok(Self {
            ref_size,
            parts,
            anchors,
            tips,
            options: def.options,
            background: def.background,
        })
    }

    /// Anchor pair for `key`; present for every key in [`REQUIRED_ANCHORS`].
    pub fn anchor(&self, key: AnchorKey) -> MannequinResult<AnchorPair> {
        self.anchors
            .get(&key)
            .copied()
            .ok_or_else(|| MannequinError::config_invalid(format!("anchor '{key}' is missing")))
    }

    /// Tip point for a lower-limb part.
    pub fn tip(&self, part: Part) -> MannequinResult<Point> {
        self.tips
            .get(&part)
            .copied()
            .ok_or_else(|| MannequinError::config_invalid(format!("tip for '{part}' is missing")))
    }
}

fn to_point(v: [f64; 2]) -> Point {
    Point::new(v[0], v[1])
}

#[cfg(test)]
#[path = "../../tests/unit/rig/descriptor.rs"]
mod tests;
