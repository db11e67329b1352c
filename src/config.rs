// THEORY:
// Every tunable of the engine lives here, in one structure with documented
// defaults, instead of being scattered through the pipeline code as literals.
//
// Layering:
// 1.  `Default` impls carry the reference values.
// 2.  An optional TOML file overrides any subset of keys; unset keys keep their
//     defaults (each file struct mirrors the runtime struct with `Option`s).
// 3.  Command-line flags override the file for the common knobs (see `main.rs`).
//
// `validate` runs after layering and rejects combinations the pipelines cannot
// honour (even blur kernels, inverted bounds, zero widths).

use crate::core_modules::mask::HsvRange;
use crate::core_modules::pixel::pixel::Hsv;
use crate::error::{Result, VisionError};
use serde::Deserialize;
use std::path::Path;

/// Frame-differencing motion detector settings.
#[derive(Debug, Clone, PartialEq)]
pub struct MotionConfig {
    /// Canonical working width in pixels.
    pub frame_width: u32,
    /// Odd Gaussian kernel size.
    pub blur_kernel: u32,
    /// Minimum absolute intensity difference for a pixel to count as changed.
    pub diff_threshold: u8,
    pub dilate_iterations: u8,
    /// Minimum contour area (px²) for a region to count as motion.
    pub min_area: f64,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            frame_width: 500,
            blur_kernel: 21,
            diff_threshold: 25,
            dilate_iterations: 2,
            min_area: 500.0,
        }
    }
}

/// Colour-segmentation tracker settings.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackingConfig {
    pub frame_width: u32,
    pub blur_kernel: u32,
    pub erode_iterations: u8,
    pub dilate_iterations: u8,
    /// Enclosing radius at or below which an object is too small to act on.
    pub min_radius: f64,
    pub range: HsvRange,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            frame_width: 900,
            blur_kernel: 11,
            erode_iterations: 2,
            dilate_iterations: 2,
            min_radius: 10.0,
            range: HsvRange::default(),
        }
    }
}

/// Direction decision table settings. Bounds are expressed against
/// `reference_width` and scaled to the actual frame width when
/// `scale_with_width` is set.
#[derive(Debug, Clone, PartialEq)]
pub struct PolicyConfig {
    pub stop_radius: f64,
    pub left_bound: f64,
    pub right_bound: f64,
    pub reference_width: u32,
    pub scale_with_width: bool,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            stop_radius: 250.0,
            left_bound: 150.0,
            right_bound: 450.0,
            reference_width: 900,
            scale_with_width: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct VisionConfig {
    pub motion: MotionConfig,
    pub tracking: TrackingConfig,
    pub policy: PolicyConfig,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct VisionConfigFile {
    motion: Option<MotionConfigFile>,
    tracking: Option<TrackingConfigFile>,
    policy: Option<PolicyConfigFile>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct MotionConfigFile {
    frame_width: Option<u32>,
    blur_kernel: Option<u32>,
    diff_threshold: Option<u8>,
    dilate_iterations: Option<u8>,
    min_area: Option<f64>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct TrackingConfigFile {
    frame_width: Option<u32>,
    blur_kernel: Option<u32>,
    erode_iterations: Option<u8>,
    dilate_iterations: Option<u8>,
    min_radius: Option<f64>,
    lower: Option<[u8; 3]>,
    upper: Option<[u8; 3]>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct PolicyConfigFile {
    stop_radius: Option<f64>,
    left_bound: Option<f64>,
    right_bound: Option<f64>,
    reference_width: Option<u32>,
    scale_with_width: Option<bool>,
}

impl VisionConfig {
    /// Loads a TOML file on top of the defaults and validates the result.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&raw)?;
        log::debug!("loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let file: VisionConfigFile = toml::from_str(raw)?;
        let mut config = VisionConfig::default();

        if let Some(motion) = file.motion {
            let target = &mut config.motion;
            target.frame_width = motion.frame_width.unwrap_or(target.frame_width);
            target.blur_kernel = motion.blur_kernel.unwrap_or(target.blur_kernel);
            target.diff_threshold = motion.diff_threshold.unwrap_or(target.diff_threshold);
            target.dilate_iterations = motion.dilate_iterations.unwrap_or(target.dilate_iterations);
            target.min_area = motion.min_area.unwrap_or(target.min_area);
        }

        if let Some(tracking) = file.tracking {
            let target = &mut config.tracking;
            target.frame_width = tracking.frame_width.unwrap_or(target.frame_width);
            target.blur_kernel = tracking.blur_kernel.unwrap_or(target.blur_kernel);
            target.erode_iterations = tracking.erode_iterations.unwrap_or(target.erode_iterations);
            target.dilate_iterations = tracking.dilate_iterations.unwrap_or(target.dilate_iterations);
            target.min_radius = tracking.min_radius.unwrap_or(target.min_radius);
            if let Some([h, s, v]) = tracking.lower {
                target.range.lower = Hsv::new(h, s, v);
            }
            if let Some([h, s, v]) = tracking.upper {
                target.range.upper = Hsv::new(h, s, v);
            }
        }

        if let Some(policy) = file.policy {
            let target = &mut config.policy;
            target.stop_radius = policy.stop_radius.unwrap_or(target.stop_radius);
            target.left_bound = policy.left_bound.unwrap_or(target.left_bound);
            target.right_bound = policy.right_bound.unwrap_or(target.right_bound);
            target.reference_width = policy.reference_width.unwrap_or(target.reference_width);
            target.scale_with_width = policy.scale_with_width.unwrap_or(target.scale_with_width);
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        validate_kernel("motion.blur_kernel", self.motion.blur_kernel)?;
        validate_kernel("tracking.blur_kernel", self.tracking.blur_kernel)?;
        validate_width("motion.frame_width", self.motion.frame_width)?;
        validate_width("tracking.frame_width", self.tracking.frame_width)?;
        validate_width("policy.reference_width", self.policy.reference_width)?;
        if self.motion.min_area < 0.0 {
            return Err(VisionError::Config("motion.min_area must not be negative".into()));
        }
        if self.tracking.min_radius < 0.0 {
            return Err(VisionError::Config("tracking.min_radius must not be negative".into()));
        }
        if self.policy.left_bound >= self.policy.right_bound {
            return Err(VisionError::Config(format!(
                "policy.left_bound ({}) must be below policy.right_bound ({})",
                self.policy.left_bound, self.policy.right_bound
            )));
        }
        self.tracking.range.validate()
    }
}

fn validate_kernel(name: &str, kernel: u32) -> Result<()> {
    if kernel == 0 || kernel % 2 == 0 {
        return Err(VisionError::Config(format!("{name} must be a positive odd number, got {kernel}")));
    }
    Ok(())
}

fn validate_width(name: &str, width: u32) -> Result<()> {
    if width == 0 {
        return Err(VisionError::Config(format!("{name} must be positive")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = VisionConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.motion.frame_width, 500);
        assert_eq!(config.motion.diff_threshold, 25);
        assert_eq!(config.tracking.frame_width, 900);
        assert_eq!(config.policy.stop_radius, 250.0);
    }

    #[test]
    fn empty_file_keeps_defaults() {
        assert_eq!(VisionConfig::from_toml_str("").unwrap(), VisionConfig::default());
    }

    #[test]
    fn partial_file_overrides_only_given_keys() {
        let raw = r#"
            [motion]
            min_area = 1200.0

            [tracking]
            lower = [29, 86, 6]
            upper = [64, 255, 255]

            [policy]
            scale_with_width = false
        "#;
        let config = VisionConfig::from_toml_str(raw).unwrap();
        assert_eq!(config.motion.min_area, 1200.0);
        assert_eq!(config.motion.blur_kernel, 21);
        assert_eq!(config.tracking.range.lower, Hsv::new(29, 86, 6));
        assert_eq!(config.tracking.range.upper, Hsv::new(64, 255, 255));
        assert!(!config.policy.scale_with_width);
        assert_eq!(config.policy.left_bound, 150.0);
    }

    #[test]
    fn even_kernels_are_rejected() {
        let err = VisionConfig::from_toml_str("[motion]\nblur_kernel = 20\n").unwrap_err();
        assert!(matches!(err, VisionError::Config(_)));
    }

    #[test]
    fn inverted_bounds_are_rejected() {
        assert!(VisionConfig::from_toml_str("[policy]\nleft_bound = 500.0\n").is_err());
        assert!(VisionConfig::from_toml_str("[tracking]\nlower = [130, 100, 100]\n").is_err());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = VisionConfig::from_toml_str("[motion]\nthreshhold = 3\n").unwrap_err();
        assert!(matches!(err, VisionError::Toml(_)));
    }
}
