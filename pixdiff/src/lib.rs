//! # pixdiff
//!
//! Pixel-difference scoring for CSS clone challenges. Two rasterized
//! elements (a contestant's recreation and the target design) are compared
//! pixel by pixel, producing a similarity score in `[0, 100]` and a
//! color-coded diff overlay.
//!
//! The metric is:
//! - Luma-weighted: per-channel differences use ITU-R BT.601 weights for
//!   R/G/B, with alpha weighted lightly (0.1)
//! - Noise-floored: sub-perceptual differences (< 0.005) add nothing to the
//!   total but still count as pixels
//! - Size tolerant: inputs of different sizes are compared over their
//!   bounding box, with missing pixels read as transparent black
//!
//! ## Score Tiers
//!
//! - Score >= 80: high
//! - Score 50-80: medium
//! - Score < 50: low
//!
//! ## Example
//!
//! ```rust
//! use pixdiff::{compare, RasterBuffer, RGBA8};
//!
//! let target = RasterBuffer::filled(4, 4, RGBA8::new(30, 144, 255, 255));
//! let candidate = target.clone();
//!
//! let result = compare(&candidate, &target);
//! assert_eq!(result.score, 100.0);
//! assert_eq!(result.visible_pixels, 0);
//! ```
//!
//! ## Features
//!
//! - **`serde`**: `Serialize`/`Deserialize` for [`DiffParams`] and
//!   [`ChannelWeights`]

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::similar_names)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]

pub mod consts;
mod diff;
pub mod palette;
mod raster;
pub mod session;

pub use diff::pixel_difference;
pub use raster::{RasterBuffer, BYTES_PER_PIXEL, TRANSPARENT};
pub use session::ComparisonSession;

// Re-export imgref and rgb types for convenience
pub use imgref::{Img, ImgRef, ImgVec};
pub use rgb::RGBA8;

use crate::consts::{
    HUE_SPAN, NOISE_FLOOR, TIER_HIGH_MIN, TIER_MEDIUM_MIN, VISIBILITY_THRESHOLD, WEIGHT_A,
    WEIGHT_B, WEIGHT_G, WEIGHT_R,
};

/// Error type for pixdiff operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum PixelDiffError {
    /// Pixel buffer length doesn't match `width * height * 4`.
    #[error("invalid buffer for {width}x{height} image: expected {expected} bytes, got {actual}")]
    InvalidBuffer {
        /// Declared width.
        width: usize,
        /// Declared height.
        height: usize,
        /// Required byte length.
        expected: usize,
        /// Actual byte length.
        actual: usize,
    },
    /// `width * height * 4` doesn't fit in `usize`.
    #[error("image dimensions overflow: {width}x{height}")]
    DimensionOverflow {
        /// Declared width.
        width: usize,
        /// Declared height.
        height: usize,
    },
    /// A tunable is out of range or not finite.
    #[error("invalid parameter {name}: {value}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Rejected value.
        value: f64,
    },
}

/// Per-channel weights for the perceptual difference.
///
/// Defaults are the BT.601 luma coefficients plus a light alpha weight.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
pub struct ChannelWeights {
    /// Red weight.
    pub r: f64,
    /// Green weight.
    pub g: f64,
    /// Blue weight.
    pub b: f64,
    /// Alpha weight.
    pub a: f64,
}

impl Default for ChannelWeights {
    fn default() -> Self {
        Self {
            r: WEIGHT_R,
            g: WEIGHT_G,
            b: WEIGHT_B,
            a: WEIGHT_A,
        }
    }
}

impl ChannelWeights {
    /// Creates weights from explicit values.
    #[must_use]
    pub const fn new(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }

    /// Sum of all four weights (the normalizer divided by 255).
    #[inline]
    #[must_use]
    pub fn sum(&self) -> f64 {
        self.r + self.g + self.b + self.a
    }

    fn validate(&self) -> Result<(), PixelDiffError> {
        for (name, value) in [
            ("weights.r", self.r),
            ("weights.g", self.g),
            ("weights.b", self.b),
            ("weights.a", self.a),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(PixelDiffError::InvalidParameter { name, value });
            }
        }
        let sum = self.sum();
        if sum <= 0.0 || !sum.is_finite() {
            return Err(PixelDiffError::InvalidParameter {
                name: "weights",
                value: sum,
            });
        }
        Ok(())
    }
}

/// Pixel-difference comparison parameters.
///
/// Use the builder pattern to construct:
/// ```rust
/// use pixdiff::{ChannelWeights, DiffParams};
///
/// let params = DiffParams::new()
///     .with_noise_floor(0.002)            // count fainter differences
///     .with_visibility_threshold(0.05)    // only paint obvious ones
///     .with_weights(ChannelWeights::new(1.0, 1.0, 1.0, 0.0));
/// assert!(params.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
pub struct DiffParams {
    weights: ChannelWeights,
    noise_floor: f64,
    visibility_threshold: f64,
    hue_span: f64,
}

impl Default for DiffParams {
    fn default() -> Self {
        Self {
            weights: ChannelWeights::default(),
            noise_floor: NOISE_FLOOR,
            visibility_threshold: VISIBILITY_THRESHOLD,
            hue_span: HUE_SPAN,
        }
    }
}

impl DiffParams {
    /// Creates a new `DiffParams` with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the channel weights.
    #[must_use]
    pub fn with_weights(mut self, weights: ChannelWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Sets the noise floor. Differences below it add nothing to the total.
    #[must_use]
    pub fn with_noise_floor(mut self, noise_floor: f64) -> Self {
        self.noise_floor = noise_floor;
        self
    }

    /// Sets the visibility threshold. Differences below it stay transparent
    /// in the diff image.
    #[must_use]
    pub fn with_visibility_threshold(mut self, visibility_threshold: f64) -> Self {
        self.visibility_threshold = visibility_threshold;
        self
    }

    /// Sets the fraction of the hue wheel used by the diff ramp.
    #[must_use]
    pub fn with_hue_span(mut self, hue_span: f64) -> Self {
        self.hue_span = hue_span;
        self
    }

    /// Returns the channel weights.
    #[must_use]
    pub fn weights(&self) -> &ChannelWeights {
        &self.weights
    }

    /// Returns the noise floor.
    #[must_use]
    pub fn noise_floor(&self) -> f64 {
        self.noise_floor
    }

    /// Returns the visibility threshold.
    #[must_use]
    pub fn visibility_threshold(&self) -> f64 {
        self.visibility_threshold
    }

    /// Returns the hue span.
    #[must_use]
    pub fn hue_span(&self) -> f64 {
        self.hue_span
    }

    /// Checks that every parameter is finite and in range.
    ///
    /// # Errors
    /// Returns [`PixelDiffError::InvalidParameter`] naming the first bad value.
    pub fn validate(&self) -> Result<(), PixelDiffError> {
        self.weights.validate()?;
        for (name, value) in [
            ("noise_floor", self.noise_floor),
            ("visibility_threshold", self.visibility_threshold),
            ("hue_span", self.hue_span),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(PixelDiffError::InvalidParameter { name, value });
            }
        }
        Ok(())
    }
}

/// Display tier for a similarity score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScoreTier {
    /// Score >= 80.
    High,
    /// 50 <= score < 80.
    Medium,
    /// Score < 50.
    Low,
}

impl ScoreTier {
    /// Buckets a score.
    #[must_use]
    pub fn from_score(score: f64) -> Self {
        if score >= TIER_HIGH_MIN {
            Self::High
        } else if score >= TIER_MEDIUM_MIN {
            Self::Medium
        } else {
            Self::Low
        }
    }

    /// Lowercase label used by badges and JSON output.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

impl std::fmt::Display for ScoreTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Pixel-difference comparison result.
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonResult {
    /// Similarity score in `[0, 100]`. 100 means identical.
    pub score: f64,
    /// Color-coded overlay sized to the bounding box of both inputs.
    pub diff_image: RasterBuffer,
    /// Number of opaque (visibly different) pixels in `diff_image`.
    pub visible_pixels: usize,
}

impl ComparisonResult {
    /// Display tier for this score.
    #[must_use]
    pub fn tier(&self) -> ScoreTier {
        ScoreTier::from_score(self.score)
    }
}

/// Compares two buffers with default parameters.
///
/// Buffers are validated at construction and the default parameters are
/// always valid, so the only failure left is the bounding box itself.
///
/// # Panics
/// Panics if `max(w1, w2) * max(h1, h2) * 4` overflows `usize`. Only
/// zero-area buffers with huge declared sizes get there; use
/// [`compare_with_params`] to receive [`PixelDiffError::DimensionOverflow`]
/// instead.
///
/// # Example
/// ```rust
/// use pixdiff::{compare, RasterBuffer, RGBA8};
///
/// let white = RasterBuffer::filled(1, 1, RGBA8::new(255, 255, 255, 255));
/// let black = RasterBuffer::filled(1, 1, RGBA8::new(0, 0, 0, 255));
///
/// let result = compare(&white, &black);
/// assert!((result.score - 9.0909).abs() < 1e-3);
/// ```
#[must_use]
pub fn compare(a: &RasterBuffer, b: &RasterBuffer) -> ComparisonResult {
    diff::compare_impl(a, b, &DiffParams::default()).expect("bounding box overflows usize")
}

/// Compares two buffers with custom parameters.
///
/// # Errors
/// - [`PixelDiffError::InvalidParameter`] if `params` fails validation
/// - [`PixelDiffError::DimensionOverflow`] if the bounding box of `a` and `b`
///   overflows `usize`
pub fn compare_with_params(
    a: &RasterBuffer,
    b: &RasterBuffer,
    params: &DiffParams,
) -> Result<ComparisonResult, PixelDiffError> {
    params.validate()?;
    diff::compare_impl(a, b, params)
}

/// Compares two raw interleaved RGBA slices.
///
/// # Arguments
/// * `rgba1` - First image (4 bytes per pixel, row-major)
/// * `rgba2` - Second image (4 bytes per pixel, row-major)
/// * `params` - Comparison parameters
///
/// # Errors
/// Returns an error if:
/// - Either slice's length doesn't match its dimensions
/// - `params` fails validation
/// - The bounding box of both images overflows `usize`
pub fn compare_rgba(
    rgba1: &[u8],
    (w1, h1): (usize, usize),
    rgba2: &[u8],
    (w2, h2): (usize, usize),
    params: &DiffParams,
) -> Result<ComparisonResult, PixelDiffError> {
    let a = RasterBuffer::from_slice(w1, h1, rgba1)?;
    let b = RasterBuffer::from_slice(w2, h2, rgba2)?;
    compare_with_params(&a, &b, params)
}
