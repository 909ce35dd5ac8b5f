//! Default tunables for the pixel-difference kernel.
//!
//! These are the values the scoring tool ships with. All of them can be
//! overridden through [`DiffParams`](crate::DiffParams).

// ============================================================================
// Channel Weights
// ============================================================================

/// Red weight (ITU-R BT.601 luma coefficient).
pub const WEIGHT_R: f64 = 0.299;
/// Green weight (ITU-R BT.601 luma coefficient).
pub const WEIGHT_G: f64 = 0.587;
/// Blue weight (ITU-R BT.601 luma coefficient).
pub const WEIGHT_B: f64 = 0.114;
/// Alpha weight. Kept low so antialiasing and soft shadows barely register.
pub const WEIGHT_A: f64 = 0.1;

/// Largest value a single 8-bit channel difference can take.
pub const CHANNEL_MAX: f64 = 255.0;

// ============================================================================
// Thresholds
// ============================================================================

/// Weighted differences strictly below this are treated as sub-perceptual
/// noise and contribute nothing to the total.
pub const NOISE_FLOOR: f64 = 0.005;

/// Weighted differences strictly below this leave the diff pixel transparent.
pub const VISIBILITY_THRESHOLD: f64 = 0.01;

// ============================================================================
// Visualization
// ============================================================================

/// Fraction of the hue wheel used by the diff ramp.
///
/// A difference of 1.0 maps to hue 0 (red); a difference near zero maps to
/// `HUE_SPAN` (~252 degrees, blue-violet).
pub const HUE_SPAN: f64 = 0.7;

/// Saturation of diff pixels.
pub const DIFF_SATURATION: f64 = 1.0;

/// Lightness of diff pixels.
pub const DIFF_LIGHTNESS: f64 = 0.5;

// ============================================================================
// Score Tiers
// ============================================================================

/// Lowest score rendered with the "high" badge.
pub const TIER_HIGH_MIN: f64 = 80.0;

/// Lowest score rendered with the "medium" badge.
pub const TIER_MEDIUM_MIN: f64 = 50.0;

/// Maximum similarity score.
pub const SCORE_MAX: f64 = 100.0;
