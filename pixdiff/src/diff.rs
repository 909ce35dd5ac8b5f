//! Pixel-difference kernel.
//!
//! Walks the bounding box of both inputs once, accumulating a luma-weighted
//! per-pixel distance into a global score and painting the diff overlay in
//! the same pass.

use log::debug;
use rgb::RGBA8;

use crate::consts::{CHANNEL_MAX, SCORE_MAX};
use crate::palette::diff_color;
use crate::raster::{byte_len, RasterBuffer, BYTES_PER_PIXEL};
use crate::{ChannelWeights, ComparisonResult, DiffParams, PixelDiffError};

/// Weighted distance between two pixels, normalized to `[0, 1]`.
///
/// Each channel's absolute difference is scaled by its weight and the sum is
/// divided by `255 * (wr + wg + wb + wa)`, so two pixels that differ by 255
/// in every channel score exactly 1.0.
#[inline]
#[must_use]
pub fn pixel_difference(p1: RGBA8, p2: RGBA8, weights: &ChannelWeights) -> f64 {
    let dr = f64::from(p1.r.abs_diff(p2.r));
    let dg = f64::from(p1.g.abs_diff(p2.g));
    let db = f64::from(p1.b.abs_diff(p2.b));
    let da = f64::from(p1.a.abs_diff(p2.a));

    let weighted = dr * weights.r + dg * weights.g + db * weights.b + da * weights.a;
    (weighted / (CHANNEL_MAX * weights.sum())).clamp(0.0, 1.0)
}

/// Converts accumulated difference into a similarity score.
///
/// An empty grid scores 0 rather than dividing by zero.
#[inline]
pub(crate) fn score_from_total(total_diff: f64, total_pixels: usize) -> f64 {
    if total_pixels == 0 {
        return 0.0;
    }
    ((1.0 - total_diff / total_pixels as f64) * SCORE_MAX).clamp(0.0, SCORE_MAX)
}

/// Runs the kernel. Parameters must already be validated.
///
/// Fails only when the bounding box of two zero-area inputs is too large to
/// address.
pub(crate) fn compare_impl(
    a: &RasterBuffer,
    b: &RasterBuffer,
    params: &DiffParams,
) -> Result<ComparisonResult, PixelDiffError> {
    let width = a.width().max(b.width());
    let height = a.height().max(b.height());
    // Each input was checked on construction, the box was not.
    let total_pixels = byte_len(width, height)
        .ok_or(PixelDiffError::DimensionOverflow { width, height })?
        / BYTES_PER_PIXEL;

    let weights = params.weights();
    let noise_floor = params.noise_floor();

    let mut diff_image = RasterBuffer::transparent(width, height);
    let mut total_diff = 0.0f64;
    let mut counted = 0usize;
    let mut visible = 0usize;

    for y in 0..height {
        for x in 0..width {
            let p1 = a.pixel_or_transparent(x, y);
            let p2 = b.pixel_or_transparent(x, y);
            let d = pixel_difference(p1, p2, weights);

            // Sub-floor pixels still count in the denominator.
            if d >= noise_floor {
                total_diff += d;
                counted += 1;
            }

            let color = diff_color(d, params);
            if color.a != 0 {
                diff_image.set_pixel(x, y, color);
                visible += 1;
            }
        }
    }

    let score = score_from_total(total_diff, total_pixels);

    debug!(
        "compared {}x{} vs {}x{} over {width}x{height}: score={score:.4} counted={counted} visible={visible}",
        a.width(),
        a.height(),
        b.width(),
        b.height(),
    );

    Ok(ComparisonResult {
        score,
        diff_image,
        visible_pixels: visible,
    })
}
