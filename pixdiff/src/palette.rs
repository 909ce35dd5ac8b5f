//! Color ramp for the diff overlay.
//!
//! Visible differences are painted along the hue wheel: the largest
//! differences come out red, and smaller ones move through yellow and green
//! toward blue-violet as they approach the visibility threshold.

use rgb::RGBA8;

use crate::consts::{DIFF_LIGHTNESS, DIFF_SATURATION};
use crate::raster::TRANSPARENT;
use crate::DiffParams;

/// Converts an HSL color to 8-bit RGB.
///
/// `h`, `s` and `l` are fractions in `[0, 1]`; hue wraps, the others are
/// clamped.
#[must_use]
pub fn hsl_to_rgb(h: f64, s: f64, l: f64) -> [u8; 3] {
    let h = h.rem_euclid(1.0);
    let s = s.clamp(0.0, 1.0);
    let l = l.clamp(0.0, 1.0);

    if s == 0.0 {
        let v = to_u8(l);
        return [v, v, v];
    }

    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;

    [
        to_u8(hue_to_channel(p, q, h + 1.0 / 3.0)),
        to_u8(hue_to_channel(p, q, h)),
        to_u8(hue_to_channel(p, q, h - 1.0 / 3.0)),
    ]
}

fn hue_to_channel(p: f64, q: f64, mut t: f64) -> f64 {
    if t < 0.0 {
        t += 1.0;
    }
    if t > 1.0 {
        t -= 1.0;
    }
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}

#[inline]
fn to_u8(v: f64) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Returns the overlay color for a weighted pixel difference.
///
/// Differences below the visibility threshold stay fully transparent;
/// everything else is opaque, with hue `(1 - diff) * hue_span`.
#[must_use]
pub fn diff_color(pixel_diff: f64, params: &DiffParams) -> RGBA8 {
    if pixel_diff < params.visibility_threshold() {
        return TRANSPARENT;
    }
    let hue = (1.0 - pixel_diff) * params.hue_span();
    let [r, g, b] = hsl_to_rgb(hue, DIFF_SATURATION, DIFF_LIGHTNESS);
    RGBA8::new(r, g, b, 255)
}
