//! Shared image generation functions for pixdiff tests.
//!
//! These produce deterministic synthetic RGBA images using an LCG PRNG.

#![allow(dead_code)]

use pixdiff::{RasterBuffer, RGBA8};

// ============================================================================
// LCG PRNG
// ============================================================================

/// LCG pseudo-random number generator (deterministic)
pub struct Lcg {
    state: u64,
}

impl Lcg {
    pub const fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    pub fn next_u8(&mut self) -> u8 {
        self.state = self
            .state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        ((self.state >> 33) & 0xFF) as u8
    }
}

// ============================================================================
// Image Generation Functions
// ============================================================================

/// Uniform color image.
pub fn gen_uniform(width: usize, height: usize, r: u8, g: u8, b: u8, a: u8) -> RasterBuffer {
    RasterBuffer::filled(width, height, RGBA8::new(r, g, b, a))
}

/// Opaque horizontal grayscale gradient.
pub fn gen_gradient_h(width: usize, height: usize) -> RasterBuffer {
    let mut data = Vec::with_capacity(width * height * 4);
    for _y in 0..height {
        for x in 0..width {
            let v = if width > 1 {
                (x * 255 / (width - 1)) as u8
            } else {
                128
            };
            data.extend_from_slice(&[v, v, v, 255]);
        }
    }
    RasterBuffer::new(width, height, data).expect("generator length")
}

/// Random RGBA noise.
pub fn gen_random(width: usize, height: usize, seed: u64) -> RasterBuffer {
    let mut rng = Lcg::new(seed);
    let data = (0..width * height * 4).map(|_| rng.next_u8()).collect();
    RasterBuffer::new(width, height, data).expect("generator length")
}

/// Page-like image: light background with a dark "button" rectangle.
pub fn gen_card(width: usize, height: usize, offset: usize) -> RasterBuffer {
    let mut data = Vec::with_capacity(width * height * 4);
    for y in 0..height {
        for x in 0..width {
            let inside = x >= width / 4 + offset
                && x < width * 3 / 4 + offset
                && y >= height / 3
                && y < height * 2 / 3;
            if inside {
                data.extend_from_slice(&[30, 60, 200, 255]);
            } else {
                data.extend_from_slice(&[245, 245, 245, 255]);
            }
        }
    }
    RasterBuffer::new(width, height, data).expect("generator length")
}

/// Adds `delta` to every channel of one pixel, saturating.
pub fn bump_pixel(img: &RasterBuffer, x: usize, y: usize, delta: [u8; 4]) -> RasterBuffer {
    let mut data = img.as_bytes().to_vec();
    let i = (y * img.width() + x) * 4;
    for c in 0..4 {
        data[i + c] = data[i + c].saturating_add(delta[c]);
    }
    RasterBuffer::new(img.width(), img.height(), data).expect("same length")
}
