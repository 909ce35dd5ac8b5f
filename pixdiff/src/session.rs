//! Caller-owned comparison state.
//!
//! A scoring UI typically re-runs the comparison on a timer and on demand.
//! [`ComparisonSession`] keeps the target image and parameters together and
//! carries an in-flight flag so overlapping triggers are dropped instead of
//! stacking up.
//!
//! # Example
//!
//! ```
//! use pixdiff::{ComparisonSession, DiffParams, RasterBuffer, RGBA8};
//!
//! let target = RasterBuffer::filled(8, 8, RGBA8::new(255, 0, 0, 255));
//! let session = ComparisonSession::new(target, DiffParams::default())
//!     .expect("valid params");
//!
//! // Each tick compares the latest capture against the same target.
//! for shade in [200u8, 230, 255] {
//!     let capture = RasterBuffer::filled(8, 8, RGBA8::new(shade, 0, 0, 255));
//!     if let Some(result) = session.try_compare(&capture) {
//!         println!("shade {shade}: {:.1}%", result.score);
//!     }
//! }
//! ```

use std::sync::atomic::{AtomicBool, Ordering};

use log::trace;

use crate::diff::compare_impl;
use crate::raster::RasterBuffer;
use crate::{ComparisonResult, DiffParams, PixelDiffError};

/// Target image, parameters, and an in-flight guard.
///
/// The session is `Sync`; share it behind an `Arc` when triggers come from
/// several threads.
#[derive(Debug)]
pub struct ComparisonSession {
    target: RasterBuffer,
    params: DiffParams,
    in_flight: AtomicBool,
}

/// Clears the in-flight flag when dropped, including during unwinding.
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl ComparisonSession {
    /// Creates a session for `target`.
    ///
    /// # Errors
    /// Returns [`PixelDiffError::InvalidParameter`] if `params` fails validation.
    pub fn new(target: RasterBuffer, params: DiffParams) -> Result<Self, PixelDiffError> {
        params.validate()?;
        Ok(Self {
            target,
            params,
            in_flight: AtomicBool::new(false),
        })
    }

    /// The image candidates are scored against.
    #[must_use]
    pub fn target(&self) -> &RasterBuffer {
        &self.target
    }

    /// Parameters used for every comparison.
    #[must_use]
    pub fn params(&self) -> &DiffParams {
        &self.params
    }

    /// True while a [`try_compare`](Self::try_compare) pass is running.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Compares `candidate` against the target, ignoring the guard.
    ///
    /// # Panics
    /// Panics if the bounding box of `candidate` and the target overflows
    /// `usize`, like [`compare`](crate::compare).
    #[must_use]
    pub fn compare(&self, candidate: &RasterBuffer) -> ComparisonResult {
        compare_impl(candidate, &self.target, &self.params)
            .expect("bounding box overflows usize")
    }

    /// Compares `candidate` against the target unless another pass is
    /// already running, in which case it returns `None` immediately.
    ///
    /// # Panics
    /// Same as [`compare`](Self::compare). The guard is still released.
    #[must_use]
    pub fn try_compare(&self, candidate: &RasterBuffer) -> Option<ComparisonResult> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            trace!("comparison already in flight, skipping");
            return None;
        }
        let _guard = InFlight(&self.in_flight);
        Some(self.compare(candidate))
    }
}
