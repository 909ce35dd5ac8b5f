//! Config file loading and parameter layering.
//!
//! Parameters come from three places, later ones winning: built-in
//! defaults, an optional TOML file, then command-line flags.
//!
//! ```toml
//! min_score = 85.0
//!
//! [params]
//! noise_floor = 0.004
//! visibility_threshold = 0.02
//!
//! [params.weights]
//! a = 0.0
//! ```

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use pixdiff::{ChannelWeights, DiffParams};
use serde::Deserialize;

/// Contents of a config file. Every field is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    /// Minimum acceptable score.
    pub min_score: Option<f64>,
    /// Kernel tunables. Missing fields keep their defaults.
    pub params: DiffParams,
}

impl FileConfig {
    /// Reads and parses a TOML config file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file '{}'", path.display()))?;
        Self::parse(&text)
            .with_context(|| format!("failed to parse config file '{}'", path.display()))
    }

    /// Parses TOML text.
    pub fn parse(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }
}

/// Parameter overrides taken from the command line.
#[derive(Debug, Default, Clone)]
pub struct ParamOverrides {
    pub noise_floor: Option<f64>,
    pub visibility_threshold: Option<f64>,
    pub hue_span: Option<f64>,
    pub weights: Option<Vec<f64>>,
}

impl ParamOverrides {
    /// Applies the overrides on top of `base` and validates the result.
    pub fn apply(&self, base: DiffParams) -> Result<DiffParams> {
        let mut params = base;
        if let Some(v) = self.noise_floor {
            params = params.with_noise_floor(v);
        }
        if let Some(v) = self.visibility_threshold {
            params = params.with_visibility_threshold(v);
        }
        if let Some(v) = self.hue_span {
            params = params.with_hue_span(v);
        }
        if let Some(w) = &self.weights {
            let &[r, g, b, a] = w.as_slice() else {
                bail!("--weights needs exactly 4 values (r,g,b,a), got {}", w.len());
            };
            params = params.with_weights(ChannelWeights::new(r, g, b, a));
        }
        params.validate()?;
        Ok(params)
    }
}
