use serde::{Deserialize, Serialize};
use silhouette_core::{PolarityRule, DEFAULT_POLARITY_SPLIT};

/// Thresholding and polarity configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BinarizeParams {
    /// Fixed gray-level threshold. Dark-background rasters keep `v > threshold`,
    /// light-background rasters keep `v <= threshold`.
    pub threshold: u8,
    /// Mean intensity above which the background counts as light.
    pub polarity_split: f64,
    /// Which pixels decide the polarity.
    pub polarity_rule: PolarityRule,
}

impl Default for BinarizeParams {
    fn default() -> Self {
        Self {
            threshold: 127,
            polarity_split: DEFAULT_POLARITY_SPLIT,
            polarity_rule: PolarityRule::GlobalMean,
        }
    }
}

/// Candidate filtering.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContourParams {
    /// Candidates must be strictly larger than this fraction of the image.
    pub min_area_frac: f64,
    /// Candidates must be strictly smaller than this fraction of the image.
    pub max_area_frac: f64,
}

impl Default for ContourParams {
    fn default() -> Self {
        Self {
            min_area_frac: 0.01,
            max_area_frac: 0.95,
        }
    }
}

/// Harris corner response and peak picking.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarrisParams {
    /// Standard deviation of the Gaussian structure-tensor window.
    pub sigma: f32,
    /// Harris sensitivity `k` in `det - k * trace^2`.
    pub k: f32,
    /// Peak suppression radius and border exclusion, in pixels.
    pub min_distance: usize,
    /// Peaks must exceed `threshold_rel * max_response`.
    pub threshold_rel: f32,
}

impl Default for HarrisParams {
    fn default() -> Self {
        Self {
            sigma: 1.5,
            k: 0.04,
            min_distance: 5,
            threshold_rel: 0.05,
        }
    }
}

/// Everything the describe pipeline needs.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureParams {
    pub binarize: BinarizeParams,
    pub contour: ContourParams,
    pub harris: HarrisParams,
}
