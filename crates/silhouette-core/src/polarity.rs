//! Object/background polarity of a silhouette raster.

use crate::GrayImageView;
use serde::{Deserialize, Serialize};

/// Intensity that separates "light" from "dark" backgrounds.
pub const DEFAULT_POLARITY_SPLIT: f64 = 127.0;

/// Whether the object is darker or lighter than its background.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Polarity {
    /// Light background, dark object.
    LightBackground,
    /// Dark background, light object.
    DarkBackground,
}

/// Which pixels vote on the polarity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolarityRule {
    /// Mean of the whole raster.
    #[default]
    GlobalMean,
    /// Mean of the outermost one-pixel ring only. Useful when the object
    /// covers most of the frame and would otherwise dominate the mean.
    BorderMean,
}

impl Polarity {
    /// `mean > split` means light background.
    pub fn from_mean(mean: f64, split: f64) -> Self {
        if mean > split {
            Polarity::LightBackground
        } else {
            Polarity::DarkBackground
        }
    }

    /// Estimate the polarity of `img`; also returns the mean that decided it.
    pub fn estimate(img: &GrayImageView<'_>, rule: PolarityRule, split: f64) -> (Self, f64) {
        let mean = match rule {
            PolarityRule::GlobalMean => img.mean_intensity(),
            PolarityRule::BorderMean => border_mean(img),
        };
        (Self::from_mean(mean, split), mean)
    }

    /// Value used to fill pixels exposed by rotation or padding, so they
    /// binarize as background.
    pub fn border_value(self) -> u8 {
        match self {
            Polarity::LightBackground => 255,
            Polarity::DarkBackground => 0,
        }
    }
}

/// Mean intensity of the outermost pixel ring.
pub fn border_mean(img: &GrayImageView<'_>) -> f64 {
    let (w, h) = (img.width, img.height);
    if w == 0 || h == 0 {
        return 0.0;
    }
    let mut sum = 0u64;
    let mut count = 0u64;
    for y in 0..h {
        for x in 0..w {
            if x == 0 || y == 0 || x + 1 == w || y + 1 == h {
                sum += img.data[y * w + x] as u64;
                count += 1;
            }
        }
    }
    sum as f64 / count as f64
}
