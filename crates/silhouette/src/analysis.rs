//! One image end to end: describe, transform, compare.

use serde::{Deserialize, Serialize};
use silhouette_core::{BoundingBox, GrayImage, ImageError, RgbImage};
use silhouette_features::{
    describe_raster, Binarization, BinarizationStats, DescriptorVector, FeatureParams, Selection,
    ShapeFeatures,
};
use silhouette_robustness::{compare, generate_transforms_with, DistanceReport, TransformBattery};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Errors produced by the end-to-end helpers.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    #[error("no foreground contour found in {width}x{height} image")]
    NoContourFound { width: usize, height: usize },

    #[error(transparent)]
    Image(#[from] ImageError),
}

/// Top-level configuration, loadable from JSON.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisParams {
    pub features: FeatureParams,
}

/// Every intermediate a renderer may want to draw.
#[derive(Clone, Debug)]
pub struct ShapeAnalysis {
    pub gray: GrayImage,
    /// Display copy, never read by the analysis.
    pub color: Option<RgbImage>,
    pub binarization: Binarization,
    pub features: ShapeFeatures,
    pub battery: TransformBattery,
    pub distances: DistanceReport,
}

/// Serializable digest of a [`ShapeAnalysis`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSummary {
    pub width: usize,
    pub height: usize,
    pub binarization: BinarizationStats,
    pub selection: Selection,
    pub candidate_count: usize,
    pub area: f64,
    pub perimeter: f64,
    pub bbox: BoundingBox,
    pub hull_area: f64,
    pub descriptors: DescriptorVector,
    /// Harris peaks as `(row, col)`.
    pub corners: Vec<(usize, usize)>,
    pub distances: DistanceReport,
}

impl ShapeAnalysis {
    pub fn descriptors(&self) -> &DescriptorVector {
        &self.features.descriptors
    }

    pub fn selection(&self) -> Selection {
        self.features.main.selection
    }

    pub fn summary(&self) -> AnalysisSummary {
        let m = &self.features.main.metrics;
        AnalysisSummary {
            width: self.gray.width,
            height: self.gray.height,
            binarization: self.binarization.stats(),
            selection: self.selection(),
            candidate_count: self.features.main.candidate_count(),
            area: m.area,
            perimeter: m.perimeter,
            bbox: m.bbox,
            hull_area: m.hull_area,
            descriptors: self.features.descriptors,
            corners: self.features.corners.points.clone(),
            distances: self.distances.clone(),
        }
    }
}

/// Run the full pipeline on one grayscale raster.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "info", skip(img, params), fields(width = img.width, height = img.height))
)]
pub fn analyze(img: &GrayImage, params: &AnalysisParams) -> Result<ShapeAnalysis, AnalysisError> {
    analyze_with_color(img.clone(), None, params)
}

/// Like [`analyze`], carrying a color copy along for display.
pub fn analyze_with_color(
    gray: GrayImage,
    color: Option<RgbImage>,
    params: &AnalysisParams,
) -> Result<ShapeAnalysis, AnalysisError> {
    let fp = &params.features;
    let img_area = gray.area();
    let view = gray.view();

    let (binarization, features) = describe_raster(&view, img_area, fp);
    let features = features.ok_or(AnalysisError::NoContourFound {
        width: gray.width,
        height: gray.height,
    })?;
    if !features.main.selection.is_valid() {
        log::warn!(
            "{}x{}: main contour is a fallback selection (area {:.0})",
            gray.width,
            gray.height,
            features.main.metrics.area
        );
    }

    let battery = generate_transforms_with(
        &view,
        fp.binarize.polarity_rule,
        fp.binarize.polarity_split,
    );
    let distances = compare(&battery, img_area, &features.descriptors, fp);

    Ok(ShapeAnalysis {
        gray,
        color,
        binarization,
        features,
        battery,
        distances,
    })
}

/// Analyze a raw row-major 8-bit buffer.
pub fn analyze_raw(
    width: usize,
    height: usize,
    data: &[u8],
    params: &AnalysisParams,
) -> Result<ShapeAnalysis, AnalysisError> {
    let gray = GrayImage::from_raw(width, height, data.to_vec())?;
    analyze_with_color(gray, None, params)
}
