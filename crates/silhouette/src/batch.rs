//! Many images, one summary per transform.

use serde::{Deserialize, Serialize};
use silhouette_core::GrayImage;
use silhouette_features::Selection;
use silhouette_robustness::TransformKind;

#[cfg(feature = "rayon")]
use rayon::prelude::*;

use crate::analysis::{analyze, AnalysisError, AnalysisParams, AnalysisSummary};

/// Analyze every image independently; results keep the input order.
///
/// A failing image only produces an `Err` in its own slot.
pub fn analyze_batch(
    images: &[GrayImage],
    params: &AnalysisParams,
) -> Vec<Result<AnalysisSummary, AnalysisError>> {
    let run = |img: &GrayImage| analyze(img, params).map(|a| a.summary());

    #[cfg(feature = "rayon")]
    let out: Vec<_> = images.par_iter().map(run).collect();

    #[cfg(not(feature = "rayon"))]
    let out: Vec<_> = images.iter().map(run).collect();

    let failed = out.iter().filter(|r| r.is_err()).count();
    log::info!("batch: {} images, {} failed", images.len(), failed);
    out
}

/// Mean drift for one transform.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransformStats {
    pub kind: TransformKind,
    /// `None` when no image contributed.
    pub mean_distance: Option<f64>,
    pub samples: usize,
}

/// Average descriptor drift per transform across a batch.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RobustnessSummary {
    pub transforms: Vec<TransformStats>,
    /// Images that contributed to the averages.
    pub images: usize,
    /// Images skipped because their baseline contour was a fallback.
    pub excluded_fallback: usize,
}

impl RobustnessSummary {
    /// Aggregate per-image summaries.
    ///
    /// With `exclude_fallback`, images whose baseline selection is a fallback
    /// are skipped entirely, and so are individual transform entries whose
    /// own selection fell back.
    pub fn from_summaries<'a>(
        summaries: impl IntoIterator<Item = &'a AnalysisSummary>,
        exclude_fallback: bool,
    ) -> Self {
        let mut sums = [0.0f64; 4];
        let mut counts = [0usize; 4];
        let mut images = 0;
        let mut excluded_fallback = 0;

        for s in summaries {
            if exclude_fallback && s.selection == Selection::Fallback {
                excluded_fallback += 1;
                continue;
            }
            images += 1;
            for entry in &s.distances.entries {
                if exclude_fallback && !entry.selection.is_valid() {
                    continue;
                }
                let slot = entry.kind as usize;
                sums[slot] += entry.distance;
                counts[slot] += 1;
            }
        }

        let transforms = TransformKind::ALL
            .into_iter()
            .map(|kind| {
                let slot = kind as usize;
                TransformStats {
                    kind,
                    mean_distance: (counts[slot] > 0).then(|| sums[slot] / counts[slot] as f64),
                    samples: counts[slot],
                }
            })
            .collect();
        Self {
            transforms,
            images,
            excluded_fallback,
        }
    }

    pub fn mean_distance(&self, kind: TransformKind) -> Option<f64> {
        self.transforms
            .iter()
            .find(|t| t.kind == kind)
            .and_then(|t| t.mean_distance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use silhouette_core::BoundingBox;
    use silhouette_features::{BinarizationStats, DescriptorVector};
    use silhouette_robustness::{DistanceReport, TransformOutcome};

    fn summary(selection: Selection, distances: &[(TransformKind, f64, Selection)]) -> AnalysisSummary {
        AnalysisSummary {
            width: 10,
            height: 10,
            binarization: BinarizationStats {
                polarity: silhouette_core::Polarity::DarkBackground,
                mean: 0.0,
                raw_foreground: 0,
                filled_foreground: 0,
            },
            selection,
            candidate_count: 1,
            area: 0.0,
            perimeter: 0.0,
            bbox: BoundingBox::default(),
            hull_area: 0.0,
            descriptors: DescriptorVector::default(),
            corners: Vec::new(),
            distances: DistanceReport {
                entries: distances
                    .iter()
                    .map(|&(kind, distance, selection)| TransformOutcome {
                        kind,
                        distance,
                        selection,
                        descriptors: DescriptorVector::default(),
                    })
                    .collect(),
            },
        }
    }

    #[test]
    fn averages_only_present_entries() {
        let a = summary(
            Selection::Valid,
            &[
                (TransformKind::Rotate90, 1.0, Selection::Valid),
                (TransformKind::Scale50, 4.0, Selection::Valid),
            ],
        );
        let b = summary(Selection::Valid, &[(TransformKind::Rotate90, 3.0, Selection::Valid)]);
        let s = RobustnessSummary::from_summaries([&a, &b], false);
        assert_eq!(s.images, 2);
        assert_eq!(s.mean_distance(TransformKind::Rotate90), Some(2.0));
        assert_eq!(s.mean_distance(TransformKind::Scale50), Some(4.0));
        assert_eq!(s.mean_distance(TransformKind::Rotate45), None);
        assert_eq!(s.transforms[3].samples, 1);
    }

    #[test]
    fn fallback_exclusion_is_opt_in() {
        let good = summary(Selection::Valid, &[(TransformKind::Rotate45, 1.0, Selection::Valid)]);
        let bad = summary(Selection::Fallback, &[(TransformKind::Rotate45, 9.0, Selection::Valid)]);
        let shaky = summary(Selection::Valid, &[(TransformKind::Rotate45, 5.0, Selection::Fallback)]);

        let all = RobustnessSummary::from_summaries([&good, &bad, &shaky], false);
        assert_eq!(all.mean_distance(TransformKind::Rotate45), Some(5.0));

        let strict = RobustnessSummary::from_summaries([&good, &bad, &shaky], true);
        assert_eq!(strict.mean_distance(TransformKind::Rotate45), Some(1.0));
        assert_eq!(strict.excluded_fallback, 1);
        assert_eq!(strict.images, 2);
    }
}
