use serde::{Deserialize, Serialize};
use silhouette_features::{describe_raster, DescriptorVector, FeatureParams, Selection};

use crate::transform::{TransformBattery, TransformKind};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Descriptor drift for one transform that produced a contour.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransformOutcome {
    pub kind: TransformKind,
    /// Euclidean distance to the baseline descriptor.
    pub distance: f64,
    pub selection: Selection,
    pub descriptors: DescriptorVector,
}

/// Per-transform outcomes in battery order. Transforms whose raster had no
/// contour are simply absent.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DistanceReport {
    pub entries: Vec<TransformOutcome>,
}

impl DistanceReport {
    pub fn get(&self, kind: TransformKind) -> Option<&TransformOutcome> {
        self.entries.iter().find(|e| e.kind == kind)
    }

    pub fn distance(&self, kind: TransformKind) -> Option<f64> {
        self.get(kind).map(|e| e.distance)
    }

    /// Transforms that yielded no contour.
    pub fn missing(&self) -> Vec<TransformKind> {
        TransformKind::ALL
            .into_iter()
            .filter(|&k| self.get(k).is_none())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Re-describe every battery raster and measure its drift from `baseline`.
///
/// Each raster is binarized with its own polarity. `img_area` is the area of
/// the untransformed frame and drives the contour area window.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "info", skip(battery, baseline, params))
)]
pub fn compare(
    battery: &TransformBattery,
    img_area: usize,
    baseline: &DescriptorVector,
    params: &FeatureParams,
) -> DistanceReport {
    let mut entries = Vec::with_capacity(TransformKind::ALL.len());
    for (kind, img) in battery.iter() {
        let (_, features) = describe_raster(&img.view(), img_area, params);
        let Some(features) = features else {
            log::warn!("{kind}: no contour in transformed raster, skipping");
            continue;
        };
        let distance = baseline.euclidean_distance(&features.descriptors);
        log::info!(
            "{kind}: distance={distance:.4} selection={:?}",
            features.main.selection
        );
        entries.push(TransformOutcome {
            kind,
            distance,
            selection: features.main.selection,
            descriptors: features.descriptors,
        });
    }
    DistanceReport { entries }
}
