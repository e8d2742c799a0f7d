//! Per-class descriptor centroids for a labelled batch.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use silhouette_features::{DescriptorKind, DescriptorVector};

/// Class label for a dataset file.
///
/// Stems with an underscore are read as `<prefix>_<index>` and the prefix,
/// minus a leading `trainimage`, becomes `class_<prefix>`
/// (`trainimage3_12.png` is `class_3`). Anything else is labelled by its
/// parent directory name.
pub fn class_label_for(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    if let Some((prefix, _)) = stem.split_once('_') {
        let id = prefix.strip_prefix("trainimage").unwrap_or(prefix);
        return format!("class_{id}");
    }
    path.parent()
        .and_then(Path::file_name)
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "unlabelled".to_string())
}

/// Mean of the two chosen descriptors over one class.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClassCentroid {
    pub label: String,
    pub count: usize,
    pub centroid: [f64; 2],
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CentroidDistance {
    pub a: String,
    pub b: String,
    pub distance: f64,
}

/// How far apart class centroids sit in a two-descriptor plane.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DiscriminationReport {
    pub axes: [DescriptorKind; 2],
    /// Sorted by label.
    pub classes: Vec<ClassCentroid>,
    /// Every unordered pair, in label order.
    pub pairs: Vec<CentroidDistance>,
}

impl DiscriminationReport {
    /// Circularity against elongation.
    pub const DEFAULT_AXES: [DescriptorKind; 2] =
        [DescriptorKind::Circularity, DescriptorKind::Elongation];

    pub fn build<'a>(
        samples: impl IntoIterator<Item = (&'a str, &'a DescriptorVector)>,
        axes: [DescriptorKind; 2],
    ) -> Self {
        let mut acc: BTreeMap<&str, ([f64; 2], usize)> = BTreeMap::new();
        for (label, desc) in samples {
            let slot = acc.entry(label).or_insert(([0.0; 2], 0));
            slot.0[0] += desc.get(axes[0]);
            slot.0[1] += desc.get(axes[1]);
            slot.1 += 1;
        }

        let classes: Vec<ClassCentroid> = acc
            .into_iter()
            .map(|(label, (sum, count))| ClassCentroid {
                label: label.to_string(),
                count,
                centroid: [sum[0] / count as f64, sum[1] / count as f64],
            })
            .collect();

        let mut pairs = Vec::new();
        for (i, a) in classes.iter().enumerate() {
            for b in &classes[i + 1..] {
                let dx = a.centroid[0] - b.centroid[0];
                let dy = a.centroid[1] - b.centroid[1];
                pairs.push(CentroidDistance {
                    a: a.label.clone(),
                    b: b.label.clone(),
                    distance: (dx * dx + dy * dy).sqrt(),
                });
            }
        }
        Self {
            axes,
            classes,
            pairs,
        }
    }
}
