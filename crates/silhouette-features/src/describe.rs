use serde::{Deserialize, Serialize};
use silhouette_core::{BinaryMask, GrayImageView};

use crate::binarize::{binarize, Binarization};
use crate::contour::{find_main_contour, MainContour};
use crate::descriptors::{compute_descriptors, DescriptorVector};
use crate::harris::CornerSet;
use crate::FeatureParams;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Main contour, its descriptor and the corners behind `corner_count`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ShapeFeatures {
    pub main: MainContour,
    pub descriptors: DescriptorVector,
    pub corners: CornerSet,
}

/// Contour selection and descriptors on an already binarized, filled mask.
///
/// `img_area` scales the candidate area window; pass the area of the
/// original frame when describing a derived raster.
pub fn describe_mask(
    filled: &BinaryMask,
    img_area: usize,
    params: &FeatureParams,
) -> Option<ShapeFeatures> {
    let main = find_main_contour(filled, img_area, &params.contour)?;
    let (descriptors, corners) = compute_descriptors(&main.metrics, filled, &params.harris);
    Some(ShapeFeatures {
        main,
        descriptors,
        corners,
    })
}

/// Binarize `img` and describe its main contour.
///
/// The binarization is always returned; the features are `None` when the
/// mask has no foreground at all.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "info", skip(img, params), fields(width = img.width, height = img.height))
)]
pub fn describe_raster(
    img: &GrayImageView<'_>,
    img_area: usize,
    params: &FeatureParams,
) -> (Binarization, Option<ShapeFeatures>) {
    let bin = binarize(img, &params.binarize);
    let features = describe_mask(&bin.filled, img_area, params);
    (bin, features)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Selection;
    use approx::assert_relative_eq;
    use silhouette_core::GrayImage;

    #[test]
    fn blank_frame_has_no_features() {
        let img = GrayImage::new_fill(32, 32, 0);
        let (bin, features) = describe_raster(&img.view(), img.area(), &FeatureParams::default());
        assert_eq!(bin.filled.count(), 0);
        assert!(features.is_none());
    }

    #[test]
    fn dark_square_on_light_background() {
        let img = GrayImage::from_fn(120, 120, |x, y| {
            if (20..100).contains(&x) && (20..100).contains(&y) {
                0
            } else {
                255
            }
        });
        let (_, features) = describe_raster(&img.view(), img.area(), &FeatureParams::default());
        let f = features.expect("square is found");
        assert_eq!(f.main.selection, Selection::Valid);
        assert_relative_eq!(f.main.metrics.area, 6400.0);
        assert_relative_eq!(f.descriptors.extent, 1.0);
        assert_relative_eq!(f.descriptors.solidity, 1.0);
        assert_eq!(f.descriptors.corner_count, 4.0);
    }
}
