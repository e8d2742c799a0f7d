//! Image decoding and artifact dumping via the `image` crate.

use std::path::{Path, PathBuf};

use silhouette_core::{GrayImage, ImageError, RgbImage};

use crate::analysis::ShapeAnalysis;

/// File extensions picked up by [`discover_images`], lowercase.
pub const IMAGE_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "bmp"];

#[derive(thiserror::Error, Debug)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("failed to write {path}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error(transparent)]
    Raster(#[from] ImageError),
}

/// Decoded raster in both the analysed and the display form.
#[derive(Clone, Debug)]
pub struct LoadedImage {
    pub path: PathBuf,
    pub gray: GrayImage,
    pub color: RgbImage,
}

/// Decode `path` into grayscale plus an RGB display copy.
pub fn load_image(path: &Path) -> Result<LoadedImage, LoadError> {
    let reader = image::ImageReader::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let decoded = reader
        .with_guessed_format()
        .map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?
        .decode()
        .map_err(|source| LoadError::Decode {
            path: path.to_path_buf(),
            source,
        })?;

    let luma = decoded.to_luma8();
    let (w, h) = (luma.width() as usize, luma.height() as usize);
    let gray = GrayImage::from_raw(w, h, luma.into_raw())?;
    let rgb = decoded.to_rgb8();
    let color = RgbImage::from_interleaved(w, h, rgb.as_raw())?;
    log::debug!("loaded {} ({w}x{h})", path.display());
    Ok(LoadedImage {
        path: path.to_path_buf(),
        gray,
        color,
    })
}

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Recursively list image files under `dir`, sorted by path.
pub fn discover_images(dir: &Path) -> Result<Vec<PathBuf>, LoadError> {
    let mut out = Vec::new();
    let mut stack = vec![dir.to_path_buf()];
    while let Some(current) = stack.pop() {
        let entries = std::fs::read_dir(&current).map_err(|source| LoadError::Io {
            path: current.clone(),
            source,
        })?;
        for entry in entries {
            let entry = entry.map_err(|source| LoadError::Io {
                path: current.clone(),
                source,
            })?;
            let path = entry.path();
            if path.is_dir() {
                stack.push(path);
            } else if has_image_extension(&path) {
                out.push(path);
            }
        }
    }
    out.sort();
    Ok(out)
}

fn save_gray(img: &GrayImage, path: &Path) -> Result<(), LoadError> {
    let buf = image::GrayImage::from_raw(img.width as u32, img.height as u32, img.data.clone())
        .ok_or(LoadError::Raster(ImageError::InvalidBuffer {
            expected: img.width * img.height,
            got: img.data.len(),
        }))?;
    buf.save(path).map_err(|source| LoadError::Encode {
        path: path.to_path_buf(),
        source,
    })
}

/// Write masks and battery rasters as PNG files into `dir`.
///
/// Returns the written paths. `dir` is created if needed.
pub fn dump_artifacts(analysis: &ShapeAnalysis, dir: &Path) -> Result<Vec<PathBuf>, LoadError> {
    std::fs::create_dir_all(dir).map_err(|source| LoadError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut rasters: Vec<(String, GrayImage)> = vec![
        ("gray".to_string(), analysis.gray.clone()),
        ("mask_raw".to_string(), analysis.binarization.raw.to_gray()),
        ("mask_filled".to_string(), analysis.binarization.filled.to_gray()),
    ];
    for (kind, img) in analysis.battery.iter() {
        rasters.push((kind.name().to_string(), img.clone()));
    }

    let mut written = Vec::with_capacity(rasters.len());
    for (name, img) in rasters {
        let path = dir.join(format!("{name}.png"));
        save_gray(&img, &path)?;
        written.push(path);
    }
    log::info!("wrote {} artifacts to {}", written.len(), dir.display());
    Ok(written)
}
