//! 2-D intensity grids decoded from radar image files.
//!
//! A grid is the grayscale view of a radargram: rows are depth/time, columns
//! are lateral distance. Color sources are reduced with the standard
//! luminance weighting after any alpha channel is dropped; sources that are
//! already single-channel pass through unchanged.

use image::DynamicImage;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Luminance weights for the 3-to-1 channel reduction.
pub const LUMA_WEIGHTS: [f32; 3] = [0.2989, 0.5870, 0.1140];

/// Why a grid could not be produced. The sub-loop reports these and keeps
/// running; nothing here propagates further up.
#[derive(Debug, Error)]
pub enum GridError {
    #[error("File not found at path: {}", .0.display())]
    NotFound(PathBuf),
    #[error("Failed to decode image: {0}")]
    Decode(#[from] image::ImageError),
}

/// Dense row-major grid of intensity samples.
#[derive(Debug, Clone)]
pub struct IntensityGrid {
    rows: usize,
    cols: usize,
    data: Vec<f32>,
}

impl IntensityGrid {
    pub fn new(rows: usize, cols: usize, data: Vec<f32>) -> Self {
        debug_assert_eq!(rows * cols, data.len());
        Self { rows, cols, data }
    }

    /// Depth/time extent in samples.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Lateral distance extent in samples.
    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.data[row * self.cols + col]
    }

    /// Smallest and largest sample, or `(0, 0)` for an empty grid.
    pub fn min_max(&self) -> (f32, f32) {
        let mut min = f32::INFINITY;
        let mut max = f32::NEG_INFINITY;
        for &v in &self.data {
            min = min.min(v);
            max = max.max(v);
        }
        if self.data.is_empty() {
            (0.0, 0.0)
        } else {
            (min, max)
        }
    }
}

/// Decode `path` into an intensity grid.
pub fn load(path: &Path) -> Result<IntensityGrid, GridError> {
    if !path.exists() {
        return Err(GridError::NotFound(path.to_path_buf()));
    }
    let decoded = image::open(path)?;
    Ok(from_decoded(&decoded))
}

/// Reduce a decoded image to one intensity channel.
///
/// Single-channel data (with or without alpha) passes through as-is; color
/// data is reduced per pixel with [`LUMA_WEIGHTS`] once alpha is dropped.
pub fn from_decoded(image: &DynamicImage) -> IntensityGrid {
    match image {
        DynamicImage::ImageLuma8(gray) => {
            let (w, h) = gray.dimensions();
            let data = gray.pixels().map(|p| p[0] as f32).collect();
            IntensityGrid::new(h as usize, w as usize, data)
        }
        DynamicImage::ImageLuma16(gray) => {
            let (w, h) = gray.dimensions();
            let data = gray.pixels().map(|p| p[0] as f32).collect();
            IntensityGrid::new(h as usize, w as usize, data)
        }
        DynamicImage::ImageLumaA8(gray) => {
            let (w, h) = gray.dimensions();
            let data = gray.pixels().map(|p| p[0] as f32).collect();
            IntensityGrid::new(h as usize, w as usize, data)
        }
        DynamicImage::ImageLumaA16(gray) => {
            let (w, h) = gray.dimensions();
            let data = gray.pixels().map(|p| p[0] as f32).collect();
            IntensityGrid::new(h as usize, w as usize, data)
        }
        other => {
            // 3 or 4 channels: to_rgb8 drops alpha, then the luminance
            // reduction collapses the color channels.
            let rgb = other.to_rgb8();
            let (w, h) = rgb.dimensions();
            let data = rgb
                .pixels()
                .map(|p| {
                    LUMA_WEIGHTS[0] * p[0] as f32
                        + LUMA_WEIGHTS[1] * p[1] as f32
                        + LUMA_WEIGHTS[2] * p[2] as f32
                })
                .collect();
            IntensityGrid::new(h as usize, w as usize, data)
        }
    }
}
