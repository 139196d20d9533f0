//! Grayscale raster rendering for intensity grids.
//!
//! The grid is normalized to 8-bit intensities and composed with a vertical
//! colorbar into one PNG; the caller opens it in the platform viewer and
//! prints the axis caption (Distance horizontal, Depth/Time vertical).

use super::IntensityGrid;
use anyhow::{Context, Result};
use image::{GrayImage, Rgb, RgbImage};
use std::path::{Path, PathBuf};

const MARGIN: u32 = 16;
const BAR_GAP: u32 = 12;
const BAR_WIDTH: u32 = 20;
const BACKGROUND: Rgb<u8> = Rgb([245, 245, 245]);
const FRAME: Rgb<u8> = Rgb([60, 60, 60]);

/// Normalize the grid into an 8-bit grayscale raster (min maps to black,
/// max to white; a flat grid renders black).
pub fn to_raster(grid: &IntensityGrid) -> GrayImage {
    let (min, max) = grid.min_max();
    let span = max - min;
    let mut raster = GrayImage::new(grid.cols() as u32, grid.rows() as u32);
    for (x, y, pixel) in raster.enumerate_pixels_mut() {
        let v = grid.get(y as usize, x as usize);
        let scaled = if span > 0.0 {
            ((v - min) / span * 255.0).round().clamp(0.0, 255.0) as u8
        } else {
            0
        };
        pixel.0 = [scaled];
    }
    raster
}

/// Compose the raster with a framed colorbar on a light background.
pub fn compose(grid: &IntensityGrid) -> RgbImage {
    let raster = to_raster(grid);
    let (rw, rh) = raster.dimensions();
    let width = MARGIN + rw + BAR_GAP + BAR_WIDTH + MARGIN;
    let height = MARGIN + rh + MARGIN;

    let mut canvas = RgbImage::from_pixel(width, height, BACKGROUND);

    for (x, y, pixel) in raster.enumerate_pixels() {
        let v = pixel.0[0];
        canvas.put_pixel(MARGIN + x, MARGIN + y, Rgb([v, v, v]));
    }

    // colorbar: white (max) at the top down to black (min)
    let bar_x = MARGIN + rw + BAR_GAP;
    for y in 0..rh {
        let v = if rh > 1 {
            (255.0 * (1.0 - y as f32 / (rh - 1) as f32)).round() as u8
        } else {
            255
        };
        for x in 0..BAR_WIDTH {
            canvas.put_pixel(bar_x + x, MARGIN + y, Rgb([v, v, v]));
        }
    }

    draw_frame(&mut canvas, MARGIN - 1, MARGIN - 1, rw + 2, rh + 2);
    draw_frame(&mut canvas, bar_x - 1, MARGIN - 1, BAR_WIDTH + 2, rh + 2);
    canvas
}

fn draw_frame(canvas: &mut RgbImage, x0: u32, y0: u32, w: u32, h: u32) {
    for x in x0..x0 + w {
        canvas.put_pixel(x, y0, FRAME);
        canvas.put_pixel(x, y0 + h - 1, FRAME);
    }
    for y in y0..y0 + h {
        canvas.put_pixel(x0, y, FRAME);
        canvas.put_pixel(x0 + w - 1, y, FRAME);
    }
}

/// Render the grid to a PNG at `path`.
pub fn save_png(grid: &IntensityGrid, path: &Path) -> Result<()> {
    compose(grid)
        .save(path)
        .with_context(|| format!("Failed to write plot to {}", path.display()))
}

/// Render the grid and write the PNG into the system temp directory.
pub fn save_to_temp(grid: &IntensityGrid) -> Result<PathBuf> {
    let path = std::env::temp_dir().join("gpr-hub-profile.png");
    save_png(grid, &path)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_grid() -> IntensityGrid {
        IntensityGrid::new(2, 3, vec![0.0, 50.0, 100.0, 150.0, 200.0, 250.0])
    }

    #[test]
    fn test_raster_normalizes_to_full_range() {
        let raster = to_raster(&sample_grid());
        assert_eq!(raster.dimensions(), (3, 2));
        assert_eq!(raster.get_pixel(0, 0).0[0], 0);
        assert_eq!(raster.get_pixel(2, 1).0[0], 255);
    }

    #[test]
    fn test_flat_grid_renders_black() {
        let grid = IntensityGrid::new(1, 2, vec![7.0, 7.0]);
        let raster = to_raster(&grid);
        assert_eq!(raster.get_pixel(0, 0).0[0], 0);
        assert_eq!(raster.get_pixel(1, 0).0[0], 0);
    }

    #[test]
    fn test_compose_dimensions_include_bar_and_margins() {
        let canvas = compose(&sample_grid());
        assert_eq!(
            canvas.dimensions(),
            (MARGIN + 3 + BAR_GAP + BAR_WIDTH + MARGIN, MARGIN + 2 + MARGIN)
        );
    }

    #[test]
    fn test_colorbar_is_brighter_at_top() {
        let grid = IntensityGrid::new(64, 4, vec![1.0; 64 * 4]);
        let canvas = compose(&grid);
        let bar_x = MARGIN + 4 + BAR_GAP + 1;
        let top = canvas.get_pixel(bar_x, MARGIN).0[0];
        let bottom = canvas.get_pixel(bar_x, MARGIN + 63).0[0];
        assert!(top > bottom);
        assert_eq!(top, 255);
        assert_eq!(bottom, 0);
    }

    #[test]
    fn test_save_writes_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plot.png");
        save_png(&sample_grid(), &path).unwrap();
        let reloaded = image::open(&path).unwrap();
        assert_eq!(
            reloaded.width(),
            MARGIN + 3 + BAR_GAP + BAR_WIDTH + MARGIN
        );
    }
}
