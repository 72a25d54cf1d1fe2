//! Cover-fit crop geometry
//!
//! Maps an arbitrary source aspect ratio onto a fixed destination
//! aspect ratio by cropping, never by padding.

use thiserror::Error;

/// Source-space rectangle selected by [`cover_crop`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropRect {
    /// Left edge in source pixels
    pub x: f64,
    /// Top edge in source pixels
    pub y: f64,
    /// Width in source pixels
    pub width: f64,
    /// Height in source pixels
    pub height: f64,
}

/// Geometry errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GeometryError {
    #[error("cover crop requires positive dimensions (source {source_width}x{source_height}, dest {dest_width}x{dest_height})")]
    NonPositiveDimensions {
        source_width: u32,
        source_height: u32,
        dest_width: u32,
        dest_height: u32,
    },
}

/// Compute the largest centered source rectangle matching the destination
/// aspect ratio, so the destination is fully covered with no empty borders.
///
/// The source is cropped along whichever axis has proportionally more
/// content and centered along that axis. Equal aspect ratios map 1:1 with
/// zero crop.
pub fn cover_crop(
    source_width: u32,
    source_height: u32,
    dest_width: u32,
    dest_height: u32,
) -> Result<CropRect, GeometryError> {
    if source_width == 0 || source_height == 0 || dest_width == 0 || dest_height == 0 {
        return Err(GeometryError::NonPositiveDimensions {
            source_width,
            source_height,
            dest_width,
            dest_height,
        });
    }

    let source_ratio = source_width as f64 / source_height as f64;
    let dest_ratio = dest_width as f64 / dest_height as f64;

    if dest_ratio > source_ratio {
        // Destination is proportionally wider: keep the full source width,
        // crop the height and center vertically.
        let width = source_width as f64;
        let height = width / dest_ratio;
        Ok(CropRect {
            x: 0.0,
            y: (source_height as f64 - height) / 2.0,
            width,
            height,
        })
    } else {
        // Destination is proportionally taller (or equal): keep the full
        // source height, crop the width and center horizontally.
        let height = source_height as f64;
        let width = height * dest_ratio;
        Ok(CropRect {
            x: (source_width as f64 - width) / 2.0,
            y: 0.0,
            width,
            height,
        })
    }
}
