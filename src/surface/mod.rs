//! Off-screen composition surfaces
//!
//! RGBA pixel buffers: the frames a video track hands over, and the
//! off-screen surface stills and recordings are composited on.

use crate::geometry::CropRect;

/// A single RGBA8 frame delivered by a capture track.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    /// RGBA pixel data, `width * height * 4` bytes
    pub data: Vec<u8>,
}

impl Frame {
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Self {
        debug_assert_eq!(data.len(), (width * height * 4) as usize);
        Self {
            width,
            height,
            data,
        }
    }

    /// A frame filled with a single color.
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let mut data = Vec::with_capacity((width * height * 4) as usize);
        for _ in 0..width * height {
            data.extend_from_slice(&rgba);
        }
        Self::new(width, height, data)
    }
}

/// Off-screen RGBA8 drawing surface.
pub struct FrameBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl FrameBuffer {
    /// Create a cleared (transparent black) surface.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; (width * height * 4) as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGBA pixel data.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Reset every pixel to transparent black.
    pub fn clear(&mut self) {
        self.data.fill(0);
    }

    /// Draw the cropped region of `frame` scaled to fill the whole surface.
    ///
    /// `mirror` flips the result horizontally (front-camera display rule).
    /// Sampling is nearest-neighbor; the output is fully opaque.
    pub fn draw_frame_cover(&mut self, frame: &Frame, crop: &CropRect, mirror: bool) {
        if frame.width == 0 || frame.height == 0 {
            return;
        }

        for dy in 0..self.height {
            let src_y = (crop.y + dy as f64 * crop.height / self.height as f64) as u32;
            let src_y = src_y.min(frame.height - 1);

            for dx in 0..self.width {
                let src_x = (crop.x + dx as f64 * crop.width / self.width as f64) as u32;
                let src_x = src_x.min(frame.width - 1);

                let dest_x = if mirror { self.width - 1 - dx } else { dx };

                let src_idx = ((src_y * frame.width + src_x) * 4) as usize;
                let dest_idx = ((dy * self.width + dest_x) * 4) as usize;

                if src_idx + 3 >= frame.data.len() || dest_idx + 3 >= self.data.len() {
                    continue;
                }

                self.data[dest_idx] = frame.data[src_idx];
                self.data[dest_idx + 1] = frame.data[src_idx + 1];
                self.data[dest_idx + 2] = frame.data[src_idx + 2];
                self.data[dest_idx + 3] = 255;
            }
        }
    }

    /// Alpha-blend an RGBA image stretched to exactly fill the surface.
    pub fn draw_image_stretched(&mut self, image: &[u8], image_width: u32, image_height: u32) {
        if image_width == 0 || image_height == 0 {
            return;
        }

        for dy in 0..self.height {
            let src_y = (dy as f64 * image_height as f64 / self.height as f64) as u32;
            let src_y = src_y.min(image_height - 1);

            for dx in 0..self.width {
                let src_x = (dx as f64 * image_width as f64 / self.width as f64) as u32;
                let src_x = src_x.min(image_width - 1);

                let src_idx = ((src_y * image_width + src_x) * 4) as usize;
                let dest_idx = ((dy * self.width + dx) * 4) as usize;

                if src_idx + 3 >= image.len() || dest_idx + 3 >= self.data.len() {
                    continue;
                }

                let src_a = image[src_idx + 3] as f32 / 255.0;
                if src_a < 0.01 {
                    continue; // Skip fully transparent pixels
                }

                let src_r = image[src_idx] as f32;
                let src_g = image[src_idx + 1] as f32;
                let src_b = image[src_idx + 2] as f32;

                let dst_r = self.data[dest_idx] as f32;
                let dst_g = self.data[dest_idx + 1] as f32;
                let dst_b = self.data[dest_idx + 2] as f32;

                let out_r = src_r * src_a + dst_r * (1.0 - src_a);
                let out_g = src_g * src_a + dst_g * (1.0 - src_a);
                let out_b = src_b * src_a + dst_b * (1.0 - src_a);

                self.data[dest_idx] = out_r.clamp(0.0, 255.0) as u8;
                self.data[dest_idx + 1] = out_g.clamp(0.0, 255.0) as u8;
                self.data[dest_idx + 2] = out_b.clamp(0.0, 255.0) as u8;
            }
        }
    }

    /// Encode the surface as a JPEG at the given quality (1-100).
    pub fn encode_jpeg(&self, quality: u8) -> Result<Vec<u8>, image::ImageError> {
        use image::ImageEncoder;

        // JPEG has no alpha channel; drop it before encoding.
        let rgb: Vec<u8> = self
            .data
            .chunks_exact(4)
            .flat_map(|px| [px[0], px[1], px[2]])
            .collect();

        let mut out = Vec::new();
        let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut out, quality);
        encoder.write_image(&rgb, self.width, self.height, image::ExtendedColorType::Rgb8)?;
        Ok(out)
    }
}
