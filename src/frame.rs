//! Frame snapshot type.
//!
//! A `Frame` is an immutable capture: RGB8 pixel buffer, dimensions, and the
//! capture timestamp. The capturing component owns it exclusively until
//! handoff; the pipeline wraps it in an `Arc` once it may be shared read-only.

use std::time::SystemTime;

use image::codecs::jpeg::JpegEncoder;
use image::ExtendedColorType;

use crate::error::CaptureError;

/// Pixel layout of a frame buffer. Sources normalize to RGB8 at capture time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PixelFormat {
    Rgb8,
}

impl PixelFormat {
    /// Bytes per pixel for this format.
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            PixelFormat::Rgb8 => 3,
        }
    }
}

/// One captured camera frame. Immutable after construction.
#[derive(Clone, Debug)]
pub struct Frame {
    pixels: Vec<u8>,
    width: u32,
    height: u32,
    format: PixelFormat,
    captured_at: SystemTime,
}

impl Frame {
    /// Build a frame from raw pixel data, validating the buffer length
    /// against the declared dimensions.
    pub fn new(
        pixels: Vec<u8>,
        width: u32,
        height: u32,
        format: PixelFormat,
    ) -> Result<Self, CaptureError> {
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(format.bytes_per_pixel()))
            .ok_or(CaptureError::Malformed {
                expected: usize::MAX,
                actual: pixels.len(),
            })?;
        if pixels.len() != expected {
            return Err(CaptureError::Malformed {
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            pixels,
            width,
            height,
            format,
            captured_at: SystemTime::now(),
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    pub fn captured_at(&self) -> SystemTime {
        self.captured_at
    }

    /// Read-only pixel data, row-major, no padding.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn byte_len(&self) -> usize {
        self.pixels.len()
    }

    /// Encode the frame as JPEG for the alert artifact and the photo upload.
    pub fn encode_jpeg(&self, quality: u8) -> Result<Vec<u8>, String> {
        let mut bytes = Vec::new();
        let mut encoder = JpegEncoder::new_with_quality(&mut bytes, quality);
        encoder
            .encode(
                &self.pixels,
                self.width,
                self.height,
                ExtendedColorType::Rgb8,
            )
            .map_err(|e| e.to_string())?;
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_rejects_short_buffer() {
        let result = Frame::new(vec![0u8; 10], 4, 4, PixelFormat::Rgb8);
        assert!(matches!(
            result,
            Err(CaptureError::Malformed {
                expected: 48,
                actual: 10
            })
        ));
    }

    #[test]
    fn frame_accepts_exact_buffer() {
        let frame = Frame::new(vec![0u8; 48], 4, 4, PixelFormat::Rgb8).unwrap();
        assert_eq!(frame.width(), 4);
        assert_eq!(frame.height(), 4);
        assert_eq!(frame.byte_len(), 48);
    }

    #[test]
    fn encode_jpeg_produces_jpeg_magic() {
        let frame = Frame::new(vec![128u8; 16 * 16 * 3], 16, 16, PixelFormat::Rgb8).unwrap();
        let jpeg = frame.encode_jpeg(85).unwrap();
        assert!(jpeg.starts_with(&[0xFF, 0xD8]));
    }
}
