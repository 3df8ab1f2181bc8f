//! Video frame representation

use crate::capture::{VideoPixelFormat, VideoResolution};
use crate::error::{MediaError, MediaResult};

/// Decoded video frame
#[derive(Debug, Clone, PartialEq)]
pub struct VideoFrame {
    /// Frame width in pixels
    pub width: u32,
    /// Frame height in pixels
    pub height: u32,
    /// Pixel layout of `data`
    pub format: VideoPixelFormat,
    /// Raw pixel data, rows top to bottom without padding
    pub data: Vec<u8>,
    /// Capture timestamp in microseconds
    pub timestamp: u64,
    /// Sequence number assigned by the transport
    pub sequence: u64,
}

impl VideoFrame {
    /// Wrap an existing buffer
    pub fn new(width: u32, height: u32, format: VideoPixelFormat, data: Vec<u8>) -> Self {
        Self {
            width,
            height,
            format,
            data,
            timestamp: 0,
            sequence: 0,
        }
    }

    /// All-black frame of the given size
    pub fn blank(resolution: VideoResolution, format: VideoPixelFormat) -> Self {
        let len = format
            .bytes_per_pixel()
            .map(|bpp| resolution.pixel_count() as usize * bpp)
            .unwrap_or(0);
        Self::new(resolution.width, resolution.height, format, vec![0; len])
    }

    /// Set the timestamp and sequence number
    pub fn with_timing(mut self, timestamp: u64, sequence: u64) -> Self {
        self.timestamp = timestamp;
        self.sequence = sequence;
        self
    }

    pub fn resolution(&self) -> VideoResolution {
        VideoResolution::new(self.width, self.height)
    }

    /// Row stride in bytes for packed formats
    pub fn stride(&self) -> Option<usize> {
        self.format
            .bytes_per_pixel()
            .map(|bpp| self.width as usize * bpp)
    }

    /// Expected buffer length for packed formats
    pub fn expected_len(&self) -> Option<usize> {
        self.stride().map(|stride| stride * self.height as usize)
    }

    /// Check that the buffer can be drawn into
    pub fn validate(&self) -> MediaResult<()> {
        if !self.format.is_packed_rgb() {
            return Err(MediaError::UnsupportedFormat {
                format: format!("{:?}", self.format),
            });
        }

        if self.width == 0 || self.height == 0 {
            return Err(MediaError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }

        let expected = self.expected_len().unwrap_or(0);
        if self.data.len() != expected {
            return Err(MediaError::InvalidFrameData {
                expected,
                actual: self.data.len(),
            });
        }

        Ok(())
    }

    /// Bytes of the pixel at (x, y), or `None` outside the frame
    pub fn pixel(&self, x: u32, y: u32) -> Option<&[u8]> {
        let bpp = self.format.bytes_per_pixel()?;
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y as usize * self.width as usize + x as usize) * bpp;
        self.data.get(offset..offset + bpp)
    }

    /// Mutable bytes of the pixel at (x, y), or `None` outside the frame
    pub fn pixel_mut(&mut self, x: u32, y: u32) -> Option<&mut [u8]> {
        let bpp = self.format.bytes_per_pixel()?;
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y as usize * self.width as usize + x as usize) * bpp;
        self.data.get_mut(offset..offset + bpp)
    }
}
