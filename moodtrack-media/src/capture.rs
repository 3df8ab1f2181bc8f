//! Pixel formats, resolutions and browser capture constraints

use crate::error::MediaError;
use serde::{Deserialize, Serialize};

/// Supported video pixel formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VideoPixelFormat {
    YUV420P,
    NV12,
    RGB24,
    BGR24,
    RGBA32,
    BGRA32,
    MJPEG,
    H264,
}

impl VideoPixelFormat {
    /// Bytes per pixel for packed formats
    pub fn bytes_per_pixel(&self) -> Option<usize> {
        match self {
            VideoPixelFormat::RGB24 | VideoPixelFormat::BGR24 => Some(3),
            VideoPixelFormat::RGBA32 | VideoPixelFormat::BGRA32 => Some(4),
            VideoPixelFormat::YUV420P
            | VideoPixelFormat::NV12
            | VideoPixelFormat::MJPEG
            | VideoPixelFormat::H264 => None,
        }
    }

    /// Byte offsets of the red, green and blue channels within one pixel
    pub fn rgb_offsets(&self) -> Option<[usize; 3]> {
        match self {
            VideoPixelFormat::RGB24 | VideoPixelFormat::RGBA32 => Some([0, 1, 2]),
            VideoPixelFormat::BGR24 | VideoPixelFormat::BGRA32 => Some([2, 1, 0]),
            _ => None,
        }
    }

    /// Byte offset of the alpha channel, for formats that carry one
    pub fn alpha_offset(&self) -> Option<usize> {
        match self {
            VideoPixelFormat::RGBA32 | VideoPixelFormat::BGRA32 => Some(3),
            _ => None,
        }
    }

    /// Whether text can be drawn directly into the buffer
    pub fn is_packed_rgb(&self) -> bool {
        self.rgb_offsets().is_some()
    }
}

/// Video resolution information
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VideoResolution {
    pub width: u32,
    pub height: u32,
}

impl VideoResolution {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Browser capture size requested by the tracker
    pub const P360: Self = Self::new(480, 360);

    pub fn pixel_count(&self) -> u32 {
        self.width * self.height
    }
}

/// Video part of the browser media constraints
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VideoConstraints {
    pub width: u32,
    pub height: u32,
}

impl From<VideoResolution> for VideoConstraints {
    fn from(resolution: VideoResolution) -> Self {
        Self {
            width: resolution.width,
            height: resolution.height,
        }
    }
}

/// Constraints sent to the browser when the stream is requested
///
/// Serializes to the `getUserMedia` shape, e.g.
/// `{"video":{"width":480,"height":360},"audio":false}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaStreamConstraints {
    pub video: Option<VideoConstraints>,
    pub audio: bool,
}

impl Default for MediaStreamConstraints {
    fn default() -> Self {
        Self {
            video: Some(VideoResolution::P360.into()),
            audio: false,
        }
    }
}

impl MediaStreamConstraints {
    /// Validate constraints
    pub fn validate(&self) -> Result<(), MediaError> {
        let video = self.video.ok_or_else(|| MediaError::InvalidConfiguration {
            message: "Video track is required".to_string(),
        })?;

        if video.width == 0 || video.height == 0 {
            return Err(MediaError::InvalidConfiguration {
                message: "Invalid resolution".to_string(),
            });
        }

        if self.audio {
            return Err(MediaError::InvalidConfiguration {
                message: "Audio capture is not supported".to_string(),
            });
        }

        Ok(())
    }

    /// Requested resolution
    pub fn resolution(&self) -> Option<VideoResolution> {
        self.video
            .map(|video| VideoResolution::new(video.width, video.height))
    }
}
