//! Text overlay rendering into packed RGB frame buffers

use crate::error::{MediaError, MediaResult};
use crate::font::{self, GLYPH_HEIGHT, GLYPH_SPACING};
use crate::tracks::VideoFrame;
use serde::{Deserialize, Serialize};

/// Where and how overlay text is drawn
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverlayStyle {
    /// Left edge of the first glyph
    pub anchor_x: u32,
    /// Baseline: the row just below the glyph cells
    pub anchor_y: u32,
    /// Integer magnification of the 7-pixel font
    pub scale: u32,
    /// Foreground color as RGB
    pub color: [u8; 3],
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            anchor_x: 20,
            anchor_y: 40,
            scale: 3,
            color: [255, 255, 255],
        }
    }
}

impl OverlayStyle {
    /// Validate style
    pub fn validate(&self) -> Result<(), MediaError> {
        if self.scale == 0 || self.scale > 16 {
            return Err(MediaError::InvalidConfiguration {
                message: format!("Overlay scale must be in 1..=16, got {}", self.scale),
            });
        }
        Ok(())
    }
}

/// Draws a single line of text onto frames. No background box is drawn and
/// anything falling outside the frame is clipped.
#[derive(Debug, Clone, Default)]
pub struct TextOverlay {
    style: OverlayStyle,
}

impl TextOverlay {
    /// Overlay drawing with `style`
    pub fn new(style: OverlayStyle) -> Self {
        Self { style }
    }

    /// Current style
    pub fn style(&self) -> &OverlayStyle {
        &self.style
    }

    /// Width and height in frame pixels that `text` would cover
    pub fn measure(&self, text: &str) -> (u32, u32) {
        let glyphs: Vec<_> = text.chars().filter_map(font::glyph).collect();
        if glyphs.is_empty() {
            return (0, 0);
        }
        let columns: u32 = glyphs.iter().map(|g| g.width() + GLYPH_SPACING).sum();
        (
            (columns - GLYPH_SPACING) * self.style.scale,
            GLYPH_HEIGHT * self.style.scale,
        )
    }

    /// Draw `text` at the configured anchor.
    ///
    /// Fails without touching the buffer if the frame cannot be drawn into.
    pub fn draw(&self, frame: &mut VideoFrame, text: &str) -> MediaResult<()> {
        frame.validate()?;
        let offsets = frame
            .format
            .rgb_offsets()
            .ok_or_else(|| MediaError::UnsupportedFormat {
                format: format!("{:?}", frame.format),
            })?;
        let alpha = frame.format.alpha_offset();

        let scale = i64::from(self.style.scale);
        let top = i64::from(self.style.anchor_y) - i64::from(GLYPH_HEIGHT) * scale;
        let mut left = i64::from(self.style.anchor_x);

        for glyph in text.chars().filter_map(font::glyph) {
            for gy in 0..GLYPH_HEIGHT {
                for gx in 0..glyph.width() {
                    if !glyph.is_set(gx, gy) {
                        continue;
                    }
                    let x0 = left + i64::from(gx) * scale;
                    let y0 = top + i64::from(gy) * scale;
                    self.fill_block(frame, x0, y0, scale, offsets, alpha);
                }
            }
            left += i64::from(glyph.width() + GLYPH_SPACING) * scale;
            if left >= i64::from(frame.width) {
                break;
            }
        }

        Ok(())
    }

    fn fill_block(
        &self,
        frame: &mut VideoFrame,
        x0: i64,
        y0: i64,
        size: i64,
        offsets: [usize; 3],
        alpha: Option<usize>,
    ) {
        let color = self.style.color;
        for y in y0.max(0)..(y0 + size).min(i64::from(frame.height)) {
            for x in x0.max(0)..(x0 + size).min(i64::from(frame.width)) {
                if let Some(pixel) = frame.pixel_mut(x as u32, y as u32) {
                    for (channel, offset) in offsets.iter().enumerate() {
                        pixel[*offset] = color[channel];
                    }
                    if let Some(alpha) = alpha {
                        pixel[alpha] = u8::MAX;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::{VideoPixelFormat, VideoResolution};

    fn lit_pixels(frame: &VideoFrame) -> usize {
        let bpp = frame.format.bytes_per_pixel().unwrap();
        frame
            .data
            .chunks(bpp)
            .filter(|px| px.iter().any(|b| *b != 0))
            .count()
    }

    #[test]
    fn test_measure() {
        let overlay = TextOverlay::new(OverlayStyle {
            scale: 2,
            ..OverlayStyle::default()
        });
        assert_eq!(overlay.measure(""), (0, 0));
        // 'A' + 'B' = 5 + 1 + 5 columns
        assert_eq!(overlay.measure("AB"), (22, 14));
        // Pictograms are 7 columns wide
        assert_eq!(overlay.measure("😄"), (14, 14));
    }

    #[test]
    fn test_draw_stays_inside_text_box() {
        let overlay = TextOverlay::default();
        let mut frame = VideoFrame::blank(VideoResolution::P360, VideoPixelFormat::BGR24);
        overlay.draw(&mut frame, "Happy").unwrap();

        let (w, h) = overlay.measure("Happy");
        let style = overlay.style();
        let top = style.anchor_y - h;
        for y in 0..frame.height {
            for x in 0..frame.width {
                let inside = x >= style.anchor_x
                    && x < style.anchor_x + w
                    && y >= top
                    && y < style.anchor_y;
                if !inside {
                    assert_eq!(frame.pixel(x, y).unwrap(), &[0, 0, 0], "({}, {})", x, y);
                }
            }
        }
        assert!(lit_pixels(&frame) > 0);
    }

    #[test]
    fn test_color_follows_channel_order() {
        let overlay = TextOverlay::new(OverlayStyle {
            anchor_x: 0,
            anchor_y: 7,
            scale: 1,
            color: [10, 20, 30],
        });

        let mut rgb = VideoFrame::blank(VideoResolution::new(8, 8), VideoPixelFormat::RGB24);
        let mut bgra = VideoFrame::blank(VideoResolution::new(8, 8), VideoPixelFormat::BGRA32);
        overlay.draw(&mut rgb, "|").unwrap();
        overlay.draw(&mut bgra, "|").unwrap();

        // '|' is a full-height stroke in column 2
        assert_eq!(rgb.pixel(2, 0).unwrap(), &[10, 20, 30]);
        assert_eq!(bgra.pixel(2, 0).unwrap(), &[30, 20, 10, 255]);
        assert_eq!(rgb.pixel(1, 0).unwrap(), &[0, 0, 0]);
    }

    #[test]
    fn test_text_is_clipped_at_frame_edge() {
        let overlay = TextOverlay::new(OverlayStyle {
            anchor_x: 2,
            anchor_y: 10,
            scale: 1,
            ..OverlayStyle::default()
        });
        let mut frame = VideoFrame::blank(VideoResolution::new(32, 16), VideoPixelFormat::RGB24);
        let long = "a very long line of text that cannot fit";
        overlay.draw(&mut frame, long).unwrap();
        assert_eq!(frame.data.len(), 32 * 16 * 3);
        assert!(lit_pixels(&frame) > 0);
    }

    #[test]
    fn test_anchor_outside_small_frame_draws_nothing() {
        let overlay = TextOverlay::default();
        let mut frame = VideoFrame::blank(VideoResolution::new(16, 16), VideoPixelFormat::RGB24);
        overlay.draw(&mut frame, "hidden").unwrap();
        assert_eq!(lit_pixels(&frame), 0);
    }

    #[test]
    fn test_unsupported_format_is_rejected_untouched() {
        let overlay = TextOverlay::default();
        let mut frame = VideoFrame::new(4, 4, VideoPixelFormat::YUV420P, vec![7; 24]);
        let before = frame.clone();

        let err = overlay.draw(&mut frame, "hi").unwrap_err();
        assert!(matches!(err, MediaError::UnsupportedFormat { .. }));
        assert_eq!(frame, before);
    }

    #[test]
    fn test_style_validation() {
        assert!(OverlayStyle::default().validate().is_ok());
        let zero = OverlayStyle {
            scale: 0,
            ..OverlayStyle::default()
        };
        assert!(zero.validate().is_err());
    }
}
