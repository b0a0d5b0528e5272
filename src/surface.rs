// The display surface seam: something that can be drawn into, read back and
// written to. `Canvas` is the in-memory one the window presents from.

use crate::compositor::{draw_cover, ScaleQuality};
use crate::error::{Error, Result};
use crate::types::{FrameBuffer, RenderRect};

pub trait DisplaySurface {
    /// Drawable size in pixels (width, height).
    fn size(&self) -> (usize, usize);

    /// Draw `frame` scaled into `rect`; anything outside the surface is cropped.
    fn draw_image(&mut self, frame: &FrameBuffer, rect: RenderRect) -> Result<()>;

    /// Copy of the current pixels. May fail (the loop then skips filtering).
    fn read_pixels(&mut self) -> Result<FrameBuffer>;

    /// Replace the pixels with `frame` (same size as the surface).
    fn write_pixels(&mut self, frame: &FrameBuffer) -> Result<()>;

    /// Current pixels for display or capture.
    fn snapshot(&self) -> &FrameBuffer;
}

/// In-memory RGBA surface. Its buffer is reused across frames.
pub struct Canvas {
    buffer: FrameBuffer,
    quality: ScaleQuality,
}

impl Canvas {
    pub fn new(width: usize, height: usize, quality: ScaleQuality) -> Self {
        Self { buffer: FrameBuffer::new(width, height), quality }
    }

    /// Match the window size; keeps the buffer when nothing changed.
    /// Returns true if the canvas was reallocated.
    pub fn resize(&mut self, width: usize, height: usize) -> bool {
        if (self.buffer.width, self.buffer.height) == (width, height) {
            return false;
        }
        self.buffer = FrameBuffer::new(width, height);
        true
    }
}

impl DisplaySurface for Canvas {
    fn size(&self) -> (usize, usize) {
        (self.buffer.width, self.buffer.height)
    }

    fn draw_image(&mut self, frame: &FrameBuffer, rect: RenderRect) -> Result<()> {
        draw_cover(frame, &mut self.buffer, rect, self.quality)
    }

    fn read_pixels(&mut self) -> Result<FrameBuffer> {
        Ok(self.buffer.clone())
    }

    fn write_pixels(&mut self, frame: &FrameBuffer) -> Result<()> {
        if (frame.width, frame.height) != self.size() || !frame.is_well_formed() {
            return Err(Error::SurfaceWrite(format!(
                "write: {}x{} frame on {}x{} canvas",
                frame.width, frame.height, self.buffer.width, self.buffer.height
            )));
        }
        self.buffer.pixels.copy_from_slice(&frame.pixels);
        Ok(())
    }

    fn snapshot(&self) -> &FrameBuffer {
        &self.buffer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compositor::cover_rect;

    #[test]
    fn resize_only_reallocates_on_change() {
        let mut c = Canvas::new(4, 4, ScaleQuality::Fast);
        assert!(!c.resize(4, 4));
        assert!(c.resize(8, 2));
        assert_eq!(c.size(), (8, 2));
        assert!(c.snapshot().is_well_formed());
    }

    #[test]
    fn draw_then_read_back() {
        let mut c = Canvas::new(2, 2, ScaleQuality::Fast);
        let src = FrameBuffer::from_rgba(1, 1, vec![1, 2, 3, 255]).unwrap();
        c.draw_image(&src, cover_rect(1, 1, 2, 2)).unwrap();
        let px = c.read_pixels().unwrap();
        assert_eq!(px.pixel(1, 1), Some([1, 2, 3, 255]));
    }

    #[test]
    fn write_rejects_wrong_size() {
        let mut c = Canvas::new(2, 2, ScaleQuality::Fast);
        let err = c.write_pixels(&FrameBuffer::new(3, 2)).unwrap_err();
        assert!(matches!(err, Error::SurfaceWrite(_)));
        c.write_pixels(&FrameBuffer::from_rgba(2, 2, vec![7; 16]).unwrap()).unwrap();
        assert_eq!(c.snapshot().pixels, vec![7; 16]);
    }
}
