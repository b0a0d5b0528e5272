// Core types shared by the filter, compositor, render loop and window.

use image::{ImageBuffer, Rgba, RgbaImage};

/// One RGBA frame, row-major, 4 bytes per pixel.
/// Visual: this is what ends up in the window once packed by `to_xrgb`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameBuffer {
    pub width: usize,     // pixels per row
    pub height: usize,    // rows
    pub pixels: Vec<u8>,  // R,G,B,A per pixel; length = width * height * 4
}

impl FrameBuffer {
    /// Opaque black frame of the given size.
    pub fn new(width: usize, height: usize) -> Self {
        let mut pixels = vec![0u8; width * height * 4];
        for px in pixels.chunks_exact_mut(4) {
            px[3] = 255;
        }
        Self { width, height, pixels }
    }

    /// Wrap raw RGBA bytes; `None` when the length doesn't match the size.
    pub fn from_rgba(width: usize, height: usize, pixels: Vec<u8>) -> Option<Self> {
        (pixels.len() == width * height * 4).then_some(Self { width, height, pixels })
    }

    pub fn from_image(img: RgbaImage) -> Self {
        let (w, h) = img.dimensions();
        Self { width: w as usize, height: h as usize, pixels: img.into_raw() }
    }

    pub fn is_well_formed(&self) -> bool {
        self.pixels.len() == self.width * self.height * 4
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// RGBA of the pixel at (x, y), or `None` outside the frame.
    pub fn pixel(&self, x: usize, y: usize) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y * self.width + x) * 4;
        let px = self.pixels.get(i..i + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Borrow as an `image` buffer (no copy).
    pub fn as_image(&self) -> Option<ImageBuffer<Rgba<u8>, &[u8]>> {
        ImageBuffer::from_raw(self.width as u32, self.height as u32, self.pixels.as_slice())
    }

    /// Mutably borrow as an `image` buffer (no copy).
    pub fn as_image_mut(&mut self) -> Option<ImageBuffer<Rgba<u8>, &mut [u8]>> {
        ImageBuffer::from_raw(self.width as u32, self.height as u32, self.pixels.as_mut_slice())
    }

    /// Pack into minifb's 0x00RRGGBB pixels, reusing `out`'s allocation.
    pub fn to_xrgb(&self, out: &mut Vec<u32>) {
        out.clear();
        out.extend(self.pixels.chunks_exact(4).map(|px| {
            let r = px[0] as u32;
            let g = px[1] as u32;
            let b = px[2] as u32;
            (r << 16) | (g << 8) | b
        }));
    }
}

/// Where a source frame lands inside the destination surface.
/// Offsets are zero or negative under cover scaling: the overflow is cropped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RenderRect {
    pub x: i64,
    pub y: i64,
    pub width: u32,
    pub height: u32,
}

impl RenderRect {
    /// True when the destination `(0, 0, dw, dh)` lies fully inside this rect.
    pub fn covers(&self, dw: u32, dh: u32) -> bool {
        self.x <= 0
            && self.y <= 0
            && self.x + self.width as i64 >= dw as i64
            && self.y + self.height as i64 >= dh as i64
    }
}
