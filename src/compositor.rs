// Aspect-correct "cover" placement of the camera frame inside the canvas.
// Visual: the picture always fills the whole window; whichever side overflows
// is cropped equally on both edges, never letterboxed.

use clap::ValueEnum;
use image::imageops::{self, FilterType};

use crate::error::{Error, Result};
use crate::types::{FrameBuffer, RenderRect};

/// Size assumed when a source hasn't reported its dimensions yet.
pub const FALLBACK_SOURCE_SIZE: (u32, u32) = (640, 480);

/// Resampling used when scaling the source to the render rect.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum ScaleQuality {
    /// Nearest neighbour: cheapest, blocky when upscaling.
    #[default]
    Fast,
    /// Bilinear.
    Smooth,
}

impl ScaleQuality {
    fn filter_type(self) -> FilterType {
        match self {
            ScaleQuality::Fast => FilterType::Nearest,
            ScaleQuality::Smooth => FilterType::Triangle,
        }
    }
}

/// Cover geometry for a `sw x sh` source on a `dw x dh` destination.
/// The returned rect always contains `(0, 0, dw, dh)`.
pub fn cover_rect(sw: u32, sh: u32, dw: u32, dh: u32) -> RenderRect {
    if dw == 0 || dh == 0 {
        return RenderRect { x: 0, y: 0, width: 0, height: 0 };
    }
    let (sw, sh) = if sw == 0 || sh == 0 { FALLBACK_SOURCE_SIZE } else { (sw, sh) };

    let source_aspect = sw as f64 / sh as f64;
    let dest_aspect = dw as f64 / dh as f64;

    let (width, height) = if source_aspect > dest_aspect {
        ((dh as f64 * source_aspect).round() as u32, dh) // wider: match height
    } else {
        (dw, (dw as f64 / source_aspect).round() as u32) // taller: match width
    };

    RenderRect {
        x: ((dw as f64 - width as f64) / 2.0).round() as i64,
        y: ((dh as f64 - height as f64) / 2.0).round() as i64,
        width,
        height,
    }
}

/// Scale `src` to `rect` and copy it into `dst`, cropping whatever falls outside.
/// Visual: the canvas now shows the raw (unfiltered) camera image.
pub fn draw_cover(
    src: &FrameBuffer,
    dst: &mut FrameBuffer,
    rect: RenderRect,
    quality: ScaleQuality,
) -> Result<()> {
    if src.is_empty() || dst.is_empty() || rect.width == 0 || rect.height == 0 {
        return Ok(());
    }
    let src_img = src
        .as_image()
        .ok_or_else(|| Error::CameraFrame("draw: malformed source frame".into()))?;
    let mut dst_img = dst
        .as_image_mut()
        .ok_or_else(|| Error::SurfaceWrite("draw: malformed canvas buffer".into()))?;

    if (rect.width, rect.height) == src_img.dimensions() {
        imageops::replace(&mut dst_img, &src_img, rect.x, rect.y);
    } else {
        let scaled = imageops::resize(&src_img, rect.width, rect.height, quality.filter_type());
        imageops::replace(&mut dst_img, &scaled, rect.x, rect.y);
    }
    Ok(())
}
