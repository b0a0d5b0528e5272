// Still capture: snapshot the canvas, encode it, and save it under a
// `capture-<mode>-<timestamp>.<ext>` name.
// Visual: nothing changes on screen; the HUD overlay is not part of the capture.

use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use image::{DynamicImage, ImageFormat, RgbaImage};
use tracing::info;

use crate::error::{Error, Result};
use crate::filter::FilterMode;
use crate::types::FrameBuffer;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum CaptureFormat {
    #[default]
    Png,
    Jpeg,
}

impl CaptureFormat {
    pub fn extension(self) -> &'static str {
        match self {
            CaptureFormat::Png => "png",
            CaptureFormat::Jpeg => "jpg",
        }
    }

    fn image_format(self) -> ImageFormat {
        match self {
            CaptureFormat::Png => ImageFormat::Png,
            CaptureFormat::Jpeg => ImageFormat::Jpeg,
        }
    }
}

/// An encoded still, held until it is saved or replaced by the next capture.
#[derive(Clone, Debug)]
pub struct CaptureArtifact {
    pub bytes: Vec<u8>,
    pub format: CaptureFormat,
    pub mode: FilterMode,
    pub taken_at: DateTime<Utc>,
    pub width: u32,
    pub height: u32,
}

impl CaptureArtifact {
    pub fn file_name(&self) -> String {
        capture_file_name(self.mode, self.taken_at, self.format)
    }
}

/// `RED FILTER` -> `red_filter`
pub fn mode_slug(mode: FilterMode) -> String {
    mode.label().split_whitespace().collect::<Vec<_>>().join("_").to_lowercase()
}

/// `capture-red_filter-2026-10-17T09-30-05-123Z.png`
pub fn capture_file_name(mode: FilterMode, taken_at: DateTime<Utc>, format: CaptureFormat) -> String {
    format!(
        "capture-{}-{}.{}",
        mode_slug(mode),
        taken_at.format("%Y-%m-%dT%H-%M-%S-%3fZ"),
        format.extension()
    )
}

/// Encode the current canvas pixels.
pub fn capture(
    frame: &FrameBuffer,
    mode: FilterMode,
    format: CaptureFormat,
    taken_at: DateTime<Utc>,
) -> Result<CaptureArtifact> {
    if frame.is_empty() {
        return Err(Error::Capture("nothing on the canvas yet".into()));
    }
    let (w, h) = (frame.width as u32, frame.height as u32);
    let img = RgbaImage::from_raw(w, h, frame.pixels.clone())
        .ok_or_else(|| Error::Capture("canvas buffer has the wrong length".into()))?;

    // JPEG has no alpha channel.
    let img = match format {
        CaptureFormat::Png => DynamicImage::ImageRgba8(img),
        CaptureFormat::Jpeg => DynamicImage::ImageRgb8(DynamicImage::ImageRgba8(img).to_rgb8()),
    };

    let mut bytes = Cursor::new(Vec::new());
    img.write_to(&mut bytes, format.image_format())?;

    Ok(CaptureArtifact {
        bytes: bytes.into_inner(),
        format,
        mode,
        taken_at,
        width: w,
        height: h,
    })
}

/// Write the artifact into `dir` (created if missing). Returns the file path.
pub fn export(artifact: &CaptureArtifact, dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(artifact.file_name());
    fs::write(&path, &artifact.bytes)?;
    info!(path = %path.display(), bytes = artifact.bytes.len(), "capture saved");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 17, 9, 30, 5).unwrap() + chrono::Duration::milliseconds(123)
    }

    #[test]
    fn file_name_matches_download_pattern() {
        assert_eq!(
            capture_file_name(FilterMode::Red, at(), CaptureFormat::Png),
            "capture-red_filter-2026-10-17T09-30-05-123Z.png"
        );
        assert_eq!(
            capture_file_name(FilterMode::Normal, at(), CaptureFormat::Jpeg),
            "capture-normal-2026-10-17T09-30-05-123Z.jpg"
        );
        assert_eq!(mode_slug(FilterMode::Blue), "blue_filter");
    }

    #[test]
    fn png_capture_decodes_to_the_canvas() {
        let frame = FrameBuffer::from_rgba(2, 1, vec![95, 0, 0, 255, 0, 0, 40, 255]).unwrap();
        let art = capture(&frame, FilterMode::Red, CaptureFormat::Png, at()).unwrap();
        assert_eq!((art.width, art.height), (2, 1));
        let back = image::load_from_memory(&art.bytes).unwrap().to_rgba8();
        assert_eq!(back.into_raw(), frame.pixels);
    }

    #[test]
    fn jpeg_capture_encodes() {
        let frame = FrameBuffer::new(16, 16);
        let art = capture(&frame, FilterMode::Blue, CaptureFormat::Jpeg, at()).unwrap();
        assert_eq!(image::guess_format(&art.bytes).unwrap(), ImageFormat::Jpeg);
    }

    #[test]
    fn empty_canvas_is_an_error() {
        let frame = FrameBuffer::new(0, 0);
        assert!(matches!(
            capture(&frame, FilterMode::Red, CaptureFormat::Png, at()),
            Err(Error::Capture(_))
        ));
    }

    #[test]
    fn export_creates_dir_and_file() {
        let dir = std::env::temp_dir().join(format!("chroma-cam-export-{}", std::process::id()));
        let frame = FrameBuffer::new(4, 4);
        let art = capture(&frame, FilterMode::Normal, CaptureFormat::Png, at()).unwrap();
        let path = export(&art, &dir.join("nested")).unwrap();
        assert_eq!(fs::read(&path).unwrap(), art.bytes);
        assert!(path.ends_with("capture-normal-2026-10-17T09-30-05-123Z.png"));
        let _ = fs::remove_dir_all(&dir);
    }
}
