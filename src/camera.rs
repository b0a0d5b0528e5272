// Opens a camera and converts its frames into RGBA buffers for the canvas.
// Visual expectation: when the render loop calls `next_frame()`, you get the
// newest camera picture, ready to be cover-scaled into the window.

use image::DynamicImage;
use nokhwa::{
    Camera,
    pixel_format::RgbFormat,
    utils::{
        ApiBackend, CameraFormat, CameraIndex, ControlValueDescription, ControlValueSetter,
        FrameFormat, KnownCameraControl, RequestedFormat, RequestedFormatType, Resolution,
    },
};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::source::VideoSource;
use crate::types::FrameBuffer;

/// What we ask the device for; it may deliver something close instead.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CameraRequest {
    pub index: u32,
    pub width: u32,
    pub height: u32,
    pub fps: u32,
}

// A small wrapper around nokhwa::Camera so the render loop stays clean.
pub struct CameraSource {
    cam: Camera,
    request: CameraRequest,
    index: u32,
    width: u32,
    height: u32,
    streaming: bool,
    fell_back: bool,
}

/// Create the camera and start streaming (this might fail if no device exists).
fn open_stream(index: u32, format: RequestedFormatType) -> Result<Camera> {
    let req = RequestedFormat::new::<RgbFormat>(format);
    let mut cam = Camera::new(CameraIndex::Index(index), req)
        .map_err(|e| Error::CameraInit(format!("Create camera #{index}: {e}")))?;
    cam.open_stream()
        .map_err(|e| Error::CameraInit(format!("Open stream #{index}: {e}")))?;
    Ok(cam)
}

impl CameraSource {
    /// Open the requested device, falling back to any format on it, then to
    /// device 0. The first failure that leaves no fallback is returned.
    pub fn open(request: CameraRequest) -> Result<Self> {
        let fmt = CameraFormat::new(
            Resolution::new(request.width, request.height),
            FrameFormat::YUYV, // uncompressed; cheap to convert to RGB
            request.fps,
        );

        let mut attempts = vec![
            (request.index, RequestedFormatType::Closest(fmt)),
            (request.index, RequestedFormatType::None),
        ];
        if request.index != 0 {
            attempts.push((0, RequestedFormatType::None));
        }

        let mut last_err = None;
        for (n, (index, format)) in attempts.into_iter().enumerate() {
            match open_stream(index, format) {
                Ok(cam) => {
                    // The actual stream might choose a slightly different resolution.
                    let actual = cam.resolution();
                    info!(
                        index,
                        width = actual.width(),
                        height = actual.height(),
                        fps = cam.frame_rate(),
                        fallback = n > 0,
                        "camera streaming"
                    );
                    return Ok(Self {
                        cam,
                        request,
                        index,
                        width: actual.width(),
                        height: actual.height(),
                        streaming: true,
                        fell_back: n > 0,
                    });
                }
                Err(err) => {
                    warn!(error = %err, index, "camera attempt failed");
                    last_err = Some(err);
                }
            }
        }
        Err(last_err.unwrap_or_else(|| Error::CameraInit("no camera attempts made".into())))
    }

    /// Device index actually in use.
    pub fn index(&self) -> u32 {
        self.index
    }

    /// True when the requested device/format couldn't be used as asked.
    pub fn fell_back(&self) -> bool {
        self.fell_back
    }

    /// Close this device and open the next one the OS lists (wrapping around).
    /// On failure the old stream stays closed and the error is fatal to the session.
    pub fn switch_to_next(&mut self) -> Result<()> {
        let count = nokhwa::query(ApiBackend::Auto)
            .map(|devices| devices.len() as u32)
            .unwrap_or_else(|err| {
                warn!(error = %err, "could not list cameras");
                0
            });
        let next = if count > 1 { (self.index + 1) % count } else { self.index };
        self.stop();
        *self = Self::open(CameraRequest { index: next, ..self.request })?;
        Ok(())
    }

    /// Step the device zoom, if it has one. Returns the new zoom value.
    pub fn adjust_zoom(&mut self, steps: i32) -> Option<i64> {
        let control = match self.cam.camera_control(KnownCameraControl::Zoom) {
            Ok(control) => control,
            Err(err) => {
                debug!(error = %err, "camera has no zoom control");
                return None;
            }
        };
        let (min, max, value, step) = match control.description() {
            ControlValueDescription::IntegerRange { min, max, value, step, .. } => (*min, *max, *value, *step),
            other => {
                debug!(?other, "zoom control is not an integer range");
                return None;
            }
        };
        let target = (value + steps as i64 * step.max(1)).clamp(min, max);
        match self
            .cam
            .set_camera_control(KnownCameraControl::Zoom, ControlValueSetter::Integer(target))
        {
            Ok(()) => Some(target),
            Err(err) => {
                warn!(error = %err, target, "setting zoom failed");
                None
            }
        }
    }
}

impl VideoSource for CameraSource {
    fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Grab one frame and convert it to RGBA.
    fn next_frame(&mut self) -> Result<FrameBuffer> {
        if !self.streaming {
            return Err(Error::CameraInit("camera stream is closed".into()));
        }
        // 1) Pull a frame from the camera (this blocks until a new frame is ready).
        let frame = self
            .cam
            .frame()
            .map_err(|e| Error::CameraFrame(format!("Fetch frame: {e}")))?;

        // 2) Decode to an ImageBuffer<Rgb<u8>, Vec<u8>> (handles various raw formats safely).
        let rgb_img = frame
            .decode_image::<RgbFormat>()
            .map_err(|e| Error::CameraFrame(format!("Decode RGB: {e}")))?;

        // 3) Add an opaque alpha channel.
        let rgba = DynamicImage::ImageRgb8(rgb_img).into_rgba8();
        let fb = FrameBuffer::from_image(rgba);
        self.width = fb.width as u32;
        self.height = fb.height as u32;
        Ok(fb)
    }

    fn stop(&mut self) {
        if !self.streaming {
            return;
        }
        self.streaming = false;
        match self.cam.stop_stream() {
            Ok(()) => info!(index = self.index, "camera stopped"),
            Err(err) => warn!(error = %err, "stopping camera stream failed"),
        }
    }
}

impl Drop for CameraSource {
    fn drop(&mut self) {
        self.stop();
    }
}
