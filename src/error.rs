// Error type for the viewer.
// Every variant states *where* things went wrong; the render loop decides
// which of them are per-frame hiccups and which end the session.

/// Convenience result type used across the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Creating the window failed.
    #[error("window init error: {0}")]
    WindowInit(String),

    /// Pushing a buffer to the window failed.
    #[error("window update error: {0}")]
    WindowUpdate(String),

    /// Opening/starting the camera failed. Fatal to the session.
    #[error("camera init error: {0}")]
    CameraInit(String),

    /// Grabbing/decoding a frame failed.
    #[error("camera frame error: {0}")]
    CameraFrame(String),

    /// Reading pixels back from the display surface failed.
    #[error("surface read error: {0}")]
    SurfaceRead(String),

    /// Writing filtered pixels back to the display surface failed.
    #[error("surface write error: {0}")]
    SurfaceWrite(String),

    /// Snapshotting or exporting a capture failed.
    #[error("capture error: {0}")]
    Capture(String),

    #[error(transparent)]
    Image(#[from] image::ImageError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Errors that only spoil the current frame; the loop logs them and keeps ticking.
    pub fn is_per_frame(&self) -> bool {
        matches!(
            self,
            Error::CameraFrame(_) | Error::SurfaceRead(_) | Error::SurfaceWrite(_)
        )
    }
}
