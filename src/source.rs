// The video source seam, plus a synthetic source for running without a camera.

use crate::error::{Error, Result};
use crate::types::FrameBuffer;

pub trait VideoSource {
    /// Size of the frames being delivered; (0, 0) while unknown.
    fn dimensions(&self) -> (u32, u32);

    /// Latest frame as RGBA. May block until the device has one.
    fn next_frame(&mut self) -> Result<FrameBuffer>;

    /// Release the device. Safe to call any number of times.
    fn stop(&mut self);
}

/// Classic eight colour bars: white, yellow, cyan, green, magenta, red, blue, black.
const BARS: [[u8; 3]; 8] = [
    [235, 235, 235],
    [235, 235, 16],
    [16, 235, 235],
    [16, 235, 16],
    [235, 16, 235],
    [235, 16, 16],
    [16, 16, 235],
    [16, 16, 16],
];

/// Animated colour bars with a bright sweep line.
/// Visual: the bars stay put; a white line crawls down the frame so you can
/// tell the loop is live.
pub struct TestPattern {
    width: u32,
    height: u32,
    frame_no: u64,
    stopped: bool,
}

impl TestPattern {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height, frame_no: 0, stopped: false }
    }

    pub fn frames_served(&self) -> u64 {
        self.frame_no
    }
}

impl VideoSource for TestPattern {
    fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn next_frame(&mut self) -> Result<FrameBuffer> {
        if self.stopped {
            return Err(Error::CameraFrame("test pattern stopped".into()));
        }
        let (w, h) = (self.width as usize, self.height as usize);
        let sweep = if h == 0 { 0 } else { (self.frame_no % h as u64) as usize };
        let mut fb = FrameBuffer::new(w, h);
        for (i, px) in fb.pixels.chunks_exact_mut(4).enumerate() {
            let (x, y) = (i % w, i / w);
            let [r, g, b] = if y == sweep { [255, 255, 255] } else { BARS[x * BARS.len() / w] };
            px[..3].copy_from_slice(&[r, g, b]);
        }
        self.frame_no += 1;
        Ok(fb)
    }

    fn stop(&mut self) {
        self.stopped = true;
    }
}
