// chroma-cam: live camera viewer with red/blue channel filters.
//
// Per frame: grab from the camera -> cover-scale into the canvas -> run the
// active filter over the canvas pixels -> present. The headless core (filter,
// compositor, mode cycle, render loop, capture) builds without the `camera`
// feature; `camera` and `window` are the native host.

pub mod capture;
pub mod compositor;
pub mod config;
pub mod error;
pub mod filter;
pub mod hud;
pub mod input;
pub mod mode;
pub mod render_loop;
pub mod source;
pub mod surface;
pub mod types;

#[cfg(feature = "camera")]
pub mod camera;
#[cfg(feature = "camera")]
pub mod window;

pub use error::{Error, Result};
pub use filter::{filter_pixels, FilterMode, FilterPolicy, PolicyKind};
pub use mode::{ModeChanged, ModeCycle, ModeSet};
pub use render_loop::{LoopSettings, RenderLoop, SessionState, TickOutcome};
pub use types::{FrameBuffer, RenderRect};
