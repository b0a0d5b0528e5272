// Command-line configuration, resolved into a plain `ViewerConfig`.

use std::path::PathBuf;

use clap::{ArgAction, Parser};
use tracing::Level;

use crate::capture::CaptureFormat;
use crate::compositor::ScaleQuality;
use crate::filter::PolicyKind;
use crate::mode::ModeSet;
use crate::render_loop::LoopSettings;

#[derive(Parser, Debug)]
#[command(name = "chroma-cam", version, about = "Live camera viewer with red/blue channel filters")]
pub struct Args {
    /// Camera device index to open first.
    #[arg(long, default_value_t = 0)]
    pub camera: u32,

    /// Requested capture resolution (the device may pick the closest it supports).
    #[arg(long, default_value_t = 1280)]
    pub camera_width: u32,

    #[arg(long, default_value_t = 720)]
    pub camera_height: u32,

    /// Requested camera frame rate.
    #[arg(long, default_value_t = 30)]
    pub camera_fps: u32,

    /// Initial window size; the canvas follows the window when resized.
    #[arg(long, default_value_t = 1280)]
    pub width: usize,

    #[arg(long, default_value_t = 720)]
    pub height: usize,

    /// Render loop cadence.
    #[arg(long, default_value_t = 60)]
    pub fps: usize,

    /// Which modes the viewer cycles through.
    #[arg(long, value_enum, default_value_t = ModeSet::NormalRedBlue)]
    pub modes: ModeSet,

    /// Filter formula used by the RED/BLUE modes.
    #[arg(long, value_enum, default_value_t = PolicyKind::Luminance)]
    pub policy: PolicyKind,

    /// Filter strength; clamped to the policy's range (defaults per policy).
    #[arg(long)]
    pub intensity: Option<f32>,

    /// Resampling used when scaling the camera onto the canvas.
    #[arg(long, value_enum, default_value_t = ScaleQuality::Fast)]
    pub scale: ScaleQuality,

    /// Where saved captures go.
    #[arg(long, default_value = "captures")]
    pub capture_dir: PathBuf,

    #[arg(long, value_enum, default_value_t = CaptureFormat::Png)]
    pub capture_format: CaptureFormat,

    /// Use synthetic colour bars instead of a camera.
    #[arg(long)]
    pub test_pattern: bool,

    /// Stop rendering while the window is unfocused.
    #[arg(long)]
    pub pause_unfocused: bool,

    /// Hide the status line.
    #[arg(long)]
    pub no_hud: bool,

    /// Consecutive failed frames before giving up on the camera.
    #[arg(long, default_value_t = 30)]
    pub max_frame_failures: u32,

    /// -v for debug, -vv for trace.
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ViewerConfig {
    pub camera_index: u32,
    pub camera_size: (u32, u32),
    pub camera_fps: u32,
    pub window_size: (usize, usize),
    pub target_fps: usize,
    pub modes: ModeSet,
    pub policy: PolicyKind,
    pub intensity: f32,
    pub scale: ScaleQuality,
    pub capture_dir: PathBuf,
    pub capture_format: CaptureFormat,
    pub test_pattern: bool,
    pub pause_unfocused: bool,
    pub show_hud: bool,
    pub max_frame_failures: u32,
    pub log_level: Level,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            camera_index: 0,
            camera_size: (1280, 720),
            camera_fps: 30,
            window_size: (1280, 720),
            target_fps: 60,
            modes: ModeSet::default(),
            policy: PolicyKind::default(),
            intensity: PolicyKind::default().default_intensity(),
            scale: ScaleQuality::default(),
            capture_dir: PathBuf::from("captures"),
            capture_format: CaptureFormat::default(),
            test_pattern: false,
            pause_unfocused: false,
            show_hud: true,
            max_frame_failures: 30,
            log_level: Level::INFO,
        }
    }
}

impl From<Args> for ViewerConfig {
    fn from(args: Args) -> Self {
        let intensity = args
            .intensity
            .map_or(args.policy.default_intensity(), |v| args.policy.clamp_intensity(v));
        Self {
            camera_index: args.camera,
            camera_size: (args.camera_width.max(1), args.camera_height.max(1)),
            camera_fps: args.camera_fps.max(1),
            window_size: (args.width.max(1), args.height.max(1)),
            target_fps: args.fps.max(1),
            modes: args.modes,
            policy: args.policy,
            intensity,
            scale: args.scale,
            capture_dir: args.capture_dir,
            capture_format: args.capture_format,
            test_pattern: args.test_pattern,
            pause_unfocused: args.pause_unfocused,
            show_hud: !args.no_hud,
            max_frame_failures: args.max_frame_failures.max(1),
            log_level: match args.verbose {
                0 => Level::INFO,
                1 => Level::DEBUG,
                _ => Level::TRACE,
            },
        }
    }
}

impl ViewerConfig {
    pub fn loop_settings(&self) -> LoopSettings {
        LoopSettings {
            modes: self.modes,
            policy: self.policy,
            intensity: self.intensity,
            max_frame_failures: self.max_frame_failures,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> ViewerConfig {
        let argv = std::iter::once("chroma-cam").chain(args.iter().copied());
        ViewerConfig::from(Args::try_parse_from(argv).unwrap())
    }

    #[test]
    fn defaults_match_config_default() {
        assert_eq!(parse(&[]), ViewerConfig::default());
    }

    #[test]
    fn intensity_defaults_per_policy_and_is_clamped() {
        assert_eq!(parse(&["--policy", "difference"]).intensity, 1.8);
        assert_eq!(parse(&["--policy", "ink", "--intensity", "9"]).intensity, 1.6);
        assert_eq!(parse(&["--policy", "linear", "--intensity=-2"]).intensity, 0.0);
    }

    #[test]
    fn value_enums_and_flags() {
        let cfg = parse(&[
            "--modes", "raw-red-blue",
            "--capture-format", "jpeg",
            "--scale", "smooth",
            "--test-pattern",
            "--no-hud",
            "-vv",
        ]);
        assert_eq!(cfg.modes, ModeSet::RawRedBlue);
        assert_eq!(cfg.capture_format, CaptureFormat::Jpeg);
        assert_eq!(cfg.scale, ScaleQuality::Smooth);
        assert!(cfg.test_pattern);
        assert!(!cfg.show_hud);
        assert_eq!(cfg.log_level, Level::TRACE);
    }

    #[test]
    fn zero_sizes_are_bumped_to_one() {
        let cfg = parse(&["--width", "0", "--fps", "0", "--max-frame-failures", "0"]);
        assert_eq!(cfg.window_size.0, 1);
        assert_eq!(cfg.target_fps, 1);
        assert_eq!(cfg.max_frame_failures, 1);
    }

    #[test]
    fn unknown_policy_is_rejected() {
        assert!(Args::try_parse_from(["chroma-cam", "--policy", "sepia"]).is_err());
    }
}
