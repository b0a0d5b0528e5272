// Per-pixel colour filters.
// Visual: RED/BLUE modes recolour the whole frame through one of four
// "filter glass" policies; NORMAL/RAW leave the live image untouched.
//
// Every pixel is independent, so the buffer is split into chunks and run on
// the rayon pool. `filter_pixels` only returns once all chunks are done.

use std::ops::RangeInclusive;

use clap::ValueEnum;
use rayon::prelude::*;

/// Pixels per parallel work item.
const CHUNK_PIXELS: usize = 4096;

/// Which filter is active. RAW and NORMAL behave the same; only the label differs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FilterMode {
    Normal,
    Raw,
    Red,
    Blue,
}

impl FilterMode {
    /// Text shown in the mode banner and used in capture file names.
    pub fn label(self) -> &'static str {
        match self {
            FilterMode::Normal => "NORMAL",
            FilterMode::Raw => "RAW",
            FilterMode::Red => "RED FILTER",
            FilterMode::Blue => "BLUE FILTER",
        }
    }

    /// False for pass-through modes: the loop skips the readback entirely.
    pub fn filters(self) -> bool {
        matches!(self, FilterMode::Red | FilterMode::Blue)
    }
}

/// One revision of the channel filter formula.
pub trait FilterPolicy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Map one pixel's RGB for a filtering mode. Alpha never reaches here.
    fn apply(&self, mode: FilterMode, rgb: [u8; 3]) -> [u8; 3];
}

/// Perceptual brightness (Rec. 601 weights).
#[inline]
pub fn luminance(r: f32, g: f32, b: f32) -> f32 {
    0.299 * r + 0.587 * g + 0.114 * b
}

/// Round and saturate to a channel value (NaN becomes 0).
#[inline]
fn channel(v: f32) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

#[inline]
fn rgb_f32([r, g, b]: [u8; 3]) -> (f32, f32, f32) {
    (r as f32, g as f32, b as f32)
}

/// Canonical policy: the filtered channel carries the pixel's luminance.
/// Visual: a monochrome red (or blue) picture with normal brightness.
#[derive(Clone, Copy, Debug, Default)]
pub struct LuminanceIsolation;

impl FilterPolicy for LuminanceIsolation {
    fn name(&self) -> &'static str {
        "luminance"
    }

    fn apply(&self, mode: FilterMode, rgb: [u8; 3]) -> [u8; 3] {
        let (r, g, b) = rgb_f32(rgb);
        let lum = channel(luminance(r, g, b));
        match mode {
            FilterMode::Red => [lum, 0, 0],
            FilterMode::Blue => [0, 0, lum],
            FilterMode::Normal | FilterMode::Raw => rgb,
        }
    }
}

/// "Opposite colour decoder": keep only how much the complementary channel
/// beats the other two, scaled by `gain`.
/// Visual: harsh, almost binary; red ink vanishes under RED, blue marks glow.
#[derive(Clone, Copy, Debug)]
pub struct DifferenceIsolation {
    pub gain: f32,
}

impl FilterPolicy for DifferenceIsolation {
    fn name(&self) -> &'static str {
        "difference"
    }

    fn apply(&self, mode: FilterMode, rgb: [u8; 3]) -> [u8; 3] {
        let (r, g, b) = rgb_f32(rgb);
        match mode {
            // A red lens reveals what isn't red: isolate blue, show it as blue.
            FilterMode::Red => [0, 0, channel((b - r - g) * self.gain)],
            FilterMode::Blue => [channel((r - g - b) * self.gain), 0, 0],
            FilterMode::Normal | FilterMode::Raw => rgb,
        }
    }
}

/// Ink detection: fade the ink the lens hides into the paper tone, boost the other.
/// Neutral pixels pass through.
#[derive(Clone, Copy, Debug)]
pub struct InkMask {
    pub intensity: f32, // 1.0..=1.6
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Ink {
    Red,
    Blue,
    Neutral,
}

fn classify_ink(r: f32, g: f32, b: f32) -> Ink {
    if r > 1.25 * b && r > 1.1 * g {
        Ink::Red
    } else if b > 1.25 * r && b > 1.1 * g {
        Ink::Blue
    } else {
        Ink::Neutral
    }
}

impl InkMask {
    fn fade(&self, (r, g, b): (f32, f32, f32), lum: f32) -> [u8; 3] {
        let s = self.intensity / 1.6;
        [
            channel(r + (lum - r) * s),
            channel(g + (lum - g) * s),
            channel(b + (lum - b) * s),
        ]
    }

    fn boost(&self, (r, g, b): (f32, f32, f32), lum: f32) -> [u8; 3] {
        let k = self.intensity;
        [
            channel(lum + (r - lum) * k),
            channel(lum + (g - lum) * k),
            channel(lum + (b - lum) * k),
        ]
    }
}

impl FilterPolicy for InkMask {
    fn name(&self) -> &'static str {
        "ink"
    }

    fn apply(&self, mode: FilterMode, rgb: [u8; 3]) -> [u8; 3] {
        let c = rgb_f32(rgb);
        let lum = luminance(c.0, c.1, c.2);
        match (mode, classify_ink(c.0, c.1, c.2)) {
            (FilterMode::Red, Ink::Red) | (FilterMode::Blue, Ink::Blue) => self.fade(c, lum),
            (FilterMode::Red, Ink::Blue) | (FilterMode::Blue, Ink::Red) => self.boost(c, lum),
            _ => rgb,
        }
    }
}

/// Scale down the two channels a coloured lens would absorb.
/// Visual: a tinted, still full-colour picture; the lens colour stays untouched.
#[derive(Clone, Copy, Debug)]
pub struct LinearSuppression {
    pub intensity: f32, // 0.0..=1.0
}

impl FilterPolicy for LinearSuppression {
    fn name(&self) -> &'static str {
        "linear"
    }

    fn apply(&self, mode: FilterMode, rgb: [u8; 3]) -> [u8; 3] {
        let (r, g, b) = rgb_f32(rgb);
        let strong = 1.0 - 0.9 * self.intensity;
        let weak = 1.0 - 0.6 * self.intensity;
        match mode {
            FilterMode::Red => [rgb[0], channel(g * weak), channel(b * strong)],
            FilterMode::Blue => [channel(r * strong), channel(g * weak), rgb[2]],
            FilterMode::Normal | FilterMode::Raw => rgb,
        }
    }
}

/// Policy selector for config and the command line.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum PolicyKind {
    #[default]
    Luminance,
    Difference,
    Ink,
    Linear,
}

impl PolicyKind {
    pub fn name(self) -> &'static str {
        match self {
            PolicyKind::Luminance => "luminance",
            PolicyKind::Difference => "difference",
            PolicyKind::Ink => "ink",
            PolicyKind::Linear => "linear",
        }
    }

    /// Safe intensity range, or `None` when the policy has no knob.
    pub fn intensity_range(self) -> Option<RangeInclusive<f32>> {
        match self {
            PolicyKind::Luminance => None,
            PolicyKind::Difference => Some(1.0..=3.0),
            PolicyKind::Ink => Some(1.0..=1.6),
            PolicyKind::Linear => Some(0.0..=1.0),
        }
    }

    pub fn default_intensity(self) -> f32 {
        match self {
            PolicyKind::Luminance => 1.0,
            PolicyKind::Difference => 1.8,
            PolicyKind::Ink => 1.3,
            PolicyKind::Linear => 1.0,
        }
    }

    /// Clamp into the policy's range. Never rejects; NaN falls back to the default.
    pub fn clamp_intensity(self, value: f32) -> f32 {
        if value.is_nan() {
            return self.default_intensity();
        }
        match self.intensity_range() {
            Some(range) => value.clamp(*range.start(), *range.end()),
            None => self.default_intensity(),
        }
    }

    pub fn build(self, intensity: f32) -> Box<dyn FilterPolicy> {
        let i = self.clamp_intensity(intensity);
        match self {
            PolicyKind::Luminance => Box::new(LuminanceIsolation),
            PolicyKind::Difference => Box::new(DifferenceIsolation { gain: i }),
            PolicyKind::Ink => Box::new(InkMask { intensity: i }),
            PolicyKind::Linear => Box::new(LinearSuppression { intensity: i }),
        }
    }
}

/// Filter RGBA bytes in place. Alpha is never written; a trailing partial
/// pixel (length not a multiple of 4) is left untouched.
pub fn filter_pixels(data: &mut [u8], mode: FilterMode, policy: &dyn FilterPolicy) {
    if !mode.filters() {
        return;
    }
    let whole = data.len() - data.len() % 4;
    data[..whole]
        .par_chunks_mut(CHUNK_PIXELS * 4)
        .for_each(|chunk| {
            for px in chunk.chunks_exact_mut(4) {
                let [r, g, b] = policy.apply(mode, [px[0], px[1], px[2]]);
                px[0] = r;
                px[1] = g;
                px[2] = b;
            }
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_KINDS: [PolicyKind; 4] = [
        PolicyKind::Luminance,
        PolicyKind::Difference,
        PolicyKind::Ink,
        PolicyKind::Linear,
    ];

    /// Every (r,g,b) on a 15-step grid including 0 and 255, with varying alpha.
    fn grid() -> Vec<u8> {
        let steps: Vec<u8> = (0..=255u16).step_by(15).map(|v| v as u8).chain([255]).collect();
        let mut out = Vec::new();
        for (i, &r) in steps.iter().enumerate() {
            for &g in &steps {
                for &b in &steps {
                    out.extend_from_slice(&[r, g, b, (i * 13) as u8]);
                }
            }
        }
        out
    }

    #[test]
    fn reddish_pixel_under_red_luminance() {
        let mut px = vec![200, 50, 50, 255];
        filter_pixels(&mut px, FilterMode::Red, &LuminanceIsolation);
        assert_eq!(px, vec![95, 0, 0, 255]);
    }

    #[test]
    fn blue_luminance_moves_to_blue_channel() {
        let mut px = vec![200, 50, 50, 10];
        filter_pixels(&mut px, FilterMode::Blue, &LuminanceIsolation);
        assert_eq!(px, vec![0, 0, 95, 10]);
    }

    #[test]
    fn pass_through_modes_are_byte_identical() {
        for kind in ALL_KINDS {
            let policy = kind.build(kind.default_intensity());
            assert_eq!(policy.name(), kind.name());
            for mode in [FilterMode::Normal, FilterMode::Raw] {
                let mut data = grid();
                let before = data.clone();
                filter_pixels(&mut data, mode, policy.as_ref());
                assert_eq!(data, before, "{} / {:?}", policy.name(), mode);
            }
        }
    }

    #[test]
    fn alpha_survives_every_policy_and_mode() {
        for kind in ALL_KINDS {
            let range = kind.intensity_range().unwrap_or(1.0..=1.0);
            for intensity in [*range.start(), *range.end()] {
                let policy = kind.build(intensity);
                for mode in [FilterMode::Red, FilterMode::Blue] {
                    let mut data = grid();
                    let before = data.clone();
                    filter_pixels(&mut data, mode, policy.as_ref());
                    for (a, b) in data.chunks_exact(4).zip(before.chunks_exact(4)) {
                        assert_eq!(a[3], b[3]);
                    }
                }
            }
        }
    }

    #[test]
    fn difference_saturates_instead_of_wrapping() {
        let p = DifferenceIsolation { gain: 1.8 };
        // 255 * 1.8 = 459 -> 255
        assert_eq!(p.apply(FilterMode::Red, [0, 0, 255]), [0, 0, 255]);
        // negative difference -> 0
        assert_eq!(p.apply(FilterMode::Red, [255, 255, 0]), [0, 0, 0]);
        assert_eq!(p.apply(FilterMode::Blue, [255, 0, 0]), [255, 0, 0]);
        // (100 - 20 - 30) * 1.8 = 90
        assert_eq!(p.apply(FilterMode::Blue, [100, 20, 30]), [90, 0, 0]);
    }

    #[test]
    fn ink_mask_fades_hidden_ink_and_leaves_neutral() {
        let p = InkMask { intensity: 1.6 };
        // full strength: red ink becomes its own luminance grey
        let [r, g, b] = p.apply(FilterMode::Red, [200, 50, 50]);
        assert_eq!((r, g, b), (95, 95, 95));
        // neutral grey passes through
        assert_eq!(p.apply(FilterMode::Red, [120, 120, 120]), [120, 120, 120]);
        // blue ink under red lens is pushed further from grey
        let boosted = p.apply(FilterMode::Red, [40, 60, 200]);
        assert!(boosted[2] > 200 && boosted[0] < 40);
        // roles swap under the blue lens
        assert_eq!(p.apply(FilterMode::Blue, [50, 50, 200]), {
            let lum = channel(luminance(50.0, 50.0, 200.0));
            [lum, lum, lum]
        });
    }

    #[test]
    fn linear_suppression_keeps_lens_channel() {
        let p = LinearSuppression { intensity: 1.0 };
        assert_eq!(p.apply(FilterMode::Red, [200, 100, 100]), [200, 40, 10]);
        assert_eq!(p.apply(FilterMode::Blue, [100, 100, 200]), [10, 40, 200]);
        let off = LinearSuppression { intensity: 0.0 };
        assert_eq!(off.apply(FilterMode::Red, [1, 2, 3]), [1, 2, 3]);
    }

    #[test]
    fn intensity_is_clamped_not_rejected() {
        assert_eq!(PolicyKind::Linear.clamp_intensity(4.0), 1.0);
        assert_eq!(PolicyKind::Linear.clamp_intensity(-1.0), 0.0);
        assert_eq!(PolicyKind::Ink.clamp_intensity(0.2), 1.0);
        assert_eq!(PolicyKind::Difference.clamp_intensity(f32::NAN), 1.8);
        assert_eq!(PolicyKind::Luminance.clamp_intensity(7.0), 1.0);
    }

    #[test]
    fn trailing_partial_pixel_is_untouched() {
        let mut data = vec![200, 50, 50, 255, 9, 9, 9];
        filter_pixels(&mut data, FilterMode::Red, &LuminanceIsolation);
        assert_eq!(data, vec![95, 0, 0, 255, 9, 9, 9]);
    }

    #[test]
    fn large_buffers_match_per_pixel_apply() {
        // spans several parallel chunks
        let n = CHUNK_PIXELS * 3 + 17;
        let mut data: Vec<u8> = (0..n * 4).map(|i| (i * 7 % 256) as u8).collect();
        let expected: Vec<u8> = data
            .chunks_exact(4)
            .flat_map(|px| {
                let [r, g, b] = LuminanceIsolation.apply(FilterMode::Blue, [px[0], px[1], px[2]]);
                [r, g, b, px[3]]
            })
            .collect();
        filter_pixels(&mut data, FilterMode::Blue, &LuminanceIsolation);
        assert_eq!(data, expected);
    }
}
