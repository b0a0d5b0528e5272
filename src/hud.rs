// On-screen feedback drawn over the presented frame (never into captures).
// Visual effects provided here:
// 1) A big mode banner that pops up for ~1.2 s after every mode change,
//    with a short dim-and-recover flash of the picture.
// 2) A tiny 5x7 bitmap font for the status line (mode | policy | FPS).
// 3) An FPS counter that updates once per second.

use std::time::{Duration, Instant};

use crate::types::FrameBuffer;

pub const BANNER_DURATION: Duration = Duration::from_millis(1200);
pub const FLASH_DURATION: Duration = Duration::from_millis(240);
const FLASH_DIM: f32 = 0.35;

/* ---------- pixels ---------- */

/// Put an opaque pixel (colour is 0x00RRGGBB) if (x,y) is inside bounds.
#[inline]
fn put_pixel(fb: &mut FrameBuffer, x: i32, y: i32, color: u32) {
    if x < 0 || y < 0 {
        return;
    }
    let (x, y) = (x as usize, y as usize);
    if x >= fb.width || y >= fb.height {
        return;
    }
    let i = (y * fb.width + x) * 4;
    if let Some(px) = fb.pixels.get_mut(i..i + 4) {
        px.copy_from_slice(&[(color >> 16) as u8, (color >> 8) as u8, color as u8, 255]);
    }
}

/// Fill a `scale x scale` block: one font pixel at the given scale.
fn put_block(fb: &mut FrameBuffer, x: i32, y: i32, scale: i32, color: u32) {
    for dy in 0..scale {
        for dx in 0..scale {
            put_pixel(fb, x + dx, y + dy, color);
        }
    }
}

/// Darken every pixel by `amount` in [0,1]; alpha untouched.
pub fn dim(fb: &mut FrameBuffer, amount: f32) {
    let keep = 1.0 - amount.clamp(0.0, 1.0);
    for px in fb.pixels.chunks_exact_mut(4) {
        for c in &mut px[..3] {
            *c = (*c as f32 * keep).round() as u8;
        }
    }
}

/* ---------- 5x7 bitmap font ---------- */

/// 5x7 glyph bitmap. Each u8 is a row; the low 5 bits are the pixels (bit 4 = leftmost).
/// Lowercase is drawn as uppercase.
fn glyph5x7(ch: char) -> Option<[u8; 7]> {
    macro_rules! g { ($a:expr,$b:expr,$c:expr,$d:expr,$e:expr,$f:expr,$g:expr) => {
        Some([$a,$b,$c,$d,$e,$f,$g])
    }; }

    match ch.to_ascii_uppercase() {
        '0' => g!(0b01110,0b10001,0b10011,0b10101,0b11001,0b10001,0b01110),
        '1' => g!(0b00100,0b01100,0b00100,0b00100,0b00100,0b00100,0b01110),
        '2' => g!(0b01110,0b10001,0b00001,0b00010,0b00100,0b01000,0b11111),
        '3' => g!(0b11110,0b00001,0b00001,0b01110,0b00001,0b00001,0b11110),
        '4' => g!(0b00010,0b00110,0b01010,0b10010,0b11111,0b00010,0b00010),
        '5' => g!(0b11111,0b10000,0b11110,0b00001,0b00001,0b10001,0b01110),
        '6' => g!(0b00110,0b01000,0b10000,0b11110,0b10001,0b10001,0b01110),
        '7' => g!(0b11111,0b00001,0b00010,0b00100,0b01000,0b01000,0b01000),
        '8' => g!(0b01110,0b10001,0b10001,0b01110,0b10001,0b10001,0b01110),
        '9' => g!(0b01110,0b10001,0b10001,0b01111,0b00001,0b00010,0b01100),

        'A' => g!(0b01110,0b10001,0b10001,0b11111,0b10001,0b10001,0b10001),
        'B' => g!(0b11110,0b10001,0b10001,0b11110,0b10001,0b10001,0b11110),
        'C' => g!(0b01110,0b10001,0b10000,0b10000,0b10000,0b10001,0b01110),
        'D' => g!(0b11100,0b10010,0b10001,0b10001,0b10001,0b10010,0b11100),
        'E' => g!(0b11111,0b10000,0b10000,0b11110,0b10000,0b10000,0b11111),
        'F' => g!(0b11111,0b10000,0b10000,0b11110,0b10000,0b10000,0b10000),
        'G' => g!(0b01110,0b10001,0b10000,0b10111,0b10001,0b10001,0b01111),
        'H' => g!(0b10001,0b10001,0b10001,0b11111,0b10001,0b10001,0b10001),
        'I' => g!(0b01110,0b00100,0b00100,0b00100,0b00100,0b00100,0b01110),
        'J' => g!(0b00111,0b00010,0b00010,0b00010,0b00010,0b10010,0b01100),
        'K' => g!(0b10001,0b10010,0b10100,0b11000,0b10100,0b10010,0b10001),
        'L' => g!(0b10000,0b10000,0b10000,0b10000,0b10000,0b10000,0b11111),
        'M' => g!(0b10001,0b11011,0b10101,0b10101,0b10001,0b10001,0b10001),
        'N' => g!(0b10001,0b10001,0b11001,0b10101,0b10011,0b10001,0b10001),
        'O' => g!(0b01110,0b10001,0b10001,0b10001,0b10001,0b10001,0b01110),
        'P' => g!(0b11110,0b10001,0b10001,0b11110,0b10000,0b10000,0b10000),
        'Q' => g!(0b01110,0b10001,0b10001,0b10001,0b10101,0b10010,0b01101),
        'R' => g!(0b11110,0b10001,0b10001,0b11110,0b10100,0b10010,0b10001),
        'S' => g!(0b01111,0b10000,0b10000,0b01110,0b00001,0b00001,0b11110),
        'T' => g!(0b11111,0b00100,0b00100,0b00100,0b00100,0b00100,0b00100),
        'U' => g!(0b10001,0b10001,0b10001,0b10001,0b10001,0b10001,0b01110),
        'V' => g!(0b10001,0b10001,0b10001,0b10001,0b10001,0b01010,0b00100),
        'W' => g!(0b10001,0b10001,0b10001,0b10101,0b10101,0b10101,0b01010),
        'X' => g!(0b10001,0b10001,0b01010,0b00100,0b01010,0b10001,0b10001),
        'Y' => g!(0b10001,0b10001,0b01010,0b00100,0b00100,0b00100,0b00100),
        'Z' => g!(0b11111,0b00001,0b00010,0b00100,0b01000,0b10000,0b11111),

        ' ' => g!(0b00000,0b00000,0b00000,0b00000,0b00000,0b00000,0b00000),
        '|' => g!(0b00100,0b00100,0b00100,0b00100,0b00100,0b00100,0b00100),
        ':' => g!(0b00000,0b00100,0b00000,0b00000,0b00100,0b00000,0b00000),
        '.' => g!(0b00000,0b00000,0b00000,0b00000,0b00000,0b00100,0b00000),
        '-' => g!(0b00000,0b00000,0b00000,0b11111,0b00000,0b00000,0b00000),
        '_' => g!(0b00000,0b00000,0b00000,0b00000,0b00000,0b00000,0b11111),
        '/' => g!(0b00001,0b00010,0b00010,0b00100,0b01000,0b01000,0b10000),

        _ => None,
    }
}

/// Advance per glyph at scale 1 (5 pixels + 1 spacing).
const GLYPH_ADVANCE: i32 = 6;

/// Width in pixels of `text` drawn at `scale`.
pub fn text_width(text: &str, scale: i32) -> i32 {
    text.chars().count() as i32 * GLYPH_ADVANCE * scale
}

fn draw_char_5x7(fb: &mut FrameBuffer, x: i32, y: i32, ch: char, scale: i32, color: u32) {
    let Some(rows) = glyph5x7(ch) else { return };
    // Shadow pass first, offset by one font pixel, then the glyph itself.
    for (offset, c) in [(scale, 0x00_00_00_00), (0, color)] {
        for (ry, rowbits) in rows.iter().enumerate() {
            for rx in 0..5 {
                if (rowbits & (1 << (4 - rx))) != 0 {
                    put_block(fb, x + rx * scale + offset, y + ry as i32 * scale + offset, scale, c);
                }
            }
        }
    }
}

/// Draw a text string using 5x7 glyphs, each font pixel a `scale`-sized block.
pub fn draw_text_5x7(fb: &mut FrameBuffer, mut x: i32, y: i32, text: &str, scale: i32, color: u32) {
    let scale = scale.max(1);
    for ch in text.chars() {
        draw_char_5x7(fb, x, y, ch, scale, color);
        x += GLYPH_ADVANCE * scale;
    }
}

/* ---------- mode banner ---------- */

/// Transient label shown after a mode change.
#[derive(Debug, Default)]
pub struct ModeBanner {
    text: String,
    shown_at: Option<Instant>,
}

impl ModeBanner {
    pub fn show(&mut self, text: impl Into<String>, now: Instant) {
        self.text = text.into();
        self.shown_at = Some(now);
    }

    pub fn is_visible(&self, now: Instant) -> bool {
        self.shown_at
            .is_some_and(|t| now.saturating_duration_since(t) < BANNER_DURATION)
    }

    /// How much to dim the picture right now: strongest at the change, gone after the flash.
    pub fn flash_dim(&self, now: Instant) -> f32 {
        let Some(t) = self.shown_at else { return 0.0 };
        let age = now.saturating_duration_since(t);
        if age >= FLASH_DURATION {
            return 0.0;
        }
        FLASH_DIM * (1.0 - age.as_secs_f32() / FLASH_DURATION.as_secs_f32())
    }

    /// Visual: dims the frame briefly, then draws the label centred near the top.
    pub fn render(&self, fb: &mut FrameBuffer, now: Instant) {
        let flash = self.flash_dim(now);
        if flash > 0.0 {
            dim(fb, flash);
        }
        if !self.is_visible(now) {
            return;
        }
        // Roughly 1/24 of the frame height per font row, at least 2x.
        let scale = (fb.height as i32 / 168).max(2);
        let x = (fb.width as i32 - text_width(&self.text, scale)) / 2;
        let y = fb.height as i32 / 8;
        draw_text_5x7(fb, x, y, &self.text, scale, 0x00_FF_FF_FF);
    }
}

/* ---------- FPS ---------- */

/// Frames counted over one-second windows.
#[derive(Debug)]
pub struct FpsCounter {
    window_start: Instant,
    frames: u32,
    fps: f32,
}

impl FpsCounter {
    pub fn new(now: Instant) -> Self {
        Self { window_start: now, frames: 0, fps: 0.0 }
    }

    /// Count one presented frame. Returns the new FPS once per second.
    pub fn frame(&mut self, now: Instant) -> Option<f32> {
        self.frames += 1;
        let elapsed = now.saturating_duration_since(self.window_start);
        if elapsed < Duration::from_secs(1) {
            return None;
        }
        self.fps = self.frames as f32 / elapsed.as_secs_f32();
        self.frames = 0;
        self.window_start = now;
        Some(self.fps)
    }

    pub fn fps(&self) -> f32 {
        self.fps
    }
}
