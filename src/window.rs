// Window + input polling.
// Visual effects provided here:
// 1) A resizable window that shows the canvas (camera, filter and HUD).
// 2) Keys and mouse drags turned into `InputEvent`s for the shell.

use minifb::{Key, KeyRepeat, MouseButton, MouseMode, Window, WindowOptions};

use crate::error::{Error, Result};
use crate::input::{InputEvent, SwipeTracker};
use crate::types::FrameBuffer;

pub struct Drawer {
    window: Window,     // the on-screen window you see
    buffer: Vec<u32>,   // canvas packed as 0x00RRGGBB, reused every frame
    swipe: SwipeTracker,
    was_active: bool,
}

/// Key bindings. Keys without a binding are ignored.
fn key_event(key: Key) -> Option<InputEvent> {
    let ev = match key {
        Key::Right => InputEvent::CycleMode(1),
        Key::Left => InputEvent::CycleMode(-1),
        Key::Key1 => InputEvent::SelectMode(0),
        Key::Key2 => InputEvent::SelectMode(1),
        Key::Key3 => InputEvent::SelectMode(2),
        Key::Key4 => InputEvent::SelectMode(3),
        Key::Key5 => InputEvent::SelectMode(4),
        Key::Key6 => InputEvent::SelectMode(5),
        Key::Key7 => InputEvent::SelectMode(6),
        Key::Key8 => InputEvent::SelectMode(7),
        Key::Key9 => InputEvent::SelectMode(8),
        Key::Up => InputEvent::AdjustIntensity(0.1),
        Key::Down => InputEvent::AdjustIntensity(-0.1),
        Key::Z => InputEvent::Zoom(1),
        Key::X => InputEvent::Zoom(-1),
        Key::Space => InputEvent::TogglePause,
        Key::C => InputEvent::Capture,
        Key::S => InputEvent::Download,
        Key::V => InputEvent::SwitchCamera,
        Key::H => InputEvent::ToggleHud,
        Key::Escape => InputEvent::Quit,
        _ => return None,
    };
    Some(ev)
}

impl Drawer {
    /// Create a resizable window paced at `target_fps`.
    /// Visual: a new empty window appears with your chosen title.
    pub fn new(title: &str, width: usize, height: usize, target_fps: usize) -> Result<Self> {
        let opts = WindowOptions { resize: true, ..WindowOptions::default() };
        let mut window = Window::new(title, width, height, opts)
            .map_err(|e| Error::WindowInit(e.to_string()))?;
        window.set_target_fps(target_fps);
        Ok(Self { window, buffer: Vec::with_capacity(width * height), swipe: SwipeTracker::default(), was_active: true })
    }

    /// Push the pixels for this frame to the screen.
    /// Visual: the window immediately displays the new image.
    pub fn present(&mut self, frame: &FrameBuffer) -> Result<()> {
        frame.to_xrgb(&mut self.buffer);
        self.window
            .update_with_buffer(&self.buffer, frame.width, frame.height)
            .map_err(|e| Error::WindowUpdate(e.to_string()))?;
        Ok(())
    }

    /// Returns false when the user closes the window (so we can stop the loop).
    pub fn is_open(&self) -> bool {
        self.window.is_open()
    }

    /// Current drawable size; the canvas follows it.
    pub fn size(&self) -> (usize, usize) {
        self.window.get_size()
    }

    /// Everything the user did since the last call.
    pub fn poll(&mut self) -> Vec<InputEvent> {
        let mut events: Vec<InputEvent> = self
            .window
            .get_keys_pressed(KeyRepeat::No)
            .into_iter()
            .filter_map(key_event)
            .collect();

        let down = self.window.get_mouse_down(MouseButton::Left);
        let pos = self.window.get_mouse_pos(MouseMode::Discard);
        events.extend(self.swipe.update(down, pos));

        let active = self.window.is_active();
        if active != self.was_active {
            self.was_active = active;
            events.push(InputEvent::VisibilityChanged(active));
        }
        events
    }
}
