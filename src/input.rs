// Discrete input events, independent of where they come from.
// The window turns keys and mouse drags into these; the shell applies them
// between ticks so the render loop never reads input state itself.

/// Minimum horizontal travel for a drag to count as a swipe.
pub const SWIPE_THRESHOLD_PX: f32 = 40.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum InputEvent {
    /// Step through the mode cycle (+1 next, -1 previous, any delta allowed).
    CycleMode(i64),
    /// Jump to the mode at this position.
    SelectMode(usize),
    /// Nudge the filter intensity; the result is clamped by the policy.
    AdjustIntensity(f32),
    /// Camera zoom steps, where the device supports it.
    Zoom(i32),
    TogglePause,
    /// The window gained/lost visibility (focus, in the native host).
    VisibilityChanged(bool),
    Capture,
    /// Write the last capture to disk.
    Download,
    SwitchCamera,
    /// Show/hide the status line.
    ToggleHud,
    Quit,
}

/// Horizontal swipe -> mode step. Right is +1, left is -1; mostly-vertical
/// or short drags are ignored.
pub fn classify_swipe(dx: f32, dy: f32) -> Option<i64> {
    if dx.abs() > SWIPE_THRESHOLD_PX && dx.abs() > dy.abs() {
        Some(if dx > 0.0 { 1 } else { -1 })
    } else {
        None
    }
}

/// Press/release pairing for pointer drags.
#[derive(Clone, Copy, Debug, Default)]
pub struct SwipeTracker {
    start: Option<(f32, f32)>,
}

impl SwipeTracker {
    /// Feed the pointer state once per frame; yields an event on release.
    pub fn update(&mut self, down: bool, pos: Option<(f32, f32)>) -> Option<InputEvent> {
        match (down, self.start, pos) {
            (true, None, Some(p)) => {
                self.start = Some(p);
                None
            }
            (false, Some((sx, sy)), Some((x, y))) => {
                self.start = None;
                classify_swipe(x - sx, y - sy).map(InputEvent::CycleMode)
            }
            (false, Some(_), None) => {
                // released outside the window
                self.start = None;
                None
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn swipe_needs_distance_and_horizontal_dominance() {
        assert_eq!(classify_swipe(41.0, 0.0), Some(1));
        assert_eq!(classify_swipe(-41.0, 10.0), Some(-1));
        assert_eq!(classify_swipe(40.0, 0.0), None);
        assert_eq!(classify_swipe(60.0, 60.0), None);
        assert_eq!(classify_swipe(60.0, -80.0), None);
    }

    #[test]
    fn tracker_emits_on_release_only() {
        let mut t = SwipeTracker::default();
        assert_eq!(t.update(true, Some((100.0, 50.0))), None);
        assert_eq!(t.update(true, Some((180.0, 55.0))), None);
        assert_eq!(t.update(false, Some((180.0, 55.0))), Some(InputEvent::CycleMode(1)));
        assert_eq!(t.update(false, Some((0.0, 0.0))), None);
    }

    #[test]
    fn tracker_drops_release_outside_window() {
        let mut t = SwipeTracker::default();
        t.update(true, Some((100.0, 50.0)));
        assert_eq!(t.update(false, None), None);
        assert_eq!(t.update(false, Some((0.0, 50.0))), None);
    }
}
