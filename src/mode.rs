// Cyclic filter-mode selection.
// Visual: each step changes which filter the next frame is drawn with; the
// returned `ModeChanged` is what makes the window flash the mode banner.

use clap::ValueEnum;

use crate::filter::FilterMode;

/// The ordered mode lists the viewer can cycle through.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum ModeSet {
    /// NORMAL -> RED FILTER -> BLUE FILTER
    #[default]
    NormalRedBlue,
    /// RED FILTER -> BLUE FILTER (no pass-through)
    RedBlue,
    /// RAW -> RED FILTER -> BLUE FILTER
    RawRedBlue,
}

impl ModeSet {
    pub fn modes(self) -> &'static [FilterMode] {
        match self {
            ModeSet::NormalRedBlue => &[FilterMode::Normal, FilterMode::Red, FilterMode::Blue],
            ModeSet::RedBlue => &[FilterMode::Red, FilterMode::Blue],
            ModeSet::RawRedBlue => &[FilterMode::Raw, FilterMode::Red, FilterMode::Blue],
        }
    }
}

/// Notification emitted on every transition, even when `from == to`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ModeChanged {
    pub from: FilterMode,
    pub to: FilterMode,
    pub index: usize,
}

#[derive(Clone, Debug)]
pub struct ModeCycle {
    modes: &'static [FilterMode],
    index: usize,
}

impl ModeCycle {
    pub fn new(set: ModeSet) -> Self {
        Self { modes: set.modes(), index: 0 }
    }

    pub fn current(&self) -> FilterMode {
        self.modes[self.index]
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.modes.len()
    }

    pub fn modes(&self) -> &'static [FilterMode] {
        self.modes
    }

    /// Move `delta` steps around the cycle; any integer works, wrapping both ways.
    pub fn advance(&mut self, delta: i64) -> ModeChanged {
        let n = self.modes.len();
        let step = delta.rem_euclid(n as i64) as usize;
        self.jump((self.index + step) % n)
    }

    /// Jump straight to `index` (taken modulo the mode count).
    pub fn select(&mut self, index: usize) -> ModeChanged {
        self.jump(index % self.modes.len())
    }

    /// Jump to `mode` if this set contains it.
    pub fn set_mode(&mut self, mode: FilterMode) -> Option<ModeChanged> {
        let index = self.modes.iter().position(|&m| m == mode)?;
        Some(self.jump(index))
    }

    fn jump(&mut self, index: usize) -> ModeChanged {
        let from = self.current();
        self.index = index;
        ModeChanged { from, to: self.current(), index }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SETS: [ModeSet; 3] = [ModeSet::NormalRedBlue, ModeSet::RedBlue, ModeSet::RawRedBlue];

    #[test]
    fn starts_at_first_mode() {
        assert_eq!(ModeCycle::new(ModeSet::NormalRedBlue).current(), FilterMode::Normal);
        assert_eq!(ModeCycle::new(ModeSet::RedBlue).current(), FilterMode::Red);
        assert_eq!(ModeCycle::new(ModeSet::RawRedBlue).current(), FilterMode::Raw);
    }

    #[test]
    fn n_forward_steps_return_home() {
        for set in SETS {
            let mut m = ModeCycle::new(set);
            m.advance(1);
            let start = m.index();
            for _ in 0..m.len() {
                m.advance(1);
            }
            assert_eq!(m.index(), start, "{set:?}");
        }
    }

    #[test]
    fn back_then_forward_is_a_no_op() {
        for set in SETS {
            let mut m = ModeCycle::new(set);
            m.advance(-1);
            assert_eq!(m.index(), m.len() - 1);
            m.advance(1);
            assert_eq!(m.index(), 0);
        }
    }

    #[test]
    fn arbitrary_deltas_wrap_both_ways() {
        let mut m = ModeCycle::new(ModeSet::NormalRedBlue);
        assert_eq!(m.advance(7).to, FilterMode::Red); // 7 mod 3 = 1
        assert_eq!(m.advance(-5).to, FilterMode::Blue); // 1 - 5 = -4 -> 2
        assert_eq!(m.advance(i64::MIN + 1).index, (2 + (i64::MIN + 1)).rem_euclid(3) as usize);
    }

    #[test]
    fn change_notification_names_both_modes() {
        let mut m = ModeCycle::new(ModeSet::RedBlue);
        let ev = m.advance(1);
        assert_eq!(ev, ModeChanged { from: FilterMode::Red, to: FilterMode::Blue, index: 1 });
    }

    #[test]
    fn set_mode_only_accepts_members() {
        let mut m = ModeCycle::new(ModeSet::RedBlue);
        assert!(m.set_mode(FilterMode::Normal).is_none());
        assert_eq!(m.current(), FilterMode::Red);
        assert_eq!(m.set_mode(FilterMode::Blue).map(|e| e.index), Some(1));
        assert_eq!(m.select(4).to, FilterMode::Red);
    }
}
