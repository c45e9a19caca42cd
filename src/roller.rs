//! The numeric picker behind the answer input.
//!
//! A continuous scroll offset is the source of truth. Dragging or scrolling
//! moves the offset; only [`RollerInput::snap`] turns it into a value. Offset
//! index `0` selects `min` and larger values sit at more negative indices, so
//! `value = min - index` over `index ∈ [-(max - min), 0]`.
//!
//! For rendering, the values are laid out as a padded list
//! `[pad, min, min + 1, …, max, pad]`; the highlighted item is `1 - index`.

/// Height of one roller item in pointer units (terminal rows for the TUI).
pub const DEFAULT_ITEM_PITCH: f64 = 1.0;

/// Widest `max - min` a roller accepts. Every index in `[-MAX_SPAN, 0]` is
/// exact as an `f64`; wider ranges are cut back to `min + MAX_SPAN`.
pub const MAX_SPAN: i64 = 1 << 52;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RollerSlot {
    Pad,
    Value(i64),
}

#[derive(Debug, Clone, PartialEq)]
pub struct RollerInput {
    min: i64,
    max: i64,
    pitch: f64,
    value: i64,
    raw_offset: f64,
    is_dragging: bool,
    last_pointer: f64,
}

impl RollerInput {
    pub fn new(min: i64, max: i64, pitch: f64) -> Self {
        let span = max
            .max(min)
            .checked_sub(min)
            .map_or(MAX_SPAN, |span| span.min(MAX_SPAN));
        let max = min + span;
        let pitch = if pitch.is_finite() && pitch > 0.0 { pitch } else { DEFAULT_ITEM_PITCH };
        let mut roller = Self {
            min,
            max,
            pitch,
            value: min,
            raw_offset: 0.0,
            is_dragging: false,
            last_pointer: 0.0,
        };
        roller.reset();
        roller
    }

    pub fn min(&self) -> i64 {
        self.min
    }

    pub fn max(&self) -> i64 {
        self.max
    }

    /// The last snapped value; this is what gets submitted.
    pub fn value(&self) -> i64 {
        self.value
    }

    pub fn raw_offset(&self) -> f64 {
        self.raw_offset
    }

    pub fn is_dragging(&self) -> bool {
        self.is_dragging
    }

    /// Only called with `value` in `[min, max]`, so it cannot overflow.
    fn index_for(&self, value: i64) -> i64 {
        self.min - value
    }

    /// Offset index nearest to `offset`, clamped to the real items. A NaN
    /// offset falls back to the current value's index.
    fn clamped_index(&self, offset: f64) -> i64 {
        let index = (offset / self.pitch).round();
        if index.is_nan() {
            return self.index_for(self.value);
        }
        index.clamp(self.index_for(self.max) as f64, 0.0) as i64
    }

    /// Moves the offset. Unclamped; [`RollerInput::snap`] pulls it back in range.
    pub fn apply_delta(&mut self, dy: f64) {
        self.raw_offset += dy;
    }

    pub fn begin_drag(&mut self, y: f64) {
        self.is_dragging = true;
        self.last_pointer = y;
    }

    pub fn drag_to(&mut self, y: f64) {
        if !self.is_dragging {
            return;
        }
        self.apply_delta(y - self.last_pointer);
        self.last_pointer = y;
    }

    pub fn end_drag(&mut self) -> Option<i64> {
        if !self.is_dragging {
            return None;
        }
        self.is_dragging = false;
        Some(self.snap())
    }

    /// Wheel input: positive notches scroll down the list towards larger values.
    pub fn scroll(&mut self, notches: f64) -> i64 {
        self.apply_delta(-notches * self.pitch);
        self.snap()
    }

    /// Rounds the offset to the item grid and derives the value, clamped into
    /// `[min, max]`. When clamped, the offset is rebuilt from the boundary's
    /// exact index so offset and value agree.
    pub fn snap(&mut self) -> i64 {
        let index = self.clamped_index(self.raw_offset);
        let value = self.min - index;

        self.raw_offset = index as f64 * self.pitch;
        self.value = value;
        value
    }

    /// Back to a neutral value at the start of every step: 0, or `min` when 0
    /// is out of range.
    pub fn reset(&mut self) {
        let target = if (self.min..=self.max).contains(&0) { 0 } else { self.min };
        self.is_dragging = false;
        self.raw_offset = self.index_for(target) as f64 * self.pitch;
        self.value = target;
    }

    /// Number of items in the padded list.
    pub fn item_count(&self) -> usize {
        usize::try_from(self.max - self.min)
            .unwrap_or(usize::MAX)
            .saturating_add(3)
    }

    /// Padded-list position under the selection marker, following the offset
    /// live (including mid-drag) but clamped to the real items.
    pub fn highlighted_item(&self) -> usize {
        let index = self.clamped_index(self.raw_offset);
        usize::try_from(1 - index).unwrap_or(usize::MAX)
    }

    pub fn slot(&self, item: usize) -> RollerSlot {
        let last = self.item_count() - 1;
        if item == 0 || item >= last {
            RollerSlot::Pad
        } else {
            // item - 1 <= max - min here
            RollerSlot::Value(self.min + (item - 1) as i64)
        }
    }

    /// `radius` slots either side of the highlighted one; positions past either
    /// end of the list read as padding.
    pub fn window(&self, radius: usize) -> Vec<RollerSlot> {
        let center = self.highlighted_item() as i64;
        let radius = i64::try_from(radius).map_or(MAX_SPAN, |r| r.min(MAX_SPAN));
        (center - radius..=center + radius)
            .map(|item| {
                if item < 0 {
                    RollerSlot::Pad
                } else {
                    self.slot(item as usize)
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn roller() -> RollerInput {
        RollerInput::new(0, 100, 40.0)
    }

    #[test]
    fn starts_at_zero() {
        let r = roller();
        assert_eq!(r.value(), 0);
        assert_eq!(r.raw_offset(), 0.0);
        assert_eq!(r.highlighted_item(), 1);
        assert_eq!(r.slot(1), RollerSlot::Value(0));
    }

    #[test]
    fn reset_uses_min_when_zero_out_of_range() {
        let r = RollerInput::new(5, 9, 1.0);
        assert_eq!(r.value(), 5);
        assert_eq!(r.raw_offset(), 0.0);

        let mut r = RollerInput::new(-10, 10, 2.0);
        assert_eq!(r.value(), 0);
        assert_eq!(r.raw_offset(), -20.0);
        r.apply_delta(-6.0);
        assert_eq!(r.snap(), 3);
        r.reset();
        assert_eq!(r.value(), 0);
    }

    #[test]
    fn dragging_up_increases_value() {
        let mut r = roller();
        r.begin_drag(500.0);
        r.drag_to(450.0);
        r.drag_to(381.0);
        // value only changes on snap
        assert_eq!(r.value(), 0);
        assert_eq!(r.end_drag(), Some(3));
        assert_eq!(r.raw_offset(), -120.0);
        assert!(!r.is_dragging());
    }

    #[test]
    fn drag_without_begin_is_ignored() {
        let mut r = roller();
        r.drag_to(100.0);
        assert_eq!(r.raw_offset(), 0.0);
        assert_eq!(r.end_drag(), None);
    }

    #[test]
    fn wheel_moves_one_item_per_notch() {
        let mut r = roller();
        assert_eq!(r.scroll(1.0), 1);
        assert_eq!(r.scroll(4.0), 5);
        assert_eq!(r.scroll(-2.0), 3);
    }

    #[test]
    fn snap_clamps_to_min_boundary() {
        let mut r = roller();
        r.apply_delta(10_000.0);
        assert_eq!(r.snap(), 0);
        assert_eq!(r.raw_offset(), 0.0);
        assert_eq!(r.highlighted_item(), 1);
    }

    #[test]
    fn snap_clamps_to_max_boundary() {
        let mut r = roller();
        r.apply_delta(-10_000.0);
        assert_eq!(r.snap(), 100);
        assert_eq!(r.raw_offset(), -4000.0);
        assert_eq!(r.highlighted_item(), 101);
        assert_eq!(r.slot(101), RollerSlot::Value(100));
        assert_eq!(r.slot(102), RollerSlot::Pad);
    }

    #[test]
    fn exact_boundaries_are_not_clamped() {
        let mut r = roller();
        r.apply_delta(-4000.0);
        assert_eq!(r.snap(), 100);
        r.apply_delta(4000.0);
        assert_eq!(r.snap(), 0);
    }

    #[test]
    fn highlight_tracks_drag_but_stays_on_real_items() {
        let mut r = RollerInput::new(0, 3, 1.0);
        r.begin_drag(0.0);
        r.drag_to(-2.2);
        assert_eq!(r.highlighted_item(), 3);
        r.drag_to(-50.0);
        assert_eq!(r.highlighted_item(), 4);
        r.drag_to(50.0);
        assert_eq!(r.highlighted_item(), 1);
    }

    #[test]
    fn window_pads_both_ends() {
        let r = RollerInput::new(0, 3, 1.0);
        assert_eq!(
            r.window(2),
            vec![RollerSlot::Pad, RollerSlot::Pad, RollerSlot::Value(0), RollerSlot::Value(1), RollerSlot::Value(2)]
        );

        let mut r = RollerInput::new(0, 3, 1.0);
        r.apply_delta(-3.0);
        r.snap();
        assert_eq!(
            r.window(2),
            vec![RollerSlot::Value(1), RollerSlot::Value(2), RollerSlot::Value(3), RollerSlot::Pad, RollerSlot::Pad]
        );
    }

    #[test]
    fn item_count_includes_padding() {
        assert_eq!(RollerInput::new(0, 100, 1.0).item_count(), 103);
        assert_eq!(RollerInput::new(4, 4, 1.0).item_count(), 3);
    }

    #[test]
    fn snap_survives_extreme_offsets() {
        for offset in [-1.0e30, 1.0e30, f64::MAX, f64::MIN, f64::INFINITY, f64::NEG_INFINITY] {
            let mut r = RollerInput::new(0, 100, 1.0);
            r.apply_delta(offset);
            let v = r.snap();
            assert!((0..=100).contains(&v), "{} -> {}", offset, v);

            let mut r = RollerInput::new(-50, 50, 1.0);
            r.apply_delta(offset);
            let v = r.snap();
            assert!((-50..=50).contains(&v), "{} -> {}", offset, v);
            assert_eq!(r.slot(r.highlighted_item()), RollerSlot::Value(v));
        }
    }

    #[test]
    fn nan_offset_keeps_current_value() {
        let mut r = RollerInput::new(0, 100, 1.0);
        assert_eq!(r.scroll(7.0), 7);
        r.apply_delta(f64::NAN);
        assert_eq!(r.highlighted_item(), 8);
        assert_eq!(r.snap(), 7);
        assert_eq!(r.raw_offset(), -7.0);

        // inf - inf
        r.apply_delta(f64::INFINITY);
        r.apply_delta(f64::NEG_INFINITY);
        assert_eq!(r.snap(), 7);
    }

    #[test]
    fn span_too_wide_for_i64_is_cut_back() {
        let r = RollerInput::new(i64::MIN, i64::MAX, 1.0);
        assert_eq!(r.min(), i64::MIN);
        assert_eq!(r.max(), i64::MIN + MAX_SPAN);
        assert_eq!(r.value(), i64::MIN);
        assert_eq!(r.window(2).len(), 5);

        let mut r = RollerInput::new(-9_000_000_000_000_000_000, 9_000_000_000_000_000_000, 1.0);
        assert_eq!(r.max() - r.min(), MAX_SPAN);
        r.apply_delta(-1.0e30);
        assert_eq!(r.snap(), r.max());
        assert_eq!(r.slot(r.highlighted_item()), RollerSlot::Value(r.max()));
        assert_eq!(r.window(1)[2], RollerSlot::Pad);
    }

    fn any_offset() -> impl Strategy<Value = f64> {
        prop_oneof![
            -1.0e6f64..1.0e6,
            -1.0e30f64..1.0e30,
            Just(f64::MAX),
            Just(f64::MIN),
            Just(f64::INFINITY),
            Just(f64::NEG_INFINITY),
        ]
    }

    proptest! {
        #[test]
        fn snap_always_in_range(min in -50i64..50, span in 0i64..200, offset in any_offset()) {
            let mut r = RollerInput::new(min, min + span, 40.0);
            r.apply_delta(offset);
            let v = r.snap();
            prop_assert!(v >= min && v <= min + span);
            prop_assert_eq!(r.value(), v);
            // offset and value agree after the snap
            prop_assert_eq!(min - (r.raw_offset() / 40.0) as i64, v);
        }

        #[test]
        fn snap_reset_snap_is_stable(min in -50i64..50, span in 0i64..200, offset in -1.0e4f64..1.0e4) {
            let mut r = RollerInput::new(min, min + span, 40.0);
            r.apply_delta(offset);
            let first = r.snap();
            let aligned = r.raw_offset();

            r.reset();
            r.apply_delta(aligned - r.raw_offset());
            prop_assert_eq!(r.snap(), first);
            prop_assert_eq!(r.raw_offset(), aligned);
        }

        #[test]
        fn index_value_bijection(min in -50i64..50, span in 0i64..200, pick in 0i64..200) {
            let max = min + span;
            let target = min + pick.min(span);
            let mut r = RollerInput::new(min, max, 1.0);
            r.apply_delta((min - target) as f64 - r.raw_offset());
            prop_assert_eq!(r.snap(), target);
            prop_assert_eq!(r.slot(r.highlighted_item()), RollerSlot::Value(target));
        }
    }
}
