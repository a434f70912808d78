use crate::position::Position;

/// Restricts `index` to `[min, max]` by wrapping, not clamping.
///
/// Indices below `min` collapse to `min`. Everything else cycles through the
/// inclusive range with a period of `max - min + 1`, so `max + 1` maps back to `min`.
pub fn restrict_range(index: Position, min: Position, max: Position) -> Position {
    // Widened so that a range ending at `Position::MAX` still has a period
    let (index, min, max) = (i128::from(index), i128::from(min), i128::from(max));
    let period = max - min + 1;
    let offset = (index - min).max(0);

    offset
        .checked_rem(period)
        .map_or(index, |wrapped| wrapped + min) as Position
}

/// A range is usable for restriction only if it is non-negative and not inverted.
pub fn is_valid_range(start: Position, end: Position) -> bool {
    let non_negative = start >= 0 && end >= 0;
    let non_inverted = end > start;

    non_negative && non_inverted
}

/// Loops `position` through the half-open range `[start, end)`.
///
/// An empty or inverted range leaves `position` untouched.
pub fn loop_position(position: Position, start: Position, end: Position) -> Position {
    if end <= start {
        return position;
    }
    let period = i128::from(end) - i128::from(start);
    (i128::from(position).rem_euclid(period) + i128::from(start)) as Position
}

/// Loop region bounds, as configured on a producer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameRange {
    pub start: Position,
    pub end: Position,
}

impl FrameRange {
    pub const fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    pub fn is_valid(self) -> bool {
        is_valid_range(self.start, self.end)
    }

    /// Returns the wrapped index, or `None` when the range cannot restrict anything.
    pub fn restrict(self, index: Position) -> Option<Position> {
        self.is_valid()
            .then(|| restrict_range(index, self.start, self.end))
    }
}

#[cfg(test)]
mod restrict_range_tests {
    use super::*;

    #[test]
    fn test_index_inside_range_is_unchanged() {
        assert_eq!(restrict_range(10, 10, 20), 10);
        assert_eq!(restrict_range(15, 10, 20), 15);
        assert_eq!(restrict_range(20, 10, 20), 20);
    }

    #[test]
    fn test_one_past_max_wraps_to_min() {
        assert_eq!(restrict_range(21, 10, 20), 10);
        assert_eq!(restrict_range(101, 0, 100), 0);
    }

    #[test]
    fn test_position_25_in_10_to_20_wraps_to_14() {
        // offset 15, period 11 -> 15 % 11 = 4 -> 10 + 4
        assert_eq!(restrict_range(25, 10, 20), 14);
    }

    #[test]
    fn test_below_min_collapses_to_min() {
        assert_eq!(restrict_range(0, 10, 20), 10);
        assert_eq!(restrict_range(9, 10, 20), 10);
        assert_eq!(restrict_range(-50, 10, 20), 10);
    }

    #[test]
    fn test_results_always_stay_within_bounds() {
        let (min, max) = (3, 9);
        for index in -20..200 {
            let restricted = restrict_range(index, min, max);
            assert!(
                (min..=max).contains(&restricted),
                "{index} restricted to {restricted}"
            );
        }
    }

    #[test]
    fn test_wrapping_is_periodic() {
        let (min, max) = (5, 12);
        let period = max - min + 1;
        for index in min..(min + 3 * period) {
            assert_eq!(
                restrict_range(index, min, max),
                restrict_range(index + period, min, max)
            );
        }
    }

    #[test]
    fn test_large_positions_do_not_overflow() {
        let max = Position::from(i32::MAX);
        assert_eq!(restrict_range(max + 1, 0, max), 0);
    }

    #[test]
    fn test_range_ending_at_max_position() {
        let range = FrameRange::new(0, Position::MAX);
        assert!(range.is_valid());
        assert_eq!(range.restrict(5), Some(5));
        assert_eq!(range.restrict(Position::MAX), Some(Position::MAX));
        assert_eq!(restrict_range(Position::MIN, 1, Position::MAX), 1);
    }
}
