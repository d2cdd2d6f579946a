use std::ops::{Range, RangeFrom, RangeFull, RangeInclusive, RangeTo};

use crate::error::{Error, Result};

// ---------------------------------------------------------------------------
// SliceSpec – start/stop/step with Python slice semantics
// ---------------------------------------------------------------------------

/// A slice over row positions. Bounds may be negative (counted from the
/// end) or omitted; resolution clamps them to the table length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SliceSpec {
    pub start: Option<isize>,
    pub stop: Option<isize>,
    pub step: Option<isize>,
}

impl SliceSpec {
    pub fn new(start: Option<isize>, stop: Option<isize>, step: Option<isize>) -> Self {
        SliceSpec { start, stop, step }
    }

    /// Expand to concrete positions for a table of `len` rows.
    pub fn positions(&self, len: usize) -> Result<Vec<usize>> {
        let step = self.step.unwrap_or(1);
        if step == 0 {
            return Err(Error::InvalidSlice("slice step cannot be zero".into()));
        }
        let len = len as isize;
        let (lower, upper) = if step > 0 { (0, len) } else { (-1, len - 1) };

        let clamp = |bound: Option<isize>, default: isize| match bound {
            None => default,
            Some(b) if b < 0 => (b + len).max(lower),
            Some(b) => b.min(upper),
        };
        let start = clamp(self.start, if step > 0 { lower } else { upper });
        let stop = clamp(self.stop, if step > 0 { upper } else { lower });

        let mut out = Vec::new();
        let mut i = start;
        while (step > 0 && i < stop) || (step < 0 && i > stop) {
            out.push(i as usize);
            match i.checked_add(step) {
                Some(next) => i = next,
                None => break,
            }
        }
        Ok(out)
    }
}

// ---------------------------------------------------------------------------
// Selection – what callers may pass to `select` / `slice`
// ---------------------------------------------------------------------------

/// A row selection: one position, a slice, or an explicit position list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Position(usize),
    Slice(SliceSpec),
    Positions(Vec<usize>),
}

impl Selection {
    /// Every row.
    pub fn all() -> Self {
        Selection::Slice(SliceSpec::default())
    }

    /// Normalize to a position list against a table of `len` rows.
    ///
    /// Only slices are bounded by `len`; explicit positions pass through
    /// untouched so out-of-range values fail at lookup time.
    pub fn resolve(&self, len: usize) -> Result<Vec<usize>> {
        match self {
            Selection::Position(p) => Ok(vec![*p]),
            Selection::Slice(spec) => spec.positions(len),
            Selection::Positions(ps) => Ok(ps.clone()),
        }
    }
}

impl From<usize> for Selection {
    fn from(p: usize) -> Self {
        Selection::Position(p)
    }
}

impl From<Vec<usize>> for Selection {
    fn from(ps: Vec<usize>) -> Self {
        Selection::Positions(ps)
    }
}

impl From<&[usize]> for Selection {
    fn from(ps: &[usize]) -> Self {
        Selection::Positions(ps.to_vec())
    }
}

impl<const N: usize> From<[usize; N]> for Selection {
    fn from(ps: [usize; N]) -> Self {
        Selection::Positions(ps.to_vec())
    }
}

impl From<SliceSpec> for Selection {
    fn from(spec: SliceSpec) -> Self {
        Selection::Slice(spec)
    }
}

fn bound(b: usize) -> Option<isize> {
    Some(isize::try_from(b).unwrap_or(isize::MAX))
}

impl From<Range<usize>> for Selection {
    fn from(r: Range<usize>) -> Self {
        Selection::Slice(SliceSpec::new(bound(r.start), bound(r.end), None))
    }
}

impl From<RangeInclusive<usize>> for Selection {
    fn from(r: RangeInclusive<usize>) -> Self {
        let (start, end) = r.into_inner();
        Selection::Slice(SliceSpec::new(
            bound(start),
            bound(end).map(|e| e.saturating_add(1)),
            None,
        ))
    }
}

impl From<RangeFrom<usize>> for Selection {
    fn from(r: RangeFrom<usize>) -> Self {
        Selection::Slice(SliceSpec::new(bound(r.start), None, None))
    }
}

impl From<RangeTo<usize>> for Selection {
    fn from(r: RangeTo<usize>) -> Self {
        Selection::Slice(SliceSpec::new(None, bound(r.end), None))
    }
}

impl From<RangeFull> for Selection {
    fn from(_: RangeFull) -> Self {
        Selection::all()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slice(start: Option<isize>, stop: Option<isize>, step: Option<isize>) -> Vec<usize> {
        SliceSpec::new(start, stop, step).positions(5).unwrap()
    }

    #[test]
    fn integer_becomes_single_position() {
        assert_eq!(Selection::from(3usize).resolve(2).unwrap(), vec![3]);
    }

    #[test]
    fn range_is_clamped_to_length() {
        assert_eq!(Selection::from(3usize..100).resolve(5).unwrap(), vec![3, 4]);
        assert_eq!(Selection::from(..).resolve(3).unwrap(), vec![0, 1, 2]);
        assert_eq!(Selection::from(1usize..=2).resolve(5).unwrap(), vec![1, 2]);
    }

    #[test]
    fn negative_bounds_count_from_end() {
        assert_eq!(slice(Some(-2), None, None), vec![3, 4]);
        assert_eq!(slice(None, Some(-3), None), vec![0, 1]);
        assert_eq!(slice(Some(-10), Some(1), None), vec![0]);
    }

    #[test]
    fn stepped_and_reversed_slices() {
        assert_eq!(slice(None, None, Some(2)), vec![0, 2, 4]);
        assert_eq!(slice(None, None, Some(-1)), vec![4, 3, 2, 1, 0]);
        assert_eq!(slice(Some(3), Some(0), Some(-2)), vec![3, 1]);
    }

    #[test]
    fn huge_steps_stop_after_first_position() {
        assert_eq!(slice(Some(1), None, Some(isize::MAX)), vec![1]);
        assert_eq!(slice(Some(-2), None, Some(isize::MIN)), vec![3]);
        assert_eq!(slice(None, None, Some(isize::MAX)), vec![0]);
    }

    #[test]
    fn zero_step_is_rejected() {
        assert!(matches!(
            SliceSpec::new(None, None, Some(0)).positions(5),
            Err(Error::InvalidSlice(_))
        ));
    }

    #[test]
    fn explicit_positions_are_not_bounded() {
        assert_eq!(Selection::from(vec![9usize, 0]).resolve(2).unwrap(), vec![9, 0]);
    }
}
