//! Flattened light profiles
//!
//! A profile is the time function behind every [`crate::Light`]. Instead of
//! nesting closures for every overlay or concatenation, each profile is an
//! ordered list of non-overlapping segments built once at construction
//! time. A segment covers an interval with explicit inclusive/exclusive
//! ends and evaluates `offset + Σ primitive(t - shift)`.
//!
//! Intervals are expressed with [`Cut`]s: a cut sits either just before or
//! just after a time value, so a closed interval `[a, b]` is the cut range
//! `before(a)..after(b)` and a half-open one `[a, b)` is
//! `before(a)..before(b)`. This keeps boundary inclusivity an ordinary
//! ordering question.
//!
//! Outside of every segment a profile evaluates to `0`.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

/// A primitive light function of time (hours) returning an intensity
pub type LightFn = Arc<dyn Fn(f64) -> f64 + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum Side {
    Before,
    After,
}

/// A position between time values: just before or just after `at`
#[derive(Debug, Clone, Copy)]
pub(crate) struct Cut {
    at: f64,
    side: Side,
}

impl Cut {
    pub(crate) const NEG_INFINITY: Cut = Cut {
        at: f64::NEG_INFINITY,
        side: Side::Before,
    };
    pub(crate) const INFINITY: Cut = Cut {
        at: f64::INFINITY,
        side: Side::After,
    };

    pub(crate) fn before(at: f64) -> Self {
        // `+ 0.0` folds -0.0 into 0.0 so total ordering agrees with `==`
        Cut {
            at: at + 0.0,
            side: Side::Before,
        }
    }

    pub(crate) fn after(at: f64) -> Self {
        Cut {
            at: at + 0.0,
            side: Side::After,
        }
    }

    fn shifted(self, dt: f64) -> Self {
        Cut {
            at: self.at + dt + 0.0,
            side: self.side,
        }
    }
}

impl Ord for Cut {
    fn cmp(&self, other: &Self) -> Ordering {
        self.at
            .total_cmp(&other.at)
            .then(self.side.cmp(&other.side))
    }
}

impl PartialOrd for Cut {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Cut {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Cut {}

/// Half-open range of cuts; contains `t` when `lo <= before(t)` and
/// `after(t) <= hi`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct CutRange {
    pub(crate) lo: Cut,
    pub(crate) hi: Cut,
}

impl CutRange {
    pub(crate) fn new(lo: Cut, hi: Cut) -> Self {
        Self { lo, hi }
    }

    pub(crate) fn everything() -> Self {
        Self::new(Cut::NEG_INFINITY, Cut::INFINITY)
    }

    /// `[a, b]`
    pub(crate) fn closed(a: f64, b: f64) -> Self {
        Self::new(Cut::before(a), Cut::after(b))
    }

    /// `[a, b)`
    pub(crate) fn closed_open(a: f64, b: f64) -> Self {
        Self::new(Cut::before(a), Cut::before(b))
    }

    /// `(a, b]`
    pub(crate) fn open_closed(a: f64, b: f64) -> Self {
        Self::new(Cut::after(a), Cut::after(b))
    }

    /// `(a, b)`
    pub(crate) fn open(a: f64, b: f64) -> Self {
        Self::new(Cut::after(a), Cut::before(b))
    }

    /// `{a}`
    pub(crate) fn point(a: f64) -> Self {
        Self::closed(a, a)
    }

    /// `(-inf, a)`
    pub(crate) fn below(a: f64) -> Self {
        Self::new(Cut::NEG_INFINITY, Cut::before(a))
    }

    /// `(a, +inf)`
    pub(crate) fn above(a: f64) -> Self {
        Self::new(Cut::after(a), Cut::INFINITY)
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.lo >= self.hi
    }

    pub(crate) fn contains(&self, t: f64) -> bool {
        self.lo <= Cut::before(t) && Cut::after(t) <= self.hi
    }

    fn intersect(&self, other: &CutRange) -> CutRange {
        CutRange::new(self.lo.max(other.lo), self.hi.min(other.hi))
    }

    fn shifted(&self, dt: f64) -> CutRange {
        CutRange::new(self.lo.shifted(dt), self.hi.shifted(dt))
    }
}

#[derive(Clone)]
struct Atom {
    func: LightFn,
    shift: f64,
}

/// `offset + Σ func(t - shift)` over the atoms of a segment
#[derive(Clone, Default)]
pub(crate) struct Term {
    offset: f64,
    atoms: Vec<Atom>,
}

impl Term {
    pub(crate) fn constant(value: f64) -> Self {
        Self {
            offset: value,
            atoms: Vec::new(),
        }
    }

    fn primitive(func: LightFn) -> Self {
        Self {
            offset: 0.0,
            atoms: vec![Atom { func, shift: 0.0 }],
        }
    }

    pub(crate) fn value(&self, t: f64) -> f64 {
        self.atoms
            .iter()
            .fold(self.offset, |acc, atom| acc + (atom.func)(t - atom.shift))
    }

    pub(crate) fn plus(&self, other: &Term) -> Term {
        let mut atoms = self.atoms.clone();
        atoms.extend(other.atoms.iter().cloned());
        Term {
            offset: self.offset + other.offset,
            atoms,
        }
    }

    fn shifted(&self, dt: f64) -> Term {
        Term {
            offset: self.offset,
            atoms: self
                .atoms
                .iter()
                .map(|atom| Atom {
                    func: Arc::clone(&atom.func),
                    shift: atom.shift + dt,
                })
                .collect(),
        }
    }

    fn is_constant(&self) -> bool {
        self.atoms.is_empty()
    }
}

#[derive(Clone)]
pub(crate) struct Segment {
    pub(crate) range: CutRange,
    pub(crate) term: Term,
}

impl Segment {
    pub(crate) fn new(range: CutRange, term: Term) -> Self {
        Self { range, term }
    }
}

/// Ordered, non-overlapping segments describing a light function
#[derive(Clone)]
pub(crate) struct Profile {
    segments: Arc<[Segment]>,
}

impl Profile {
    pub(crate) fn constant(value: f64) -> Self {
        Self::from_segments(vec![Segment::new(
            CutRange::everything(),
            Term::constant(value),
        )])
    }

    pub(crate) fn primitive(func: LightFn) -> Self {
        Self::from_segments(vec![Segment::new(
            CutRange::everything(),
            Term::primitive(func),
        )])
    }

    /// Assemble a profile from disjoint pieces.
    ///
    /// Empty pieces are dropped and adjacent constant pieces with the same
    /// value are merged.
    pub(crate) fn from_segments(mut pieces: Vec<Segment>) -> Self {
        pieces.retain(|s| !s.range.is_empty());
        pieces.sort_by(|a, b| a.range.lo.cmp(&b.range.lo));

        let mut merged: Vec<Segment> = Vec::with_capacity(pieces.len());
        for piece in pieces {
            if let Some(last) = merged.last_mut() {
                debug_assert!(last.range.hi <= piece.range.lo, "overlapping segments");
                if last.range.hi == piece.range.lo
                    && last.term.is_constant()
                    && piece.term.is_constant()
                    && last.term.offset == piece.term.offset
                {
                    last.range.hi = piece.range.hi;
                    continue;
                }
            }
            merged.push(piece);
        }

        Self {
            segments: merged.into(),
        }
    }

    pub(crate) fn value(&self, t: f64) -> f64 {
        let probe = Cut::before(t);
        let idx = self.segments.partition_point(|s| s.range.hi <= probe);
        match self.segments.get(idx) {
            Some(segment) if segment.range.lo <= probe => segment.term.value(t),
            _ => 0.0,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.segments.len()
    }

    pub(crate) fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Profile with every segment moved later by `dt` hours
    pub(crate) fn shifted(&self, dt: f64) -> Profile {
        Profile {
            segments: self
                .segments
                .iter()
                .map(|s| Segment::new(s.range.shifted(dt), s.term.shifted(dt)))
                .collect(),
        }
    }

    /// Clip the profile to `range`, filling uncovered stretches with zero
    /// segments so the result covers `range` contiguously.
    pub(crate) fn restrict(&self, range: CutRange) -> Vec<Segment> {
        let mut out = Vec::new();
        if range.is_empty() {
            return out;
        }

        let mut cursor = range.lo;
        for segment in self.segments.iter() {
            let clipped = segment.range.intersect(&range);
            if clipped.is_empty() {
                continue;
            }
            if cursor < clipped.lo {
                out.push(Segment::new(
                    CutRange::new(cursor, clipped.lo),
                    Term::default(),
                ));
            }
            out.push(Segment::new(clipped, segment.term.clone()));
            cursor = clipped.hi;
        }
        if cursor < range.hi {
            out.push(Segment::new(CutRange::new(cursor, range.hi), Term::default()));
        }

        out
    }
}

/// Pointwise sum of two contiguous segment lists covering the same range
pub(crate) fn sum_segments(left: &[Segment], right: &[Segment]) -> Vec<Segment> {
    let mut out = Vec::with_capacity(left.len() + right.len());
    let (mut i, mut j) = (0, 0);
    let mut cursor = match (left.first(), right.first()) {
        (Some(l), Some(r)) => l.range.lo.max(r.range.lo),
        _ => return out,
    };

    while i < left.len() && j < right.len() {
        let hi = left[i].range.hi.min(right[j].range.hi);
        if cursor < hi {
            out.push(Segment::new(
                CutRange::new(cursor, hi),
                left[i].term.plus(&right[j].term),
            ));
            cursor = hi;
        }
        if left[i].range.hi == hi {
            i += 1;
        }
        if right[j].range.hi == hi {
            j += 1;
        }
    }

    out
}

/// Serializable view of one profile segment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentSummary {
    /// Segment start in hours (`None` when unbounded)
    pub start: Option<f64>,
    /// Whether `start` itself belongs to the segment
    pub start_inclusive: bool,
    /// Segment end in hours (`None` when unbounded)
    pub end: Option<f64>,
    /// Whether `end` itself belongs to the segment
    pub end_inclusive: bool,
    /// Constant part of the segment value
    pub offset: f64,
    /// Number of primitive functions summed into the segment
    pub components: usize,
}

impl From<&Segment> for SegmentSummary {
    fn from(segment: &Segment) -> Self {
        let bound = |at: f64| at.is_finite().then_some(at);
        SegmentSummary {
            start: bound(segment.range.lo.at),
            start_inclusive: segment.range.lo.side == Side::Before,
            end: bound(segment.range.hi.at),
            end_inclusive: segment.range.hi.side == Side::After,
            offset: segment.term.offset,
            components: segment.term.atoms.len(),
        }
    }
}

impl fmt::Debug for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.segments.iter().map(SegmentSummary::from))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(at: f64, value: f64) -> Profile {
        Profile::from_segments(vec![
            Segment::new(CutRange::below(at), Term::constant(0.0)),
            Segment::new(
                CutRange::new(Cut::before(at), Cut::INFINITY),
                Term::constant(value),
            ),
        ])
    }

    #[test]
    fn test_cut_ordering() {
        assert!(Cut::before(1.0) < Cut::after(1.0));
        assert!(Cut::after(1.0) < Cut::before(1.5));
        assert_eq!(Cut::before(-0.0), Cut::before(0.0));
        assert!(Cut::NEG_INFINITY < Cut::before(-1e300));
        assert!(Cut::after(1e300) < Cut::INFINITY);
    }

    #[test]
    fn test_range_inclusivity() {
        assert!(CutRange::closed(1.0, 2.0).contains(1.0));
        assert!(CutRange::closed(1.0, 2.0).contains(2.0));
        assert!(!CutRange::closed_open(1.0, 2.0).contains(2.0));
        assert!(!CutRange::open_closed(1.0, 2.0).contains(1.0));
        assert!(!CutRange::open(1.0, 2.0).contains(1.0));
        assert!(CutRange::point(3.0).contains(3.0));
        assert!(!CutRange::point(3.0).is_empty());
        assert!(CutRange::closed_open(3.0, 3.0).is_empty());
        assert!(CutRange::open(3.0, 3.0).is_empty());
    }

    #[test]
    fn test_value_lookup() {
        let profile = step(5.0, 10.0);
        assert_eq!(profile.value(4.999), 0.0);
        assert_eq!(profile.value(5.0), 10.0);
        assert_eq!(profile.value(1e6), 10.0);
    }

    #[test]
    fn test_value_outside_segments_is_zero() {
        let profile = Profile::from_segments(vec![Segment::new(
            CutRange::closed(0.0, 1.0),
            Term::constant(3.0),
        )]);
        assert_eq!(profile.value(-0.5), 0.0);
        assert_eq!(profile.value(0.5), 3.0);
        assert_eq!(profile.value(1.5), 0.0);
    }

    #[test]
    fn test_restrict_fills_gaps() {
        let profile = Profile::from_segments(vec![Segment::new(
            CutRange::closed(2.0, 3.0),
            Term::constant(1.0),
        )]);
        let pieces = profile.restrict(CutRange::closed(0.0, 4.0));
        assert_eq!(pieces.len(), 3);
        assert_eq!(pieces[0].range, CutRange::closed_open(0.0, 2.0));
        assert_eq!(pieces[2].range, CutRange::open_closed(3.0, 4.0));
    }

    #[test]
    fn test_shift_moves_primitives() {
        let profile = Profile::primitive(Arc::new(|t: f64| t.max(0.0)));
        let shifted = profile.shifted(10.0);
        assert_eq!(shifted.value(12.0), 2.0);
    }

    #[test]
    fn test_sum_segments_splits_on_union_of_cuts() {
        let a = step(2.0, 1.0).restrict(CutRange::closed(0.0, 4.0));
        let b = step(3.0, 5.0).restrict(CutRange::closed(0.0, 4.0));
        let sum = Profile::from_segments(sum_segments(&a, &b));
        assert_eq!(sum.value(1.0), 0.0);
        assert_eq!(sum.value(2.5), 1.0);
        assert_eq!(sum.value(3.0), 6.0);
        assert_eq!(sum.value(4.0), 6.0);
        assert_eq!(sum.value(4.5), 0.0);
    }

    #[test]
    fn test_adjacent_constants_are_merged() {
        let profile = Profile::from_segments(vec![
            Segment::new(CutRange::closed_open(0.0, 1.0), Term::constant(2.0)),
            Segment::new(CutRange::closed(1.0, 2.0), Term::constant(2.0)),
        ]);
        assert_eq!(profile.len(), 1);
    }
}
