//! Overlay (pointwise sum) of two light schedules
//!
//! Each operand contributes its own function inside its active window and
//! its default value outside it, so summing two schedules needs to know at
//! every instant which operands are active. [`classify`] decides which of
//! the five topologies applies, [`zones`] lays out the time-ordered zones
//! of that topology, and [`overlay`] renders the zones into a new profile.
//!
//! Both operand windows are closed, so every zone boundary is assigned to
//! the zone in which both operands' activity matches the instant. Windows
//! that only touch are disjoint, and the shared instant gets a zone of its
//! own summing both functions, so at every `t` the result equals
//! `a(t) + b(t)`.

use std::ops::Add;

use tracing::debug;

use crate::error::DomainError;
use crate::light::Light;
use crate::profile::{sum_segments, CutRange, Profile, Segment, Term};

/// Which operand topology an overlay falls into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayCase {
    /// Neither operand has an active window
    BothDegenerate,
    /// Only the right operand has an active window
    LeftDegenerate,
    /// Only the left operand has an active window
    RightDegenerate,
    /// The later window starts at or after the earlier one's end
    Disjoint,
    /// The windows share more than one instant
    Overlapping,
}

/// Operand picked by a zone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    Left,
    Right,
}

/// What one operand contributes inside a zone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Contribution {
    /// The operand's own function
    Function,
    /// The operand's default value
    Default,
}

/// A stretch of time over which each operand contributes one way
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Zone {
    pub(crate) range: CutRange,
    pub left: Contribution,
    pub right: Contribution,
}

impl Zone {
    fn new(range: CutRange, left: Contribution, right: Contribution) -> Self {
        Self { range, left, right }
    }

    /// Zone where `active` contributes its function and the other operand
    /// its default
    fn only(range: CutRange, active: Operand) -> Self {
        match active {
            Operand::Left => Self::new(range, Contribution::Function, Contribution::Default),
            Operand::Right => Self::new(range, Contribution::Default, Contribution::Function),
        }
    }

    /// Whether the zone contains `t`
    pub fn contains(&self, t: f64) -> bool {
        self.range.contains(t)
    }
}

/// Classify the operand topology of `left + right`
pub fn classify(left: &Light, right: &Light) -> OverlayCase {
    match (left.is_degenerate(), right.is_degenerate()) {
        (true, true) => OverlayCase::BothDegenerate,
        (true, false) => OverlayCase::LeftDegenerate,
        (false, true) => OverlayCase::RightDegenerate,
        (false, false) => {
            let latest_start = left.start().max(right.start());
            let earliest_end = left.end().min(right.end());
            if latest_start >= earliest_end {
                OverlayCase::Disjoint
            } else {
                OverlayCase::Overlapping
            }
        }
    }
}

/// Time-ordered zones covering the result window of `left + right`
pub fn zones(left: &Light, right: &Light) -> Vec<Zone> {
    let case = classify(left, right);
    let zones = match case {
        OverlayCase::BothDegenerate => Vec::new(),
        OverlayCase::LeftDegenerate => vec![Zone::only(
            CutRange::closed(right.start(), right.end()),
            Operand::Right,
        )],
        OverlayCase::RightDegenerate => vec![Zone::only(
            CutRange::closed(left.start(), left.end()),
            Operand::Left,
        )],
        OverlayCase::Disjoint => {
            let (earlier, later) = if left.start() <= right.start() {
                (Operand::Left, Operand::Right)
            } else {
                (Operand::Right, Operand::Left)
            };
            let (e, l) = (pick(left, right, earlier), pick(left, right, later));
            if e.end() == l.start() {
                vec![
                    Zone::only(CutRange::closed_open(e.start(), e.end()), earlier),
                    Zone::new(
                        CutRange::point(e.end()),
                        Contribution::Function,
                        Contribution::Function,
                    ),
                    Zone::only(CutRange::open_closed(l.start(), l.end()), later),
                ]
            } else {
                vec![
                    Zone::only(CutRange::closed(e.start(), e.end()), earlier),
                    Zone::new(
                        CutRange::open(e.end(), l.start()),
                        Contribution::Default,
                        Contribution::Default,
                    ),
                    Zone::only(CutRange::closed(l.start(), l.end()), later),
                ]
            }
        }
        OverlayCase::Overlapping => {
            let first = if left.start() <= right.start() {
                Operand::Left
            } else {
                Operand::Right
            };
            let last = if left.end() >= right.end() {
                Operand::Left
            } else {
                Operand::Right
            };
            let earliest_start = left.start().min(right.start());
            let latest_start = left.start().max(right.start());
            let earliest_end = left.end().min(right.end());
            let latest_end = left.end().max(right.end());

            vec![
                Zone::only(CutRange::closed_open(earliest_start, latest_start), first),
                Zone::new(
                    CutRange::closed(latest_start, earliest_end),
                    Contribution::Function,
                    Contribution::Function,
                ),
                Zone::only(CutRange::open_closed(earliest_end, latest_end), last),
            ]
        }
    };

    zones.into_iter().filter(|z| !z.range.is_empty()).collect()
}

fn pick<'a>(left: &'a Light, right: &'a Light, operand: Operand) -> &'a Light {
    match operand {
        Operand::Left => left,
        Operand::Right => right,
    }
}

fn contribution(light: &Light, how: Contribution, range: CutRange) -> Vec<Segment> {
    match how {
        Contribution::Function => light.profile().restrict(range),
        Contribution::Default => vec![Segment::new(range, Term::constant(light.default_value()))],
    }
}

/// Pointwise sum of two light schedules.
///
/// The result's window spans both operands' windows and its default is the
/// sum of their defaults. When both operands are degenerate the result is
/// the degenerate constant `left.default + right.default`.
pub fn overlay(left: &Light, right: &Light) -> Result<Light, DomainError> {
    let case = classify(left, right);
    let default_value = left.default_value() + right.default_value();

    let (start, duration) = match case {
        OverlayCase::BothDegenerate => (0.0, 0.0),
        OverlayCase::LeftDegenerate => (right.start(), right.duration()),
        OverlayCase::RightDegenerate => (left.start(), left.duration()),
        OverlayCase::Disjoint | OverlayCase::Overlapping => {
            let start = left.start().min(right.start());
            (start, left.end().max(right.end()) - start)
        }
    };

    let profile = if case == OverlayCase::BothDegenerate {
        Profile::constant(default_value)
    } else {
        let pieces = zones(left, right)
            .into_iter()
            .flat_map(|zone| {
                let l = contribution(left, zone.left, zone.range);
                let r = contribution(right, zone.right, zone.range);
                sum_segments(&l, &r)
            })
            .collect();
        Profile::from_segments(pieces)
    };

    debug!(
        ?case,
        start,
        duration,
        default_value,
        segments = profile.len(),
        "overlaid light schedules"
    );

    Light::from_profile(profile, start, duration, default_value)
}

impl Light {
    /// Pointwise sum of this schedule and `other`; see [`overlay`]
    pub fn overlay(&self, other: &Light) -> Result<Light, DomainError> {
        overlay(self, other)
    }
}

impl Add<&Light> for &Light {
    type Output = Result<Light, DomainError>;

    fn add(self, rhs: &Light) -> Self::Output {
        overlay(self, rhs)
    }
}

impl Add for Light {
    type Output = Result<Light, DomainError>;

    fn add(self, rhs: Light) -> Self::Output {
        overlay(&self, &rhs)
    }
}
