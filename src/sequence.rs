//! Sequencing (concatenation in time) of light schedules

use tracing::debug;

use crate::error::DomainError;
use crate::light::Light;
use crate::profile::{CutRange, Profile, Segment, Term};

/// Schedule `first` followed by `second`.
///
/// The switch time is `first.end()`. Before it the result follows
/// `first`'s function; after it, `second`'s function shifted so that the
/// switch time maps to `second`'s local time `0`. `second.start()` is not
/// consulted, so a schedule meant to follow another should be built as if
/// it begins at `0`.
///
/// At the switch instant both closed windows claim the point and the larger
/// of the two values is used. A plain "`second` wins from the switch time
/// on" rule would leave a day built as lit-then-dark unlit at its lights-off
/// instant, so `regular_light(150, 8, 16)` would read `0` at hour 16.
///
/// The result spans `min(first.start, second.start)` for
/// `first.duration + second.duration` hours. Its default value is `0`: the
/// operands' defaults are not carried over.
pub fn sequence(first: &Light, second: &Light) -> Result<Light, DomainError> {
    let switch_time = first.end();

    let at_switch = first
        .profile()
        .value(switch_time)
        .max(second.profile().value(0.0));

    let mut pieces = first.profile().restrict(CutRange::below(switch_time));
    pieces.push(Segment::new(
        CutRange::point(switch_time),
        Term::constant(at_switch),
    ));
    pieces.extend(
        second
            .profile()
            .shifted(switch_time)
            .restrict(CutRange::above(switch_time)),
    );
    let profile = Profile::from_segments(pieces);

    let start = first.start().min(second.start());
    let duration = first.duration() + second.duration();

    debug!(
        switch_time,
        start,
        duration,
        segments = profile.len(),
        "sequenced light schedules"
    );

    Light::from_profile(profile, start, duration, 0.0)
}

impl Light {
    /// This schedule followed by `next`; see [`sequence`]
    pub fn concatenate(&self, next: &Light) -> Result<Light, DomainError> {
        sequence(self, next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(light: &Light, t: f64) -> f64 {
        light.value_at(t, None).unwrap()
    }

    #[test]
    fn test_duration_is_sum_of_operands() {
        let a = Light::constant(10.0, 0.0, 5.0, 0.0).unwrap();
        let b = Light::constant(20.0, 0.0, 7.0, 0.0).unwrap();
        let ab = sequence(&a, &b).unwrap();

        assert_eq!(ab.start(), 0.0);
        assert_eq!(ab.duration(), 12.0);
        assert_eq!(ab.end(), 12.0);
    }

    #[test]
    fn test_switches_at_first_end() {
        let a = Light::constant(10.0, 0.0, 5.0, 0.0).unwrap();
        let b = Light::constant(20.0, 0.0, 7.0, 0.0).unwrap();
        let ab = a.concatenate(&b).unwrap();

        assert_eq!(at(&ab, 4.9), 10.0);
        assert_eq!(at(&ab, 5.0), 20.0);
        assert_eq!(at(&ab, 5.1), 20.0);
        assert_eq!(at(&ab, 12.0), 20.0);
        assert_eq!(at(&ab, 12.1), 0.0);
    }

    #[test]
    fn test_switch_instant_takes_larger_value() {
        let lit = Light::constant(10.0, 0.0, 5.0, 0.0).unwrap();
        let dark = Light::constant(0.0, 0.0, 7.0, 0.0).unwrap();
        let lit_then_dark = lit.concatenate(&dark).unwrap();
        assert_eq!(at(&lit_then_dark, 5.0), 10.0);
        assert_eq!(at(&lit_then_dark, 5.01), 0.0);
    }

    #[test]
    fn test_second_function_is_shifted() {
        let a = Light::constant(0.0, 0.0, 10.0, 0.0).unwrap();
        let ramp = Light::from_fn(|t| t.max(0.0), 0.0, 4.0, 0.0).unwrap();
        let ab = sequence(&a, &ramp).unwrap();

        assert_eq!(at(&ab, 10.0), 0.0);
        assert_eq!(at(&ab, 11.0), 1.0);
        assert_eq!(at(&ab, 13.5), 3.5);
    }

    #[test]
    fn test_second_start_is_ignored() {
        let a = Light::constant(0.0, 0.0, 10.0, 0.0).unwrap();
        let ramp = Light::from_fn(|t| t.max(0.0), 100.0, 4.0, 0.0).unwrap();
        let ab = sequence(&a, &ramp).unwrap();

        assert_eq!(ab.start(), 0.0);
        assert_eq!(at(&ab, 12.0), 2.0);
    }

    #[test]
    fn test_default_is_not_propagated() {
        let a = Light::constant(10.0, 0.0, 5.0, 3.0).unwrap();
        let b = Light::constant(20.0, 0.0, 5.0, 4.0).unwrap();
        let ab = sequence(&a, &b).unwrap();

        assert_eq!(ab.default_value(), 0.0);
        assert_eq!(at(&ab, -1.0), 0.0);
        assert_eq!(at(&ab, 11.0), 0.0);
    }

    #[test]
    fn test_operands_are_unchanged() {
        let a = Light::constant(10.0, 0.0, 5.0, 1.0).unwrap();
        let b = Light::constant(20.0, 0.0, 5.0, 2.0).unwrap();
        let _ = sequence(&a, &b).unwrap();

        assert_eq!(a.duration(), 5.0);
        assert_eq!(at(&a, 6.0), 1.0);
        assert_eq!(at(&b, 3.0), 20.0);
    }

    #[test]
    fn test_negative_shifted_primitive_rejected() {
        let a = Light::constant(0.0, 0.0, 10.0, 0.0).unwrap();
        // nonnegative on its own window, negative for local times before 5
        let b = Light::from_fn(|t| t - 5.0, 5.0, 5.0, 0.0).unwrap();
        assert!(matches!(
            sequence(&a, &b),
            Err(DomainError::NegativeOutput { .. })
        ));
    }

    #[test]
    fn test_long_chain_keeps_segments_flat() {
        let day = Light::constant(1.0, 0.0, 24.0, 0.0).unwrap();
        let mut chain = day.clone();
        for _ in 0..60 {
            chain = chain.concatenate(&day).unwrap();
        }

        assert_eq!(chain.duration(), 61.0 * 24.0);
        assert_eq!(at(&chain, 1000.0), 1.0);
        assert!(chain.segments().len() <= 3);
    }
}
