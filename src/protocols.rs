//! Multi-day lighting protocols
//!
//! Every protocol is built from 24-hour [`regular_light`] days stitched
//! together with [`Light::concatenate`]. The multi-day builders all read
//! the same way: seed with one day of the first kind, append
//! `first_count - 1` more of it, then `second_count` days of the second
//! kind. A first count of zero therefore still yields one seed day.
//!
//! Parameters are validated before any schedule is built.

use std::iter;

use tracing::debug;

use crate::error::DomainError;
use crate::light::Light;

/// Hours in one protocol day
pub const HOURS_PER_DAY: f64 = 24.0;

/// Default light intensity (lux)
pub const DEFAULT_LUX: f64 = 150.0;

/// Lit hours per day for the slam-shift and social jet-lag protocols
pub const LIT_HOURS: f64 = 16.0;

/// Night-shift work day: lights on at 19:00, off at 11:00
pub const WORK_DAY_LIGHTS_ON: f64 = 19.0;
pub const WORK_DAY_LIGHTS_OFF: f64 = 11.0;

/// Day off: lights on at 07:00, off at 23:00
pub const OFF_DAY_LIGHTS_ON: f64 = 7.0;
pub const OFF_DAY_LIGHTS_OFF: f64 = 23.0;

/// One 24-hour day lit at `lux` from `lights_on` to `lights_off`.
///
/// Both hours are taken modulo 24. When `lights_off` precedes `lights_on`
/// the lit period spans midnight, so the day starts lit, goes dark at
/// `lights_off` and is lit again from `lights_on`. Both switch instants
/// count as lit.
pub fn regular_light(lux: f64, lights_on: f64, lights_off: f64) -> Result<Light, DomainError> {
    check_nonnegative("lux", lux)?;
    check_finite("lights_on", lights_on)?;
    check_finite("lights_off", lights_off)?;

    let lights_on = lights_on.rem_euclid(HOURS_PER_DAY);
    let lights_off = lights_off.rem_euclid(HOURS_PER_DAY);

    let day = if lights_off > lights_on {
        let dark_before = Light::constant(0.0, 0.0, lights_on, 0.0)?;
        let lit = Light::constant(lux, lights_on, lights_off - lights_on, 0.0)?;
        let dark_after = Light::constant(0.0, lights_off, HOURS_PER_DAY - lights_off, 0.0)?;
        dark_before.concatenate(&lit)?.concatenate(&dark_after)?
    } else {
        let lit_before = Light::constant(lux, 0.0, lights_off, 0.0)?;
        let dark = Light::constant(0.0, lights_off, lights_on - lights_off, 0.0)?;
        let lit_after = Light::constant(lux, lights_on, HOURS_PER_DAY - lights_on, 0.0)?;
        lit_before.concatenate(&dark)?.concatenate(&lit_after)?
    };

    debug!(lux, lights_on, lights_off, "built regular light day");
    Ok(day)
}

/// Night-shift schedule: `days_on` work days (lit 19:00 to 11:00) followed
/// by `days_off` days off (lit 07:00 to 23:00).
///
/// # Errors
/// [`DomainError::ConflictingParameters`] when both counts are zero.
pub fn shift_work_light(lux: f64, days_on: u32, days_off: u32) -> Result<Light, DomainError> {
    check_nonnegative("lux", lux)?;
    if days_on == 0 && days_off == 0 {
        return Err(DomainError::ConflictingParameters(
            "days_on and days_off cannot both be 0".to_string(),
        ));
    }

    let work_day = regular_light(lux, WORK_DAY_LIGHTS_ON, WORK_DAY_LIGHTS_OFF)?;
    let off_day = regular_light(lux, OFF_DAY_LIGHTS_ON, OFF_DAY_LIGHTS_OFF)?;
    let schedule = chain_days(&work_day, days_on, &off_day, days_off)?;

    debug!(
        lux,
        days_on,
        days_off,
        hours = schedule.duration(),
        "built shift work protocol"
    );
    Ok(schedule)
}

/// Abrupt phase shift: `before_days` days lit for 16 hours from
/// `starting_lights_on`, then `after_days` days with lights on `shift`
/// hours later.
pub fn slam_shift(
    lux: f64,
    shift: f64,
    before_days: u32,
    after_days: u32,
    starting_lights_on: f64,
) -> Result<Light, DomainError> {
    check_nonnegative("lux", lux)?;
    check_nonnegative("shift", shift)?;
    check_nonnegative("starting_lights_on", starting_lights_on)?;

    let shifted_on = starting_lights_on + shift;
    let before = regular_light(
        lux,
        starting_lights_on,
        (starting_lights_on + LIT_HOURS) % HOURS_PER_DAY,
    )?;
    let after = regular_light(
        lux,
        shifted_on % HOURS_PER_DAY,
        (shifted_on + LIT_HOURS) % HOURS_PER_DAY,
    )?;
    let schedule = chain_days(&before, before_days, &after, after_days)?;

    debug!(
        lux,
        shift,
        before_days,
        after_days,
        starting_lights_on,
        hours = schedule.duration(),
        "built slam shift protocol"
    );
    Ok(schedule)
}

/// Social jet-lag: `num_regular_days` days lit for 16 hours from
/// `regular_days_lights_on`, then `num_jetlag_days` days delayed by
/// `hours_delayed`.
pub fn social_jetlag(
    lux: f64,
    num_regular_days: u32,
    num_jetlag_days: u32,
    hours_delayed: f64,
    regular_days_lights_on: f64,
) -> Result<Light, DomainError> {
    check_nonnegative("lux", lux)?;
    check_nonnegative("hours_delayed", hours_delayed)?;
    check_nonnegative("regular_days_lights_on", regular_days_lights_on)?;

    let jetlag_lights_on = regular_days_lights_on + hours_delayed;
    let regular_day = regular_light(
        lux,
        regular_days_lights_on,
        regular_days_lights_on + LIT_HOURS,
    )?;
    let jetlag_day = regular_light(lux, jetlag_lights_on, jetlag_lights_on + LIT_HOURS)?;
    let schedule = chain_days(&regular_day, num_regular_days, &jetlag_day, num_jetlag_days)?;

    debug!(
        lux,
        num_regular_days,
        num_jetlag_days,
        hours_delayed,
        regular_days_lights_on,
        hours = schedule.duration(),
        "built social jetlag protocol"
    );
    Ok(schedule)
}

/// Seed with `first`, append `first_count - 1` more copies of it and then
/// `second_count` copies of `second`
fn chain_days(
    first: &Light,
    first_count: u32,
    second: &Light,
    second_count: u32,
) -> Result<Light, DomainError> {
    iter::repeat(first)
        .take(first_count.saturating_sub(1) as usize)
        .chain(iter::repeat(second).take(second_count as usize))
        .try_fold(first.clone(), |schedule, day| schedule.concatenate(day))
}

fn check_nonnegative(name: &'static str, value: f64) -> Result<(), DomainError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(DomainError::nonnegative(name, value))
    }
}

fn check_finite(name: &'static str, value: f64) -> Result<(), DomainError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(DomainError::non_finite(name, value))
    }
}
