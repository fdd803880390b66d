// SPDX-License-Identifier: MPL-2.0
//! Progress and seek arithmetic.
//!
//! Stateless helpers shared by the store and by presentation surfaces
//! (scrubbers, time labels, buffer bars). Every function tolerates
//! non-finite input and an unknown (zero) duration.

use crate::application::port::TimeRange;

/// Sanitizes a duration: non-finite or negative values become zero.
#[inline]
fn sane_duration(duration: f64) -> f64 {
    if duration.is_finite() && duration > 0.0 {
        duration
    } else {
        0.0
    }
}

/// Clamps a seek target to `[0, duration]`.
///
/// `NaN` targets resolve to the start; infinite ones to the nearest bound.
#[must_use]
pub fn clamp_seek(target: f64, duration: f64) -> f64 {
    let duration = sane_duration(duration);
    if target.is_nan() {
        return 0.0;
    }
    target.clamp(0.0, duration)
}

/// Converts a time to a percentage of the duration (0–100).
///
/// Returns 0 while the duration is unknown.
#[must_use]
pub fn percent_from_time(time: f64, duration: f64) -> f64 {
    let duration = sane_duration(duration);
    if duration == 0.0 {
        return 0.0;
    }
    (100.0 * clamp_seek(time, duration) / duration).clamp(0.0, 100.0)
}

/// Converts a percentage (0–100) back to a time, clamped to `[0, duration]`.
#[must_use]
pub fn time_from_percent(percent: f64, duration: f64) -> f64 {
    let duration = sane_duration(duration);
    if percent.is_nan() {
        return 0.0;
    }
    clamp_seek(percent.clamp(0.0, 100.0) / 100.0 * duration, duration)
}

/// Seek target for a relative jump from `current`, clamped.
#[must_use]
pub fn relative_seek_target(current: f64, delta: f64, duration: f64) -> f64 {
    let delta = if delta.is_finite() { delta } else { 0.0 };
    clamp_seek(current + delta, duration)
}

/// Formats seconds as `M:SS`.
///
/// Minutes are not wrapped into hours. Non-finite or negative input
/// formats as `0:00`.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn format_time(seconds: f64) -> String {
    if !seconds.is_finite() || seconds < 0.0 {
        return "0:00".to_string();
    }
    let total = seconds.floor() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}

/// Buffered percentage from the element's buffered ranges.
///
/// Uses the furthest buffered end point, so a gap left behind by a seek
/// does not shrink the bar.
#[must_use]
pub fn buffered_percent_from_ranges(ranges: &[TimeRange], duration: f64) -> f64 {
    let furthest_end = ranges
        .iter()
        .filter(|r| r.end.is_finite() && r.end >= r.start)
        .map(|r| r.end)
        .fold(0.0_f64, f64::max);
    percent_from_time(furthest_end, duration)
}

/// Returns true if a requested time diverges enough from the time the
/// element last reported to be pushed down as a programmatic seek.
///
/// Smaller divergences are left alone so the element's own `timeupdate`
/// stream never fights with the store.
#[must_use]
pub fn exceeds_sync_threshold(requested: f64, reported: f64, threshold: f64) -> bool {
    (requested - reported).abs() > threshold
}
