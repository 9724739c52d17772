//! Frame timestamp schedule.

use crate::task::FrameParams;

/// Timestamps (seconds) at which frames are taken.
///
/// Starts at `start_seconds` and steps by `interval_seconds` while the
/// timestamp is before `duration` and fewer than `max_frames` were produced.
pub fn frame_timestamps(duration: f64, params: &FrameParams) -> Vec<f64> {
    if params.max_frames <= 0 || params.interval_seconds <= 0 || params.start_seconds < 0 {
        return Vec::new();
    }

    let max = params.max_frames as usize;
    let mut timestamps = Vec::new();
    let mut current = params.start_seconds;

    while (current as f64) < duration && timestamps.len() < max {
        timestamps.push(current as f64);
        current = match current.checked_add(params.interval_seconds) {
            Some(next) => next,
            None => break,
        };
    }

    timestamps
}
