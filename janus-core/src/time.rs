//! Millisecond timestamps
//!
//! All timing in the controller uses a free-running `u32` millisecond
//! counter that wraps after ~49 days. Comparisons go through these helpers
//! so the wrap is handled in one place.

/// Milliseconds from `since` to `now`, across a counter wrap
#[inline]
pub fn elapsed_ms(now: u32, since: u32) -> u32 {
    now.wrapping_sub(since)
}

/// Check whether at least `duration_ms` passed between `since` and `now`
#[inline]
pub fn has_elapsed(now: u32, since: u32, duration_ms: u32) -> bool {
    elapsed_ms(now, since) >= duration_ms
}
