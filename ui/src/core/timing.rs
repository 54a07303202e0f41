//! Timer utilities shared by the export menu and snapshot pipeline.

use std::time::Duration;

/// Suspend the current task for `ms` milliseconds.
pub async fn sleep_ms(ms: u64) {
    #[cfg(target_arch = "wasm32")]
    {
        let clamped = ms.min(u32::MAX as u64) as u32;
        gloo_timers::future::TimeoutFuture::new(clamped).await;
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }
}

/// Whole milliseconds of a duration, saturating at `u64::MAX`.
pub fn duration_ms(duration: Duration) -> u64 {
    duration.as_millis().min(u64::MAX as u128) as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_ms_truncates_sub_millisecond_parts() {
        assert_eq!(duration_ms(Duration::from_micros(200_900)), 200);
        assert_eq!(duration_ms(Duration::ZERO), 0);
    }
}
