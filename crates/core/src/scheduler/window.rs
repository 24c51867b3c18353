use chrono::{DateTime, TimeDelta, Utc};
use std::time::Duration;

/// One operational window, anchored on the moment it starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowPlan {
    pub start: DateTime<Utc>,
    /// `start + window`, clipped to `resume`.
    pub end: DateTime<Utc>,
    /// Period boundary where the next window starts.
    pub resume: DateTime<Utc>,
}

impl WindowPlan {
    pub fn new(start: DateTime<Utc>, window: Duration, period: Duration) -> Self {
        let resume = next_boundary(start, period);
        let end = TimeDelta::from_std(window)
            .ok()
            .and_then(|w| start.checked_add_signed(w))
            .map_or(resume, |end| end.min(resume));
        Self { start, end, resume }
    }

    /// Active time of the window.
    pub fn length(&self) -> Duration {
        (self.end - self.start).to_std().unwrap_or_default()
    }

    /// Time left until the next window at `now`; zero once `resume` has passed.
    pub fn idle_after(&self, now: DateTime<Utc>) -> Duration {
        (self.resume - now).to_std().unwrap_or_default()
    }
}

/// First multiple of `period` since the Unix epoch that is strictly after `now`.
/// Saturates at the latest representable time.
pub fn next_boundary(now: DateTime<Utc>, period: Duration) -> DateTime<Utc> {
    let period = i64::try_from(period.as_secs()).unwrap_or(i64::MAX).max(1);
    (now.timestamp().div_euclid(period) + 1)
        .checked_mul(period)
        .and_then(|next| DateTime::from_timestamp(next, 0))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const TWELVE_HOURS: Duration = Duration::from_secs(12 * 3600);

    #[test]
    fn aligns_to_half_days() {
        let now = Utc.with_ymd_and_hms(2024, 3, 9, 7, 30, 0).unwrap();
        assert_eq!(
            next_boundary(now, TWELVE_HOURS),
            Utc.with_ymd_and_hms(2024, 3, 9, 12, 0, 0).unwrap()
        );

        let now = Utc.with_ymd_and_hms(2024, 3, 9, 19, 0, 1).unwrap();
        assert_eq!(
            next_boundary(now, TWELVE_HOURS),
            Utc.with_ymd_and_hms(2024, 3, 10, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn boundary_is_strictly_in_the_future() {
        let now = Utc.with_ymd_and_hms(2024, 3, 9, 12, 0, 0).unwrap();
        assert_eq!(
            next_boundary(now, TWELVE_HOURS),
            Utc.with_ymd_and_hms(2024, 3, 10, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn equal_window_and_period_leave_no_idle_time() {
        let start = Utc.with_ymd_and_hms(2024, 3, 9, 0, 0, 0).unwrap();
        let plan = WindowPlan::new(start, TWELVE_HOURS, TWELVE_HOURS);
        assert_eq!(plan.end, Utc.with_ymd_and_hms(2024, 3, 9, 12, 0, 0).unwrap());
        assert_eq!(plan.resume, plan.end);
        assert_eq!(plan.length(), TWELVE_HOURS);

        // the last wait ran past the end of the window
        let late = Utc.with_ymd_and_hms(2024, 3, 9, 12, 0, 30).unwrap();
        assert_eq!(plan.idle_after(late), Duration::ZERO);
        assert_eq!(plan.idle_after(plan.end), Duration::ZERO);
    }

    #[test]
    fn unaligned_start_is_clipped_to_its_block() {
        let start = Utc.with_ymd_and_hms(2024, 3, 9, 7, 30, 0).unwrap();
        let plan = WindowPlan::new(start, TWELVE_HOURS, TWELVE_HOURS);
        assert_eq!(plan.end, Utc.with_ymd_and_hms(2024, 3, 9, 12, 0, 0).unwrap());
        assert_eq!(plan.length(), Duration::from_secs(4 * 3600 + 1800));
    }

    #[test]
    fn short_window_idles_until_next_period() {
        let start = Utc.with_ymd_and_hms(2024, 3, 9, 0, 0, 0).unwrap();
        let plan = WindowPlan::new(start, Duration::from_secs(6 * 3600), TWELVE_HOURS);
        assert_eq!(plan.end, Utc.with_ymd_and_hms(2024, 3, 9, 6, 0, 0).unwrap());
        assert_eq!(plan.idle_after(plan.end), Duration::from_secs(6 * 3600));
    }

    #[test]
    fn huge_period_saturates() {
        let now = Utc.with_ymd_and_hms(2024, 3, 9, 7, 30, 0).unwrap();
        let next = next_boundary(now, Duration::from_secs(u64::MAX));
        assert!(next > now);
    }

    #[test]
    fn hourly_period() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 5, 59, 59).unwrap();
        assert_eq!(
            next_boundary(now, Duration::from_secs(3600)),
            Utc.with_ymd_and_hms(2024, 1, 1, 6, 0, 0).unwrap()
        );
    }
}
