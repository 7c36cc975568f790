use std::time::{Duration, Instant};

/// Session stopwatch. Starts once and never stops or restarts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stopwatch {
    started_at: Option<Instant>,
}

impl Stopwatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts the stopwatch. Returns `false` if it was already running.
    pub fn start(&mut self, now: Instant) -> bool {
        if self.started_at.is_some() {
            return false;
        }
        self.started_at = Some(now);
        true
    }

    pub fn is_running(&self) -> bool {
        self.started_at.is_some()
    }

    pub fn started_at(&self) -> Option<Instant> {
        self.started_at
    }

    pub fn elapsed(&self, now: Instant) -> Option<Duration> {
        self.started_at
            .map(|start| now.saturating_duration_since(start))
    }
}

/// Formats as `HH:MM:SS.mmm`. Milliseconds are truncated, hours widen past 99.
pub fn format_elapsed(elapsed: Duration) -> String {
    let total = elapsed.as_secs();
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;
    let millis = elapsed.subsec_millis();
    format!("{hours:02}:{minutes:02}:{seconds:02}.{millis:03}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_hours_minutes_seconds_millis() {
        assert_eq!(format_elapsed(Duration::from_millis(3_661_234)), "01:01:01.234");
        assert_eq!(format_elapsed(Duration::ZERO), "00:00:00.000");
        assert_eq!(format_elapsed(Duration::from_secs(360_000)), "100:00:00.000");
    }

    #[test]
    fn truncates_sub_millisecond_part() {
        assert_eq!(
            format_elapsed(Duration::from_micros(1_999_999)),
            "00:00:01.999"
        );
    }

    #[test]
    fn start_is_one_way() {
        let t0 = Instant::now();
        let mut sw = Stopwatch::new();
        assert!(!sw.is_running());
        assert_eq!(sw.elapsed(t0), None);

        assert!(sw.start(t0));
        assert!(!sw.start(t0 + Duration::from_secs(5)));
        assert_eq!(sw.started_at(), Some(t0));
        assert_eq!(
            sw.elapsed(t0 + Duration::from_millis(1500)),
            Some(Duration::from_millis(1500))
        );
    }
}
