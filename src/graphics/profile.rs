//! Present mode selection and opt-in frame timing.

use std::sync::OnceLock;

pub(crate) const PRESENT_MODE_ENV: &str = "TAPFLASH_PRESENT_MODE";
pub(crate) const PROFILE_RENDER_ENV: &str = "TAPFLASH_PROFILE_RENDER";

/// Frames averaged per log line.
const REPORT_EVERY: u64 = 30;

static PROFILE_RENDER: OnceLock<bool> = OnceLock::new();

pub(crate) fn profile_enabled() -> bool {
    *PROFILE_RENDER.get_or_init(|| {
        std::env::var(PROFILE_RENDER_ENV)
            .map(|v| is_truthy(&v))
            .unwrap_or(false)
    })
}

fn is_truthy(v: &str) -> bool {
    let v = v.trim().to_ascii_lowercase();
    !v.is_empty() && v != "0" && v != "false" && v != "off"
}

pub(crate) fn parse_present_mode(v: &str) -> Option<wgpu::PresentMode> {
    match v.trim().to_ascii_lowercase().as_str() {
        "immediate" => Some(wgpu::PresentMode::Immediate),
        "mailbox" => Some(wgpu::PresentMode::Mailbox),
        "fifo" => Some(wgpu::PresentMode::Fifo),
        "auto" | "auto_vsync" => Some(wgpu::PresentMode::AutoVsync),
        "auto_no_vsync" => Some(wgpu::PresentMode::AutoNoVsync),
        _ => None,
    }
}

/// Honors [`PRESENT_MODE_ENV`] when the surface supports it, else prefers vsync.
pub(crate) fn pick_present_mode(surface_caps: &wgpu::SurfaceCapabilities) -> wgpu::PresentMode {
    let requested = std::env::var(PRESENT_MODE_ENV)
        .ok()
        .and_then(|v| parse_present_mode(&v));
    choose_present_mode(requested, &surface_caps.present_modes)
}

fn choose_present_mode(
    requested: Option<wgpu::PresentMode>,
    supported: &[wgpu::PresentMode],
) -> wgpu::PresentMode {
    if let Some(requested) = requested {
        if supported.contains(&requested) {
            return requested;
        }
        tracing::warn!(?requested, "present mode not supported by surface, ignoring");
    }
    if supported.contains(&wgpu::PresentMode::Fifo) {
        wgpu::PresentMode::Fifo
    } else {
        supported
            .first()
            .copied()
            .unwrap_or(wgpu::PresentMode::AutoVsync)
    }
}

/// Running frame timings. `record` yields a summary every [`REPORT_EVERY`] frames.
#[derive(Debug)]
pub(crate) struct RenderProfileStats {
    pub frame: u64,
    pub sum_total_ms: f64,
    pub sum_wait_ms: f64,
    pub min_total_ms: f64,
    pub max_total_ms: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct ProfileSummary {
    pub frame: u64,
    pub avg_total_ms: f64,
    pub avg_work_ms: f64,
    pub avg_wait_ms: f64,
    pub min_total_ms: f64,
    pub max_total_ms: f64,
}

impl Default for RenderProfileStats {
    fn default() -> Self {
        Self {
            frame: 0,
            sum_total_ms: 0.0,
            sum_wait_ms: 0.0,
            min_total_ms: f64::INFINITY,
            max_total_ms: 0.0,
        }
    }
}

impl RenderProfileStats {
    /// `wait_ms` is the part of `total_ms` spent acquiring the surface texture.
    pub fn record(&mut self, total_ms: f64, wait_ms: f64) -> Option<ProfileSummary> {
        self.frame = self.frame.saturating_add(1);
        self.sum_total_ms += total_ms;
        self.sum_wait_ms += wait_ms;
        self.min_total_ms = self.min_total_ms.min(total_ms);
        self.max_total_ms = self.max_total_ms.max(total_ms);

        if self.frame % REPORT_EVERY != 0 {
            return None;
        }
        let n = self.frame as f64;
        Some(ProfileSummary {
            frame: self.frame,
            avg_total_ms: self.sum_total_ms / n,
            avg_work_ms: (self.sum_total_ms - self.sum_wait_ms) / n,
            avg_wait_ms: self.sum_wait_ms / n,
            min_total_ms: self.min_total_ms,
            max_total_ms: self.max_total_ms,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn present_mode_names_parse_case_insensitively() {
        assert_eq!(
            parse_present_mode(" Mailbox "),
            Some(wgpu::PresentMode::Mailbox)
        );
        assert_eq!(
            parse_present_mode("auto"),
            Some(wgpu::PresentMode::AutoVsync)
        );
        assert_eq!(parse_present_mode("vsync-please"), None);
        assert_eq!(parse_present_mode(""), None);
    }

    #[test]
    fn unsupported_request_falls_back_to_fifo() {
        let supported = [wgpu::PresentMode::Fifo, wgpu::PresentMode::Immediate];
        assert_eq!(
            choose_present_mode(Some(wgpu::PresentMode::Mailbox), &supported),
            wgpu::PresentMode::Fifo
        );
        assert_eq!(
            choose_present_mode(Some(wgpu::PresentMode::Immediate), &supported),
            wgpu::PresentMode::Immediate
        );
        assert_eq!(
            choose_present_mode(None, &[wgpu::PresentMode::Mailbox]),
            wgpu::PresentMode::Mailbox
        );
    }

    #[test]
    fn truthy_values() {
        assert!(is_truthy("1"));
        assert!(is_truthy("yes"));
        assert!(!is_truthy("OFF"));
        assert!(!is_truthy(" "));
    }

    #[test]
    fn stats_report_every_thirty_frames() {
        let mut stats = RenderProfileStats::default();
        for _ in 0..29 {
            assert!(stats.record(2.0, 0.5).is_none());
        }
        let summary = stats.record(5.0, 0.5).unwrap();
        assert_eq!(summary.frame, 30);
        assert_eq!(summary.max_total_ms, 5.0);
        assert_eq!(summary.min_total_ms, 2.0);
        assert_eq!(summary.avg_wait_ms, 0.5);
        assert!((summary.avg_total_ms - 2.1).abs() < 1e-9);
    }
}
