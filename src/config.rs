use std::time::Duration;

use crate::Pt;
use crate::color::Rgba;

/// Timing, layout and label constants of the toy.
#[derive(Debug, Clone, PartialEq)]
pub struct VisualizerConfig {
    /// Taps closer than this to the previous one are dropped.
    pub tap_debounce: Duration,
    /// Taps at least this far apart pick a new base color.
    pub tap_repeat: Duration,
    pub long_press: Duration,
    pub circle_lifetime: Duration,
    pub circle_radius: Pt,
    /// Growth applied to both dimensions when a circle expires.
    pub circle_growth: Pt,
    pub stopwatch_period: Duration,
    pub flash_period: Duration,
    pub flash_duration: Duration,
    pub long_press_flash_duration: Duration,
    pub initial_base_color: Rgba,
    pub base_alpha: f32,
    pub label_text: String,
    pub label_font_size: f32,
    pub label_color: Rgba,
    pub label_shadow_color: Rgba,
    /// Shadow copies drawn behind the label, offset by 1..=n points.
    pub label_shadow_layers: u32,
    /// Label bottom edge, as a fraction of the height above the bottom.
    pub label_anchor: f32,
    pub stopwatch_font_size: f32,
    pub stopwatch_color: Rgba,
    /// Stopwatch bottom edge, as a fraction of the height above the bottom.
    pub stopwatch_anchor: f32,
}

impl Default for VisualizerConfig {
    fn default() -> Self {
        Self {
            tap_debounce: Duration::from_millis(100),
            tap_repeat: Duration::from_millis(300),
            long_press: Duration::from_millis(1000),
            circle_lifetime: Duration::from_millis(2000),
            circle_radius: Pt(10.0),
            circle_growth: Pt(20.0),
            stopwatch_period: Duration::from_millis(100),
            flash_period: Duration::from_millis(2000),
            flash_duration: Duration::from_millis(10),
            long_press_flash_duration: Duration::from_millis(20),
            initial_base_color: Rgba::new(1.0, 1.0, 1.0, 0.5),
            base_alpha: 0.5,
            label_text: "Mohit".to_string(),
            label_font_size: 100.0,
            label_color: Rgba::WHITE,
            label_shadow_color: Rgba::new(0.2, 0.2, 0.2, 1.0),
            label_shadow_layers: 5,
            label_anchor: 0.05,
            stopwatch_font_size: 120.0,
            stopwatch_color: Rgba::BLACK,
            stopwatch_anchor: 0.75,
        }
    }
}

#[derive(Debug, Clone)]
pub struct WindowConfig {
    pub title: String,
    /// Logical size used when not fullscreen.
    pub width: Pt,
    pub height: Pt,
    pub fullscreen: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "tapflash".to_string(),
            width: Pt(800.0),
            height: Pt(600.0),
            fullscreen: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_timings_match_the_toy() {
        let c = VisualizerConfig::default();
        assert!(c.tap_debounce < c.tap_repeat);
        assert_eq!(c.long_press, Duration::from_secs(1));
        assert_eq!(c.circle_lifetime, Duration::from_secs(2));
        assert_eq!(c.flash_period, Duration::from_secs(2));
        assert_eq!(c.initial_base_color.a, c.base_alpha);
    }

    #[test]
    fn window_defaults_to_fullscreen() {
        let w = WindowConfig::default();
        assert!(w.fullscreen);
        assert_eq!(w.title, "tapflash");
    }
}
