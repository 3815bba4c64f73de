//! Scroll offset to normalized progress
//!
//! The smoothed offset trails the raw offset by a fixed per-frame blend,
//! which gives the whole vignette its characteristic lag.

use crate::math::unit_ratio;
use crate::timeline::{ProgressSample, SCROLL_SMOOTHING};

/// Scroll state for the page session
#[derive(Debug, Clone, PartialEq)]
pub struct ScrollState {
    /// Latest page offset in pixels
    pub raw: f32,
    /// Exponentially filtered offset
    pub smoothed: f32,
    /// Page section containing the raw offset
    pub section: usize,
}

/// Converts scroll offsets into progress in [0, 1]
#[derive(Debug, Clone)]
pub struct ProgressTracker {
    state: ScrollState,
    sections: Vec<String>,
    viewport_height: f32,
    smoothing: f32,
}

impl ProgressTracker {
    pub fn new(sections: Vec<String>, viewport_height: f32) -> Self {
        Self {
            state: ScrollState {
                raw: 0.0,
                smoothed: 0.0,
                section: 0,
            },
            sections,
            viewport_height: sanitize(viewport_height),
            smoothing: SCROLL_SMOOTHING,
        }
    }

    pub fn with_smoothing(mut self, smoothing: f32) -> Self {
        self.smoothing = smoothing.clamp(0.0, 1.0);
        self
    }

    pub fn state(&self) -> &ScrollState {
        &self.state
    }

    /// Total scrollable distance: one viewport per section after the first
    pub fn max_extent(&self) -> f32 {
        self.sections.len().saturating_sub(1) as f32 * self.viewport_height
    }

    pub fn resize(&mut self, viewport_height: f32) {
        self.viewport_height = sanitize(viewport_height);
        self.refresh_section();
    }

    /// Record a scroll event without advancing the smoothing
    pub fn set_raw(&mut self, offset: f32) {
        self.state.raw = sanitize(offset);
        self.refresh_section();
    }

    /// Record the offset and advance smoothing by one frame
    pub fn update(&mut self, offset: f32) {
        self.set_raw(offset);
        self.state.smoothed += (self.state.raw - self.state.smoothed) * self.smoothing;
    }

    pub fn smoothed_progress(&self) -> f32 {
        unit_ratio(self.state.smoothed, self.max_extent())
    }

    pub fn eased_progress(&self) -> f32 {
        self.sample().eased
    }

    /// Unsmoothed progress for the page's progress bar
    pub fn linear_progress(&self) -> f32 {
        unit_ratio(self.state.raw, self.max_extent())
    }

    pub fn sample(&self) -> ProgressSample {
        ProgressSample::from_linear(self.smoothed_progress())
    }

    pub fn current_section(&self) -> usize {
        self.state.section
    }

    pub fn current_section_name(&self) -> Option<&str> {
        self.sections.get(self.state.section).map(String::as_str)
    }

    fn refresh_section(&mut self) {
        if self.viewport_height <= 0.0 {
            return;
        }
        let index = (self.state.raw / self.viewport_height).floor() as usize;
        if index != self.state.section && index < self.sections.len() {
            log::debug!(
                "section {} -> {} ({})",
                self.state.section,
                index,
                self.sections[index]
            );
            self.state.section = index;
        }
    }
}

fn sanitize(v: f32) -> f32 {
    if v.is_finite() {
        v.max(0.0)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::config::DEFAULT_SECTIONS;

    fn tracker(height: f32) -> ProgressTracker {
        let sections = DEFAULT_SECTIONS.iter().map(|s| s.to_string()).collect();
        ProgressTracker::new(sections, height)
    }

    #[test]
    fn test_max_extent() {
        let t = tracker(800.0);
        assert_eq!(t.max_extent(), 2400.0);
    }

    #[test]
    fn test_smoothing_step() {
        let mut t = tracker(800.0);
        t.update(1000.0);
        assert!((t.state().smoothed - 60.0).abs() < 1e-3);
        t.update(1000.0);
        assert!((t.state().smoothed - (60.0 + 940.0 * 0.06)).abs() < 1e-3);
    }

    #[test]
    fn test_progress_bounded_and_monotonic() {
        let mut t = tracker(800.0);
        let mut prev = 0.0;
        for i in 0..600 {
            t.update(i as f32 * 10.0);
            let p = t.smoothed_progress();
            assert!((0.0..=1.0).contains(&p));
            assert!(p >= prev);
            prev = p;
        }
    }

    #[test]
    fn test_converges_to_full_progress() {
        let mut t = tracker(800.0);
        for _ in 0..1000 {
            t.update(5000.0);
        }
        assert_eq!(t.smoothed_progress(), 1.0);
        assert_eq!(t.linear_progress(), 1.0);
        assert_eq!(t.eased_progress(), 1.0);
    }

    #[test]
    fn test_zero_extent_does_not_nan() {
        let mut single = ProgressTracker::new(vec!["only".to_string()], 800.0);
        single.update(300.0);
        assert_eq!(single.smoothed_progress(), 0.0);

        let mut flat = tracker(0.0);
        flat.update(300.0);
        assert_eq!(flat.smoothed_progress(), 0.0);
        assert_eq!(flat.linear_progress(), 0.0);
    }

    #[test]
    fn test_negative_and_nan_offsets_clamped() {
        let mut t = tracker(800.0);
        t.update(-50.0);
        assert_eq!(t.state().raw, 0.0);
        t.update(f32::NAN);
        assert_eq!(t.state().raw, 0.0);
        assert_eq!(t.smoothed_progress(), 0.0);
    }

    #[test]
    fn test_linear_progress_leads_smoothed() {
        let mut t = tracker(800.0);
        t.update(1200.0);
        assert!((t.linear_progress() - 0.5).abs() < 1e-6);
        assert!(t.smoothed_progress() < t.linear_progress());
    }

    #[test]
    fn test_section_tracking() {
        let mut t = tracker(800.0);
        assert_eq!(t.current_section_name(), Some("genesis"));
        t.set_raw(850.0);
        assert_eq!(t.current_section(), 1);
        t.set_raw(2400.0);
        assert_eq!(t.current_section_name(), Some("future"));
        // past the last section the index holds
        t.set_raw(10_000.0);
        assert_eq!(t.current_section(), 3);
    }

    #[test]
    fn test_resize_rescales_progress() {
        let mut t = tracker(800.0);
        for _ in 0..2000 {
            t.update(1200.0);
        }
        let before = t.smoothed_progress();
        t.resize(400.0);
        assert!(t.smoothed_progress() > before);
    }
}
