// src/config.rs
//
// Every tunable threshold in the pipeline, grouped per stage. Defaults
// mirror the values the heuristics were calibrated with; all of them are
// validated up front so a bad value can never reach frame processing.

use crate::error::{AnalysisError, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisConfig {
    pub sampling: SamplingConfig,
    pub localizer: LocalizerConfig,
    pub kinematics: KinematicsConfig,
    pub events: EventConfig,
    pub funnel: FunnelConfig,
    pub friction: FrictionConfig,
    pub heatmap: HeatmapConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SamplingConfig {
    /// Localize every N-th frame. A throughput/accuracy trade-off: 3 is the
    /// standard setting, 10 gives a fast reduced-resolution pass.
    pub stride: usize,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self { stride: 3 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalizerConfig {
    /// White cursor mask: saturation ceiling (0-100 scale) and value floor (0-255).
    pub white_max_saturation: f32,
    pub white_min_value: f32,
    /// Black cursor mask: value ceiling (0-255).
    pub black_max_value: f32,
    /// Blue cursor mask (some UIs theme the pointer); disabled by default.
    pub detect_blue: bool,
    pub blue_hue_min: f32,
    pub blue_hue_max: f32,
    pub blue_min_saturation: f32,
    pub blue_min_value: f32,
    /// Accepted blob pixel area, exclusive bounds.
    pub min_area: u32,
    pub max_area: u32,
    /// Accepted bounding-box aspect ratio (rejects thin edges and text).
    pub min_aspect_ratio: f32,
    pub max_aspect_ratio: f32,
    /// Confidence assigned to a pure color-mask hit.
    pub color_confidence: f32,
    /// Shape-template matching: a normalized cross-correlation score above
    /// this threshold is preferred over the color result.
    pub use_templates: bool,
    pub template_match_threshold: f32,
}

impl Default for LocalizerConfig {
    fn default() -> Self {
        Self {
            white_max_saturation: 12.0,
            white_min_value: 200.0,
            black_max_value: 30.0,
            detect_blue: false,
            blue_hue_min: 200.0,
            blue_hue_max: 260.0,
            blue_min_saturation: 20.0,
            blue_min_value: 50.0,
            min_area: 10,
            max_area: 500,
            min_aspect_ratio: 0.3,
            max_aspect_ratio: 3.0,
            color_confidence: 0.8,
            use_templates: true,
            template_match_threshold: 0.7,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KinematicsConfig {
    /// Angular difference (radians, wrapped to [0, pi]) above which two
    /// consecutive displacement vectors count as a direction change.
    pub direction_change_threshold: f64,
}

impl Default for KinematicsConfig {
    fn default() -> Self {
        Self {
            direction_change_threshold: std::f64::consts::FRAC_PI_4,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventConfig {
    /// Click = fast approach then stop.
    pub click_motion_threshold: f64,
    pub click_stillness_threshold: f64,
    /// Hover = near-still across the triplet, with a long gap to the next sample.
    pub hover_motion_threshold: f64,
    pub min_hover_duration: f64,
    /// Scroll trend detection: window half-width in samples, and the minimum
    /// |y trend| in pixels to classify.
    pub scroll_window: usize,
    pub scroll_trend_threshold: f64,
    /// Rage-click clustering: a click joins a cluster when it is within this
    /// many seconds and pixels of the cluster's first click.
    pub rage_click_window_secs: f64,
    pub rage_click_radius_px: f64,
    pub rage_click_min_count: usize,
    /// A UI element attaches to an event when its frame index is within this
    /// many frames of the event's.
    pub target_frame_tolerance: u64,
}

impl Default for EventConfig {
    fn default() -> Self {
        Self {
            click_motion_threshold: 20.0,
            click_stillness_threshold: 5.0,
            hover_motion_threshold: 10.0,
            min_hover_duration: 0.5,
            scroll_window: 5,
            scroll_trend_threshold: 50.0,
            rage_click_window_secs: 2.0,
            rage_click_radius_px: 50.0,
            rage_click_min_count: 3,
            target_frame_tolerance: 5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunnelConfig {
    /// Element type that counts as a call-to-action when clicked.
    pub cta_element_type: String,
}

impl Default for FunnelConfig {
    fn default() -> Self {
        Self {
            cta_element_type: "button".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrictionConfig {
    /// Inter-position gap above which a pause becomes a hesitation record.
    pub hesitation_threshold_secs: f64,
    /// Gap above which the pause is also surfaced as a long-pause key moment.
    pub long_pause_threshold_secs: f64,
    /// Speed discontinuity (px/s) above which movement counts as erratic.
    pub erratic_speed_delta: f64,
    /// Only the top-K erratic occurrences are reported, to bound report size.
    pub max_erratic_reports: usize,
    /// Key moment list cap.
    pub max_key_moments: usize,
}

impl Default for FrictionConfig {
    fn default() -> Self {
        Self {
            hesitation_threshold_secs: 1.0,
            long_pause_threshold_secs: 3.0,
            erratic_speed_delta: 100.0,
            max_erratic_reports: 5,
            max_key_moments: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeatmapConfig {
    /// Grid cell edge length in pixels.
    pub cell_size: u32,
    /// Number of hot zones to rank.
    pub top_zones: usize,
}

impl Default for HeatmapConfig {
    fn default() -> Self {
        Self {
            cell_size: 50,
            top_zones: 5,
        }
    }
}

impl AnalysisConfig {
    /// Reject out-of-range thresholds before any frame is processed.
    pub fn validate(&self) -> Result<()> {
        if self.sampling.stride == 0 {
            return Err(AnalysisError::invalid_config("sampling stride must be >= 1"));
        }
        let loc = &self.localizer;
        if loc.min_area >= loc.max_area {
            return Err(AnalysisError::invalid_config(format!(
                "localizer area bounds inverted: min {} >= max {}",
                loc.min_area, loc.max_area
            )));
        }
        if loc.min_aspect_ratio <= 0.0 || loc.min_aspect_ratio >= loc.max_aspect_ratio {
            return Err(AnalysisError::invalid_config(format!(
                "localizer aspect bounds invalid: [{}, {}]",
                loc.min_aspect_ratio, loc.max_aspect_ratio
            )));
        }
        if !(0.0..=1.0).contains(&loc.color_confidence) {
            return Err(AnalysisError::invalid_config(
                "color confidence must lie in [0, 1]",
            ));
        }
        if !(0.0..=1.0).contains(&loc.template_match_threshold) {
            return Err(AnalysisError::invalid_config(
                "template match threshold must lie in [0, 1]",
            ));
        }
        if self.kinematics.direction_change_threshold <= 0.0
            || self.kinematics.direction_change_threshold > std::f64::consts::PI
        {
            return Err(AnalysisError::invalid_config(
                "direction change threshold must lie in (0, pi]",
            ));
        }
        let ev = &self.events;
        if ev.click_motion_threshold <= 0.0
            || ev.click_stillness_threshold < 0.0
            || ev.hover_motion_threshold <= 0.0
            || ev.min_hover_duration < 0.0
        {
            return Err(AnalysisError::invalid_config(
                "event motion thresholds must be positive",
            ));
        }
        if ev.scroll_window == 0 {
            return Err(AnalysisError::invalid_config("scroll window must be >= 1"));
        }
        if ev.rage_click_min_count == 0
            || ev.rage_click_window_secs <= 0.0
            || ev.rage_click_radius_px <= 0.0
        {
            return Err(AnalysisError::invalid_config(
                "rage-click cluster parameters must be positive",
            ));
        }
        if self.funnel.cta_element_type.is_empty() {
            return Err(AnalysisError::invalid_config(
                "funnel CTA element type must be non-empty",
            ));
        }
        let fr = &self.friction;
        if fr.hesitation_threshold_secs <= 0.0
            || fr.long_pause_threshold_secs < fr.hesitation_threshold_secs
        {
            return Err(AnalysisError::invalid_config(
                "pause thresholds must be positive, long pause >= hesitation",
            ));
        }
        if fr.erratic_speed_delta <= 0.0 {
            return Err(AnalysisError::invalid_config(
                "erratic speed delta must be positive",
            ));
        }
        if self.heatmap.cell_size == 0 {
            return Err(AnalysisError::invalid_config(
                "heat map cell size must be >= 1",
            ));
        }
        Ok(())
    }
}
