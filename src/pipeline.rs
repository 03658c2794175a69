// src/pipeline.rs
//
// End-to-end orchestration of one analysis run. Stages execute in strict
// sequence — each consumes the complete, immutable output of its
// predecessor — and only per-frame localization inside the trajectory
// builder runs in parallel. The run is deterministic: identical frames and
// configuration produce byte-identical serialized reports.

use crate::analysis::{events, friction, funnel, kinematics};
use crate::analysis::{Event, EventCounts, FunnelMetrics, KinematicsReport, MovementStats};
use crate::config::AnalysisConfig;
use crate::error::Result;
use crate::heatmap::{HeatGrid, HotZone};
use crate::localizer::CursorLocalizer;
use crate::trajectory::TrajectoryBuilder;
use crate::types::{Frame, FrictionPoint, KeyMoment, Position, UIElement};
use serde::Serialize;
use tracing::{info, warn};

/// Everything one run produces. Immutable after construction; handed to the
/// surrounding application for reporting and serialization.
#[derive(Debug, Clone, Serialize)]
pub struct SessionReport {
    pub cursor_detected: bool,
    pub trajectory: Vec<Position>,
    pub stats: MovementStats,
    pub events: Vec<Event>,
    pub event_counts: EventCounts,
    pub funnel: FunnelMetrics,
    pub friction_points: Vec<FrictionPoint>,
    pub key_moments: Vec<KeyMoment>,
    pub heat_grid: HeatGrid,
    pub hot_zones: Vec<HotZone>,
}

pub struct SessionAnalyzer {
    config: AnalysisConfig,
    localizer: CursorLocalizer,
}

impl SessionAnalyzer {
    /// Configuration is validated here, before any frame is processed.
    pub fn new(config: AnalysisConfig) -> Result<Self> {
        config.validate()?;
        let localizer = CursorLocalizer::new(config.localizer.clone());
        Ok(Self { config, localizer })
    }

    /// Run the full pipeline over one finite frame sequence.
    ///
    /// `ui_elements` may be empty (events then carry no target) and
    /// `external_friction` carries ui_confusion records produced by the
    /// external vision collaborator, merged into the report unaltered.
    pub fn analyze(
        &self,
        frames: &[Frame],
        ui_elements: &[UIElement],
        external_friction: &[FrictionPoint],
    ) -> Result<SessionReport> {
        info!("analyzing session: {} frames", frames.len());

        let builder = TrajectoryBuilder::new(&self.localizer, self.config.sampling.clone());
        let trajectory = builder.build(frames)?;

        let cursor_detected = !trajectory.is_empty();
        if !cursor_detected {
            warn!("no cursor detected in any sampled frame");
        }

        let KinematicsReport {
            samples,
            accelerations: _,
            stats,
        } = kinematics::analyze(&trajectory, &self.config.kinematics);

        let summary = events::classify(&trajectory, ui_elements, &self.config.events);

        let funnel = funnel::analyze(&summary.events, &self.config.funnel);

        let friction_report = friction::detect(
            &trajectory,
            &samples,
            &summary.events,
            summary.friction,
            external_friction,
            &self.config.friction,
        );

        let heat_grid = HeatGrid::build(&trajectory, self.config.heatmap.cell_size);
        let hot_zones = heat_grid.hot_zones(self.config.heatmap.top_zones);

        info!(
            "session analysis complete: {} positions, {} events, {} friction points",
            trajectory.len(),
            summary.events.len(),
            friction_report.friction_points.len()
        );

        Ok(SessionReport {
            cursor_detected,
            trajectory,
            stats,
            events: summary.events,
            event_counts: summary.counts,
            funnel,
            friction_points: friction_report.friction_points,
            key_moments: friction_report.key_moments,
            heat_grid,
            hot_zones,
        })
    }
}
