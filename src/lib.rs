// src/lib.rs
//
// Pointer-trajectory reconstruction and interaction analysis over decoded
// session-recording frames.
//
// Pipeline:
//   Frame sequence → trajectory (localizer per sampled frame, parallel)
//                  → kinematics → events → funnel + friction
//   Trajectory → heat grid (independent)
//
// The crate is a pure analysis core: no video decoding, no network, no
// persistence. Callers supply frames (and optionally UI elements and
// externally detected friction records) and consume a SessionReport.

pub mod analysis;
pub mod config;
pub mod error;
pub mod heatmap;
pub mod localizer;
pub mod pipeline;
pub mod trajectory;
pub mod types;

pub use analysis::{
    Event, EventCounts, FunnelMetrics, FunnelStage, KinematicSample, KinematicsReport,
    MovementStats, ScrollDirection, StageStatus,
};
pub use config::AnalysisConfig;
pub use error::{AnalysisError, Result};
pub use heatmap::{HeatGrid, HotZone};
pub use localizer::{CursorCandidate, CursorLocalizer};
pub use pipeline::{SessionAnalyzer, SessionReport};
pub use trajectory::TrajectoryBuilder;
pub use types::{
    ElementBounds, Frame, FrictionKind, FrictionPoint, KeyMoment, KeyMomentKind, Position,
    Severity, UIElement,
};
