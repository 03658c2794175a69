// src/analysis/mod.rs
//
// Trajectory analysis stages.
//
// Signal flow:
//   Trajectory → kinematics → stats + samples ─┐
//   Trajectory → events ────────────────────────┼→ friction → FrictionReport
//   external ui_confusion records ──────────────┘
//   events → funnel → FunnelMetrics
//
// Orchestrated by pipeline::SessionAnalyzer.

pub mod events;
pub mod friction;
pub mod funnel;
pub mod kinematics;

pub use events::{Event, EventCounts, EventSummary, ScrollDirection};
pub use friction::FrictionReport;
pub use funnel::{FunnelMetrics, FunnelStage, StageStatus};
pub use kinematics::{KinematicSample, KinematicsReport, MovementStats};
