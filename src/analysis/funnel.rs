// src/analysis/funnel.rs
//
// Conversion funnel over the classified event stream. Stages are limited to
// what the event list can actually witness: the first interaction of any
// kind, and the first click landing on a call-to-action element. Progress on
// stages that need page semantics (form fill, conversion) is not observable
// from pointer events and is left to the surrounding application.

use crate::analysis::events::Event;
use crate::config::FunnelConfig;
use serde::Serialize;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FunnelStage {
    FirstInteraction,
    CtaClick,
}

const ALL_STAGES: [FunnelStage; 2] = [FunnelStage::FirstInteraction, FunnelStage::CtaClick];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageStatus {
    pub stage: FunnelStage,
    pub completed: bool,
    pub timestamp: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunnelMetrics {
    /// One entry per stage, in funnel order.
    pub stages: Vec<StageStatus>,
    /// Completed stages over total stages, in [0, 1].
    pub completion_rate: f64,
    /// Stages the session never reached, in funnel order.
    pub dropoff_points: Vec<FunnelStage>,
    /// Timestamp of the first click or hover, if any.
    pub time_to_first_interaction: Option<f64>,
}

/// Walk the timestamp-ordered event list once and mark each stage at the
/// earliest event that satisfies it.
pub fn analyze(events: &[Event], config: &FunnelConfig) -> FunnelMetrics {
    let mut first_interaction: Option<f64> = None;
    let mut cta_click: Option<f64> = None;

    for event in events {
        match event {
            Event::Click {
                timestamp, target, ..
            } => {
                first_interaction.get_or_insert(*timestamp);
                if cta_click.is_none()
                    && target
                        .as_ref()
                        .is_some_and(|t| t.element_type == config.cta_element_type)
                {
                    cta_click = Some(*timestamp);
                }
            }
            Event::Hover { timestamp, .. } => {
                first_interaction.get_or_insert(*timestamp);
            }
            Event::Scroll { .. } | Event::RageClick { .. } => {}
        }
    }

    let stages: Vec<StageStatus> = ALL_STAGES
        .iter()
        .map(|&stage| {
            let timestamp = match stage {
                FunnelStage::FirstInteraction => first_interaction,
                FunnelStage::CtaClick => cta_click,
            };
            StageStatus {
                stage,
                completed: timestamp.is_some(),
                timestamp,
            }
        })
        .collect();

    let completed = stages.iter().filter(|s| s.completed).count();
    let dropoff_points: Vec<FunnelStage> = stages
        .iter()
        .filter(|s| !s.completed)
        .map(|s| s.stage)
        .collect();

    info!(
        "funnel: {}/{} stages completed",
        completed,
        ALL_STAGES.len()
    );

    FunnelMetrics {
        stages,
        completion_rate: completed as f64 / ALL_STAGES.len() as f64,
        dropoff_points,
        time_to_first_interaction: first_interaction,
    }
}
