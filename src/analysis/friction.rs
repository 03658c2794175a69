// src/analysis/friction.rs
//
// Scans the trajectory, kinematic samples, and classified events for
// friction signals. Rage-click friction points arrive pre-built from the
// event classifier; ui_confusion records come from the external vision
// collaborator and pass through with their shape untouched.

use crate::analysis::events::Event;
use crate::analysis::kinematics::KinematicSample;
use crate::config::FrictionConfig;
use crate::types::{FrictionKind, FrictionPoint, KeyMoment, KeyMomentKind, Position, Severity};
use tracing::info;

#[derive(Debug, Clone, Default)]
pub struct FrictionReport {
    /// Timestamp-ordered union of all friction sources.
    pub friction_points: Vec<FrictionPoint>,
    /// Distinguished session moments, timestamp-ordered and capped.
    pub key_moments: Vec<KeyMoment>,
}

pub fn detect(
    trajectory: &[Position],
    samples: &[KinematicSample],
    events: &[Event],
    rage_friction: Vec<FrictionPoint>,
    external: &[FrictionPoint],
    config: &FrictionConfig,
) -> FrictionReport {
    let mut friction_points = Vec::new();
    let mut key_moments = Vec::new();

    // Hesitation: gaps between consecutive detections.
    for pair in trajectory.windows(2) {
        let gap = pair[1].timestamp - pair[0].timestamp;
        if gap <= config.hesitation_threshold_secs {
            continue;
        }
        friction_points.push(FrictionPoint {
            kind: FrictionKind::Hesitation,
            frame_index: Some(pair[1].frame_index),
            x: Some(pair[1].x),
            y: Some(pair[1].y),
            timestamp: pair[1].timestamp,
            severity: Severity::Medium,
            description: format!(
                "user paused for {:.1}s at ({}, {})",
                gap, pair[1].x, pair[1].y
            ),
        });
        if gap > config.long_pause_threshold_secs {
            key_moments.push(KeyMoment {
                kind: KeyMomentKind::LongPause,
                timestamp: pair[1].timestamp,
                frame_index: pair[1].frame_index,
                description: format!("user paused for {:.1} seconds", gap),
            });
        }
    }

    // Erratic movement: speed discontinuities, top-K by magnitude.
    let mut erratic: Vec<(f64, &KinematicSample)> = samples
        .windows(2)
        .filter_map(|pair| {
            let delta = (pair[1].speed - pair[0].speed).abs();
            (delta > config.erratic_speed_delta).then_some((delta, &pair[1]))
        })
        .collect();
    erratic.sort_by(|a, b| {
        b.0.partial_cmp(&a.0)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.1.frame_index.cmp(&b.1.frame_index))
    });
    erratic.truncate(config.max_erratic_reports);

    for (delta, sample) in erratic {
        friction_points.push(FrictionPoint {
            kind: FrictionKind::ErraticMovement,
            frame_index: Some(sample.frame_index),
            x: None,
            y: None,
            timestamp: sample.timestamp,
            severity: Severity::Low,
            description: format!("speed changed by {:.0} px/s between samples", delta),
        });
    }

    // First interaction key moment.
    if let Some(first_click) = events
        .iter()
        .find(|e| matches!(e, Event::Click { .. } | Event::RageClick { .. }))
    {
        key_moments.push(KeyMoment {
            kind: KeyMomentKind::FirstInteraction,
            timestamp: first_click.timestamp(),
            frame_index: first_click.frame_index(),
            description: "user made their first click".to_string(),
        });
    }
    for point in &rage_friction {
        key_moments.push(KeyMoment {
            kind: KeyMomentKind::Friction,
            timestamp: point.timestamp,
            frame_index: point.frame_index.unwrap_or(0),
            description: point.description.clone(),
        });
    }

    friction_points.extend(rage_friction);
    friction_points.extend(external.iter().cloned());
    friction_points.sort_by(|a, b| {
        a.timestamp
            .partial_cmp(&b.timestamp)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    key_moments.sort_by(|a, b| {
        a.timestamp
            .partial_cmp(&b.timestamp)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    key_moments.truncate(config.max_key_moments);

    info!(
        "friction: {} points, {} key moments",
        friction_points.len(),
        key_moments.len()
    );

    FrictionReport {
        friction_points,
        key_moments,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FrictionConfig;

    fn pos(frame_index: u64, timestamp: f64, x: u32, y: u32) -> Position {
        Position {
            frame_index,
            timestamp,
            x,
            y,
            confidence: 0.8,
        }
    }

    fn sample(frame_index: u64, timestamp: f64, speed: f64) -> KinematicSample {
        KinematicSample {
            frame_index,
            timestamp,
            distance: speed,
            speed,
            time_delta: 1.0,
        }
    }

    #[test]
    fn test_hesitation_detected() {
        let trajectory = vec![pos(0, 0.0, 10, 10), pos(5, 1.5, 12, 10)];
        let report = detect(
            &trajectory,
            &[],
            &[],
            Vec::new(),
            &[],
            &FrictionConfig::default(),
        );

        assert_eq!(report.friction_points.len(), 1);
        let point = &report.friction_points[0];
        assert_eq!(point.kind, FrictionKind::Hesitation);
        assert_eq!(point.severity, Severity::Medium);
        assert!(report.key_moments.is_empty());
    }

    #[test]
    fn test_long_pause_becomes_key_moment() {
        let trajectory = vec![pos(0, 0.0, 10, 10), pos(40, 4.0, 12, 10)];
        let report = detect(
            &trajectory,
            &[],
            &[],
            Vec::new(),
            &[],
            &FrictionConfig::default(),
        );

        assert_eq!(report.friction_points.len(), 1);
        assert_eq!(report.key_moments.len(), 1);
        assert_eq!(report.key_moments[0].kind, KeyMomentKind::LongPause);
    }

    #[test]
    fn test_erratic_movement_top_k() {
        // Seven discontinuities above 100 px/s; only the top 5 survive,
        // ranked by delta magnitude.
        let speeds = [0.0, 200.0, 10.0, 400.0, 20.0, 600.0, 30.0, 800.0];
        let samples: Vec<KinematicSample> = speeds
            .iter()
            .enumerate()
            .map(|(i, &s)| sample(i as u64, i as f64, s))
            .collect();

        let report = detect(
            &[],
            &samples,
            &[],
            Vec::new(),
            &[],
            &FrictionConfig::default(),
        );

        assert_eq!(report.friction_points.len(), 5);
        assert!(report
            .friction_points
            .iter()
            .all(|p| p.kind == FrictionKind::ErraticMovement));
        // The smallest deltas (190, 200) were cut; 770 survives.
        assert!(report
            .friction_points
            .iter()
            .any(|p| p.description.contains("770")));
    }

    #[test]
    fn test_external_ui_confusion_passes_through_unaltered() {
        let external = FrictionPoint {
            kind: FrictionKind::UiConfusion,
            frame_index: Some(7),
            x: None,
            y: None,
            timestamp: 2.5,
            severity: Severity::Medium,
            description: "user appears unsure which form field is active".to_string(),
        };
        let report = detect(
            &[],
            &[],
            &[],
            Vec::new(),
            &[external.clone()],
            &FrictionConfig::default(),
        );

        assert_eq!(report.friction_points, vec![external]);
    }

    #[test]
    fn test_friction_points_sorted_by_timestamp() {
        let trajectory = vec![
            pos(0, 0.0, 10, 10),
            pos(10, 5.0, 12, 10),
            pos(20, 7.0, 14, 10),
        ];
        let external = FrictionPoint {
            kind: FrictionKind::UiConfusion,
            frame_index: None,
            x: None,
            y: None,
            timestamp: 1.0,
            severity: Severity::Low,
            description: "confusion".to_string(),
        };
        let report = detect(
            &trajectory,
            &[],
            &[],
            Vec::new(),
            &[external],
            &FrictionConfig::default(),
        );

        for pair in report.friction_points.windows(2) {
            assert!(pair[0].timestamp <= pair[1].timestamp);
        }
    }

    #[test]
    fn test_first_click_key_moment() {
        let events = vec![Event::Click {
            frame_index: 4,
            timestamp: 1.2,
            x: 50,
            y: 60,
            intensity: 42.0,
            target: None,
        }];
        let report = detect(&[], &[], &events, Vec::new(), &[], &FrictionConfig::default());

        assert_eq!(report.key_moments.len(), 1);
        assert_eq!(report.key_moments[0].kind, KeyMomentKind::FirstInteraction);
        assert_eq!(report.key_moments[0].frame_index, 4);
    }
}
