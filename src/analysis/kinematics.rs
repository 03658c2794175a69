// src/analysis/kinematics.rs
//
// Per-pair kinematic samples and aggregate movement statistics over a
// trajectory. Pure function of its input; defensive about degenerate time
// deltas even though the trajectory builder already enforces ordering.

use crate::config::KinematicsConfig;
use crate::types::Position;
use serde::Serialize;

/// Derived per adjacent position pair with a positive time delta.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct KinematicSample {
    /// Frame index of the later position of the pair.
    pub frame_index: u64,
    pub timestamp: f64,
    pub distance: f64,
    pub speed: f64,
    pub time_delta: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MovementStats {
    pub position_count: usize,
    pub total_distance: f64,
    pub average_speed: f64,
    pub max_speed: f64,
    pub min_speed: f64,
    pub speed_std_dev: f64,
    pub average_acceleration: f64,
    pub direction_changes: u32,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct KinematicsReport {
    pub samples: Vec<KinematicSample>,
    /// Signed, px/s². Needs the two preceding speeds, so the first two
    /// samples contribute nothing: length is samples.len() - 2, or empty.
    pub accelerations: Vec<f64>,
    pub stats: MovementStats,
}

pub fn analyze(trajectory: &[Position], config: &KinematicsConfig) -> KinematicsReport {
    if trajectory.len() < 2 {
        return KinematicsReport {
            stats: MovementStats {
                position_count: trajectory.len(),
                ..MovementStats::default()
            },
            ..KinematicsReport::default()
        };
    }

    let mut samples = Vec::with_capacity(trajectory.len() - 1);
    let mut total_distance = 0.0;

    for pair in trajectory.windows(2) {
        let (prev, curr) = (&pair[0], &pair[1]);
        let distance = euclidean(prev, curr);
        total_distance += distance;

        let time_delta = curr.timestamp - prev.timestamp;
        // Duplicate or out-of-order timestamps never produce a sample.
        if time_delta <= 0.0 {
            continue;
        }

        samples.push(KinematicSample {
            frame_index: curr.frame_index,
            timestamp: curr.timestamp,
            distance,
            speed: distance / time_delta,
            time_delta,
        });
    }

    let mut accelerations = Vec::new();
    if samples.len() >= 3 {
        for k in 2..samples.len() {
            accelerations.push((samples[k].speed - samples[k - 1].speed) / samples[k].time_delta);
        }
    }

    let speeds: Vec<f64> = samples.iter().map(|s| s.speed).collect();
    let (average_speed, speed_std_dev) = mean_and_std(&speeds);
    let average_acceleration = if accelerations.is_empty() {
        0.0
    } else {
        accelerations.iter().sum::<f64>() / accelerations.len() as f64
    };

    let (max_speed, min_speed) = if speeds.is_empty() {
        (0.0, 0.0)
    } else {
        (
            speeds.iter().cloned().fold(f64::MIN, f64::max),
            speeds.iter().cloned().fold(f64::MAX, f64::min),
        )
    };

    let stats = MovementStats {
        position_count: trajectory.len(),
        total_distance,
        average_speed,
        max_speed,
        min_speed,
        speed_std_dev,
        average_acceleration,
        direction_changes: count_direction_changes(trajectory, config.direction_change_threshold),
    };

    KinematicsReport {
        samples,
        accelerations,
        stats,
    }
}

fn euclidean(a: &Position, b: &Position) -> f64 {
    let dx = b.x as f64 - a.x as f64;
    let dy = b.y as f64 - a.y as f64;
    (dx * dx + dy * dy).sqrt()
}

fn mean_and_std(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    (mean, variance.sqrt())
}

/// Compare consecutive displacement-vector angles; a wrapped absolute
/// difference above the threshold counts as one change. Zero-length
/// displacements carry no direction and are skipped. Depends only on
/// geometry, so the count is invariant to uniform time scaling.
fn count_direction_changes(trajectory: &[Position], threshold: f64) -> u32 {
    let mut changes = 0;

    for triple in trajectory.windows(3) {
        let dx1 = triple[1].x as f64 - triple[0].x as f64;
        let dy1 = triple[1].y as f64 - triple[0].y as f64;
        let dx2 = triple[2].x as f64 - triple[1].x as f64;
        let dy2 = triple[2].y as f64 - triple[1].y as f64;

        if (dx1 == 0.0 && dy1 == 0.0) || (dx2 == 0.0 && dy2 == 0.0) {
            continue;
        }

        let mut diff = (dy2.atan2(dx2) - dy1.atan2(dx1)).abs();
        if diff > std::f64::consts::PI {
            diff = 2.0 * std::f64::consts::PI - diff;
        }
        if diff > threshold {
            changes += 1;
        }
    }

    changes
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(frame_index: u64, timestamp: f64, x: u32, y: u32) -> Position {
        Position {
            frame_index,
            timestamp,
            x,
            y,
            confidence: 0.8,
        }
    }

    #[test]
    fn test_empty_trajectory() {
        let report = analyze(&[], &KinematicsConfig::default());
        assert!(report.samples.is_empty());
        assert!(report.accelerations.is_empty());
        assert_eq!(report.stats.total_distance, 0.0);
    }

    #[test]
    fn test_sample_count_matches_valid_pairs() {
        // Four positions, one duplicate timestamp: 3 pairs, 2 valid samples.
        let trajectory = vec![
            pos(0, 0.0, 0, 0),
            pos(1, 1.0, 100, 0),
            pos(2, 1.0, 150, 0),
            pos(3, 2.0, 200, 0),
        ];
        let report = analyze(&trajectory, &KinematicsConfig::default());
        assert_eq!(report.samples.len(), 2);
    }

    #[test]
    fn test_speed_and_distance() {
        let trajectory = vec![pos(0, 0.0, 0, 0), pos(1, 2.0, 0, 100)];
        let report = analyze(&trajectory, &KinematicsConfig::default());

        assert_eq!(report.samples.len(), 1);
        assert!((report.samples[0].distance - 100.0).abs() < 1e-9);
        assert!((report.samples[0].speed - 50.0).abs() < 1e-9);
        assert!((report.stats.total_distance - 100.0).abs() < 1e-9);
        assert!((report.stats.average_speed - 50.0).abs() < 1e-9);
        assert!((report.stats.max_speed - 50.0).abs() < 1e-9);
        assert!((report.stats.min_speed - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_acceleration_series_length() {
        let trajectory = vec![
            pos(0, 0.0, 0, 0),
            pos(1, 1.0, 10, 0),
            pos(2, 2.0, 30, 0),
            pos(3, 3.0, 60, 0),
            pos(4, 4.0, 100, 0),
        ];
        let report = analyze(&trajectory, &KinematicsConfig::default());
        assert_eq!(report.samples.len(), 4);
        assert_eq!(report.accelerations.len(), 2);

        // Speeds: 10, 20, 30, 40 px/s over 1 s steps.
        assert!((report.accelerations[0] - 10.0).abs() < 1e-9);
        assert!((report.accelerations[1] - 10.0).abs() < 1e-9);
        assert!((report.stats.average_acceleration - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_acceleration_empty_below_three_samples() {
        let trajectory = vec![pos(0, 0.0, 0, 0), pos(1, 1.0, 10, 0), pos(2, 2.0, 30, 0)];
        let report = analyze(&trajectory, &KinematicsConfig::default());
        assert_eq!(report.samples.len(), 2);
        assert!(report.accelerations.is_empty());
    }

    #[test]
    fn test_direction_changes_counted() {
        // Right, then up: a 90 degree turn.
        let trajectory = vec![pos(0, 0.0, 0, 0), pos(1, 1.0, 50, 0), pos(2, 2.0, 50, 50)];
        let report = analyze(&trajectory, &KinematicsConfig::default());
        assert_eq!(report.stats.direction_changes, 1);
    }

    #[test]
    fn test_straight_line_has_no_direction_changes() {
        let trajectory: Vec<Position> =
            (0..6).map(|i| pos(i, i as f64, i as u32 * 20, 0)).collect();
        let report = analyze(&trajectory, &KinematicsConfig::default());
        assert_eq!(report.stats.direction_changes, 0);
    }

    #[test]
    fn test_direction_changes_invariant_to_time_scaling() {
        let zigzag = vec![
            pos(0, 0.0, 0, 0),
            pos(1, 1.0, 40, 0),
            pos(2, 2.0, 40, 40),
            pos(3, 3.0, 80, 40),
            pos(4, 4.0, 80, 0),
        ];
        let scaled: Vec<Position> = zigzag
            .iter()
            .map(|p| Position {
                timestamp: p.timestamp * 7.5,
                ..*p
            })
            .collect();

        let a = analyze(&zigzag, &KinematicsConfig::default());
        let b = analyze(&scaled, &KinematicsConfig::default());
        assert_eq!(a.stats.direction_changes, b.stats.direction_changes);
        assert!(a.stats.direction_changes > 0);
    }

    #[test]
    fn test_speed_std_dev() {
        // Speeds 10 and 30: mean 20, population std dev 10.
        let trajectory = vec![pos(0, 0.0, 0, 0), pos(1, 1.0, 10, 0), pos(2, 2.0, 40, 0)];
        let report = analyze(&trajectory, &KinematicsConfig::default());
        assert!((report.stats.speed_std_dev - 10.0).abs() < 1e-9);
    }
}
