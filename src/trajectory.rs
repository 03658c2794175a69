// src/trajectory.rs
//
// Samples the frame sequence at a fixed stride, localizes the cursor per
// sampled frame, and assembles the time-ordered trajectory. Localization is
// independent per frame, so it runs on the rayon pool; results are re-sorted
// by frame index afterwards because ordering is a correctness requirement
// for the kinematics and event stages.

use crate::config::SamplingConfig;
use crate::error::{AnalysisError, Result};
use crate::localizer::CursorLocalizer;
use crate::types::{Frame, Position};
use rayon::prelude::*;
use tracing::{debug, info};

pub struct TrajectoryBuilder<'a> {
    localizer: &'a CursorLocalizer,
    config: SamplingConfig,
}

impl<'a> TrajectoryBuilder<'a> {
    pub fn new(localizer: &'a CursorLocalizer, config: SamplingConfig) -> Self {
        Self { localizer, config }
    }

    /// Build the trajectory for one run. An empty result is valid and means
    /// "no cursor detected"; the caller decides whether that is fatal.
    pub fn build(&self, frames: &[Frame]) -> Result<Vec<Position>> {
        validate_frames(frames)?;

        let sampled: Vec<&Frame> = frames
            .iter()
            .enumerate()
            .filter(|(i, _)| i % self.config.stride == 0)
            .map(|(_, f)| f)
            .collect();

        info!(
            "localizing {} of {} frames (stride {})",
            sampled.len(),
            frames.len(),
            self.config.stride
        );

        let mut positions: Vec<Position> = sampled
            .par_iter()
            .filter_map(|frame| {
                let candidates = self.localizer.localize(frame);
                // The largest blob is the most likely main cursor.
                candidates
                    .iter()
                    .max_by_key(|c| c.pixel_area)
                    .map(|main| Position {
                        frame_index: frame.index,
                        timestamp: frame.timestamp,
                        x: main.x,
                        y: main.y,
                        confidence: main.confidence,
                    })
            })
            .collect();

        positions.sort_by_key(|p| p.frame_index);

        // Input timestamps may be non-decreasing rather than strictly
        // increasing; the trajectory itself must be strictly ordered.
        let mut trajectory: Vec<Position> = Vec::with_capacity(positions.len());
        for pos in positions {
            match trajectory.last() {
                Some(last) if pos.timestamp <= last.timestamp => {
                    debug!(
                        "dropping detection at frame {}: timestamp {:.3} does not advance",
                        pos.frame_index, pos.timestamp
                    );
                }
                _ => trajectory.push(pos),
            }
        }

        info!("trajectory: {} positions", trajectory.len());
        Ok(trajectory)
    }
}

/// Sequence-level invariants, checked before any frame is processed. Every
/// downstream computation assumes validated, time-ordered input.
fn validate_frames(frames: &[Frame]) -> Result<()> {
    for frame in frames {
        if frame.width == 0 || frame.height == 0 {
            return Err(AnalysisError::invalid_input(format!(
                "frame {} has non-positive dimensions {}x{}",
                frame.index, frame.width, frame.height
            )));
        }
        let expected = frame.width as usize * frame.height as usize * 3;
        if frame.data.len() != expected {
            return Err(AnalysisError::invalid_input(format!(
                "frame {} pixel buffer is {} bytes, expected {}",
                frame.index,
                frame.data.len(),
                expected
            )));
        }
    }
    for pair in frames.windows(2) {
        if pair[1].timestamp < pair[0].timestamp {
            return Err(AnalysisError::invalid_input(format!(
                "timestamps not monotonic: frame {} at {:.3}s precedes frame {} at {:.3}s",
                pair[1].index, pair[1].timestamp, pair[0].index, pair[0].timestamp
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LocalizerConfig;

    fn cursor_frame(index: u64, timestamp: f64, cx: u32, cy: u32) -> Frame {
        let (width, height) = (120u32, 120u32);
        let mut data = vec![120u8; (width * height * 3) as usize];
        for y in cy..cy + 10 {
            for x in cx..cx + 10 {
                let idx = ((y * width + x) * 3) as usize;
                data[idx] = 255;
                data[idx + 1] = 255;
                data[idx + 2] = 255;
            }
        }
        Frame::new(index, timestamp, width, height, data)
    }

    fn blank_frame(index: u64, timestamp: f64) -> Frame {
        let (width, height) = (120u32, 120u32);
        Frame::new(
            index,
            timestamp,
            width,
            height,
            vec![120u8; (width * height * 3) as usize],
        )
    }

    fn localizer() -> CursorLocalizer {
        CursorLocalizer::new(LocalizerConfig {
            use_templates: false,
            ..LocalizerConfig::default()
        })
    }

    #[test]
    fn test_stride_sampling() {
        let frames: Vec<Frame> = (0..9)
            .map(|i| cursor_frame(i, i as f64 * 0.1, 10 + i as u32 * 5, 20))
            .collect();

        let loc = localizer();
        let builder = TrajectoryBuilder::new(&loc, SamplingConfig { stride: 3 });
        let trajectory = builder.build(&frames).unwrap();

        // Frames 0, 3, 6 sampled.
        assert_eq!(trajectory.len(), 3);
        assert_eq!(trajectory[0].frame_index, 0);
        assert_eq!(trajectory[1].frame_index, 3);
        assert_eq!(trajectory[2].frame_index, 6);
    }

    #[test]
    fn test_frames_without_cursor_are_skipped() {
        let frames = vec![
            cursor_frame(0, 0.0, 10, 10),
            blank_frame(1, 0.1),
            cursor_frame(2, 0.2, 30, 30),
        ];

        let loc = localizer();
        let builder = TrajectoryBuilder::new(&loc, SamplingConfig { stride: 1 });
        let trajectory = builder.build(&frames).unwrap();

        assert_eq!(trajectory.len(), 2);
        assert_eq!(trajectory[0].frame_index, 0);
        assert_eq!(trajectory[1].frame_index, 2);
    }

    #[test]
    fn test_empty_trajectory_is_not_an_error() {
        let frames = vec![blank_frame(0, 0.0), blank_frame(1, 0.1)];
        let loc = localizer();
        let builder = TrajectoryBuilder::new(&loc, SamplingConfig { stride: 1 });
        assert!(builder.build(&frames).unwrap().is_empty());
    }

    #[test]
    fn test_timestamps_strictly_increase() {
        // Two frames share a timestamp; only the first detection survives.
        let frames = vec![
            cursor_frame(0, 0.0, 10, 10),
            cursor_frame(1, 0.5, 20, 20),
            cursor_frame(2, 0.5, 40, 40),
        ];

        let loc = localizer();
        let builder = TrajectoryBuilder::new(&loc, SamplingConfig { stride: 1 });
        let trajectory = builder.build(&frames).unwrap();

        assert_eq!(trajectory.len(), 2);
        for pair in trajectory.windows(2) {
            assert!(pair[1].timestamp > pair[0].timestamp);
        }
    }

    #[test]
    fn test_non_monotonic_timestamps_rejected() {
        let frames = vec![cursor_frame(0, 1.0, 10, 10), cursor_frame(1, 0.5, 20, 20)];
        let loc = localizer();
        let builder = TrajectoryBuilder::new(&loc, SamplingConfig { stride: 1 });
        let err = builder.build(&frames).unwrap_err();
        assert!(err.to_string().contains("not monotonic"));
    }

    #[test]
    fn test_zero_dimension_frame_rejected() {
        let frames = vec![Frame::new(0, 0.0, 0, 100, Vec::new())];
        let loc = localizer();
        let builder = TrajectoryBuilder::new(&loc, SamplingConfig { stride: 1 });
        assert!(builder.build(&frames).is_err());
    }

    #[test]
    fn test_short_pixel_buffer_rejected() {
        let frames = vec![Frame::new(0, 0.0, 100, 100, vec![0u8; 10])];
        let loc = localizer();
        let builder = TrajectoryBuilder::new(&loc, SamplingConfig { stride: 1 });
        assert!(builder.build(&frames).is_err());
    }
}
