// src/heatmap.rs
//
// Spatial aggregation: bins trajectory positions into a fixed-cell grid and
// ranks the busiest cells. Cell sum always equals the trajectory length.

use crate::types::Position;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HotZone {
    pub grid_x: u32,
    pub grid_y: u32,
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatGrid {
    pub cell_size: u32,
    pub grid_width: u32,
    pub grid_height: u32,
    /// Row-major counts, grid_width * grid_height entries.
    counts: Vec<u32>,
}

impl HeatGrid {
    /// Bin every position into cell (x / cell_size, y / cell_size). The grid
    /// is sized to the maximum observed coordinates; an empty trajectory
    /// yields a zero-sized grid.
    pub fn build(trajectory: &[Position], cell_size: u32) -> Self {
        if trajectory.is_empty() {
            return Self {
                cell_size,
                grid_width: 0,
                grid_height: 0,
                counts: Vec::new(),
            };
        }

        let max_x = trajectory.iter().map(|p| p.x).max().unwrap_or(0);
        let max_y = trajectory.iter().map(|p| p.y).max().unwrap_or(0);
        let grid_width = max_x / cell_size + 1;
        let grid_height = max_y / cell_size + 1;

        let mut counts = vec![0u32; (grid_width * grid_height) as usize];
        for position in trajectory {
            let gx = position.x / cell_size;
            let gy = position.y / cell_size;
            counts[(gy * grid_width + gx) as usize] += 1;
        }

        Self {
            cell_size,
            grid_width,
            grid_height,
            counts,
        }
    }

    pub fn count(&self, grid_x: u32, grid_y: u32) -> u32 {
        if grid_x >= self.grid_width || grid_y >= self.grid_height {
            return 0;
        }
        self.counts[(grid_y * self.grid_width + grid_x) as usize]
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().map(|&c| c as u64).sum()
    }

    /// The top-K occupied cells, count descending, ties broken by lower
    /// (grid_x, grid_y) lexicographic order for determinism.
    pub fn hot_zones(&self, top_k: usize) -> Vec<HotZone> {
        let mut zones: Vec<HotZone> = self
            .counts
            .iter()
            .enumerate()
            .filter(|(_, &count)| count > 0)
            .map(|(idx, &count)| HotZone {
                grid_x: idx as u32 % self.grid_width,
                grid_y: idx as u32 / self.grid_width,
                count,
            })
            .collect();

        zones.sort_by(|a, b| {
            b.count
                .cmp(&a.count)
                .then(a.grid_x.cmp(&b.grid_x))
                .then(a.grid_y.cmp(&b.grid_y))
        });
        zones.truncate(top_k);
        zones
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(x: u32, y: u32) -> Position {
        Position {
            frame_index: 0,
            timestamp: 0.0,
            x,
            y,
            confidence: 0.8,
        }
    }

    #[test]
    fn test_cell_sum_equals_trajectory_length() {
        let trajectory: Vec<Position> = (0..37).map(|i| pos(i * 13 % 400, i * 29 % 300)).collect();
        let grid = HeatGrid::build(&trajectory, 50);
        assert_eq!(grid.total(), 37);
    }

    #[test]
    fn test_empty_trajectory_yields_zero_grid() {
        let grid = HeatGrid::build(&[], 50);
        assert_eq!(grid.total(), 0);
        assert_eq!(grid.grid_width, 0);
        assert!(grid.hot_zones(5).is_empty());
    }

    #[test]
    fn test_binning() {
        let trajectory = vec![pos(0, 0), pos(49, 49), pos(50, 0), pos(120, 260)];
        let grid = HeatGrid::build(&trajectory, 50);

        assert_eq!(grid.count(0, 0), 2);
        assert_eq!(grid.count(1, 0), 1);
        assert_eq!(grid.count(2, 5), 1);
        assert_eq!(grid.count(3, 3), 0);
    }

    #[test]
    fn test_hot_zone_ranking_and_tie_break() {
        let mut trajectory = Vec::new();
        // Cell (0,0): 3 hits; cells (2,1) and (1,2): 2 hits each; (4,4): 1.
        for _ in 0..3 {
            trajectory.push(pos(10, 10));
        }
        for _ in 0..2 {
            trajectory.push(pos(110, 60));
            trajectory.push(pos(60, 110));
        }
        trajectory.push(pos(210, 210));

        let grid = HeatGrid::build(&trajectory, 50);
        let zones = grid.hot_zones(3);

        assert_eq!(zones.len(), 3);
        assert_eq!((zones[0].grid_x, zones[0].grid_y, zones[0].count), (0, 0, 3));
        // Tie between (2,1) and (1,2): lower grid_x first.
        assert_eq!((zones[1].grid_x, zones[1].grid_y, zones[1].count), (1, 2, 2));
        assert_eq!((zones[2].grid_x, zones[2].grid_y, zones[2].count), (2, 1, 2));
    }

    #[test]
    fn test_top_k_truncation() {
        let trajectory = vec![pos(10, 10), pos(110, 10), pos(210, 10), pos(310, 10)];
        let grid = HeatGrid::build(&trajectory, 50);
        assert_eq!(grid.hot_zones(2).len(), 2);
    }
}
