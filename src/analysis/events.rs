// src/analysis/events.rs
//
// Turns local trajectory windows into typed interaction events. Click and
// hover are exclusive per timestamp (one triplet yields at most one of the
// two); scroll detection is an independent sliding-window pass and may
// coincide. Rage clicks are a post-process over the click list and emit the
// matching high-severity friction point alongside the event.

use crate::config::EventConfig;
use crate::types::{FrictionKind, FrictionPoint, Position, Severity, UIElement};
use serde::Serialize;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrollDirection {
    Up,
    Down,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    Click {
        frame_index: u64,
        timestamp: f64,
        x: u32,
        y: u32,
        /// Approach displacement in pixels.
        intensity: f64,
        target: Option<UIElement>,
    },
    Hover {
        frame_index: u64,
        timestamp: f64,
        x: u32,
        y: u32,
        duration: f64,
        target: Option<UIElement>,
    },
    Scroll {
        frame_index: u64,
        timestamp: f64,
        x: u32,
        y: u32,
        direction: ScrollDirection,
        magnitude: f64,
        speed: f64,
    },
    RageClick {
        frame_index: u64,
        timestamp: f64,
        /// Cluster centroid.
        x: u32,
        y: u32,
        click_count: usize,
        duration: f64,
        target: Option<UIElement>,
    },
}

impl Event {
    pub fn timestamp(&self) -> f64 {
        match self {
            Event::Click { timestamp, .. }
            | Event::Hover { timestamp, .. }
            | Event::Scroll { timestamp, .. }
            | Event::RageClick { timestamp, .. } => *timestamp,
        }
    }

    pub fn frame_index(&self) -> u64 {
        match self {
            Event::Click { frame_index, .. }
            | Event::Hover { frame_index, .. }
            | Event::Scroll { frame_index, .. }
            | Event::RageClick { frame_index, .. } => *frame_index,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EventCounts {
    pub clicks: usize,
    pub hovers: usize,
    pub scrolls: usize,
    pub rage_clicks: usize,
}

#[derive(Debug, Clone, Default)]
pub struct EventSummary {
    /// Timestamp-ordered, stable tie-break on frame index.
    pub events: Vec<Event>,
    pub counts: EventCounts,
    /// Rage-click friction points, aggregated by the friction detector.
    pub friction: Vec<FrictionPoint>,
}

/// One click extracted from the trajectory, before clustering.
#[derive(Debug, Clone)]
pub(crate) struct ClickRecord {
    pub frame_index: u64,
    pub timestamp: f64,
    pub x: u32,
    pub y: u32,
    pub intensity: f64,
    pub target: Option<UIElement>,
}

pub fn classify(
    trajectory: &[Position],
    ui_elements: &[UIElement],
    config: &EventConfig,
) -> EventSummary {
    let mut events = Vec::new();
    let mut clicks = Vec::new();
    let mut counts = EventCounts::default();

    // Click / hover over interior triplets.
    for i in 1..trajectory.len().saturating_sub(1) {
        let prev = &trajectory[i - 1];
        let curr = &trajectory[i];
        let next = &trajectory[i + 1];

        let approach = distance(prev, curr);
        let settle = distance(curr, next);

        if approach > config.click_motion_threshold && settle < config.click_stillness_threshold {
            // Fast approach then stop.
            let target = find_target(ui_elements, curr, config.target_frame_tolerance);
            clicks.push(ClickRecord {
                frame_index: curr.frame_index,
                timestamp: curr.timestamp,
                x: curr.x,
                y: curr.y,
                intensity: approach,
                target,
            });
        } else if approach < config.hover_motion_threshold
            && settle < config.hover_motion_threshold
        {
            let duration = next.timestamp - curr.timestamp;
            if duration > config.min_hover_duration {
                counts.hovers += 1;
                events.push(Event::Hover {
                    frame_index: curr.frame_index,
                    timestamp: curr.timestamp,
                    x: curr.x,
                    y: curr.y,
                    duration,
                    target: find_target(ui_elements, curr, config.target_frame_tolerance),
                });
            }
        }
    }

    // Scroll: y-coordinate trend over a sliding window, independent pass.
    let w = config.scroll_window;
    if trajectory.len() > 2 * w {
        for i in w..trajectory.len() - w {
            let first = &trajectory[i - w];
            let last = &trajectory[i + w - 1];
            let trend = last.y as f64 - first.y as f64;
            if trend.abs() <= config.scroll_trend_threshold {
                continue;
            }
            let span = last.timestamp - first.timestamp;
            if span <= 0.0 {
                continue;
            }
            counts.scrolls += 1;
            events.push(Event::Scroll {
                frame_index: trajectory[i].frame_index,
                timestamp: trajectory[i].timestamp,
                x: trajectory[i].x,
                y: trajectory[i].y,
                direction: if trend > 0.0 {
                    ScrollDirection::Down
                } else {
                    ScrollDirection::Up
                },
                magnitude: trend.abs(),
                speed: trend.abs() / span,
            });
        }
    }

    counts.clicks = clicks.len();
    let (rage_events, rage_friction) = cluster_rage_clicks(&clicks, config);
    counts.rage_clicks = rage_events.len();

    for click in clicks {
        events.push(Event::Click {
            frame_index: click.frame_index,
            timestamp: click.timestamp,
            x: click.x,
            y: click.y,
            intensity: click.intensity,
            target: click.target,
        });
    }
    events.extend(rage_events);

    events.sort_by(|a, b| {
        a.timestamp()
            .partial_cmp(&b.timestamp())
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.frame_index().cmp(&b.frame_index()))
    });

    info!(
        "classified {} events: {} clicks, {} hovers, {} scrolls, {} rage clicks",
        events.len(),
        counts.clicks,
        counts.hovers,
        counts.scrolls,
        counts.rage_clicks
    );

    EventSummary {
        events,
        counts,
        friction: rage_friction,
    }
}

/// Greedy clustering: a click joins the first cluster whose first member is
/// within the time window and pixel radius. Clusters reaching the minimum
/// count become one RageClick event plus one high-severity friction point.
pub(crate) fn cluster_rage_clicks(
    clicks: &[ClickRecord],
    config: &EventConfig,
) -> (Vec<Event>, Vec<FrictionPoint>) {
    let mut groups: Vec<Vec<&ClickRecord>> = Vec::new();

    for click in clicks {
        let joined = groups.iter_mut().find(|group| {
            let head = group[0];
            let dx = click.x as f64 - head.x as f64;
            let dy = click.y as f64 - head.y as f64;
            (click.timestamp - head.timestamp).abs() < config.rage_click_window_secs
                && (dx * dx + dy * dy).sqrt() < config.rage_click_radius_px
        });
        match joined {
            Some(group) => group.push(click),
            None => groups.push(vec![click]),
        }
    }

    let mut events = Vec::new();
    let mut friction = Vec::new();

    for group in groups {
        if group.len() < config.rage_click_min_count {
            continue;
        }
        let count = group.len();
        let cx = (group.iter().map(|c| c.x as u64).sum::<u64>() / count as u64) as u32;
        let cy = (group.iter().map(|c| c.y as u64).sum::<u64>() / count as u64) as u32;
        let duration = group[count - 1].timestamp - group[0].timestamp;

        events.push(Event::RageClick {
            frame_index: group[0].frame_index,
            timestamp: group[0].timestamp,
            x: cx,
            y: cy,
            click_count: count,
            duration,
            target: group[0].target.clone(),
        });
        friction.push(FrictionPoint {
            kind: FrictionKind::RageClick,
            frame_index: Some(group[0].frame_index),
            x: Some(cx),
            y: Some(cy),
            timestamp: group[0].timestamp,
            severity: Severity::High,
            description: format!(
                "user performed {} rapid clicks in {:.1}s, indicating frustration with a potentially unresponsive control",
                count, duration
            ),
        });
    }

    (events, friction)
}

fn distance(a: &Position, b: &Position) -> f64 {
    let dx = b.x as f64 - a.x as f64;
    let dy = b.y as f64 - a.y as f64;
    (dx * dx + dy * dy).sqrt()
}

/// First UI element whose bounds contain the position and whose frame index
/// is within tolerance. First match wins, no ranking.
fn find_target(
    ui_elements: &[UIElement],
    position: &Position,
    tolerance: u64,
) -> Option<UIElement> {
    ui_elements
        .iter()
        .find(|element| {
            element.frame_index.abs_diff(position.frame_index) < tolerance
                && element.bounds.contains(position.x, position.y)
        })
        .cloned()
}
