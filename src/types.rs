// src/types.rs

use serde::{Deserialize, Serialize};

/// One decoded raster frame, handed in by the surrounding application.
/// Pixel data is tightly packed RGB: `data.len() == width * height * 3`.
#[derive(Debug, Clone)]
pub struct Frame {
    pub index: u64,
    /// Seconds since the start of the recording.
    pub timestamp: f64,
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl Frame {
    pub fn new(index: u64, timestamp: f64, width: u32, height: u32, data: Vec<u8>) -> Self {
        Self {
            index,
            timestamp,
            width,
            height,
            data,
        }
    }
}

/// A detected cursor position. Immutable once built; the trajectory
/// builder owns the resulting sequence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub frame_index: u64,
    pub timestamp: f64,
    pub x: u32,
    pub y: u32,
    pub confidence: f32,
}

/// Axis-aligned bounding box of a detected UI element, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ElementBounds {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl ElementBounds {
    pub fn contains(&self, x: u32, y: u32) -> bool {
        x >= self.x && x <= self.x + self.width && y >= self.y && y <= self.y + self.height
    }
}

/// Optional external input from an element-detection step. Only used to
/// attach event targets; an empty list degrades gracefully.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UIElement {
    pub bounds: ElementBounds,
    pub element_type: String,
    pub confidence: f32,
    pub frame_index: u64,
    pub timestamp: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrictionKind {
    Hesitation,
    ErraticMovement,
    RageClick,
    UiConfusion,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
}

/// A detected signal of user difficulty. High severity is reserved for
/// rage-click clusters; `ui_confusion` records originate outside this core
/// and pass through unaltered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrictionPoint {
    pub kind: FrictionKind,
    pub frame_index: Option<u64>,
    pub x: Option<u32>,
    pub y: Option<u32>,
    pub timestamp: f64,
    pub severity: Severity,
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyMomentKind {
    FirstInteraction,
    Friction,
    LongPause,
}

/// A distinguished moment in the session timeline, for reporting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyMoment {
    pub kind: KeyMomentKind,
    pub timestamp: f64,
    pub frame_index: u64,
    pub description: String,
}
