// src/localizer.rs
//
// Cursor localization for a single frame. The pointer is inferred from pixel
// evidence only: HSV color-range masks for the configured cursor color
// families, a morphological close-then-open to kill speckle, connected
// component extraction with area/aspect gating, and an optional normalized
// cross-correlation pass against a small library of cursor silhouettes.
//
// Known accuracy limitation: the white/black/blue color heuristic is fragile
// under arbitrary UI themes. There is no better ground-truth signal available
// from frame pixels alone; any replacement detector must preserve the same
// candidate/confidence contract.

use crate::config::LocalizerConfig;
use crate::types::Frame;
use tracing::debug;

/// A connected pixel region matching a cursor color/shape profile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CursorCandidate {
    pub x: u32,
    pub y: u32,
    pub pixel_area: u32,
    pub confidence: f32,
}

/// Convert RGB to HSV. Returns (H: 0-360, S: 0-100, V: 0-255).
#[inline]
pub fn rgb_to_hsv(r: f32, g: f32, b: f32) -> (f32, f32, f32) {
    let r_n = r / 255.0;
    let g_n = g / 255.0;
    let b_n = b / 255.0;

    let max = r_n.max(g_n).max(b_n);
    let min = r_n.min(g_n).min(b_n);
    let delta = max - min;

    let h = if delta < 1e-6 {
        0.0
    } else if (max - r_n).abs() < 1e-6 {
        60.0 * (((g_n - b_n) / delta) % 6.0)
    } else if (max - g_n).abs() < 1e-6 {
        60.0 * (((b_n - r_n) / delta) + 2.0)
    } else {
        60.0 * (((r_n - g_n) / delta) + 4.0)
    };
    let h = if h < 0.0 { h + 360.0 } else { h };

    let s = if max < 1e-6 { 0.0 } else { (delta / max) * 100.0 };
    let v = max * 255.0;

    (h, s, v)
}

// ============================================================================
// SHAPE TEMPLATES
// ============================================================================

struct CursorTemplate {
    name: &'static str,
    width: usize,
    height: usize,
    data: Vec<u8>,
}

/// Procedural silhouettes of the common cursor shapes. Crude, but NCC only
/// needs the bright-over-dark layout, not exact glyph geometry.
fn builtin_templates() -> Vec<CursorTemplate> {
    let mut arrow = vec![0u8; 19 * 12];
    for y in 0..15 {
        for x in 0..8 {
            arrow[y * 12 + x] = 255;
        }
    }

    let mut hand = vec![0u8; 20 * 16];
    for y in 5..18 {
        for x in 3..13 {
            hand[y * 16 + x] = 255;
        }
    }

    vec![
        CursorTemplate {
            name: "arrow",
            width: 12,
            height: 19,
            data: arrow,
        },
        CursorTemplate {
            name: "hand",
            width: 16,
            height: 20,
            data: hand,
        },
    ]
}

// ============================================================================
// LOCALIZER
// ============================================================================

pub struct CursorLocalizer {
    config: LocalizerConfig,
    templates: Vec<CursorTemplate>,
}

impl CursorLocalizer {
    pub fn new(config: LocalizerConfig) -> Self {
        let templates = if config.use_templates {
            builtin_templates()
        } else {
            Vec::new()
        };
        Self { config, templates }
    }

    /// Find candidate cursor blobs in one frame. An empty result means "no
    /// cursor visible", never an error. A frame whose pixel buffer does not
    /// hold `width * height * 3` bytes also yields no candidates.
    ///
    /// Each color family is segmented and cleaned separately. A naive union
    /// of the masks would weld a white cursor to a dark background (or the
    /// reverse) into one oversized component and lose the detection.
    pub fn localize(&self, frame: &Frame) -> Vec<CursorCandidate> {
        let width = frame.width as usize;
        let height = frame.height as usize;

        if frame.data.len() != width * height * 3 {
            debug!(
                "frame {} pixel buffer is {} bytes, expected {}; skipping",
                frame.index,
                frame.data.len(),
                width * height * 3
            );
            return Vec::new();
        }

        let mut candidates = Vec::new();
        for mask in self.color_masks(frame) {
            let mask = morph_open(&morph_close(&mask, width, height), width, height);
            candidates.extend(self.extract_candidates(&mask, width, height));
        }

        // A confident shape match supersedes the color heuristic.
        if !self.templates.is_empty() {
            if let Some(hit) = self.match_templates(frame) {
                if hit.confidence > self.config.template_match_threshold {
                    debug!(
                        "template match at ({}, {}) score {:.3} supersedes {} color candidate(s)",
                        hit.x,
                        hit.y,
                        hit.confidence,
                        candidates.len()
                    );
                    return vec![hit];
                }
            }
        }

        candidates
    }

    /// Binary mask per configured cursor color family.
    fn color_masks(&self, frame: &Frame) -> Vec<Vec<u8>> {
        let width = frame.width as usize;
        let height = frame.height as usize;
        let cfg = &self.config;

        let mut white = vec![0u8; width * height];
        let mut black = vec![0u8; width * height];
        let mut blue = if cfg.detect_blue {
            Some(vec![0u8; width * height])
        } else {
            None
        };

        for i in 0..width * height {
            let r = frame.data[i * 3] as f32;
            let g = frame.data[i * 3 + 1] as f32;
            let b = frame.data[i * 3 + 2] as f32;
            let (h, s, v) = rgb_to_hsv(r, g, b);

            if s <= cfg.white_max_saturation && v >= cfg.white_min_value {
                white[i] = 1;
            }
            if v <= cfg.black_max_value {
                black[i] = 1;
            }
            if let Some(mask) = blue.as_mut() {
                if h >= cfg.blue_hue_min
                    && h <= cfg.blue_hue_max
                    && s >= cfg.blue_min_saturation
                    && v >= cfg.blue_min_value
                {
                    mask[i] = 1;
                }
            }
        }

        let mut masks = vec![white, black];
        if let Some(mask) = blue {
            masks.push(mask);
        }
        masks
    }

    /// Connected components (8-connectivity) over the cleaned mask, gated by
    /// pixel area and bounding-box aspect ratio. Centroid is the standard
    /// area-weighted moment (M10/M00, M01/M00).
    fn extract_candidates(&self, mask: &[u8], width: usize, height: usize) -> Vec<CursorCandidate> {
        let cfg = &self.config;
        let mut visited = vec![false; width * height];
        let mut stack: Vec<usize> = Vec::new();
        let mut candidates = Vec::new();

        for start in 0..width * height {
            if mask[start] == 0 || visited[start] {
                continue;
            }

            let mut area: u32 = 0;
            let mut sum_x: u64 = 0;
            let mut sum_y: u64 = 0;
            let mut min_x = usize::MAX;
            let mut max_x = 0usize;
            let mut min_y = usize::MAX;
            let mut max_y = 0usize;

            visited[start] = true;
            stack.push(start);

            while let Some(idx) = stack.pop() {
                let x = idx % width;
                let y = idx / width;

                area += 1;
                sum_x += x as u64;
                sum_y += y as u64;
                min_x = min_x.min(x);
                max_x = max_x.max(x);
                min_y = min_y.min(y);
                max_y = max_y.max(y);

                for dy in -1i64..=1 {
                    for dx in -1i64..=1 {
                        if dx == 0 && dy == 0 {
                            continue;
                        }
                        let nx = x as i64 + dx;
                        let ny = y as i64 + dy;
                        if nx < 0 || ny < 0 || nx >= width as i64 || ny >= height as i64 {
                            continue;
                        }
                        let nidx = ny as usize * width + nx as usize;
                        if mask[nidx] != 0 && !visited[nidx] {
                            visited[nidx] = true;
                            stack.push(nidx);
                        }
                    }
                }
            }

            if area <= cfg.min_area || area >= cfg.max_area {
                continue;
            }

            let bbox_w = (max_x - min_x + 1) as f32;
            let bbox_h = (max_y - min_y + 1) as f32;
            let aspect = bbox_w / bbox_h;
            if aspect < cfg.min_aspect_ratio || aspect > cfg.max_aspect_ratio {
                continue;
            }

            candidates.push(CursorCandidate {
                x: (sum_x / area as u64) as u32,
                y: (sum_y / area as u64) as u32,
                pixel_area: area,
                confidence: cfg.color_confidence,
            });
        }

        candidates
    }

    /// Normalized cross-correlation of each silhouette against the grayscale
    /// frame. Returns the best scoring hit, positioned at the template center.
    fn match_templates(&self, frame: &Frame) -> Option<CursorCandidate> {
        let width = frame.width as usize;
        let height = frame.height as usize;

        let gray: Vec<f32> = (0..width * height)
            .map(|i| {
                0.299 * frame.data[i * 3] as f32
                    + 0.587 * frame.data[i * 3 + 1] as f32
                    + 0.114 * frame.data[i * 3 + 2] as f32
            })
            .collect();

        let mut best: Option<CursorCandidate> = None;
        let mut best_score = 0.0f32;

        for template in &self.templates {
            if template.width > width || template.height > height {
                continue;
            }
            if let Some((tx, ty, score)) =
                best_ncc_position(&gray, width, height, template)
            {
                if score > best_score {
                    best_score = score;
                    best = Some(CursorCandidate {
                        x: (tx + template.width / 2) as u32,
                        y: (ty + template.height / 2) as u32,
                        pixel_area: (template.width * template.height) as u32,
                        confidence: score,
                    });
                    debug!("{} template score {:.3} at ({}, {})", template.name, score, tx, ty);
                }
            }
        }

        best
    }
}

/// Zero-mean NCC sweep of one template over the grayscale image. Patches with
/// near-zero variance (flat regions) score zero rather than dividing by zero.
fn best_ncc_position(
    gray: &[f32],
    width: usize,
    height: usize,
    template: &CursorTemplate,
) -> Option<(usize, usize, f32)> {
    let tw = template.width;
    let th = template.height;
    let n = (tw * th) as f32;

    let t_mean: f32 = template.data.iter().map(|&v| v as f32).sum::<f32>() / n;
    let t_centered: Vec<f32> = template.data.iter().map(|&v| v as f32 - t_mean).collect();
    let t_norm: f32 = t_centered.iter().map(|v| v * v).sum::<f32>().sqrt();
    if t_norm < 1e-6 {
        return None;
    }

    let mut best: Option<(usize, usize, f32)> = None;

    for y in 0..=height - th {
        for x in 0..=width - tw {
            let mut patch_sum = 0.0f32;
            for ty in 0..th {
                let row = (y + ty) * width + x;
                for tx in 0..tw {
                    patch_sum += gray[row + tx];
                }
            }
            let patch_mean = patch_sum / n;

            let mut cross = 0.0f32;
            let mut patch_sq = 0.0f32;
            for ty in 0..th {
                let row = (y + ty) * width + x;
                let trow = ty * tw;
                for tx in 0..tw {
                    let p = gray[row + tx] - patch_mean;
                    cross += p * t_centered[trow + tx];
                    patch_sq += p * p;
                }
            }

            let patch_norm = patch_sq.sqrt();
            if patch_norm < 1e-6 {
                continue;
            }

            let score = cross / (t_norm * patch_norm);
            if best.map_or(true, |(_, _, s)| score > s) {
                best = Some((x, y, score));
            }
        }
    }

    best
}

// ============================================================================
// MORPHOLOGY
// ============================================================================

/// 3x3 dilation. Out-of-bounds neighbors are treated as background.
fn dilate(mask: &[u8], width: usize, height: usize) -> Vec<u8> {
    let mut out = vec![0u8; width * height];
    for y in 0..height {
        for x in 0..width {
            let mut hit = false;
            'scan: for dy in -1i64..=1 {
                for dx in -1i64..=1 {
                    let nx = x as i64 + dx;
                    let ny = y as i64 + dy;
                    if nx < 0 || ny < 0 || nx >= width as i64 || ny >= height as i64 {
                        continue;
                    }
                    if mask[ny as usize * width + nx as usize] != 0 {
                        hit = true;
                        break 'scan;
                    }
                }
            }
            if hit {
                out[y * width + x] = 1;
            }
        }
    }
    out
}

/// 3x3 erosion. Out-of-bounds neighbors are ignored, so blobs touching the
/// frame edge are not eaten away.
fn erode(mask: &[u8], width: usize, height: usize) -> Vec<u8> {
    let mut out = vec![0u8; width * height];
    for y in 0..height {
        for x in 0..width {
            let mut all = true;
            'scan: for dy in -1i64..=1 {
                for dx in -1i64..=1 {
                    let nx = x as i64 + dx;
                    let ny = y as i64 + dy;
                    if nx < 0 || ny < 0 || nx >= width as i64 || ny >= height as i64 {
                        continue;
                    }
                    if mask[ny as usize * width + nx as usize] == 0 {
                        all = false;
                        break 'scan;
                    }
                }
            }
            if all {
                out[y * width + x] = 1;
            }
        }
    }
    out
}

/// Close = dilate then erode. Fills single-pixel holes inside a blob.
fn morph_close(mask: &[u8], width: usize, height: usize) -> Vec<u8> {
    erode(&dilate(mask, width, height), width, height)
}

/// Open = erode then dilate. Removes speckle noise smaller than the kernel.
fn morph_open(mask: &[u8], width: usize, height: usize) -> Vec<u8> {
    dilate(&erode(mask, width, height), width, height)
}
