//! Report visual model

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Absolute position on the report page, in pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PixelRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl PixelRect {
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }
}

/// A dashboard item converted for the report canvas
///
/// One per dashboard item, in dashboard order; the index drives z-order and
/// tab order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PbiVisualConfig {
    /// Dashboard item id the visual was built from
    pub name: String,
    /// Target visual type identifier (e.g. `clusteredBarChart`)
    pub visual_type: String,
    /// Pixel rectangle
    pub position: PixelRect,
    /// Visual title
    pub title: String,
    /// Dashboard visual type
    pub original_type: String,
    /// Dashboard props, kept for round-tripping
    pub phantom_props: Value,
}
