//! Grid to report-canvas conversion
//!
//! Dashboard items are placed on a column grid; report visuals are placed in
//! absolute pixels. The conversion is a linear scale with a minimum visual
//! size.

use crate::config::CanvasOptions;
use crate::models::{DashboardItem, GridLayout, PbiVisualConfig, PixelRect, VisualKind};

/// Target visual type of unmapped kinds
pub const FALLBACK_VISUAL_TYPE: &str = "card";

/// Target visual type of a dashboard visual kind
pub fn map_visual_type(kind: &VisualKind) -> &'static str {
    match kind {
        VisualKind::Bar => "clusteredBarChart",
        VisualKind::Column => "clusteredColumnChart",
        VisualKind::StackedBar => "stackedBarChart",
        VisualKind::Line => "lineChart",
        VisualKind::Area => "areaChart",
        VisualKind::Combo => "lineClusteredColumnComboChart",
        VisualKind::Pie => "pieChart",
        VisualKind::Donut => "donutChart",
        VisualKind::Treemap => "treemap",
        VisualKind::Funnel => "funnel",
        VisualKind::Card => "card",
        VisualKind::Kpi => "kpi",
        VisualKind::MultiCard => "multiRowCard",
        VisualKind::Gauge => "gauge",
        VisualKind::Table => "tableEx",
        VisualKind::Matrix => "pivotTable",
        VisualKind::Scatter => "scatterChart",
        VisualKind::Slicer => "slicer",
        VisualKind::Waterfall => "waterfallChart",
        VisualKind::Other(_) => FALLBACK_VISUAL_TYPE,
    }
}

/// Converts dashboard items into positioned report visuals
#[derive(Debug, Clone, Copy, Default)]
pub struct LayoutConverter {
    canvas: CanvasOptions,
}

impl LayoutConverter {
    pub fn new(canvas: CanvasOptions) -> Self {
        Self { canvas }
    }

    pub fn canvas(&self) -> &CanvasOptions {
        &self.canvas
    }

    fn column_width(&self) -> f64 {
        self.canvas.width / f64::from(self.canvas.columns.max(1))
    }

    fn row_height(&self) -> f64 {
        self.canvas.height / f64::from(self.canvas.rows.max(1))
    }

    /// Pixel rectangle of a grid placement, rounded to whole pixels
    ///
    /// # Example
    ///
    /// ```rust
    /// use phantom_pbi_export::layout::LayoutConverter;
    /// use phantom_pbi_export::models::GridLayout;
    ///
    /// let rect = LayoutConverter::default().grid_to_pixels(&GridLayout::new(6, 4, 6, 8));
    /// assert_eq!((rect.x, rect.y, rect.width, rect.height), (640.0, 120.0, 640.0, 240.0));
    /// ```
    pub fn grid_to_pixels(&self, layout: &GridLayout) -> PixelRect {
        let col = self.column_width();
        let row = self.row_height();
        PixelRect {
            x: (f64::from(layout.x) * col).round().max(0.0),
            y: (f64::from(layout.y) * row).round().max(0.0),
            width: (f64::from(layout.w) * col).round().max(self.canvas.min_width),
            height: (f64::from(layout.h) * row).round().max(self.canvas.min_height),
        }
    }

    pub fn convert(&self, item: &DashboardItem) -> PbiVisualConfig {
        PbiVisualConfig {
            name: item.id.clone(),
            visual_type: map_visual_type(&item.kind).to_string(),
            position: self.grid_to_pixels(&item.layout),
            title: item.title.clone(),
            original_type: item.kind.as_str().to_string(),
            phantom_props: item.props.to_value(),
        }
    }

    /// One config per item, in item order
    pub fn convert_all(&self, items: &[DashboardItem]) -> Vec<PbiVisualConfig> {
        items.iter().map(|item| self.convert(item)).collect()
    }

    /// Page height needed to show every visual, at least the canvas height
    pub fn page_height(&self, configs: &[PbiVisualConfig]) -> f64 {
        configs
            .iter()
            .map(|c| c.position.bottom())
            .fold(self.canvas.height, f64::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_minimum_size() {
        let rect = LayoutConverter::default().grid_to_pixels(&GridLayout::new(0, 0, 0, 0));
        assert_eq!(rect.width, 50.0);
        assert_eq!(rect.height, 30.0);
        assert_eq!((rect.x, rect.y), (0.0, 0.0));
    }

    #[test]
    fn test_layout_bounds_hold_for_whole_grid() {
        let converter = LayoutConverter::default();
        for x in 0..12 {
            for w in 0..=(12 - x) {
                for h in [0, 1, 3, 24] {
                    let rect = converter.grid_to_pixels(&GridLayout::new(x, x * 2, w, h));
                    assert!(rect.width >= 50.0 && rect.height >= 30.0);
                    assert!(rect.x >= 0.0 && rect.y >= 0.0);
                    assert!(rect.x + rect.width <= 1280.0 || w == 0);
                }
            }
        }
    }

    #[test]
    fn test_custom_canvas() {
        let converter = LayoutConverter::new(CanvasOptions {
            columns: 24,
            width: 1920.0,
            ..Default::default()
        });
        let rect = converter.grid_to_pixels(&GridLayout::new(1, 0, 3, 2));
        assert_eq!(rect.x, 80.0);
        assert_eq!(rect.width, 240.0);
    }

    #[test]
    fn test_visual_type_map() {
        assert_eq!(map_visual_type(&VisualKind::Bar), "clusteredBarChart");
        assert_eq!(map_visual_type(&VisualKind::Matrix), "pivotTable");
        assert_eq!(
            map_visual_type(&VisualKind::from_type("sankey")),
            FALLBACK_VISUAL_TYPE
        );
    }

    #[test]
    fn test_convert_all_preserves_order_and_props() {
        let items = vec![
            DashboardItem::new("a", "line", "Trend", GridLayout::new(0, 0, 12, 6), json!({})),
            DashboardItem::new(
                "b",
                "sankey",
                "Flows",
                GridLayout::new(0, 30, 6, 4),
                json!({"metric": "revenue"}),
            ),
        ];
        let converter = LayoutConverter::default();
        let configs = converter.convert_all(&items);

        assert_eq!(configs[0].name, "a");
        assert_eq!(configs[1].visual_type, "card");
        assert_eq!(configs[1].original_type, "sankey");
        assert_eq!(configs[1].phantom_props["metric"], "revenue");
        assert_eq!(converter.page_height(&configs), 1020.0);
    }
}
