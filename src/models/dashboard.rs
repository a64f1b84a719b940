//! Dashboard item model
//!
//! Dashboard items are read from the dashboard store as
//! `{id, type, title, layout: {x, y, w, h}, props: {...}}`. The `props` bag is
//! parsed into a [`VisualProps`] variant chosen by the visual kind; props that do
//! not fit the variant degrade to [`VisualProps::Generic`].

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use tracing::warn;

/// Grid placement of a visual, in grid units
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridLayout {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl GridLayout {
    pub fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }
}

/// Kind of visual on the dashboard canvas
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum VisualKind {
    Bar,
    Column,
    StackedBar,
    Line,
    Area,
    Combo,
    Pie,
    Donut,
    Treemap,
    Funnel,
    Card,
    Kpi,
    MultiCard,
    Gauge,
    Table,
    Matrix,
    Scatter,
    Slicer,
    Waterfall,
    /// Any visual type the export engine has no binding logic for
    Other(String),
}

/// Projection family of a visual kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VisualFamily {
    /// Category axis + values (bar, column, line, area, ...)
    CategoryValue,
    /// Legend + values (pie, donut)
    LegendValue,
    /// Values only (card, kpi, gauge)
    ValueOnly,
    Table,
    Matrix,
    Scatter,
    Slicer,
    Waterfall,
    Generic,
}

impl VisualKind {
    /// Parse a dashboard visual type identifier
    pub fn from_type(visual_type: &str) -> Self {
        match visual_type.to_lowercase().replace(['-', '_'], "").as_str() {
            "bar" | "barchart" => VisualKind::Bar,
            "column" | "columnchart" => VisualKind::Column,
            "stackedbar" | "stackedbarchart" => VisualKind::StackedBar,
            "line" | "linechart" => VisualKind::Line,
            "area" | "areachart" => VisualKind::Area,
            "combo" | "combochart" => VisualKind::Combo,
            "pie" | "piechart" => VisualKind::Pie,
            "donut" | "doughnut" | "donutchart" => VisualKind::Donut,
            "treemap" => VisualKind::Treemap,
            "funnel" => VisualKind::Funnel,
            "card" => VisualKind::Card,
            "kpi" | "kpicard" => VisualKind::Kpi,
            "multicard" | "multirowcard" => VisualKind::MultiCard,
            "gauge" => VisualKind::Gauge,
            "table" => VisualKind::Table,
            "matrix" | "pivot" => VisualKind::Matrix,
            "scatter" | "scatterchart" => VisualKind::Scatter,
            "slicer" => VisualKind::Slicer,
            "waterfall" | "waterfallchart" => VisualKind::Waterfall,
            _ => VisualKind::Other(visual_type.to_string()),
        }
    }

    /// Dashboard type identifier
    pub fn as_str(&self) -> &str {
        match self {
            VisualKind::Bar => "bar",
            VisualKind::Column => "column",
            VisualKind::StackedBar => "stackedBar",
            VisualKind::Line => "line",
            VisualKind::Area => "area",
            VisualKind::Combo => "combo",
            VisualKind::Pie => "pie",
            VisualKind::Donut => "donut",
            VisualKind::Treemap => "treemap",
            VisualKind::Funnel => "funnel",
            VisualKind::Card => "card",
            VisualKind::Kpi => "kpi",
            VisualKind::MultiCard => "multiCard",
            VisualKind::Gauge => "gauge",
            VisualKind::Table => "table",
            VisualKind::Matrix => "matrix",
            VisualKind::Scatter => "scatter",
            VisualKind::Slicer => "slicer",
            VisualKind::Waterfall => "waterfall",
            VisualKind::Other(name) => name,
        }
    }

    pub fn family(&self) -> VisualFamily {
        match self {
            VisualKind::Bar
            | VisualKind::Column
            | VisualKind::StackedBar
            | VisualKind::Line
            | VisualKind::Area
            | VisualKind::Combo
            | VisualKind::Treemap
            | VisualKind::Funnel => VisualFamily::CategoryValue,
            VisualKind::Pie | VisualKind::Donut => VisualFamily::LegendValue,
            VisualKind::Card | VisualKind::Kpi | VisualKind::MultiCard | VisualKind::Gauge => {
                VisualFamily::ValueOnly
            }
            VisualKind::Table => VisualFamily::Table,
            VisualKind::Matrix => VisualFamily::Matrix,
            VisualKind::Scatter => VisualFamily::Scatter,
            VisualKind::Slicer => VisualFamily::Slicer,
            VisualKind::Waterfall => VisualFamily::Waterfall,
            VisualKind::Other(_) => VisualFamily::Generic,
        }
    }
}

impl fmt::Display for VisualKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Bindings of category/value charts and the pie family
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryProps {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimension: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metric: Option<String>,
    /// Secondary series (combo line, comparison series)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metric2: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", rename = "topN")]
    pub top_n: Option<u32>,
}

/// Bindings of single-value visuals (card, kpi, gauge)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueProps {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metric: Option<String>,
    /// Older dashboards store the metric under `value`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// Target / comparison metric
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metric2: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation: Option<String>,
}

impl ValueProps {
    /// Bound metric; blank strings count as unbound
    pub fn metric(&self) -> Option<&str> {
        let bound: fn(&Option<String>) -> Option<&str> = |m| m.as_deref().filter(|m| !m.trim().is_empty());
        bound(&self.metric).or(bound(&self.value))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableProps {
    #[serde(default)]
    pub columns: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", rename = "topN")]
    pub top_n: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatrixProps {
    #[serde(default)]
    pub rows: Vec<String>,
    #[serde(default)]
    pub columns: Vec<String>,
    #[serde(default)]
    pub values: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScatterProps {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimension: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x_metric: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y_metric: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlicerProps {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimension: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaterfallProps {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimension: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metric: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation: Option<String>,
}

/// Binding parameters of a visual, keyed by visual kind
#[derive(Debug, Clone, PartialEq)]
pub enum VisualProps {
    Category(CategoryProps),
    Value(ValueProps),
    Table(TableProps),
    Matrix(MatrixProps),
    Scatter(ScatterProps),
    Slicer(SlicerProps),
    Waterfall(WaterfallProps),
    /// Props of unknown kinds, or props that did not fit their kind
    Generic(Map<String, Value>),
}

/// A metric bound on a visual, with the raw operation string if any
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricRef<'a> {
    pub metric: &'a str,
    pub operation: Option<&'a str>,
}

impl VisualProps {
    /// Parse a props bag for the given kind
    pub fn from_value(kind: &VisualKind, props: Value) -> Self {
        let props = match props {
            Value::Null => Value::Object(Map::new()),
            other => other,
        };
        let parsed = match kind.family() {
            VisualFamily::CategoryValue | VisualFamily::LegendValue => {
                serde_json::from_value(props.clone()).map(VisualProps::Category)
            }
            VisualFamily::ValueOnly => serde_json::from_value(props.clone()).map(VisualProps::Value),
            VisualFamily::Table => serde_json::from_value(props.clone()).map(VisualProps::Table),
            VisualFamily::Matrix => serde_json::from_value(props.clone()).map(VisualProps::Matrix),
            VisualFamily::Scatter => {
                serde_json::from_value(props.clone()).map(VisualProps::Scatter)
            }
            VisualFamily::Slicer => serde_json::from_value(props.clone()).map(VisualProps::Slicer),
            VisualFamily::Waterfall => {
                serde_json::from_value(props.clone()).map(VisualProps::Waterfall)
            }
            VisualFamily::Generic => return VisualProps::Generic(into_map(props)),
        };
        match parsed {
            Ok(props) => props,
            Err(e) => {
                warn!(
                    "Props of '{}' visual do not match its bindings ({}), keeping them untyped",
                    kind, e
                );
                VisualProps::Generic(into_map(props))
            }
        }
    }

    /// Props as a JSON object
    pub fn to_value(&self) -> Value {
        let value = match self {
            VisualProps::Category(p) => serde_json::to_value(p),
            VisualProps::Value(p) => serde_json::to_value(p),
            VisualProps::Table(p) => serde_json::to_value(p),
            VisualProps::Matrix(p) => serde_json::to_value(p),
            VisualProps::Scatter(p) => serde_json::to_value(p),
            VisualProps::Slicer(p) => serde_json::to_value(p),
            VisualProps::Waterfall(p) => serde_json::to_value(p),
            VisualProps::Generic(map) => return Value::Object(map.clone()),
        };
        value.unwrap_or_default()
    }

    /// The dimension the visual groups by, if any
    pub fn dimension(&self) -> Option<&str> {
        match self {
            VisualProps::Category(p) => p.dimension.as_deref(),
            VisualProps::Scatter(p) => p.dimension.as_deref(),
            VisualProps::Slicer(p) => p.dimension.as_deref(),
            VisualProps::Waterfall(p) => p.dimension.as_deref(),
            VisualProps::Generic(map) => map.get("dimension").and_then(Value::as_str),
            VisualProps::Value(_) | VisualProps::Table(_) | VisualProps::Matrix(_) => None,
        }
    }

    /// Every metric the visual aggregates, in binding order
    pub fn metric_refs(&self) -> Vec<MetricRef<'_>> {
        fn push<'a>(out: &mut Vec<MetricRef<'a>>, metric: Option<&'a str>, op: Option<&'a str>) {
            if let Some(metric) = metric.filter(|m| !m.trim().is_empty()) {
                out.push(MetricRef {
                    metric,
                    operation: op,
                });
            }
        }

        let mut refs = Vec::new();
        match self {
            VisualProps::Category(p) => {
                let op = p.operation.as_deref();
                push(&mut refs, p.metric.as_deref(), op);
                push(&mut refs, p.metric2.as_deref(), op);
            }
            VisualProps::Value(p) => {
                let op = p.operation.as_deref();
                push(&mut refs, p.metric(), op);
                push(&mut refs, p.metric2.as_deref(), op);
            }
            VisualProps::Matrix(p) => {
                for value in &p.values {
                    push(&mut refs, Some(value.as_str()), p.operation.as_deref());
                }
            }
            VisualProps::Scatter(p) => {
                let op = p.operation.as_deref();
                push(&mut refs, p.x_metric.as_deref(), op);
                push(&mut refs, p.y_metric.as_deref(), op);
            }
            VisualProps::Waterfall(p) => {
                push(&mut refs, p.metric.as_deref(), p.operation.as_deref());
            }
            VisualProps::Generic(map) => {
                let metric = map
                    .get("metric")
                    .or_else(|| map.get("value"))
                    .and_then(Value::as_str);
                let op = map.get("operation").and_then(Value::as_str);
                push(&mut refs, metric, op);
            }
            VisualProps::Table(_) | VisualProps::Slicer(_) => {}
        }
        refs
    }
}

fn into_map(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

/// Visual placed on the dashboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawDashboardItem", into = "RawDashboardItem")]
pub struct DashboardItem {
    /// Unique id within the dashboard
    pub id: String,
    /// Visual kind
    pub kind: VisualKind,
    /// Title shown on the visual
    pub title: String,
    /// Grid placement
    pub layout: GridLayout,
    /// Typed bindings
    pub props: VisualProps,
}

impl DashboardItem {
    /// Build an item from its dashboard-store representation
    ///
    /// # Example
    ///
    /// ```rust
    /// use phantom_pbi_export::models::{DashboardItem, GridLayout, VisualKind};
    /// use serde_json::json;
    ///
    /// let item = DashboardItem::new(
    ///     "c1",
    ///     "card",
    ///     "Revenue",
    ///     GridLayout::new(0, 0, 3, 2),
    ///     json!({"metric": "revenue", "operation": "sum"}),
    /// );
    /// assert_eq!(item.kind, VisualKind::Card);
    /// ```
    pub fn new(id: &str, visual_type: &str, title: &str, layout: GridLayout, props: Value) -> Self {
        RawDashboardItem {
            id: id.to_string(),
            visual_type: visual_type.to_string(),
            title: title.to_string(),
            layout,
            props,
        }
        .into()
    }
}

/// Wire shape of a dashboard item
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawDashboardItem {
    id: String,
    #[serde(rename = "type")]
    visual_type: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    layout: GridLayout,
    #[serde(default)]
    props: Value,
}

impl From<RawDashboardItem> for DashboardItem {
    fn from(raw: RawDashboardItem) -> Self {
        let kind = VisualKind::from_type(&raw.visual_type);
        let props = VisualProps::from_value(&kind, raw.props);
        Self {
            id: raw.id,
            kind,
            title: raw.title,
            layout: raw.layout,
            props,
        }
    }
}

impl From<DashboardItem> for RawDashboardItem {
    fn from(item: DashboardItem) -> Self {
        Self {
            id: item.id,
            visual_type: item.kind.as_str().to_string(),
            title: item.title,
            layout: item.layout,
            props: item.props.to_value(),
        }
    }
}
