//! Models module for the export engine
//!
//! Defines the dashboard-side inputs (items, data snapshot) and the
//! tabular-side outputs (tables, relationships, measures, visuals).

pub mod dashboard;
pub mod dataset;
pub mod enums;
pub mod measure;
pub mod relationship;
pub mod table;
pub mod visual;

pub use dashboard::{
    CategoryProps, DashboardItem, GridLayout, MatrixProps, MetricRef, ScatterProps, SlicerProps,
    TableProps, ValueProps, VisualFamily, VisualKind, VisualProps, WaterfallProps,
};
pub use dataset::{
    ControversyScoreRow, CustomerRow, DataSnapshot, EmployeeRow, FinanceRow, PortfolioEntityRow,
    ProductRow, SaleRow, ShipmentRow, SocialPostRow, StoreRow, SubscriptionRow,
};
pub use enums::*;
pub use measure::DaxMeasure;
pub use relationship::PbiRelationship;
pub use table::{PbiColumn, PbiSchema, PbiTable};
pub use visual::{PbiVisualConfig, PixelRect};
