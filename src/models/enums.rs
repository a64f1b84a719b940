//! Enums for the export domain
//!
//! # Serde Casing Conventions
//!
//! The enums in this module use different serde `rename_all` strategies based on
//! the external document they end up in:
//!
//! - Explicit renames: values that must match the dashboard store (Scenario)
//! - `camelCase`: values written verbatim into TMDL / DataModelSchema documents
//!   (PbiDataType, CrossFilteringBehavior, SummarizeBy, DataCollection)
//! - `lowercase`: simple keywords (FieldRole, RelationshipCardinality, Aggregation)

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::warn;

/// Business scenario a dashboard is built on.
///
/// Selects the schema, the field mapping table and the dataset collections.
/// Deserializing an unknown value falls back to [`Scenario::Retail`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String")]
pub enum Scenario {
    #[default]
    Retail,
    #[serde(rename = "SaaS")]
    SaaS,
    #[serde(rename = "HR")]
    HR,
    Logistics,
    Portfolio,
    Social,
    Finance,
}

impl Scenario {
    /// All scenarios, in the order the dashboard picker lists them.
    pub const ALL: [Scenario; 7] = [
        Scenario::Retail,
        Scenario::SaaS,
        Scenario::HR,
        Scenario::Logistics,
        Scenario::Portfolio,
        Scenario::Social,
        Scenario::Finance,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Scenario::Retail => "Retail",
            Scenario::SaaS => "SaaS",
            Scenario::HR => "HR",
            Scenario::Logistics => "Logistics",
            Scenario::Portfolio => "Portfolio",
            Scenario::Social => "Social",
            Scenario::Finance => "Finance",
        }
    }

    /// Resolve a scenario name, falling back to Retail for unknown values.
    pub fn from_name(name: &str) -> Self {
        match name.parse() {
            Ok(scenario) => scenario,
            Err(_) => {
                warn!("Unknown scenario '{}', falling back to Retail", name);
                Scenario::Retail
            }
        }
    }
}

impl FromStr for Scenario {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "retail" => Ok(Scenario::Retail),
            "saas" => Ok(Scenario::SaaS),
            "hr" => Ok(Scenario::HR),
            "logistics" => Ok(Scenario::Logistics),
            "portfolio" => Ok(Scenario::Portfolio),
            "social" => Ok(Scenario::Social),
            "finance" => Ok(Scenario::Finance),
            _ => Err(format!(
                "Unknown scenario: {}. Use one of Retail, SaaS, HR, Logistics, Portfolio, Social, Finance.",
                s
            )),
        }
    }
}

impl From<String> for Scenario {
    fn from(value: String) -> Self {
        Scenario::from_name(&value)
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Semantic role of a scenario field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldRole {
    Time,
    Entity,
    Geography,
    Category,
    Measure,
    Identifier,
}

impl FieldRole {
    /// Whether the field can be placed on an axis, legend or slicer
    pub fn is_dimension(self) -> bool {
        !matches!(self, FieldRole::Measure)
    }
}

/// Tabular column data type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PbiDataType {
    String,
    Int64,
    Double,
    DateTime,
    Boolean,
}

impl PbiDataType {
    /// Name used in TMDL and DataModelSchema documents
    pub fn as_str(self) -> &'static str {
        match self {
            PbiDataType::String => "string",
            PbiDataType::Int64 => "int64",
            PbiDataType::Double => "double",
            PbiDataType::DateTime => "dateTime",
            PbiDataType::Boolean => "boolean",
        }
    }

    /// M type used in `#table` row types and `Table.TransformColumnTypes`
    pub fn m_type(self) -> &'static str {
        match self {
            PbiDataType::String => "text",
            PbiDataType::Int64 => "Int64.Type",
            PbiDataType::Double => "number",
            PbiDataType::DateTime => "datetime",
            PbiDataType::Boolean => "logical",
        }
    }

    pub fn is_numeric(self) -> bool {
        matches!(self, PbiDataType::Int64 | PbiDataType::Double)
    }
}

/// Default aggregation applied when a column is dropped on a visual
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SummarizeBy {
    None,
    Sum,
    Average,
    Count,
}

impl SummarizeBy {
    pub fn as_str(self) -> &'static str {
        match self {
            SummarizeBy::None => "none",
            SummarizeBy::Sum => "sum",
            SummarizeBy::Average => "average",
            SummarizeBy::Count => "count",
        }
    }
}

/// Filter propagation across a relationship
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CrossFilteringBehavior {
    #[default]
    OneDirection,
    BothDirections,
}

impl CrossFilteringBehavior {
    pub fn as_str(self) -> &'static str {
        match self {
            CrossFilteringBehavior::OneDirection => "oneDirection",
            CrossFilteringBehavior::BothDirections => "bothDirections",
        }
    }
}

/// Cardinality of one relationship endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationshipCardinality {
    One,
    Many,
}

impl RelationshipCardinality {
    pub fn as_str(self) -> &'static str {
        match self {
            RelationshipCardinality::One => "one",
            RelationshipCardinality::Many => "many",
        }
    }
}

/// Aggregation verb bound to a metric on a visual
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Aggregation {
    #[default]
    Sum,
    #[serde(alias = "average")]
    Avg,
    Count,
    Min,
    Max,
    DistinctCount,
}

impl Aggregation {
    /// Canonical key used when deduplicating bindings
    pub fn as_key(self) -> &'static str {
        match self {
            Aggregation::Sum => "sum",
            Aggregation::Avg => "avg",
            Aggregation::Count => "count",
            Aggregation::Min => "min",
            Aggregation::Max => "max",
            Aggregation::DistinctCount => "distinctcount",
        }
    }

    /// Parse an operation string from visual props.
    ///
    /// Returns `None` for unrecognized operations so callers can decide how to degrade.
    pub fn parse(operation: &str) -> Option<Self> {
        match operation.trim().to_lowercase().replace(['_', '-', ' '], "").as_str() {
            "sum" | "total" => Some(Aggregation::Sum),
            "avg" | "average" | "mean" => Some(Aggregation::Avg),
            "count" => Some(Aggregation::Count),
            "min" | "minimum" => Some(Aggregation::Min),
            "max" | "maximum" => Some(Aggregation::Max),
            "distinctcount" | "countdistinct" | "countd" => Some(Aggregation::DistinctCount),
            _ => None,
        }
    }

    /// Whether the aggregation produces a whole-number count
    pub fn is_count(self) -> bool {
        matches!(self, Aggregation::Count | Aggregation::DistinctCount)
    }
}

/// Row collection of the data snapshot a table is loaded from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DataCollection {
    Sales,
    Stores,
    Products,
    Customers,
    Subscriptions,
    Employees,
    Shipments,
    PortfolioEntities,
    ControversyScores,
    SocialPosts,
    FinanceRecords,
}

impl DataCollection {
    pub fn as_str(self) -> &'static str {
        match self {
            DataCollection::Sales => "sales",
            DataCollection::Stores => "stores",
            DataCollection::Products => "products",
            DataCollection::Customers => "customers",
            DataCollection::Subscriptions => "subscriptions",
            DataCollection::Employees => "employees",
            DataCollection::Shipments => "shipments",
            DataCollection::PortfolioEntities => "portfolioEntities",
            DataCollection::ControversyScores => "controversyScores",
            DataCollection::SocialPosts => "socialPosts",
            DataCollection::FinanceRecords => "financeRecords",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scenario_parse_is_case_insensitive() {
        assert_eq!("saas".parse::<Scenario>().unwrap(), Scenario::SaaS);
        assert_eq!("HR".parse::<Scenario>().unwrap(), Scenario::HR);
        assert!("Healthcare".parse::<Scenario>().is_err());
    }

    #[test]
    fn test_unknown_scenario_falls_back_to_retail() {
        assert_eq!(Scenario::from_name("Healthcare"), Scenario::Retail);
        let scenario: Scenario = serde_json::from_str("\"Unknown\"").unwrap();
        assert_eq!(scenario, Scenario::Retail);
    }

    #[test]
    fn test_scenario_serializes_with_display_names() {
        assert_eq!(serde_json::to_string(&Scenario::SaaS).unwrap(), "\"SaaS\"");
        assert_eq!(serde_json::to_string(&Scenario::HR).unwrap(), "\"HR\"");
        assert_eq!(
            serde_json::to_string(&Scenario::Portfolio).unwrap(),
            "\"Portfolio\""
        );
    }

    #[test]
    fn test_aggregation_parse() {
        assert_eq!(Aggregation::parse("average"), Some(Aggregation::Avg));
        assert_eq!(Aggregation::parse("AVG"), Some(Aggregation::Avg));
        assert_eq!(
            Aggregation::parse("distinct_count"),
            Some(Aggregation::DistinctCount)
        );
        assert_eq!(Aggregation::parse("median"), None);
    }

    #[test]
    fn test_data_type_names() {
        assert_eq!(PbiDataType::DateTime.as_str(), "dateTime");
        assert_eq!(
            serde_json::to_string(&PbiDataType::Int64).unwrap(),
            "\"int64\""
        );
        assert_eq!(PbiDataType::Boolean.m_type(), "logical");
    }
}
