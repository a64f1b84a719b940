//! Scenario field reference data and naming heuristics
//!
//! Everything that classifies a field by its name lives here: the
//! dimension-name lookup tables, the semantic field catalogue, the keyword
//! lists behind format-string selection and metric humanizing.

use crate::models::{FieldRole, Scenario};
use serde::Serialize;

/// Semantic field exposed to the dashboard builder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SemanticField {
    pub name: &'static str,
    pub role: FieldRole,
}

const fn field(name: &'static str, role: FieldRole) -> SemanticField {
    SemanticField { name, role }
}

/// `(field, table, column)` rows of a dimension lookup table
type DimensionRow = (&'static str, &'static str, &'static str);

const RETAIL_DIMENSIONS: &[DimensionRow] = &[
    ("Date", "Sales", "Date"),
    ("Month", "Sales", "Date"),
    ("Region", "Store", "Region"),
    ("Country", "Store", "Country"),
    ("City", "Store", "City"),
    ("Store", "Store", "StoreName"),
    ("Category", "Product", "Category"),
    ("SubCategory", "Product", "SubCategory"),
    ("Product", "Product", "ProductName"),
    ("Segment", "Customer", "Segment"),
    ("Tier", "Customer", "Tier"),
    ("Customer", "Customer", "CustomerName"),
];

const SAAS_DIMENSIONS: &[DimensionRow] = &[
    ("Date", "Subscriptions", "Date"),
    ("Month", "Subscriptions", "Date"),
    ("Plan", "Subscriptions", "Plan"),
    ("Region", "Subscriptions", "Region"),
    ("Segment", "Customer", "Segment"),
    ("Tier", "Customer", "Tier"),
    ("Country", "Customer", "Country"),
    ("Customer", "Customer", "CustomerName"),
];

const HR_DIMENSIONS: &[DimensionRow] = &[
    ("Department", "Employees", "Department"),
    ("Role", "Employees", "Role"),
    ("Location", "Employees", "Location"),
    ("Region", "Employees", "Location"),
    ("Employee", "Employees", "Name"),
    ("HireDate", "Employees", "HireDate"),
    ("Date", "Employees", "HireDate"),
];

const LOGISTICS_DIMENSIONS: &[DimensionRow] = &[
    ("Date", "Shipments", "Date"),
    ("Month", "Shipments", "Date"),
    ("Origin", "Shipments", "Origin"),
    ("Destination", "Shipments", "Destination"),
    ("Region", "Shipments", "Destination"),
    ("Carrier", "Shipments", "Carrier"),
    ("Status", "Shipments", "Status"),
];

const PORTFOLIO_DIMENSIONS: &[DimensionRow] = &[
    ("Date", "ControversyScores", "Date"),
    ("Entity", "PortfolioEntities", "EntityName"),
    ("Sector", "PortfolioEntities", "Sector"),
    ("Country", "PortfolioEntities", "Country"),
    ("Region", "PortfolioEntities", "Region"),
    ("Category", "ControversyScores", "Category"),
];

const SOCIAL_DIMENSIONS: &[DimensionRow] = &[
    ("Date", "SocialPosts", "Date"),
    ("Month", "SocialPosts", "Date"),
    ("Platform", "SocialPosts", "Platform"),
    ("Author", "SocialPosts", "Author"),
    ("Sentiment", "SocialPosts", "Sentiment"),
];

const FINANCE_DIMENSIONS: &[DimensionRow] = &[
    ("Date", "Finance", "Date"),
    ("Month", "Finance", "Date"),
    ("Account", "Finance", "Account"),
    ("CostCenter", "Finance", "CostCenter"),
    ("Region", "Finance", "Region"),
];

/// Dimension-name lookup table of a scenario
pub fn dimension_table(scenario: Scenario) -> &'static [DimensionRow] {
    match scenario {
        Scenario::Retail => RETAIL_DIMENSIONS,
        Scenario::SaaS => SAAS_DIMENSIONS,
        Scenario::HR => HR_DIMENSIONS,
        Scenario::Logistics => LOGISTICS_DIMENSIONS,
        Scenario::Portfolio => PORTFOLIO_DIMENSIONS,
        Scenario::Social => SOCIAL_DIMENSIONS,
        Scenario::Finance => FINANCE_DIMENSIONS,
    }
}

/// Exact-match dimension lookup
pub fn lookup_dimension(scenario: Scenario, field_name: &str) -> Option<(&'static str, &'static str)> {
    dimension_table(scenario)
        .iter()
        .find(|(name, _, _)| *name == field_name)
        .map(|(_, table, column)| (*table, *column))
}

const RETAIL_FIELDS: &[SemanticField] = &[
    field("Date", FieldRole::Time),
    field("Month", FieldRole::Time),
    field("Region", FieldRole::Geography),
    field("Country", FieldRole::Geography),
    field("City", FieldRole::Geography),
    field("Store", FieldRole::Entity),
    field("Product", FieldRole::Entity),
    field("Customer", FieldRole::Entity),
    field("Category", FieldRole::Category),
    field("SubCategory", FieldRole::Category),
    field("Segment", FieldRole::Category),
    field("Tier", FieldRole::Category),
    field("id", FieldRole::Identifier),
    field("revenue", FieldRole::Measure),
    field("revenuePL", FieldRole::Measure),
    field("revenuePY", FieldRole::Measure),
    field("profit", FieldRole::Measure),
    field("profitPL", FieldRole::Measure),
    field("profitPY", FieldRole::Measure),
    field("quantity", FieldRole::Measure),
    field("cost", FieldRole::Measure),
    field("discount", FieldRole::Measure),
];

const SAAS_FIELDS: &[SemanticField] = &[
    field("Date", FieldRole::Time),
    field("Month", FieldRole::Time),
    field("Plan", FieldRole::Category),
    field("Region", FieldRole::Geography),
    field("Country", FieldRole::Geography),
    field("Segment", FieldRole::Category),
    field("Tier", FieldRole::Category),
    field("Customer", FieldRole::Entity),
    field("subscriptionId", FieldRole::Identifier),
    field("mrr", FieldRole::Measure),
    field("seats", FieldRole::Measure),
    field("ltv", FieldRole::Measure),
    field("cac", FieldRole::Measure),
];

const HR_FIELDS: &[SemanticField] = &[
    field("HireDate", FieldRole::Time),
    field("Date", FieldRole::Time),
    field("Department", FieldRole::Category),
    field("Role", FieldRole::Category),
    field("Location", FieldRole::Geography),
    field("Region", FieldRole::Geography),
    field("Employee", FieldRole::Entity),
    field("employeeId", FieldRole::Identifier),
    field("salary", FieldRole::Measure),
    field("rating", FieldRole::Measure),
    field("tenure", FieldRole::Measure),
];

const LOGISTICS_FIELDS: &[SemanticField] = &[
    field("Date", FieldRole::Time),
    field("Month", FieldRole::Time),
    field("Origin", FieldRole::Geography),
    field("Destination", FieldRole::Geography),
    field("Region", FieldRole::Geography),
    field("Carrier", FieldRole::Entity),
    field("Status", FieldRole::Category),
    field("shipmentId", FieldRole::Identifier),
    field("weight", FieldRole::Measure),
    field("cost", FieldRole::Measure),
    field("deliveryDays", FieldRole::Measure),
];

const PORTFOLIO_FIELDS: &[SemanticField] = &[
    field("Date", FieldRole::Time),
    field("Entity", FieldRole::Entity),
    field("Sector", FieldRole::Category),
    field("Category", FieldRole::Category),
    field("Country", FieldRole::Geography),
    field("Region", FieldRole::Geography),
    field("entityId", FieldRole::Identifier),
    field("score", FieldRole::Measure),
    field("previousScore", FieldRole::Measure),
    field("scoreChange", FieldRole::Measure),
    field("marketValue", FieldRole::Measure),
];

const SOCIAL_FIELDS: &[SemanticField] = &[
    field("Date", FieldRole::Time),
    field("Month", FieldRole::Time),
    field("Platform", FieldRole::Category),
    field("Author", FieldRole::Entity),
    field("Sentiment", FieldRole::Category),
    field("postId", FieldRole::Identifier),
    field("likes", FieldRole::Measure),
    field("shares", FieldRole::Measure),
    field("comments", FieldRole::Measure),
    field("impressions", FieldRole::Measure),
    field("engagementRate", FieldRole::Measure),
];

const FINANCE_FIELDS: &[SemanticField] = &[
    field("Date", FieldRole::Time),
    field("Month", FieldRole::Time),
    field("Account", FieldRole::Category),
    field("CostCenter", FieldRole::Entity),
    field("Region", FieldRole::Geography),
    field("recordId", FieldRole::Identifier),
    field("revenue", FieldRole::Measure),
    field("revenuePL", FieldRole::Measure),
    field("revenuePY", FieldRole::Measure),
    field("expenses", FieldRole::Measure),
    field("expensesPL", FieldRole::Measure),
    field("expensesPY", FieldRole::Measure),
];

/// Semantic field catalogue of a scenario
pub fn scenario_fields(scenario: Scenario) -> &'static [SemanticField] {
    match scenario {
        Scenario::Retail => RETAIL_FIELDS,
        Scenario::SaaS => SAAS_FIELDS,
        Scenario::HR => HR_FIELDS,
        Scenario::Logistics => LOGISTICS_FIELDS,
        Scenario::Portfolio => PORTFOLIO_FIELDS,
        Scenario::Social => SOCIAL_FIELDS,
        Scenario::Finance => FINANCE_FIELDS,
    }
}

/// Role of a field, if the scenario declares it
pub fn field_role(scenario: Scenario, field_name: &str) -> Option<FieldRole> {
    scenario_fields(scenario)
        .iter()
        .find(|f| f.name == field_name)
        .map(|f| f.role)
}

/// Substrings that mark a metric or column as a percentage
pub const PERCENT_KEYWORDS: &[&str] = &["rate", "percentage", "percent", "pct"];

/// Substrings that mark a metric or column as a money amount
pub const CURRENCY_KEYWORDS: &[&str] = &[
    "revenue", "profit", "cost", "salary", "mrr", "ltv", "arr", "arpu", "cac", "price", "amount",
    "budget", "value", "expenses",
];

/// Metric names rendered upper-case when humanized
const ACRONYMS: &[&str] = &["mrr", "arr", "ltv", "cac", "arpu", "pl", "py", "id"];

fn contains_keyword(name: &str, keywords: &[&str]) -> bool {
    let lower = name.to_lowercase();
    keywords.iter().any(|k| lower.contains(k))
}

pub fn is_percent_metric(name: &str) -> bool {
    contains_keyword(name, PERCENT_KEYWORDS)
}

pub fn is_currency_metric(name: &str) -> bool {
    contains_keyword(name, CURRENCY_KEYWORDS)
}

/// Upper-case the first character (`revenue` → `Revenue`)
pub fn capitalize_first(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Display label of a metric (`revenuePL` → `Revenue PL`, `mrr` → `MRR`)
pub fn humanize_metric(metric: &str) -> String {
    let mut words: Vec<String> = Vec::new();
    let mut current = String::new();
    let chars: Vec<char> = metric.chars().collect();
    for (i, &c) in chars.iter().enumerate() {
        if c == '_' || c == '-' || c == ' ' {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            continue;
        }
        let boundary = c.is_uppercase()
            && !current.is_empty()
            && (chars[i - 1].is_lowercase()
                || chars.get(i + 1).map(|n| n.is_lowercase()).unwrap_or(false));
        if boundary {
            words.push(std::mem::take(&mut current));
        }
        current.push(c);
    }
    if !current.is_empty() {
        words.push(current);
    }

    words
        .iter()
        .map(|w| {
            if ACRONYMS.contains(&w.to_lowercase().as_str()) {
                w.to_uppercase()
            } else {
                capitalize_first(w)
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_humanize_metric() {
        assert_eq!(humanize_metric("revenue"), "Revenue");
        assert_eq!(humanize_metric("revenuePL"), "Revenue PL");
        assert_eq!(humanize_metric("revenuePY"), "Revenue PY");
        assert_eq!(humanize_metric("mrr"), "MRR");
        assert_eq!(humanize_metric("engagementRate"), "Engagement Rate");
        assert_eq!(humanize_metric("delivery_days"), "Delivery Days");
    }

    #[test]
    fn test_keyword_predicates() {
        assert!(is_percent_metric("churnRate"));
        assert!(is_percent_metric("marginPercentage"));
        assert!(!is_percent_metric("rating"));
        assert!(is_currency_metric("Revenue"));
        assert!(is_currency_metric("mrr"));
        assert!(is_currency_metric("MarketValue"));
        assert!(!is_currency_metric("quantity"));
    }

    #[test]
    fn test_dimension_lookup_is_exact() {
        assert_eq!(
            lookup_dimension(Scenario::Retail, "Region"),
            Some(("Store", "Region"))
        );
        assert_eq!(
            lookup_dimension(Scenario::Retail, "Tier"),
            Some(("Customer", "Tier"))
        );
        assert_eq!(lookup_dimension(Scenario::Retail, "region"), None);
    }

    #[test]
    fn test_field_roles() {
        assert_eq!(
            field_role(Scenario::Retail, "Region"),
            Some(FieldRole::Geography)
        );
        assert_eq!(
            field_role(Scenario::Portfolio, "marketValue"),
            Some(FieldRole::Measure)
        );
        assert_eq!(field_role(Scenario::HR, "mrr"), None);
    }
}
