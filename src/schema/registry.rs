//! Star schema of every scenario
//!
//! Schemas are built once and shared for the lifetime of the process. The
//! fact table is always the first table of a schema.

use crate::models::{
    CrossFilteringBehavior, DataCollection, PbiColumn, PbiDataType, PbiRelationship, PbiSchema,
    PbiTable, Scenario, SummarizeBy,
};
use once_cell::sync::Lazy;

fn key(name: &str, source: &str) -> PbiColumn {
    PbiColumn::key(name, source, PbiDataType::String)
}

fn text(name: &str, source: &str) -> PbiColumn {
    PbiColumn::new(name, source, PbiDataType::String)
}

fn date(name: &str, source: &str) -> PbiColumn {
    PbiColumn::new(name, source, PbiDataType::DateTime)
}

fn number(name: &str, source: &str) -> PbiColumn {
    PbiColumn::new(name, source, PbiDataType::Double)
}

fn whole(name: &str, source: &str) -> PbiColumn {
    PbiColumn::new(name, source, PbiDataType::Int64)
}

fn flag(name: &str, source: &str) -> PbiColumn {
    PbiColumn::new(name, source, PbiDataType::Boolean)
}

fn average(column: PbiColumn) -> PbiColumn {
    column.with_summarize_by(SummarizeBy::Average)
}

fn customer_dimension() -> PbiTable {
    PbiTable::new(
        "Customer",
        "Customer dimension",
        vec![
            key("CustomerId", "customerId"),
            text("CustomerName", "customerName"),
            text("Segment", "segment"),
            text("Tier", "tier"),
            text("Country", "country"),
        ],
    )
    .with_source(DataCollection::Customers)
}

fn retail() -> PbiSchema {
    let sales = PbiTable::new(
        "Sales",
        "Sales transactions with plan and prior-year comparisons",
        vec![
            key("SaleId", "id"),
            date("Date", "date"),
            key("StoreId", "storeId"),
            key("ProductId", "productId"),
            key("CustomerId", "customerId"),
            whole("Quantity", "quantity"),
            number("Revenue", "revenue"),
            number("RevenuePL", "revenuePL"),
            number("RevenuePY", "revenuePY"),
            number("Profit", "profit"),
            number("ProfitPL", "profitPL"),
            number("ProfitPY", "profitPY"),
            number("Cost", "cost"),
            average(number("Discount", "discount")),
        ],
    )
    .with_source(DataCollection::Sales);

    let store = PbiTable::new(
        "Store",
        "Store dimension",
        vec![
            key("StoreId", "storeId"),
            text("StoreName", "storeName"),
            text("Region", "region"),
            text("Country", "country"),
            text("City", "city"),
        ],
    )
    .with_source(DataCollection::Stores);

    let product = PbiTable::new(
        "Product",
        "Product dimension",
        vec![
            key("ProductId", "productId"),
            text("ProductName", "productName"),
            text("Category", "category"),
            text("SubCategory", "subCategory"),
            average(number("Price", "price")),
        ],
    )
    .with_source(DataCollection::Products);

    PbiSchema {
        tables: vec![sales, store, product, customer_dimension()],
        relationships: vec![
            PbiRelationship::many_to_one("Sales", "StoreId", "Store", "StoreId"),
            PbiRelationship::many_to_one("Sales", "ProductId", "Product", "ProductId"),
            PbiRelationship::many_to_one("Sales", "CustomerId", "Customer", "CustomerId"),
        ],
    }
}

fn saas() -> PbiSchema {
    let subscriptions = PbiTable::new(
        "Subscriptions",
        "Monthly subscription snapshots",
        vec![
            key("SubscriptionId", "subscriptionId"),
            key("CustomerId", "customerId"),
            date("Date", "date"),
            text("Plan", "plan"),
            text("Region", "region"),
            number("MRR", "mrr"),
            whole("Seats", "seats"),
            flag("Churned", "churned"),
            average(number("LTV", "ltv")),
            average(number("CAC", "cac")),
        ],
    )
    .with_source(DataCollection::Subscriptions);

    PbiSchema {
        tables: vec![subscriptions, customer_dimension()],
        relationships: vec![PbiRelationship::many_to_one(
            "Subscriptions",
            "CustomerId",
            "Customer",
            "CustomerId",
        )],
    }
}

fn hr() -> PbiSchema {
    let employees = PbiTable::new(
        "Employees",
        "Employee roster",
        vec![
            key("EmployeeId", "employeeId"),
            text("Name", "name"),
            text("Department", "department"),
            text("Role", "role"),
            text("Location", "location"),
            key("ManagerId", "managerId"),
            date("HireDate", "hireDate"),
            number("Salary", "salary"),
            average(number("Rating", "rating")),
            average(number("Tenure", "tenure")),
            flag("Attrition", "attrition"),
        ],
    )
    .with_source(DataCollection::Employees);

    PbiSchema {
        tables: vec![employees],
        relationships: Vec::new(),
    }
}

fn logistics() -> PbiSchema {
    let shipments = PbiTable::new(
        "Shipments",
        "Shipments with carrier and delivery performance",
        vec![
            key("ShipmentId", "shipmentId"),
            date("Date", "date"),
            text("Origin", "origin"),
            text("Destination", "destination"),
            text("Carrier", "carrier"),
            text("Status", "status"),
            number("Weight", "weight"),
            number("Cost", "cost"),
            average(whole("DeliveryDays", "deliveryDays")),
            flag("OnTime", "onTime"),
        ],
    )
    .with_source(DataCollection::Shipments);

    PbiSchema {
        tables: vec![shipments],
        relationships: Vec::new(),
    }
}

fn portfolio() -> PbiSchema {
    let scores = PbiTable::new(
        "ControversyScores",
        "Controversy score observations per entity",
        vec![
            key("EntityId", "entityId"),
            date("Date", "date"),
            text("Category", "category"),
            average(number("Score", "score")),
            average(number("PreviousScore", "previousScore")),
            number("ScoreChange", "scoreChange"),
        ],
    )
    .with_source(DataCollection::ControversyScores);

    let entities = PbiTable::new(
        "PortfolioEntities",
        "Portfolio holdings",
        vec![
            key("EntityId", "entityId"),
            text("EntityName", "entityName"),
            text("Sector", "sector"),
            text("Country", "country"),
            text("Region", "region"),
            number("MarketValue", "marketValue"),
        ],
    )
    .with_source(DataCollection::PortfolioEntities);

    // Market value lives on the dimension and must follow score filters.
    PbiSchema {
        tables: vec![scores, entities],
        relationships: vec![
            PbiRelationship::many_to_one(
                "ControversyScores",
                "EntityId",
                "PortfolioEntities",
                "EntityId",
            )
            .with_cross_filtering(CrossFilteringBehavior::BothDirections),
        ],
    }
}

fn social() -> PbiSchema {
    let posts = PbiTable::new(
        "SocialPosts",
        "Social media posts and engagement",
        vec![
            key("PostId", "postId"),
            date("Date", "date"),
            text("Platform", "platform"),
            text("Author", "author"),
            text("Sentiment", "sentiment"),
            whole("Likes", "likes"),
            whole("Shares", "shares"),
            whole("Comments", "comments"),
            whole("Impressions", "impressions"),
            average(number("EngagementRate", "engagementRate")),
        ],
    )
    .with_source(DataCollection::SocialPosts);

    PbiSchema {
        tables: vec![posts],
        relationships: Vec::new(),
    }
}

fn finance() -> PbiSchema {
    let finance = PbiTable::new(
        "Finance",
        "General ledger with plan and prior-year figures",
        vec![
            key("RecordId", "recordId"),
            date("Date", "date"),
            text("Account", "account"),
            text("CostCenter", "costCenter"),
            text("Region", "region"),
            number("Revenue", "revenue"),
            number("RevenuePL", "revenuePL"),
            number("RevenuePY", "revenuePY"),
            number("Expenses", "expenses"),
            number("ExpensesPL", "expensesPL"),
            number("ExpensesPY", "expensesPY"),
        ],
    )
    .with_source(DataCollection::FinanceRecords);

    PbiSchema {
        tables: vec![finance],
        relationships: Vec::new(),
    }
}

static RETAIL: Lazy<PbiSchema> = Lazy::new(retail);
static SAAS: Lazy<PbiSchema> = Lazy::new(saas);
static HR: Lazy<PbiSchema> = Lazy::new(hr);
static LOGISTICS: Lazy<PbiSchema> = Lazy::new(logistics);
static PORTFOLIO: Lazy<PbiSchema> = Lazy::new(portfolio);
static SOCIAL: Lazy<PbiSchema> = Lazy::new(social);
static FINANCE: Lazy<PbiSchema> = Lazy::new(finance);

/// Star schema of a scenario
///
/// # Example
///
/// ```rust
/// use phantom_pbi_export::models::Scenario;
/// use phantom_pbi_export::schema::get_schema;
///
/// let schema = get_schema(Scenario::Retail);
/// assert!(schema.table("Sales").is_some());
/// ```
pub fn get_schema(scenario: Scenario) -> &'static PbiSchema {
    match scenario {
        Scenario::Retail => &RETAIL,
        Scenario::SaaS => &SAAS,
        Scenario::HR => &HR,
        Scenario::Logistics => &LOGISTICS,
        Scenario::Portfolio => &PORTFOLIO,
        Scenario::Social => &SOCIAL,
        Scenario::Finance => &FINANCE,
    }
}

/// Name of the scenario's fact table
pub fn get_fact_table(scenario: Scenario) -> &'static str {
    match scenario {
        Scenario::Retail => "Sales",
        Scenario::SaaS => "Subscriptions",
        Scenario::HR => "Employees",
        Scenario::Logistics => "Shipments",
        Scenario::Portfolio => "ControversyScores",
        Scenario::Social => "SocialPosts",
        Scenario::Finance => "Finance",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fact_table_is_first_table() {
        for scenario in Scenario::ALL {
            let schema = get_schema(scenario);
            assert_eq!(schema.tables[0].name, get_fact_table(scenario));
        }
    }

    #[test]
    fn test_relationship_endpoints_exist() {
        for scenario in Scenario::ALL {
            let schema = get_schema(scenario);
            for rel in &schema.relationships {
                assert!(
                    schema.has_column(&rel.from_table, &rel.from_column),
                    "{}: {}",
                    scenario,
                    rel.label()
                );
                assert!(
                    schema.has_column(&rel.to_table, &rel.to_column),
                    "{}: {}",
                    scenario,
                    rel.label()
                );
            }
        }
    }

    #[test]
    fn test_every_table_has_a_source() {
        for scenario in Scenario::ALL {
            for table in &get_schema(scenario).tables {
                assert!(table.source.is_some(), "{} has no source", table.name);
            }
        }
    }

    #[test]
    fn test_retail_relationships_are_many_to_one() {
        let schema = get_schema(Scenario::Retail);
        assert_eq!(schema.relationships.len(), 3);
        assert!(schema.relationships.iter().all(|r| r.from_table == "Sales"));
    }
}
