//! Data snapshot supplied by the data-generation collaborator
//!
//! Rows serialize with camelCase keys; each key is the `source_column` of the
//! matching schema column.

use super::enums::DataCollection;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleRow {
    pub id: String,
    pub date: NaiveDate,
    pub store_id: String,
    pub product_id: String,
    pub customer_id: String,
    pub quantity: i64,
    pub revenue: f64,
    #[serde(rename = "revenuePL")]
    pub revenue_pl: f64,
    #[serde(rename = "revenuePY")]
    pub revenue_py: f64,
    pub profit: f64,
    #[serde(rename = "profitPL")]
    pub profit_pl: f64,
    #[serde(rename = "profitPY")]
    pub profit_py: f64,
    pub cost: f64,
    pub discount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreRow {
    pub store_id: String,
    pub store_name: String,
    pub region: String,
    pub country: String,
    pub city: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRow {
    pub product_id: String,
    pub product_name: String,
    pub category: String,
    pub sub_category: String,
    pub price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerRow {
    pub customer_id: String,
    pub customer_name: String,
    pub segment: String,
    pub tier: String,
    pub country: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionRow {
    pub subscription_id: String,
    pub customer_id: String,
    pub date: NaiveDate,
    pub plan: String,
    pub region: String,
    pub mrr: f64,
    pub seats: i64,
    pub churned: bool,
    pub ltv: f64,
    pub cac: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeRow {
    pub employee_id: String,
    pub name: String,
    pub department: String,
    pub role: String,
    pub location: String,
    #[serde(default)]
    pub manager_id: Option<String>,
    pub hire_date: NaiveDate,
    pub salary: f64,
    pub rating: f64,
    pub tenure: f64,
    pub attrition: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShipmentRow {
    pub shipment_id: String,
    pub date: NaiveDate,
    pub origin: String,
    pub destination: String,
    pub carrier: String,
    pub status: String,
    pub weight: f64,
    pub cost: f64,
    pub delivery_days: i64,
    pub on_time: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioEntityRow {
    pub entity_id: String,
    pub entity_name: String,
    pub sector: String,
    pub country: String,
    pub region: String,
    pub market_value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControversyScoreRow {
    pub entity_id: String,
    pub date: NaiveDate,
    pub category: String,
    pub score: f64,
    pub previous_score: f64,
    pub score_change: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialPostRow {
    pub post_id: String,
    pub date: NaiveDate,
    pub platform: String,
    pub author: String,
    pub sentiment: String,
    pub likes: i64,
    pub shares: i64,
    pub comments: i64,
    pub impressions: i64,
    pub engagement_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinanceRow {
    pub record_id: String,
    pub date: NaiveDate,
    pub account: String,
    pub cost_center: String,
    pub region: String,
    pub revenue: f64,
    #[serde(rename = "revenuePL")]
    pub revenue_pl: f64,
    #[serde(rename = "revenuePY")]
    pub revenue_py: f64,
    pub expenses: f64,
    #[serde(rename = "expensesPL")]
    pub expenses_pl: f64,
    #[serde(rename = "expensesPY")]
    pub expenses_py: f64,
}

/// All row collections of one export call
///
/// The export engine only reads the snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DataSnapshot {
    pub sales: Vec<SaleRow>,
    pub stores: Vec<StoreRow>,
    pub products: Vec<ProductRow>,
    pub customers: Vec<CustomerRow>,
    pub subscriptions: Vec<SubscriptionRow>,
    pub employees: Vec<EmployeeRow>,
    pub shipments: Vec<ShipmentRow>,
    pub portfolio_entities: Vec<PortfolioEntityRow>,
    pub controversy_scores: Vec<ControversyScoreRow>,
    pub social_posts: Vec<SocialPostRow>,
    pub finance_records: Vec<FinanceRow>,
}

impl DataSnapshot {
    /// Number of rows in a collection
    pub fn len(&self, collection: DataCollection) -> usize {
        match collection {
            DataCollection::Sales => self.sales.len(),
            DataCollection::Stores => self.stores.len(),
            DataCollection::Products => self.products.len(),
            DataCollection::Customers => self.customers.len(),
            DataCollection::Subscriptions => self.subscriptions.len(),
            DataCollection::Employees => self.employees.len(),
            DataCollection::Shipments => self.shipments.len(),
            DataCollection::PortfolioEntities => self.portfolio_entities.len(),
            DataCollection::ControversyScores => self.controversy_scores.len(),
            DataCollection::SocialPosts => self.social_posts.len(),
            DataCollection::FinanceRecords => self.finance_records.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.sales.is_empty()
            && self.stores.is_empty()
            && self.products.is_empty()
            && self.customers.is_empty()
            && self.subscriptions.is_empty()
            && self.employees.is_empty()
            && self.shipments.is_empty()
            && self.portfolio_entities.is_empty()
            && self.controversy_scores.is_empty()
            && self.social_posts.is_empty()
            && self.finance_records.is_empty()
    }

    /// Visit every row of a collection as a JSON object, one row at a time.
    ///
    /// Returns the number of rows visited.
    pub fn visit_rows<F>(
        &self,
        collection: DataCollection,
        mut visit: F,
    ) -> Result<usize, serde_json::Error>
    where
        F: FnMut(&Map<String, Value>),
    {
        match collection {
            DataCollection::Sales => visit_all(&self.sales, &mut visit),
            DataCollection::Stores => visit_all(&self.stores, &mut visit),
            DataCollection::Products => visit_all(&self.products, &mut visit),
            DataCollection::Customers => visit_all(&self.customers, &mut visit),
            DataCollection::Subscriptions => visit_all(&self.subscriptions, &mut visit),
            DataCollection::Employees => visit_all(&self.employees, &mut visit),
            DataCollection::Shipments => visit_all(&self.shipments, &mut visit),
            DataCollection::PortfolioEntities => visit_all(&self.portfolio_entities, &mut visit),
            DataCollection::ControversyScores => visit_all(&self.controversy_scores, &mut visit),
            DataCollection::SocialPosts => visit_all(&self.social_posts, &mut visit),
            DataCollection::FinanceRecords => visit_all(&self.finance_records, &mut visit),
        }
    }
}

fn visit_all<T, F>(rows: &[T], visit: &mut F) -> Result<usize, serde_json::Error>
where
    T: Serialize,
    F: FnMut(&Map<String, Value>),
{
    let empty = Map::new();
    for row in rows {
        match serde_json::to_value(row)? {
            Value::Object(map) => visit(&map),
            _ => visit(&empty),
        }
    }
    Ok(rows.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_use_source_column_keys() {
        let snapshot = DataSnapshot {
            sales: vec![SaleRow {
                id: "S-1".to_string(),
                date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
                store_id: "ST-1".to_string(),
                product_id: "P-1".to_string(),
                customer_id: "C-1".to_string(),
                quantity: 2,
                revenue: 100.0,
                revenue_pl: 90.0,
                revenue_py: 80.0,
                profit: 20.0,
                profit_pl: 18.0,
                profit_py: 15.0,
                cost: 80.0,
                discount: 0.0,
            }],
            ..Default::default()
        };

        let mut keys = Vec::new();
        let count = snapshot
            .visit_rows(DataCollection::Sales, |row| {
                keys = row.keys().cloned().collect();
            })
            .unwrap();

        assert_eq!(count, 1);
        assert!(keys.contains(&"revenuePL".to_string()));
        assert!(keys.contains(&"storeId".to_string()));
        assert_eq!(snapshot.len(DataCollection::Sales), 1);
        assert_eq!(snapshot.len(DataCollection::Stores), 0);
    }

    #[test]
    fn test_snapshot_deserializes_partial_json() {
        let snapshot: DataSnapshot = serde_json::from_str(
            r#"{"shipments": [{"shipmentId": "SH-1", "date": "2024-01-05", "origin": "Lyon",
                "destination": "Oslo", "carrier": "DHL", "status": "Delivered", "weight": 12.5,
                "cost": 40.0, "deliveryDays": 3, "onTime": true}]}"#,
        )
        .unwrap();
        assert_eq!(snapshot.shipments.len(), 1);
        assert!(snapshot.sales.is_empty());
        assert!(!snapshot.is_empty());
    }
}
