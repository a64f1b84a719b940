//! PBIR `visual.json` documents

use super::projection::{FieldRef, Projection, ProjectionBuilder};
use crate::models::{DashboardItem, PbiVisualConfig, VisualFamily};
use serde_json::{Map, Value, json};

pub const VISUAL_CONTAINER_SCHEMA: &str = "https://developer.microsoft.com/json-schemas/fabric/item/report/definition/visualContainer/1.3.0/schema.json";

/// Field expression of a projection, `{"Column": ...}` or `{"Measure": ...}`
pub fn field_expression(field: &FieldRef) -> Value {
    let kind = if field.is_measure() { "Measure" } else { "Column" };
    json!({
        kind: {
            "Expression": { "SourceRef": { "Entity": field.entity() } },
            "Property": field.property()
        }
    })
}

fn literal(value: &str) -> Value {
    json!({ "expr": { "Literal": { "Value": value } } })
}

/// Title text as a DAX-style quoted literal
fn text_literal(text: &str) -> Value {
    literal(&format!("'{}'", text.replace('\'', "''")))
}

fn query_state(projections: &[Projection]) -> Value {
    let mut state = Map::new();
    for projection in projections {
        let entry = state
            .entry(projection.role)
            .or_insert_with(|| json!({ "projections": [] }));
        if let Some(list) = entry.get_mut("projections").and_then(Value::as_array_mut) {
            list.push(json!({
                "field": field_expression(&projection.field),
                "queryRef": projection.field.query_ref(),
                "nativeQueryRef": projection.field.property()
            }));
        }
    }
    Value::Object(state)
}

/// Static formatting objects per visual family
fn formatting_objects(family: VisualFamily) -> Value {
    match family {
        VisualFamily::CategoryValue | VisualFamily::Waterfall => json!({
            "labels": [{ "properties": { "show": literal("true") } }]
        }),
        VisualFamily::LegendValue => json!({
            "legend": [{ "properties": { "show": literal("true"), "position": literal("'Right'") } }]
        }),
        VisualFamily::Table | VisualFamily::Matrix => json!({
            "columnHeaders": [{ "properties": { "wordWrap": literal("true") } }]
        }),
        VisualFamily::Slicer => json!({
            "data": [{ "properties": { "mode": literal("'Basic'") } }]
        }),
        _ => json!({}),
    }
}

/// Build the `visual.json` of one item
///
/// `index` is the item's position on the page and sets z-order and tab order.
pub fn visual_json(
    object_name: &str,
    item: &DashboardItem,
    config: &PbiVisualConfig,
    index: usize,
    projections: &ProjectionBuilder<'_>,
) -> Value {
    let order = index * 1000;
    let position = json!({
        "x": config.position.x,
        "y": config.position.y,
        "z": order,
        "height": config.position.height,
        "width": config.position.width,
        "tabOrder": order
    });

    let mut query = Map::new();
    query.insert(
        "queryState".to_string(),
        query_state(&projections.projections(item)),
    );
    if let Some((field, _)) = projections.top_n_sort(item) {
        query.insert(
            "sortDefinition".to_string(),
            json!({
                "sort": [{ "field": field_expression(&field), "direction": "Descending" }],
                "isDefaultSort": false
            }),
        );
    }

    let props = serde_json::to_string(&config.phantom_props).unwrap_or_default();
    json!({
        "$schema": VISUAL_CONTAINER_SCHEMA,
        "name": object_name,
        "position": position,
        "visual": {
            "visualType": config.visual_type,
            "query": Value::Object(query),
            "objects": formatting_objects(item.kind.family()),
            "visualContainerObjects": {
                "title": [{
                    "properties": {
                        "show": literal("true"),
                        "text": text_literal(&config.title)
                    }
                }]
            },
            "drillFilterOtherVisuals": true
        },
        "annotations": [
            { "name": "phantomOriginalType", "value": config.original_type },
            { "name": "phantomProps", "value": props }
        ]
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dax::MeasureGenerator;
    use crate::layout::LayoutConverter;
    use crate::models::{GridLayout, Scenario};
    use crate::schema::FieldMapper;

    #[test]
    fn test_bar_chart_visual() {
        let items = vec![DashboardItem::new(
            "b1",
            "bar",
            "Revenue by Region",
            GridLayout::new(0, 0, 6, 8),
            json!({"dimension": "Region", "metric": "revenue", "topN": 5}),
        )];
        let measures = MeasureGenerator::default().generate(&items, Scenario::Retail);
        let builder = ProjectionBuilder::new(FieldMapper::new(Scenario::Retail), &measures, &items);
        let config = LayoutConverter::default().convert(&items[0]);

        let visual = visual_json("abc", &items[0], &config, 2, &builder);

        assert_eq!(visual["name"], "abc");
        assert_eq!(visual["position"]["width"], 640.0);
        assert_eq!(visual["position"]["z"], 2000);
        assert_eq!(visual["visual"]["visualType"], "clusteredBarChart");
        let state = &visual["visual"]["query"]["queryState"];
        assert_eq!(state["Category"]["projections"][0]["queryRef"], "Store.Region");
        assert_eq!(
            state["Category"]["projections"][0]["field"]["Column"]["Expression"]["SourceRef"]["Entity"],
            "Store"
        );
        assert_eq!(
            state["Y"]["projections"][0]["field"]["Measure"]["Property"],
            "Total Revenue"
        );
        assert_eq!(
            visual["visual"]["query"]["sortDefinition"]["sort"][0]["direction"],
            "Descending"
        );
        assert_eq!(
            visual["visual"]["visualContainerObjects"]["title"][0]["properties"]["text"]["expr"]["Literal"]["Value"],
            "'Revenue by Region'"
        );
        assert_eq!(visual["annotations"][0]["value"], "bar");
    }

    #[test]
    fn test_card_without_sort() {
        let items = vec![DashboardItem::new(
            "c1",
            "card",
            "Headcount",
            GridLayout::new(0, 0, 2, 2),
            json!({"metric": "employeeId", "operation": "count"}),
        )];
        let measures = MeasureGenerator::default().generate(&items, Scenario::HR);
        let builder = ProjectionBuilder::new(FieldMapper::new(Scenario::HR), &measures, &items);
        let config = LayoutConverter::default().convert(&items[0]);

        let visual = visual_json("n", &items[0], &config, 0, &builder);
        assert!(visual["visual"]["query"].get("sortDefinition").is_none());
        assert_eq!(
            visual["visual"]["query"]["queryState"]["Values"]["projections"][0]["queryRef"],
            "Employees.Count Employee ID"
        );
    }
}
