//! In-memory pipeline executor
//!
//! Runs a [`Pipeline`] over already-loaded documents. Used directly by the
//! memory store and as the default `aggregate` for any backend that has no
//! native pipeline support.

use super::pipeline::{Pipeline, Stage};
use crate::domain::{Document, StoreError};
use rand::seq::index;
use serde_json::Value;
use std::collections::BTreeMap;

/// Executes `pipeline` over `source`, resolving joins against `foreign`
///
/// A join against a collection missing from `foreign` matches nothing.
pub fn execute(
    pipeline: &Pipeline,
    source: Vec<Document>,
    foreign: &BTreeMap<String, Vec<Document>>,
) -> Result<Vec<Document>, StoreError> {
    let mut docs = source;
    for stage in pipeline.stages() {
        docs = apply_stage(stage, docs, foreign)?;
    }
    Ok(docs)
}

fn apply_stage(
    stage: &Stage,
    docs: Vec<Document>,
    foreign: &BTreeMap<String, Vec<Document>>,
) -> Result<Vec<Document>, StoreError> {
    match stage {
        Stage::Filter(filter) => Ok(docs.into_iter().filter(|d| filter.matches(d)).collect()),

        Stage::Join {
            from,
            local_field,
            foreign_field,
            as_field,
        } => {
            ensure_top_level("join output", as_field)?;
            let others = foreign.get(from).map(Vec::as_slice).unwrap_or(&[]);
            Ok(docs
                .into_iter()
                .map(|mut doc| {
                    let matched: Vec<Value> = match doc.get_path(local_field) {
                        Some(local) => others
                            .iter()
                            .filter(|o| o.get_path(foreign_field) == Some(local))
                            .map(|o| o.clone().into_value())
                            .collect(),
                        None => Vec::new(),
                    };
                    doc.set(as_field.clone(), Value::Array(matched));
                    doc
                })
                .collect())
        }

        Stage::Unwind {
            path,
            preserve_empty,
        } => {
            ensure_top_level("unwind path", path)?;
            let mut out = Vec::with_capacity(docs.len());
            for mut doc in docs {
                let elements = match doc.remove(path) {
                    Some(Value::Array(items)) => items,
                    Some(Value::Null) | None => Vec::new(),
                    Some(single) => vec![single],
                };
                if elements.is_empty() {
                    if *preserve_empty {
                        out.push(doc);
                    }
                    continue;
                }
                for element in elements {
                    let mut copy = doc.clone();
                    copy.set(path.clone(), element);
                    out.push(copy);
                }
            }
            Ok(out)
        }

        Stage::Multiply {
            output,
            left,
            right,
        } => {
            ensure_top_level("multiply output", output)?;
            Ok(docs
                .into_iter()
                .map(|mut doc| {
                    let product = doc.number_or_zero(left) * doc.number_or_zero(right);
                    doc.set(output.clone(), number_value(product));
                    doc
                })
                .collect())
        }

        Stage::Project(fields) => Ok(docs
            .into_iter()
            .map(|mut doc| {
                doc.retain_keys(fields);
                doc
            })
            .collect()),

        Stage::GroupSum { output, field } => {
            if docs.is_empty() {
                return Ok(Vec::new());
            }
            let total: f64 = docs.iter().map(|d| d.number_or_zero(field)).sum();
            Ok(vec![Document::new().with(output.clone(), number_value(total))])
        }

        Stage::Count { output } => {
            if docs.is_empty() {
                return Ok(Vec::new());
            }
            Ok(vec![Document::new().with(output.clone(), docs.len() as u64)])
        }

        Stage::Sample(k) => {
            if docs.len() <= *k {
                return Ok(docs);
            }
            let mut rng = rand::thread_rng();
            let picked = index::sample(&mut rng, docs.len(), *k);
            let mut slots: Vec<Option<Document>> = docs.into_iter().map(Some).collect();
            Ok(picked.iter().filter_map(|i| slots[i].take()).collect())
        }

        Stage::Limit(n) => Ok(docs.into_iter().take(*n).collect()),
    }
}

fn ensure_top_level(what: &str, field: &str) -> Result<(), StoreError> {
    if field.is_empty() || field.contains('.') {
        return Err(StoreError::PipelineFailed(format!(
            "{what} must be a top-level field, got '{field}'"
        )));
    }
    Ok(())
}

fn number_value(n: f64) -> Value {
    serde_json::Number::from_f64(n)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::query::Filter;
    use serde_json::json;
    use std::collections::HashSet;

    fn docs(values: Vec<Value>) -> Vec<Document> {
        values
            .into_iter()
            .map(|v| Document::from_value(v).unwrap())
            .collect()
    }

    fn foreign(name: &str, values: Vec<Value>) -> BTreeMap<String, Vec<Document>> {
        let mut map = BTreeMap::new();
        map.insert(name.to_string(), docs(values));
        map
    }

    #[test]
    fn test_total_value_pipeline() {
        let source = docs(vec![
            json!({"unitPrice": 2.0, "quantity": 3}),
            json!({"unitPrice": 10.0, "quantity": 1}),
            json!({"unitPrice": 5.0}),
        ]);
        let pipeline = Pipeline::new()
            .filter(Filter::exists("unitPrice").and(Filter::exists("quantity")))
            .multiply("value", "unitPrice", "quantity")
            .project(&["value"])
            .group_sum("total", "value");
        let out = execute(&pipeline, source, &BTreeMap::new()).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].number("total"), Some(16.0));
    }

    #[test]
    fn test_group_and_count_emit_nothing_for_empty_input() {
        let sum = Pipeline::new().group_sum("total", "value");
        assert!(execute(&sum, Vec::new(), &BTreeMap::new()).unwrap().is_empty());
        let count = Pipeline::new().count("n");
        assert!(execute(&count, Vec::new(), &BTreeMap::new()).unwrap().is_empty());
    }

    #[test]
    fn test_orphan_count() {
        let facts = docs(vec![
            json!({"itemId": "A"}),
            json!({"itemId": "B"}),
            json!({"itemId": "C"}),
        ]);
        let items = foreign("items", vec![json!({"itemId": "A"}), json!({"itemId": "B"})]);
        let pipeline = Pipeline::new()
            .join("items", "itemId", "itemId", "item_info")
            .filter(Filter::empty_array("item_info"))
            .count("orphans");
        let out = execute(&pipeline, facts, &items).unwrap();
        assert_eq!(out[0].integer("orphans"), Some(1));
    }

    #[test]
    fn test_left_outer_join_and_preserving_unwind() {
        let items = docs(vec![json!({"itemId": "A"}), json!({"itemId": "Z"})]);
        let inventory = foreign(
            "inventory",
            vec![json!({"itemId": "A", "quantity": 2}), json!({"itemId": "A", "quantity": 5})],
        );
        let pipeline = Pipeline::new()
            .join("inventory", "itemId", "itemId", "inventory_info")
            .unwind("inventory_info", true);
        let out = execute(&pipeline, items, &inventory).unwrap();
        assert_eq!(out.len(), 3);
        let z = out.iter().find(|d| d.text("itemId").as_deref() == Some("Z")).unwrap();
        assert!(!z.has("inventory_info"));
    }

    #[test]
    fn test_unwind_without_preserve_drops_unmatched() {
        let items = docs(vec![json!({"itemId": "A", "tags": []}), json!({"itemId": "B", "tags": [1, 2]})]);
        let out = execute(&Pipeline::new().unwind("tags", false), items, &BTreeMap::new()).unwrap();
        assert_eq!(out.len(), 2);
        assert!(out.iter().all(|d| d.text("itemId").as_deref() == Some("B")));
    }

    #[test]
    fn test_join_on_nested_structured_key() {
        let rows = docs(vec![json!({"fact": {"categoryKey": {"category": "CPU", "supplier": "AMD"}}})]);
        let categories = foreign(
            "categories",
            vec![
                json!({"categoryKey": {"category": "CPU", "supplier": "AMD"}, "description": "hit"}),
                json!({"categoryKey": {"category": "CPU", "supplier": "Intel"}, "description": "miss"}),
            ],
        );
        let pipeline = Pipeline::new().join("categories", "fact.categoryKey", "categoryKey", "category_info");
        let out = execute(&pipeline, rows, &categories).unwrap();
        assert_eq!(out[0].array("category_info").len(), 1);
        assert_eq!(out[0].text("category_info.0.description").as_deref(), Some("hit"));
    }

    #[test]
    fn test_sample_stage_bounds() {
        let source = docs((0..20).map(|i| json!({"n": i})).collect());
        let out = execute(&Pipeline::new().sample(5), source.clone(), &BTreeMap::new()).unwrap();
        assert_eq!(out.len(), 5);
        let distinct: HashSet<i64> = out.iter().filter_map(|d| d.integer("n")).collect();
        assert_eq!(distinct.len(), 5);

        let all = execute(&Pipeline::new().sample(50), source, &BTreeMap::new()).unwrap();
        assert_eq!(all.len(), 20);
    }

    #[test]
    fn test_limit_keeps_input_order() {
        let source = docs((0..10).map(|i| json!({"n": i})).collect());
        let p = Pipeline::new().filter(Filter::gt("n", 2.0)).limit(3);
        let out = execute(&p, source, &BTreeMap::new()).unwrap();
        let seen: Vec<i64> = out.iter().filter_map(|d| d.integer("n")).collect();
        assert_eq!(seen, vec![3, 4, 5]);
    }

    #[test]
    fn test_nested_output_rejected() {
        let p = Pipeline::new().multiply("a.b", "x", "y");
        let err = execute(&p, docs(vec![json!({})]), &BTreeMap::new()).unwrap_err();
        assert!(matches!(err, StoreError::PipelineFailed(_)));
    }
}
