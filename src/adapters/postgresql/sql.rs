//! Filter and pipeline translation to PostgreSQL
//!
//! Documents live in the `documents` table as JSONB `body` values. Filters
//! become boolean expressions over a body column; pipelines become a chain of
//! CTEs, each exposing `(body, seq)`, where `$1` is the source collection.
//! Identifiers and literals that come from callers are always escaped.

use crate::core::query::{Filter, Pipeline, Stage};
use crate::domain::StoreError;
use serde_json::Value;

/// Quotes a string as a SQL literal
pub fn literal(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

/// Dotted path as a `text[]` literal for the `#>` operators
pub fn path_literal(path: &str) -> String {
    let elements: Vec<String> = path
        .split('.')
        .map(|segment| {
            format!(
                "\"{}\"",
                segment.replace('\\', "\\\\").replace('"', "\\\"")
            )
        })
        .collect();
    literal(&format!("{{{}}}", elements.join(",")))
}

/// JSON value at `path`, as `jsonb`
fn value_at(column: &str, path: &str) -> String {
    format!("({column} #> {})", path_literal(path))
}

/// Numeric value at `path`, 0 when absent or not a number
fn number_at(column: &str, path: &str) -> String {
    let value = value_at(column, path);
    format!(
        "(CASE WHEN jsonb_typeof({value}) = 'number' THEN ({column} #>> {})::double precision ELSE 0 END)",
        path_literal(path)
    )
}

fn float_literal(n: f64) -> Result<String, StoreError> {
    if !n.is_finite() {
        return Err(StoreError::PipelineFailed(format!(
            "cannot compare against non-finite bound {n}"
        )));
    }
    Ok(format!("{n:?}::double precision"))
}

fn jsonb_literal(value: &Value) -> String {
    format!("{}::jsonb", literal(&value.to_string()))
}

/// Boolean SQL expression for `filter` over the JSONB `column`
pub fn filter_sql(filter: &Filter, column: &str) -> Result<String, StoreError> {
    Ok(match filter {
        Filter::All => "TRUE".to_string(),
        Filter::Exists(path) => format!(
            "(COALESCE(jsonb_typeof({}), 'null') <> 'null')",
            value_at(column, path)
        ),
        Filter::Missing(path) => format!(
            "(COALESCE(jsonb_typeof({}), 'null') = 'null')",
            value_at(column, path)
        ),
        Filter::Gt(path, bound) => {
            format!("({} > {})", number_at(column, path), float_literal(*bound)?)
        }
        Filter::Lt(path, bound) => {
            format!("({} < {})", number_at(column, path), float_literal(*bound)?)
        }
        Filter::Eq(path, value) => {
            format!("({} = {})", value_at(column, path), jsonb_literal(value))
        }
        Filter::EmptyArray(path) => format!(
            "(COALESCE(NULLIF({}, 'null'::jsonb), '[]'::jsonb) = '[]'::jsonb)",
            value_at(column, path)
        ),
        Filter::And(filters) => {
            if filters.is_empty() {
                "TRUE".to_string()
            } else {
                let parts = filters
                    .iter()
                    .map(|f| filter_sql(f, column))
                    .collect::<Result<Vec<_>, _>>()?;
                format!("({})", parts.join(" AND "))
            }
        }
    })
}

fn top_level(what: &str, field: &str) -> Result<(), StoreError> {
    if field.is_empty() || field.contains('.') {
        return Err(StoreError::PipelineFailed(format!(
            "{what} must be a top-level field, got '{field}'"
        )));
    }
    Ok(())
}

fn stage_sql(stage: &Stage, prev: &str) -> Result<String, StoreError> {
    Ok(match stage {
        Stage::Filter(filter) => format!(
            "SELECT p.body, p.seq FROM {prev} p WHERE {}",
            filter_sql(filter, "p.body")?
        ),

        Stage::Join {
            from,
            local_field,
            foreign_field,
            as_field,
        } => {
            top_level("join output", as_field)?;
            let local = value_at("p.body", local_field);
            let foreign = value_at("f.body", foreign_field);
            format!(
                "SELECT p.body || jsonb_build_object({as_lit}, COALESCE((\
                 SELECT jsonb_agg(f.body ORDER BY f.seq) FROM documents f \
                 WHERE f.collection = {from_lit} AND {foreign} = {local} \
                 AND jsonb_typeof({local}) <> 'null'), '[]'::jsonb)) AS body, p.seq \
                 FROM {prev} p",
                as_lit = literal(as_field),
                from_lit = literal(from),
            )
        }

        Stage::Unwind {
            path,
            preserve_empty,
        } => {
            top_level("unwind path", path)?;
            let key = literal(path);
            let elements = format!(
                "(CASE WHEN jsonb_typeof(p.body -> {key}) IS NULL \
                 OR jsonb_typeof(p.body -> {key}) = 'null' THEN '[]'::jsonb \
                 WHEN jsonb_typeof(p.body -> {key}) = 'array' THEN p.body -> {key} \
                 ELSE jsonb_build_array(p.body -> {key}) END)"
            );
            if *preserve_empty {
                format!(
                    "SELECT CASE WHEN e.elem IS NULL THEN p.body - {key} \
                     ELSE p.body || jsonb_build_object({key}, e.elem) END AS body, p.seq \
                     FROM {prev} p LEFT JOIN LATERAL jsonb_array_elements({elements}) AS e(elem) ON TRUE"
                )
            } else {
                format!(
                    "SELECT p.body || jsonb_build_object({key}, e.elem) AS body, p.seq \
                     FROM {prev} p CROSS JOIN LATERAL jsonb_array_elements({elements}) AS e(elem)"
                )
            }
        }

        Stage::Multiply {
            output,
            left,
            right,
        } => {
            top_level("multiply output", output)?;
            format!(
                "SELECT p.body || jsonb_build_object({}, {} * {}) AS body, p.seq FROM {prev} p",
                literal(output),
                number_at("p.body", left),
                number_at("p.body", right),
            )
        }

        Stage::Project(fields) => {
            let keys = if fields.is_empty() {
                "NULL".to_string()
            } else {
                fields.iter().map(|f| literal(f)).collect::<Vec<_>>().join(", ")
            };
            format!(
                "SELECT (SELECT COALESCE(jsonb_object_agg(kv.key, kv.value), '{{}}'::jsonb) \
                 FROM jsonb_each(p.body) AS kv WHERE kv.key IN ({keys})) AS body, p.seq \
                 FROM {prev} p"
            )
        }

        Stage::GroupSum { output, field } => format!(
            "SELECT jsonb_build_object({}, SUM({})) AS body, 0::bigint AS seq \
             FROM {prev} p HAVING COUNT(*) > 0",
            literal(output),
            number_at("p.body", field),
        ),

        Stage::Count { output } => format!(
            "SELECT jsonb_build_object({}, COUNT(*)) AS body, 0::bigint AS seq \
             FROM {prev} p HAVING COUNT(*) > 0",
            literal(output),
        ),

        Stage::Sample(k) => format!(
            "SELECT p.body, p.seq FROM {prev} p ORDER BY random() LIMIT {k}"
        ),

        Stage::Limit(n) => format!("SELECT p.body, p.seq FROM {prev} p ORDER BY p.seq LIMIT {n}"),
    })
}

/// Full query for `pipeline`; bind the source collection as `$1`
pub fn pipeline_sql(pipeline: &Pipeline) -> Result<String, StoreError> {
    let mut ctes = vec![
        "s0 AS (SELECT body, seq FROM documents WHERE collection = $1)".to_string(),
    ];
    for (i, stage) in pipeline.stages().iter().enumerate() {
        let prev = format!("s{i}");
        ctes.push(format!("s{} AS ({})", i + 1, stage_sql(stage, &prev)?));
    }
    Ok(format!(
        "WITH {} SELECT body FROM s{} ORDER BY seq",
        ctes.join(", "),
        pipeline.stages().len()
    ))
}

/// `SELECT` of matching documents; bind the collection as `$1`
pub fn find_sql(filter: &Filter) -> Result<String, StoreError> {
    Ok(format!(
        "SELECT body FROM documents WHERE collection = $1 AND {} ORDER BY seq",
        filter_sql(filter, "body")?
    ))
}

/// `COUNT(*)` of matching documents; bind the collection as `$1`
pub fn count_sql(filter: &Filter) -> Result<String, StoreError> {
    Ok(format!(
        "SELECT COUNT(*) FROM documents WHERE collection = $1 AND {}",
        filter_sql(filter, "body")?
    ))
}

/// Random sample of matching documents; bind collection `$1` and limit `$2`
pub fn sample_sql(filter: &Filter) -> Result<String, StoreError> {
    Ok(format!(
        "SELECT body FROM documents WHERE collection = $1 AND {} ORDER BY random() LIMIT $2",
        filter_sql(filter, "body")?
    ))
}
