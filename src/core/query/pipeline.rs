//! Multi-stage aggregation pipelines
//!
//! A [`Pipeline`] is an ordered list of named [`Stage`]s. The in-memory
//! executor runs it directly; the PostgreSQL backend translates it into a
//! chain of CTEs. Joins are left outer: a document with no match receives an
//! empty array.

use super::filter::Filter;

/// One pipeline stage
#[derive(Debug, Clone, PartialEq)]
pub enum Stage {
    /// Keep documents matching the predicate
    Filter(Filter),
    /// Attach every document of `from` whose `foreign_field` equals this
    /// document's `local_field`, as an array under `as_field`
    Join {
        from: String,
        local_field: String,
        foreign_field: String,
        as_field: String,
    },
    /// Emit one document per element of the top-level array `path`
    Unwind { path: String, preserve_empty: bool },
    /// `output = left × right`, absent operands read as 0
    Multiply {
        output: String,
        left: String,
        right: String,
    },
    /// Keep only the listed top-level fields
    Project(Vec<String>),
    /// Single document `{output: Σ field}`; nothing for empty input
    GroupSum { output: String, field: String },
    /// Single document `{output: n}`; nothing for empty input
    Count { output: String },
    /// Uniform random subset of at most `k` documents
    Sample(usize),
    /// First `n` documents in input order
    Limit(usize),
}

/// Ordered list of stages, built fluently
///
/// # Examples
///
/// ```
/// use stockaudit::core::query::{Filter, Pipeline};
///
/// let total = Pipeline::new()
///     .filter(Filter::exists("unitPrice").and(Filter::exists("quantity")))
///     .multiply("value", "unitPrice", "quantity")
///     .group_sum("total", "value");
/// assert_eq!(total.stages().len(), 3);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pipeline {
    stages: Vec<Stage>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stage(mut self, stage: Stage) -> Self {
        self.stages.push(stage);
        self
    }

    pub fn filter(self, filter: Filter) -> Self {
        self.stage(Stage::Filter(filter))
    }

    pub fn join(
        self,
        from: impl Into<String>,
        local_field: impl Into<String>,
        foreign_field: impl Into<String>,
        as_field: impl Into<String>,
    ) -> Self {
        self.stage(Stage::Join {
            from: from.into(),
            local_field: local_field.into(),
            foreign_field: foreign_field.into(),
            as_field: as_field.into(),
        })
    }

    pub fn unwind(self, path: impl Into<String>, preserve_empty: bool) -> Self {
        self.stage(Stage::Unwind {
            path: path.into(),
            preserve_empty,
        })
    }

    pub fn multiply(
        self,
        output: impl Into<String>,
        left: impl Into<String>,
        right: impl Into<String>,
    ) -> Self {
        self.stage(Stage::Multiply {
            output: output.into(),
            left: left.into(),
            right: right.into(),
        })
    }

    pub fn project<S: AsRef<str>>(self, fields: &[S]) -> Self {
        self.stage(Stage::Project(
            fields.iter().map(|f| f.as_ref().to_string()).collect(),
        ))
    }

    pub fn group_sum(self, output: impl Into<String>, field: impl Into<String>) -> Self {
        self.stage(Stage::GroupSum {
            output: output.into(),
            field: field.into(),
        })
    }

    pub fn count(self, output: impl Into<String>) -> Self {
        self.stage(Stage::Count {
            output: output.into(),
        })
    }

    pub fn sample(self, k: usize) -> Self {
        self.stage(Stage::Sample(k))
    }

    pub fn limit(self, n: usize) -> Self {
        self.stage(Stage::Limit(n))
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Collections read by join stages, deduplicated in first-use order
    pub fn joined_collections(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for stage in &self.stages {
            if let Stage::Join { from, .. } = stage {
                if !names.contains(&from.as_str()) {
                    names.push(from);
                }
            }
        }
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_order() {
        let p = Pipeline::new()
            .join("items", "itemId", "itemId", "item_info")
            .filter(Filter::empty_array("item_info"))
            .count("orphans");
        assert!(matches!(p.stages()[0], Stage::Join { .. }));
        assert!(matches!(p.stages()[1], Stage::Filter(_)));
        assert!(matches!(p.stages()[2], Stage::Count { .. }));
    }

    #[test]
    fn test_joined_collections_dedup() {
        let p = Pipeline::new()
            .join("inventory", "itemId", "itemId", "a")
            .join("categories", "a.categoryKey", "categoryKey", "b")
            .join("inventory", "itemId", "itemId", "c");
        assert_eq!(p.joined_collections(), vec!["inventory", "categories"]);
    }
}
