//! Normalized inventory schema
//!
//! Three collections: items, categories and inventory facts. A fact refers to
//! its item by `itemId` and to its category by a structured
//! [`CategoryKey`]. Neither reference is enforced by the store; the
//! integrity checker reports violations.

use crate::domain::document::{Document, NOT_AVAILABLE};
use crate::domain::record::fields;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Field holding the structured category key on categories and facts
pub const CATEGORY_KEY: &str = "categoryKey";
/// Human-readable category identifier
pub const CATEGORY_ID: &str = "categoryId";
/// Item display name
pub const ITEM_NAME: &str = "name";
/// Join output holding the matched inventory fact
pub const INVENTORY_INFO: &str = "inventory_info";
/// Join output holding the matched categories
pub const CATEGORY_INFO: &str = "category_info";

/// Composite `(category, supplier)` key, compared by value
///
/// Stored as a JSON object so no separator character can make two distinct
/// pairs collide.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CategoryKey {
    pub category: String,
    pub supplier: String,
}

impl CategoryKey {
    pub fn new(category: impl Into<String>, supplier: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            supplier: supplier.into(),
        }
    }

    /// JSON form used in documents and join predicates
    pub fn to_value(&self) -> Value {
        serde_json::json!({
            "category": self.category,
            "supplier": self.supplier,
        })
    }

    /// Reads a key from `path`, if both parts are present
    pub fn from_document(doc: &Document, path: &str) -> Option<Self> {
        Some(Self {
            category: doc.text(&format!("{path}.category"))?,
            supplier: doc.text(&format!("{path}.supplier"))?,
        })
    }
}

impl fmt::Display for CategoryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}/{:?}", self.category, self.supplier)
    }
}

/// An item in the normalized schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub item_id: String,
    pub name: String,
}

impl Item {
    pub fn to_document(&self) -> Document {
        Document::new()
            .with(fields::ITEM_ID, self.item_id.clone())
            .with(ITEM_NAME, self.name.clone())
    }
}

/// A category keyed by `(category, supplier)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub key: CategoryKey,
    pub description: String,
}

impl Category {
    /// Builds a category with the default descriptive text
    pub fn new(key: CategoryKey) -> Self {
        let description = format!("{} items from {}", key.category, key.supplier);
        Self { key, description }
    }

    pub fn to_document(&self) -> Document {
        Document::new()
            .with(CATEGORY_KEY, self.key.to_value())
            .with(CATEGORY_ID, self.key.to_string())
            .with(fields::CATEGORY, self.key.category.clone())
            .with(fields::SUPPLIER, self.key.supplier.clone())
            .with(fields::DESCRIPTION, self.description.clone())
    }
}

/// Stock position of one item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryFact {
    pub item_id: String,
    pub quantity: i64,
    pub unit_price: f64,
    pub audit_date: String,
    pub category_key: CategoryKey,
}

impl InventoryFact {
    pub fn to_document(&self) -> Document {
        Document::new()
            .with(fields::ITEM_ID, self.item_id.clone())
            .with(fields::QUANTITY, self.quantity)
            .with(fields::UNIT_PRICE, self.unit_price)
            .with(fields::AUDIT_DATE, self.audit_date.clone())
            .with(CATEGORY_KEY, self.category_key.to_value())
    }
}

/// One row of the `Item ⟕ InventoryFact ⟕ Category` view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinedRow {
    pub item_id: String,
    pub name: String,
    pub quantity: i64,
    pub unit_price: f64,
    pub extended_value: f64,
    pub category: String,
    pub supplier: String,
    pub category_description: String,
    pub audit_date: Option<String>,
    /// False when the item had no inventory fact
    pub has_fact: bool,
}

impl JoinedRow {
    /// Reads a row produced by the normalized aggregation pipeline
    pub fn from_document(doc: &Document) -> Self {
        let fact = |field: &str| format!("{INVENTORY_INFO}.{field}");
        let category = |field: &str| format!("{CATEGORY_INFO}.0.{field}");

        let quantity = doc
            .integer(&fact(fields::QUANTITY))
            .or_else(|| doc.number(&fact(fields::QUANTITY)).map(|q| q.trunc() as i64))
            .unwrap_or(0);
        let unit_price = doc.number_or_zero(&fact(fields::UNIT_PRICE));
        let extended_value = doc
            .number(fields::EXTENDED_VALUE)
            .unwrap_or(unit_price * quantity as f64);

        Self {
            item_id: doc.text_or_na(fields::ITEM_ID),
            name: doc.text_or_na(ITEM_NAME),
            quantity,
            unit_price,
            extended_value,
            category: doc.text_or_na(&category(fields::CATEGORY)),
            supplier: doc.text_or_na(&category(fields::SUPPLIER)),
            category_description: doc.text_or_na(&category(fields::DESCRIPTION)),
            audit_date: doc.text(&fact(fields::AUDIT_DATE)),
            has_fact: doc.has(INVENTORY_INFO),
        }
    }

    /// Whether the category join found no match
    pub fn category_missing(&self) -> bool {
        self.category == NOT_AVAILABLE && self.supplier == NOT_AVAILABLE
    }
}
