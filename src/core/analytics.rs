//! Supplementary audit analytics
//!
//! Price increases between two counts, net realizable value shortfalls,
//! stock in excess of period sales and slow-moving stock.

use crate::adapters::store::RecordStore;
use crate::core::query::{Filter, Pipeline};
use crate::domain::{
    fields, AuditError, CollectionName, Document, InventoryRecord, RecordField, Result,
};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

pub const NET_REALIZABLE_VALUE: &str = "netRealizableValue";
pub const LAST_SALE_DATE: &str = "lastSaleDate";

/// Date of a sale document
pub const SALE_DATE: &str = "saleDate";
const PRIOR: &str = "prior";

/// An item whose unit price rose between two counts
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceIncrease {
    pub item_id: String,
    pub description: String,
    pub prior_price: f64,
    pub current_price: f64,
    pub percent_increase: f64,
}

/// A record carried above its net realizable value
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NrvShortfall {
    pub item_id: String,
    pub description: String,
    pub unit_price: f64,
    pub net_realizable_value: f64,
    pub quantity: i64,

    /// `(unitPrice - NRV) × quantity`
    pub write_down: f64,
}

/// A record holding more units than were sold in the period
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExcessItem {
    pub item_id: String,
    pub description: String,
    pub on_hand: i64,

    /// Units sold within the period; 0 when the item had no sale
    pub sold: i64,

    /// `on_hand - sold`
    pub excess: i64,
}

/// A stocked record with no recent sale
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObsoleteItem {
    pub item_id: String,
    pub description: String,
    pub quantity: i64,
    pub last_sale_date: NaiveDate,
}

/// Slow-moving stock findings
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ObsoleteReport {
    /// Last sale before the cutoff
    pub obsolete: Vec<ObsoleteItem>,

    /// Item ids whose sale date is absent or not an ISO date
    pub undated: Vec<String>,
}

/// Parses the leading `YYYY-MM-DD` of a date or timestamp
pub fn parse_sale_date(raw: &str) -> Option<NaiveDate> {
    let day = raw.get(..10)?;
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

pub struct Analytics {
    store: Arc<dyn RecordStore>,
}

impl Analytics {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Items present in both counts whose current price exceeds
    /// `min_unit_cost` and rose by more than `min_percent`
    ///
    /// Items with a prior price of zero are skipped.
    pub async fn price_increases(
        &self,
        current: &CollectionName,
        prior: &CollectionName,
        min_unit_cost: f64,
        min_percent: f64,
    ) -> Result<Vec<PriceIncrease>> {
        let pipeline = Pipeline::new()
            .filter(Filter::exists(fields::ITEM_ID))
            .join(prior.as_str(), fields::ITEM_ID, fields::ITEM_ID, PRIOR)
            .unwind(PRIOR, false);
        let joined = self.store.aggregate(current, &pipeline).await?;

        let prior_price = |doc: &Document| doc.number_or_zero(&format!("{PRIOR}.{}", fields::UNIT_PRICE));
        let findings = joined
            .iter()
            .filter_map(|doc| {
                let record = InventoryRecord::from_document(doc);
                let before = prior_price(doc);
                if before == 0.0 || record.unit_price <= min_unit_cost {
                    return None;
                }
                let percent_increase = (record.unit_price - before) / before * 100.0;
                (percent_increase > min_percent).then(|| PriceIncrease {
                    item_id: record.item_id,
                    description: record.description,
                    prior_price: before,
                    current_price: record.unit_price,
                    percent_increase,
                })
            })
            .collect::<Vec<_>>();

        tracing::info!(
            current = %current,
            prior = %prior,
            matched = joined.len(),
            increases = findings.len(),
            "Price increase analysis completed"
        );
        Ok(findings)
    }

    /// Records whose unit price exceeds their net realizable value
    pub async fn nrv_shortfalls(&self, collection: &CollectionName) -> Result<Vec<NrvShortfall>> {
        let docs = self
            .store
            .find(collection, &Filter::exists(NET_REALIZABLE_VALUE))
            .await?;

        Ok(docs
            .iter()
            .filter_map(|doc| {
                let nrv = doc.number(NET_REALIZABLE_VALUE)?;
                let record = InventoryRecord::from_document(doc);
                (record.unit_price > nrv).then(|| NrvShortfall {
                    write_down: (record.unit_price - nrv) * record.quantity as f64,
                    item_id: record.item_id,
                    description: record.description,
                    unit_price: record.unit_price,
                    net_realizable_value: nrv,
                    quantity: record.quantity,
                })
            })
            .collect())
    }

    /// Inventory records whose on-hand quantity exceeds the units sold
    /// between `from` and `to`, inclusive
    ///
    /// Sales are documents of `sales` carrying `itemId`, `quantity` and a
    /// `saleDate`; those without a usable date are ignored. Inventory records
    /// without an item id are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`AuditError::InvalidInput`] when `from` is after `to`.
    pub async fn excess_inventory(
        &self,
        inventory: &CollectionName,
        sales: &CollectionName,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<ExcessItem>> {
        if from > to {
            return Err(AuditError::InvalidInput(format!(
                "sales period start {from} is after its end {to}"
            )));
        }

        let mut sold: HashMap<String, i64> = HashMap::new();
        let mut in_period = 0usize;
        for doc in self.store.find(sales, &Filter::exists(SALE_DATE)).await? {
            let Some(day) = doc.text(SALE_DATE).as_deref().and_then(parse_sale_date) else {
                continue;
            };
            if day < from || day > to {
                continue;
            }
            let sale = InventoryRecord::from_document(&doc);
            if sale.is_missing(RecordField::ItemId) {
                continue;
            }
            in_period += 1;
            *sold.entry(sale.item_id).or_default() += sale.quantity;
        }

        let findings: Vec<ExcessItem> = self
            .store
            .find(inventory, &Filter::exists(fields::QUANTITY))
            .await?
            .iter()
            .map(InventoryRecord::from_document)
            .filter(|record| !record.is_missing(RecordField::ItemId))
            .filter_map(|record| {
                let sold = sold.get(&record.item_id).copied().unwrap_or(0);
                (record.quantity > sold).then(|| ExcessItem {
                    excess: record.quantity - sold,
                    on_hand: record.quantity,
                    sold,
                    item_id: record.item_id,
                    description: record.description,
                })
            })
            .collect();

        tracing::info!(
            inventory = %inventory,
            sales = %sales,
            %from,
            %to,
            sales_in_period = in_period,
            excess = findings.len(),
            "Excess inventory analysis completed"
        );
        Ok(findings)
    }

    /// Records holding more than `min_quantity` units whose last sale
    /// predates `cutoff`
    pub async fn obsolete_stock(
        &self,
        collection: &CollectionName,
        min_quantity: i64,
        cutoff: NaiveDate,
    ) -> Result<ObsoleteReport> {
        let docs = self
            .store
            .find(collection, &Filter::gt(fields::QUANTITY, min_quantity as f64))
            .await?;

        let mut report = ObsoleteReport::default();
        for doc in &docs {
            let record = InventoryRecord::from_document(doc);
            match doc.text(LAST_SALE_DATE).as_deref().and_then(parse_sale_date) {
                Some(last_sale_date) if last_sale_date < cutoff => {
                    report.obsolete.push(ObsoleteItem {
                        item_id: record.item_id,
                        description: record.description,
                        quantity: record.quantity,
                        last_sale_date,
                    });
                }
                Some(_) => {}
                None => report.undated.push(record.item_id),
            }
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::MemoryStore;
    use serde_json::{json, Value};

    fn docs(values: Vec<Value>) -> Vec<Document> {
        values
            .into_iter()
            .map(|v| Document::from_value(v).unwrap())
            .collect()
    }

    fn name(s: &str) -> CollectionName {
        CollectionName::new(s).unwrap()
    }

    #[test]
    fn test_parse_sale_date() {
        assert_eq!(
            parse_sale_date("2023-04-05T10:00:00Z"),
            NaiveDate::from_ymd_opt(2023, 4, 5)
        );
        assert_eq!(parse_sale_date("05/04/2023"), None);
        assert_eq!(parse_sale_date("2023"), None);
    }

    #[tokio::test]
    async fn test_price_increases() {
        let store = Arc::new(MemoryStore::with_collections([
            (
                "CPU_2025",
                docs(vec![
                    json!({"itemId": "A", "description": "fast", "unitPrice": 120.0}),
                    json!({"itemId": "B", "unitPrice": 105.0}),
                    json!({"itemId": "C", "unitPrice": 500.0}),
                    json!({"itemId": "D", "unitPrice": 50.0}),
                    json!({"itemId": "E", "unitPrice": 300.0}),
                ]),
            ),
            (
                "CPU_2024",
                docs(vec![
                    json!({"itemId": "A", "unitPrice": 100.0}),
                    json!({"itemId": "B", "unitPrice": 100.0}),
                    json!({"itemId": "C", "unitPrice": 0.0}),
                    json!({"itemId": "D", "unitPrice": 10.0}),
                ]),
            ),
        ]));
        let analytics = Analytics::new(store);

        let found = analytics
            .price_increases(&name("CPU_2025"), &name("CPU_2024"), 100.0, 10.0)
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].item_id, "A");
        assert!((found[0].percent_increase - 20.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_nrv_shortfalls() {
        let store = Arc::new(MemoryStore::with_collections([(
            "GPU",
            docs(vec![
                json!({"itemId": "G1", "unitPrice": 900.0, "quantity": 2, "netRealizableValue": 700.0}),
                json!({"itemId": "G2", "unitPrice": 500.0, "quantity": 1, "netRealizableValue": 650.0}),
                json!({"itemId": "G3", "unitPrice": 500.0, "quantity": 1}),
            ]),
        )]));
        let found = Analytics::new(store).nrv_shortfalls(&name("GPU")).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].write_down, 400.0);
    }

    #[tokio::test]
    async fn test_obsolete_stock() {
        let store = Arc::new(MemoryStore::with_collections([(
            "Storage",
            docs(vec![
                json!({"itemId": "S1", "quantity": 50, "lastSaleDate": "2022-01-10"}),
                json!({"itemId": "S2", "quantity": 50, "lastSaleDate": "2024-09-01"}),
                json!({"itemId": "S3", "quantity": 50}),
                json!({"itemId": "S4", "quantity": 1, "lastSaleDate": "2020-01-01"}),
            ]),
        )]));
        let cutoff = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        let report = Analytics::new(store)
            .obsolete_stock(&name("Storage"), 10, cutoff)
            .await
            .unwrap();
        assert_eq!(report.obsolete.len(), 1);
        assert_eq!(report.obsolete[0].item_id, "S1");
        assert_eq!(report.undated, vec!["S3".to_string()]);
    }

    #[tokio::test]
    async fn test_excess_inventory_against_period_sales() {
        let store = Arc::new(MemoryStore::with_collections([
            (
                "Storage",
                docs(vec![
                    json!({"itemId": "S1", "description": "SSD", "quantity": 40}),
                    json!({"itemId": "S2", "quantity": 5}),
                    json!({"itemId": "S3", "quantity": 12}),
                    json!({"quantity": 99}),
                ]),
            ),
            (
                "Sales",
                docs(vec![
                    json!({"itemId": "S1", "quantity": 10, "saleDate": "2024-02-01"}),
                    json!({"itemId": "S1", "quantity": 5, "saleDate": "2024-03-15T09:30:00Z"}),
                    json!({"itemId": "S1", "quantity": 500, "saleDate": "2023-12-31"}),
                    json!({"itemId": "S2", "quantity": 8, "saleDate": "2024-01-01"}),
                    json!({"itemId": "S3", "quantity": 50, "saleDate": "sometime"}),
                ]),
            ),
        ]));
        let from = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let to = NaiveDate::from_ymd_opt(2024, 6, 30).unwrap();

        let found = Analytics::new(store)
            .excess_inventory(&name("Storage"), &name("Sales"), from, to)
            .await
            .unwrap();

        assert_eq!(found.len(), 2);
        let s1 = found.iter().find(|e| e.item_id == "S1").unwrap();
        assert_eq!((s1.on_hand, s1.sold, s1.excess), (40, 15, 25));
        assert_eq!(s1.description, "SSD");
        let s3 = found.iter().find(|e| e.item_id == "S3").unwrap();
        assert_eq!((s3.sold, s3.excess), (0, 12));
    }

    #[tokio::test]
    async fn test_excess_inventory_rejects_reversed_period() {
        let analytics = Analytics::new(Arc::new(MemoryStore::new()));
        let from = NaiveDate::from_ymd_opt(2024, 6, 30).unwrap();
        let to = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let result = analytics
            .excess_inventory(&name("Storage"), &name("Sales"), from, to)
            .await;
        assert!(matches!(result, Err(AuditError::InvalidInput(_))));
    }
}
