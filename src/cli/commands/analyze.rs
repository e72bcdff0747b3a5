//! Analyze command implementation
//!
//! Supplementary reports: price increases between two counts, net
//! realizable value shortfalls, excess and slow-moving stock.

use super::common::{open_runner, report_error};
use crate::core::analytics::Analytics;
use crate::core::integrity::format_currency;
use crate::domain::{AuditError, CollectionName};
use chrono::NaiveDate;
use clap::{Args, Subcommand};

/// Arguments for the analyze command
#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    #[command(subcommand)]
    pub report: AnalyzeReport,
}

/// Available reports
#[derive(Subcommand, Debug)]
pub enum AnalyzeReport {
    /// Items whose unit price rose against a prior count
    PriceIncrease {
        /// Current count collection
        #[arg(long)]
        current: String,

        /// Prior count collection
        #[arg(long)]
        prior: String,

        /// Only items whose current unit price exceeds this
        #[arg(long, default_value_t = 100.0)]
        min_unit_cost: f64,

        /// Only increases above this percentage
        #[arg(long, default_value_t = 10.0)]
        min_percent: f64,
    },

    /// Records carried above their net realizable value
    Nrv {
        #[arg(long)]
        collection: String,
    },

    /// Records holding more units than were sold in a period
    Excess {
        /// Inventory collection
        #[arg(long)]
        collection: String,

        /// Sales collection (itemId, quantity, saleDate)
        #[arg(long)]
        sales: String,

        /// Period start (YYYY-MM-DD), inclusive
        #[arg(long)]
        from: NaiveDate,

        /// Period end (YYYY-MM-DD), inclusive
        #[arg(long)]
        to: NaiveDate,
    },

    /// Stocked records whose last sale predates a cutoff
    Obsolete {
        #[arg(long)]
        collection: String,

        /// Only records holding more than this many units
        #[arg(long, default_value_t = 0)]
        min_quantity: i64,

        /// Cutoff date (YYYY-MM-DD)
        #[arg(long)]
        before: NaiveDate,
    },
}

fn collection(name: &str) -> Result<CollectionName, AuditError> {
    CollectionName::new(name).map_err(AuditError::InvalidInput)
}

impl AnalyzeArgs {
    /// Execute the analyze command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let runner = match open_runner(config_path).await {
            Ok(r) => r,
            Err(code) => return Ok(code),
        };
        let analytics = Analytics::new(runner.store().clone());

        match self.run(&analytics).await {
            Ok(code) => Ok(code),
            Err(e) => Ok(report_error("Analysis failed", &e)),
        }
    }

    async fn run(&self, analytics: &Analytics) -> Result<i32, AuditError> {
        match &self.report {
            AnalyzeReport::PriceIncrease {
                current,
                prior,
                min_unit_cost,
                min_percent,
            } => {
                let found = analytics
                    .price_increases(
                        &collection(current)?,
                        &collection(prior)?,
                        *min_unit_cost,
                        *min_percent,
                    )
                    .await?;
                println!("📈 {} price increase(s), {prior} → {current}", found.len());
                for p in &found {
                    println!(
                        "  {:<16} {:>12} → {:>12}  {:>7.1}%  {}",
                        p.item_id,
                        format_currency(p.prior_price),
                        format_currency(p.current_price),
                        p.percent_increase,
                        p.description
                    );
                }
            }
            AnalyzeReport::Nrv { collection: name } => {
                let found = analytics.nrv_shortfalls(&collection(name)?).await?;
                let total: f64 = found.iter().map(|s| s.write_down).sum();
                println!("📉 {} record(s) above net realizable value", found.len());
                for s in &found {
                    println!(
                        "  {:<16} price {:>12}  NRV {:>12}  qty {:>6}  write-down {:>12}",
                        s.item_id,
                        format_currency(s.unit_price),
                        format_currency(s.net_realizable_value),
                        s.quantity,
                        format_currency(s.write_down)
                    );
                }
                println!("  Total write-down: {}", format_currency(total));
            }
            AnalyzeReport::Excess {
                collection: name,
                sales,
                from,
                to,
            } => {
                let found = analytics
                    .excess_inventory(&collection(name)?, &collection(sales)?, *from, *to)
                    .await?;
                let total: i64 = found.iter().map(|e| e.excess).sum();
                println!(
                    "📦 {} record(s) above units sold {from} → {to}",
                    found.len()
                );
                for e in &found {
                    println!(
                        "  {:<16} on hand {:>6}  sold {:>6}  excess {:>6}  {}",
                        e.item_id, e.on_hand, e.sold, e.excess, e.description
                    );
                }
                println!("  Total excess units: {total}");
            }
            AnalyzeReport::Obsolete {
                collection: name,
                min_quantity,
                before,
            } => {
                let report = analytics
                    .obsolete_stock(&collection(name)?, *min_quantity, *before)
                    .await?;
                println!(
                    "🕰️  {} record(s) with no sale since {before}",
                    report.obsolete.len()
                );
                for item in &report.obsolete {
                    println!(
                        "  {:<16} qty {:>6}  last sale {}  {}",
                        item.item_id, item.quantity, item.last_sale_date, item.description
                    );
                }
                if !report.undated.is_empty() {
                    println!(
                        "  ⚠️  {} record(s) without a usable sale date: {}",
                        report.undated.len(),
                        report.undated.join(", ")
                    );
                }
            }
        }
        Ok(0)
    }
}
