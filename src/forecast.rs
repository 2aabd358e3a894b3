//! 90-day cash-flow forecast.
//!
//! Inputs are the scheduled finance records plus one synthesized sale per
//! market-ready animal. Items are bucketed by whole-day offset from `today`
//! into three 30-day windows; anything past 90 days is reported separately
//! and never reaches a bucket. Overdue scheduled items (negative offset) are
//! still expected cash and land in the first window.
//!
//! The projected sale uses a flat per-head price and a fixed 30-day horizon.
//! It deliberately does not consult the slaughter optimizer.

use chrono::{Duration, NaiveDate};
use serde::Serialize;

use crate::types::{Animal, Enterprise, FinanceRecord, FinanceStatus, FinanceType};

pub const BUCKET_DAYS: i64 = 30;
pub const BUCKET_COUNT: usize = 3;
pub const HORIZON_DAYS: i64 = BUCKET_DAYS * BUCKET_COUNT as i64;
/// Days from today at which a market-ready animal is assumed sold.
pub const PROJECTED_SALE_DAYS: i64 = 30;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForecastParams {
    pub starting_balance: f64,
    /// Flat sale price assumed for every market-ready animal.
    pub sale_price_per_head: f64,
    /// Shortage is flagged when the running balance drops below this.
    pub shortage_threshold: f64,
}

impl Default for ForecastParams {
    fn default() -> Self {
        Self {
            starting_balance: 0.0,
            sale_price_per_head: 250.0,
            shortage_threshold: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastItem {
    pub source_id: String,
    pub date: NaiveDate,
    pub offset_days: i64,
    pub kind: FinanceType,
    /// Always positive; direction comes from `kind`.
    pub amount: f64,
    pub description: String,
    /// Synthesized by the forecast rather than entered by a user.
    pub projected: bool,
}

impl ForecastItem {
    fn from_record(record: &FinanceRecord, today: NaiveDate) -> Self {
        Self {
            source_id: record.id.clone(),
            date: record.date,
            offset_days: (record.date - today).num_days(),
            kind: record.record_type,
            amount: record.magnitude(),
            description: record.description.clone(),
            projected: record.status == Some(FinanceStatus::Projected),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastBucket {
    /// Exclusive lower bound in days (the first bucket also takes overdue items).
    pub start_day: i64,
    /// Inclusive upper bound in days.
    pub end_day: i64,
    pub income: f64,
    pub expense: f64,
    pub net: f64,
    pub item_count: usize,
}

impl ForecastBucket {
    fn empty(index: usize) -> Self {
        let start_day = BUCKET_DAYS * index as i64;
        Self {
            start_day,
            end_day: start_day + BUCKET_DAYS,
            income: 0.0,
            expense: 0.0,
            net: 0.0,
            item_count: 0,
        }
    }

    fn add(&mut self, item: &ForecastItem) {
        match item.kind {
            FinanceType::Income => self.income += item.amount,
            FinanceType::Expense => self.expense += item.amount,
        }
        self.net = self.income - self.expense;
        self.item_count += 1;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BalancePoint {
    pub offset_days: i64,
    pub date: NaiveDate,
    pub net: f64,
    pub balance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CashFlowForecast {
    /// Every forecast input, date-sorted.
    pub items: Vec<ForecastItem>,
    pub buckets: Vec<ForecastBucket>,
    /// Items dated past the 90-day horizon.
    pub beyond_horizon: Vec<ForecastItem>,
    /// Today, +30, +60, +90.
    pub balance_series: Vec<BalancePoint>,
    pub lowest_balance: f64,
    pub shortage: bool,
}

/// Bucket index for an offset, or `None` past the horizon.
fn bucket_index(offset_days: i64) -> Option<usize> {
    if offset_days > HORIZON_DAYS {
        return None;
    }
    if offset_days <= BUCKET_DAYS {
        return Some(0);
    }
    Some(((offset_days - 1) / BUCKET_DAYS) as usize)
}

/// One projected sale per finishing, active animal, dated `PROJECTED_SALE_DAYS` out.
pub fn projected_sales(
    animals: &[Animal],
    sale_price_per_head: f64,
    today: NaiveDate,
) -> Vec<FinanceRecord> {
    let sale_date = today + Duration::days(PROJECTED_SALE_DAYS);
    animals
        .iter()
        .filter(|a| a.is_market_candidate())
        .map(|a| FinanceRecord {
            id: format!("projected-{}", a.id),
            date: sale_date,
            record_type: FinanceType::Income,
            category: "Livestock Sales".to_string(),
            amount: sale_price_per_head,
            description: format!("Projected sale: {}", a.tag),
            status: Some(FinanceStatus::Projected),
            enterprise: Some(Enterprise::Livestock),
            allocation_id: None,
            batch_id: None,
        })
        .collect()
}

/// Split items into the three windows plus the past-horizon remainder.
pub fn partition_items(items: &[ForecastItem]) -> (Vec<ForecastBucket>, Vec<ForecastItem>) {
    let mut buckets: Vec<ForecastBucket> = (0..BUCKET_COUNT).map(ForecastBucket::empty).collect();
    let mut beyond = Vec::new();

    for item in items {
        match bucket_index(item.offset_days) {
            Some(i) => buckets[i].add(item),
            None => beyond.push(item.clone()),
        }
    }

    (buckets, beyond)
}

pub fn forecast_cash_flow(
    finance: &[FinanceRecord],
    animals: &[Animal],
    params: &ForecastParams,
    today: NaiveDate,
) -> CashFlowForecast {
    let projected = projected_sales(animals, params.sale_price_per_head, today);

    let mut items: Vec<ForecastItem> = finance
        .iter()
        .filter(|r| r.is_scheduled())
        .chain(projected.iter())
        .map(|r| ForecastItem::from_record(r, today))
        .collect();
    items.sort_by_key(|i| i.date);

    let (buckets, beyond_horizon) = partition_items(&items);

    let mut balance_series = Vec::with_capacity(BUCKET_COUNT + 1);
    let mut balance = params.starting_balance;
    balance_series.push(BalancePoint {
        offset_days: 0,
        date: today,
        net: 0.0,
        balance,
    });
    for bucket in &buckets {
        balance += bucket.net;
        balance_series.push(BalancePoint {
            offset_days: bucket.end_day,
            date: today + Duration::days(bucket.end_day),
            net: bucket.net,
            balance,
        });
    }

    let lowest_balance = balance_series
        .iter()
        .map(|p| p.balance)
        .fold(f64::INFINITY, f64::min);
    let shortage = lowest_balance < params.shortage_threshold;

    if shortage {
        log::info!(
            "Cash shortage forecast: lowest balance {:.2} below threshold {:.2}",
            lowest_balance,
            params.shortage_threshold
        );
    }

    CashFlowForecast {
        items,
        buckets,
        beyond_horizon,
        balance_series,
        lowest_balance,
        shortage,
    }
}
