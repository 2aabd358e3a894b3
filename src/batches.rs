//! Batch and cost-center profitability.
//!
//! Two groupings over the finance ledger with different inclusion rules:
//! - by batch id: every record sharing the batch, whatever its status, since a
//!   batch is judged on its committed costs as well as settled ones
//! - by enterprise (with allocation ids nested inside): settled records only
//!
//! Margin is profit / income, 0 when there is no income.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::types::{Enterprise, FinanceRecord, FinanceType};

/// Allocation key for records booked to an enterprise without an allocation.
pub const UNALLOCATED: &str = "unallocated";

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CostCenterSummary {
    pub key: String,
    pub income: f64,
    pub expense: f64,
    pub profit: f64,
    /// Ratio, not percent. See `margin_percent`.
    pub margin: f64,
    pub expense_by_category: BTreeMap<String, f64>,
    pub record_count: usize,
}

impl CostCenterSummary {
    fn new(key: &str) -> Self {
        Self {
            key: key.to_string(),
            ..Default::default()
        }
    }

    fn add(&mut self, record: &FinanceRecord) {
        match record.record_type {
            FinanceType::Income => self.income += record.magnitude(),
            FinanceType::Expense => {
                self.expense += record.magnitude();
                *self
                    .expense_by_category
                    .entry(record.category.clone())
                    .or_insert(0.0) += record.magnitude();
            }
        }
        self.record_count += 1;
        self.profit = self.income - self.expense;
        self.margin = if self.income == 0.0 {
            0.0
        } else {
            self.profit / self.income
        };
    }

    pub fn margin_percent(&self) -> f64 {
        self.margin * 100.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnterpriseSummary {
    pub enterprise: Enterprise,
    pub totals: CostCenterSummary,
    /// One entry per allocation id, sorted by id.
    pub allocations: Vec<CostCenterSummary>,
}

fn batch_key(record: &FinanceRecord) -> Option<&str> {
    record
        .batch_id
        .as_deref()
        .map(str::trim)
        .filter(|b| !b.is_empty())
}

/// Per-batch totals, sorted by batch id. Records without a batch are skipped.
pub fn aggregate_by_batch(finance: &[FinanceRecord]) -> Vec<CostCenterSummary> {
    let mut groups: BTreeMap<&str, CostCenterSummary> = BTreeMap::new();
    for record in finance {
        if let Some(batch) = batch_key(record) {
            groups
                .entry(batch)
                .or_insert_with(|| CostCenterSummary::new(batch))
                .add(record);
        }
    }
    groups.into_values().collect()
}

/// Totals for a single batch, or `None` when no record carries it.
pub fn summarize_batch(finance: &[FinanceRecord], batch_id: &str) -> Option<CostCenterSummary> {
    let batch_id = batch_id.trim();
    let mut summary: Option<CostCenterSummary> = None;
    for record in finance.iter().filter(|r| batch_key(r) == Some(batch_id)) {
        summary
            .get_or_insert_with(|| CostCenterSummary::new(batch_id))
            .add(record);
    }
    summary
}

/// Settled totals per enterprise with allocation breakdown, in enterprise order.
/// Records without an enterprise count toward `General`.
pub fn aggregate_by_enterprise(finance: &[FinanceRecord]) -> Vec<EnterpriseSummary> {
    let mut groups: BTreeMap<Enterprise, (CostCenterSummary, BTreeMap<String, CostCenterSummary>)> =
        BTreeMap::new();

    for record in finance.iter().filter(|r| r.is_settled()) {
        let enterprise = record.enterprise.unwrap_or_default();
        let (totals, allocations) = groups.entry(enterprise).or_insert_with(|| {
            (CostCenterSummary::new(enterprise.as_str()), BTreeMap::new())
        });
        totals.add(record);

        let allocation = record
            .allocation_id
            .as_deref()
            .filter(|a| !a.trim().is_empty())
            .unwrap_or(UNALLOCATED)
            .to_string();
        allocations
            .entry(allocation.clone())
            .or_insert_with(|| CostCenterSummary::new(&allocation))
            .add(record);
    }

    groups
        .into_iter()
        .map(|(enterprise, (totals, allocations))| EnterpriseSummary {
            enterprise,
            totals,
            allocations: allocations.into_values().collect(),
        })
        .collect()
}

/// Whole-farm settled totals, used when no grouping key is selected.
pub fn overall_summary(finance: &[FinanceRecord]) -> CostCenterSummary {
    let mut summary = CostCenterSummary::new("all");
    for record in finance.iter().filter(|r| r.is_settled()) {
        summary.add(record);
    }
    summary
}
