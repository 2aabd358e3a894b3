//! Dashboard metrics.
//!
//! A serializable snapshot of the farm used by the dashboard view and sent
//! as the metrics payload of the alerts request.

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate};
use serde::Serialize;

use crate::types::{
    Animal, FeedInventory, FinanceRecord, FinanceType, HealthRecord, LifeStage, Task,
};

/// Trailing window for settled finance and health activity.
pub const RECENT_WINDOW_DAYS: i64 = 30;

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FarmMetrics {
    pub as_of: NaiveDate,
    pub herd_size: usize,
    pub herd_by_status: BTreeMap<String, usize>,
    pub herd_by_stage: BTreeMap<String, usize>,
    /// Average weight of on-farm finishing animals, 0 when there are none.
    pub average_finishing_weight: f64,
    pub low_stock_feed: Vec<String>,
    pub pending_tasks: usize,
    pub overdue_tasks: usize,
    pub income_last_30_days: f64,
    pub expense_last_30_days: f64,
    pub health_events_last_30_days: usize,
}

impl FarmMetrics {
    pub fn collect(
        animals: &[Animal],
        tasks: &[Task],
        feed: &[FeedInventory],
        health: &[HealthRecord],
        finance: &[FinanceRecord],
        today: NaiveDate,
    ) -> Self {
        let window_start = today - Duration::days(RECENT_WINDOW_DAYS);
        let in_window = |date: NaiveDate| date > window_start && date <= today;

        let mut herd_by_status = BTreeMap::new();
        let mut herd_by_stage = BTreeMap::new();
        for animal in animals {
            *herd_by_status
                .entry(animal.status.as_str().to_string())
                .or_insert(0) += 1;
            *herd_by_stage
                .entry(animal.stage.as_str().to_string())
                .or_insert(0) += 1;
        }

        let finishing: Vec<f64> = animals
            .iter()
            .filter(|a| a.stage == LifeStage::Finishing && a.status.is_on_farm())
            .map(|a| a.weight)
            .collect();
        let average_finishing_weight = if finishing.is_empty() {
            0.0
        } else {
            finishing.iter().sum::<f64>() / finishing.len() as f64
        };

        let pending: Vec<&Task> = tasks.iter().filter(|t| !t.is_completed()).collect();
        let overdue_tasks = pending.iter().filter(|t| t.due_date < today).count();

        let mut income_last_30_days = 0.0;
        let mut expense_last_30_days = 0.0;
        for record in finance
            .iter()
            .filter(|r| r.is_settled() && in_window(r.date))
        {
            match record.record_type {
                FinanceType::Income => income_last_30_days += record.magnitude(),
                FinanceType::Expense => expense_last_30_days += record.magnitude(),
            }
        }

        Self {
            as_of: today,
            herd_size: animals.len(),
            herd_by_status,
            herd_by_stage,
            average_finishing_weight,
            low_stock_feed: feed
                .iter()
                .filter(|f| f.needs_reorder())
                .map(|f| f.name.clone())
                .collect(),
            pending_tasks: pending.len(),
            overdue_tasks,
            income_last_30_days,
            expense_last_30_days,
            health_events_last_30_days: health.iter().filter(|h| in_window(h.date)).count(),
        }
    }

    pub fn from_state(state: &crate::state::FarmState, today: NaiveDate) -> Self {
        Self::collect(
            state.animals(),
            state.tasks(),
            state.feed(),
            state.health(),
            state.finance(),
            today,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed;
    use crate::types::{AnimalStatus, FinanceStatus, TaskStatus};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 6, 1).unwrap()
    }

    #[test]
    fn test_collect_from_seed() {
        let t = today();
        let metrics = FarmMetrics::collect(
            &seed::sample_animals(t),
            &seed::sample_tasks(t),
            &seed::sample_feed(t),
            &seed::sample_health(t),
            &seed::sample_finance(t),
            t,
        );

        assert_eq!(metrics.herd_size, 6);
        assert_eq!(metrics.herd_by_stage["finishing"], 3);
        assert_eq!(metrics.herd_by_status[AnimalStatus::Sick.as_str()], 1);
        assert_eq!(metrics.low_stock_feed, vec!["Finisher Mash".to_string()]);
        assert_eq!(metrics.pending_tasks, 4);
        assert_eq!(metrics.overdue_tasks, 1);
        // Paid within the last 30 days: vet 180 (-20d) and fuel 120 (-10d).
        assert_eq!(metrics.expense_last_30_days, 300.0);
        assert_eq!(metrics.income_last_30_days, 0.0);
        // Treatment 2 days ago; the vaccination 30 days ago is on the boundary.
        assert_eq!(metrics.health_events_last_30_days, 1);
        assert!((metrics.average_finishing_weight - (96.5 + 82.0 + 78.0) / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_inputs() {
        let metrics = FarmMetrics::collect(&[], &[], &[], &[], &[], today());
        assert_eq!(metrics.herd_size, 0);
        assert_eq!(metrics.average_finishing_weight, 0.0);
        assert!(metrics.herd_by_status.is_empty());
    }

    #[test]
    fn test_completed_tasks_not_overdue() {
        let task = Task {
            due_date: today() - Duration::days(3),
            status: TaskStatus::Completed,
            ..Default::default()
        };
        let metrics = FarmMetrics::collect(&[], &[task], &[], &[], &[], today());
        assert_eq!(metrics.pending_tasks, 0);
        assert_eq!(metrics.overdue_tasks, 0);
    }

    #[test]
    fn test_finance_without_status_counts_as_settled() {
        let record = |amount: f64, status: Option<FinanceStatus>| FinanceRecord {
            date: today() - Duration::days(5),
            record_type: FinanceType::Income,
            amount,
            status,
            ..Default::default()
        };
        let finance = vec![
            record(100.0, None),
            record(40.0, Some(FinanceStatus::Paid)),
            record(900.0, Some(FinanceStatus::Scheduled)),
            record(700.0, Some(FinanceStatus::Projected)),
        ];
        let metrics = FarmMetrics::collect(&[], &[], &[], &[], &finance, today());
        assert_eq!(metrics.income_last_30_days, 140.0);
    }

    #[test]
    fn test_serializes_camel_case() {
        let metrics = FarmMetrics::collect(&[], &[], &[], &[], &[], today());
        let json = serde_json::to_value(&metrics).unwrap();
        assert!(json.get("lowStockFeed").is_some());
        assert_eq!(json["herdSize"], 0);
        assert_eq!(json["asOf"], "2026-06-01");
    }
}
