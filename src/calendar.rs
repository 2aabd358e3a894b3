//! Calendar aggregation.
//!
//! Folds task due dates, animal timeline entries and upcoming finance records
//! into one date-sorted event stream. Pure: the same collections and `today`
//! always produce the same list, and nothing is mutated or persisted.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::types::{Animal, EventColor, FinanceRecord, FinanceType, Task, TaskPriority};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    Task,
    Animal,
    Finance,
}

/// How the event is drawn. One tag per source-specific condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Presentation {
    PriorityHigh,
    PriorityMedium,
    PriorityLow,
    /// Completed tasks, whatever their priority.
    Muted,
    TimelineBlue,
    TimelineGreen,
    TimelineAmber,
    TimelineRed,
    TimelinePurple,
    TimelineGray,
    Income,
    Expense,
}

impl Presentation {
    fn for_task(task: &Task) -> Self {
        if task.is_completed() {
            return Presentation::Muted;
        }
        match task.priority {
            TaskPriority::High => Presentation::PriorityHigh,
            TaskPriority::Medium => Presentation::PriorityMedium,
            TaskPriority::Low => Presentation::PriorityLow,
        }
    }

    fn for_timeline(color: EventColor) -> Self {
        match color {
            EventColor::Blue => Presentation::TimelineBlue,
            EventColor::Green => Presentation::TimelineGreen,
            EventColor::Amber => Presentation::TimelineAmber,
            EventColor::Red => Presentation::TimelineRed,
            EventColor::Purple => Presentation::TimelinePurple,
            EventColor::Gray => Presentation::TimelineGray,
        }
    }

    fn for_finance(record: &FinanceRecord) -> Self {
        match record.record_type {
            FinanceType::Income => Presentation::Income,
            FinanceType::Expense => Presentation::Expense,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    /// Id of the source record (task, timeline entry or finance record).
    pub id: String,
    pub title: String,
    pub date: NaiveDate,
    pub source_type: SourceType,
    /// Task category, animal tag, or finance direction.
    pub sub_type: String,
    pub presentation: Presentation,
}

/// Whether a finance record belongs on the calendar: scheduled, or not yet past.
fn finance_on_calendar(record: &FinanceRecord, today: NaiveDate) -> bool {
    record.is_scheduled() || record.date >= today
}

/// Build the merged event stream, sorted by date. Ties keep input order:
/// tasks, then each animal's timeline in collection order, then finance.
pub fn build_calendar(
    tasks: &[Task],
    animals: &[Animal],
    finance: &[FinanceRecord],
    today: NaiveDate,
) -> Vec<CalendarEvent> {
    let timeline_len: usize = animals.iter().map(|a| a.timeline.len()).sum();
    let mut events: Vec<CalendarEvent> =
        Vec::with_capacity(tasks.len() + timeline_len + finance.len());

    for task in tasks {
        events.push(CalendarEvent {
            id: task.id.clone(),
            title: task.title.clone(),
            date: task.due_date,
            source_type: SourceType::Task,
            sub_type: task.category.clone(),
            presentation: Presentation::for_task(task),
        });
    }

    for animal in animals {
        for entry in &animal.timeline {
            events.push(CalendarEvent {
                id: entry.id.clone(),
                title: format!("{} ({})", entry.title, animal.tag),
                date: entry.date,
                source_type: SourceType::Animal,
                sub_type: animal.tag.clone(),
                presentation: Presentation::for_timeline(entry.color),
            });
        }
    }

    for record in finance.iter().filter(|r| finance_on_calendar(r, today)) {
        let direction = match record.record_type {
            FinanceType::Income => "income",
            FinanceType::Expense => "expense",
        };
        events.push(CalendarEvent {
            id: record.id.clone(),
            title: format!("{}: {:.2}", record.description, record.magnitude()),
            date: record.date,
            source_type: SourceType::Finance,
            sub_type: direction.to_string(),
            presentation: Presentation::for_finance(record),
        });
    }

    // Stable sort preserves input order on equal dates.
    events.sort_by_key(|e| e.date);
    events
}

/// Events falling on `date`.
pub fn events_on(events: &[CalendarEvent], date: NaiveDate) -> Vec<&CalendarEvent> {
    events.iter().filter(|e| e.date == date).collect()
}

/// Index events by date for month-grid rendering.
pub fn group_by_date(events: &[CalendarEvent]) -> BTreeMap<NaiveDate, Vec<&CalendarEvent>> {
    let mut grouped: BTreeMap<NaiveDate, Vec<&CalendarEvent>> = BTreeMap::new();
    for event in events {
        grouped.entry(event.date).or_default().push(event);
    }
    grouped
}
