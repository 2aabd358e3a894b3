//! Prompt construction for the text service.

use chrono::{Duration, NaiveDate};

use crate::dashboard::FarmMetrics;
use crate::state::FarmState;

/// How far ahead the advisor context looks for pending tasks.
const UPCOMING_TASK_DAYS: i64 = 7;
/// Health records older than this are left out of the advisor context.
const RECENT_HEALTH_DAYS: i64 = 30;

pub const IMAGE_ANALYSIS_PROMPT: &str = "You are assisting a pig farmer. Look at this photo of \
an animal and describe its visible body condition, skin, posture and any signs of illness, \
injury or stress. Give a short assessment followed by practical next steps. If anything \
looks serious, recommend contacting a veterinarian. Keep the answer under 200 words.";

pub fn advisor_prompt(query: &str, context: &str) -> String {
    let mut prompt = String::from(
        "You are an experienced livestock farm advisor. Answer the farmer's question using \
the farm data below where it is relevant. Be concise and practical.\n\n",
    );
    if !context.trim().is_empty() {
        prompt.push_str("## Farm data\n");
        prompt.push_str(context.trim());
        prompt.push_str("\n\n");
    }
    prompt.push_str("## Question\n");
    prompt.push_str(query.trim());
    prompt
}

/// Summarise the herd, feed stock, upcoming tasks and recent health events.
pub fn advisor_context(state: &FarmState, today: NaiveDate) -> String {
    let metrics = FarmMetrics::from_state(state, today);
    let mut lines = Vec::new();

    lines.push(format!("Date: {}", today));
    let stages: Vec<String> = metrics
        .herd_by_stage
        .iter()
        .map(|(stage, count)| format!("{} {}", count, stage))
        .collect();
    lines.push(format!(
        "Herd: {} animals ({})",
        metrics.herd_size,
        stages.join(", ")
    ));
    if metrics.average_finishing_weight > 0.0 {
        lines.push(format!(
            "Average finishing weight: {:.1} kg",
            metrics.average_finishing_weight
        ));
    }

    let low: Vec<String> = state
        .low_stock_feed()
        .iter()
        .map(|f| format!("{} ({:.0} kg, reorder at {:.0} kg)", f.name, f.quantity, f.reorder_level))
        .collect();
    if low.is_empty() {
        lines.push("Feed: all stock above reorder levels".to_string());
    } else {
        lines.push(format!("Low feed: {}", low.join("; ")));
    }

    let horizon = today + Duration::days(UPCOMING_TASK_DAYS);
    let mut upcoming: Vec<_> = state
        .tasks()
        .iter()
        .filter(|t| !t.is_completed() && t.due_date <= horizon)
        .collect();
    upcoming.sort_by_key(|t| (t.due_date, std::cmp::Reverse(t.priority)));
    for task in upcoming {
        let overdue = if task.due_date < today { ", overdue" } else { "" };
        lines.push(format!(
            "Task: {} (due {}{})",
            task.title, task.due_date, overdue
        ));
    }

    let since = today - Duration::days(RECENT_HEALTH_DAYS);
    for record in state.health().iter().filter(|h| h.date > since) {
        lines.push(format!(
            "Health: {} {} on {}: {}",
            record.animal_tag,
            record.record_type.as_str(),
            record.date,
            record.description
        ));
    }

    lines.join("\n")
}

pub fn alerts_prompt(metrics: &FarmMetrics) -> String {
    let snapshot = match serde_json::to_string_pretty(metrics) {
        Ok(json) => json,
        Err(e) => {
            log::warn!("Failed to serialize metrics for alerts: {}", e);
            "{}".to_string()
        }
    };
    format!(
        "You monitor a livestock farm. From the metrics below, list the most important \
operational alerts (at most 10).\n\
Respond with ONLY a JSON array. Each element must be an object with keys \
\"title\" (short), \"severity\" (one of \"high\", \"medium\", \"low\") and \"message\" \
(one or two sentences). Return [] if nothing needs attention.\n\n\
## Metrics\n{}",
        snapshot
    )
}
