//! Shape checks and parsing for text-service replies.
//!
//! Replies are free text that should contain a JSON array, possibly wrapped
//! in a markdown code fence or surrounded by prose. Some failure modes return
//! an HTML error page with a 200 status; those are detected and discarded
//! before any JSON parsing.

use serde::{Deserialize, Serialize};

use crate::error::ServiceError;

/// Maximum number of alerts kept from one reply.
pub const MAX_ALERTS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    High,
    Medium,
    #[default]
    Low,
}

impl Severity {
    /// Case-insensitive. Anything unrecognised is `Low`.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "high" | "critical" => Severity::High,
            "medium" | "moderate" => Severity::Medium,
            _ => Severity::Low,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub title: String,
    pub severity: Severity,
    pub message: String,
}

/// True if the text is an HTML document rather than model output.
pub fn looks_like_html(text: &str) -> bool {
    let head: String = text
        .trim_start()
        .chars()
        .take(16)
        .collect::<String>()
        .to_ascii_lowercase();
    head.starts_with("<!doctype html") || head.starts_with("<html") || head.starts_with("<body")
}

/// Locate a JSON array in a reply.
///
/// Tries a ```json fence, then a bare ``` fence whose body is an array, then
/// the first balanced `[...]` in the text (brackets inside strings ignored).
pub fn extract_json_array(response: &str) -> Option<&str> {
    if let Some(start) = response.find("```json") {
        let json_start = start + 7;
        if let Some(end) = response[json_start..].find("```") {
            return Some(response[json_start..json_start + end].trim());
        }
    }
    if let Some(start) = response.find("```") {
        let after_fence = start + 3;
        if let Some(nl) = response[after_fence..].find('\n') {
            let json_start = after_fence + nl + 1;
            if let Some(end) = response[json_start..].find("```") {
                let candidate = response[json_start..json_start + end].trim();
                if candidate.starts_with('[') {
                    return Some(candidate);
                }
            }
        }
    }

    let start = response.find('[')?;
    let candidate = &response[start..];
    let mut depth = 0i32;
    let mut in_string = false;
    let mut escape = false;
    for (i, ch) in candidate.char_indices() {
        if escape {
            escape = false;
            continue;
        }
        if ch == '\\' && in_string {
            escape = true;
            continue;
        }
        if ch == '"' {
            in_string = !in_string;
            continue;
        }
        if in_string {
            continue;
        }
        match ch {
            '[' => depth += 1,
            ']' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&candidate[..=i]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Parse an alerts reply.
///
/// Entries without a title are dropped, unknown severities become `Low`,
/// and at most [`MAX_ALERTS`] are returned.
pub fn parse_alerts(response: &str) -> Result<Vec<Alert>, ServiceError> {
    if looks_like_html(response) {
        return Err(ServiceError::HtmlResponse);
    }
    let json = extract_json_array(response)
        .ok_or_else(|| ServiceError::Malformed("no JSON array in reply".to_string()))?;
    let entries: Vec<serde_json::Value> =
        serde_json::from_str(json).map_err(|e| ServiceError::Malformed(e.to_string()))?;

    let alerts: Vec<Alert> = entries
        .iter()
        .filter_map(|entry| {
            let title = entry.get("title")?.as_str()?.trim();
            if title.is_empty() {
                return None;
            }
            Some(Alert {
                title: title.to_string(),
                severity: entry
                    .get("severity")
                    .and_then(|s| s.as_str())
                    .map(Severity::parse)
                    .unwrap_or_default(),
                message: entry
                    .get("message")
                    .and_then(|m| m.as_str())
                    .unwrap_or_default()
                    .trim()
                    .to_string(),
            })
        })
        .take(MAX_ALERTS)
        .collect();

    if alerts.len() < entries.len() {
        log::debug!(
            "Kept {} of {} alert entries",
            alerts.len(),
            entries.len()
        );
    }
    Ok(alerts)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_looks_like_html() {
        assert!(looks_like_html("<!DOCTYPE html><html>"));
        assert!(looks_like_html("  \n<HTML lang=\"en\">"));
        assert!(looks_like_html("<body>oops</body>"));
        assert!(!looks_like_html("[{\"title\": \"<html>\"}]"));
        assert!(!looks_like_html(""));
    }

    #[test]
    fn test_extract_from_json_fence() {
        let text = "Here you go:\n```json\n[{\"a\":1}]\n```\nThanks";
        assert_eq!(extract_json_array(text), Some("[{\"a\":1}]"));
    }

    #[test]
    fn test_extract_from_bare_fence() {
        let text = "```\n[1, 2]\n```";
        assert_eq!(extract_json_array(text), Some("[1, 2]"));
    }

    #[test]
    fn test_extract_balanced_with_brackets_in_strings() {
        let text = "Alerts: [{\"title\":\"Pen [A] flooded\"}] end";
        assert_eq!(
            extract_json_array(text),
            Some("[{\"title\":\"Pen [A] flooded\"}]")
        );
    }

    #[test]
    fn test_extract_unbalanced_is_none() {
        assert_eq!(extract_json_array("[{\"title\": \"x\""), None);
        assert_eq!(extract_json_array("no json here"), None);
    }

    #[test]
    fn test_parse_alerts_rules() {
        let text = r#"[
            {"title": "Feed low", "severity": "HIGH", "message": "Order now"},
            {"title": "", "severity": "high", "message": "no title"},
            {"severity": "medium", "message": "missing title"},
            {"title": "Weigh pigs", "severity": "urgent-ish"},
            {"title": "Vaccines due", "severity": "Medium", "message": "Weaners"}
        ]"#;
        let alerts = parse_alerts(text).unwrap();
        assert_eq!(alerts.len(), 3);
        assert_eq!(alerts[0].severity, Severity::High);
        assert_eq!(alerts[1].severity, Severity::Low);
        assert_eq!(alerts[1].message, "");
        assert_eq!(alerts[2].severity, Severity::Medium);
    }

    #[test]
    fn test_parse_alerts_caps_count() {
        let entries: Vec<String> = (0..15)
            .map(|i| format!("{{\"title\":\"Alert {}\",\"severity\":\"low\",\"message\":\"\"}}", i))
            .collect();
        let text = format!("[{}]", entries.join(","));
        let alerts = parse_alerts(&text).unwrap();
        assert_eq!(alerts.len(), MAX_ALERTS);
        assert_eq!(alerts[0].title, "Alert 0");
    }

    #[test]
    fn test_parse_alerts_rejects_html_and_garbage() {
        assert!(matches!(
            parse_alerts("<html><body>502</body></html>"),
            Err(ServiceError::HtmlResponse)
        ));
        assert!(matches!(
            parse_alerts("Sorry, I can't help."),
            Err(ServiceError::Malformed(_))
        ));
        assert!(matches!(
            parse_alerts("[not json]"),
            Err(ServiceError::Malformed(_))
        ));
    }
}
