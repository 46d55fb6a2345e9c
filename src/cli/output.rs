//! Output formatting helpers for CLI commands

use crate::api::{Complexity, MetricsSummary};
use crate::health::{ConnectionState, HealthSnapshot};
use crate::notify::{Notification, NotificationKind};
use crate::session::{HistoryEntry, ResponseEntry};
use chrono::{DateTime, Utc};
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Cell, ContentArrangement, Table};
use serde::Serialize;
use std::fmt::Write;

/// Longest query preview shown in history listings
const QUERY_PREVIEW_CHARS: usize = 60;

/// Format a dollar amount: six decimals below one cent, four otherwise.
pub fn fmt_cost(usd: f64) -> String {
    if usd < 0.01 {
        format!("${:.6}", usd)
    } else {
        format!("${:.4}", usd)
    }
}

/// Format a token count, abbreviating thousands (`1234` → `1.2k`).
pub fn fmt_tokens(tokens: u64) -> String {
    if tokens >= 1000 {
        format!("{:.1}k", tokens as f64 / 1000.0)
    } else {
        tokens.to_string()
    }
}

fn complexity_badge(complexity: Complexity) -> String {
    match complexity {
        Complexity::System1 => complexity.label().green().to_string(),
        Complexity::System2 => complexity.label().magenta().to_string(),
    }
}

fn preview(query: &str) -> String {
    let mut chars = query.chars();
    let head: String = chars.by_ref().take(QUERY_PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        format!("{}…", head)
    } else {
        head
    }
}

/// Format a routed answer followed by its routing details
pub fn format_response(entry: &ResponseEntry) -> String {
    let r = &entry.response;
    let mut output = String::new();

    writeln!(output, "{}", r.answer).unwrap();
    writeln!(output).unwrap();
    writeln!(
        output,
        "{} {} · {:.0}ms · {} tokens · {} · {:.0}% via {}",
        complexity_badge(r.complexity),
        r.model_used.bold(),
        r.latency_ms,
        fmt_tokens(r.token_usage.total_tokens),
        fmt_cost(r.estimated_cost_usd),
        r.classification_confidence * 100.0,
        r.classifier_used,
    )
    .unwrap();

    output
}

/// Format a routed answer as JSON
pub fn format_response_json(entry: &ResponseEntry) -> String {
    serde_json::to_string_pretty(entry).unwrap_or_default()
}

fn breakdown_table(title: &str, counts: &std::collections::HashMap<String, u64>) -> Table {
    let mut rows: Vec<_> = counts.iter().collect();
    rows.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![title, "Requests"]);
    for (name, count) in rows {
        table.add_row(vec![Cell::new(name), Cell::new(count)]);
    }
    table
}

/// Format a metrics summary as tables
pub fn format_metrics_table(metrics: &MetricsSummary) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Metric", "Value"]);
    table.add_row(vec![
        Cell::new("Total requests"),
        Cell::new(metrics.total_requests),
    ]);
    table.add_row(vec![
        Cell::new("Avg latency"),
        Cell::new(format!("{:.0}ms", metrics.avg_latency_ms)),
    ]);
    table.add_row(vec![
        Cell::new("Total cost"),
        Cell::new(fmt_cost(metrics.total_estimated_cost_usd)),
    ]);
    table.add_row(vec![
        Cell::new("Avg cost / request"),
        Cell::new(fmt_cost(metrics.avg_cost_per_request_usd)),
    ]);
    table.add_row(vec![
        Cell::new("Tokens used"),
        Cell::new(fmt_tokens(metrics.total_tokens_used)),
    ]);

    let mut output = table.to_string();
    for (title, counts) in [
        ("Complexity", &metrics.requests_by_complexity),
        ("Model", &metrics.requests_by_model),
        ("Classifier", &metrics.classifier_distribution),
    ] {
        if !counts.is_empty() {
            output.push('\n');
            output.push_str(&breakdown_table(title, counts).to_string());
        }
    }
    output
}

/// Format a metrics summary as JSON
pub fn format_metrics_json(metrics: &MetricsSummary) -> String {
    serde_json::to_string_pretty(metrics).unwrap_or_default()
}

/// View model for health display
#[derive(Debug, Clone, Serialize)]
pub struct HealthView {
    pub state: ConnectionState,
    pub status: Option<String>,
    pub version: Option<String>,
    pub classifier_mode: Option<String>,
    pub system1_model: Option<String>,
    pub system2_model: Option<String>,
    pub last_check_time: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
}

impl From<&HealthSnapshot> for HealthView {
    fn from(snapshot: &HealthSnapshot) -> Self {
        let status = snapshot.status.as_ref();
        Self {
            state: snapshot.connection_state(),
            status: status.map(|s| s.status.clone()),
            version: status.map(|s| s.version.clone()),
            classifier_mode: status.map(|s| s.classifier_mode.clone()),
            system1_model: status.map(|s| s.system1_model.clone()),
            system2_model: status.map(|s| s.system2_model.clone()),
            last_check_time: snapshot.last_check_time,
            last_error: snapshot.last_error.clone(),
        }
    }
}

/// Colored label for a connection state
pub fn format_connection_state(state: ConnectionState) -> String {
    match state {
        ConnectionState::Connecting => "Connecting".yellow().to_string(),
        ConnectionState::Healthy => "Healthy".green().to_string(),
        ConnectionState::Unreachable => "Unreachable".red().to_string(),
        ConnectionState::Lost => "Connection lost".red().to_string(),
    }
}

/// Format backend health as pretty text
pub fn format_health(view: &HealthView) -> String {
    let mut output = String::new();

    writeln!(output, "Status: {}", format_connection_state(view.state)).unwrap();
    if let Some(ref version) = view.version {
        writeln!(output, "Version: {}", version).unwrap();
    }
    if let Some(ref mode) = view.classifier_mode {
        writeln!(output, "Classifier: {}", mode).unwrap();
    }
    if let (Some(s1), Some(s2)) = (&view.system1_model, &view.system2_model) {
        writeln!(output, "System 1: {}", s1).unwrap();
        writeln!(output, "System 2: {}", s2).unwrap();
    }
    if let Some(ref error) = view.last_error {
        writeln!(output, "Last error: {}", error.red()).unwrap();
    }

    output
}

/// Format backend health as JSON
pub fn format_health_json(view: &HealthView) -> String {
    serde_json::to_string_pretty(view).unwrap_or_default()
}

/// One-line rendering of a notification
pub fn format_notification(notification: &Notification) -> String {
    match notification.kind {
        NotificationKind::Error => format!("{} {}", "✗".red(), notification.message.red()),
        NotificationKind::Success => format!("{} {}", "✓".green(), notification.message),
        NotificationKind::Info => format!("{} {}", "ℹ".cyan(), notification.message),
    }
}

/// Format query history (most recent first, numbered from 1) as a table
pub fn format_history(history: &[HistoryEntry]) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["#", "Query", "Model", "Tier"]);

    for (i, entry) in history.iter().enumerate() {
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(preview(&entry.query)),
            Cell::new(&entry.response.model_used),
            Cell::new(entry.response.complexity.label()),
        ]);
    }

    table.to_string()
}
