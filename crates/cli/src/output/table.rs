//! Table formatting utilities

use anyhow::Result;
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, *};

use super::summary::RunSummary;

/// Table formatter
pub struct TableFormatter;

impl TableFormatter {
    /// Create a new table with default styling
    pub fn new() -> Table {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .apply_modifier(UTF8_ROUND_CORNERS)
            .set_content_arrangement(ContentArrangement::Dynamic);
        table
    }

    /// Create a simple table with headers and rows
    pub fn simple(headers: Vec<&str>, rows: Vec<Vec<String>>) -> Result<String> {
        let mut table = Self::new();
        table.set_header(headers);

        for row in rows {
            table.add_row(row);
        }

        Ok(table.to_string())
    }

    /// Create a key-value table
    pub fn key_value(items: Vec<(&str, String)>) -> Result<String> {
        let mut table = Self::new();

        for (key, value) in items {
            table.add_row(vec![key, &value]);
        }

        Ok(table.to_string())
    }

    /// Metrics table, latency table and saved paths
    pub fn summary(summary: &RunSummary) -> Result<String> {
        let metrics = Self::simple(
            vec!["Metric", "Value"],
            vec![
                vec!["Evaluated".to_string(), summary.evaluated.to_string()],
                vec!["Failed".to_string(), summary.failed.to_string()],
                vec![
                    "Accuracy@1".to_string(),
                    format!("{:.2}%", summary.accuracy_at_1_percent),
                ],
                vec![
                    format!("Recall@{}", summary.top_k),
                    format!("{:.2}%", summary.recall_at_k_percent),
                ],
            ],
        )?;

        let latency = &summary.latency;
        let latency_table = Self::simple(
            vec!["Avg (s)", "Min (s)", "Max (s)", "P50 (s)", "P95 (s)"],
            vec![[
                latency.avg_s,
                latency.min_s,
                latency.max_s,
                latency.p50_s,
                latency.p95_s,
            ]
            .iter()
            .map(|v| format!("{:.3}", v))
            .collect()],
        )?;

        Ok(format!(
            "{}\n{}\nP95 method: {}\n\nSaved:\n  {}\n  {}",
            metrics,
            latency_table,
            latency.p95_method,
            summary.reports.csv.display(),
            summary.reports.json.display()
        ))
    }
}

impl Default for TableFormatter {
    fn default() -> Self {
        Self
    }
}
