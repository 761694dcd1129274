//! Tool call metrics
//!
//! A collector is built once in `main` and handed to the MCP server, so
//! each test can own an isolated instance.

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;
use std::time::Duration;

use serde::Serialize;

/// Counters for a single tool
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolStats {
    pub calls: u64,
    pub errors: u64,
    pub total_duration_ms: u64,
}

/// Per-tool call counters
#[derive(Debug, Default)]
pub struct ToolMetrics {
    stats: Mutex<HashMap<String, ToolStats>>,
}

impl ToolMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one finished invocation
    pub fn record(&self, tool: &str, duration: Duration, is_error: bool) {
        let mut stats = self.stats.lock().unwrap_or_else(|e| e.into_inner());
        let entry = stats.entry(tool.to_string()).or_default();
        entry.calls += 1;
        if is_error {
            entry.errors += 1;
        }
        entry.total_duration_ms = entry
            .total_duration_ms
            .saturating_add(duration.as_millis() as u64);
    }

    /// Copy of the current counters, ordered by tool name
    pub fn snapshot(&self) -> BTreeMap<String, ToolStats> {
        let stats = self.stats.lock().unwrap_or_else(|e| e.into_inner());
        stats.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
    }
}
