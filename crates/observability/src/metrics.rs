//! Dispatch metrics
//!
//! Prometheus recording through the `metrics` facade plus an in-memory
//! aggregator for end-of-run summaries.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use metrics::{counter, histogram};

/// Record one finished dispatch
///
/// Unresolvable requests (no body / no action) should pass `"-"` as action.
pub fn record_dispatch(action: &str, status: u16, elapsed: Duration) {
    counter!(
        "action_dispatch_requests_total",
        "action" => action.to_string(),
        "status" => status.to_string()
    )
    .increment(1);

    histogram!(
        "action_dispatch_duration_ms",
        "action" => action.to_string()
    )
    .record(elapsed.as_secs_f64() * 1000.0);
}

/// Record the one-time store materialization
pub fn record_store_initialized() {
    counter!("action_dispatch_store_initialized_total").increment(1);
}

/// In-memory dispatch statistics
#[derive(Debug, Clone, Default)]
pub struct DispatchStats {
    pub total: u64,
    pub succeeded: u64,
    pub client_errors: u64,
    pub server_errors: u64,
    /// Latency in milliseconds
    pub latency: RunningStats,
    /// Count per action
    pub per_action: BTreeMap<String, u64>,
}

impl DispatchStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Update with one finished dispatch
    pub fn update(&mut self, action: &str, status: u16, elapsed: Duration) {
        self.total += 1;
        match status {
            200..=299 => self.succeeded += 1,
            400..=499 => self.client_errors += 1,
            _ => self.server_errors += 1,
        }
        self.latency.push(elapsed.as_secs_f64() * 1000.0);
        *self.per_action.entry(action.to_string()).or_insert(0) += 1;
    }

    pub fn summary(&self) -> DispatchSummary {
        DispatchSummary {
            total: self.total,
            succeeded: self.succeeded,
            client_errors: self.client_errors,
            server_errors: self.server_errors,
            success_rate: if self.total > 0 {
                self.succeeded as f64 / self.total as f64 * 100.0
            } else {
                0.0
            },
            latency_ms: StatsSummary::from(&self.latency),
            per_action: self.per_action.clone(),
        }
    }
}

/// Dispatch summary report
#[derive(Debug, Clone, Default)]
pub struct DispatchSummary {
    pub total: u64,
    pub succeeded: u64,
    pub client_errors: u64,
    pub server_errors: u64,
    pub success_rate: f64,
    pub latency_ms: StatsSummary,
    pub per_action: BTreeMap<String, u64>,
}

impl fmt::Display for DispatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Dispatch Summary ===")?;
        writeln!(f, "Total requests: {}", self.total)?;
        writeln!(
            f,
            "Succeeded: {} ({:.2}%)",
            self.succeeded, self.success_rate
        )?;
        writeln!(f, "Client errors (4xx): {}", self.client_errors)?;
        writeln!(f, "Server errors (5xx): {}", self.server_errors)?;
        writeln!(f, "Latency (ms): {}", self.latency_ms)?;

        if !self.per_action.is_empty() {
            writeln!(f, "Requests per action:")?;
            for (action, count) in &self.per_action {
                writeln!(f, "  {}: {}", action, count)?;
            }
        }

        Ok(())
    }
}

/// Statistics summary
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count,
            min: stats.min,
            max: stats.max,
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.3}, max={:.3}, mean={:.3}, std={:.3} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// Online statistics (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            self.m2 += delta * (value - self.mean);
        }
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// Sample variance
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_running_stats() {
        let mut stats = RunningStats::default();
        for v in [1.0, 2.0, 3.0, 4.0, 5.0] {
            stats.push(v);
        }

        assert_eq!(stats.count(), 5);
        assert!((stats.mean() - 3.0).abs() < 1e-10);
        assert!((stats.min() - 1.0).abs() < 1e-10);
        assert!((stats.max() - 5.0).abs() < 1e-10);
        assert!((stats.variance() - 2.5).abs() < 1e-10);
    }

    #[test]
    fn test_stats_classify_status() {
        let mut stats = DispatchStats::new();
        stats.update("echo", 200, Duration::from_millis(2));
        stats.update("echo", 500, Duration::from_millis(4));
        stats.update("-", 400, Duration::from_millis(1));

        assert_eq!(stats.total, 3);
        assert_eq!(stats.succeeded, 1);
        assert_eq!(stats.client_errors, 1);
        assert_eq!(stats.server_errors, 1);
        assert_eq!(stats.per_action.get("echo"), Some(&2));
    }

    #[test]
    fn test_summary_display() {
        let mut stats = DispatchStats::new();
        stats.update("echo", 200, Duration::from_millis(3));
        stats.update("echo", 200, Duration::from_millis(5));

        let output = stats.summary().to_string();
        assert!(output.contains("Total requests: 2"));
        assert!(output.contains("100.00%"));
        assert!(output.contains("echo: 2"));
    }

    #[test]
    fn test_record_without_recorder_is_noop() {
        record_dispatch("echo", 200, Duration::from_millis(1));
        record_store_initialized();
    }
}
