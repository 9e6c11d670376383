use std::collections::HashMap;
use std::time::Instant;

/// Cross-cutting logger for batch classification events.
///
/// Decouples the classifier and use cases from output mechanisms so the CLI
/// can report progress while tests stay silent.
pub trait BatchLogger: Send {
    /// Report comparisons performed against comparisons planned.
    fn progress(&mut self, performed: usize, planned: usize);

    /// Record how long one named stage took (e.g. an oracle round trip).
    fn timing(&mut self, stage: &str, duration_ms: f64);

    /// Record a point-in-time metric (e.g. references consulted per frame).
    fn metric(&mut self, name: &str, value: f64);

    /// Log a human-readable status message.
    fn info(&mut self, message: &str);

    /// Emit an end-of-batch summary. Default: no-op.
    fn summary(&self) {}
}

/// Silent logger that discards all events.
pub struct NullBatchLogger;

impl BatchLogger for NullBatchLogger {
    fn progress(&mut self, _performed: usize, _planned: usize) {}
    fn timing(&mut self, _stage: &str, _duration_ms: f64) {}
    fn metric(&mut self, _name: &str, _value: f64) {}
    fn info(&mut self, _message: &str) {}
}

/// CLI-oriented logger that tracks per-stage timing and metrics and prints
/// a summary when the batch ends.
///
/// Progress lines are throttled to every `throttle` comparisons.
pub struct StdoutBatchLogger {
    throttle: usize,
    timings: HashMap<String, Vec<f64>>,
    metrics: HashMap<String, Vec<f64>>,
    start_time: Instant,
    comparisons: usize,
    messages: Vec<String>,
}

impl StdoutBatchLogger {
    pub fn new(throttle: usize) -> Self {
        Self {
            throttle: throttle.max(1),
            timings: HashMap::new(),
            metrics: HashMap::new(),
            start_time: Instant::now(),
            comparisons: 0,
            messages: Vec::new(),
        }
    }

    /// Returns the formatted summary string, or `None` if no data recorded.
    pub fn summary_string(&self) -> Option<String> {
        if self.timings.is_empty() && self.metrics.is_empty() {
            return None;
        }

        let elapsed_ms = self.start_time.elapsed().as_secs_f64() * 1000.0;
        let comparisons = self.comparisons;
        let mut lines = Vec::new();

        lines.push(format!(
            "Batch summary ({comparisons} comparisons, {:.1}s total):",
            elapsed_ms / 1000.0
        ));

        let mut stages: Vec<_> = self.timings.keys().collect();
        stages.sort();
        for stage in stages {
            let durations = &self.timings[stage];
            let total_ms: f64 = durations.iter().sum();
            let avg_ms = mean(durations);
            let pct = if elapsed_ms > 0.0 {
                total_ms / elapsed_ms * 100.0
            } else {
                0.0
            };
            lines.push(format!(
                "  {stage:12}: avg {avg_ms:8.1}ms  total {total_ms:9.0}ms  ({pct:4.1}%)"
            ));
        }

        let mut metric_names: Vec<_> = self.metrics.keys().collect();
        metric_names.sort();
        for name in metric_names {
            lines.push(format!("  {name}: avg {:.1}", mean(&self.metrics[name])));
        }

        if comparisons > 0 && elapsed_ms > 0.0 {
            let rate = comparisons as f64 / (elapsed_ms / 1000.0);
            lines.push(format!("  Throughput: {rate:.2} comparisons/s"));
        }

        Some(lines.join("\n"))
    }

    pub fn timings_for(&self, stage: &str) -> Option<&[f64]> {
        self.timings.get(stage).map(|v| v.as_slice())
    }

    pub fn metrics_for(&self, name: &str) -> Option<&[f64]> {
        self.metrics.get(name).map(|v| v.as_slice())
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

impl Default for StdoutBatchLogger {
    fn default() -> Self {
        Self::new(25)
    }
}

impl BatchLogger for StdoutBatchLogger {
    fn progress(&mut self, performed: usize, planned: usize) {
        self.comparisons = performed;
        if performed % self.throttle == 0 || performed == planned {
            if planned > 0 {
                let pct = (performed as f64 / planned as f64 * 100.0).min(100.0);
                log::info!("Comparisons: {performed}/{planned} ({pct:.1}%)");
            } else {
                log::info!("Comparisons: {performed}");
            }
        }
    }

    fn timing(&mut self, stage: &str, duration_ms: f64) {
        self.timings
            .entry(stage.to_string())
            .or_default()
            .push(duration_ms);
    }

    fn metric(&mut self, name: &str, value: f64) {
        self.metrics
            .entry(name.to_string())
            .or_default()
            .push(value);
    }

    fn info(&mut self, message: &str) {
        self.messages.push(message.to_string());
        log::info!("{message}");
    }

    fn summary(&self) {
        if let Some(text) = self.summary_string() {
            log::info!("\n\n{text}");
        }
    }
}
