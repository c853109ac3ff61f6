use metrics::{counter, histogram};
use std::time::Instant;

pub struct PipelineTelemetry;

impl PipelineTelemetry {
    pub fn record_attempted(count: usize) {
        counter!("recap_records_attempted_total").increment(count as u64);
    }

    pub fn record_failed(part: &str) {
        counter!("recap_records_failed_total", "part" => part.to_string()).increment(1);
    }

    pub fn record_aggregation(duration_secs: f64, succeeded: usize) {
        histogram!("recap_aggregation_duration_seconds").record(duration_secs);
        histogram!("recap_aggregation_succeeded_records").record(succeeded as f64);
    }

    pub fn record_report(outcome: &str) {
        counter!("recap_reports_total", "outcome" => outcome.to_string()).increment(1);
    }
}

pub struct AggregationTimer {
    start: Instant
}

impl AggregationTimer {
    pub fn start() -> Self {
        Self {
            start: Instant::now()
        }
    }

    pub fn finish(self, succeeded: usize) {
        PipelineTelemetry::record_aggregation(self.start.elapsed().as_secs_f64(), succeeded);
    }
}
