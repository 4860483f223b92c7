use extract::{AnalyzeError, ExtractionError};
use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

pub struct Metrics {
    // Counters
    total_requests: AtomicUsize,
    successful_requests: AtomicUsize,
    failed_requests: AtomicUsize,

    // Failures by kind
    model_failures: AtomicUsize,
    not_found_failures: AtomicUsize,
    parse_failures: AtomicUsize,

    // Timing (in microseconds)
    total_analyze_time_us: AtomicU64,
}

impl Metrics {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            total_requests: AtomicUsize::new(0),
            successful_requests: AtomicUsize::new(0),
            failed_requests: AtomicUsize::new(0),
            model_failures: AtomicUsize::new(0),
            not_found_failures: AtomicUsize::new(0),
            parse_failures: AtomicUsize::new(0),
            total_analyze_time_us: AtomicU64::new(0),
        })
    }

    pub fn record_analyze(&self, duration: Duration, failure: Option<&AnalyzeError>) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        self.total_analyze_time_us.fetch_add(duration.as_micros() as u64, Ordering::Relaxed);

        let Some(failure) = failure else {
            self.successful_requests.fetch_add(1, Ordering::Relaxed);
            return;
        };

        self.failed_requests.fetch_add(1, Ordering::Relaxed);
        let counter = match failure {
            AnalyzeError::Model(_) => &self.model_failures,
            AnalyzeError::Extraction(ExtractionError::NotFound) => &self.not_found_failures,
            AnalyzeError::Extraction(ExtractionError::ParseFailure(_)) => &self.parse_failures,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let total_requests = self.total_requests.load(Ordering::Relaxed);
        let total_us = self.total_analyze_time_us.load(Ordering::Relaxed) as f64;

        MetricsSnapshot {
            total_requests,
            successful_requests: self.successful_requests.load(Ordering::Relaxed),
            failed_requests: self.failed_requests.load(Ordering::Relaxed),
            model_failures: self.model_failures.load(Ordering::Relaxed),
            not_found_failures: self.not_found_failures.load(Ordering::Relaxed),
            parse_failures: self.parse_failures.load(Ordering::Relaxed),
            avg_analyze_time_ms: if total_requests > 0 {
                total_us / total_requests as f64 / 1000.0 // Convert to ms
            } else {
                0.0
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MetricsSnapshot {
    pub total_requests: usize,
    pub successful_requests: usize,
    pub failed_requests: usize,
    pub model_failures: usize,
    pub not_found_failures: usize,
    pub parse_failures: usize,
    pub avg_analyze_time_ms: f64,
}

pub struct TimedOperation {
    start: Instant,
}

impl TimedOperation {
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}
