//! Performance and outcome metrics for the decision pipeline.

use crate::types::decision::{FusedDecision, FusionMode};
use crate::types::verdict::{Decision, VerdictSource};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;
use std::time::{Duration, Instant};
use tracing::info;

/// Metrics collector for pipeline performance and decision outcomes
pub struct PipelineMetrics {
    /// Total applications processed
    pub applications_processed: AtomicU64,
    /// Decisions that required human validation
    pub manual_reviews: AtomicU64,
    /// Decisions scored by the heuristic fallback
    pub heuristic_fallbacks: AtomicU64,
    /// Decisions by final outcome (accept/reject)
    decisions_by_outcome: RwLock<HashMap<String, u64>>,
    /// Decisions by fusion mode
    decisions_by_mode: RwLock<HashMap<String, u64>>,
    /// Processing times (in microseconds)
    processing_times: RwLock<Vec<u64>>,
    /// Confidence distribution buckets
    confidence_buckets: RwLock<[u64; 10]>,
    /// Start time for rate calculation
    start_time: Instant,
}

impl PipelineMetrics {
    /// Create a new metrics collector
    pub fn new() -> Self {
        Self {
            applications_processed: AtomicU64::new(0),
            manual_reviews: AtomicU64::new(0),
            heuristic_fallbacks: AtomicU64::new(0),
            decisions_by_outcome: RwLock::new(HashMap::new()),
            decisions_by_mode: RwLock::new(HashMap::new()),
            processing_times: RwLock::new(Vec::with_capacity(1000)),
            confidence_buckets: RwLock::new([0; 10]),
            start_time: Instant::now(),
        }
    }

    /// Record a processed application and its decision
    pub fn record_decision(&self, processing_time: Duration, decision: &FusedDecision) {
        self.applications_processed.fetch_add(1, Ordering::Relaxed);

        if decision.human_validation_required {
            self.manual_reviews.fetch_add(1, Ordering::Relaxed);
        }
        if decision.ml_assessment.source == VerdictSource::Heuristic {
            self.heuristic_fallbacks.fetch_add(1, Ordering::Relaxed);
        }

        let outcome = match decision.final_decision {
            Decision::Accept => "accept",
            Decision::Reject => "reject",
        };
        if let Ok(mut by_outcome) = self.decisions_by_outcome.write() {
            *by_outcome.entry(outcome.to_string()).or_insert(0) += 1;
        }

        let mode = match decision.mode {
            FusionMode::Normal => "normal",
            FusionMode::FraudStop => "fraud_stop",
            FusionMode::ColdStart => "cold_start",
            FusionMode::ManualReviewRequired => "manual_review_required",
        };
        if let Ok(mut by_mode) = self.decisions_by_mode.write() {
            *by_mode.entry(mode.to_string()).or_insert(0) += 1;
        }

        if let Ok(mut times) = self.processing_times.write() {
            times.push(processing_time.as_micros() as u64);
            // Keep only the most recent window for memory efficiency
            if times.len() > 10000 {
                times.drain(0..5000);
            }
        }

        let bucket = (decision.confidence * 10.0).min(9.0) as usize;
        if let Ok(mut buckets) = self.confidence_buckets.write() {
            buckets[bucket] += 1;
        }
    }

    /// Get processing time statistics
    pub fn get_processing_stats(&self) -> ProcessingStats {
        let times = self.processing_times.read().unwrap();
        if times.is_empty() {
            return ProcessingStats::default();
        }

        let mut sorted: Vec<u64> = times.clone();
        sorted.sort();

        let sum: u64 = sorted.iter().sum();
        let count = sorted.len();

        ProcessingStats {
            count: count as u64,
            mean_us: sum / count as u64,
            p50_us: sorted[count / 2],
            p95_us: sorted[(count as f64 * 0.95) as usize],
            p99_us: sorted[(count as f64 * 0.99) as usize],
            max_us: *sorted.last().unwrap_or(&0),
        }
    }

    /// Get current throughput (applications per second)
    pub fn get_throughput(&self) -> f64 {
        let elapsed = self.start_time.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            self.applications_processed.load(Ordering::Relaxed) as f64 / elapsed
        } else {
            0.0
        }
    }

    /// Get confidence distribution
    pub fn get_confidence_distribution(&self) -> [u64; 10] {
        *self.confidence_buckets.read().unwrap()
    }

    /// Get decisions by final outcome
    pub fn get_decisions_by_outcome(&self) -> HashMap<String, u64> {
        self.decisions_by_outcome.read().unwrap().clone()
    }

    /// Get decisions by fusion mode
    pub fn get_decisions_by_mode(&self) -> HashMap<String, u64> {
        self.decisions_by_mode.read().unwrap().clone()
    }

    /// Print summary statistics
    pub fn print_summary(&self) {
        let processed = self.applications_processed.load(Ordering::Relaxed);
        let reviews = self.manual_reviews.load(Ordering::Relaxed);
        let fallbacks = self.heuristic_fallbacks.load(Ordering::Relaxed);
        let review_rate = if processed > 0 {
            (reviews as f64 / processed as f64) * 100.0
        } else {
            0.0
        };

        let processing = self.get_processing_stats();
        let throughput = self.get_throughput();
        let by_outcome = self.get_decisions_by_outcome();
        let by_mode = self.get_decisions_by_mode();
        let confidence_dist = self.get_confidence_distribution();

        info!("==== CREDIT DECISION PIPELINE - METRICS SUMMARY ====");
        info!(
            applications = processed,
            throughput = format!("{:.1} app/s", throughput),
            "Volume"
        );
        info!(
            manual_reviews = reviews,
            review_rate = format!("{:.1}%", review_rate),
            heuristic_fallbacks = fallbacks,
            "Review and fallback"
        );
        info!(
            mean_us = processing.mean_us,
            p50_us = processing.p50_us,
            p95_us = processing.p95_us,
            p99_us = processing.p99_us,
            "Processing time"
        );
        for (outcome, count) in &by_outcome {
            let pct = if processed > 0 {
                (*count as f64 / processed as f64) * 100.0
            } else {
                0.0
            };
            info!(outcome = %outcome, count = count, pct = format!("{:.1}%", pct), "Decisions by outcome");
        }
        for (mode, count) in &by_mode {
            info!(mode = %mode, count = count, "Decisions by mode");
        }
        let total: u64 = confidence_dist.iter().sum();
        for (i, &count) in confidence_dist.iter().enumerate() {
            if count == 0 {
                continue;
            }
            let pct = if total > 0 {
                (count as f64 / total as f64) * 100.0
            } else {
                0.0
            };
            info!(
                bucket = format!("{:.1}-{:.1}", i as f64 / 10.0, (i + 1) as f64 / 10.0),
                count = count,
                pct = format!("{:.1}%", pct),
                "Confidence distribution"
            );
        }
    }
}

impl Default for PipelineMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Processing time statistics
#[derive(Debug, Default)]
pub struct ProcessingStats {
    pub count: u64,
    pub mean_us: u64,
    pub p50_us: u64,
    pub p95_us: u64,
    pub p99_us: u64,
    pub max_us: u64,
}

/// Periodic metrics reporter
pub struct MetricsReporter {
    metrics: std::sync::Arc<PipelineMetrics>,
    interval_secs: u64,
}

impl MetricsReporter {
    pub fn new(metrics: std::sync::Arc<PipelineMetrics>, interval_secs: u64) -> Self {
        Self {
            metrics,
            interval_secs,
        }
    }

    /// Start the periodic reporting task
    pub async fn start(self) {
        let mut interval = tokio::time::interval(Duration::from_secs(self.interval_secs));
        loop {
            interval.tick().await;
            self.metrics.print_summary();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::decision::ReasonCode;
    use crate::types::verdict::{
        PipelineMode, QualitativeVerdict, RiskBucket, RiskVerdict,
    };

    fn decision(final_decision: Decision, mode: FusionMode, review: bool) -> FusedDecision {
        FusedDecision {
            case_id: "c1".to_string(),
            final_decision,
            reason: ReasonCode::ColdStartMlDecision,
            confidence: 0.7,
            mode,
            conditions: Vec::new(),
            ml_assessment: RiskVerdict {
                probability: 0.3,
                bucket: RiskBucket::Medium,
                decision: final_decision,
                source: VerdictSource::Heuristic,
                feature_count: 44,
            },
            qualitative_assessment: QualitativeVerdict {
                decision: final_decision,
                confidence: None,
                mode: PipelineMode::ColdStart,
                conditions: Vec::new(),
                top_similarity: None,
            },
            human_validation_required: review,
            conflict_details: None,
            action: None,
        }
    }

    #[test]
    fn test_metrics_recording() {
        let metrics = PipelineMetrics::new();

        metrics.record_decision(
            Duration::from_micros(100),
            &decision(Decision::Accept, FusionMode::ColdStart, true),
        );
        metrics.record_decision(
            Duration::from_micros(200),
            &decision(Decision::Reject, FusionMode::Normal, false),
        );

        assert_eq!(metrics.applications_processed.load(Ordering::Relaxed), 2);
        assert_eq!(metrics.manual_reviews.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.heuristic_fallbacks.load(Ordering::Relaxed), 2);

        let by_outcome = metrics.get_decisions_by_outcome();
        assert_eq!(by_outcome.get("accept"), Some(&1));
        assert_eq!(by_outcome.get("reject"), Some(&1));

        let by_mode = metrics.get_decisions_by_mode();
        assert_eq!(by_mode.get("cold_start"), Some(&1));
        assert_eq!(by_mode.get("normal"), Some(&1));
    }

    #[test]
    fn test_confidence_bucketing() {
        let metrics = PipelineMetrics::new();
        metrics.record_decision(
            Duration::from_micros(50),
            &decision(Decision::Accept, FusionMode::Normal, false),
        );

        let dist = metrics.get_confidence_distribution();
        assert_eq!(dist[7], 1); // confidence 0.7
    }
}
