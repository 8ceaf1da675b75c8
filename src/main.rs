//! Credit Decision Pipeline - Main Entry Point
//!
//! Consumes application records from NATS, runs the dual assessment
//! pipeline, and publishes fused decisions. Applications are processed in
//! parallel up to the configured worker count.

use anyhow::Result;
use credit_decision_pipeline::{
    classifier::RiskClassifier,
    config::AppConfig,
    consumer::ApplicationConsumer,
    metrics::{MetricsReporter, PipelineMetrics},
    pipeline::DecisionPipeline,
    producer::DecisionProducer,
    qualitative::ColdStartAssessor,
};
use futures::StreamExt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("credit_decision_pipeline=info".parse()?),
        )
        .init();

    info!("Starting Credit Decision Pipeline");

    // Load configuration
    let config = AppConfig::load()?;
    info!("Configuration loaded successfully");

    // Initialize metrics
    let metrics = Arc::new(PipelineMetrics::new());

    // Build the processing pipeline. No case-history backend is attached in
    // this binary, so the qualitative side reports cold start and fusion
    // defers to the classifier with mandatory human validation.
    let classifier = RiskClassifier::from_config(&config.model);
    let pipeline = Arc::new(DecisionPipeline::new(
        classifier,
        Box::new(ColdStartAssessor::new()),
    ));
    info!(
        model_loaded = pipeline.is_model_loaded(),
        "Decision pipeline initialized"
    );

    // Connect to NATS
    let client = async_nats::connect(&config.nats.url).await?;
    info!("Connected to NATS at {}", config.nats.url);

    // Initialize consumer and producer
    let consumer = ApplicationConsumer::new(client.clone(), &config.nats.application_subject);
    let producer = Arc::new(DecisionProducer::new(
        client.clone(),
        &config.nats.decision_subject,
    ));

    let num_workers = config.pipeline.workers;
    info!(
        workers = num_workers,
        applications = %config.nats.application_subject,
        decisions = %config.nats.decision_subject,
        "Starting application processing loop"
    );

    // Semaphore to limit concurrent processing
    let semaphore = Arc::new(Semaphore::new(num_workers));
    let processed_count = Arc::new(AtomicU64::new(0));

    // Start metrics reporter (prints summary every 30 seconds)
    let metrics_clone = metrics.clone();
    tokio::spawn(async move {
        let reporter = MetricsReporter::new(metrics_clone, 30);
        reporter.start().await;
    });

    // Process applications in parallel
    let mut records = consumer.records().await?;

    while let Some(decoded) = records.next().await {
        let permit = semaphore.clone().acquire_owned().await?;

        let record = match decoded {
            Ok(record) => record,
            Err(e) => {
                warn!(error = %e, "Failed to decode application record");
                continue;
            }
        };

        let pipeline = pipeline.clone();
        let producer = producer.clone();
        let metrics = metrics.clone();
        let processed_count = processed_count.clone();

        tokio::spawn(async move {
            let start_time = Instant::now();
            let case_id = record.case_id().to_string();

            let decision = pipeline.process(&record);
            let processing_time = start_time.elapsed();

            metrics.record_decision(processing_time, &decision);

            if let Err(e) = producer.publish(&decision).await {
                error!(
                    case_id = %case_id,
                    error = %e,
                    "Failed to publish decision"
                );
            } else {
                info!(
                    case_id = %case_id,
                    final_decision = ?decision.final_decision,
                    confidence = decision.confidence,
                    mode = ?decision.mode,
                    processing_time_us = processing_time.as_micros(),
                    "Decision published"
                );
            }

            let count = processed_count.fetch_add(1, Ordering::Relaxed) + 1;

            // Log progress every 100 applications
            if count % 100 == 0 {
                let throughput = metrics.get_throughput();
                let processing_stats = metrics.get_processing_stats();
                info!(
                    processed = count,
                    throughput = format!("{:.1} app/s", throughput),
                    avg_latency_us = processing_stats.mean_us,
                    "Processing milestone"
                );
            }

            drop(permit);
        });
    }

    info!("Pipeline shutting down...");
    metrics.print_summary();

    Ok(())
}
