//! Prometheus metrics for analysis-service.

use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder,
};
use std::sync::OnceLock;

struct Metrics {
    registry: Registry,
    requests_total: IntCounterVec,
    upstream_latency_seconds: HistogramVec,
    tokens_total: IntCounterVec,
}

static METRICS: OnceLock<Metrics> = OnceLock::new();

fn build() -> Result<Metrics, prometheus::Error> {
    let registry = Registry::new();

    let requests_total = IntCounterVec::new(
        Opts::new("analysis_requests_total", "Total analyze requests by outcome"),
        &["outcome"],
    )?;

    let upstream_latency_seconds = HistogramVec::new(
        HistogramOpts::new(
            "analysis_upstream_latency_seconds",
            "Vision provider call duration in seconds",
        )
        .buckets(vec![1.0, 2.5, 5.0, 10.0, 20.0, 30.0, 60.0, 120.0]),
        &["model"],
    )?;

    let tokens_total = IntCounterVec::new(
        Opts::new("analysis_tokens_total", "Tokens consumed by the vision provider"),
        &["model", "type"], // type: input, output
    )?;

    registry.register(Box::new(requests_total.clone()))?;
    registry.register(Box::new(upstream_latency_seconds.clone()))?;
    registry.register(Box::new(tokens_total.clone()))?;

    Ok(Metrics {
        registry,
        requests_total,
        upstream_latency_seconds,
        tokens_total,
    })
}

/// Initialize all metrics. Safe to call more than once.
pub fn init_metrics() {
    if METRICS.get().is_some() {
        return;
    }
    match build() {
        Ok(metrics) => {
            let _ = METRICS.set(metrics);
        }
        Err(e) => tracing::error!(error = %e, "Failed to initialize metrics"),
    }
}

pub fn record_request(outcome: &str) {
    if let Some(m) = METRICS.get() {
        m.requests_total.with_label_values(&[outcome]).inc();
    }
}

pub fn record_upstream_latency(model: &str, seconds: f64) {
    if let Some(m) = METRICS.get() {
        m.upstream_latency_seconds
            .with_label_values(&[model])
            .observe(seconds);
    }
}

pub fn record_tokens(model: &str, input: u32, output: u32) {
    if let Some(m) = METRICS.get() {
        m.tokens_total
            .with_label_values(&[model, "input"])
            .inc_by(u64::from(input));
        m.tokens_total
            .with_label_values(&[model, "output"])
            .inc_by(u64::from(output));
    }
}

/// Text exposition of every registered metric.
pub fn get_metrics() -> Result<String, String> {
    let registry = &METRICS
        .get()
        .ok_or_else(|| "metrics registry not initialized".to_string())?
        .registry;

    let mut buffer = Vec::new();
    TextEncoder::new()
        .encode(&registry.gather(), &mut buffer)
        .map_err(|e| e.to_string())?;
    String::from_utf8(buffer).map_err(|e| e.to_string())
}
