//! Metrics collection module for the chain service
//!
//! This module provides functionality for collecting and exposing service metrics
//! using Prometheus.

use lazy_static::lazy_static;
use prometheus::{
    CounterVec, Encoder, HistogramOpts, HistogramVec, IntGauge, Opts, Registry, TextEncoder,
};
use std::time::Instant;

lazy_static! {
    /// Global Prometheus registry instance
    pub static ref REGISTRY_INSTANCE: Registry = Registry::new();

    /// Counter for tracking request counts by method
    pub static ref REQ_COUNTER_VEC: CounterVec =
        CounterVec::new(Opts::new("request_counter", "request counter"), &["method"]).unwrap();

    /// Histogram for tracking method execution times
    pub static ref METHOD_HISTOGRAM_VEC: HistogramVec = HistogramVec::new(
        HistogramOpts::new("method_cost", "method cost"),
        &["method"]
    )
    .unwrap();

    /// Executed transactions by outcome (`success` or `reverted`)
    pub static ref TX_COUNTER_VEC: CounterVec =
        CounterVec::new(Opts::new("tx_counter", "transaction counter"), &["status"]).unwrap();

    pub static ref BLOCK_HEIGHT: IntGauge =
        IntGauge::new("block_height", "current block number").unwrap();
}

/// Initializes the metrics registry
///
/// Registers all metric collectors with the global registry
pub fn init_registry() {
    let _ = REGISTRY_INSTANCE.register(Box::new(REQ_COUNTER_VEC.clone()));
    let _ = REGISTRY_INSTANCE.register(Box::new(METHOD_HISTOGRAM_VEC.clone()));
    let _ = REGISTRY_INSTANCE.register(Box::new(TX_COUNTER_VEC.clone()));
    let _ = REGISTRY_INSTANCE.register(Box::new(BLOCK_HEIGHT.clone()));
}

pub fn record_tx(success: bool) {
    let status = if success { "success" } else { "reverted" };
    TX_COUNTER_VEC.with_label_values(&[status]).inc();
}

/// Renders the registry in the Prometheus text format
pub fn gather_text() -> Vec<u8> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY_INSTANCE.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        log::error!("failed to encode metrics: {}", e);
    }
    buffer
}

/// Records metrics for an async operation
///
/// Counts the call and observes its latency under `method_name`.
///
/// # Arguments
///
/// * `method_name` - Name of the method being measured
/// * `handler` - Async function to execute and measure
///
/// # Returns
///
/// Returns the result of the handler function
pub async fn record_metrics<F, Fut, T>(method_name: &'static str, handler: F) -> T
where
    F: FnOnce() -> Fut + Send,
    Fut: std::future::Future<Output = T> + Send,
{
    let start = Instant::now();
    REQ_COUNTER_VEC.with_label_values(&[method_name]).inc();
    let result = handler().await;

    let elapsed = start.elapsed();
    METHOD_HISTOGRAM_VEC
        .with_label_values(&[method_name])
        .observe(elapsed.as_secs_f64());

    result
}
