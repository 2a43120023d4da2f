/*!
 * # Metrics Module
 *
 * In-process counters, gauges and histograms for the pickup point service,
 * exported in Prometheus text format at `/metrics`.
 *
 * - HTTP request counts and latency, labelled by method and route
 * - Business counters for pickup points, receptions and products
 */

use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("Failed to export metrics: {0}")]
    ExportError(String),
}

#[derive(Debug, Clone, Default)]
pub struct Counter {
    value: Arc<AtomicU64>,
}

impl Counter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inc(&self) {
        self.value.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.value.load(Ordering::Relaxed)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Gauge {
    bits: Arc<AtomicU64>,
}

impl Gauge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, value: f64) {
        self.bits.store(value.to_bits(), Ordering::Relaxed);
    }

    pub fn get(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::Relaxed))
    }
}

/// Sum/count histogram; sums are kept in microseconds to stay integral.
#[derive(Debug, Clone, Default)]
pub struct Histogram {
    sum_micros: Arc<AtomicU64>,
    count: Arc<AtomicU64>,
}

impl Histogram {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&self, seconds: f64) {
        let micros = (seconds * 1_000_000.0).max(0.0) as u64;
        self.sum_micros.fetch_add(micros, Ordering::Relaxed);
        self.count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get_count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    pub fn get_sum(&self) -> f64 {
        self.sum_micros.load(Ordering::Relaxed) as f64 / 1_000_000.0
    }
}

/// Registry keyed by the full series name, labels included
/// (e.g. `http_requests_total{method="GET",path="/pvz"}`).
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    counters: DashMap<String, Counter>,
    gauges: DashMap<String, Gauge>,
    histograms: DashMap<String, Histogram>,
}

impl MetricsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_create_counter(&self, name: &str) -> Counter {
        self.counters
            .entry(name.to_string())
            .or_insert_with(Counter::new)
            .clone()
    }

    pub fn get_or_create_gauge(&self, name: &str) -> Gauge {
        self.gauges
            .entry(name.to_string())
            .or_insert_with(Gauge::new)
            .clone()
    }

    pub fn get_or_create_histogram(&self, name: &str) -> Histogram {
        self.histograms
            .entry(name.to_string())
            .or_insert_with(Histogram::new)
            .clone()
    }

    pub fn export_metrics(&self) -> Result<String, MetricsError> {
        use std::fmt::Write;

        let mut output = String::new();
        let mut write = |line: String| {
            output
                .write_str(&line)
                .map_err(|e| MetricsError::ExportError(e.to_string()))
        };

        let mut counters: Vec<(String, u64)> = self
            .counters
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().get()))
            .collect();
        counters.sort();
        for (name, value) in counters {
            write(format!("# TYPE {} counter\n", base_name(&name)))?;
            write(format!("{} {}\n", name, value))?;
        }

        let mut gauges: Vec<(String, f64)> = self
            .gauges
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().get()))
            .collect();
        gauges.sort_by(|a, b| a.0.cmp(&b.0));
        for (name, value) in gauges {
            write(format!("# TYPE {} gauge\n", base_name(&name)))?;
            write(format!("{} {}\n", name, value))?;
        }

        let mut histograms: Vec<(String, u64, f64)> = self
            .histograms
            .iter()
            .map(|entry| {
                (
                    entry.key().clone(),
                    entry.value().get_count(),
                    entry.value().get_sum(),
                )
            })
            .collect();
        histograms.sort_by(|a, b| a.0.cmp(&b.0));
        for (name, count, sum) in histograms {
            let (base, labels) = split_labels(&name);
            write(format!("# TYPE {} summary\n", base))?;
            write(format!("{}_count{} {}\n", base, labels, count))?;
            write(format!("{}_sum{} {}\n", base, labels, sum))?;
        }

        Ok(output)
    }
}

fn base_name(name: &str) -> &str {
    split_labels(name).0
}

fn split_labels(name: &str) -> (&str, &str) {
    match name.find('{') {
        Some(idx) => name.split_at(idx),
        None => (name, ""),
    }
}

lazy_static::lazy_static! {
    pub static ref METRICS: MetricsRegistry = MetricsRegistry::new();
}

pub fn increment_counter(name: &str) {
    METRICS.get_or_create_counter(name).inc();
}

pub fn set_gauge(name: &str, value: f64) {
    METRICS.get_or_create_gauge(name).set(value);
}

pub fn observe_histogram(name: &str, value: f64) {
    METRICS.get_or_create_histogram(name).observe(value);
}

// Business metrics
pub struct BusinessMetrics {
    pub pickup_points_created: Counter,
    pub receptions_created: Counter,
    pub receptions_closed: Counter,
    pub products_added: Counter,
    pub products_deleted: Counter,
}

impl BusinessMetrics {
    pub fn new() -> Self {
        Self {
            pickup_points_created: METRICS.get_or_create_counter("pvz_created_total"),
            receptions_created: METRICS.get_or_create_counter("receptions_created_total"),
            receptions_closed: METRICS.get_or_create_counter("receptions_closed_total"),
            products_added: METRICS.get_or_create_counter("products_added_total"),
            products_deleted: METRICS.get_or_create_counter("products_deleted_total"),
        }
    }

    pub fn record_pickup_point_created(&self) {
        self.pickup_points_created.inc();
    }

    pub fn record_reception_created(&self) {
        self.receptions_created.inc();
    }

    pub fn record_reception_closed(&self) {
        self.receptions_closed.inc();
    }

    pub fn record_product_added(&self) {
        self.products_added.inc();
    }

    pub fn record_product_deleted(&self) {
        self.products_deleted.inc();
    }
}

impl Default for BusinessMetrics {
    fn default() -> Self {
        Self::new()
    }
}

lazy_static::lazy_static! {
    pub static ref BUSINESS_METRICS: BusinessMetrics = BusinessMetrics::new();
}

/// Records request count and latency per method and matched route.
pub async fn track_http_metrics(request: Request, next: Next) -> Response {
    let method = request.method().to_string();
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());
    let start = Instant::now();

    let response = next.run(request).await;

    let labels = format!(
        "{{method=\"{}\",path=\"{}\",status=\"{}\"}}",
        method,
        path,
        response.status().as_u16()
    );
    increment_counter(&format!("http_requests_total{}", labels));
    observe_histogram(
        &format!(
            "http_request_duration_seconds{{method=\"{}\",path=\"{}\"}}",
            method, path
        ),
        start.elapsed().as_secs_f64(),
    );

    response
}

// HTTP endpoint handler for metrics
pub async fn metrics_handler() -> Result<String, MetricsError> {
    METRICS.export_metrics()
}
