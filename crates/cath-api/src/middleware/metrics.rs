//! # Prometheus Metrics
//!
//! HTTP-level request counters and latency histograms, recorded by a
//! middleware layer and served at `/metrics` in text exposition format.
//! Path labels are normalized first: artefact ids, search values, and
//! location prefixes would otherwise make label cardinality unbounded.

use std::sync::Arc;
use std::time::Instant;

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use prometheus::{
    core::Collector, Encoder, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder,
};

/// Registry plus the metric families it owns. Cloning shares the
/// underlying counters, so one instance serves both the recording
/// middleware and the scrape endpoint.
#[derive(Clone)]
pub struct ApiMetrics {
    inner: Arc<Inner>,
}

struct Inner {
    registry: Registry,
    http_requests_total: IntCounterVec,
    http_request_duration_seconds: HistogramVec,
    http_errors_total: IntCounterVec,
}

impl ApiMetrics {
    /// Build the metric families against a fresh registry. Construction
    /// failures are programming errors (malformed names), hence panic.
    pub fn new() -> Self {
        let registry = Registry::new();

        let http_requests_total = IntCounterVec::new(
            Opts::new("cath_http_requests_total", "Total HTTP requests"),
            &["method", "path", "status"],
        )
        .expect("metric can be created");

        let http_request_duration_seconds = HistogramVec::new(
            prometheus::HistogramOpts::new(
                "cath_http_request_duration_seconds",
                "HTTP request duration in seconds",
            )
            .buckets(vec![0.005, 0.025, 0.1, 0.25, 0.5, 1.0, 2.5, 10.0]),
            &["method", "path"],
        )
        .expect("metric can be created");

        let http_errors_total = IntCounterVec::new(
            Opts::new("cath_http_errors_total", "Total HTTP errors (4xx and 5xx)"),
            &["method", "path", "status"],
        )
        .expect("metric can be created");

        for collector in [
            Box::new(http_requests_total.clone()) as Box<dyn Collector>,
            Box::new(http_request_duration_seconds.clone()),
            Box::new(http_errors_total.clone()),
        ] {
            registry
                .register(collector)
                .expect("metric can be registered");
        }

        Self {
            inner: Arc::new(Inner {
                registry,
                http_requests_total,
                http_request_duration_seconds,
                http_errors_total,
            }),
        }
    }

    /// Total requests recorded so far, summed over all label sets.
    pub fn requests(&self) -> u64 {
        sum_counter(&self.inner.http_requests_total)
    }

    /// Total 4xx/5xx responses recorded so far.
    pub fn errors(&self) -> u64 {
        sum_counter(&self.inner.http_errors_total)
    }

    fn record_request(&self, method: &str, path: &str, status: u16, duration_secs: f64) {
        let status_str = status.to_string();
        self.inner
            .http_requests_total
            .with_label_values(&[method, path, &status_str])
            .inc();

        self.inner
            .http_request_duration_seconds
            .with_label_values(&[method, path])
            .observe(duration_secs);

        if status >= 400 {
            self.inner
                .http_errors_total
                .with_label_values(&[method, path, &status_str])
                .inc();
        }
    }

    /// Encode everything in the registry as Prometheus text format.
    pub fn gather_and_encode(&self) -> Result<String, String> {
        let mut buffer = Vec::new();
        TextEncoder::new()
            .encode(&self.inner.registry.gather(), &mut buffer)
            .map_err(|e| format!("failed to encode metrics: {e}"))?;
        String::from_utf8(buffer)
            .map_err(|e| format!("metrics encoding produced invalid UTF-8: {e}"))
    }
}

impl Default for ApiMetrics {
    fn default() -> Self {
        Self::new()
    }
}

fn sum_counter(counter: &IntCounterVec) -> u64 {
    counter
        .collect()
        .iter()
        .flat_map(|mf| mf.get_metric())
        .map(|m| m.get_counter().get_value() as u64)
        .sum()
}

/// Normalize a request path for use as a Prometheus label.
///
/// Artefact-id segments (UUIDs) become `{id}`; the free-text value after
/// a search segment becomes `{value}`; location-prefix deletes collapse
/// to `{prefix}`.
fn normalize_path(path: &str) -> String {
    let segments: Vec<&str> = path.split('/').collect();
    let mut normalized = Vec::with_capacity(segments.len());
    for (i, segment) in segments.iter().enumerate() {
        let previous = if i > 0 { segments[i - 1] } else { "" };
        if is_uuid(segment) {
            normalized.push("{id}");
        } else if previous == "case-id" || previous == "case-name" {
            normalized.push("{value}");
        } else if previous == "location" {
            normalized.push("{prefix}");
        } else {
            normalized.push(segment);
        }
    }
    normalized.join("/")
}

/// Standard UUID shape: 8-4-4-4-12 hex characters with hyphens.
fn is_uuid(segment: &str) -> bool {
    let hyphens = [8, 13, 18, 23];
    segment.len() == 36
        && segment.chars().enumerate().all(|(i, c)| {
            if hyphens.contains(&i) {
                c == '-'
            } else {
                c.is_ascii_hexdigit()
            }
        })
}

/// Middleware recording one observation per request.
pub async fn metrics_middleware(request: Request, next: Next) -> Response {
    let metrics = request.extensions().get::<ApiMetrics>().cloned();
    let method = request.method().to_string();
    let path = normalize_path(request.uri().path());
    let start = Instant::now();

    let response = next.run(request).await;

    if let Some(m) = metrics {
        let duration = start.elapsed().as_secs_f64();
        m.record_request(&method, &path, response.status().as_u16(), duration);
    }

    response
}
