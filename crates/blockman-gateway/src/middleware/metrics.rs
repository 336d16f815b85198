//! Gateway counters, exposed as JSON on `/metrics`.

use std::sync::atomic::{AtomicU64, Ordering};

/// How a request ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestOutcome {
    Success,
    ClientError,
    ServerError,
}

/// Gateway metrics
#[derive(Debug, Default)]
pub struct GatewayMetrics {
    // Request counters
    pub requests_total: AtomicU64,
    pub requests_success: AtomicU64,
    pub requests_client_error: AtomicU64,
    pub requests_server_error: AtomicU64,

    // Registry counters
    pub abis_uploaded: AtomicU64,
    pub abis_removed: AtomicU64,
    pub abis_evicted: AtomicU64,

    // Contract call counters
    pub calls_success: AtomicU64,
    pub calls_failed: AtomicU64,
    pub calls_raw_fallback: AtomicU64,

    // Latency tracking (simplified - in production use histograms)
    pub total_latency_ms: AtomicU64,
}

impl GatewayMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a finished HTTP request
    pub fn record_request(&self, outcome: RequestOutcome, latency_ms: u64) {
        self.requests_total.fetch_add(1, Ordering::Relaxed);
        let counter = match outcome {
            RequestOutcome::Success => &self.requests_success,
            RequestOutcome::ClientError => &self.requests_client_error,
            RequestOutcome::ServerError => &self.requests_server_error,
        };
        counter.fetch_add(1, Ordering::Relaxed);
        self.total_latency_ms.fetch_add(latency_ms, Ordering::Relaxed);
    }

    pub fn record_upload(&self) {
        self.abis_uploaded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_removal(&self) {
        self.abis_removed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_evictions(&self, count: usize) {
        self.abis_evicted.fetch_add(count as u64, Ordering::Relaxed);
    }

    /// Record a contract call that reached the node
    pub fn record_call(&self, success: bool) {
        if success {
            self.calls_success.fetch_add(1, Ordering::Relaxed);
        } else {
            self.calls_failed.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Record a call whose result could not be decoded
    pub fn record_raw_fallback(&self) {
        self.calls_raw_fallback.fetch_add(1, Ordering::Relaxed);
    }

    /// Get average latency in ms
    pub fn average_latency_ms(&self) -> f64 {
        let total = self.total_latency_ms.load(Ordering::Relaxed);
        let count = self.requests_total.load(Ordering::Relaxed);
        if count == 0 {
            0.0
        } else {
            total as f64 / count as f64
        }
    }

    /// Export as JSON
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "requests": {
                "total": self.requests_total.load(Ordering::Relaxed),
                "success": self.requests_success.load(Ordering::Relaxed),
                "client_error": self.requests_client_error.load(Ordering::Relaxed),
                "server_error": self.requests_server_error.load(Ordering::Relaxed),
                "avg_latency_ms": self.average_latency_ms(),
            },
            "abis": {
                "uploaded": self.abis_uploaded.load(Ordering::Relaxed),
                "removed": self.abis_removed.load(Ordering::Relaxed),
                "evicted": self.abis_evicted.load(Ordering::Relaxed),
            },
            "calls": {
                "success": self.calls_success.load(Ordering::Relaxed),
                "failed": self.calls_failed.load(Ordering::Relaxed),
                "raw_fallback": self.calls_raw_fallback.load(Ordering::Relaxed),
            }
        })
    }
}
