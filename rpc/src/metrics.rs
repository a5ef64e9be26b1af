//! Prometheus metrics for the signing authority.
//!
//! [`AuthorityMetrics`] owns a dedicated [`Registry`] that `GET /metrics`
//! encodes into the Prometheus text exposition format.

use prometheus::{
    register_histogram_with_registry, register_int_counter_vec_with_registry,
    register_int_counter_with_registry, Encoder, Histogram, HistogramOpts, IntCounter,
    IntCounterVec, Opts, Registry, TextEncoder,
};

pub struct AuthorityMetrics {
    pub registry: Registry,
    /// Authorizations signed and returned.
    pub authorizations_issued: IntCounter,
    /// Refused or failed requests, labelled by reason code.
    pub rejections: IntCounterVec,
    /// Time to answer a sign-claim request, in milliseconds.
    pub sign_claim_latency_ms: Histogram,
}

impl AuthorityMetrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let authorizations_issued = register_int_counter_with_registry!(
            Opts::new(
                "pulse_authorizations_issued_total",
                "Claim authorizations signed by this authority"
            ),
            registry
        )
        .expect("failed to register authorizations_issued counter");

        let rejections = register_int_counter_vec_with_registry!(
            Opts::new(
                "pulse_authorization_rejections_total",
                "Sign-claim requests that did not produce an authorization"
            ),
            &["reason"],
            registry
        )
        .expect("failed to register rejections counter");

        // 1 ms to ~16 s.
        let sign_claim_latency_ms = register_histogram_with_registry!(
            HistogramOpts::new(
                "pulse_sign_claim_latency_ms",
                "Sign-claim request latency in milliseconds"
            )
            .buckets(
                prometheus::exponential_buckets(1.0, 2.0, 15)
                    .expect("static bucket layout is valid")
            ),
            registry
        )
        .expect("failed to register sign_claim_latency_ms histogram");

        Self {
            registry,
            authorizations_issued,
            rejections,
            sign_claim_latency_ms,
        }
    }

    pub fn record_rejection(&self, reason: &str) {
        self.rejections.with_label_values(&[reason]).inc();
    }

    /// Text exposition of every registered metric.
    pub fn encode(&self) -> String {
        let mut buf = Vec::new();
        if let Err(e) = TextEncoder::new().encode(&self.registry.gather(), &mut buf) {
            tracing::warn!(error = %e, "failed to encode metrics");
        }
        String::from_utf8(buf).unwrap_or_default()
    }
}

impl Default for AuthorityMetrics {
    fn default() -> Self {
        Self::new()
    }
}
