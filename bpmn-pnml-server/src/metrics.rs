//! Prometheus counters/histograms for the `/transform` route (C11, §4.11).
//!
//! Registered once at startup and rendered as text exposition by
//! `GET /metrics`. Nothing in `bpmn-pnml-core` knows these exist — counting
//! and timing are purely the HTTP boundary's concern.

use prometheus::{Encoder, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder};

pub struct Metrics {
    registry: Registry,
    pub requests_total: IntCounterVec,
    pub duration_seconds: HistogramVec,
}

impl Metrics {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let requests_total = IntCounterVec::new(
            Opts::new(
                "transform_requests_total",
                "Count of /transform requests by direction and outcome.",
            ),
            &["direction", "outcome"],
        )?;
        registry.register(Box::new(requests_total.clone()))?;

        let duration_seconds = HistogramVec::new(
            prometheus::HistogramOpts::new(
                "transform_duration_seconds",
                "Latency of a single transformation call.",
            ),
            &["direction"],
        )?;
        registry.register(Box::new(duration_seconds.clone()))?;

        Ok(Metrics { registry, requests_total, duration_seconds })
    }

    pub fn render(&self) -> anyhow::Result<String> {
        let encoder = TextEncoder::new();
        let families = self.registry.gather();
        let mut buf = Vec::new();
        encoder.encode(&families, &mut buf)?;
        Ok(String::from_utf8(buf)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_outcomes_and_renders_them() {
        let metrics = Metrics::new().unwrap();
        metrics.requests_total.with_label_values(&["bpmntopnml", "ok"]).inc();
        metrics.requests_total.with_label_values(&["bpmntopnml", "error"]).inc();
        let rendered = metrics.render().unwrap();
        assert!(rendered.contains("transform_requests_total"));
        assert!(rendered.contains("outcome=\"ok\""));
        assert!(rendered.contains("outcome=\"error\""));
    }
}
