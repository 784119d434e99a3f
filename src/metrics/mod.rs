//! Prometheus metrics for the bot core and HTTP surface.

use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounter, IntGauge, Opts, Registry, TextEncoder,
};

pub struct Metrics {
    registry: Registry,
    pub events_total: IntCounter,
    pub conditions_finalized_total: IntCounter,
    pub sessions_cancelled_total: IntCounter,
    pub http_requests_total: IntCounter,
    pub http_requests_in_flight: IntGauge,
    pub http_request_duration_seconds: Histogram,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let events_total = IntCounter::with_opts(Opts::new(
            "events_total",
            "Inbound conversation events processed",
        ))?;
        let conditions_finalized_total = IntCounter::with_opts(Opts::new(
            "conditions_finalized_total",
            "Conditions appended to user strategies",
        ))?;
        let sessions_cancelled_total = IntCounter::with_opts(Opts::new(
            "sessions_cancelled_total",
            "Build sessions discarded via cancel",
        ))?;
        let http_requests_total =
            IntCounter::with_opts(Opts::new("http_requests_total", "HTTP requests received"))?;
        let http_requests_in_flight = IntGauge::with_opts(Opts::new(
            "http_requests_in_flight",
            "HTTP requests currently being served",
        ))?;
        let http_request_duration_seconds = Histogram::with_opts(HistogramOpts::new(
            "http_request_duration_seconds",
            "HTTP request latency in seconds",
        ))?;

        registry.register(Box::new(events_total.clone()))?;
        registry.register(Box::new(conditions_finalized_total.clone()))?;
        registry.register(Box::new(sessions_cancelled_total.clone()))?;
        registry.register(Box::new(http_requests_total.clone()))?;
        registry.register(Box::new(http_requests_in_flight.clone()))?;
        registry.register(Box::new(http_request_duration_seconds.clone()))?;

        Ok(Self {
            registry,
            events_total,
            conditions_finalized_total,
            sessions_cancelled_total,
            http_requests_total,
            http_requests_in_flight,
            http_request_duration_seconds,
        })
    }

    /// Export all metrics in Prometheus text format.
    pub fn export(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer).unwrap_or_default())
    }
}
