//! Prometheus metrics for cycles, orders and the status server

use prometheus::{Encoder, Histogram, HistogramOpts, IntCounter, IntGauge, Registry, TextEncoder};

pub struct Metrics {
    registry: Registry,
    pub cycles_started_total: IntCounter,
    pub cycles_skipped_total: IntCounter,
    pub cycles_failed_total: IntCounter,
    pub orders_submitted_total: IntCounter,
    pub orders_rejected_total: IntCounter,
    pub orders_cancelled_total: IntCounter,
    pub cycle_in_flight: IntGauge,
    pub cycle_duration_seconds: Histogram,
    pub http_requests_total: IntCounter,
    pub http_requests_in_flight: IntGauge,
    pub http_request_duration_seconds: Histogram,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let cycles_started_total =
            IntCounter::new("cycles_started_total", "Trading cycles started")?;
        let cycles_skipped_total = IntCounter::new(
            "cycles_skipped_total",
            "Cycle triggers dropped because a cycle was still running",
        )?;
        let cycles_failed_total =
            IntCounter::new("cycles_failed_total", "Cycles aborted by an error")?;
        let orders_submitted_total =
            IntCounter::new("orders_submitted_total", "Orders accepted by the exchange")?;
        let orders_rejected_total = IntCounter::new(
            "orders_rejected_total",
            "Orders rejected by validation or by the exchange",
        )?;
        let orders_cancelled_total =
            IntCounter::new("orders_cancelled_total", "Pending orders cancelled")?;
        let cycle_in_flight = IntGauge::new("cycle_in_flight", "1 while a cycle is running")?;
        let cycle_duration_seconds = Histogram::with_opts(
            HistogramOpts::new("cycle_duration_seconds", "Wall time of one trading cycle")
                .buckets(vec![0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0]),
        )?;
        let http_requests_total =
            IntCounter::new("http_requests_total", "HTTP requests served")?;
        let http_requests_in_flight =
            IntGauge::new("http_requests_in_flight", "HTTP requests being served")?;
        let http_request_duration_seconds = Histogram::with_opts(HistogramOpts::new(
            "http_request_duration_seconds",
            "HTTP request latency",
        ))?;

        registry.register(Box::new(cycles_started_total.clone()))?;
        registry.register(Box::new(cycles_skipped_total.clone()))?;
        registry.register(Box::new(cycles_failed_total.clone()))?;
        registry.register(Box::new(orders_submitted_total.clone()))?;
        registry.register(Box::new(orders_rejected_total.clone()))?;
        registry.register(Box::new(orders_cancelled_total.clone()))?;
        registry.register(Box::new(cycle_in_flight.clone()))?;
        registry.register(Box::new(cycle_duration_seconds.clone()))?;
        registry.register(Box::new(http_requests_total.clone()))?;
        registry.register(Box::new(http_requests_in_flight.clone()))?;
        registry.register(Box::new(http_request_duration_seconds.clone()))?;

        Ok(Self {
            registry,
            cycles_started_total,
            cycles_skipped_total,
            cycles_failed_total,
            orders_submitted_total,
            orders_rejected_total,
            orders_cancelled_total,
            cycle_in_flight,
            cycle_duration_seconds,
            http_requests_total,
            http_requests_in_flight,
            http_request_duration_seconds,
        })
    }

    /// Text exposition format
    pub fn export(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}
