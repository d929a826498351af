use prometheus::{
    Encoder, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder,
};

#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    pub accepts_total: IntCounterVec,
    pub accept_latency_seconds: HistogramVec,
    pub compensation_failures_total: IntCounter,
    pub registered_drivers: IntGauge,
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let accepts_total = IntCounterVec::new(
            Opts::new("accepts_total", "Total job acceptance attempts by outcome"),
            &["outcome"],
        )
        .expect("valid accepts_total metric");

        let accept_latency_seconds = HistogramVec::new(
            prometheus::HistogramOpts::new(
                "accept_latency_seconds",
                "Latency of job acceptance in seconds",
            ),
            &["outcome"],
        )
        .expect("valid accept_latency_seconds metric");

        let compensation_failures_total = IntCounter::new(
            "compensation_failures_total",
            "Rollback writes that failed, leaving a driver stranded",
        )
        .expect("valid compensation_failures_total metric");

        let registered_drivers = IntGauge::new("registered_drivers", "Registered driver count")
            .expect("valid registered_drivers metric");

        registry
            .register(Box::new(accepts_total.clone()))
            .expect("register accepts_total");
        registry
            .register(Box::new(accept_latency_seconds.clone()))
            .expect("register accept_latency_seconds");
        registry
            .register(Box::new(compensation_failures_total.clone()))
            .expect("register compensation_failures_total");
        registry
            .register(Box::new(registered_drivers.clone()))
            .expect("register registered_drivers");

        Self {
            registry,
            accepts_total,
            accept_latency_seconds,
            compensation_failures_total,
            registered_drivers,
        }
    }

    pub fn encode(&self) -> Result<String, String> {
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();

        TextEncoder::new()
            .encode(&metric_families, &mut buffer)
            .map_err(|err| format!("failed to encode metrics: {err}"))?;

        String::from_utf8(buffer).map_err(|err| format!("metrics are not valid utf8: {err}"))
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
