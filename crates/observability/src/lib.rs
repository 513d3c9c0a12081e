use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use memo_core::{ClassificationRecord, ClassificationSource};
use once_cell::sync::OnceCell;
use parking_lot::Mutex;
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

static TRACING_INIT: OnceCell<()> = OnceCell::new();

#[derive(Debug, Default)]
pub struct AppMetrics {
    classifications_total: AtomicU64,
    model_success_total: AtomicU64,
    fallback_total: AtomicU64,
    plans_total: AtomicU64,
    routing_failures_total: AtomicU64,
    total_latency_millis: AtomicU64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub classifications_total: u64,
    pub model_success_total: u64,
    pub fallback_total: u64,
    pub plans_total: u64,
    pub routing_failures_total: u64,
    pub avg_latency_millis: f64,
}

impl AppMetrics {
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn record_classification(&self, source: ClassificationSource) {
        self.classifications_total.fetch_add(1, Ordering::Relaxed);
        match source {
            ClassificationSource::Model => {
                self.model_success_total.fetch_add(1, Ordering::Relaxed);
            }
            ClassificationSource::Fallback => {
                self.fallback_total.fetch_add(1, Ordering::Relaxed);
            }
        }
        metrics::counter!("memo_classifications_total", "source" => source.as_code()).increment(1);
    }

    pub fn inc_plan(&self) {
        self.plans_total.fetch_add(1, Ordering::Relaxed);
        metrics::counter!("memo_plans_total").increment(1);
    }

    pub fn inc_routing_failure(&self) {
        self.routing_failures_total.fetch_add(1, Ordering::Relaxed);
        metrics::counter!("memo_routing_failures_total").increment(1);
    }

    pub fn observe_latency(&self, duration: Duration) {
        self.total_latency_millis
            .fetch_add(duration.as_millis() as u64, Ordering::Relaxed);
        metrics::histogram!("memo_plan_latency_seconds").record(duration.as_secs_f64());
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let requests = self.classifications_total.load(Ordering::Relaxed);
        let latency = self.total_latency_millis.load(Ordering::Relaxed);

        MetricsSnapshot {
            classifications_total: requests,
            model_success_total: self.model_success_total.load(Ordering::Relaxed),
            fallback_total: self.fallback_total.load(Ordering::Relaxed),
            plans_total: self.plans_total.load(Ordering::Relaxed),
            routing_failures_total: self.routing_failures_total.load(Ordering::Relaxed),
            avg_latency_millis: if requests == 0 {
                0.0
            } else {
                latency as f64 / requests as f64
            },
        }
    }
}

/// Receives one record per classification call for offline auditing of routing
/// decisions.
pub trait DiagnosticSink: Send + Sync {
    fn record(&self, record: &ClassificationRecord);
}

/// Emits each record as a structured tracing event.
#[derive(Debug, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn record(&self, record: &ClassificationRecord) {
        let triggers = record
            .triggers
            .iter()
            .map(|trigger| format!("{}={}", trigger.field, trigger.keyword))
            .collect::<Vec<_>>()
            .join(",");

        info!(
            target: "memo::classification",
            request_id = %record.request_id,
            source = record.source.as_code(),
            model = record.model.as_deref().unwrap_or("-"),
            attempts = record.attempts,
            fallback_reason = record.fallback_reason.as_deref().unwrap_or("-"),
            intent = %serde_json::to_string(&record.intent).unwrap_or_default(),
            triggers = %triggers,
            "intent classified"
        );
    }
}

/// Keeps records in memory; used by tests and the CLI audit output.
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<ClassificationRecord>>,
}

impl MemorySink {
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn records(&self) -> Vec<ClassificationRecord> {
        self.records.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }
}

impl DiagnosticSink for MemorySink {
    fn record(&self, record: &ClassificationRecord) {
        self.records.lock().push(record.clone());
    }
}

/// Fans a record out to several sinks.
pub struct FanoutSink {
    sinks: Vec<Arc<dyn DiagnosticSink>>,
}

impl FanoutSink {
    pub fn new(sinks: Vec<Arc<dyn DiagnosticSink>>) -> Self {
        Self { sinks }
    }
}

impl DiagnosticSink for FanoutSink {
    fn record(&self, record: &ClassificationRecord) {
        for sink in &self.sinks {
            sink.record(record);
        }
    }
}

pub fn init_tracing(service_name: &str) {
    TRACING_INIT.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}=info,memo_ml=info,memo_agents=info,memo::classification=info",
                service_name
            ))
        });

        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_current_span(true)
            .with_span_list(true)
            .init();
    });
}
