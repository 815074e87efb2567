use axum::http::StatusCode;
use axum::response::IntoResponse;
use lazy_static::lazy_static;
use prometheus::{Encoder, IntCounter, IntCounterVec, Registry, TextEncoder};
use std::sync::OnceLock;
use tracing::error;

lazy_static! {
    static ref REGISTRY: Registry = Registry::new();
}

static REQ_COUNTER: OnceLock<IntCounterVec> = OnceLock::new();
static SESSIONS_CREATED: OnceLock<IntCounter> = OnceLock::new();
static EMERGENCIES: OnceLock<IntCounter> = OnceLock::new();
static LLM_FALLBACKS: OnceLock<IntCounter> = OnceLock::new();

fn install<M>(cell: &OnceLock<M>, metric: M) -> prometheus::Result<()>
where
    M: prometheus::core::Collector + Clone + 'static,
{
    if cell.set(metric.clone()).is_ok() {
        REGISTRY.register(Box::new(metric))?;
    }
    Ok(())
}

/// Create and register the process metrics. Safe to call more than once.
pub fn init_metrics() -> prometheus::Result<()> {
    install(
        &REQ_COUNTER,
        IntCounterVec::new(
            prometheus::opts!("requests_total", "Total requests per route"),
            &["route", "status"],
        )?,
    )?;
    install(
        &SESSIONS_CREATED,
        IntCounter::new("sessions_created_total", "Conversation sessions created, resets included")?,
    )?;
    install(
        &EMERGENCIES,
        IntCounter::new("emergencies_total", "Chat turns flagged as emergencies")?,
    )?;
    install(
        &LLM_FALLBACKS,
        IntCounter::new("llm_fallbacks_total", "Chat turns answered with the fallback reply")?,
    )?;
    Ok(())
}

pub fn inc_request(route: &str, status: &str) {
    if let Some(counter) = REQ_COUNTER.get() {
        counter.with_label_values(&[route, status]).inc();
    }
}

pub fn inc_sessions_created() {
    if let Some(counter) = SESSIONS_CREATED.get() {
        counter.inc();
    }
}

pub fn inc_emergency() {
    if let Some(counter) = EMERGENCIES.get() {
        counter.inc();
    }
}

pub fn inc_llm_fallback() {
    if let Some(counter) = LLM_FALLBACKS.get() {
        counter.inc();
    }
}

pub async fn get_metrics() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = vec![];
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        error!("Failed to encode metrics: {}", e);
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            [("content-type", "text/plain; version=0.0.4")],
            Vec::new(),
        );
    }

    (
        StatusCode::OK,
        [("content-type", "text/plain; version=0.0.4")],
        buffer,
    )
}
