// SPDX-License-Identifier: MIT OR Apache-2.0
//! End-to-end boundary flow: load config, run a handler, report the failure
//! and shape the response according to the configured exposure policy.

use std::io::Write;
use std::sync::{Arc, Mutex};

use pbb_config::{BoundaryConfig, merge_configs, parse_toml, validate_config};
use pbb_envelope::{RequestEnvelope, ResponseEnvelope, respond_to};
use pbb_error::{ErrorCode, PlatformError};
use pbb_telemetry::ErrorStats;
use tracing_subscriber::fmt::MakeWriter;
use uuid::Uuid;

#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }
    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedLogs;
    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

impl CapturedLogs {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).to_string()
    }
}

#[derive(Debug, Clone, PartialEq)]
struct PlaceOrder {
    sku: String,
    quantity: u32,
}

fn place_order(req: &RequestEnvelope<PlaceOrder>) -> Result<u64, PlatformError> {
    let order = req
        .data()
        .ok_or_else(|| PlatformError::validation("request", "missing payload"))?;
    if order.quantity == 0 {
        return Err(PlatformError::validation("quantity", "must be positive"));
    }
    if order.sku == "LOCKED" {
        return Err(PlatformError::forbidden("tenant-a", "place_order", order.sku.clone()));
    }
    if order.sku == "BROKEN" {
        return Err(PlatformError::unexpected(std::io::Error::other(
            "inventory socket closed",
        )));
    }
    Ok(1001)
}

fn handle(
    req: &RequestEnvelope<PlaceOrder>,
    cfg: &BoundaryConfig,
    stats: &ErrorStats,
) -> ResponseEnvelope<u64> {
    let result = place_order(req);
    if let Err(err) = &result {
        stats.report(err, req.correlation_id());
    }
    respond_to(req, result, &cfg.exposure_policy())
}

/// Reads the file without `PBB_*` overrides so the host environment cannot
/// change the outcome.
fn config_from_file(contents: &str) -> BoundaryConfig {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    parse_toml(&std::fs::read_to_string(file.path()).unwrap()).unwrap()
}

fn request(sku: &str, quantity: u32) -> RequestEnvelope<PlaceOrder> {
    RequestEnvelope::new(
        PlaceOrder {
            sku: sku.into(),
            quantity,
        },
        Uuid::new_v4().to_string(),
    )
    .with_idempotency_key(Uuid::new_v4().to_string())
}

#[test]
fn successful_call_returns_data_and_echoes_correlation() {
    let cfg = BoundaryConfig::default();
    let stats = ErrorStats::new();
    let req = request("A-1", 2);
    let resp = handle(&req, &cfg, &stats);
    assert!(resp.is_success());
    assert_eq!(resp.data(), Some(&1001));
    assert_eq!(resp.correlation_id(), req.correlation_id());
    assert_eq!(stats.summary().total, 0);
}

#[test]
fn configured_redaction_applies_to_responses() {
    let cfg = config_from_file(
        r#"
service_name = "orders"
redacted_metadata_keys = ["actor"]
"#,
    );
    assert!(validate_config(&cfg).unwrap().is_empty());
    let stats = ErrorStats::new();
    let resp = handle(&request("LOCKED", 1), &cfg, &stats);
    let error = resp.error().unwrap();
    assert_eq!(error.code, ErrorCode::ForbiddenOperation);
    let metadata = error.metadata.as_ref().unwrap();
    assert!(!metadata.contains_key("actor"));
    assert!(metadata.contains_key("resource"));
}

#[test]
fn overlay_can_hide_metadata_entirely() {
    let base = config_from_file("service_name = \"orders\"\n");
    let overlay = config_from_file("expose_metadata = false\n");
    let cfg = merge_configs(base, overlay);
    let resp = handle(&request("A-1", 0), &cfg, &ErrorStats::new());
    let error = resp.error().unwrap();
    assert_eq!(error.code, ErrorCode::ValidationFailed);
    assert!(error.metadata.is_none());
    assert!(error.message.contains("quantity"));
}

#[test]
fn failures_are_counted_and_logged_without_leaking_causes() {
    let logs = CapturedLogs::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(logs.clone())
        .with_max_level(tracing::Level::TRACE)
        .with_ansi(false)
        .finish();
    let cfg = BoundaryConfig::default();
    let stats = ErrorStats::new();
    let broken = request("BROKEN", 1);

    let resp = tracing::subscriber::with_default(subscriber, || {
        handle(&request("A-1", 0), &cfg, &stats);
        handle(&request("LOCKED", 1), &cfg, &stats);
        handle(&broken, &cfg, &stats)
    });

    let summary = stats.summary();
    assert_eq!(summary.total, 3);
    assert_eq!(summary.expected, 2);
    assert_eq!(summary.unexpected, 1);

    let out = logs.contents();
    assert!(out.contains("inventory socket closed"), "logs: {out}");
    assert!(out.contains(broken.correlation_id()), "logs: {out}");

    let json = serde_json::to_string(&resp).unwrap();
    assert!(!json.contains("inventory socket closed"));
    assert!(json.contains("UNEXPECTED_ERROR"));
}

#[test]
fn request_without_payload_is_a_validation_failure() {
    let req: RequestEnvelope<PlaceOrder> = RequestEnvelope::empty("corr-empty");
    let resp = handle(&req, &BoundaryConfig::default(), &ErrorStats::new());
    assert_eq!(resp.error().unwrap().code, ErrorCode::ValidationFailed);
    assert_eq!(resp.correlation_id(), "corr-empty");
}

#[test]
fn default_timeout_from_config_sets_request_deadline() {
    let cfg = config_from_file("default_timeout_ms = 2000\n");
    let timeout = cfg.default_timeout().unwrap();
    let req = request("A-1", 1).with_timeout(timeout);
    let deadline = req.deadline().unwrap();
    assert_eq!((deadline - req.timestamp()).num_milliseconds(), 2000);
}
