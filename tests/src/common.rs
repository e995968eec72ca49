use serde_json::Value;
use warden_checker::{CheckConfig, CheckReport, check_batch};
use warden_core::Batch;

pub const CROSS_CONTRACT: &str = include_str!("../fixtures/cross_contract.json");
pub const PLAIN_IMPORT: &str = include_str!("../fixtures/plain_import.json");
pub const MULTI_AUTHORIZER: &str = include_str!("../fixtures/multi_authorizer.json");
pub const INTERFACE_CONFORMANCE: &str = include_str!("../fixtures/interface_conformance.json");
pub const ACCEPTED: &str = include_str!("../fixtures/accepted.json");

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .without_time()
        .try_init();
}

pub fn batch(json: &str) -> Batch {
    Batch::from_json(json).expect("fixture should parse")
}

pub fn batch_from_value(value: Value) -> Batch {
    serde_json::from_value(value).expect("batch should deserialize")
}

pub fn check(batch: &Batch) -> CheckReport {
    check_with(batch, &CheckConfig::default())
}

pub fn check_with(batch: &Batch, config: &CheckConfig) -> CheckReport {
    init_tracing();
    check_batch(batch, config).expect("check should complete")
}
