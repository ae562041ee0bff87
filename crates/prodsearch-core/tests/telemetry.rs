//! Label vocabularies and the cluster health model.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use prodsearch_core::telemetry::{CallStatus, ClusterHealth, ClusterStatus, EsOperation};

#[test]
fn cluster_status_ordinals() {
    assert_eq!(ClusterStatus::Red.ordinal(), 0);
    assert_eq!(ClusterStatus::Yellow.ordinal(), 1);
    assert_eq!(ClusterStatus::Green.ordinal(), 2);
    assert_eq!(ClusterStatus::from_ordinal(1), Some(ClusterStatus::Yellow));
    assert_eq!(ClusterStatus::from_ordinal(3), None);
    assert_eq!("GREEN".parse::<ClusterStatus>().unwrap(), ClusterStatus::Green);
    assert!("purple".parse::<ClusterStatus>().is_err());
}

#[test]
fn cluster_health_from_es_body() {
    let body = r#"{
        "cluster_name": "products",
        "status": "yellow",
        "number_of_nodes": 3,
        "active_shards": 10,
        "relocating_shards": 1,
        "initializing_shards": 0,
        "unassigned_shards": 4
    }"#;
    let health: ClusterHealth = serde_json::from_str(body).unwrap();
    assert_eq!(health.status, ClusterStatus::Yellow);
    assert_eq!(health.active_shards, 10);
    assert_eq!(health.relocating_shards, 1);
    assert_eq!(health.unassigned_shards, 4);
}

#[test]
fn operation_and_status_names() {
    for op in EsOperation::ALL {
        assert_eq!(op.as_str().parse::<EsOperation>().unwrap(), op);
    }
    assert_eq!(EsOperation::HealthCheck.to_string(), "health_check");
    assert!("drop_index".parse::<EsOperation>().is_err());

    assert_eq!("timeout".parse::<CallStatus>().unwrap(), CallStatus::Timeout);
    assert_eq!(CallStatus::of::<(), ()>(&Ok(())), CallStatus::Ok);
    assert_eq!(CallStatus::of::<(), &str>(&Err("boom")), CallStatus::Error);
}

#[test]
fn unknown_names_report_code() {
    let err = "reindex".parse::<EsOperation>().unwrap_err();
    assert_eq!(err.code().as_str(), "UNKNOWN_LABEL_VALUE");
    let err = "slow".parse::<CallStatus>().unwrap_err();
    assert_eq!(err.code().as_str(), "UNKNOWN_LABEL_VALUE");
}
