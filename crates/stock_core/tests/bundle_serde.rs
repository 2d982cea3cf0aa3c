//! Integration tests for reading bundles and writing reports as JSON.

#![cfg(feature = "serde")]

use stock_core::bundle::{DataValue, InputBundle, Report};
use stock_core::types::BundleError;

const BUNDLE: &str = r#"{
    "data": {
        "C_hist": [10.0, 12.0, 11.0],
        "I_hist": [1.2, null, 0.9],
        "k": 2,
        "SR_type": "Ricker",
        "CAA_hist": {"rows": 2, "cols": 2, "values": [0.6, 0.4, 0.5, 0.5]}
    },
    "parameters": {
        "R0x": 4.5,
        "log_rec_dev": [0.1, -0.1, 0.0]
    }
}"#;

#[test]
fn test_bundle_from_json() {
    let bundle: InputBundle<f64> = serde_json::from_str(BUNDLE).unwrap();
    let data = bundle.data();
    assert_eq!(data.vector_len("C_hist", 3).unwrap(), &[10.0, 12.0, 11.0]);
    assert!(data.vector("I_hist").unwrap()[1].is_nan());
    assert_eq!(data.integer("k").unwrap(), 2);
    assert_eq!(data.text("SR_type").unwrap(), "Ricker");
    assert_eq!(data.matrix_shape("CAA_hist", 2, 2).unwrap().get(0, 1), 0.4);

    let pars = bundle.parameters();
    assert_eq!(pars.labels(), vec!["R0x", "log_rec_dev[0]", "log_rec_dev[1]", "log_rec_dev[2]"]);
    assert_eq!(pars.flatten(), vec![4.5, 0.1, -0.1, 0.0]);
}

#[test]
fn test_bundle_without_data_section() {
    let bundle: InputBundle<f64> = serde_json::from_str(r#"{"parameters": {"x": 1.0}}"#).unwrap();
    assert!(bundle.data().names().next().is_none());
    assert_eq!(bundle.parameters().scalar("x").unwrap(), 1.0);
}

#[test]
fn test_wrong_kind_is_reported() {
    let bundle: InputBundle<f64> = serde_json::from_str(BUNDLE).unwrap();
    assert!(matches!(
        bundle.data().vector("SR_type"),
        Err(BundleError::WrongKind { .. })
    ));
    assert!(matches!(
        bundle.data().vector_len("C_hist", 4),
        Err(BundleError::LengthMismatch { .. })
    ));
}

#[test]
fn test_bundle_json_survives_rewrite() {
    let bundle: InputBundle<f64> = serde_json::from_str(BUNDLE).unwrap();
    let text = serde_json::to_string(&bundle).unwrap();
    let again: InputBundle<f64> = serde_json::from_str(&text).unwrap();
    assert_eq!(again.parameters(), bundle.parameters());
    assert!(matches!(again.data().get("SR_type"), Some(DataValue::Text(s)) if s == "Ricker"));
}

#[test]
fn test_report_serialises_in_recording_order() {
    let mut report = Report::<f64>::new();
    report.scalar("q", 0.5);
    report.vector("B", vec![1.0, 2.0]);
    report.matrix("N", 1, 2, vec![3.0, 4.0]);
    let value = serde_json::to_value(&report).unwrap();
    let entries = value.as_array().unwrap();
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0]["name"], "q");
    assert_eq!(entries[0]["value"], 0.5);
    assert_eq!(entries[1]["value"][1], 2.0);
    assert_eq!(entries[2]["value"]["cols"], 2);
    assert_eq!(entries[2]["ad"], false);
}
