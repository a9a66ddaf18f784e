#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use restwatch_core::RestwatchError;
use restwatch_server::config;

#[test]
fn deny_unknown_fields_nested() {
    let bad = r#"
version: 1
metrics:
  namespase: "typo" # typo should fail
"#;

    let err = config::load_from_str(bad).expect_err("must fail");
    assert!(matches!(err, RestwatchError::Config(_)));
}

#[test]
fn ok_minimal_config() {
    let cfg = config::load_from_str("version: 1\n").expect("must parse");
    assert_eq!(cfg.server.listen, "0.0.0.0:8080");
    assert_eq!(cfg.metrics.namespace, "monitoring");
    assert_eq!(cfg.metrics.subsystem, "rest");
    assert!(cfg.metrics.endpoint_label);
    assert_eq!(cfg.metrics.buckets.len(), 11);
}

#[test]
fn unsupported_version() {
    let err = config::load_from_str("version: 2\n").unwrap_err();
    assert!(matches!(err, RestwatchError::UnsupportedVersion));
}

#[test]
fn rejects_bad_values() {
    for bad in [
        "version: 1\nserver: { listen: \"nowhere\" }\n",
        "version: 1\nmetrics: { buckets: [] }\n",
        "version: 1\nmetrics: { buckets: [1.0, 0.5] }\n",
        "version: 1\nmetrics: { namespace: \"has-dash\" }\n",
    ] {
        let err = config::load_from_str(bad).unwrap_err();
        assert!(err.is_startup_fatal(), "{bad}: {err}");
    }
}

#[test]
fn missing_file_means_defaults() {
    let cfg = config::load_or_default("/definitely/not/here/restwatch.yaml").unwrap();
    assert_eq!(cfg.version, 1);
}
