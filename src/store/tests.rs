use std::time::Duration;

use super::*;
use crate::config::ConfigError;

#[test]
fn test_lookup_query_uses_variable_for_value() {
    let request = QueryRequest::lookup("country", "country", "Italy\" } }", false).unwrap();

    assert_eq!(
        request.query,
        "query all($a: string) { all(func: eq(country, $a), first: 1) { uid } }"
    );
    assert_eq!(request.variables.get("$a"), Some(&"Italy\" } }"));
}

#[test]
fn test_lookup_query_with_type_filter() {
    let request = QueryRequest::lookup("country", "name", "Italy", true).unwrap();

    assert!(request.query.contains("eq(name, $a)"));
    assert!(request.query.contains("@filter(type(country))"));
}

#[test]
fn test_lookup_query_rejects_bad_identifiers() {
    for bad in ["", "country name", "a{b}", "x)"] {
        let err = QueryRequest::lookup("country", bad, "Italy", false).unwrap_err();
        assert!(matches!(err, StoreError::InvalidIdentifier { .. }), "{bad}");
    }

    let err = QueryRequest::lookup("bad type", "country", "Italy", false).unwrap_err();
    assert!(matches!(err, StoreError::InvalidIdentifier { .. }));
}

#[test]
fn test_request_serializes_as_dgraph_json() {
    let request = QueryRequest::lookup("country", "country", "Italy", false).unwrap();
    let json: serde_json::Value = serde_json::to_value(&request).unwrap();

    assert_eq!(json["variables"]["$a"], "Italy");
    assert!(json["query"].as_str().unwrap().starts_with("query all"));
}

#[test]
fn test_parse_found() {
    let body = br#"{"data":{"all":[{"uid":"0x2a"}]},"extensions":{}}"#;
    assert_eq!(parse_lookup_response(body).unwrap(), Some("0x2a".to_string()));
}

#[test]
fn test_parse_not_found() {
    let body = br#"{"data":{"all":[]}}"#;
    assert_eq!(parse_lookup_response(body).unwrap(), None);

    let body = br#"{"data":{}}"#;
    assert_eq!(parse_lookup_response(body).unwrap(), None);
}

#[test]
fn test_parse_server_errors() {
    let body = br#"{"errors":[{"message":"Predicate country is not indexed"}],"data":null}"#;
    let err = parse_lookup_response(body).unwrap_err();

    match err {
        StoreError::Query { message } => assert!(message.contains("not indexed")),
        other => panic!("expected query error, got {other:?}"),
    }
}

#[test]
fn test_parse_garbage_is_decode_error() {
    let err = parse_lookup_response(b"<html>").unwrap_err();
    assert!(matches!(err, StoreError::Decode { .. }));

    let err = parse_lookup_response(b"{}").unwrap_err();
    assert!(matches!(err, StoreError::Decode { .. }));
}

#[test]
fn test_dgraph_store_requires_endpoints() {
    let err = DgraphStore::new(vec![], Duration::from_secs(1)).unwrap_err();
    assert!(matches!(err, ConfigError::NoDgraphEndpoints));

    let err =
        DgraphStore::new(vec!["http://localhost:8080".into()], Duration::ZERO).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidTimeout));
}

#[test]
fn test_dgraph_store_round_robin() {
    let store = DgraphStore::new(
        vec![
            "http://alpha0:8080/".into(),
            "http://alpha1:8080".into(),
            "http://alpha2:8080".into(),
        ],
        Duration::from_secs(1),
    )
    .unwrap();

    let picked: Vec<String> = (0..6).map(|_| store.next_endpoint().to_string()).collect();
    assert_eq!(
        picked,
        vec![
            "http://alpha0:8080",
            "http://alpha1:8080",
            "http://alpha2:8080",
            "http://alpha0:8080",
            "http://alpha1:8080",
            "http://alpha2:8080",
        ]
    );
}

#[tokio::test]
async fn test_dgraph_store_closed_rejects_lookups() {
    let store = DgraphStore::new(vec!["http://localhost:8080".into()], Duration::from_secs(1))
        .unwrap()
        .with_type_filter(true);
    assert!(store.filters_by_type());

    store.close().await.unwrap();
    store.close().await.unwrap();

    let err = store
        .lookup_by_field("country", "country", "Italy")
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Closed));
}

#[tokio::test]
async fn test_dgraph_store_unreachable_is_transport_error() {
    // Port 9 (discard) is closed on test hosts.
    let store = DgraphStore::new(vec!["http://127.0.0.1:9".into()], Duration::from_secs(2))
        .unwrap();

    let err = store
        .lookup_by_field("country", "country", "Italy")
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Transport { .. }));
}

#[tokio::test]
async fn test_mock_store_lookup() {
    let store = MockAuthoritativeStore::new();
    store.insert("country", "Italy", "u123");

    assert_eq!(
        store.lookup_by_field("country", "country", "Italy").await.unwrap(),
        Some("u123".to_string())
    );
    assert_eq!(
        store.lookup_by_field("country", "country", "France").await.unwrap(),
        None
    );
    assert_eq!(store.query_count(), 2);

    store.set_failing(true);
    let err = store
        .lookup_by_field("country", "country", "Italy")
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Query { .. }));
}
