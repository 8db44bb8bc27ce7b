//! CRUD surface, error degradation, and raw verb access.

mod common;

use common::MockTransport;
use forcelink::{Client, Error};
use serde_json::json;
use std::sync::Arc;

fn client_over(mock: &Arc<MockTransport>) -> Client {
    Client::new(mock.clone())
}

#[test]
fn update_without_id_fails_before_any_request() {
    let mock = Arc::new(MockTransport::new());
    let client = client_over(&mock);

    let err = client
        .resource("Account")
        .update(&json!({"Name": "Acme"}))
        .unwrap_err();

    assert!(matches!(err, Error::MissingField(field) if field == "Id"));
    assert!(mock.calls().is_empty());
}

#[test]
fn update_strips_the_id_from_the_body() {
    let mock = Arc::new(MockTransport::new());
    let client = client_over(&mock);

    client
        .resource("Account")
        .update(&json!({"Id": "001", "Name": "Acme"}))
        .unwrap();

    assert_eq!(mock.calls(), vec!["update Account 001 {\"Name\":\"Acme\"}"]);
}

#[test]
fn strict_create_propagates_remote_errors() {
    let mock = Arc::new(MockTransport::failing());
    let client = client_over(&mock);

    let err = client
        .resource("Account")
        .create(&json!({"Name": "Acme"}))
        .unwrap_err();

    assert!(matches!(err, Error::Api { status: 400, .. }));
}

#[test]
fn tolerant_create_degrades_on_remote_errors() {
    let mock = Arc::new(MockTransport::failing());
    let client = client_over(&mock);

    let outcome = client
        .resource("Account")
        .try_create(&json!({"Name": "Acme"}))
        .unwrap();

    assert!(outcome.is_none());
}

#[test]
fn tolerant_update_still_propagates_local_errors() {
    let mock = Arc::new(MockTransport::failing());
    let client = client_over(&mock);

    // Missing Id is a local failure, not a remote one.
    let err = client
        .resource("Account")
        .try_update(&json!({"Name": "Acme"}))
        .unwrap_err();

    assert!(matches!(err, Error::MissingField(_)));
}

#[test]
fn tolerant_destroy_degrades_to_false() {
    let mock = Arc::new(MockTransport::failing());
    let client = client_over(&mock);

    assert!(!client.resource("Account").try_destroy("001").unwrap());
}

#[test]
fn upsert_requires_and_strips_the_external_id_field() {
    let mock = Arc::new(MockTransport::new());
    let client = client_over(&mock);
    let handle = client.resource("Account");

    let err = handle
        .upsert("External_Id", &json!({"Name": "Acme"}))
        .unwrap_err();
    assert!(matches!(err, Error::MissingField(field) if field == "External_Id"));
    assert!(mock.calls().is_empty());

    let id = handle
        .upsert("External_Id", &json!({"External_Id": "42", "Name": "Acme"}))
        .unwrap();
    assert_eq!(id.as_deref(), Some("003000000000002"));
    assert_eq!(
        mock.calls(),
        vec!["upsert Account External_Id 42 {\"Name\":\"Acme\"}"]
    );
}

#[test]
fn raw_verbs_pass_through_the_transport() {
    let mock = Arc::new(MockTransport::new());
    let client = client_over(&mock);

    let response = client.get("/services/data", None).unwrap();
    assert_eq!(response.status, 200);
    client
        .post("/services/data/v62.0/sobjects/Task", Some(&json!({})))
        .unwrap();
    client.delete("/services/data/v62.0/sobjects/Task/001").unwrap();

    assert_eq!(
        mock.calls(),
        vec![
            "GET /services/data",
            "POST /services/data/v62.0/sobjects/Task",
            "DELETE /services/data/v62.0/sobjects/Task/001",
        ]
    );
}

#[test]
fn client_query_wraps_transport_records() {
    let mock = Arc::new(MockTransport::new());
    mock.push_query_result(vec![json!({"Id": "001"}), json!({"Id": "002"})]);
    let client = client_over(&mock);

    let records = client.query("SELECT Id FROM Account").unwrap();
    assert_eq!(records.ids(), vec!["001", "002"]);
}

#[test]
fn handle_invoke_dispatches_known_operations() {
    let mock = Arc::new(MockTransport::new());
    let client = client_over(&mock);
    let handle = client.resource("Account");

    let record = handle.invoke("find", &[json!("001")]).unwrap();
    assert_eq!(record["Id"], "001");

    let id = handle.invoke("create", &[json!({"Name": "Acme"})]).unwrap();
    assert_eq!(id, json!("003000000000001"));

    let err = handle.invoke("rename_everything", &[]).unwrap_err();
    assert!(matches!(err, Error::UnknownOperation(_)));
}

#[test]
fn handle_invoke_update_executes_directly_without_a_query() {
    let mock = Arc::new(MockTransport::new());
    let client = client_over(&mock);

    let outcome = client
        .resource("Account")
        .invoke("update", &[json!({"Id": "001", "Name": "Acme"})])
        .unwrap();

    assert_eq!(outcome, json!(true));
    assert_eq!(mock.calls(), vec!["update Account 001 {\"Name\":\"Acme\"}"]);
}

#[test]
fn handle_invoke_upsert_executes_directly_without_a_query() {
    let mock = Arc::new(MockTransport::new());
    let client = client_over(&mock);

    let id = client
        .resource("Account")
        .invoke(
            "upsert",
            &[
                json!("External_Id"),
                json!({"External_Id": "42", "Name": "Acme"}),
            ],
        )
        .unwrap();

    assert_eq!(id, json!("003000000000002"));
    assert_eq!(
        mock.calls(),
        vec!["upsert Account External_Id 42 {\"Name\":\"Acme\"}"]
    );
}

#[test]
fn handle_invoke_tolerant_variants_degrade_like_their_methods() {
    let mock = Arc::new(MockTransport::failing());
    let client = client_over(&mock);
    let handle = client.resource("Account");

    assert_eq!(
        handle.invoke("try_create", &[json!({"Name": "Acme"})]).unwrap(),
        json!(null)
    );
    assert_eq!(handle.invoke("try_destroy", &[json!("001")]).unwrap(), json!(false));
}

#[test]
fn upsert_accepts_a_numeric_external_id() {
    let mock = Arc::new(MockTransport::new());
    let client = client_over(&mock);

    let id = client
        .resource("Account")
        .upsert("External_Id", &json!({"External_Id": 42, "Name": "Acme"}))
        .unwrap();

    assert_eq!(id.as_deref(), Some("003000000000002"));
    assert_eq!(
        mock.calls(),
        vec!["upsert Account External_Id 42 {\"Name\":\"Acme\"}"]
    );
}
