//! Shared test double for the transport seam.

use forcelink::{ApiResponse, Error, Result, Transport, Verb};
use serde_json::{json, Value};
use std::sync::{Mutex, Once};

static INIT_TRACING: Once = Once::new();

/// Honors `RUST_LOG` so failing runs can be re-run with the client's
/// `debug!` output visible.
fn init_tracing() {
    INIT_TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Records every call and replays canned query results in order.
#[derive(Default)]
pub struct MockTransport {
    pub calls: Mutex<Vec<String>>,
    pub query_results: Mutex<Vec<Vec<Value>>>,
    pub fail_remote: bool,
}

impl MockTransport {
    pub fn new() -> Self {
        init_tracing();
        Self::default()
    }

    pub fn failing() -> Self {
        init_tracing();
        Self {
            fail_remote: true,
            ..Self::default()
        }
    }

    pub fn push_query_result(&self, records: Vec<Value>) {
        self.query_results.lock().unwrap().push(records);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn remote_failure<T>(&self) -> Result<T> {
        Err(Error::Api {
            status: 400,
            message: "Required fields are missing".to_string(),
        })
    }
}

impl Transport for MockTransport {
    fn execute_verb(&self, verb: Verb, path: &str, _params: Option<&Value>) -> Result<ApiResponse> {
        self.record(format!("{} {}", verb.as_str(), path));
        Ok(ApiResponse {
            status: 200,
            body: json!({}),
        })
    }

    fn query(&self, soql: &str) -> Result<Vec<Value>> {
        self.record(format!("query {}", soql));
        let mut queue = self.query_results.lock().unwrap();
        if queue.is_empty() {
            Ok(vec![])
        } else {
            Ok(queue.remove(0))
        }
    }

    fn search(&self, sosl: &str) -> Result<Vec<Value>> {
        self.record(format!("search {}", sosl));
        Ok(vec![])
    }

    fn describe(&self, resource: Option<&str>) -> Result<Value> {
        self.record(format!("describe {:?}", resource));
        Ok(json!({ "name": resource }))
    }

    fn find(&self, resource: &str, id: &str, field: Option<&str>) -> Result<Value> {
        self.record(format!("find {} {} {:?}", resource, id, field));
        Ok(json!({ "Id": id, "attributes": { "type": resource } }))
    }

    fn create(&self, resource: &str, attrs: &Value) -> Result<String> {
        self.record(format!("create {} {}", resource, attrs));
        if self.fail_remote {
            return self.remote_failure();
        }
        Ok("003000000000001".to_string())
    }

    fn update(&self, resource: &str, id: &str, attrs: &Value) -> Result<()> {
        self.record(format!("update {} {} {}", resource, id, attrs));
        if self.fail_remote {
            return self.remote_failure();
        }
        Ok(())
    }

    fn upsert(
        &self,
        resource: &str,
        field: &str,
        external_id: &str,
        attrs: &Value,
    ) -> Result<Option<String>> {
        self.record(format!(
            "upsert {} {} {} {}",
            resource, field, external_id, attrs
        ));
        if self.fail_remote {
            return self.remote_failure();
        }
        Ok(Some("003000000000002".to_string()))
    }

    fn destroy(&self, resource: &str, id: &str) -> Result<()> {
        self.record(format!("destroy {} {}", resource, id));
        if self.fail_remote {
            return self.remote_failure();
        }
        Ok(())
    }
}
