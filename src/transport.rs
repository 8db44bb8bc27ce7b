//! The seam between the query core and the wire.

use crate::protocol::{ApiResponse, Result, Verb};
use serde_json::Value;

/// Narrow interface the query core consumes.
///
/// Implementations own everything about the wire: timeouts, retries,
/// pagination the remote service performs implicitly. The core only asks for
/// "run this query string" and the handful of point operations below, and it
/// holds the implementation as `Arc<dyn Transport>` so test doubles slot in
/// without touching the query layer.
pub trait Transport: Send + Sync {
    /// Raw verb access to an arbitrary API path.
    fn execute_verb(&self, verb: Verb, path: &str, params: Option<&Value>) -> Result<ApiResponse>;

    /// Executes a compiled query string, returning the record sequence.
    fn query(&self, soql: &str) -> Result<Vec<Value>>;

    /// Executes a full-text search expression.
    fn search(&self, sosl: &str) -> Result<Vec<Value>>;

    /// Metadata for one resource, or the resource catalog when `None`.
    fn describe(&self, resource: Option<&str>) -> Result<Value>;

    /// Point lookup by Id, or by `field` when given (external-id lookup).
    fn find(&self, resource: &str, id: &str, field: Option<&str>) -> Result<Value>;

    /// Creates a record, returning its new Id.
    fn create(&self, resource: &str, attrs: &Value) -> Result<String>;

    /// Updates the record addressed by `id`.
    fn update(&self, resource: &str, id: &str, attrs: &Value) -> Result<()>;

    /// Creates or updates on an external-id field. Returns the new Id when
    /// the service created a record, `None` when it updated one in place.
    fn upsert(
        &self,
        resource: &str,
        field: &str,
        external_id: &str,
        attrs: &Value,
    ) -> Result<Option<String>>;

    /// Deletes the record addressed by `id`.
    fn destroy(&self, resource: &str, id: &str) -> Result<()>;
}
