mod builder;
mod http;
mod records;
mod resource;

pub use builder::{AuthMethod, ClientBuilder};
pub use http::HttpTransport;
pub use records::Records;
pub use resource::{ResourceConfig, ResourceHandle};

use crate::protocol::{ApiResponse, Result, Verb};
use crate::transport::Transport;
use serde_json::Value;
use std::sync::Arc;

/// Top-level client: raw verb access, query and search execution, CRUD over
/// named resources, and the [`ResourceHandle`] factory.
pub struct Client {
    transport: Arc<dyn Transport>,
}

impl Client {
    /// Wraps an existing transport. Most callers go through
    /// [`Client::builder`] instead.
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    pub fn builder(base_url: &str) -> ClientBuilder {
        ClientBuilder::new(base_url)
    }

    // Raw verb access to arbitrary API paths. The response status is
    // surfaced as-is; only connection-level failures become errors.

    pub fn get(&self, path: &str, params: Option<&Value>) -> Result<ApiResponse> {
        self.transport.execute_verb(Verb::Get, path, params)
    }

    pub fn post(&self, path: &str, params: Option<&Value>) -> Result<ApiResponse> {
        self.transport.execute_verb(Verb::Post, path, params)
    }

    pub fn put(&self, path: &str, params: Option<&Value>) -> Result<ApiResponse> {
        self.transport.execute_verb(Verb::Put, path, params)
    }

    pub fn patch(&self, path: &str, params: Option<&Value>) -> Result<ApiResponse> {
        self.transport.execute_verb(Verb::Patch, path, params)
    }

    pub fn delete(&self, path: &str) -> Result<ApiResponse> {
        self.transport.execute_verb(Verb::Delete, path, None)
    }

    pub fn head(&self, path: &str) -> Result<ApiResponse> {
        self.transport.execute_verb(Verb::Head, path, None)
    }

    /// Executes an already-compiled query string.
    pub fn query(&self, soql: &str) -> Result<Records> {
        Ok(Records::new(self.transport.query(soql)?))
    }

    /// Executes a full-text search expression.
    pub fn search(&self, sosl: &str) -> Result<Records> {
        Ok(Records::new(self.transport.search(sosl)?))
    }

    /// Metadata for one resource, or the resource catalog when `None`.
    pub fn describe(&self, resource: Option<&str>) -> Result<Value> {
        self.transport.describe(resource)
    }

    /// Handle scoped to `name` with default configuration.
    pub fn resource(&self, name: &str) -> ResourceHandle {
        self.resource_with(name, ResourceConfig::default())
    }

    /// Handle scoped to `name` carrying a caller-declared attribute list and
    /// relationship bindings.
    pub fn resource_with(&self, name: &str, config: ResourceConfig) -> ResourceHandle {
        ResourceHandle::new(Arc::clone(&self.transport), name, config)
    }

    // CRUD passthrough per resource name. Strict variants propagate every
    // failure; `try_` variants degrade on remote errors.

    pub fn find(&self, resource: &str, id: &str) -> Result<Value> {
        self.resource(resource).find(id)
    }

    pub fn create(&self, resource: &str, attrs: &Value) -> Result<String> {
        self.resource(resource).create(attrs)
    }

    pub fn try_create(&self, resource: &str, attrs: &Value) -> Result<Option<String>> {
        self.resource(resource).try_create(attrs)
    }

    pub fn update(&self, resource: &str, attrs: &Value) -> Result<()> {
        self.resource(resource).update(attrs)
    }

    pub fn try_update(&self, resource: &str, attrs: &Value) -> Result<bool> {
        self.resource(resource).try_update(attrs)
    }

    pub fn upsert(&self, resource: &str, field: &str, attrs: &Value) -> Result<Option<String>> {
        self.resource(resource).upsert(field, attrs)
    }

    pub fn try_upsert(&self, resource: &str, field: &str, attrs: &Value) -> Result<Option<String>> {
        self.resource(resource).try_upsert(field, attrs)
    }

    pub fn destroy(&self, resource: &str, id: &str) -> Result<()> {
        self.resource(resource).destroy(id)
    }

    pub fn try_destroy(&self, resource: &str, id: &str) -> Result<bool> {
        self.resource(resource).try_destroy(id)
    }
}
