//! HTTP transport over the REST surface.

use crate::protocol::{ApiResponse, CreateResult, Error, QueryResponse, Result, Verb};
use crate::transport::Transport;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};

const DEFAULT_TIMEOUT_MS: u64 = 30_000;

pub(crate) const DEFAULT_API_VERSION: &str = "62.0";

/// Blocking [`Transport`] implementation over the service's REST API.
pub struct HttpTransport {
    base_url: String,
    api_version: String,
    token: Option<String>,
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT_MS)
    }

    pub fn with_timeout(base_url: &str, timeout_ms: u64) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .pool_idle_timeout(Duration::from_secs(30))
            .pool_max_idle_per_host(16)
            .build()
            .map_err(|e| Error::Connection(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            token: None,
            client,
        })
    }

    pub fn set_api_version(&mut self, version: &str) {
        self.api_version = version.to_string();
    }

    pub fn set_token(&mut self, token: &str) {
        self.token = Some(token.to_string());
    }

    /// OAuth password-grant login; stores the bearer token on success.
    pub fn login(&mut self, username: &str, password: &str) -> Result<()> {
        let response = self
            .client
            .post(format!("{}/services/oauth2/token", self.base_url))
            .form(&[
                ("grant_type", "password"),
                ("username", username),
                ("password", password),
            ])
            .send()
            .map_err(|e| Error::Connection(format!("HTTP request failed: {}", e)))?;

        if response.status().as_u16() == 400 || response.status().as_u16() == 401 {
            return Err(Error::Auth("invalid credentials".to_string()));
        }

        let data: Value = response
            .json()
            .map_err(|e| Error::Protocol(format!("failed to parse login response: {}", e)))?;

        match data.get("access_token").and_then(Value::as_str) {
            Some(token) => {
                self.token = Some(token.to_string());
                info!(username, "authenticated");
                Ok(())
            }
            None => Err(Error::Auth("no access token in response".to_string())),
        }
    }

    fn data_path(&self, suffix: &str) -> String {
        format!("{}/services/data/v{}{}", self.base_url, self.api_version, suffix)
    }

    fn headers(&self) -> Result<reqwest::header::HeaderMap> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::CONTENT_TYPE,
            reqwest::header::HeaderValue::from_static("application/json"),
        );
        if let Some(token) = &self.token {
            let value = reqwest::header::HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|_| Error::Auth("token is not a valid header value".to_string()))?;
            headers.insert(reqwest::header::AUTHORIZATION, value);
        }
        Ok(headers)
    }

    /// Sends the request and surfaces the response as-is: HTTP failures are
    /// not converted to errors here. Non-JSON bodies come back as strings.
    fn send_raw(&self, request: reqwest::blocking::RequestBuilder) -> Result<ApiResponse> {
        let response = request
            .headers(self.headers()?)
            .send()
            .map_err(|e| Error::Connection(format!("HTTP request failed: {}", e)))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .map_err(|e| Error::Protocol(format!("failed to read response: {}", e)))?;
        let body = if text.is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or(Value::String(text))
        };
        Ok(ApiResponse { status, body })
    }

    /// [`send_raw`](Self::send_raw) plus conversion of HTTP failures into
    /// [`Error::Api`].
    fn send_ok(&self, request: reqwest::blocking::RequestBuilder) -> Result<ApiResponse> {
        let response = self.send_raw(request)?;
        if !response.is_success() {
            return Err(Error::Api {
                status: response.status,
                message: api_message(&response.body),
            });
        }
        Ok(response)
    }

    fn method_of(verb: Verb) -> reqwest::Method {
        match verb {
            Verb::Get => reqwest::Method::GET,
            Verb::Post => reqwest::Method::POST,
            Verb::Put => reqwest::Method::PUT,
            Verb::Patch => reqwest::Method::PATCH,
            Verb::Delete => reqwest::Method::DELETE,
            Verb::Head => reqwest::Method::HEAD,
        }
    }
}

impl Transport for HttpTransport {
    fn execute_verb(&self, verb: Verb, path: &str, params: Option<&Value>) -> Result<ApiResponse> {
        let url = format!("{}{}", self.base_url, path);
        debug!(verb = verb.as_str(), path, "request");
        let mut request = self.client.request(Self::method_of(verb), &url);
        if let Some(body) = params {
            request = request.json(body);
        }
        self.send_raw(request)
    }

    fn query(&self, soql: &str) -> Result<Vec<Value>> {
        debug!(soql, "query");
        let request = self
            .client
            .get(self.data_path("/query"))
            .query(&[("q", soql)]);
        let response = self.send_ok(request)?;
        let parsed: QueryResponse = serde_json::from_value(response.body)
            .map_err(|e| Error::Protocol(format!("invalid query response: {}", e)))?;
        Ok(parsed.records)
    }

    fn search(&self, sosl: &str) -> Result<Vec<Value>> {
        debug!(sosl, "search");
        let request = self
            .client
            .get(self.data_path("/search"))
            .query(&[("q", sosl)]);
        let response = self.send_ok(request)?;
        Ok(response
            .body
            .get("searchRecords")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default())
    }

    fn describe(&self, resource: Option<&str>) -> Result<Value> {
        let url = match resource {
            Some(name) => self.data_path(&format!("/sobjects/{}/describe", name)),
            None => self.data_path("/sobjects"),
        };
        Ok(self.send_ok(self.client.get(url))?.body)
    }

    fn find(&self, resource: &str, id: &str, field: Option<&str>) -> Result<Value> {
        let url = match field {
            Some(field) => self.data_path(&format!("/sobjects/{}/{}/{}", resource, field, id)),
            None => self.data_path(&format!("/sobjects/{}/{}", resource, id)),
        };
        Ok(self.send_ok(self.client.get(url))?.body)
    }

    fn create(&self, resource: &str, attrs: &Value) -> Result<String> {
        let url = self.data_path(&format!("/sobjects/{}", resource));
        let response = self.send_ok(self.client.post(url).json(attrs))?;
        let result: CreateResult = serde_json::from_value(response.body)
            .map_err(|e| Error::Protocol(format!("invalid create response: {}", e)))?;
        result
            .id
            .ok_or_else(|| Error::Protocol("no id in create response".to_string()))
    }

    fn update(&self, resource: &str, id: &str, attrs: &Value) -> Result<()> {
        let url = self.data_path(&format!("/sobjects/{}/{}", resource, id));
        self.send_ok(self.client.patch(url).json(attrs))?;
        Ok(())
    }

    fn upsert(
        &self,
        resource: &str,
        field: &str,
        external_id: &str,
        attrs: &Value,
    ) -> Result<Option<String>> {
        let url = self.data_path(&format!("/sobjects/{}/{}/{}", resource, field, external_id));
        let response = self.send_ok(self.client.patch(url).json(attrs))?;
        // 201 carries the new record's id; 204 means an in-place update.
        if response.status == 201 {
            let result: CreateResult = serde_json::from_value(response.body)
                .map_err(|e| Error::Protocol(format!("invalid upsert response: {}", e)))?;
            Ok(result.id)
        } else {
            Ok(None)
        }
    }

    fn destroy(&self, resource: &str, id: &str) -> Result<()> {
        let url = self.data_path(&format!("/sobjects/{}/{}", resource, id));
        self.send_ok(self.client.delete(url))?;
        Ok(())
    }
}

/// Error payloads arrive as `[{"message": ..., "errorCode": ...}]`.
fn api_message(body: &Value) -> String {
    let detail = body
        .as_array()
        .and_then(|errors| errors.first())
        .unwrap_or(body);
    detail
        .get("message")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| detail.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn api_message_prefers_first_error_entry() {
        let body = json!([{"message": "Required fields are missing", "errorCode": "REQUIRED_FIELD_MISSING"}]);
        assert_eq!(api_message(&body), "Required fields are missing");
    }

    #[test]
    fn api_message_falls_back_to_raw_body() {
        let body = json!("Service Unavailable");
        assert_eq!(api_message(&body), "\"Service Unavailable\"");
    }

    #[test]
    fn malformed_token_is_an_auth_error_not_a_panic() {
        let mut transport = HttpTransport::new("https://example.my.salesforce.com").unwrap();
        transport.set_token("abc\ndef");
        let err = transport.headers().unwrap_err();
        assert!(matches!(err, Error::Auth(_)));
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let transport = HttpTransport::new("https://example.my.salesforce.com/").unwrap();
        assert_eq!(
            transport.data_path("/query"),
            "https://example.my.salesforce.com/services/data/v62.0/query"
        );
    }
}
