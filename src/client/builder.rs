use super::http::{HttpTransport, DEFAULT_API_VERSION};
use super::Client;
use crate::protocol::Result;
use std::sync::Arc;

/// Configures and builds a [`Client`] over an [`HttpTransport`].
pub struct ClientBuilder {
    base_url: String,
    auth: Option<AuthMethod>,
    api_version: String,
    timeout_ms: Option<u64>,
}

pub enum AuthMethod {
    UsernamePassword { username: String, password: String },
    Token { token: String },
}

impl ClientBuilder {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            auth: None,
            api_version: DEFAULT_API_VERSION.to_string(),
            timeout_ms: None,
        }
    }

    /// Password-grant credentials; the login round-trip happens in
    /// [`build`](Self::build).
    pub fn auth(mut self, username: &str, password: &str) -> Self {
        self.auth = Some(AuthMethod::UsernamePassword {
            username: username.to_string(),
            password: password.to_string(),
        });
        self
    }

    /// Pre-issued bearer token; no login round-trip.
    pub fn token(mut self, token: &str) -> Self {
        self.auth = Some(AuthMethod::Token {
            token: token.to_string(),
        });
        self
    }

    pub fn api_version(mut self, version: &str) -> Self {
        self.api_version = version.to_string();
        self
    }

    pub fn timeout_ms(mut self, ms: u64) -> Self {
        self.timeout_ms = Some(ms);
        self
    }

    pub fn build(self) -> Result<Client> {
        let mut transport = match self.timeout_ms {
            Some(ms) => HttpTransport::with_timeout(&self.base_url, ms)?,
            None => HttpTransport::new(&self.base_url)?,
        };
        transport.set_api_version(&self.api_version);

        match self.auth {
            Some(AuthMethod::UsernamePassword { username, password }) => {
                transport.login(&username, &password)?;
            }
            Some(AuthMethod::Token { token }) => transport.set_token(&token),
            None => {}
        }

        Ok(Client::new(Arc::new(transport)))
    }
}
