//! Connection configuration
//!
//! A [`ConnectionConfig`] names one remote registry endpoint. Its
//! [`ConfigKey`] identifies the process-wide session for that endpoint;
//! [`ConnectionConfig::masked_key`] is the rendering used in every log line
//! and error message.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Character substituted for each password character in masked keys
pub const MASK_CHAR: char = '*';

/// Remote registry endpoint and credentials
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    /// Transport protocol (`http` or `https`)
    pub protocol: String,
    /// Server host name
    pub host: String,
    /// Server port
    pub port: u16,
    /// Login user
    pub username: String,
    /// Login password
    pub password: String,
    /// Server context path (without slashes)
    pub context: String,
    /// Optional HTTP proxy host
    pub proxy_host: Option<String>,
    /// Optional HTTP proxy port
    pub proxy_port: Option<u16>,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            protocol: "http".to_string(),
            host: "localhost".to_string(),
            port: 4516,
            username: "admin".to_string(),
            password: String::new(),
            context: "deployit".to_string(),
            proxy_host: None,
            proxy_port: None,
        }
    }
}

impl ConnectionConfig {
    /// Create config with defaults
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set protocol
    #[inline]
    #[must_use]
    pub fn with_protocol(mut self, protocol: impl Into<String>) -> Self {
        self.protocol = protocol.into();
        self
    }

    /// Set host
    #[inline]
    #[must_use]
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Set port
    #[inline]
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set credentials
    #[inline]
    #[must_use]
    pub fn with_credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = username.into();
        self.password = password.into();
        self
    }

    /// Set context path
    #[inline]
    #[must_use]
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = context.into();
        self
    }

    /// Route through an HTTP proxy
    #[inline]
    #[must_use]
    pub fn with_proxy(mut self, host: impl Into<String>, port: u16) -> Self {
        self.proxy_host = Some(host.into());
        self.proxy_port = Some(port);
        self
    }

    /// Parse from TOML text
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Toml`] on malformed input.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Load from a TOML file
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read and
    /// [`ConfigError::Toml`] if it cannot be parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::io_error(path, e))?;
        Self::from_toml_str(&text)
    }

    /// Session identity for this configuration (password included)
    #[must_use]
    pub fn key(&self) -> ConfigKey {
        ConfigKey(self.render(&self.password))
    }

    /// Key rendering safe for diagnostics
    ///
    /// Each password character becomes [`MASK_CHAR`]; length is preserved.
    #[must_use]
    pub fn masked_key(&self) -> String {
        self.render(&mask(&self.password))
    }

    fn render(&self, password: &str) -> String {
        let mut key = format!(
            "{}://{}:{}@{}:{}/{}",
            self.protocol, self.username, password, self.host, self.port, self.context
        );
        if let Some(proxy_host) = &self.proxy_host {
            key.push_str(&format!(" via {proxy_host}"));
            if let Some(proxy_port) = self.proxy_port {
                key.push_str(&format!(":{proxy_port}"));
            }
        }
        key
    }
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("protocol", &self.protocol)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &mask(&self.password))
            .field("context", &self.context)
            .field("proxy_host", &self.proxy_host)
            .field("proxy_port", &self.proxy_port)
            .finish()
    }
}

fn mask(secret: &str) -> String {
    secret.chars().map(|_| MASK_CHAR).collect()
}

/// Identity of one remote session
///
/// Contains the raw password; never log it. `Debug` prints a fixed
/// placeholder.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ConfigKey(String);

impl ConfigKey {
    /// Raw key text (contains credentials)
    #[inline]
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ConfigKey(..)")
    }
}
