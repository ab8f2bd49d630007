use std::fmt;

use serde::{Deserialize, Serialize};

fn default_protocol() -> String {
    "http".to_string()
}

/// Proxy HTTP por el que puede salir el tráfico.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyEndpoint {
    #[serde(default = "default_protocol")]
    pub protocol: String,
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

impl ProxyEndpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        ProxyEndpoint {
            protocol: default_protocol(),
            host: host.into(),
            port,
            user: None,
            password: None,
        }
    }

    pub fn with_credentials(mut self, user: impl Into<String>, password: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self.password = Some(password.into());
        self
    }

    pub fn url(&self) -> String {
        format!("{}://{}:{}", self.protocol, self.host, self.port)
    }

    /// Credenciales propias, solo si hay usuario (no vacío) y contraseña.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (self.user.as_deref(), self.password.as_deref()) {
            (Some(user), Some(password)) if !user.trim().is_empty() => Some((user, password)),
            _ => None,
        }
    }
}

/// Ruta de salida: directa o a través de un proxy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathEndpoint {
    Direct,
    Proxy(ProxyEndpoint),
}

impl PathEndpoint {
    pub fn is_direct(&self) -> bool {
        matches!(self, PathEndpoint::Direct)
    }
}

impl fmt::Display for PathEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // Nunca se imprimen credenciales
            PathEndpoint::Direct => write!(f, "direct"),
            PathEndpoint::Proxy(proxy) => write!(f, "{}", proxy.url()),
        }
    }
}
