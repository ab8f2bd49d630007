use std::time::Duration;

/// Opciones que se aplican a cada petición emitida por una ruta.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestOptions {
    pub timeout: Option<Duration>,
}

/// Usuario y contraseña de un proxy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Opciones del cliente HTTP de cada ruta.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientOptions {
    pub connect_timeout: Option<Duration>,
    pub user_agent: Option<String>,
    /// Credenciales compartidas para los proxies que no definen las suyas.
    pub proxy_credentials: Option<Credentials>,
}
