use std::{path::Path, time::Duration};

use config::{Config, Environment, File, FileFormat};
use derive_builder::Builder;
use lavamirror_net::{ClientOptions, Credentials, ProxyEndpoint, RequestOptions};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{error::SettingsError, matching::AdvancedMirroring, resolver::FailurePolicy, template::ProviderTemplate};

/// Prefijo de las variables de entorno que sobrescriben el fichero (`LAVAMIRROR__LOAD_TIMEOUT=3s`).
pub const ENV_PREFIX: &str = "LAVAMIRROR";

/// Cadena que se usa cuando `providers` está vacío.
pub const DEFAULT_PROVIDERS: [&str; 2] = ["ytsearch:\"%ISRC%\"", "ytsearch:%QUERY%"];

/// Opciones HTTP compartidas por todas las rutas del pool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    #[serde(with = "humantime_serde")]
    pub request_timeout: Option<Duration>,
    #[serde(with = "humantime_serde")]
    pub connect_timeout: Option<Duration>,
    pub user_agent: Option<String>,
    /// Credenciales para los proxies que no traen las suyas
    pub proxy_user: Option<String>,
    pub proxy_password: Option<String>,
}

impl Default for HttpSettings {
    fn default() -> Self {
        HttpSettings {
            request_timeout: Some(Duration::from_secs(10)),
            connect_timeout: Some(Duration::from_secs(5)),
            user_agent: None,
            proxy_user: None,
            proxy_password: None,
        }
    }
}

impl HttpSettings {
    pub fn request_options(&self) -> RequestOptions {
        RequestOptions {
            timeout: self.request_timeout,
        }
    }

    pub fn client_options(&self) -> ClientOptions {
        let proxy_credentials = match (&self.proxy_user, &self.proxy_password) {
            (Some(user), Some(password)) if !user.trim().is_empty() => Some(Credentials {
                username: user.clone(),
                password: password.clone(),
            }),
            _ => None,
        };

        ClientOptions {
            connect_timeout: self.connect_timeout,
            user_agent: self.user_agent.clone(),
            proxy_credentials,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Builder)]
#[builder(setter(into, strip_option), default)]
#[serde(default)]
pub struct MirrorSettings {
    /// Plantillas de proveedores de respaldo, en orden de preferencia; vacío usa [`DEFAULT_PROVIDERS`]
    pub providers: Vec<String>,
    /// Espera máxima por cada búsqueda
    #[serde(with = "humantime_serde")]
    pub load_timeout: Duration,
    pub failure_policy: FailurePolicy,
    pub proxies: Vec<ProxyEndpoint>,
    /// Incluir la ruta directa en la rotación junto a los proxies
    pub use_direct_path: bool,
    pub http: HttpSettings,
    /// Formato que se pide al ejecutor para las previews
    pub preview_format: String,
    /// Puntuación difusa de candidatos; desactivada si falta la sección
    pub advanced_mirroring: Option<AdvancedMirroring>,
}

impl Default for MirrorSettings {
    fn default() -> Self {
        MirrorSettings {
            providers: DEFAULT_PROVIDERS.iter().map(|p| p.to_string()).collect(),
            load_timeout: Duration::from_secs(10),
            failure_policy: FailurePolicy::FailFast,
            proxies: Vec::new(),
            use_direct_path: true,
            http: HttpSettings::default(),
            preview_format: "mp3".into(),
            advanced_mirroring: None,
        }
    }
}

impl MirrorSettings {
    /// Carga desde un TOML; las variables `LAVAMIRROR__*` tienen prioridad.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref().to_string_lossy().into_owned();
        let cfg = Config::builder()
            .add_source(File::new(&path, FileFormat::Toml).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX).separator("__").try_parsing(true))
            .build()?;

        let settings = cfg.try_deserialize::<MirrorSettings>()?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_toml(&self) -> Result<String, SettingsError> {
        Ok(toml::to_string(self)?)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SettingsError> {
        std::fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    pub fn provider_templates(&self) -> Result<Vec<ProviderTemplate>, SettingsError> {
        if self.providers.is_empty() {
            info!("sin proveedores configurados, se usa la cadena por defecto");
            return Ok(DEFAULT_PROVIDERS
                .into_iter()
                .map(ProviderTemplate::parse)
                .collect::<Result<Vec<_>, _>>()?);
        }

        let templates = self
            .providers
            .iter()
            .map(ProviderTemplate::parse)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(templates)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        self.provider_templates()?;
        if let Some(advanced) = &self.advanced_mirroring {
            advanced.validate()?;
        }

        if self.load_timeout.is_zero() {
            return Err(SettingsError::Invalid("load_timeout must be greater than zero".into()));
        }
        if let Some(proxy) = self.proxies.iter().find(|p| p.host.trim().is_empty() || p.port == 0) {
            return Err(SettingsError::Invalid(format!("proxy {} is not a valid endpoint", proxy.url())));
        }
        if self.preview_format.trim().is_empty() {
            return Err(SettingsError::Invalid("preview_format must not be empty".into()));
        }
        Ok(())
    }
}
