use std::{fmt, time::Duration};

use lavamirror_net::NetError;
use thiserror::Error;

use crate::template::Placeholder;

/// Gravedad que el subsistema de carga asigna a un fallo de búsqueda.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Fallo esperable (contenido no disponible, región bloqueada...)
    Common,
    /// Causa desconocida, posiblemente un cambio en el proveedor
    Suspicious,
    /// Error interno del cargador
    Fault,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Severity::Common => "common",
            Severity::Suspicious => "suspicious",
            Severity::Fault => "fault",
        };
        f.write_str(s)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    #[error("Provider template is empty")]
    Empty,

    #[error("Provider template {template} has more than one placeholder")]
    MultiplePlaceholders { template: String },

    /// La pista no tiene el dato que pide la plantilla; se salta sin más
    #[error("Provider template {template} needs {placeholder} but the track has none")]
    PlaceholderUnsatisfied { template: String, placeholder: Placeholder },
}

/// Resultado fallido de una carga por búsqueda
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    #[error("Search failed ({severity}): {message}")]
    Search { message: String, severity: Severity },

    #[error("No answer from the loader within {0:?}")]
    Timeout(Duration),

    #[error("Load was cancelled")]
    Cancelled,

    #[error("Loader dropped the request without answering")]
    Abandoned,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("Provider search failed for template {template}: {source}")]
    ProviderSearchFailed { template: String, source: LoadError },

    #[error("No playable mirror found")]
    NoPlayableMirror,
}

#[derive(Error, Debug)]
pub enum PlaybackError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error("Preview track {0} has no preview URL")]
    MissingPreviewUrl(String),

    #[error("Playback of {0} was stopped")]
    Stopped(String),

    #[error("Network error: {0}")]
    Net(#[from] NetError),

    #[error("Executor error: {0}")]
    Executor(String),
}

impl PlaybackError {
    /// Mensaje apto para mostrar al oyente.
    pub fn user_message(&self) -> &'static str {
        match self {
            PlaybackError::Resolve(ResolveError::NoPlayableMirror) => "no matching track found",
            _ => "track could not start",
        }
    }
}

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("Configuration parse error: {0}")]
    Parse(#[from] config::ConfigError),

    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error("Invalid settings: {0}")]
    Invalid(String),
}

/// Errores al montar la fuente espejo a partir de su configuración
#[derive(Error, Debug)]
pub enum SourceError {
    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error("Failed to build the network path pool: {0}")]
    Net(#[from] NetError),
}
