use std::{io, string::FromUtf8Error};

use thiserror::Error;

/// Errores del formato binario de pistas
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("I/O: {0}")]
    Io(#[from] io::Error),

    /// El bloque de texto no cabe en un prefijo de longitud u16
    #[error("Text block of {0} bytes exceeds the 65535 byte limit")]
    TextTooLong(usize),

    #[error("Invalid UTF-8 in text block: {0}")]
    Utf8(#[from] FromUtf8Error),

    /// Marcador de presencia distinto de 0/1
    #[error("Invalid presence marker: {0}")]
    InvalidMarker(u8),

    #[error("Malformed extended metadata: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unsupported track format version: {0}")]
    UnsupportedVersion(u8),

    #[error("Unknown catalog: {0}")]
    UnknownCatalog(String),
}
