use std::{fmt::Debug, time::Duration};

use async_trait::async_trait;
use lavamirror_net::Response;

use crate::error::PlaybackError;

/// Receptor del audio: elige el decodificador según el formato pedido y consume el stream.
#[async_trait]
pub trait TrackExecutor: Send {
    async fn play_stream(&mut self, format: &str, stream: Response) -> Result<(), PlaybackError>;
}

/// Lo que el cargador sabe de una pista candidata; se usa para puntuarla.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackInfo {
    pub title: String,
    pub author: String,
    pub length: Duration,
    /// Gestor de origen (`youtube`, `soundcloud`...)
    pub source: String,
}

/// Pista que sabe reproducirse sobre un [`TrackExecutor`].
///
/// Las pistas que devuelve el cargador de respaldo y las pistas espejo comparten
/// esta interfaz, así que una pista espejo puede delegar en cualquiera de ellas.
#[async_trait]
pub trait PlayableTrack: Send + Sync + Debug {
    fn identifier(&self) -> &str;

    fn info(&self) -> Option<&TrackInfo> {
        None
    }

    async fn process(&self, executor: &mut dyn TrackExecutor) -> Result<(), PlaybackError>;
}
