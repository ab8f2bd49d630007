use std::sync::Arc;

use async_trait::async_trait;
use lavamirror_core::{ExtendedMetadata, HasExtendedMetadata, TrackReference, TrackVariant};
use lavamirror_net::NetworkPathPool;
use tokio_util::sync::CancellationToken;
use tracing::{Level, debug, instrument, warn};

use crate::{
    error::PlaybackError,
    playback::{PlayableTrack, TrackExecutor},
    resolver::{ProviderChainResolver, ResolvesViaProviderChain},
    template::ProviderChain,
};

/// Pista de un catálogo espejo: solo metadatos hasta que se reproduce.
///
/// Al reproducirse resuelve un delegado con la cadena de proveedores del catálogo
/// y le pasa el ejecutor. Todo lo compartido es inmutable y vive detrás de `Arc`;
/// el token de cancelación es propio de cada instancia.
#[derive(Debug)]
pub struct MirroringPlayableTrack {
    reference: Arc<TrackReference>,
    metadata: Option<Arc<ExtendedMetadata>>,
    chain: ProviderChain,
    resolver: Arc<ProviderChainResolver>,
    pool: Arc<NetworkPathPool>,
    preview_format: Arc<str>,
    cancel: CancellationToken,
}

impl MirroringPlayableTrack {
    pub fn new(
        reference: TrackReference,
        metadata: Option<ExtendedMetadata>,
        chain: ProviderChain,
        resolver: Arc<ProviderChainResolver>,
        pool: Arc<NetworkPathPool>,
        preview_format: impl Into<Arc<str>>,
    ) -> Self {
        MirroringPlayableTrack {
            reference: Arc::new(reference),
            metadata: metadata.map(Arc::new),
            chain,
            resolver,
            pool,
            preview_format: preview_format.into(),
            cancel: CancellationToken::new(),
        }
    }

    /// Copia que comparte todo lo inmutable pero tiene su propio estado de reproducción.
    pub fn shallow_clone(&self) -> Self {
        MirroringPlayableTrack {
            reference: Arc::clone(&self.reference),
            metadata: self.metadata.clone(),
            chain: self.chain.clone(),
            resolver: Arc::clone(&self.resolver),
            pool: Arc::clone(&self.pool),
            preview_format: Arc::clone(&self.preview_format),
            cancel: CancellationToken::new(),
        }
    }

    /// Cancela la resolución en curso (y las futuras) de esta instancia.
    pub fn stop(&self) {
        debug!(track = %self.reference.identifier, "reproducción detenida");
        self.cancel.cancel();
    }

    pub fn is_stopped(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn is_preview(&self) -> bool {
        self.metadata.as_deref().is_some_and(|m| m.is_preview)
    }

    async fn play_preview(&self, executor: &mut dyn TrackExecutor) -> Result<(), PlaybackError> {
        let url = self
            .reference
            .preview_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| PlaybackError::MissingPreviewUrl(self.reference.identifier.clone()))?;

        let interface = self.pool.acquire().interface()?;
        debug!(path = interface.path(), "reproduciendo preview");

        let stream = tokio::select! {
            biased;

            _ = self.cancel.cancelled() => {
                return Err(PlaybackError::Stopped(self.reference.identifier.clone()));
            }
            stream = interface.open_stream(url) => stream?,
        };

        executor.play_stream(&self.preview_format, stream).await
    }
}

#[async_trait]
impl PlayableTrack for MirroringPlayableTrack {
    fn identifier(&self) -> &str {
        &self.reference.identifier
    }

    #[instrument(
        level = Level::DEBUG,
        skip_all,
        fields(track = %self.reference.identifier, catalog = %self.reference.catalog)
    )]
    async fn process(&self, executor: &mut dyn TrackExecutor) -> Result<(), PlaybackError> {
        if self.is_preview() {
            return self.play_preview(executor).await;
        }

        let delegate = self
            .resolver
            .resolve(&self.reference, &self.chain, &self.cancel)
            .await
            .inspect_err(|e| warn!(%e, "no se pudo resolver un espejo"))?;

        delegate.process(executor).await
    }
}

impl TrackVariant for MirroringPlayableTrack {
    fn reference(&self) -> &TrackReference {
        &self.reference
    }

    fn as_extended(&self) -> Option<&dyn HasExtendedMetadata> {
        Some(self)
    }
}

impl HasExtendedMetadata for MirroringPlayableTrack {
    fn extended_metadata(&self) -> Option<&ExtendedMetadata> {
        self.metadata.as_deref()
    }
}

impl ResolvesViaProviderChain for MirroringPlayableTrack {
    fn provider_chain(&self) -> &ProviderChain {
        &self.chain
    }

    fn resolver(&self) -> &ProviderChainResolver {
        &self.resolver
    }
}
