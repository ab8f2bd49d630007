use std::{sync::Arc, time::Duration};

use lavamirror_core::TrackReference;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{Level, debug, info, instrument, warn};

use crate::{
    bridge::{LoadOutcome, Playlist, ResolutionBridge},
    error::{LoadError, ResolveError},
    matching::AdvancedMirroring,
    playback::PlayableTrack,
    template::{ProviderChain, ProviderTemplate},
};

/// Qué hacer cuando la búsqueda de una plantilla falla.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Aborta la cadena con el primer fallo
    #[default]
    FailFast,
    /// Registra el fallo y prueba la siguiente plantilla
    Skip,
}

/// Capacidad de las pistas que se resuelven a través de una cadena de proveedores.
pub trait ResolvesViaProviderChain {
    fn provider_chain(&self) -> &ProviderChain;

    fn resolver(&self) -> &ProviderChainResolver;
}

/// Recorre la cadena de plantillas en orden y devuelve el primer delegado reproducible.
#[derive(Debug, Clone)]
pub struct ProviderChainResolver {
    bridge: ResolutionBridge,
    timeout: Duration,
    policy: FailurePolicy,
    advanced: Option<AdvancedMirroring>,
}

impl ProviderChainResolver {
    pub fn new(bridge: ResolutionBridge, timeout: Duration, policy: FailurePolicy) -> Self {
        ProviderChainResolver {
            bridge,
            timeout,
            policy,
            advanced: None,
        }
    }

    /// Activa el espejo avanzado: `%QUERY%` pasa a ser "título by autor" y las colecciones se puntúan.
    pub fn with_advanced_mirroring(mut self, advanced: Option<AdvancedMirroring>) -> Self {
        self.advanced = advanced;
        self
    }

    pub fn advanced_mirroring(&self) -> Option<&AdvancedMirroring> {
        self.advanced.as_ref()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    #[instrument(
        level = Level::DEBUG,
        skip_all,
        fields(track = %reference.identifier, catalog = %chain.catalog())
    )]
    pub async fn resolve(
        &self,
        reference: &TrackReference,
        chain: &ProviderChain,
        cancel: &CancellationToken,
    ) -> Result<Arc<dyn PlayableTrack>, ResolveError> {
        for template in chain.iter() {
            let separator = if self.advanced.is_some() { " by " } else { " " };
            let query = match template.render_with(reference, separator) {
                Ok(query) => query,
                Err(e) => {
                    debug!(%e, "plantilla omitida");
                    continue;
                }
            };

            match self.bridge.load_by_query(&query, self.timeout, cancel).await {
                LoadOutcome::Track(track) => {
                    info!(%template, delegate = track.identifier(), "espejo encontrado");
                    return Ok(track);
                }
                LoadOutcome::Collection(playlist) => match self.candidate(template, reference, &playlist) {
                    Some(track) => {
                        info!(%template, delegate = track.identifier(), playlist = %playlist.name, "espejo encontrado");
                        return Ok(track);
                    }
                    None => debug!(%template, "colección sin candidato, se prueba la siguiente plantilla"),
                },
                LoadOutcome::NoMatch => debug!(%template, %query, "sin resultados"),
                LoadOutcome::Failure(error) => {
                    let cancelled = matches!(error, LoadError::Cancelled);
                    if self.policy == FailurePolicy::Skip && !cancelled {
                        warn!(%template, %error, "la búsqueda falló, se prueba la siguiente plantilla");
                        continue;
                    }
                    return Err(ResolveError::ProviderSearchFailed {
                        template: template.pattern().to_string(),
                        source: error,
                    });
                }
            }
        }

        Err(ResolveError::NoPlayableMirror)
    }

    /// Sin espejo avanzado, el primer elemento de la colección.
    fn candidate(
        &self,
        template: &ProviderTemplate,
        reference: &TrackReference,
        playlist: &Playlist,
    ) -> Option<Arc<dyn PlayableTrack>> {
        match &self.advanced {
            Some(advanced) => advanced.select(template, reference, &playlist.tracks),
            None => playlist.tracks.first().cloned(),
        }
    }
}
