use std::{collections::HashMap, path::Path, sync::Arc};

use anyhow::Context;
use lavamirror_core::{
    Catalog, CodecError, ExtendedMetadata, ExtendedMetadataCodec, HasExtendedMetadata, TrackCodec, TrackReference,
    TrackVariant,
};
use lavamirror_net::{CloseReport, NetworkPathPool};
use tracing::{info, warn};

use crate::{
    bridge::{AudioLoader, ResolutionBridge},
    error::SourceError,
    resolver::ProviderChainResolver,
    settings::MirrorSettings,
    template::ProviderChain,
    track::MirroringPlayableTrack,
};

/// Fuente de pistas espejo: une configuración, pool de red, puente y resolutor.
pub struct MirrorSourceManager {
    settings: MirrorSettings,
    chains: HashMap<Catalog, ProviderChain>,
    resolver: Arc<ProviderChainResolver>,
    pool: Arc<NetworkPathPool>,
}

impl MirrorSourceManager {
    pub fn new(settings: MirrorSettings, loader: Arc<dyn AudioLoader>) -> Result<Self, SourceError> {
        settings.validate()?;
        let templates = settings.provider_templates()?;

        let pool = NetworkPathPool::new(settings.proxies.clone(), settings.use_direct_path)?;
        pool.configure_all(&settings.http.request_options(), &settings.http.client_options())?;

        let resolver = ProviderChainResolver::new(
            ResolutionBridge::new(loader),
            settings.load_timeout,
            settings.failure_policy,
        )
        .with_advanced_mirroring(settings.advanced_mirroring.clone());

        let chains = Catalog::ALL
            .iter()
            .map(|&catalog| (catalog, ProviderChain::for_catalog(&templates, catalog)))
            .collect::<HashMap<_, _>>();

        for (catalog, chain) in &chains {
            if chain.is_empty() {
                warn!(%catalog, "el catálogo no tiene plantillas de respaldo utilizables");
            }
        }

        info!(
            providers = templates.len(),
            paths = pool.len(),
            policy = ?settings.failure_policy,
            advanced = settings.advanced_mirroring.is_some(),
            "fuente espejo lista"
        );

        Ok(MirrorSourceManager {
            settings,
            chains,
            resolver: Arc::new(resolver),
            pool: Arc::new(pool),
        })
    }

    /// Carga la configuración de `path` (más el entorno) y monta la fuente.
    pub fn from_settings_file(path: impl AsRef<Path>, loader: Arc<dyn AudioLoader>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let settings = MirrorSettings::from_file(path)
            .with_context(|| format!("Failed to load mirror settings from {}", path.display()))?;

        Self::new(settings, loader).context("Failed to start the mirror source")
    }

    pub fn settings(&self) -> &MirrorSettings {
        &self.settings
    }

    pub fn pool(&self) -> &Arc<NetworkPathPool> {
        &self.pool
    }

    pub fn chain(&self, catalog: Catalog) -> Option<&ProviderChain> {
        self.chains.get(&catalog)
    }

    pub fn create_track(&self, reference: TrackReference, metadata: Option<ExtendedMetadata>) -> MirroringPlayableTrack {
        let chain = self
            .chains
            .get(&reference.catalog)
            .cloned()
            .unwrap_or_else(|| ProviderChain::for_catalog(&[], reference.catalog));

        MirroringPlayableTrack::new(
            reference,
            metadata,
            chain,
            Arc::clone(&self.resolver),
            Arc::clone(&self.pool),
            self.settings.preview_format.as_str(),
        )
    }

    /// Registro binario de la pista; solo las variantes con metadatos extendidos llevan trailer.
    pub fn encode_track(&self, track: &dyn TrackVariant) -> Result<Vec<u8>, CodecError> {
        let metadata = if ExtendedMetadataCodec::is_encodable(track) {
            track.as_extended().and_then(|ext| ext.extended_metadata())
        } else {
            None
        };

        let mut buffer = Vec::new();
        TrackCodec::encode(track.reference(), metadata, &mut buffer)?;
        Ok(buffer)
    }

    pub fn decode_track(&self, mut bytes: &[u8]) -> Result<MirroringPlayableTrack, CodecError> {
        let decoded = TrackCodec::decode(&mut bytes)?;
        Ok(self.create_track(decoded.reference, decoded.metadata))
    }

    /// Cierra todas las rutas del pool. Nunca falla; los fallos van en el informe.
    pub fn shutdown(&self) -> CloseReport {
        let report = self.pool.close();
        if !report.is_clean() {
            warn!(failed = report.failures.len(), "algunas rutas de red no se cerraron limpiamente");
        }
        report
    }
}
