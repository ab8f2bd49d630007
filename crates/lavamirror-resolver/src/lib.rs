//! Crate `lavamirror_resolver`: resolución de pistas de catálogo mediante proveedores de respaldo

pub mod bridge;
mod error;
pub mod logging;
pub mod manager;
pub mod matching;
pub mod playback;
pub mod resolver;
pub mod settings;
pub mod template;
pub mod track;

#[cfg(test)]
mod testing;

pub use bridge::{AudioLoader, LoadOutcome, LoadResultHandler, Playlist, ResolutionBridge};
pub use error::{LoadError, PlaybackError, ResolveError, SettingsError, Severity, SourceError, TemplateError};
pub use manager::MirrorSourceManager;
pub use matching::AdvancedMirroring;
pub use playback::{PlayableTrack, TrackExecutor, TrackInfo};
pub use resolver::{FailurePolicy, ProviderChainResolver, ResolvesViaProviderChain};
pub use settings::{DEFAULT_PROVIDERS, HttpSettings, MirrorSettings, MirrorSettingsBuilder};
pub use template::{Placeholder, ProviderChain, ProviderTemplate};
pub use track::MirroringPlayableTrack;
