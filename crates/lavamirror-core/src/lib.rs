//! Crate `lavamirror_core`: modelo de pistas de catálogo, capacidades y codec binario.

pub mod capabilities;
pub mod codec;
mod error;
pub mod track;

pub use capabilities::{HasExtendedMetadata, TrackVariant};
pub use codec::{DecodedTrack, ExtendedMetadataCodec, TrackCodec};
pub use error::CodecError;
pub use track::{Catalog, ExtendedMetadata, TrackReference, TrackReferenceBuilder, UNKNOWN_AUTHOR};
