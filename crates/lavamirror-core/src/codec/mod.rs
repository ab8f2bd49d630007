pub mod data_format;
mod track_codec;

use std::io::{Read, Write};

use tracing::{Level, instrument, warn};

use crate::{capabilities::TrackVariant, error::CodecError, track::ExtendedMetadata};

pub use track_codec::{DecodedTrack, TRACK_FORMAT_VERSION, TrackCodec};

/// Codec del bloque final (trailer) de metadatos extendidos.
///
/// El trailer es un único texto nullable que contiene un documento JSON con las claves
/// `albumName`, `albumUrl`, `artistUrl`, `artistArtworkUrl` e `isPreview`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtendedMetadataCodec;

impl ExtendedMetadataCodec {
    /// Escribe el trailer; `None` produce un texto nulo.
    pub fn encode<W: Write>(metadata: Option<&ExtendedMetadata>, output: &mut W) -> Result<(), CodecError> {
        let json = metadata.map(serde_json::to_string).transpose()?;
        data_format::write_nullable_text(output, json.as_deref())
    }

    /// Lee el trailer. Nunca falla: un trailer ausente o corrupto se traduce en `None`.
    #[instrument(level = Level::TRACE, skip_all)]
    pub fn decode<R: Read>(input: &mut R) -> Option<ExtendedMetadata> {
        match Self::try_decode(input) {
            Ok(metadata) => metadata,
            Err(e) => {
                warn!(%e, "trailer de metadatos extendidos corrupto, se ignora");
                None
            }
        }
    }

    fn try_decode<R: Read>(input: &mut R) -> Result<Option<ExtendedMetadata>, CodecError> {
        let Some(raw) = data_format::read_trailing_nullable_text(input)? else {
            return Ok(None);
        };
        Ok(Some(serde_json::from_str(&raw)?))
    }

    pub fn is_encodable(track: &dyn TrackVariant) -> bool {
        track.as_extended().is_some()
    }
}
