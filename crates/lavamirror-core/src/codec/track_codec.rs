use std::{
    io::{Read, Write},
    time::Duration,
};

use super::{ExtendedMetadataCodec, data_format};
use crate::{
    error::CodecError,
    track::{Catalog, ExtendedMetadata, TrackReference},
};

/// Versión del registro de campos base que escribe este crate.
pub const TRACK_FORMAT_VERSION: u8 = 1;

/// Resultado de decodificar una pista persistida.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedTrack {
    pub reference: TrackReference,
    pub metadata: Option<ExtendedMetadata>,
}

/// Registro binario completo de una pista: campos base seguidos del trailer extendido.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrackCodec;

impl TrackCodec {
    pub fn encode<W: Write>(
        reference: &TrackReference,
        metadata: Option<&ExtendedMetadata>,
        output: &mut W,
    ) -> Result<(), CodecError> {
        Self::encode_core(reference, output)?;
        ExtendedMetadataCodec::encode(metadata, output)
    }

    /// Solo los campos base, sin trailer (formato de escritores antiguos).
    pub fn encode_core<W: Write>(reference: &TrackReference, output: &mut W) -> Result<(), CodecError> {
        data_format::write_u8(output, TRACK_FORMAT_VERSION)?;
        data_format::write_text(output, reference.catalog.as_str())?;
        data_format::write_text(output, &reference.identifier)?;
        data_format::write_text(output, &reference.title)?;
        data_format::write_text(output, &reference.author)?;
        data_format::write_u64(output, reference.length.as_millis() as u64)?;
        data_format::write_bool(output, reference.is_stream)?;
        data_format::write_nullable_text(output, reference.uri.as_deref())?;
        data_format::write_nullable_text(output, reference.artwork_url.as_deref())?;
        data_format::write_nullable_text(output, reference.isrc.as_deref())?;
        data_format::write_nullable_text(output, reference.preview_url.as_deref())
    }

    /// Decodifica los campos base (los errores se propagan) y luego el trailer,
    /// que nunca hace fallar la decodificación.
    pub fn decode<R: Read>(input: &mut R) -> Result<DecodedTrack, CodecError> {
        let version = data_format::read_u8(input)?;
        if version != TRACK_FORMAT_VERSION {
            return Err(CodecError::UnsupportedVersion(version));
        }

        let source = data_format::read_text(input)?;
        let catalog = source.parse::<Catalog>().map_err(|_| CodecError::UnknownCatalog(source))?;

        let reference = TrackReference {
            catalog,
            identifier: data_format::read_text(input)?,
            title: data_format::read_text(input)?,
            author: data_format::read_text(input)?,
            length: Duration::from_millis(data_format::read_u64(input)?),
            is_stream: data_format::read_bool(input)?,
            uri: data_format::read_nullable_text(input)?,
            artwork_url: data_format::read_nullable_text(input)?,
            isrc: data_format::read_nullable_text(input)?,
            preview_url: data_format::read_nullable_text(input)?,
        };

        let metadata = ExtendedMetadataCodec::decode(input);

        Ok(DecodedTrack { reference, metadata })
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn reference() -> TrackReference {
        TrackReference::builder()
            .catalog(Catalog::AppleMusic)
            .identifier("1440857781")
            .title("Instant Crush")
            .author("Daft Punk")
            .length(Duration::from_millis(337_000))
            .uri("https://music.apple.com/us/song/1440857781")
            .isrc("USQX91300105")
            .build()
            .unwrap()
    }

    #[test]
    fn full_record_round_trips() {
        let metadata = ExtendedMetadata {
            album_name: Some("Random Access Memories".into()),
            is_preview: true,
            ..Default::default()
        };

        let mut buf = Vec::new();
        TrackCodec::encode(&reference(), Some(&metadata), &mut buf).unwrap();
        let decoded = TrackCodec::decode(&mut Cursor::new(buf)).unwrap();

        assert_eq!(decoded.reference, reference());
        assert_eq!(decoded.metadata, Some(metadata));
    }

    #[test]
    fn record_without_trailer_has_no_metadata() {
        let mut buf = Vec::new();
        TrackCodec::encode_core(&reference(), &mut buf).unwrap();
        let decoded = TrackCodec::decode(&mut Cursor::new(buf)).unwrap();

        assert_eq!(decoded.reference, reference());
        assert_eq!(decoded.metadata, None);
    }

    #[test]
    fn malformed_trailer_keeps_core_fields() {
        let mut buf = Vec::new();
        TrackCodec::encode_core(&reference(), &mut buf).unwrap();
        data_format::write_nullable_text(&mut buf, Some("{\"albumName\":")).unwrap();

        let decoded = TrackCodec::decode(&mut Cursor::new(buf)).unwrap();
        assert_eq!(decoded.reference.title, "Instant Crush");
        assert_eq!(decoded.metadata, None);
    }

    #[test]
    fn truncated_trailer_keeps_core_fields() {
        let mut buf = Vec::new();
        TrackCodec::encode(&reference(), Some(&ExtendedMetadata::default()), &mut buf).unwrap();
        buf.truncate(buf.len() - 3);

        let decoded = TrackCodec::decode(&mut Cursor::new(buf)).unwrap();
        assert_eq!(decoded.reference, reference());
        assert_eq!(decoded.metadata, None);
    }

    #[test]
    fn corrupt_core_fields_fail() {
        let mut buf = Vec::new();
        TrackCodec::encode(&reference(), None, &mut buf).unwrap();
        buf[0] = 9;
        assert!(matches!(
            TrackCodec::decode(&mut Cursor::new(buf)),
            Err(CodecError::UnsupportedVersion(9))
        ));
    }
}
