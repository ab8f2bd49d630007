use crate::track::{ExtendedMetadata, TrackReference};

/// Cualquier variante de pista de catálogo.
pub trait TrackVariant {
    fn reference(&self) -> &TrackReference;

    /// Devuelve la capacidad de metadatos extendidos si esta variante la expone.
    fn as_extended(&self) -> Option<&dyn HasExtendedMetadata> {
        None
    }
}

/// Variantes que transportan [`ExtendedMetadata`] en su forma persistida.
pub trait HasExtendedMetadata {
    /// `None` cuando la pista se creó (o se decodificó) sin metadatos extendidos.
    fn extended_metadata(&self) -> Option<&ExtendedMetadata>;
}
