use std::time::Duration;

use derive_builder::Builder;

use super::Catalog;

/// Autor centinela que usan los catálogos cuando no conocen al artista.
pub const UNKNOWN_AUTHOR: &str = "unknown";

/// Referencia de pista tal como la entrega el catálogo: solo metadatos, sin audio.
///
/// Inmutable una vez construida; las pistas la comparten detrás de un `Arc`.
#[derive(Debug, Clone, PartialEq, Eq, Builder)]
#[builder(setter(into, strip_option))]
pub struct TrackReference {
    pub catalog: Catalog,
    pub identifier: String,
    pub title: String,
    #[builder(default = "UNKNOWN_AUTHOR.to_string()")]
    pub author: String,
    #[builder(default)]
    pub length: Duration,
    #[builder(default)]
    pub is_stream: bool,
    #[builder(default)]
    pub uri: Option<String>,
    #[builder(default)]
    pub artwork_url: Option<String>,
    #[builder(default)]
    pub isrc: Option<String>,
    #[builder(default)]
    pub preview_url: Option<String>,
}

impl TrackReference {
    pub fn builder() -> TrackReferenceBuilder {
        TrackReferenceBuilder::default()
    }

    /// ISRC utilizable: una cadena vacía cuenta como ausente.
    pub fn isrc(&self) -> Option<&str> {
        self.isrc.as_deref().filter(|isrc| !isrc.is_empty())
    }

    pub fn has_author(&self) -> bool {
        self.author != UNKNOWN_AUTHOR
    }

    /// Texto de búsqueda libre: título, seguido del autor si se conoce.
    pub fn search_query(&self) -> String {
        self.search_query_with(" ")
    }

    /// Como [`Self::search_query`], uniendo título y autor con `separator`.
    pub fn search_query_with(&self, separator: &str) -> String {
        if self.has_author() {
            format!("{}{separator}{}", self.title, self.author)
        } else {
            self.title.clone()
        }
    }
}
