use serde::{Deserialize, Serialize};

/// Catálogos de streaming que solo exponen metadatos de sus pistas
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Catalog {
    Spotify,
    AppleMusic,
    Tidal,
    Deezer,
    YandexMusic,
    VkMusic,
}

impl Catalog {
    pub const ALL: &'static [Catalog] = &[
        Catalog::Spotify,
        Catalog::AppleMusic,
        Catalog::Tidal,
        Catalog::Deezer,
        Catalog::YandexMusic,
        Catalog::VkMusic,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Catalog::Spotify => "spotify",
            Catalog::AppleMusic => "applemusic",
            Catalog::Tidal => "tidal",
            Catalog::Deezer => "deezer",
            Catalog::YandexMusic => "yandexmusic",
            Catalog::VkMusic => "vkmusic",
        }
    }

    /// Prefijo de búsqueda con el que el host enruta las consultas a este catálogo.
    pub fn search_prefix(&self) -> &'static str {
        match self {
            Catalog::Spotify => "spsearch",
            Catalog::AppleMusic => "amsearch",
            Catalog::Tidal => "tdsearch",
            Catalog::Deezer => "dzsearch",
            Catalog::YandexMusic => "ymsearch",
            Catalog::VkMusic => "vksearch",
        }
    }

    /// Catálogos que a su vez resuelven por espejo: nunca pueden ser proveedores.
    pub fn is_mirroring(&self) -> bool {
        matches!(self, Catalog::Spotify | Catalog::AppleMusic | Catalog::Tidal)
    }

    pub fn from_search_prefix(prefix: &str) -> Option<Catalog> {
        Catalog::ALL.iter().find(|c| c.search_prefix() == prefix).copied()
    }
}

impl std::str::FromStr for Catalog {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        Catalog::ALL
            .iter()
            .find(|c| c.as_str() == lower)
            .copied()
            .ok_or_else(|| format!("Catalog not supported: {}", s))
    }
}

impl std::fmt::Display for Catalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefixes_round_trip() {
        for catalog in Catalog::ALL {
            assert_eq!(Catalog::from_search_prefix(catalog.search_prefix()), Some(*catalog));
        }
        assert_eq!(Catalog::from_search_prefix("ytsearch"), None);
    }

    #[test]
    fn parses_source_names_case_insensitive() {
        assert_eq!("AppleMusic".parse::<Catalog>().unwrap(), Catalog::AppleMusic);
        assert!("youtube".parse::<Catalog>().is_err());
    }

    #[test]
    fn only_metadata_catalogs_are_mirroring() {
        assert!(Catalog::Spotify.is_mirroring());
        assert!(Catalog::Tidal.is_mirroring());
        assert!(!Catalog::Deezer.is_mirroring());
    }
}
