use serde::{Deserialize, Deserializer, Serialize};

/// Metadatos de presentación que acompañan a una pista y no hacen falta para reproducirla.
///
/// Cada campo de texto es opcional por separado; `is_preview` vale `false` si falta.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExtendedMetadata {
    pub album_name: Option<String>,
    pub album_url: Option<String>,
    pub artist_url: Option<String>,
    pub artist_artwork_url: Option<String>,
    #[serde(deserialize_with = "null_as_false")]
    pub is_preview: bool,
}

fn null_as_false<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(false))
}
