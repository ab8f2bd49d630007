use std::{fmt, str::FromStr, sync::Arc};

use lavamirror_core::{Catalog, TrackReference};
use tracing::warn;

use crate::error::TemplateError;

/// Marcador sustituible dentro de una plantilla de proveedor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Placeholder {
    Isrc,
    Query,
}

impl Placeholder {
    pub const ALL: [Placeholder; 2] = [Placeholder::Isrc, Placeholder::Query];

    pub const fn token(&self) -> &'static str {
        match self {
            Placeholder::Isrc => "%ISRC%",
            Placeholder::Query => "%QUERY%",
        }
    }
}

impl fmt::Display for Placeholder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Patrón de búsqueda de un proveedor de respaldo, p. ej. `dzisrc:%ISRC%` o `ytsearch:%QUERY%`.
///
/// Admite como mucho un marcador; los marcadores distinguen mayúsculas.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProviderTemplate {
    pattern: String,
    placeholder: Option<Placeholder>,
}

impl ProviderTemplate {
    pub fn parse(pattern: impl Into<String>) -> Result<Self, TemplateError> {
        let pattern = pattern.into();
        if pattern.trim().is_empty() {
            return Err(TemplateError::Empty);
        }

        let found: usize = Placeholder::ALL
            .iter()
            .map(|p| pattern.matches(p.token()).count())
            .sum();
        if found > 1 {
            return Err(TemplateError::MultiplePlaceholders { template: pattern });
        }

        let placeholder = Placeholder::ALL
            .into_iter()
            .find(|p| pattern.contains(p.token()));

        Ok(ProviderTemplate { pattern, placeholder })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn placeholder(&self) -> Option<Placeholder> {
        self.placeholder
    }

    /// Prefijo de búsqueda (lo que va antes del primer `:`), si lo hay.
    pub fn prefix(&self) -> Option<&str> {
        self.pattern.split_once(':').map(|(prefix, _)| prefix.trim())
    }

    /// Catálogo espejo al que apunta el prefijo, si apunta a uno.
    fn mirroring_catalog(&self) -> Option<Catalog> {
        self.prefix()
            .map(str::to_ascii_lowercase)
            .and_then(|p| Catalog::from_search_prefix(&p))
            .filter(Catalog::is_mirroring)
    }

    /// Sustituye el marcador con los datos de la pista.
    pub fn render(&self, reference: &TrackReference) -> Result<String, TemplateError> {
        self.render_with(reference, " ")
    }

    /// Igual que [`Self::render`], pero `%QUERY%` une título y autor con `separator`.
    pub fn render_with(&self, reference: &TrackReference, separator: &str) -> Result<String, TemplateError> {
        let Some(placeholder) = self.placeholder else {
            return Ok(self.pattern.clone());
        };

        let value = match placeholder {
            Placeholder::Isrc => reference
                .isrc()
                .map(str::to_string)
                .ok_or_else(|| TemplateError::PlaceholderUnsatisfied {
                    template: self.pattern.clone(),
                    placeholder,
                })?,
            Placeholder::Query => reference.search_query_with(separator),
        };

        Ok(self.pattern.replace(placeholder.token(), &value))
    }
}

impl FromStr for ProviderTemplate {
    type Err = TemplateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProviderTemplate::parse(s)
    }
}

impl fmt::Display for ProviderTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.pattern)
    }
}

/// Cadena de respaldo de un catálogo: plantillas en orden, inmutable y barata de clonar.
#[derive(Debug, Clone)]
pub struct ProviderChain {
    catalog: Catalog,
    templates: Arc<[ProviderTemplate]>,
}

impl ProviderChain {
    /// Filtra `templates` para `catalog`, quitando las que buscan en un catálogo espejo.
    pub fn for_catalog(templates: &[ProviderTemplate], catalog: Catalog) -> Self {
        let kept: Vec<ProviderTemplate> = templates
            .iter()
            .filter(|template| {
                let excluded = template.mirroring_catalog().is_some()
                    || template
                        .prefix()
                        .is_some_and(|p| p.eq_ignore_ascii_case(catalog.search_prefix()));
                if excluded {
                    warn!(%template, %catalog, "plantilla de catálogo espejo excluida de la cadena");
                }
                !excluded
            })
            .cloned()
            .collect();

        ProviderChain {
            catalog,
            templates: kept.into(),
        }
    }

    pub fn catalog(&self) -> Catalog {
        self.catalog
    }

    pub fn templates(&self) -> &[ProviderTemplate] {
        &self.templates
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ProviderTemplate> {
        self.templates.iter()
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}
