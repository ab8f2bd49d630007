//! Espejo avanzado: puntúa los candidatos de una colección por título, autor y duración.

use std::sync::Arc;

use lavamirror_core::TrackReference;
use serde::{Deserialize, Serialize};
use strsim::normalized_levenshtein;
use tracing::{debug, info};

use crate::{
    error::SettingsError,
    playback::{PlayableTrack, TrackInfo},
    template::ProviderTemplate,
};

const SOUNDCLOUD_SOURCE: &str = "soundcloud";

/// Configuración del espejo avanzado. Solo se puntúan los resultados de los prefijos en `sources`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvancedMirroring {
    /// Prefijos de búsqueda (`ytsearch`, `scsearch`...) cuyos resultados se puntúan
    pub sources: Vec<String>,
    /// Un título por debajo de este ratio anula el candidato
    pub title_threshold: f32,
    pub author_threshold: f32,
    /// Puntuación mínima (de un máximo de 300) para aceptar un candidato
    pub total_match_threshold: f32,
    /// Descarta las previews de SoundCloud Go
    pub skip_soundcloud_go: bool,
    pub level_one_penalty: f32,
    pub level_two_penalty: f32,
    pub level_three_penalty: f32,
}

impl Default for AdvancedMirroring {
    fn default() -> Self {
        AdvancedMirroring {
            sources: Vec::new(),
            title_threshold: 50.0,
            author_threshold: 70.0,
            total_match_threshold: 196.0,
            skip_soundcloud_go: false,
            level_one_penalty: 1.0,
            level_two_penalty: 2.0,
            level_three_penalty: 0.8,
        }
    }
}

impl AdvancedMirroring {
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.sources.iter().any(|s| s.trim().is_empty()) {
            return Err(SettingsError::Invalid("advanced_mirroring.sources must not contain empty prefixes".into()));
        }

        let numbers = [
            ("title_threshold", self.title_threshold),
            ("author_threshold", self.author_threshold),
            ("total_match_threshold", self.total_match_threshold),
            ("level_one_penalty", self.level_one_penalty),
            ("level_two_penalty", self.level_two_penalty),
            ("level_three_penalty", self.level_three_penalty),
        ];
        if let Some((name, _)) = numbers.iter().find(|(_, v)| !v.is_finite() || *v < 0.0) {
            return Err(SettingsError::Invalid(format!(
                "advanced_mirroring.{name} must be a non-negative number"
            )));
        }
        Ok(())
    }

    /// ¿Se puntúan los resultados de esta plantilla?
    pub fn applies_to(&self, template: &ProviderTemplate) -> bool {
        template
            .prefix()
            .is_some_and(|prefix| self.sources.iter().any(|s| s.trim() == prefix))
    }

    /// Elige el delegado de una colección.
    ///
    /// Fuera de `sources` devuelve el primer candidato que queda tras el filtro de SoundCloud Go.
    /// Dentro, el mejor puntuado (el primero en caso de empate) si alcanza el umbral.
    pub fn select(
        &self,
        template: &ProviderTemplate,
        reference: &TrackReference,
        candidates: &[Arc<dyn PlayableTrack>],
    ) -> Option<Arc<dyn PlayableTrack>> {
        let kept: Vec<&Arc<dyn PlayableTrack>> = candidates
            .iter()
            .filter(|track| !(self.skip_soundcloud_go && is_soundcloud_go(track)))
            .collect();
        if kept.len() < candidates.len() {
            debug!(skipped = candidates.len() - kept.len(), "previews de SoundCloud Go descartadas");
        }

        if !self.applies_to(template) {
            return kept.first().map(|&track| Arc::clone(track));
        }

        info!(%template, candidates = kept.len(), "aplicando espejo avanzado");
        let mut best: Option<(&Arc<dyn PlayableTrack>, i32)> = None;
        for track in kept {
            let score = track.info().map_or(0, |candidate| self.score(reference, candidate));
            if best.is_none_or(|(_, top)| score > top) {
                best = Some((track, score));
            }
        }

        match best {
            Some((track, score)) if score >= self.total_match_threshold as i32 => Some(Arc::clone(track)),
            _ => {
                debug!(%template, "ningún candidato alcanza el umbral");
                None
            }
        }
    }

    /// Puntuación de `candidate` frente a la referencia: título + autor + duración, menos la penalización.
    pub fn score(&self, reference: &TrackReference, candidate: &TrackInfo) -> i32 {
        let target_title = normalize(&reference.title);
        let target_author = normalize(&reference.author);
        let title = normalize(&candidate.title);
        let author = normalize(&candidate.author);

        let title_score = token_sort_ratio(&target_title, &title);
        if (title_score as f32) < self.title_threshold {
            return 0;
        }

        let title_match = partial_ratio(&target_title, &title);
        let author_score = match_authors(&target_author, &author);
        let duration_score = duration_score(reference, candidate);

        let penalty = self.penalty(title_match);
        let total = (((title_score + author_score + duration_score) as f32 - penalty) as i32).max(0);

        debug!(
            title = %candidate.title,
            author = %candidate.author,
            total,
            title_score,
            title_match,
            author_score,
            duration_score,
            penalty,
            "candidato puntuado"
        );

        self.adjust(total, author_score)
    }

    fn penalty(&self, title_match: i32) -> f32 {
        let level = match title_match {
            80.. => self.level_one_penalty,
            65..=79 => self.level_two_penalty,
            _ => self.level_three_penalty,
        };
        level * (100 - title_match) as f32
    }

    /// Cerca del umbral, un autor que no coincide deja al candidato justo por debajo.
    fn adjust(&self, total: i32, author_score: i32) -> i32 {
        let threshold = self.total_match_threshold as i32;
        if total < threshold - 1 || total > threshold + 40 || author_score as f32 >= self.author_threshold {
            total
        } else {
            threshold - 2
        }
    }
}

fn is_soundcloud_go(track: &Arc<dyn PlayableTrack>) -> bool {
    track
        .info()
        .is_some_and(|info| info.source == SOUNDCLOUD_SOURCE && track.identifier().contains("/preview/"))
}

fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}

/// 100 menos la diferencia en segundos enteros; puede ser negativa.
fn duration_score(reference: &TrackReference, candidate: &TrackInfo) -> i32 {
    let diff = reference.length.as_secs().abs_diff(candidate.length.as_secs());
    100 - i32::try_from(diff).unwrap_or(i32::MAX - 100)
}

fn ratio(a: &str, b: &str) -> i32 {
    (normalized_levenshtein(a, b) * 100.0).round() as i32
}

fn sorted_tokens(value: &str) -> String {
    let cleaned: String = value
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();
    let mut tokens: Vec<&str> = cleaned.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

fn token_sort_ratio(a: &str, b: &str) -> i32 {
    ratio(&sorted_tokens(a), &sorted_tokens(b))
}

/// Mejor ratio de la cadena corta contra cada ventana de igual longitud de la larga.
fn partial_ratio(a: &str, b: &str) -> i32 {
    let (short, long) = if a.chars().count() <= b.chars().count() { (a, b) } else { (b, a) };
    let width = short.chars().count();
    if width == 0 {
        return 0;
    }

    let long: Vec<char> = long.chars().collect();
    long.windows(width)
        .map(|window| ratio(short, &window.iter().collect::<String>()))
        .max()
        .unwrap_or(0)
}

/// Mejor coincidencia entre cualquier par de autores separados por comas.
fn match_authors(target: &str, candidate: &str) -> i32 {
    target
        .split(',')
        .flat_map(|t| candidate.split(',').map(move |c| token_sort_ratio(t.trim(), c.trim())))
        .max()
        .unwrap_or(0)
}
