use std::{fmt, sync::Arc, time::Duration};

use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;
use tracing::{Level, debug, instrument, warn};

use crate::{error::LoadError, playback::PlayableTrack};

/// Colección devuelta por una búsqueda (playlist, álbum o lista de resultados).
#[derive(Debug, Clone)]
pub struct Playlist {
    pub name: String,
    pub tracks: Vec<Arc<dyn PlayableTrack>>,
    pub selected: Option<usize>,
    pub is_search_result: bool,
}

#[derive(Debug, Clone)]
pub enum LoadOutcome {
    Track(Arc<dyn PlayableTrack>),
    Collection(Playlist),
    NoMatch,
    Failure(LoadError),
}

/// Callbacks del subsistema de carga. Se invoca exactamente uno, una sola vez.
pub trait LoadResultHandler: Send {
    fn track_loaded(self: Box<Self>, track: Arc<dyn PlayableTrack>);

    fn playlist_loaded(self: Box<Self>, playlist: Playlist);

    fn no_matches(self: Box<Self>);

    fn load_failed(self: Box<Self>, error: LoadError);
}

/// Subsistema externo de "buscar y cargar" basado en callbacks.
///
/// `load_item` no bloquea: puede responder en línea o desde otro hilo más tarde.
pub trait AudioLoader: Send + Sync + fmt::Debug {
    fn load_item(&self, identifier: &str, handler: Box<dyn LoadResultHandler>);
}

struct OneshotHandler {
    tx: oneshot::Sender<LoadOutcome>,
}

impl OneshotHandler {
    fn send(self, outcome: LoadOutcome) {
        // El receptor ya no existe si la espera expiró o se canceló
        let _ = self.tx.send(outcome);
    }
}

impl LoadResultHandler for OneshotHandler {
    fn track_loaded(self: Box<Self>, track: Arc<dyn PlayableTrack>) {
        self.send(LoadOutcome::Track(track));
    }

    fn playlist_loaded(self: Box<Self>, playlist: Playlist) {
        self.send(LoadOutcome::Collection(playlist));
    }

    fn no_matches(self: Box<Self>) {
        self.send(LoadOutcome::NoMatch);
    }

    fn load_failed(self: Box<Self>, error: LoadError) {
        self.send(LoadOutcome::Failure(error));
    }
}

/// Convierte el cargador por callbacks en una única llamada con espera acotada.
#[derive(Debug, Clone)]
pub struct ResolutionBridge {
    loader: Arc<dyn AudioLoader>,
}

impl ResolutionBridge {
    pub fn new(loader: Arc<dyn AudioLoader>) -> Self {
        ResolutionBridge { loader }
    }

    /// Lanza la búsqueda y espera su resultado, como mucho `timeout`.
    ///
    /// La cancelación gana a cualquier resultado que llegue a la vez.
    #[instrument(level = Level::DEBUG, skip(self, cancel))]
    pub async fn load_by_query(&self, query: &str, timeout: Duration, cancel: &CancellationToken) -> LoadOutcome {
        if cancel.is_cancelled() {
            return LoadOutcome::Failure(LoadError::Cancelled);
        }

        let (tx, rx) = oneshot::channel();
        self.loader.load_item(query, Box::new(OneshotHandler { tx }));

        tokio::select! {
            biased;

            _ = cancel.cancelled() => {
                debug!("carga cancelada");
                LoadOutcome::Failure(LoadError::Cancelled)
            }
            result = tokio::time::timeout(timeout, rx) => match result {
                Ok(Ok(outcome)) => outcome,
                Ok(Err(_)) => {
                    warn!("el cargador descartó la petición sin responder");
                    LoadOutcome::Failure(LoadError::Abandoned)
                }
                Err(_) => {
                    warn!("el cargador no respondió a tiempo");
                    LoadOutcome::Failure(LoadError::Timeout(timeout))
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::Severity,
        testing::{Scripted, ScriptedLoader},
    };

    const WAIT: Duration = Duration::from_secs(5);

    fn bridge(loader: &Arc<ScriptedLoader>) -> ResolutionBridge {
        ResolutionBridge::new(loader.clone())
    }

    #[tokio::test]
    async fn single_track_is_returned() {
        let loader = ScriptedLoader::new([("q:Song", Scripted::Track("yt-1"))]);
        let outcome = bridge(&loader).load_by_query("q:Song", WAIT, &CancellationToken::new()).await;

        assert!(matches!(outcome, LoadOutcome::Track(t) if t.identifier() == "yt-1"));
        assert_eq!(loader.calls(), ["q:Song"]);
    }

    #[tokio::test]
    async fn unknown_query_is_no_match() {
        let loader = ScriptedLoader::new([]);
        let outcome = bridge(&loader).load_by_query("q:Nothing", WAIT, &CancellationToken::new()).await;
        assert!(matches!(outcome, LoadOutcome::NoMatch));
    }

    #[tokio::test]
    async fn failure_keeps_severity() {
        let loader = ScriptedLoader::new([("q:Song", Scripted::Fail(Severity::Suspicious))]);
        let outcome = bridge(&loader).load_by_query("q:Song", WAIT, &CancellationToken::new()).await;

        assert!(matches!(
            outcome,
            LoadOutcome::Failure(LoadError::Search {
                severity: Severity::Suspicious,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn answer_from_another_thread() {
        let loader = ScriptedLoader::new([("q:Song", Scripted::Delayed("yt-9", Duration::from_millis(20)))]);
        let outcome = bridge(&loader).load_by_query("q:Song", WAIT, &CancellationToken::new()).await;
        assert!(matches!(outcome, LoadOutcome::Track(t) if t.identifier() == "yt-9"));
    }

    #[tokio::test(start_paused = true)]
    async fn silent_loader_times_out() {
        let loader = ScriptedLoader::new([("q:Song", Scripted::Hang)]);
        let timeout = Duration::from_millis(250);
        let outcome = bridge(&loader).load_by_query("q:Song", timeout, &CancellationToken::new()).await;

        assert!(matches!(outcome, LoadOutcome::Failure(LoadError::Timeout(t)) if t == timeout));
    }

    #[tokio::test]
    async fn dropped_handler_is_abandoned() {
        let loader = ScriptedLoader::new([("q:Song", Scripted::Drop)]);
        let outcome = bridge(&loader).load_by_query("q:Song", WAIT, &CancellationToken::new()).await;
        assert!(matches!(outcome, LoadOutcome::Failure(LoadError::Abandoned)));
    }

    #[tokio::test]
    async fn cancellation_interrupts_the_wait() {
        let loader = ScriptedLoader::new([("q:Song", Scripted::Hang)]);
        let cancel = CancellationToken::new();

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            trigger.cancel();
        });

        let outcome = bridge(&loader).load_by_query("q:Song", WAIT, &cancel).await;
        assert!(matches!(outcome, LoadOutcome::Failure(LoadError::Cancelled)));
    }

    #[tokio::test]
    async fn cancelled_token_skips_the_loader() {
        let loader = ScriptedLoader::new([("q:Song", Scripted::Track("yt-1"))]);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let outcome = bridge(&loader).load_by_query("q:Song", WAIT, &cancel).await;
        assert!(matches!(outcome, LoadOutcome::Failure(LoadError::Cancelled)));
        assert!(loader.calls().is_empty());
    }
}
