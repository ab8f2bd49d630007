//! Dobles de prueba compartidos por los tests del crate.

use std::{
    collections::HashMap,
    sync::{
        Arc, Mutex, MutexGuard, OnceLock,
        atomic::{AtomicUsize, Ordering},
    },
    thread,
    time::Duration,
};

use async_trait::async_trait;
use lavamirror_net::{NetError, Response};

use crate::{
    bridge::{AudioLoader, LoadResultHandler, Playlist},
    error::{LoadError, PlaybackError, Severity},
    playback::{PlayableTrack, TrackExecutor, TrackInfo},
};

static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

/// Serializa los tests que leen o modifican variables de entorno.
pub fn env_lock() -> MutexGuard<'static, ()> {
    ENV_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[derive(Debug)]
pub struct StubTrack {
    id: String,
    info: Option<TrackInfo>,
    processed: AtomicUsize,
}

/// Candidato con metadatos que devuelve una búsqueda guionizada.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub id: &'static str,
    pub title: &'static str,
    pub author: &'static str,
    pub secs: u64,
    pub source: &'static str,
}

pub fn candidate(id: &'static str, title: &'static str, author: &'static str, secs: u64) -> Candidate {
    Candidate {
        id,
        title,
        author,
        secs,
        source: "youtube",
    }
}

impl StubTrack {
    pub fn shared(id: &str) -> Arc<StubTrack> {
        Arc::new(StubTrack {
            id: id.to_string(),
            info: None,
            processed: AtomicUsize::new(0),
        })
    }

    pub fn with_info(candidate: Candidate) -> Arc<StubTrack> {
        Arc::new(StubTrack {
            id: candidate.id.to_string(),
            info: Some(TrackInfo {
                title: candidate.title.into(),
                author: candidate.author.into(),
                length: Duration::from_secs(candidate.secs),
                source: candidate.source.into(),
            }),
            processed: AtomicUsize::new(0),
        })
    }

    pub fn processed(&self) -> usize {
        self.processed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PlayableTrack for StubTrack {
    fn identifier(&self) -> &str {
        &self.id
    }

    fn info(&self) -> Option<&TrackInfo> {
        self.info.as_ref()
    }

    async fn process(&self, _executor: &mut dyn TrackExecutor) -> Result<(), PlaybackError> {
        self.processed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Respuesta guionizada del cargador para una consulta.
#[derive(Debug, Clone)]
pub enum Scripted {
    Track(&'static str),
    Playlist(Vec<&'static str>, Option<usize>),
    /// Lista de resultados con metadatos puntuables
    Candidates(Vec<Candidate>),
    NoMatch,
    Fail(Severity),
    /// Responde desde otro hilo tras una pausa
    Delayed(&'static str, Duration),
    /// Se queda con el handler y nunca responde
    Hang,
    /// Descarta el handler sin responder
    Drop,
}

#[derive(Default)]
pub struct ScriptedLoader {
    script: HashMap<String, Scripted>,
    calls: Mutex<Vec<String>>,
    delivered: Mutex<Vec<Arc<StubTrack>>>,
    pending: Mutex<Vec<Box<dyn LoadResultHandler>>>,
}

impl std::fmt::Debug for ScriptedLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptedLoader").field("script", &self.script).finish()
    }
}

impl ScriptedLoader {
    pub fn new(script: impl IntoIterator<Item = (&'static str, Scripted)>) -> Arc<Self> {
        Arc::new(ScriptedLoader {
            script: script.into_iter().map(|(q, s)| (q.to_string(), s)).collect(),
            ..Default::default()
        })
    }

    /// Consultas recibidas, en orden.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Pistas entregadas a los handlers, en orden.
    pub fn delivered(&self) -> Vec<Arc<StubTrack>> {
        self.delivered.lock().unwrap().clone()
    }

    fn track(&self, id: &str) -> Arc<StubTrack> {
        self.deliver(StubTrack::shared(id))
    }

    fn deliver(&self, track: Arc<StubTrack>) -> Arc<StubTrack> {
        self.delivered.lock().unwrap().push(track.clone());
        track
    }
}

impl AudioLoader for ScriptedLoader {
    fn load_item(&self, identifier: &str, handler: Box<dyn LoadResultHandler>) {
        self.calls.lock().unwrap().push(identifier.to_string());

        match self.script.get(identifier).cloned().unwrap_or(Scripted::NoMatch) {
            Scripted::Track(id) => handler.track_loaded(self.track(id)),
            Scripted::Playlist(ids, selected) => {
                let tracks = ids
                    .into_iter()
                    .map(|id| self.track(id) as Arc<dyn PlayableTrack>)
                    .collect();
                handler.playlist_loaded(Playlist {
                    name: "results".into(),
                    tracks,
                    selected,
                    is_search_result: true,
                });
            }
            Scripted::Candidates(candidates) => {
                let tracks = candidates
                    .into_iter()
                    .map(|c| self.deliver(StubTrack::with_info(c)) as Arc<dyn PlayableTrack>)
                    .collect();
                handler.playlist_loaded(Playlist {
                    name: "Search results".into(),
                    tracks,
                    selected: None,
                    is_search_result: true,
                });
            }
            Scripted::NoMatch => handler.no_matches(),
            Scripted::Fail(severity) => handler.load_failed(LoadError::Search {
                message: format!("search for {identifier} failed"),
                severity,
            }),
            Scripted::Delayed(id, delay) => {
                let track = self.track(id);
                thread::spawn(move || {
                    thread::sleep(delay);
                    handler.track_loaded(track);
                });
            }
            Scripted::Hang => self.pending.lock().unwrap().push(handler),
            Scripted::Drop => drop(handler),
        }
    }
}

/// Ejecutor que consume el stream entero y guarda formato y bytes.
#[derive(Debug, Default)]
pub struct RecordingExecutor {
    pub played: Vec<(String, Vec<u8>)>,
}

#[async_trait]
impl TrackExecutor for RecordingExecutor {
    async fn play_stream(&mut self, format: &str, stream: Response) -> Result<(), PlaybackError> {
        let body = stream.bytes().await.map_err(NetError::from)?;
        self.played.push((format.to_string(), body.to_vec()));
        Ok(())
    }
}
