/// Errores de las rutas de red y su transporte HTTP
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Fallo del cliente HTTP (construcción, conexión, lectura del cuerpo...)
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    /// La ruta ya fue cerrada y no presta más interfaces
    #[error("Network path {0} is closed")]
    Closed(String),

    /// Un hilo entró en pánico con el estado de la ruta bloqueado
    #[error("State lock of network path {0} was poisoned")]
    Poisoned(String),

    /// No se pudo liberar una ruta durante el cierre del pool
    #[error("Failed to close network path {path}: {reason}")]
    Close { path: String, reason: String },

    /// El servidor respondió con un código que no es de éxito
    #[error("Server responded with status {status} for {url}")]
    Status { status: u16, url: String },

    #[error("Invalid JSON body: {0}")]
    Json(#[from] serde_json::Error),
}
