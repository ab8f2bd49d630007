use std::sync::OnceLock;

use tracing_subscriber::EnvFilter;

/// Filtro por defecto cuando `RUST_LOG` no está definido.
pub const DEFAULT_FILTER: &str = "warn,lavamirror=info";

/// Instala el subscriber global de `tracing`. Llamarlo más de una vez no hace nada.
pub fn init_tracing() {
    static INIT: OnceLock<()> = OnceLock::new();
    INIT.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_thread_names(true)
            .try_init()
            .ok();
    });
}
