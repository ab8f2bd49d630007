use std::sync::atomic::{AtomicUsize, Ordering};

use tracing::{Level, error, info, instrument};

use crate::{
    endpoint::{PathEndpoint, ProxyEndpoint},
    error::Error,
    options::{ClientOptions, RequestOptions},
    transport::{HttpInterface, HttpTransport, ReqwestTransport},
};

/// Una ruta de salida junto al transporte que la atiende.
#[derive(Debug)]
pub struct NetworkPath<T = ReqwestTransport> {
    endpoint: PathEndpoint,
    transport: T,
}

impl<T: HttpTransport> NetworkPath<T> {
    pub fn new(endpoint: PathEndpoint, transport: T) -> Self {
        NetworkPath { endpoint, transport }
    }

    pub fn endpoint(&self) -> &PathEndpoint {
        &self.endpoint
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Presta una interfaz para una única petición lógica.
    pub fn interface(&self) -> Result<HttpInterface, Error> {
        self.transport.interface()
    }
}

/// Resultado de cerrar el pool: cuántas rutas se liberaron y qué falló.
#[derive(Debug, Default)]
pub struct CloseReport {
    pub closed: usize,
    pub failures: Vec<Error>,
}

impl CloseReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Conjunto de rutas (proxies y, opcionalmente, la directa) repartidas en round-robin.
///
/// La ruta directa siempre existe y siempre se configura, aunque no entre en la
/// rotación. Sin proxies la rotación cae en la ruta directa.
#[derive(Debug)]
pub struct NetworkPathPool<T = ReqwestTransport> {
    proxies: Vec<NetworkPath<T>>,
    direct: NetworkPath<T>,
    direct_in_rotation: bool,
    cursor: AtomicUsize,
}

impl NetworkPathPool<ReqwestTransport> {
    pub fn new(proxies: Vec<ProxyEndpoint>, use_direct_path: bool) -> Result<Self, Error> {
        Self::with_transports(proxies, use_direct_path, |endpoint| {
            ReqwestTransport::new(endpoint.clone())
        })
    }
}

impl<T: HttpTransport> NetworkPathPool<T> {
    /// Construye el pool creando cada transporte con `factory`.
    pub fn with_transports<F>(proxies: Vec<ProxyEndpoint>, use_direct_path: bool, mut factory: F) -> Result<Self, Error>
    where
        F: FnMut(&PathEndpoint) -> Result<T, Error>,
    {
        let mut paths = Vec::with_capacity(proxies.len());
        for proxy in proxies {
            let endpoint = PathEndpoint::Proxy(proxy);
            let transport = factory(&endpoint)?;
            paths.push(NetworkPath::new(endpoint, transport));
        }

        let direct_transport = factory(&PathEndpoint::Direct)?;
        let pool = NetworkPathPool {
            proxies: paths,
            direct: NetworkPath::new(PathEndpoint::Direct, direct_transport),
            direct_in_rotation: use_direct_path,
            cursor: AtomicUsize::new(0),
        };

        info!(
            proxies = pool.proxies.len(),
            direct = pool.direct_in_rotation,
            "pool de rutas de red creado"
        );
        Ok(pool)
    }

    /// Número de rutas en la rotación.
    pub fn len(&self) -> usize {
        let direct = usize::from(self.direct_in_rotation || self.proxies.is_empty());
        self.proxies.len() + direct
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn direct_path(&self) -> &NetworkPath<T> {
        &self.direct
    }

    /// Rutas en orden de rotación: primero los proxies, luego la directa.
    pub fn paths(&self) -> impl Iterator<Item = &NetworkPath<T>> {
        let rotation = self.len();
        self.proxies
            .iter()
            .chain(std::iter::once(&self.direct))
            .take(rotation)
    }

    fn nth(&self, index: usize) -> &NetworkPath<T> {
        self.proxies.get(index).unwrap_or(&self.direct)
    }

    /// Siguiente ruta de la rotación.
    ///
    /// Segura entre hilos: N llamadas consecutivas visitan cada ruta exactamente una vez.
    pub fn acquire(&self) -> &NetworkPath<T> {
        let len = self.len();
        let previous = self
            .cursor
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |i| Some((i + 1) % len))
            .unwrap_or_else(|current| current);

        self.nth(previous % len)
    }

    /// Aplica las opciones a todas las rutas, incluida la directa aunque no rote.
    #[instrument(level = Level::DEBUG, skip_all, err)]
    pub fn configure_all(&self, request: &RequestOptions, client: &ClientOptions) -> Result<(), Error> {
        for path in self.proxies.iter().chain(std::iter::once(&self.direct)) {
            path.transport.configure(request, client)?;
        }
        Ok(())
    }

    /// Cierra todas las rutas. Un fallo se registra y no impide cerrar las demás.
    pub fn close(&self) -> CloseReport {
        let mut report = CloseReport::default();

        for path in self.proxies.iter().chain(std::iter::once(&self.direct)) {
            match path.transport.close() {
                Ok(()) => report.closed += 1,
                Err(e) => {
                    error!(path = %path.endpoint, error = %e, "no se pudo cerrar la ruta de red");
                    report.failures.push(Error::Close {
                        path: path.endpoint.to_string(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        info!(closed = report.closed, failed = report.failures.len(), "pool de rutas de red cerrado");
        report
    }
}

#[cfg(test)]
mod tests {
    use std::{
        collections::HashMap,
        sync::{
            Arc, Mutex,
            atomic::{AtomicBool, AtomicUsize, Ordering},
        },
        thread,
        time::Duration,
    };

    use super::*;

    #[derive(Debug, Default)]
    struct FakeTransport {
        fail_close: bool,
        closed: AtomicBool,
        configured: AtomicUsize,
    }

    impl HttpTransport for FakeTransport {
        fn configure(&self, _request: &RequestOptions, _client: &ClientOptions) -> Result<(), Error> {
            self.configured.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn interface(&self) -> Result<HttpInterface, Error> {
            Err(Error::Closed("fake".into()))
        }

        fn close(&self) -> Result<(), Error> {
            if self.fail_close {
                return Err(Error::Poisoned("fake".into()));
            }
            self.closed.store(true, Ordering::SeqCst);
            Ok(())
        }
    }

    fn proxies(n: u16) -> Vec<ProxyEndpoint> {
        (0..n).map(|i| ProxyEndpoint::new(format!("10.0.0.{i}"), 3128)).collect()
    }

    fn fake_pool(n: u16, use_direct: bool) -> NetworkPathPool<FakeTransport> {
        NetworkPathPool::with_transports(proxies(n), use_direct, |_| Ok(FakeTransport::default())).unwrap()
    }

    fn label(path: &NetworkPath<FakeTransport>) -> String {
        path.endpoint().to_string()
    }

    #[test]
    fn rotates_proxies_then_direct() {
        let pool = fake_pool(2, true);

        let order: Vec<_> = (0..4).map(|_| label(pool.acquire())).collect();
        assert_eq!(
            order,
            [
                "http://10.0.0.0:3128",
                "http://10.0.0.1:3128",
                "direct",
                "http://10.0.0.0:3128"
            ]
        );
    }

    #[test]
    fn each_path_once_per_cycle() {
        let pool = fake_pool(5, false);
        assert_eq!(pool.len(), 5);

        let mut seen: Vec<_> = (0..pool.len()).map(|_| label(pool.acquire())).collect();
        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), 5);
        assert!(!seen.contains(&"direct".to_string()));
    }

    #[test]
    fn no_proxies_falls_back_to_direct() {
        let pool = fake_pool(0, false);
        assert_eq!(pool.len(), 1);
        assert!(pool.acquire().endpoint().is_direct());
        assert!(pool.acquire().endpoint().is_direct());
    }

    #[test]
    fn concurrent_acquires_stay_balanced() {
        let pool = Arc::new(fake_pool(3, true));
        let counts = Arc::new(Mutex::new(HashMap::<String, usize>::new()));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let pool = pool.clone();
                let counts = counts.clone();
                thread::spawn(move || {
                    for _ in 0..100 {
                        let path = label(pool.acquire());
                        *counts.lock().unwrap().entry(path).or_default() += 1;
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let counts = counts.lock().unwrap();
        assert_eq!(counts.len(), 4);
        assert!(counts.values().all(|&c| c == 200));
    }

    #[test]
    fn configure_reaches_direct_outside_rotation() {
        let pool = fake_pool(2, false);
        pool.configure_all(
            &RequestOptions {
                timeout: Some(Duration::from_secs(5)),
            },
            &ClientOptions::default(),
        )
        .unwrap();

        assert_eq!(pool.paths().count(), 2);
        assert_eq!(pool.direct_path().transport().configured.load(Ordering::SeqCst), 1);
        assert!(pool.paths().all(|p| p.transport().configured.load(Ordering::SeqCst) == 1));
    }

    #[test]
    fn close_continues_after_failure() {
        let mut built = 0;
        let pool = NetworkPathPool::with_transports(proxies(3), true, |_| {
            built += 1;
            Ok(FakeTransport {
                fail_close: built == 2,
                ..Default::default()
            })
        })
        .unwrap();

        let report = pool.close();
        assert_eq!(report.closed, 3);
        assert_eq!(report.failures.len(), 1);
        assert!(matches!(&report.failures[0], Error::Close { path, .. } if path == "http://10.0.0.1:3128"));
        assert!(pool.direct_path().transport().closed.load(Ordering::SeqCst));
    }

    #[test]
    fn real_pool_builds_clients() {
        let pool = NetworkPathPool::new(vec![ProxyEndpoint::new("127.0.0.1", 3128)], true).unwrap();
        assert_eq!(pool.len(), 2);
        assert_eq!(pool.acquire().interface().unwrap().path(), "http://127.0.0.1:3128");
        assert_eq!(pool.acquire().interface().unwrap().path(), "direct");
        assert!(pool.close().is_clean());
    }
}
