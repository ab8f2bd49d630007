//! Crate `lavamirror_net`: rutas de red (proxies y directa) y su rotación

pub mod endpoint;
mod error;
pub mod options;
pub mod pool;
pub mod transport;

pub use endpoint::{PathEndpoint, ProxyEndpoint};
pub use error::Error as NetError;
pub use options::{ClientOptions, Credentials, RequestOptions};
pub use pool::{CloseReport, NetworkPath, NetworkPathPool};
pub use transport::{HttpInterface, HttpTransport, ReqwestTransport};

pub use reqwest::Response;
