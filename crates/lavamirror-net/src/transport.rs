use std::{
    fmt,
    sync::{RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use reqwest::{IntoUrl, RequestBuilder, Response, StatusCode};
use serde_json::Value;
use tracing::{Level, debug, error, instrument};

use crate::{
    endpoint::PathEndpoint,
    error::Error,
    options::{ClientOptions, RequestOptions},
};

/// Transporte HTTP detrás de una ruta de red.
///
/// El pool configura y rota transportes; nunca los implementa. Cada llamada a
/// [`HttpTransport::interface`] presta una interfaz para una única petición lógica.
pub trait HttpTransport: Send + Sync + fmt::Debug {
    fn configure(&self, request: &RequestOptions, client: &ClientOptions) -> Result<(), Error>;

    fn interface(&self) -> Result<HttpInterface, Error>;

    fn close(&self) -> Result<(), Error>;
}

/// Interfaz prestada para una petición. Se descarta al terminar; no se guarda.
#[derive(Debug, Clone)]
pub struct HttpInterface {
    client: reqwest::Client,
    request: RequestOptions,
    path: String,
}

impl HttpInterface {
    pub fn new(client: reqwest::Client, request: RequestOptions, path: impl Into<String>) -> Self {
        HttpInterface {
            client,
            request,
            path: path.into(),
        }
    }

    /// Ruta (directa o proxy) por la que sale esta interfaz.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    pub fn get<U: IntoUrl>(&self, url: U) -> RequestBuilder {
        let builder = self.client.get(url);
        match self.request.timeout {
            Some(timeout) => builder.timeout(timeout),
            None => builder,
        }
    }

    /// Ejecuta la petición y parsea el cuerpo como JSON.
    ///
    /// Un 404 devuelve `None`; cualquier otro código sin éxito es un error.
    #[instrument(level = Level::DEBUG, skip_all, fields(path = %self.path), err)]
    pub async fn fetch_json(&self, request: RequestBuilder) -> Result<Option<Value>, Error> {
        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let body = Self::ensure_success(response).await?.bytes().await?;
        Ok(Some(serde_json::from_slice(&body)?))
    }

    /// Abre el cuerpo de `url` como stream, fallando si la respuesta no es de éxito.
    #[instrument(level = Level::DEBUG, skip_all, fields(path = %self.path), err)]
    pub async fn open_stream<U: IntoUrl>(&self, url: U) -> Result<Response, Error> {
        let response = self.get(url).send().await?;
        Self::ensure_success(response).await
    }

    async fn ensure_success(response: Response) -> Result<Response, Error> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let url = response.url().to_string();
        let body = response.text().await.unwrap_or_default();
        error!(%status, %url, %body, "el servidor respondió con un error");
        Err(Error::Status {
            status: status.as_u16(),
            url,
        })
    }
}

#[derive(Debug)]
struct TransportState {
    client: Option<reqwest::Client>,
    request: RequestOptions,
    client_options: ClientOptions,
}

/// Transporte por defecto: un `reqwest::Client` sin cookies por ruta.
#[derive(Debug)]
pub struct ReqwestTransport {
    endpoint: PathEndpoint,
    state: RwLock<TransportState>,
}

impl ReqwestTransport {
    pub fn new(endpoint: PathEndpoint) -> Result<Self, Error> {
        let client_options = ClientOptions::default();
        let client = build_client(&endpoint, &client_options)?;

        Ok(ReqwestTransport {
            endpoint,
            state: RwLock::new(TransportState {
                client: Some(client),
                request: RequestOptions::default(),
                client_options,
            }),
        })
    }

    pub fn endpoint(&self) -> &PathEndpoint {
        &self.endpoint
    }

    /// Opciones vigentes (petición, cliente).
    pub fn options(&self) -> Result<(RequestOptions, ClientOptions), Error> {
        let state = self.read()?;
        Ok((state.request.clone(), state.client_options.clone()))
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, TransportState>, Error> {
        self.state
            .read()
            .map_err(|_| Error::Poisoned(self.endpoint.to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, TransportState>, Error> {
        self.state
            .write()
            .map_err(|_| Error::Poisoned(self.endpoint.to_string()))
    }
}

impl HttpTransport for ReqwestTransport {
    #[instrument(level = Level::TRACE, skip_all, fields(path = %self.endpoint), err)]
    fn configure(&self, request: &RequestOptions, client: &ClientOptions) -> Result<(), Error> {
        let mut state = self.write()?;
        if state.client.is_none() {
            return Err(Error::Closed(self.endpoint.to_string()));
        }

        // Un reqwest::Client es inmutable: se reconstruye con las nuevas opciones
        state.client = Some(build_client(&self.endpoint, client)?);
        state.request = request.clone();
        state.client_options = client.clone();
        Ok(())
    }

    fn interface(&self) -> Result<HttpInterface, Error> {
        let state = self.read()?;
        let client = state
            .client
            .clone()
            .ok_or_else(|| Error::Closed(self.endpoint.to_string()))?;

        Ok(HttpInterface::new(client, state.request.clone(), self.endpoint.to_string()))
    }

    #[instrument(level = Level::TRACE, skip_all, fields(path = %self.endpoint), err)]
    fn close(&self) -> Result<(), Error> {
        let mut state = self.write()?;
        if state.client.take().is_some() {
            debug!(path = %self.endpoint, "ruta de red cerrada");
        }
        Ok(())
    }
}

fn build_client(endpoint: &PathEndpoint, options: &ClientOptions) -> Result<reqwest::Client, Error> {
    let mut builder = reqwest::Client::builder();

    match endpoint {
        PathEndpoint::Direct => {
            builder = builder.no_proxy();
        }
        PathEndpoint::Proxy(proxy) => {
            let mut reqwest_proxy = reqwest::Proxy::all(proxy.url())?;
            let shared = options
                .proxy_credentials
                .as_ref()
                .map(|c| (c.username.as_str(), c.password.as_str()));
            if let Some((user, password)) = proxy.credentials().or(shared) {
                reqwest_proxy = reqwest_proxy.basic_auth(user, password);
            }
            builder = builder.proxy(reqwest_proxy);
        }
    }

    if let Some(timeout) = options.connect_timeout {
        builder = builder.connect_timeout(timeout);
    }
    if let Some(user_agent) = &options.user_agent {
        builder = builder.user_agent(user_agent.clone());
    }

    Ok(builder.build()?)
}
