//! HTTP server embedded into notebooks by `lit-notebook`.
//!
//! # Architecture
//!
//! - **Factory**: [`LitServerFactory`] builds a [`LitServer`] from named
//!   model and dataset handles
//! - **Routes**: landing page, health check and JSON metadata
//! - **Lifecycle**: a notebook server runs on its own thread with its own
//!   tokio runtime, so a synchronous kernel can start and stop it

pub mod error;
pub mod routes;

use std::collections::BTreeMap;
use std::future::Future;
use std::marker::PhantomData;
use std::net::{SocketAddr, ToSocketAddrs};
use std::sync::Arc;
use std::thread::JoinHandle;

use lit_notebook::{AppServer, ServeHandle, ServerFactory, ServerOptions};
use tokio::sync::oneshot;

pub use error::{ServerError, ServerResult};
pub use routes::{AppState, create_router};

/// Builds [`LitServer`]s for any model and dataset handle types.
#[derive(Debug)]
pub struct LitServerFactory<M, D> {
    _handles: PhantomData<fn() -> (M, D)>,
}

impl<M, D> LitServerFactory<M, D> {
    pub fn new() -> Self {
        Self {
            _handles: PhantomData,
        }
    }
}

impl<M, D> Default for LitServerFactory<M, D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M, D> ServerFactory for LitServerFactory<M, D>
where
    M: Send + 'static,
    D: Send + 'static,
{
    type Model = M;
    type Dataset = D;
    type Server = LitServer<M, D>;

    fn construct(
        &self,
        models: BTreeMap<String, M>,
        datasets: BTreeMap<String, D>,
        options: &ServerOptions,
    ) -> lit_notebook::Result<LitServer<M, D>> {
        Ok(LitServer::new(models, datasets, options.clone()))
    }
}

/// A configured server that has not been started.
pub struct LitServer<M, D> {
    models: BTreeMap<String, M>,
    datasets: BTreeMap<String, D>,
    options: ServerOptions,
}

impl<M, D> LitServer<M, D>
where
    M: Send + 'static,
    D: Send + 'static,
{
    pub fn new(
        models: BTreeMap<String, M>,
        datasets: BTreeMap<String, D>,
        options: ServerOptions,
    ) -> Self {
        Self {
            models,
            datasets,
            options,
        }
    }

    fn state(&self) -> Arc<AppState> {
        Arc::new(AppState {
            server_type: self.options.server_type,
            models: self.models.keys().cloned().collect(),
            datasets: self.datasets.keys().cloned().collect(),
        })
    }

    /// Bind the listener and serve on a background thread.
    ///
    /// Returns once the port is bound, so bind failures are reported here.
    pub fn start(self) -> ServerResult<RunningServer> {
        let addr = resolve(&self.options)?;
        let listener = std::net::TcpListener::bind(addr)?;
        listener.set_nonblocking(true)?;
        let port = listener.local_addr()?.port();

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("lit-server-worker")
            .enable_all()
            .build()?;

        let app = create_router(self.state());
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let thread = std::thread::Builder::new()
            .name(format!("lit-server-{port}"))
            .spawn(move || {
                // Handles live as long as the server does.
                let _handles = (self.models, self.datasets);
                let result = runtime.block_on(async move {
                    let listener = tokio::net::TcpListener::from_std(listener)?;
                    run(listener, app, async move {
                        // A dropped sender means the handle was discarded,
                        // not stopped: keep serving.
                        if shutdown_rx.await.is_err() {
                            std::future::pending::<()>().await;
                        }
                    })
                    .await
                });
                if let Err(e) = &result {
                    tracing::error!("Server on port {} failed: {}", port, e);
                }
                result
            })?;

        tracing::info!("Serving LIT at http://{}", SocketAddr::new(addr.ip(), port));

        Ok(RunningServer {
            port,
            shutdown_tx,
            thread,
        })
    }
}

impl<M, D> AppServer for LitServer<M, D>
where
    M: Send + 'static,
    D: Send + 'static,
{
    fn serve(self) -> lit_notebook::Result<ServeHandle> {
        let running = self.start()?;
        let port = running.port();
        Ok(ServeHandle::new(port, move || {
            if let Err(e) = running.stop() {
                tracing::warn!("Error while stopping server on port {}: {}", port, e);
            }
        }))
    }
}

/// A server running on a background thread.
#[derive(Debug)]
pub struct RunningServer {
    port: u16,
    shutdown_tx: oneshot::Sender<()>,
    thread: JoinHandle<std::io::Result<()>>,
}

impl RunningServer {
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Shut down gracefully and wait for the server thread to exit.
    pub fn stop(self) -> ServerResult<()> {
        // The receiver is gone only if the server already exited.
        let _ = self.shutdown_tx.send(());
        match self.thread.join() {
            Ok(result) => {
                result?;
                tracing::info!("Server on port {} shut down", self.port);
                Ok(())
            }
            Err(_) => Err(ServerError::Runtime(format!(
                "server thread for port {} panicked",
                self.port
            ))),
        }
    }
}

/// Serve the router on an already bound listener until `shutdown` resolves.
pub async fn run(
    listener: tokio::net::TcpListener,
    app: axum::Router,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
}

/// Run a server with no models or datasets until Ctrl+C.
pub async fn serve_forever(options: ServerOptions) -> ServerResult<()> {
    let addr = resolve(&options)?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let local = listener.local_addr()?;

    let state = Arc::new(AppState {
        server_type: options.server_type,
        models: Vec::new(),
        datasets: Vec::new(),
    });

    tracing::info!("Starting LIT server at http://{}", local);

    run(listener, create_router(state), async {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Received shutdown signal");
        }
    })
    .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Resolve the configured host and port to a bindable address.
///
/// IPv4 addresses are preferred so `localhost` binds where the browser
/// looks first.
fn resolve(options: &ServerOptions) -> ServerResult<SocketAddr> {
    let port = options.port.unwrap_or(0);
    let invalid = || ServerError::InvalidAddress {
        host: options.host.clone(),
        port,
    };
    let addrs: Vec<SocketAddr> = (options.host.as_str(), port)
        .to_socket_addrs()
        .map_err(|_| invalid())?
        .collect();
    addrs
        .iter()
        .find(|addr| addr.is_ipv4())
        .or_else(|| addrs.first())
        .copied()
        .ok_or_else(invalid)
}
