//! HTTP/1 transport.
//!
//! The server accepts TCP connections, serves each one with hyper on its own
//! task, buffers request bodies up to the configured limit and hands the
//! buffered request to the [`Manager`]. Shutdown stops the accept loop, asks
//! open connections to finish their current request and waits for them to
//! drain, up to the shutdown timeout.

use crate::config::ServerConfig;
use crate::error::ServerError;
use crate::manager::Manager;
use crate::shutdown::{ConnectionTracker, ShutdownSignal};
use bytes::Bytes;
use dsc_middleware::{BodyLimitExceeded, MiddlewareContext, Response, ResponseExt};
use http::StatusCode;
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};

/// The pull server's HTTP front end.
///
/// # Example
///
/// ```rust,ignore
/// use dsc_server::{Server, ServerConfig};
///
/// let server = Server::new(ServerConfig::default(), manager);
/// server.run().await?;
/// ```
#[derive(Debug)]
pub struct Server {
    config: ServerConfig,
    manager: Arc<Manager>,
}

impl Server {
    /// Creates a server.
    pub fn new(config: ServerConfig, manager: Manager) -> Self {
        Self {
            config,
            manager: Arc::new(manager),
        }
    }

    /// Returns the server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Binds the configured address and serves until SIGINT or SIGTERM.
    pub async fn run(self) -> Result<(), ServerError> {
        let shutdown = ShutdownSignal::with_os_signals();
        self.run_with_shutdown(shutdown).await
    }

    /// Binds the configured address and serves until `shutdown` fires.
    pub async fn run_with_shutdown(self, shutdown: ShutdownSignal) -> Result<(), ServerError> {
        let addr = self.config.socket_addr()?;
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| ServerError::Bind { addr, source })?;
        self.serve(listener, shutdown).await
    }

    /// Serves on an already-bound listener until `shutdown` fires.
    pub async fn serve(
        self,
        listener: TcpListener,
        shutdown: ShutdownSignal,
    ) -> Result<(), ServerError> {
        let local_addr = listener.local_addr()?;
        tracing::info!(addr = %local_addr, "server listening");

        let server = Arc::new(self);
        let tracker = ConnectionTracker::new();

        loop {
            tokio::select! {
                accepted = listener.accept() => match accepted {
                    Ok((stream, remote_addr)) => {
                        let server = Arc::clone(&server);
                        let token = tracker.acquire();
                        let shutdown = shutdown.clone();

                        tokio::spawn(async move {
                            if let Err(error) = server.serve_connection(stream, remote_addr, shutdown).await {
                                tracing::debug!(remote = %remote_addr, error = %error, "connection error");
                            }
                            drop(token);
                        });
                    }
                    Err(error) => {
                        tracing::error!(error = %error, "failed to accept connection");
                    }
                },

                () = shutdown.recv() => {
                    tracing::info!("shutdown signal received, no longer accepting connections");
                    break;
                }
            }
        }

        let shutdown_timeout = server.config.shutdown_timeout();
        tracing::info!(
            active = tracker.active_connections(),
            timeout = ?shutdown_timeout,
            "waiting for connections to close"
        );

        if tokio::time::timeout(shutdown_timeout, tracker.wait_for_drain())
            .await
            .is_err()
        {
            tracing::warn!(
                active = tracker.active_connections(),
                "shutdown timeout reached with connections still open"
            );
        }

        tracing::info!("server stopped");
        Ok(())
    }

    async fn serve_connection(
        self: Arc<Self>,
        stream: TcpStream,
        remote_addr: SocketAddr,
        shutdown: ShutdownSignal,
    ) -> Result<(), hyper::Error> {
        let server = Arc::clone(&self);
        let service = service_fn(move |request: http::Request<Incoming>| {
            let server = Arc::clone(&server);
            async move { Ok::<_, Infallible>(server.handle_request(request, remote_addr).await) }
        });

        let connection = http1::Builder::new().serve_connection(TokioIo::new(stream), service);
        tokio::pin!(connection);

        tokio::select! {
            result = connection.as_mut() => result,
            () = shutdown.recv() => {
                connection.as_mut().graceful_shutdown();
                connection.await
            }
        }
    }

    async fn handle_request(
        &self,
        request: http::Request<Incoming>,
        remote_addr: SocketAddr,
    ) -> Response {
        let ctx = MiddlewareContext::with_remote_addr(remote_addr);
        let timeout = self.config.request_timeout();

        let work = async {
            let request = match self.buffer_request(request).await {
                Ok(request) => request,
                Err(response) => return response,
            };
            self.manager.handle(ctx, request).await
        };

        match tokio::time::timeout(timeout, work).await {
            Ok(response) => response,
            Err(_) => {
                tracing::warn!(remote = %remote_addr, timeout = ?timeout, "request timed out");
                Response::error(StatusCode::GATEWAY_TIMEOUT, "request timed out")
            }
        }
    }

    /// Reads the body into memory, never past the body limit. An oversized
    /// body is replaced by an empty one and the request marked with
    /// [`BodyLimitExceeded`] for the pipeline to reject.
    async fn buffer_request(
        &self,
        request: http::Request<Incoming>,
    ) -> Result<dsc_middleware::Request, Response> {
        let (mut parts, body) = request.into_parts();
        let limit = usize::try_from(self.config.max_body_bytes()).unwrap_or(usize::MAX);

        let bytes = match Limited::new(body, limit).collect().await {
            Ok(collected) => collected.to_bytes(),
            Err(error) if error.downcast_ref::<LengthLimitError>().is_some() => {
                parts.extensions.insert(BodyLimitExceeded);
                Bytes::new()
            }
            Err(error) => {
                tracing::debug!(error = %error, "failed to read request body");
                return Err(Response::error(
                    StatusCode::BAD_REQUEST,
                    &format!("error reading request body: {error}"),
                ));
            }
        };

        Ok(http::Request::from_parts(parts, Full::new(bytes)))
    }
}
