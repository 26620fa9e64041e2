//! HTTP surface for flashdeck.
//!
//! Routes requests to the [`FlashcardStore`] and serves the index page.
//! The store is injected through [`AppState`]; blocking `SQLite` calls run on
//! tokio's blocking pool so they never stall the async workers.

pub mod error;
mod handlers;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::storage::FlashcardStore;

pub use error::ApiError;

/// Shared state handed to every request handler.
#[derive(Debug, Clone)]
pub struct AppState {
    store: Arc<FlashcardStore>,
}

impl AppState {
    /// Wrap a store for use by the router.
    #[must_use]
    pub fn new(store: Arc<FlashcardStore>) -> Self {
        Self { store }
    }

    /// Run a store operation on the blocking pool.
    async fn run<T, F>(&self, op: F) -> Result<T>
    where
        F: FnOnce(&FlashcardStore) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || op(&store))
            .await
            .map_err(|e| Error::internal(format!("storage task failed: {e}")))?
    }
}

/// Build the router with every route and no middleware.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/static/script.js", get(handlers::script))
        .route(
            "/api/flashcards",
            get(handlers::list_flashcards).post(handlers::add_flashcard),
        )
        .route(
            "/api/flashcards/:id",
            get(handlers::get_flashcard)
                .put(handlers::update_flashcard)
                .delete(handlers::delete_flashcard),
        )
        .with_state(state)
}

/// Build the router with request tracing and a per-request timeout.
pub fn app(state: AppState, request_timeout: Duration) -> Router {
    with_middleware(router(state), request_timeout)
}

/// Wrap any router in the layers [`app`] applies.
///
/// Requests that outlive `request_timeout` are answered with
/// `408 Request Timeout`.
pub fn with_middleware(router: Router, request_timeout: Duration) -> Router {
    router
        .layer(TimeoutLayer::new(request_timeout))
        .layer(TraceLayer::new_for_http())
}

/// Bind the configured address and serve until Ctrl-C or SIGTERM.
///
/// # Errors
///
/// Returns [`Error::Server`] if the address cannot be bound or the server
/// fails while running.
pub async fn serve(config: &Config, store: Arc<FlashcardStore>) -> Result<()> {
    let addr = config.bind_address();
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|source| Error::Server {
            addr: addr.clone(),
            source,
        })?;

    serve_on(
        listener,
        app(AppState::new(store), config.request_timeout()),
        shutdown_signal(),
    )
    .await
}

/// Serve `app` on an already bound listener until `shutdown` completes.
///
/// In-flight requests are allowed to finish before this returns.
///
/// # Errors
///
/// Returns [`Error::Server`] if the server fails while running.
pub async fn serve_on<S>(listener: TcpListener, app: Router, shutdown: S) -> Result<()>
where
    S: Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr()?;
    info!("Server listening on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|source| Error::Server {
            addr: addr.to_string(),
            source,
        })?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("Shutdown signal received");
}
