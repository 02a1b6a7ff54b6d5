use crate::cache::BookCache;
use crate::config::Config;
use crate::error::ApiError;
use crate::handlers::{
    create_books, delete_book, get_book, health_check, list_books, method_not_allowed, not_found,
    AppState, SharedState,
};
use crate::middleware::{request_context, throttle};
use crate::repository::{BookRepository, InMemoryBookRepository};
use crate::service::BookService;
use crate::throttle::RequestThrottle;
use axum::routing::get;
use axum::{middleware, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::signal;
use tokio::task::JoinHandle;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub struct Server {
    app: Router,
    state: SharedState,
}

impl Server {
    pub fn new(config: Config) -> Result<Self, ApiError> {
        config.validate()?;
        let state = build_state(config, Arc::new(InMemoryBookRepository::new()));
        let app = build_router(state.clone());

        Ok(Self { app, state })
    }

    pub async fn run(self) -> Result<(), Box<dyn std::error::Error>> {
        let addr = self.state.config.bind_addr;
        let listener = tokio::net::TcpListener::bind(addr).await?;

        tracing::info!("Book manager listening on {}", addr);
        tracing::info!("Health check available at /health");

        let sweeper = spawn_sweeper(self.state.clone(), self.state.config.sweep_interval());

        // Run server with graceful shutdown
        let result = axum::serve(
            listener,
            self.app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown_signal())
        .await;

        sweeper.abort();
        tracing::info!("Sweeper stopped");

        result?;
        Ok(())
    }
}

/// Build the application with an in-memory repository
pub fn create_app(config: Config) -> Result<Router, ApiError> {
    config.validate()?;
    Ok(build_router(build_state(
        config,
        Arc::new(InMemoryBookRepository::new()),
    )))
}

pub fn build_state(config: Config, repository: Arc<dyn BookRepository>) -> SharedState {
    let books = BookService::new(repository, BookCache::new(config.cache_ttl()));
    Arc::new(AppState::new(config, books, RequestThrottle::new()))
}

pub fn build_router(state: SharedState) -> Router {
    let api = Router::new()
        .route("/books", get(list_books).post(create_books))
        .route("/books/:id", get(get_book).delete(delete_book))
        // Must precede route_layer so unsupported methods are throttled too.
        .method_not_allowed_fallback(method_not_allowed)
        .route_layer(middleware::from_fn_with_state(state.clone(), throttle));

    let app = Router::new()
        .nest("/api/v1", api)
        .route("/health", get(health_check))
        .fallback(not_found)
        .with_state(state.clone())
        .layer(
            ServiceBuilder::new()
                .layer(CorsLayer::permissive())
                .layer(middleware::from_fn(request_context)),
        );

    if state.config.enable_tracing {
        app.layer(TraceLayer::new_for_http())
    } else {
        app
    }
}

/// Periodically drops idle throttle entries and expired cache entries
pub fn spawn_sweeper(state: SharedState, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        // The first tick completes immediately.
        interval.tick().await;

        loop {
            interval.tick().await;
            let now = Instant::now();
            let clients = state.throttle.evict_idle(now);
            let books = state.books.cache().purge_expired(now);

            tracing::debug!(
                evicted_clients = clients,
                purged_books = books,
                tracked_clients = state.throttle.tracked_clients(),
                "Sweep finished"
            );
        }
    })
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("Received terminate signal, initiating graceful shutdown");
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_sweeper_evicts_idle_clients() {
        let state = build_state(Config::default(), Arc::new(InMemoryBookRepository::new()));
        let long_ago = Instant::now()
            .checked_sub(Duration::from_secs(60))
            .unwrap_or_else(Instant::now);
        state.throttle.is_limited_at("203.0.113.7", long_ago);

        let sweeper = spawn_sweeper(state.clone(), Duration::from_millis(10));
        tokio::time::sleep(Duration::from_millis(50)).await;
        sweeper.abort();

        assert_eq!(state.throttle.tracked_clients(), 0);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = Config {
            sweep_interval_secs: 0,
            ..Config::default()
        };
        assert!(create_app(config).is_err());
    }
}
