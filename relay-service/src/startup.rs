//! Application startup and lifecycle management.

use crate::config::RelayConfig;
use crate::handlers::{send_code, sensor_data};
use crate::services::{
    CodeForwarder, MessagingProvider, MockMessagingProvider, MySqlSensorRepository, SensorReader,
    SensorRepository, TwilioProvider,
};
use axum::{
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::request_id_middleware;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: RelayConfig,
    pub sensor_reader: SensorReader,
    pub forwarder: CodeForwarder,
}

impl AppState {
    pub fn new(
        config: RelayConfig,
        sensor_repository: Arc<dyn SensorRepository>,
        messaging_provider: Arc<dyn MessagingProvider>,
    ) -> Self {
        let forwarder = CodeForwarder::new(messaging_provider, config.twilio.whatsapp_from.clone());

        Self {
            config,
            sensor_reader: SensorReader::new(sensor_repository),
            forwarder,
        }
    }

    /// State wired to MySQL and, when enabled, Twilio.
    pub fn from_config(config: RelayConfig) -> Self {
        let sensor_repository: Arc<dyn SensorRepository> =
            Arc::new(MySqlSensorRepository::new(&config.database));

        let messaging_provider: Arc<dyn MessagingProvider> = if config.twilio.enabled {
            tracing::info!("Twilio messaging provider initialized");
            Arc::new(TwilioProvider::new(config.twilio.clone()))
        } else {
            tracing::info!("Twilio provider disabled, using mock messaging provider");
            Arc::new(MockMessagingProvider::new(true))
        };

        Self::new(config, sensor_repository, messaging_provider)
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/sensor_data", get(sensor_data))
        .route("/send_code", post(send_code))
        .layer(TraceLayer::new_for_http())
        .layer(from_fn(request_id_middleware))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    state: AppState,
}

impl Application {
    /// Build the application with the given configuration.
    pub async fn build(config: RelayConfig) -> Result<Self, AppError> {
        Self::build_with_state(AppState::from_config(config)).await
    }

    /// Build the application around pre-wired state (port 0 = random port).
    pub async fn build_with_state(state: AppState) -> Result<Self, AppError> {
        let addr = SocketAddr::from(([0, 0, 0, 0], state.config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind HTTP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Relay service: HTTP on port {}", port);

        Ok(Self {
            port,
            listener,
            state,
        })
    }

    /// Get the port the server is listening on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Run the application until a shutdown signal arrives.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        let router = build_router(self.state);

        axum::serve(self.listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| {
                tracing::error!("HTTP server error: {}", e);
                std::io::Error::other(format!("HTTP server error: {}", e))
            })
    }
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
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
