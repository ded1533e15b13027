use anyhow::{Context, Result};
use axum::http::HeaderValue;
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};

use storefront_api::{
    api_v1_routes, config,
    config::AppConfig,
    db,
    events::{self, EventSender},
    handlers::AppServices,
    openapi,
    services::payments::LocalAuthorizer,
    services::{CartService, CheckoutService, OrderService, PaymentService},
    AppState,
};

#[tokio::main]
async fn main() -> Result<()> {
    let config = config::load_config().context("Failed to load configuration")?;
    config::init_tracing(&config.log_level, config.log_json);

    info!(
        "Starting storefront-api v{} in {} mode",
        env!("CARGO_PKG_VERSION"),
        config.environment
    );

    let pool = db::establish_connection_from_app_config(&config)
        .await
        .context("Failed to connect to the database")?;
    if config.auto_migrate {
        db::run_migrations(&pool)
            .await
            .context("Failed to run migrations")?;
    }
    let db = Arc::new(pool);

    let (tx, rx) = tokio::sync::mpsc::channel(config.event_channel_capacity);
    let event_sender = Arc::new(EventSender::new(tx));
    tokio::spawn(events::process_events(rx));

    let services = AppServices {
        carts: CartService::new(db.clone(), event_sender.clone()),
        checkout: CheckoutService::new(db.clone(), event_sender.clone()),
        orders: OrderService::new(db.clone(), event_sender.clone()),
        payments: PaymentService::new(
            db.clone(),
            event_sender.clone(),
            Arc::new(LocalAuthorizer),
            config.default_currency.clone(),
        ),
    };

    let state = Arc::new(AppState {
        db,
        config: config.clone(),
        event_sender,
        services,
    });

    let app = Router::new()
        .merge(openapi::swagger_ui())
        .nest("/api/v1", api_v1_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(build_cors_layer(&config))
        .with_state(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("Invalid host/port combination")?;
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind listener")?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Shutdown complete");
    Ok(())
}

fn build_cors_layer(config: &AppConfig) -> CorsLayer {
    if config.has_cors_allowed_origins() {
        let origins: Vec<HeaderValue> = config
            .cors_allowed_origins
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .filter_map(|o| match HeaderValue::from_str(o) {
                Ok(v) => Some(v),
                Err(_) => {
                    warn!("Ignoring malformed CORS origin: {}", o);
                    None
                }
            })
            .collect();
        info!("CORS restricted to {} origin(s)", origins.len());
        CorsLayer::new().allow_origin(AllowOrigin::list(origins))
    } else {
        info!("No CORS origins configured; using permissive CORS");
        CorsLayer::permissive()
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for ctrl-c: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => warn!("Failed to install SIGTERM handler: {}", e),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
