use std::net::SocketAddr;
use std::sync::Arc;

use tokio::signal;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use atelier_api::{
    auth::AuthService,
    config,
    events,
    handlers,
    notifications::{FcmNotifier, NoopNotifier, Notifier},
    services::{OrderLifecycleService, Permissive, Sequential, TransitionPolicy},
    store::{InMemoryOrderStore, OrderStore},
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = config::load_config()?;
    config::init_tracing(&cfg.log_level, cfg.log_json);
    cfg.validate()?;

    let store: Arc<dyn OrderStore> = Arc::new(InMemoryOrderStore::new());

    let notifier: Arc<dyn Notifier> = if cfg.fcm.enabled() {
        info!("push notifications enabled");
        Arc::new(FcmNotifier::from_config(&cfg.fcm)?)
    } else {
        info!("no FCM server key configured; push notifications disabled");
        Arc::new(NoopNotifier)
    };

    let (event_sender, event_rx) = events::channel(cfg.event_buffer);
    tokio::spawn(events::process_events(
        event_rx,
        notifier,
        cfg.fcm.notify_token.clone(),
    ));

    let policy: Arc<dyn TransitionPolicy> = if cfg.strict_transitions {
        info!("strict status transitions enabled");
        Arc::new(Sequential)
    } else {
        Arc::new(Permissive)
    };

    let orders = OrderLifecycleService::new(store.clone(), Some(event_sender), policy);
    let auth = Arc::new(AuthService::new(&cfg.jwt_secret));

    let state = AppState {
        orders,
        store,
        auth,
        config: cfg.clone(),
    };

    let app = handlers::router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("{}:{}", cfg.host, cfg.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "atelier-api listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to install shutdown handler");
        return;
    }
    info!("shutdown signal received");
}
