use std::sync::Arc;
use std::time::Duration;

use futures::prelude::*;
use tower_http::BoxError;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

use guestbook_controller::{Config, Context, ControllerStreamExt, controllers};

async fn ctrl_c() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to listen for shutdown signal");
}

async fn shutdown_signal(controller: &'static str) {
    ctrl_c().await;
    tracing::info!("Received shutdown signal, shutting down {controller} controller...");
}

async fn shutdown_timeout(timeout: Duration) -> Result<(), BoxError> {
    ctrl_c().await;
    tokio::time::sleep(timeout).await;
    tracing::warn!("Shutdown timeout reached, shutting down forcefully");
    Err(BoxError::from("Shutdown timeout reached"))
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();
    let config = Config::load().expect("Failed to load configuration");

    let client = guestbook::Client::builder()
        .name(&config.name)
        .namespace(config.namespace.as_deref())
        .build()
        .await
        .expect("Failed to build client");
    let shutdown = Duration::from_secs(config.shutdown_timeout_secs);

    tracing::info!("Patching CRDs...");
    client
        .patch_all_crds()
        .await
        .expect("Failed to apply CRDs");

    match &config.namespace {
        Some(namespace) => tracing::info!("Processing events in {namespace} namespace..."),
        None => tracing::info!("Processing events in all namespaces..."),
    }
    let ctx = Arc::new(Context::new(client, config));
    futures::future::try_select(
        controllers::guestbook::run(ctx, shutdown_signal("guestbook"))
            .await
            .expect("Failed to start guestbook controller")
            .wait()
            .map(|_| Ok(())),
        shutdown_timeout(shutdown).boxed(),
    )
    .await
    .map_err(|err| err.factor_first().0)
    .unwrap();
}
