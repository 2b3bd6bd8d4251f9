//! Guestbook Kubernetes Operator
//!
//! Main entry point for the operator. Loads configuration, sets up the
//! Kubernetes client and runs the GuestbookEntry reconciliation loop.

use kube::Client;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use guestbook_operator::{
    config::OperatorConfig,
    controllers::{guestbook_controller, Context},
    metrics,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    info!("Starting Guestbook Operator");

    let config = OperatorConfig::from_env()?;
    info!(
        namespace = config.watch_namespace.as_deref().unwrap_or("all namespaces"),
        metrics_port = config.metrics_port,
        create_requeue_secs = config.create_requeue.as_secs(),
        error_requeue_secs = config.error_requeue.as_secs(),
        "Loaded configuration"
    );

    let client = Client::try_default().await?;
    info!("Connected to Kubernetes API server");

    let metrics_port = config.metrics_port;
    let context = Context::new(client.clone(), config);

    let metrics_handle = tokio::spawn(metrics::serve(metrics_port));
    info!("Metrics server starting on port {}", metrics_port);

    let mut controller_handle =
        tokio::spawn(guestbook_controller::run(client, context.clone()));

    let signalled = tokio::select! {
        _ = &mut controller_handle => {
            error!("GuestbookEntry controller exited unexpectedly");
            return Ok(());
        }
        res = metrics_handle => {
            error!("Metrics server exited unexpectedly: {:?}", res);
            false
        }
        _ = shutdown_signal() => {
            info!("Received shutdown signal, stopping operator");
            true
        }
    };

    // Abort store calls still in flight
    context.shutdown.cancel();

    if signalled {
        // The controller drains on the same signal; wait for cancelled passes to return
        if let Err(e) = controller_handle.await {
            error!("GuestbookEntry controller task failed: {}", e);
        }
    } else {
        controller_handle.abort();
    }

    info!("Guestbook Operator stopped");
    Ok(())
}

/// Initialize tracing subscriber
fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("info,guestbook_operator=debug,kube=warn,hyper=warn")
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().json())
        .init();
}

/// Wait for shutdown signal (SIGTERM or SIGINT)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install CTRL+C handler: {}", e);
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
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received CTRL+C signal");
        }
        _ = terminate => {
            info!("Received SIGTERM signal");
        }
    }
}
