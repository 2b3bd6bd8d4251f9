//! Controller for GuestbookEntry resources

use futures::StreamExt;
use k8s_openapi::api::core::v1::ConfigMap;
use kube::{
    runtime::{
        controller::{Action, Controller},
        watcher::Config,
    },
    Api, Client, ResourceExt,
};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

use crate::controllers::Context;
use crate::crd::GuestbookEntry;
use crate::metrics::prometheus::{
    RECONCILE_DURATION, RECONCILE_OUTCOMES, RECONCILIATIONS, RECONCILIATION_ERRORS,
};
use crate::reconcilers::guestbook::{self, Outcome};
use crate::Error;

const KIND: &str = "GuestbookEntry";

/// Run the GuestbookEntry controller
///
/// Watches GuestbookEntry objects and the ConfigMaps they own; a change to
/// either triggers a reconcile of the owning entry.
pub async fn run(client: Client, ctx: Arc<Context>) {
    let (entries, config_maps): (Api<GuestbookEntry>, Api<ConfigMap>) =
        match ctx.config.watch_namespace.as_deref() {
            Some(ns) => (
                Api::namespaced(client.clone(), ns),
                Api::namespaced(client.clone(), ns),
            ),
            None => (Api::all(client.clone()), Api::all(client.clone())),
        };

    info!(
        namespace = ctx.config.watch_namespace.as_deref().unwrap_or("*"),
        "Starting GuestbookEntry controller"
    );

    Controller::new(entries, Config::default().any_semantic())
        .owns(config_maps, owned_config_map_watch())
        .shutdown_on_signal()
        .run(reconcile, error_policy, ctx)
        .for_each(|res| async move {
            match res {
                Ok(o) => info!("Reconciled {:?}", o),
                Err(e) => error!("Reconcile failed: {:?}", e),
            }
        })
        .await;

    info!("GuestbookEntry controller stopped");
}

/// Watch configuration for owned ConfigMaps
///
/// Unfiltered: the owner reference alone maps an event back to its entry, so
/// a child that lost or never had the guestbook labels still triggers.
pub fn owned_config_map_watch() -> Config {
    Config::default()
}

/// Reconcile a GuestbookEntry resource
///
/// The cached object only supplies the key; the reconciler reads the entry
/// fresh from the store.
#[instrument(skip(entry, ctx), fields(name = %entry.name_any(), namespace = entry.namespace().unwrap_or_default()))]
pub async fn reconcile(entry: Arc<GuestbookEntry>, ctx: Arc<Context>) -> Result<Action, Error> {
    let start = std::time::Instant::now();
    let ns = entry.namespace().ok_or(Error::MissingObjectKey("namespace"))?;
    let name = entry.name_any();

    RECONCILIATIONS.with_label_values(&[KIND]).inc();

    let result = guestbook::reconcile_entry(ctx.store.as_ref(), &ctx.shutdown, &ns, &name).await;

    let duration = start.elapsed().as_secs_f64();
    RECONCILE_DURATION.with_label_values(&[KIND]).observe(duration);

    match &result {
        Ok(outcome) => {
            RECONCILE_OUTCOMES
                .with_label_values(&[KIND, outcome.as_str()])
                .inc();
            info!(
                "Successfully reconciled {}/{} in {:.2}s ({})",
                ns,
                name,
                duration,
                outcome.as_str()
            );
        }
        Err(e) => {
            RECONCILIATION_ERRORS
                .with_label_values(&[KIND, e.metric_label()])
                .inc();
            error!("Failed to reconcile {}/{}: {}", ns, name, e);
        }
    }

    Ok(action_for(result?, &ctx))
}

/// Map a reconcile outcome to the controller action
pub fn action_for(outcome: Outcome, ctx: &Context) -> Action {
    if outcome.requeue() {
        Action::requeue(ctx.config.create_requeue)
    } else {
        Action::await_change()
    }
}

/// Error policy for the controller
///
/// No error is terminal; backoff between attempts is left to the controller.
pub fn error_policy(entry: Arc<GuestbookEntry>, err: &Error, ctx: Arc<Context>) -> Action {
    let ns = entry.namespace().unwrap_or_default();
    let name = entry.name_any();

    match err {
        Error::Cancelled => {
            warn!("Reconciliation of {}/{} cancelled by shutdown", ns, name);
            Action::await_change()
        }
        _ => {
            error!("Reconciliation error for {}/{}: {}", ns, name, err);
            Action::requeue(ctx.config.error_requeue)
        }
    }
}
