// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Namespace reconciler - cached, filtered, level-triggered processing with finalizer
//! coordination.

use crate::constants::requeue;
use crate::coordination::{CoordinationPolicy, Decision};
use crate::eligibility::{Epoch, Exclusions};
use crate::error::{Result, WatcherError};
use crate::health::Readiness;
use crate::kubernetes::{claim_namespace, ensure_marker_workload, get_namespace, release_namespace};
use crate::reconcilers::filter::TransitionFilter;
use crate::shutdown::ShutdownSignal;
use futures::{future, StreamExt};
use k8s_openapi::api::core::v1::Namespace;
use kube::{
    runtime::{
        controller::{self, Action},
        reflector, watcher, Controller, WatchStreamExt,
    },
    Api, Client, ResourceExt,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};

/// Shared state handed to every reconciliation
pub struct Context {
    pub client: Client,
    pub policy: CoordinationPolicy,
}

pub struct NamespaceReconciler {
    client: Client,
    exclusions: Exclusions,
    workers: u16,
    cache_sync_timeout: Duration,
}

impl NamespaceReconciler {
    pub fn new(
        client: Client,
        exclusions: Exclusions,
        workers: u16,
        cache_sync_timeout: Duration,
    ) -> Self {
        Self {
            client,
            exclusions,
            workers,
            cache_sync_timeout,
        }
    }

    /// Run until shutdown. Readiness flips to true once the initial listing is cached.
    pub async fn run(self, readiness: Readiness, shutdown: ShutdownSignal) -> Result<()> {
        let namespaces: Api<Namespace> = Api::all(self.client.clone());
        let (reader, writer) = reflector::store();

        let epoch = Epoch::now();
        info!("Namespace reconciler starting, epoch {}", epoch.instant());

        let context = Arc::new(Context {
            client: self.client.clone(),
            policy: CoordinationPolicy::new(epoch, self.exclusions.clone()),
        });

        let mut filter = TransitionFilter::new();
        let admitted = watcher(namespaces, watcher::Config::default())
            .default_backoff()
            .reflect(writer)
            .filter_map(move |event| {
                future::ready(match event {
                    Ok(event) => filter.admit(event).map(Ok),
                    Err(e) => Some(Err(e)),
                })
            });

        let controller_shutdown = shutdown.clone();
        let controller = Controller::for_stream(admitted, reader.clone())
            .with_config(controller::Config::default().concurrency(self.workers))
            .graceful_shutdown_on(async move { controller_shutdown.wait().await })
            .run(reconcile, error_policy, context)
            .for_each(|res| async move {
                match res {
                    Ok((o, _)) => debug!("Reconciled namespace: {}", o.name),
                    Err(e) if needs_logging(&e) => warn!("Namespace controller error: {:?}", e),
                    Err(_) => {}
                }
            });
        tokio::pin!(controller);

        let cache_sync = tokio::time::timeout(self.cache_sync_timeout, reader.wait_until_ready());
        let synced = tokio::select! {
            synced = cache_sync => synced,
            _ = &mut controller => {
                info!("Namespace reconciler stopped before the cache synced");
                return Ok(());
            }
        };

        match synced {
            Ok(Ok(())) => {
                info!("Namespace cache synced, reconciler is ready");
                readiness.set_ready(true);
            }
            Ok(Err(e)) => {
                return Err(WatcherError::WatchError(format!(
                    "namespace cache writer dropped: {}",
                    e
                )));
            }
            Err(_) => {
                error!("Timed out waiting for namespace cache to sync");
                return Err(WatcherError::CacheSyncTimeout(
                    self.cache_sync_timeout.as_secs(),
                ));
            }
        }

        controller.await;

        readiness.set_ready(false);
        info!("Namespace reconciler stopped");
        Ok(())
    }
}

/// Re-read the namespace and apply the decision for its current state
#[instrument(skip(namespace, ctx), fields(namespace = %namespace.name_any()))]
pub async fn reconcile(namespace: Arc<Namespace>, ctx: Arc<Context>) -> Result<Action> {
    let name = namespace.name_any();

    let Some(current) = get_namespace(&ctx.client, &name).await? else {
        debug!("Namespace {} no longer exists, nothing to do", name);
        return Ok(Action::await_change());
    };

    match ctx.policy.decide(&current) {
        Decision::Skip(reason) => {
            debug!("Skipping namespace {}: {:?}", name, reason);
        }
        Decision::Release => {
            release_namespace(&ctx.client, &current).await?;
            info!("Released namespace {}", name);
        }
        Decision::Claim => {
            claim_namespace(&ctx.client, &current).await?;
            info!("Claimed namespace {}", name);
        }
        Decision::Provision => {
            let outcome = ensure_marker_workload(&ctx.client, &name).await?;
            debug!("Marker workload for namespace {}: {:?}", name, outcome);
        }
    }

    Ok(Action::await_change())
}

/// Reconciler failures are already reported by `error_policy`
fn needs_logging(error: &controller::Error<WatcherError, watcher::Error>) -> bool {
    !matches!(error, controller::Error::ReconcilerFailed(..))
}

pub fn error_policy(namespace: Arc<Namespace>, error: &WatcherError, _ctx: Arc<Context>) -> Action {
    if error.is_conflict() {
        warn!(
            "Namespace {} changed while updating, retrying: {}",
            namespace.name_any(),
            error
        );
        return Action::requeue(Duration::from_secs(requeue::CONFLICT_SECS));
    }

    error!(
        "Reconciliation of namespace {} failed: {}",
        namespace.name_any(),
        error
    );
    Action::requeue(Duration::from_secs(requeue::ERROR_SECS))
}
