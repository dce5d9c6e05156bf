// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Raw namespace watch - edge-triggered, reacts to added namespaces only.

use crate::eligibility::{is_eligible, Epoch, Exclusions};
use crate::error::{Result, WatcherError};
use crate::health::Readiness;
use crate::kubernetes::{ensure_marker_workload, WorkloadOutcome};
use crate::shutdown::ShutdownSignal;
use crate::types::NamespaceEvent;
use crate::watch::backoff::RestartBackoff;
use futures::{StreamExt, TryStreamExt};
use k8s_openapi::api::core::v1::Namespace;
use kube::{api::WatchParams, Api, Client, ResourceExt};
use std::time::Instant;
use tokio::time::sleep;
use tracing::{debug, info, instrument, warn};

pub struct NamespaceWatcher {
    client: Client,
    exclusions: Exclusions,
    backoff: RestartBackoff,
}

impl NamespaceWatcher {
    pub fn new(client: Client, exclusions: Exclusions, backoff: RestartBackoff) -> Self {
        Self {
            client,
            exclusions,
            backoff,
        }
    }

    /// Subscribe again and again until shutdown.
    ///
    /// Every subscription captures a fresh epoch, so namespaces created while the
    /// watch was down count as pre-existing and are not provisioned.
    pub async fn run(mut self, readiness: Readiness, shutdown: ShutdownSignal) -> Result<()> {
        while !shutdown.is_triggered() {
            let epoch = Epoch::now();
            let started = Instant::now();
            info!("Opening namespace watch, epoch {}", epoch.instant());

            let ended = tokio::select! {
                res = self.watch_once(epoch, &readiness) => res,
                _ = shutdown.wait() => break,
            };
            readiness.set_ready(false);

            let clean = matches!(ended, Err(WatcherError::StreamClosed) | Ok(()));
            match ended {
                Err(WatcherError::StreamClosed) | Ok(()) => {
                    debug!("Namespace watch closed by the API server")
                }
                Err(e) => warn!("Namespace watch ended: {}", e),
            }

            let delay = self.backoff.delay_after(clean, started.elapsed());
            if delay.is_zero() {
                info!("Resubscribing to namespaces");
                continue;
            }
            info!("Resubscribing to namespaces in {:?}", delay);

            tokio::select! {
                _ = sleep(delay) => {}
                _ = shutdown.wait() => break,
            }
        }

        readiness.set_ready(false);
        info!("Namespace watch loop stopped");
        Ok(())
    }

    /// Consume one subscription. Always ends in an error: either the stream closed or an
    /// event could not be handled.
    #[instrument(skip(self, readiness))]
    pub async fn watch_once(&self, epoch: Epoch, readiness: &Readiness) -> Result<()> {
        let namespaces: Api<Namespace> = Api::all(self.client.clone());
        let mut events = namespaces.watch(&WatchParams::default(), "0").await?.boxed();
        readiness.set_ready(true);

        while let Some(event) = events.try_next().await? {
            let Some(event) = NamespaceEvent::from_watch_event(event)? else {
                continue;
            };
            self.handle_event(&event, epoch).await?;
        }

        Err(WatcherError::StreamClosed)
    }

    /// Provision the marker workload for eligible added namespaces, ignore everything else
    pub async fn handle_event(
        &self,
        event: &NamespaceEvent,
        epoch: Epoch,
    ) -> Result<Option<WorkloadOutcome>> {
        match event {
            NamespaceEvent::Added(ns) if is_eligible(ns, epoch, &self.exclusions) => {
                ensure_marker_workload(&self.client, &ns.name_any())
                    .await
                    .map(Some)
            }
            NamespaceEvent::Added(ns) => {
                debug!("Skipping excluded or pre-existing namespace {}", ns.name_any());
                Ok(None)
            }
            other => {
                debug!("Ignoring {} event for namespace {}", other.kind(), other.name());
                Ok(None)
            }
        }
    }
}
