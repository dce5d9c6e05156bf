// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Cached namespace watch - acts once on the first sighting of every namespace, without
//! finalizer coordination.

use crate::eligibility::{is_eligible, Epoch, Exclusions};
use crate::error::{Result, WatcherError};
use crate::health::Readiness;
use crate::kubernetes::{ensure_marker_workload, WorkloadOutcome};
use crate::shutdown::ShutdownSignal;
use futures::StreamExt;
use k8s_openapi::api::core::v1::Namespace;
use kube::runtime::{reflector, reflector::store::Writer, watcher, watcher::Event, WatchStreamExt};
use kube::{Api, Client, ResourceExt};
use std::collections::HashSet;
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};

/// Remembers which namespace names were already seen, so resyncs and updates do not
/// trigger a second action
#[derive(Debug, Default)]
pub struct FirstSightings {
    seen: HashSet<String>,
    /// Names seen since the current relist began, `None` outside a relist
    relisted: Option<HashSet<String>>,
}

impl FirstSightings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one watcher event, returns the namespace the first time its name shows up
    pub fn observe(&mut self, event: Event<Namespace>) -> Option<Namespace> {
        match event {
            Event::Init => {
                self.relisted = Some(HashSet::new());
                None
            }
            Event::InitApply(ns) => {
                if let Some(relisted) = self.relisted.as_mut() {
                    relisted.insert(ns.name_any());
                }
                self.first(ns)
            }
            Event::InitDone => {
                if let Some(relisted) = self.relisted.take() {
                    self.seen.retain(|name| relisted.contains(name));
                }
                None
            }
            Event::Apply(ns) => self.first(ns),
            Event::Delete(ns) => {
                self.seen.remove(&ns.name_any());
                None
            }
        }
    }

    fn first(&mut self, ns: Namespace) -> Option<Namespace> {
        self.seen.insert(ns.name_any()).then_some(ns)
    }
}

pub struct NamespaceInformer {
    client: Client,
    exclusions: Exclusions,
    cache_sync_timeout: Duration,
}

impl NamespaceInformer {
    pub fn new(client: Client, exclusions: Exclusions, cache_sync_timeout: Duration) -> Self {
        Self {
            client,
            exclusions,
            cache_sync_timeout,
        }
    }

    /// Run until shutdown. The epoch is captured once; the watcher relists and
    /// resumes on its own, so namespaces created during an outage are still seen.
    pub async fn run(self, readiness: Readiness, shutdown: ShutdownSignal) -> Result<()> {
        let (reader, writer) = reflector::store();
        let epoch = Epoch::now();
        info!("Namespace informer starting, epoch {}", epoch.instant());

        let events = self.consume(writer, epoch);
        tokio::pin!(events);

        let cache_sync = tokio::time::timeout(self.cache_sync_timeout, reader.wait_until_ready());
        let synced = tokio::select! {
            synced = cache_sync => synced,
            ended = &mut events => return ended,
            _ = shutdown.wait() => {
                info!("Namespace informer stopped before the cache synced");
                return Ok(());
            }
        };

        match synced {
            Ok(Ok(())) => {
                info!("Namespace cache synced, informer is ready");
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

        let ended = tokio::select! {
            ended = &mut events => ended,
            _ = shutdown.wait() => Ok(()),
        };

        readiness.set_ready(false);
        info!("Namespace informer stopped");
        ended
    }

    /// Drive the cached watch, handling first sightings one at a time
    async fn consume(&self, writer: Writer<Namespace>, epoch: Epoch) -> Result<()> {
        let namespaces: Api<Namespace> = Api::all(self.client.clone());
        let stream = watcher(namespaces, watcher::Config::default())
            .default_backoff()
            .reflect(writer);
        tokio::pin!(stream);

        let mut sightings = FirstSightings::new();
        while let Some(event) = stream.next().await {
            match event {
                Ok(event) => {
                    let Some(ns) = sightings.observe(event) else {
                        continue;
                    };
                    if let Err(e) = self.handle(&ns, epoch).await {
                        error!("Failed to provision namespace {}: {}", ns.name_any(), e);
                    }
                }
                Err(e) => warn!("Namespace watch error: {}", e),
            }
        }

        Err(WatcherError::StreamClosed)
    }

    /// Provision the marker workload when a newly seen namespace is eligible
    #[instrument(skip(self, ns), fields(namespace = %ns.name_any()))]
    pub async fn handle(&self, ns: &Namespace, epoch: Epoch) -> Result<Option<WorkloadOutcome>> {
        if !is_eligible(ns, epoch, &self.exclusions) {
            debug!("Skipping excluded or pre-existing namespace {}", ns.name_any());
            return Ok(None);
        }
        ensure_marker_workload(&self.client, &ns.name_any())
            .await
            .map(Some)
    }
}
