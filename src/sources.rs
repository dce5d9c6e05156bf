// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! The three interchangeable ways of delivering namespace events to the decision logic.

use crate::config::{Config, WatchMode};
use crate::eligibility::Exclusions;
use crate::error::Result;
use crate::health::Readiness;
use crate::reconcilers::NamespaceReconciler;
use crate::shutdown::ShutdownSignal;
use crate::watch::{NamespaceInformer, NamespaceWatcher, RestartBackoff};
use kube::Client;

pub enum EventSource {
    CachedReconciler(NamespaceReconciler),
    RawStream(NamespaceWatcher),
    CachedWatch(NamespaceInformer),
}

impl EventSource {
    pub fn from_config(client: Client, config: &Config) -> Self {
        let exclusions = Exclusions::new(config.excluded_namespaces.iter().cloned());

        match config.watch_mode {
            WatchMode::Reconciler => EventSource::CachedReconciler(NamespaceReconciler::new(
                client,
                exclusions,
                config.reconcile_workers,
                config.cache_sync_timeout,
            )),
            WatchMode::Watch => EventSource::RawStream(NamespaceWatcher::new(
                client,
                exclusions,
                RestartBackoff::new(config.restart_backoff_initial, config.restart_backoff_max),
            )),
            WatchMode::Informer => EventSource::CachedWatch(NamespaceInformer::new(
                client,
                exclusions,
                config.cache_sync_timeout,
            )),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            EventSource::CachedReconciler(_) => "reconciler",
            EventSource::RawStream(_) => "watch",
            EventSource::CachedWatch(_) => "informer",
        }
    }

    pub async fn run(self, readiness: Readiness, shutdown: ShutdownSignal) -> Result<()> {
        match self {
            EventSource::CachedReconciler(reconciler) => reconciler.run(readiness, shutdown).await,
            EventSource::RawStream(watcher) => watcher.run(readiness, shutdown).await,
            EventSource::CachedWatch(informer) => informer.run(readiness, shutdown).await,
        }
    }
}
