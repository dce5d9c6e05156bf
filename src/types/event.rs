// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::error::{Result, WatcherError};
use k8s_openapi::api::core::v1::Namespace;
use kube::api::WatchEvent;
use kube::ResourceExt;

/// A namespace event delivered by the raw watch stream
#[derive(Debug, Clone)]
pub enum NamespaceEvent {
    Added(Namespace),
    Modified(Namespace),
    Deleted(Namespace),
}

impl NamespaceEvent {
    /// Convert a raw watch event. Bookmarks carry no namespace and map to `None`,
    /// server-side error events fail the subscription.
    pub fn from_watch_event(event: WatchEvent<Namespace>) -> Result<Option<Self>> {
        match event {
            WatchEvent::Added(ns) => Ok(Some(NamespaceEvent::Added(ns))),
            WatchEvent::Modified(ns) => Ok(Some(NamespaceEvent::Modified(ns))),
            WatchEvent::Deleted(ns) => Ok(Some(NamespaceEvent::Deleted(ns))),
            WatchEvent::Bookmark(_) => Ok(None),
            WatchEvent::Error(err) => Err(WatcherError::WatchError(format!(
                "{} ({}): {}",
                err.reason, err.code, err.message
            ))),
        }
    }

    pub fn namespace(&self) -> &Namespace {
        match self {
            NamespaceEvent::Added(ns)
            | NamespaceEvent::Modified(ns)
            | NamespaceEvent::Deleted(ns) => ns,
        }
    }

    pub fn name(&self) -> String {
        self.namespace().name_any()
    }

    pub fn kind(&self) -> &'static str {
        match self {
            NamespaceEvent::Added(_) => "Added",
            NamespaceEvent::Modified(_) => "Modified",
            NamespaceEvent::Deleted(_) => "Deleted",
        }
    }
}
