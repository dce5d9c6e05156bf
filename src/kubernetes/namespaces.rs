// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Namespace reads and optimistic finalizer updates

use crate::coordination::{has_finalizer, with_finalizer, without_finalizer};
use crate::error::{Result, WatcherError};
use k8s_openapi::api::core::v1::Namespace;
use kube::{api::PostParams, Api, Client, ResourceExt};
use tracing::{debug, info, instrument, warn};

/// Read the current namespace, `None` when it is already gone
#[instrument(skip(client))]
pub async fn get_namespace(client: &Client, name: &str) -> Result<Option<Namespace>> {
    let namespaces: Api<Namespace> = Api::all(client.clone());
    Ok(namespaces.get_opt(name).await?)
}

/// Add the watcher finalizer to the snapshot and persist it.
///
/// The update carries the snapshot's resourceVersion, so a concurrent writer (another
/// replica claiming the same namespace) makes this fail with a conflict instead of
/// overwriting.
#[instrument(skip(client, namespace), fields(namespace = %namespace.name_any()))]
pub async fn claim_namespace(client: &Client, namespace: &Namespace) -> Result<Namespace> {
    let name = namespace.name_any();
    if has_finalizer(namespace) {
        debug!("Namespace {} already claimed", name);
        return Ok(namespace.clone());
    }

    info!("Claiming namespace {}", name);
    replace_namespace(client, &name, &with_finalizer(namespace)).await
}

/// Remove the watcher finalizer so the pending deletion can complete
#[instrument(skip(client, namespace), fields(namespace = %namespace.name_any()))]
pub async fn release_namespace(client: &Client, namespace: &Namespace) -> Result<Namespace> {
    let name = namespace.name_any();
    if !has_finalizer(namespace) {
        debug!("Namespace {} already released", name);
        return Ok(namespace.clone());
    }

    info!("Namespace {} is being deleted, releasing finalizer", name);
    replace_namespace(client, &name, &without_finalizer(namespace)).await
}

async fn replace_namespace(client: &Client, name: &str, desired: &Namespace) -> Result<Namespace> {
    let namespaces: Api<Namespace> = Api::all(client.clone());

    namespaces
        .replace(name, &PostParams::default(), desired)
        .await
        .map_err(|source| {
            warn!("Failed to update finalizer on namespace {}: {}", name, source);
            WatcherError::FinalizerError {
                namespace: name.to_string(),
                source,
            }
        })
}
