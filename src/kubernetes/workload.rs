// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Idempotent creation of the marker workload

use crate::constants::marker;
use crate::error::{Result, WatcherError};
use k8s_openapi::api::core::v1::{Container, Pod, PodSpec};
use kube::{
    api::{ObjectMeta, PostParams},
    Api, Client,
};
use tracing::{debug, info, instrument, warn};

/// Result of a successful `ensure_marker_workload` call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkloadOutcome {
    Created,
    AlreadyPresent,
}

/// Build the run-once marker pod for a namespace
pub fn marker_pod(namespace: &str) -> Pod {
    Pod {
        metadata: ObjectMeta {
            name: Some(marker::POD_NAME.to_string()),
            namespace: Some(namespace.to_string()),
            ..Default::default()
        },
        spec: Some(PodSpec {
            restart_policy: Some(marker::RESTART_POLICY.to_string()),
            containers: vec![Container {
                name: marker::CONTAINER_NAME.to_string(),
                image: Some(marker::IMAGE.to_string()),
                args: Some(vec![
                    "sh".to_string(),
                    "-c".to_string(),
                    format!("echo namespace: {}", namespace),
                ]),
                ..Default::default()
            }],
            ..Default::default()
        }),
        ..Default::default()
    }
}

/// Ensure exactly one marker workload exists in the namespace.
///
/// Existing pod or an AlreadyExists race on create both count as success. Every other
/// failure is returned and is retryable by the caller.
#[instrument(skip(client))]
pub async fn ensure_marker_workload(client: &Client, namespace: &str) -> Result<WorkloadOutcome> {
    let pods: Api<Pod> = Api::namespaced(client.clone(), namespace);

    match pods.get(marker::POD_NAME).await {
        Ok(_) => {
            debug!(
                "Marker workload {}/{} already exists",
                namespace,
                marker::POD_NAME
            );
            return Ok(WorkloadOutcome::AlreadyPresent);
        }
        Err(kube::Error::Api(err)) if err.code == 404 => {}
        Err(source) => {
            warn!(
                "Failed to look up marker workload in namespace {}: {}",
                namespace, source
            );
            return Err(WatcherError::WorkloadError {
                namespace: namespace.to_string(),
                source,
            });
        }
    }

    info!(
        "Creating marker workload {}/{}",
        namespace,
        marker::POD_NAME
    );

    match pods
        .create(&PostParams::default(), &marker_pod(namespace))
        .await
    {
        Ok(_) => {
            info!(
                "Marker workload {}/{} created successfully",
                namespace,
                marker::POD_NAME
            );
            Ok(WorkloadOutcome::Created)
        }
        Err(kube::Error::Api(err)) if err.code == 409 => {
            debug!(
                "Marker workload {}/{} was created concurrently",
                namespace,
                marker::POD_NAME
            );
            Ok(WorkloadOutcome::AlreadyPresent)
        }
        Err(source) => {
            warn!(
                "Failed to create marker workload in namespace {}: {}",
                namespace, source
            );
            Err(WatcherError::WorkloadError {
                namespace: namespace.to_string(),
                source,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{already_exists_json, forbidden_json, pod_json, MockService};

    const POD_PATH: &str = "/api/v1/namespaces/ns-a/pods/echo-pod";
    const PODS_PATH: &str = "/api/v1/namespaces/ns-a/pods";

    #[test]
    fn test_marker_pod_shape() {
        let pod = marker_pod("ns-a");
        assert_eq!(pod.metadata.name.as_deref(), Some("echo-pod"));
        assert_eq!(pod.metadata.namespace.as_deref(), Some("ns-a"));

        let spec = pod.spec.unwrap();
        assert_eq!(spec.restart_policy.as_deref(), Some("Never"));
        assert_eq!(spec.containers.len(), 1);
        let args = spec.containers[0].args.clone().unwrap();
        assert_eq!(args.last().unwrap(), "echo namespace: ns-a");
    }

    #[tokio::test]
    async fn test_creates_when_missing() {
        let mock = MockService::new().on_post(PODS_PATH, 201, &pod_json("ns-a"));
        let client = mock.clone().into_client();

        let outcome = ensure_marker_workload(&client, "ns-a").await.unwrap();

        assert_eq!(outcome, WorkloadOutcome::Created);
        assert_eq!(mock.requests_matching("POST", PODS_PATH).len(), 1);
    }

    #[tokio::test]
    async fn test_second_call_does_not_create_again() {
        let mock = MockService::new()
            .on_get(POD_PATH, 200, &pod_json("ns-a"))
            .on_post(PODS_PATH, 201, &pod_json("ns-a"));
        let client = mock.clone().into_client();

        assert_eq!(
            ensure_marker_workload(&client, "ns-a").await.unwrap(),
            WorkloadOutcome::AlreadyPresent
        );
        assert_eq!(
            ensure_marker_workload(&client, "ns-a").await.unwrap(),
            WorkloadOutcome::AlreadyPresent
        );
        assert!(mock.requests_matching("POST", PODS_PATH).is_empty());
    }

    #[tokio::test]
    async fn test_already_exists_on_create_is_success() {
        let client = MockService::new()
            .on_post(PODS_PATH, 409, &already_exists_json("pods", "echo-pod"))
            .into_client();

        let outcome = ensure_marker_workload(&client, "ns-a").await.unwrap();
        assert_eq!(outcome, WorkloadOutcome::AlreadyPresent);
    }

    #[tokio::test]
    async fn test_create_failure_is_retryable_error() {
        let client = MockService::new()
            .on_post(PODS_PATH, 403, &forbidden_json("pods"))
            .into_client();

        let err = ensure_marker_workload(&client, "ns-a").await.unwrap_err();
        assert!(matches!(err, WatcherError::WorkloadError { .. }));
    }

    #[tokio::test]
    async fn test_lookup_failure_skips_create() {
        let mock = MockService::new()
            .on_get(POD_PATH, 403, &forbidden_json("pods"))
            .on_post(PODS_PATH, 201, &pod_json("ns-a"));
        let client = mock.clone().into_client();

        assert!(ensure_marker_workload(&client, "ns-a").await.is_err());
        assert!(mock.requests_matching("POST", PODS_PATH).is_empty());
    }
}
