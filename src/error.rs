// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WatcherError {
    #[error("Kubernetes API error: {0}")]
    KubeError(#[from] kube::Error),

    #[error("Failed to update finalizer on namespace {namespace}: {source}")]
    FinalizerError {
        namespace: String,
        #[source]
        source: kube::Error,
    },

    #[error("Failed to provision marker workload in namespace {namespace}: {source}")]
    WorkloadError {
        namespace: String,
        #[source]
        source: kube::Error,
    },

    #[error("Namespace watch failed: {0}")]
    WatchError(String),

    #[error("Namespace watch stream closed")]
    StreamClosed,

    #[error("Timed out after {0}s waiting for namespace cache to sync")]
    CacheSyncTimeout(u64),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("Health server error: {0}")]
    HealthServerError(#[from] std::io::Error),
}

impl WatcherError {
    /// The API rejected a write because the object changed underneath us
    pub fn is_conflict(&self) -> bool {
        self.api_code() == Some(409)
    }

    pub fn is_not_found(&self) -> bool {
        self.api_code() == Some(404)
    }

    fn api_code(&self) -> Option<u16> {
        match self {
            WatcherError::KubeError(kube::Error::Api(err))
            | WatcherError::FinalizerError {
                source: kube::Error::Api(err),
                ..
            }
            | WatcherError::WorkloadError {
                source: kube::Error::Api(err),
                ..
            } => Some(err.code),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, WatcherError>;

#[cfg(test)]
mod tests {
    use super::*;
    use kube::core::ErrorResponse;

    fn api_error(code: u16, reason: &str) -> kube::Error {
        kube::Error::Api(ErrorResponse {
            status: "Failure".to_string(),
            message: reason.to_string(),
            reason: reason.to_string(),
            code,
        })
    }

    #[test]
    fn test_conflict_on_finalizer_update() {
        let err = WatcherError::FinalizerError {
            namespace: "ns-a".to_string(),
            source: api_error(409, "Conflict"),
        };
        assert!(err.is_conflict());
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_not_found_on_plain_api_error() {
        let err = WatcherError::from(api_error(404, "NotFound"));
        assert!(err.is_not_found());
        assert!(!err.is_conflict());
    }

    #[test]
    fn test_stream_closed_has_no_api_code() {
        assert!(!WatcherError::StreamClosed.is_conflict());
        assert!(!WatcherError::StreamClosed.is_not_found());
    }

    #[test]
    fn test_error_message_names_namespace() {
        let err = WatcherError::WorkloadError {
            namespace: "ns-b".to_string(),
            source: api_error(403, "Forbidden"),
        };
        assert!(err.to_string().contains("ns-b"));
    }
}
