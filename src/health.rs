// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Liveness and readiness endpoints

use crate::constants::probes::{LIVENESS_PATH, READINESS_PATH};
use crate::error::Result;
use crate::shutdown::ShutdownSignal;
use bytes::Bytes;
use http::{Method, Request, Response, StatusCode};
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{debug, info};

/// Shared readiness flag, `false` until an event source is live
#[derive(Clone, Debug, Default)]
pub struct Readiness(Arc<AtomicBool>);

impl Readiness {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_ready(&self, ready: bool) {
        self.0.store(ready, Ordering::SeqCst);
    }

    pub fn is_ready(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

pub struct HealthServer {
    port: u16,
    readiness: Readiness,
}

impl HealthServer {
    pub fn new(port: u16, readiness: Readiness) -> Self {
        Self { port, readiness }
    }

    /// Serve probes until shutdown; bind failures are returned to the caller
    pub async fn run(self, shutdown: ShutdownSignal) -> Result<()> {
        let addr = SocketAddr::from(([0, 0, 0, 0], self.port));
        let listener = TcpListener::bind(addr).await?;
        info!("Health server listening on {}", addr);

        loop {
            let (stream, peer) = tokio::select! {
                accepted = listener.accept() => accepted?,
                _ = shutdown.wait() => {
                    info!("Health server shutting down");
                    return Ok(());
                }
            };

            let readiness = self.readiness.clone();
            tokio::spawn(async move {
                let service = service_fn(move |req: Request<Incoming>| {
                    let response = respond(req.method(), req.uri().path(), &readiness);
                    async move { Ok::<_, Infallible>(response) }
                });

                if let Err(e) = http1::Builder::new()
                    .serve_connection(TokioIo::new(stream), service)
                    .await
                {
                    debug!("Health probe connection from {} failed: {}", peer, e);
                }
            });
        }
    }
}

/// Route a probe request
pub fn respond(method: &Method, path: &str, readiness: &Readiness) -> Response<Full<Bytes>> {
    let (status, body) = match (method, path) {
        (&Method::GET, LIVENESS_PATH) => (StatusCode::OK, "OK"),
        (&Method::GET, READINESS_PATH) if readiness.is_ready() => (StatusCode::OK, "OK"),
        (&Method::GET, READINESS_PATH) => (StatusCode::SERVICE_UNAVAILABLE, "Service Unavailable"),
        _ => (StatusCode::NOT_FOUND, "Not Found"),
    };

    let mut response = Response::new(Full::new(Bytes::from_static(body.as_bytes())));
    *response.status_mut() = status;
    response
}
