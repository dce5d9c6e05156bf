// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Namespace watches without finalizer coordination: the raw stream with its restart
//! policy, and the cached informer.

pub mod backoff;
pub mod informer;
pub mod stream;

pub use backoff::RestartBackoff;
pub use informer::NamespaceInformer;
pub use stream::NamespaceWatcher;
