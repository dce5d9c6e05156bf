// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Level-triggered namespace reconciliation.

pub mod filter;
pub mod namespace;

pub use filter::TransitionFilter;
pub use namespace::NamespaceReconciler;
