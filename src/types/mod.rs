// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Typed views over registry events.

pub mod event;

pub use event::NamespaceEvent;
