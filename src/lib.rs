// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
pub mod config;
pub mod constants;
pub mod coordination;
pub mod eligibility;
pub mod error;
pub mod health;
pub mod kubernetes;
pub mod reconcilers;
pub mod shutdown;
pub mod sources;
pub mod types;
pub mod watch;

#[cfg(test)]
pub mod test_utils;
