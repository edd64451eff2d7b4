// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # corral-core
//!
//! Lifecycle orchestration for deployed agent runtimes: create/update with
//! content-addressed versioning, qualifier tagging, and ordered deletion of
//! endpoints, runtimes and memory, with progress notifications on every
//! outcome.
//!
//! # Architecture
//!
//! - **`domain`** — records, contracts (`RuntimeRegistry`, `RuntimeProvider`,
//!   `UpdateNotifier`), events and errors
//! - **`application`** — the lifecycle workflows and the polling primitive
//! - **`infrastructure`** — in-memory registry, broadcast notifier, HTTP
//!   provider adapter
//! - **`presentation`** — HTTP/SSE surface (Axum)

pub mod domain;
pub mod application;
pub mod infrastructure;
pub mod presentation;

pub use domain::*;
