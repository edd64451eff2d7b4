// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

pub mod notifier;
pub mod provider;
pub mod registry;

pub use notifier::{BroadcastNotifier, EventReceiver, NotifierError};
pub use provider::HttpRuntimeProvider;
pub use registry::InMemoryRuntimeRegistry;
