// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

pub mod lifecycle;
pub mod poll;

pub use lifecycle::{CreatedVersion, LifecycleSettings, RuntimeLifecycleService};
pub use poll::{poll_until, PollOutcome, PollSettings};
