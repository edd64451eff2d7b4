// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Suspend/resume polling primitive.
//!
//! Every "wait until the remote operation settles" loop in the lifecycle
//! workflows goes through [`poll_until`]: a timer-driven loop with a fixed
//! interval and a first-class ceiling. The ceiling is configuration, not a
//! constant; breaching it yields [`LifecycleError::Timeout`].

use std::future::Future;
use std::time::Duration;
use tracing::trace;

use crate::domain::error::LifecycleError;

#[derive(Debug, Clone, Copy)]
pub struct PollSettings {
    pub interval: Duration,
    pub ceiling: Duration,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(2),
            ceiling: Duration::from_secs(300),
        }
    }
}

/// One observation of a pending remote operation.
#[derive(Debug)]
pub enum PollOutcome<T> {
    Pending,
    Settled(T),
}

/// Re-probe `probe` at `settings.interval` until it settles or the ceiling
/// is reached. Suspends on the tokio timer between probes; probe errors
/// abort the loop immediately.
pub async fn poll_until<T, F, Fut>(
    settings: &PollSettings,
    operation: &str,
    mut probe: F,
) -> Result<T, LifecycleError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<PollOutcome<T>, LifecycleError>>,
{
    let deadline = tokio::time::Instant::now() + settings.ceiling;

    loop {
        if let PollOutcome::Settled(value) = probe().await? {
            return Ok(value);
        }

        trace!(operation, "operation still pending");

        if tokio::time::Instant::now() + settings.interval > deadline {
            return Err(LifecycleError::Timeout {
                operation: operation.to_string(),
                ceiling: settings.ceiling,
            });
        }

        tokio::time::sleep(settings.interval).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn settings() -> PollSettings {
        PollSettings {
            interval: Duration::from_secs(1),
            ceiling: Duration::from_secs(10),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn settles_after_a_few_probes() {
        let attempts = Arc::new(AtomicU32::new(0));
        let probe_attempts = Arc::clone(&attempts);

        let value = poll_until(&settings(), "test operation", move || {
            let attempts = Arc::clone(&probe_attempts);
            async move {
                if attempts.fetch_add(1, Ordering::SeqCst) < 3 {
                    Ok(PollOutcome::Pending)
                } else {
                    Ok(PollOutcome::Settled(42))
                }
            }
        })
        .await
        .unwrap();

        assert_eq!(value, 42);
        assert_eq!(attempts.load(Ordering::SeqCst), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn ceiling_breach_times_out() {
        let result: Result<(), _> = poll_until(&settings(), "stuck operation", || async {
            Ok(PollOutcome::Pending)
        })
        .await;

        match result {
            Err(LifecycleError::Timeout { operation, ceiling }) => {
                assert_eq!(operation, "stuck operation");
                assert_eq!(ceiling, Duration::from_secs(10));
            }
            other => panic!("expected timeout, got {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn probe_error_aborts_immediately() {
        let result: Result<(), _> = poll_until(&settings(), "failing operation", || async {
            Err(LifecycleError::ProviderFailure("boom".to_string()))
        })
        .await;

        assert!(matches!(result, Err(LifecycleError::ProviderFailure(_))));
    }
}
