//! Generic bounded-retry polling.
//!
//! [`Poller`] repeatedly invokes an outcome-producing function and a
//! stop-condition function until the condition is met, the overall timeout
//! is reached, or a consecutive-error budget is exhausted. It is the only
//! component of this crate that suspends across multiple external
//! invocations; everything else is a single attempt.
//!
//! "Not yet available" is explicit: the outcome getter returns
//! `Ok(None)` when there is nothing to evaluate yet. With
//! `nullable_outcome(false)` (the default) such a tick counts against the
//! error budget exactly like a getter error; with `nullable_outcome(true)`
//! the condition itself gets to look at the absent outcome.
//!
//! The loop is single-threaded: one tick, then a fixed-interval sleep bound
//! to the cancellation token and the overall deadline.

use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tokio_util::sync::CancellationToken;

#[derive(Error, Debug)]
pub enum PollError {
    /// The consecutive-error budget was exhausted.
    #[error("max consecutive errors exceeded: count={count} max={max} err={last_error}")]
    BudgetExceeded {
        count: u32,
        max: u32,
        last_error: String,
    },

    /// The caller-supplied condition function failed; propagated unchanged.
    #[error("poll condition failed")]
    Condition(#[source] anyhow::Error),

    /// The overall deadline passed before the condition was met.
    #[error("poll timed out after {timeout:?} (interval={interval:?})")]
    Timeout { timeout: Duration, interval: Duration },

    /// The poll was cancelled from outside.
    #[error("poll cancelled")]
    Cancelled,
}

/// A fixed-interval poll loop with a bounded consecutive-error budget.
///
/// Created fresh per polling call; the last obtained outcome stays readable
/// after [`Poller::poll`] returns, success or failure, for diagnostics.
#[derive(Debug)]
pub struct Poller<Out> {
    interval: Duration,
    timeout: Duration,
    max_consecutive_errors: Option<u32>,
    outcome_nullable: bool,
    last_outcome: Option<Out>,
    consecutive_error_count: u32,
}

impl<Out> Poller<Out> {
    pub fn new(interval: Duration, timeout: Duration) -> Self {
        Self {
            interval,
            timeout,
            max_consecutive_errors: None,
            outcome_nullable: false,
            last_outcome: None,
            consecutive_error_count: 0,
        }
    }

    /// Bounds the number of back-to-back failed/empty ticks tolerated before
    /// giving up. Unset means unbounded: only the timeout stops the loop.
    ///
    /// The budget is exceeded when the count goes strictly above `max`, so
    /// `max = 2` tolerates exactly two consecutive failed ticks.
    pub fn with_max_consecutive_errors(mut self, max: u32) -> Self {
        self.max_consecutive_errors = Some(max);
        self
    }

    /// Allows `Ok(None)` outcomes to reach the condition function instead of
    /// counting against the error budget.
    pub fn with_nullable_outcome(mut self, nullable: bool) -> Self {
        self.outcome_nullable = nullable;
        self
    }

    /// The last outcome obtained from the getter, if any.
    pub fn last_outcome(&self) -> Option<&Out> {
        self.last_outcome.as_ref()
    }

    pub fn into_last_outcome(self) -> Option<Out> {
        self.last_outcome
    }

    /// Runs the loop until the condition stops it, the deadline passes, the
    /// error budget is exhausted, or `cancel` fires.
    ///
    /// Each tick calls `outcome_getter`; a getter error (or an absent
    /// outcome when outcomes are not nullable) is transient and counts
    /// against the budget. A usable outcome resets the counter and is handed
    /// to `condition`, whose error stops the loop immediately and whose
    /// `Ok(true)` ends it successfully.
    pub async fn poll<G, Fut, C>(
        &mut self,
        cancel: &CancellationToken,
        mut outcome_getter: G,
        mut condition: C,
    ) -> Result<(), PollError>
    where
        G: FnMut() -> Fut,
        Fut: Future<Output = anyhow::Result<Option<Out>>>,
        C: FnMut(Option<&Out>) -> anyhow::Result<bool>,
    {
        let deadline = tokio::time::Instant::now() + self.timeout;
        loop {
            let tick = tokio::select! {
                _ = cancel.cancelled() => return Err(PollError::Cancelled),
                tick = outcome_getter() => tick,
            };

            match tick {
                Err(err) => {
                    self.transient_tick(format!("{err:#}"))?;
                }
                Ok(None) if !self.outcome_nullable => {
                    self.transient_tick("no outcome available".to_string())?;
                }
                Ok(outcome) => {
                    self.consecutive_error_count = 0;
                    self.last_outcome = outcome;
                    let stop =
                        condition(self.last_outcome.as_ref()).map_err(PollError::Condition)?;
                    if stop {
                        return Ok(());
                    }
                }
            }

            tokio::select! {
                _ = cancel.cancelled() => return Err(PollError::Cancelled),
                _ = tokio::time::sleep_until(deadline) => {
                    return Err(PollError::Timeout {
                        timeout: self.timeout,
                        interval: self.interval,
                    });
                }
                _ = tokio::time::sleep(self.interval) => {}
            }
        }
    }

    fn transient_tick(&mut self, last_error: String) -> Result<(), PollError> {
        self.consecutive_error_count += 1;
        tracing::trace!(
            count = self.consecutive_error_count,
            err = %last_error,
            "poll tick failed"
        );
        match self.max_consecutive_errors {
            Some(max) if self.consecutive_error_count > max => Err(PollError::BudgetExceeded {
                count: self.consecutive_error_count,
                max,
                last_error,
            }),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn counting_getter(
        attempts: Arc<AtomicU32>,
        failing_first: u32,
    ) -> impl FnMut() -> std::future::Ready<anyhow::Result<Option<u32>>> {
        move || {
            let n = attempts.fetch_add(1, Ordering::SeqCst) + 1;
            std::future::ready(if n <= failing_first {
                Err(anyhow::anyhow!("transient failure {n}"))
            } else {
                Ok(Some(n))
            })
        }
    }

    #[tokio::test]
    async fn test_poll_succeeds_when_consecutive_errors_stay_within_budget() {
        let attempts = Arc::new(AtomicU32::new(0));
        let mut poller = Poller::new(Duration::from_millis(1), Duration::from_secs(10))
            .with_max_consecutive_errors(2);
        let res = poller
            .poll(
                &CancellationToken::new(),
                counting_getter(attempts, 2),
                |outcome| Ok(outcome.is_some()),
            )
            .await;
        assert!(res.is_ok(), "2 errors then success fits a budget of 2: {res:?}");
        assert_eq!(poller.last_outcome().copied(), Some(3));
    }

    #[tokio::test]
    async fn test_poll_fails_when_budget_is_exceeded() {
        let attempts = Arc::new(AtomicU32::new(0));
        let mut poller = Poller::new(Duration::from_millis(1), Duration::from_secs(10))
            .with_max_consecutive_errors(1);
        let res = poller
            .poll(
                &CancellationToken::new(),
                counting_getter(attempts, 2),
                |outcome| Ok(outcome.is_some()),
            )
            .await;
        match res {
            Err(PollError::BudgetExceeded { count, max, last_error }) => {
                assert_eq!(count, 2);
                assert_eq!(max, 1);
                assert!(last_error.contains("transient failure 2"));
            }
            other => panic!("expected budget error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_counter_resets_on_usable_outcome() {
        // err, ok(non-matching), err, err, ok(match): never more than 2 in a row.
        let attempts = Arc::new(AtomicU32::new(0));
        let mut poller = Poller::new(Duration::from_millis(1), Duration::from_secs(10))
            .with_max_consecutive_errors(2);
        let res = poller
            .poll(
                &CancellationToken::new(),
                move || {
                    let n = attempts.fetch_add(1, Ordering::SeqCst) + 1;
                    std::future::ready(match n {
                        1 | 3 | 4 => Err(anyhow::anyhow!("transient failure {n}")),
                        _ => Ok(Some(n)),
                    })
                },
                |outcome| Ok(outcome.copied() == Some(5)),
            )
            .await;
        assert!(res.is_ok(), "{res:?}");
        assert_eq!(poller.last_outcome().copied(), Some(5));
    }

    #[tokio::test]
    async fn test_absent_outcome_counts_as_error_when_not_nullable() {
        let mut poller = Poller::new(Duration::from_millis(1), Duration::from_secs(10))
            .with_max_consecutive_errors(1);
        let res = poller
            .poll(
                &CancellationToken::new(),
                || std::future::ready(Ok(None::<u32>)),
                |_| Ok(false),
            )
            .await;
        match res {
            Err(PollError::BudgetExceeded { count, last_error, .. }) => {
                assert_eq!(count, 2);
                assert!(last_error.contains("no outcome available"));
            }
            other => panic!("expected budget error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_absent_outcome_reaches_condition_when_nullable() {
        let mut poller = Poller::new(Duration::from_millis(1), Duration::from_secs(10))
            .with_max_consecutive_errors(1)
            .with_nullable_outcome(true);
        let res = poller
            .poll(
                &CancellationToken::new(),
                || std::future::ready(Ok(None::<u32>)),
                |outcome| Ok(outcome.is_none()),
            )
            .await;
        assert!(res.is_ok(), "{res:?}");
        assert!(poller.last_outcome().is_none());
    }

    #[tokio::test]
    async fn test_condition_error_propagates_immediately() {
        let mut poller: Poller<u32> =
            Poller::new(Duration::from_millis(1), Duration::from_secs(10));
        let res = poller
            .poll(
                &CancellationToken::new(),
                || std::future::ready(Ok(Some(1))),
                |_| Err(anyhow::anyhow!("condition exploded")),
            )
            .await;
        match res {
            Err(PollError::Condition(err)) => {
                assert!(err.to_string().contains("condition exploded"));
            }
            other => panic!("expected condition error, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_yields_timeout_error() {
        let mut poller: Poller<u32> =
            Poller::new(Duration::from_millis(10), Duration::from_millis(95));
        let res = poller
            .poll(
                &CancellationToken::new(),
                || std::future::ready(Ok(Some(1))),
                |_| Ok(false),
            )
            .await;
        assert!(matches!(res, Err(PollError::Timeout { .. })), "{res:?}");
        assert_eq!(poller.last_outcome().copied(), Some(1));
    }

    #[tokio::test]
    async fn test_cancellation_stops_the_loop() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let mut poller: Poller<u32> =
            Poller::new(Duration::from_millis(10), Duration::from_secs(10));
        let res = poller
            .poll(
                &cancel,
                || std::future::ready(Ok(Some(1))),
                |_| Ok(false),
            )
            .await;
        assert!(matches!(res, Err(PollError::Cancelled)), "{res:?}");
    }
}
