//! Polling combinator driven end-to-end: against the filesystem and against
//! real subprocess executions.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use saya_client::SayaCmd;
use saya_client::poll::{PollError, Poller};

/// Test: a poll converges once the awaited state appears, with the absent
/// outcome counting against (but not exhausting) the error budget.
#[tokio::test]
async fn test_poll_converges_when_state_appears() {
    let dir = tempfile::tempdir().unwrap();
    let marker = dir.path().join("state");

    let writer = {
        let marker = marker.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            tokio::fs::write(&marker, "ready").await.unwrap();
        })
    };

    let mut poller: Poller<String> =
        Poller::new(Duration::from_millis(10), Duration::from_secs(5))
            .with_max_consecutive_errors(100);
    let res = poller
        .poll(
            &CancellationToken::new(),
            move || {
                let marker = marker.clone();
                async move {
                    match tokio::fs::read_to_string(&marker).await {
                        Ok(content) => Ok(Some(content)),
                        Err(_) => Ok(None),
                    }
                }
            },
            |outcome| Ok(outcome.map(|content| content == "ready").unwrap_or(false)),
        )
        .await;

    writer.await.unwrap();
    assert!(res.is_ok(), "{res:?}");
    assert_eq!(poller.last_outcome().map(String::as_str), Some("ready"));
}

/// Test: repeated execution failures exhaust the budget; the budget error
/// carries the counts and the underlying diagnostic.
#[tokio::test]
async fn test_failing_executions_exhaust_the_budget() {
    let token = CancellationToken::new();
    let mut poller = Poller::new(Duration::from_millis(5), Duration::from_secs(5))
        .with_max_consecutive_errors(1);

    let getter_token = token.clone();
    let res = poller
        .poll(
            &token,
            move || {
                let token = getter_token.clone();
                async move {
                    let mut cmd = SayaCmd::new("sh")?;
                    cmd.args.append("-c", "echo nope 1>&2; exit 7");
                    let outcome = cmd.exec(&token).await?;
                    Ok(Some(outcome))
                }
            },
            |_| Ok(false),
        )
        .await;

    match res {
        Err(PollError::BudgetExceeded { count, max, last_error }) => {
            assert_eq!(count, 2);
            assert_eq!(max, 1);
            assert!(last_error.contains("exit-code=7"), "{last_error}");
        }
        other => panic!("expected budget error, got {other:?}"),
    }
}
