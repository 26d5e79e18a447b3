//! Sequential step pipelines for the bootstrap chain.
//!
//! Structure loading is an ordered, failure-sensitive sequence: step N+1
//! must never start before step N's future resolves. These drivers are the
//! only iteration primitive the bootstrap uses; there is no parallelism.
//!
//! The historical loader kept iterating after reporting the first error.
//! That behavior is preserved as [`ErrorMode::ReportAndContinue`] (the
//! default) rather than silently changed; `LOAD_ERROR_MODE=halt` switches
//! to fail-fast. Either way the error surfaced to the caller is the first
//! one encountered.

use std::future::Future;
use std::pin::Pin;

use thiserror::Error;
use tracing::error;

/// Boxed future used by step functions.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A named bootstrap step: borrows the shared state for the duration of
/// one step, releases it before the next.
pub type StepFn<S> = for<'a> fn(&'a mut S) -> BoxFuture<'a, anyhow::Result<()>>;

/// A per-key step, used to chain loads over a list of elements.
pub type KeyStepFn<S, K> = for<'a> fn(&'a mut S, &'a K) -> BoxFuture<'a, anyhow::Result<()>>;

/// What to do when a step fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorMode {
    /// Stop the sequence at the first failing step.
    Halt,
    /// Log the failure and keep driving the remaining steps; the first
    /// error is still the one returned.
    ReportAndContinue,
}

impl ErrorMode {
    /// Parse a mode from its configuration spelling.
    pub fn from_config(value: &str) -> Self {
        match value {
            "halt" => ErrorMode::Halt,
            _ => ErrorMode::ReportAndContinue,
        }
    }
}

/// A step failure, tagged with the step that produced it.
#[derive(Debug, Error)]
#[error("step '{step}' failed")]
pub struct SequenceError {
    pub step: String,
    #[source]
    pub source: anyhow::Error,
}

/// Drive `step` once per key, strictly in order.
///
/// Each invocation gets the shared state and the current key; the next key
/// is not touched until the previous future resolves.
pub async fn each<S, K>(
    state: &mut S,
    keys: &[K],
    step: KeyStepFn<S, K>,
    mode: ErrorMode,
) -> Result<(), SequenceError>
where
    K: std::fmt::Display,
{
    let mut first_error: Option<SequenceError> = None;

    for key in keys {
        match step(state, key).await {
            Ok(()) => {}
            Err(e) => {
                error!(key = %key, error = %e, "sequence step failed");
                let failure = SequenceError {
                    step: key.to_string(),
                    source: e,
                };
                if mode == ErrorMode::Halt {
                    return Err(failure);
                }
                first_error.get_or_insert(failure);
            }
        }
    }

    match first_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

/// Drive a fixed list of named steps, strictly in order.
///
/// The step list is the pipeline: `(name, fn)` pairs sharing one piece of
/// state, each step awaited to completion before the next begins.
pub async fn do_list<S>(
    state: &mut S,
    steps: &[(&'static str, StepFn<S>)],
    mode: ErrorMode,
) -> Result<(), SequenceError> {
    let mut first_error: Option<SequenceError> = None;

    for (name, step) in steps {
        match step(state).await {
            Ok(()) => {}
            Err(e) => {
                error!(step = name, error = %e, "sequence step failed");
                let failure = SequenceError {
                    step: (*name).to_string(),
                    source: e,
                };
                if mode == ErrorMode::Halt {
                    return Err(failure);
                }
                first_error.get_or_insert(failure);
            }
        }
    }

    match first_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    struct Tally {
        calls: Vec<String>,
        sum: i64,
    }

    fn add_step<'a>(tally: &'a mut Tally, key: &'a i64) -> BoxFuture<'a, anyhow::Result<()>> {
        Box::pin(async move {
            tally.calls.push(key.to_string());
            tally.sum += *key;
            Ok(())
        })
    }

    fn fail_on_three<'a>(tally: &'a mut Tally, key: &'a i64) -> BoxFuture<'a, anyhow::Result<()>> {
        Box::pin(async move {
            tally.calls.push(key.to_string());
            if *key == 3 {
                anyhow::bail!("three is right out");
            }
            tally.sum += *key;
            Ok(())
        })
    }

    #[tokio::test]
    async fn each_visits_every_key_in_order() {
        let mut tally = Tally {
            calls: Vec::new(),
            sum: 0,
        };
        let keys = [1_i64, 2, 3, 4, 5];

        each(&mut tally, &keys, add_step, ErrorMode::Halt)
            .await
            .unwrap();

        assert_eq!(tally.sum, 15);
        assert_eq!(tally.calls, vec!["1", "2", "3", "4", "5"]);
    }

    #[tokio::test]
    async fn each_halt_stops_at_first_failure() {
        let mut tally = Tally {
            calls: Vec::new(),
            sum: 0,
        };
        let keys = [1_i64, 2, 3, 4, 5];

        let err = each(&mut tally, &keys, fail_on_three, ErrorMode::Halt)
            .await
            .unwrap_err();

        assert_eq!(err.step, "3");
        assert_eq!(tally.calls, vec!["1", "2", "3"]);
        assert_eq!(tally.sum, 3);
    }

    #[tokio::test]
    async fn each_report_and_continue_visits_all_and_returns_first_error() {
        let mut tally = Tally {
            calls: Vec::new(),
            sum: 0,
        };
        let keys = [1_i64, 3, 5];

        let err = each(&mut tally, &keys, fail_on_three, ErrorMode::ReportAndContinue)
            .await
            .unwrap_err();

        assert_eq!(err.step, "3");
        // Later elements still ran after the failure was reported.
        assert_eq!(tally.calls, vec!["1", "3", "5"]);
        assert_eq!(tally.sum, 6);
    }

    fn step_a<'a>(tally: &'a mut Tally) -> BoxFuture<'a, anyhow::Result<()>> {
        Box::pin(async move {
            tally.calls.push("a".into());
            Ok(())
        })
    }

    fn step_b_fails<'a>(tally: &'a mut Tally) -> BoxFuture<'a, anyhow::Result<()>> {
        Box::pin(async move {
            tally.calls.push("b".into());
            anyhow::bail!("b broke")
        })
    }

    fn step_c<'a>(tally: &'a mut Tally) -> BoxFuture<'a, anyhow::Result<()>> {
        Box::pin(async move {
            tally.calls.push("c".into());
            Ok(())
        })
    }

    #[tokio::test]
    async fn do_list_runs_steps_in_declared_order() {
        let mut tally = Tally {
            calls: Vec::new(),
            sum: 0,
        };
        let steps: &[(&'static str, StepFn<Tally>)] =
            &[("a", step_a), ("c", step_c), ("a2", step_a)];

        do_list(&mut tally, steps, ErrorMode::Halt).await.unwrap();

        assert_eq!(tally.calls, vec!["a", "c", "a"]);
    }

    #[tokio::test]
    async fn do_list_halt_skips_later_steps() {
        let mut tally = Tally {
            calls: Vec::new(),
            sum: 0,
        };
        let steps: &[(&'static str, StepFn<Tally>)] =
            &[("a", step_a), ("b", step_b_fails), ("c", step_c)];

        let err = do_list(&mut tally, steps, ErrorMode::Halt)
            .await
            .unwrap_err();

        assert_eq!(err.step, "b");
        assert_eq!(tally.calls, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn do_list_report_and_continue_runs_later_steps() {
        let mut tally = Tally {
            calls: Vec::new(),
            sum: 0,
        };
        let steps: &[(&'static str, StepFn<Tally>)] =
            &[("b", step_b_fails), ("c", step_c)];

        let err = do_list(&mut tally, steps, ErrorMode::ReportAndContinue)
            .await
            .unwrap_err();

        assert_eq!(err.step, "b");
        assert_eq!(tally.calls, vec!["b", "c"]);
    }

    #[test]
    fn error_mode_from_config() {
        assert_eq!(ErrorMode::from_config("halt"), ErrorMode::Halt);
        assert_eq!(
            ErrorMode::from_config("continue"),
            ErrorMode::ReportAndContinue
        );
        assert_eq!(ErrorMode::from_config(""), ErrorMode::ReportAndContinue);
    }
}
