//! Condition polling.
//!
//! [`ConditionPoller`] is the engine behind every "wait for X" helper in the
//! crate: it evaluates a predicate against a target at a fixed interval until
//! the predicate is satisfied, the deadline passes, or a non-ignorable error
//! is returned.
//!
//! The poller itself never logs and never turns errors into assertions. The
//! caller picks the convention per call site: [`ConditionPoller::poll_until`]
//! treats a timeout as an error, [`ConditionPoller::poll_until_or_else`] hands
//! it to a fallback.
//!
//! ```
//! use sauceprobe::{ConditionPoller, PollOutcome, WaitSpec};
//! use std::time::Duration;
//!
//! let spec = WaitSpec::new(Duration::from_millis(500))
//!     .with_poll_interval(Duration::from_millis(10))
//!     .describe("counter to reach 3");
//! let mut count = 0;
//! let value = ConditionPoller::new()
//!     .poll_until(&(), &spec, |_| {
//!         count += 1;
//!         if count == 3 { PollOutcome::Satisfied(count) } else { PollOutcome::pending() }
//!     })
//!     .unwrap();
//! assert_eq!(value, 3);
//! ```

use crate::clock::{Clock, SystemClock};
use crate::result::{ErrorKind, ProbeError, ProbeResult};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

// =============================================================================
// CONSTANTS
// =============================================================================

/// Default timeout for wait operations (30 seconds)
pub const DEFAULT_WAIT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default polling interval (500ms)
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

// =============================================================================
// WAIT SPEC
// =============================================================================

/// Configuration for a single wait call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaitSpec {
    /// Total time budget
    pub timeout: Duration,
    /// Fixed delay between evaluations
    pub poll_interval: Duration,
    /// Failure kinds treated as "not yet"
    pub ignored_failure_kinds: HashSet<ErrorKind>,
    /// What is being waited for, used in timeout messages
    pub description: String,
}

impl Default for WaitSpec {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_WAIT_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
            ignored_failure_kinds: HashSet::new(),
            description: "condition".to_string(),
        }
    }
}

impl WaitSpec {
    /// Create a wait spec with the given timeout and default polling
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            ..Self::default()
        }
    }

    /// Set the timeout
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the polling interval
    #[must_use]
    pub const fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Treat failures of `kind` as pending
    #[must_use]
    pub fn ignoring(mut self, kind: ErrorKind) -> Self {
        let _ = self.ignored_failure_kinds.insert(kind);
        self
    }

    /// Treat failures of every kind in `kinds` as pending
    #[must_use]
    pub fn ignoring_all(mut self, kinds: impl IntoIterator<Item = ErrorKind>) -> Self {
        self.ignored_failure_kinds.extend(kinds);
        self
    }

    /// Describe the awaited condition
    #[must_use]
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Whether failures of `kind` are retried
    #[must_use]
    pub fn is_ignored(&self, kind: ErrorKind) -> bool {
        self.ignored_failure_kinds.contains(&kind)
    }

    /// Check the spec can be polled
    pub fn validate(&self) -> ProbeResult<()> {
        if self.poll_interval.is_zero() {
            return Err(ProbeError::invalid_argument(format!(
                "poll interval must be greater than zero (waiting for {})",
                self.description
            )));
        }
        Ok(())
    }
}

// =============================================================================
// POLL OUTCOME
// =============================================================================

/// Result of one predicate evaluation
#[derive(Debug)]
pub enum PollOutcome<R> {
    /// Not there yet, optionally with a note on what was observed
    Pending(Option<String>),
    /// Condition met
    Satisfied(R),
    /// Evaluation failed
    Failed(ProbeError),
}

impl<R> PollOutcome<R> {
    /// Pending without a note
    #[must_use]
    pub const fn pending() -> Self {
        Self::Pending(None)
    }

    /// Pending with a note that ends up in the timeout message
    #[must_use]
    pub fn pending_because(observation: impl Into<String>) -> Self {
        Self::Pending(Some(observation.into()))
    }

    /// Satisfied when `value` is `Some`
    #[must_use]
    pub fn from_option(value: Option<R>) -> Self {
        value.map_or(Self::Pending(None), Self::Satisfied)
    }

    /// Lift a fallible optional lookup into an outcome
    #[must_use]
    pub fn from_result(value: ProbeResult<Option<R>>) -> Self {
        match value {
            Ok(Some(v)) => Self::Satisfied(v),
            Ok(None) => Self::Pending(None),
            Err(e) => Self::Failed(e),
        }
    }

    /// Fold a probe that may fail before reaching a verdict
    #[must_use]
    pub fn from_attempt(attempt: ProbeResult<Self>) -> Self {
        attempt.unwrap_or_else(Self::Failed)
    }

    /// Map the satisfied value
    #[must_use]
    pub fn map<U>(self, f: impl FnOnce(R) -> U) -> PollOutcome<U> {
        match self {
            Self::Pending(note) => PollOutcome::Pending(note),
            Self::Satisfied(value) => PollOutcome::Satisfied(f(value)),
            Self::Failed(err) => PollOutcome::Failed(err),
        }
    }

    /// Check if the outcome is satisfied
    #[must_use]
    pub const fn is_satisfied(&self) -> bool {
        matches!(self, Self::Satisfied(_))
    }
}

impl PollOutcome<()> {
    /// Satisfied when `met` is true
    #[must_use]
    pub const fn from_bool(met: bool) -> Self {
        if met {
            Self::Satisfied(())
        } else {
            Self::Pending(None)
        }
    }

    /// Lift a fallible boolean check into an outcome
    #[must_use]
    pub fn from_check(check: ProbeResult<bool>) -> Self {
        match check {
            Ok(true) => Self::Satisfied(()),
            Ok(false) => Self::Pending(None),
            Err(e) => Self::Failed(e),
        }
    }
}

// =============================================================================
// CANCELLATION
// =============================================================================

/// Shared flag an outer orchestrator can raise to abort waits in progress
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    /// Create an unset token
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Abort every wait holding this token
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Check whether the token has been raised
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

// =============================================================================
// TIMEOUT REPORT
// =============================================================================

/// What the poller saw when the deadline passed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeoutReport {
    /// Description of the awaited condition
    pub condition: String,
    /// Configured timeout
    pub timeout: Duration,
    /// Time actually spent
    pub elapsed: Duration,
    /// Number of evaluations
    pub attempts: usize,
    /// Last note or ignored error message
    pub last_observation: Option<String>,
}

impl TimeoutReport {
    /// Convert into the timeout error
    #[must_use]
    pub fn into_error(self) -> ProbeError {
        ProbeError::Timeout {
            condition: self.condition,
            timeout: self.timeout,
            elapsed: self.elapsed,
            attempts: self.attempts,
            last_observation: self.last_observation,
        }
    }
}

enum Completion<R> {
    Satisfied(R),
    TimedOut(TimeoutReport),
}

// =============================================================================
// CONDITION POLLER
// =============================================================================

/// Fixed-interval retry-until-satisfied evaluator
#[derive(Debug, Clone, Default)]
pub struct ConditionPoller<C = SystemClock> {
    clock: C,
    cancel: Option<CancelToken>,
}

impl ConditionPoller<SystemClock> {
    /// Create a poller on real time
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(SystemClock::new())
    }
}

impl<C: Clock> ConditionPoller<C> {
    /// Create a poller on the given clock
    #[must_use]
    pub const fn with_clock(clock: C) -> Self {
        Self {
            clock,
            cancel: None,
        }
    }

    /// Abort waits when `token` is raised
    #[must_use]
    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// The clock this poller reads
    #[must_use]
    pub const fn clock(&self) -> &C {
        &self.clock
    }

    /// Poll `predicate` against `target` until it is satisfied.
    ///
    /// The first evaluation happens immediately. Failures whose kind is listed
    /// in `spec.ignored_failure_kinds` count as pending; any other failure is
    /// returned at once without further evaluations.
    ///
    /// # Errors
    ///
    /// [`ProbeError::Timeout`] when the deadline passes, [`ProbeError::Cancelled`]
    /// when the cancel token is raised, [`ProbeError::InvalidArgument`] for a
    /// zero poll interval, or the predicate's own non-ignorable error.
    pub fn poll_until<T, R, F>(&self, target: &T, spec: &WaitSpec, predicate: F) -> ProbeResult<R>
    where
        T: ?Sized,
        F: FnMut(&T) -> PollOutcome<R>,
    {
        match self.run(target, spec, predicate)? {
            Completion::Satisfied(value) => Ok(value),
            Completion::TimedOut(report) => Err(report.into_error()),
        }
    }

    /// Same as [`poll_until`](Self::poll_until), but a timeout is handed to
    /// `on_timeout` instead of being raised.
    ///
    /// # Errors
    ///
    /// Everything `poll_until` returns except [`ProbeError::Timeout`], plus
    /// whatever `on_timeout` returns.
    pub fn poll_until_or_else<T, R, F, E>(
        &self,
        target: &T,
        spec: &WaitSpec,
        predicate: F,
        on_timeout: E,
    ) -> ProbeResult<R>
    where
        T: ?Sized,
        F: FnMut(&T) -> PollOutcome<R>,
        E: FnOnce(&TimeoutReport) -> ProbeResult<R>,
    {
        match self.run(target, spec, predicate)? {
            Completion::Satisfied(value) => Ok(value),
            Completion::TimedOut(report) => on_timeout(&report),
        }
    }

    fn run<T, R, F>(&self, target: &T, spec: &WaitSpec, mut predicate: F) -> ProbeResult<Completion<R>>
    where
        T: ?Sized,
        F: FnMut(&T) -> PollOutcome<R>,
    {
        spec.validate()?;

        let start = self.clock.now();
        let mut attempts = 0;
        let mut last_observation: Option<String> = None;

        loop {
            self.check_cancelled(spec, start)?;
            attempts += 1;

            match predicate(target) {
                PollOutcome::Satisfied(value) => return Ok(Completion::Satisfied(value)),
                PollOutcome::Pending(note) => {
                    if note.is_some() {
                        last_observation = note;
                    }
                }
                PollOutcome::Failed(err) => {
                    if !spec.is_ignored(err.kind()) {
                        return Err(err);
                    }
                    last_observation = Some(err.to_string());
                }
            }

            let elapsed = self.clock.now().saturating_sub(start);
            if elapsed >= spec.timeout {
                return Ok(Completion::TimedOut(TimeoutReport {
                    condition: spec.description.clone(),
                    timeout: spec.timeout,
                    elapsed,
                    attempts,
                    last_observation,
                }));
            }

            self.check_cancelled(spec, start)?;
            self.clock.sleep(spec.poll_interval);
        }
    }

    fn check_cancelled(&self, spec: &WaitSpec, start: Duration) -> ProbeResult<()> {
        match &self.cancel {
            Some(token) if token.is_cancelled() => Err(ProbeError::Cancelled {
                condition: spec.description.clone(),
                elapsed: self.clock.now().saturating_sub(start),
            }),
            _ => Ok(()),
        }
    }
}

// =============================================================================
// CONVENIENCE FUNCTIONS
// =============================================================================

/// Wait on real time for a boolean condition
pub fn wait_until<F>(condition: F, timeout: Duration) -> ProbeResult<()>
where
    F: FnMut() -> bool,
{
    let mut condition = condition;
    let spec = WaitSpec::new(timeout).describe("custom condition");
    ConditionPoller::new().poll_until(&(), &spec, |()| PollOutcome::from_bool(condition()))
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use std::cell::Cell;
    use std::time::Instant;

    fn manual() -> (ConditionPoller<ManualClock>, ManualClock) {
        let clock = ManualClock::new();
        (ConditionPoller::with_clock(clock.clone()), clock)
    }

    mod wait_spec_tests {
        use super::*;

        #[test]
        fn test_defaults() {
            let spec = WaitSpec::default();
            assert_eq!(spec.timeout, DEFAULT_WAIT_TIMEOUT);
            assert_eq!(spec.poll_interval, DEFAULT_POLL_INTERVAL);
            assert!(spec.ignored_failure_kinds.is_empty());
        }

        #[test]
        fn test_builder_chain() {
            let spec = WaitSpec::new(Duration::from_secs(5))
                .with_poll_interval(Duration::from_millis(100))
                .ignoring(ErrorKind::StaleElement)
                .ignoring_all([ErrorKind::NoSuchElement])
                .describe("cart badge");
            assert_eq!(spec.timeout, Duration::from_secs(5));
            assert_eq!(spec.poll_interval, Duration::from_millis(100));
            assert!(spec.is_ignored(ErrorKind::StaleElement));
            assert!(spec.is_ignored(ErrorKind::NoSuchElement));
            assert!(!spec.is_ignored(ErrorKind::InvalidSelector));
            assert_eq!(spec.description, "cart badge");
        }

        #[test]
        fn test_zero_interval_rejected() {
            let spec = WaitSpec::default().with_poll_interval(Duration::ZERO);
            assert_eq!(spec.validate().unwrap_err().kind(), ErrorKind::InvalidArgument);
        }
    }

    mod outcome_tests {
        use super::*;

        #[test]
        fn test_from_bool() {
            assert!(PollOutcome::from_bool(true).is_satisfied());
            assert!(!PollOutcome::from_bool(false).is_satisfied());
        }

        #[test]
        fn test_from_option() {
            assert!(PollOutcome::from_option(Some(1)).is_satisfied());
            assert!(matches!(PollOutcome::<i32>::from_option(None), PollOutcome::Pending(None)));
        }

        #[test]
        fn test_from_attempt_and_map() {
            let failed = PollOutcome::<i32>::from_attempt(Err(ProbeError::NoAlert));
            assert!(matches!(failed, PollOutcome::Failed(ProbeError::NoAlert)));
            let mapped = PollOutcome::from_attempt(Ok(PollOutcome::Satisfied(2))).map(|v| v * 2);
            assert!(matches!(mapped, PollOutcome::Satisfied(4)));
        }

        #[test]
        fn test_from_result_error() {
            let outcome = PollOutcome::<i32>::from_result(Err(ProbeError::stale("gone")));
            assert!(matches!(outcome, PollOutcome::Failed(_)));
        }
    }

    mod poller_tests {
        use super::*;

        #[test]
        fn test_satisfied_on_first_evaluation_does_not_sleep() {
            let (poller, clock) = manual();
            let spec = WaitSpec::new(Duration::from_secs(1));
            let value = poller
                .poll_until(&7, &spec, |t| PollOutcome::Satisfied(*t * 6))
                .unwrap();
            assert_eq!(value, 42);
            assert_eq!(clock.sleep_count(), 0);
        }

        #[test]
        fn test_nth_evaluation_exact_counts() {
            let (poller, clock) = manual();
            let spec = WaitSpec::new(Duration::from_secs(5))
                .with_poll_interval(Duration::from_millis(100));
            let calls = Cell::new(0);
            let value = poller
                .poll_until(&(), &spec, |()| {
                    calls.set(calls.get() + 1);
                    if calls.get() == 3 {
                        PollOutcome::Satisfied(42)
                    } else {
                        PollOutcome::pending()
                    }
                })
                .unwrap();
            assert_eq!(value, 42);
            assert_eq!(calls.get(), 3);
            assert_eq!(clock.sleep_count(), 2);
            assert_eq!(clock.now(), Duration::from_millis(200));
        }

        #[test]
        fn test_never_satisfied_times_out_within_one_interval() {
            let (poller, clock) = manual();
            let spec = WaitSpec::new(Duration::from_secs(1))
                .with_poll_interval(Duration::from_millis(200))
                .describe("spinner to disappear");
            let calls = Cell::new(0);
            let err = poller
                .poll_until(&(), &spec, |()| {
                    calls.set(calls.get() + 1);
                    PollOutcome::<()>::pending()
                })
                .unwrap_err();
            match err {
                ProbeError::Timeout {
                    condition,
                    timeout,
                    elapsed,
                    attempts,
                    ..
                } => {
                    assert_eq!(condition, "spinner to disappear");
                    assert_eq!(timeout, Duration::from_secs(1));
                    assert!(elapsed >= timeout);
                    assert!(elapsed <= timeout + Duration::from_millis(200));
                    assert_eq!(attempts, calls.get());
                }
                other => panic!("expected timeout, got {other:?}"),
            }
            assert!((5..=6).contains(&calls.get()));
            assert_eq!(clock.sleep_count() as usize, calls.get() - 1);
        }

        #[test]
        fn test_slow_predicate_overruns_by_at_most_one_interval_and_evaluation() {
            let (poller, clock) = manual();
            let interval = Duration::from_millis(200);
            let evaluation = Duration::from_millis(150);
            let spec = WaitSpec::new(Duration::from_secs(1)).with_poll_interval(interval);
            let err = poller
                .poll_until(&(), &spec, |()| {
                    clock.advance(evaluation);
                    PollOutcome::<()>::pending()
                })
                .unwrap_err();
            match err {
                ProbeError::Timeout {
                    timeout,
                    elapsed,
                    attempts,
                    ..
                } => {
                    assert!(elapsed >= timeout);
                    assert!(elapsed <= timeout + interval + evaluation, "{elapsed:?}");
                    assert_eq!(elapsed, Duration::from_millis(1200));
                    assert_eq!(attempts, 4);
                }
                other => panic!("expected timeout, got {other:?}"),
            }
            assert_eq!(clock.sleep_count(), 3);
        }

        #[test]
        fn test_zero_timeout_evaluates_once() {
            let (poller, clock) = manual();
            let spec = WaitSpec::new(Duration::ZERO);
            let calls = Cell::new(0);
            let err = poller
                .poll_until(&(), &spec, |()| {
                    calls.set(calls.get() + 1);
                    PollOutcome::<()>::pending()
                })
                .unwrap_err();
            assert!(err.is_timeout());
            assert_eq!(calls.get(), 1);
            assert_eq!(clock.sleep_count(), 0);
        }

        #[test]
        fn test_ignored_failure_keeps_polling() {
            let (poller, _clock) = manual();
            let spec = WaitSpec::new(Duration::from_secs(2))
                .with_poll_interval(Duration::from_millis(100))
                .ignoring(ErrorKind::StaleElement);
            let calls = Cell::new(0);
            let value = poller
                .poll_until(&(), &spec, |()| {
                    calls.set(calls.get() + 1);
                    if calls.get() < 4 {
                        PollOutcome::Failed(ProbeError::stale("detached"))
                    } else {
                        PollOutcome::Satisfied("ok")
                    }
                })
                .unwrap();
            assert_eq!(value, "ok");
            assert_eq!(calls.get(), 4);
        }

        #[test]
        fn test_ignored_failure_becomes_last_observation() {
            let (poller, _clock) = manual();
            let spec = WaitSpec::new(Duration::from_millis(300))
                .with_poll_interval(Duration::from_millis(100))
                .ignoring(ErrorKind::NoSuchElement);
            let err = poller
                .poll_until(&(), &spec, |()| {
                    PollOutcome::<()>::Failed(ProbeError::no_such_element("#cart"))
                })
                .unwrap_err();
            match err {
                ProbeError::Timeout {
                    last_observation, ..
                } => assert!(last_observation.unwrap().contains("#cart")),
                other => panic!("expected timeout, got {other:?}"),
            }
        }

        #[test]
        fn test_fatal_failure_propagates_immediately() {
            let (poller, clock) = manual();
            let spec = WaitSpec::new(Duration::from_secs(5)).ignoring(ErrorKind::StaleElement);
            let calls = Cell::new(0);
            let err = poller
                .poll_until(&(), &spec, |()| {
                    calls.set(calls.get() + 1);
                    PollOutcome::<()>::Failed(ProbeError::InvalidSelector {
                        selector: "div[".into(),
                        message: "unterminated".into(),
                    })
                })
                .unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidSelector);
            assert_eq!(calls.get(), 1);
            assert_eq!(clock.sleep_count(), 0);
        }

        #[test]
        fn test_pending_note_reported() {
            let (poller, _clock) = manual();
            let spec = WaitSpec::new(Duration::from_millis(100))
                .with_poll_interval(Duration::from_millis(50));
            let err = poller
                .poll_until(&(), &spec, |()| {
                    PollOutcome::<()>::pending_because("readyState=interactive")
                })
                .unwrap_err();
            assert!(err.to_string().contains("readyState=interactive"));
        }

        #[test]
        fn test_or_else_returns_fallback() {
            let (poller, _clock) = manual();
            let spec = WaitSpec::new(Duration::from_millis(500))
                .with_poll_interval(Duration::from_millis(100));
            let displayed = poller
                .poll_until_or_else(&(), &spec, |()| PollOutcome::pending(), |report| {
                    assert!(report.attempts >= 5);
                    Ok(false)
                })
                .unwrap();
            assert!(!displayed);
        }

        #[test]
        fn test_or_else_still_propagates_fatal() {
            let (poller, _clock) = manual();
            let spec = WaitSpec::new(Duration::from_millis(500));
            let err = poller
                .poll_until_or_else(
                    &(),
                    &spec,
                    |()| PollOutcome::<bool>::Failed(ProbeError::session_lost("closed")),
                    |_| Ok(false),
                )
                .unwrap_err();
            assert_eq!(err.kind(), ErrorKind::SessionLost);
        }

        #[test]
        fn test_target_is_passed_to_predicate() {
            let (poller, _clock) = manual();
            let spec = WaitSpec::new(Duration::from_secs(1));
            let target = vec![3, 1, 2];
            let len = poller
                .poll_until(target.as_slice(), &spec, |t: &[i32]| PollOutcome::Satisfied(t.len()))
                .unwrap();
            assert_eq!(len, 3);
        }

        #[test]
        fn test_cancel_before_start() {
            let token = CancelToken::new();
            token.cancel();
            let poller = ConditionPoller::with_clock(ManualClock::new()).with_cancel(token);
            let spec = WaitSpec::new(Duration::from_secs(1)).describe("never");
            let calls = Cell::new(0);
            let err = poller
                .poll_until(&(), &spec, |()| {
                    calls.set(calls.get() + 1);
                    PollOutcome::<()>::pending()
                })
                .unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Cancelled);
            assert_eq!(calls.get(), 0);
        }

        #[test]
        fn test_cancel_mid_wait() {
            let token = CancelToken::new();
            let poller =
                ConditionPoller::with_clock(ManualClock::new()).with_cancel(token.clone());
            let spec = WaitSpec::new(Duration::from_secs(10))
                .with_poll_interval(Duration::from_millis(100));
            let calls = Cell::new(0);
            let err = poller
                .poll_until(&(), &spec, |()| {
                    calls.set(calls.get() + 1);
                    if calls.get() == 2 {
                        token.cancel();
                    }
                    PollOutcome::<()>::pending()
                })
                .unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Cancelled);
            assert_eq!(calls.get(), 2);
        }
    }

    mod real_time_tests {
        use super::*;

        #[test]
        fn test_always_pending_one_second() {
            let spec = WaitSpec::new(Duration::from_secs(1))
                .with_poll_interval(Duration::from_millis(200));
            let calls = Cell::new(0);
            let started = Instant::now();
            let err = ConditionPoller::new()
                .poll_until(&(), &spec, |()| {
                    calls.set(calls.get() + 1);
                    PollOutcome::<()>::pending()
                })
                .unwrap_err();
            let elapsed = started.elapsed();
            assert!(err.is_timeout());
            assert!(elapsed >= Duration::from_secs(1));
            assert!(elapsed < Duration::from_millis(1400));
            assert!((5..=6).contains(&calls.get()));
        }

        #[test]
        fn test_satisfied_on_third_call() {
            let spec = WaitSpec::new(Duration::from_secs(5))
                .with_poll_interval(Duration::from_millis(100));
            let calls = Cell::new(0);
            let started = Instant::now();
            let value = ConditionPoller::new()
                .poll_until(&(), &spec, |()| {
                    calls.set(calls.get() + 1);
                    if calls.get() == 3 {
                        PollOutcome::Satisfied(42)
                    } else {
                        PollOutcome::pending()
                    }
                })
                .unwrap();
            let elapsed = started.elapsed();
            assert_eq!(value, 42);
            assert_eq!(calls.get(), 3);
            assert!(elapsed >= Duration::from_millis(200));
            assert!(elapsed < Duration::from_millis(450));
        }

        #[test]
        fn test_wait_until_helper() {
            let mut n = 0;
            wait_until(
                || {
                    n += 1;
                    n > 1
                },
                Duration::from_secs(2),
            )
            .unwrap();
            assert_eq!(n, 2);
        }
    }
}
