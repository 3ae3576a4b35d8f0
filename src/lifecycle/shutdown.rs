//! Shutdown coordination.
//!
//! The first termination signal moves the controller from `Running` to
//! `ShuttingDown`, cancels the shared token and starts a countdown. If the
//! main flow calls [`ShutdownController::complete`] before the countdown
//! ends the process exits normally; otherwise the controller logs an error
//! and exits with code 0. Later signals are ignored.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::lifecycle::signals::Signal;

/// Environment variable overriding the grace period, in whole seconds.
pub const ENV_SHUTDOWN_TIMEOUT_SECS: &str = "SHUTDOWN_TIMEOUT_SECS";

pub const DEFAULT_GRACE_PERIOD: Duration = Duration::from_secs(3);

/// Exit code used when the grace period runs out.
const FORCED_EXIT_CODE: i32 = 0;

/// Parse a grace period override; anything but a non-negative integer yields the default.
pub fn grace_period_from(raw: Option<&str>) -> Duration {
    raw.and_then(|value| value.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
        .unwrap_or(DEFAULT_GRACE_PERIOD)
}

/// Grace period from `SHUTDOWN_TIMEOUT_SECS`.
pub fn grace_period_from_env() -> Duration {
    grace_period_from(std::env::var(ENV_SHUTDOWN_TIMEOUT_SECS).ok().as_deref())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownState {
    Running,
    ShuttingDown,
    Terminated,
}

/// Created once, on the first termination signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShutdownSession {
    pub signal: Signal,
    pub grace_period: Duration,
    pub started_at: Instant,
}

impl ShutdownSession {
    /// `None` when the grace period is too long to be represented.
    pub fn deadline(&self) -> Option<Instant> {
        self.started_at.checked_add(self.grace_period)
    }
}

#[derive(Debug)]
struct Inner {
    state: ShutdownState,
    session: Option<ShutdownSession>,
}

type ExitHook = Arc<dyn Fn(i32) + Send + Sync>;

/// Coordinator for graceful shutdown.
///
/// Cloning yields another handle to the same controller.
#[derive(Clone)]
pub struct ShutdownController {
    grace_period: Duration,
    inner: Arc<Mutex<Inner>>,
    /// Cancelled when shutdown begins; handed to the running task.
    cancel: CancellationToken,
    /// Cancelled when the process reaches `Terminated` either way.
    terminated: CancellationToken,
    exit: ExitHook,
}

impl ShutdownController {
    pub fn new(grace_period: Duration) -> Self {
        Self {
            grace_period,
            inner: Arc::new(Mutex::new(Inner {
                state: ShutdownState::Running,
                session: None,
            })),
            cancel: CancellationToken::new(),
            terminated: CancellationToken::new(),
            exit: Arc::new(|code| std::process::exit(code)),
        }
    }

    /// Controller whose grace period comes from the environment.
    pub fn from_env() -> Self {
        Self::new(grace_period_from_env())
    }

    /// Replace the function called on forced termination.
    pub fn with_exit_hook(mut self, hook: impl Fn(i32) + Send + Sync + 'static) -> Self {
        self.exit = Arc::new(hook);
        self
    }

    pub fn grace_period(&self) -> Duration {
        self.grace_period
    }

    pub fn state(&self) -> ShutdownState {
        self.lock().state
    }

    pub fn session(&self) -> Option<ShutdownSession> {
        self.lock().session
    }

    /// Token cancelled as soon as shutdown begins.
    pub fn token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// React to a termination signal. Returns `false` if one was already handled.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn begin(&self, signal: Signal) -> bool {
        let session = {
            let mut inner = self.lock();
            if inner.state != ShutdownState::Running {
                tracing::debug!(signal = %signal, state = ?inner.state, "Ignoring repeated signal");
                return false;
            }
            let session = ShutdownSession {
                signal,
                grace_period: self.grace_period,
                started_at: Instant::now(),
            };
            inner.state = ShutdownState::ShuttingDown;
            inner.session = Some(session);
            session
        };

        tracing::warn!(
            signal = %signal,
            grace_period_secs = session.grace_period.as_secs(),
            "Shutdown signal received, waiting for task to stop"
        );
        self.cancel.cancel();

        let controller = self.clone();
        tokio::spawn(async move {
            let expiry = async {
                match session.deadline() {
                    Some(deadline) => tokio::time::sleep_until(deadline).await,
                    None => std::future::pending().await,
                }
            };
            tokio::select! {
                _ = controller.terminated.cancelled() => {}
                _ = expiry => controller.force_terminate(),
            }
        });
        true
    }

    /// Mark normal completion; a pending countdown is abandoned.
    pub fn complete(&self) {
        let mut inner = self.lock();
        if inner.state == ShutdownState::Terminated {
            return;
        }
        inner.state = ShutdownState::Terminated;
        drop(inner);
        self.terminated.cancel();
        tracing::info!("Shutdown complete");
    }

    fn force_terminate(&self) {
        {
            let mut inner = self.lock();
            if inner.state == ShutdownState::Terminated {
                return;
            }
            inner.state = ShutdownState::Terminated;
        }
        self.terminated.cancel();
        tracing::error!(
            grace_period_secs = self.grace_period.as_secs(),
            "Shutdown timeout exceeded, forcing exit"
        );
        (self.exit)(FORCED_EXIT_CODE);
    }

    /// Consume signals until the channel closes.
    pub async fn listen(&self, mut signals: mpsc::Receiver<Signal>) {
        while let Some(signal) = signals.recv().await {
            self.begin(signal);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grace_period_default() {
        assert_eq!(grace_period_from(None), Duration::from_secs(3));
        assert_eq!(grace_period_from(Some("abc")), Duration::from_secs(3));
        assert_eq!(grace_period_from(Some("-1")), Duration::from_secs(3));
        assert_eq!(grace_period_from(Some("")), Duration::from_secs(3));
        assert_eq!(grace_period_from(Some("2.5")), Duration::from_secs(3));
    }

    #[test]
    fn test_grace_period_override() {
        assert_eq!(grace_period_from(Some("10")), Duration::from_secs(10));
        assert_eq!(grace_period_from(Some(" 0 ")), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unrepresentable_grace_period_never_forces_exit() {
        let grace_period = grace_period_from(Some("18446744073709551615"));
        assert_eq!(grace_period, Duration::from_secs(u64::MAX));

        let exits = Arc::new(Mutex::new(Vec::new()));
        let recorded = exits.clone();
        let controller = ShutdownController::new(grace_period)
            .with_exit_hook(move |code| recorded.lock().unwrap().push(code));

        assert!(controller.begin(Signal::Terminate));
        tokio::time::sleep(Duration::from_secs(3600)).await;

        assert_eq!(controller.state(), ShutdownState::ShuttingDown);
        assert_eq!(controller.session().unwrap().deadline(), None);
        assert!(exits.lock().unwrap().is_empty());

        controller.complete();
        assert_eq!(controller.state(), ShutdownState::Terminated);
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_is_start_plus_grace() {
        let controller = ShutdownController::new(Duration::from_secs(3)).with_exit_hook(|_| {});
        controller.begin(Signal::Interrupt);
        let session = controller.session().unwrap();
        assert_eq!(session.deadline(), Some(session.started_at + Duration::from_secs(3)));
        controller.complete();
    }

    #[test]
    fn test_initial_state() {
        let controller = ShutdownController::new(DEFAULT_GRACE_PERIOD);
        assert_eq!(controller.state(), ShutdownState::Running);
        assert!(controller.session().is_none());
        assert!(!controller.token().is_cancelled());
    }

    #[test]
    fn test_complete_without_signal() {
        let controller = ShutdownController::new(DEFAULT_GRACE_PERIOD);
        controller.complete();
        assert_eq!(controller.state(), ShutdownState::Terminated);
    }

    #[tokio::test]
    async fn test_signal_after_completion_is_ignored() {
        let controller = ShutdownController::new(DEFAULT_GRACE_PERIOD)
            .with_exit_hook(|_| panic!("must not exit"));
        controller.complete();
        assert!(!controller.begin(Signal::Terminate));
        assert!(controller.session().is_none());
    }
}
