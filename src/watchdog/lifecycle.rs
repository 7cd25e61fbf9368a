use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::StartPolicy;
use crate::types::MonitorError;

use super::client::WatchdogClient;
use super::state::WatchdogState;

/// What the start-up loop should do after one availability probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollStep {
    Up,
    Retry(Duration),
    TimedOut,
}

/// Attempt counter for the start-up availability probe.
#[derive(Debug, Clone, Copy)]
pub struct UpPoll {
    attempt: u32,
    max_attempts: u32,
    interval: Duration,
}

impl UpPoll {
    pub fn new(policy: &StartPolicy) -> Self {
        Self {
            attempt: 0,
            max_attempts: policy.max_attempts.max(1),
            interval: policy.poll_interval,
        }
    }

    /// Feed the result of one probe; `false` means "too early".
    pub fn next(&mut self, is_up: bool) -> PollStep {
        self.attempt += 1;
        if is_up {
            PollStep::Up
        } else if self.attempt >= self.max_attempts {
            PollStep::TimedOut
        } else {
            PollStep::Retry(self.interval)
        }
    }

    pub fn attempts(&self) -> u32 {
        self.attempt
    }
}

struct TransitionGuard<'a> {
    flag: &'a AtomicBool,
}

impl Drop for TransitionGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Publishes `Unknown` if a start is abandoned before it settles.
struct UnsettledStart<'a> {
    state_tx: &'a watch::Sender<WatchdogState>,
    armed: bool,
}

impl UnsettledStart<'_> {
    fn settle(mut self) {
        self.armed = false;
    }
}

impl Drop for UnsettledStart<'_> {
    fn drop(&mut self) {
        if self.armed {
            debug!("Start abandoned before completion");
            self.state_tx.send_replace(WatchdogState::Unknown);
        }
    }
}

/// Drives the watchdog through start/stop transitions and publishes the
/// resulting state. Only one transition may run at a time.
pub struct LifecycleController {
    watchdog: WatchdogClient,
    policy: StartPolicy,
    in_flight: AtomicBool,
    state_tx: watch::Sender<WatchdogState>,
}

impl LifecycleController {
    pub fn new(watchdog: WatchdogClient, policy: StartPolicy) -> Self {
        let (state_tx, _) = watch::channel(WatchdogState::Unknown);
        Self {
            watchdog,
            policy,
            in_flight: AtomicBool::new(false),
            state_tx,
        }
    }

    pub fn watchdog(&self) -> &WatchdogClient {
        &self.watchdog
    }

    /// Last published state.
    pub fn state(&self) -> WatchdogState {
        *self.state_tx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<WatchdogState> {
        self.state_tx.subscribe()
    }

    fn publish(&self, state: WatchdogState) {
        self.state_tx.send_replace(state);
    }

    fn begin(&self) -> Result<TransitionGuard<'_>, MonitorError> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| MonitorError::TransitionInFlight)?;
        Ok(TransitionGuard {
            flag: &self.in_flight,
        })
    }

    /// Poll the watchdog once. Failures publish `Unknown` and are returned.
    pub async fn refresh_state(&self) -> Result<WatchdogState, MonitorError> {
        match self.watchdog.get_state().await {
            Ok(state) => {
                self.publish(state);
                Ok(state)
            }
            Err(err) => {
                warn!(error = ?err, "Failed to query watchdog state");
                self.publish(WatchdogState::Unknown);
                Err(err)
            }
        }
    }

    pub async fn start(&self) -> Result<(), MonitorError> {
        self.start_with_cancel(&CancellationToken::new()).await
    }

    /// Start the daemon and wait until it answers. Cancelling `cancel` (or
    /// dropping the future) stops polling immediately.
    pub async fn start_with_cancel(&self, cancel: &CancellationToken) -> Result<(), MonitorError> {
        let _guard = self.begin()?;
        let unsettled = UnsettledStart {
            state_tx: &self.state_tx,
            armed: true,
        };

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(MonitorError::Cancelled),
            result = self.run_start() => result,
        };
        unsettled.settle();

        match &result {
            Ok(()) => {
                info!("Syncthing is up");
                self.publish(WatchdogState::Running);
            }
            Err(err) => {
                warn!(error = ?err, "Starting Syncthing failed");
                self.publish(WatchdogState::Unknown);
            }
        }
        result
    }

    async fn run_start(&self) -> Result<(), MonitorError> {
        self.watchdog.start().await?;
        self.publish(WatchdogState::Wait);

        let mut poll = UpPoll::new(&self.policy);
        loop {
            let is_up = self.watchdog.check_if_up().await?;
            match poll.next(is_up) {
                PollStep::Up => return Ok(()),
                PollStep::Retry(delay) => {
                    debug!(attempt = poll.attempts(), "Syncthing not up yet");
                    tokio::time::sleep(delay).await;
                }
                PollStep::TimedOut => {
                    return Err(MonitorError::Timeout {
                        attempts: poll.attempts(),
                    })
                }
            }
        }
    }

    /// Stop the daemon, then re-read the state the watchdog settled on.
    pub async fn stop(&self) -> Result<WatchdogState, MonitorError> {
        let _guard = self.begin()?;
        if let Err(err) = self.watchdog.stop().await {
            self.publish(WatchdogState::Unknown);
            return Err(err);
        }
        tokio::time::sleep(self.policy.settle_delay).await;
        self.refresh_state().await
    }

    /// Stop when running or starting, otherwise start.
    pub async fn toggle(&self) -> Result<WatchdogState, MonitorError> {
        let current = self.refresh_state().await?;
        if current.is_active() {
            self.stop().await
        } else {
            self.start().await?;
            Ok(WatchdogState::Running)
        }
    }

    /// Reload the watchdog's settings and ask whether it could start with them.
    pub async fn setup_check(&self) -> Result<(), MonitorError> {
        self.watchdog.reload_config().await?;
        self.watchdog.check_start().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(max_attempts: u32) -> StartPolicy {
        StartPolicy {
            max_attempts,
            poll_interval: Duration::from_millis(10),
            ..Default::default()
        }
    }

    #[test]
    fn poll_stops_when_up() {
        let mut poll = UpPoll::new(&policy(5));
        assert_eq!(poll.next(false), PollStep::Retry(Duration::from_millis(10)));
        assert_eq!(poll.next(true), PollStep::Up);
        assert_eq!(poll.attempts(), 2);
    }

    #[test]
    fn poll_times_out_after_budget() {
        let mut poll = UpPoll::new(&policy(3));
        assert!(matches!(poll.next(false), PollStep::Retry(_)));
        assert!(matches!(poll.next(false), PollStep::Retry(_)));
        assert_eq!(poll.next(false), PollStep::TimedOut);
        assert_eq!(poll.attempts(), 3);
    }

    #[test]
    fn zero_budget_still_probes_once() {
        let mut poll = UpPoll::new(&policy(0));
        assert_eq!(poll.next(false), PollStep::TimedOut);
    }

    #[test]
    fn overlapping_transition_is_refused() {
        let watchdog =
            WatchdogClient::new("http://127.0.0.1:1/", Duration::from_secs(1)).unwrap();
        let controller = LifecycleController::new(watchdog, policy(1));

        let guard = controller.begin().unwrap();
        assert!(matches!(
            controller.begin(),
            Err(MonitorError::TransitionInFlight)
        ));
        drop(guard);
        assert!(controller.begin().is_ok());
        assert_eq!(controller.state(), WatchdogState::Unknown);
    }
}
