// ── Link stability monitoring ──
//
// A link that comes up once is not necessarily usable: radios commonly
// flap while they settle. The monitor only reports success after the
// link has stayed alive for a full window, restarting the window on any
// observed drop.
//
// Each poll result is fed through `StabilityState::observe`, a pure
// transition, so the decision logic is tested without a clock.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, info, warn};

use cnwave_api::ControllerClient;

use crate::error::CoreError;

/// Anything that can answer "is any link alive right now?".
pub trait LinkProbe: Send + Sync {
    fn any_link_alive(&self) -> impl Future<Output = Result<bool, CoreError>> + Send;
}

impl LinkProbe for ControllerClient {
    async fn any_link_alive(&self) -> Result<bool, CoreError> {
        Ok(self.get_topology().await?.any_link_alive())
    }
}

// ── Settings ─────────────────────────────────────────────────────────

/// Poll interval, overall deadline, and required stable window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StabilitySettings {
    pub interval: Duration,
    pub timeout: Duration,
    pub window: Duration,
}

impl Default for StabilitySettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            timeout: Duration::from_secs(300),
            window: Duration::from_secs(60),
        }
    }
}

/// Default deadline for [`wait_for_link_active`].
pub const LINK_ACTIVE_TIMEOUT: Duration = Duration::from_secs(90);
/// Default poll interval for [`wait_for_link_active`].
pub const LINK_ACTIVE_INTERVAL: Duration = Duration::from_secs(5);

// ── State machine ────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StabilityState {
    /// Waiting for the link to be seen alive.
    Searching,
    /// Alive continuously since `since`.
    CandidateStable { since: Instant },
    Stable,
    TimedOut,
}

impl StabilityState {
    /// Apply one poll result taken at `now`.
    ///
    /// Terminal states absorb further samples.
    #[must_use]
    pub fn observe(self, alive: bool, now: Instant, window: Duration) -> Self {
        match (self, alive) {
            (Self::Stable | Self::TimedOut, _) => self,
            (Self::Searching, false) => Self::Searching,
            (Self::Searching, true) if window.is_zero() => Self::Stable,
            (Self::Searching, true) => Self::CandidateStable { since: now },
            (Self::CandidateStable { .. }, false) => Self::Searching,
            (Self::CandidateStable { since }, true) => {
                if now.duration_since(since) >= window {
                    Self::Stable
                } else {
                    self
                }
            }
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Stable | Self::TimedOut)
    }
}

// ── Monitor ──────────────────────────────────────────────────────────

/// Polls a [`LinkProbe`] until the link is stable or the deadline passes.
pub struct LinkStabilityMonitor<'a, P> {
    probe: &'a P,
    settings: StabilitySettings,
}

impl<'a, P: LinkProbe> LinkStabilityMonitor<'a, P> {
    pub fn new(probe: &'a P, settings: StabilitySettings) -> Self {
        Self { probe, settings }
    }

    /// `true` once the link has held for the full window, `false` if the
    /// deadline passes first. Probe errors abort the wait.
    pub async fn wait_until_stable(&self) -> Result<bool, CoreError> {
        let StabilitySettings {
            interval,
            timeout,
            window,
        } = self.settings;
        let started = Instant::now();
        let mut state = StabilityState::Searching;

        loop {
            if started.elapsed() >= timeout {
                state = StabilityState::TimedOut;
            } else {
                let alive = self.probe.any_link_alive().await?;
                let next = state.observe(alive, Instant::now(), window);
                log_transition(state, next);
                state = next;
            }

            match state {
                StabilityState::Stable => return Ok(true),
                StabilityState::TimedOut => {
                    warn!(timeout_secs = timeout.as_secs(), "link did not stabilise in time");
                    return Ok(false);
                }
                _ => tokio::time::sleep(interval).await,
            }
        }
    }
}

fn log_transition(from: StabilityState, to: StabilityState) {
    match (from, to) {
        (StabilityState::Searching, StabilityState::CandidateStable { .. }) => {
            info!("link is up, stability window started");
        }
        (StabilityState::CandidateStable { .. }, StabilityState::Searching) => {
            warn!("link flapped, stability window reset");
        }
        (_, StabilityState::Stable) => info!("link is stable"),
        _ => debug!(state = ?to, "stability poll"),
    }
}

/// Wait until any link is seen alive once. No stability requirement.
pub async fn wait_for_link_active<P: LinkProbe>(
    probe: &P,
    timeout: Duration,
    interval: Duration,
) -> Result<bool, CoreError> {
    let started = Instant::now();
    while started.elapsed() < timeout {
        if probe.any_link_alive().await? {
            info!("link is active");
            return Ok(true);
        }
        tokio::time::sleep(interval).await;
    }
    warn!(timeout_secs = timeout.as_secs(), "no link became active");
    Ok(false)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    const I: Duration = Duration::from_secs(5);

    /// Replays a fixed sequence of samples, repeating the last one.
    struct Scripted {
        samples: Vec<bool>,
        calls: AtomicUsize,
    }

    impl Scripted {
        fn new(samples: &[bool]) -> Self {
            Self {
                samples: samples.to_vec(),
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl LinkProbe for Scripted {
        async fn any_link_alive(&self) -> Result<bool, CoreError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            let idx = n.min(self.samples.len() - 1);
            Ok(self.samples[idx])
        }
    }

    struct Failing(Mutex<u32>);

    impl LinkProbe for Failing {
        async fn any_link_alive(&self) -> Result<bool, CoreError> {
            *self.0.lock().unwrap() += 1;
            Err(CoreError::Timeout {
                message: "getTopology timed out".into(),
            })
        }
    }

    fn settings(window: Duration, timeout: Duration) -> StabilitySettings {
        StabilitySettings {
            interval: I,
            timeout,
            window,
        }
    }

    /// Feed samples taken every `I` and return the index that went stable.
    fn first_stable_sample(samples: &[bool], window: Duration) -> Option<usize> {
        let t0 = Instant::now();
        let mut state = StabilityState::Searching;
        for (i, alive) in samples.iter().enumerate() {
            let at = t0 + I * u32::try_from(i).unwrap();
            state = state.observe(*alive, at, window);
            if state == StabilityState::Stable {
                return Some(i);
            }
        }
        None
    }

    #[test]
    fn stable_only_after_full_window_of_up() {
        let w = I * 2;
        assert_eq!(first_stable_sample(&[false, false, true, true, true], w), Some(4));
        assert_eq!(first_stable_sample(&[false, false, true, true], w), None);
    }

    #[test]
    fn flap_restarts_the_window() {
        let w = I * 2;
        let steady = first_stable_sample(&[true, true, true, true, true], w).unwrap();
        let flapped = first_stable_sample(&[true, false, true, true, true], w).unwrap();
        assert_eq!(steady, 2);
        assert_eq!(flapped, 4);
        assert_eq!(I * u32::try_from(flapped - steady).unwrap(), w);
    }

    #[test]
    fn terminal_states_absorb_samples() {
        let now = Instant::now();
        assert_eq!(
            StabilityState::Stable.observe(false, now, I),
            StabilityState::Stable
        );
        assert_eq!(
            StabilityState::TimedOut.observe(true, now, I),
            StabilityState::TimedOut
        );
        assert!(!StabilityState::Searching.is_terminal());
    }

    #[tokio::test(start_paused = true)]
    async fn monitor_reports_stable_after_window() {
        let probe = Scripted::new(&[false, false, true, true, true]);
        let monitor = LinkStabilityMonitor::new(&probe, settings(I * 2, Duration::from_secs(300)));
        let started = Instant::now();

        assert!(monitor.wait_until_stable().await.unwrap());
        assert_eq!(probe.calls(), 5);
        assert!(started.elapsed() >= I * 4);
    }

    #[tokio::test(start_paused = true)]
    async fn monitor_times_out_when_link_keeps_flapping() {
        let probe = Scripted::new(&[true, false, true, false, true, false, true, false]);
        let monitor = LinkStabilityMonitor::new(&probe, settings(I * 2, Duration::from_secs(30)));
        let started = Instant::now();

        assert!(!monitor.wait_until_stable().await.unwrap());
        assert!(started.elapsed() >= Duration::from_secs(30));
    }

    #[tokio::test(start_paused = true)]
    async fn monitor_times_out_when_link_never_comes_up() {
        let probe = Scripted::new(&[false]);
        let monitor = LinkStabilityMonitor::new(&probe, settings(I * 2, Duration::from_secs(20)));

        assert!(!monitor.wait_until_stable().await.unwrap());
        // Samples at 0, 5, 10 and 15 seconds.
        assert_eq!(probe.calls(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn probe_errors_abort_the_wait() {
        let probe = Failing(Mutex::new(0));
        let monitor = LinkStabilityMonitor::new(&probe, StabilitySettings::default());

        let err = monitor.wait_until_stable().await.unwrap_err();
        assert!(matches!(err, CoreError::Timeout { .. }));
        assert_eq!(*probe.0.lock().unwrap(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn link_active_returns_on_first_alive_sample() {
        let probe = Scripted::new(&[false, false, true]);
        assert!(
            wait_for_link_active(&probe, LINK_ACTIVE_TIMEOUT, LINK_ACTIVE_INTERVAL)
                .await
                .unwrap()
        );
        assert_eq!(probe.calls(), 3);

        let dead = Scripted::new(&[false]);
        assert!(
            !wait_for_link_active(&dead, Duration::from_secs(12), LINK_ACTIVE_INTERVAL)
                .await
                .unwrap()
        );
        assert_eq!(dead.calls(), 3);
    }
}
