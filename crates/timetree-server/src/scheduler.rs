//! Background scheduler for calendar refreshes.
//!
//! This module provides a scheduler that periodically refreshes a calendar
//! with support for:
//! - Configurable update intervals
//! - Jitter to avoid thundering herd
//! - Exponential backoff on transient errors
//! - Pausing when the credentials are rejected

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{RwLock, mpsc};
use tracing::{debug, error, info, warn};

use crate::coordinator::RefreshError;
use crate::error::{ServerError, ServerResult};
use crate::setup::UpdateInterval;

/// Scheduler configuration.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Base interval between refreshes.
    pub sync_interval: Duration,
    /// Maximum jitter to add to sync interval (as fraction 0.0-1.0).
    pub jitter_fraction: f64,
    /// Initial backoff duration on error.
    pub initial_backoff: Duration,
    /// Maximum backoff duration.
    pub max_backoff: Duration,
    /// Backoff multiplier.
    pub backoff_multiplier: f64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            sync_interval: UpdateInterval::default().as_duration(),
            jitter_fraction: 0.1, // 10% jitter
            initial_backoff: Duration::from_secs(30),
            max_backoff: Duration::from_secs(1800),
            backoff_multiplier: 2.0,
        }
    }
}

impl SchedulerConfig {
    /// Creates a new scheduler config with the given sync interval.
    pub fn new(sync_interval: Duration) -> Self {
        Self {
            sync_interval,
            ..Default::default()
        }
    }

    /// Creates a config polling at one of the setup choices.
    pub fn from_interval(interval: UpdateInterval) -> Self {
        Self::new(interval.as_duration())
    }

    /// Builder: set jitter fraction.
    pub fn with_jitter(mut self, fraction: f64) -> Self {
        self.jitter_fraction = fraction.clamp(0.0, 1.0);
        self
    }

    /// Builder: set backoff parameters.
    pub fn with_backoff(mut self, initial: Duration, max: Duration, multiplier: f64) -> Self {
        self.initial_backoff = initial;
        self.max_backoff = max;
        self.backoff_multiplier = multiplier;
        self
    }

    /// Checks that the intervals can drive a polling loop.
    pub fn validate(&self) -> ServerResult<()> {
        if self.sync_interval.is_zero() {
            return Err(ServerError::config("sync interval must be positive"));
        }
        if self.backoff_multiplier < 1.0 {
            return Err(ServerError::config("backoff multiplier must be at least 1"));
        }
        if self.initial_backoff > self.max_backoff {
            return Err(ServerError::config(
                "initial backoff must not exceed the maximum backoff",
            ));
        }
        Ok(())
    }

    /// Calculates the next sync delay with jitter.
    pub fn next_sync_delay(&self) -> Duration {
        let base = self.sync_interval.as_secs_f64();
        let jitter_range = base * self.jitter_fraction;
        let jitter = rand_jitter(jitter_range);
        Duration::from_secs_f64(base + jitter)
    }

    /// Calculates backoff delay based on consecutive failures.
    pub fn backoff_delay(&self, consecutive_failures: u32) -> Duration {
        if consecutive_failures == 0 {
            return Duration::ZERO;
        }

        let base = self.initial_backoff.as_secs_f64();
        let multiplier = self
            .backoff_multiplier
            .powi(consecutive_failures as i32 - 1);
        let delay = base * multiplier;
        let max = self.max_backoff.as_secs_f64();

        Duration::from_secs_f64(delay.min(max))
    }
}

/// Simple pseudo-random jitter generator.
/// Uses the current time to generate a value in [-range, range].
fn rand_jitter(range: f64) -> f64 {
    use std::time::SystemTime;

    let nanos = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap_or_default()
        .subsec_nanos();

    let fraction = (nanos as f64) / (1_000_000_000.0);
    (fraction * 2.0 - 1.0) * range
}

/// Commands that can be sent to the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerCommand {
    /// Trigger an immediate refresh, even while paused.
    SyncNow,
    /// Pause periodic refreshes.
    Pause,
    /// Resume periodic refreshes and clear the re-auth flag.
    Resume,
    /// Stop the scheduler.
    Stop,
}

/// Scheduler state.
#[derive(Debug, Clone, Default)]
pub struct SchedulerState {
    /// Whether periodic refreshes are paused.
    pub paused: bool,
    /// Set when the credentials were rejected; polling stays paused until
    /// a refresh succeeds or the scheduler is resumed.
    pub needs_reauth: bool,
    /// Number of consecutive refresh failures.
    pub consecutive_failures: u32,
    /// Last successful refresh time.
    pub last_sync: Option<DateTime<Utc>>,
    /// Last refresh attempt time.
    pub last_attempt: Option<DateTime<Utc>>,
    /// Last error message.
    pub last_error: Option<String>,
}

impl SchedulerState {
    /// Creates a new scheduler state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a successful refresh.
    pub fn record_success(&mut self) {
        if self.needs_reauth {
            self.needs_reauth = false;
            self.paused = false;
        }
        self.consecutive_failures = 0;
        self.last_sync = Some(Utc::now());
        self.last_attempt = self.last_sync;
        self.last_error = None;
    }

    /// Records a failed refresh.
    pub fn record_failure(&mut self, error: &RefreshError) {
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        self.last_attempt = Some(Utc::now());
        self.last_error = Some(error.to_string());
        if error.needs_reauth() {
            self.needs_reauth = true;
            self.paused = true;
        }
    }

    /// Resumes periodic refreshes.
    pub fn resume(&mut self) {
        self.paused = false;
        self.needs_reauth = false;
    }

    /// Returns the time since last refresh.
    pub fn time_since_sync(&self) -> Option<Duration> {
        self.last_sync.map(|last| {
            let elapsed = Utc::now() - last;
            Duration::from_secs(elapsed.num_seconds().max(0) as u64)
        })
    }
}

/// Shared scheduler state.
pub type SharedSchedulerState = Arc<RwLock<SchedulerState>>;

/// Creates a new shared scheduler state.
pub fn new_scheduler_state() -> SharedSchedulerState {
    Arc::new(RwLock::new(SchedulerState::new()))
}

/// The scheduler drives periodic refreshes of one calendar.
pub struct Scheduler {
    config: SchedulerConfig,
    state: SharedSchedulerState,
    command_tx: mpsc::Sender<SchedulerCommand>,
    command_rx: Option<mpsc::Receiver<SchedulerCommand>>,
}

impl Scheduler {
    /// Creates a new scheduler with the given configuration.
    pub fn new(config: SchedulerConfig) -> Self {
        let (command_tx, command_rx) = mpsc::channel(16);
        Self {
            config,
            state: new_scheduler_state(),
            command_tx,
            command_rx: Some(command_rx),
        }
    }

    /// Returns a handle for sending commands to the scheduler.
    pub fn handle(&self) -> SchedulerHandle {
        SchedulerHandle {
            command_tx: self.command_tx.clone(),
            state: self.state.clone(),
        }
    }

    /// Returns the shared state.
    pub fn state(&self) -> SharedSchedulerState {
        self.state.clone()
    }

    /// Runs the scheduler loop with the given refresh function.
    ///
    /// The function is called once immediately, then periodically until a
    /// [`SchedulerCommand::Stop`] arrives.
    pub async fn run<F, Fut>(mut self, sync_fn: F) -> ServerResult<()>
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = Result<(), RefreshError>> + Send,
    {
        self.config.validate()?;
        let mut command_rx = self
            .command_rx
            .take()
            .ok_or_else(|| ServerError::config("scheduler is already running"))?;

        info!(
            interval_secs = self.config.sync_interval.as_secs(),
            "Scheduler started"
        );

        // Initial sync
        self.do_sync(&sync_fn).await;

        loop {
            let delay = self.calculate_next_delay().await;
            debug!(delay_secs = delay.as_secs(), "Scheduling next sync");

            tokio::select! {
                _ = tokio::time::sleep(delay) => {
                    let state = self.state.read().await;
                    if state.paused {
                        debug!(needs_reauth = state.needs_reauth, "Scheduler paused, skipping sync");
                        continue;
                    }
                    drop(state);

                    self.do_sync(&sync_fn).await;
                }
                cmd = command_rx.recv() => {
                    match cmd {
                        Some(SchedulerCommand::SyncNow) => {
                            debug!("Received SyncNow command");
                            self.do_sync(&sync_fn).await;
                        }
                        Some(SchedulerCommand::Pause) => {
                            info!("Scheduler paused");
                            self.state.write().await.paused = true;
                        }
                        Some(SchedulerCommand::Resume) => {
                            info!("Scheduler resumed");
                            self.state.write().await.resume();
                        }
                        Some(SchedulerCommand::Stop) | None => {
                            info!("Scheduler stopping");
                            break;
                        }
                    }
                }
            }
        }

        Ok(())
    }

    async fn calculate_next_delay(&self) -> Duration {
        let state = self.state.read().await;

        // Backoff only applies to failures that polling can recover from
        if state.consecutive_failures > 0 && !state.needs_reauth {
            let backoff = self.config.backoff_delay(state.consecutive_failures);
            debug!(
                failures = state.consecutive_failures,
                backoff_secs = backoff.as_secs(),
                "Using backoff delay"
            );
            return backoff;
        }

        self.config.next_sync_delay()
    }

    async fn do_sync<F, Fut>(&self, sync_fn: &F)
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = Result<(), RefreshError>>,
    {
        debug!("Starting sync");
        match sync_fn().await {
            Ok(()) => {
                info!("Sync completed successfully");
                self.state.write().await.record_success();
            }
            Err(e) if e.needs_reauth() => {
                error!(error = %e, "Credentials rejected, pausing until re-authenticated");
                self.state.write().await.record_failure(&e);
            }
            Err(e) => {
                warn!(error = %e, "Sync failed");
                self.state.write().await.record_failure(&e);
            }
        }
    }
}

/// Handle for sending commands to a running scheduler.
#[derive(Clone, Debug)]
pub struct SchedulerHandle {
    command_tx: mpsc::Sender<SchedulerCommand>,
    state: SharedSchedulerState,
}

impl SchedulerHandle {
    /// Triggers an immediate sync.
    pub async fn sync_now(&self) -> Result<(), mpsc::error::SendError<SchedulerCommand>> {
        self.command_tx.send(SchedulerCommand::SyncNow).await
    }

    /// Pauses the scheduler.
    pub async fn pause(&self) -> Result<(), mpsc::error::SendError<SchedulerCommand>> {
        self.command_tx.send(SchedulerCommand::Pause).await
    }

    /// Resumes the scheduler.
    pub async fn resume(&self) -> Result<(), mpsc::error::SendError<SchedulerCommand>> {
        self.command_tx.send(SchedulerCommand::Resume).await
    }

    /// Stops the scheduler.
    pub async fn stop(&self) -> Result<(), mpsc::error::SendError<SchedulerCommand>> {
        self.command_tx.send(SchedulerCommand::Stop).await
    }

    /// Returns the current scheduler state.
    pub async fn state(&self) -> SchedulerState {
        self.state.read().await.clone()
    }

    /// Returns true if the scheduler is paused.
    pub async fn is_paused(&self) -> bool {
        self.state.read().await.paused
    }

    /// Returns true if the credentials were rejected.
    pub async fn needs_reauth(&self) -> bool {
        self.state.read().await.needs_reauth
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use timetree_providers::ProviderError;

    fn transient(n: u32) -> RefreshError {
        RefreshError::from(ProviderError::network(format!("failure {n}")))
    }

    fn rejected() -> RefreshError {
        RefreshError::from(ProviderError::authentication("invalid credentials"))
    }

    #[test]
    fn config_default() {
        let config = SchedulerConfig::default();
        assert_eq!(config.sync_interval, Duration::from_secs(1800));
        assert!(config.jitter_fraction > 0.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn config_from_interval() {
        let config = SchedulerConfig::from_interval(UpdateInterval::FiveMinutes);
        assert_eq!(config.sync_interval, Duration::from_secs(300));
    }

    #[test]
    fn config_validation() {
        assert!(SchedulerConfig::new(Duration::ZERO).validate().is_err());
        assert!(
            SchedulerConfig::default()
                .with_backoff(Duration::from_secs(10), Duration::from_secs(5), 2.0)
                .validate()
                .is_err()
        );
        assert!(
            SchedulerConfig::default()
                .with_backoff(Duration::from_secs(1), Duration::from_secs(5), 0.5)
                .validate()
                .is_err()
        );
    }

    #[test]
    fn config_next_sync_delay() {
        let config = SchedulerConfig::new(Duration::from_secs(60)).with_jitter(0.1);

        let delay = config.next_sync_delay();
        // Should be within 10% jitter
        assert!(delay.as_secs_f64() >= 54.0);
        assert!(delay.as_secs_f64() <= 66.0);
    }

    #[test]
    fn config_backoff_delay() {
        let config = SchedulerConfig::default().with_backoff(
            Duration::from_secs(5),
            Duration::from_secs(300),
            2.0,
        );

        assert_eq!(config.backoff_delay(0), Duration::ZERO);
        assert_eq!(config.backoff_delay(1), Duration::from_secs(5));
        assert_eq!(config.backoff_delay(2), Duration::from_secs(10));
        assert_eq!(config.backoff_delay(3), Duration::from_secs(20));

        // Should be capped at max
        assert_eq!(config.backoff_delay(10), Duration::from_secs(300));
    }

    mod state {
        use super::*;

        #[test]
        fn record_success() {
            let mut state = SchedulerState::new();
            state.consecutive_failures = 5;

            state.record_success();

            assert_eq!(state.consecutive_failures, 0);
            assert!(state.last_sync.is_some());
            assert!(state.last_error.is_none());
        }

        #[test]
        fn transient_failure_keeps_polling() {
            let mut state = SchedulerState::new();

            state.record_failure(&transient(0));

            assert_eq!(state.consecutive_failures, 1);
            assert!(state.last_attempt.is_some());
            assert!(!state.paused);
            assert!(!state.needs_reauth);
            assert!(state.last_error.unwrap().contains("failure 0"));
        }

        #[test]
        fn rejected_credentials_pause() {
            let mut state = SchedulerState::new();

            state.record_failure(&rejected());
            assert!(state.paused);
            assert!(state.needs_reauth);

            state.record_success();
            assert!(!state.paused);
            assert!(!state.needs_reauth);
        }

        #[test]
        fn success_keeps_manual_pause() {
            let mut state = SchedulerState::new();
            state.paused = true;

            state.record_success();
            assert!(state.paused);
        }

        #[test]
        fn resume_clears_reauth() {
            let mut state = SchedulerState::new();
            state.record_failure(&rejected());

            state.resume();
            assert!(!state.paused);
            assert!(!state.needs_reauth);
        }
    }

    #[tokio::test]
    async fn scheduler_commands() {
        let config = SchedulerConfig::new(Duration::from_secs(60));
        let scheduler = Scheduler::new(config);
        let handle = scheduler.handle();

        let sync_count = Arc::new(AtomicU32::new(0));
        let sync_count_clone = sync_count.clone();

        let scheduler_task = tokio::spawn(async move {
            scheduler
                .run(move || {
                    let count = sync_count_clone.clone();
                    async move {
                        count.fetch_add(1, Ordering::SeqCst);
                        Ok(())
                    }
                })
                .await
        });

        // Wait for initial sync
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(sync_count.load(Ordering::SeqCst) >= 1);

        // Trigger manual sync
        handle.sync_now().await.unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(sync_count.load(Ordering::SeqCst) >= 2);

        // Pause and verify
        handle.pause().await.unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(handle.is_paused().await);

        // Resume
        handle.resume().await.unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(!handle.is_paused().await);

        // Stop
        handle.stop().await.unwrap();
        scheduler_task.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn scheduler_backoff_on_failure() {
        let config = SchedulerConfig::new(Duration::from_secs(1)).with_backoff(
            Duration::from_millis(10),
            Duration::from_millis(100),
            2.0,
        );

        let scheduler = Scheduler::new(config);
        let handle = scheduler.handle();

        let attempts = Arc::new(AtomicU32::new(0));
        let attempts_clone = attempts.clone();

        let scheduler_task = tokio::spawn(async move {
            scheduler
                .run(move || {
                    let count = attempts_clone.clone();
                    async move {
                        let n = count.fetch_add(1, Ordering::SeqCst);
                        if n < 3 { Err(transient(n)) } else { Ok(()) }
                    }
                })
                .await
        });

        // Wait for initial failures and recovery
        tokio::time::sleep(Duration::from_millis(200)).await;

        assert!(attempts.load(Ordering::SeqCst) >= 4);
        let state = handle.state().await;
        assert_eq!(state.consecutive_failures, 0);
        assert!(state.last_sync.is_some());

        handle.stop().await.unwrap();
        scheduler_task.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn scheduler_pauses_on_rejected_credentials() {
        let config = SchedulerConfig::new(Duration::from_millis(20)).with_backoff(
            Duration::from_millis(10),
            Duration::from_millis(20),
            2.0,
        );

        let scheduler = Scheduler::new(config);
        let handle = scheduler.handle();

        let attempts = Arc::new(AtomicU32::new(0));
        let attempts_clone = attempts.clone();

        let scheduler_task = tokio::spawn(async move {
            scheduler
                .run(move || {
                    let count = attempts_clone.clone();
                    async move {
                        let n = count.fetch_add(1, Ordering::SeqCst);
                        if n == 0 { Err(rejected()) } else { Ok(()) }
                    }
                })
                .await
        });

        // Several intervals pass without a retry
        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
        assert!(handle.needs_reauth().await);
        assert!(handle.is_paused().await);

        // Resume restarts polling
        handle.resume().await.unwrap();
        tokio::time::sleep(Duration::from_millis(150)).await;
        assert!(attempts.load(Ordering::SeqCst) >= 2);
        assert!(!handle.needs_reauth().await);

        handle.stop().await.unwrap();
        scheduler_task.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn invalid_config_is_rejected() {
        let scheduler = Scheduler::new(SchedulerConfig::new(Duration::ZERO));
        let err = scheduler.run(|| async { Ok(()) }).await.unwrap_err();
        assert!(matches!(err, ServerError::Config { .. }));
    }
}
