use super::{RunCounters, WeightedTable, WindowPlan};
use crate::{adapters::ExecutionResult, error::Error, Result};
use chrono::{DateTime, Utc};
use futures::FutureExt;
use rand::{Rng, RngCore};
use std::{any::Any, panic::AssertUnwindSafe, sync::Arc, time::Duration};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Skipped actions run back to back; after this many in a row the regular wait applies.
const MAX_CONSECUTIVE_SKIPS: u32 = 5;

/// Timing of the action loop and the operational windows around it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleSettings {
    pub min_wait: Duration,
    pub max_wait: Duration,
    /// Log a summary and reset counters after this many executions.
    pub summary_every: u64,
    pub error_backoff: Duration,
    /// Length of an active window.
    pub window: Duration,
    /// Windows start on multiples of this period since the Unix epoch.
    pub period: Duration,
    pub max_actions_per_window: Option<u64>,
}

impl Default for ScheduleSettings {
    fn default() -> Self {
        Self {
            min_wait: Duration::from_secs(15),
            max_wait: Duration::from_secs(60),
            summary_every: 500,
            error_backoff: Duration::from_secs(60),
            window: Duration::from_secs(12 * 3600),
            period: Duration::from_secs(12 * 3600),
            max_actions_per_window: None,
        }
    }
}

impl ScheduleSettings {
    pub fn validate(&self) -> Result<()> {
        if self.min_wait > self.max_wait {
            return Err(Error::config(format!(
                "min wait ({}s) exceeds max wait ({}s)",
                self.min_wait.as_secs(),
                self.max_wait.as_secs()
            )));
        }
        if self.summary_every == 0 {
            return Err(Error::config("summary interval must be positive"));
        }
        if self.window.is_zero() || self.period.as_secs() == 0 {
            return Err(Error::config("window and period must be at least one second"));
        }
        if self.max_actions_per_window == Some(0) {
            return Err(Error::config("max actions per window must be positive"));
        }
        Ok(())
    }
}

/// What happened in one loop iteration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    Completed(ExecutionResult),
    /// The action returned an error or panicked.
    Errored(String),
}

/// Source of UTC wall-clock time used to align windows.
pub type WallClock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Picks weighted actions in a loop until cancelled.
pub struct Bot<R> {
    table: WeightedTable,
    settings: ScheduleSettings,
    rng: R,
    counters: RunCounters,
    iterations: u64,
    cancel: CancellationToken,
    clock: WallClock,
}

impl<R> Bot<R>
where
    R: RngCore + Send,
{
    pub fn new(
        table: WeightedTable,
        settings: ScheduleSettings,
        rng: R,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            table,
            settings,
            rng,
            counters: RunCounters::default(),
            iterations: 0,
            cancel,
            clock: Arc::new(Utc::now),
        }
    }

    /// Replaces the wall clock used for window alignment.
    pub fn with_clock(mut self, clock: WallClock) -> Self {
        self.clock = clock;
        self
    }

    /// Counters since the last summary.
    pub fn counters(&self) -> RunCounters {
        self.counters
    }

    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    pub fn settings(&self) -> &ScheduleSettings {
        &self.settings
    }

    /// Selects and executes one action. Errors and panics are contained here, except
    /// configuration errors, which are returned and stop the bot.
    pub async fn step(&mut self) -> Result<StepOutcome> {
        let entry = self.table.select(&mut self.rng);
        let name = entry.name.clone();
        let action = entry.action.clone();
        info!("Selected action: {name}");

        let outcome = match AssertUnwindSafe(action.execute(&mut self.rng))
            .catch_unwind()
            .await
        {
            Ok(Ok(result)) => {
                match &result {
                    ExecutionResult::Success { .. } => info!("{name} {result}"),
                    ExecutionResult::Failed { .. } => warn!("{name} {result}"),
                    ExecutionResult::Skipped { .. } => info!("{name} {result}"),
                }
                self.counters.record(&result);
                StepOutcome::Completed(result)
            }
            Ok(Err(e)) if e.is_fatal() => {
                error!("Fatal error in {name}: {e}");
                return Err(e);
            }
            Ok(Err(e)) => {
                error!("Unexpected error in {name}: {e}");
                self.counters.record_error();
                StepOutcome::Errored(e.to_string())
            }
            Err(panic) => {
                let msg = panic_message(&*panic);
                error!("{name} panicked: {msg}");
                self.counters.record_error();
                StepOutcome::Errored(msg)
            }
        };

        self.iterations += 1;
        if self.iterations % self.settings.summary_every == 0 {
            info!(
                "Summary after {} actions: {}",
                self.iterations, self.counters
            );
            self.counters.reset();
        }
        Ok(outcome)
    }

    fn next_wait(&mut self) -> Duration {
        let min = self.settings.min_wait.as_millis() as u64;
        let max = self.settings.max_wait.as_millis() as u64;
        Duration::from_millis(self.rng.gen_range(min..=max))
    }

    async fn sleep(&self, duration: Duration) -> Result<()> {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(Error::Cancelled),
            _ = tokio::time::sleep(duration) => Ok(()),
        }
    }

    /// Runs actions until `deadline` or the per-window budget is reached.
    /// Returns the number of actions that were not skipped.
    pub async fn run_window(&mut self, deadline: Instant) -> Result<u64> {
        let cancel = self.cancel.clone();
        let mut actions = 0;
        let mut consecutive_skips = 0;

        while Instant::now() < deadline {
            if let Some(max) = self.settings.max_actions_per_window {
                if actions >= max {
                    info!("Bot has completed {actions} transactions in this window.");
                    break;
                }
            }

            let outcome = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(Error::Cancelled),
                outcome = self.step() => outcome?,
            };

            let pause = match outcome {
                StepOutcome::Errored(_) => {
                    actions += 1;
                    consecutive_skips = 0;
                    info!(
                        "Backing off for {} seconds",
                        self.settings.error_backoff.as_secs()
                    );
                    self.settings.error_backoff
                }
                StepOutcome::Completed(res) if res.is_skipped() => {
                    consecutive_skips += 1;
                    if consecutive_skips < MAX_CONSECUTIVE_SKIPS {
                        continue;
                    }
                    consecutive_skips = 0;
                    self.next_wait()
                }
                StepOutcome::Completed(_) => {
                    actions += 1;
                    consecutive_skips = 0;
                    let wait = self.next_wait();
                    info!("Waiting {} seconds before next action...", wait.as_secs());
                    wait
                }
            };
            let remaining = deadline.saturating_duration_since(Instant::now());
            self.sleep(pause.min(remaining)).await?;
        }
        Ok(actions)
    }

    /// Alternates active windows with idle time until cancelled.
    pub async fn run(&mut self) -> Result<()> {
        match self.run_windows().await {
            Err(Error::Cancelled) => {
                info!(
                    "Shutting down after {} actions ({} since last summary)",
                    self.iterations, self.counters
                );
                Ok(())
            }
            res => res,
        }
    }

    async fn run_windows(&mut self) -> Result<()> {
        loop {
            let plan = WindowPlan::new(
                (self.clock)(),
                self.settings.window,
                self.settings.period,
            );
            info!(
                "Starting operational window until {} ({} minutes)",
                plan.end.to_rfc3339(),
                plan.length().as_secs() / 60
            );
            let deadline = Instant::now()
                .checked_add(plan.length())
                .ok_or_else(|| Error::config("operational window is too long"))?;
            let actions = self.run_window(deadline).await?;

            let idle = plan.idle_after((self.clock)());
            if idle.is_zero() {
                info!("Window finished with {actions} actions. Starting next window");
                continue;
            }
            info!(
                "Window finished with {actions} actions. Sleeping until {} ({} seconds)",
                plan.resume.to_rfc3339(),
                idle.as_secs()
            );
            self.sleep(idle).await?;
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(msg) = panic.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_owned()
    }
}
