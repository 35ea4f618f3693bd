use std::time::Duration;

use chrono::{Local, NaiveDateTime, NaiveTime};
use tracing::{debug, error, info};

use crate::pipeline::Pipeline;

pub(crate) const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(60);


/// Fires once a day at a fixed local time.
#[derive(Debug, Clone)]
pub(crate) struct DailyTrigger {
    at: NaiveTime,
    next_run: NaiveDateTime,
}


impl DailyTrigger {
    pub(crate) fn new(at: NaiveTime, now: NaiveDateTime) -> Self {
        Self { at, next_run: next_occurrence(at, now) }
    }

    pub(crate) fn next_run(&self) -> NaiveDateTime {
        self.next_run
    }

    pub(crate) fn is_due(&self, now: NaiveDateTime) -> bool {
        now >= self.next_run
    }

    /// Moves the trigger to the first occurrence after `now`.
    ///
    /// Occurrences that passed while nobody was checking are dropped.
    pub(crate) fn reschedule(&mut self, now: NaiveDateTime) {
        self.next_run = next_occurrence(self.at, now);
    }
}


/// The first time of day `at` strictly after `now`
fn next_occurrence(at: NaiveTime, now: NaiveDateTime) -> NaiveDateTime {
    let today = now.date().and_time(at);
    if today > now {
        today
    } else {
        today + chrono::Duration::days(1)
    }
}


#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SchedulerState {
    Idle,
    RunningPipeline,
}


pub(crate) struct Scheduler {
    trigger: DailyTrigger,
    state: SchedulerState,
}


impl Scheduler {
    pub(crate) fn new(trigger: DailyTrigger) -> Self {
        Self { trigger, state: SchedulerState::Idle }
    }

    async fn run_pipeline(&mut self, pipeline: &Pipeline) {
        self.state = SchedulerState::RunningPipeline;
        debug!(state = ?self.state, "Scheduler state changed");
        if let Err(e) = pipeline.run().await {
            error!(error = %e, "Failed to deliver the job report");
        }
        self.state = SchedulerState::Idle;
        debug!(state = ?self.state, "Scheduler state changed");
    }

    /// Runs the pipeline if the trigger is due at `now`. Returns whether it ran.
    pub(crate) async fn run_pending(&mut self, pipeline: &Pipeline, now: NaiveDateTime) -> bool {
        if !self.trigger.is_due(now) {
            return false;
        }
        self.run_pipeline(pipeline).await;
        self.trigger.reschedule(now);
        info!(next_run = %self.trigger.next_run(), "Waiting for next run");
        true
    }

    /// Runs the pipeline straight away, due or not, then registers the next
    /// daily run relative to `now` as read once that run has finished.
    pub(crate) async fn start<F: Fn() -> NaiveDateTime>(&mut self, pipeline: &Pipeline, now: F) {
        self.run_pipeline(pipeline).await;
        self.trigger.reschedule(now());
        info!(next_run = %self.trigger.next_run(), "Scheduler started, waiting for next run");
    }

    /// Runs the pipeline now, then every day at the trigger time. Never returns.
    pub(crate) async fn run_forever(mut self, pipeline: &Pipeline, poll_interval: Duration) {
        self.start(pipeline, || Local::now().naive_local()).await;

        loop {
            tokio::time::sleep(poll_interval).await;
            let now = Local::now().naive_local();
            debug!(%now, "Checking schedule");
            self.run_pending(pipeline, now).await;
        }
    }
}
