/// Daily trigger loop.
///
/// The scheduler polls the wall clock at a fixed interval. Each entry keeps
/// its next run time; the first tick at or after it runs the entry once and
/// moves the next run to the following trigger. A tick that lands late
/// (suspend, clock jump) still runs the pending entry, for the date it was
/// scheduled on. Runs only happen for Monday to Friday dates.
use chrono::{Datelike, Days, Local, NaiveDateTime, NaiveTime, Timelike, Weekday};
use std::future::Future;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info};

use vozbr_shared::errors::VozError;
use vozbr_shared::models::DownloadRequest;

use crate::workers::fetcher_process::FetchRunner;

/// Whether downloads run on this day of the week (Monday to Friday).
pub fn is_business_day(weekday: Weekday) -> bool {
    weekday.num_days_from_monday() < 5
}

type RequestFactory = Box<dyn Fn() -> DownloadRequest + Send + Sync>;

/// A fixed time of day paired with the request to run at that time.
pub struct ScheduleEntry {
    trigger_time: NaiveTime,
    action: RequestFactory,
}

impl ScheduleEntry {
    /// Seconds in `trigger_time` are dropped.
    pub fn daily<F>(trigger_time: NaiveTime, action: F) -> Self
    where
        F: Fn() -> DownloadRequest + Send + Sync + 'static,
    {
        let trigger_time = NaiveTime::from_hms_opt(trigger_time.hour(), trigger_time.minute(), 0)
            .unwrap_or(trigger_time);
        Self {
            trigger_time,
            action: Box::new(action),
        }
    }

    pub fn trigger_time(&self) -> NaiveTime {
        self.trigger_time
    }

    /// First run for a scheduler that starts at `now`.
    ///
    /// Today's trigger counts while its minute has not ended; later starts
    /// wait for tomorrow.
    fn first_run(&self, now: NaiveDateTime) -> NaiveDateTime {
        let today = now.date().and_time(self.trigger_time);
        if now < today + chrono::Duration::minutes(1) {
            today
        } else {
            self.tomorrow(now)
        }
    }

    /// Next trigger strictly after `now`.
    fn next_after(&self, now: NaiveDateTime) -> NaiveDateTime {
        let today = now.date().and_time(self.trigger_time);
        if now < today {
            today
        } else {
            self.tomorrow(now)
        }
    }

    fn tomorrow(&self, now: NaiveDateTime) -> NaiveDateTime {
        let date = now.date();
        date.checked_add_days(Days::new(1))
            .unwrap_or(date)
            .and_time(self.trigger_time)
    }
}

/// Runtime bookkeeping for one entry.
struct EntryState {
    entry: ScheduleEntry,
    next_run: Option<NaiveDateTime>,
}

/// What happened to a due entry during a tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Skipped(Weekday),
    Succeeded,
    Failed(String),
}

pub struct Scheduler<R> {
    runner: R,
    entries: Vec<EntryState>,
    poll_interval: Duration,
}

impl<R: FetchRunner> Scheduler<R> {
    pub fn new(runner: R, poll_interval: Duration) -> Self {
        Self {
            runner,
            entries: Vec::new(),
            poll_interval,
        }
    }

    pub fn with_entry(mut self, entry: ScheduleEntry) -> Self {
        self.entries.push(EntryState {
            entry,
            next_run: None,
        });
        self
    }

    /// Run every entry due at `now`. Returns one outcome per entry fired.
    pub async fn tick(&mut self, now: NaiveDateTime) -> Vec<RunOutcome> {
        let today = now.date();
        let mut outcomes = Vec::new();

        for i in 0..self.entries.len() {
            let state = &mut self.entries[i];
            let entry = &state.entry;
            let scheduled = *state.next_run.get_or_insert_with(|| entry.first_run(now));
            if now < scheduled {
                continue;
            }
            state.next_run = Some(state.entry.next_after(now));

            if now >= scheduled + chrono::Duration::minutes(1) {
                info!(
                    "Missed the {} trigger, running it now",
                    scheduled.format("%Y-%m-%d %H:%M")
                );
            }

            let run_date = scheduled.date();
            let weekday = run_date.weekday();
            if !is_business_day(weekday) {
                info!("{} is a weekend day ({}). Download skipped.", run_date, weekday);
                outcomes.push(RunOutcome::Skipped(weekday));
                continue;
            }

            let mut request = (self.entries[i].entry.action)();
            if run_date != today && request.target_date.is_none() {
                request = request.with_date(run_date);
            }
            let outcome = match self.execute(&request).await {
                Ok(()) => RunOutcome::Succeeded,
                Err(e) => {
                    error!("Error running download: {}", e);
                    RunOutcome::Failed(e.to_string())
                }
            };
            outcomes.push(outcome);
        }

        outcomes
    }

    async fn execute(&self, request: &DownloadRequest) -> Result<(), VozError> {
        info!("Starting Voz do Brasil download...");
        tokio::fs::create_dir_all(&request.destination_dir).await?;

        let output = self.runner.run(request).await?;
        info!("Download completed successfully!");
        if !output.stdout.is_empty() {
            info!("Output: {}", output.stdout);
        }
        if !output.stderr.is_empty() {
            debug!("Downloader diagnostics: {}", output.stderr);
        }
        Ok(())
    }

    /// Poll the local clock until `shutdown` resolves.
    ///
    /// A download in progress is awaited before shutdown is observed.
    pub async fn run_until<F: Future<Output = ()>>(&mut self, shutdown: F) {
        let mut interval = tokio::time::interval(self.poll_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    info!("Scheduler stopped by user");
                    break;
                }
                _ = interval.tick() => {
                    self.tick(Local::now().naive_local()).await;
                }
            }
        }
    }
}
