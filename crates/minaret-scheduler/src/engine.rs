//! The daily cycle controller and scheduling loop.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use tokio::sync::{mpsc, watch};
use tracing::{error, info, warn};

use minaret_core::clock::Clock;
use minaret_core::config::ScheduleConfig;
use minaret_core::types::{Location, Notification, OnlineNotice, PrayerName, TimeOfDay};
use minaret_sources::{LocationSource, TimingSource};

use crate::anchor::next_anchor;
use crate::derive::{derive_day, DayEvents, DeriveOptions};
use crate::error::{EngineError, Result};
use crate::wheel::TimerWheel;

/// Consecutive failed refresh attempts before the engine stops retrying and
/// waits for the next anchor (~10 minutes at the default 30 s poll).
pub const MAX_REFRESH_ATTEMPTS: u32 = 20;

/// Engine settings distilled from `[schedule]` config.
#[derive(Debug, Clone)]
pub struct EngineOptions {
    pub timezone: Tz,
    pub anchor_time: TimeOfDay,
    pub poll_interval: StdDuration,
    pub derive: DeriveOptions,
}

impl EngineOptions {
    pub fn from_config(config: &ScheduleConfig) -> Result<Self> {
        let timezone: Tz = config
            .timezone
            .parse()
            .map_err(|_| EngineError::InvalidOption(format!("unknown timezone: {}", config.timezone)))?;
        let anchor_time = TimeOfDay::parse(&config.anchor_time)
            .map_err(|e| EngineError::InvalidOption(format!("anchor_time: {e}")))?;
        Ok(Self {
            timezone,
            anchor_time,
            poll_interval: StdDuration::from_secs(config.poll_interval_seconds.max(1)),
            derive: DeriveOptions {
                advance_prayers: config.advance_reminder_prayers.clone(),
                advance_offset_minutes: config.advance_offset_minutes,
            },
        })
    }
}

/// Outcome of one successful anchor cycle.
#[derive(Debug, Clone)]
pub struct CycleSummary {
    pub location: Location,
    pub armed: usize,
    pub cancelled: usize,
    pub missing: Vec<PrayerName>,
}

/// Owns the timer wheel and runs the poll loop.
///
/// Single-writer discipline: the wheel and all cycle state are touched only
/// from [`SchedulerEngine::run`]'s task (or a test driving
/// [`SchedulerEngine::poll_once`] directly), so a schedule swap is atomic
/// with respect to due-event release.
pub struct SchedulerEngine {
    options: EngineOptions,
    clock: Arc<dyn Clock>,
    location: Arc<dyn LocationSource>,
    timings: Arc<dyn TimingSource>,
    wheel: TimerWheel,
    dispatch_tx: mpsc::Sender<Notification>,
    next_anchor_at: DateTime<Utc>,
    /// `Some(failed_attempts)` while a schedule refresh is owed.
    refresh_attempts: Option<u32>,
    online_sent: bool,
}

impl SchedulerEngine {
    /// Create an engine that owes a startup refresh for the remainder of the
    /// current day.
    pub fn new(
        options: EngineOptions,
        clock: Arc<dyn Clock>,
        location: Arc<dyn LocationSource>,
        timings: Arc<dyn TimingSource>,
        dispatch_tx: mpsc::Sender<Notification>,
    ) -> Self {
        let now = clock.now_utc();
        let next_anchor_at = next_anchor(now, options.anchor_time, options.timezone);
        Self {
            options,
            clock,
            location,
            timings,
            wheel: TimerWheel::new(),
            dispatch_tx,
            next_anchor_at,
            refresh_attempts: Some(0),
            online_sent: false,
        }
    }

    /// Main loop. Polls every `poll_interval` until `shutdown` broadcasts
    /// `true`; the poll cadence bounds worst-case notification latency.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        info!(
            timezone = %self.options.timezone,
            next_anchor = %self.next_anchor_at,
            "scheduler engine started"
        );

        let mut interval = tokio::time::interval(self.options.poll_interval);
        loop {
            tokio::select! {
                _ = interval.tick() => {
                    self.poll_once().await;
                }
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        info!("scheduler engine shutting down");
                        break;
                    }
                }
            }
        }
    }

    /// One scheduler step: anchor check, owed refresh, due-event release.
    pub async fn poll_once(&mut self) {
        let now = self.clock.now_utc();

        if now >= self.next_anchor_at {
            info!(anchor = %self.next_anchor_at, "daily anchor reached");
            self.refresh_attempts.get_or_insert(0);
            self.next_anchor_at = next_anchor(now, self.options.anchor_time, self.options.timezone);
        }

        if let Some(failed) = self.refresh_attempts {
            match self.run_cycle(now).await {
                Ok(summary) => {
                    self.refresh_attempts = None;
                    info!(
                        armed = summary.armed,
                        cancelled = summary.cancelled,
                        location = %summary.location.describe(),
                        "daily schedule refreshed"
                    );
                    if !summary.missing.is_empty() {
                        warn!(missing = ?summary.missing, "schedule is partial: some prayers had no time");
                    }
                    if !self.online_sent {
                        self.online_sent = true;
                        self.send_online_notice(&summary);
                    }
                }
                Err(e) => {
                    let failed = failed + 1;
                    if failed >= MAX_REFRESH_ATTEMPTS {
                        error!(error = %e, attempts = failed, "schedule refresh abandoned until next anchor");
                        self.refresh_attempts = None;
                    } else {
                        warn!(error = %e, attempt = failed, max = MAX_REFRESH_ATTEMPTS, "schedule refresh failed, retrying next poll");
                        self.refresh_attempts = Some(failed);
                    }
                }
            }
        }

        for event in self.wheel.pop_due(now) {
            info!(event = %event.id, fires_at = %event.fires_at, "event fired");
            // try_send keeps dispatch latency and retries out of this loop.
            if self.dispatch_tx.try_send(Notification::Prayer(event)).is_err() {
                warn!("dispatch channel full or closed — notification dropped");
            }
        }
    }

    /// Resolve location, fetch today's times, derive, and swap the schedule
    /// in one cancel-all-then-arm step.
    ///
    /// Any error leaves the currently armed events untouched: a stale
    /// schedule beats an empty one.
    async fn run_cycle(&mut self, now: DateTime<Utc>) -> Result<CycleSummary> {
        let location = self.location.resolve().await?;
        let local_date = now.with_timezone(&self.options.timezone).date_naive();
        let times = self.timings.fetch_for_date(local_date, &location).await?;

        let DayEvents { events, missing } =
            derive_day(local_date, self.options.timezone, &times, now, &self.options.derive);

        let cancelled = self.wheel.cancel_all();
        let armed = self.wheel.arm(events, now);

        Ok(CycleSummary {
            location,
            armed,
            cancelled,
            missing,
        })
    }

    fn send_online_notice(&self, summary: &CycleSummary) {
        let notice = OnlineNotice {
            location: summary.location.clone(),
            advance_prayers: self.options.derive.advance_prayers.clone(),
            advance_offset_minutes: self.options.derive.advance_offset_minutes,
        };
        // Best-effort: the dispatcher sends online notices without retry.
        if self.dispatch_tx.try_send(Notification::Online(notice)).is_err() {
            warn!("dispatch channel full or closed — online notice dropped");
        }
    }

    /// Number of currently armed events (test/diagnostic hook).
    pub fn armed_len(&self) -> usize {
        self.wheel.armed_len()
    }

    /// The next daily-rebuild instant (test/diagnostic hook).
    pub fn next_anchor_at(&self) -> DateTime<Utc> {
        self.next_anchor_at
    }
}
