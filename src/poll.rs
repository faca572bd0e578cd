//! Fixed-interval driver for a [`BoardSession`].
//!
//! One tick at a time: the next tick is not started until the previous one, including
//! all of its network I/O, has finished. If a tick overruns the interval the schedule
//! slips rather than bursting to catch up.

use crate::config::PollConfig;
use crate::display::DisplaySink;
use crate::session::{BoardSession, TickOutcome};
use crate::sources::DataSources;
use chrono::{Local, NaiveDateTime};
use log::debug;
use std::time::Duration;
use tokio::time::MissedTickBehavior;

/// Source of "now" for the session.
pub trait Clock {
    fn now(&self) -> NaiveDateTime;
}

/// The host's local wall clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

pub struct PollLoop {
    interval: Duration,
}

impl PollLoop {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    pub fn from_config(config: &PollConfig) -> Self {
        Self::new(Duration::from_secs(config.interval_secs))
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Tick `session` on every interval, starting immediately.
    ///
    /// Runs forever when `max_ticks` is `None`; otherwise stops after that many ticks
    /// and returns how many ran.
    pub async fn run<S, D, C>(
        &self,
        session: &mut BoardSession<S, D>,
        clock: &C,
        max_ticks: Option<u64>,
    ) -> u64
    where
        S: DataSources,
        D: DisplaySink,
        C: Clock,
    {
        let mut timer = tokio::time::interval(self.interval);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut ticks = 0;
        while max_ticks.map_or(true, |max| ticks < max) {
            timer.tick().await;
            let outcome = session.tick(clock.now()).await;
            ticks += 1;
            if outcome != TickOutcome::Idle {
                debug!("Tick {ticks}: {outcome:?}");
            }
        }
        ticks
    }
}
