//! # Board Session Controller
//!
//! Owns everything that changes from tick to tick and decides, for each tick, whether
//! the board gets a slide, gets its old content back, or is left alone.
//!
//! ## State Machine
//!
//! | Phase | Tick inside window | Tick outside window |
//! |---|---|---|
//! | `OutsideWindow` | read board into snapshot (unless one is held), render slide, → `InsideWindow` | write held snapshot back, else nothing |
//! | `InsideWindow` | render slide | → `OutsideWindow`, write held snapshot back |
//!
//! - The board is read **once** per contiguous in-window period, on its first tick.
//!   A failed or empty read means that period runs without a snapshot; it is not
//!   retried on later ticks, because by then the board is showing our own slides.
//! - The snapshot is written back on the first out-of-window tick. If that write
//!   fails the snapshot is kept and the next tick tries again.
//! - The rotation cursor lives for the whole process and advances after every
//!   rendered slide, whether or not the board accepted the write.

use crate::bus::{compute_countdown, find_late_record};
use crate::config::{BusConfig, Config};
use crate::display::DisplaySink;
use crate::fallback::{LUNCH_ERROR, WEATHER_ERROR};
use crate::lunch::lunch_text;
use crate::rotation::{SlideKind, SlideSequence};
use crate::schedule::{is_service_time, ServiceWindow, WindowPolicy};
use crate::sources::DataSources;
use crate::{BoardContent, LateBusRecord};
use chrono::{NaiveDate, NaiveDateTime};
use log::{debug, info, warn};

/// Where the controller is in the service-window cycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    OutsideWindow,
    InsideWindow,
}

/// Mutable session data, carried from one tick to the next.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionState {
    /// Board content captured when the current (or last) window opened
    pub snapshot: Option<BoardContent>,
    /// Index of the next slide to show
    pub cursor: usize,
    pub phase: Phase,
}

/// What a single tick ended up doing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// Outside the window with nothing to restore
    Idle,
    /// A slide was rendered; `written` is false if the board rejected it
    Rendered { slide: SlideKind, written: bool },
    /// The snapshot was sent back; on failure it is kept for the next tick
    Restored { written: bool },
}

/// Drives one board through its daily service window.
pub struct BoardSession<S, D> {
    window: ServiceWindow,
    policy: WindowPolicy,
    slides: SlideSequence,
    bus: BusConfig,
    sources: S,
    display: D,
    state: SessionState,
}

impl<S: DataSources, D: DisplaySink> BoardSession<S, D> {
    pub fn new(config: &Config, sources: S, display: D) -> Self {
        Self {
            window: config.service.window,
            policy: config.service.policy,
            slides: config.slides.clone(),
            bus: config.bus.clone(),
            sources,
            display,
            state: SessionState::default(),
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    /// Run one tick as of `now` (local time).
    pub async fn tick(&mut self, now: NaiveDateTime) -> TickOutcome {
        if is_service_time(now, &self.window, &self.policy) {
            if self.state.phase == Phase::OutsideWindow {
                info!("Service window {} is open", self.window);
                self.state.phase = Phase::InsideWindow;
                if self.state.snapshot.is_none() {
                    self.state.snapshot = self.capture().await;
                }
            }
            self.show_next_slide(now).await
        } else {
            if self.state.phase == Phase::InsideWindow {
                info!("Service window {} is closed", self.window);
                self.state.phase = Phase::OutsideWindow;
            }
            match self.state.snapshot.take() {
                Some(snapshot) => self.restore(snapshot).await,
                None => {
                    debug!("Outside service window, nothing to restore");
                    TickOutcome::Idle
                }
            }
        }
    }

    async fn capture(&self) -> Option<BoardContent> {
        match self.display.read().await {
            Ok(Some(content)) => {
                info!("Captured current board content");
                Some(content)
            }
            Ok(None) => {
                warn!("Board returned no current content; nothing will be restored");
                None
            }
            Err(e) => {
                warn!("Failed to read board, continuing without a snapshot: {e}");
                None
            }
        }
    }

    async fn restore(&mut self, snapshot: BoardContent) -> TickOutcome {
        match self.display.write(&snapshot).await {
            Ok(()) => {
                info!("Restored board content from before the service window");
                TickOutcome::Restored { written: true }
            }
            Err(e) => {
                warn!("Failed to restore board, will retry next tick: {e}");
                self.state.snapshot = Some(snapshot);
                TickOutcome::Restored { written: false }
            }
        }
    }

    async fn show_next_slide(&mut self, now: NaiveDateTime) -> TickOutcome {
        let (slide, next) = self.slides.next_slide(self.state.cursor);
        let text = self.render(slide, now).await;
        self.state.cursor = next;

        let written = match self.display.write(&BoardContent::Text(text)).await {
            Ok(()) => {
                info!("Showing {slide} slide");
                true
            }
            Err(e) => {
                warn!("Failed to write {slide} slide: {e}");
                false
            }
        };
        TickOutcome::Rendered { slide, written }
    }

    /// Slide text for `slide`; data failures become fallback text, never errors.
    async fn render(&self, slide: SlideKind, now: NaiveDateTime) -> String {
        match slide {
            SlideKind::Date => date_text(now),
            SlideKind::Weather => match self.sources.weather().await {
                Ok(report) => report.to_text(),
                Err(e) => {
                    warn!("Weather fetch failed: {e}");
                    WEATHER_ERROR.to_string()
                }
            },
            SlideKind::Lunch => match self.sources.lunch_calendar().await {
                Ok(events) => lunch_text(&events, now.date()),
                Err(e) => {
                    warn!("Lunch calendar fetch failed: {e}");
                    LUNCH_ERROR.to_string()
                }
            },
            SlideKind::Bus => {
                let late = self.late_bus(now.date()).await;
                compute_countdown(
                    now,
                    self.bus.expected_time,
                    self.bus.buffer_minutes,
                    late,
                    self.bus.no_countdown,
                )
                .to_text()
            }
        }
    }

    /// Today's delay for the configured bus; any failure means "not late".
    async fn late_bus(&self, today: NaiveDate) -> Option<LateBusRecord> {
        let number = self.bus.number.as_deref()?;
        match self.sources.late_bus_table().await {
            Ok(rows) => {
                let record = find_late_record(&rows, today, number);
                if let Some(record) = &record {
                    info!("Bus {number} is {} min late", record.late_minutes);
                }
                record
            }
            Err(e) => {
                warn!("Late-bus lookup failed, assuming on time: {e}");
                None
            }
        }
    }
}

/// Greeting with the long-form date and 24h time.
///
/// # Example
/// ```
/// use chrono::NaiveDate;
/// use morning_board_lib::session::date_text;
///
/// let now = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap().and_hms_opt(6, 5, 0).unwrap();
/// assert_eq!(
///     date_text(now),
///     "Good morning.\nToday is Friday, October 16\nand the time is 06:05."
/// );
/// ```
pub fn date_text(now: NaiveDateTime) -> String {
    format!(
        "Good morning.\nToday is {}\nand the time is {}.",
        now.format("%A, %B %-d"),
        now.format("%H:%M")
    )
}
