//! Session-level tests, driven tick by tick against in-memory sources and boards.


use chrono::{NaiveDate, NaiveDateTime};
use morning_board_lib::config::Config;
use morning_board_lib::error::FetchError;
use morning_board_lib::lunch::CalendarEvent;
use morning_board_lib::poll::Clock;
use morning_board_lib::sources::DataSources;
use morning_board_lib::weather::WeatherReport;
use morning_board_lib::display::DisplaySink;
use morning_board_lib::BoardContent;
use std::collections::HashMap;
use std::sync::Mutex;

/// 2026-10-16 (a Friday) at the given time.
pub fn at(hour: u32, minute: u32, second: u32) -> NaiveDateTime {
    on(16, hour, minute, second)
}

/// October 2026, given day and time.
pub fn on(day: u32, hour: u32, minute: u32, second: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 10, day)
        .unwrap()
        .and_hms_opt(hour, minute, second)
        .unwrap()
}

pub fn config(pairs: &[(&str, &str)]) -> Config {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    Config::from_lookup(|key| vars.get(key).cloned()).unwrap()
}

/// Data sources that answer from memory; `None` means "this fetch fails".
#[derive(Default)]
pub struct FakeSources {
    pub weather: Option<WeatherReport>,
    pub lunch: Option<Vec<CalendarEvent>>,
    pub late_rows: Option<Vec<Vec<String>>>,
    pub late_bus_calls: Mutex<u32>,
}

impl FakeSources {
    pub fn healthy() -> Self {
        FakeSources {
            weather: Some(WeatherReport {
                temperature: 47.0,
                description: "light rain".to_string(),
                high: 58.0,
                low: 44.0,
            }),
            lunch: Some(vec![CalendarEvent {
                start: NaiveDate::from_ymd_opt(2026, 10, 16).unwrap(),
                summary: "Lunch".to_string(),
                description: "Pizza\n\nMilk\nApple\nCookie".to_string(),
            }]),
            late_rows: Some(Vec::new()),
            late_bus_calls: Mutex::new(0),
        }
    }
}

impl DataSources for FakeSources {
    async fn weather(&self) -> Result<WeatherReport, FetchError> {
        self.weather
            .clone()
            .ok_or_else(|| FetchError::Parse("weather offline".to_string()))
    }

    async fn lunch_calendar(&self) -> Result<Vec<CalendarEvent>, FetchError> {
        self.lunch
            .clone()
            .ok_or_else(|| FetchError::Parse("calendar offline".to_string()))
    }

    async fn late_bus_table(&self) -> Result<Vec<Vec<String>>, FetchError> {
        *self.late_bus_calls.lock().unwrap() += 1;
        self.late_rows
            .clone()
            .ok_or(FetchError::NotConfigured("LATE_BUS_SHEET_URL"))
    }
}

/// Every interaction the session had with the board, in order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BoardCall {
    Read,
    Write(BoardContent),
}

/// A board that remembers what it shows and records every call.
pub struct FakeBoard {
    pub showing: Mutex<Option<BoardContent>>,
    pub calls: Mutex<Vec<BoardCall>>,
    pub fail_reads: bool,
    pub fail_writes: Mutex<bool>,
}

impl FakeBoard {
    pub fn showing(content: BoardContent) -> Self {
        FakeBoard {
            showing: Mutex::new(Some(content)),
            calls: Mutex::new(Vec::new()),
            fail_reads: false,
            fail_writes: Mutex::new(false),
        }
    }

    pub fn calls(&self) -> Vec<BoardCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn writes(&self) -> Vec<BoardContent> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                BoardCall::Write(content) => Some(content),
                BoardCall::Read => None,
            })
            .collect()
    }

    pub fn last_text(&self) -> Option<String> {
        self.writes()
            .last()
            .and_then(|content| content.as_text().map(str::to_string))
    }

    pub fn set_failing_writes(&self, failing: bool) {
        *self.fail_writes.lock().unwrap() = failing;
    }
}

impl DisplaySink for FakeBoard {
    async fn read(&self) -> Result<Option<BoardContent>, FetchError> {
        self.calls.lock().unwrap().push(BoardCall::Read);
        if self.fail_reads {
            return Err(FetchError::Status {
                status: 503,
                url: "https://board.test/".to_string(),
            });
        }
        Ok(self.showing.lock().unwrap().clone())
    }

    async fn write(&self, content: &BoardContent) -> Result<(), FetchError> {
        self.calls
            .lock()
            .unwrap()
            .push(BoardCall::Write(content.clone()));
        if *self.fail_writes.lock().unwrap() {
            return Err(FetchError::Status {
                status: 500,
                url: "https://board.test/".to_string(),
            });
        }
        *self.showing.lock().unwrap() = Some(content.clone());
        Ok(())
    }
}

/// A clock stuck at one instant.
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

/// What the board showed before the morning started.
pub fn family_message() -> BoardContent {
    BoardContent::Grid(vec![vec![8; 22]; 6])
}
