//! # Configuration Management
//!
//! All settings come from environment-style key/value pairs (`SERVICE_START`,
//! `WEATHER_TOKEN`, ...). Every key has a default matching the original school-morning
//! deployment, so an empty environment still produces a working dry-run setup.
//!
//! Values that merely fail to parse (a non-numeric `POLL_INTERVAL_SECS`, a boolean
//! spelled oddly) log a warning and keep the default. Values the board cannot run
//! without being right (the service window, the slide list, the bus time) are errors.

use crate::bus::MAX_OFFSET_MINUTES;
use crate::fallback::NoCountdownPolicy;
use crate::rotation::{SequenceError, SlideSequence};
use crate::schedule::{parse_hh_mm, ServiceWindow, WindowError, WindowPolicy};
use chrono::NaiveTime;
use log::warn;
use std::str::FromStr;
use thiserror::Error;

pub const DEFAULT_WEATHER_API_URL: &str = "https://api.openweathermap.org/data/2.5/onecall";
pub const DEFAULT_LUNCH_CALENDAR_URL: &str =
    "https://mealcal.meandmybadself.com/?schoolId=EisenhowerElementaryMN&meal=Lunch";
pub const DEFAULT_VESTABOARD_API_URL: &str = "https://rw.vestaboard.com/";
pub const DEFAULT_VESTABOARD_COMPOSE_URL: &str = "https://vbml.vestaboard.com/compose";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("SERVICE_START/SERVICE_END: {0}")]
    Window(#[from] WindowError),

    #[error("SLIDES: {0}")]
    Slides(#[from] SequenceError),

    #[error("BUS_EXPECTED_TIME: {0}")]
    BusTime(WindowError),

    #[error("BUS_NO_COUNTDOWN: {0}")]
    NoCountdownPolicy(String),
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// When slides are shown
    pub service: ServiceConfig,
    /// Rotation order
    pub slides: SlideSequence,
    pub weather: WeatherConfig,
    pub lunch: LunchConfig,
    pub bus: BusConfig,
    /// Board credentials and endpoints
    pub display: DisplayConfig,
    /// Tick timing
    pub poll: PollConfig,
}

/// Service window and its override knobs
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub window: ServiceWindow,
    pub policy: WindowPolicy,
}

/// OpenWeather location and credential
#[derive(Debug, Clone)]
pub struct WeatherConfig {
    pub lat: Option<String>,
    pub lon: Option<String>,
    pub token: Option<String>,
    pub api_url: String,
}

#[derive(Debug, Clone)]
pub struct LunchConfig {
    pub calendar_url: Option<String>,
}

/// Which bus, when it comes, and where delays are published
#[derive(Debug, Clone)]
pub struct BusConfig {
    pub number: Option<String>,
    pub expected_time: NaiveTime,
    /// Minutes before the bus the rider should be ready
    pub buffer_minutes: i64,
    pub late_sheet_url: Option<String>,
    pub no_countdown: NoCountdownPolicy,
}

#[derive(Debug, Clone)]
pub struct DisplayConfig {
    pub api_key: Option<String>,
    pub api_url: String,
    pub compose_url: String,
    /// Print slides to stdout instead of touching the board
    pub dry_run: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        DisplayConfig {
            api_key: None,
            api_url: DEFAULT_VESTABOARD_API_URL.to_string(),
            compose_url: DEFAULT_VESTABOARD_COMPOSE_URL.to_string(),
            dry_run: false,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PollConfig {
    /// Seconds between ticks
    pub interval_secs: u64,
    /// Per-request HTTP timeout
    pub fetch_timeout_secs: u64,
}

impl Config {
    /// Load configuration from the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from any key → value lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let text = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_string());

        let window = ServiceWindow::parse(
            &text("SERVICE_START", "06:00"),
            &text("SERVICE_END", "07:15"),
        )?;
        let policy = WindowPolicy {
            force: parse_or("FORCE_SERVICE_TIME", get("FORCE_SERVICE_TIME"), false, parse_bool),
            weekdays_only: parse_or("WEEKDAYS_ONLY", get("WEEKDAYS_ONLY"), false, parse_bool),
        };

        let slides = SlideSequence::parse(&text("SLIDES", "date,weather,lunch,bus"))?;

        let expected_time =
            parse_hh_mm(&text("BUS_EXPECTED_TIME", "07:03")).map_err(ConfigError::BusTime)?;
        let no_countdown = match get("BUS_NO_COUNTDOWN") {
            Some(value) => value
                .parse::<NoCountdownPolicy>()
                .map_err(ConfigError::NoCountdownPolicy)?,
            None => NoCountdownPolicy::default(),
        };

        let interval_secs = parse_or(
            "POLL_INTERVAL_SECS",
            get("POLL_INTERVAL_SECS"),
            30,
            parse_positive,
        );
        let fetch_timeout_secs = parse_or(
            "FETCH_TIMEOUT_SECS",
            get("FETCH_TIMEOUT_SECS"),
            20,
            parse_positive,
        );

        Ok(Config {
            service: ServiceConfig { window, policy },
            slides,
            weather: WeatherConfig {
                lat: get("WEATHER_LAT"),
                lon: get("WEATHER_LON"),
                token: get("WEATHER_TOKEN"),
                api_url: text("WEATHER_API_URL", DEFAULT_WEATHER_API_URL),
            },
            lunch: LunchConfig {
                calendar_url: Some(text("LUNCH_CALENDAR_URL", DEFAULT_LUNCH_CALENDAR_URL)),
            },
            bus: BusConfig {
                number: get("BUS_NUMBER"),
                expected_time,
                buffer_minutes: parse_or(
                    "BUS_BUFFER_MINUTES",
                    get("BUS_BUFFER_MINUTES"),
                    10,
                    parse_buffer,
                ),
                late_sheet_url: get("LATE_BUS_SHEET_URL"),
                no_countdown,
            },
            display: DisplayConfig {
                api_key: get("VESTABOARD_API_KEY"),
                api_url: text("VESTABOARD_API_URL", DEFAULT_VESTABOARD_API_URL),
                compose_url: text("VESTABOARD_COMPOSE_URL", DEFAULT_VESTABOARD_COMPOSE_URL),
                dry_run: parse_or("BOARD_DRY_RUN", get("BOARD_DRY_RUN"), false, parse_bool),
            },
            poll: PollConfig {
                interval_secs,
                fetch_timeout_secs,
            },
        })
    }
}

/// Parse `value` if present, otherwise (or on failure) fall back to `default`.
fn parse_or<T, P>(key: &str, value: Option<String>, default: T, parse: P) -> T
where
    T: std::fmt::Debug,
    P: Fn(&str) -> Option<T>,
{
    match value {
        Some(raw) => parse(&raw).unwrap_or_else(|| {
            warn!("Invalid {key}={raw:?}, using default {default:?}");
            default
        }),
        None => default,
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn parse_buffer(value: &str) -> Option<i64> {
    value
        .trim()
        .parse::<i64>()
        .ok()
        .filter(|minutes| (0..=MAX_OFFSET_MINUTES).contains(minutes))
}

fn parse_positive(value: &str) -> Option<u64> {
    u64::from_str(value.trim()).ok().filter(|&n| n > 0)
}
