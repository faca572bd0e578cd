//! # Slide Data Sources
//!
//! Network fetches behind the weather, lunch and bus slides.
//!
//! ## Sources
//!
//! ### Weather
//! - **API**: OpenWeather One Call 2.5, imperial units, minutely/hourly excluded
//! - **Needs**: `WEATHER_LAT`, `WEATHER_LON`, `WEATHER_TOKEN`
//!
//! ### Lunch
//! - **Feed**: iCalendar export of the school meal calendar
//! - **Needs**: `LUNCH_CALENDAR_URL`
//!
//! ### Late Buses
//! - **Feed**: published HTML table (a shared spreadsheet), scraped row by row
//! - **Needs**: `LATE_BUS_SHEET_URL`
//!
//! ## Error Handling
//!
//! Every fetch returns a [`FetchError`] on failure and never retries. Deciding what
//! the board shows instead is the session controller's job. The HTTP client is built
//! with a request timeout so a hung server stalls one tick, not the whole service.

use crate::bus::parse_table;
use crate::config::Config;
use crate::error::FetchError;
use crate::lunch::{parse_ics, CalendarEvent};
use crate::weather::{parse_one_call, WeatherReport};
use std::time::Duration;

/// Read-only data behind the weather, lunch and bus slides.
#[allow(async_fn_in_trait)]
pub trait DataSources {
    /// Current conditions and today's high/low
    async fn weather(&self) -> Result<WeatherReport, FetchError>;

    /// All events in the lunch calendar feed
    async fn lunch_calendar(&self) -> Result<Vec<CalendarEvent>, FetchError>;

    /// Rows × cells of the late-bus table
    async fn late_bus_table(&self) -> Result<Vec<Vec<String>>, FetchError>;
}

impl<T: DataSources + ?Sized> DataSources for &T {
    async fn weather(&self) -> Result<WeatherReport, FetchError> {
        (**self).weather().await
    }

    async fn lunch_calendar(&self) -> Result<Vec<CalendarEvent>, FetchError> {
        (**self).lunch_calendar().await
    }

    async fn late_bus_table(&self) -> Result<Vec<Vec<String>>, FetchError> {
        (**self).late_bus_table().await
    }
}

/// [`DataSources`] backed by live HTTP endpoints.
pub struct HttpSources {
    client: reqwest::Client,
    weather_url: String,
    weather_lat: Option<String>,
    weather_lon: Option<String>,
    weather_token: Option<String>,
    lunch_url: Option<String>,
    late_bus_url: Option<String>,
}

impl HttpSources {
    pub fn new(config: &Config) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.poll.fetch_timeout_secs))
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            weather_url: config.weather.api_url.clone(),
            weather_lat: config.weather.lat.clone(),
            weather_lon: config.weather.lon.clone(),
            weather_token: config.weather.token.clone(),
            lunch_url: config.lunch.calendar_url.clone(),
            late_bus_url: config.bus.late_sheet_url.clone(),
        })
    }

    async fn get_text(&self, request: reqwest::RequestBuilder) -> Result<String, FetchError> {
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: response.url().to_string(),
            });
        }
        Ok(response.text().await?)
    }
}

impl DataSources for HttpSources {
    async fn weather(&self) -> Result<WeatherReport, FetchError> {
        let lat = required(&self.weather_lat, "WEATHER_LAT")?;
        let lon = required(&self.weather_lon, "WEATHER_LON")?;
        let token = required(&self.weather_token, "WEATHER_TOKEN")?;

        let request = self.client.get(&self.weather_url).query(&[
            ("units", "imperial"),
            ("exclude", "minutely,hourly"),
            ("lat", lat),
            ("lon", lon),
            ("appid", token),
        ]);
        let body = self.get_text(request).await?;
        parse_one_call(&body)
    }

    async fn lunch_calendar(&self) -> Result<Vec<CalendarEvent>, FetchError> {
        let url = required(&self.lunch_url, "LUNCH_CALENDAR_URL")?;
        let body = self.get_text(self.client.get(url)).await?;
        parse_ics(&body)
    }

    async fn late_bus_table(&self) -> Result<Vec<Vec<String>>, FetchError> {
        let url = required(&self.late_bus_url, "LATE_BUS_SHEET_URL")?;
        let body = self.get_text(self.client.get(url)).await?;
        parse_table(&body)
    }
}

fn required<'a>(value: &'a Option<String>, key: &'static str) -> Result<&'a str, FetchError> {
    value
        .as_deref()
        .filter(|v| !v.trim().is_empty())
        .ok_or(FetchError::NotConfigured(key))
}
