//! Weather slide: OpenWeather One Call response mapping and slide text.

use crate::error::FetchError;
use serde::Deserialize;

/// The handful of numbers the weather slide needs.
#[derive(Clone, Debug, PartialEq)]
pub struct WeatherReport {
    /// Current temperature, °F
    pub temperature: f64,
    /// Short condition text, e.g. "light rain"
    pub description: String,
    /// Today's high, °F
    pub high: f64,
    /// Today's low, °F
    pub low: f64,
}

impl WeatherReport {
    /// Three-line slide text with whole degrees, halves rounded away from zero.
    ///
    /// # Example
    /// ```
    /// use morning_board_lib::weather::WeatherReport;
    ///
    /// let report = WeatherReport {
    ///     temperature: 41.6,
    ///     description: "overcast clouds".to_string(),
    ///     high: 55.2,
    ///     low: 38.9,
    /// };
    /// assert_eq!(
    ///     report.to_text(),
    ///     "Today's Weather\n42°F, overcast clouds\nHigh: 55°F, Low: 39°F"
    /// );
    /// ```
    pub fn to_text(&self) -> String {
        format!(
            "Today's Weather\n{:.0}°F, {}\nHigh: {:.0}°F, Low: {:.0}°F",
            self.temperature.round(),
            self.description,
            self.high.round(),
            self.low.round()
        )
    }
}

// -- One Call wire format (only the fields we read) --

#[derive(Deserialize)]
struct OneCall {
    current: Current,
    daily: Vec<Daily>,
}

#[derive(Deserialize)]
struct Current {
    temp: f64,
    weather: Vec<Condition>,
}

#[derive(Deserialize)]
struct Condition {
    description: String,
}

#[derive(Deserialize)]
struct Daily {
    temp: DailyTemp,
}

#[derive(Deserialize)]
struct DailyTemp {
    max: f64,
    min: f64,
}

/// Map a One Call JSON body (imperial units) onto a [`WeatherReport`].
pub fn parse_one_call(body: &str) -> Result<WeatherReport, FetchError> {
    let data: OneCall = serde_json::from_str(body)?;

    let description = data
        .current
        .weather
        .into_iter()
        .next()
        .map(|c| c.description)
        .ok_or_else(|| FetchError::Parse("no current weather condition".to_string()))?;
    let today = data
        .daily
        .into_iter()
        .next()
        .ok_or_else(|| FetchError::Parse("no daily forecast".to_string()))?;

    Ok(WeatherReport {
        temperature: data.current.temp,
        description,
        high: today.temp.max,
        low: today.temp.min,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "lat": 44.98, "lon": -93.26, "timezone": "America/Chicago",
        "current": {
            "dt": 1792140000, "temp": 47.3, "humidity": 81,
            "weather": [{"id": 500, "main": "Rain", "description": "light rain", "icon": "10d"}]
        },
        "daily": [
            {"dt": 1792159200, "temp": {"day": 52.0, "min": 44.4, "max": 58.6}},
            {"dt": 1792245600, "temp": {"day": 60.0, "min": 45.0, "max": 63.0}}
        ]
    }"#;

    #[test]
    fn test_parse_one_call() {
        let report = parse_one_call(SAMPLE).unwrap();
        assert_eq!(report.description, "light rain");
        assert_eq!(report.high, 58.6);
        assert_eq!(report.low, 44.4);
        assert_eq!(
            report.to_text(),
            "Today's Weather\n47°F, light rain\nHigh: 59°F, Low: 44°F"
        );
    }

    #[test]
    fn test_half_degrees_round_up() {
        let report = WeatherReport {
            temperature: 44.5,
            description: "clear sky".to_string(),
            high: 58.5,
            low: 2.5,
        };
        assert_eq!(
            report.to_text(),
            "Today's Weather\n45°F, clear sky\nHigh: 59°F, Low: 3°F"
        );
    }

    #[test]
    fn test_missing_pieces_are_parse_errors() {
        let no_daily = r#"{"current": {"temp": 40.0, "weather": [{"description": "clear sky"}]}, "daily": []}"#;
        assert!(matches!(parse_one_call(no_daily), Err(FetchError::Parse(_))));

        let no_condition = r#"{"current": {"temp": 40.0, "weather": []}, "daily": [{"temp": {"min": 1.0, "max": 2.0}}]}"#;
        assert!(matches!(parse_one_call(no_condition), Err(FetchError::Parse(_))));

        assert!(matches!(
            parse_one_call(r#"{"cod": 401, "message": "Invalid API key"}"#),
            Err(FetchError::Parse(_))
        ));
    }
}
