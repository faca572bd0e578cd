//! # Bus Countdown
//!
//! Computes how long the rider has until they need to be at the stop.
//!
//! ## Algorithm
//! 1. Today's bus time is the configured `HH:MM` on today's date
//! 2. The ready-by buffer is subtracted (the board counts down to "be ready", not to
//!    the bus itself)
//! 3. If the late-bus table has a row for today and this bus, its delay is added back
//! 4. The remaining whole seconds are shown as `"<m>m <s>s"`; zero or less shows the
//!    configured [`NoCountdownPolicy`] text instead
//!
//! ## Late-Bus Table
//! The district publishes delays as an HTML table. Column 0 is the date, column 1 the
//! bus number(s), column 4 the delay in minutes, columns 5 and 6 the reason and details.
//! Rows that cannot be understood are skipped; they never fail the countdown. The delay
//! cell is read from its leading digits (`"15 min"` is 15), and anything over a day is
//! treated as a typo.

use crate::error::FetchError;
use crate::fallback::NoCountdownPolicy;
use crate::LateBusRecord;
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use scraper::{Html, Selector};

const DATE_COLUMN: usize = 0;
const BUS_COLUMN: usize = 1;
const MINUTES_COLUMN: usize = 4;
const REASON_COLUMN: usize = 5;
const DETAILS_COLUMN: usize = 6;

/// Largest delay or buffer, in minutes, taken at face value.
pub const MAX_OFFSET_MINUTES: i64 = 24 * 60;

/// Result of a countdown computation, before it becomes slide text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Countdown {
    /// Time left until the (possibly delayed) ready-by time
    Remaining {
        seconds: i64,
        late: Option<LateBusRecord>,
    },
    /// The ready-by time has passed
    Elapsed(NoCountdownPolicy),
}

impl Countdown {
    /// Multi-line slide text.
    ///
    /// # Example
    /// ```
    /// use morning_board_lib::bus::Countdown;
    ///
    /// let countdown = Countdown::Remaining { seconds: 180, late: None };
    /// assert_eq!(countdown.to_text(), "Bus arrives in 3m 0s");
    /// ```
    pub fn to_text(&self) -> String {
        match self {
            Countdown::Remaining { seconds, late } => {
                let mut text = format!("Bus arrives in {}", format_remaining(*seconds));
                if let Some(record) = late {
                    text.push_str(&format!("\nRunning {} min late", record.late_minutes));
                    for line in [&record.reason, &record.details] {
                        if !line.trim().is_empty() {
                            text.push('\n');
                            text.push_str(line.trim());
                        }
                    }
                }
                text
            }
            Countdown::Elapsed(policy) => policy.message().to_string(),
        }
    }
}

/// `"<minutes>m <seconds>s"` for a positive number of seconds.
fn format_remaining(seconds: i64) -> String {
    format!("{}m {}s", seconds / 60, seconds % 60)
}

/// Work out the countdown for `now`.
///
/// `late` is whatever the late-bus lookup found for today, if anything. A failed
/// lookup is passed in as `None`. A buffer or delay too large to apply is ignored.
pub fn compute_countdown(
    now: NaiveDateTime,
    expected: NaiveTime,
    buffer_minutes: i64,
    late: Option<LateBusRecord>,
    policy: NoCountdownPolicy,
) -> Countdown {
    let bus_time = now.date().and_time(expected);
    let ready_by = Duration::try_minutes(buffer_minutes)
        .and_then(|buffer| bus_time.checked_sub_signed(buffer))
        .unwrap_or(bus_time);

    let (target, late) = match late {
        Some(record) => match Duration::try_minutes(record.late_minutes)
            .and_then(|delay| ready_by.checked_add_signed(delay))
        {
            Some(delayed) => (delayed, Some(record)),
            None => (ready_by, None),
        },
        None => (ready_by, None),
    };

    let seconds = (target - now).num_seconds();
    if seconds <= 0 {
        return Countdown::Elapsed(policy);
    }
    Countdown::Remaining { seconds, late }
}

/// Pull the text of every `<td>` out of every `<tr>` in an HTML document.
///
/// Rows with no data cells (header rows built from `<th>`) are dropped.
pub fn parse_table(html: &str) -> Result<Vec<Vec<String>>, FetchError> {
    let doc = Html::parse_document(html);
    let row_sel = Selector::parse("tr").map_err(|e| FetchError::Parse(e.to_string()))?;
    let cell_sel = Selector::parse("td").map_err(|e| FetchError::Parse(e.to_string()))?;

    let rows = doc
        .select(&row_sel)
        .map(|row| {
            row.select(&cell_sel)
                .map(|cell| cell.text().collect::<String>().trim().to_string())
                .collect::<Vec<_>>()
        })
        .filter(|cells| !cells.is_empty())
        .collect();
    Ok(rows)
}

/// First row dated `today` whose bus column mentions `bus_number`.
///
/// Bus numbers match case-insensitively as a substring, so a row listing
/// `"12, 14"` matches bus `14`. An empty bus number matches nothing.
pub fn find_late_record(
    rows: &[Vec<String>],
    today: NaiveDate,
    bus_number: &str,
) -> Option<LateBusRecord> {
    let wanted = bus_number.trim().to_lowercase();
    if wanted.is_empty() {
        return None;
    }

    rows.iter().find_map(|row| {
        let date = parse_sheet_date(row.get(DATE_COLUMN)?)?;
        if date != today {
            return None;
        }
        if !row.get(BUS_COLUMN)?.to_lowercase().contains(&wanted) {
            return None;
        }
        let late_minutes = parse_minutes(row.get(MINUTES_COLUMN)?)?;
        Some(LateBusRecord {
            late_minutes,
            reason: cell(row, REASON_COLUMN),
            details: cell(row, DETAILS_COLUMN),
        })
    })
}

fn cell(row: &[String], column: usize) -> String {
    row.get(column).map(|c| c.trim().to_string()).unwrap_or_default()
}

/// Leading digits of a delay cell, within `0..=MAX_OFFSET_MINUTES`.
fn parse_minutes(text: &str) -> Option<i64> {
    let text = text.trim();
    let end = text
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(text.len());
    text[..end]
        .parse::<i64>()
        .ok()
        .filter(|minutes| *minutes <= MAX_OFFSET_MINUTES)
}

/// Dates in the sheet show up as `2026-10-16`, `2026-10-16T06:40:00`, or `10/16/2026`.
fn parse_sheet_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if let Some(iso) = text.get(..10) {
        if let Ok(date) = NaiveDate::parse_from_str(iso, "%Y-%m-%d") {
            return Some(date);
        }
    }
    NaiveDate::parse_from_str(text, "%m/%d/%Y").ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
    }

    fn at(hour: u32, minute: u32, second: u32) -> NaiveDateTime {
        today().and_hms_opt(hour, minute, second).unwrap()
    }

    fn seven_oh_three() -> NaiveTime {
        NaiveTime::from_hms_opt(7, 3, 0).unwrap()
    }

    fn late(minutes: i64) -> LateBusRecord {
        LateBusRecord {
            late_minutes: minutes,
            reason: "Traffic".to_string(),
            details: String::new(),
        }
    }

    #[test]
    fn test_countdown_subtracts_buffer() {
        let countdown = compute_countdown(
            at(6, 50, 0),
            seven_oh_three(),
            10,
            None,
            NoCountdownPolicy::Placeholder,
        );
        assert_eq!(
            countdown,
            Countdown::Remaining {
                seconds: 180,
                late: None
            }
        );
        assert_eq!(countdown.to_text(), "Bus arrives in 3m 0s");
    }

    #[test]
    fn test_late_record_pushes_target_back() {
        let countdown = compute_countdown(
            at(6, 50, 0),
            seven_oh_three(),
            10,
            Some(late(5)),
            NoCountdownPolicy::Placeholder,
        );
        assert_eq!(
            countdown,
            Countdown::Remaining {
                seconds: 480,
                late: Some(late(5))
            }
        );
        assert_eq!(
            countdown.to_text(),
            "Bus arrives in 8m 0s\nRunning 5 min late\nTraffic"
        );
    }

    #[test]
    fn test_seconds_are_remainder() {
        let countdown = compute_countdown(
            at(6, 48, 37),
            seven_oh_three(),
            10,
            None,
            NoCountdownPolicy::Placeholder,
        );
        assert_eq!(countdown.to_text(), "Bus arrives in 4m 23s");
    }

    #[test]
    fn test_past_target_uses_policy_text() {
        for now in [at(6, 53, 0), at(6, 53, 1), at(9, 0, 0)] {
            let placeholder = compute_countdown(
                now,
                seven_oh_three(),
                10,
                None,
                NoCountdownPolicy::Placeholder,
            );
            assert_eq!(placeholder, Countdown::Elapsed(NoCountdownPolicy::Placeholder));
            assert_eq!(placeholder.to_text(), crate::fallback::BUS_PLACEHOLDER);

            let no_bus =
                compute_countdown(now, seven_oh_three(), 10, None, NoCountdownPolicy::NoBus);
            assert_eq!(no_bus.to_text(), "No bus today");
        }
    }

    fn sheet_rows() -> Vec<Vec<String>> {
        let rows: [&[&str]; 5] = [
            &["2026-10-15", "14", "", "", "20", "Snow", ""],
            &["not a date", "14", "", "", "5", "", ""],
            &["2026-10-16", "Bus 22", "", "", "7", "Driver", ""],
            &["2026-10-16", "route 12b, 14A", "", "", "x", "Typo row", ""],
            &["10/16/2026", "Route 12B", "", "", "9", "Flat tire", "Sub bus en route"],
        ];
        rows.iter()
            .map(|row| row.iter().map(|c| c.to_string()).collect())
            .collect()
    }

    #[test]
    fn test_find_late_record_matches_today_and_bus() {
        let record = find_late_record(&sheet_rows(), today(), "12b").unwrap();
        assert_eq!(record.late_minutes, 9);
        assert_eq!(record.reason, "Flat tire");
        assert_eq!(record.details, "Sub bus en route");
    }

    #[test]
    fn test_find_late_record_skips_other_days_and_buses() {
        assert_eq!(find_late_record(&sheet_rows(), today(), "31"), None);
        assert_eq!(
            find_late_record(&sheet_rows(), today(), "22").map(|r| r.late_minutes),
            Some(7)
        );
        // Yesterday's row for bus 14 must not leak into today
        assert_eq!(find_late_record(&sheet_rows(), today(), "14"), None);
        assert_eq!(find_late_record(&sheet_rows(), today(), "  "), None);
    }

    #[test]
    fn test_short_rows_are_skipped() {
        let rows = vec![vec!["2026-10-16".to_string(), "12".to_string()]];
        assert_eq!(find_late_record(&rows, today(), "12"), None);

        let rows = vec![["2026-10-16", "12", "", "", "3"]
            .iter()
            .map(|c| c.to_string())
            .collect::<Vec<_>>()];
        let record = find_late_record(&rows, today(), "12").unwrap();
        assert_eq!(record.late_minutes, 3);
        assert!(record.reason.is_empty());
    }

    #[test]
    fn test_absurd_delay_rows_are_skipped() {
        let rows: Vec<Vec<String>> = [
            ["2026-10-16", "12", "", "", "9999999999999", "Typo", ""],
            ["2026-10-16", "12", "", "", "15 min", "Snow", ""],
        ]
        .iter()
        .map(|row| row.iter().map(|c| c.to_string()).collect())
        .collect();

        let record = find_late_record(&rows, today(), "12").unwrap();
        assert_eq!(record.late_minutes, 15);
        assert_eq!(record.reason, "Snow");
        assert_eq!(find_late_record(&rows[..1], today(), "12"), None);
    }

    #[test]
    fn test_unrepresentable_offsets_do_not_panic() {
        let countdown = compute_countdown(
            at(6, 50, 0),
            seven_oh_three(),
            10,
            Some(late(i64::MAX)),
            NoCountdownPolicy::Placeholder,
        );
        assert_eq!(countdown.to_text(), "Bus arrives in 3m 0s");

        let countdown = compute_countdown(
            at(6, 50, 0),
            seven_oh_three(),
            i64::MIN,
            None,
            NoCountdownPolicy::Placeholder,
        );
        assert_eq!(countdown.to_text(), "Bus arrives in 13m 0s");
    }

    #[test]
    fn test_parse_minutes_leading_digits() {
        assert_eq!(parse_minutes(" 15 min"), Some(15));
        assert_eq!(parse_minutes("5"), Some(5));
        assert_eq!(parse_minutes("1440"), Some(1440));
        assert_eq!(parse_minutes("1441"), None);
        assert_eq!(parse_minutes("-5"), None);
        assert_eq!(parse_minutes("x"), None);
        assert_eq!(parse_minutes(""), None);
    }

    #[test]
    fn test_parse_table_reads_cells() {
        let html = r#"
            <html><body><table>
              <tr><th>Date</th><th>Bus</th></tr>
              <tr><td>2026-10-16</td><td> 12 </td><td></td><td></td><td>5</td><td><b>Traffic</b></td><td></td></tr>
            </table></body></html>
        "#;
        let rows = parse_table(html).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0][1], "12");
        assert_eq!(rows[0][5], "Traffic");
        assert_eq!(
            find_late_record(&rows, today(), "12").map(|r| r.late_minutes),
            Some(5)
        );
    }
}
