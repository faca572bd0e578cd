//! # Board Display Sink
//!
//! The board is a 6 × 22 grid of split flaps, each showing one vendor character code.
//! Two sinks implement [`DisplaySink`]:
//!
//! - [`Vestaboard`]: the real board over its Read/Write HTTP API
//! - [`StdoutSink`]: a terminal preview for development (`BOARD_DRY_RUN=true`)
//!
//! ## Writing Text
//! Free text is never laid out locally. It is sent to the vendor compose endpoint with
//! centered justification and alignment, which answers with a ready-to-send grid;
//! that grid is then written to the board. Grids (snapshots) are written as-is.
//!
//! ## Reading
//! The Read/Write API returns the current message with its layout serialized as a JSON
//! string of rows. It is decoded back into [`BoardContent::Grid`] so it can be restored
//! verbatim later.

use crate::config::DisplayConfig;
use crate::error::FetchError;
use crate::BoardContent;
use log::info;
use serde::Deserialize;
use serde_json::json;
use std::sync::Mutex;
use std::time::Duration;

pub const BOARD_ROWS: usize = 6;
pub const BOARD_COLS: usize = 22;

const KEY_HEADER: &str = "X-Vestaboard-Read-Write-Key";

/// Somewhere slides can be shown and the previous content read back from.
#[allow(async_fn_in_trait)]
pub trait DisplaySink {
    /// What the board shows right now; `None` when it cannot say
    async fn read(&self) -> Result<Option<BoardContent>, FetchError>;

    /// Replace what the board shows
    async fn write(&self, content: &BoardContent) -> Result<(), FetchError>;
}

/// The physical board, via the vendor Read/Write API.
pub struct Vestaboard {
    client: reqwest::Client,
    api_key: String,
    api_url: String,
    compose_url: String,
}

impl Vestaboard {
    pub fn new(config: &DisplayConfig, timeout: Duration) -> Result<Self, FetchError> {
        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or(FetchError::NotConfigured("VESTABOARD_API_KEY"))?;
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            api_key,
            api_url: config.api_url.clone(),
            compose_url: config.compose_url.clone(),
        })
    }

    async fn compose(&self, text: &str) -> Result<Vec<Vec<u8>>, FetchError> {
        let body = json!({
            "components": [{
                "style": { "justify": "center", "align": "center" },
                "template": text,
            }]
        });
        let response = self
            .client
            .post(&self.compose_url)
            .header(KEY_HEADER, &self.api_key)
            .json(&body)
            .send()
            .await?;
        let response = check_status(response)?;
        let grid: Vec<Vec<u8>> = response.json().await?;
        validate_grid(&grid)?;
        Ok(grid)
    }
}

impl DisplaySink for Vestaboard {
    async fn read(&self) -> Result<Option<BoardContent>, FetchError> {
        let response = self
            .client
            .get(&self.api_url)
            .header(KEY_HEADER, &self.api_key)
            .send()
            .await?;
        let body = check_status(response)?.text().await?;
        parse_current_layout(&body)
    }

    async fn write(&self, content: &BoardContent) -> Result<(), FetchError> {
        let grid = match content {
            BoardContent::Text(text) => self.compose(text).await?,
            BoardContent::Grid(grid) => grid.clone(),
        };
        let response = self
            .client
            .post(&self.api_url)
            .header(KEY_HEADER, &self.api_key)
            .json(&grid)
            .send()
            .await?;
        check_status(response)?;
        Ok(())
    }
}

fn check_status(response: reqwest::Response) -> Result<reqwest::Response, FetchError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(FetchError::Status {
            status: status.as_u16(),
            url: response.url().to_string(),
        })
    }
}

#[derive(Deserialize)]
struct ReadResponse {
    #[serde(rename = "currentMessage")]
    current_message: Option<CurrentMessage>,
}

#[derive(Deserialize)]
struct CurrentMessage {
    layout: Option<String>,
}

/// Decode a Read/Write API `GET` body into the grid it describes.
pub fn parse_current_layout(body: &str) -> Result<Option<BoardContent>, FetchError> {
    let response: ReadResponse = serde_json::from_str(body)?;
    let Some(layout) = response.current_message.and_then(|m| m.layout) else {
        return Ok(None);
    };
    let grid: Vec<Vec<u8>> = serde_json::from_str(&layout)?;
    validate_grid(&grid)?;
    Ok(Some(BoardContent::Grid(grid)))
}

fn validate_grid(grid: &[Vec<u8>]) -> Result<(), FetchError> {
    if grid.len() != BOARD_ROWS || grid.iter().any(|row| row.len() != BOARD_COLS) {
        return Err(FetchError::Parse(format!(
            "expected a {BOARD_ROWS}x{BOARD_COLS} layout, got {} rows",
            grid.len()
        )));
    }
    Ok(())
}

/// Terminal preview sink.
///
/// Remembers the last thing written so that `read` behaves like a real board and the
/// snapshot/restore cycle can be watched end to end.
#[derive(Default)]
pub struct StdoutSink {
    last: Mutex<Option<BoardContent>>,
}

impl StdoutSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DisplaySink for StdoutSink {
    async fn read(&self) -> Result<Option<BoardContent>, FetchError> {
        Ok(self.last.lock().ok().and_then(|last| last.clone()))
    }

    async fn write(&self, content: &BoardContent) -> Result<(), FetchError> {
        println!("{}", preview(content));
        if let Ok(mut last) = self.last.lock() {
            *last = Some(content.clone());
        }
        info!("Preview written to stdout");
        Ok(())
    }
}

/// Boxed, roughly board-shaped rendering of some content.
pub fn preview(content: &BoardContent) -> String {
    let rows: Vec<String> = match content {
        BoardContent::Text(text) => text.lines().map(|l| l.to_uppercase()).collect(),
        BoardContent::Grid(grid) => grid
            .iter()
            .map(|row| row.iter().map(|&code| code_to_char(code)).collect())
            .collect(),
    };

    let width = rows
        .iter()
        .map(|r| r.chars().count())
        .max()
        .unwrap_or(0)
        .max(BOARD_COLS);
    let mut out = format!("┌{}┐\n", "─".repeat(width));
    for row in rows {
        out.push_str(&format!("│{:^width$}│\n", row, width = width));
    }
    out.push_str(&format!("└{}┘", "─".repeat(width)));
    out
}

/// Vendor character code → closest printable character.
pub fn code_to_char(code: u8) -> char {
    match code {
        0 => ' ',
        1..=26 => char::from(b'A' + code - 1),
        27..=35 => char::from(b'1' + code - 27),
        36 => '0',
        37 => '!',
        38 => '@',
        39 => '#',
        40 => '$',
        41 => '(',
        42 => ')',
        44 => '-',
        46 => '+',
        47 => '&',
        48 => '=',
        49 => ';',
        50 => ':',
        52 => '\'',
        53 => '"',
        54 => '%',
        55 => ',',
        56 => '.',
        59 => '/',
        60 => '?',
        62 => '°',
        // Solid colour tiles
        63..=71 => '█',
        _ => ' ',
    }
}
