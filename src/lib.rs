//! # Morning Board Core Library
//!
//! This library drives a split-flap message board through a short morning
//! "service window". While the window is open, the board cycles through a fixed
//! list of informational slides (date/time, weather, school lunch, bus countdown),
//! one slide per poll tick. When the window closes, whatever the board showed
//! before the window opened is put back.
//!
//! ## Design Philosophy
//!
//! ### Pure Core, External Edges
//! - **Pure decisions**: window evaluation ([`schedule`]), rotation ([`rotation`]) and
//!   countdown arithmetic ([`bus`]) are plain functions of their inputs, including "now"
//! - **Traits at the I/O seams**: network data sources ([`sources::DataSources`]) and the
//!   board itself ([`display::DisplaySink`]) are traits, so the session controller can be
//!   driven tick-by-tick in tests with in-memory doubles
//! - **Explicit state**: the snapshot and the rotation cursor live in
//!   [`session::SessionState`], owned by the controller, never in globals
//!
//! ### Failure Policy
//! A morning board that goes blank is worse than one that says "Error fetching weather
//! data". Every per-slide fetch failure becomes a static fallback string
//! ([`fallback`]), and every tick still writes something to the board.
//!
//! ### Data Flow
//! 1. **Poll loop** ([`poll`]): wakes every 30–60 s and runs exactly one tick
//! 2. **Session** ([`session`]): window check → snapshot / render / restore
//! 3. **Slides**: one of four content producers, each fail-open to a fallback string
//! 4. **Board**: the text is composed into a character grid and written
//!
//! ## Core Types
//! - [`BoardContent`]: what the board shows, either text or a pre-encoded grid
//! - [`LateBusRecord`]: a same-day delay annotation for the configured bus

// Module declarations
pub mod bus;
pub mod config;
pub mod display;
pub mod error;
pub mod fallback;
pub mod lunch;
pub mod poll;
pub mod rotation;
pub mod schedule;
pub mod session;
pub mod sources;
pub mod weather;

/// Content understood by the display sink.
///
/// A board can be handed either free text, which the sink composes into a centered
/// layout, or a grid of vendor character codes (one `u8` per flap). Snapshots read
/// back from the board are always grids, so restoring one bypasses composition.
///
/// # Example
/// ```
/// use morning_board_lib::BoardContent;
///
/// let text = BoardContent::text("Good morning.");
/// assert_eq!(text.as_text(), Some("Good morning."));
///
/// let grid = BoardContent::Grid(vec![vec![0; 22]; 6]);
/// assert!(grid.as_text().is_none());
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BoardContent {
    /// Multi-line text, laid out by the sink
    Text(String),
    /// Rows of character codes, written verbatim
    Grid(Vec<Vec<u8>>),
}

impl BoardContent {
    pub fn text(message: impl Into<String>) -> Self {
        BoardContent::Text(message.into())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            BoardContent::Text(message) => Some(message),
            BoardContent::Grid(_) => None,
        }
    }
}

/// A same-day delay reported for the configured bus.
///
/// Sourced from one row of the late-bus table: column 4 is the delay in
/// minutes, columns 5 and 6 are free-text reason and details. Recomputed on
/// every bus slide, never cached.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LateBusRecord {
    /// Minutes the bus is running behind
    pub late_minutes: i64,
    /// Short reason, e.g. "Traffic"
    pub reason: String,
    /// Longer free-text details, often empty
    pub details: String,
}
