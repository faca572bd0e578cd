//! Slide kinds and strict round-robin rotation.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// The closed set of slides the board knows how to render.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SlideKind {
    /// Greeting with today's date and the current time
    Date,
    /// Current conditions plus today's high/low
    Weather,
    /// Today's school lunch menu
    Lunch,
    /// Countdown to when the rider must be at the stop
    Bus,
}

impl SlideKind {
    pub const ALL: [SlideKind; 4] = [
        SlideKind::Date,
        SlideKind::Weather,
        SlideKind::Lunch,
        SlideKind::Bus,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SlideKind::Date => "date",
            SlideKind::Weather => "weather",
            SlideKind::Lunch => "lunch",
            SlideKind::Bus => "bus",
        }
    }
}

impl fmt::Display for SlideKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SequenceError {
    #[error("unknown slide {0:?}, expected one of date, weather, lunch, bus")]
    UnknownSlide(String),

    #[error("slide sequence is empty")]
    Empty,
}

impl FromStr for SlideKind {
    type Err = SequenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        SlideKind::ALL
            .into_iter()
            .find(|kind| kind.name() == wanted)
            .ok_or_else(|| SequenceError::UnknownSlide(s.trim().to_string()))
    }
}

/// Ordered, non-empty list of slides shown in turn.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SlideSequence {
    slides: Vec<SlideKind>,
}

impl SlideSequence {
    pub fn new(slides: Vec<SlideKind>) -> Result<Self, SequenceError> {
        if slides.is_empty() {
            return Err(SequenceError::Empty);
        }
        Ok(Self { slides })
    }

    /// Parse a comma-separated list such as `"date,weather,lunch,bus"`.
    pub fn parse(list: &str) -> Result<Self, SequenceError> {
        let slides = list
            .split(',')
            .filter(|item| !item.trim().is_empty())
            .map(SlideKind::from_str)
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(slides)
    }

    pub fn len(&self) -> usize {
        self.slides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    pub fn slides(&self) -> &[SlideKind] {
        &self.slides
    }

    /// Slide at `cursor` and the cursor to use next time.
    ///
    /// A cursor that is somehow out of range is folded back into it first, so the
    /// returned cursor is always in `[0, len)`.
    ///
    /// # Example
    /// ```
    /// use morning_board_lib::rotation::{SlideKind, SlideSequence};
    ///
    /// let seq = SlideSequence::default();
    /// assert_eq!(seq.next_slide(0), (SlideKind::Date, 1));
    /// assert_eq!(seq.next_slide(3), (SlideKind::Bus, 0));
    /// ```
    pub fn next_slide(&self, cursor: usize) -> (SlideKind, usize) {
        let index = cursor % self.slides.len();
        (self.slides[index], (index + 1) % self.slides.len())
    }
}

impl Default for SlideSequence {
    fn default() -> Self {
        Self {
            slides: SlideKind::ALL.to_vec(),
        }
    }
}
