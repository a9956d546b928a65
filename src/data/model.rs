use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

// ---------------------------------------------------------------------------
// Row – one integration of the waterfall
// ---------------------------------------------------------------------------

/// A single time row: one magnitude sample (dB-like) per frequency bin.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    samples: Vec<f64>,
}

impl Row {
    pub fn new(samples: Vec<f64>) -> Self {
        Row { samples }
    }

    /// Magnitude at `column`.  Panics if `column >= bins`.
    pub fn sample(&self, column: usize) -> f64 {
        self.samples[column]
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> &[f64] {
        &self.samples
    }
}

impl From<Vec<f64>> for Row {
    fn from(samples: Vec<f64>) -> Self {
        Row::new(samples)
    }
}

// ---------------------------------------------------------------------------
// SampleGrid – the complete waterfall
// ---------------------------------------------------------------------------

/// Read-only time × frequency grid of magnitude samples.
///
/// Rows are time-ordered, oldest first.  Frequencies map linearly onto
/// columns across `[hz_low, hz_high]`.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleGrid {
    hz_low: f64,
    hz_high: f64,
    bins: usize,
    time_start: Option<NaiveDateTime>,
    time_end: Option<NaiveDateTime>,
    rows: Vec<Row>,
}

impl SampleGrid {
    /// Build a grid, checking the band edges and that every row has the same
    /// number of bins.
    pub fn new(hz_low: f64, hz_high: f64, rows: Vec<Row>) -> Result<Self> {
        if !hz_low.is_finite() || !hz_high.is_finite() {
            return Err(Error::InvalidGrid(format!(
                "band edges must be finite (got {hz_low}..{hz_high})"
            )));
        }
        if hz_low >= hz_high {
            return Err(Error::InvalidGrid(format!(
                "hz_low ({hz_low}) must be below hz_high ({hz_high})"
            )));
        }
        let bins = match rows.first() {
            Some(row) => row.len(),
            None => return Err(Error::InvalidGrid("grid has no rows".into())),
        };
        if bins == 0 {
            return Err(Error::InvalidGrid("grid rows have no bins".into()));
        }
        if let Some((i, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != bins) {
            return Err(Error::InvalidGrid(format!(
                "row {i} has {} bins, expected {bins}",
                row.len()
            )));
        }

        Ok(SampleGrid {
            hz_low,
            hz_high,
            bins,
            time_start: None,
            time_end: None,
            rows,
        })
    }

    /// Attach the scan window the rows were captured over.
    pub fn with_time_range(mut self, start: NaiveDateTime, end: NaiveDateTime) -> Self {
        self.time_start = Some(start);
        self.time_end = Some(end);
        self
    }

    pub fn hz_low(&self) -> f64 {
        self.hz_low
    }

    pub fn hz_high(&self) -> f64 {
        self.hz_high
    }

    /// Number of frequency columns.
    pub fn bins(&self) -> usize {
        self.bins
    }

    /// Number of time rows.
    pub fn integrations(&self) -> usize {
        self.rows.len()
    }

    pub fn time_start(&self) -> Option<NaiveDateTime> {
        self.time_start
    }

    pub fn time_end(&self) -> Option<NaiveDateTime> {
        self.time_end
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Width of one column in Hz.
    pub fn hz_per_bin(&self) -> f64 {
        (self.hz_high - self.hz_low) / self.bins as f64
    }

    /// Whether `freq` lies inside `[hz_low, hz_high]`.
    pub fn contains(&self, freq: i64) -> bool {
        let f = freq as f64;
        f >= self.hz_low && f <= self.hz_high
    }

    /// Column holding `freq`.  `hz_high` itself lands in the last column.
    pub fn column_for(&self, freq: i64) -> Result<usize> {
        if !self.contains(freq) {
            return Err(Error::OutOfBand {
                freq,
                hz_low: self.hz_low,
                hz_high: self.hz_high,
            });
        }
        let column = ((freq as f64 - self.hz_low) / self.hz_per_bin()).floor() as usize;
        Ok(column.min(self.bins - 1))
    }
}

// ---------------------------------------------------------------------------
// ColorToken – opaque color carried from the known list to the renderer
// ---------------------------------------------------------------------------

/// Color as written by the caller (usually `#RRGGBB`).  The core never
/// interprets it; see [`crate::color`] for parsing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColorToken(String);

impl ColorToken {
    pub fn new(token: impl Into<String>) -> Self {
        ColorToken(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-insensitive comparison, `#ff0000` equals `#FF0000`.
    pub fn matches(&self, other: &ColorToken) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }
}

impl fmt::Display for ColorToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ColorToken {
    fn from(s: &str) -> Self {
        ColorToken::new(s)
    }
}

// ---------------------------------------------------------------------------
// KnownFrequency / Carrier
// ---------------------------------------------------------------------------

/// A frequency the caller already tracks.
#[derive(Debug, Clone, PartialEq)]
pub struct KnownFrequency {
    pub freq: i64,
    pub color: ColorToken,
    /// Reserved "ignore" marker: classified normally but never counted as
    /// an active slot.
    pub is_sentinel: bool,
}

impl KnownFrequency {
    pub fn new(freq: i64, color: impl Into<ColorToken>) -> Self {
        KnownFrequency {
            freq,
            color: color.into(),
            is_sentinel: false,
        }
    }

    pub fn sentinel(freq: i64, color: impl Into<ColorToken>) -> Self {
        KnownFrequency {
            is_sentinel: true,
            ..KnownFrequency::new(freq, color)
        }
    }
}

/// A scored frequency produced during discovery.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Carrier {
    pub freq: i64,
    /// Peak-to-noise of the carrier's column.
    pub score: f64,
}
