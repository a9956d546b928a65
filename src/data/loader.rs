use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result, bail};
use chrono::NaiveDateTime;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use super::model::{ColorToken, KnownFrequency, Row, SampleGrid};
use crate::error::Error;

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load a sample grid from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`  – rtl_power output (`date, time, Hz low, Hz high, Hz step, samples, dB, ...`)
/// * `.json` – `{ "hz_low": .., "hz_high": .., "rows": [[..], ..] }`
pub fn load_grid(path: &Path) -> Result<SampleGrid> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let grid = match ext.as_str() {
        "csv" => {
            let file = std::fs::File::open(path).context("opening rtl_power CSV")?;
            read_rtl_power(file)?
        }
        "json" => {
            let text = std::fs::read_to_string(path).context("reading JSON grid")?;
            parse_grid_json(&text)?
        }
        other => bail!("Unsupported grid extension: .{other}"),
    };

    info!(
        "loaded {}: {} rows x {} bins, {:.0}..{:.0} Hz",
        path.display(),
        grid.integrations(),
        grid.bins(),
        grid.hz_low(),
        grid.hz_high()
    );
    Ok(grid)
}

/// Load a known-frequency list (`<Hz> <color>` per line).
pub fn load_known_frequencies(
    path: &Path,
    policy: ParsePolicy,
    sentinel: &ColorToken,
) -> Result<Vec<KnownFrequency>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading known list {}", path.display()))?;
    let known = parse_known_frequencies(&text, policy, sentinel)
        .with_context(|| format!("parsing known list {}", path.display()))?;
    debug!("{} known frequencies from {}", known.len(), path.display());
    Ok(known)
}

// ---------------------------------------------------------------------------
// Known-frequency list
// ---------------------------------------------------------------------------

/// How forgiving the known-list parser is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParsePolicy {
    /// A line whose frequency does not parse reads as 0 and ends the list.
    #[default]
    Lenient,
    /// Blank lines are skipped; a bad frequency or a missing color is an
    /// error.  An explicit `0` still ends the list.
    Strict,
}

/// Parse `<integer-Hz> <color-token>` lines.  Entries whose color equals
/// `sentinel` are flagged as sentinels.
pub fn parse_known_frequencies(
    text: &str,
    policy: ParsePolicy,
    sentinel: &ColorToken,
) -> crate::error::Result<Vec<KnownFrequency>> {
    let mut known = Vec::new();

    for (idx, line) in text.lines().enumerate() {
        let mut tokens = line.split_whitespace();
        let first = tokens.next();
        let color = tokens.next();

        let freq = match policy {
            ParsePolicy::Lenient => first.and_then(|t| t.parse::<i64>().ok()).unwrap_or(0),
            ParsePolicy::Strict => {
                let Some(tok) = first else {
                    continue;
                };
                tok.parse::<i64>().map_err(|_| malformed(idx, line))?
            }
        };
        if freq == 0 {
            break;
        }

        let color = match (color, policy) {
            (Some(c), _) => ColorToken::new(c),
            (None, ParsePolicy::Lenient) => ColorToken::default(),
            (None, ParsePolicy::Strict) => return Err(malformed(idx, line)),
        };
        let is_sentinel = color.matches(sentinel);
        known.push(KnownFrequency {
            freq,
            color,
            is_sentinel,
        });
    }

    Ok(known)
}

fn malformed(idx: usize, line: &str) -> Error {
    Error::MalformedInput {
        line: idx + 1,
        content: line.to_string(),
    }
}

// ---------------------------------------------------------------------------
// JSON grid
// ---------------------------------------------------------------------------

/// Expected JSON schema:
///
/// ```json
/// {
///   "hz_low": 88000000.0,
///   "hz_high": 108000000.0,
///   "time_start": "2024-05-01T12:00:00",
///   "time_end": "2024-05-01T13:00:00",
///   "rows": [[-80.1, -79.5, ...], ...]
/// }
/// ```
#[derive(Debug, Deserialize)]
struct GridFile {
    hz_low: f64,
    hz_high: f64,
    #[serde(default)]
    time_start: Option<NaiveDateTime>,
    #[serde(default)]
    time_end: Option<NaiveDateTime>,
    rows: Vec<Vec<f64>>,
}

pub fn parse_grid_json(text: &str) -> Result<SampleGrid> {
    let file: GridFile = serde_json::from_str(text).context("parsing JSON grid")?;
    let rows = file.rows.into_iter().map(Row::new).collect();
    let grid = SampleGrid::new(file.hz_low, file.hz_high, rows)?;

    Ok(match (file.time_start, file.time_end) {
        (Some(start), Some(end)) => grid.with_time_range(start, end),
        _ => grid,
    })
}

// ---------------------------------------------------------------------------
// rtl_power CSV
// ---------------------------------------------------------------------------

/// One rtl_power line: a hop covering `[hz_low, hz_high)`.
struct Segment {
    stamp: NaiveDateTime,
    hz_low: f64,
    hz_high: f64,
    samples: Vec<f64>,
}

/// Read rtl_power output.  Consecutive hops sharing a timestamp form one
/// sweep (one grid row), ordered by `hz_low`.  A trailing sweep with fewer
/// bins than the first one is an interrupted capture and is dropped.
pub fn read_rtl_power<R: Read>(reader: R) -> Result<SampleGrid> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut sweeps: Vec<Vec<Segment>> = Vec::new();
    let mut current: Vec<Segment> = Vec::new();

    for (line_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV line {}", line_no + 1))?;
        let segment = parse_segment(&record).with_context(|| format!("CSV line {}", line_no + 1))?;

        // Same-second sweeps are told apart by a repeated hop.
        let new_sweep = current.first().is_some_and(|head| {
            head.stamp != segment.stamp || current.iter().any(|s| s.hz_low == segment.hz_low)
        });
        if new_sweep {
            sweeps.push(std::mem::take(&mut current));
        }
        current.push(segment);
    }
    if !current.is_empty() {
        sweeps.push(current);
    }
    for sweep in &mut sweeps {
        sweep.sort_by(|a, b| a.hz_low.total_cmp(&b.hz_low));
    }

    let bins = |sweep: &[Segment]| sweep.iter().map(|s| s.samples.len()).sum::<usize>();
    if sweeps.len() > 1 {
        let expected = bins(&sweeps[0]);
        let last = &sweeps[sweeps.len() - 1];
        if bins(last) < expected {
            warn!(
                "dropping incomplete final sweep at {} ({} of {expected} bins)",
                last[0].stamp,
                bins(last)
            );
            sweeps.pop();
        }
    }

    let (Some(first), Some(last)) = (sweeps.first(), sweeps.last()) else {
        bail!("rtl_power CSV contains no sweeps");
    };
    let hz_low = first[0].hz_low;
    let hz_high = first[first.len() - 1].hz_high;
    let time_start = first[0].stamp;
    let time_end = last[0].stamp;

    let rows: Vec<Row> = sweeps
        .iter()
        .map(|sweep| Row::new(sweep.iter().flat_map(|s| s.samples.iter().copied()).collect()))
        .collect();

    let grid = SampleGrid::new(hz_low, hz_high, rows)?;
    Ok(grid.with_time_range(time_start, time_end))
}

fn parse_segment(record: &csv::StringRecord) -> Result<Segment> {
    if record.len() < 7 {
        bail!("expected at least 7 fields, got {}", record.len());
    }
    let field = |i: usize| record.get(i).unwrap_or("");
    let stamp = NaiveDateTime::parse_from_str(
        &format!("{} {}", field(0), field(1)),
        "%Y-%m-%d %H:%M:%S",
    )
    .with_context(|| format!("bad timestamp '{} {}'", field(0), field(1)))?;

    let number = |i: usize, name: &str| -> Result<f64> {
        field(i)
            .parse::<f64>()
            .with_context(|| format!("{name}: '{}' is not a number", field(i)))
    };
    let hz_low = number(2, "Hz low")?;
    let hz_high = number(3, "Hz high")?;

    let samples = (6..record.len())
        .map(|i| number(i, "dB"))
        .collect::<Result<Vec<f64>>>()?;

    Ok(Segment {
        stamp,
        hz_low,
        hz_high,
        samples,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn red() -> ColorToken {
        ColorToken::from("#FF0000")
    }

    #[test]
    fn lenient_list_stops_at_zero_or_garbage() {
        let text = "100000000 #00FF00\n101000000 #ff0000\nabc #0000FF\n102000000 #FFFFFF\n";
        let known = parse_known_frequencies(text, ParsePolicy::Lenient, &red()).unwrap();

        assert_eq!(known.len(), 2);
        assert_eq!(known[0].freq, 100_000_000);
        assert_eq!(known[0].color, ColorToken::from("#00FF00"));
        assert!(!known[0].is_sentinel);
        assert!(known[1].is_sentinel);
    }

    #[test]
    fn lenient_list_stops_at_blank_line() {
        let text = "100000000 #00FF00\n\n101000000 #00FF00\n";
        let known = parse_known_frequencies(text, ParsePolicy::Lenient, &red()).unwrap();
        assert_eq!(known.len(), 1);
    }

    #[test]
    fn lenient_list_tolerates_missing_color() {
        let known = parse_known_frequencies("100000000\n", ParsePolicy::Lenient, &red()).unwrap();
        assert_eq!(known[0].color, ColorToken::default());
    }

    #[test]
    fn strict_list_reports_bad_lines() {
        let text = "100000000 #00FF00\n\nabc #0000FF\n";
        let err = parse_known_frequencies(text, ParsePolicy::Strict, &red()).unwrap_err();
        assert_eq!(
            err,
            Error::MalformedInput {
                line: 3,
                content: "abc #0000FF".into()
            }
        );

        let err = parse_known_frequencies("100000000\n", ParsePolicy::Strict, &red()).unwrap_err();
        assert!(matches!(err, Error::MalformedInput { line: 1, .. }));
    }

    #[test]
    fn strict_list_skips_blanks_and_honours_zero() {
        let text = "100000000 #00FF00\n\n101000000 #0000FF\n0\n102000000 #FFFFFF\n";
        let known = parse_known_frequencies(text, ParsePolicy::Strict, &red()).unwrap();
        let freqs: Vec<i64> = known.iter().map(|k| k.freq).collect();
        assert_eq!(freqs, vec![100_000_000, 101_000_000]);
    }

    #[test]
    fn rtl_power_hops_are_stitched_into_rows() {
        let csv = "\
2024-05-01, 12:00:00, 1000, 1004, 1, 10, -80, -81, -82, -83
2024-05-01, 12:00:00, 1004, 1008, 1, 10, -70, -71, -72, -73
2024-05-01, 12:00:10, 1000, 1004, 1, 10, -60, -61, -62, -63
2024-05-01, 12:00:10, 1004, 1008, 1, 10, -50, -51, -52, -53
";
        let grid = read_rtl_power(csv.as_bytes()).unwrap();

        assert_eq!(grid.integrations(), 2);
        assert_eq!(grid.bins(), 8);
        assert_eq!(grid.hz_low(), 1000.0);
        assert_eq!(grid.hz_high(), 1008.0);
        assert_eq!(grid.rows()[0].sample(4), -70.0);
        assert_eq!(grid.rows()[1].sample(7), -53.0);
        let start = grid.time_start().unwrap();
        let end = grid.time_end().unwrap();
        assert_eq!((end - start).num_seconds(), 10);
    }

    #[test]
    fn rtl_power_hops_are_sorted_within_a_sweep() {
        let csv = "\
2024-05-01, 12:00:00, 1004, 1008, 1, 10, -70, -71, -72, -73
2024-05-01, 12:00:00, 1000, 1004, 1, 10, -80, -81, -82, -83
2024-05-01, 12:00:10, 1004, 1008, 1, 10, -50, -51, -52, -53
2024-05-01, 12:00:10, 1000, 1004, 1, 10, -60, -61, -62, -63
";
        let grid = read_rtl_power(csv.as_bytes()).unwrap();

        assert_eq!(grid.integrations(), 2);
        assert_eq!(grid.hz_low(), 1000.0);
        assert_eq!(grid.hz_high(), 1008.0);
        assert_eq!(grid.rows()[0].sample(0), -80.0);
        assert_eq!(grid.rows()[1].sample(4), -50.0);
    }

    #[test]
    fn rtl_power_drops_interrupted_final_sweep() {
        let csv = "\
2024-05-01, 12:00:00, 1000, 1004, 1, 10, -80, -81, -82, -83
2024-05-01, 12:00:00, 1004, 1008, 1, 10, -70, -71, -72, -73
2024-05-01, 12:00:10, 1000, 1004, 1, 10, -60, -61, -62, -63
2024-05-01, 12:00:10, 1004, 1008, 1, 10, -50, -51, -52, -53
2024-05-01, 12:00:20, 1000, 1004, 1, 10, -40, -41, -42, -43
";
        let grid = read_rtl_power(csv.as_bytes()).unwrap();

        assert_eq!(grid.integrations(), 2);
        assert_eq!(grid.bins(), 8);
        let end = grid.time_end().unwrap();
        assert_eq!((end - grid.time_start().unwrap()).num_seconds(), 10);
    }

    #[test]
    fn rtl_power_rejects_short_lines() {
        let csv = "2024-05-01, 12:00:00, 1000, 1004, 1\n";
        assert!(read_rtl_power(csv.as_bytes()).is_err());
        assert!(read_rtl_power("".as_bytes()).is_err());
    }

    #[test]
    fn json_grid_round_trips_band_and_times() {
        let text = r#"{
            "hz_low": 0.0,
            "hz_high": 3000.0,
            "time_start": "2024-05-01T12:00:00",
            "time_end": "2024-05-01T12:30:00",
            "rows": [[-80, -70, -60], [-81, -71, -61], [-82, -72, -62]]
        }"#;
        let grid = parse_grid_json(text).unwrap();
        assert_eq!(grid.bins(), 3);
        assert_eq!(grid.integrations(), 3);
        assert_eq!(grid.column_for(2500).unwrap(), 2);
        assert!(grid.time_start().is_some());
    }

    #[test]
    fn json_grid_with_ragged_rows_fails() {
        let text = r#"{ "hz_low": 0.0, "hz_high": 10.0, "rows": [[1, 2], [3]] }"#;
        assert!(parse_grid_json(text).is_err());
    }
}
