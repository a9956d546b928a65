use crate::data::model::SampleGrid;
use crate::error::Result;

// ---------------------------------------------------------------------------
// ColumnStats – everything measured about one column
// ---------------------------------------------------------------------------

/// Statistics of one frequency column over the interior rows of a grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnStats {
    /// Frequency that was scored.
    pub freq: i64,
    pub column: usize,
    /// Threshold actually used to split low/high samples.
    pub level: f64,
    /// `true` when the caller's level fell outside `[min, max]` and the
    /// column mean was used instead.
    pub threshold_adapted: bool,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    /// Mean of the samples below `level`, 0 if there are none.
    pub noise_floor: f64,
    /// Mean of the samples at or above `level`, 0 if there are none.
    pub high_mean: f64,
    pub snr: f64,
    /// `max - noise_floor`; the ranking score.
    pub peak_to_noise: f64,
    pub transition_count: usize,
    pub low_count: usize,
    pub high_count: usize,
}

impl ColumnStats {
    /// Fraction of interior samples at or above the threshold.
    pub fn occupancy(&self) -> f64 {
        let total = self.low_count + self.high_count;
        if total == 0 {
            0.0
        } else {
            self.high_count as f64 / total as f64
        }
    }

    /// Rough number of bursts in a column of `integrations` rows, assuming
    /// a burst spans about three rows.
    pub fn estimated_packets(&self, integrations: usize) -> f64 {
        self.occupancy() * integrations as f64 / 3.0
    }

    fn empty(freq: i64, column: usize, level: f64) -> Self {
        ColumnStats {
            freq,
            column,
            level,
            threshold_adapted: false,
            min: 0.0,
            max: 0.0,
            mean: 0.0,
            noise_floor: 0.0,
            high_mean: 0.0,
            snr: 0.0,
            peak_to_noise: 0.0,
            transition_count: 0,
            low_count: 0,
            high_count: 0,
        }
    }
}

// ---------------------------------------------------------------------------
// ColumnScorer
// ---------------------------------------------------------------------------

/// Scores how strongly a column is occupied relative to its own noise.
///
/// The first and last rows of the grid are treated as capture edge
/// artifacts and never contribute.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnScorer {
    level: f64,
    delta: f64,
}

impl ColumnScorer {
    /// `level` splits signal from noise; `delta` is the minimum jump between
    /// consecutive samples counted as a transition.
    pub fn new(level: f64, delta: f64) -> Self {
        ColumnScorer { level, delta }
    }

    pub fn level(&self) -> f64 {
        self.level
    }

    pub fn delta(&self) -> f64 {
        self.delta
    }

    /// Score the column holding `freq`.
    pub fn score(&self, grid: &SampleGrid, freq: i64) -> Result<ColumnStats> {
        let column = grid.column_for(freq)?;
        let rows = grid.rows();
        if rows.len() < 3 {
            return Ok(ColumnStats::empty(freq, column, self.level));
        }
        let interior: Vec<f64> = rows[1..rows.len() - 1]
            .iter()
            .map(|row| row.sample(column))
            .collect();

        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        let mut sum = 0.0;
        for &s in &interior {
            min = min.min(s);
            max = max.max(s);
            sum += s;
        }
        let mean = sum / interior.len() as f64;

        let transition_count = interior
            .windows(2)
            .filter(|pair| (pair[1] - pair[0]).abs() > self.delta)
            .count();

        // A static level that cannot split this column is replaced by its mean.
        let threshold_adapted = self.level > max || self.level < min;
        let level = if threshold_adapted { mean } else { self.level };

        let (mut low_sum, mut low_count) = (0.0, 0usize);
        let (mut high_sum, mut high_count) = (0.0, 0usize);
        for &s in &interior {
            if s < level {
                low_sum += s;
                low_count += 1;
            } else {
                high_sum += s;
                high_count += 1;
            }
        }
        let noise_floor = if low_count > 0 { low_sum / low_count as f64 } else { 0.0 };
        let high_mean = if high_count > 0 { high_sum / high_count as f64 } else { 0.0 };
        let snr = if low_count > 0 && high_count > 0 {
            high_mean - noise_floor
        } else {
            0.0
        };

        Ok(ColumnStats {
            freq,
            column,
            level,
            threshold_adapted,
            min,
            max,
            mean,
            noise_floor,
            high_mean,
            snr,
            peak_to_noise: max - noise_floor,
            transition_count,
            low_count,
            high_count,
        })
    }
}
