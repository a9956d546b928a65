use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::data::model::{Carrier, KnownFrequency, SampleGrid};

use super::observer::ScoreObserver;
use super::scorer::ColumnScorer;

pub const DEFAULT_STEP_HZ: i64 = 5_000;
pub const DEFAULT_EXCLUSION_HZ: i64 = 10_000;

// ---------------------------------------------------------------------------
// Candidate ordering
// ---------------------------------------------------------------------------

/// Heap entry: highest score first, lowest frequency first among equals.
#[derive(Debug, Clone, Copy)]
struct Ranked(Carrier);

impl PartialEq for Ranked {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Ranked {}

impl PartialOrd for Ranked {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Ranked {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0
            .score
            .total_cmp(&other.0.score)
            .then_with(|| other.0.freq.cmp(&self.0.freq))
    }
}

/// Working set of one discovery run.
struct DiscoveryState {
    accepted: Vec<Carrier>,
    pool: BinaryHeap<Ranked>,
}

impl DiscoveryState {
    fn is_excluded(&self, freq: i64, known: &[KnownFrequency], radius: i64) -> bool {
        let radius = radius.max(0) as u64;
        let near = |center: i64| center.abs_diff(freq) <= radius;
        known.iter().any(|k| near(k.freq)) || self.accepted.iter().any(|c| near(c.freq))
    }
}

// ---------------------------------------------------------------------------
// PeakDiscovery
// ---------------------------------------------------------------------------

/// Greedy peak picking across the band with an exclusion radius around
/// known and already accepted carriers.
#[derive(Debug, Clone)]
pub struct PeakDiscovery<'a> {
    scorer: &'a ColumnScorer,
    step_hz: i64,
    exclusion_hz: i64,
    target_count: usize,
}

impl<'a> PeakDiscovery<'a> {
    /// `step_hz` must be positive.
    pub fn new(scorer: &'a ColumnScorer, step_hz: i64, exclusion_hz: i64, target_count: usize) -> Self {
        PeakDiscovery {
            scorer,
            step_hz,
            exclusion_hz,
            target_count,
        }
    }

    /// Candidate frequencies: every multiple of `step_hz` inside the band.
    pub fn candidates(&self, grid: &SampleGrid) -> impl Iterator<Item = i64> {
        let step = self.step_hz.max(1);
        let start = (grid.hz_low() / step as f64).ceil() as i64 * step;
        let end = grid.hz_high().floor() as i64;
        (start..=end).step_by(step as usize)
    }

    /// Discover up to `target_count - known_active` carriers, in the order
    /// they were accepted.
    ///
    /// `known_active` is the number of slots already filled by active known
    /// frequencies; when it reaches `target_count` nothing is scored.
    pub fn discover(
        &self,
        grid: &SampleGrid,
        known: &[KnownFrequency],
        known_active: usize,
        observer: &dyn ScoreObserver,
    ) -> Vec<Carrier> {
        if known_active >= self.target_count {
            return Vec::new();
        }

        let mut state = DiscoveryState {
            accepted: Vec::new(),
            pool: BinaryHeap::new(),
        };
        for freq in self.candidates(grid) {
            // Candidates are generated inside the band, so scoring cannot fail.
            let Ok(stats) = self.scorer.score(grid, freq) else {
                continue;
            };
            observer.observe(&stats, grid.integrations());
            state.pool.push(Ranked(Carrier {
                freq,
                score: stats.peak_to_noise,
            }));
        }

        while known_active + state.accepted.len() < self.target_count {
            let Some(Ranked(candidate)) = state.pool.pop() else {
                break;
            };
            if state.is_excluded(candidate.freq, known, self.exclusion_hz) {
                continue;
            }
            state.accepted.push(candidate);
        }

        state.accepted
    }
}
