use crate::data::model::{ColorToken, KnownFrequency, SampleGrid};

use super::observer::ScoreObserver;
use super::scorer::ColumnScorer;

/// Score above which a known frequency counts as active.
pub const DEFAULT_ACTIVE_THRESHOLD: f64 = 10.0;

// ---------------------------------------------------------------------------
// RenderDirective – what the renderer should draw for one frequency
// ---------------------------------------------------------------------------

/// Where a directive came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Known,
    Discovered,
}

/// One vertical marker for the rendering collaborator.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderDirective {
    pub freq: i64,
    pub color: ColorToken,
    pub active: bool,
    pub origin: Origin,
    /// Peak-to-noise of the frequency's column.
    pub score: f64,
}

// ---------------------------------------------------------------------------
// Classifier
// ---------------------------------------------------------------------------

/// Result of classifying a known-frequency list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Classification {
    /// One directive per in-band known frequency, in input order.
    pub directives: Vec<RenderDirective>,
    /// Active entries, sentinels excluded.
    pub active_count: usize,
}

/// Decides which caller-supplied frequencies are currently occupied.
#[derive(Debug, Clone)]
pub struct Classifier<'a> {
    scorer: &'a ColumnScorer,
    active_threshold: f64,
    inactive_color: ColorToken,
}

impl<'a> Classifier<'a> {
    pub fn new(scorer: &'a ColumnScorer, active_threshold: f64, inactive_color: ColorToken) -> Self {
        Classifier {
            scorer,
            active_threshold,
            inactive_color,
        }
    }

    /// Classify every in-band entry of `known`; out-of-band entries are
    /// dropped without error.
    pub fn classify(
        &self,
        grid: &SampleGrid,
        known: &[KnownFrequency],
        observer: &dyn ScoreObserver,
    ) -> Classification {
        let mut result = Classification::default();

        for entry in known {
            let Ok(stats) = self.scorer.score(grid, entry.freq) else {
                continue;
            };
            observer.observe(&stats, grid.integrations());

            let active = stats.peak_to_noise > self.active_threshold;
            if active && !entry.is_sentinel {
                result.active_count += 1;
            }
            let color = if active {
                entry.color.clone()
            } else {
                self.inactive_color.clone()
            };

            result.directives.push(RenderDirective {
                freq: entry.freq,
                color,
                active,
                origin: Origin::Known,
                score: stats.peak_to_noise,
            });
        }

        result
    }
}
