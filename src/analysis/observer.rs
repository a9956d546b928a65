use log::{debug, log_enabled, Level};

use super::scorer::ColumnStats;

/// Receives every column scored during classification and discovery.
///
/// Purely observational: nothing an observer does can change a result.
pub trait ScoreObserver {
    fn observe(&self, stats: &ColumnStats, integrations: usize);
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl ScoreObserver for NoopObserver {
    fn observe(&self, _stats: &ColumnStats, _integrations: usize) {}
}

/// Emits one debug record per scored column through the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogObserver;

impl ScoreObserver for LogObserver {
    fn observe(&self, s: &ColumnStats, integrations: usize) {
        if !log_enabled!(Level::Debug) {
            return;
        }
        debug!(
            "freq F={} lvl={:.0} min={:.0} max={:.0} mean={:.0} jumps={} est_pkts={:.0} \
             high_ratio={:.0}% noise_lvl={:.0} snr={:.0} snr_max={:.0}",
            s.freq,
            s.level,
            s.min,
            s.max,
            s.mean,
            s.transition_count,
            s.estimated_packets(integrations),
            100.0 * s.occupancy(),
            s.noise_floor,
            s.snr,
            s.peak_to_noise,
        );
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::cell::RefCell;

    use super::*;

    /// Records the frequency of every observed column, in call order.
    #[derive(Default)]
    pub struct RecordingObserver {
        pub seen: RefCell<Vec<i64>>,
    }

    impl ScoreObserver for RecordingObserver {
        fn observe(&self, stats: &ColumnStats, _integrations: usize) {
            self.seen.borrow_mut().push(stats.freq);
        }
    }
}
