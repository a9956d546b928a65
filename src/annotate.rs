use log::info;

use crate::analysis::{
    Classifier, ColumnScorer, Origin, PeakDiscovery, RenderDirective, ScoreObserver,
};
use crate::config::AnalysisConfig;
use crate::data::model::{Carrier, KnownFrequency, SampleGrid};

// ---------------------------------------------------------------------------
// AnnotationPlan – what one run decided
// ---------------------------------------------------------------------------

/// Output of one annotation run, independent of rendering.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnnotationPlan {
    /// Known directives in list order, then discovered ones in acceptance
    /// order.
    pub directives: Vec<RenderDirective>,

    /// Active known frequencies, sentinels excluded.
    pub known_active: usize,

    /// Carriers found by discovery.
    pub discovered: Vec<Carrier>,
}

impl AnnotationPlan {
    /// Frequencies worth reporting: active known ones, then discoveries.
    pub fn reported_frequencies(&self) -> Vec<i64> {
        self.directives
            .iter()
            .filter(|d| d.active)
            .map(|d| d.freq)
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Annotator
// ---------------------------------------------------------------------------

/// Runs classification and discovery with a single configuration.
pub struct Annotator {
    config: AnalysisConfig,
    scorer: ColumnScorer,
}

impl Annotator {
    pub fn new(config: AnalysisConfig) -> Self {
        let scorer = ColumnScorer::new(config.level, config.delta);
        Self { config, scorer }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Classify `known`, then fill the remaining slots with discoveries.
    pub fn annotate(
        &self,
        grid: &SampleGrid,
        known: &[KnownFrequency],
        observer: &dyn ScoreObserver,
    ) -> AnnotationPlan {
        let classifier = Classifier::new(
            &self.scorer,
            self.config.active_threshold,
            self.config.colors.inactive.clone(),
        );
        let classification = classifier.classify(grid, known, observer);

        let discovery = PeakDiscovery::new(
            &self.scorer,
            self.config.step_hz,
            self.config.exclusion_hz,
            self.config.target_count,
        );
        let discovered = discovery.discover(grid, known, classification.active_count, observer);

        info!(
            "{} of {} known frequencies active, {} carriers discovered",
            classification.active_count,
            classification.directives.len(),
            discovered.len()
        );

        let mut directives = classification.directives;
        directives.extend(discovered.iter().map(|c| RenderDirective {
            freq: c.freq,
            color: self.config.colors.discovered.clone(),
            active: true,
            origin: Origin::Discovered,
            score: c.score,
        }));

        AnnotationPlan {
            directives,
            known_active: classification.active_count,
            discovered,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::NoopObserver;
    use crate::data::model::{ColorToken, Row};

    /// 0..200 kHz, 1 kHz bins, bursts at 30 kHz (+40), 100 kHz (+30), 170 kHz (+20).
    fn grid() -> SampleGrid {
        let rows = (0..10)
            .map(|r| {
                let mut samples = vec![-80.0; 200];
                if (3..=6).contains(&r) {
                    samples[30] = -40.0;
                    samples[100] = -50.0;
                    samples[170] = -60.0;
                }
                Row::new(samples)
            })
            .collect();
        SampleGrid::new(0.0, 200_000.0, rows).unwrap()
    }

    fn config(target_count: usize) -> AnalysisConfig {
        AnalysisConfig {
            level: -65.0,
            target_count,
            ..AnalysisConfig::default()
        }
    }

    #[test]
    fn known_then_discovered() {
        let known = [
            KnownFrequency::new(100_000, "#00FF00"),
            KnownFrequency::new(140_000, "#0000FF"),
        ];
        let plan = Annotator::new(config(3)).annotate(&grid(), &known, &NoopObserver);

        assert_eq!(plan.known_active, 1);
        let discovered: Vec<i64> = plan.discovered.iter().map(|c| c.freq).collect();
        assert_eq!(discovered, vec![30_000, 170_000]);

        let origins: Vec<Origin> = plan.directives.iter().map(|d| d.origin).collect();
        assert_eq!(
            origins,
            vec![Origin::Known, Origin::Known, Origin::Discovered, Origin::Discovered]
        );
        assert_eq!(plan.directives[1].color, ColorToken::from("#FFFFFF"));
        assert_eq!(plan.directives[2].color, ColorToken::from("#FF00FF"));
        assert_eq!(plan.reported_frequencies(), vec![100_000, 30_000, 170_000]);
    }

    #[test]
    fn sentinel_does_not_consume_a_slot() {
        let known = [KnownFrequency::sentinel(100_000, "#FF0000")];
        let plan = Annotator::new(config(1)).annotate(&grid(), &known, &NoopObserver);

        assert_eq!(plan.known_active, 0);
        assert_eq!(plan.discovered.len(), 1);
        assert_eq!(plan.discovered[0].freq, 30_000);
    }

    #[test]
    fn active_known_list_fills_every_slot() {
        let known = [
            KnownFrequency::new(30_000, "#00FF00"),
            KnownFrequency::new(100_000, "#00FF00"),
        ];
        let plan = Annotator::new(config(2)).annotate(&grid(), &known, &NoopObserver);
        assert_eq!(plan.known_active, 2);
        assert!(plan.discovered.is_empty());
    }
}
