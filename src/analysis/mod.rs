/// Scoring core: column statistics, known-frequency classification and
/// peak discovery.
///
/// Architecture:
/// ```text
///   SampleGrid + known list
///        │
///        ▼
///   ┌────────────┐
///   │  scorer     │  one column → ColumnStats (noise floor, peak-to-noise)
///   └────────────┘
///        │                        │
///        ▼                        ▼
///   ┌────────────┐         ┌────────────┐
///   │ classifier  │         │ discovery   │  greedy max-score picking
///   └────────────┘         └────────────┘
///        │                        │
///        └──────► RenderDirective ◄┘   (observer sees every ColumnStats)
/// ```

pub mod classifier;
pub mod discovery;
pub mod observer;
pub mod scorer;

pub use classifier::{Classification, Classifier, Origin, RenderDirective};
pub use discovery::PeakDiscovery;
pub use observer::{LogObserver, NoopObserver, ScoreObserver};
pub use scorer::{ColumnScorer, ColumnStats};
