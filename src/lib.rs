//! Carrier scoring and discovery over a time × frequency waterfall.
//!
//! The [`analysis`] core is pure: it reads a [`SampleGrid`], scores columns,
//! classifies caller-known frequencies and discovers the strongest
//! unclaimed carriers.  Loading, rendering and logging live around it.

pub mod analysis;
pub mod annotate;
pub mod color;
pub mod config;
pub mod data;
pub mod error;
pub mod render;

pub use annotate::{AnnotationPlan, Annotator};
pub use config::AnalysisConfig;
pub use data::model::{Carrier, ColorToken, KnownFrequency, Row, SampleGrid};
pub use error::{Error, Result};
