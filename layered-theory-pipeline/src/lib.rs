//! Constraint-gated annotation pipeline for `layered-theory`.
//!
//! A [`Pipeline`] runs [`Stage`]s strictly in order. Each stage turns the
//! previous [`DocumentTheory`](layered_theory::DocumentTheory) plus the
//! constraints addressed to it into a new theory; its [`GatedStage`] then
//! checks every constraint against that output and applies the stage's
//! [`Tolerance`].
//!
//! ```
//! use layered_theory::{Constraint, ParseSpanConstraint};
//! use layered_theory_pipeline::{CollectingSink, DocumentSource, Pipeline};
//!
//! let pipeline = Pipeline::standard();
//! let source = DocumentSource::new("doc-1", "The boy ran.").with_constraints(
//!     "parser",
//!     vec![Constraint::ExactParseSpan(ParseSpanConstraint::new(4, 10))],
//! );
//!
//! let mut sink = CollectingSink::new();
//! let summary = pipeline.run(vec![source], &mut sink);
//! assert_eq!(summary.processed, 1);
//!
//! let parse = sink.theories[0].sentences()[0].parse().unwrap();
//! assert_eq!(parse.to_string(), "(S The (X boy ran) .)");
//! ```

mod config;
mod error;
mod pipeline;
mod sink;
mod stage;
pub mod stages;
mod tolerance;

pub use config::{PipelineConfig, StageConfig};
pub use error::{ConfigError, DocumentFailure};
pub use pipeline::{DocumentSource, Pipeline, RunSummary, StageConstraints};
pub use sink::{CollectingSink, Sink};
pub use stage::Stage;
pub use tolerance::{GatedStage, StageStats, Tolerance};
