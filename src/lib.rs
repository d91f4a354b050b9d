#![doc(
    html_logo_url = "https://raw.githubusercontent.com/storyscript/layered-nlp/main/assets/layered-nlp.svg",
    issue_tracker_base_url = "https://github.com/storyscript/layered-nlp/issues/"
)]

//! Immutable document theories for constraint-driven annotation pipelines.
//!
//! A document theory is enriched layer by layer (sentences, names, parses,
//! mentions, entities, relations, events). Callers may inject [`Constraint`]s,
//! facts a stage has to realise, and check them against the theory the stage
//! returns with [`Constraint::satisfied_by`].
//!
//! ## Core Types
//!
//! - [`OffsetRange`] / [`TokenSpan`] - inclusive character and token ranges
//! - [`TokenSequence`] - the tokens of one sentence
//! - [`SynNode`] / [`Parse`] - shared, immutable constituency trees
//! - [`DocumentTheory`] / [`SentenceTheory`] - snapshots edited only through builders
//! - [`Constraint`] - closed set of constraint variants
//!
//! ## Example
//!
//! ```
//! use layered_theory::{MinimalTreeBuilder, ParseSpanConstraint, TokenSequence};
//!
//! let tokens = TokenSequence::from_text("The boy ran.", 0).unwrap();
//! let parse = MinimalTreeBuilder::new()
//!     .build(&tokens, &[ParseSpanConstraint::new(4, 10), ParseSpanConstraint::new(0, 10)])
//!     .unwrap();
//! assert_eq!(parse.to_string(), "(S (X The (X boy ran)) .)");
//! ```

mod constraint;
mod error;
mod span;
pub mod syntax;
mod theory;
mod token;

pub use constraint::{
    ArgumentSpec, Constraint, ConstraintKind, EntityConstraint, EventConstraint, MentionConstraint,
    NameConstraint, ParseSpanConstraint, RelationConstraint, SentenceConstraint,
};
pub use error::{AnnotationError, ErrorKind};
pub use span::{OffsetRange, TokenSpan};
pub use syntax::{MinimalTreeBuilder, Parse, SynNode, SynNodeKind};
pub use theory::{
    DocumentId, DocumentTheory, DocumentTheoryBuilder, Entity, EntityType, Event, EventArgument,
    Mention, MentionId, MentionType, Modality, Name, Relation, SentenceTheory,
    SentenceTheoryBuilder, Tense,
};
pub use token::{Token, TokenSequence};
