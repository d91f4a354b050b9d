//! Constituency trees and the algorithms that relate them to offset ranges.
//!
//! - [`MinimalTreeBuilder`] reconstructs the smallest tree realising a set of
//!   non-crossing bracketing spans.
//! - [`project_onto_parse`] / [`project_onto_tokens`] find the node or token
//!   span whose boundaries equal a target range.
//! - [`RangeMap`] is the range-keyed map both rely on.

mod minimal_tree;
mod node;
mod parse;
mod projector;
mod range_map;

pub use minimal_tree::MinimalTreeBuilder;
pub use node::{SynNode, SynNodeKind};
pub use parse::Parse;
pub use projector::{project_onto_parse, project_onto_sentence, project_onto_tokens};
pub use range_map::RangeMap;
