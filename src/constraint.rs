//! Externally supplied facts a stage must realise and then verify.
//!
//! Constraints form a closed sum type. Each stage declares the
//! [`ConstraintKind`]s it accepts; handing it any other kind is a
//! configuration error. [`Constraint::satisfied_by`] is pure and is evaluated
//! against the theory a stage returns, never against intermediate state.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::syntax::project_onto_parse;
use crate::{DocumentTheory, EntityType, Mention, MentionType, Modality, OffsetRange, Tense};

/// A sentence must span exactly `range`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentenceConstraint {
    pub range: OffsetRange,
    #[serde(default)]
    pub external_id: Option<String>,
}

/// A name of `entity_type` must exist at exactly `range`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameConstraint {
    pub range: OffsetRange,
    pub entity_type: EntityType,
    #[serde(default)]
    pub external_id: Option<String>,
}

/// A mention with these attributes must exist at exactly `range`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MentionConstraint {
    pub range: OffsetRange,
    pub entity_type: EntityType,
    pub mention_type: MentionType,
    #[serde(default)]
    pub external_id: Option<String>,
}

/// Some parse node must cover exactly `range`. The label is used when the
/// node has to be created and is not checked afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseSpanConstraint {
    pub range: OffsetRange,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub external_id: Option<String>,
}

impl ParseSpanConstraint {
    pub fn new(start: usize, end: usize) -> Self {
        Self {
            range: OffsetRange::new(start, end),
            label: None,
            external_id: None,
        }
    }

    pub fn labeled(start: usize, end: usize, label: &str) -> Self {
        Self {
            range: OffsetRange::new(start, end),
            label: Some(label.to_string()),
            external_id: None,
        }
    }
}

/// The mentions at `mention_ranges` must all belong to one entity of `entity_type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityConstraint {
    pub mention_ranges: Vec<OffsetRange>,
    pub entity_type: EntityType,
    #[serde(default)]
    pub external_id: Option<String>,
}

/// A relation must link the mentions at `left` and `right`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationConstraint {
    pub relation_type: String,
    pub left: OffsetRange,
    pub right: OffsetRange,
    #[serde(default)]
    pub modality: Modality,
    #[serde(default)]
    pub tense: Tense,
    #[serde(default)]
    pub external_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArgumentSpec {
    pub role: String,
    pub range: OffsetRange,
}

/// An event anchored at `anchor` with (at least) the listed role-filling mentions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventConstraint {
    pub event_type: String,
    pub anchor: OffsetRange,
    #[serde(default)]
    pub arguments: Vec<ArgumentSpec>,
    #[serde(default)]
    pub modality: Modality,
    #[serde(default)]
    pub tense: Tense,
    #[serde(default)]
    pub external_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Constraint {
    ExactSentence(SentenceConstraint),
    ExactName(NameConstraint),
    ExactMention(MentionConstraint),
    ExactParseSpan(ParseSpanConstraint),
    ExactEntity(EntityConstraint),
    ExactRelation(RelationConstraint),
    ExactEvent(EventConstraint),
}

/// The variant of a [`Constraint`], without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ConstraintKind {
    ExactSentence,
    ExactName,
    ExactMention,
    ExactParseSpan,
    ExactEntity,
    ExactRelation,
    ExactEvent,
}

impl fmt::Display for ConstraintKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl Constraint {
    pub fn kind(&self) -> ConstraintKind {
        match self {
            Constraint::ExactSentence(_) => ConstraintKind::ExactSentence,
            Constraint::ExactName(_) => ConstraintKind::ExactName,
            Constraint::ExactMention(_) => ConstraintKind::ExactMention,
            Constraint::ExactParseSpan(_) => ConstraintKind::ExactParseSpan,
            Constraint::ExactEntity(_) => ConstraintKind::ExactEntity,
            Constraint::ExactRelation(_) => ConstraintKind::ExactRelation,
            Constraint::ExactEvent(_) => ConstraintKind::ExactEvent,
        }
    }

    /// Correlation id used to stitch results back to the caller's records.
    pub fn external_id(&self) -> Option<&str> {
        match self {
            Constraint::ExactSentence(c) => c.external_id.as_deref(),
            Constraint::ExactName(c) => c.external_id.as_deref(),
            Constraint::ExactMention(c) => c.external_id.as_deref(),
            Constraint::ExactParseSpan(c) => c.external_id.as_deref(),
            Constraint::ExactEntity(c) => c.external_id.as_deref(),
            Constraint::ExactRelation(c) => c.external_id.as_deref(),
            Constraint::ExactEvent(c) => c.external_id.as_deref(),
        }
    }

    /// The offset range this constraint is about: the span itself, or the
    /// smallest range covering every referenced span.
    pub fn extent(&self) -> OffsetRange {
        match self {
            Constraint::ExactSentence(c) => c.range,
            Constraint::ExactName(c) => c.range,
            Constraint::ExactMention(c) => c.range,
            Constraint::ExactParseSpan(c) => c.range,
            Constraint::ExactEntity(c) => c
                .mention_ranges
                .iter()
                .copied()
                .reduce(|a, b| a.union(&b))
                .unwrap_or_else(|| OffsetRange::new(0, 0)),
            Constraint::ExactRelation(c) => c.left.union(&c.right),
            Constraint::ExactEvent(c) => c
                .arguments
                .iter()
                .fold(c.anchor, |acc, arg| acc.union(&arg.range)),
        }
    }

    pub fn satisfied_by(&self, theory: &DocumentTheory) -> bool {
        match self {
            Constraint::ExactSentence(c) => theory
                .sentences()
                .iter()
                .any(|sentence| sentence.char_range() == c.range),
            Constraint::ExactName(c) => theory.sentences().iter().any(|sentence| {
                sentence
                    .names()
                    .iter()
                    .any(|name| name.range == c.range && name.entity_type == c.entity_type)
            }),
            Constraint::ExactMention(c) => theory.mentions_at(c.range).any(|mention| {
                mention.entity_type == c.entity_type && mention.mention_type == c.mention_type
            }),
            Constraint::ExactParseSpan(c) => theory
                .sentence_containing(c.range)
                .and_then(|sentence| sentence.parse())
                .map_or(false, |parse| project_onto_parse(parse, c.range).is_ok()),
            Constraint::ExactEntity(c) => {
                !c.mention_ranges.is_empty()
                    && theory.entities().iter().any(|entity| {
                        entity.entity_type == c.entity_type
                            && c.mention_ranges.iter().all(|range| {
                                entity
                                    .mentions
                                    .iter()
                                    .filter_map(|id| theory.mention(*id))
                                    .any(|mention| mention.range == *range)
                            })
                    })
            }
            Constraint::ExactRelation(c) => theory.relations().iter().any(|relation| {
                relation.relation_type == c.relation_type
                    && relation.modality == c.modality
                    && relation.tense == c.tense
                    && mention_range_is(theory.mention(relation.left), c.left)
                    && mention_range_is(theory.mention(relation.right), c.right)
            }),
            Constraint::ExactEvent(c) => theory.events().iter().any(|event| {
                event.event_type == c.event_type
                    && event.anchor == c.anchor
                    && event.modality == c.modality
                    && event.tense == c.tense
                    && c.arguments.iter().all(|spec| {
                        event.arguments.iter().any(|arg| {
                            arg.role == spec.role
                                && mention_range_is(theory.mention(arg.mention), spec.range)
                        })
                    })
            }),
        }
    }
}

fn mention_range_is(mention: Option<&Mention>, range: OffsetRange) -> bool {
    mention.map_or(false, |mention| mention.range == range)
}

impl fmt::Display for ParseSpanConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.label {
            Some(label) => write!(f, "ExactParseSpan {} {}", label, self.range),
            None => write!(f, "ExactParseSpan {}", self.range),
        }
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constraint::ExactSentence(c) => write!(f, "ExactSentence {}", c.range)?,
            Constraint::ExactName(c) => write!(f, "ExactName {} {}", c.entity_type, c.range)?,
            Constraint::ExactMention(c) => write!(
                f,
                "ExactMention {}/{} {}",
                c.entity_type, c.mention_type, c.range
            )?,
            Constraint::ExactParseSpan(c) => write!(f, "{}", c)?,
            Constraint::ExactEntity(c) => {
                write!(f, "ExactEntity {}", c.entity_type)?;
                for range in &c.mention_ranges {
                    write!(f, " {}", range)?;
                }
            }
            Constraint::ExactRelation(c) => write!(
                f,
                "ExactRelation {} {} -> {}",
                c.relation_type, c.left, c.right
            )?,
            Constraint::ExactEvent(c) => {
                write!(f, "ExactEvent {} @{}", c.event_type, c.anchor)?;
                for arg in &c.arguments {
                    write!(f, " {}={}", arg.role, arg.range)?;
                }
            }
        }
        if let Some(id) = self.external_id() {
            write!(f, " (id={})", id)?;
        }
        Ok(())
    }
}
