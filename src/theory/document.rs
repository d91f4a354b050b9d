use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{
    AnnotationError, Entity, EntityType, Event, EventArgument, Mention, MentionId, Modality,
    OffsetRange, Relation, SentenceTheory, Tense,
};

/// Identifier a caller uses for a document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for DocumentId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An immutable snapshot of every annotation produced so far for one document.
///
/// Stages never mutate a published theory. They derive a
/// [`DocumentTheoryBuilder`], edit it, and build a new theory. Sentences are held
/// behind `Arc`, so sentences a stage leaves untouched are shared between the
/// old and the new theory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawDocumentTheory")]
pub struct DocumentTheory {
    id: DocumentId,
    text: Arc<str>,
    sentences: Vec<Arc<SentenceTheory>>,
    entities: Vec<Entity>,
    relations: Vec<Relation>,
    events: Vec<Event>,
}

impl DocumentTheory {
    /// A theory holding only the raw text.
    pub fn new(id: DocumentId, text: &str) -> Self {
        Self {
            id,
            text: Arc::from(text),
            sentences: Vec::new(),
            entities: Vec::new(),
            relations: Vec::new(),
            events: Vec::new(),
        }
    }

    pub fn id(&self) -> &DocumentId {
        &self.id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn sentences(&self) -> &[Arc<SentenceTheory>] {
        &self.sentences
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn relations(&self) -> &[Relation] {
        &self.relations
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// The sentence whose token range contains `range`, if any.
    pub fn sentence_containing(&self, range: OffsetRange) -> Option<&Arc<SentenceTheory>> {
        self.sentences
            .iter()
            .find(|sentence| sentence.char_range().contains(&range))
    }

    /// Every mention in document order.
    pub fn mentions(&self) -> impl Iterator<Item = &Mention> {
        self.sentences
            .iter()
            .flat_map(|sentence| sentence.mentions().iter())
    }

    pub fn mention(&self, id: MentionId) -> Option<&Mention> {
        self.sentences
            .get(id.sentence)
            .and_then(|sentence| sentence.mentions().get(id.index))
    }

    /// Mentions whose boundaries equal `range` exactly.
    pub fn mentions_at(&self, range: OffsetRange) -> impl Iterator<Item = &Mention> {
        self.mentions().filter(move |mention| mention.range == range)
    }

    pub fn entity_of(&self, mention: MentionId) -> Option<&Entity> {
        self.entities
            .iter()
            .find(|entity| entity.mentions.contains(&mention))
    }

    pub fn to_builder(&self) -> DocumentTheoryBuilder {
        DocumentTheoryBuilder {
            theory: self.clone(),
        }
    }
}

/// One-line summary used in log records, e.g.
/// `doc-1 (2 sentences, 1 names, 3 mentions, 2 entities, 0 relations, 0 events)`.
impl fmt::Display for DocumentTheory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: usize = self.sentences.iter().map(|s| s.names().len()).sum();
        write!(
            f,
            "{} ({} sentences, {} names, {} mentions, {} entities, {} relations, {} events)",
            self.id,
            self.sentences.len(),
            names,
            self.mentions().count(),
            self.entities.len(),
            self.relations.len(),
            self.events.len()
        )
    }
}

#[derive(Deserialize)]
#[serde(rename = "DocumentTheory")]
struct RawDocumentTheory {
    id: DocumentId,
    text: Arc<str>,
    sentences: Vec<Arc<SentenceTheory>>,
    entities: Vec<Entity>,
    relations: Vec<Relation>,
    events: Vec<Event>,
}

impl TryFrom<RawDocumentTheory> for DocumentTheory {
    type Error = AnnotationError;

    fn try_from(raw: RawDocumentTheory) -> Result<Self, Self::Error> {
        for (position, sentence) in raw.sentences.iter().enumerate() {
            if sentence.index() != position {
                return Err(AnnotationError::StructuralInvariant(format!(
                    "sentence at position {} is numbered {}",
                    position,
                    sentence.index()
                )));
            }
        }
        let theory = Self {
            id: raw.id,
            text: raw.text,
            sentences: raw.sentences,
            entities: raw.entities,
            relations: raw.relations,
            events: raw.events,
        };

        let referenced = theory
            .entities
            .iter()
            .flat_map(|entity| entity.mentions.iter().copied())
            .chain(
                theory
                    .relations
                    .iter()
                    .flat_map(|relation| [relation.left, relation.right]),
            )
            .chain(
                theory
                    .events
                    .iter()
                    .flat_map(|event| event.arguments.iter().map(|arg| arg.mention)),
            );
        for id in referenced {
            if theory.mention(id).is_none() {
                return Err(AnnotationError::StructuralInvariant(format!(
                    "document {} refers to missing mention {}",
                    theory.id, id
                )));
            }
        }
        Ok(theory)
    }
}

/// Copy-on-write editor for a [`DocumentTheory`].
#[derive(Debug, Clone)]
pub struct DocumentTheoryBuilder {
    theory: DocumentTheory,
}

impl DocumentTheoryBuilder {
    /// Read access to the state being built.
    pub fn current(&self) -> &DocumentTheory {
        &self.theory
    }

    /// Replace the sentence list; document-level annotations reference mentions
    /// by sentence index, so they are cleared with it.
    pub fn set_sentences(&mut self, sentences: Vec<SentenceTheory>) {
        self.theory.sentences = sentences.into_iter().map(Arc::new).collect();
        self.theory.entities.clear();
        self.theory.relations.clear();
        self.theory.events.clear();
    }

    pub fn replace_sentence(&mut self, index: usize, sentence: SentenceTheory) {
        self.theory.sentences[index] = Arc::new(sentence);
    }

    pub fn add_entity(
        &mut self,
        entity_type: EntityType,
        mentions: Vec<MentionId>,
        external_id: Option<String>,
    ) -> usize {
        let id = self.theory.entities.len();
        self.theory.entities.push(Entity {
            id,
            entity_type,
            mentions,
            external_id,
        });
        id
    }

    pub fn add_relation(
        &mut self,
        relation_type: &str,
        left: MentionId,
        right: MentionId,
        modality: Modality,
        tense: Tense,
        external_id: Option<String>,
    ) -> usize {
        let id = self.theory.relations.len();
        self.theory.relations.push(Relation {
            id,
            relation_type: relation_type.to_string(),
            left,
            right,
            modality,
            tense,
            external_id,
        });
        id
    }

    pub fn add_event(
        &mut self,
        event_type: &str,
        anchor: OffsetRange,
        arguments: Vec<EventArgument>,
        modality: Modality,
        tense: Tense,
        external_id: Option<String>,
    ) -> usize {
        let id = self.theory.events.len();
        self.theory.events.push(Event {
            id,
            event_type: event_type.to_string(),
            anchor,
            arguments,
            modality,
            tense,
            external_id,
        });
        id
    }

    pub fn build(self) -> DocumentTheory {
        self.theory
    }
}
