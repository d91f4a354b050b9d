mod annotations;
mod document;
mod sentence;

pub use annotations::{
    Entity, EntityType, Event, EventArgument, Mention, MentionId, MentionType, Modality, Name,
    Relation, Tense,
};
pub use document::{DocumentId, DocumentTheory, DocumentTheoryBuilder};
pub use sentence::{SentenceTheory, SentenceTheoryBuilder};
