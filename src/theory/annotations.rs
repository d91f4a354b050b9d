//! Annotation records stored in sentence and document theories.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{OffsetRange, TokenSpan};

/// Entity types, using the ACE inventory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityType {
    #[serde(rename = "PER")]
    Person,
    #[serde(rename = "ORG")]
    Organization,
    #[serde(rename = "GPE")]
    Gpe,
    #[serde(rename = "LOC")]
    Location,
    #[serde(rename = "FAC")]
    Facility,
    #[serde(rename = "VEH")]
    Vehicle,
    #[serde(rename = "WEA")]
    Weapon,
    #[serde(rename = "OTH")]
    Other,
}

impl EntityType {
    pub fn code(&self) -> &'static str {
        match self {
            EntityType::Person => "PER",
            EntityType::Organization => "ORG",
            EntityType::Gpe => "GPE",
            EntityType::Location => "LOC",
            EntityType::Facility => "FAC",
            EntityType::Vehicle => "VEH",
            EntityType::Weapon => "WEA",
            EntityType::Other => "OTH",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MentionType {
    /// Proper name
    Name,
    /// Common-noun description
    Desc,
    /// Pronoun
    Pron,
    /// Partitive
    Part,
    List,
    Unknown,
}

impl fmt::Display for MentionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = match self {
            MentionType::Name => "NAME",
            MentionType::Desc => "DESC",
            MentionType::Pron => "PRON",
            MentionType::Part => "PART",
            MentionType::List => "LIST",
            MentionType::Unknown => "NONE",
        };
        f.write_str(code)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Modality {
    #[default]
    Asserted,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Tense {
    Past,
    Present,
    Future,
    #[default]
    Unspecified,
}

/// Identifies a mention by its sentence and its position among that sentence's mentions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MentionId {
    pub sentence: usize,
    pub index: usize,
}

impl fmt::Display for MentionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "m{}.{}", self.sentence, self.index)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Name {
    pub range: OffsetRange,
    pub tokens: TokenSpan,
    pub entity_type: EntityType,
    pub external_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mention {
    pub id: MentionId,
    pub range: OffsetRange,
    pub tokens: TokenSpan,
    pub entity_type: EntityType,
    pub mention_type: MentionType,
    pub external_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub id: usize,
    pub entity_type: EntityType,
    pub mentions: Vec<MentionId>,
    pub external_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relation {
    pub id: usize,
    pub relation_type: String,
    pub left: MentionId,
    pub right: MentionId,
    pub modality: Modality,
    pub tense: Tense,
    pub external_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventArgument {
    pub role: String,
    pub mention: MentionId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: usize,
    pub event_type: String,
    pub anchor: OffsetRange,
    pub arguments: Vec<EventArgument>,
    pub modality: Modality,
    pub tense: Tense,
    pub external_id: Option<String>,
}
