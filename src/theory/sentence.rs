use serde::{Deserialize, Serialize};

use crate::{
    AnnotationError, EntityType, Mention, MentionId, MentionType, Name, OffsetRange, Parse,
    TokenSequence, TokenSpan,
};

/// All annotations produced so far for one sentence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawSentenceTheory")]
pub struct SentenceTheory {
    index: usize,
    tokens: TokenSequence,
    names: Vec<Name>,
    parse: Option<Parse>,
    mentions: Vec<Mention>,
}

impl SentenceTheory {
    pub fn new(index: usize, tokens: TokenSequence) -> Self {
        Self {
            index,
            tokens,
            names: Vec::new(),
            parse: None,
            mentions: Vec::new(),
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn tokens(&self) -> &TokenSequence {
        &self.tokens
    }

    pub fn char_range(&self) -> OffsetRange {
        self.tokens.char_range()
    }

    pub fn names(&self) -> &[Name] {
        &self.names
    }

    pub fn parse(&self) -> Option<&Parse> {
        self.parse.as_ref()
    }

    pub fn mentions(&self) -> &[Mention] {
        &self.mentions
    }

    pub fn name_at(&self, range: OffsetRange) -> Option<&Name> {
        self.names.iter().find(|name| name.range == range)
    }

    pub fn mention_at(&self, tokens: TokenSpan) -> Option<&Mention> {
        self.mentions.iter().find(|mention| mention.tokens == tokens)
    }

    pub fn to_builder(&self) -> SentenceTheoryBuilder {
        SentenceTheoryBuilder {
            theory: self.clone(),
        }
    }
}

/// Copy-on-write editor for a [`SentenceTheory`].
#[derive(Debug, Clone)]
pub struct SentenceTheoryBuilder {
    theory: SentenceTheory,
}

impl SentenceTheoryBuilder {
    /// Read access to the state being built.
    pub fn current(&self) -> &SentenceTheory {
        &self.theory
    }

    /// Names are kept in range order.
    pub fn add_name(&mut self, tokens: TokenSpan, entity_type: EntityType, external_id: Option<String>) {
        let range = self.theory.tokens.char_range_of(tokens);
        let at = self.theory.names.partition_point(|name| name.range < range);
        self.theory.names.insert(
            at,
            Name {
                range,
                tokens,
                entity_type,
                external_id,
            },
        );
    }

    pub fn set_parse(&mut self, parse: Parse) {
        self.theory.parse = Some(parse);
    }

    pub fn add_mention(
        &mut self,
        tokens: TokenSpan,
        entity_type: EntityType,
        mention_type: MentionType,
        external_id: Option<String>,
    ) -> MentionId {
        let id = MentionId {
            sentence: self.theory.index,
            index: self.theory.mentions.len(),
        };
        let range = self.theory.tokens.char_range_of(tokens);
        self.theory.mentions.push(Mention {
            id,
            range,
            tokens,
            entity_type,
            mention_type,
            external_id,
        });
        id
    }

    pub fn build(self) -> SentenceTheory {
        self.theory
    }
}

#[derive(Deserialize)]
#[serde(rename = "SentenceTheory")]
struct RawSentenceTheory {
    index: usize,
    tokens: TokenSequence,
    names: Vec<Name>,
    parse: Option<Parse>,
    mentions: Vec<Mention>,
}

impl TryFrom<RawSentenceTheory> for SentenceTheory {
    type Error = AnnotationError;

    fn try_from(raw: RawSentenceTheory) -> Result<Self, Self::Error> {
        let invalid = |what: String| {
            Err(AnnotationError::StructuralInvariant(format!(
                "sentence {}: {}",
                raw.index, what
            )))
        };
        let placed = |range: OffsetRange, span: TokenSpan| {
            span.end < raw.tokens.len() && raw.tokens.char_range_of(span) == range
        };

        if let Some(parse) = &raw.parse {
            if *parse.tokens() != raw.tokens {
                return invalid("parse is over different tokens".to_string());
            }
        }
        for name in &raw.names {
            if !placed(name.range, name.tokens) {
                return invalid(format!("name {} does not match tokens {}", name.range, name.tokens));
            }
        }
        for (position, mention) in raw.mentions.iter().enumerate() {
            if !placed(mention.range, mention.tokens) {
                return invalid(format!(
                    "mention {} does not match tokens {}",
                    mention.range, mention.tokens
                ));
            }
            let expected = MentionId {
                sentence: raw.index,
                index: position,
            };
            if mention.id != expected {
                return invalid(format!("mention at position {} is labelled {}", position, mention.id));
            }
        }

        Ok(Self {
            index: raw.index,
            tokens: raw.tokens,
            names: raw.names,
            parse: raw.parse,
            mentions: raw.mentions,
        })
    }
}
