use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{AnnotationError, TokenSpan};

/// A node of a constituency tree.
///
/// Nodes are immutable and shared through `Arc`, so a subtree can be reused by
/// several parses (or several versions of one sentence theory) without copying.
/// A nonterminal's token span is always the union of its children's spans,
/// with children adjacent and in textual order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawSynNode")]
pub struct SynNode {
    label: String,
    span: TokenSpan,
    kind: SynNodeKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SynNodeKind {
    /// Wraps exactly one token.
    Terminal,
    /// Owns an ordered list of children, one of which is the head.
    Nonterminal {
        children: Vec<Arc<SynNode>>,
        head: usize,
    },
}

impl SynNode {
    /// A leaf wrapping the token at `token`.
    pub fn terminal(label: impl Into<String>, token: usize) -> Arc<Self> {
        Arc::new(Self {
            label: label.into(),
            span: TokenSpan::single(token),
            kind: SynNodeKind::Terminal,
        })
    }

    /// A nonterminal over `children`, checking adjacency and the head index.
    pub fn nonterminal(
        label: impl Into<String>,
        children: Vec<Arc<SynNode>>,
        head: usize,
    ) -> Result<Arc<Self>, AnnotationError> {
        Self::checked(label.into(), children, head).map(Arc::new)
    }

    fn checked(label: String, children: Vec<Arc<SynNode>>, head: usize) -> Result<Self, AnnotationError> {
        let (first, last) = match (children.first(), children.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => {
                return Err(AnnotationError::StructuralInvariant(format!(
                    "nonterminal {} has no children",
                    label
                )))
            }
        };
        if head >= children.len() {
            return Err(AnnotationError::StructuralInvariant(format!(
                "nonterminal {} has head {} but only {} children",
                label,
                head,
                children.len()
            )));
        }
        for pair in children.windows(2) {
            if !pair[0].span.is_followed_by(&pair[1].span) {
                return Err(AnnotationError::StructuralInvariant(format!(
                    "children {} and {} of {} are not adjacent",
                    pair[0].span, pair[1].span, label
                )));
            }
        }
        let span = TokenSpan::new(first.span.start, last.span.end);
        Ok(Self {
            label,
            span,
            kind: SynNodeKind::Nonterminal { children, head },
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn span(&self) -> TokenSpan {
        self.span
    }

    pub fn kind(&self) -> &SynNodeKind {
        &self.kind
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.kind, SynNodeKind::Terminal)
    }

    /// Children in textual order; empty for terminals.
    pub fn children(&self) -> &[Arc<SynNode>] {
        match &self.kind {
            SynNodeKind::Terminal => &[],
            SynNodeKind::Nonterminal { children, .. } => children,
        }
    }

    pub fn head_index(&self) -> Option<usize> {
        match self.kind {
            SynNodeKind::Terminal => None,
            SynNodeKind::Nonterminal { head, .. } => Some(head),
        }
    }

    pub fn head(&self) -> Option<&Arc<SynNode>> {
        self.head_index().map(|head| &self.children()[head])
    }

    /// Follow head children down to the terminal that heads this node.
    pub fn head_terminal(&self) -> &SynNode {
        let mut node = self;
        while let Some(head) = node.head() {
            node = &**head;
        }
        node
    }

    /// Pre-order traversal of this node and all descendants.
    pub fn walk(&self) -> impl Iterator<Item = &SynNode> {
        let mut stack = vec![self];
        std::iter::from_fn(move || {
            let node = stack.pop()?;
            stack.extend(node.children().iter().rev().map(|child| &**child));
            Some(node)
        })
    }

    pub fn node_count(&self) -> usize {
        self.walk().count()
    }
}

/// Bracketed treebank rendering, e.g. `(S (NP The boy) ran .)`.
impl fmt::Display for SynNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            SynNodeKind::Terminal => f.write_str(&self.label),
            SynNodeKind::Nonterminal { children, .. } => {
                write!(f, "({}", self.label)?;
                for child in children {
                    write!(f, " {}", child)?;
                }
                f.write_str(")")
            }
        }
    }
}

#[derive(Deserialize)]
#[serde(rename = "SynNode")]
struct RawSynNode {
    label: String,
    span: TokenSpan,
    kind: SynNodeKind,
}

impl TryFrom<RawSynNode> for SynNode {
    type Error = AnnotationError;

    fn try_from(raw: RawSynNode) -> Result<Self, Self::Error> {
        let node = match raw.kind {
            SynNodeKind::Terminal if raw.span.len() == 1 => SynNode {
                label: raw.label,
                span: raw.span,
                kind: SynNodeKind::Terminal,
            },
            SynNodeKind::Terminal => {
                return Err(AnnotationError::StructuralInvariant(format!(
                    "terminal {} spans {}",
                    raw.label, raw.span
                )))
            }
            SynNodeKind::Nonterminal { children, head } => SynNode::checked(raw.label, children, head)?,
        };
        if node.span != raw.span {
            return Err(AnnotationError::StructuralInvariant(format!(
                "node {} records span {} but its children cover {}",
                node.label, raw.span, node.span
            )));
        }
        Ok(node)
    }
}
