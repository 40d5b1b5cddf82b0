use crate::types::PatternType;
use smallvec::SmallVec;
use std::fmt;
use std::sync::{Arc, OnceLock};

/// Index of a node inside its [`Ast`](super::Ast) arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

pub type Children = SmallVec<[NodeId; 8]>;

#[derive(Debug, Clone)]
pub struct GroupNode {
    name: String,
    group_id: String,
    ty: Arc<dyn PatternType>,
}

impl GroupNode {
    pub fn new(name: impl Into<String>, group_id: impl Into<String>, ty: Arc<dyn PatternType>) -> Self {
        Self {
            name: name.into(),
            group_id: group_id.into(),
            ty,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Regex capture name (`g1`, `g2`, ...).
    pub fn group_id(&self) -> &str {
        &self.group_id
    }

    pub fn pattern_type(&self) -> &Arc<dyn PatternType> {
        &self.ty
    }

    pub fn type_name(&self) -> &str {
        self.ty.name()
    }

    pub fn is_greedy(&self) -> bool {
        self.ty.is_greedy()
    }
}

#[derive(Debug, Default)]
pub struct SubSequenceNode {
    pub(crate) children: Children,
    /// Directly owned groups, filled once the tree is complete.
    pub(crate) requirements: OnceLock<SmallVec<[NodeId; 4]>>,
}

impl SubSequenceNode {
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

#[derive(Debug)]
pub enum NodeKind {
    Literal(String),
    Group(GroupNode),
    Sequence(Children),
    SubSequence(SubSequenceNode),
}

impl NodeKind {
    pub fn children(&self) -> &[NodeId] {
        match self {
            NodeKind::Sequence(children) => children,
            NodeKind::SubSequence(sub) => &sub.children,
            NodeKind::Literal(_) | NodeKind::Group(_) => &[],
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            NodeKind::Literal(_) => "literal",
            NodeKind::Group(_) => "group",
            NodeKind::Sequence(_) => "sequence",
            NodeKind::SubSequence(_) => "subsequence",
        }
    }
}

#[derive(Debug)]
pub struct Node {
    pub(crate) kind: NodeKind,
    pub(crate) parent: Option<NodeId>,
    pub(crate) regex: OnceLock<String>,
    pub(crate) boundary: OnceLock<Option<Box<str>>>,
}

impl Node {
    pub(crate) fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            parent: None,
            regex: OnceLock::new(),
            boundary: OnceLock::new(),
        }
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }
}
