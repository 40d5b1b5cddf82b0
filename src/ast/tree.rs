use super::error::{AstError, AstResult};
use super::node::{Children, GroupNode, Node, NodeId, NodeKind, SubSequenceNode};
use crate::compiler::{GenerateError, GenerateResult, ValueSource};
use crate::validation::{ValidationError, ValidationResult};
use regex::escape;
use smallvec::SmallVec;

/// Behaviour shared by every node shape.
pub trait NodeOps<'a> {
    /// Regex fragment of this node, computed once and cached.
    fn to_regex(&self) -> &'a str;

    /// Renders this node from named values.
    fn generate(&self, values: &dyn ValueSource) -> GenerateResult<String>;

    /// Checks rules that depend on where the node sits in the tree.
    fn validate_tree_context(&self) -> ValidationResult<()>;
}

/// Arena holding every node of one parsed pattern.
#[derive(Debug)]
pub struct Ast {
    nodes: Vec<Node>,
    root: NodeId,
}

impl Ast {
    pub fn root(&self) -> NodeRef<'_> {
        NodeRef {
            ast: self,
            id: self.root,
        }
    }

    pub fn get(&self, id: NodeId) -> Option<NodeRef<'_>> {
        (id.index() < self.nodes.len()).then_some(NodeRef { ast: self, id })
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Depth-first, pre-order walk from the root.
    pub fn walk(&self) -> Vec<NodeRef<'_>> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            let node = self.node_ref(id);
            out.push(node);
            stack.extend(node.kind().children().iter().rev().copied());
        }
        out
    }

    /// Group nodes in pattern order.
    pub fn groups(&self) -> Vec<(NodeId, &GroupNode)> {
        self.walk()
            .into_iter()
            .filter_map(|node| match node.kind() {
                NodeKind::Group(group) => Some((node.id(), group)),
                _ => None,
            })
            .collect()
    }

    pub fn regex(&self) -> &str {
        self.root().to_regex()
    }

    #[inline]
    fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    #[inline]
    fn node_ref(&self, id: NodeId) -> NodeRef<'_> {
        NodeRef { ast: self, id }
    }

    /// Post-construction pass: fills SubSequence activation requirements.
    fn on_tree_complete(&self) {
        for (idx, node) in self.nodes.iter().enumerate() {
            if let NodeKind::SubSequence(sub) = &node.kind {
                let id = NodeId(idx as u32);
                let _ = sub.requirements.set(self.node_ref(id).direct_groups());
            }
        }
    }
}

/// Builds an [`Ast`] bottom-up: children are pushed before their parent.
#[derive(Debug, Default)]
pub struct AstBuilder {
    nodes: Vec<Node>,
}

impl AstBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node::new(kind));
        id
    }

    pub fn literal(&mut self, text: impl Into<String>) -> NodeId {
        self.push(NodeKind::Literal(text.into()))
    }

    pub fn group(&mut self, group: GroupNode) -> NodeId {
        self.push(NodeKind::Group(group))
    }

    pub fn sequence(&mut self, children: Children) -> AstResult<NodeId> {
        self.check_ids(&children)?;
        let id = self.push(NodeKind::Sequence(children.clone()));
        self.adopt(id, &children)?;
        Ok(id)
    }

    pub fn sub_sequence(&mut self, children: Children) -> AstResult<NodeId> {
        self.check_ids(&children)?;
        let id = self.push(NodeKind::SubSequence(SubSequenceNode {
            children: children.clone(),
            ..Default::default()
        }));
        self.adopt(id, &children)?;
        Ok(id)
    }

    /// Seeds a node's cached regex, as when restoring a persisted record.
    pub fn preset_regex(&mut self, id: NodeId, regex: String) -> AstResult<()> {
        let node = self
            .nodes
            .get_mut(id.index())
            .ok_or(AstError::UnknownNode { node: id })?;
        node.regex = regex.into();
        Ok(())
    }

    fn check_ids(&self, ids: &[NodeId]) -> AstResult<()> {
        match ids.iter().find(|id| id.index() >= self.nodes.len()) {
            Some(&node) => Err(AstError::UnknownNode { node }),
            None => Ok(()),
        }
    }

    fn adopt(&mut self, parent: NodeId, children: &[NodeId]) -> AstResult<()> {
        for &child in children {
            self.set_parent(child, parent)?;
        }
        Ok(())
    }

    /// Re-parents `child`, refusing self-parenting and cycles; clears the cached boundary.
    pub fn set_parent(&mut self, child: NodeId, parent: NodeId) -> AstResult<()> {
        if child == parent {
            return Err(AstError::SelfParent { node: child });
        }
        let mut cursor = self.nodes.get(parent.index()).and_then(|n| n.parent);
        while let Some(ancestor) = cursor {
            if ancestor == child {
                return Err(AstError::Cycle {
                    node: child,
                    parent,
                });
            }
            cursor = self.nodes[ancestor.index()].parent;
        }

        let node = self
            .nodes
            .get_mut(child.index())
            .ok_or(AstError::UnknownNode { node: child })?;
        node.parent = Some(parent);
        node.boundary = Default::default();
        Ok(())
    }

    pub fn finish(self, root: NodeId) -> AstResult<Ast> {
        if root.index() >= self.nodes.len() {
            return Err(AstError::UnknownNode { node: root });
        }
        let ast = Ast {
            nodes: self.nodes,
            root,
        };
        ast.on_tree_complete();
        Ok(ast)
    }
}

/// Borrowed handle to one node plus the arena it lives in.
#[derive(Debug, Clone, Copy)]
pub struct NodeRef<'a> {
    ast: &'a Ast,
    id: NodeId,
}

impl<'a> NodeRef<'a> {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn kind(&self) -> &'a NodeKind {
        &self.ast.node(self.id).kind
    }

    pub fn parent(&self) -> Option<NodeRef<'a>> {
        self.ast
            .node(self.id)
            .parent
            .map(|id| self.ast.node_ref(id))
    }

    pub fn children(&self) -> impl Iterator<Item = NodeRef<'a>> + 'a {
        let ast = self.ast;
        self.kind()
            .children()
            .iter()
            .map(move |&id| ast.node_ref(id))
    }

    pub fn as_group(&self) -> Option<&'a GroupNode> {
        match self.kind() {
            NodeKind::Group(group) => Some(group),
            _ => None,
        }
    }

    /// True when any ancestor is a SubSequence.
    pub fn is_optional(&self) -> bool {
        let mut cursor = self.parent();
        while let Some(node) = cursor {
            if matches!(node.kind(), NodeKind::SubSequence(_)) {
                return true;
            }
            cursor = node.parent();
        }
        false
    }

    /// Names of every group at or below this node.
    pub fn group_names(&self) -> Vec<&'a str> {
        match self.kind() {
            NodeKind::Group(group) => vec![group.name()],
            NodeKind::Literal(_) => Vec::new(),
            _ => self.children().flat_map(|c| c.group_names()).collect(),
        }
    }

    /// First literal text this node can start with.
    pub fn first_boundary(&self) -> Option<&'a str> {
        match self.kind() {
            NodeKind::Literal(text) => Some(text.as_str()),
            NodeKind::Group(_) => None,
            NodeKind::Sequence(_) | NodeKind::SubSequence(_) => {
                self.children().find_map(|c| c.first_boundary())
            }
        }
    }

    /// Literal that follows this node, never looking past an enclosing SubSequence.
    pub fn next_boundary(&self) -> Option<&'a str> {
        self.ast
            .node(self.id)
            .boundary
            .get_or_init(|| self.scan_boundary().map(Into::into))
            .as_deref()
    }

    fn scan_boundary(&self) -> Option<&'a str> {
        let parent = self.parent()?;
        let siblings = parent.kind().children();
        let pos = siblings.iter().position(|&id| id == self.id)?;

        let found = siblings[pos + 1..]
            .iter()
            .find_map(|&id| self.ast.node_ref(id).first_boundary());
        if found.is_some() {
            return found;
        }
        if matches!(parent.kind(), NodeKind::SubSequence(_)) {
            return None;
        }
        parent.next_boundary()
    }

    fn direct_groups(&self) -> SmallVec<[NodeId; 4]> {
        self.children()
            .filter(|c| matches!(c.kind(), NodeKind::Group(_)))
            .map(|c| c.id())
            .collect()
    }

    fn build_regex(&self) -> String {
        match self.kind() {
            NodeKind::Literal(text) => escape(text),
            NodeKind::Group(group) => {
                let ty = group.pattern_type();
                let mut pattern = ty.constrained_pattern();
                if ty.is_greedy() {
                    pattern = ty.apply_boundary(&pattern, self.next_boundary());
                }
                format!("(?P<{}>{})", group.group_id(), pattern)
            }
            NodeKind::Sequence(_) => self.children().map(|c| c.to_regex()).collect(),
            NodeKind::SubSequence(_) => {
                let body: String = self.children().map(|c| c.to_regex()).collect();
                format!("(?:{body})?")
            }
        }
    }

    fn generate_children(&self, values: &dyn ValueSource) -> GenerateResult<String> {
        let mut out = String::new();
        for child in self.children() {
            out.push_str(&child.generate(values)?);
        }
        Ok(out)
    }

    /// Whether any directly owned group resolves to a non-default value.
    fn is_activated(&self, sub: &SubSequenceNode, values: &dyn ValueSource) -> bool {
        let requirements = sub.requirements.get_or_init(|| self.direct_groups());
        requirements.iter().any(|&id| {
            let Some(group) = self.ast.node_ref(id).as_group() else {
                return false;
            };
            let ty = group.pattern_type();
            match ty.parse_value(values.lookup(group.name())) {
                Ok(value) => !ty.is_default_value(&value),
                Err(_) => false,
            }
        })
    }
}

impl<'a> NodeOps<'a> for NodeRef<'a> {
    fn to_regex(&self) -> &'a str {
        self.ast
            .node(self.id)
            .regex
            .get_or_init(|| self.build_regex())
    }

    fn generate(&self, values: &dyn ValueSource) -> GenerateResult<String> {
        match self.kind() {
            NodeKind::Literal(text) => Ok(text.clone()),
            NodeKind::Group(group) => {
                let ty = group.pattern_type();
                let value = ty
                    .parse_value(values.lookup(group.name()))
                    .and_then(|value| ty.serialize(&value))
                    .map_err(|source| GenerateError::Value {
                        group: group.name().to_string(),
                        source,
                    })?;
                Ok(value)
            }
            NodeKind::Sequence(_) => self.generate_children(values),
            NodeKind::SubSequence(sub) => {
                if !self.is_activated(sub, values) {
                    tracing::event!(
                        tracing::Level::TRACE,
                        operation = "generate_subsequence",
                        node = %self.id,
                        rendered = false
                    );
                    return Ok(String::new());
                }
                self.generate_children(values)
            }
        }
    }

    fn validate_tree_context(&self) -> ValidationResult<()> {
        match self.kind() {
            NodeKind::SubSequence(sub) if sub.children.is_empty() => {
                Err(ValidationError::EmptySubSequence {
                    node: self.id.index(),
                })
            }
            NodeKind::Group(group) if !self.is_optional() => {
                match group.pattern_type().constraint(crate::types::constraint::DEFAULT) {
                    Some(default) => Err(ValidationError::DefaultOnRequiredGroup {
                        group: group.name().to_string(),
                        default: default.raw().to_string(),
                    }),
                    None => Ok(()),
                }
            }
            _ => Ok(()),
        }
    }
}
