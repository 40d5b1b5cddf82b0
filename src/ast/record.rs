use super::node::{Children, GroupNode, NodeId, NodeKind};
use super::tree::{Ast, AstBuilder, NodeOps, NodeRef};
use crate::compiler::HydrationError;
use crate::types::{ConstraintArgs, TypeRegistry};
use serde::{Deserialize, Serialize};

/// Plain, serializable encoding of one node and its subtree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum NodeRecord {
    Literal {
        regex: String,
        text: String,
    },
    Group {
        regex: String,
        name: String,
        type_name: String,
        type_constraints: ConstraintArgs,
        group_id: String,
    },
    Sequence {
        regex: String,
        children: Vec<NodeRecord>,
    },
    SubSequence {
        regex: String,
        children: Vec<NodeRecord>,
    },
}

impl NodeRecord {
    pub fn regex(&self) -> &str {
        match self {
            NodeRecord::Literal { regex, .. }
            | NodeRecord::Group { regex, .. }
            | NodeRecord::Sequence { regex, .. }
            | NodeRecord::SubSequence { regex, .. } => regex,
        }
    }
}

impl NodeRef<'_> {
    pub fn to_record(&self) -> NodeRecord {
        let regex = self.to_regex().to_string();
        match self.kind() {
            NodeKind::Literal(text) => NodeRecord::Literal {
                regex,
                text: text.clone(),
            },
            NodeKind::Group(group) => NodeRecord::Group {
                regex,
                name: group.name().to_string(),
                type_name: group.type_name().to_string(),
                type_constraints: group.pattern_type().constraint_arguments().clone(),
                group_id: group.group_id().to_string(),
            },
            NodeKind::Sequence(_) => NodeRecord::Sequence {
                regex,
                children: self.children().map(|c| c.to_record()).collect(),
            },
            NodeKind::SubSequence(_) => NodeRecord::SubSequence {
                regex,
                children: self.children().map(|c| c.to_record()).collect(),
            },
        }
    }
}

impl Ast {
    pub fn to_record(&self) -> NodeRecord {
        self.root().to_record()
    }

    /// Rebuilds a tree from its record, creating fresh type instances from `registry`.
    pub fn from_record(record: &NodeRecord, registry: &TypeRegistry) -> Result<Ast, HydrationError> {
        if !matches!(record, NodeRecord::Sequence { .. }) {
            return Err(HydrationError::MissingRoot);
        }
        let mut builder = AstBuilder::new();
        let root = restore(&mut builder, record, registry)?;
        Ok(builder.finish(root)?)
    }
}

fn restore(
    builder: &mut AstBuilder,
    record: &NodeRecord,
    registry: &TypeRegistry,
) -> Result<NodeId, HydrationError> {
    let id = match record {
        NodeRecord::Literal { text, .. } => builder.literal(text.as_str()),
        NodeRecord::Group {
            name,
            type_name,
            type_constraints,
            group_id,
            ..
        } => {
            let ty = registry.create(type_name, type_constraints)?;
            builder.group(GroupNode::new(name.as_str(), group_id.as_str(), ty))
        }
        NodeRecord::Sequence { children, .. } => {
            let ids = restore_children(builder, children, registry)?;
            builder.sequence(ids)?
        }
        NodeRecord::SubSequence { children, .. } => {
            let ids = restore_children(builder, children, registry)?;
            builder.sub_sequence(ids)?
        }
    };
    builder.preset_regex(id, record.regex().to_string())?;
    Ok(id)
}

fn restore_children(
    builder: &mut AstBuilder,
    children: &[NodeRecord],
    registry: &TypeRegistry,
) -> Result<Children, HydrationError> {
    children
        .iter()
        .map(|child| restore(builder, child, registry))
        .collect()
}
