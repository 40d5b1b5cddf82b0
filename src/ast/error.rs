use super::node::NodeId;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AstError {
    #[error("node {node} cannot be its own parent")]
    SelfParent { node: NodeId },
    #[error("attaching node {node} under {parent} would create a cycle")]
    Cycle { node: NodeId, parent: NodeId },
    #[error("node {node} does not exist")]
    UnknownNode { node: NodeId },
}

pub type AstResult<T> = Result<T, AstError>;
