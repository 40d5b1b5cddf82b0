mod error;
mod node;
mod record;
mod tree;

pub use error::{AstError, AstResult};
pub use node::{Children, GroupNode, Node, NodeId, NodeKind, SubSequenceNode};
pub use record::NodeRecord;
pub use tree::{Ast, AstBuilder, NodeOps, NodeRef};
