use super::Node;

use serde::{Deserialize, Serialize};

/// An ORDER BY entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Sort {
    pub node: Node,
    pub descending: bool,
}

impl Sort {
    /// Reverses direction.
    pub fn descending(mut self) -> Sort {
        self.descending = !self.descending;
        self
    }
}

impl From<Node> for Sort {
    fn from(node: Node) -> Self {
        node.ascending()
    }
}

impl From<&Node> for Sort {
    fn from(node: &Node) -> Self {
        node.clone().ascending()
    }
}
