use crate::{node::Node, Error, Result};

/// Table-alias items derived from every node a query mentions.
///
/// Item 0 is the query root. Items are reused by structural equality of
/// their node, so two references to the same edge share one JOIN.
#[derive(Debug, Clone)]
pub struct JoinTree {
    pub items: Vec<JoinItem>,
    prefix: String,
    next_alias: usize,
}

#[derive(Debug, Clone)]
pub struct JoinItem {
    /// Table-like node this item stands for
    pub node: Node,

    pub parent: Option<usize>,
    pub children: Vec<usize>,

    /// Generated table alias, `t<n>`
    pub alias: String,

    /// Alias of the association table for many-many items
    pub assn_alias: Option<String>,

    /// Extra ON-clause predicate
    pub condition: Option<Node>,

    /// Columns are projected and folded into records. False for edges only
    /// needed to evaluate a clause.
    pub materialize: bool,

    /// Returned as one row per child rather than folded into a list
    pub expanded: bool,

    /// Indexes into the plan's column aliases, filled by the planner
    pub columns: Vec<usize>,

    /// Index of the primary key among the plan's column aliases
    pub pk_column: Option<usize>,
}

impl JoinTree {
    pub(crate) fn new(root: &Node, prefix: &str) -> Result<JoinTree> {
        if !matches!(root, Node::Table(_)) {
            return Err(Error::invalid_statement("query root must be a table node"));
        }

        let mut tree = JoinTree {
            items: vec![],
            prefix: prefix.to_string(),
            next_alias: 0,
        };
        let alias = tree.next_alias();
        tree.items.push(JoinItem::new(root.clone(), None, alias, None));
        tree.items[0].materialize = true;
        Ok(tree)
    }

    fn next_alias(&mut self) -> String {
        let alias = format!("{}t{}", self.prefix, self.next_alias);
        self.next_alias += 1;
        alias
    }

    pub fn root(&self) -> &JoinItem {
        &self.items[0]
    }

    /// Inserts the chain leading to a table-like node, returning the item for
    /// the node itself. `materialize` marks every item along the chain.
    pub(crate) fn insert(&mut self, node: &Node, materialize: bool) -> Result<usize> {
        let chain = node.table_chain();
        let Some((root, rest)) = chain.split_first() else {
            return Err(Error::invalid_statement(
                "node does not refer to a table".to_string(),
            ));
        };

        if **root != self.items[0].node {
            return Err(Error::invalid_statement(format!(
                "node rooted at `{}` used in a query on `{}`",
                root.table_name().unwrap_or_default(),
                self.items[0].node.table_name().unwrap_or_default(),
            )));
        }

        let mut current = 0;
        for node in rest {
            let existing = self.items[current]
                .children
                .iter()
                .copied()
                .find(|&child| self.items[child].node == **node);

            current = match existing {
                Some(child) => child,
                None => {
                    let assn_alias = match node {
                        Node::ManyMany(_) => Some(self.next_alias()),
                        _ => None,
                    };
                    let alias = self.next_alias();
                    let index = self.items.len();
                    self.items.push(JoinItem::new(
                        (*node).clone(),
                        Some(current),
                        alias,
                        assn_alias,
                    ));
                    self.items[current].children.push(index);
                    index
                }
            };

            if materialize {
                self.items[current].materialize = true;
            }
        }

        Ok(current)
    }

    /// Item for a table-like node already in the tree.
    pub fn find(&self, node: &Node) -> Option<usize> {
        let chain = node.table_chain();
        let (root, rest) = chain.split_first()?;
        if **root != self.items[0].node {
            return None;
        }

        let mut current = 0;
        for node in rest {
            current = self.items[current]
                .children
                .iter()
                .copied()
                .find(|&child| self.items[child].node == **node)?;
        }
        Some(current)
    }

    /// Items in depth-first order, the order JOINs are emitted and rows are
    /// folded.
    pub fn depth_first(&self) -> Vec<usize> {
        let mut order = vec![];
        let mut stack = vec![0];
        while let Some(index) = stack.pop() {
            order.push(index);
            stack.extend(self.items[index].children.iter().rev());
        }
        order
    }

    pub fn table_count(&self) -> usize {
        self.items.len()
    }
}

impl JoinItem {
    fn new(node: Node, parent: Option<usize>, alias: String, assn_alias: Option<String>) -> Self {
        JoinItem {
            node,
            parent,
            children: vec![],
            alias,
            assn_alias,
            condition: None,
            materialize: false,
            expanded: false,
            columns: vec![],
            pk_column: None,
        }
    }

    pub fn table(&self) -> &str {
        self.node.table_name().unwrap_or_default()
    }

    pub fn pk(&self) -> &str {
        self.node.pk_name().unwrap_or_default()
    }

    /// Folds into a list on the parent record.
    pub fn is_folded_collection(&self) -> bool {
        self.node.is_collection() && !self.expanded
    }
}
