//! Rendering of a finished hierarchy.

use std::fmt;

use generational_arena::Index;
use tracing::instrument;

use crate::domain::arena::{Tree, TreeNode};
use crate::domain::error::{DomainError, DomainResult};

/// Default indentation unit: one tab per level.
pub const DEFAULT_INDENT: &str = "\t";

/// Render the hierarchy as one line per employee, indented by depth.
///
/// Pre-order walk from the root; siblings appear in arrival order.
#[instrument(level = "debug", skip(tree))]
pub fn render(tree: &Tree, indent: &str) -> DomainResult<Vec<String>> {
    if tree.root().is_none() {
        return Err(DomainError::MissingRoot);
    }
    Ok(tree
        .iter()
        .map(|(depth, _, node)| format_row(&node.data.name, depth, indent))
        .collect())
}

/// A single output row: `indent` repeated `depth` times, then the name.
pub fn format_row(name: &str, depth: usize, indent: &str) -> String {
    format!("{}{}", indent.repeat(depth), name)
}

/// Box-drawing view of the hierarchy (`├──`, `└──`), one employee per line.
///
/// Written straight from the pre-order iterator, so arbitrarily deep chains
/// need no recursion. The prefix is kept as a stack of column segments.
pub struct TreeView<'a> {
    tree: &'a Tree,
}

impl<'a> TreeView<'a> {
    pub fn new(tree: &'a Tree) -> Self {
        Self { tree }
    }

    fn is_last_child(&self, idx: Index, node: &TreeNode) -> bool {
        node.manager
            .and_then(|manager| self.tree.get_node(manager))
            .map(|manager| manager.children.last() == Some(&idx))
            .unwrap_or(true)
    }
}

impl fmt::Display for TreeView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut prefix = String::new();
        let mut segments: Vec<usize> = Vec::new();

        for (depth, idx, node) in self.tree.iter() {
            if depth == 0 {
                writeln!(f, "{}", node.data.name)?;
                continue;
            }
            while segments.len() >= depth {
                if let Some(len) = segments.pop() {
                    prefix.truncate(prefix.len() - len);
                }
            }

            let last = self.is_last_child(idx, node);
            let connector = if last { "└── " } else { "├── " };
            writeln!(f, "{}{}{}", prefix, connector, node.data.name)?;

            let segment = if last { "    " } else { "│   " };
            prefix.push_str(segment);
            segments.push(segment.len());
        }
        Ok(())
    }
}
