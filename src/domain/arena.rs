//! Arena-based management tree.
//!
//! Nodes are owned by the arena; children and manager links are plain `Index`
//! handles, so a manager link never keeps a node alive.

use std::collections::HashMap;
use std::fmt;

use generational_arena::{Arena, Index};
use tracing::instrument;

use crate::domain::entities::RawRecord;
use crate::domain::error::{DomainError, DomainResult};

/// Data payload for tree nodes representing employees.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmployeeData {
    pub name: String,
    pub id: String,
}

impl fmt::Display for EmployeeData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Tree node in the arena-based hierarchy structure.
#[derive(Debug)]
pub struct TreeNode {
    /// Employee data for this node
    pub data: EmployeeData,
    /// Index of the manager node in the arena, None for the root
    pub manager: Option<Index>,
    /// Indices of direct reports, in arrival order
    pub children: Vec<Index>,
}

/// Management hierarchy: one root, every other employee has exactly one manager.
#[derive(Debug)]
pub struct Tree {
    /// Arena storage for all tree nodes
    arena: Arena<TreeNode>,
    /// Employee id to arena index
    nodes_by_id: HashMap<String, Index>,
    /// Index of the root node, None until a record without manager is added
    root: Option<Index>,
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

impl Tree {
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
            nodes_by_id: HashMap::new(),
            root: None,
        }
    }

    /// Attach a single record to the tree.
    ///
    /// A record without manager becomes the root. Any other record is appended to
    /// its manager's children. Fails with `UnresolvedManager` when the manager is
    /// not in the tree yet; the tree is left untouched in every error case.
    #[instrument(level = "trace", skip(self), fields(id = %record.id))]
    pub fn add(&mut self, record: &RawRecord) -> DomainResult<Index> {
        if record.is_root() {
            if let Some(root) = self.root_data() {
                return Err(DomainError::DuplicateRoot {
                    id: record.id.clone(),
                    root: root.id.clone(),
                });
            }
        }
        if self.nodes_by_id.contains_key(&record.id) {
            return Err(DomainError::DuplicateEmployee(record.id.clone()));
        }

        let manager = if record.is_root() {
            None
        } else {
            let manager_idx = self.index_of(&record.manager_id).ok_or_else(|| {
                DomainError::UnresolvedManager {
                    id: record.id.clone(),
                    manager_id: record.manager_id.clone(),
                }
            })?;
            Some(manager_idx)
        };

        let data = EmployeeData {
            name: record.name.clone(),
            id: record.id.clone(),
        };
        Ok(self.insert_node(data, manager))
    }

    fn insert_node(&mut self, data: EmployeeData, manager: Option<Index>) -> Index {
        let id = data.id.clone();
        let node = TreeNode {
            data,
            manager,
            children: Vec::new(),
        };
        let node_idx = self.arena.insert(node);

        if let Some(manager_idx) = manager {
            if let Some(manager) = self.arena.get_mut(manager_idx) {
                manager.children.push(node_idx);
            }
        } else {
            self.root = Some(node_idx);
        }

        self.nodes_by_id.insert(id, node_idx);
        node_idx
    }

    pub fn get_node(&self, idx: Index) -> Option<&TreeNode> {
        self.arena.get(idx)
    }

    /// Look up an employee by id.
    pub fn index_of(&self, id: &str) -> Option<Index> {
        self.nodes_by_id.get(id).copied()
    }

    pub fn get_by_id(&self, id: &str) -> Option<&TreeNode> {
        self.index_of(id).and_then(|idx| self.get_node(idx))
    }

    /// Manager of the given employee, None for the root or unknown ids.
    pub fn manager_of(&self, id: &str) -> Option<&TreeNode> {
        self.get_by_id(id)
            .and_then(|node| node.manager)
            .and_then(|idx| self.get_node(idx))
    }

    pub fn root(&self) -> Option<Index> {
        self.root
    }

    fn root_data(&self) -> Option<&EmployeeData> {
        self.root.and_then(|idx| self.get_node(idx)).map(|n| &n.data)
    }

    pub fn len(&self) -> usize {
        self.nodes_by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes_by_id.is_empty()
    }

    /// Pre-order walk from the root, yielding the depth of every node.
    pub fn iter(&self) -> TreeIterator<'_> {
        TreeIterator::new(self)
    }

    /// Number of levels in the tree (a lone root has depth 1, an empty tree 0).
    #[instrument(level = "debug", skip(self))]
    pub fn depth(&self) -> usize {
        self.iter().map(|(depth, _, _)| depth + 1).max().unwrap_or(0)
    }

    /// Names of all employees without direct reports, in pre-order.
    #[instrument(level = "debug", skip(self))]
    pub fn leaf_nodes(&self) -> Vec<String> {
        self.iter()
            .filter(|(_, _, node)| node.children.is_empty())
            .map(|(_, _, node)| node.data.name.clone())
            .collect()
    }
}

/// Depth-first pre-order iterator; children are visited in arrival order.
pub struct TreeIterator<'a> {
    tree: &'a Tree,
    stack: Vec<(usize, Index)>,
}

impl<'a> TreeIterator<'a> {
    fn new(tree: &'a Tree) -> Self {
        let mut stack = Vec::new();
        if let Some(root) = tree.root() {
            stack.push((0, root));
        }
        Self { tree, stack }
    }
}

impl<'a> Iterator for TreeIterator<'a> {
    type Item = (usize, Index, &'a TreeNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((depth, current_idx)) = self.stack.pop() {
            if let Some(node) = self.tree.get_node(current_idx) {
                // Push children in reverse order for left-to-right traversal
                for &child in node.children.iter().rev() {
                    self.stack.push((depth + 1, child));
                }
                return Some((depth, current_idx, node));
            }
        }
        None
    }
}
