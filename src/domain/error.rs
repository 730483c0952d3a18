//! Domain-level errors (no external dependencies)

use itertools::Itertools;
use thiserror::Error;

/// Domain errors represent structural violations in the employee records.
/// These are independent of infrastructure concerns.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A second record without a manager arrived after the root was set.
    #[error("multiple roots: {id} has no manager but {root} is already the root")]
    DuplicateRoot { id: String, root: String },

    /// No record without a manager was ever seen.
    #[error("no root employee found (exactly one record must have an empty manager id)")]
    MissingRoot,

    /// The manager of a record is not (yet) in the tree.
    ///
    /// Only used between `Tree::add` and the hierarchy builder, which defers the
    /// record instead of failing.
    #[error("manager {manager_id} of employee {id} not found")]
    UnresolvedManager { id: String, manager_id: String },

    /// Records left waiting for a manager after ingestion.
    /// Covers missing managers, self-managed employees and manager cycles.
    #[error("employees without a valid manager: {}", .ids.iter().join(", "))]
    UnresolvedEmployees { ids: Vec<String> },

    #[error("duplicate employee id: {0}")]
    DuplicateEmployee(String),

    #[error("invalid record on line {line}: {message}")]
    InvalidRecord { line: usize, message: String },
}

impl DomainError {
    /// True for the transient signal that the builder absorbs by deferring.
    pub fn is_unresolved_manager(&self) -> bool {
        matches!(self, DomainError::UnresolvedManager { .. })
    }
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
