//! Domain layer: employee records, the management tree and its rendering
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod arena;
pub mod builder;
pub mod entities;
pub mod error;
pub mod import;
pub mod render;

pub use arena::{EmployeeData, Tree, TreeNode};
pub use builder::HierarchyBuilder;
pub use entities::*;
pub use error::{DomainError, DomainResult};
pub use import::{run, run_with_indent};
pub use render::{render, TreeView, DEFAULT_INDENT};
