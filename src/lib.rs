//! Rebuild a management hierarchy from flat `name,id,manager_id` records.
//!
//! ```
//! use orgtree::domain::RawRecord;
//!
//! let records = vec![
//!     RawRecord::new("alan", "2", "1"),
//!     RawRecord::new("jamie", "1", ""),
//! ];
//! let lines = orgtree::run(&records).unwrap();
//! assert_eq!(lines, vec!["jamie", "\talan"]);
//! ```

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;

pub use domain::{run, DomainError, RawRecord};
