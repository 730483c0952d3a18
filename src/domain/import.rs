//! Import pipeline: records in, rendered lines out.

use tracing::instrument;

use crate::domain::builder::HierarchyBuilder;
use crate::domain::entities::RawRecord;
use crate::domain::error::DomainResult;
use crate::domain::render::{render, DEFAULT_INDENT};

/// Build the hierarchy from `records` and render it with tab indentation.
///
/// Returns the first error from either stage; no partial output on failure.
pub fn run(records: &[RawRecord]) -> DomainResult<Vec<String>> {
    run_with_indent(records, DEFAULT_INDENT)
}

/// Same as [`run`] with a custom indentation unit.
#[instrument(level = "debug", skip(records), fields(records = records.len()))]
pub fn run_with_indent(records: &[RawRecord], indent: &str) -> DomainResult<Vec<String>> {
    let tree = HierarchyBuilder::new().build(records)?;
    render(&tree, indent)
}
