//! Hierarchy import service
//!
//! Reads a record file, rebuilds the management tree and renders it.

use std::io::ErrorKind;
use std::path::Path;
use std::sync::Arc;

use tracing::{debug, instrument};

use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::config::Settings;
use crate::domain::{render, HierarchyBuilder, RawRecord, RecordFile, Tree};
use crate::infrastructure::traits::FileSystem;

/// Key figures of an imported hierarchy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HierarchySummary {
    /// Name of the root employee
    pub root: String,
    pub employees: usize,
    /// Number of levels, the root alone counts as 1
    pub depth: usize,
    /// Employees without direct reports
    pub leaves: usize,
}

/// Service for importing employee records into a hierarchy.
pub struct HierarchyService {
    fs: Arc<dyn FileSystem>,
    settings: Arc<Settings>,
}

impl HierarchyService {
    /// Create a new hierarchy service.
    pub fn new(fs: Arc<dyn FileSystem>, settings: Arc<Settings>) -> Self {
        Self { fs, settings }
    }

    /// Build the hierarchy from in-memory records and render it.
    ///
    /// Uses the configured indentation unit.
    pub fn run(&self, records: &[RawRecord]) -> ApplicationResult<Vec<String>> {
        let tree = HierarchyBuilder::new().build(records)?;
        Ok(render(&tree, &self.settings.indent)?)
    }

    /// Read and parse the records of `path`.
    #[instrument(level = "debug", skip(self))]
    pub fn read_records(&self, path: &Path) -> ApplicationResult<Vec<RawRecord>> {
        if !self.fs.is_file(path) {
            return Err(ApplicationError::InputNotFound(path.to_path_buf()));
        }
        let content = match self.fs.read_to_string(path) {
            Err(e) if e.kind() == ErrorKind::InvalidData => {
                return Err(ApplicationError::InvalidEncoding(path.to_path_buf()))
            }
            result => result.with_path_context("read records", path)?,
        };
        let file = RecordFile::parse(&content, self.settings.record_format())?;
        debug!("read_records: {} records from {}", file.records.len(), path.display());
        Ok(file.records)
    }

    /// Rebuild the management tree described by `path`.
    pub fn import_file(&self, path: &Path) -> ApplicationResult<Tree> {
        let records = self.read_records(path)?;
        Ok(HierarchyBuilder::new().build(&records)?)
    }

    /// Rebuild the tree from `path` and render it as indented lines.
    pub fn render_file(&self, path: &Path) -> ApplicationResult<Vec<String>> {
        let records = self.read_records(path)?;
        self.run(&records)
    }

    /// Validate `path` and report its key figures.
    pub fn summarize_file(&self, path: &Path) -> ApplicationResult<HierarchySummary> {
        let tree = self.import_file(path)?;
        let root = tree
            .root()
            .and_then(|idx| tree.get_node(idx))
            .map(|node| node.data.name.clone())
            .unwrap_or_default();
        Ok(HierarchySummary {
            root,
            employees: tree.len(),
            depth: tree.depth(),
            leaves: tree.leaf_nodes().len(),
        })
    }
}
