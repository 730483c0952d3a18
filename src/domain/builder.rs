//! Hierarchy builder: ingests records in any order and resolves forward references.

use std::collections::{HashMap, HashSet};

use tracing::{debug, instrument, trace};

use crate::domain::arena::Tree;
use crate::domain::entities::RawRecord;
use crate::domain::error::{DomainError, DomainResult};

/// A record waiting for its manager, tagged with its input position.
#[derive(Debug, Clone)]
struct PendingRecord {
    position: usize,
    record: RawRecord,
}

/// Builds a `Tree` from records that may reference managers not seen yet.
///
/// Records whose manager is missing are parked under the manager id and attached
/// as soon as that manager is added.
#[derive(Debug, Default)]
pub struct HierarchyBuilder {
    tree: Tree,
    /// Manager id to the records waiting on it, in arrival order
    pending: HashMap<String, Vec<PendingRecord>>,
    seen_ids: HashSet<String>,
}

impl HierarchyBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ingest all records and return the finished tree.
    ///
    /// # Errors
    /// - `DuplicateRoot` / `DuplicateEmployee` as soon as they are encountered
    /// - `UnresolvedEmployees` if any record is still waiting for its manager
    /// - `MissingRoot` if no record without manager was seen
    #[instrument(level = "debug", skip_all, fields(records = records.len()))]
    pub fn build(mut self, records: &[RawRecord]) -> DomainResult<Tree> {
        for (position, record) in records.iter().enumerate() {
            self.ingest(position, record)?;
        }
        self.finish()
    }

    /// Attempt one record; defer it if its manager is not in the tree yet.
    pub fn ingest(&mut self, position: usize, record: &RawRecord) -> DomainResult<()> {
        let claims_second_root = record.is_root() && self.tree.root().is_some();
        if !claims_second_root && !self.seen_ids.insert(record.id.clone()) {
            return Err(DomainError::DuplicateEmployee(record.id.clone()));
        }

        match self.tree.add(record) {
            Ok(_) => {
                trace!(id = %record.id, "attached");
                self.drain(&record.id)
            }
            Err(e) if e.is_unresolved_manager() => {
                trace!(id = %record.id, manager_id = %record.manager_id, "deferred");
                self.pending
                    .entry(record.manager_id.clone())
                    .or_default()
                    .push(PendingRecord {
                        position,
                        record: record.clone(),
                    });
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Attach every record waiting on `manager_id`, then everything waiting on those.
    ///
    /// Uses an explicit stack so deep chains of forward references cannot overflow;
    /// the visiting order is the same as a recursive depth-first drain.
    fn drain(&mut self, manager_id: &str) -> DomainResult<()> {
        let mut stack: Vec<PendingRecord> = Vec::new();
        if let Some(waiting) = self.pending.remove(manager_id) {
            stack.extend(waiting.into_iter().rev());
        }

        while let Some(pending) = stack.pop() {
            self.tree.add(&pending.record)?;
            trace!(id = %pending.record.id, manager_id = %pending.record.manager_id, "resolved");
            if let Some(waiting) = self.pending.remove(&pending.record.id) {
                stack.extend(waiting.into_iter().rev());
            }
        }
        Ok(())
    }

    /// Validate that nothing is left pending and a root exists.
    pub fn finish(self) -> DomainResult<Tree> {
        if !self.pending.is_empty() {
            let mut stranded: Vec<PendingRecord> =
                self.pending.into_values().flatten().collect();
            stranded.sort_by_key(|p| p.position);
            let ids: Vec<String> = stranded.into_iter().map(|p| p.record.id).collect();
            debug!(count = ids.len(), "records left without manager");
            return Err(DomainError::UnresolvedEmployees { ids });
        }
        if self.tree.root().is_none() {
            return Err(DomainError::MissingRoot);
        }
        debug!(employees = self.tree.len(), "hierarchy complete");
        Ok(self.tree)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records(rows: &[(&str, &str, &str)]) -> Vec<RawRecord> {
        rows.iter()
            .map(|(name, id, manager_id)| RawRecord::new(*name, *id, *manager_id))
            .collect()
    }

    fn names(tree: &Tree) -> Vec<(usize, String)> {
        tree.iter()
            .map(|(depth, _, node)| (depth, node.data.name.clone()))
            .collect()
    }

    #[test]
    fn given_reverse_order_chain_when_building_then_resolves_all() {
        let input = records(&[
            ("d", "4", "3"),
            ("c", "3", "2"),
            ("b", "2", "1"),
            ("a", "1", ""),
        ]);
        let tree = HierarchyBuilder::new().build(&input).unwrap();
        assert_eq!(
            names(&tree),
            vec![
                (0, "a".to_string()),
                (1, "b".to_string()),
                (2, "c".to_string()),
                (3, "d".to_string())
            ]
        );
    }

    #[test]
    fn given_pending_siblings_when_manager_arrives_then_keeps_their_order() {
        let input = records(&[
            ("x", "10", "2"),
            ("y", "11", "2"),
            ("root", "1", ""),
            ("mgr", "2", "1"),
        ]);
        let tree = HierarchyBuilder::new().build(&input).unwrap();
        assert_eq!(
            names(&tree),
            vec![
                (0, "root".to_string()),
                (1, "mgr".to_string()),
                (2, "x".to_string()),
                (2, "y".to_string())
            ]
        );
    }

    #[test]
    fn given_deep_forward_chain_when_building_then_no_stack_overflow() {
        let n = 50_000;
        let mut input: Vec<RawRecord> = (1..n)
            .rev()
            .map(|i| RawRecord::new(format!("e{i}"), i.to_string(), (i - 1).to_string()))
            .collect();
        input.push(RawRecord::new("e0", "0", ""));

        let tree = HierarchyBuilder::new().build(&input).unwrap();
        assert_eq!(tree.len(), n);
        assert_eq!(tree.depth(), n);
    }

    #[test]
    fn given_stranded_records_when_finishing_then_reports_ids_in_input_order() {
        let input = records(&[
            ("root", "1", ""),
            ("late", "9", "missing"),
            ("self", "5", "5"),
            ("a", "6", "7"),
            ("b", "7", "6"),
        ]);
        let err = HierarchyBuilder::new().build(&input).unwrap_err();
        assert_eq!(
            err,
            DomainError::UnresolvedEmployees {
                ids: vec!["9".into(), "5".into(), "6".into(), "7".into()]
            }
        );
    }

    #[test]
    fn given_duplicate_pending_id_when_ingesting_then_duplicate_employee() {
        let input = records(&[("a", "2", "1"), ("b", "2", "1"), ("root", "1", "")]);
        let err = HierarchyBuilder::new().build(&input).unwrap_err();
        assert_eq!(err, DomainError::DuplicateEmployee("2".into()));
    }

    #[test]
    fn given_second_root_with_same_id_when_ingesting_then_duplicate_root() {
        let input = records(&[("a", "1", ""), ("b", "1", "")]);
        let err = HierarchyBuilder::new().build(&input).unwrap_err();
        assert!(matches!(err, DomainError::DuplicateRoot { .. }));
    }
}
