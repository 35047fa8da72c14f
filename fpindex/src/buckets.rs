use std::collections::HashMap;

use crate::store::SubFingerprintId;

/// The L independent hash-code -> id-list tables of the multi-table scheme.
///
/// Carries no interior locking: the indexer owns the single guarded region
/// that makes appends across all tables atomic with respect to queries.
pub(crate) struct BucketTables {
    tables: Vec<HashMap<u64, Vec<SubFingerprintId>>>,
}

impl BucketTables {
    /// Creates `count` empty tables. The count is fixed for the lifetime of
    /// the index.
    pub(crate) fn new(count: usize) -> Self {
        Self {
            tables: vec![HashMap::new(); count],
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.tables.len()
    }

    /// Appends `id` to the bucket for `code` in `table`, creating the bucket
    /// on first use.
    pub(crate) fn append(&mut self, table: usize, code: u64, id: SubFingerprintId) {
        self.tables[table].entry(code).or_default().push(id);
    }

    /// Returns the ids bucketed under `code` in `table`; empty when the
    /// bucket does not exist.
    pub(crate) fn ids_at(&self, table: usize, code: u64) -> &[SubFingerprintId] {
        self.tables[table].get(&code).map_or(&[], Vec::as_slice)
    }
}
