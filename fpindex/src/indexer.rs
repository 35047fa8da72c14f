use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::buckets::BucketTables;
use crate::encoder::{CompactEncoder, HashEncoder};
use crate::error::FpIndexError;
use crate::store::{HashedFingerprint, RecordStore, SubFingerprint, SubFingerprintId};
use crate::track::{MemoryTrackRegistry, TrackRef, TrackRegistry};

/// Controls index shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Number of bucket tables (L). Every sub-fingerprint supplies exactly
    /// one hash code per table. Fixed for the lifetime of the index.
    pub tables: usize,

    /// Bytes per hash code in the compact encoded form.
    /// Default: 4.
    pub hash_width: usize,
}

impl Config {
    fn with_defaults(mut self) -> Self {
        if self.hash_width == 0 {
            self.hash_width = 4;
        }
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tables: 25,
            hash_width: 4,
        }
    }
}

/// Multi-table hash-bucket index over audio sub-fingerprints.
///
/// Thread-safe: all methods can be called concurrently. A thread that
/// completed an [`Indexer::insert`] observes its own record in any later
/// call it issues.
pub struct Indexer {
    cfg: Config,
    counter: AtomicU64,
    store: RecordStore,
    tables: RwLock<BucketTables>,
    registry: Arc<dyn TrackRegistry>,
    encoder: Box<dyn HashEncoder>,
}

impl Indexer {
    /// Creates a new Indexer. Panics if `cfg.tables` is 0.
    pub fn new(
        cfg: Config,
        registry: Arc<dyn TrackRegistry>,
        encoder: Box<dyn HashEncoder>,
    ) -> Self {
        assert!(cfg.tables > 0, "fpindex: Config.tables must be positive");
        let cfg = cfg.with_defaults();
        Self {
            counter: AtomicU64::new(0),
            store: RecordStore::new(),
            tables: RwLock::new(BucketTables::new(cfg.tables)),
            registry,
            encoder,
            cfg,
        }
    }

    /// Creates a new Indexer with an empty in-memory track registry and the
    /// default compact encoder.
    pub fn with_memory_registry(cfg: Config) -> Self {
        Self::new(
            cfg,
            Arc::new(MemoryTrackRegistry::new()),
            Box::new(CompactEncoder),
        )
    }

    /// Returns the number of bucket tables (L).
    pub fn tables(&self) -> usize {
        self.cfg.tables
    }

    /// Returns the number of stored sub-fingerprints.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Returns true if nothing has been inserted.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check_len(&self, hashes: &[u64]) -> Result<(), FpIndexError> {
        if hashes.len() != self.cfg.tables {
            return Err(FpIndexError::HashLengthMismatch {
                expected: self.cfg.tables,
                got: hashes.len(),
            });
        }
        Ok(())
    }

    /// Stores one sub-fingerprint and indexes it into every bucket table.
    ///
    /// The record becomes visible to queries only once its id has been
    /// appended to all L tables and the per-track snapshot is finalized; a
    /// concurrent query never observes a partially committed record.
    ///
    /// Fails with [`FpIndexError::HashLengthMismatch`] before any mutation
    /// if `hashes` does not supply exactly one code per table.
    pub fn insert(
        &self,
        hashes: &[u64],
        sequence_number: u32,
        sequence_at: f64,
        track: &TrackRef,
    ) -> Result<SubFingerprintId, FpIndexError> {
        self.check_len(hashes)?;

        // Lock-free allocation; ids start at 1. Allocation order across
        // threads is independent of commit order.
        let id = SubFingerprintId(self.counter.fetch_add(1, Ordering::Relaxed) + 1);

        self.store.put(Arc::new(SubFingerprint {
            id,
            track: track.clone(),
            hashes: hashes.to_vec(),
            sequence_number,
            sequence_at,
        }));

        let views = self.store.track_views(track);
        let encoded = self
            .encoder
            .encode(hashes, hashes.len() * self.cfg.hash_width);
        views.insert(
            id,
            HashedFingerprint::new(encoded, hashes.to_vec(), sequence_number, sequence_at),
        );

        // Commit: the L table appends plus the snapshot finalize must appear
        // atomically to queries.
        {
            let mut tables = self.tables.write();
            for (table, &code) in hashes.iter().enumerate() {
                tables.append(table, code, id);
            }
            views.finalize(id, hashes);
        }

        trace!(%id, track = %track, sequence_number, "committed sub-fingerprint");
        Ok(id)
    }

    /// Returns the stored record for `id`, or `None` if unknown.
    pub fn read_by_id(&self, id: SubFingerprintId) -> Option<Arc<SubFingerprint>> {
        self.store.get(id)
    }

    /// Returns the compact views of every sub-fingerprint stored for
    /// `track`, in insertion order. Empty for unknown tracks.
    pub fn read_by_track(&self, track: &TrackRef) -> Vec<HashedFingerprint> {
        self.store.views_for(track)
    }

    /// Returns every stored record sharing at least `threshold` bucket
    /// collisions with the probe.
    ///
    /// One vote is tallied per table whose bucket at `hashes[l]` contains a
    /// candidate; the tally is discarded after the call. The result is an
    /// unordered set, deduplicated by id. `threshold > L` always yields an
    /// empty result; `threshold <= 1` accepts any candidate seen in at least
    /// one table. Cost is O(L + total bucket hits scanned).
    pub fn query(
        &self,
        hashes: &[u64],
        threshold: usize,
    ) -> Result<Vec<Arc<SubFingerprint>>, FpIndexError> {
        self.check_len(hashes)?;

        let mut votes: HashMap<SubFingerprintId, usize> = HashMap::new();
        {
            let tables = self.tables.read();
            for (table, &code) in hashes.iter().enumerate() {
                for &id in tables.ids_at(table, code) {
                    *votes.entry(id).or_insert(0) += 1;
                }
            }
        }

        let matches: Vec<Arc<SubFingerprint>> = votes
            .into_iter()
            .filter(|&(_, count)| count >= threshold)
            .filter_map(|(id, _)| self.store.get(id))
            .collect();
        debug!(candidates = matches.len(), threshold, "vote query");
        Ok(matches)
    }

    /// Like [`Indexer::query`], restricted to tracks belonging to
    /// `group_id`.
    ///
    /// A group owning zero tracks short-circuits to an empty result without
    /// scanning any bucket table.
    pub fn query_in_group(
        &self,
        hashes: &[u64],
        threshold: usize,
        group_id: &str,
    ) -> Result<Vec<Arc<SubFingerprint>>, FpIndexError> {
        let tracks: HashSet<TrackRef> =
            self.registry.tracks_in_group(group_id).into_iter().collect();
        if tracks.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self
            .query(hashes, threshold)?
            .into_iter()
            .filter(|record| tracks.contains(&record.track))
            .collect())
    }

    /// Runs [`Indexer::query`] for every probe and unions the results into
    /// one set, deduplicated by id. Probe order does not affect the
    /// resulting set.
    pub fn query_batch(
        &self,
        probes: &[Vec<u64>],
        threshold: usize,
    ) -> Result<Vec<Arc<SubFingerprint>>, FpIndexError> {
        let mut seen = HashSet::new();
        let mut all = Vec::new();
        for probe in probes {
            for record in self.query(probe, threshold)? {
                if seen.insert(record.id) {
                    all.push(record);
                }
            }
        }
        Ok(all)
    }
}
