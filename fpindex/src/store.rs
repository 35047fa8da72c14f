use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::track::TrackRef;

/// Unique identifier of a stored sub-fingerprint.
///
/// Allocated by the indexer, strictly increasing from 1, never reused within
/// the process lifetime.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct SubFingerprintId(pub u64);

impl fmt::Display for SubFingerprintId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sfp:{}", self.0)
    }
}

/// A stored sub-fingerprint: the hash signature of one short audio
/// time-window, described by one 64-bit hash code per bucket table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubFingerprint {
    pub id: SubFingerprintId,

    /// Track owning this sub-fingerprint.
    pub track: TrackRef,

    /// Exactly one hash code per bucket table.
    pub hashes: Vec<u64>,

    /// Position of this signature within its track.
    pub sequence_number: u32,

    /// Offset of this signature within its track, in seconds.
    pub sequence_at: f64,
}

/// Compact per-track view of a stored sub-fingerprint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HashedFingerprint {
    /// Compact byte encoding of the hash codes.
    pub encoded: Vec<u8>,

    /// Raw hash codes.
    pub hashes: Vec<u64>,

    pub sequence_number: u32,
    pub sequence_at: f64,

    /// Hash-bin snapshot, set exactly once when the owning insert commits.
    /// `None` only while that insert is still in flight.
    hash_bins: Option<Vec<u64>>,
}

impl HashedFingerprint {
    pub(crate) fn new(
        encoded: Vec<u8>,
        hashes: Vec<u64>,
        sequence_number: u32,
        sequence_at: f64,
    ) -> Self {
        Self {
            encoded,
            hashes,
            sequence_number,
            sequence_at,
            hash_bins: None,
        }
    }

    /// Returns the finalized hash-bin snapshot, or `None` if the owning
    /// insert has not committed yet.
    pub fn hash_bins(&self) -> Option<&[u64]> {
        self.hash_bins.as_deref()
    }
}

/// Insertion-ordered mapping from sub-fingerprint id to its compact view.
///
/// Safe for concurrent use; iteration order is insertion order.
pub(crate) struct TrackViews {
    inner: RwLock<TrackViewsInner>,
}

#[derive(Default)]
struct TrackViewsInner {
    order: Vec<SubFingerprintId>,
    views: HashMap<SubFingerprintId, HashedFingerprint>,
}

impl TrackViews {
    fn new() -> Self {
        Self {
            inner: RwLock::new(TrackViewsInner::default()),
        }
    }

    pub(crate) fn insert(&self, id: SubFingerprintId, view: HashedFingerprint) {
        let mut inner = self.inner.write();
        if inner.views.insert(id, view).is_none() {
            inner.order.push(id);
        }
    }

    /// Sets the hash-bin snapshot for `id`. Called once per id, inside the
    /// indexer's commit critical section.
    pub(crate) fn finalize(&self, id: SubFingerprintId, bins: &[u64]) {
        let mut inner = self.inner.write();
        if let Some(view) = inner.views.get_mut(&id) {
            debug_assert!(view.hash_bins.is_none(), "snapshot already set for {id}");
            view.hash_bins = Some(bins.to_vec());
        }
    }

    /// Returns all views in insertion order.
    pub(crate) fn snapshot(&self) -> Vec<HashedFingerprint> {
        let inner = self.inner.read();
        inner
            .order
            .iter()
            .map(|id| inner.views[id].clone())
            .collect()
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.inner.read().order.len()
    }
}

/// Holds every stored record plus the per-track view registry.
///
/// Both maps are internally synchronized; readers never touch the indexer's
/// commit lock.
pub(crate) struct RecordStore {
    records: RwLock<HashMap<SubFingerprintId, Arc<SubFingerprint>>>,
    tracks: RwLock<HashMap<TrackRef, Arc<TrackViews>>>,
}

impl RecordStore {
    pub(crate) fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
            tracks: RwLock::new(HashMap::new()),
        }
    }

    pub(crate) fn get(&self, id: SubFingerprintId) -> Option<Arc<SubFingerprint>> {
        self.records.read().get(&id).cloned()
    }

    /// Stores `record` under its id. Ids are unique by construction, so an
    /// existing entry is never overwritten.
    pub(crate) fn put(&self, record: Arc<SubFingerprint>) {
        let prev = self.records.write().insert(record.id, record);
        debug_assert!(prev.is_none(), "sub-fingerprint id reused");
    }

    pub(crate) fn len(&self) -> usize {
        self.records.read().len()
    }

    /// Returns the view mapping for `track`, creating it if absent.
    /// Concurrent first-inserts for the same track land in the same mapping.
    pub(crate) fn track_views(&self, track: &TrackRef) -> Arc<TrackViews> {
        if let Some(views) = self.tracks.read().get(track) {
            return views.clone();
        }
        self.tracks
            .write()
            .entry(track.clone())
            .or_insert_with(|| Arc::new(TrackViews::new()))
            .clone()
    }

    /// Returns the compact views stored for `track` in insertion order;
    /// empty for unknown tracks.
    pub(crate) fn views_for(&self, track: &TrackRef) -> Vec<HashedFingerprint> {
        match self.tracks.read().get(track) {
            Some(views) => views.snapshot(),
            None => Vec::new(),
        }
    }
}
