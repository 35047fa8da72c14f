//! In-memory candidate-retrieval index for audio fingerprinting.
//!
//! Stores sub-fingerprints — compact hash signatures of short audio
//! time-windows — across L independent hash-bucket tables and answers
//! approximate-match queries by thresholded bucket-collision voting:
//!
//! 1. [`Indexer::insert`]: one 64-bit hash code per table -> record committed
//!    into every table atomically
//! 2. [`Indexer::query`]: probe codes -> one vote per bucket collision ->
//!    candidates with at least `threshold` votes
//!
//! # Voting
//!
//! A stored sub-fingerprint collects one vote for every table in which it
//! shares a bucket with the probe. With L tables a candidate scores at most
//! L votes, so `threshold > L` never matches and `threshold <= 1`
//! degenerates to "seen in any table".
//!
//! # Concurrency
//!
//! All methods take `&self` and are safe to call from multiple threads. Id
//! allocation is lock-free; the only exclusive section is the per-insert
//! commit covering the L table appends plus the per-track snapshot, so a
//! query never observes a half-indexed record.
//!
//! # Usage
//!
//! ```
//! use fpindex::{Config, Indexer, TrackRef};
//!
//! let idx = Indexer::with_memory_registry(Config { tables: 3, hash_width: 4 });
//! let track = TrackRef::new("track:001");
//!
//! let id = idx.insert(&[1, 2, 3], 0, 0.0, &track).unwrap();
//!
//! let matches = idx.query(&[1, 2, 9], 2).unwrap();
//! assert_eq!(matches[0].id, id);
//! ```

mod buckets;
mod encoder;
mod error;
mod indexer;
mod store;
mod track;

pub use encoder::{CompactEncoder, HashEncoder};
pub use error::FpIndexError;
pub use indexer::{Config, Indexer};
pub use store::{HashedFingerprint, SubFingerprint, SubFingerprintId};
pub use track::{MemoryTrackRegistry, TrackRef, TrackRegistry};
