use std::collections::HashMap;
use std::fmt;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// Opaque reference to a track owning sub-fingerprints.
///
/// The index never interprets the contents; it only relies on equality and
/// hashing for use as a map key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrackRef(String);

impl TrackRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TrackRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Resolves group membership for group-filtered queries.
///
/// Track metadata itself lives outside the index; this is the one operation
/// the voting core needs from it. Implementations must be safe for
/// concurrent use.
pub trait TrackRegistry: Send + Sync {
    /// Returns every track belonging to `group_id`; empty if the group is
    /// unknown or owns no tracks.
    fn tracks_in_group(&self, group_id: &str) -> Vec<TrackRef>;
}

/// In-memory [`TrackRegistry`] implementation.
/// Data is lost on restart. Suitable for testing or ephemeral use.
#[derive(Default)]
pub struct MemoryTrackRegistry {
    groups: RwLock<HashMap<TrackRef, String>>,
}

impl MemoryTrackRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assigns `track` to `group_id`, replacing any previous assignment.
    pub fn register(&self, track: TrackRef, group_id: impl Into<String>) {
        self.groups.write().insert(track, group_id.into());
    }
}

impl TrackRegistry for MemoryTrackRegistry {
    fn tracks_in_group(&self, group_id: &str) -> Vec<TrackRef> {
        self.groups
            .read()
            .iter()
            .filter(|(_, group)| group.as_str() == group_id)
            .map(|(track, _)| track.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_group_members() {
        let reg = MemoryTrackRegistry::new();
        reg.register(TrackRef::new("t1"), "rock");
        reg.register(TrackRef::new("t2"), "rock");
        reg.register(TrackRef::new("t3"), "jazz");

        let mut rock = reg.tracks_in_group("rock");
        rock.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        assert_eq!(rock, vec![TrackRef::new("t1"), TrackRef::new("t2")]);
        assert_eq!(reg.tracks_in_group("jazz"), vec![TrackRef::new("t3")]);
    }

    #[test]
    fn unknown_group_is_empty() {
        let reg = MemoryTrackRegistry::new();
        reg.register(TrackRef::new("t1"), "rock");
        assert!(reg.tracks_in_group("metal").is_empty());
    }

    #[test]
    fn register_replaces_previous_group() {
        let reg = MemoryTrackRegistry::new();
        reg.register(TrackRef::new("t1"), "rock");
        reg.register(TrackRef::new("t1"), "jazz");
        assert!(reg.tracks_in_group("rock").is_empty());
        assert_eq!(reg.tracks_in_group("jazz"), vec![TrackRef::new("t1")]);
    }
}
