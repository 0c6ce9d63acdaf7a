//! # Entity Handles
//!
//! Mesh and dual entities live in [`SlotMap`]s keyed by types declared with
//! `slotmap::new_key_type!`. A removed entry bumps the version of its slot,
//! so a handle issued before the removal misses instead of aliasing the
//! entry that reuses the slot. The helpers here turn those misses into
//! [`MeshError::StaleHandle`].
//!
//! ## Example
//!
//! ```rust
//! use hexmesh::handle::{lookup, Handle};
//! use hexmesh::mesh::VertexId;
//! use slotmap::SlotMap;
//!
//! let mut map: SlotMap<VertexId, &str> = SlotMap::with_key();
//! let a = map.insert("a");
//! map.remove(a);
//! assert!(lookup(&map, a).is_err());
//! assert_eq!(VertexId::from_tag(a.to_tag()), a);
//! ```

use slotmap::{Key, KeyData, SlotMap};

use crate::error::{MeshError, MeshResult};

/// A slot map key naming one kind of entity.
pub trait Handle: Key {
    /// Entity kind used in error messages.
    const KIND: &'static str;

    /// Slot index of the handle.
    fn index(self) -> u32 {
        (self.data().as_ffi() & 0xffff_ffff) as u32
    }

    /// Slot version the handle was issued for.
    fn version(self) -> u32 {
        (self.data().as_ffi() >> 32) as u32
    }

    /// Packs the handle into a tag value.
    fn to_tag(self) -> i64 {
        self.data().as_ffi() as i64
    }

    /// Inverse of [`Handle::to_tag`].
    fn from_tag(value: i64) -> Self {
        Self::from(KeyData::from_ffi(value as u64))
    }

    fn stale(self) -> MeshError {
        MeshError::StaleHandle {
            kind: Self::KIND,
            index: self.index(),
            version: self.version(),
        }
    }
}

/// Returns the entry for `key`, failing on removed or foreign handles.
pub fn lookup<K: Handle, V>(map: &SlotMap<K, V>, key: K) -> MeshResult<&V> {
    map.get(key).ok_or_else(|| key.stale())
}

pub fn lookup_mut<K: Handle, V>(map: &mut SlotMap<K, V>, key: K) -> MeshResult<&mut V> {
    map.get_mut(key).ok_or_else(|| key.stale())
}

pub fn take<K: Handle, V>(map: &mut SlotMap<K, V>, key: K) -> MeshResult<V> {
    map.remove(key).ok_or_else(|| key.stale())
}

/// Removes every entry and retires every outstanding handle.
///
/// Entries are removed from the highest slot down, so later inserts reuse
/// slots in ascending order and a rebuilt map iterates like a fresh one.
pub fn retire_all<K: Handle, V>(map: &mut SlotMap<K, V>) {
    let keys: Vec<K> = map.keys().collect();
    for key in keys.into_iter().rev() {
        map.remove(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::VertexId;

    #[test]
    fn test_removed_key_is_stale() {
        let mut map: SlotMap<VertexId, i32> = SlotMap::with_key();
        let a = map.insert(1);
        assert_eq!(take(&mut map, a).unwrap(), 1);
        assert!(matches!(lookup(&map, a), Err(MeshError::StaleHandle { kind: "vertex", .. })));
        assert!(take(&mut map, a).is_err());
    }

    #[test]
    fn test_reused_slot_does_not_alias_old_key() {
        let mut map: SlotMap<VertexId, i32> = SlotMap::with_key();
        let a = map.insert(1);
        map.remove(a);
        let b = map.insert(2);
        assert_eq!(a.index(), b.index());
        assert_ne!(a, b);
        assert!(lookup(&map, a).is_err());
        assert_eq!(*lookup(&map, b).unwrap(), 2);
    }

    #[test]
    fn test_retire_all_reuses_slots_in_order() {
        let mut map: SlotMap<VertexId, i32> = SlotMap::with_key();
        let keys: Vec<_> = (0..3).map(|i| map.insert(i)).collect();
        retire_all(&mut map);
        assert!(map.is_empty());
        assert!(keys.iter().all(|key| lookup(&map, *key).is_err()));
        let fresh: Vec<_> = (0..3).map(|i| map.insert(i)).collect();
        let indices: Vec<_> = fresh.iter().map(|k| k.index()).collect();
        assert_eq!(indices, vec![0, 1, 2]);
        assert!(fresh.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_tag_value_round_trip() {
        let mut map: SlotMap<VertexId, i32> = SlotMap::with_key();
        let a = map.insert(1);
        map.remove(a);
        let b = map.insert(2);
        assert_eq!(VertexId::from_tag(b.to_tag()), b);
        assert_ne!(a.to_tag(), b.to_tag());
    }
}
