//! Hash collections backed by AHash.
//!
//! Texture-keyed lookups (picking offsets, bind-group caches) sit on hot
//! paths, so the whole workspace uses these instead of the std hasher.

pub use ahash::{AHashMap as HashMap, AHashSet as HashSet, RandomState};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hashmap_overwrite_keeps_single_entry() {
        let mut map = HashMap::new();
        map.insert(7u32, 10usize);
        map.insert(7u32, 42usize);
        assert_eq!(map.len(), 1);
        assert_eq!(map.get(&7), Some(&42));
    }

    #[test]
    fn test_hashset() {
        let mut set = HashSet::new();
        set.insert(42u64);
        assert!(set.contains(&42));
        assert!(!set.contains(&43));
    }
}
