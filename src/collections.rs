use std::hash::BuildHasherDefault;
use indexmap::IndexMap;
use rustc_hash::FxHasher;


/// Use indexmap for fast lookups and stable iteration order, rustc_hash for fast hashing
pub(crate) type FxIndexMap<K, V> = IndexMap<K, V, BuildHasherDefault<FxHasher>>;

/// Plain hash map for lookups where order never matters
pub(crate) type FxHashMap<K, V> = rustc_hash::FxHashMap<K, V>;
