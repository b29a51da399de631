//! Hasher selection for the lookup maps used by bin enumeration and the
//! swap router's touched-array set. Exactly one of the `rustc-hash`,
//! `ahash` or `std-hash` features picks the hasher; any ambiguous
//! combination falls back to the standard library.

#[cfg(all(
    feature = "rustc-hash",
    not(any(feature = "ahash", feature = "std-hash"))
))]
mod selected {
    pub type FastMap<K, V> = rustc_hash::FxHashMap<K, V>;
    pub type FastSet<K> = rustc_hash::FxHashSet<K>;
}

#[cfg(all(
    feature = "ahash",
    not(any(feature = "rustc-hash", feature = "std-hash"))
))]
mod selected {
    pub type FastMap<K, V> = ahash::AHashMap<K, V>;
    pub type FastSet<K> = ahash::AHashSet<K>;
}

#[cfg(any(
    all(
        not(feature = "rustc-hash"),
        not(feature = "ahash"),
        not(feature = "std-hash")
    ),
    feature = "std-hash",
    all(feature = "rustc-hash", feature = "ahash"),
))]
mod selected {
    pub type FastMap<K, V> = std::collections::HashMap<K, V>;
    pub type FastSet<K> = std::collections::HashSet<K>;
}

pub use selected::{FastMap, FastSet};
