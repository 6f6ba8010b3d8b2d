//! Hash containers and the fingerprint hasher. The `std-hash` feature
//! swaps ahash/hashbrown for std's SipHash.

#[cfg(not(feature = "std-hash"))]
pub mod map {
    pub use hashbrown::{HashMap, HashSet};
}

#[cfg(feature = "std-hash")]
pub mod map {
    pub use std::collections::{HashMap, HashSet};
}

#[cfg(not(feature = "std-hash"))]
pub type FingerprintHasher = ahash::AHasher;

#[cfg(feature = "std-hash")]
pub type FingerprintHasher = std::collections::hash_map::DefaultHasher;
