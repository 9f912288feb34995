//! # Linear Probing Hash Map
//!
//! A Rust implementation of an open-addressed hash table with linear probing.
//!
//! `LinearHashMap` stores every entry directly in its slot array. A key lives in the first
//! free slot at or after its home slot, wrapping around the end of the array. The table
//! doubles before an insert would push occupancy above the load factor threshold, and
//! removals repair the following cluster instead of leaving tombstones.
//!
//! ## Basic Usage
//!
//! ```rust
//! use probemap::{LinearHashMap, TableError};
//!
//! // Create a new hash map with the default capacity of 8 slots
//! let mut map = LinearHashMap::new();
//!
//! // Insert values
//! map.insert("key1".to_string(), 1);
//! map.insert("key2".to_string(), 2);
//! map.insert("key3".to_string(), 3);
//!
//! // Look up values
//! assert_eq!(map.search("key2"), Ok(&2));
//!
//! // Update values in place
//! assert_eq!(map.insert("key1".to_string(), 10), Some(1));
//! assert_eq!(map.len(), 3);
//!
//! // Remove values; absent keys are reported as errors
//! assert_eq!(map.remove("key2"), Ok(2));
//! assert_eq!(map.search("key2"), Err(TableError::NotFound));
//! assert_eq!(map.remove("key2"), Err(TableError::NotFound));
//! ```
//!
//! ## Growth
//!
//! ```rust
//! use probemap::LinearHashMap;
//!
//! let mut map = LinearHashMap::new();
//! for i in 0..6 {
//!     map.insert(i, i);
//! }
//! assert_eq!(map.capacity(), 8);
//!
//! // The seventh key would push occupancy past 80%
//! map.insert(6, 6);
//! assert_eq!(map.capacity(), 16);
//! ```

/// Error type for failed lookups
mod error;
/// Module implementing the linear probing hash map
mod linear_map;
/// Displacement statistics
mod stats;
/// Utility traits for the hash map
mod utils;

pub use error::TableError;
pub use linear_map::{DEFAULT_CAPACITY, DEFAULT_LOAD_FACTOR_THRESHOLD, Iter, LinearHashMap};
pub use stats::ProbeStats;
pub use utils::HashMapExtensions;
