//! # SetCache
//!
//! SetCache is a library for simulating a single set-associative cache
//!
//! It replays a trace of addresses against a cache with a least recently used or least frequently
//! used replacement policy, classifying every access as a hit or a miss, and summarises the miss
//! rate and the cycles spent
//!
//! The eviction behaviour matches the C simulator the reference traces were recorded with,
//! including its quirks, which are documented on the policies

/// Contains the pure bit arithmetic splitting an address into tag, set index and block offset
pub mod address;

/// Contains the implementation of the cache, and a utility enum for the existing cache types
pub mod cache;

/// Contains the cache configuration, and its validation
pub mod config;

/// Contains reading inputs, parsing the configuration record, and writing reports
pub mod io;

/// Contains the provided replacement policies, with a trait for implementing custom replacement
/// policies
pub mod replacement_policies;

/// Contains the simulator used to replay a trace with a given cache configuration
pub mod simulator;
// Generated from the build.rs, private
mod hex {
    include!(concat!(env!("OUT_DIR"), "/hex.rs"));
}
#[cfg(test)]
mod test;

/// Contains utilities for running tests and benchmarks.
pub mod util;
