//! # SetCache
//!
//! SetCache replays memory access traces against a configurable set-associative cache, counting
//! hits and misses and estimating the cycles spent
//!
//! It provides a cache parameterised by a replacement policy (LRU or FIFO), with write-allocate
//! or write-around on store misses and write-through or write-back on store hits, and a simulator
//! which runs text traces through it
//!
//! The cost model is a simple additive one, it models structure and policy, not real memory
//! timing

/// Splits addresses into tag, set index, and block offset
pub mod address;

/// Contains the implementation of the cache, its block storage, and a utility enum over the
/// provided replacement policies
pub mod cache;

/// Contains the raw (JSON) and validated cache configurations
pub mod config;

/// The cycle cost model
pub mod cost;

/// Errors for configurations and traces
pub mod error;

/// Loading trace files
pub mod io;

/// Contains the provided replacement policies, with a trait for implementing custom replacement
/// policies
pub mod replacement_policies;

/// Contains the simulator used to replay a trace through a cache
pub mod simulator;

/// The counters collected by a simulation
pub mod stats;

/// Parsing of the trace format
pub mod trace;

// Generated from the build.rs, private
mod hex {
    include!(concat!(env!("OUT_DIR"), "/hex.rs"));
}
#[cfg(test)]
mod test;

/// Contains utilities for running tests and benchmarks.
pub mod util;
