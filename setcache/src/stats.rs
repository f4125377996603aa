use std::fmt;
use serde::{Deserialize, Serialize};

/// Counters for a simulation. Can be serialised to JSON, or displayed in the plain text format
///
/// Only the cache updates these, and only by adding to them, so at any point
/// `total_loads == load_hits + load_misses` and `total_stores == store_hits + store_misses`
#[derive(Debug, Default, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct Statistics {
    total_loads: u64,
    total_stores: u64,
    load_hits: u64,
    load_misses: u64,
    store_hits: u64,
    store_misses: u64,
    total_cycles: u64,
}

impl Statistics {
    pub(crate) fn record_load(&mut self, hit: bool) {
        self.total_loads += 1;
        if hit {
            self.load_hits += 1;
        } else {
            self.load_misses += 1;
        }
    }

    pub(crate) fn record_store(&mut self, hit: bool) {
        self.total_stores += 1;
        if hit {
            self.store_hits += 1;
        } else {
            self.store_misses += 1;
        }
    }

    pub(crate) fn add_cycles(&mut self, cycles: u64) {
        self.total_cycles += cycles;
    }

    pub fn total_loads(&self) -> u64 {
        self.total_loads
    }

    pub fn total_stores(&self) -> u64 {
        self.total_stores
    }

    pub fn load_hits(&self) -> u64 {
        self.load_hits
    }

    pub fn load_misses(&self) -> u64 {
        self.load_misses
    }

    pub fn store_hits(&self) -> u64 {
        self.store_hits
    }

    pub fn store_misses(&self) -> u64 {
        self.store_misses
    }

    pub fn total_cycles(&self) -> u64 {
        self.total_cycles
    }
}

impl fmt::Display for Statistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total loads: {}", self.total_loads)?;
        writeln!(f, "Total stores: {}", self.total_stores)?;
        writeln!(f, "Load hits: {}", self.load_hits)?;
        writeln!(f, "Load misses: {}", self.load_misses)?;
        writeln!(f, "Store hits: {}", self.store_hits)?;
        writeln!(f, "Store misses: {}", self.store_misses)?;
        write!(f, "Total cycles: {}", self.total_cycles)
    }
}
