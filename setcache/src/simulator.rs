use std::time::{Duration, Instant};
use tracing::{info, warn};
use crate::cache::{CacheTrait, GenericCache};
use crate::config::CacheConfiguration;
use crate::error::TraceError;
use crate::stats::Statistics;
use crate::trace::{TraceReader, TraceRecord};

/// What to do when the trace contains a record which can't be parsed
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum MalformedRecordPolicy {
    /// Treat the bad record as the end of the trace, keeping everything before it
    #[default]
    Stop,
    /// Return the error
    Fail,
}

/// The simulator feeds trace records through a cache, one at a time, and collects the results.
///
/// It supports calling simulate multiple times, each call carries on from the cache state the
/// last one left, and the time taken is accumulated
pub struct Simulator {
    cache: GenericCache,
    records: u64,
    simulation_time: Duration,
}

impl Simulator {

    /// Creates a new simulator with a cold cache for a given configuration
    pub fn new(config: &CacheConfiguration) -> Self {
        Self {
            cache: GenericCache::new(config.clone()),
            records: 0,
            simulation_time: Duration::new(0, 0),
        }
    }

    /// Simulates the cache on a trace in text form
    ///
    /// Reads from the byte array are sequential, so it can be memory mapped with sequential
    /// access advice
    ///
    /// # Arguments
    ///
    /// * `bytes`: The trace
    /// * `on_malformed`: Whether a malformed record ends the trace or fails the simulation
    ///
    /// returns: Result<&Statistics, TraceError>
    pub fn simulate(&mut self, bytes: &[u8], on_malformed: MalformedRecordPolicy) -> Result<&Statistics, TraceError> {
        let start = Instant::now();
        let mut outcome = Ok(());
        for record in TraceReader::new(bytes) {
            match record {
                Ok(record) => self.replay(&record),
                Err(e) => {
                    match on_malformed {
                        MalformedRecordPolicy::Stop => warn!(line = e.line(), "stopping at malformed trace record: {e}"),
                        MalformedRecordPolicy::Fail => outcome = Err(e),
                    }
                    break;
                }
            }
        }
        self.simulation_time += Instant::now() - start;
        info!(records = self.records, elapsed = ?self.simulation_time, "simulation finished");
        outcome.map(|_| self.cache.statistics())
    }

    /// Simulates the cache on records which have already been parsed
    pub fn simulate_records<'a>(&mut self, records: impl IntoIterator<Item = &'a TraceRecord>) -> &Statistics {
        let start = Instant::now();
        for record in records {
            self.replay(record);
        }
        self.simulation_time += Instant::now() - start;
        self.cache.statistics()
    }

    fn replay(&mut self, record: &TraceRecord) {
        self.cache.access(record.operation, record.address);
        self.records += 1;
    }

    pub fn statistics(&self) -> &Statistics {
        self.cache.statistics()
    }

    pub fn cache(&self) -> &GenericCache {
        &self.cache
    }

    /// Gets the number of records replayed so far
    pub fn get_record_count(&self) -> u64 {
        self.records
    }

    /// Gets the wall-clock execution time for processing
    pub fn get_execution_time(&self) -> &Duration {
        &self.simulation_time
    }
}
