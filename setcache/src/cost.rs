/// Cycles charged for every access, hit or miss
pub const BASE_ACCESS_CYCLES: u64 = 1;

/// Cycles to move one word between the cache and memory
pub const MEMORY_WORD_CYCLES: u64 = 100;

/// Blocks move to and from memory in words of this many bytes
pub const WORD_BYTES: u64 = 4;

/// Something an access did which costs cycles
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CostEvent {
    /// Paid by every load and store
    Access,
    /// A block brought in from memory after a miss
    BlockFill,
    /// A single store written straight to memory (write-through, or write-around on a miss)
    MemoryWrite,
    /// A dirty block written back to memory when it's evicted
    WriteBack,
}

/// Additive cycle cost model. Costs only ever add up, nothing is amortised across accesses
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct CostModel {
    block_transfer_cycles: u64,
}

impl CostModel {
    pub fn new(block_size: u64) -> Self {
        Self {
            block_transfer_cycles: MEMORY_WORD_CYCLES * (block_size / WORD_BYTES),
        }
    }

    /// # Examples
    ///
    /// ```
    /// use setcache::cost::{CostEvent, CostModel};
    /// let costs = CostModel::new(16);
    /// assert_eq!(costs.cycles(CostEvent::Access), 1);
    /// assert_eq!(costs.cycles(CostEvent::BlockFill), 400);
    /// assert_eq!(costs.cycles(CostEvent::MemoryWrite), 100);
    /// ```
    pub fn cycles(&self, event: CostEvent) -> u64 {
        match event {
            CostEvent::Access => BASE_ACCESS_CYCLES,
            CostEvent::BlockFill | CostEvent::WriteBack => self.block_transfer_cycles,
            CostEvent::MemoryWrite => MEMORY_WORD_CYCLES,
        }
    }
}
