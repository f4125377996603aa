use tracing::{debug, trace};
use crate::address::AddressDecoder;
use crate::config::{CacheConfiguration, ReplacementPolicyConfig};
use crate::cost::{CostEvent, CostModel};
use crate::replacement_policies::{FirstInFirstOut, LeastRecentlyUsed, NoPolicy, ReplacementPolicy};
use crate::stats::Statistics;
use crate::trace::Operation;

/// A single cache slot
///
/// Starts invalid. Allocation makes it valid, stamps it, and clears dirty. Eviction doesn't have
/// a separate step, the incoming block is installed over the victim in the same slot
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct CacheBlock {
    valid: bool,
    dirty: bool,
    tag: u32,
    recency_stamp: u64,
    insertion_stamp: u64,
}

impl CacheBlock {
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn tag(&self) -> u32 {
        self.tag
    }

    /// Clock value at the last hit or allocation
    pub fn recency_stamp(&self) -> u64 {
        self.recency_stamp
    }

    /// Clock value at allocation, unaffected by hits
    pub fn insertion_stamp(&self) -> u64 {
        self.insertion_stamp
    }
}

/// Logical clock ticked on every allocation and every hit, the source of block stamps
///
/// Owned by the cache and handed to the store's mutators, there's no global state
#[derive(Debug, Default)]
pub struct RecencyClock(u64);

impl RecencyClock {
    pub fn tick(&mut self) -> u64 {
        self.0 += 1;
        self.0
    }
}

/// The grid of sets x associativity blocks, stored contiguously and indexed by (set, slot)
///
/// Every operation is a linear scan over one set. Never resized after construction
#[derive(Debug)]
pub struct CacheStore {
    blocks: Vec<CacheBlock>,
    associativity: usize,
}

impl CacheStore {
    pub fn new(num_sets: usize, associativity: usize) -> Self {
        Self {
            blocks: vec![CacheBlock::default(); num_sets * associativity],
            associativity,
        }
    }

    pub fn num_sets(&self) -> usize {
        self.blocks.len() / self.associativity
    }

    pub fn associativity(&self) -> usize {
        self.associativity
    }

    /// The blocks of one set, in slot order
    pub fn set(&self, set_index: usize) -> &[CacheBlock] {
        let lower = set_index * self.associativity;
        &self.blocks[lower..lower + self.associativity]
    }

    fn block_mut(&mut self, set_index: usize, slot: usize) -> &mut CacheBlock {
        debug_assert!(slot < self.associativity);
        &mut self.blocks[set_index * self.associativity + slot]
    }

    /// The slot holding `tag` in the set, if it's resident
    pub fn lookup(&self, set_index: usize, tag: u32) -> Option<usize> {
        self.set(set_index).iter().position(|block| block.valid && block.tag == tag)
    }

    /// The first invalid slot in the set, if there is one
    pub fn free_slot(&self, set_index: usize) -> Option<usize> {
        self.set(set_index).iter().position(|block| !block.valid)
    }

    /// Installs `tag` into a slot, replacing whatever was there. Returns the previous contents
    pub fn install(&mut self, set_index: usize, slot: usize, tag: u32, clock: &mut RecencyClock) -> CacheBlock {
        let stamp = clock.tick();
        let block = self.block_mut(set_index, slot);
        let previous = *block;
        *block = CacheBlock {
            valid: true,
            dirty: false,
            tag,
            recency_stamp: stamp,
            insertion_stamp: stamp,
        };
        previous
    }

    /// Refreshes the recency stamp after a hit. The insertion stamp is left alone
    pub fn touch(&mut self, set_index: usize, slot: usize, clock: &mut RecencyClock) {
        let stamp = clock.tick();
        self.block_mut(set_index, slot).recency_stamp = stamp;
    }

    pub fn mark_dirty(&mut self, set_index: usize, slot: usize) {
        let block = self.block_mut(set_index, slot);
        debug_assert!(block.valid);
        block.dirty = true;
    }

    pub fn valid_block_count(&self) -> usize {
        self.blocks.iter().filter(|block| block.valid).count()
    }
}

/// The four ways an access can resolve
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum AccessOutcome {
    LoadHit,
    LoadMiss,
    StoreHit,
    StoreMiss,
}

impl AccessOutcome {
    pub fn is_hit(&self) -> bool {
        matches!(self, AccessOutcome::LoadHit | AccessOutcome::StoreHit)
    }
}

/// What a single access did
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct AccessResult {
    pub outcome: AccessOutcome,
    /// Cycles charged for this access alone
    pub cycles: u64,
    /// Whether a dirty block was written back to make room
    pub wrote_back: bool,
}

/// A generic trait for caches
///
/// Technically not required as we're using static dispatch instead of dyn Cache, but it keeps
/// the concrete caches and [`GenericCache`] interchangeable
pub trait CacheTrait {
    /// Runs one load or store through the cache, updating the blocks, replacement state, and
    /// statistics. Each access is fully resolved before this returns
    ///
    /// # Arguments
    ///
    /// * `operation`: Load or store
    /// * `address`: The byte address accessed
    ///
    /// returns: AccessResult
    fn access(&mut self, operation: Operation, address: u32) -> AccessResult;

    /// The counters accumulated so far
    fn statistics(&self) -> &Statistics;

    fn configuration(&self) -> &CacheConfiguration;

    /// The blocks of one set. Useful for checking invariants or debugging
    fn set_blocks(&self, set_index: usize) -> &[CacheBlock];

    /// Gets the number of valid blocks. Useful for analysing cache performance or debugging
    fn valid_block_count(&self) -> usize;
}

/// A set-associative cache, parameterised by a replacement policy
///
/// Owns all of its state, the store, the clock, and the statistics, and is driven one access at
/// a time through [`CacheTrait::access`]
#[derive(Debug)]
pub struct Cache<R: ReplacementPolicy> {
    config: CacheConfiguration,
    decoder: AddressDecoder,
    costs: CostModel,
    store: CacheStore,
    clock: RecencyClock,
    replacement_policy: R,
    statistics: Statistics,
}

impl<R: ReplacementPolicy> Cache<R> {
    pub fn new(config: CacheConfiguration, policy: R) -> Self {
        Self {
            decoder: AddressDecoder::from_config(&config),
            costs: CostModel::new(config.block_size()),
            store: CacheStore::new(config.num_sets() as usize, config.associativity() as usize),
            clock: RecencyClock::default(),
            replacement_policy: policy,
            statistics: Statistics::default(),
            config,
        }
    }

    pub fn store(&self) -> &CacheStore {
        &self.store
    }

    fn process_load(&mut self, set: usize, tag: u32, charge: &mut Charge) -> AccessOutcome {
        charge.add(CostEvent::Access);
        if let Some(slot) = self.store.lookup(set, tag) {
            self.statistics.record_load(true);
            self.store.touch(set, slot, &mut self.clock);
            return AccessOutcome::LoadHit;
        }
        self.statistics.record_load(false);
        charge.add(CostEvent::BlockFill);
        self.allocate(set, tag, charge);
        AccessOutcome::LoadMiss
    }

    fn process_store(&mut self, set: usize, tag: u32, charge: &mut Charge) -> AccessOutcome {
        charge.add(CostEvent::Access);
        if let Some(slot) = self.store.lookup(set, tag) {
            self.statistics.record_store(true);
            self.store.touch(set, slot, &mut self.clock);
            if self.config.write_through() {
                charge.add(CostEvent::MemoryWrite);
            } else {
                self.store.mark_dirty(set, slot);
            }
            return AccessOutcome::StoreHit;
        }
        self.statistics.record_store(false);
        if self.config.write_allocate() {
            charge.add(CostEvent::BlockFill);
            let slot = self.allocate(set, tag, charge);
            if self.config.write_through() {
                charge.add(CostEvent::MemoryWrite);
            } else {
                self.store.mark_dirty(set, slot);
            }
        } else {
            // Write around, the cache isn't touched
            charge.add(CostEvent::MemoryWrite);
        }
        AccessOutcome::StoreMiss
    }

    /// Finds a slot for `tag`, evicting if the set is full. Returns the slot used
    fn allocate(&mut self, set: usize, tag: u32, charge: &mut Charge) -> usize {
        if let Some(slot) = self.store.free_slot(set) {
            self.store.install(set, slot, tag, &mut self.clock);
            return slot;
        }
        let slot = self.replacement_policy.victim(self.store.set(set));
        let evicted = self.store.install(set, slot, tag, &mut self.clock);
        let write_back = evicted.dirty && !self.config.write_through();
        if write_back {
            charge.add(CostEvent::WriteBack);
            charge.wrote_back = true;
        }
        debug!(set, slot, evicted_tag = evicted.tag, tag, write_back, "evicted block");
        slot
    }
}

impl<R: ReplacementPolicy> CacheTrait for Cache<R> {
    fn access(&mut self, operation: Operation, address: u32) -> AccessResult {
        let decoded = self.decoder.decode(address);
        let set = decoded.set_index as usize;
        let mut charge = Charge::new(self.costs);
        let outcome = match operation {
            Operation::Load => self.process_load(set, decoded.tag, &mut charge),
            Operation::Store => self.process_store(set, decoded.tag, &mut charge),
        };
        self.statistics.add_cycles(charge.cycles);
        trace!(address, set, tag = decoded.tag, ?outcome, cycles = charge.cycles, "access");
        AccessResult {
            outcome,
            cycles: charge.cycles,
            wrote_back: charge.wrote_back,
        }
    }

    fn statistics(&self) -> &Statistics {
        &self.statistics
    }

    fn configuration(&self) -> &CacheConfiguration {
        &self.config
    }

    fn set_blocks(&self, set_index: usize) -> &[CacheBlock] {
        self.store.set(set_index)
    }

    fn valid_block_count(&self) -> usize {
        self.store.valid_block_count()
    }
}

// Running total of the cycles for the access in progress
struct Charge {
    costs: CostModel,
    cycles: u64,
    wrote_back: bool,
}

impl Charge {
    fn new(costs: CostModel) -> Self {
        Self { costs, cycles: 0, wrote_back: false }
    }

    fn add(&mut self, event: CostEvent) {
        self.cycles += self.costs.cycles(event);
    }
}

/// Enum for the caches provided by the library
///
/// It's much faster to explicitly branch on all implementations than to go through a trait
/// object for every record of the trace, as the compiler can reason about the concrete types and
/// inline the replacement policy
#[derive(Debug)]
pub enum GenericCache {
    Direct(Cache<NoPolicy>),
    LeastRecentlyUsed(Cache<LeastRecentlyUsed>),
    FirstInFirstOut(Cache<FirstInFirstOut>),
}

impl GenericCache {
    /// Builds the cache for a configuration. Direct mapped caches have one candidate slot, so
    /// they skip the replacement policy entirely, LRU and FIFO agree there anyway
    pub fn new(config: CacheConfiguration) -> Self {
        if config.associativity() == 1 {
            return GenericCache::from(Cache::new(config, NoPolicy));
        }
        match config.eviction() {
            ReplacementPolicyConfig::LeastRecentlyUsed => GenericCache::from(Cache::new(config, LeastRecentlyUsed)),
            ReplacementPolicyConfig::FirstInFirstOut => GenericCache::from(Cache::new(config, FirstInFirstOut)),
        }
    }
}

impl From<Cache<NoPolicy>> for GenericCache {
    fn from(value: Cache<NoPolicy>) -> Self {
        Self::Direct(value)
    }
}

impl From<Cache<LeastRecentlyUsed>> for GenericCache {
    fn from(value: Cache<LeastRecentlyUsed>) -> Self {
        Self::LeastRecentlyUsed(value)
    }
}

impl From<Cache<FirstInFirstOut>> for GenericCache {
    fn from(value: Cache<FirstInFirstOut>) -> Self {
        Self::FirstInFirstOut(value)
    }
}

impl CacheTrait for GenericCache {
    fn access(&mut self, operation: Operation, address: u32) -> AccessResult {
        match self {
            GenericCache::Direct(c) => c.access(operation, address),
            GenericCache::LeastRecentlyUsed(c) => c.access(operation, address),
            GenericCache::FirstInFirstOut(c) => c.access(operation, address),
        }
    }

    fn statistics(&self) -> &Statistics {
        match self {
            GenericCache::Direct(c) => c.statistics(),
            GenericCache::LeastRecentlyUsed(c) => c.statistics(),
            GenericCache::FirstInFirstOut(c) => c.statistics(),
        }
    }

    fn configuration(&self) -> &CacheConfiguration {
        match self {
            GenericCache::Direct(c) => c.configuration(),
            GenericCache::LeastRecentlyUsed(c) => c.configuration(),
            GenericCache::FirstInFirstOut(c) => c.configuration(),
        }
    }

    fn set_blocks(&self, set_index: usize) -> &[CacheBlock] {
        match self {
            GenericCache::Direct(c) => c.set_blocks(set_index),
            GenericCache::LeastRecentlyUsed(c) => c.set_blocks(set_index),
            GenericCache::FirstInFirstOut(c) => c.set_blocks(set_index),
        }
    }

    fn valid_block_count(&self) -> usize {
        match self {
            GenericCache::Direct(c) => c.valid_block_count(),
            GenericCache::LeastRecentlyUsed(c) => c.valid_block_count(),
            GenericCache::FirstInFirstOut(c) => c.valid_block_count(),
        }
    }
}
