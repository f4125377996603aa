use crate::cache::CacheBlock;

/// A generic trait for implementing new replacement policies. Can be used to parameterise a Cache.
///
/// Policies don't keep their own bookkeeping, the cache stamps every block on allocation (and
/// on every hit) from one logical clock, and the policy picks a victim by comparing stamps
pub trait ReplacementPolicy {
    /// Picks the slot to evict from a full set
    ///
    /// Only called when every block in the set is valid. Must return an index into `set`
    ///
    /// # Arguments
    ///
    /// * `set`: The blocks of the set, in slot order
    ///
    /// returns: usize
    fn victim(&self, set: &[CacheBlock]) -> usize;
}

#[derive(Debug, Default, Copy, Clone)]
/// NoPolicy is used for direct mapped caches, where there is only one slot to choose
///
/// As the generic cache implementation is monomorphised, the compiler can completely optimise this
/// away, removing the need for a separate implementation
pub struct NoPolicy;

impl ReplacementPolicy for NoPolicy {
    fn victim(&self, _set: &[CacheBlock]) -> usize {
        0
    }
}

/// Least Recently Used replacement policy
///
/// Evicts the block with the oldest recency stamp. Stamps are refreshed on every hit and every
/// allocation. Ties go to the lowest slot
#[derive(Debug, Default, Copy, Clone)]
pub struct LeastRecentlyUsed;

impl ReplacementPolicy for LeastRecentlyUsed {
    fn victim(&self, set: &[CacheBlock]) -> usize {
        oldest_by(set, CacheBlock::recency_stamp)
    }
}

/// First In First Out replacement policy
///
/// Evicts the block which was installed first. Uses the insertion stamp, which is set once at
/// allocation and never touched by hits, so the eviction order is the fill order
#[derive(Debug, Default, Copy, Clone)]
pub struct FirstInFirstOut;

impl ReplacementPolicy for FirstInFirstOut {
    fn victim(&self, set: &[CacheBlock]) -> usize {
        oldest_by(set, CacheBlock::insertion_stamp)
    }
}

// Sets are small, a linear scan is all this needs
fn oldest_by(set: &[CacheBlock], stamp: impl Fn(&CacheBlock) -> u64) -> usize {
    let mut min_value = u64::MAX;
    let mut min_index = 0;
    for (index, block) in set.iter().enumerate() {
        if stamp(block) < min_value {
            min_value = stamp(block);
            min_index = index;
        }
    }
    min_index
}
