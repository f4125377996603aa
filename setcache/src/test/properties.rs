use std::collections::HashSet;
use proptest::prelude::*;
use crate::address::{AddressDecoder, DecodedAddress};
use crate::cache::{AccessOutcome, CacheTrait, GenericCache};
use crate::config::{CacheConfig, CacheConfiguration, ReplacementPolicyConfig, WriteHitPolicy, WriteMissPolicy};
use crate::trace::Operation;

fn geometry() -> impl Strategy<Value = (u32, u32)> {
    (2u32..=32).prop_flat_map(|offset| (0..=32 - offset, Just(offset)))
}

// Kept small so sets fill up and evict often
fn small_config() -> impl Strategy<Value = CacheConfiguration> {
    (0u32..=3, 0u32..=2, 2u32..=5, any::<bool>(), any::<bool>(), any::<bool>()).prop_filter_map(
        "no-write-allocate with write-back is rejected",
        |(sets, ways, block, allocate, through, fifo)| {
            CacheConfiguration::try_from(CacheConfig {
                num_sets: 1 << sets,
                associativity: 1 << ways,
                block_size: 1 << block,
                write_miss: if allocate { WriteMissPolicy::WriteAllocate } else { WriteMissPolicy::WriteAround },
                write_hit: if through { WriteHitPolicy::WriteThrough } else { WriteHitPolicy::WriteBack },
                eviction: if fifo { ReplacementPolicyConfig::FirstInFirstOut } else { ReplacementPolicyConfig::LeastRecentlyUsed },
            }).ok()
        },
    )
}

fn accesses() -> impl Strategy<Value = Vec<(Operation, u32)>> {
    // A narrow address range makes conflicts likely
    prop::collection::vec(
        (prop_oneof![Just(Operation::Load), Just(Operation::Store)], 0u32..0x400),
        0..200,
    )
}

proptest! {
    #[test]
    fn decode_then_encode_gives_back_the_address(address in any::<u32>(), (set_bits, offset_bits) in geometry()) {
        let decoder = AddressDecoder::new(set_bits, offset_bits);
        let decoded = decoder.decode(address);
        prop_assert_eq!(decoder.encode(decoded), address);
        prop_assert!((decoded.set_index as u64) < (1u64 << set_bits));
        prop_assert!((decoded.block_offset as u64) < (1u64 << offset_bits));
        let reassembled = ((decoded.tag as u64) << (set_bits + offset_bits))
            | ((decoded.set_index as u64) << offset_bits)
            | decoded.block_offset as u64;
        prop_assert_eq!(reassembled, address as u64);
    }

    #[test]
    fn encode_keeps_each_field(tag in any::<u32>(), set_index in any::<u32>(), block_offset in any::<u32>()) {
        let decoder = AddressDecoder::new(3, 5);
        let decoded = DecodedAddress { tag: tag >> 8, set_index: set_index & 0x7, block_offset: block_offset & 0x1F };
        prop_assert_eq!(decoder.decode(decoder.encode(decoded)), decoded);
    }

    #[test]
    fn counters_and_sets_stay_consistent(config in small_config(), trace in accesses()) {
        let num_sets = config.num_sets() as usize;
        let associativity = config.associativity() as usize;
        let mut cache = GenericCache::new(config);
        let mut previous_cycles = 0;
        for (operation, address) in trace {
            let result = cache.access(operation, address);
            prop_assert!(result.cycles >= 1);

            let stats = cache.statistics();
            prop_assert_eq!(stats.total_loads(), stats.load_hits() + stats.load_misses());
            prop_assert_eq!(stats.total_stores(), stats.store_hits() + stats.store_misses());
            prop_assert_eq!(stats.total_cycles(), previous_cycles + result.cycles);
            previous_cycles = stats.total_cycles();

            for set in 0..num_sets {
                let blocks = cache.set_blocks(set);
                prop_assert_eq!(blocks.len(), associativity);
                let mut tags = HashSet::new();
                for block in blocks.iter().filter(|b| b.is_valid()) {
                    prop_assert!(tags.insert(block.tag()), "tag {} resident twice in set {}", block.tag(), set);
                }
            }
        }
    }

    #[test]
    fn immediate_repeat_after_miss_hits(config in small_config(), trace in accesses(), address in any::<u32>()) {
        let allocates = config.write_allocate();
        let mut cache = GenericCache::new(config);
        for (operation, a) in trace {
            cache.access(operation, a);
        }
        cache.access(Operation::Load, address);
        let second = cache.access(Operation::Load, address);
        prop_assert_eq!(second.outcome, AccessOutcome::LoadHit);
        prop_assert_eq!(second.cycles, 1);
        // Stores only stay resident when they allocate
        let store = cache.access(Operation::Store, address ^ 0x8000_0000);
        let again = cache.access(Operation::Store, address ^ 0x8000_0000);
        if store.outcome == AccessOutcome::StoreMiss {
            prop_assert_eq!(again.outcome.is_hit(), allocates);
        }
    }
}
