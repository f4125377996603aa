use std::fmt;
use serde::{Deserialize, Serialize};
use crate::error::ConfigurationError;

/// Width of the simulated address space
pub const ADDRESS_BITS: u32 = u32::BITS;

/// Blocks are transferred in 4 byte words, so nothing smaller makes sense
pub const MIN_BLOCK_SIZE: u64 = 4;

/// Upper bound on sets x associativity, the store is allocated up front
pub const MAX_CACHE_BLOCKS: u64 = 1 << 24;

/// A cache configuration as given by the user, e.g. parsed from JSON. Nothing here has been
/// checked yet, convert it into a [`CacheConfiguration`] before building a cache
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CacheConfig {
    pub num_sets: u64,
    pub associativity: u64,
    pub block_size: u64,
    pub write_miss: WriteMissPolicy,
    pub write_hit: WriteHitPolicy,
    #[serde(default = "ReplacementPolicyConfig::default")]
    pub eviction: ReplacementPolicyConfig,
}

/// What happens on a store miss
#[derive(Debug, Copy, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum WriteMissPolicy {
    /// Bring the block into the cache, then store into it
    #[serde(alias = "write-allocate")]
    WriteAllocate,
    /// Write straight to memory and leave the cache alone
    #[serde(alias = "no-write-allocate", alias = "write-around")]
    WriteAround,
}

/// What happens on a store hit
#[derive(Debug, Copy, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum WriteHitPolicy {
    /// Every store is written to memory immediately
    #[serde(alias = "write-through")]
    WriteThrough,
    /// Stores mark the block dirty, it's written to memory on eviction
    #[serde(alias = "write-back")]
    WriteBack,
}

/// The replacement policy used once a set is full - lru or fifo. Defaults to lru.
#[derive(Debug, Copy, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum ReplacementPolicyConfig {
    #[default]
    #[serde(alias = "lru")]
    LeastRecentlyUsed,
    #[serde(alias = "fifo")]
    FirstInFirstOut,
}

/// A validated cache configuration. Immutable once built
///
/// The only way to get one is through [`CacheConfiguration::try_from`], so holding one means
/// the geometry is made of powers of two, fits in a 32-bit address, is small enough to allocate,
/// and the write policies are a meaningful combination
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfiguration {
    num_sets: u64,
    associativity: u64,
    block_size: u64,
    write_miss: WriteMissPolicy,
    write_hit: WriteHitPolicy,
    eviction: ReplacementPolicyConfig,
}

impl TryFrom<CacheConfig> for CacheConfiguration {
    type Error = ConfigurationError;

    fn try_from(config: CacheConfig) -> Result<Self, Self::Error> {
        check_power_of_two("number of sets", config.num_sets)?;
        check_power_of_two("associativity", config.associativity)?;
        check_power_of_two("block size", config.block_size)?;
        if config.block_size < MIN_BLOCK_SIZE {
            return Err(ConfigurationError::BlockTooSmall {
                value: config.block_size,
                minimum: MIN_BLOCK_SIZE,
            });
        }
        let set_index_bits = config.num_sets.trailing_zeros();
        let block_offset_bits = config.block_size.trailing_zeros();
        if set_index_bits + block_offset_bits > ADDRESS_BITS {
            return Err(ConfigurationError::AddressSpaceExceeded {
                set_index_bits,
                block_offset_bits,
                address_bits: ADDRESS_BITS,
            });
        }
        // A set can never hold more distinct tags than the tag field can express
        let tag_bits = ADDRESS_BITS - set_index_bits - block_offset_bits;
        if config.associativity > 1u64 << tag_bits {
            return Err(ConfigurationError::AssociativityExceedsTags {
                associativity: config.associativity,
                tag_bits,
            });
        }
        let block_count = config.num_sets.checked_mul(config.associativity)
            .filter(|blocks| *blocks <= MAX_CACHE_BLOCKS && usize::try_from(*blocks).is_ok());
        if block_count.is_none() {
            return Err(ConfigurationError::TooManyBlocks {
                num_sets: config.num_sets,
                associativity: config.associativity,
                maximum: MAX_CACHE_BLOCKS,
            });
        }
        if config.write_miss == WriteMissPolicy::WriteAround && config.write_hit == WriteHitPolicy::WriteBack {
            return Err(ConfigurationError::WriteAroundWithWriteBack);
        }
        Ok(Self {
            num_sets: config.num_sets,
            associativity: config.associativity,
            block_size: config.block_size,
            write_miss: config.write_miss,
            write_hit: config.write_hit,
            eviction: config.eviction,
        })
    }
}

fn check_power_of_two(field: &'static str, value: u64) -> Result<(), ConfigurationError> {
    if value.is_power_of_two() {
        Ok(())
    } else {
        Err(ConfigurationError::NotPowerOfTwo { field, value })
    }
}

impl CacheConfiguration {
    pub fn num_sets(&self) -> u64 {
        self.num_sets
    }

    pub fn associativity(&self) -> u64 {
        self.associativity
    }

    pub fn block_size(&self) -> u64 {
        self.block_size
    }

    pub fn eviction(&self) -> ReplacementPolicyConfig {
        self.eviction
    }

    pub fn write_allocate(&self) -> bool {
        self.write_miss == WriteMissPolicy::WriteAllocate
    }

    pub fn write_through(&self) -> bool {
        self.write_hit == WriteHitPolicy::WriteThrough
    }

    /// log2(number of sets)
    pub fn set_index_bits(&self) -> u32 {
        self.num_sets.trailing_zeros()
    }

    /// log2(block size)
    pub fn block_offset_bits(&self) -> u32 {
        self.block_size.trailing_zeros()
    }

    /// Whatever is left of the address once the set index and block offset are taken
    pub fn tag_bits(&self) -> u32 {
        ADDRESS_BITS - self.set_index_bits() - self.block_offset_bits()
    }
}

impl From<&CacheConfiguration> for CacheConfig {
    fn from(value: &CacheConfiguration) -> Self {
        Self {
            num_sets: value.num_sets,
            associativity: value.associativity,
            block_size: value.block_size,
            write_miss: value.write_miss,
            write_hit: value.write_hit,
            eviction: value.eviction,
        }
    }
}

impl fmt::Display for CacheConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let write_miss = match self.write_miss {
            WriteMissPolicy::WriteAllocate => "write-allocate",
            WriteMissPolicy::WriteAround => "no-write-allocate",
        };
        let write_hit = match self.write_hit {
            WriteHitPolicy::WriteThrough => "write-through",
            WriteHitPolicy::WriteBack => "write-back",
        };
        let eviction = match self.eviction {
            ReplacementPolicyConfig::LeastRecentlyUsed => "lru",
            ReplacementPolicyConfig::FirstInFirstOut => "fifo",
        };
        write!(
            f,
            "{} sets, {}-way, {} byte blocks, {write_miss}, {write_hit}, {eviction} ({} tag bits, {} set bits, {} offset bits)",
            self.num_sets,
            self.associativity,
            self.block_size,
            self.tag_bits(),
            self.set_index_bits(),
            self.block_offset_bits(),
        )
    }
}
