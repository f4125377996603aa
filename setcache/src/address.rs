use crate::config::CacheConfiguration;

/// An address split into its cache fields
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct DecodedAddress {
    pub tag: u32,
    pub set_index: u32,
    pub block_offset: u32,
}

/// Splits 32-bit addresses into tag, set index, and block offset for a fixed geometry
///
/// Every 32-bit address decomposes, there's no failure case. Shifts are done in 64 bits so a
/// geometry with no tag bits left (set and offset bits filling the whole address) still works
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct AddressDecoder {
    set_index_bits: u32,
    block_offset_bits: u32,
    set_index_mask: u64,
    block_offset_mask: u64,
}

impl AddressDecoder {
    pub fn new(set_index_bits: u32, block_offset_bits: u32) -> Self {
        debug_assert!(set_index_bits + block_offset_bits <= u32::BITS);
        Self {
            set_index_bits,
            block_offset_bits,
            set_index_mask: (1u64 << set_index_bits) - 1,
            block_offset_mask: (1u64 << block_offset_bits) - 1,
        }
    }

    pub fn from_config(config: &CacheConfiguration) -> Self {
        Self::new(config.set_index_bits(), config.block_offset_bits())
    }

    /// # Examples
    ///
    /// ```
    /// use setcache::address::AddressDecoder;
    /// // 4 sets of 16 byte blocks
    /// let decoder = AddressDecoder::new(2, 4);
    /// let decoded = decoder.decode(0x1234);
    /// assert_eq!(decoded.block_offset, 0x4);
    /// assert_eq!(decoded.set_index, 0x3);
    /// assert_eq!(decoded.tag, 0x48);
    /// ```
    pub fn decode(&self, address: u32) -> DecodedAddress {
        let address = address as u64;
        DecodedAddress {
            tag: (address >> (self.set_index_bits + self.block_offset_bits)) as u32,
            set_index: ((address >> self.block_offset_bits) & self.set_index_mask) as u32,
            block_offset: (address & self.block_offset_mask) as u32,
        }
    }

    /// Puts an address back together, the inverse of [`AddressDecoder::decode`]
    pub fn encode(&self, decoded: DecodedAddress) -> u32 {
        let tag = (decoded.tag as u64) << (self.set_index_bits + self.block_offset_bits);
        let set_index = ((decoded.set_index as u64) & self.set_index_mask) << self.block_offset_bits;
        let block_offset = (decoded.block_offset as u64) & self.block_offset_mask;
        (tag | set_index | block_offset) as u32
    }
}
