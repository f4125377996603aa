use thiserror::Error;

/// Raised when a cache configuration can't describe a buildable cache
///
/// All of these are detected before a cache is constructed, never mid-simulation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("{field} must be a positive power of 2, got {value}")]
    NotPowerOfTwo { field: &'static str, value: u64 },

    #[error("block size must be at least {minimum} bytes, got {value}")]
    BlockTooSmall { value: u64, minimum: u64 },

    #[error("{set_index_bits} set index bits and {block_offset_bits} block offset bits don't fit in a {address_bits}-bit address")]
    AddressSpaceExceeded {
        set_index_bits: u32,
        block_offset_bits: u32,
        address_bits: u32,
    },

    #[error("associativity {associativity} is more than the {tag_bits} tag bits can tell apart")]
    AssociativityExceedsTags { associativity: u64, tag_bits: u32 },

    #[error("{num_sets} sets of {associativity} blocks is more than the {maximum} blocks a cache can have")]
    TooManyBlocks {
        num_sets: u64,
        associativity: u64,
        maximum: u64,
    },

    #[error("no-write-allocate and write-back is an invalid combination")]
    WriteAroundWithWriteBack,
}

/// A trace record which couldn't be parsed. Line numbers start at 1
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TraceError {
    #[error("line {line}: expected `<op> <address> <size>`, the record is incomplete")]
    MissingField { line: usize },

    #[error("line {line}: the operation must be a single character, got `{found}`")]
    InvalidOperation { line: usize, found: String },

    #[error("line {line}: `{found}` is not a hexadecimal address")]
    InvalidAddress { line: usize, found: String },

    #[error("line {line}: address `{found}` doesn't fit in 32 bits")]
    AddressOutOfRange { line: usize, found: String },

    #[error("line {line}: `{found}` is not a valid access size")]
    InvalidSize { line: usize, found: String },

    #[error("line {line}: unexpected trailing field `{found}`")]
    TrailingField { line: usize, found: String },
}

impl TraceError {
    /// The line of the trace the error was found on
    pub fn line(&self) -> usize {
        match self {
            TraceError::MissingField { line }
            | TraceError::InvalidOperation { line, .. }
            | TraceError::InvalidAddress { line, .. }
            | TraceError::AddressOutOfRange { line, .. }
            | TraceError::InvalidSize { line, .. }
            | TraceError::TrailingField { line, .. } => *line,
        }
    }
}
