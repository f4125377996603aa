use crate::error::TraceError;
use crate::hex::{HEX_LOOKUP, INVALID_HEX};

const LOAD_CODE: u8 = b'l';

/// Load or store. Only `l` is a load, every other operation code is treated as a store
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Operation {
    Load,
    Store,
}

impl Operation {
    pub fn from_code(code: u8) -> Self {
        if code == LOAD_CODE {
            Operation::Load
        } else {
            Operation::Store
        }
    }
}

/// One line of a trace. The size is carried through but the cache model doesn't use it
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TraceRecord {
    pub operation: Operation,
    pub address: u32,
    pub size: u32,
}

/// Iterates the records of a trace in `<op> <hex address> <decimal size>` format, one per line
///
/// Blank lines are skipped. A malformed line is reported as an error with its line number, and
/// iteration can carry on after it; what to do about bad records is the caller's choice
pub struct TraceReader<'a> {
    lines: std::iter::Enumerate<std::slice::Split<'a, u8, fn(&u8) -> bool>>,
}

impl<'a> TraceReader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        let is_newline: fn(&u8) -> bool = |b| *b == b'\n';
        Self {
            lines: bytes.split(is_newline).enumerate(),
        }
    }
}

impl Iterator for TraceReader<'_> {
    type Item = Result<TraceRecord, TraceError>;

    fn next(&mut self) -> Option<Self::Item> {
        for (index, line) in self.lines.by_ref() {
            let mut fields = line.split(|b| b.is_ascii_whitespace()).filter(|field| !field.is_empty());
            let Some(operation) = fields.next() else {
                continue;
            };
            return Some(parse_record(index + 1, operation, fields));
        }
        None
    }
}

fn parse_record<'a>(line: usize, operation: &[u8], mut fields: impl Iterator<Item = &'a [u8]>) -> Result<TraceRecord, TraceError> {
    let [code] = operation else {
        return Err(TraceError::InvalidOperation { line, found: lossy(operation) });
    };
    let address = fields.next().ok_or(TraceError::MissingField { line })?;
    let size = fields.next().ok_or(TraceError::MissingField { line })?;
    if let Some(extra) = fields.next() {
        return Err(TraceError::TrailingField { line, found: lossy(extra) });
    }
    let address = match parse_address(address) {
        Some(value) => u32::try_from(value).map_err(|_| TraceError::AddressOutOfRange { line, found: lossy(address) })?,
        None => return Err(TraceError::InvalidAddress { line, found: lossy(address) }),
    };
    let size = parse_size(size).ok_or_else(|| TraceError::InvalidSize { line, found: lossy(size) })?;
    Ok(TraceRecord {
        operation: Operation::from_code(*code),
        address,
        size,
    })
}

fn lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

/// Parses a hexadecimal address, with or without a `0x` prefix
///
/// Uses the lookup table generated by build.rs rather than `u64::from_str_radix`, which saves
/// going through `str` for every record. Returns `None` for anything that isn't hex, or that
/// doesn't fit in 64 bits
///
/// # Examples
///
/// ```
/// use setcache::trace::parse_address;
/// assert_eq!(parse_address(b"0x1fffff50"), Some(0x1fffff50));
/// assert_eq!(parse_address(b"A"), Some(10));
/// assert_eq!(parse_address(b"0x"), None);
/// assert_eq!(parse_address(b"12g4"), None);
/// ```
pub fn parse_address(buf: &[u8]) -> Option<u64> {
    let digits = match buf {
        [b'0', b'x' | b'X', rest @ ..] => rest,
        _ => buf,
    };
    if digits.is_empty() {
        return None;
    }
    let mut res: u64 = 0;
    for byte in digits {
        let value = HEX_LOOKUP[*byte as usize];
        if value == INVALID_HEX {
            return None;
        }
        res = res.checked_mul(16)?.checked_add(value as u64)?;
    }
    debug_assert_eq!(
        {
            let addr_as_str = std::str::from_utf8(digits).unwrap();
            u64::from_str_radix(addr_as_str, 16).unwrap()
        },
        res
    );
    Some(res)
}

/// Parses the decimal size field
///
/// # Examples
///
/// ```
/// use setcache::trace::parse_size;
/// assert_eq!(parse_size(b"4"), Some(4));
/// assert_eq!(parse_size(b"-4"), None);
/// ```
pub fn parse_size(buf: &[u8]) -> Option<u32> {
    if buf.is_empty() {
        return None;
    }
    let mut res: u32 = 0;
    for byte in buf {
        if !byte.is_ascii_digit() {
            return None;
        }
        res = res.checked_mul(10)?.checked_add((byte - b'0') as u32)?;
    }
    Some(res)
}
