//! Little-endian binary helpers shared by every table codec.
//!
//! Readers are bounds-checked and never panic; writers append to a growing
//! `Vec<u8>` so that serializers can thread a single output buffer through
//! the whole write pipeline.

use zerocopy::{FromBytes, I16, LE, U16, U32};

/// Binary parsing error type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BinaryError {
    /// Not enough data to read the requested type
    InsufficientData { expected: usize, available: usize },
    /// Failed to parse the data
    ParseError(String),
}

impl std::fmt::Display for BinaryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BinaryError::InsufficientData {
                expected,
                available,
            } => {
                write!(
                    f,
                    "Insufficient data: expected {}, got {}",
                    expected, available
                )
            },
            BinaryError::ParseError(msg) => write!(f, "Parse error: {}", msg),
        }
    }
}

impl std::error::Error for BinaryError {}

/// Result type for binary operations
pub type BinaryResult<T> = Result<T, BinaryError>;

#[inline]
fn window(data: &[u8], offset: usize, width: usize) -> BinaryResult<&[u8]> {
    let end = offset.checked_add(width).ok_or(BinaryError::InsufficientData {
        expected: usize::MAX,
        available: data.len(),
    })?;
    data.get(offset..end).ok_or(BinaryError::InsufficientData {
        expected: end,
        available: data.len(),
    })
}

/// Read a single byte at the given offset.
#[inline]
pub fn read_u8(data: &[u8], offset: usize) -> BinaryResult<u8> {
    window(data, offset, 1).map(|b| b[0])
}

/// Read a little-endian u16 from a byte slice at the given offset.
///
/// # Examples
///
/// ```
/// use worddoc::common::binary::read_u16_le;
/// let data = [0x34, 0x12, 0x78, 0x56];
/// assert_eq!(read_u16_le(&data, 0).unwrap(), 0x1234);
/// assert_eq!(read_u16_le(&data, 2).unwrap(), 0x5678);
/// assert!(read_u16_le(&data, 3).is_err());
/// ```
#[inline]
pub fn read_u16_le(data: &[u8], offset: usize) -> BinaryResult<u16> {
    U16::<LE>::read_from_bytes(window(data, offset, 2)?)
        .map(|v| v.get())
        .map_err(|_| BinaryError::ParseError("Failed to read u16".to_string()))
}

/// Read a little-endian i16 from a byte slice at the given offset.
#[inline]
pub fn read_i16_le(data: &[u8], offset: usize) -> BinaryResult<i16> {
    I16::<LE>::read_from_bytes(window(data, offset, 2)?)
        .map(|v| v.get())
        .map_err(|_| BinaryError::ParseError("Failed to read i16".to_string()))
}

/// Read a little-endian u32 from a byte slice at the given offset.
///
/// # Examples
///
/// ```
/// use worddoc::common::binary::read_u32_le;
/// let data = [0x78, 0x56, 0x34, 0x12];
/// assert_eq!(read_u32_le(&data, 0).unwrap(), 0x12345678);
/// ```
#[inline]
pub fn read_u32_le(data: &[u8], offset: usize) -> BinaryResult<u32> {
    U32::<LE>::read_from_bytes(window(data, offset, 4)?)
        .map(|v| v.get())
        .map_err(|_| BinaryError::ParseError("Failed to read u32".to_string()))
}

/// Borrow `len` bytes starting at `offset`.
#[inline]
pub fn slice_at(data: &[u8], offset: usize, len: usize) -> BinaryResult<&[u8]> {
    window(data, offset, len)
}

/// Append a little-endian u16.
#[inline]
pub fn write_u16_le(out: &mut Vec<u8>, value: u16) {
    out.extend_from_slice(&value.to_le_bytes());
}

/// Append a little-endian u32.
#[inline]
pub fn write_u32_le(out: &mut Vec<u8>, value: u32) {
    out.extend_from_slice(&value.to_le_bytes());
}

/// Overwrite a little-endian u16 in place. The slot must already exist.
#[inline]
pub fn put_u16_le(buf: &mut [u8], offset: usize, value: u16) -> BinaryResult<()> {
    let available = buf.len();
    buf.get_mut(offset..offset + 2)
        .ok_or(BinaryError::InsufficientData {
            expected: offset + 2,
            available,
        })?
        .copy_from_slice(&value.to_le_bytes());
    Ok(())
}

/// Overwrite a little-endian u32 in place. The slot must already exist.
#[inline]
pub fn put_u32_le(buf: &mut [u8], offset: usize, value: u32) -> BinaryResult<()> {
    let available = buf.len();
    buf.get_mut(offset..offset + 4)
        .ok_or(BinaryError::InsufficientData {
            expected: offset + 4,
            available,
        })?
        .copy_from_slice(&value.to_le_bytes());
    Ok(())
}

/// Round `value` up to the next multiple of `block`.
///
/// # Examples
///
/// ```
/// use worddoc::common::binary::align_up;
/// assert_eq!(align_up(0, 512), 0);
/// assert_eq!(align_up(1, 512), 512);
/// assert_eq!(align_up(1024, 512), 1024);
/// ```
#[inline]
pub fn align_up(value: usize, block: usize) -> usize {
    if block == 0 {
        return value;
    }
    value.div_ceil(block) * block
}

/// Zero-pad `buf` up to the next multiple of `block`.
#[inline]
pub fn pad_to(buf: &mut Vec<u8>, block: usize) {
    let target = align_up(buf.len(), block);
    buf.resize(target, 0);
}

/// Zero-pad `buf` to a whole number of `block`s, never fewer than one.
/// A zero `block` leaves `buf` untouched.
#[inline]
pub fn pad_to_blocks(buf: &mut Vec<u8>, block: usize) {
    if block == 0 {
        return;
    }
    let target = align_up(buf.len().max(1), block);
    buf.resize(target, 0);
}
