use crate::{Timestamp, Uuid};
use std::convert::TryFrom;
use std::fmt;

#[inline]
fn take<const N: usize>(data: &[u8]) -> [u8; N] {
    debug_assert!(data.len() >= N);
    unsafe { *(data.as_ptr() as *const [u8; N]) }
}

/// Split a fixed width value off the front of the data
#[inline]
fn get_split<const N: usize>(data: &[u8]) -> Option<([u8; N], &[u8])> {
    data.get(N..).map(|d| (take::<N>(data), d))
}

#[inline]
pub(crate) fn read_u8(data: &[u8]) -> Result<(u8, &[u8]), DecodeError> {
    let (&first, rest) = data.split_first().ok_or(DecodeError::Underrun)?;
    Ok((first, rest))
}

#[inline]
pub(crate) fn read_u16(data: &[u8]) -> Result<(u16, &[u8]), DecodeError> {
    let (head, rest) = get_split::<2>(data).ok_or(DecodeError::Underrun)?;
    Ok((u16::from_le_bytes(head), rest))
}

#[inline]
pub(crate) fn read_u32(data: &[u8]) -> Result<(u32, &[u8]), DecodeError> {
    let (head, rest) = get_split::<4>(data).ok_or(DecodeError::Underrun)?;
    Ok((u32::from_le_bytes(head), rest))
}

#[inline]
pub(crate) fn read_u64(data: &[u8]) -> Result<(u64, &[u8]), DecodeError> {
    let (head, rest) = get_split::<8>(data).ok_or(DecodeError::Underrun)?;
    Ok((u64::from_le_bytes(head), rest))
}

#[inline]
pub(crate) fn read_i8(data: &[u8]) -> Result<(i8, &[u8]), DecodeError> {
    let (&first, rest) = data.split_first().ok_or(DecodeError::Underrun)?;
    Ok((first as i8, rest))
}

#[inline]
pub(crate) fn read_i16(data: &[u8]) -> Result<(i16, &[u8]), DecodeError> {
    let (head, rest) = get_split::<2>(data).ok_or(DecodeError::Underrun)?;
    Ok((i16::from_le_bytes(head), rest))
}

#[inline]
pub(crate) fn read_i32(data: &[u8]) -> Result<(i32, &[u8]), DecodeError> {
    let (head, rest) = get_split::<4>(data).ok_or(DecodeError::Underrun)?;
    Ok((i32::from_le_bytes(head), rest))
}

#[inline]
pub(crate) fn read_i64(data: &[u8]) -> Result<(i64, &[u8]), DecodeError> {
    let (head, rest) = get_split::<8>(data).ok_or(DecodeError::Underrun)?;
    Ok((i64::from_le_bytes(head), rest))
}

#[inline]
pub(crate) fn read_f32(data: &[u8]) -> Result<(f32, &[u8]), DecodeError> {
    let (head, rest) = get_split::<4>(data).ok_or(DecodeError::Underrun)?;
    Ok((f32::from_le_bytes(head), rest))
}

#[inline]
pub(crate) fn read_f64(data: &[u8]) -> Result<(f64, &[u8]), DecodeError> {
    let (head, rest) = get_split::<8>(data).ok_or(DecodeError::Underrun)?;
    Ok((f64::from_le_bytes(head), rest))
}

#[inline]
pub(crate) fn read_bool(data: &[u8]) -> Result<(bool, &[u8]), DecodeError> {
    let (&first, rest) = data.split_first().ok_or(DecodeError::Underrun)?;
    Ok((first != 0, rest))
}

#[inline]
pub(crate) fn read_bitflags(data: &[u8]) -> Result<([bool; 8], &[u8]), DecodeError> {
    let (&first, rest) = data.split_first().ok_or(DecodeError::Underrun)?;
    let mut flags = [false; 8];
    for (i, flag) in flags.iter_mut().enumerate() {
        *flag = first & (1 << i) != 0;
    }
    Ok((flags, rest))
}

pub(crate) fn read_varuint(mut data: &[u8]) -> Result<(u64, &[u8]), DecodeError> {
    let mut val = 0u64;
    let mut shift = 0u32;
    loop {
        let (&byte, rest) = data.split_first().ok_or(DecodeError::Underrun)?;
        data = rest;
        val |= u64::from(byte & 0x7f) << shift;
        if byte & 0x80 == 0 {
            return Ok((val, data));
        }

        // guards against unbounded work on adversarial input
        shift += 7;
        if shift >= 64 {
            return Err(DecodeError::Overflow);
        }
    }
}

#[inline]
pub(crate) fn read_bytes(data: &[u8], count: usize) -> Result<(&[u8], &[u8]), DecodeError> {
    if count <= data.len() {
        Ok(data.split_at(count))
    } else {
        Err(DecodeError::Underrun)
    }
}

pub(crate) fn read_string(
    data: &[u8],
    size: Option<usize>,
) -> Result<(String, &[u8]), DecodeError> {
    let (text_len, data) = match size {
        Some(x) => (x, data),
        None => {
            let (x, rest) = read_varuint(data)?;
            let x = usize::try_from(x).map_err(|_| DecodeError::Overflow)?;
            (x, rest)
        }
    };

    let (text, rest) = read_bytes(data, text_len)?;
    Ok((String::from_utf8_lossy(text).into_owned(), rest))
}

/// The kind of error that occurred while decoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    /// Fewer bytes remain than the operation requires
    Underrun,

    /// A caller supplied offset pair is inconsistent or out of bounds
    InvalidRange,

    /// A caller supplied offset exceeds the data length
    OutOfBounds,

    /// A variable length integer would require 64 or more bits of shift
    Overflow,

    /// Bytes were read but could not be interpreted as the requested value
    InvalidFormat,
}

impl std::error::Error for DecodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        None
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            DecodeError::Underrun => write!(f, "not enough bytes remain"),
            DecodeError::InvalidRange => write!(f, "invalid byte range requested"),
            DecodeError::OutOfBounds => write!(f, "offset exceeds data length"),
            DecodeError::Overflow => write!(f, "variable length integer does not terminate"),
            DecodeError::InvalidFormat => write!(f, "bytes are not in the expected format"),
        }
    }
}

impl DecodeError {
    #[inline]
    #[must_use]
    pub fn at(self, position: usize) -> DecoderError {
        DecoderError {
            position,
            kind: self,
        }
    }
}

/// A [DecodeError] stamped with the cursor offset where it occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecoderError {
    position: usize,
    kind: DecodeError,
}

impl DecoderError {
    /// The cursor offset at the time of failure
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn kind(&self) -> &DecodeError {
        &self.kind
    }

    pub fn into_kind(self) -> DecodeError {
        self.kind
    }
}

impl std::error::Error for DecoderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        None
    }
}

impl fmt::Display for DecoderError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.kind {
            DecodeError::Underrun => write!(f, "not enough bytes remain at {}", self.position),
            DecodeError::InvalidRange => {
                write!(f, "invalid byte range requested at {}", self.position)
            }
            DecodeError::OutOfBounds => {
                write!(f, "offset exceeds data length at {}", self.position)
            }
            DecodeError::Overflow => write!(
                f,
                "variable length integer does not terminate at {}",
                self.position
            ),
            DecodeError::InvalidFormat => write!(
                f,
                "bytes are not in the expected format at {}",
                self.position
            ),
        }
    }
}

/// Cursor over world save data that yields strongly typed values
///
/// All multi-byte values are little endian. Reads advance the cursor by the
/// number of bytes consumed; peeks and absolute slices leave it untouched. A
/// failed read leaves the cursor where it was, so the reported position is
/// exact.
///
/// ```
/// use burrow::Decoder;
/// let data = [0x2a, 0x00, 0x03, b'a', b'b', b'c'];
/// let mut decoder = Decoder::new(&data);
/// assert_eq!(decoder.read_u16()?, 42);
/// assert_eq!(decoder.read_string(None)?, String::from("abc"));
/// assert_eq!(decoder.position(), 6);
/// # Ok::<(), burrow::DecoderError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Decoder<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> Decoder<'a> {
    /// Wrap the given data with the cursor at offset 0. Never fails.
    #[inline]
    pub fn new(data: &'a [u8]) -> Self {
        Decoder { data, position: 0 }
    }

    /// Current cursor offset
    #[inline]
    pub fn position(&self) -> usize {
        self.position
    }

    /// Number of bytes between the cursor and the end of the data
    #[inline]
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.position)
    }

    /// Move the cursor without validating against the data length.
    ///
    /// An out of range cursor is only discovered by the next read, which will
    /// fail with [DecodeError::Underrun]. Use [Decoder::seek] for validated
    /// positioning.
    #[inline]
    pub fn set_position(&mut self, position: usize) {
        self.position = position;
    }

    /// Validated positioning
    ///
    /// ```
    /// use burrow::{DecodeError, Decoder};
    /// let mut decoder = Decoder::new(b"abc");
    /// assert!(decoder.seek(3).is_ok());
    /// assert_eq!(decoder.seek(4).unwrap_err().kind(), &DecodeError::OutOfBounds);
    /// assert_eq!(decoder.position(), 3);
    /// ```
    #[inline]
    pub fn seek(&mut self, offset: usize) -> Result<(), DecoderError> {
        if offset > self.data.len() {
            return Err(DecodeError::OutOfBounds.at(self.position));
        }

        self.position = offset;
        Ok(())
    }

    /// Copy all bytes between the cursor and `min(offset, len)`, advancing
    /// the cursor to that clamped endpoint.
    ///
    /// A cursor already at the endpoint yields an empty vector, not an error.
    ///
    /// ```
    /// use burrow::Decoder;
    /// let mut decoder = Decoder::new(b"header|body");
    /// assert_eq!(decoder.read_remaining_until(6)?, b"header".to_vec());
    /// assert_eq!(decoder.read_remaining_until(6)?, Vec::new());
    /// assert_eq!(decoder.read_remaining_until(usize::MAX)?, b"|body".to_vec());
    /// # Ok::<(), burrow::DecoderError>(())
    /// ```
    pub fn read_remaining_until(&mut self, offset: usize) -> Result<Vec<u8>, DecoderError> {
        let end = offset.min(self.data.len());
        if self.position > end {
            return Err(DecodeError::InvalidRange.at(self.position));
        }

        let result = self.data[self.position..end].to_vec();
        self.position = end;
        Ok(result)
    }

    #[inline]
    fn window(&self) -> &'a [u8] {
        self.data.get(self.position..).unwrap_or_default()
    }

    #[inline]
    fn err_position(&self, err: DecodeError) -> DecoderError {
        err.at(self.position)
    }

    #[inline]
    pub fn read_u8(&mut self) -> Result<u8, DecoderError> {
        let window = self.window();
        let (result, rest) = read_u8(window).map_err(|e| self.err_position(e))?;
        self.position += window.len() - rest.len();
        Ok(result)
    }

    #[inline]
    pub fn read_u16(&mut self) -> Result<u16, DecoderError> {
        let window = self.window();
        let (result, rest) = read_u16(window).map_err(|e| self.err_position(e))?;
        self.position += window.len() - rest.len();
        Ok(result)
    }

    #[inline]
    pub fn read_u32(&mut self) -> Result<u32, DecoderError> {
        let window = self.window();
        let (result, rest) = read_u32(window).map_err(|e| self.err_position(e))?;
        self.position += window.len() - rest.len();
        Ok(result)
    }

    #[inline]
    pub fn read_u64(&mut self) -> Result<u64, DecoderError> {
        let window = self.window();
        let (result, rest) = read_u64(window).map_err(|e| self.err_position(e))?;
        self.position += window.len() - rest.len();
        Ok(result)
    }

    #[inline]
    pub fn read_i8(&mut self) -> Result<i8, DecoderError> {
        let window = self.window();
        let (result, rest) = read_i8(window).map_err(|e| self.err_position(e))?;
        self.position += window.len() - rest.len();
        Ok(result)
    }

    #[inline]
    pub fn read_i16(&mut self) -> Result<i16, DecoderError> {
        let window = self.window();
        let (result, rest) = read_i16(window).map_err(|e| self.err_position(e))?;
        self.position += window.len() - rest.len();
        Ok(result)
    }

    #[inline]
    pub fn read_i32(&mut self) -> Result<i32, DecoderError> {
        let window = self.window();
        let (result, rest) = read_i32(window).map_err(|e| self.err_position(e))?;
        self.position += window.len() - rest.len();
        Ok(result)
    }

    #[inline]
    pub fn read_i64(&mut self) -> Result<i64, DecoderError> {
        let window = self.window();
        let (result, rest) = read_i64(window).map_err(|e| self.err_position(e))?;
        self.position += window.len() - rest.len();
        Ok(result)
    }

    #[inline]
    pub fn read_f32(&mut self) -> Result<f32, DecoderError> {
        let window = self.window();
        let (result, rest) = read_f32(window).map_err(|e| self.err_position(e))?;
        self.position += window.len() - rest.len();
        Ok(result)
    }

    #[inline]
    pub fn read_f64(&mut self) -> Result<f64, DecoderError> {
        let window = self.window();
        let (result, rest) = read_f64(window).map_err(|e| self.err_position(e))?;
        self.position += window.len() - rest.len();
        Ok(result)
    }

    /// Read one byte as a boolean. Any nonzero byte is true.
    #[inline]
    pub fn read_bool(&mut self) -> Result<bool, DecoderError> {
        let window = self.window();
        let (result, rest) = read_bool(window).map_err(|e| self.err_position(e))?;
        self.position += window.len() - rest.len();
        Ok(result)
    }

    /// Read one byte and expand it into 8 flags, least significant bit first
    ///
    /// ```
    /// use burrow::Decoder;
    /// let mut decoder = Decoder::new(&[0b0000_0101]);
    /// let flags = decoder.read_bitflags()?;
    /// assert_eq!(flags, [true, false, true, false, false, false, false, false]);
    /// # Ok::<(), burrow::DecoderError>(())
    /// ```
    #[inline]
    pub fn read_bitflags(&mut self) -> Result<[bool; 8], DecoderError> {
        let window = self.window();
        let (result, rest) = read_bitflags(window).map_err(|e| self.err_position(e))?;
        self.position += window.len() - rest.len();
        Ok(result)
    }

    /// Read a ULEB128 encoded unsigned integer.
    ///
    /// Each byte contributes its low 7 bits; the high bit signals that
    /// another byte follows. Fails with [DecodeError::Overflow] once the
    /// accumulated shift would reach 64 bits without a terminating byte.
    ///
    /// ```
    /// use burrow::Decoder;
    /// let mut decoder = Decoder::new(&[0x96, 0x01]);
    /// assert_eq!(decoder.read_varuint()?, 150);
    /// # Ok::<(), burrow::DecoderError>(())
    /// ```
    #[inline]
    pub fn read_varuint(&mut self) -> Result<u64, DecoderError> {
        let window = self.window();
        let (result, rest) = read_varuint(window).map_err(|e| self.err_position(e))?;
        self.position += window.len() - rest.len();
        Ok(result)
    }

    /// Copy the next `count` bytes and advance the cursor past them
    #[inline]
    pub fn read_bytes(&mut self, count: usize) -> Result<Vec<u8>, DecoderError> {
        let window = self.window();
        let (result, _) = read_bytes(window, count).map_err(|e| self.err_position(e))?;
        self.position += count;
        Ok(result.to_vec())
    }

    /// Copy the next `count` bytes without moving the cursor
    ///
    /// ```
    /// use burrow::Decoder;
    /// let mut decoder = Decoder::new(b"relogic");
    /// assert_eq!(decoder.peek_bytes(7)?, b"relogic".to_vec());
    /// assert_eq!(decoder.position(), 0);
    /// # Ok::<(), burrow::DecoderError>(())
    /// ```
    #[inline]
    pub fn peek_bytes(&self, count: usize) -> Result<Vec<u8>, DecoderError> {
        let window = self.window();
        let (result, _) = read_bytes(window, count).map_err(|e| self.err_position(e))?;
        Ok(result.to_vec())
    }

    /// Copy the bytes in the absolute range `[start, end)` without moving the
    /// cursor
    #[inline]
    pub fn slice_bytes(&self, start: usize, end: usize) -> Result<Vec<u8>, DecoderError> {
        if start > end || end > self.data.len() {
            return Err(DecodeError::InvalidRange.at(self.position));
        }

        Ok(self.data[start..end].to_vec())
    }

    /// Read a string of `size` bytes, or a ULEB128 length prefixed string
    /// when `size` is `None`.
    ///
    /// The bytes are decoded permissively: malformed UTF-8 sequences are
    /// replaced rather than rejected.
    ///
    /// ```
    /// use burrow::Decoder;
    /// let mut decoder = Decoder::new(&[0x03, b'a', b'b', b'c']);
    /// assert_eq!(decoder.read_string(None)?, String::from("abc"));
    /// assert_eq!(decoder.position(), 4);
    /// # Ok::<(), burrow::DecoderError>(())
    /// ```
    #[inline]
    pub fn read_string(&mut self, size: Option<usize>) -> Result<String, DecoderError> {
        let window = self.window();
        let (result, rest) = read_string(window, size).map_err(|e| self.err_position(e))?;
        self.position += window.len() - rest.len();
        Ok(result)
    }

    /// Read a 16 byte identifier
    #[inline]
    pub fn read_uuid(&mut self) -> Result<Uuid, DecoderError> {
        let window = self.window();
        let (bytes, rest) = read_bytes(window, 16).map_err(|e| self.err_position(e))?;
        let uuid = Uuid::from_slice(bytes).map_err(|_| self.err_position(DecodeError::InvalidFormat))?;
        self.position += window.len() - rest.len();
        Ok(uuid)
    }

    /// Read a .NET `DateTime` tick count as a [Timestamp].
    ///
    /// The top two bits of the raw value carry the `DateTimeKind` and are
    /// masked off. Tick counts that precede the Unix epoch decode to the
    /// [Timestamp::EPOCH] sentinel, not an error.
    ///
    /// ```
    /// use burrow::{Decoder, Timestamp};
    /// let raw = 621_355_968_000_000_000u64 + 10_000_000;
    /// let bytes = raw.to_le_bytes();
    /// let mut decoder = Decoder::new(&bytes);
    /// assert_eq!(decoder.read_datetime()?, Timestamp::from_unix_ticks(10_000_000));
    /// # Ok::<(), burrow::DecoderError>(())
    /// ```
    #[inline]
    pub fn read_datetime(&mut self) -> Result<Timestamp, DecoderError> {
        let raw = self.read_u64()?;
        Ok(Timestamp::from_dotnet_ticks(raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;

    #[rstest]
    #[case(&[1, 2, 3][..], Some(([1, 2], &[3][..])))]
    #[case(&[1, 2][..], Some(([1, 2], &[][..])))]
    #[case(&[1][..], None)]
    #[case(&[][..], None)]
    fn test_get_split(#[case] input: &[u8], #[case] expected: Option<([u8; 2], &[u8])>) {
        assert_eq!(get_split::<2>(input), expected);
    }

    #[test]
    fn test_read_past_set_position() {
        let mut decoder = Decoder::new(b"ab");
        decoder.set_position(5);
        let err = decoder.read_u8().unwrap_err();
        assert_eq!(err.kind(), &DecodeError::Underrun);
        assert_eq!(err.position(), 5);
    }

    #[test]
    fn test_failed_read_keeps_cursor() {
        let mut decoder = Decoder::new(&[0x01, 0x02, 0x03]);
        decoder.read_u16().unwrap();
        assert!(decoder.read_u32().is_err());
        assert_eq!(decoder.position(), 2);
        assert_eq!(decoder.read_u8().unwrap(), 0x03);
    }

    #[rstest]
    #[case(&[0x00][..], 0)]
    #[case(&[0x7f][..], 127)]
    #[case(&[0xff, 0x01][..], 255)]
    #[case(&[0x96, 0x01][..], 150)]
    #[case(&[0x80, 0x80, 0x01][..], 16384)]
    #[case(&[0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x01][..], u64::MAX)]
    fn test_varuint_decode(#[case] input: &[u8], #[case] expected: u64) {
        let mut decoder = Decoder::new(input);
        assert_eq!(decoder.read_varuint().unwrap(), expected);
        assert_eq!(decoder.position(), input.len());
    }

    #[test]
    fn test_varuint_overflow() {
        let data = [0x80u8; 10];
        let mut decoder = Decoder::new(&data);
        let err = decoder.read_varuint().unwrap_err();
        assert_eq!(err.kind(), &DecodeError::Overflow);
        assert_eq!(decoder.position(), 0);
    }

    #[test]
    fn test_varuint_underrun_mid_sequence() {
        let mut decoder = Decoder::new(&[0x80, 0x80]);
        let err = decoder.read_varuint().unwrap_err();
        assert_eq!(err.kind(), &DecodeError::Underrun);
        assert_eq!(decoder.position(), 0);
    }

    #[rstest]
    #[case(0, 2, &[0x0a, 0x0b][..])]
    #[case(2, 2, &[][..])]
    #[case(1, 3, &[0x0b, 0x0c][..])]
    fn test_slice_bytes(#[case] start: usize, #[case] end: usize, #[case] expected: &[u8]) {
        let decoder = Decoder::new(&[0x0a, 0x0b, 0x0c]);
        assert_eq!(decoder.slice_bytes(start, end).unwrap(), expected.to_vec());
        assert_eq!(decoder.position(), 0);
    }

    #[rstest]
    #[case(2, 1)]
    #[case(0, 4)]
    #[case(4, 4)]
    fn test_slice_bytes_invalid(#[case] start: usize, #[case] end: usize) {
        let decoder = Decoder::new(&[0x0a, 0x0b, 0x0c]);
        let err = decoder.slice_bytes(start, end).unwrap_err();
        assert_eq!(err.kind(), &DecodeError::InvalidRange);
    }

    #[test]
    fn test_read_remaining_until_behind_cursor() {
        let mut decoder = Decoder::new(&[0u8; 8]);
        decoder.seek(6).unwrap();
        let err = decoder.read_remaining_until(4).unwrap_err();
        assert_eq!(err.kind(), &DecodeError::InvalidRange);
        assert_eq!(decoder.position(), 6);
    }

    #[test]
    fn test_peek_failure_keeps_cursor() {
        let decoder = Decoder::new(&[0x01]);
        assert!(decoder.peek_bytes(2).is_err());
        assert_eq!(decoder.position(), 0);
    }

    #[test]
    fn test_string_explicit_length() {
        let mut decoder = Decoder::new(b"terraria");
        assert_eq!(decoder.read_string(Some(5)).unwrap(), "terra");
        assert_eq!(decoder.position(), 5);
    }

    #[test]
    fn test_string_invalid_utf8_passes_through() {
        let mut decoder = Decoder::new(&[0x02, 0xff, 0xfe]);
        let result = decoder.read_string(None).unwrap();
        assert_eq!(result, "\u{fffd}\u{fffd}");
        assert_eq!(decoder.position(), 3);
    }

    #[test]
    fn test_string_length_prefix_underrun_keeps_cursor() {
        let mut decoder = Decoder::new(&[0x05, b'a', b'b']);
        let err = decoder.read_string(None).unwrap_err();
        assert_eq!(err.kind(), &DecodeError::Underrun);
        assert_eq!(decoder.position(), 0);
    }
}
